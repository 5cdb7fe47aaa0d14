//! Diagnostic context attached to terminal failures

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Arbitrary key/value diagnostic data carried by a wrapped failure
///
/// Keys are kept sorted so the rendered form is stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorContext {
    entries: BTreeMap<String, String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context naming the operation being performed
    pub fn for_operation(operation: impl Into<String>) -> Self {
        Self::new().with("operation", operation.into())
    }

    /// Add or replace a key
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        self.entries.insert(key.into(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Name of the operation, if one was recorded
    pub fn operation(&self) -> Option<&str> {
        self.get("operation")
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in &self.entries {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", key, value)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_sorted() {
        let context = ErrorContext::for_operation("write_chunk")
            .with("path", "docs/a.md")
            .with("index", 2);

        assert_eq!(
            context.to_string(),
            "index=2, operation=write_chunk, path=docs/a.md"
        );
        assert_eq!(context.operation(), Some("write_chunk"));
    }

    #[test]
    fn test_for_operation_accepts_owned_names() {
        let name = String::from("finalize");
        let context = ErrorContext::for_operation(name);
        assert_eq!(context.operation(), Some("finalize"));
        assert_eq!(context.to_string(), "operation=finalize");
    }

    #[test]
    fn test_insert_replaces_existing_key() {
        let mut context = ErrorContext::new().with("attempt", 1);
        context.insert("attempt", 2);
        assert_eq!(context.get("attempt"), Some("2"));
        assert_eq!(context.len(), 1);
    }
}
