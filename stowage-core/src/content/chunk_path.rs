//! Chunk file naming
//!
//! A chunk of `dir/name.ext` written by operation `op` at index `i` is stored
//! at `dir/name.op.part{i}.ext`; a name without an extension becomes
//! `dir/name.op.part{i}`. Carrying the operation id keeps two writes of the
//! same target from ever sharing a chunk path.
//!
//! Target paths must have a non-empty final segment: `""` and `dir/` are
//! rejected by [`check_target_path`].
//!
//! Stem/extension split rule, applied to the final path segment only:
//! - the extension is the text after the last `.`;
//! - there is no extension when that `.` is the first character (`.env`),
//!   the last character (`notes.`), or absent;
//! - there is no extension when the candidate itself looks like a chunk
//!   marker (`part` followed by digits), so `log.part2` is treated as a stem.
//!
//! Operation ids are made of ASCII alphanumerics and `_` only. Under these
//! rules the marker is always either the last dot segment or the one just
//! before a marker-free extension, which makes [`parse_chunk_path`] an exact
//! inverse of [`derive_chunk_path`].

use crate::error::{StowageError, StowageResult};
use std::collections::BTreeMap;

const CHUNK_MARKER: &str = "part";

/// A chunk file name decoded back into its target, operation and position
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ChunkPath {
    pub original: String,
    pub operation_id: String,
    pub index: usize,
}

/// Reject paths that cannot name a stored artifact
pub fn check_target_path(path: &str) -> StowageResult<()> {
    if path.is_empty() {
        return Err(StowageError::validation(["path must not be empty"]));
    }
    let (_, name) = split_dir(path);
    if name.is_empty() {
        return Err(StowageError::validation([format!(
            "path '{}' has no file name",
            path
        )]));
    }
    Ok(())
}

pub fn derive_chunk_path(path: &str, operation_id: &str, index: usize) -> String {
    let (dir, name) = split_dir(path);
    let chunked = match split_extension(name) {
        Some((stem, ext)) => format!(
            "{}.{}.{}{}.{}",
            stem, operation_id, CHUNK_MARKER, index, ext
        ),
        None => format!("{}.{}.{}{}", name, operation_id, CHUNK_MARKER, index),
    };
    format!("{}{}", dir, chunked)
}

/// Recover the original path, operation id and index from a chunk path
///
/// Returns `None` for paths that [`derive_chunk_path`] cannot produce.
pub fn parse_chunk_path(path: &str) -> Option<ChunkPath> {
    let (dir, name) = split_dir(path);
    let segments: Vec<&str> = name.split('.').collect();
    let n = segments.len();
    if n < 3 {
        return None;
    }

    let (stem_segments, operation_id, index, ext) =
        if let Some(index) = parse_marker(segments[n - 1]) {
            (&segments[..n - 2], segments[n - 2], index, None)
        } else if n >= 4 {
            let index = parse_marker(segments[n - 2])?;
            (&segments[..n - 3], segments[n - 3], index, Some(segments[n - 1]))
        } else {
            return None;
        };

    if !is_operation_segment(operation_id) {
        return None;
    }

    let stem = stem_segments.join(".");
    if stem.is_empty() {
        return None;
    }
    let original_name = match ext {
        Some(ext) => format!("{}.{}", stem, ext),
        None => stem,
    };

    // Reject names whose extension would have been read differently.
    if split_extension(&original_name).map(|(_, e)| e) != ext {
        return None;
    }

    Some(ChunkPath {
        original: format!("{}{}", dir, original_name),
        operation_id: operation_id.to_string(),
        index,
    })
}

/// Group chunk paths by the operation that wrote them, each group sorted by
/// index
///
/// Paths that are not chunk paths are skipped.
pub fn group_chunk_paths<I, S>(paths: I) -> BTreeMap<String, Vec<ChunkPath>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut groups: BTreeMap<String, Vec<ChunkPath>> = BTreeMap::new();
    for path in paths {
        if let Some(chunk) = parse_chunk_path(path.as_ref()) {
            groups
                .entry(chunk.operation_id.clone())
                .or_default()
                .push(chunk);
        }
    }
    for chunks in groups.values_mut() {
        chunks.sort_by_key(|c| c.index);
    }
    groups
}

/// Split into (directory prefix including trailing '/', file name)
fn split_dir(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(pos) => path.split_at(pos + 1),
        None => ("", path),
    }
}

fn split_extension(name: &str) -> Option<(&str, &str)> {
    let pos = name.rfind('.')?;
    if pos == 0 || pos == name.len() - 1 {
        return None;
    }
    let ext = &name[pos + 1..];
    if parse_marker(ext).is_some() {
        return None;
    }
    Some((&name[..pos], ext))
}

fn parse_marker(segment: &str) -> Option<usize> {
    let digits = segment.strip_prefix(CHUNK_MARKER)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // Only the canonical decimal form is produced.
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    digits.parse().ok()
}

fn is_operation_segment(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}
