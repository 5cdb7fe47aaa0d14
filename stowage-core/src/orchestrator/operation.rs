//! Bookkeeping for multi-chunk writes
//!
//! Completion is tracked as a set of indices, never a counter, so a chunk
//! whose success is delivered twice is counted once. The operation hands out
//! the right to finalize exactly once, the first time the set is full.

use crate::error::{StowageError, StowageResult};
use crate::types::{OperationStatus, WriteResult};
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Lifecycle of a tracked operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    InProgress,
    /// All chunks landed and finalize has been claimed
    Finalizing,
    Failed,
    Cancelled,
}

/// What recording a chunk completion means for the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Recorded; other chunks are still outstanding
    Pending,
    /// Index was already complete; nothing changed in the count
    Duplicate,
    /// This completion filled the set; the caller must finalize
    ReadyToFinalize,
}

#[derive(Debug)]
struct Progress {
    completed: BTreeSet<usize>,
    results: BTreeMap<usize, WriteResult>,
    state: OperationState,
    finalize_claimed: bool,
}

#[derive(Debug)]
pub struct Operation {
    id: String,
    path: String,
    total: usize,
    progress: Mutex<Progress>,
}

impl Operation {
    pub fn new(id: impl Into<String>, path: impl Into<String>, total: usize) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            total,
            progress: Mutex::new(Progress {
                completed: BTreeSet::new(),
                results: BTreeMap::new(),
                state: OperationState::InProgress,
                finalize_claimed: false,
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Target path the merged artifact is written to
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn state(&self) -> OperationState {
        self.progress.lock().state
    }

    pub fn set_state(&self, state: OperationState) {
        self.progress.lock().state = state;
    }

    /// Record a successful chunk write
    pub fn record_completion(&self, index: usize, result: WriteResult) -> StowageResult<Completion> {
        if index >= self.total {
            return Err(StowageError::internal(format!(
                "chunk index {} out of range for operation {} with {} chunks",
                index, self.id, self.total
            )));
        }

        let mut progress = self.progress.lock();
        progress.results.insert(index, result);
        if !progress.completed.insert(index) {
            return Ok(Completion::Duplicate);
        }

        if progress.completed.len() == self.total
            && !progress.finalize_claimed
            && progress.state == OperationState::InProgress
        {
            progress.finalize_claimed = true;
            progress.state = OperationState::Finalizing;
            return Ok(Completion::ReadyToFinalize);
        }

        Ok(Completion::Pending)
    }

    pub fn completed_count(&self) -> usize {
        self.progress.lock().completed.len()
    }

    /// Chunk results ascending by index
    pub fn sorted_results(&self) -> Vec<(usize, WriteResult)> {
        self.progress
            .lock()
            .results
            .iter()
            .map(|(index, result)| (*index, result.clone()))
            .collect()
    }

    pub fn status(&self) -> OperationStatus {
        OperationStatus::new(self.total, self.completed_count())
    }
}

/// Concurrency-safe table of in-flight operations
///
/// Constructed explicitly and shared by handing the same `Arc` to every
/// writer that should see the same operations.
#[derive(Debug, Default)]
pub struct OperationTable {
    operations: DashMap<String, Arc<Operation>>,
}

impl OperationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new operation under a freshly generated id
    pub fn create(&self, path: &str, total: usize) -> Arc<Operation> {
        loop {
            let id = generate_operation_id();
            if let Entry::Vacant(slot) = self.operations.entry(id.clone()) {
                let operation = Arc::new(Operation::new(id, path, total));
                slot.insert(operation.clone());
                return operation;
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<Arc<Operation>> {
        self.operations.get(id).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, id: &str) -> Option<Arc<Operation>> {
        self.operations.remove(id).map(|(_, operation)| operation)
    }

    pub fn status(&self, id: &str) -> Option<OperationStatus> {
        self.operations.get(id).map(|entry| entry.status())
    }

    /// Ids of every tracked operation, sorted
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.operations.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// `op_<unix millis>_<9 random lowercase alphanumerics>`
pub fn generate_operation_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("op_{}_{}", Utc::now().timestamp_millis(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(path: &str) -> WriteResult {
        WriteResult {
            path: path.to_string(),
            size: 1,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_duplicate_completion_is_not_double_counted() {
        let operation = Operation::new("op", "a.txt", 3);

        assert_eq!(operation.record_completion(0, result("a.part0.txt")).unwrap(), Completion::Pending);
        assert_eq!(operation.record_completion(0, result("a.part0.txt")).unwrap(), Completion::Duplicate);
        assert_eq!(operation.completed_count(), 1);
        assert_eq!(operation.status().completed, 1);
    }

    #[test]
    fn test_finalize_is_claimed_exactly_once() {
        let operation = Operation::new("op", "a.txt", 2);

        assert_eq!(operation.record_completion(1, result("a.part1.txt")).unwrap(), Completion::Pending);
        assert_eq!(
            operation.record_completion(0, result("a.part0.txt")).unwrap(),
            Completion::ReadyToFinalize
        );
        assert_eq!(operation.state(), OperationState::Finalizing);

        // Re-delivery after the set is full never re-triggers finalize.
        assert_eq!(operation.record_completion(0, result("a.part0.txt")).unwrap(), Completion::Duplicate);
        assert_eq!(operation.record_completion(1, result("a.part1.txt")).unwrap(), Completion::Duplicate);
        assert!(operation.status().is_complete);
    }

    #[test]
    fn test_concurrent_completions_finalize_once() {
        let operation = Arc::new(Operation::new("op", "a.txt", 64));
        let handles: Vec<_> = (0..64usize)
            .flat_map(|index| {
                let first = operation.clone();
                let second = operation.clone();
                [
                    std::thread::spawn(move || first.record_completion(index, result("x")).unwrap()),
                    std::thread::spawn(move || second.record_completion(index, result("x")).unwrap()),
                ]
            })
            .collect();

        let outcomes: Vec<Completion> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let finalizes = outcomes.iter().filter(|c| **c == Completion::ReadyToFinalize).count();
        let duplicates = outcomes.iter().filter(|c| **c == Completion::Duplicate).count();

        assert_eq!(finalizes, 1);
        assert_eq!(duplicates, 64);
        assert_eq!(operation.completed_count(), 64);
    }

    #[test]
    fn test_out_of_range_index_is_rejected() {
        let operation = Operation::new("op", "a.txt", 2);
        assert!(operation.record_completion(2, result("x")).is_err());
    }

    #[test]
    fn test_sorted_results() {
        let operation = Operation::new("op", "a.txt", 3);
        for index in [2, 0, 1] {
            operation
                .record_completion(index, result(&format!("a.part{index}.txt")))
                .unwrap();
        }
        let indices: Vec<usize> = operation.sorted_results().iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_operation_ids_are_distinct() {
        let table = OperationTable::new();
        let ids: BTreeSet<String> = (0..100)
            .map(|_| table.create("a.txt", 2).id().to_string())
            .collect();
        assert_eq!(ids.len(), 100);
        assert_eq!(table.len(), 100);
        assert!(ids.iter().all(|id| id.starts_with("op_")));
    }

    #[test]
    fn test_unknown_operation_status_is_none() {
        let table = OperationTable::new();
        assert!(table.status("op_missing").is_none());
        assert!(table.remove("op_missing").is_none());
    }
}
