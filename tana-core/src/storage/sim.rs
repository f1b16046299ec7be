//! SimTableBackend - Deterministic Test Backend
//!
//! TigerStyle: Simulation-first. Tests script the exact failure sequence and
//! assert call counts; no probabilities, no real service.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::backend::TableBackend;
use super::error::{StorageError, StorageResult};

/// In-memory table backend with scripted faults and call counters.
///
/// Faults are consumed queue-order, one per call, before the call succeeds.
/// Counters record every call, failed or not.
#[derive(Debug, Default)]
pub struct SimTableBackend {
    tables: Mutex<HashSet<String>>,
    exists_faults: Mutex<VecDeque<StorageError>>,
    create_faults: Mutex<VecDeque<StorageError>>,
    exists_calls: AtomicUsize,
    create_calls: AtomicUsize,
}

impl SimTableBackend {
    /// Create an empty simulated storage account.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a pre-existing table.
    #[must_use]
    pub fn with_table(self, table_name: &str) -> Self {
        // Precondition
        assert!(!table_name.is_empty(), "table name cannot be empty");

        self.tables
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(table_name.to_string());
        self
    }

    /// Script a fault for the next unscripted existence check.
    pub fn push_exists_fault(&self, error: StorageError) {
        self.exists_faults
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push_back(error);
    }

    /// Script a fault for the next unscripted create call.
    pub fn push_create_fault(&self, error: StorageError) {
        self.create_faults
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push_back(error);
    }

    /// Total existence checks observed, failed ones included.
    #[must_use]
    pub fn exists_calls(&self) -> usize {
        self.exists_calls.load(Ordering::SeqCst)
    }

    /// Total create calls observed, failed ones included.
    #[must_use]
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Whether the table currently exists in the simulated account.
    #[must_use]
    pub fn has_table(&self, table_name: &str) -> bool {
        self.tables
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .contains(table_name)
    }

    fn pop_fault(queue: &Mutex<VecDeque<StorageError>>) -> Option<StorageError> {
        queue
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .pop_front()
    }
}

#[async_trait]
impl TableBackend for SimTableBackend {
    async fn table_exists(&self, table_name: &str) -> StorageResult<bool> {
        // Precondition
        assert!(!table_name.is_empty(), "table name cannot be empty");

        self.exists_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(fault) = Self::pop_fault(&self.exists_faults) {
            return Err(fault);
        }

        Ok(self.has_table(table_name))
    }

    async fn create_table_if_not_exists(&self, table_name: &str) -> StorageResult<()> {
        // Precondition
        assert!(!table_name.is_empty(), "table name cannot be empty");

        self.create_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(fault) = Self::pop_fault(&self.create_faults) {
            return Err(fault);
        }

        // Idempotent: inserting an existing name is a no-op.
        self.tables
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(table_name.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_account() {
        let backend = SimTableBackend::new();
        assert_eq!(backend.table_exists("GroupActivity").await, Ok(false));
        assert_eq!(backend.exists_calls(), 1);
    }

    #[tokio::test]
    async fn test_seeded_table() {
        let backend = SimTableBackend::new().with_table("GroupActivity");
        assert_eq!(backend.table_exists("GroupActivity").await, Ok(true));
        assert_eq!(backend.table_exists("Other").await, Ok(false));
    }

    #[tokio::test]
    async fn test_create_is_idempotent() {
        let backend = SimTableBackend::new();

        backend.create_table_if_not_exists("GroupActivity").await.unwrap();
        backend.create_table_if_not_exists("GroupActivity").await.unwrap();

        assert!(backend.has_table("GroupActivity"));
        assert_eq!(backend.create_calls(), 2);
    }

    #[tokio::test]
    async fn test_faults_consumed_in_order() {
        let backend = SimTableBackend::new().with_table("GroupActivity");
        backend.push_exists_fault(StorageError::transient("timeout"));
        backend.push_exists_fault(StorageError::permanent("denied"));

        assert_eq!(
            backend.table_exists("GroupActivity").await,
            Err(StorageError::transient("timeout"))
        );
        assert_eq!(
            backend.table_exists("GroupActivity").await,
            Err(StorageError::permanent("denied"))
        );
        assert_eq!(backend.table_exists("GroupActivity").await, Ok(true));
        assert_eq!(backend.exists_calls(), 3);
    }
}
