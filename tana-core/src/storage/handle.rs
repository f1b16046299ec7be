//! TableHandle - Scoped Reference to a Provisioned Table
//!
//! TigerStyle: The handle exists only after the table observably does. The
//! backend client is captured inside the handle at provisioning time, never
//! held as mutable shared state elsewhere.

use std::fmt;
use std::sync::Arc;

use super::backend::TableBackend;
use super::error::StorageResult;

/// Opaque reference to a table that has been confirmed to exist.
///
/// Produced only by a successful provisioning run; valid for the lifetime of
/// the owning initializer. Cheap to clone.
#[derive(Clone)]
pub struct TableHandle {
    table_name: Arc<str>,
    backend: Arc<dyn TableBackend>,
}

impl TableHandle {
    /// Build a handle over a table the provisioner has confirmed to exist.
    pub(crate) fn new(table_name: &str, backend: Arc<dyn TableBackend>) -> Self {
        // Precondition
        assert!(!table_name.is_empty(), "handle needs a table name");

        Self {
            table_name: Arc::from(table_name),
            backend,
        }
    }

    /// Name of the provisioned table.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.table_name
    }

    /// Re-probe the backend for the table this handle is scoped to.
    ///
    /// # Errors
    /// Propagates backend failures unchanged; no retry is applied here.
    pub async fn exists(&self) -> StorageResult<bool> {
        self.backend.table_exists(&self.table_name).await
    }
}

impl fmt::Debug for TableHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableHandle")
            .field("table_name", &self.table_name)
            .finish_non_exhaustive()
    }
}
