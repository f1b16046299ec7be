//! TableProvisioner - Idempotent Check-Then-Create
//!
//! TigerStyle: Minimal writes. The existence check runs first so a table that
//! already exists (created earlier, or out-of-band) costs zero write calls;
//! the create call itself is idempotent so racing an external creator is
//! harmless.

use std::sync::Arc;

use crate::retry::{with_retry, RetryPolicy, Sleeper};

use super::backend::TableBackend;
use super::config::ConnectionConfig;
use super::error::StorageResult;
use super::handle::TableHandle;

/// Performs the "ensure the table exists" sequence against the backend.
///
/// Each remote call (existence check, create call) is individually wrapped by
/// the retry discipline; the sequence as a whole is not retried.
pub struct TableProvisioner {
    backend: Arc<dyn TableBackend>,
    sleeper: Arc<dyn Sleeper>,
}

impl TableProvisioner {
    /// Create a provisioner over the given backend client and sleeper seam.
    #[must_use]
    pub fn new(backend: Arc<dyn TableBackend>, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { backend, sleeper }
    }

    /// Make the configured table exist and return a handle scoped to it.
    ///
    /// # Errors
    /// - [`StorageError::Configuration`](super::StorageError::Configuration)
    ///   for a malformed descriptor, before any remote call.
    /// - [`StorageError::Permanent`](super::StorageError::Permanent) from the
    ///   backend, surfaced without retry.
    /// - [`StorageError::Exhausted`](super::StorageError::Exhausted) when a
    ///   remote call stays transiently broken past the attempt budget.
    pub async fn provision(
        &self,
        config: &ConnectionConfig,
        policy: &RetryPolicy,
    ) -> StorageResult<TableHandle> {
        // Malformed configuration fails fast, never retried.
        config.validate()?;

        let table_name = config.table_name.as_str();

        let exists = with_retry(policy, self.sleeper.as_ref(), "table_exists", || {
            self.backend.table_exists(table_name)
        })
        .await?;

        if exists {
            tracing::debug!(table = table_name, "table already exists");
        } else {
            with_retry(policy, self.sleeper.as_ref(), "create_table", || {
                self.backend.create_table_if_not_exists(table_name)
            })
            .await?;
            tracing::info!(table = table_name, "table created");
        }

        Ok(TableHandle::new(table_name, Arc::clone(&self.backend)))
    }
}
