//! TableBackend - Storage Service Seam
//!
//! TigerStyle: Abstract the remote service behind a trait so provisioning is
//! testable under simulation.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     TableBackend Trait                       │
//! └─────────────────────────────────────────────────────────────┘
//!          ↑                              ↑
//!          │                              │
//! ┌────────┴────────┐           ┌────────┴────────┐
//! │ SimTableBackend │           │ service client  │
//! │   (testing)     │           │  (production)   │
//! └─────────────────┘           └─────────────────┘
//! ```

use async_trait::async_trait;

use super::error::StorageResult;

/// Client seam for the table storage service.
///
/// Implementations map service failures onto the
/// [`StorageError`](super::StorageError) taxonomy: timeouts, throttling, and
/// connectivity blips become `Transient`; authorization failures and rejected
/// requests become `Permanent`. Classification drives the retry discipline.
#[async_trait]
pub trait TableBackend: Send + Sync {
    /// Whether the named table currently exists.
    async fn table_exists(&self, table_name: &str) -> StorageResult<bool>;

    /// Create the named table if it does not exist.
    ///
    /// Must be idempotent: calling it when the table already exists is not an
    /// error. A prior provisioning attempt may have created the table and
    /// timed out before confirming.
    async fn create_table_if_not_exists(&self, table_name: &str) -> StorageResult<()>;
}
