//! Tana Core - Durable Table Initialization
//!
//! TigerStyle initialization gate for table-like storage resources: ensure a
//! named table exists before any client touches it, tolerating transient
//! backend failures and arbitrarily many concurrent callers.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     TableInitializer                          │
//! │  memoizes one provisioning run; all callers share the outcome │
//! ├──────────────────────────────────────────────────────────────┤
//! │                     TableProvisioner                          │
//! │  idempotent check-then-create, each call retry-wrapped        │
//! ├──────────────────────────────────────────────────────────────┤
//! │  RetryPolicy / with_retry  │  exponential backoff per call   │
//! ├──────────────────────────────────────────────────────────────┤
//! │  TableBackend trait        │  sim (testing) / real service   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use tana_core::{ConnectionConfig, RetryPolicy, SimTableBackend, TableInitializer};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), tana_core::StorageError> {
//! let backend = Arc::new(SimTableBackend::new());
//! let gate = TableInitializer::new(
//!     ConnectionConfig::new("AccountName=groupbot;AccountKey=c2VjcmV0", "GroupActivity"),
//!     RetryPolicy::default(),
//!     backend,
//! );
//!
//! let table = gate.ensure_initialized().await?;
//! assert_eq!(table.name(), "GroupActivity");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod constants;
pub mod retry;
pub mod storage;

// Re-export common types
pub use retry::{with_retry, RetryPolicy, Sleeper, TokioSleeper};
pub use storage::{
    ConnectionConfig, SimTableBackend, StorageError, StorageResult, TableBackend, TableHandle,
    TableInitializer, TableProvisioner,
};
