//! Storage - Table Provisioning and Initialization
//!
//! TigerStyle: Abstract backend with simulation-first testing.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  TableInitializer   one memoized provisioning run per gate  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TableProvisioner   check existence, create if absent       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TableBackend       remote service seam (sim / production)  │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod backend;
mod config;
mod error;
mod handle;
mod init;
mod provision;
mod sim;

pub use backend::TableBackend;
pub use config::ConnectionConfig;
pub use error::{StorageError, StorageResult};
pub use handle::TableHandle;
pub use init::TableInitializer;
pub use provision::TableProvisioner;
pub use sim::SimTableBackend;
