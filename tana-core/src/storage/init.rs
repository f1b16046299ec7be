//! TableInitializer - One-Shot Memoizing Initialization Gate
//!
//! TigerStyle: Exactly one provisioning run per gate, ever. The first caller
//! starts it; every overlapping caller waits on the same completion signal;
//! everyone observes the identical outcome.
//!
//! # State machine
//!
//! ```text
//! Uninitialized --[first ensure_initialized]--> InProgress
//! InProgress    --[provision succeeds]-------->  Completed(handle)
//! InProgress    --[provision fails]------------> Failed(error)
//! ```
//!
//! `Completed` and `Failed` are terminal. A failed gate stays failed for its
//! lifetime; recovery is constructing a fresh gate. This mirrors the lazy-task
//! memoization the design descends from and keeps the published outcome
//! immutable.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};

use crate::retry::{RetryPolicy, Sleeper, TokioSleeper};

use super::backend::TableBackend;
use super::config::ConnectionConfig;
use super::error::{StorageError, StorageResult};
use super::handle::TableHandle;
use super::provision::TableProvisioner;

// =============================================================================
// Gate state
// =============================================================================

enum GateState {
    Uninitialized,
    /// Provisioning is running on a spawned task; the receiver flips to true
    /// once a terminal state has been published.
    InProgress(watch::Receiver<bool>),
    Completed(TableHandle),
    Failed(StorageError),
}

struct GateInner {
    provisioner: TableProvisioner,
    config: ConnectionConfig,
    policy: RetryPolicy,
    state: Mutex<GateState>,
}

// =============================================================================
// TableInitializer
// =============================================================================

/// Memoizes a single provisioning attempt across arbitrarily many concurrent
/// callers.
///
/// Cheap to clone; clones share the same gate state.
///
/// # Example
/// ```ignore
/// let gate = TableInitializer::new(config, RetryPolicy::default(), backend);
/// let table = gate.ensure_initialized().await?;
/// ```
#[derive(Clone)]
pub struct TableInitializer {
    inner: Arc<GateInner>,
}

impl TableInitializer {
    /// Create a gate over the given backend client, waiting on the tokio
    /// timer between retries.
    #[must_use]
    pub fn new(
        config: ConnectionConfig,
        policy: RetryPolicy,
        backend: Arc<dyn TableBackend>,
    ) -> Self {
        Self::with_sleeper(config, policy, backend, Arc::new(TokioSleeper))
    }

    /// Create a gate with an injected sleeper seam (tests).
    #[must_use]
    pub fn with_sleeper(
        config: ConnectionConfig,
        policy: RetryPolicy,
        backend: Arc<dyn TableBackend>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            inner: Arc::new(GateInner {
                provisioner: TableProvisioner::new(backend, sleeper),
                config,
                policy,
                state: Mutex::new(GateState::Uninitialized),
            }),
        }
    }

    /// Ensure the table exists, provisioning it at most once per gate.
    ///
    /// The first caller starts exactly one provisioning run; every caller
    /// overlapping that run suspends until it resolves, then all observe the
    /// identical outcome. Once the gate is `Completed` or `Failed` the
    /// memoized result is returned without any remote call.
    ///
    /// # Errors
    /// The provisioning failure memoized by this gate, identical for every
    /// caller.
    pub async fn ensure_initialized(&self) -> StorageResult<TableHandle> {
        let mut done_rx = {
            let mut state = self.inner.state.lock().await;
            match &*state {
                GateState::Completed(handle) => return Ok(handle.clone()),
                GateState::Failed(error) => return Err(error.clone()),
                GateState::InProgress(done_rx) => done_rx.clone(),
                GateState::Uninitialized => {
                    let (done_tx, done_rx) = watch::channel(false);
                    *state = GateState::InProgress(done_rx.clone());
                    self.spawn_provisioning(done_tx);
                    done_rx
                }
            }
            // Lock released before waiting; it is never held across a remote
            // call or a backoff delay.
        };

        while !*done_rx.borrow_and_update() {
            if done_rx.changed().await.is_err() {
                break;
            }
        }

        let state = self.inner.state.lock().await;
        match &*state {
            GateState::Completed(handle) => Ok(handle.clone()),
            GateState::Failed(error) => Err(error.clone()),
            // The sender is dropped only after publishing a terminal state,
            // so this arm is reachable only if the runtime tore the
            // provisioning task down mid-flight.
            _ => Err(StorageError::permanent(
                "provisioning task terminated without publishing an outcome",
            )),
        }
    }

    /// Run provisioning on its own task so a caller abandoning its wait
    /// cannot cancel the attempt for the other waiters.
    fn spawn_provisioning(&self, done_tx: watch::Sender<bool>) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tracing::debug!(table = %inner.config.table_name, "provisioning started");

            let outcome = inner
                .provisioner
                .provision(&inner.config, &inner.policy)
                .await;

            let mut state = inner.state.lock().await;
            match outcome {
                Ok(handle) => {
                    tracing::info!(table = %inner.config.table_name, "initialization complete");
                    *state = GateState::Completed(handle);
                }
                Err(error) => {
                    tracing::warn!(
                        table = %inner.config.table_name,
                        %error,
                        "initialization failed"
                    );
                    *state = GateState::Failed(error);
                }
            }
            drop(state);

            // Wake every waiter only after the terminal state is visible.
            let _ = done_tx.send(true);
        });
    }
}
