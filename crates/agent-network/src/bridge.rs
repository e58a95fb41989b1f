//! Synchronous call sites driving async I/O on the runtime
//!
//! Agents run on a blocking worker thread. They reach the tool session and the
//! LLM API through [`BlockingBridge`], which spawns the async work on the
//! runtime that owns it and waits on a one-slot channel with a deadline.

use std::future::Future;
use std::sync::mpsc::{sync_channel, RecvTimeoutError};
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tracing::{info, instrument, warn};

use crate::agents::SearchTool;
use crate::error::BridgeError;
use crate::session::SessionHandle;

/// Prefix of every failure string handed back to the agent layer
pub const TOOL_ERROR_PREFIX: &str = "Error executing tool:";

#[derive(Clone, Debug)]
pub struct BlockingBridge {
    runtime: Handle,
}

impl BlockingBridge {
    pub fn new(runtime: Handle) -> Self {
        Self { runtime }
    }

    /// Bridge onto the runtime of the calling context.
    ///
    /// # Panics
    /// Outside a tokio runtime.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    /// Run `future` on the runtime and block this thread until it finishes or
    /// `timeout` elapses; on timeout the task is aborted.
    ///
    /// Must not be called from a runtime worker thread.
    pub fn block_on<F, T>(&self, future: F, timeout: Duration) -> Result<T, BridgeError>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = sync_channel(1);
        let task = self.runtime.spawn(async move {
            let _ = tx.send(future.await);
        });

        match rx.recv_timeout(timeout) {
            Ok(value) => Ok(value),
            Err(RecvTimeoutError::Timeout) => {
                task.abort();
                Err(BridgeError::Timeout(timeout))
            }
            Err(RecvTimeoutError::Disconnected) => Err(BridgeError::Cancelled(
                "the task panicked or the runtime shut down".to_string(),
            )),
        }
    }
}

/// The specialist's only capability: `get_conferences` on the turn's session
pub struct ToolBridge {
    session: SessionHandle,
    bridge: BlockingBridge,
    timeout: Duration,
}

impl ToolBridge {
    pub fn new(session: SessionHandle, bridge: BlockingBridge, timeout: Duration) -> Self {
        Self {
            session,
            bridge,
            timeout,
        }
    }

    /// Search and return the tool output verbatim, or a string starting with
    /// [`TOOL_ERROR_PREFIX`]. Never fails.
    #[instrument(skip(self), fields(timeout_ms = self.timeout.as_millis() as u64))]
    pub fn call(&self, search_query: &str) -> String {
        let session = self.session.clone();
        let query = search_query.to_string();
        let start = Instant::now();

        let outcome = self
            .bridge
            .block_on(async move { session.get_conferences(&query).await }, self.timeout);

        let elapsed_ms = start.elapsed().as_millis() as u64;
        match outcome {
            Ok(Ok(text)) => {
                info!(elapsed_ms, chars = text.len(), "Tool call completed");
                text
            }
            Ok(Err(e)) => {
                warn!(elapsed_ms, error = %e, "Tool call failed");
                format!("{} {}", TOOL_ERROR_PREFIX, e)
            }
            Err(e) => {
                warn!(elapsed_ms, error = %e, "Tool call did not complete");
                format!("{} {}", TOOL_ERROR_PREFIX, e)
            }
        }
    }
}

impl SearchTool for ToolBridge {
    fn search(&self, search_query: &str) -> String {
        self.call(search_query)
    }
}
