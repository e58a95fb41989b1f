//! Child process speaking newline-delimited JSON-RPC on stdin/stdout

use async_trait::async_trait;
use confhub_common::protocol::{JsonRpcRequest, JsonRpcResponse, RequestId};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use super::{InboundEvent, InboundReceiver, InboundSender, ToolTransport};
use crate::error::{SessionError, SessionResult};

/// Grace period for the child to exit after its stdin closes
const EXIT_GRACE: Duration = Duration::from_secs(2);

pub struct StdioTransport {
    writer: Option<Box<dyn AsyncWrite + Send + Unpin>>,
    reader_task: JoinHandle<()>,
    child: Option<Child>,
}

impl StdioTransport {
    /// Spawn `command` and connect to its stdio. The child is killed if the
    /// transport is dropped without being closed.
    #[instrument(skip(args), fields(command = %command.display()))]
    pub fn spawn(command: &Path, args: &[String]) -> SessionResult<(Self, InboundReceiver)> {
        let mut child = Command::new(command)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SessionError::transport(format!("failed to spawn {}: {}", command.display(), e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| SessionError::transport("child stdin not captured"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SessionError::transport("child stdout not captured"))?;

        info!(pid = child.id(), "Spawned tool service");
        let (mut transport, inbound) = Self::from_io(stdout, stdin);
        transport.child = Some(child);
        Ok((transport, inbound))
    }

    /// Speak the stdio protocol over an arbitrary byte stream pair
    pub fn from_io<R, W>(reader: R, writer: W) -> (Self, InboundReceiver)
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let reader_task = tokio::spawn(read_responses(reader, tx));
        let transport = Self {
            writer: Some(Box::new(writer)),
            reader_task,
            child: None,
        };
        (transport, rx)
    }

    /// Pid of the spawned child; `None` for [`StdioTransport::from_io`] or once closed
    pub fn child_id(&self) -> Option<u32> {
        self.child.as_ref().and_then(Child::id)
    }

    async fn write_line(&mut self, message: &JsonRpcRequest) -> SessionResult<()> {
        let writer = self.writer.as_mut().ok_or(SessionError::Closed)?;
        let mut line = serde_json::to_vec(message)
            .map_err(|e| SessionError::transport(format!("failed to encode request: {}", e)))?;
        line.push(b'\n');
        writer.write_all(&line).await?;
        writer.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl ToolTransport for StdioTransport {
    async fn send(&mut self, message: &JsonRpcRequest) -> SessionResult<()> {
        debug!(method = %message.method, id = ?message.id, "Writing message to tool service");
        self.write_line(message).await
    }

    async fn cancel(&mut self, id: &RequestId) -> SessionResult<()> {
        self.write_line(&JsonRpcRequest::cancelled(id.clone(), "request timed out or was abandoned"))
            .await
    }

    async fn close(&mut self) -> SessionResult<()> {
        // closing stdin is the shutdown signal for the child
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.shutdown().await;
        }

        if let Some(mut child) = self.child.take() {
            match tokio::time::timeout(EXIT_GRACE, child.wait()).await {
                Ok(Ok(status)) => info!(%status, "Tool service exited"),
                Ok(Err(e)) => warn!(error = %e, "Failed to wait for tool service"),
                Err(_) => {
                    warn!("Tool service did not exit after stdin closed, killing it");
                    child.kill().await?;
                }
            }
        }

        self.reader_task.abort();
        Ok(())
    }
}

impl Drop for StdioTransport {
    fn drop(&mut self) {
        self.reader_task.abort();
    }
}

async fn read_responses<R>(reader: R, tx: InboundSender)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let reason = loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<JsonRpcResponse>(line) {
                    Ok(response) => {
                        if tx.send(InboundEvent::Response(response)).is_err() {
                            return;
                        }
                    }
                    Err(e) => warn!(error = %e, raw = %line, "Ignoring unparsable line from tool service"),
                }
            }
            Ok(None) => break "tool service closed its output".to_string(),
            Err(e) => break format!("failed to read from tool service: {}", e),
        }
    };
    debug!(%reason, "Tool service reader finished");
    let _ = tx.send(InboundEvent::Closed(reason));
}
