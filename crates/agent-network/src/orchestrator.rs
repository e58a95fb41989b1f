//! One chat turn, end to end
//!
//! Resolves and connects the tool service, initializes the session, builds
//! the agents and runs them on a blocking worker thread. The session is
//! closed on every exit path; if the turn future itself is dropped the
//! session's `Drop` tears it down.

use confhub_common::{SystemConfig, ToolConfig, ToolTransportKind};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument};

use crate::agents::{LlmIntentClassifier, Manager, SearchTool, Specialist};
use crate::bridge::{BlockingBridge, ToolBridge};
use crate::error::{AgentError, AgentResult};
use crate::llm::GeminiModel;
use crate::session::ToolSession;
use crate::transport::{HttpTransport, StdioTransport};

/// Where the tool service for a turn lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolEndpoint {
    Stdio { command: PathBuf, args: Vec<String> },
    Http { url: String },
}

impl ToolEndpoint {
    /// Check the configured tool service before anything is started
    pub fn resolve(tool: &ToolConfig) -> AgentResult<Self> {
        match tool.transport {
            ToolTransportKind::Stdio => {
                let command = tool.resolve_command()?;
                if !command.is_file() {
                    return Err(AgentError::ToolServiceNotFound { path: command });
                }
                Ok(Self::Stdio {
                    command,
                    args: tool.args.clone(),
                })
            }
            ToolTransportKind::Http => {
                url::Url::parse(&tool.http_url).map_err(|e| AgentError::InvalidToolUrl {
                    url: tool.http_url.clone(),
                    reason: e.to_string(),
                })?;
                Ok(Self::Http {
                    url: tool.http_url.clone(),
                })
            }
        }
    }

    fn connect(&self, call_timeout: Duration) -> AgentResult<ToolSession> {
        let session = match self {
            Self::Stdio { command, args } => {
                let (transport, inbound) = StdioTransport::spawn(command, args)?;
                debug!(pid = ?transport.child_id(), "Starting session over child stdio");
                ToolSession::start(Box::new(transport), inbound)
            }
            Self::Http { url } => {
                let (transport, inbound) = HttpTransport::new(url, call_timeout)?;
                ToolSession::start(Box::new(transport), inbound)
            }
        };
        Ok(session)
    }
}

/// Builds the agent hierarchy for a turn around the turn's search tool
pub trait AgentFactory: Send + Sync {
    fn build(&self, tool: Arc<dyn SearchTool>, bridge: BlockingBridge) -> AgentResult<Manager>;
}

/// Manager and specialist backed by Gemini models from the configuration
pub struct GeminiAgentFactory {
    config: Arc<SystemConfig>,
}

impl GeminiAgentFactory {
    pub fn new(config: Arc<SystemConfig>) -> Self {
        Self { config }
    }
}

impl AgentFactory for GeminiAgentFactory {
    fn build(&self, tool: Arc<dyn SearchTool>, bridge: BlockingBridge) -> AgentResult<Manager> {
        let api_key = self.config.require_api_key()?;
        let llm = &self.config.llm;

        let manager_model = Arc::new(GeminiModel::new(
            llm,
            api_key,
            &self.config.agents.manager,
            bridge.clone(),
        )?);
        let specialist_model = Arc::new(GeminiModel::new(
            llm,
            api_key,
            &self.config.agents.specialist,
            bridge,
        )?);

        Ok(Manager::new(
            manager_model.clone(),
            Box::new(LlmIntentClassifier::new(manager_model)),
            Specialist::new(specialist_model, tool),
        ))
    }
}

pub struct SessionOrchestrator {
    config: Arc<SystemConfig>,
    agents: Arc<dyn AgentFactory>,
}

impl SessionOrchestrator {
    pub fn new(config: Arc<SystemConfig>, agents: Arc<dyn AgentFactory>) -> Self {
        Self { config, agents }
    }

    /// Orchestrator with Gemini-backed agents
    pub fn with_gemini(config: Arc<SystemConfig>) -> Self {
        let agents = Arc::new(GeminiAgentFactory::new(config.clone()));
        Self::new(config, agents)
    }

    /// Answer one query. Sessions are never shared across turns.
    ///
    /// The handshake runs before the intent is known, so every turn needs a
    /// reachable tool service, including turns answered without a tool call.
    #[instrument(skip(self, query), fields(transport = ?self.config.tool.transport))]
    pub async fn run_turn(&self, query: &str) -> AgentResult<String> {
        let start = Instant::now();
        let tool = &self.config.tool;
        let call_timeout = Duration::from_secs(tool.call_timeout_secs);

        let endpoint = ToolEndpoint::resolve(tool)?;
        let session = endpoint.connect(call_timeout)?;

        if let Err(e) = session
            .initialize(Duration::from_secs(tool.handshake_timeout_secs))
            .await
        {
            error!(error = %e, "Tool service handshake failed");
            session.close().await;
            return Err(e.into());
        }

        let bridge = BlockingBridge::current();
        let search = Arc::new(ToolBridge::new(session.handle(), bridge.clone(), call_timeout));
        let manager = match self.agents.build(search, bridge) {
            Ok(manager) => manager,
            Err(e) => {
                session.close().await;
                return Err(e);
            }
        };

        let query = query.to_string();
        let outcome = tokio::task::spawn_blocking(move || manager.handle(&query)).await;
        session.close().await;

        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &outcome {
            Ok(Ok(answer)) => info!(elapsed_ms, answer_chars = answer.len(), "Turn completed"),
            Ok(Err(e)) => error!(elapsed_ms, error = %e, "Turn failed"),
            Err(e) => error!(elapsed_ms, error = %e, "Agent task panicked or was cancelled"),
        }
        outcome?
    }
}
