//! Conference chat agents and the bridge to the conference tool service
//!
//! A chat turn runs a manager agent that either answers directly or
//! delegates to a conference specialist. The specialist's only capability
//! is a synchronous search that is carried, through a [`BlockingBridge`]
//! and a per-turn session actor, to the out-of-process tool service:
//! - [`transport`]: stdio child process or HTTP endpoint
//! - [`session`]: request/response correlation by id, cancellation, teardown
//! - [`bridge`]: blocking thread to async runtime handoff with timeouts
//! - [`agents`]: manager, specialist and intent classification
//! - [`orchestrator`]: one turn, from tool service start to session close

pub mod agents;
pub mod bridge;
pub mod error;
pub mod llm;
pub mod orchestrator;
pub mod session;
pub mod transport;

pub use agents::{Intent, IntentClassifier, Manager, SearchTool, Specialist};
pub use bridge::{BlockingBridge, ToolBridge, TOOL_ERROR_PREFIX};
pub use error::{AgentError, AgentResult, BridgeError, SessionError, SessionResult};
pub use llm::{GeminiModel, LanguageModel};
pub use orchestrator::{AgentFactory, GeminiAgentFactory, SessionOrchestrator, ToolEndpoint};
pub use session::{SessionHandle, ToolSession};
