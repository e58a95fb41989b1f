//! Language model capability used by the agents
//!
//! Agents are synchronous, so [`LanguageModel::complete`] blocks. The Gemini
//! model runs a rig agent on the runtime through a [`BlockingBridge`].

use confhub_common::{AgentConfig, LlmConfig};
use rig::completion::Prompt;
use rig::providers::gemini;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::bridge::BlockingBridge;
use crate::error::{AgentError, AgentResult};

pub trait LanguageModel: Send + Sync {
    fn model_name(&self) -> &str;

    /// One completion for `prompt` under the `system` instruction
    fn complete(&self, system: &str, prompt: &str) -> AgentResult<String>;
}

/// A Gemini model behind rig's provider client
#[derive(Clone)]
pub struct GeminiModel {
    client: gemini::Client,
    model: String,
    temperature: f64,
    bridge: BlockingBridge,
    timeout: Duration,
}

impl std::fmt::Debug for GeminiModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiModel")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

impl GeminiModel {
    pub fn new(
        llm: &LlmConfig,
        api_key: &str,
        agent: &AgentConfig,
        bridge: BlockingBridge,
    ) -> AgentResult<Self> {
        if api_key.trim().is_empty() {
            return Err(AgentError::llm("Gemini API key is empty"));
        }

        Ok(Self {
            client: gemini::Client::from_url(api_key, llm.base_url.trim_end_matches('/')),
            model: agent.model.clone(),
            temperature: f64::from(agent.temperature),
            bridge,
            timeout: Duration::from_secs(llm.request_timeout_secs),
        })
    }
}

impl LanguageModel for GeminiModel {
    fn model_name(&self) -> &str {
        &self.model
    }

    #[instrument(skip_all, fields(model = %self.model, prompt_chars = prompt.len()))]
    fn complete(&self, system: &str, prompt: &str) -> AgentResult<String> {
        // the preamble differs per call, the agent is cheap to build
        let agent = self
            .client
            .agent(&self.model)
            .preamble(system)
            .temperature(self.temperature)
            .build();
        let prompt = prompt.to_string();

        let text = self
            .bridge
            .block_on(async move { agent.prompt(prompt.as_str()).await }, self.timeout)?
            .map_err(|e| AgentError::llm(format!("{} completion failed: {}", self.model, e)))?;

        if text.trim().is_empty() {
            return Err(AgentError::llm(format!("{} returned no text", self.model)));
        }
        debug!(response_chars = text.len(), "Model responded");
        Ok(text)
    }
}
