use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::extract_json;
use super::prompts::MANAGER_CLASSIFY_PROMPT;
use crate::error::{AgentError, AgentResult};
use crate::llm::LanguageModel;

/// What the manager does with a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Greeting or general question, answered without tools
    Direct { answer: String },
    /// Conference lookup, handed to the specialist
    Delegate { task: String },
}

pub trait IntentClassifier: Send + Sync {
    fn classify(&self, query: &str) -> AgentResult<Intent>;
}

#[derive(Debug, Deserialize)]
struct Decision {
    action: String,
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    task: Option<String>,
}

/// Asks the manager model for an `{"action": ...}` decision
pub struct LlmIntentClassifier {
    model: Arc<dyn LanguageModel>,
}

impl LlmIntentClassifier {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }
}

impl IntentClassifier for LlmIntentClassifier {
    #[instrument(skip(self), fields(model = %self.model.model_name()))]
    fn classify(&self, query: &str) -> AgentResult<Intent> {
        let raw = self.model.complete(MANAGER_CLASSIFY_PROMPT, query)?;
        debug!(%raw, "Classifier output");
        let intent = parse_decision(&raw, query)?;
        info!(delegate = matches!(intent, Intent::Delegate { .. }), "Query classified");
        Ok(intent)
    }
}

fn parse_decision(raw: &str, query: &str) -> AgentResult<Intent> {
    let decision: Decision = serde_json::from_str(extract_json(raw))
        .map_err(|e| AgentError::invalid_output("manager", format!("{}: {}", e, raw)))?;

    let non_empty = |s: Option<String>| s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    match decision.action.trim().to_ascii_lowercase().as_str() {
        "answer" => non_empty(decision.answer)
            .map(|answer| Intent::Direct { answer })
            .ok_or_else(|| AgentError::invalid_output("manager", "answer action without an answer")),
        // an empty task still carries the user's request through
        "delegate" => Ok(Intent::Delegate {
            task: non_empty(decision.task).unwrap_or_else(|| query.to_string()),
        }),
        other => Err(AgentError::invalid_output(
            "manager",
            format!("unknown action '{}'", other),
        )),
    }
}
