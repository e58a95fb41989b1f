use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};

use super::extract_json;
use super::prompts::SPECIALIST_PROMPT;
use super::SearchTool;
use crate::error::{AgentError, AgentResult};
use crate::llm::LanguageModel;

#[derive(Debug, Deserialize)]
struct SearchPlan {
    #[serde(rename = "searchQuery")]
    search_query: String,
}

/// Conference research specialist.
///
/// Turns a task description into one URL-encoded search and returns the tool
/// output unchanged, errors included, for the manager to synthesize.
pub struct Specialist {
    model: Arc<dyn LanguageModel>,
    tool: Arc<dyn SearchTool>,
}

impl Specialist {
    pub fn new(model: Arc<dyn LanguageModel>, tool: Arc<dyn SearchTool>) -> Self {
        Self { model, tool }
    }

    /// Ask the model for the search query of `task`
    pub fn plan(&self, task: &str) -> AgentResult<String> {
        let prompt = format!("Task description: {}", task);
        let raw = self.model.complete(SPECIALIST_PROMPT, &prompt)?;

        let plan: SearchPlan = serde_json::from_str(extract_json(&raw))
            .map_err(|e| AgentError::invalid_output("specialist", format!("{}: {}", e, raw)))?;
        let query = plan.search_query.trim().trim_start_matches('?').to_string();
        if query.is_empty() {
            return Err(AgentError::invalid_output("specialist", "empty searchQuery"));
        }
        Ok(query)
    }

    #[instrument(skip(self), fields(model = %self.model.model_name()))]
    pub fn run(&self, task: &str) -> AgentResult<String> {
        let search_query = self.plan(task)?;
        info!(%search_query, "Specialist searching conferences");
        Ok(self.tool.search(&search_query))
    }
}
