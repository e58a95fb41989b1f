use std::sync::Arc;
use tracing::{info, instrument};

use super::prompts::MANAGER_SYNTHESIZE_PROMPT;
use super::{Intent, IntentClassifier, Specialist};
use crate::error::AgentResult;
use crate::llm::LanguageModel;

/// Top of the hierarchy: classify, then answer or delegate once and synthesize
pub struct Manager {
    model: Arc<dyn LanguageModel>,
    classifier: Box<dyn IntentClassifier>,
    specialist: Specialist,
}

impl Manager {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        classifier: Box<dyn IntentClassifier>,
        specialist: Specialist,
    ) -> Self {
        Self {
            model,
            classifier,
            specialist,
        }
    }

    /// Run one query to its final answer. Blocks; call from a blocking thread.
    #[instrument(skip(self))]
    pub fn handle(&self, query: &str) -> AgentResult<String> {
        match self.classifier.classify(query)? {
            Intent::Direct { answer } => {
                info!("Answering directly");
                Ok(answer)
            }
            Intent::Delegate { task } => {
                info!(%task, "Delegating to conference specialist");
                let findings = self.specialist.run(&task)?;
                self.synthesize(query, &findings)
            }
        }
    }

    pub fn synthesize(&self, query: &str, findings: &str) -> AgentResult<String> {
        let prompt = format!(
            "User request:\n{}\n\nSpecialist result:\n{}",
            query, findings
        );
        self.model.complete(MANAGER_SYNTHESIZE_PROMPT, &prompt)
    }
}
