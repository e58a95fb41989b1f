//! Two-tier agent hierarchy: a manager that answers or delegates, and a
//! conference specialist that turns a task into one tool search

pub mod classifier;
pub mod manager;
pub mod prompts;
pub mod specialist;

pub use classifier::{Intent, IntentClassifier, LlmIntentClassifier};
pub use manager::Manager;
pub use specialist::Specialist;

/// Synchronous search capability handed to the specialist.
///
/// Failures are part of the returned text; the agent layer never sees an error.
pub trait SearchTool: Send + Sync {
    fn search(&self, search_query: &str) -> String;
}

/// Models often wrap JSON in a markdown fence; take what is inside, or the
/// outermost `{...}` span.
pub(crate) fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed);

    match (unfenced.find('{'), unfenced.rfind('}')) {
        (Some(start), Some(end)) if start < end => &unfenced[start..=end],
        _ => unfenced,
    }
}

#[cfg(test)]
mod tests {
    use super::extract_json;

    #[test]
    fn test_extract_plain_json() {
        assert_eq!(extract_json(r#" {"a": 1} "#), r#"{"a": 1}"#);
    }

    #[test]
    fn test_extract_fenced_json() {
        let text = "```json\n{\"searchQuery\": \"acronym=ICML\"}\n```";
        assert_eq!(extract_json(text), r#"{"searchQuery": "acronym=ICML"}"#);
    }

    #[test]
    fn test_extract_json_with_chatter() {
        let text = "Sure! Here it is: {\"action\": \"answer\", \"answer\": \"Hi\"} Hope it helps.";
        assert_eq!(extract_json(text), r#"{"action": "answer", "answer": "Hi"}"#);
    }
}
