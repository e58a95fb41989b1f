use async_trait::async_trait;
use confhub_common::protocol::{GetConferencesArgs, ToolCallResult, ToolDefinition, GET_CONFERENCES_TOOL};
use serde_json::{json, Value};
use tracing::info;

use crate::error::ToolCallError;
use crate::upstream::ConferenceApiClient;
use crate::Tool;

/// `get_conferences`: search the conference database with a URL-encoded query
#[derive(Debug, Clone)]
pub struct ConferenceSearchTool {
    client: ConferenceApiClient,
}

impl ConferenceSearchTool {
    pub fn new(client: ConferenceApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for ConferenceSearchTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: GET_CONFERENCES_TOOL.to_string(),
            title: Some("Get Conferences".to_string()),
            description: "Searches for conferences by generating a URL-encoded query string.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "searchQuery": {
                        "type": "string",
                        "description": "A URL-encoded query string to search for conferences. E.g., 'rank=B&country=Vietnam'"
                    }
                },
                "required": ["searchQuery"]
            }),
        }
    }

    async fn call(&self, arguments: Value) -> Result<ToolCallResult, ToolCallError> {
        let args: GetConferencesArgs =
            serde_json::from_value(arguments).map_err(|e| ToolCallError::InvalidArguments {
                tool: GET_CONFERENCES_TOOL.to_string(),
                reason: e.to_string(),
            })?;

        info!(search_query = %args.search_query, "Tool 'get_conferences' called");
        let output = self.client.search(&args.search_query).await;
        info!(
            preview = %output.text().chars().take(100).collect::<String>(),
            "Tool 'get_conferences' finished"
        );

        Ok(output.into())
    }
}
