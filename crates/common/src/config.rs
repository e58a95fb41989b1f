use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfhubError, Result};

/// File name of the tool service binary, resolved next to the host executable
pub const TOOL_BINARY_NAME: &str = "conference-tool-mcp";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub agents: AgentsConfig,
    pub tool: ToolConfig,
    pub conference_api: ConferenceApiConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Gemini API key; usually supplied through `GEMINI_API_KEY`
    pub api_key: Option<String>,
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            request_timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentsConfig {
    pub manager: AgentConfig,
    pub specialist: AgentConfig,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            manager: AgentConfig {
                model: "gemini-2.0-flash".to_string(),
                temperature: 0.3,
            },
            specialist: AgentConfig {
                model: "gemini-2.0-flash".to_string(),
                temperature: 0.1,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub model: String,
    pub temperature: f32,
}

/// How the host reaches the conference tool service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolTransportKind {
    /// Spawn the tool service as a child process and speak JSON-RPC over stdio
    #[default]
    Stdio,
    /// POST JSON-RPC messages to an already running tool service
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub transport: ToolTransportKind,
    /// Executable for the stdio transport; defaults to the binary next to the host
    pub command: Option<PathBuf>,
    pub args: Vec<String>,
    /// Endpoint the host posts to when `transport = "http"`
    pub http_url: String,
    /// Address the tool service binds when it runs in http mode
    pub http_bind: String,
    pub call_timeout_secs: u64,
    pub handshake_timeout_secs: u64,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            transport: ToolTransportKind::Stdio,
            command: None,
            args: Vec::new(),
            http_url: "http://127.0.0.1:8001/mcp".to_string(),
            http_bind: "127.0.0.1:8001".to_string(),
            call_timeout_secs: 60,
            handshake_timeout_secs: 10,
        }
    }
}

impl ToolConfig {
    /// Path of the tool service executable for the stdio transport.
    ///
    /// Falls back to `conference-tool-mcp` in the directory of the running
    /// executable. The path is not checked for existence here.
    pub fn resolve_command(&self) -> Result<PathBuf> {
        if let Some(command) = &self.command {
            return Ok(command.clone());
        }
        let current = std::env::current_exe()?;
        let dir = current
            .parent()
            .ok_or_else(|| ConfhubError::config("executable has no parent directory"))?;
        Ok(dir.join(format!("{}{}", TOOL_BINARY_NAME, std::env::consts::EXE_SUFFIX)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConferenceApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ConferenceApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://confhub.ddns.net/database/api/v1/conference".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// OTLP/HTTP traces endpoint, e.g. `http://localhost:4318/v1/traces`
    pub otlp_endpoint: Option<String>,
    /// Directory for per-process log files of the tool service
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            otlp_endpoint: None,
            log_dir: None,
        }
    }
}

impl SystemConfig {
    /// Parse and validate a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::parse_file(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    /// Load the effective configuration for a process.
    ///
    /// Reads `.env` if present, the TOML file if it exists (defaults
    /// otherwise), then applies environment overrides and validates.
    pub fn load_config(path: impl AsRef<Path>) -> Result<Self> {
        dotenv::dotenv().ok();

        let path = path.as_ref();
        let mut config = if path.exists() {
            Self::parse_file(path)?
        } else {
            tracing::warn!(path = %path.display(), "Config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides_from(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn parse_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfhubError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Apply the environment variables the services understand.
    ///
    /// `lookup` abstracts `std::env::var` so callers can supply any source.
    pub fn apply_env_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("GEMINI_API_KEY").filter(|v| !v.is_empty()) {
            self.llm.api_key = Some(key);
        }
        if let Some(model) = lookup("HOST_AGENT_MODEL_NAME") {
            self.agents.manager.model = model;
        }
        if let Some(model) = lookup("SUB_AGENT_MODEL_NAME") {
            self.agents.specialist.model = model;
        }
        if let Some(url) = lookup("CONFERENCE_API_URL") {
            self.conference_api.base_url = url;
        }
        if let Some(command) = lookup("CONFERENCE_TOOL_COMMAND") {
            self.tool.command = Some(PathBuf::from(command));
        }
        if let Some(url) = lookup("CONFERENCE_TOOL_URL") {
            self.tool.http_url = url;
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, agent) in [
            ("agents.manager", &self.agents.manager),
            ("agents.specialist", &self.agents.specialist),
        ] {
            if !(0.0..=2.0).contains(&agent.temperature) {
                return Err(ConfhubError::validation(format!(
                    "{name}.temperature must be between 0.0 and 2.0, got {}",
                    agent.temperature
                )));
            }
            if agent.model.trim().is_empty() {
                return Err(ConfhubError::validation(format!("{name}.model must not be empty")));
            }
        }

        if self.server.port == 0 {
            return Err(ConfhubError::validation("server.port must be non-zero"));
        }

        let timeouts = [
            ("tool.call_timeout_secs", self.tool.call_timeout_secs),
            ("tool.handshake_timeout_secs", self.tool.handshake_timeout_secs),
            ("llm.request_timeout_secs", self.llm.request_timeout_secs),
            ("conference_api.timeout_secs", self.conference_api.timeout_secs),
        ];
        for (name, value) in timeouts {
            if value == 0 {
                return Err(ConfhubError::validation(format!("{name} must be greater than 0")));
            }
        }

        for (name, url) in [
            ("conference_api.base_url", &self.conference_api.base_url),
            ("tool.http_url", &self.tool.http_url),
            ("llm.base_url", &self.llm.base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfhubError::validation(format!(
                    "{name} must be an http(s) URL, got '{url}'"
                )));
            }
        }

        Ok(())
    }

    /// The LLM key, required only by processes that run agents
    pub fn require_api_key(&self) -> Result<&str> {
        self.llm
            .api_key
            .as_deref()
            .ok_or_else(|| ConfhubError::validation("llm.api_key is not set (export GEMINI_API_KEY)"))
    }
}
