use confhub_common::config::{SystemConfig, ToolTransportKind};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_config_load_from_toml() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("test_config.toml");

    let config_content = r#"
[server]
host = "127.0.0.1"
port = 8080

[llm]
api_key = "test-key"

[agents.manager]
model = "gemini-2.0-flash"
temperature = 0.3

[agents.specialist]
model = "gemini-2.0-flash-lite"
temperature = 0.1

[tool]
transport = "http"
http_url = "http://127.0.0.1:8001/mcp"
call_timeout_secs = 30

[conference_api]
base_url = "http://localhost:3000/conference"
"#;

    fs::write(&config_path, config_content).unwrap();

    let config = SystemConfig::from_file(&config_path).unwrap();

    assert_eq!(config.server.port, 8080);
    assert_eq!(config.require_api_key().unwrap(), "test-key");
    assert_eq!(config.agents.specialist.model, "gemini-2.0-flash-lite");
    assert_eq!(config.tool.transport, ToolTransportKind::Http);
    assert_eq!(config.tool.call_timeout_secs, 30);
    // untouched sections keep their defaults
    assert_eq!(config.tool.handshake_timeout_secs, 10);
    assert_eq!(config.conference_api.timeout_secs, 30);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_config_validation_invalid_temperature() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("invalid_temp.toml");

    let config_content = r#"
[agents.manager]
model = "gemini-2.0-flash"
temperature = 3.0

[agents.specialist]
model = "gemini-2.0-flash"
temperature = 0.1
"#;

    fs::write(&config_path, config_content).unwrap();

    let result = SystemConfig::from_file(&config_path);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("temperature"));
}

#[test]
fn test_config_validation_zero_timeout() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("zero_timeout.toml");

    fs::write(&config_path, "[tool]\ncall_timeout_secs = 0\n").unwrap();

    let result = SystemConfig::from_file(&config_path);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("call_timeout_secs"));
}

#[test]
fn test_config_validation_bad_url() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("bad_url.toml");

    fs::write(&config_path, "[conference_api]\nbase_url = \"ftp://example.com\"\n").unwrap();

    let result = SystemConfig::from_file(&config_path);
    assert!(result.unwrap_err().to_string().contains("conference_api.base_url"));
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config = SystemConfig::load_config(temp_dir.path().join("absent.toml")).unwrap();
    assert_eq!(config.server.port, 8000);
    assert_eq!(config.tool.call_timeout_secs, 60);
}

#[test]
fn test_malformed_toml_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("broken.toml");
    fs::write(&config_path, "[server\nport = ").unwrap();

    assert!(SystemConfig::from_file(&config_path).is_err());
}
