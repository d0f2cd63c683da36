//! TOML configuration.
//!
//! Every section is optional; a missing file section falls back to the
//! defaults below, and [`Config::default`] is used when no config file is
//! given at all.
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:5080"
//!
//! [seed]
//! enabled = true
//!
//! [agent]
//! model = "gpt-4o-mini"
//! base_url = "https://api.openai.com/v1"
//! api_key_env = "OPENAI_API_KEY"
//! max_tool_rounds = 5
//! ```

use anyhow::{Context, Result};
use customer_manager_core::InMemoryStore;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub seed: SeedConfig,
    #[serde(default)]
    pub agent: AgentConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:5080".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct SeedConfig {
    /// Load the three example customers at startup.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl SeedConfig {
    /// A fresh directory: the example customers when seeding is enabled,
    /// otherwise empty.
    pub fn build_store(&self) -> InMemoryStore {
        if self.enabled {
            InMemoryStore::seeded()
        } else {
            InMemoryStore::new()
        }
    }
}

fn default_true() -> bool {
    true
}

/// Chat agent settings. The agent is only active when the environment
/// variable named by `api_key_env` holds a non-blank credential.
#[derive(Debug, Deserialize, Clone)]
pub struct AgentConfig {
    #[serde(default = "default_agent_name")]
    pub name: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: usize,
    #[serde(default = "default_instructions")]
    pub instructions: String,
    /// Tool names the agent may call. Empty means every registered tool.
    #[serde(default)]
    pub tools: Vec<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            model: default_model(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            max_tool_rounds: default_max_tool_rounds(),
            instructions: default_instructions(),
            tools: Vec::new(),
        }
    }
}

fn default_agent_name() -> String {
    "customer-assistant".to_string()
}
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    2
}
fn default_max_tool_rounds() -> usize {
    5
}
fn default_instructions() -> String {
    "You are a customer management assistant. Use the available tools to list, \
     look up, search, create, update and delete customers. Always confirm what \
     you changed, and say so plainly when a customer cannot be found."
        .to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    config.validate()?;
    Ok(config)
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        self.server
            .bind
            .parse::<SocketAddr>()
            .with_context(|| format!("server.bind is not a socket address: '{}'", self.server.bind))?;

        if self.agent.model.trim().is_empty() {
            anyhow::bail!("agent.model must not be empty");
        }
        if self.agent.max_tool_rounds == 0 {
            anyhow::bail!("agent.max_tool_rounds must be >= 1");
        }
        if self.agent.timeout_secs == 0 {
            anyhow::bail!("agent.timeout_secs must be > 0");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(tmp: &TempDir, content: &str) -> std::path::PathBuf {
        let path = tmp.path().join("custmgr.toml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let cfg = load_config(&write_config(&tmp, "")).unwrap();
        assert_eq!(cfg.server.bind, "127.0.0.1:5080");
        assert!(cfg.seed.enabled);
        assert_eq!(cfg.agent.api_key_env, "OPENAI_API_KEY");
        assert_eq!(cfg.agent.max_tool_rounds, 5);
        assert!(cfg.agent.tools.is_empty());
    }

    #[test]
    fn test_overrides() {
        let tmp = TempDir::new().unwrap();
        let cfg = load_config(&write_config(
            &tmp,
            r#"
[server]
bind = "0.0.0.0:9000"

[seed]
enabled = false

[agent]
model = "gpt-4.1"
tools = ["get_customer", "search_customer"]
"#,
        ))
        .unwrap();
        assert_eq!(cfg.server.bind, "0.0.0.0:9000");
        assert!(!cfg.seed.enabled);
        assert_eq!(cfg.agent.model, "gpt-4.1");
        assert_eq!(cfg.agent.tools.len(), 2);
        assert_eq!(cfg.agent.base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn test_rejects_bad_bind() {
        let tmp = TempDir::new().unwrap();
        let err = load_config(&write_config(&tmp, "[server]\nbind = \"nowhere\"\n")).unwrap_err();
        assert!(err.to_string().contains("server.bind"));
    }

    #[test]
    fn test_rejects_zero_rounds() {
        let tmp = TempDir::new().unwrap();
        let err =
            load_config(&write_config(&tmp, "[agent]\nmax_tool_rounds = 0\n")).unwrap_err();
        assert!(err.to_string().contains("max_tool_rounds"));
    }

    #[test]
    fn test_missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = load_config(&tmp.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_seed_flag_controls_store() {
        let seeded = SeedConfig { enabled: true }.build_store();
        assert_eq!(seeded.len().unwrap(), 3);
        let empty = SeedConfig { enabled: false }.build_store();
        assert!(empty.is_empty().unwrap());
    }

    #[test]
    fn test_default_validates() {
        Config::default().validate().unwrap();
    }
}
