//! Customer assistant agent.
//!
//! The agent is a persona (instructions plus a scoped tool list) bound to
//! a [`ChatClient`]. A chat turn runs the usual tool-calling loop:
//!
//! ```text
//!  user message ──▶ model ──▶ tool calls? ──no──▶ reply
//!                     ▲            │yes
//!                     │            ▼
//!                     └── tool results (ToolRegistry::call_text)
//! ```
//!
//! Tool results are always text: either the serialized customer data or an
//! inline `{"error": ...}` payload. The model sees failures the same way
//! it sees data and can explain them to the user.
//!
//! # Configuration
//!
//! The agent exists only when a credential is available (see
//! [`CustomerAgent::from_config`]). Without one the server keeps running
//! and `POST /api/chat` answers `400 agent_not_configured`.

use anyhow::{bail, Result};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::config::AgentConfig;
use crate::llm::{ChatClient, ChatMessage, OpenAiChatClient, ToolDefinition};
use crate::traits::{error_payload, ToolContext, ToolRegistry};

/// Final answer of one chat turn.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub reply: String,
    /// Names of the tools called while producing the reply, in call order.
    pub tool_calls: Vec<String>,
}

pub struct CustomerAgent {
    name: String,
    instructions: String,
    tools: Vec<String>,
    client: Arc<dyn ChatClient>,
    max_tool_rounds: usize,
}

impl CustomerAgent {
    /// Create an agent. An empty `tools` list grants every registered tool.
    pub fn new(
        name: String,
        instructions: String,
        tools: Vec<String>,
        client: Arc<dyn ChatClient>,
        max_tool_rounds: usize,
    ) -> Self {
        Self {
            name,
            instructions,
            tools,
            client,
            max_tool_rounds,
        }
    }

    /// Build the agent from configuration.
    ///
    /// Returns `Ok(None)` when the environment variable named by
    /// `api_key_env` is unset or blank.
    pub fn from_config(config: &AgentConfig) -> Result<Option<Self>> {
        let api_key = match std::env::var(&config.api_key_env) {
            Ok(key) if !key.trim().is_empty() => key,
            _ => {
                tracing::warn!(
                    env = %config.api_key_env,
                    "no agent credential found; chat endpoint disabled"
                );
                return Ok(None);
            }
        };

        let client = OpenAiChatClient::new(config, api_key)?;
        tracing::info!(agent = %config.name, model = %config.model, "chat agent configured");

        Ok(Some(Self::new(
            config.name.clone(),
            config.instructions.clone(),
            config.tools.clone(),
            Arc::new(client),
            config.max_tool_rounds,
        )))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }

    fn allows(&self, tool: &str) -> bool {
        self.tools.is_empty() || self.tools.iter().any(|t| t == tool)
    }

    /// Definitions of the registered tools this agent may call.
    pub fn tool_definitions(&self, registry: &ToolRegistry) -> Vec<ToolDefinition> {
        registry
            .infos()
            .into_iter()
            .filter(|info| self.allows(&info.name))
            .map(ToolDefinition::from)
            .collect()
    }

    /// Answer one user message, calling tools as the model requests.
    ///
    /// Fails when the backend fails or the model still asks for tools
    /// after `max_tool_rounds` rounds.
    pub async fn chat(
        &self,
        message: &str,
        registry: &ToolRegistry,
        ctx: &ToolContext,
    ) -> Result<ChatReply> {
        let definitions = self.tool_definitions(registry);
        let mut messages = vec![
            ChatMessage::system(self.instructions.as_str()),
            ChatMessage::user(message),
        ];
        let mut called = Vec::new();

        for round in 0..=self.max_tool_rounds {
            let reply = self.client.complete(&messages, &definitions).await?;

            if reply.tool_calls.is_empty() {
                return Ok(ChatReply {
                    reply: reply.content.unwrap_or_default(),
                    tool_calls: called,
                });
            }
            if round == self.max_tool_rounds {
                break;
            }

            let calls = reply.tool_calls.clone();
            messages.push(reply);

            for call in calls {
                let name = call.function.name;
                let output = if self.allows(&name) {
                    match parse_arguments(&call.function.arguments) {
                        Some(params) => registry.call_text(&name, params, ctx).await,
                        None => error_payload(format!("invalid arguments for tool '{}'", name))
                            .to_string(),
                    }
                } else {
                    error_payload(format!("tool '{}' is not available to this agent", name))
                        .to_string()
                };
                tracing::debug!(agent = %self.name, tool = %name, round, "tool call answered");
                messages.push(ChatMessage::tool(call.id, output));
                called.push(name);
            }
        }

        bail!(
            "agent '{}' did not finish within {} tool rounds",
            self.name,
            self.max_tool_rounds
        )
    }
}

/// Decode model-produced arguments. Blank means no arguments.
fn parse_arguments(raw: &str) -> Option<Value> {
    if raw.trim().is_empty() {
        return Some(Value::Object(serde_json::Map::new()));
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(v) if v.is_object() => Some(v),
        _ => None,
    }
}
