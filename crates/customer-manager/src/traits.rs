//! Agent-callable tool system.
//!
//! A [`Tool`] is a named, described function with an OpenAI
//! function-calling parameter schema. Tools are collected in a
//! [`ToolRegistry`], which is served over HTTP (`GET /tools/list`,
//! `POST /tools/{name}`) and handed to the chat agent.
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │              ToolRegistry                │
//! │  ┌───────────────┐  ┌─────────────────┐  │
//! │  │ Customer CRUD │  │  Custom (Rust)  │  │
//! │  │  (6 builtins) │  │     Tools       │  │
//! │  └───────────────┘  └─────────────────┘  │
//! └──────────┬──────────────────┬────────────┘
//!            ▼                  ▼
//!     POST /tools/{name}   CustomerAgent::chat
//! ```
//!
//! # Usage
//!
//! ```rust
//! use customer_manager::traits::ToolRegistry;
//!
//! let mut tools = ToolRegistry::with_builtins();
//! // tools.register(Box::new(MyTool::new()));
//! assert_eq!(tools.len(), 6);
//! ```

use anyhow::Result;
use async_trait::async_trait;
use customer_manager_core::CustomerStore;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::tools::{
    CreateCustomerTool, DeleteCustomerTool, GetCustomerTool, ListCustomersTool,
    SearchCustomerTool, UpdateCustomerTool,
};

// ═══════════════════════════════════════════════════════════════════════
// Tool Trait
// ═══════════════════════════════════════════════════════════════════════

/// A tool that agents can discover and call.
///
/// # Error contract
///
/// Expected business outcomes (record not found, missing field, invalid
/// id) are part of a successful result: return `Ok(json!({"error": ...}))`.
/// Reserve `Err` for faults the caller cannot fix, such as a failing store.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use anyhow::Result;
/// use serde_json::{json, Value};
/// use customer_manager::traits::{Tool, ToolContext};
///
/// pub struct CountCustomersTool;
///
/// #[async_trait]
/// impl Tool for CountCustomersTool {
///     fn name(&self) -> &str { "count_customers" }
///     fn description(&self) -> &str { "Count all customers" }
///
///     fn parameters_schema(&self) -> Value {
///         json!({ "type": "object", "properties": {} })
///     }
///
///     async fn execute(&self, _params: Value, ctx: &ToolContext) -> Result<Value> {
///         let all = ctx.store().list().await?;
///         Ok(json!({ "count": all.len() }))
///     }
/// }
/// ```
#[async_trait]
pub trait Tool: Send + Sync {
    /// Lowercase identifier with underscores, used as the route path
    /// and as the function name shown to the model.
    fn name(&self) -> &str;

    /// One-line description. The model uses it to decide when to call
    /// the tool.
    fn description(&self) -> &str;

    /// OpenAI function-calling JSON Schema for the parameters object.
    fn parameters_schema(&self) -> Value;

    /// Execute the tool. `params` is always a JSON object (possibly empty).
    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value>;
}

// ═══════════════════════════════════════════════════════════════════════
// ToolContext
// ═══════════════════════════════════════════════════════════════════════

/// Gives tools access to the customer directory.
#[derive(Clone)]
pub struct ToolContext {
    store: Arc<dyn CustomerStore>,
}

impl ToolContext {
    pub fn new(store: Arc<dyn CustomerStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn CustomerStore {
        self.store.as_ref()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════════

/// Serializable tool descriptor for discovery.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Registry for tools (built-in customer tools and custom Rust tools).
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty tool registry.
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Create a registry pre-loaded with the six customer tools.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(ListCustomersTool));
        registry.register(Box::new(GetCustomerTool));
        registry.register(Box::new(SearchCustomerTool));
        registry.register(Box::new(CreateCustomerTool));
        registry.register(Box::new(UpdateCustomerTool));
        registry.register(Box::new(DeleteCustomerTool));
        registry
    }

    /// Register a tool. A later tool with the same name is shadowed by
    /// the earlier one in [`find`](ToolRegistry::find).
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(tool);
    }

    pub fn tools(&self) -> &[Box<dyn Tool>] {
        &self.tools
    }

    pub fn find(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Descriptors for every registered tool, in registration order.
    pub fn infos(&self) -> Vec<ToolInfo> {
        self.tools
            .iter()
            .map(|t| ToolInfo {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters_schema(),
            })
            .collect()
    }

    /// Call a tool and serialize its outcome as text.
    ///
    /// Never fails: an unknown tool, an inline business error, and an
    /// unexpected execution fault all come back as `{"error": "..."}`.
    pub async fn call_text(&self, name: &str, params: Value, ctx: &ToolContext) -> String {
        let outcome = match self.find(name) {
            Some(tool) => tool.execute(params, ctx).await.unwrap_or_else(|e| {
                tracing::error!(tool = name, error = %e, "tool execution failed");
                error_payload(format!("{}: {}", name, e))
            }),
            None => error_payload(format!("no tool registered with name: {}", name)),
        };
        serde_json::to_string(&outcome)
            .unwrap_or_else(|_| r#"{"error":"unserializable result"}"#.to_string())
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The inline error payload of the tool-call contract.
pub fn error_payload(message: impl std::fmt::Display) -> Value {
    serde_json::json!({ "error": message.to_string() })
}
