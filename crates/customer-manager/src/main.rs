//! # Customer Manager CLI (`custmgr`)
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `custmgr serve` | Start the HTTP server |
//! | `custmgr tool list` | List the registered customer tools |
//! | `custmgr tool call <name>` | Run one tool against a fresh directory |
//! | `custmgr chat "<message>"` | Ask the customer assistant once |
//!
//! ## Examples
//!
//! ```bash
//! custmgr serve --bind 0.0.0.0:8080
//! custmgr tool call update_customer --param id=2 --param name="Jane Roe" --param email=jr@x.com
//! custmgr --config ./custmgr.toml chat "Add Ann Lee, ann@x.com"
//! ```
//!
//! Logs go to stderr and are filtered with `RUST_LOG` (default `info`).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use customer_manager::config::{self, Config};
use customer_manager::{server, CustomerAgent, ToolContext, ToolRegistry};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Customer Manager: an in-memory customer directory with an HTTP API,
/// agent-callable tools and a chat assistant.
#[derive(Parser)]
#[command(name = "custmgr", version)]
struct Cli {
    /// Path to configuration file (TOML). Built-in defaults are used when
    /// omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    Serve {
        /// Override `[server].bind`.
        #[arg(long)]
        bind: Option<String>,
    },
    /// Inspect and call the customer tools.
    Tool {
        #[command(subcommand)]
        action: ToolAction,
    },
    /// Send one message to the customer assistant and print the reply.
    Chat {
        message: String,
    },
}

#[derive(Subcommand)]
enum ToolAction {
    /// List registered tools.
    List,
    /// Call a tool against a freshly created directory and print the payload.
    Call {
        /// Tool name (e.g. `get_customer`).
        name: String,
        /// Tool parameters as `key=value` pairs. String fields are passed
        /// as-is; other values are parsed as JSON when possible.
        #[arg(long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,
    },
}

/// Parse a `key=value` pair for `--param` arguments.
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no '=' found in '{}'", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

/// Build the tool's parameter object. Fields the schema declares as
/// `string` are kept verbatim; any other value is read as JSON when it
/// parses, so `id=2` becomes a number while `name=2024` stays a string.
fn params_object(params: Vec<(String, String)>, schema: &Value) -> Value {
    let map: Map<String, Value> = params
        .into_iter()
        .map(|(k, v)| {
            let value = if schema["properties"][k.as_str()]["type"] == "string" {
                Value::String(v)
            } else {
                serde_json::from_str(&v).unwrap_or(Value::String(v))
            };
            (k, value)
        })
        .collect();
    Value::Object(map)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut cfg = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                cfg.server.bind = bind;
                cfg.validate()?;
            }
            server::run_server(&cfg).await?;
        }
        Commands::Tool { action } => match action {
            ToolAction::List => {
                let registry = ToolRegistry::with_builtins();
                println!("{} tools:", registry.len());
                for info in registry.infos() {
                    println!("  {:<18} {}", info.name, info.description);
                }
            }
            ToolAction::Call { name, params } => {
                let registry = ToolRegistry::with_builtins();
                let schema = registry
                    .find(&name)
                    .with_context(|| format!("no tool registered with name: {}", name))?
                    .parameters_schema();
                let ctx = ToolContext::new(Arc::new(cfg.seed.build_store()));
                let output = registry
                    .call_text(&name, params_object(params, &schema), &ctx)
                    .await;
                println!("{}", output);
            }
        },
        Commands::Chat { message } => {
            let agent = CustomerAgent::from_config(&cfg.agent)?.with_context(|| {
                format!(
                    "chat agent is not configured: set the {} environment variable",
                    cfg.agent.api_key_env
                )
            })?;
            let ctx = ToolContext::new(Arc::new(cfg.seed.build_store()));
            let reply = agent
                .chat(&message, &ToolRegistry::with_builtins(), &ctx)
                .await?;
            if !reply.tool_calls.is_empty() {
                tracing::info!(tools = ?reply.tool_calls, "tools used");
            }
            println!("{}", reply.reply);
        }
    }

    Ok(())
}
