//! # Customer Manager
//!
//! **An in-memory customer directory served over HTTP and to AI agents.**
//!
//! The directory itself (model, validation, store) lives in
//! `customer-manager-core`. This crate wraps it in two adapters that share
//! one store:
//!
//! ```text
//!                 ┌──────────────────────┐
//!                 │   CustomerStore      │
//!                 │  (InMemoryStore)     │
//!                 └─────────┬────────────┘
//!                ┌──────────┴──────────┐
//!                ▼                     ▼
//!        ┌──────────────┐     ┌────────────────┐
//!        │ REST handlers│     │  ToolRegistry  │◀── CustomerAgent
//!        │ /api/...     │     │  /tools/...    │    (/api/chat)
//!        └──────────────┘     └────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! custmgr serve                                  # HTTP on 127.0.0.1:5080
//! custmgr tool list
//! custmgr tool call search_customer --param name=jane
//! OPENAI_API_KEY=... custmgr chat "Who is customer 2?"
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`traits`] | `Tool` trait, `ToolContext`, `ToolRegistry` |
//! | [`tools`] | The six built-in customer tools |
//! | [`llm`] | Chat-completions wire types and the OpenAI-compatible client |
//! | [`agents`] | `CustomerAgent`: tool-calling chat loop |
//! | [`server`] | axum HTTP server |

pub mod agents;
pub mod config;
pub mod llm;
pub mod server;
pub mod tools;
pub mod traits;

pub use agents::{ChatReply, CustomerAgent};
pub use config::{load_config, Config};
pub use server::{build_router, run_server, AppState};
pub use traits::{Tool, ToolContext, ToolRegistry};
