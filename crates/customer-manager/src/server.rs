//! HTTP server for the customer directory.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`    | `/health` | Health check |
//! | `GET`    | `/api/customers` | List all customers |
//! | `POST`   | `/api/customers` | Create a customer (`201` + `Location`) |
//! | `GET`    | `/api/customers/search?name=` | First customer whose name matches |
//! | `GET`    | `/api/customers/{id}` | Get one customer |
//! | `PUT`    | `/api/customers/{id}` | Replace name and email |
//! | `DELETE` | `/api/customers/{id}` | Delete (`204`) |
//! | `GET`    | `/tools/list` | Registered tools with schemas |
//! | `POST`   | `/tools/{name}` | Call a tool by name |
//! | `POST`   | `/api/chat` | Ask the customer assistant |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "Customer with ID 9 not found" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404),
//! `agent_not_configured` (400), `agent_error` (500), `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use customer_manager_core::error::{validate_id, validate_query};
use customer_manager_core::{Customer, CustomerError, CustomerInput, CustomerStore, ErrorKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::agents::{ChatReply, CustomerAgent};
use crate::config::Config;
use crate::traits::{ToolContext, ToolInfo, ToolRegistry};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn CustomerStore>,
    tools: Arc<ToolRegistry>,
    agent: Option<Arc<CustomerAgent>>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn CustomerStore>,
        tools: ToolRegistry,
        agent: Option<CustomerAgent>,
    ) -> Self {
        Self {
            store,
            tools: Arc::new(tools),
            agent: agent.map(Arc::new),
        }
    }

    /// Build the state for a fresh process: a store (seeded unless
    /// `[seed].enabled = false`), the built-in tools, and the agent when a
    /// credential is available.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let store = config.seed.build_store();
        let agent = CustomerAgent::from_config(&config.agent)?;
        Ok(Self::new(
            Arc::new(store),
            ToolRegistry::with_builtins(),
            agent,
        ))
    }

    fn tool_context(&self) -> ToolContext {
        ToolContext::new(self.store.clone())
    }
}

/// Assemble the router with CORS and request tracing.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route(
            "/api/customers",
            get(handle_list_customers).post(handle_create_customer),
        )
        .route("/api/customers/search", get(handle_search_customer))
        .route(
            "/api/customers/{id}",
            get(handle_get_customer)
                .put(handle_update_customer)
                .delete(handle_delete_customer),
        )
        .route("/api/chat", post(handle_chat))
        .route("/tools/list", get(handle_list_tools))
        .route("/tools/{name}", post(handle_tool_call))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind to `[server].bind` and serve until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let state = AppState::from_config(config)?;
    let tool_count = state.tools.len();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(
        bind = %config.server.bind,
        tools = tool_count,
        "customer manager listening"
    );
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<CustomerError> for AppError {
    fn from(err: CustomerError) -> Self {
        match err.kind() {
            ErrorKind::InvalidInput => bad_request(err.to_string()),
            ErrorKind::NotFound => not_found(err.to_string()),
        }
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found",
        message: message.into(),
    }
}

/// Unexpected fault behind the API. Logged here; the caller only sees a
/// generic message.
fn internal(context: &str, err: anyhow::Error) -> AppError {
    tracing::error!(error = %err, "{}", context);
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal",
        message: format!("{} failed", context),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
    timestamp: DateTime<Utc>,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "Healthy",
        message: "Customer Manager API is running",
        timestamp: Utc::now(),
    })
}

// ============ /api/customers ============

async fn handle_list_customers(
    State(state): State<AppState>,
) -> Result<Json<Vec<Customer>>, AppError> {
    let customers = state
        .store
        .list()
        .await
        .map_err(|e| internal("list customers", e))?;
    Ok(Json(customers))
}

async fn handle_get_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Customer>, AppError> {
    let id = validate_id(id)?;
    let customer = state
        .store
        .get(id)
        .await
        .map_err(|e| internal("get customer", e))?
        .ok_or(CustomerError::NotFoundById(id))?;
    Ok(Json(customer))
}

#[derive(Deserialize)]
struct SearchQuery {
    name: Option<String>,
}

async fn handle_search_customer(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Customer>, AppError> {
    let name = validate_query(query.name.as_deref())?;
    let customer = state
        .store
        .search_by_name(name)
        .await
        .map_err(|e| internal("search customers", e))?
        .ok_or_else(|| CustomerError::NotFoundByName(name.to_string()))?;
    Ok(Json(customer))
}

async fn handle_create_customer(
    State(state): State<AppState>,
    Json(input): Json<CustomerInput>,
) -> Result<Response, AppError> {
    let new = input.validate()?;
    let created = state
        .store
        .create(new)
        .await
        .map_err(|e| internal("create customer", e))?;

    tracing::info!(id = created.id, "customer created");
    let location = format!("/api/customers/{}", created.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(created),
    )
        .into_response())
}

async fn handle_update_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<CustomerInput>,
) -> Result<Json<Customer>, AppError> {
    let id = validate_id(id)?;
    let changes = input.validate()?;
    let updated = state
        .store
        .update(id, changes)
        .await
        .map_err(|e| internal("update customer", e))?
        .ok_or(CustomerError::NotFoundById(id))?;
    Ok(Json(updated))
}

async fn handle_delete_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let id = validate_id(id)?;
    let removed = state
        .store
        .delete(id)
        .await
        .map_err(|e| internal("delete customer", e))?;
    if !removed {
        return Err(CustomerError::NotFoundById(id).into());
    }
    tracing::info!(id = id, "customer deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ============ POST /api/chat ============

#[derive(Deserialize)]
struct ChatRequest {
    message: Option<String>,
}

async fn handle_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatReply>, AppError> {
    let message = match request.message.as_deref().map(str::trim) {
        Some(m) if !m.is_empty() => m.to_string(),
        _ => return Err(bad_request("message is required")),
    };

    let agent = state.agent.as_ref().ok_or_else(|| AppError {
        status: StatusCode::BAD_REQUEST,
        code: "agent_not_configured",
        message: "Chat agent is not configured. Set the API key environment variable \
                  named by [agent].api_key_env and restart the server."
            .to_string(),
    })?;

    let ctx = state.tool_context();
    match agent.chat(&message, &state.tools, &ctx).await {
        Ok(reply) => Ok(Json(reply)),
        Err(e) => {
            tracing::error!(
                agent = agent.name(),
                model = agent.model(),
                error = %e,
                "chat failed"
            );
            Err(AppError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: "agent_error",
                message: format!("The assistant could not answer: {}", e),
            })
        }
    }
}

// ============ GET /tools/list ============

#[derive(Serialize)]
struct ToolListResponse {
    tools: Vec<ToolInfo>,
}

async fn handle_list_tools(State(state): State<AppState>) -> Json<ToolListResponse> {
    Json(ToolListResponse {
        tools: state.tools.infos(),
    })
}

// ============ POST /tools/{name} ============

/// Business failures come back inside `result` as `{"error": ...}`, the
/// same payload an agent would see. Only an unknown tool (404), a
/// non-object body (400) and execution faults (500) change the status.
async fn handle_tool_call(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(params): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let tool = state
        .tools
        .find(&name)
        .ok_or_else(|| not_found(format!("no tool registered with name: {}", name)))?;

    let params = match params {
        Value::Null => Value::Object(serde_json::Map::new()),
        Value::Object(_) => params,
        _ => return Err(bad_request("tool parameters must be a JSON object")),
    };

    let result = tool
        .execute(params, &state.tool_context())
        .await
        .map_err(|e| internal(&format!("tool {}", name), e))?;

    Ok(Json(serde_json::json!({ "result": result })))
}
