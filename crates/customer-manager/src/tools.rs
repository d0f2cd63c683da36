//! The six built-in customer tools.
//!
//! Each tool validates its own parameters with the core validation
//! contract and reports invalid input or absence as an inline
//! `{"error": "..."}` payload, so an agent can read the failure and
//! recover instead of receiving a transport error.
//!
//! | Tool | Parameters | Result |
//! |------|------------|--------|
//! | `list_customers` | — | array of customers |
//! | `get_customer` | `id` | customer |
//! | `search_customer` | `name` | first matching customer |
//! | `create_customer` | `name`, `email` | created customer |
//! | `update_customer` | `id`, `name`, `email` | updated customer |
//! | `delete_customer` | `id` | `{"deleted": true, "id": ...}` |

use anyhow::Result;
use async_trait::async_trait;
use customer_manager_core::error::{validate_id, validate_query};
use customer_manager_core::{CustomerError, CustomerInput};
use serde_json::{json, Value};

use crate::traits::{error_payload, Tool, ToolContext};

/// Read an id parameter. Models occasionally send numbers as strings,
/// so a numeric string is accepted too.
fn id_param(params: &Value) -> Result<i64, CustomerError> {
    let raw = match &params["id"] {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    validate_id(raw.ok_or(CustomerError::InvalidId)?)
}

fn str_param(params: &Value, key: &str) -> Option<String> {
    params[key].as_str().map(str::to_string)
}

fn input_params(params: &Value) -> CustomerInput {
    CustomerInput {
        name: str_param(params, "name"),
        email: str_param(params, "email"),
    }
}

fn id_schema() -> Value {
    json!({ "type": "integer", "description": "Customer ID (positive integer)" })
}

pub struct ListCustomersTool;

#[async_trait]
impl Tool for ListCustomersTool {
    fn name(&self) -> &str {
        "list_customers"
    }

    fn description(&self) -> &str {
        "List every customer in the directory"
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _params: Value, ctx: &ToolContext) -> Result<Value> {
        let customers = ctx.store().list().await?;
        Ok(serde_json::to_value(customers)?)
    }
}

pub struct GetCustomerTool;

#[async_trait]
impl Tool for GetCustomerTool {
    fn name(&self) -> &str {
        "get_customer"
    }

    fn description(&self) -> &str {
        "Get a single customer by ID"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "id": id_schema() },
            "required": ["id"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value> {
        let id = match id_param(&params) {
            Ok(id) => id,
            Err(e) => return Ok(error_payload(e)),
        };
        match ctx.store().get(id).await? {
            Some(customer) => Ok(serde_json::to_value(customer)?),
            None => Ok(error_payload(CustomerError::NotFoundById(id))),
        }
    }
}

pub struct SearchCustomerTool;

#[async_trait]
impl Tool for SearchCustomerTool {
    fn name(&self) -> &str {
        "search_customer"
    }

    fn description(&self) -> &str {
        "Find the first customer whose name contains the given text (case-insensitive)"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "Full or partial customer name" }
            },
            "required": ["name"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value> {
        let name = match validate_query(params["name"].as_str()) {
            Ok(name) => name,
            Err(e) => return Ok(error_payload(e)),
        };
        match ctx.store().search_by_name(name).await? {
            Some(customer) => Ok(serde_json::to_value(customer)?),
            None => Ok(error_payload(CustomerError::NotFoundByName(name.to_string()))),
        }
    }
}

pub struct CreateCustomerTool;

#[async_trait]
impl Tool for CreateCustomerTool {
    fn name(&self) -> &str {
        "create_customer"
    }

    fn description(&self) -> &str {
        "Create a new customer with a name and email address"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "Customer name" },
                "email": { "type": "string", "description": "Customer email address" }
            },
            "required": ["name", "email"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value> {
        let new = match input_params(&params).validate() {
            Ok(new) => new,
            Err(e) => return Ok(error_payload(e)),
        };
        let created = ctx.store().create(new).await?;
        tracing::info!(id = created.id, "customer created via tool");
        Ok(serde_json::to_value(created)?)
    }
}

pub struct UpdateCustomerTool;

#[async_trait]
impl Tool for UpdateCustomerTool {
    fn name(&self) -> &str {
        "update_customer"
    }

    fn description(&self) -> &str {
        "Replace the name and email of an existing customer"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "id": id_schema(),
                "name": { "type": "string", "description": "New customer name" },
                "email": { "type": "string", "description": "New customer email address" }
            },
            "required": ["id", "name", "email"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value> {
        let validated = id_param(&params)
            .and_then(|id| input_params(&params).validate().map(|changes| (id, changes)));
        let (id, changes) = match validated {
            Ok(v) => v,
            Err(e) => return Ok(error_payload(e)),
        };
        match ctx.store().update(id, changes).await? {
            Some(customer) => Ok(serde_json::to_value(customer)?),
            None => Ok(error_payload(CustomerError::NotFoundById(id))),
        }
    }
}

pub struct DeleteCustomerTool;

#[async_trait]
impl Tool for DeleteCustomerTool {
    fn name(&self) -> &str {
        "delete_customer"
    }

    fn description(&self) -> &str {
        "Delete a customer by ID"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "id": id_schema() },
            "required": ["id"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value> {
        let id = match id_param(&params) {
            Ok(id) => id,
            Err(e) => return Ok(error_payload(e)),
        };
        if ctx.store().delete(id).await? {
            tracing::info!(id = id, "customer deleted via tool");
            Ok(json!({ "deleted": true, "id": id }))
        } else {
            Ok(error_payload(CustomerError::NotFoundById(id)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use customer_manager_core::InMemoryStore;
    use std::sync::Arc;

    fn ctx() -> ToolContext {
        ToolContext::new(Arc::new(InMemoryStore::seeded()))
    }

    #[tokio::test]
    async fn test_list_returns_all_seeded() {
        let result = ListCustomersTool.execute(json!({}), &ctx()).await.unwrap();
        let arr = result.as_array().unwrap();
        assert_eq!(arr.len(), 3);
        assert_eq!(arr[0]["name"], "John Doe");
    }

    #[tokio::test]
    async fn test_get_inline_errors() {
        let ctx = ctx();
        let missing = GetCustomerTool.execute(json!({ "id": 9 }), &ctx).await.unwrap();
        assert_eq!(missing["error"], "Customer with ID 9 not found");

        let invalid = GetCustomerTool.execute(json!({ "id": 0 }), &ctx).await.unwrap();
        assert_eq!(invalid["error"], "Invalid customer ID");

        let absent = GetCustomerTool.execute(json!({}), &ctx).await.unwrap();
        assert_eq!(absent["error"], "Invalid customer ID");
    }

    #[tokio::test]
    async fn test_get_accepts_numeric_string() {
        let result = GetCustomerTool
            .execute(json!({ "id": "2" }), &ctx())
            .await
            .unwrap();
        assert_eq!(result["name"], "Jane Smith");
    }

    #[tokio::test]
    async fn test_search() {
        let ctx = ctx();
        let found = SearchCustomerTool
            .execute(json!({ "name": "WILSON" }), &ctx)
            .await
            .unwrap();
        assert_eq!(found["id"], 3);

        let missing = SearchCustomerTool
            .execute(json!({ "name": "zzz" }), &ctx)
            .await
            .unwrap();
        assert_eq!(missing["error"], "Customer 'zzz' not found");

        let blank = SearchCustomerTool
            .execute(json!({ "name": " " }), &ctx)
            .await
            .unwrap();
        assert_eq!(blank["error"], "Customer name is required");
    }

    #[tokio::test]
    async fn test_create_then_update_then_delete() {
        let ctx = ctx();
        let created = CreateCustomerTool
            .execute(json!({ "name": "Ann Lee", "email": "ann@x.com" }), &ctx)
            .await
            .unwrap();
        assert_eq!(created["id"], 4);

        let updated = UpdateCustomerTool
            .execute(
                json!({ "id": 4, "name": "Ann Kim", "email": "ann@kim.com" }),
                &ctx,
            )
            .await
            .unwrap();
        assert_eq!(updated["name"], "Ann Kim");
        assert_eq!(updated["createdAt"], created["createdAt"]);

        let deleted = DeleteCustomerTool
            .execute(json!({ "id": 4 }), &ctx)
            .await
            .unwrap();
        assert_eq!(deleted, json!({ "deleted": true, "id": 4 }));

        let again = DeleteCustomerTool
            .execute(json!({ "id": 4 }), &ctx)
            .await
            .unwrap();
        assert_eq!(again["error"], "Customer with ID 4 not found");
    }

    #[tokio::test]
    async fn test_create_requires_fields() {
        let ctx = ctx();
        let result = CreateCustomerTool
            .execute(json!({ "name": "Ann" }), &ctx)
            .await
            .unwrap();
        assert_eq!(result["error"], "Name and email are required");
        assert_eq!(ctx.store().list().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_update_validation_order() {
        let ctx = ctx();
        let bad_id = UpdateCustomerTool
            .execute(json!({ "id": -1, "name": "", "email": "" }), &ctx)
            .await
            .unwrap();
        assert_eq!(bad_id["error"], "Invalid customer ID");

        let missing = UpdateCustomerTool
            .execute(json!({ "id": 77, "name": "X", "email": "x@x.com" }), &ctx)
            .await
            .unwrap();
        assert_eq!(missing["error"], "Customer with ID 77 not found");
    }
}
