//! Storage abstraction for Customer Manager.
//!
//! The [`CustomerStore`] trait is the only way to read or mutate customer
//! records. Adapters hold an `Arc<dyn CustomerStore>` and never touch the
//! underlying collection, which keeps a persistent backend swappable
//! without changing any caller.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Customer, NewCustomer};

/// Abstract customer directory.
///
/// Absence is not an error: lookups return `Ok(None)` and deletes return
/// `Ok(false)` when no record matches. `Err` is reserved for backend faults.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`list`](CustomerStore::list) | All records in insertion order |
/// | [`get`](CustomerStore::get) | Lookup by id |
/// | [`search_by_name`](CustomerStore::search_by_name) | First case-insensitive substring match |
/// | [`create`](CustomerStore::create) | Append with the next id and current timestamp |
/// | [`update`](CustomerStore::update) | Overwrite name and email in place |
/// | [`delete`](CustomerStore::delete) | Remove by id |
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Snapshot of every record, in insertion order.
    async fn list(&self) -> Result<Vec<Customer>>;

    /// Record with the given id. Non-positive ids simply match nothing.
    async fn get(&self, id: i64) -> Result<Option<Customer>>;

    /// First record (in insertion order) whose name contains `name`,
    /// ignoring case. A blank query matches nothing.
    async fn search_by_name(&self, name: &str) -> Result<Option<Customer>>;

    /// Insert a record with id `max(id) + 1` (or `1` when empty).
    async fn create(&self, customer: NewCustomer) -> Result<Customer>;

    /// Replace name and email of an existing record; `id` and
    /// `created_at` are preserved.
    async fn update(&self, id: i64, changes: NewCustomer) -> Result<Option<Customer>>;

    /// Remove a record. Returns whether anything was removed.
    async fn delete(&self, id: i64) -> Result<bool>;
}
