//! In-memory [`CustomerStore`] implementation.
//!
//! Holds the records in a `Vec` behind `std::sync::RwLock`. Reads share the
//! lock; `create`, `update` and `delete` take it exclusively, so computing
//! the next id and appending the record happen atomically.
//!
//! Ids follow the `max + 1` rule. Deleting the highest id and creating a new
//! record therefore hands the same id out again.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;

use crate::models::{seed_customers, Customer, NewCustomer};

use super::CustomerStore;

/// Process-lifetime customer directory.
pub struct InMemoryStore {
    customers: RwLock<Vec<Customer>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::with_customers(Vec::new())
    }

    /// Create a store holding `customers` in the given order.
    pub fn with_customers(customers: Vec<Customer>) -> Self {
        Self {
            customers: RwLock::new(customers),
        }
    }

    /// Create a store holding the three example records, stamped now.
    pub fn seeded() -> Self {
        Self::with_customers(seed_customers(Utc::now()))
    }

    /// Number of records currently held.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<Customer>>> {
        self.customers
            .read()
            .map_err(|_| anyhow::anyhow!("customer store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<Customer>>> {
        self.customers
            .write()
            .map_err(|_| anyhow::anyhow!("customer store lock poisoned"))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn next_id(customers: &[Customer]) -> Result<i64> {
    match customers.iter().map(|c| c.id).max() {
        None => Ok(1),
        Some(max) => max
            .checked_add(1)
            .ok_or_else(|| anyhow::anyhow!("customer id space exhausted")),
    }
}

/// Simple per-character lowercase fold. Unlike `str::to_lowercase` it has
/// no context rules (final sigma), so a substring folds the same way on
/// its own as inside a longer name.
fn fold_case(s: &str) -> String {
    s.chars().flat_map(char::to_lowercase).collect()
}

#[async_trait]
impl CustomerStore for InMemoryStore {
    async fn list(&self) -> Result<Vec<Customer>> {
        Ok(self.read()?.clone())
    }

    async fn get(&self, id: i64) -> Result<Option<Customer>> {
        Ok(self.read()?.iter().find(|c| c.id == id).cloned())
    }

    async fn search_by_name(&self, name: &str) -> Result<Option<Customer>> {
        if name.trim().is_empty() {
            return Ok(None);
        }
        let needle = fold_case(name);
        Ok(self
            .read()?
            .iter()
            .find(|c| fold_case(&c.name).contains(&needle))
            .cloned())
    }

    async fn create(&self, customer: NewCustomer) -> Result<Customer> {
        let mut customers = self.write()?;
        let created = Customer {
            id: next_id(&customers)?,
            name: customer.name,
            email: customer.email,
            created_at: Utc::now(),
        };
        customers.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: i64, changes: NewCustomer) -> Result<Option<Customer>> {
        let mut customers = self.write()?;
        Ok(customers.iter_mut().find(|c| c.id == id).map(|existing| {
            existing.name = changes.name;
            existing.email = changes.email;
            existing.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut customers = self.write()?;
        match customers.iter().position(|c| c.id == id) {
            Some(index) => {
                customers.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
