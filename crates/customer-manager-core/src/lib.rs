//! # Customer Manager Core
//!
//! Shared, I/O-free logic for Customer Manager: the customer data model,
//! the input validation and absence contract, and the store abstraction
//! with its in-memory implementation.
//!
//! This crate contains no tokio, HTTP, or filesystem dependencies. Every
//! adapter (HTTP handlers, agent tools, CLI) goes through [`store::CustomerStore`]
//! and validates input with [`error`] before calling it.

pub mod error;
pub mod models;
pub mod store;

pub use error::{CustomerError, ErrorKind};
pub use models::{Customer, CustomerInput, NewCustomer};
pub use store::{memory::InMemoryStore, CustomerStore};
