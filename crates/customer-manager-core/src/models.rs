//! Customer data types shared by the store and every adapter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CustomerError;

/// A customer record as held by the store and returned to callers.
///
/// `id` and `created_at` are assigned by the store on creation and never
/// change afterwards; only `name` and `email` are mutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Raw create/update payload as received from a client.
///
/// Both fields are optional at the wire level so that a missing field is
/// reported through [`CustomerError::MissingFields`] instead of a
/// deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl CustomerInput {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
        }
    }

    /// Check that both fields are present and non-blank.
    ///
    /// Values are passed through verbatim; trimming only decides blankness.
    pub fn validate(self) -> Result<NewCustomer, CustomerError> {
        match (self.name, self.email) {
            (Some(name), Some(email)) if !name.trim().is_empty() && !email.trim().is_empty() => {
                Ok(NewCustomer { name, email })
            }
            _ => Err(CustomerError::MissingFields),
        }
    }
}

/// Validated name/email pair accepted by [`CustomerStore::create`](crate::store::CustomerStore::create)
/// and [`CustomerStore::update`](crate::store::CustomerStore::update).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
}

/// The example records present at startup, all stamped with `now`.
pub fn seed_customers(now: DateTime<Utc>) -> Vec<Customer> {
    [
        (1, "John Doe", "john@example.com"),
        (2, "Jane Smith", "jane@example.com"),
        (3, "Bob Wilson", "bob@example.com"),
    ]
    .into_iter()
    .map(|(id, name, email)| Customer {
        id,
        name: name.to_string(),
        email: email.to_string(),
        created_at: now,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_both_fields() {
        let input = CustomerInput::new("Ann Lee", "ann@x.com");
        let new = input.validate().unwrap();
        assert_eq!(new.name, "Ann Lee");
        assert_eq!(new.email, "ann@x.com");
    }

    #[test]
    fn test_validate_keeps_values_verbatim() {
        let new = CustomerInput::new("  Ann  ", "ann@x.com ").validate().unwrap();
        assert_eq!(new.name, "  Ann  ");
        assert_eq!(new.email, "ann@x.com ");
    }

    #[test]
    fn test_validate_rejects_blank_or_missing() {
        let cases = vec![
            CustomerInput::default(),
            CustomerInput {
                name: Some("Ann".into()),
                email: None,
            },
            CustomerInput::new("   ", "ann@x.com"),
            CustomerInput::new("Ann", "\t\n"),
        ];
        for input in cases {
            assert_eq!(input.validate(), Err(CustomerError::MissingFields));
        }
    }

    #[test]
    fn test_customer_serializes_camel_case() {
        let now = Utc::now();
        let c = &seed_customers(now)[0];
        let json = serde_json::to_value(c).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["name"], "John Doe");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn test_seed_has_three_ordered_records() {
        let seed = seed_customers(Utc::now());
        let ids: Vec<i64> = seed.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(seed[2].name, "Bob Wilson");
    }
}
