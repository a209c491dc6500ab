//! Request DTOs for the items API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

/// Request body for POST /items
///
/// `id` is optional; when absent the service generates one.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemCreate {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub in_stock: Option<bool>,
}

impl ItemCreate {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_fields(&self.name, self.price)
    }
}

/// Request body for PUT /items/{id}
///
/// Name, description and price always overwrite; `in_stock` only when present.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemUpdate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub in_stock: Option<bool>,
}

impl ItemUpdate {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_fields(&self.name, self.price)
    }
}

fn validate_fields(name: &str, price: f64) -> Option<String> {
    if name.trim().is_empty() {
        return Some("Name cannot be empty".to_string());
    }
    if !price.is_finite() {
        return Some("Price must be a finite number".to_string());
    }
    None
}
