//! Item entity and identifier handling.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ServiceError;

/// Length of the canonical hyphenated identifier form.
pub const ITEM_ID_LENGTH: usize = 36;

/// A stored item record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub in_stock: bool,
}

/// Parses an identifier in canonical hyphenated form.
///
/// Simple, braced and URN encodings are rejected even though `Uuid` would
/// accept them, so every identifier maps to exactly one cache key.
pub fn parse_item_id(raw: &str) -> Result<Uuid, ServiceError> {
    if raw.len() != ITEM_ID_LENGTH {
        return Err(ServiceError::InvalidInput(format!(
            "Malformed item id '{}'",
            raw
        )));
    }
    Uuid::try_parse(raw)
        .map_err(|_| ServiceError::InvalidInput(format!("Malformed item id '{}'", raw)))
}
