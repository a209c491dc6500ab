//! Item model and request/response DTOs
//!
//! Defines the item entity plus the shapes used for serializing/deserializing
//! HTTP request and response bodies.

pub mod item;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use item::{parse_item_id, Item};
pub use requests::{ItemCreate, ItemUpdate};
pub use responses::{
    CacheStatsResponse, DeleteResponse, ErrorResponse, FlushResponse, HealthResponse, ItemList,
};
