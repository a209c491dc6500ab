//! API Module
//!
//! HTTP handlers and routing for the items REST API.
//!
//! # Endpoints
//! - `GET /items` - List all items
//! - `POST /items` - Create an item
//! - `GET /items/:id` - Fetch one item
//! - `PUT /items/:id` - Replace an item's fields
//! - `DELETE /items/:id` - Delete an item
//! - `GET /health` - Health check endpoint
//! - `GET /cache/stats` - Cache counters
//! - `DELETE /cache` - Flush the cache namespace
//! - `DELETE /cache/items` - Drop every cached item key

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
