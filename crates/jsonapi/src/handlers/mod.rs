//! HTTP request handlers.

pub mod health;
pub mod index;

pub use health::{health_handler, liveness_handler};
pub use index::index_handler;
