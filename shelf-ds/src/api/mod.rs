//! HTTP API handlers for shelf-ds

pub mod discovery;
pub mod health;

pub use discovery::discovery_routes;
pub use health::health_routes;
