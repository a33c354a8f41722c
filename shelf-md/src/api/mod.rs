//! HTTP API handlers for shelf-md

pub mod catalog;
pub mod health;
pub mod images;

pub use catalog::catalog_routes;
pub use health::health_routes;
pub use images::image_routes;
