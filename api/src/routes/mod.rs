//! API route definitions.
//!
//! This module organizes all HTTP routes for the Pulsegate API server.

mod export;
mod health;

pub use export::{export_routes, ErrorResponse};
pub use health::{health_routes, HealthResponse};
