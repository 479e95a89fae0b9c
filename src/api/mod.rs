//! API layer - HTTP endpoint handlers organized by domain.

mod accounts;
mod contacts;
mod customers;
mod discovery;
mod health;
mod routes;
mod tags;
mod templates;

pub use routes::api_routes;

use serde::Serialize;

/// Simple acknowledgement body for deletes and tag operations.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
