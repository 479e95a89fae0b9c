// Infrastructure layer (shared components)
pub mod infrastructure;

// Re-export infrastructure modules for convenient paths
pub use infrastructure::config;
pub use infrastructure::error;
pub use infrastructure::postgres;

// Domain layer (business logic)
pub mod domain;

// External collaborators
pub mod clients;
pub mod mail;

// Application layer
pub mod api;
pub mod auth;
pub mod server;
