#![doc = "The `taskgate` library crate."]
#![doc = ""]
#![doc = "This crate contains the authentication pipeline (password hashing, session tokens,"]
#![doc = "double-submit CSRF protection), the task and account use cases, the persistence"]
#![doc = "interfaces and the route table of the TaskGate API."]
#![doc = "It is used by the main binary (`main.rs`) to construct and run the application."]

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod validation;

/// Version tag carried by every JSON envelope.
pub const API_VERSION: &str = "v1";

pub use app::AppState;
pub use config::Config;
pub use error::AppError;
