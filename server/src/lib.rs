// server/src/lib.rs

//! Car-sharing HTTP service: configuration, persistence, pipelines and the JSON API.
//! Shared by the server binary and the `carshare-admin` CLI.

pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod web;

pub use crate::config::AppConfig;
pub use crate::errors::{AppError, Result};
pub use crate::state::AppState;
