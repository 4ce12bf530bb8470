// server/src/services/mod.rs
pub mod auth_service;
pub mod notification_mock;
pub mod payment_mock;
