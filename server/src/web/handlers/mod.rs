// server/src/web/handlers/mod.rs

pub mod admin_handlers;
pub mod auth_handlers;
pub mod booking_handlers;
pub mod car_handlers;
pub mod partner_handlers;
pub mod payout_handlers;
pub mod profile_handlers;
pub mod reference_handlers;
pub mod support_handlers;
