// core/src/domain/mod.rs

//! Car-sharing business rules that need no database.

pub mod booking;
pub mod payment;
pub mod payout;
pub mod pricing;
pub mod review;
pub mod role;
pub mod status;
