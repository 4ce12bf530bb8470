// server/src/models/mod.rs

//! Row types for the database tables.

pub mod booking;
pub mod car;
pub mod payment;
pub mod payout;
pub mod reference;
pub mod review;
pub mod session;
pub mod support;
pub mod user;

pub use booking::{Booking, BookingSummary};
pub use car::{Car, CarImage, CarListing};
pub use payment::Payment;
pub use payout::PartnerPayout;
pub use reference::{CarCategory, TransmissionType};
pub use review::{Review, ReviewWithAuthor};
pub use session::Session;
pub use support::{SupportChat, SupportMessage};
pub use user::User;
