pub mod booking_session;
pub mod catalog;
pub mod comparison;
pub mod engine;
pub mod filter;
pub mod pricing;
pub mod tracking;

pub use crate::domain::booking::{BookingDraft, BookingRequest, BookingResult};
pub use crate::domain::model::{Pricing, Service};
pub use crate::domain::ports::{BookingGateway, CatalogSource, IdentityProvider};
pub use crate::utils::error::Result;
