pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod fallback;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use crate::adapters::{http::HttpGateway, identity::StaticIdentity};
pub use crate::config::VerticalConfig;
pub use crate::core::{
    booking_session::{BookingSession, BookingState},
    catalog::{CatalogOrigin, CatalogStore},
    comparison::{ComparisonSet, ToggleOutcome},
    engine::VerticalEngine,
    pricing::PriceFormatter,
    tracking::TrackingLookup,
};
pub use crate::utils::error::{EngineError, Result};
