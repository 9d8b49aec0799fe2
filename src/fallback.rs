//! Bundled demo catalogs used when the remote catalog cannot be loaded.

use crate::domain::model::Service;
use crate::utils::error::{EngineError, Result};

const CONSTRUCTION: &str = include_str!("../data/construction.json");
const HOME_SERVICES: &str = include_str!("../data/home_services.json");

pub fn dataset_names() -> &'static [&'static str] {
    &["construction", "home-services"]
}

pub fn fallback_services(name: &str) -> Result<Vec<Service>> {
    let raw = match name {
        "construction" => CONSTRUCTION,
        "home-services" => HOME_SERVICES,
        other => {
            return Err(EngineError::InvalidConfigValueError {
                field: "fallback_dataset".to_string(),
                value: other.to_string(),
                reason: format!("Unknown dataset. Available: {}", dataset_names().join(", ")),
            })
        }
    };

    let services: Vec<Service> = serde_json::from_str(raw)?;
    Ok(services)
}
