use crate::core::pricing::PriceScale;
use crate::utils::error::{EngineError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

const CONSTRUCTION_PRESET: &str = include_str!("../../verticals/construction.toml");
const HOME_SERVICES_PRESET: &str = include_str!("../../verticals/home_services.toml");

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 1;
pub const DEFAULT_CURRENCY: &str = "₹";

static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

/// 一個垂直領域 (construction, home-services) 的完整設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerticalConfig {
    pub categories: Vec<String>,
    pub fallback_dataset: String,
    pub vertical: VerticalInfo,
    pub source: SourceConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    pub booking: BookingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerticalInfo {
    pub id: String,
    pub name: String,
    /// 離線預約編號前綴
    pub booking_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub base_url: String,
    pub timeout_seconds: Option<u64>,
    pub retry_attempts: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PricingConfig {
    pub currency: Option<String>,
    /// fixed/custom 價格以「十萬 (L)」為單位顯示
    #[serde(default)]
    pub scaled: bool,
    pub tax_rate: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DetailsKey {
    #[default]
    Requirements,
    ServiceDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfig {
    #[serde(default)]
    pub details_key: DetailsKey,
    pub pincode_required: Option<bool>,
    pub offline_fallback: Option<bool>,
    pub require_identity: Option<bool>,
    #[serde(default)]
    pub time_slots: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

/// 需求欄位定義
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<String>,
}

impl VerticalConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EngineError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EngineError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 內建的垂直領域設定
    pub fn preset(name: &str) -> Result<Self> {
        match name {
            "construction" => Self::from_toml_str(CONSTRUCTION_PRESET),
            "home-services" | "home_services" => Self::from_toml_str(HOME_SERVICES_PRESET),
            other => Err(EngineError::InvalidConfigValueError {
                field: "vertical".to_string(),
                value: other.to_string(),
                reason: format!("Unknown vertical. Available: {}", Self::preset_names().join(", ")),
            }),
        }
    }

    pub fn preset_names() -> &'static [&'static str] {
        &["construction", "home-services"]
    }

    /// 替換環境變數 (例如 ${SERVICEBOOK_API_URL})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_PATTERN
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("vertical.id", &self.vertical.id)?;
        validation::validate_non_empty_string("vertical.booking_prefix", &self.vertical.booking_prefix)?;
        validation::validate_url("source.base_url", &self.source.base_url)?;

        if let Some(timeout) = self.source.timeout_seconds {
            validation::validate_positive_number("source.timeout_seconds", timeout, 1)?;
        }

        if let Some(tax_rate) = self.pricing.tax_rate {
            validation::validate_range("pricing.tax_rate", tax_rate, 0.0, 1.0)?;
        }

        if !crate::fallback::dataset_names().contains(&self.fallback_dataset.as_str()) {
            return Err(EngineError::InvalidConfigValueError {
                field: "fallback_dataset".to_string(),
                value: self.fallback_dataset.clone(),
                reason: format!(
                    "Unknown dataset. Available: {}",
                    crate::fallback::dataset_names().join(", ")
                ),
            });
        }

        for slot in &self.booking.time_slots {
            if crate::domain::booking::TimeSlot::parse(slot).is_none() {
                return Err(EngineError::InvalidConfigValueError {
                    field: "booking.time_slots".to_string(),
                    value: slot.clone(),
                    reason: "Expected HH:MM-HH:MM with end after start".to_string(),
                });
            }
        }

        for field in &self.booking.fields {
            validation::validate_non_empty_string("booking.fields.name", &field.name)?;
        }

        Ok(())
    }

    pub fn id(&self) -> &str {
        &self.vertical.id
    }

    fn base_url(&self) -> &str {
        self.source.base_url.trim_end_matches('/')
    }

    /// `GET /services/<vertical>`
    pub fn catalog_endpoint(&self) -> String {
        format!("{}/services/{}", self.base_url(), self.vertical.id)
    }

    pub fn bookings_endpoint(&self) -> String {
        format!("{}/bookings", self.base_url())
    }

    pub fn tracking_endpoint(&self) -> String {
        format!("{}/bookings/track", self.base_url())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
    }

    pub fn retry_attempts(&self) -> u32 {
        self.source.retry_attempts.unwrap_or(DEFAULT_RETRY_ATTEMPTS)
    }

    pub fn currency(&self) -> &str {
        self.pricing.currency.as_deref().unwrap_or(DEFAULT_CURRENCY)
    }

    pub fn price_scale(&self) -> PriceScale {
        if self.pricing.scaled {
            PriceScale::Lakh
        } else {
            PriceScale::Raw
        }
    }

    pub fn pincode_required(&self) -> bool {
        self.booking.pincode_required.unwrap_or(true)
    }

    pub fn offline_fallback(&self) -> bool {
        self.booking.offline_fallback.unwrap_or(true)
    }

    pub fn require_identity(&self) -> bool {
        self.booking.require_identity.unwrap_or(false)
    }
}

impl Validate for VerticalConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
