use crate::config::VerticalConfig;
use crate::domain::model::Pricing;
use serde::{Deserialize, Serialize};

/// 1 lakh
pub const LAKH: f64 = 100_000.0;

pub const CONTACT_FOR_PRICING: &str = "Contact for pricing";

/// How `fixed` and `custom` amounts are displayed for a vertical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PriceScale {
    /// `₹3999`
    #[default]
    Raw,
    /// `₹45.0L`
    Lakh,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceFormatter {
    currency: String,
    scale: PriceScale,
}

impl PriceFormatter {
    pub fn new(currency: impl Into<String>, scale: PriceScale) -> Self {
        Self {
            currency: currency.into(),
            scale,
        }
    }

    pub fn from_config(config: &VerticalConfig) -> Self {
        Self::new(config.currency(), config.price_scale())
    }

    pub fn format(&self, pricing: &Pricing) -> String {
        let cur = &self.currency;
        match pricing {
            Pricing::Fixed { base_price } => self.scaled(*base_price),
            Pricing::PerSqft { base_price } => format!("{}{}/sq.ft", cur, format_amount(*base_price)),
            Pricing::Hourly { hourly_rate, .. } => format!("{}{}/hr", cur, format_amount(*hourly_rate)),
            Pricing::PerUnit {
                unit_price,
                unit_name,
            } => format!("{}{}/{}", cur, format_amount(*unit_price), unit_name),
            Pricing::Custom {
                min_price,
                max_price,
            } => format!("{} - {}", self.scaled(*min_price), self.scaled(*max_price)),
            Pricing::Unknown => CONTACT_FOR_PRICING.to_string(),
        }
    }

    fn scaled(&self, amount: f64) -> String {
        match self.scale {
            PriceScale::Raw => format!("{}{}", self.currency, format_amount(amount)),
            PriceScale::Lakh => format!("{}{:.1}L", self.currency, amount / LAKH),
        }
    }
}

/// 整數金額不顯示小數，其餘保留兩位
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 && amount.abs() < 1e15 {
        format!("{}", amount as i64)
    } else {
        format!("{:.2}", amount)
    }
}

/// 預約時送出的服務費用估算
pub fn estimated_charge(pricing: &Pricing) -> f64 {
    match pricing {
        Pricing::Fixed { base_price } | Pricing::PerSqft { base_price } => *base_price,
        Pricing::Hourly {
            hourly_rate,
            min_hours,
        } => hourly_rate * f64::from((*min_hours).max(1)),
        Pricing::PerUnit { unit_price, .. } => *unit_price,
        Pricing::Custom { min_price, .. } => *min_price,
        Pricing::Unknown => 0.0,
    }
}
