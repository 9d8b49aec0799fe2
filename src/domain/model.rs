use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// 目錄中的一項服務，載入後不再修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "lenient_pricing")]
    pub pricing: Pricing,
    #[serde(default)]
    pub duration: Option<ServiceDuration>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub popular: bool,
    #[serde(default)]
    pub trending: bool,
    #[serde(default)]
    pub rating: Option<Rating>,
}

/// Pricing descriptor. Wire form is internally tagged:
/// `{"type": "hourly", "hourlyRate": 499, "minHours": 2}`.
///
/// A missing or unrecognised `type` becomes [`Pricing::Unknown`] instead of
/// failing the whole payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Pricing {
    Fixed {
        base_price: f64,
    },
    PerSqft {
        base_price: f64,
    },
    Hourly {
        hourly_rate: f64,
        #[serde(default = "default_min_hours")]
        min_hours: u32,
    },
    PerUnit {
        unit_price: f64,
        unit_name: String,
    },
    Custom {
        min_price: f64,
        max_price: f64,
    },
    #[default]
    #[serde(other)]
    Unknown,
}

fn default_min_hours() -> u32 {
    1
}

/// 價格格式無法辨識 (缺 `type`、null、欄位型別錯誤) 時視為 Unknown，
/// 不讓單一服務拖垮整份目錄
fn lenient_pricing<'de, D>(deserializer: D) -> Result<Pricing, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDuration {
    pub value: u32,
    pub unit: String,
}

impl fmt::Display for ServiceDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub average: f32,
    pub count: u32,
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} ({} reviews)", self.average, self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_service_with_all_fields() {
        let json = serde_json::json!({
            "_id": "svc-1",
            "title": "Deep Cleaning",
            "description": "Full home deep cleaning",
            "category": "Cleaning",
            "images": ["/img/clean.jpg"],
            "pricing": {"type": "hourly", "hourlyRate": 499, "minHours": 3},
            "duration": {"value": 4, "unit": "hours"},
            "features": ["Eco products", "Trained staff"],
            "popular": true,
            "rating": {"average": 4.7, "count": 320}
        });

        let service: Service = serde_json::from_value(json).unwrap();

        assert_eq!(service.id, "svc-1");
        assert_eq!(
            service.pricing,
            Pricing::Hourly {
                hourly_rate: 499.0,
                min_hours: 3
            }
        );
        assert_eq!(service.duration.unwrap().to_string(), "4 hours");
        assert!(service.popular);
        assert!(!service.trending);
        assert_eq!(service.rating.unwrap().count, 320);
    }

    #[test]
    fn test_unknown_or_missing_pricing_type() {
        let json = serde_json::json!({
            "id": "svc-2",
            "title": "Mystery",
            "category": "Other",
            "pricing": {"type": "subscription", "monthly": 99}
        });
        let service: Service = serde_json::from_value(json).unwrap();
        assert_eq!(service.pricing, Pricing::Unknown);

        let json = serde_json::json!({"id": "svc-3", "title": "Bare", "category": "Other"});
        let service: Service = serde_json::from_value(json).unwrap();
        assert_eq!(service.pricing, Pricing::Unknown);
        assert!(service.features.is_empty());
    }

    #[test]
    fn test_untyped_or_null_pricing_is_unknown() {
        for pricing in [
            serde_json::json!({"basePrice": 100}),
            serde_json::Value::Null,
            serde_json::json!({"type": "fixed", "basePrice": "cheap"}),
        ] {
            let json = serde_json::json!({
                "id": "svc-4",
                "title": "Loose pricing",
                "category": "Cleaning",
                "pricing": pricing
            });
            let service: Service = serde_json::from_value(json).unwrap();
            assert_eq!(service.pricing, Pricing::Unknown);
        }
    }

    #[test]
    fn test_pricing_wire_names() {
        let pricing: Pricing = serde_json::from_value(serde_json::json!({
            "type": "per_unit", "unitPrice": 350, "unitName": "fan"
        }))
        .unwrap();
        assert_eq!(
            pricing,
            Pricing::PerUnit {
                unit_price: 350.0,
                unit_name: "fan".to_string()
            }
        );

        let value = serde_json::to_value(Pricing::PerSqft { base_price: 1850.0 }).unwrap();
        assert_eq!(value["type"], "per_sqft");
        assert_eq!(value["basePrice"], 1850.0);
    }
}
