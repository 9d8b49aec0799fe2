use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 預約表單草稿，欄位保存使用者輸入的原始字串
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM-HH:MM`
    pub time_slot: String,
    /// 各垂直領域自訂的需求欄位 (budget, style, special_instructions...)
    pub requirements: BTreeMap<String, String>,
}

impl BookingDraft {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn requirement(&self, field: &str) -> &str {
        self.requirements
            .get(field)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn set_requirement(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.requirements.insert(field.into(), value.into());
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: String,
    pub end: String,
}

impl TimeSlot {
    /// 解析 `09:00-12:00`，結束時間必須晚於開始時間
    pub fn parse(value: &str) -> Option<Self> {
        let (start, end) = value.trim().split_once('-')?;
        let (start, end) = (start.trim(), end.trim());
        let start_time = NaiveTime::parse_from_str(start, "%H:%M").ok()?;
        let end_time = NaiveTime::parse_from_str(end, "%H:%M").ok()?;
        if end_time <= start_time {
            return None;
        }
        Some(Self {
            start: start.to_string(),
            end: end.to_string(),
        })
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceAddress {
    pub street: String,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pincode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPricing {
    pub service_charge: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax: Option<f64>,
    pub total: f64,
}

/// `POST /bookings` 的請求內容
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub service_id: String,
    pub customer: CustomerInfo,
    pub service_address: ServiceAddress,
    pub scheduled_date: String,
    pub time_slot: TimeSlot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_details: Option<BTreeMap<String, String>>,
    pub pricing: BookingPricing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Assigned => "assigned",
            BookingStatus::InProgress => "in progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// 預約編號來源：伺服器核發或離線時由客戶端產生
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultOrigin {
    #[default]
    Server,
    Mock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResult {
    pub booking_id: String,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default)]
    pub origin: ResultOrigin,
    #[serde(default)]
    pub service_title: Option<String>,
    #[serde(default)]
    pub scheduled_date: Option<String>,
    #[serde(default)]
    pub time_slot: Option<TimeSlot>,
    #[serde(default)]
    pub total: Option<f64>,
}

impl BookingResult {
    pub fn mock(booking_id: String) -> Self {
        Self {
            booking_id,
            status: BookingStatus::Pending,
            origin: ResultOrigin::Mock,
            service_title: None,
            scheduled_date: None,
            time_slot: None,
            total: None,
        }
    }

    pub fn is_mock(&self) -> bool {
        self.origin == ResultOrigin::Mock
    }
}

/// `POST /bookings/track` 的請求內容
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingQuery {
    pub booking_id: String,
    pub phone: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_slot_parse() {
        let slot = TimeSlot::parse("09:00-12:00").unwrap();
        assert_eq!(slot.start, "09:00");
        assert_eq!(slot.end, "12:00");
        assert_eq!(slot.to_string(), "09:00-12:00");

        assert!(TimeSlot::parse("12:00-09:00").is_none());
        assert!(TimeSlot::parse("morning").is_none());
        assert!(TimeSlot::parse("9-12").is_none());
    }

    #[test]
    fn test_booking_result_from_server_payload() {
        let result: BookingResult = serde_json::from_value(serde_json::json!({
            "bookingId": "BK-1001",
            "status": "in_progress",
            "serviceTitle": "AC Repair",
            "timeSlot": {"start": "14:00", "end": "16:00"}
        }))
        .unwrap();

        assert_eq!(result.booking_id, "BK-1001");
        assert_eq!(result.status, BookingStatus::InProgress);
        assert_eq!(result.origin, ResultOrigin::Server);
        assert_eq!(result.time_slot.unwrap().start, "14:00");
    }

    #[test]
    fn test_unrecognised_status_is_unknown() {
        let result: BookingResult = serde_json::from_value(serde_json::json!({
            "bookingId": "BK-1002",
            "status": "on_hold"
        }))
        .unwrap();
        assert_eq!(result.status, BookingStatus::Unknown);
    }

    #[test]
    fn test_draft_requirements() {
        let mut draft = BookingDraft::default();
        assert!(draft.is_empty());
        assert_eq!(draft.requirement("budget"), "");

        draft.set_requirement("budget", "5-10 Lakhs");
        assert_eq!(draft.requirement("budget"), "5-10 Lakhs");
        assert!(!draft.is_empty());
    }
}
