use crate::domain::booking::{BookingResult, TrackingQuery};
use crate::domain::ports::BookingGateway;
use crate::utils::error::{EngineError, FieldErrors, Result};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Booking status lookup by id + phone, independent of any booking session.
///
/// A failed lookup only records a message; the last successful result stays
/// on screen.
pub struct TrackingLookup {
    gateway: Arc<dyn BookingGateway>,
    last_result: Option<BookingResult>,
    last_message: Option<String>,
}

impl TrackingLookup {
    pub fn new(gateway: Arc<dyn BookingGateway>) -> Self {
        Self {
            gateway,
            last_result: None,
            last_message: None,
        }
    }

    pub fn last_result(&self) -> Option<&BookingResult> {
        self.last_result.as_ref()
    }

    /// 最近一次查詢失敗時給使用者看的訊息
    pub fn last_message(&self) -> Option<&str> {
        self.last_message.as_deref()
    }

    pub async fn track(
        &mut self,
        booking_id: &str,
        phone: &str,
        cancel: &CancellationToken,
    ) -> Result<BookingResult> {
        let mut errors = FieldErrors::new();
        if booking_id.trim().is_empty() {
            errors.add("booking_id", "Booking ID is required");
        }
        if phone.trim().is_empty() {
            errors.add("phone", "Phone number is required");
        }
        if !errors.is_empty() {
            self.last_message = Some("Please enter both booking ID and phone number".to_string());
            return Err(EngineError::ValidationError(errors));
        }

        let query = TrackingQuery {
            booking_id: booking_id.trim().to_string(),
            phone: phone.trim().to_string(),
        };
        tracing::info!("🔎 Tracking booking {}", query.booking_id);

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(EngineError::Cancelled),
            result = self.gateway.track_booking(&query) => result,
        };

        match outcome {
            Ok(result) => {
                tracing::info!("✅ Booking {} is {}", result.booking_id, result.status);
                self.last_result = Some(result.clone());
                self.last_message = None;
                Ok(result)
            }
            Err(e) => {
                tracing::warn!("⚠️ Tracking lookup failed: {}", e);
                self.last_message = Some(e.user_friendly_message());
                Err(e)
            }
        }
    }
}
