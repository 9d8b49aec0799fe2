use crate::config::vertical_config::DetailsKey;
use crate::config::VerticalConfig;
use crate::core::pricing::estimated_charge;
use crate::domain::booking::{
    BookingDraft, BookingPricing, BookingRequest, BookingResult, CustomerInfo, ServiceAddress,
    TimeSlot,
};
use crate::domain::model::Service;
use crate::domain::ports::{BookingGateway, IdentityProvider};
use crate::utils::error::{EngineError, FieldErrors, Result};
use crate::utils::validation::{is_valid_email, is_valid_phone, is_valid_pincode};
use chrono::{Local, NaiveDate, Utc};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

static LAST_MOCK_SUFFIX: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingState {
    Idle,
    ServiceSelected,
    Submitting,
    Succeeded,
    Failed,
}

impl fmt::Display for BookingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BookingState::Idle => "idle",
            BookingState::ServiceSelected => "service selected",
            BookingState::Submitting => "submitting",
            BookingState::Succeeded => "succeeded",
            BookingState::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// One booking attempt: the chosen service, its draft and the submission
/// lifecycle.
///
/// ```text
/// Idle -> ServiceSelected -> Submitting -> Succeeded -> Idle
///               ^                  |
///               +---- Failed <-----+
/// ```
pub struct BookingSession {
    config: Arc<VerticalConfig>,
    gateway: Arc<dyn BookingGateway>,
    identity: Option<Arc<dyn IdentityProvider>>,
    state: BookingState,
    service: Option<Service>,
    draft: BookingDraft,
    field_errors: FieldErrors,
    last_error: Option<String>,
    result: Option<BookingResult>,
    history: Vec<BookingState>,
}

impl BookingSession {
    pub fn new(
        config: Arc<VerticalConfig>,
        gateway: Arc<dyn BookingGateway>,
        identity: Option<Arc<dyn IdentityProvider>>,
    ) -> Self {
        Self {
            config,
            gateway,
            identity,
            state: BookingState::Idle,
            service: None,
            draft: BookingDraft::default(),
            field_errors: FieldErrors::new(),
            last_error: None,
            result: None,
            history: vec![BookingState::Idle],
        }
    }

    pub fn state(&self) -> BookingState {
        self.state
    }

    pub fn service(&self) -> Option<&Service> {
        self.service.as_ref()
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    /// 最近一次送出失敗的訊息
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn result(&self) -> Option<&BookingResult> {
        self.result.as_ref()
    }

    pub fn booking_id(&self) -> Option<&str> {
        self.result.as_ref().map(|r| r.booking_id.as_str())
    }

    /// Every state entered so far, starting with `Idle`.
    pub fn history(&self) -> &[BookingState] {
        &self.history
    }

    /// 送出期間 UI 應停用送出按鈕
    pub fn can_submit(&self) -> bool {
        matches!(
            self.state,
            BookingState::ServiceSelected | BookingState::Failed
        )
    }

    fn transition(&mut self, next: BookingState) {
        tracing::debug!("Booking state: {} -> {}", self.state, next);
        self.state = next;
        self.history.push(next);
    }

    fn invalid_state(&self, action: &str) -> EngineError {
        EngineError::InvalidState {
            state: self.state.to_string(),
            action: action.to_string(),
        }
    }

    /// Failed -> ServiceSelected；舊的送出錯誤訊息一併清除
    fn reopen(&mut self) {
        self.last_error = None;
        self.transition(BookingState::ServiceSelected);
    }

    pub fn select_service(&mut self, service: Service) -> Result<()> {
        match self.state {
            BookingState::Idle => {}
            BookingState::Succeeded => self.acknowledge(),
            _ => return Err(self.invalid_state("select a service")),
        }

        let identity = self.identity.as_ref().and_then(|p| p.current_identity());
        if identity.is_none() && self.config.require_identity() {
            tracing::info!("🔒 Booking {} requires sign-in", service.id);
            return Err(EngineError::IdentityRequired);
        }

        let mut draft = BookingDraft::default();
        if let Some(identity) = identity {
            draft.name = identity.name;
            draft.email = identity.email.unwrap_or_default();
            draft.phone = identity.phone.unwrap_or_default();
        }

        tracing::info!("📝 Booking started for {} ({})", service.title, service.id);
        self.draft = draft;
        self.service = Some(service);
        self.field_errors = FieldErrors::new();
        self.last_error = None;
        self.transition(BookingState::ServiceSelected);
        Ok(())
    }

    /// Mutable access to the draft. Editing after a failure moves the session
    /// back to `ServiceSelected`.
    pub fn edit_draft(&mut self) -> Result<&mut BookingDraft> {
        match self.state {
            BookingState::ServiceSelected => {}
            BookingState::Failed => self.reopen(),
            _ => return Err(self.invalid_state("edit the booking form")),
        }
        Ok(&mut self.draft)
    }

    /// 放棄這次預約，草稿丟棄
    pub fn cancel(&mut self) {
        if self.state == BookingState::Idle {
            return;
        }
        self.service = None;
        self.draft = BookingDraft::default();
        self.field_errors = FieldErrors::new();
        self.last_error = None;
        self.transition(BookingState::Idle);
    }

    /// Leaves `Succeeded`; the booking result stays readable.
    pub fn acknowledge(&mut self) {
        if self.state == BookingState::Succeeded {
            self.service = None;
            self.transition(BookingState::Idle);
        }
    }

    pub async fn submit(&mut self, cancel: &CancellationToken) -> Result<BookingResult> {
        match self.state {
            BookingState::ServiceSelected => {}
            BookingState::Failed => self.reopen(),
            _ => return Err(self.invalid_state("submit")),
        }

        let service = self
            .service
            .clone()
            .ok_or_else(|| self.invalid_state("submit without a service"))?;

        let errors = validate_draft(&self.draft, &self.config, Local::now().date_naive());
        if !errors.is_empty() {
            tracing::debug!("Booking form rejected: {}", errors);
            self.field_errors = errors.clone();
            return Err(EngineError::ValidationError(errors));
        }
        self.field_errors = FieldErrors::new();
        self.last_error = None;

        let request = build_request(&service, &self.draft, &self.config)?;
        let gateway = Arc::clone(&self.gateway);
        self.transition(BookingState::Submitting);
        tracing::info!("📤 Submitting booking for {}", service.id);

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = gateway.submit_booking(&request) => Some(result),
        };

        match outcome {
            None => {
                tracing::debug!("Booking submission cancelled, keeping draft");
                self.transition(BookingState::ServiceSelected);
                Err(EngineError::Cancelled)
            }
            Some(Ok(result)) => Ok(self.succeed(result)),
            Some(Err(e)) if e.is_transport() && self.config.offline_fallback() => {
                let booking_id = next_mock_booking_id(&self.config.vertical.booking_prefix);
                tracing::warn!(
                    "⚠️ Booking service unreachable ({}), issued offline id {}",
                    e,
                    booking_id
                );
                Ok(self.succeed(BookingResult::mock(booking_id)))
            }
            Some(Err(e)) => {
                tracing::warn!("❌ Booking submission failed: {}", e);
                let message = e.user_friendly_message();
                self.last_error = Some(message.clone());
                self.transition(BookingState::Failed);
                Err(EngineError::SubmissionError { message })
            }
        }
    }

    fn succeed(&mut self, result: BookingResult) -> BookingResult {
        tracing::info!("✅ Booking confirmed: {}", result.booking_id);
        self.draft = BookingDraft::default();
        self.result = Some(result.clone());
        self.transition(BookingState::Succeeded);
        result
    }
}

/// `<prefix><suffix>`; the suffix is the current time in milliseconds, bumped
/// so that ids issued by this process are strictly increasing.
pub fn next_mock_booking_id(prefix: &str) -> String {
    let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
    let bump = |last: u64| now.max(last + 1);
    let previous = LAST_MOCK_SUFFIX
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(bump(last)))
        .unwrap_or_else(|last| last);
    format!("{}{}", prefix, bump(previous))
}

/// 本地表單檢查，不會觸發任何網路請求
pub fn validate_draft(draft: &BookingDraft, config: &VerticalConfig, today: NaiveDate) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if draft.name.trim().is_empty() {
        errors.add("name", "Name is required");
    }

    if draft.phone.trim().is_empty() {
        errors.add("phone", "Phone number is required");
    } else if !is_valid_phone(&draft.phone) {
        errors.add("phone", "Phone number must be 10 digits");
    }

    if !draft.email.trim().is_empty() && !is_valid_email(&draft.email) {
        errors.add("email", "Please enter a valid email address");
    }

    if draft.street.trim().is_empty() {
        errors.add("street", "Address is required");
    }
    if draft.city.trim().is_empty() {
        errors.add("city", "City is required");
    }

    let pincode = draft.pincode.trim();
    if pincode.is_empty() {
        if config.pincode_required() {
            errors.add("pincode", "Pincode is required");
        }
    } else if !is_valid_pincode(pincode) {
        errors.add("pincode", "Pincode must be 6 digits");
    }

    if draft.date.trim().is_empty() {
        errors.add("date", "Please choose a date");
    } else {
        match NaiveDate::parse_from_str(draft.date.trim(), "%Y-%m-%d") {
            Ok(date) if date < today => errors.add("date", "Date cannot be in the past"),
            Ok(_) => {}
            Err(_) => errors.add("date", "Date must be in YYYY-MM-DD format"),
        }
    }

    if draft.time_slot.trim().is_empty() {
        errors.add("time_slot", "Please choose a time slot");
    } else if TimeSlot::parse(&draft.time_slot).is_none()
        || (!config.booking.time_slots.is_empty()
            && !config
                .booking
                .time_slots
                .iter()
                .any(|slot| slot == draft.time_slot.trim()))
    {
        errors.add("time_slot", "Please choose an available time slot");
    }

    for field in &config.booking.fields {
        let value = draft.requirement(&field.name).trim();
        if value.is_empty() {
            if field.required {
                errors.add(&field.name, format!("{} is required", field.label));
            }
        } else if !field.options.is_empty() && !field.options.iter().any(|o| o == value) {
            errors.add(&field.name, format!("Please choose a valid {}", field.label.to_lowercase()));
        }
    }

    errors
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn round_currency(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Builds the `POST /bookings` body from a validated draft.
pub fn build_request(
    service: &Service,
    draft: &BookingDraft,
    config: &VerticalConfig,
) -> Result<BookingRequest> {
    let time_slot = TimeSlot::parse(&draft.time_slot).ok_or_else(|| {
        let mut errors = FieldErrors::new();
        errors.add("time_slot", "Please choose an available time slot");
        EngineError::ValidationError(errors)
    })?;

    let details: std::collections::BTreeMap<String, String> = draft
        .requirements
        .iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(key, value)| (key.clone(), value.trim().to_string()))
        .collect();
    let (requirements, service_details) = match config.booking.details_key {
        DetailsKey::Requirements => (Some(details), None),
        DetailsKey::ServiceDetails => (None, Some(details)),
    };

    let service_charge = estimated_charge(&service.pricing);
    let tax = config
        .pricing
        .tax_rate
        .map(|rate| round_currency(service_charge * rate));
    let total = round_currency(service_charge + tax.unwrap_or(0.0));

    Ok(BookingRequest {
        service_id: service.id.clone(),
        customer: CustomerInfo {
            name: draft.name.trim().to_string(),
            email: non_empty(&draft.email),
            phone: draft.phone.trim().to_string(),
        },
        service_address: ServiceAddress {
            street: draft.street.trim().to_string(),
            city: draft.city.trim().to_string(),
            state: non_empty(&draft.state),
            pincode: non_empty(&draft.pincode),
        },
        scheduled_date: draft.date.trim().to_string(),
        time_slot,
        requirements,
        service_details,
        pricing: BookingPricing {
            service_charge,
            tax,
            total,
        },
    })
}
