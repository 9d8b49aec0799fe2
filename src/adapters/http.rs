use crate::config::VerticalConfig;
use crate::domain::booking::{BookingRequest, BookingResult, ResultOrigin, TrackingQuery};
use crate::domain::model::Service;
use crate::domain::ports::{BookingGateway, CatalogSource};
use crate::utils::error::{EngineError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// `{success, data, message}` envelope used by every endpoint.
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    success: Option<bool>,
    data: Option<T>,
    message: Option<String>,
}

/// REST client for the catalog and booking endpoints.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    bookings_endpoint: String,
    tracking_endpoint: String,
    timeout: Duration,
    retry_attempts: u32,
}

impl HttpGateway {
    pub fn new(
        bookings_endpoint: impl Into<String>,
        tracking_endpoint: impl Into<String>,
        timeout: Duration,
        retry_attempts: u32,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("servicebook/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            bookings_endpoint: bookings_endpoint.into(),
            tracking_endpoint: tracking_endpoint.into(),
            timeout,
            retry_attempts,
        })
    }

    pub fn from_config(config: &VerticalConfig) -> Result<Self> {
        Self::new(
            config.bookings_endpoint(),
            config.tracking_endpoint(),
            config.request_timeout(),
            config.retry_attempts(),
        )
    }

    /// 送出請求；連線失敗與逾時轉成 Unreachable
    async fn send(&self, request: reqwest::RequestBuilder, url: &str) -> Result<reqwest::Response> {
        request.timeout(self.timeout).send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() || e.is_request() {
                EngineError::Unreachable {
                    message: format!("{}: {}", url, e),
                }
            } else {
                EngineError::ApiError(e)
            }
        })
    }

    /// Reads the body as an envelope. `None` when the body is not one.
    async fn read_envelope<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<Option<ApiEnvelope<T>>> {
        let body = response.text().await?;
        Ok(serde_json::from_str(&body).ok())
    }

    async fn track_once(&self, query: &TrackingQuery) -> Result<BookingResult> {
        let url = &self.tracking_endpoint;
        tracing::debug!("Making tracking request to: {}", url);

        let response = self.send(self.client.post(url).json(query), url).await?;
        let status = response.status();
        tracing::debug!("Tracking response status: {}", status);

        let envelope = Self::read_envelope::<BookingResult>(response).await?;
        match envelope {
            Some(ApiEnvelope {
                success: Some(true),
                data: Some(result),
                ..
            }) if status.is_success() => Ok(result),
            Some(ApiEnvelope {
                success: Some(false),
                message,
                ..
            }) => Err(EngineError::NotFound {
                message: message
                    .unwrap_or_else(|| "No booking found with these details".to_string()),
            }),
            _ if status == StatusCode::NOT_FOUND => Err(EngineError::NotFound {
                message: "No booking found with these details".to_string(),
            }),
            _ if !status.is_success() => Err(EngineError::HttpStatus {
                status: status.as_u16(),
                url: url.clone(),
            }),
            _ => Err(EngineError::MalformedPayload {
                message: "tracking response missing booking data".to_string(),
            }),
        }
    }
}

#[async_trait]
impl CatalogSource for HttpGateway {
    async fn fetch_services(&self, endpoint: &str) -> Result<Vec<Service>> {
        tracing::debug!("Making catalog request to: {}", endpoint);
        let response = self.send(self.client.get(endpoint), endpoint).await?;
        let status = response.status();
        tracing::debug!("Catalog response status: {}", status);

        if !status.is_success() {
            return Err(EngineError::HttpStatus {
                status: status.as_u16(),
                url: endpoint.to_string(),
            });
        }

        let envelope: ApiEnvelope<Vec<Service>> = response.json().await.map_err(|e| {
            EngineError::MalformedPayload {
                message: format!("catalog payload: {}", e),
            }
        })?;

        match envelope.success {
            Some(true) => Ok(envelope.data.unwrap_or_default()),
            Some(false) => Err(EngineError::MalformedPayload {
                message: envelope
                    .message
                    .unwrap_or_else(|| "catalog request reported success=false".to_string()),
            }),
            None => Err(EngineError::MalformedPayload {
                message: "catalog payload missing success flag".to_string(),
            }),
        }
    }

    async fn fetch_service(&self, endpoint: &str) -> Result<Option<Service>> {
        tracing::debug!("Making service detail request to: {}", endpoint);
        let response = self.send(self.client.get(endpoint), endpoint).await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let envelope = Self::read_envelope::<Service>(response).await?;
        match envelope {
            Some(ApiEnvelope {
                success: Some(false),
                ..
            }) => Ok(None),
            Some(ApiEnvelope {
                success: Some(true),
                data: Some(service),
                ..
            }) if status.is_success() => Ok(Some(service)),
            _ if !status.is_success() => Err(EngineError::HttpStatus {
                status: status.as_u16(),
                url: endpoint.to_string(),
            }),
            _ => Err(EngineError::MalformedPayload {
                message: "service detail payload missing data".to_string(),
            }),
        }
    }
}

#[async_trait]
impl BookingGateway for HttpGateway {
    /// 單次送出，不自動重試
    async fn submit_booking(&self, request: &BookingRequest) -> Result<BookingResult> {
        let url = &self.bookings_endpoint;
        tracing::debug!("Making booking request to: {}", url);

        let response = self.send(self.client.post(url).json(request), url).await?;
        let status = response.status();
        tracing::debug!("Booking response status: {}", status);

        let envelope = Self::read_envelope::<BookingResult>(response).await?;
        match envelope {
            Some(ApiEnvelope {
                success: Some(true),
                data: Some(mut result),
                ..
            }) if status.is_success() => {
                result.origin = ResultOrigin::Server;
                Ok(result)
            }
            Some(ApiEnvelope {
                success: Some(false),
                message,
                ..
            }) => Err(EngineError::SubmissionError {
                message: message.unwrap_or_else(|| "Booking could not be created".to_string()),
            }),
            _ if !status.is_success() => Err(EngineError::HttpStatus {
                status: status.as_u16(),
                url: url.clone(),
            }),
            _ => Err(EngineError::MalformedPayload {
                message: "booking response missing bookingId".to_string(),
            }),
        }
    }

    /// 查詢可安全重試：連線失敗時依設定重試
    async fn track_booking(&self, query: &TrackingQuery) -> Result<BookingResult> {
        let mut attempt = 0;
        loop {
            match self.track_once(query).await {
                Err(e) if e.is_transport() && attempt < self.retry_attempts => {
                    attempt += 1;
                    tracing::warn!(
                        "⚠️ Tracking request failed ({}), retry {}/{}",
                        e,
                        attempt,
                        self.retry_attempts
                    );
                }
                outcome => return outcome,
            }
        }
    }
}
