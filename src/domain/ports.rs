use crate::domain::booking::{BookingRequest, BookingResult, TrackingQuery};
use crate::domain::model::Service;
use crate::utils::error::Result;
use async_trait::async_trait;

/// 遠端服務目錄
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// `GET /services/<vertical>`. An empty `Ok` is allowed; callers decide
    /// how to treat it.
    async fn fetch_services(&self, endpoint: &str) -> Result<Vec<Service>>;

    /// `GET /services/<vertical>/<id>`. `Ok(None)` when the backend says the
    /// service does not exist.
    async fn fetch_service(&self, endpoint: &str) -> Result<Option<Service>>;
}

#[async_trait]
pub trait BookingGateway: Send + Sync {
    async fn submit_booking(&self, request: &BookingRequest) -> Result<BookingResult>;
    async fn track_booking(&self, query: &TrackingQuery) -> Result<BookingResult>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerIdentity {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// 外部登入狀態，未登入時回傳 None
pub trait IdentityProvider: Send + Sync {
    fn current_identity(&self) -> Option<CustomerIdentity>;
}
