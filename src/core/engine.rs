use crate::adapters::http::HttpGateway;
use crate::config::VerticalConfig;
use crate::core::booking_session::BookingSession;
use crate::core::catalog::{CatalogOrigin, CatalogStore};
use crate::core::comparison::{ComparisonSet, ComparisonTable, ToggleOutcome};
use crate::core::filter;
use crate::core::pricing::PriceFormatter;
use crate::core::tracking::TrackingLookup;
use crate::domain::model::Service;
use crate::domain::ports::{BookingGateway, CatalogSource, IdentityProvider};
use crate::utils::error::{EngineError, Result};
use crate::utils::validation::Validate;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Builds a [`VerticalEngine`]. Collaborators that are not supplied default
/// to an [`HttpGateway`] created from the vertical's configuration.
pub struct VerticalEngineBuilder {
    config: VerticalConfig,
    catalog_source: Option<Arc<dyn CatalogSource>>,
    gateway: Option<Arc<dyn BookingGateway>>,
    identity: Option<Arc<dyn IdentityProvider>>,
}

impl VerticalEngineBuilder {
    pub fn catalog_source(mut self, source: Arc<dyn CatalogSource>) -> Self {
        self.catalog_source = Some(source);
        self
    }

    pub fn gateway(mut self, gateway: Arc<dyn BookingGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn build(self) -> Result<VerticalEngine> {
        self.config.validate()?;

        // 未指定的協作者共用同一個 HTTP gateway
        let config = &self.config;
        let mut shared_http: Option<Arc<HttpGateway>> = None;
        let mut http = || -> Result<Arc<HttpGateway>> {
            if let Some(existing) = &shared_http {
                return Ok(Arc::clone(existing));
            }
            let created = Arc::new(HttpGateway::from_config(config)?);
            shared_http = Some(Arc::clone(&created));
            Ok(created)
        };

        let catalog_source: Arc<dyn CatalogSource> = match self.catalog_source {
            Some(source) => source,
            None => http()?,
        };
        let gateway: Arc<dyn BookingGateway> = match self.gateway {
            Some(gateway) => gateway,
            None => http()?,
        };

        let catalog = CatalogStore::for_vertical(&self.config)?;
        let formatter = PriceFormatter::from_config(&self.config);
        tracing::debug!("Engine ready for vertical {}", self.config.id());

        Ok(VerticalEngine {
            config: Arc::new(self.config),
            catalog_source,
            gateway,
            identity: self.identity,
            catalog,
            comparison: ComparisonSet::new(),
            formatter,
            view: CancellationToken::new(),
        })
    }
}

/// 單一頁面 (一個垂直領域) 的目錄、比較與預約入口
pub struct VerticalEngine {
    config: Arc<VerticalConfig>,
    catalog_source: Arc<dyn CatalogSource>,
    gateway: Arc<dyn BookingGateway>,
    identity: Option<Arc<dyn IdentityProvider>>,
    catalog: CatalogStore,
    comparison: ComparisonSet,
    formatter: PriceFormatter,
    view: CancellationToken,
}

impl VerticalEngine {
    pub fn builder(config: VerticalConfig) -> VerticalEngineBuilder {
        VerticalEngineBuilder {
            config,
            catalog_source: None,
            gateway: None,
            identity: None,
        }
    }

    pub fn config(&self) -> &VerticalConfig {
        &self.config
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    pub fn comparison(&self) -> &ComparisonSet {
        &self.comparison
    }

    pub fn formatter(&self) -> &PriceFormatter {
        &self.formatter
    }

    /// Token for requests issued on behalf of this view; cancelled by
    /// [`VerticalEngine::unmount`].
    pub fn view_token(&self) -> CancellationToken {
        self.view.child_token()
    }

    pub fn is_mounted(&self) -> bool {
        !self.view.is_cancelled()
    }

    /// 離開頁面：取消所有進行中的請求並清空比較
    pub fn unmount(&mut self) {
        tracing::debug!("Unmounting {} view", self.config.id());
        self.view.cancel();
        self.comparison.clear();
    }

    pub async fn load_catalog(&mut self) -> Result<CatalogOrigin> {
        let token = self.view_token();
        self.catalog.load(self.catalog_source.as_ref(), &token).await
    }

    pub async fn service_detail(&self, service_id: &str) -> Result<Option<Service>> {
        let token = self.view_token();
        self.catalog
            .load_detail(self.catalog_source.as_ref(), service_id, &token)
            .await
    }

    pub fn visible_services(&self, category: &str) -> Vec<&Service> {
        filter::filter(self.catalog.services(), category)
    }

    pub fn categories(&self) -> Vec<String> {
        filter::categories(self.catalog.services(), &self.config.categories)
    }

    fn service(&self, service_id: &str) -> Result<&Service> {
        self.catalog
            .find(service_id)
            .ok_or_else(|| EngineError::UnknownService {
                id: service_id.to_string(),
            })
    }

    pub fn toggle_compare(&mut self, service_id: &str) -> Result<ToggleOutcome> {
        let service = self
            .catalog
            .find(service_id)
            .ok_or_else(|| EngineError::UnknownService {
                id: service_id.to_string(),
            })?;
        Ok(self.comparison.toggle(service))
    }

    pub fn clear_comparison(&mut self) {
        self.comparison.clear();
    }

    pub fn compared_services(&self) -> Vec<&Service> {
        self.comparison.resolve(self.catalog.services())
    }

    pub fn comparison_table(&self) -> ComparisonTable {
        ComparisonTable::build(&self.compared_services(), &self.formatter)
    }

    /// Opens a booking session for one catalog service (also used by "book"
    /// from the comparison view).
    pub fn start_booking(&self, service_id: &str) -> Result<BookingSession> {
        let service = self.service(service_id)?.clone();
        let mut session = BookingSession::new(
            Arc::clone(&self.config),
            Arc::clone(&self.gateway),
            self.identity.clone(),
        );
        session.select_service(service)?;
        Ok(session)
    }

    pub fn tracker(&self) -> TrackingLookup {
        TrackingLookup::new(Arc::clone(&self.gateway))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::booking_session::BookingState;
    use crate::domain::booking::{BookingRequest, BookingResult, TrackingQuery};
    use async_trait::async_trait;

    struct Offline;

    #[async_trait]
    impl CatalogSource for Offline {
        async fn fetch_services(&self, _endpoint: &str) -> Result<Vec<Service>> {
            Err(EngineError::Unreachable {
                message: "offline".to_string(),
            })
        }

        async fn fetch_service(&self, _endpoint: &str) -> Result<Option<Service>> {
            Err(EngineError::Unreachable {
                message: "offline".to_string(),
            })
        }
    }

    #[async_trait]
    impl BookingGateway for Offline {
        async fn submit_booking(&self, _request: &BookingRequest) -> Result<BookingResult> {
            Err(EngineError::Unreachable {
                message: "offline".to_string(),
            })
        }

        async fn track_booking(&self, _query: &TrackingQuery) -> Result<BookingResult> {
            Err(EngineError::Unreachable {
                message: "offline".to_string(),
            })
        }
    }

    fn offline_engine(vertical: &str) -> VerticalEngine {
        let offline = Arc::new(Offline);
        VerticalEngine::builder(VerticalConfig::preset(vertical).unwrap())
            .catalog_source(offline.clone())
            .gateway(offline)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_offline_engine_serves_fallback_catalog() {
        let mut engine = offline_engine("home-services");
        let origin = engine.load_catalog().await.unwrap();

        assert_eq!(origin, CatalogOrigin::Fallback);
        assert_eq!(engine.visible_services("All").len(), 8);
        assert_eq!(engine.visible_services("Appliance Repair").len(), 2);
        assert_eq!(
            engine.categories(),
            vec![
                "All",
                "Cleaning",
                "Plumbing",
                "Electrical",
                "Appliance Repair",
                "Pest Control",
                "Painting"
            ]
        );
    }

    #[tokio::test]
    async fn test_compare_then_book() {
        let mut engine = offline_engine("construction");
        engine.load_catalog().await.unwrap();

        for id in ["con-001", "con-002", "con-003"] {
            assert_eq!(engine.toggle_compare(id).unwrap(), ToggleOutcome::Added);
        }
        assert_eq!(
            engine.toggle_compare("con-004").unwrap(),
            ToggleOutcome::Rejected
        );
        assert!(engine.toggle_compare("missing").is_err());

        let table = engine.comparison_table();
        assert_eq!(table.headers.len(), 3);
        assert_eq!(table.rows[0].values[1], "₹45.0L");

        let session = engine.start_booking("con-002").unwrap();
        assert_eq!(session.state(), BookingState::ServiceSelected);
        // 比較與預約互不影響
        assert_eq!(engine.comparison().len(), 3);
    }

    #[tokio::test]
    async fn test_unmount_cancels_view_requests() {
        let mut engine = offline_engine("construction");
        engine.load_catalog().await.unwrap();
        engine.toggle_compare("con-001").unwrap();

        engine.unmount();

        assert!(!engine.is_mounted());
        assert!(engine.comparison().is_empty());
        assert!(engine.view_token().is_cancelled());
        assert!(matches!(
            engine.load_catalog().await,
            Err(EngineError::Cancelled)
        ));
        // 已載入的資料不受影響
        assert_eq!(engine.catalog().services().len(), 6);
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let mut config = VerticalConfig::preset("construction").unwrap();
        config.source.base_url = "not a url".to_string();
        assert!(VerticalEngine::builder(config).build().is_err());
    }
}
