use crate::config::VerticalConfig;
use crate::domain::model::Service;
use crate::domain::ports::CatalogSource;
use crate::fallback;
use crate::utils::error::{EngineError, Result};
use tokio_util::sync::CancellationToken;

/// 目前目錄資料的來源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogOrigin {
    NotLoaded,
    Remote,
    Fallback,
}

/// Services of one vertical for the lifetime of a page view.
///
/// `load` never leaves the list empty because of the backend: any failure is
/// absorbed by switching to the bundled dataset.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    endpoint: String,
    fallback: Vec<Service>,
    services: Vec<Service>,
    loading: bool,
    origin: CatalogOrigin,
}

impl CatalogStore {
    pub fn new(endpoint: impl Into<String>, fallback: Vec<Service>) -> Self {
        Self {
            endpoint: endpoint.into(),
            fallback,
            services: Vec::new(),
            loading: false,
            origin: CatalogOrigin::NotLoaded,
        }
    }

    pub fn for_vertical(config: &VerticalConfig) -> Result<Self> {
        let fallback = fallback::fallback_services(&config.fallback_dataset)?;
        Ok(Self::new(config.catalog_endpoint(), fallback))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn origin(&self) -> CatalogOrigin {
        self.origin
    }

    pub fn find(&self, service_id: &str) -> Option<&Service> {
        self.services.iter().find(|service| service.id == service_id)
    }

    /// 單次抓取，不重試；失敗時改用內建資料
    pub async fn load(
        &mut self,
        source: &dyn CatalogSource,
        cancel: &CancellationToken,
    ) -> Result<CatalogOrigin> {
        self.loading = true;
        tracing::info!("📥 Loading catalog from: {}", self.endpoint);

        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = source.fetch_services(&self.endpoint) => Some(result),
        };
        self.loading = false;

        let fetched = match fetched {
            Some(result) => result,
            None => {
                tracing::debug!("Catalog load cancelled, view already gone");
                return Err(EngineError::Cancelled);
            }
        };

        match fetched {
            Ok(services) if !services.is_empty() => {
                tracing::info!("✅ Loaded {} services from remote catalog", services.len());
                self.services = services;
                self.origin = CatalogOrigin::Remote;
            }
            Ok(_) => {
                tracing::warn!("⚠️ Remote catalog is empty, using bundled services");
                self.use_fallback();
            }
            Err(e) => {
                tracing::warn!("⚠️ Catalog unavailable ({}), using bundled services", e);
                self.use_fallback();
            }
        }

        Ok(self.origin)
    }

    fn use_fallback(&mut self) {
        self.services = self.fallback.clone();
        self.origin = CatalogOrigin::Fallback;
    }

    /// Detail page lookup. `Ok(None)` means the backend does not know the id and
    /// the caller should go back to the catalog. Transport failures are answered
    /// from the loaded list or the bundled dataset.
    pub async fn load_detail(
        &self,
        source: &dyn CatalogSource,
        service_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Service>> {
        let endpoint = format!("{}/{}", self.endpoint, service_id);
        tracing::debug!("Fetching service detail from: {}", endpoint);

        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(EngineError::Cancelled),
            result = source.fetch_service(&endpoint) => result,
        };

        match fetched {
            Ok(detail) => Ok(detail),
            Err(e) => {
                tracing::warn!("⚠️ Service detail unavailable ({}), using local data", e);
                Ok(self
                    .find(service_id)
                    .or_else(|| self.fallback.iter().find(|s| s.id == service_id))
                    .cloned())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Pricing;
    use async_trait::async_trait;

    fn service(id: &str) -> Service {
        Service {
            id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            category: "Cleaning".to_string(),
            images: vec![],
            pricing: Pricing::Fixed { base_price: 100.0 },
            duration: None,
            features: vec![],
            popular: false,
            trending: false,
            rating: None,
        }
    }

    enum Reply {
        Services(Vec<Service>),
        Fail,
        Hang,
    }

    struct MockSource {
        reply: Reply,
    }

    #[async_trait]
    impl CatalogSource for MockSource {
        async fn fetch_services(&self, _endpoint: &str) -> Result<Vec<Service>> {
            match &self.reply {
                Reply::Services(services) => Ok(services.clone()),
                Reply::Fail => Err(EngineError::Unreachable {
                    message: "connection refused".to_string(),
                }),
                Reply::Hang => std::future::pending().await,
            }
        }

        async fn fetch_service(&self, endpoint: &str) -> Result<Option<Service>> {
            match &self.reply {
                Reply::Services(services) => Ok(services
                    .iter()
                    .find(|s| endpoint.ends_with(&format!("/{}", s.id)))
                    .cloned()),
                Reply::Fail => Err(EngineError::Unreachable {
                    message: "connection refused".to_string(),
                }),
                Reply::Hang => std::future::pending().await,
            }
        }
    }

    fn store() -> CatalogStore {
        CatalogStore::new("http://test/services/home-services", vec![service("fb-1"), service("fb-2")])
    }

    #[tokio::test]
    async fn test_load_remote_services() {
        let mut store = store();
        let source = MockSource {
            reply: Reply::Services(vec![service("r-1")]),
        };

        let origin = store.load(&source, &CancellationToken::new()).await.unwrap();

        assert_eq!(origin, CatalogOrigin::Remote);
        assert_eq!(store.services().len(), 1);
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_load_failure_uses_fallback() {
        let mut store = store();
        let source = MockSource { reply: Reply::Fail };

        let origin = store.load(&source, &CancellationToken::new()).await.unwrap();

        assert_eq!(origin, CatalogOrigin::Fallback);
        let ids: Vec<&str> = store.services().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["fb-1", "fb-2"]);
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_empty_remote_uses_fallback() {
        let mut store = store();
        let source = MockSource {
            reply: Reply::Services(vec![]),
        };

        let origin = store.load(&source, &CancellationToken::new()).await.unwrap();
        assert_eq!(origin, CatalogOrigin::Fallback);
        assert_eq!(store.services().len(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_load_is_noop() {
        let mut store = store();
        let source = MockSource { reply: Reply::Hang };
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = store.load(&source, &cancel).await;

        assert!(matches!(result, Err(EngineError::Cancelled)));
        assert!(store.services().is_empty());
        assert_eq!(store.origin(), CatalogOrigin::NotLoaded);
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_detail_lookup() {
        let store = store();
        let source = MockSource {
            reply: Reply::Services(vec![service("r-1")]),
        };
        let cancel = CancellationToken::new();

        let found = store.load_detail(&source, "r-1", &cancel).await.unwrap();
        assert_eq!(found.unwrap().id, "r-1");

        let missing = store.load_detail(&source, "nope", &cancel).await.unwrap();
        assert!(missing.is_none());

        // 連線失敗時改查內建資料
        let offline = MockSource { reply: Reply::Fail };
        let local = store.load_detail(&offline, "fb-2", &cancel).await.unwrap();
        assert_eq!(local.unwrap().id, "fb-2");
    }

    #[test]
    fn test_for_vertical_uses_bundled_dataset() {
        let config = VerticalConfig::preset("construction").unwrap();
        let store = CatalogStore::for_vertical(&config).unwrap();
        assert!(store.endpoint().ends_with("/services/construction"));
        assert_eq!(store.origin(), CatalogOrigin::NotLoaded);
    }
}
