use httpmock::prelude::*;
use servicebook::fallback::fallback_services;
use servicebook::{CatalogOrigin, ToggleOutcome, VerticalConfig, VerticalEngine};
use std::collections::BTreeSet;

fn engine_for(server: &MockServer, vertical: &str) -> VerticalEngine {
    let mut config = VerticalConfig::preset(vertical).unwrap();
    config.source.base_url = server.url("/api");
    VerticalEngine::builder(config).build().unwrap()
}

fn bundled_ids(dataset: &str) -> BTreeSet<String> {
    fallback_services(dataset)
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect()
}

fn loaded_ids(engine: &VerticalEngine) -> BTreeSet<String> {
    engine
        .catalog()
        .services()
        .iter()
        .map(|s| s.id.clone())
        .collect()
}

#[tokio::test]
async fn test_server_error_falls_back_to_bundled_catalog() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/api/services/construction");
        then.status(500).body("internal error");
    });

    let mut engine = engine_for(&server, "construction");
    let origin = engine.load_catalog().await.unwrap();

    api_mock.assert();
    assert_eq!(origin, CatalogOrigin::Fallback);
    assert_eq!(loaded_ids(&engine), bundled_ids("construction"));
    assert!(!engine.catalog().is_loading());
}

#[tokio::test]
async fn test_payload_without_success_flag_falls_back() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/services/home-services");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"data": [
                {"id": "x-1", "title": "Ghost", "category": "Cleaning"}
            ]}));
    });

    let mut engine = engine_for(&server, "home-services");
    let origin = engine.load_catalog().await.unwrap();

    assert_eq!(origin, CatalogOrigin::Fallback);
    assert_eq!(loaded_ids(&engine), bundled_ids("home-services"));
}

#[tokio::test]
async fn test_empty_remote_catalog_falls_back() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/services/construction");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"success": true, "data": []}));
    });

    let mut engine = engine_for(&server, "construction");
    assert_eq!(engine.load_catalog().await.unwrap(), CatalogOrigin::Fallback);
    assert_eq!(engine.catalog().services().len(), 6);
}

#[tokio::test]
async fn test_remote_catalog_filter_and_compare() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/services/home-services");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "success": true,
                "data": [
                    {"_id": "r-1", "title": "Sofa Cleaning", "category": "Cleaning",
                     "pricing": {"type": "per_unit", "unitPrice": 299, "unitName": "seat"}},
                    {"_id": "r-2", "title": "Tap Repair", "category": "Plumbing",
                     "pricing": {"type": "hourly", "hourlyRate": 349, "minHours": 1},
                     "popular": true},
                    {"_id": "r-3", "title": "Kitchen Cleaning", "category": "Cleaning",
                     "pricing": {"type": "fixed", "basePrice": 1499}}
                ]
            }));
    });

    let mut engine = engine_for(&server, "home-services");
    assert_eq!(engine.load_catalog().await.unwrap(), CatalogOrigin::Remote);

    assert_eq!(engine.categories(), vec!["All", "Cleaning", "Plumbing"]);
    let cleaning: Vec<&str> = engine
        .visible_services("Cleaning")
        .iter()
        .map(|s| s.id.as_str())
        .collect();
    assert_eq!(cleaning, vec!["r-1", "r-3"]);

    assert_eq!(engine.toggle_compare("r-1").unwrap(), ToggleOutcome::Added);
    assert_eq!(engine.toggle_compare("r-2").unwrap(), ToggleOutcome::Added);

    let mut out = Vec::new();
    engine.comparison_table().write_csv(&mut out).unwrap();
    let csv = String::from_utf8(out).unwrap();
    assert!(csv.starts_with(",Sofa Cleaning,Tap Repair"));
    assert!(csv.contains("₹299/seat"));
    assert!(csv.contains("₹349/hr"));
}

#[tokio::test]
async fn test_detail_not_found_returns_none() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/services/construction");
        then.status(500);
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/services/construction/zzz");
        then.status(404)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"success": false, "message": "Service not found"}));
    });

    let mut engine = engine_for(&server, "construction");
    engine.load_catalog().await.unwrap();

    assert!(engine.service_detail("zzz").await.unwrap().is_none());
}

#[tokio::test]
async fn test_detail_answered_locally_when_server_is_down() {
    let mut config = VerticalConfig::preset("construction").unwrap();
    config.source.base_url = "http://127.0.0.1:9/api".to_string();
    config.source.timeout_seconds = Some(2);
    let mut engine = VerticalEngine::builder(config).build().unwrap();

    assert_eq!(engine.load_catalog().await.unwrap(), CatalogOrigin::Fallback);
    let detail = engine.service_detail("con-002").await.unwrap().unwrap();
    assert_eq!(detail.title, "Villa Construction Package");
}

#[tokio::test]
async fn test_service_with_untyped_pricing_keeps_remote_catalog() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/services/home-services");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "success": true,
                "data": [
                    {"_id": "r-1", "title": "Sofa Cleaning", "category": "Cleaning",
                     "pricing": {"type": "fixed", "basePrice": 999}},
                    {"_id": "r-2", "title": "Geyser Repair", "category": "Appliance Repair",
                     "pricing": {"basePrice": 100}},
                    {"_id": "r-3", "title": "Fan Fitting", "category": "Electrical",
                     "pricing": null}
                ]
            }));
    });

    let mut engine = engine_for(&server, "home-services");
    assert_eq!(engine.load_catalog().await.unwrap(), CatalogOrigin::Remote);

    let ids: Vec<&str> = engine
        .catalog()
        .services()
        .iter()
        .map(|s| s.id.as_str())
        .collect();
    assert_eq!(ids, vec!["r-1", "r-2", "r-3"]);

    let geyser = engine.catalog().find("r-2").unwrap();
    assert_eq!(engine.formatter().format(&geyser.pricing), "Contact for pricing");
}
