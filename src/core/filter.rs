use crate::domain::model::Service;

pub const ALL_CATEGORIES: &str = "All";

/// 依分類篩選，`"All"` 回傳全部，保持原本順序
pub fn filter<'a>(services: &'a [Service], category: &str) -> Vec<&'a Service> {
    if category == ALL_CATEGORIES {
        return services.iter().collect();
    }
    services
        .iter()
        .filter(|service| service.category == category)
        .collect()
}

/// Category tabs: `"All"` first, then the configured categories that have at
/// least one service (in configured order), then any other category found in
/// the catalog in first-seen order.
pub fn categories(services: &[Service], configured: &[String]) -> Vec<String> {
    let mut result = vec![ALL_CATEGORIES.to_string()];
    for category in configured {
        if services.iter().any(|s| &s.category == category) && !result.contains(category) {
            result.push(category.clone());
        }
    }
    for service in services {
        if !result.contains(&service.category) {
            result.push(service.category.clone());
        }
    }
    result
}
