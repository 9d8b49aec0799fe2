use crate::core::pricing::PriceFormatter;
use crate::domain::model::Service;
use crate::utils::error::Result;
use std::io::Write;

pub const MAX_COMPARED: usize = 3;
pub const MIN_TO_COMPARE: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// 已達上限，集合不變
    Rejected,
}

/// Up to three service ids selected for side-by-side comparison, kept in
/// selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComparisonSet {
    ids: Vec<String>,
}

impl ComparisonSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, service: &Service) -> ToggleOutcome {
        if let Some(index) = self.ids.iter().position(|id| *id == service.id) {
            self.ids.remove(index);
            return ToggleOutcome::Removed;
        }

        if self.is_full() {
            tracing::debug!(
                "Comparison is full ({} services), ignoring {}",
                MAX_COMPARED,
                service.id
            );
            return ToggleOutcome::Rejected;
        }

        self.ids.push(service.id.clone());
        ToggleOutcome::Added
    }

    /// 不修改原集合，回傳切換後的新集合
    pub fn toggled(&self, service: &Service) -> Self {
        let mut next = self.clone();
        next.toggle(service);
        next
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, service_id: &str) -> bool {
        self.ids.iter().any(|id| id == service_id)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// 已達上限時 UI 應停用「加入比較」
    pub fn is_full(&self) -> bool {
        self.ids.len() >= MAX_COMPARED
    }

    pub fn can_compare(&self) -> bool {
        self.ids.len() >= MIN_TO_COMPARE
    }

    /// Selected services in selection order. Ids missing from `catalog` are skipped.
    pub fn resolve<'a>(&self, catalog: &'a [Service]) -> Vec<&'a Service> {
        self.ids
            .iter()
            .filter_map(|id| catalog.iter().find(|service| service.id == *id))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonRow {
    pub label: String,
    pub values: Vec<String>,
}

/// 並排比較表：每個欄位一列，每個服務一欄
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonTable {
    pub headers: Vec<String>,
    pub rows: Vec<ComparisonRow>,
}

impl ComparisonTable {
    pub fn build(services: &[&Service], formatter: &PriceFormatter) -> Self {
        let headers = services.iter().map(|s| s.title.clone()).collect();

        let row = |label: &str, value: &dyn Fn(&Service) -> String| ComparisonRow {
            label: label.to_string(),
            values: services.iter().map(|s| value(*s)).collect(),
        };

        let rows = vec![
            row("Price", &|s| formatter.format(&s.pricing)),
            row("Category", &|s| s.category.clone()),
            row("Duration", &|s| {
                s.duration
                    .as_ref()
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".to_string())
            }),
            row("Rating", &|s| {
                s.rating
                    .as_ref()
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| "-".to_string())
            }),
            row("Features", &|s| s.features.join("; ")),
            row("Popular", &|s| yes_no(s.popular || s.trending)),
        ];

        Self { headers, rows }
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        let mut header = vec![String::new()];
        header.extend(self.headers.iter().cloned());
        csv_writer.write_record(&header)?;

        for row in &self.rows {
            let mut record = vec![row.label.clone()];
            record.extend(row.values.iter().cloned());
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

fn yes_no(value: bool) -> String {
    if value { "Yes" } else { "No" }.to_string()
}
