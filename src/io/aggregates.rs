//! Read/write aggregate JSON files.
//!
//! The file carries the dataset key next to the three aggregates so a reader
//! can tell which seed/row count produced them. The schema is `AggregatesFile`.

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::aggregate::{Aggregate, DashboardAggregates};
use crate::domain::DatasetConfig;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatesFile {
    pub tool: String,
    pub seed: u64,
    pub row_count: i64,
    pub start_date: NaiveDate,
    pub region_sales: Aggregate,
    pub category_means: Aggregate,
    pub month_category_sales: Aggregate,
}

impl AggregatesFile {
    /// The three aggregates, without the dataset key.
    pub fn aggregates(&self) -> DashboardAggregates {
        DashboardAggregates {
            region_sales: self.region_sales.clone(),
            category_means: self.category_means.clone(),
            month_category_sales: self.month_category_sales.clone(),
        }
    }
}

/// Write an aggregates JSON file.
pub fn write_aggregates_json(
    path: &Path,
    aggregates: &DashboardAggregates,
    config: &DatasetConfig,
) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| {
            let msg = format!("Failed to create aggregates JSON '{}': {e}", path.display());
            AppError::new(2, msg)
        })?;

    let out = AggregatesFile {
        tool: "dash".to_string(),
        seed: config.seed,
        row_count: config.row_count,
        start_date: config.start_date,
        region_sales: aggregates.region_sales.clone(),
        category_means: aggregates.category_means.clone(),
        month_category_sales: aggregates.month_category_sales.clone(),
    };

    serde_json::to_writer_pretty(file, &out)
        .map_err(|e| AppError::new(2, format!("Failed to write aggregates JSON: {e}")))?;

    log::info!("exported aggregates to {}", path.display());
    Ok(())
}

/// Read an aggregates JSON file.
pub fn read_aggregates_json(path: &Path) -> Result<AggregatesFile, AppError> {
    let file = File::open(path)
        .map_err(|e| {
            let msg = format!("Failed to open aggregates JSON '{}': {e}", path.display());
            AppError::new(2, msg)
        })?;
    let parsed: AggregatesFile = serde_json::from_reader(file)
        .map_err(|e| AppError::new(2, format!("Invalid aggregates JSON: {e}")))?;
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{KeyColumn, compute_all};
    use crate::data::assemble;

    #[test]
    fn written_file_reads_back_with_its_key() {
        let config = DatasetConfig::default();
        let ds = assemble(&config).unwrap();
        let aggregates = compute_all(&ds).unwrap();
        let path = std::env::temp_dir()
            .join(format!("sales-dash-aggs-{}.json", std::process::id()));

        write_aggregates_json(&path, &aggregates, &config).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let back = read_aggregates_json(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert!(text.contains("\"year_month\""));
        assert_eq!(back.seed, 42);
        assert_eq!(back.start_date, config.start_date);
        assert_eq!(
            back.month_category_sales.key_columns,
            vec![KeyColumn::YearMonth, KeyColumn::Category]
        );
        let restored = back.aggregates();
        assert_eq!(restored.region_sales.rows.len(), aggregates.region_sales.rows.len());
        assert_eq!(restored.category_means.targets, aggregates.category_means.targets);
    }

    #[test]
    fn missing_file_is_a_usage_error() {
        let err = read_aggregates_json(Path::new("/definitely/not/here.json")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
