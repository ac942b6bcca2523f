//! Export the dataset to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts;
//! columns match the in-memory table exactly.

use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::Dataset;
use crate::error::{AppError, DataError};

#[derive(Debug, Serialize)]
struct RowRecord<'a> {
    date: NaiveDate,
    sales: f64,
    customers: u32,
    avg_purchase: f64,
    category: &'static str,
    region: &'static str,
    revenue: f64,
    year_month: &'a str,
}

/// Write every row of `dataset` to a CSV file with a header line.
pub fn write_dataset_csv(path: &Path, dataset: &Dataset) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| {
            AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display()))
        })?;

    for (index, row) in dataset.rows().iter().enumerate() {
        let derived = row
            .derived
            .as_ref()
            .ok_or(DataError::IncompleteRow { index, date: row.date })?;
        writer
            .serialize(RowRecord {
                date: row.date,
                sales: row.sales,
                customers: row.customers,
                avg_purchase: row.avg_purchase,
                category: row.category.label(),
                region: row.region.label(),
                revenue: derived.revenue,
                year_month: &derived.year_month,
            })
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;

    log::info!("exported {} rows to {}", dataset.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::assemble;
    use crate::domain::DatasetConfig;

    #[test]
    fn csv_has_header_and_one_line_per_row() {
        let ds = assemble(&DatasetConfig {
            row_count: 12,
            ..DatasetConfig::default()
        })
        .unwrap();
        let path = std::env::temp_dir()
            .join(format!("sales-dash-export-{}.csv", std::process::id()));

        write_dataset_csv(&path, &ds).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("date,sales,customers,avg_purchase,category,region,revenue,year_month")
        );
        let first = lines.next().unwrap();
        assert!(first.starts_with("2023-01-01,"), "{first}");
        assert!(first.ends_with(",2023-01"), "{first}");
        assert_eq!(text.lines().count(), 13);
    }
}
