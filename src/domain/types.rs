//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory by the aggregation engine and the dashboard
//! - exported to CSV/JSON

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{DataError, DataResult};

/// Seed used when none is supplied.
pub const DEFAULT_SEED: u64 = 42;

/// Number of daily rows in the default dataset.
pub const DEFAULT_ROW_COUNT: i64 = 100;

/// First calendar day of the default dataset.
pub fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Product category label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    A,
    B,
    C,
    D,
}

impl Category {
    /// Draw order used by the generator. Never reorder: indices feed the RNG mapping.
    pub const ALL: [Category; 4] = [Category::A, Category::B, Category::C, Category::D];

    pub fn label(self) -> &'static str {
        match self {
            Category::A => "A",
            Category::B => "B",
            Category::C => "C",
            Category::D => "D",
        }
    }
}

/// Sales region label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Region {
    East,
    West,
    North,
    South,
}

impl Region {
    /// Draw order used by the generator. Never reorder: indices feed the RNG mapping.
    pub const ALL: [Region; 4] = [Region::East, Region::West, Region::North, Region::South];

    pub fn label(self) -> &'static str {
        match self {
            Region::East => "East",
            Region::West => "West",
            Region::North => "North",
            Region::South => "South",
        }
    }
}

/// Columns computed from a row's base fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedFields {
    /// `sales * avg_purchase`, unrounded.
    pub revenue: f64,
    /// Calendar month of `date` as `YYYY-MM`.
    pub year_month: String,
}

/// One synthetic daily observation.
///
/// `derived` is `None` only between generation and derivation; a `Dataset`
/// never holds a row without it.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub date: NaiveDate,
    pub sales: f64,
    pub customers: u32,
    pub avg_purchase: f64,
    pub category: Category,
    pub region: Region,
    pub derived: Option<DerivedFields>,
}

impl Row {
    pub fn revenue(&self) -> Option<f64> {
        self.derived.as_ref().map(|d| d.revenue)
    }

    pub fn year_month(&self) -> Option<&str> {
        self.derived.as_ref().map(|d| d.year_month.as_str())
    }
}

/// Inputs that fully determine a dataset.
///
/// `row_count` is signed so that non-positive requests can be represented
/// (and rejected) rather than silently wrapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetConfig {
    pub seed: u64,
    pub row_count: i64,
    pub start_date: NaiveDate,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            row_count: DEFAULT_ROW_COUNT,
            start_date: default_start_date(),
        }
    }
}

impl DatasetConfig {
    /// Memoization key for the assembler.
    pub fn key(&self) -> DatasetKey {
        DatasetKey {
            seed: self.seed,
            row_count: self.row_count,
            start_date: self.start_date,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DatasetKey {
    pub seed: u64,
    pub row_count: i64,
    pub start_date: NaiveDate,
}

/// Summary numbers shown in report headers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetStats {
    pub n_rows: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub total_sales: f64,
    pub total_customers: u64,
    pub total_revenue: f64,
}

/// The immutable, fully-derived table handed to every consumer.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    key: DatasetKey,
    rows: Vec<Row>,
}

impl Dataset {
    /// Materialize a dataset. Fails if any row is missing its derived fields.
    pub fn new(key: DatasetKey, rows: Vec<Row>) -> DataResult<Self> {
        if let Some((index, row)) = rows.iter().enumerate().find(|(_, r)| r.derived.is_none()) {
            return Err(DataError::IncompleteRow {
                index,
                date: row.date,
            });
        }
        Ok(Self { key, rows })
    }

    pub fn key(&self) -> DatasetKey {
        self.key
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn stats(&self) -> Option<DatasetStats> {
        let first = self.rows.first()?;
        let last = self.rows.last()?;
        Some(DatasetStats {
            n_rows: self.rows.len(),
            first_date: first.date,
            last_date: last.date,
            total_sales: self.rows.iter().map(|r| r.sales).sum(),
            total_customers: self.rows.iter().map(|r| u64::from(r.customers)).sum(),
            total_revenue: self.rows.iter().filter_map(Row::revenue).sum(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(day: u32, derived: bool) -> Row {
        let date = NaiveDate::from_ymd_opt(2023, 1, day).unwrap();
        Row {
            date,
            sales: 200.0,
            customers: 75,
            avg_purchase: 12.5,
            category: Category::B,
            region: Region::North,
            derived: derived.then(|| DerivedFields {
                revenue: 2500.0,
                year_month: "2023-01".to_string(),
            }),
        }
    }

    #[test]
    fn dataset_rejects_rows_without_derived_fields() {
        let key = DatasetConfig::default().key();
        let err = Dataset::new(key, vec![row(1, true), row(2, false)]).unwrap_err();
        assert_eq!(
            err,
            DataError::IncompleteRow {
                index: 1,
                date: NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(),
            }
        );
    }

    #[test]
    fn stats_cover_all_rows() {
        let key = DatasetConfig::default().key();
        let ds = Dataset::new(key, vec![row(1, true), row(2, true), row(3, true)]).unwrap();
        let stats = ds.stats().unwrap();
        assert_eq!(stats.n_rows, 3);
        assert_eq!(stats.first_date, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(stats.last_date, NaiveDate::from_ymd_opt(2023, 1, 3).unwrap());
        assert_eq!(stats.total_sales, 600.0);
        assert_eq!(stats.total_customers, 225);
        assert_eq!(stats.total_revenue, 7500.0);
    }

    #[test]
    fn empty_dataset_has_no_stats() {
        let ds = Dataset::new(DatasetConfig::default().key(), Vec::new()).unwrap();
        assert!(ds.is_empty());
        assert!(ds.stats().is_none());
    }
}
