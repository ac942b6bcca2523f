//! Group-by aggregation over dataset rows.
//!
//! An aggregation takes one or more key columns and one or more
//! `(value column, reduction)` targets, and emits one output row per distinct
//! key combination present in the input. Groups are kept in a `BTreeMap`, so
//! output is sorted by key; callers should still not rely on the order.
//!
//! An empty row slice yields an empty aggregate, not an error.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{DerivedFields, Row};
use crate::error::{DataError, DataResult};

pub mod views;

pub use views::{
    DashboardAggregates, category_means, compute_all, month_category_sales, region_sales,
};

/// Columns that can be grouped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyColumn {
    YearMonth,
    Category,
    Region,
}

impl KeyColumn {
    pub fn name(self) -> &'static str {
        match self {
            KeyColumn::YearMonth => "year_month",
            KeyColumn::Category => "category",
            KeyColumn::Region => "region",
        }
    }

    fn value(self, row: &Row, derived: &DerivedFields) -> String {
        match self {
            KeyColumn::YearMonth => derived.year_month.clone(),
            KeyColumn::Category => row.category.label().to_string(),
            KeyColumn::Region => row.region.label().to_string(),
        }
    }
}

/// Numeric columns that can be reduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueColumn {
    Sales,
    Customers,
    AvgPurchase,
    Revenue,
}

impl ValueColumn {
    pub fn name(self) -> &'static str {
        match self {
            ValueColumn::Sales => "sales",
            ValueColumn::Customers => "customers",
            ValueColumn::AvgPurchase => "avg_purchase",
            ValueColumn::Revenue => "revenue",
        }
    }

    fn value(self, row: &Row, derived: &DerivedFields) -> f64 {
        match self {
            ValueColumn::Sales => row.sales,
            ValueColumn::Customers => f64::from(row.customers),
            ValueColumn::AvgPurchase => row.avg_purchase,
            ValueColumn::Revenue => derived.revenue,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reduction {
    Sum,
    Mean,
}

impl FromStr for Reduction {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sum" => Ok(Reduction::Sum),
            "mean" | "avg" => Ok(Reduction::Mean),
            other => Err(DataError::InvalidArgument(format!(
                "unknown reduction '{other}' (expected sum or mean)"
            ))),
        }
    }
}

impl fmt::Display for Reduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reduction::Sum => f.write_str("sum"),
            Reduction::Mean => f.write_str("mean"),
        }
    }
}

/// One reduced output column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub column: ValueColumn,
    pub reduction: Reduction,
}

impl Target {
    pub fn sum(column: ValueColumn) -> Self {
        Self {
            column,
            reduction: Reduction::Sum,
        }
    }

    pub fn mean(column: ValueColumn) -> Self {
        Self {
            column,
            reduction: Reduction::Mean,
        }
    }
}

/// One output row: key values (in `key_columns` order) and reduced values
/// (in `targets` order).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub keys: Vec<String>,
    pub values: Vec<f64>,
    /// Number of input rows in the group.
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub key_columns: Vec<KeyColumn>,
    pub targets: Vec<Target>,
    pub rows: Vec<AggregateRow>,
}

impl Aggregate {
    /// Find the output row for an exact key combination.
    pub fn get(&self, keys: &[&str]) -> Option<&AggregateRow> {
        self.rows
            .iter()
            .find(|r| r.keys.len() == keys.len() && r.keys.iter().zip(keys).all(|(a, b)| a == b))
    }

    /// Reduced value of `target` for an exact key combination.
    ///
    /// A column may be reduced more than once (say sum and mean), so lookups
    /// match on the full target, not the column alone.
    pub fn value(&self, keys: &[&str], target: Target) -> Option<f64> {
        let idx = self.targets.iter().position(|t| *t == target)?;
        self.get(keys).and_then(|r| r.values.get(idx).copied())
    }

    /// Distinct values of key column `idx`, in output order.
    pub fn distinct_keys(&self, idx: usize) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for r in &self.rows {
            if let Some(k) = r.keys.get(idx) {
                if !out.contains(k) {
                    out.push(k.clone());
                }
            }
        }
        out
    }

    /// Sum of the reduced values in target column `idx` across all groups.
    pub fn column_total(&self, idx: usize) -> f64 {
        self.rows.iter().filter_map(|r| r.values.get(idx)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Default)]
struct Accumulator {
    count: usize,
    sums: Vec<f64>,
}

/// Group `rows` by `keys` and reduce each target.
pub fn aggregate(rows: &[Row], keys: &[KeyColumn], targets: &[Target]) -> DataResult<Aggregate> {
    if keys.is_empty() {
        return Err(DataError::InvalidArgument(
            "aggregation needs at least one key column".into(),
        ));
    }
    if targets.is_empty() {
        return Err(DataError::InvalidArgument(
            "aggregation needs at least one target column".into(),
        ));
    }

    let mut groups: BTreeMap<Vec<String>, Accumulator> = BTreeMap::new();
    for (index, row) in rows.iter().enumerate() {
        let derived = row
            .derived
            .as_ref()
            .ok_or(DataError::IncompleteRow { index, date: row.date })?;

        let key: Vec<String> = keys.iter().map(|k| k.value(row, derived)).collect();
        let acc = groups.entry(key).or_insert_with(|| Accumulator {
            count: 0,
            sums: vec![0.0; targets.len()],
        });
        acc.count += 1;
        for (slot, target) in acc.sums.iter_mut().zip(targets) {
            *slot += target.column.value(row, derived);
        }
    }

    let out_rows = groups
        .into_iter()
        .map(|(keys, acc)| {
            let values = acc
                .sums
                .iter()
                .zip(targets)
                .map(|(&sum, target)| match target.reduction {
                    Reduction::Sum => sum,
                    // Groups only exist once a row lands in them, so count >= 1.
                    Reduction::Mean => sum / acc.count as f64,
                })
                .collect();
            AggregateRow {
                keys,
                values,
                count: acc.count,
            }
        })
        .collect::<Vec<_>>();

    log::debug!(
        "aggregated {} rows by [{}] into {} groups",
        rows.len(),
        keys.iter().map(|k| k.name()).collect::<Vec<_>>().join(", "),
        out_rows.len()
    );

    Ok(Aggregate {
        key_columns: keys.to_vec(),
        targets: targets.to_vec(),
        rows: out_rows,
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::data::derive_all;
    use crate::domain::{Category, Region};

    fn rows() -> Vec<Row> {
        let fixtures = [
            (1, 100.0, 60, 10.0, Category::A, Region::East),
            (2, 200.0, 80, 20.0, Category::A, Region::West),
            (3, 300.0, 100, 30.0, Category::B, Region::East),
            (35, 400.0, 120, 40.0, Category::A, Region::East),
        ];
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let base = fixtures
            .iter()
            .map(|&(day, sales, customers, avg, category, region)| Row {
                date: start + chrono::Days::new(day - 1),
                sales,
                customers,
                avg_purchase: avg,
                category,
                region,
                derived: None,
            })
            .collect();
        derive_all(base)
    }

    #[test]
    fn sum_by_single_key() {
        let sales = Target::sum(ValueColumn::Sales);
        let agg = aggregate(&rows(), &[KeyColumn::Region], &[sales]).unwrap();
        assert_eq!(agg.rows.len(), 2);
        assert_eq!(agg.value(&["East"], sales), Some(800.0));
        assert_eq!(agg.value(&["West"], sales), Some(200.0));
        assert_eq!(agg.get(&["East"]).unwrap().count, 3);
    }

    #[test]
    fn mean_of_several_columns() {
        let targets = [
            Target::mean(ValueColumn::Sales),
            Target::mean(ValueColumn::Customers),
            Target::mean(ValueColumn::AvgPurchase),
        ];
        let agg = aggregate(&rows(), &[KeyColumn::Category], &targets).unwrap();
        let a = agg.get(&["A"]).unwrap();
        assert_eq!(a.values, vec![700.0 / 3.0, 260.0 / 3.0, 70.0 / 3.0]);
        assert_eq!(agg.value(&["B"], Target::mean(ValueColumn::Customers)), Some(100.0));
        assert_eq!(agg.value(&["B"], Target::sum(ValueColumn::Customers)), None);
    }

    #[test]
    fn same_column_reduced_twice_keeps_both_values() {
        let targets = [Target::sum(ValueColumn::Sales), Target::mean(ValueColumn::Sales)];
        let agg = aggregate(&rows(), &[KeyColumn::Region], &targets).unwrap();
        assert_eq!(agg.value(&["East"], Target::sum(ValueColumn::Sales)), Some(800.0));
        assert_eq!(agg.value(&["East"], Target::mean(ValueColumn::Sales)), Some(800.0 / 3.0));
    }

    #[test]
    fn composite_key_splits_months() {
        let sales = Target::sum(ValueColumn::Sales);
        let keys = [KeyColumn::YearMonth, KeyColumn::Category];
        let agg = aggregate(&rows(), &keys, &[sales]).unwrap();
        assert_eq!(agg.rows.len(), 3);
        assert_eq!(agg.value(&["2023-01", "A"], sales), Some(300.0));
        assert_eq!(agg.value(&["2023-02", "A"], sales), Some(400.0));
        assert_eq!(agg.value(&["2023-02", "B"], sales), None);
        assert_eq!(agg.distinct_keys(0), vec!["2023-01", "2023-02"]);
    }

    #[test]
    fn revenue_target_uses_derived_column() {
        let revenue = Target::sum(ValueColumn::Revenue);
        let agg = aggregate(&rows(), &[KeyColumn::Category], &[revenue]).unwrap();
        assert_eq!(agg.value(&["B"], revenue), Some(9000.0));
    }

    #[test]
    fn empty_input_gives_empty_aggregate() {
        let agg = aggregate(&[], &[KeyColumn::Region], &[Target::sum(ValueColumn::Sales)]).unwrap();
        assert!(agg.is_empty());
        assert_eq!(agg.column_total(0), 0.0);
    }

    #[test]
    fn missing_keys_or_targets_are_invalid() {
        let err = aggregate(&rows(), &[], &[Target::sum(ValueColumn::Sales)]).unwrap_err();
        assert!(matches!(err, DataError::InvalidArgument(_)));
        let err = aggregate(&rows(), &[KeyColumn::Region], &[]).unwrap_err();
        assert!(matches!(err, DataError::InvalidArgument(_)));
    }

    #[test]
    fn incomplete_rows_are_fatal() {
        let mut rows = rows();
        rows[2].derived = None;
        let err =
            aggregate(&rows, &[KeyColumn::Region], &[Target::sum(ValueColumn::Sales)]).unwrap_err();
        assert_eq!(
            err,
            DataError::IncompleteRow {
                index: 2,
                date: NaiveDate::from_ymd_opt(2023, 1, 3).unwrap(),
            }
        );
    }

    #[test]
    fn reduction_parsing() {
        assert_eq!("sum".parse::<Reduction>().unwrap(), Reduction::Sum);
        assert_eq!(" Mean ".parse::<Reduction>().unwrap(), Reduction::Mean);
        let err = "median".parse::<Reduction>().unwrap_err();
        assert!(matches!(err, DataError::InvalidArgument(ref m) if m.contains("median")));
    }
}
