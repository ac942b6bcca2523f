//! Per-row derived columns.

use crate::domain::{DerivedFields, Row};

/// Compute `revenue` and `year_month` from a row's base fields.
pub fn derive_fields(row: &Row) -> DerivedFields {
    DerivedFields {
        revenue: row.sales * row.avg_purchase,
        year_month: row.date.format("%Y-%m").to_string(),
    }
}

/// Attach derived fields to every row, replacing any existing values.
pub fn derive_all(rows: Vec<Row>) -> Vec<Row> {
    rows.into_iter()
        .map(|mut row| {
            row.derived = Some(derive_fields(&row));
            row
        })
        .collect()
}
