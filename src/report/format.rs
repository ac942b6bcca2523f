//! Plain-text tables for `dash summary` and `dash show`.

use crate::aggregate::{Aggregate, DashboardAggregates};
use crate::domain::{Dataset, DatasetConfig, Row};
use crate::io::AggregatesFile;

/// Format the header block: config + dataset stats.
pub fn format_dataset_summary(dataset: &Dataset, config: &DatasetConfig) -> String {
    let mut out = String::new();

    out.push_str("=== dash - Sales Data Dashboard ===\n");
    out.push_str(&format!("Seed: {} | Rows requested: {}\n", config.seed, config.row_count));

    match dataset.stats() {
        Some(stats) => {
            out.push_str(&format!(
                "Dates: {} .. {} ({} days)\n",
                stats.first_date, stats.last_date, stats.n_rows
            ));
            out.push_str(&format!(
                "Totals: sales={:.2} | customers={} | revenue={:.2}\n",
                stats.total_sales, stats.total_customers, stats.total_revenue
            ));
        }
        None => out.push_str("Dataset is empty.\n"),
    }

    out
}

/// Format the first `limit` rows of the table.
pub fn format_rows(rows: &[Row], limit: usize) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<10} {:>8} {:>9} {:>12} {:<8} {:<6} {:>10} {:<7}",
            "date", "sales", "customers", "avg_purchase", "category", "region", "revenue", "month"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(&format!(
        "{:-<10} {:-<8} {:-<9} {:-<12} {:-<8} {:-<6} {:-<10} {:-<7}\n",
        "", "", "", "", "", "", "", ""
    ));

    for r in rows.iter().take(limit) {
        out.push_str(
            format!(
                "{:<10} {:>8.2} {:>9} {:>12.2} {:<8} {:<6} {:>10} {:<7}",
                r.date.to_string(),
                r.sales,
                r.customers,
                r.avg_purchase,
                r.category.label(),
                r.region.label(),
                r.revenue().map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".to_string()),
                r.year_month().unwrap_or("-"),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    if rows.len() > limit {
        out.push_str(&format!("... {} more rows\n", rows.len() - limit));
    }

    out
}

/// Format all three dashboard aggregates.
pub fn format_aggregates(aggregates: &DashboardAggregates) -> String {
    let mut out = String::new();
    out.push_str(&format_aggregate("Sales by region", &aggregates.region_sales));
    out.push('\n');
    out.push_str(&format_aggregate("Category averages", &aggregates.category_means));
    out.push('\n');
    out.push_str(&format_aggregate(
        "Sales by month and category",
        &aggregates.month_category_sales,
    ));
    out
}

/// Format an aggregates file read back from disk, headed by the dataset it came from.
pub fn format_saved_aggregates(saved: &AggregatesFile) -> String {
    let mut out = format!(
        "Aggregates from {}: seed {} | {} rows from {}\n\n",
        saved.tool, saved.seed, saved.row_count, saved.start_date
    );
    out.push_str(&format_aggregates(&saved.aggregates()));
    out
}

/// Format one aggregate as a table. Value headers read `<reduction>(<column>)`.
pub fn format_aggregate(title: &str, agg: &Aggregate) -> String {
    let mut out = format!("{title}:\n");
    if agg.is_empty() {
        out.push_str("(no groups)\n");
        return out;
    }

    let mut header: Vec<String> =
        agg.key_columns.iter().map(|k| format!("{:<10}", k.name())).collect();
    header.extend(
        agg.targets
            .iter()
            .map(|t| format!("{:>20}", format!("{}({})", t.reduction, t.column.name()))),
    );
    out.push_str(header.join(" ").trim_end());
    out.push('\n');

    for r in &agg.rows {
        let mut cells: Vec<String> = r.keys.iter().map(|k| format!("{k:<10}")).collect();
        cells.extend(r.values.iter().map(|v| format!("{v:>20.2}")));
        out.push_str(cells.join(" ").trim_end());
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{KeyColumn, Target, ValueColumn, aggregate};
    use crate::data::assemble;

    #[test]
    fn saved_aggregates_carry_their_dataset_key() {
        let config = DatasetConfig::default();
        let aggregates = crate::aggregate::compute_all(&assemble(&config).unwrap()).unwrap();
        let saved = AggregatesFile {
            tool: "dash".to_string(),
            seed: config.seed,
            row_count: config.row_count,
            start_date: config.start_date,
            region_sales: aggregates.region_sales.clone(),
            category_means: aggregates.category_means.clone(),
            month_category_sales: aggregates.month_category_sales.clone(),
        };

        let txt = format_saved_aggregates(&saved);
        assert!(txt.starts_with("Aggregates from dash: seed 42 | 100 rows from 2023-01-01\n\n"));
        assert!(txt.ends_with(&format_aggregates(&aggregates)));
    }

    #[test]
    fn aggregate_table_snapshot() {
        let ds = assemble(&DatasetConfig {
            row_count: 3,
            ..DatasetConfig::default()
        })
        .unwrap();
        let customers = Target::sum(ValueColumn::Customers);
        let agg = aggregate(ds.rows(), &[KeyColumn::YearMonth], &[customers]).unwrap();
        let total: u32 = ds.rows().iter().map(|r| r.customers).sum();

        let txt = format_aggregate("By month", &agg);
        let expected = format!(
            "By month:\nyear_month       sum(customers)\n2023-01    {:>20.2}\n",
            f64::from(total)
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn rows_are_truncated_with_a_note() {
        let ds = assemble(&DatasetConfig::default()).unwrap();
        let txt = format_rows(ds.rows(), 5);
        assert_eq!(txt.lines().count(), 2 + 5 + 1);
        assert!(txt.contains("2023-01-01"));
        assert!(!txt.contains("2023-01-06"));
        assert!(txt.ends_with("... 95 more rows\n"));
    }

    #[test]
    fn summary_mentions_date_span() {
        let config = DatasetConfig::default();
        let ds = assemble(&config).unwrap();
        let txt = format_dataset_summary(&ds, &config);
        assert!(txt.contains("Dates: 2023-01-01 .. 2023-04-10 (100 days)"));
    }
}
