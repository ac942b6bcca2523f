//! Shared dashboard pipeline used by the CLI and the TUI front-ends.
//!
//! assemble (memoized) -> region / category / month×category aggregates
//!
//! The front-ends then focus on presentation (printing, exporting, widgets).

use std::sync::Arc;

use crate::aggregate::{DashboardAggregates, compute_all};
use crate::data::Assembler;
use crate::domain::{Dataset, DatasetConfig};
use crate::error::AppError;

/// Everything a front-end needs to draw one dashboard frame.
#[derive(Debug, Clone)]
pub struct DashboardRun {
    pub dataset: Arc<Dataset>,
    pub aggregates: DashboardAggregates,
}

/// Fetch the session dataset (building it on first use) and derive fresh aggregates.
pub fn run_dashboard(
    assembler: &mut Assembler,
    config: &DatasetConfig,
) -> Result<DashboardRun, AppError> {
    let dataset = assembler.dataset(config)?;
    let aggregates = compute_all(&dataset)?;
    Ok(DashboardRun { dataset, aggregates })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reruns_share_the_dataset_but_recompute_aggregates() {
        let mut assembler = Assembler::new();
        let config = DatasetConfig::default();

        let first = run_dashboard(&mut assembler, &config).unwrap();
        let second = run_dashboard(&mut assembler, &config).unwrap();

        assert!(Arc::ptr_eq(&first.dataset, &second.dataset));
        assert_eq!(first.aggregates, second.aggregates);
        assert_eq!(assembler.build_count(), 1);
    }

    #[test]
    fn invalid_row_count_is_a_usage_error() {
        let mut assembler = Assembler::new();
        let config = DatasetConfig {
            row_count: -5,
            ..DatasetConfig::default()
        };
        let err = run_dashboard(&mut assembler, &config).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
