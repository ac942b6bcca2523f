//! The three aggregate shapes the dashboard panels consume.

use serde::Serialize;

use crate::aggregate::{Aggregate, KeyColumn, Target, ValueColumn, aggregate};
use crate::domain::Dataset;
use crate::error::DataResult;

/// Total sales per region (proportion view).
pub fn region_sales(dataset: &Dataset) -> DataResult<Aggregate> {
    aggregate(dataset.rows(), &[KeyColumn::Region], &[Target::sum(ValueColumn::Sales)])
}

/// Mean sales, customers and avg purchase per category (comparison view).
pub fn category_means(dataset: &Dataset) -> DataResult<Aggregate> {
    aggregate(
        dataset.rows(),
        &[KeyColumn::Category],
        &[
            Target::mean(ValueColumn::Sales),
            Target::mean(ValueColumn::Customers),
            Target::mean(ValueColumn::AvgPurchase),
        ],
    )
}

/// Total sales per (month, category) cell (heat map view).
pub fn month_category_sales(dataset: &Dataset) -> DataResult<Aggregate> {
    aggregate(
        dataset.rows(),
        &[KeyColumn::YearMonth, KeyColumn::Category],
        &[Target::sum(ValueColumn::Sales)],
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardAggregates {
    pub region_sales: Aggregate,
    pub category_means: Aggregate,
    pub month_category_sales: Aggregate,
}

pub fn compute_all(dataset: &Dataset) -> DataResult<DashboardAggregates> {
    Ok(DashboardAggregates {
        region_sales: region_sales(dataset)?,
        category_means: category_means(dataset)?,
        month_category_sales: month_category_sales(dataset)?,
    })
}
