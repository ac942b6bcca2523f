//! Synthetic daily sales series generation.
//!
//! One `Pcg64Mcg` stream is seeded once per dataset and drawn column by column,
//! in this fixed order:
//!
//! 1. `sales` base integers in `[100, 500)`
//! 2. `customers` in `[50, 200)`
//! 3. `avg_purchase` in `[10.0, 50.0)`
//! 4. `category`
//! 5. `region`
//!
//! Changing the order (or interleaving columns) changes every value downstream.

use chrono::{Days, NaiveDate};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

use crate::domain::{Category, DatasetConfig, Region, Row};
use crate::error::{DataError, DataResult};

const SALES_RANGE: std::ops::Range<i64> = 100..500;
const CUSTOMERS_RANGE: std::ops::Range<u32> = 50..200;
const AVG_PURCHASE_RANGE: std::ops::Range<f64> = 10.0..50.0;

/// Radians covered by the sales wave from the first row to the last.
const SALES_WAVE_SPAN: f64 = 10.0;
/// Peak deviation the wave adds to (or removes from) the base sales draw.
const SALES_WAVE_AMPLITUDE: f64 = 50.0;

/// Largest series the generator will materialize (a little over 2700 years of days).
pub const MAX_ROW_COUNT: i64 = 1_000_000;

/// Validate a requested row count.
pub fn validate_row_count(row_count: i64) -> DataResult<usize> {
    if row_count <= 0 {
        return Err(DataError::InvalidArgument(format!(
            "row count must be > 0 (got {row_count})"
        )));
    }
    if row_count > MAX_ROW_COUNT {
        return Err(DataError::InvalidArgument(format!(
            "row count must be <= {MAX_ROW_COUNT} (got {row_count})"
        )));
    }
    usize::try_from(row_count).map_err(|_| {
        DataError::InvalidArgument(format!("row count {row_count} does not fit in memory"))
    })
}

/// Date of row `index`, or `InvalidArgument` past the last representable day.
fn date_at(start: NaiveDate, index: usize) -> DataResult<NaiveDate> {
    start.checked_add_days(Days::new(index as u64)).ok_or_else(|| {
        DataError::InvalidArgument(format!(
            "day {index} after {start} runs past the last representable date"
        ))
    })
}

/// Generate base rows (no derived fields yet).
pub fn generate_rows(config: &DatasetConfig) -> DataResult<Vec<Row>> {
    let n = validate_row_count(config.row_count)?;
    // The last date bounds every other one; check it before drawing anything.
    date_at(config.start_date, n - 1)?;
    let mut rng = Pcg64Mcg::seed_from_u64(config.seed);

    let sales_base: Vec<i64> = (0..n).map(|_| rng.gen_range(SALES_RANGE)).collect();
    let customers: Vec<u32> = (0..n).map(|_| rng.gen_range(CUSTOMERS_RANGE)).collect();
    let avg_purchase: Vec<f64> = (0..n).map(|_| rng.gen_range(AVG_PURCHASE_RANGE)).collect();
    let categories: Vec<Category> = (0..n)
        .map(|_| Category::ALL[rng.gen_range(0..Category::ALL.len())])
        .collect();
    let regions: Vec<Region> = (0..n)
        .map(|_| Region::ALL[rng.gen_range(0..Region::ALL.len())])
        .collect();

    let mut rows = Vec::with_capacity(n);
    for i in 0..n {
        let date = date_at(config.start_date, i)?;
        rows.push(Row {
            date,
            sales: sales_base[i] as f64 + sales_wave(i, n),
            customers: customers[i],
            avg_purchase: avg_purchase[i],
            category: categories[i],
            region: regions[i],
            derived: None,
        });
    }

    log::debug!("generated {n} base rows (seed={})", config.seed);
    Ok(rows)
}

/// Smooth perturbation added to the sales draw at `index` of `n` rows.
///
/// Sample points are evenly spaced over `[0, SALES_WAVE_SPAN]`, inclusive at
/// both ends, so the first row always gets `0.0`.
pub fn sales_wave(index: usize, n: usize) -> f64 {
    if n < 2 {
        return 0.0;
    }
    let x = SALES_WAVE_SPAN * index as f64 / (n - 1) as f64;
    x.sin() * SALES_WAVE_AMPLITUDE
}
