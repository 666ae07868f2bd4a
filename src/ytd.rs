use crate::aggregate::{group_sum, AggregateBucket, GroupField, Inclusion, Measures};
use crate::config::EngineConfig;
use crate::pacing::PacingResult;
use crate::period::{filter_year, latest_year};
use crate::types::Dataset;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YtdRollup {
    pub kpi: String,
    /// One bucket per month with data, ascending by month index.
    pub months: Vec<AggregateBucket>,
    pub total_actual: f64,
    pub total_target: f64,
    /// YTD actual against YTD target, no proration.
    pub performance: PacingResult,
}

impl YtdRollup {
    pub fn month_labels<'a>(&self, config: &'a EngineConfig) -> Vec<&'a str> {
        self.months
            .iter()
            .filter_map(|b| b.month_index.and_then(|i| config.month_label(i)))
            .collect()
    }
}

/// Month-by-month Actual/Target of `kpi` over the records `inclusion` accepts.
///
/// Months missing from the data are absent rather than zero-filled, and rows
/// with an unknown month name are left out.
pub fn ytd_rollup(dataset: &Dataset, kpi: &str, inclusion: &Inclusion, config: &EngineConfig) -> YtdRollup {
    let mut months: Vec<AggregateBucket> = group_sum(
        dataset,
        Some(kpi),
        &[GroupField::Kpi, GroupField::Month],
        Measures::ActualTarget,
        inclusion,
        config,
    )
    .into_iter()
    .filter(|b| b.month_index.is_some())
    .collect();
    months.sort_by_key(|b| b.month_index);

    let total_actual: f64 = months.iter().map(|b| b.totals.actual).sum();
    let total_target: f64 = months.iter().map(|b| b.totals.target).sum();
    YtdRollup {
        kpi: kpi.to_string(),
        months,
        total_actual,
        total_target,
        performance: PacingResult::new(total_actual, total_target),
    }
}

/// `ytd_rollup` restricted to the latest year of the dataset, so equal month
/// names from earlier years are not merged in.
pub fn ytd_current_year(dataset: &Dataset, kpi: &str, inclusion: &Inclusion, config: &EngineConfig) -> YtdRollup {
    match latest_year(dataset) {
        Some(year) => ytd_rollup(&filter_year(dataset, year), kpi, inclusion, config),
        None => ytd_rollup(&Dataset::default(), kpi, inclusion, config),
    }
}
