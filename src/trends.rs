use crate::config::EngineConfig;
use crate::period::month_index;
use crate::types::Dataset;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub month: String,
    pub actual: Option<f64>,
    pub target: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    pub kpi: String,
    pub points: Vec<TrendPoint>,
}

fn push_unique<T: PartialEq>(out: &mut Vec<T>, item: T) {
    if !out.contains(&item) {
        out.push(item);
    }
}

/// Distinct platforms in first-seen order.
pub fn platforms(dataset: &Dataset) -> Vec<String> {
    let mut out = Vec::new();
    for p in dataset.iter().filter_map(|r| r.platform()) {
        push_unique(&mut out, p.to_string());
    }
    out
}

/// Distinct channels of one platform; `None` stands for rows without one.
pub fn channels_for(dataset: &Dataset, platform: &str) -> Vec<Option<String>> {
    let mut out = Vec::new();
    for r in dataset.iter().filter(|r| r.platform() == Some(platform)) {
        push_unique(&mut out, r.channel().map(str::to_string));
    }
    out
}

/// Month-ordered Actual/Target points for every KPI of a platform/channel.
///
/// Records keep their relative order within a month; rows with an unknown
/// month are skipped.
pub fn trend_series(
    dataset: &Dataset,
    platform: &str,
    channel: Option<&str>,
    config: &EngineConfig,
) -> Vec<TrendSeries> {
    let selection = dataset.filter(|r| r.platform() == Some(platform) && r.channel() == channel);
    let mut kpis: Vec<&str> = Vec::new();
    for k in selection.iter().filter_map(|r| r.kpi()) {
        push_unique(&mut kpis, k);
    }

    kpis.into_iter()
        .filter_map(|kpi| {
            let mut rows: Vec<(usize, TrendPoint)> = selection
                .iter()
                .filter(|r| r.kpi() == Some(kpi))
                .filter_map(|r| {
                    let idx = month_index(r, config)?;
                    Some((
                        idx,
                        TrendPoint {
                            month: r.month().unwrap_or_default().to_string(),
                            actual: r.actual(),
                            target: r.target(),
                        },
                    ))
                })
                .collect();
            if rows.is_empty() {
                return None;
            }
            rows.sort_by_key(|(idx, _)| *idx);
            Some(TrendSeries {
                kpi: kpi.to_string(),
                points: rows.into_iter().map(|(_, p)| p).collect(),
            })
        })
        .collect()
}
