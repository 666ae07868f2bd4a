use crate::aggregate::{sum_measures, Inclusion, Measures};
use crate::config::EngineConfig;
use crate::pacing::{prorate, Elapsed};
use crate::types::Dataset;
use serde::Serialize;

/// Which slice of data a drill-down reads.
#[derive(Debug, Clone, Copy)]
pub enum BreakdownSource<'a> {
    /// A closed month, usually the latest period of the historical log.
    Monthly(&'a Dataset),
    /// The in-progress month; targets are prorated by `Elapsed`.
    Weekly(&'a Dataset, Elapsed),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelBreakdown {
    pub kpi: String,
    pub labels: Vec<String>,
    pub actuals: Vec<f64>,
    /// `None` for ratio-style KPIs that have no target.
    pub targets: Option<Vec<f64>>,
}

/// Per-channel values of one KPI: every configured channel in order, then the
/// pseudo platform. Channels without data read as 0.
pub fn channel_breakdown(kpi: &str, source: BreakdownSource<'_>, config: &EngineConfig) -> ChannelBreakdown {
    let (dataset, measures, multiplier) = match source {
        BreakdownSource::Monthly(ds) => (ds, Measures::ActualTarget, 1.0),
        BreakdownSource::Weekly(ds, elapsed) => (ds, Measures::MtdFullMonth, prorate(1.0, elapsed)),
    };
    let with_targets = !config.is_non_target(kpi);

    let slices = config
        .channels
        .iter()
        .map(|ch| {
            (
                ch.clone(),
                Inclusion::ChannelOf {
                    channel: ch.clone(),
                    exclude_platform: config.pseudo_platform.clone(),
                },
            )
        })
        .chain(std::iter::once((
            config.pseudo_platform.clone(),
            Inclusion::Platform(config.pseudo_platform.clone()),
        )));

    let mut out = ChannelBreakdown {
        kpi: kpi.to_string(),
        labels: Vec::new(),
        actuals: Vec::new(),
        targets: with_targets.then(Vec::new),
    };
    for (label, inclusion) in slices {
        let totals = sum_measures(dataset, Some(kpi), measures, &inclusion);
        out.labels.push(label);
        out.actuals.push(totals.actual);
        if let Some(targets) = out.targets.as_mut() {
            targets.push(totals.target * multiplier);
        }
    }
    out
}
