// Flatten engine results into display rows for the CLI tables and CSV exports.
use crate::config::EngineConfig;
use crate::pacing::{KpiPacing, WeeklyPulse};
use crate::summary::CoreKpi;
use crate::types::{CoreKpiRow, PulseRow, YtdMonthRow};
use crate::util::{format_percent, format_value};
use crate::ytd::YtdRollup;

fn split(kpi: &str, config: &EngineConfig, portal: Option<f64>, pseudo: Option<f64>) -> String {
    format!(
        "{}: {} | {}: {}",
        config.portal_platform,
        format_value(kpi, portal, false),
        config.pseudo_platform,
        format_value(kpi, pseudo, false)
    )
}

pub fn core_kpi_rows(core: &[CoreKpi], config: &EngineConfig) -> Vec<CoreKpiRow> {
    core.iter()
        .map(|k| CoreKpiRow {
            kpi: k.kpi.clone(),
            actual: format_value(&k.kpi, Some(k.total_actual), false),
            target: format_value(&k.kpi, Some(k.total_target), false),
            performance: k.performance.map(|p| format_percent(p.ratio)).unwrap_or_default(),
            status: k.performance.map(|p| p.status.as_str().to_string()).unwrap_or_default(),
            actual_split: split(&k.kpi, config, k.portal.actual, k.pseudo.actual),
            target_split: split(&k.kpi, config, k.portal.target, k.pseudo.target),
        })
        .collect()
}

pub fn pulse_rows(pulse: &WeeklyPulse) -> Vec<PulseRow> {
    let mut rows = Vec::new();
    for k in &pulse.kpis {
        for p in &k.platforms {
            let (actual, prorated, pacing) = match p.pacing {
                KpiPacing::Cumulative { actual, .. } => (actual, String::new(), String::new()),
                KpiPacing::Paced(r) => (
                    r.actual,
                    format_value(&k.kpi, Some(r.prorated_target), true),
                    format!("{} ({})", format_percent(r.ratio), r.status.as_str()),
                ),
            };
            let focus = p
                .focus
                .as_ref()
                .map(|f| {
                    format!(
                        "{} behind by {:.0}%",
                        f.channel.as_deref().unwrap_or("N/A"),
                        (f.gap * 100.0).abs()
                    )
                })
                .unwrap_or_default();
            rows.push(PulseRow {
                kpi: k.kpi.clone(),
                platform: p.platform.clone(),
                mtd_actual: format_value(&k.kpi, Some(actual), false),
                prorated_target: prorated,
                pacing,
                full_month_target: format_value(&k.kpi, Some(p.full_target), false),
                focus,
            });
        }
    }
    rows
}

pub fn ytd_rows(rollups: &[YtdRollup], config: &EngineConfig) -> Vec<YtdMonthRow> {
    let mut rows = Vec::new();
    for y in rollups {
        for (label, b) in y.month_labels(config).into_iter().zip(&y.months) {
            rows.push(YtdMonthRow {
                kpi: y.kpi.clone(),
                month: label.to_string(),
                actual: format_value(&y.kpi, Some(b.totals.actual), false),
                target: format_value(&y.kpi, Some(b.totals.target), false),
            });
        }
        rows.push(YtdMonthRow {
            kpi: y.kpi.clone(),
            month: format!("YTD ({})", format_percent(y.performance.ratio)),
            actual: format_value(&y.kpi, Some(y.total_actual), false),
            target: format_value(&y.kpi, Some(y.total_target), false),
        });
    }
    rows
}
