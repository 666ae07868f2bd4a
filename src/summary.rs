// Cross-platform figures of the latest closed month.
use crate::aggregate::{sum_measures, Inclusion, Measures, Totals};
use crate::config::EngineConfig;
use crate::pacing::PacingResult;
use crate::types::Dataset;
use serde::Serialize;

/// Actual and target of one platform; `None` where the log had no number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PlatformValues {
    pub actual: Option<f64>,
    pub target: Option<f64>,
}

impl From<Totals> for PlatformValues {
    fn from(t: Totals) -> Self {
        Self {
            actual: t.actual_if_any(),
            target: t.target_if_any(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoreKpi {
    pub kpi: String,
    pub portal: PlatformValues,
    pub pseudo: PlatformValues,
    pub total_actual: f64,
    pub total_target: f64,
    /// Only present when there is a positive total target.
    pub performance: Option<PacingResult>,
    pub has_ytd: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticalCard {
    pub kpi: String,
    pub portal_actual: Option<f64>,
    pub pseudo_actual: Option<f64>,
}

fn platform_values(latest: &Dataset, kpi: &str, config: &EngineConfig) -> (Totals, Totals) {
    let portal = sum_measures(
        latest,
        Some(kpi),
        Measures::ActualTarget,
        &Inclusion::PlatformChannel {
            platform: config.portal_platform.clone(),
            channel: Some(config.total_channel.clone()),
        },
    );
    let pseudo = sum_measures(
        latest,
        Some(kpi),
        Measures::ActualTarget,
        &Inclusion::Platform(config.pseudo_platform.clone()),
    );
    (portal, pseudo)
}

/// Portal rollup plus pseudo platform for every core KPI.
pub fn core_kpi_table(latest: &Dataset, config: &EngineConfig) -> Vec<CoreKpi> {
    config
        .core_kpis
        .iter()
        .map(|kpi| {
            let (portal, pseudo) = platform_values(latest, kpi, config);
            let total_actual = portal.actual + pseudo.actual;
            let total_target = portal.target + pseudo.target;
            CoreKpi {
                kpi: kpi.clone(),
                portal: portal.into(),
                pseudo: pseudo.into(),
                total_actual,
                total_target,
                performance: (total_target > 0.0).then(|| PacingResult::new(total_actual, total_target)),
                has_ytd: config.ytd_kpis.contains(kpi),
            }
        })
        .collect()
}

/// Per-platform actuals of the ratio-style KPIs that have any data.
pub fn analytical_cards(latest: &Dataset, config: &EngineConfig) -> Vec<AnalyticalCard> {
    config
        .non_target_kpis
        .iter()
        .filter_map(|kpi| {
            let (portal, pseudo) = platform_values(latest, kpi, config);
            if portal.records == 0 && pseudo.records == 0 {
                return None;
            }
            Some(AnalyticalCard {
                kpi: kpi.clone(),
                portal_actual: portal.actual_if_any(),
                pseudo_actual: pseudo.actual_if_any(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pacing::PacingStatus;
    use crate::types::Record;
    use approx::assert_relative_eq;

    fn rec(kpi: &str, platform: &str, channel: &str, actual: &str, target: &str) -> Record {
        Record::from_pairs(&[
            ("KPI", kpi),
            ("Platform", platform),
            ("Channel", channel),
            ("Actual", actual),
            ("Target", target),
        ])
    }

    #[test]
    fn core_table_sums_platforms() {
        let cfg = EngineConfig::default();
        let ds = Dataset::from_records(vec![
            rec("Volume UC", "Customer Portal", "Total", "100", "120"),
            rec("Volume UC", "Customer Portal", "LKA", "60", "70"),
            rec("Volume UC", "Chatbot", "", "20", "10"),
            rec("Active Customers", "Customer Portal", "Total", "50", ""),
        ]);
        let table = core_kpi_table(&ds, &cfg);
        assert_eq!(table.len(), 4);

        let volume = table.iter().find(|r| r.kpi == "Volume UC").unwrap();
        assert_relative_eq!(volume.total_actual, 120.0);
        assert_relative_eq!(volume.total_target, 130.0);
        assert_eq!(volume.performance.unwrap().status, PacingStatus::Ok);
        assert_eq!(volume.portal.actual, Some(100.0));
        assert_eq!(volume.pseudo.target, Some(10.0));
        assert!(volume.has_ytd);

        let active = table.iter().find(|r| r.kpi == "Active Customers").unwrap();
        assert!(active.performance.is_none());
        assert_eq!(active.pseudo, PlatformValues::default());
        assert!(!active.has_ytd);

        let registered = table.iter().find(|r| r.kpi == "Registered Customers").unwrap();
        assert_eq!(registered.total_actual, 0.0);
        assert!(registered.performance.is_none());
    }

    #[test]
    fn analytical_cards_skip_kpis_without_rows() {
        let cfg = EngineConfig::default();
        let ds = Dataset::from_records(vec![
            rec("UC per Order", "Chatbot", "", "3.4", ""),
            rec("Order Frequency", "Customer Portal", "LKA", "2.0", ""),
        ]);
        let cards = analytical_cards(&ds, &cfg);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].kpi, "UC per Order");
        assert_eq!(cards[0].portal_actual, None);
        assert_eq!(cards[0].pseudo_actual, Some(3.4));
    }
}
