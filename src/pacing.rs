// Pacing: how far actuals are ahead of or behind a time-prorated target.
use crate::aggregate::{group_sum, sum_measures, GroupField, Inclusion, Measures};
use crate::config::EngineConfig;
use crate::types::Dataset;
use crate::util::safe_ratio;
use log::warn;
use serde::Serialize;
use std::cmp::Ordering;

/// Ratio at or above which pacing is on track.
pub const GOOD_RATIO: f64 = 1.0;
/// Ratio at or above which pacing is slightly behind.
pub const OK_RATIO: f64 = 0.9;
/// A channel is worth flagging once its gap drops below this.
pub const FOCUS_GAP: f64 = -0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PacingStatus {
    Good,
    Ok,
    Bad,
}

impl PacingStatus {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio >= GOOD_RATIO {
            PacingStatus::Good
        } else if ratio >= OK_RATIO {
            PacingStatus::Ok
        } else {
            PacingStatus::Bad
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PacingStatus::Good => "good",
            PacingStatus::Ok => "ok",
            PacingStatus::Bad => "bad",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PacingResult {
    pub actual: f64,
    pub prorated_target: f64,
    pub ratio: f64,
    pub status: PacingStatus,
}

impl PacingResult {
    /// Compare `actual` with an already prorated target.
    pub fn new(actual: f64, prorated_target: f64) -> Self {
        let ratio = safe_ratio(actual, prorated_target);
        Self {
            actual,
            prorated_target,
            ratio,
            status: PacingStatus::from_ratio(ratio),
        }
    }
}

/// Days elapsed in the month being paced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Elapsed {
    pub days_passed: f64,
    pub total_days: f64,
}

impl Elapsed {
    pub fn new(days_passed: f64, total_days: f64) -> Self {
        if total_days > 0.0 && days_passed > total_days {
            warn!(
                "Days_Passed {} exceeds Total_Days_in_Month {}; clamping",
                days_passed, total_days
            );
            return Self { days_passed: total_days, total_days };
        }
        Self { days_passed, total_days }
    }

    /// Elapsed days as reported on the first weekly record. Missing values
    /// default to day 0 of a 1-day month.
    pub fn from_weekly(weekly: &Dataset) -> Self {
        let first = weekly.records().first();
        let days_passed = first.and_then(|r| r.days_passed()).unwrap_or(0.0);
        let total_days = first.and_then(|r| r.total_days_in_month()).unwrap_or(1.0);
        Self::new(days_passed, total_days)
    }

    /// Share of the month gone by; 0 when the month length is not positive.
    pub fn fraction(&self) -> f64 {
        if self.total_days > 0.0 {
            self.days_passed / self.total_days
        } else {
            0.0
        }
    }
}

pub fn prorate(full_target: f64, elapsed: Elapsed) -> f64 {
    full_target * elapsed.fraction()
}

pub fn pace(actual: f64, full_target: f64, elapsed: Elapsed) -> PacingResult {
    PacingResult::new(actual, prorate(full_target, elapsed))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum KpiPacing {
    /// Running totals are shown as-is, without a ratio.
    Cumulative { actual: f64, target: f64 },
    Paced(PacingResult),
}

pub fn pace_kpi(kpi: &str, actual: f64, full_target: f64, elapsed: Elapsed, config: &EngineConfig) -> KpiPacing {
    if config.is_cumulative(kpi) {
        KpiPacing::Cumulative { actual, target: full_target }
    } else {
        KpiPacing::Paced(pace(actual, full_target, elapsed))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelPacing {
    pub channel: Option<String>,
    pub actual: f64,
    pub prorated_target: f64,
}

impl ChannelPacing {
    /// `actual / prorated - 1`, or 0 without a positive target.
    pub fn gap(&self) -> f64 {
        if self.prorated_target > 0.0 {
            self.actual / self.prorated_target - 1.0
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FocusChannel {
    pub channel: Option<String>,
    pub gap: f64,
}

/// The channel furthest behind, if it is more than 5% behind.
///
/// Channels are sorted by gap ascending with a stable sort, so on exact ties
/// the earliest channel wins.
pub fn worst_channel(channels: &[ChannelPacing]) -> Option<FocusChannel> {
    let mut gaps: Vec<(usize, f64)> = channels.iter().map(|c| c.gap()).enumerate().collect();
    gaps.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
    let (idx, gap) = *gaps.first()?;
    if gap < FOCUS_GAP {
        Some(FocusChannel { channel: channels[idx].channel.clone(), gap })
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformPulse {
    pub platform: String,
    pub records: usize,
    pub full_target: f64,
    pub pacing: KpiPacing,
    pub focus: Option<FocusChannel>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiPulse {
    pub kpi: String,
    pub platforms: Vec<PlatformPulse>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyPulse {
    pub elapsed: Elapsed,
    pub kpis: Vec<KpiPulse>,
}

fn channel_pacings(weekly: &Dataset, kpi: &str, platform: &str, multiplier: f64, config: &EngineConfig) -> Vec<ChannelPacing> {
    group_sum(
        weekly,
        Some(kpi),
        &[GroupField::Channel],
        Measures::MtdFullMonth,
        &Inclusion::Platform(platform.to_string()),
        config,
    )
    .into_iter()
    .map(|b| ChannelPacing {
        channel: b.key.channel,
        actual: b.totals.actual,
        prorated_target: b.totals.target * multiplier,
    })
    .collect()
}

/// Pacing of every KPI in the weekly log, per platform.
///
/// KPIs keep the order they first appear in. Within a KPI the portal comes
/// before the pseudo platform and platforms without records are left out.
/// The focus diagnostic only runs on the portal of a core KPI with more than
/// one record.
pub fn weekly_pulse(weekly: &Dataset, config: &EngineConfig) -> WeeklyPulse {
    let elapsed = Elapsed::from_weekly(weekly);
    let mut kpis: Vec<&str> = Vec::new();
    for kpi in weekly.iter().filter_map(|r| r.kpi()) {
        if !kpis.contains(&kpi) {
            kpis.push(kpi);
        }
    }

    let kpis = kpis
        .into_iter()
        .map(|kpi| {
            let platforms = config
                .platforms()
                .into_iter()
                .filter_map(|platform| {
                    let totals = sum_measures(
                        weekly,
                        Some(kpi),
                        Measures::MtdFullMonth,
                        &Inclusion::Platform(platform.to_string()),
                    );
                    if totals.records == 0 {
                        return None;
                    }
                    let focus = if platform == config.portal_platform && config.is_core(kpi) && totals.records > 1 {
                        let multiplier = if config.is_cumulative(kpi) { 1.0 } else { elapsed.fraction() };
                        worst_channel(&channel_pacings(weekly, kpi, platform, multiplier, config))
                    } else {
                        None
                    };
                    Some(PlatformPulse {
                        platform: platform.to_string(),
                        records: totals.records,
                        full_target: totals.target,
                        pacing: pace_kpi(kpi, totals.actual, totals.target, elapsed, config),
                        focus,
                    })
                })
                .collect();
            KpiPulse { kpi: kpi.to_string(), platforms }
        })
        .collect();

    WeeklyPulse { elapsed, kpis }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Record;
    use approx::assert_relative_eq;

    fn channel(name: &str, actual: f64, prorated: f64) -> ChannelPacing {
        ChannelPacing { channel: Some(name.to_string()), actual, prorated_target: prorated }
    }

    #[test]
    fn status_thresholds() {
        assert_eq!(PacingStatus::from_ratio(1.0), PacingStatus::Good);
        assert_eq!(PacingStatus::from_ratio(1.7), PacingStatus::Good);
        assert_eq!(PacingStatus::from_ratio(0.9), PacingStatus::Ok);
        assert_eq!(PacingStatus::from_ratio(0.999), PacingStatus::Ok);
        assert_eq!(PacingStatus::from_ratio(0.8999), PacingStatus::Bad);
        assert_eq!(PacingStatus::from_ratio(0.0), PacingStatus::Bad);
    }

    #[test]
    fn prorated_pacing_behind() {
        let r = pace(90.0, 310.0, Elapsed::new(10.0, 30.0));
        assert_relative_eq!(r.prorated_target, 103.333_333, epsilon = 1e-5);
        assert_relative_eq!(r.ratio, 0.870_967, epsilon = 1e-5);
        assert_eq!(r.status, PacingStatus::Bad);
    }

    #[test]
    fn zero_day_month_never_divides() {
        let r = pace(90.0, 310.0, Elapsed::new(10.0, 0.0));
        assert_eq!(r.prorated_target, 0.0);
        assert_eq!(r.ratio, 0.0);
        assert!(r.ratio.is_finite());
        assert_eq!(r.status, PacingStatus::Bad);
    }

    #[test]
    fn elapsed_days_are_clamped_to_month_length() {
        let e = Elapsed::new(35.0, 30.0);
        assert_eq!(e.days_passed, 30.0);
        assert_eq!(e.fraction(), 1.0);
    }

    #[test]
    fn elapsed_defaults_without_weekly_data() {
        let e = Elapsed::from_weekly(&Dataset::default());
        assert_eq!(e.days_passed, 0.0);
        assert_eq!(e.total_days, 1.0);
        assert_eq!(e.fraction(), 0.0);
    }

    #[test]
    fn cumulative_kpis_are_not_paced() {
        let cfg = EngineConfig::default();
        let p = pace_kpi("Registered Customers", 500.0, 600.0, Elapsed::new(10.0, 30.0), &cfg);
        assert_eq!(p, KpiPacing::Cumulative { actual: 500.0, target: 600.0 });
        let p = pace_kpi("Volume UC", 50.0, 100.0, Elapsed::new(15.0, 30.0), &cfg);
        assert!(matches!(p, KpiPacing::Paced(r) if r.status == PacingStatus::Good));
    }

    #[test]
    fn worst_channel_flags_only_beyond_five_percent() {
        let flagged = worst_channel(&[channel("LKA", 98.0, 100.0), channel("DSD", 80.0, 100.0)]);
        let f = flagged.unwrap();
        assert_eq!(f.channel.as_deref(), Some("DSD"));
        assert_relative_eq!(f.gap, -0.2, epsilon = 1e-12);

        assert!(worst_channel(&[channel("LKA", 96.0, 100.0), channel("DSD", 120.0, 100.0)]).is_none());
        // exactly 5% behind is not flagged
        assert!(worst_channel(&[channel("LKA", 95.0, 100.0)]).is_none());
        assert!(worst_channel(&[]).is_none());
    }

    #[test]
    fn worst_channel_ties_keep_insertion_order() {
        let f = worst_channel(&[
            channel("WHS", 120.0, 100.0),
            channel("LKA", 50.0, 100.0),
            channel("DSD", 25.0, 50.0),
        ])
        .unwrap();
        assert_eq!(f.channel.as_deref(), Some("LKA"));
    }

    #[test]
    fn zero_target_channel_has_no_gap() {
        assert_eq!(channel("LKA", 10.0, 0.0).gap(), 0.0);
        assert!(worst_channel(&[channel("LKA", 0.0, 0.0)]).is_none());
    }

    fn weekly(kpi: &str, platform: &str, ch: &str, mtd: &str, full: &str) -> Record {
        Record::from_pairs(&[
            ("KPI", kpi),
            ("Platform", platform),
            ("Channel", ch),
            ("MTD_Actual", mtd),
            ("Full_Month_Target", full),
            ("Days_Passed", "10"),
            ("Total_Days_in_Month", "30"),
        ])
    }

    #[test]
    fn weekly_pulse_per_platform_with_focus() {
        let cfg = EngineConfig::default();
        let ds = Dataset::from_records(vec![
            weekly("Volume UC", "Customer Portal", "LKA", "40", "120"),
            weekly("Volume UC", "Customer Portal", "DSD", "20", "90"),
            weekly("Volume UC", "Chatbot", "", "30", "100"),
            weekly("Registered Customers", "Customer Portal", "LKA", "500", "400"),
        ]);
        let pulse = weekly_pulse(&ds, &cfg);
        assert_relative_eq!(pulse.elapsed.fraction(), 1.0 / 3.0);
        assert_eq!(pulse.kpis.len(), 2);

        let volume = &pulse.kpis[0];
        assert_eq!(volume.kpi, "Volume UC");
        assert_eq!(volume.platforms.len(), 2);
        let portal = &volume.platforms[0];
        assert_eq!(portal.platform, "Customer Portal");
        assert_relative_eq!(portal.full_target, 210.0);
        match portal.pacing {
            KpiPacing::Paced(r) => {
                assert_relative_eq!(r.actual, 60.0);
                assert_relative_eq!(r.prorated_target, 70.0);
                assert_eq!(r.status, PacingStatus::Bad);
            }
            _ => panic!("expected paced result"),
        }
        // LKA 40 vs 40 on track, DSD 20 vs 30 behind by a third
        let focus = portal.focus.as_ref().unwrap();
        assert_eq!(focus.channel.as_deref(), Some("DSD"));
        assert!(volume.platforms[1].focus.is_none());

        let registered = &pulse.kpis[1];
        assert_eq!(registered.platforms.len(), 1);
        assert_eq!(
            registered.platforms[0].pacing,
            KpiPacing::Cumulative { actual: 500.0, target: 400.0 }
        );
    }

    #[test]
    fn empty_weekly_log_has_no_rows() {
        let pulse = weekly_pulse(&Dataset::default(), &EngineConfig::default());
        assert!(pulse.kpis.is_empty());
    }
}
