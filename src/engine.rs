//! Entry point for consumers: an `Engine` carrying the vocabularies, and a
//! `Dashboard` that turns whichever logs loaded into one snapshot.

use crate::aggregate::Inclusion;
use crate::breakdown::{channel_breakdown, BreakdownSource, ChannelBreakdown};
use crate::config::EngineConfig;
use crate::pacing::{pace_kpi, weekly_pulse, Elapsed, KpiPacing, WeeklyPulse};
use crate::period::latest_period;
use crate::summary::{analytical_cards, core_kpi_table, AnalyticalCard, CoreKpi};
use crate::trends::{channels_for, platforms, trend_series, TrendSeries};
use crate::types::{Dataset, Period};
use crate::ytd::{ytd_current_year, YtdRollup};
use log::{info, warn};
use serde::Serialize;

#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn latest_period(&self, historical: &Dataset) -> (Dataset, Option<Period>) {
        latest_period(historical, &self.config)
    }

    pub fn pace(&self, kpi: &str, actual: f64, full_target: f64, elapsed: Elapsed) -> KpiPacing {
        pace_kpi(kpi, actual, full_target, elapsed, &self.config)
    }

    pub fn weekly_pulse(&self, weekly: &Dataset) -> WeeklyPulse {
        weekly_pulse(weekly, &self.config)
    }

    /// Current-year YTD of `kpi` over platform rollup rows.
    pub fn ytd(&self, historical: &Dataset, kpi: &str) -> YtdRollup {
        ytd_current_year(historical, kpi, &Inclusion::rollup(&self.config), &self.config)
    }

    pub fn breakdown(&self, kpi: &str, source: BreakdownSource<'_>) -> ChannelBreakdown {
        channel_breakdown(kpi, source, &self.config)
    }

    pub fn core_kpis(&self, latest: &Dataset) -> Vec<CoreKpi> {
        core_kpi_table(latest, &self.config)
    }

    pub fn analytical_cards(&self, latest: &Dataset) -> Vec<AnalyticalCard> {
        analytical_cards(latest, &self.config)
    }

    pub fn trends(&self, historical: &Dataset, platform: &str, channel: Option<&str>) -> Vec<TrendSeries> {
        trend_series(historical, platform, channel, &self.config)
    }
}

/// Everything a presentation layer needs, computed in one go.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub period: Option<Period>,
    pub weekly: Option<WeeklyPulse>,
    pub core_kpis: Vec<CoreKpi>,
    pub analytical: Vec<AnalyticalCard>,
    pub ytd: Vec<YtdRollup>,
    pub master_trend: Option<YtdRollup>,
    /// Trend series of the first platform/channel in the historical log.
    pub trends: Vec<TrendSeries>,
    pub monthly_breakdowns: Vec<ChannelBreakdown>,
    pub weekly_breakdowns: Vec<ChannelBreakdown>,
}

/// The two logs of one load. Either may be missing; the other is still used.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    engine: Engine,
    historical: Option<Dataset>,
    weekly: Option<Dataset>,
}

impl Dashboard {
    pub fn new(engine: Engine, historical: Option<Dataset>, weekly: Option<Dataset>) -> Self {
        // an empty log is treated like a missing one
        Self {
            engine,
            historical: historical.filter(|d| !d.is_empty()),
            weekly: weekly.filter(|d| !d.is_empty()),
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn historical(&self) -> Option<&Dataset> {
        self.historical.as_ref()
    }

    pub fn weekly(&self) -> Option<&Dataset> {
        self.weekly.as_ref()
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        let cfg = self.engine.config();
        let mut snap = DashboardSnapshot::default();

        if let Some(weekly) = &self.weekly {
            let pulse = self.engine.weekly_pulse(weekly);
            snap.weekly_breakdowns = pulse
                .kpis
                .iter()
                .filter(|k| k.platforms.iter().any(|p| p.platform == cfg.portal_platform))
                .map(|k| self.engine.breakdown(&k.kpi, BreakdownSource::Weekly(weekly, pulse.elapsed)))
                .collect();
            snap.weekly = Some(pulse);
        }

        if let Some(historical) = &self.historical {
            let (latest, period) = self.engine.latest_period(historical);
            // month-closing views only exist for a resolved period
            if period.is_some() {
                snap.core_kpis = self.engine.core_kpis(&latest);
                snap.analytical = self.engine.analytical_cards(&latest);
                snap.monthly_breakdowns = snap
                    .core_kpis
                    .iter()
                    .map(|k| k.kpi.as_str())
                    .chain(snap.analytical.iter().map(|c| c.kpi.as_str()))
                    .map(|kpi| self.engine.breakdown(kpi, BreakdownSource::Monthly(&latest)))
                    .collect();
            } else {
                warn!("historical log has no parsable year and known month; skipping month closing");
            }
            snap.ytd = cfg.ytd_kpis.iter().map(|kpi| self.engine.ytd(historical, kpi)).collect();
            snap.master_trend = Some(self.engine.ytd(historical, &cfg.master_trend_kpi));
            if let Some(platform) = platforms(historical).into_iter().next() {
                if let Some(channel) = channels_for(historical, &platform).into_iter().next() {
                    snap.trends = self.engine.trends(historical, &platform, channel.as_deref());
                }
            }
            snap.period = period;
        }

        info!(
            "snapshot: period={:?}, {} weekly KPIs, {} core KPIs",
            snap.period.as_ref().map(|p| format!("{} {}", p.month, p.year)),
            snap.weekly.as_ref().map_or(0, |w| w.kpis.len()),
            snap.core_kpis.len()
        );
        snap
    }
}
