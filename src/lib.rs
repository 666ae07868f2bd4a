//! KPI Pulse - aggregation and pacing engine for KPI dashboards
//!
//! Two CSV logs go in: a historical month-by-month log and a weekly
//! live-progress log. Out come the figures a dashboard shows:
//! - latest closed month and cross-platform totals
//! - prorated pacing of the running month, with a focus channel
//! - year-to-date rollups and trend series
//! - per-channel drill-downs

pub mod aggregate;
pub mod breakdown;
pub mod config;
pub mod engine;
pub mod error;
pub mod loader;
pub mod pacing;
pub mod period;
pub mod reports;
pub mod summary;
pub mod trends;
pub mod types;
pub mod util;
pub mod ytd;

pub use aggregate::{AggregateBucket, GroupField, Inclusion, Measures, Totals};
pub use config::EngineConfig;
pub use engine::{Dashboard, DashboardSnapshot, Engine};
pub use error::{KpiError, Result};
pub use pacing::{Elapsed, KpiPacing, PacingResult, PacingStatus};
pub use types::{Dataset, Period, Record};
