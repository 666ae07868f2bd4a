// Vocabularies the engine depends on.
//
// Every list here used to be a hard-coded constant in the dashboard; they are
// grouped into one struct so a deployment can override them from JSON.
use crate::error::{KpiError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Month names in chronological order. Index 0 is the first month.
    pub months: Vec<String>,
    /// KPIs reported as raw running totals, never prorated.
    pub cumulative_kpis: Vec<String>,
    /// Ratio-style KPIs (shares, rates) that carry no target.
    pub non_target_kpis: Vec<String>,
    pub core_kpis: Vec<String>,
    pub ytd_kpis: Vec<String>,
    /// KPI whose YTD series is the headline trend.
    pub master_trend_kpi: String,
    /// Drill-down channels, in display order.
    pub channels: Vec<String>,
    pub portal_platform: String,
    /// Platform shown as an extra channel in breakdowns.
    pub pseudo_platform: String,
    /// Channel value marking a platform-level rollup row.
    pub total_channel: String,
    pub delimiter: char,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            months: strings(&[
                "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
            ]),
            cumulative_kpis: strings(&["Registered Customers"]),
            non_target_kpis: strings(&[
                "Digital Order Share %",
                "Digital Volume Share %",
                "Fulfillment Rate %",
                "Order Frequency",
                "UC per Order",
            ]),
            core_kpis: strings(&[
                "Registered Customers",
                "Active Customers",
                "Delivered Orders",
                "Volume UC",
            ]),
            ytd_kpis: strings(&["Volume UC", "Delivered Orders"]),
            master_trend_kpi: "Volume UC".to_string(),
            channels: strings(&["LKA", "DSD", "WHS", "Horeca"]),
            portal_platform: "Customer Portal".to_string(),
            pseudo_platform: "Chatbot".to_string(),
            total_channel: "Total".to_string(),
            delimiter: ',',
        }
    }
}

impl EngineConfig {
    /// Load a config from a JSON file. Keys left out keep their defaults.
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let cfg: EngineConfig = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.months.len() != 12 {
            return Err(KpiError::InvalidConfig(format!(
                "expected 12 month names, got {}",
                self.months.len()
            )));
        }
        let distinct: HashSet<&str> = self.months.iter().map(|m| m.as_str()).collect();
        if distinct.len() != self.months.len() {
            return Err(KpiError::InvalidConfig("month names must be distinct".into()));
        }
        if self.portal_platform.trim().is_empty() || self.pseudo_platform.trim().is_empty() {
            return Err(KpiError::InvalidConfig("platform names must not be empty".into()));
        }
        if !self.delimiter.is_ascii() {
            return Err(KpiError::InvalidConfig(format!(
                "delimiter {:?} must be a single ASCII character",
                self.delimiter
            )));
        }
        Ok(())
    }

    /// Delimiter as the byte the CSV reader expects. Non-ASCII values fall
    /// back to a comma; `validate` rejects them up front.
    pub fn delimiter_byte(&self) -> u8 {
        u8::try_from(self.delimiter).ok().filter(u8::is_ascii).unwrap_or(b',')
    }

    /// Position of `month` in the month table, `None` for unknown names.
    pub fn month_index(&self, month: &str) -> Option<usize> {
        self.months.iter().position(|m| m == month)
    }

    pub fn month_label(&self, index: usize) -> Option<&str> {
        self.months.get(index).map(|m| m.as_str())
    }

    pub fn is_cumulative(&self, kpi: &str) -> bool {
        self.cumulative_kpis.iter().any(|k| k == kpi)
    }

    pub fn is_non_target(&self, kpi: &str) -> bool {
        self.non_target_kpis.iter().any(|k| k == kpi)
    }

    pub fn is_core(&self, kpi: &str) -> bool {
        self.core_kpis.iter().any(|k| k == kpi)
    }

    /// Portal first, then the pseudo platform.
    pub fn platforms(&self) -> [&str; 2] {
        [self.portal_platform.as_str(), self.pseudo_platform.as_str()]
    }
}
