use crate::util::{parse_f64_safe, parse_i32_safe};
use serde::Serialize;
use std::sync::Arc;
use tabled::Tabled;

/// Column names the engine reads from both logs.
pub mod columns {
    pub const KPI: &str = "KPI";
    pub const PLATFORM: &str = "Platform";
    pub const CHANNEL: &str = "Channel";
    pub const MONTH: &str = "Month";
    pub const YEAR: &str = "Year";
    pub const ACTUAL: &str = "Actual";
    pub const TARGET: &str = "Target";
    pub const MTD_ACTUAL: &str = "MTD_Actual";
    pub const FULL_MONTH_TARGET: &str = "Full_Month_Target";
    pub const DAYS_PASSED: &str = "Days_Passed";
    pub const TOTAL_DAYS_IN_MONTH: &str = "Total_Days_in_Month";
}

/// One row of a log. Values are kept as trimmed text and only interpreted
/// when a consumer asks for them.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    header: Arc<Vec<String>>,
    values: Vec<Option<String>>,
}

impl Record {
    /// `values` must line up with `header`; empty strings become `None`.
    pub(crate) fn new(header: Arc<Vec<String>>, values: Vec<Option<String>>) -> Self {
        debug_assert_eq!(header.len(), values.len());
        Self { header, values }
    }

    /// Build a standalone record from `(column, value)` pairs.
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let header: Vec<String> = pairs.iter().map(|(k, _)| k.to_string()).collect();
        let values = pairs
            .iter()
            .map(|(_, v)| {
                let v = v.trim();
                if v.is_empty() { None } else { Some(v.to_string()) }
            })
            .collect();
        Self { header: Arc::new(header), values }
    }

    pub fn field_count(&self) -> usize {
        self.values.len()
    }

    /// First column named `name`, `None` when the column is missing or empty.
    pub fn get(&self, name: &str) -> Option<&str> {
        let idx = self.header.iter().position(|h| h == name)?;
        self.values.get(idx)?.as_deref()
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        parse_f64_safe(self.get(name))
    }

    pub fn kpi(&self) -> Option<&str> {
        self.get(columns::KPI)
    }

    pub fn platform(&self) -> Option<&str> {
        self.get(columns::PLATFORM)
    }

    pub fn channel(&self) -> Option<&str> {
        self.get(columns::CHANNEL)
    }

    pub fn month(&self) -> Option<&str> {
        self.get(columns::MONTH)
    }

    pub fn year(&self) -> Option<i32> {
        parse_i32_safe(self.get(columns::YEAR))
    }

    pub fn actual(&self) -> Option<f64> {
        self.number(columns::ACTUAL)
    }

    pub fn target(&self) -> Option<f64> {
        self.number(columns::TARGET)
    }

    pub fn mtd_actual(&self) -> Option<f64> {
        self.number(columns::MTD_ACTUAL)
    }

    pub fn full_month_target(&self) -> Option<f64> {
        self.number(columns::FULL_MONTH_TARGET)
    }

    pub fn days_passed(&self) -> Option<f64> {
        self.number(columns::DAYS_PASSED)
    }

    pub fn total_days_in_month(&self) -> Option<f64> {
        self.number(columns::TOTAL_DAYS_IN_MONTH)
    }
}

/// An immutable, ordered collection of records sharing one header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    header: Vec<String>,
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(header: Vec<String>, records: Vec<Record>) -> Self {
        Self { header, records }
    }

    /// Dataset built from loose records, e.g. in tests. The header is taken
    /// from the first record.
    pub fn from_records(records: Vec<Record>) -> Self {
        let header = records
            .first()
            .map(|r| r.header.as_ref().clone())
            .unwrap_or_default();
        Self { header, records }
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// New dataset with the records matching `keep`, in the same order.
    pub fn filter<F>(&self, mut keep: F) -> Dataset
    where
        F: FnMut(&Record) -> bool,
    {
        Dataset {
            header: self.header.clone(),
            records: self.records.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// A reporting month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Period {
    pub year: i32,
    pub month_index: usize,
    pub month: String,
}

// Export rows written by the CLI. All numbers are pre-formatted strings, the
// same way the report tables are rendered on screen.

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CoreKpiRow {
    #[serde(rename = "KPI")]
    #[tabled(rename = "KPI")]
    pub kpi: String,
    #[serde(rename = "Actual")]
    #[tabled(rename = "Actual")]
    pub actual: String,
    #[serde(rename = "Target")]
    #[tabled(rename = "Target")]
    pub target: String,
    #[serde(rename = "Performance")]
    #[tabled(rename = "Performance")]
    pub performance: String,
    #[serde(rename = "Status")]
    #[tabled(rename = "Status")]
    pub status: String,
    #[serde(rename = "ActualSplit")]
    #[tabled(rename = "ActualSplit")]
    pub actual_split: String,
    #[serde(rename = "TargetSplit")]
    #[tabled(rename = "TargetSplit")]
    pub target_split: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct PulseRow {
    #[serde(rename = "KPI")]
    #[tabled(rename = "KPI")]
    pub kpi: String,
    #[serde(rename = "Platform")]
    #[tabled(rename = "Platform")]
    pub platform: String,
    #[serde(rename = "MTDActual")]
    #[tabled(rename = "MTDActual")]
    pub mtd_actual: String,
    #[serde(rename = "ProratedTarget")]
    #[tabled(rename = "ProratedTarget")]
    pub prorated_target: String,
    #[serde(rename = "Pacing")]
    #[tabled(rename = "Pacing")]
    pub pacing: String,
    #[serde(rename = "FullMonthTarget")]
    #[tabled(rename = "FullMonthTarget")]
    pub full_month_target: String,
    #[serde(rename = "Focus")]
    #[tabled(rename = "Focus")]
    pub focus: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct YtdMonthRow {
    #[serde(rename = "KPI")]
    #[tabled(rename = "KPI")]
    pub kpi: String,
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub month: String,
    #[serde(rename = "Actual")]
    #[tabled(rename = "Actual")]
    pub actual: String,
    #[serde(rename = "Target")]
    #[tabled(rename = "Target")]
    pub target: String,
}
