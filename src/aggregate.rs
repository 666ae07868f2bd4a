// Grouping and summation over records.
//
// Every total the dashboard shows comes out of `group_sum` or `sum_measures`.
// Which rows take part is decided by an explicit `Inclusion`, so a call site
// that unions heterogeneous rows (platform rollups plus the chatbot) says so
// by name instead of relying on the shape of the data.
use crate::config::EngineConfig;
use crate::period::month_index;
use crate::types::Record;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupField {
    Kpi,
    Platform,
    Channel,
    Month,
    Year,
}

/// Which pair of numeric columns a sum reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measures {
    /// `Actual` / `Target` of the historical log.
    ActualTarget,
    /// `MTD_Actual` / `Full_Month_Target` of the weekly log.
    MtdFullMonth,
}

impl Measures {
    pub fn read(self, record: &Record) -> (Option<f64>, Option<f64>) {
        match self {
            Measures::ActualTarget => (record.actual(), record.target()),
            Measures::MtdFullMonth => (record.mtd_actual(), record.full_month_target()),
        }
    }
}

/// Named record filter applied before grouping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inclusion {
    All,
    /// `Channel == total_channel OR Platform == pseudo_platform`: one row per
    /// platform without double counting channel detail.
    Rollup {
        total_channel: String,
        pseudo_platform: String,
    },
    Platform(String),
    /// Exact platform and channel; `None` matches rows without a channel.
    PlatformChannel {
        platform: String,
        channel: Option<String>,
    },
    /// Case-insensitive channel match, ignoring rows of `exclude_platform`.
    ChannelOf {
        channel: String,
        exclude_platform: String,
    },
}

impl Inclusion {
    pub fn rollup(config: &EngineConfig) -> Self {
        Inclusion::Rollup {
            total_channel: config.total_channel.clone(),
            pseudo_platform: config.pseudo_platform.clone(),
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Inclusion::All => true,
            Inclusion::Rollup {
                total_channel,
                pseudo_platform,
            } => {
                record.channel() == Some(total_channel.as_str())
                    || record.platform() == Some(pseudo_platform.as_str())
            }
            Inclusion::Platform(p) => record.platform() == Some(p.as_str()),
            Inclusion::PlatformChannel { platform, channel } => {
                record.platform() == Some(platform.as_str()) && record.channel() == channel.as_deref()
            }
            Inclusion::ChannelOf {
                channel,
                exclude_platform,
            } => {
                record.platform() != Some(exclude_platform.as_str())
                    && record
                        .channel()
                        .is_some_and(|c| c.eq_ignore_ascii_case(channel))
            }
        }
    }
}

/// Running sums for one group. Unparsable values add nothing but the record
/// is still counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub actual: f64,
    pub target: f64,
    pub records: usize,
    /// How many records carried a numeric actual / target.
    pub actual_values: usize,
    pub target_values: usize,
}

impl Totals {
    fn add(&mut self, (actual, target): (Option<f64>, Option<f64>)) {
        self.records += 1;
        if let Some(a) = actual {
            self.actual += a;
            self.actual_values += 1;
        }
        if let Some(t) = target {
            self.target += t;
            self.target_values += 1;
        }
    }

    /// Sum of actuals, `None` when no record had a number to contribute.
    pub fn actual_if_any(&self) -> Option<f64> {
        (self.actual_values > 0).then_some(self.actual)
    }

    pub fn target_if_any(&self) -> Option<f64> {
        (self.target_values > 0).then_some(self.target)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct BucketKey {
    pub kpi: Option<String>,
    pub platform: Option<String>,
    pub channel: Option<String>,
    pub month: Option<String>,
    pub year: Option<i32>,
}

impl BucketKey {
    fn of(record: &Record, group_by: &[GroupField]) -> Self {
        let mut key = BucketKey::default();
        for field in group_by {
            match field {
                GroupField::Kpi => key.kpi = record.kpi().map(str::to_string),
                GroupField::Platform => key.platform = record.platform().map(str::to_string),
                GroupField::Channel => key.channel = record.channel().map(str::to_string),
                GroupField::Month => key.month = record.month().map(str::to_string),
                GroupField::Year => key.year = record.year(),
            }
        }
        key
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateBucket {
    pub key: BucketKey,
    /// Set when the key includes a known month.
    pub month_index: Option<usize>,
    pub totals: Totals,
}

fn kpi_matches(record: &Record, kpi: Option<&str>) -> bool {
    kpi.map_or(true, |k| record.kpi() == Some(k))
}

/// Sum `measures` per distinct `group_by` key over the records of `kpi`
/// (all KPIs when `None`) accepted by `inclusion`.
///
/// Buckets come back in the order their key was first seen.
pub fn group_sum<'a, I>(
    records: I,
    kpi: Option<&str>,
    group_by: &[GroupField],
    measures: Measures,
    inclusion: &Inclusion,
    config: &EngineConfig,
) -> Vec<AggregateBucket>
where
    I: IntoIterator<Item = &'a Record>,
{
    let keyed_by_month = group_by.contains(&GroupField::Month);
    let mut index: HashMap<BucketKey, usize> = HashMap::new();
    let mut buckets: Vec<AggregateBucket> = Vec::new();

    for r in records {
        if !kpi_matches(r, kpi) || !inclusion.matches(r) {
            continue;
        }
        let key = BucketKey::of(r, group_by);
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            buckets.push(AggregateBucket {
                key,
                month_index: if keyed_by_month { month_index(r, config) } else { None },
                totals: Totals::default(),
            });
            buckets.len() - 1
        });
        buckets[slot].totals.add(measures.read(r));
    }
    buckets
}

/// One total over every matching record, whatever their keys.
pub fn sum_measures<'a, I>(
    records: I,
    kpi: Option<&str>,
    measures: Measures,
    inclusion: &Inclusion,
) -> Totals
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut totals = Totals::default();
    for r in records {
        if kpi_matches(r, kpi) && inclusion.matches(r) {
            totals.add(measures.read(r));
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Dataset;
    use approx::assert_relative_eq;

    fn rec(kpi: &str, platform: &str, channel: &str, month: &str, actual: &str, target: &str) -> Record {
        Record::from_pairs(&[
            ("KPI", kpi),
            ("Platform", platform),
            ("Channel", channel),
            ("Month", month),
            ("Year", "2024"),
            ("Actual", actual),
            ("Target", target),
        ])
    }

    fn sample() -> Dataset {
        Dataset::from_records(vec![
            rec("Volume UC", "Customer Portal", "Total", "Jan", "100", "120"),
            rec("Volume UC", "Customer Portal", "LKA", "Jan", "60", "70"),
            rec("Volume UC", "Customer Portal", "DSD", "Jan", "40", "50"),
            rec("Volume UC", "Chatbot", "", "Jan", "20", "10"),
            rec("Volume UC", "Customer Portal", "Total", "Feb", "110", ""),
            rec("Delivered Orders", "Customer Portal", "Total", "Jan", "9", "9"),
        ])
    }

    #[test]
    fn groups_by_month_in_first_seen_order() {
        let cfg = EngineConfig::default();
        let ds = sample();
        let buckets = group_sum(
            &ds,
            Some("Volume UC"),
            &[GroupField::Kpi, GroupField::Month],
            Measures::ActualTarget,
            &Inclusion::rollup(&cfg),
            &cfg,
        );
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].key.month.as_deref(), Some("Jan"));
        assert_eq!(buckets[0].month_index, Some(0));
        assert_relative_eq!(buckets[0].totals.actual, 120.0);
        assert_relative_eq!(buckets[0].totals.target, 130.0);
        assert_eq!(buckets[1].month_index, Some(1));
    }

    #[test]
    fn missing_values_still_count_toward_bucket() {
        let cfg = EngineConfig::default();
        let ds = sample();
        let buckets = group_sum(
            &ds,
            Some("Volume UC"),
            &[GroupField::Month],
            Measures::ActualTarget,
            &Inclusion::PlatformChannel {
                platform: "Customer Portal".into(),
                channel: Some("Total".into()),
            },
            &cfg,
        );
        let feb = &buckets[1].totals;
        assert_eq!(feb.records, 1);
        assert_eq!(feb.target, 0.0);
        assert_eq!(feb.target_if_any(), None);
        assert_eq!(feb.actual_if_any(), Some(110.0));
    }

    #[test]
    fn channel_match_is_case_insensitive_and_skips_pseudo_platform() {
        let ds = Dataset::from_records(vec![
            rec("Volume UC", "Customer Portal", "lka", "Jan", "5", "1"),
            rec("Volume UC", "Chatbot", "LKA", "Jan", "100", "1"),
        ]);
        let totals = sum_measures(
            &ds,
            Some("Volume UC"),
            Measures::ActualTarget,
            &Inclusion::ChannelOf {
                channel: "LKA".into(),
                exclude_platform: "Chatbot".into(),
            },
        );
        assert_eq!(totals.records, 1);
        assert_relative_eq!(totals.actual, 5.0);
    }

    #[test]
    fn grouping_does_not_touch_input() {
        let cfg = EngineConfig::default();
        let ds = sample();
        let before = ds.clone();
        let _ = group_sum(&ds, None, &[GroupField::Kpi], Measures::ActualTarget, &Inclusion::All, &cfg);
        assert_eq!(ds, before);
    }

    #[test]
    fn weekly_measures_read_mtd_columns() {
        let r = Record::from_pairs(&[("MTD_Actual", "90"), ("Full_Month_Target", "310"), ("Actual", "1")]);
        assert_eq!(Measures::MtdFullMonth.read(&r), (Some(90.0), Some(310.0)));
    }
}
