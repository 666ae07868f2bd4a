use crate::config::EngineConfig;
use crate::types::{Dataset, Period, Record};

/// Month-table index of a record's month, `None` for unknown or missing names.
pub fn month_index(record: &Record, config: &EngineConfig) -> Option<usize> {
    record.month().and_then(|m| config.month_index(m))
}

pub fn latest_year(dataset: &Dataset) -> Option<i32> {
    dataset.iter().filter_map(|r| r.year()).max()
}

pub fn filter_year(dataset: &Dataset, year: i32) -> Dataset {
    dataset.filter(|r| r.year() == Some(year))
}

/// Records of the most recent (Year, Month) in the dataset.
///
/// The latest year is picked first, then the latest known month within it.
/// Unparsable years and unknown month names never win. Returns an empty
/// dataset and no period when nothing qualifies.
pub fn latest_period(dataset: &Dataset, config: &EngineConfig) -> (Dataset, Option<Period>) {
    let Some(year) = latest_year(dataset) else {
        return (Dataset::default(), None);
    };
    let this_year = filter_year(dataset, year);
    let Some(idx) = this_year.iter().filter_map(|r| month_index(r, config)).max() else {
        return (Dataset::default(), None);
    };
    let latest = this_year.filter(|r| month_index(r, config) == Some(idx));
    let period = Period {
        year,
        month_index: idx,
        month: config.month_label(idx).unwrap_or_default().to_string(),
    };
    (latest, Some(period))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(kpi: &str, month: &str, year: &str) -> Record {
        Record::from_pairs(&[("KPI", kpi), ("Month", month), ("Year", year)])
    }

    #[test]
    fn empty_dataset_has_no_latest_period() {
        let (latest, period) = latest_period(&Dataset::default(), &EngineConfig::default());
        assert!(latest.is_empty());
        assert!(period.is_none());
    }

    #[test]
    fn single_period_returns_everything() {
        let ds = Dataset::from_records(vec![rec("A", "Mar", "2024"), rec("B", "Mar", "2024")]);
        let (latest, period) = latest_period(&ds, &EngineConfig::default());
        assert_eq!(latest.len(), 2);
        assert_eq!(period.unwrap().month, "Mar");
    }

    #[test]
    fn year_wins_over_month() {
        let ds = Dataset::from_records(vec![
            rec("A", "Dec", "2023"),
            rec("B", "Feb", "2024"),
            rec("C", "Jan", "2024"),
            rec("D", "Feb", "2024"),
            rec("E", "Nov", "bogus"),
        ]);
        let (latest, period) = latest_period(&ds, &EngineConfig::default());
        let kpis: Vec<_> = latest.iter().filter_map(|r| r.kpi()).collect();
        assert_eq!(kpis, vec!["B", "D"]);
        assert_eq!(
            period,
            Some(Period { year: 2024, month_index: 1, month: "Feb".to_string() })
        );
    }

    #[test]
    fn unknown_months_are_ignored() {
        let ds = Dataset::from_records(vec![rec("A", "Smarch", "2024"), rec("B", "Jan", "2024")]);
        let (latest, _) = latest_period(&ds, &EngineConfig::default());
        assert_eq!(latest.len(), 1);
        assert_eq!(latest.records()[0].kpi(), Some("B"));
    }

    #[test]
    fn latest_year_without_known_month_is_empty() {
        let ds = Dataset::from_records(vec![rec("A", "Jan", "2023"), rec("B", "???", "2024")]);
        let (latest, period) = latest_period(&ds, &EngineConfig::default());
        assert!(latest.is_empty());
        assert!(period.is_none());
    }
}
