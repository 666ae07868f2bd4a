use crate::error::Result;
use crate::types::{Dataset, Record};
use csv::{ReaderBuilder, Trim};
use log::{debug, info};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Data lines seen after the header.
    pub total_rows: usize,
    pub kept_rows: usize,
    /// Lines whose field count did not match the header.
    pub dropped_rows: usize,
}

/// Split delimited text into a dataset.
///
/// The first line is the header. Every other line is split on `delimiter` as
/// is (quotes are ordinary characters), rows with a different number of
/// fields are dropped whole, and empty values become `None`. Empty or header-only input
/// yields an empty dataset.
pub fn parse_delimited(text: &str, delimiter: u8) -> (Dataset, LoadReport) {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut rows = rdr.records();
    let header: Vec<String> = match rows.next() {
        Some(Ok(h)) => h.iter().map(|s| s.trim().to_string()).collect(),
        _ => return (Dataset::default(), LoadReport::default()),
    };
    let shared = Arc::new(header.clone());

    let mut report = LoadReport::default();
    let mut records = Vec::new();
    for result in rows {
        report.total_rows += 1;
        let row = match result {
            Ok(r) if r.len() == header.len() => r,
            _ => {
                report.dropped_rows += 1;
                continue;
            }
        };
        let values = row
            .iter()
            .map(|v| {
                let v = v.trim();
                if v.is_empty() { None } else { Some(v.to_string()) }
            })
            .collect();
        records.push(Record::new(Arc::clone(&shared), values));
    }
    report.kept_rows = records.len();

    if report.dropped_rows > 0 {
        debug!(
            "dropped {} of {} rows with a field count other than {}",
            report.dropped_rows,
            report.total_rows,
            header.len()
        );
    }
    if records.is_empty() {
        return (Dataset::default(), report);
    }
    (Dataset::new(header, records), report)
}

/// Load a dataset from any reader (file, network body, in-memory buffer).
pub fn load_from_reader<R: Read>(mut reader: R, delimiter: u8) -> Result<(Dataset, LoadReport)> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    Ok(parse_delimited(&text, delimiter))
}

pub fn load_dataset<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<(Dataset, LoadReport)> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let (dataset, report) = parse_delimited(&text, delimiter);
    info!(
        "loaded {}: {} rows kept, {} dropped",
        path.display(),
        report.kept_rows,
        report.dropped_rows
    );
    Ok((dataset, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "KPI,Platform,Channel,Month,Year,Actual,Target\n\
        Volume UC,Customer Portal,Total,Jan,2024,100,120\n\
        Volume UC,Chatbot,,Jan,2024,20,10\n\
        Volume UC,Customer Portal,LKA,Jan,2024\n\
        Delivered Orders,Customer Portal,Total,Jan,2024,5,6,extra\n";

    #[test]
    fn drops_rows_with_wrong_field_count() {
        let (ds, report) = parse_delimited(SAMPLE, b',');
        assert_eq!(ds.len(), 2);
        assert_eq!(report.total_rows, 4);
        assert_eq!(report.dropped_rows, 2);
        assert!(ds.iter().all(|r| r.field_count() == ds.header().len()));
    }

    #[test]
    fn empty_values_become_none() {
        let (ds, _) = parse_delimited(SAMPLE, b',');
        let chatbot = &ds.records()[1];
        assert_eq!(chatbot.platform(), Some("Chatbot"));
        assert_eq!(chatbot.channel(), None);
    }

    #[test]
    fn trims_header_and_values() {
        let (ds, _) = parse_delimited(" KPI ; Actual \n Volume UC ; 42 \n", b';');
        assert_eq!(ds.header(), &["KPI".to_string(), "Actual".to_string()]);
        assert_eq!(ds.records()[0].kpi(), Some("Volume UC"));
        assert_eq!(ds.records()[0].actual(), Some(42.0));
    }

    #[test]
    fn empty_or_header_only_input_is_empty() {
        assert!(parse_delimited("", b',').0.is_empty());
        assert!(parse_delimited("   \n", b',').0.is_empty());
        assert!(parse_delimited("KPI,Actual\n", b',').0.is_empty());
    }

    #[test]
    fn blank_lines_are_skipped() {
        let (ds, report) = parse_delimited("KPI,Actual\r\n\r\nA,1\r\n\r\nB,2\r\n", b',');
        assert_eq!(ds.len(), 2);
        assert_eq!(report.dropped_rows, 0);
    }

    #[test]
    fn stray_quote_stays_on_its_line() {
        let text = "KPI,Platform,Channel,Month,Year,Actual,Target\n\
            Volume UC,\"Customer Portal,Total,Jan,2024,100,120\n\
            Volume UC,Customer Portal,Total,Feb,2024,110,120\n\
            Volume UC,Customer Portal,Total,Mar,2024,125,120\n";
        let (ds, report) = parse_delimited(text, b',');
        assert_eq!(report.total_rows, 3);
        assert_eq!(report.kept_rows, 3);
        assert_eq!(report.dropped_rows, 0);
        assert_eq!(ds.records()[0].platform(), Some("\"Customer Portal"));
        let months: Vec<_> = ds.iter().filter_map(|r| r.month()).collect();
        assert_eq!(months, vec!["Jan", "Feb", "Mar"]);
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let (ds, report) = load_dataset(file.path(), b',').unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(report.kept_rows, 2);
    }

    #[test]
    fn loads_from_reader() {
        let (ds, report) = load_from_reader(SAMPLE.as_bytes(), b',').unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(report.dropped_rows, 2);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_dataset(dir.path().join("nope.csv"), b',').is_err());
    }
}
