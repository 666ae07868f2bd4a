// Export writers and console previews for the dashboard reports.
use log::debug;
use serde::Serialize;
use std::error::Error;
use std::fs;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

type WriteResult = Result<(), Box<dyn Error>>;

fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir),
        _ => Ok(()),
    }
}

/// One CSV row per report row; the header comes from the row's serde names.
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> WriteResult {
    ensure_parent(path)?;
    let mut wtr = csv::Writer::from_path(path)?;
    rows.iter().try_for_each(|row| wtr.serialize(row))?;
    wtr.flush()?;
    debug!("wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Pretty-printed JSON of the whole dashboard snapshot.
pub fn write_json<T: Serialize>(path: &Path, snapshot: &T) -> WriteResult {
    ensure_parent(path)?;
    fs::write(path, serde_json::to_string_pretty(snapshot)?)?;
    debug!("wrote snapshot to {}", path.display());
    Ok(())
}

/// Print the first `limit` report rows as a Markdown table, noting how many
/// rows were left out.
pub fn preview_report<T: Tabled>(rows: &[T], limit: usize) {
    if rows.is_empty() {
        println!("(no KPI rows)\n");
        return;
    }
    println!("{}", Table::new(rows.iter().take(limit)).with(Style::markdown()));
    match rows.len().saturating_sub(limit) {
        0 => println!(),
        hidden => println!("... {} more KPI rows\n", hidden),
    }
}
