// Entry point and high-level CLI flow.
//
// - Option [1] loads both logs, printing diagnostics. Either log may fail
//   to load; whatever did load is kept.
// - Option [2] computes the dashboard, writes the exports and previews them.
// - After a report run the user returns to the menu or quits; closing stdin
//   also quits.
mod output;

use clap::Parser;
use kpi_pulse::loader::{load_dataset, LoadReport};
use kpi_pulse::util::{format_int, format_percent, format_value};
use kpi_pulse::{reports, Dashboard, Dataset, Engine, EngineConfig};
use log::error;
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Parser, Debug, Clone)]
#[command(name = "kpi-pulse", about = "Aggregate KPI logs into dashboard figures")]
struct Args {
    /// Month-by-month historical log
    #[arg(long, default_value = "historical_log.csv")]
    historical: PathBuf,
    /// Weekly live-progress log
    #[arg(long, default_value = "live_progress.csv")]
    weekly: PathBuf,
    /// JSON file overriding the KPI vocabularies
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory the exports are written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

// Loaded logs live here so reports can be generated repeatedly from one load.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { dashboard: None }));

struct AppState {
    dashboard: Option<Dashboard>,
}

/// Print `label` and read one trimmed line; `None` once stdin is closed.
fn ask(label: &str) -> Option<String> {
    print!("{}", label);
    io::stdout().flush().ok()?;
    let mut line = String::new();
    match io::stdin().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()),
    }
}

/// After a report run: `true` to return to the menu, `false` to quit.
fn another_run() -> bool {
    loop {
        match ask("Run another report? (y/n): ").map(|a| a.to_ascii_lowercase()) {
            None => return false,
            Some(a) if a == "y" || a == "yes" => return true,
            Some(a) if a == "n" || a == "no" => return false,
            Some(_) => println!("Please answer y or n."),
        }
    }
}

fn load_one(label: &str, path: &Path, delimiter: u8) -> Option<Dataset> {
    match load_dataset(path, delimiter) {
        Ok((data, LoadReport { total_rows, kept_rows, dropped_rows })) => {
            println!(
                "{}: {} rows read, {} kept ({} dropped for a field count mismatch)",
                label,
                format_int(total_rows),
                format_int(kept_rows),
                format_int(dropped_rows)
            );
            Some(data)
        }
        Err(e) => {
            eprintln!("Failed to load {} ({}): {}", label, path.display(), e);
            None
        }
    }
}

/// Handle option [1]: load both logs independently.
fn handle_load(args: &Args, engine: &Engine) {
    let delimiter = engine.config().delimiter_byte();
    let historical = load_one("Historical log", &args.historical, delimiter);
    let weekly = load_one("Weekly log", &args.weekly, delimiter);
    println!();
    let dashboard = Dashboard::new(engine.clone(), historical, weekly);
    match APP_STATE.lock() {
        Ok(mut state) => state.dashboard = Some(dashboard),
        Err(e) => error!("app state unavailable: {}", e),
    }
}

fn report_write(result: Result<(), Box<dyn std::error::Error>>) {
    if let Err(e) = result {
        eprintln!("Write error: {}", e);
    }
}

/// Handle option [2]: compute the snapshot, write exports, print previews.
fn handle_generate_reports(args: &Args) {
    let dashboard = match APP_STATE.lock() {
        Ok(state) => state.dashboard.clone(),
        Err(e) => {
            error!("app state unavailable: {}", e);
            None
        }
    };
    let Some(dashboard) = dashboard else {
        println!("Error: No data loaded. Please load the logs first (option 1).\n");
        return;
    };
    let cfg = dashboard.engine().config();
    let snap = dashboard.snapshot();
    let out = &args.out_dir;

    println!("Generating reports...\n");

    match &snap.weekly {
        Some(pulse) => {
            let rows = reports::pulse_rows(pulse);
            let file = out.join("weekly_pulse.csv");
            report_write(output::write_csv(&file, &rows));
            println!(
                "Weekly Pulse: Pacing by KPI (Day {} of {})\n",
                pulse.elapsed.days_passed, pulse.elapsed.total_days
            );
            output::preview_report(&rows, 6);
            println!("(Full table exported to {})\n", file.display());
        }
        None => println!("Weekly Pulse: no weekly data loaded.\n"),
    }

    match &snap.period {
        Some(period) => {
            let rows = reports::core_kpi_rows(&snap.core_kpis, cfg);
            let file = out.join("core_kpis.csv");
            report_write(output::write_csv(&file, &rows));
            println!(
                "Monthly Closing: {} {} (Snapshot as of {})\n",
                period.month,
                period.year,
                chrono::Local::now().date_naive()
            );
            output::preview_report(&rows, rows.len());
            println!("(Full table exported to {})\n", file.display());

            for card in &snap.analytical {
                println!(
                    "{}: {} {} | {} {}",
                    card.kpi,
                    cfg.portal_platform,
                    format_value(&card.kpi, card.portal_actual, false),
                    cfg.pseudo_platform,
                    format_value(&card.kpi, card.pseudo_actual, false)
                );
            }
            println!();

            let rows = reports::ytd_rows(&snap.ytd, cfg);
            let file = out.join("ytd.csv");
            report_write(output::write_csv(&file, &rows));
            println!("Year to Date\n");
            output::preview_report(&rows, rows.len());
            println!("(Full table exported to {})\n", file.display());
        }
        None => println!("Monthly Closing: no historical data loaded.\n"),
    }

    if let Some(master) = &snap.master_trend {
        println!(
            "{} YTD: {} of {} ({})\n",
            master.kpi,
            format_value(&master.kpi, Some(master.total_actual), false),
            format_value(&master.kpi, Some(master.total_target), false),
            format_percent(master.performance.ratio)
        );
    }

    let file = out.join("dashboard.json");
    report_write(output::write_json(&file, &snap));
    println!("Dashboard snapshot saved to {}\n", file.display());
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match EngineConfig::from_json_path(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Failed to load config {}: {}", path.display(), e);
                std::process::exit(2);
            }
        },
        None => EngineConfig::default(),
    };
    let engine = Engine::new(config);

    loop {
        println!("KPI Pulse");
        println!("[1] Load the logs");
        println!("[2] Generate Reports\n");
        let Some(choice) = ask("Choose an option: ") else {
            break;
        };
        match choice.as_str() {
            "1" => handle_load(&args, &engine),
            "2" => {
                println!();
                handle_generate_reports(&args);
                if !another_run() {
                    println!("Done.");
                    break;
                }
            }
            _ => println!("Unknown option {:?}; enter 1 or 2.\n", choice),
        }
    }
}
