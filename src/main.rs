use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;

mod alerts;
mod expiry;
mod export;
mod models;
mod renewal;
mod report;
mod store;
mod watcher;

use models::{MouFilter, MouRecord};
use store::{RecordStore, SheetClient};

#[derive(Parser)]
#[command(name = "mou-tracker")]
#[command(about = "MOU expiry tracking and renewal alerts for partner institutes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load realistic sample MOUs into the sheet
    Seed,
    /// Record a new MOU, optionally uploading the signed PDF
    Add {
        #[arg(long)]
        institute: String,
        #[arg(long)]
        start_date: String,
        #[arg(long)]
        end_date: String,
        #[arg(long)]
        signed_by: Option<String>,
        #[arg(long)]
        faculty: Option<String>,
        #[arg(long)]
        academic_year: Option<String>,
        #[arg(long)]
        purpose: Option<String>,
        #[arg(long)]
        outcomes: Option<String>,
        #[arg(long)]
        created_by: Option<String>,
        /// Path of the signed agreement PDF to upload
        #[arg(long)]
        agreement: Option<PathBuf>,
        /// Name to store the attachment under
        #[arg(long)]
        file_name: Option<String>,
    },
    /// List MOUs, optionally filtered
    List {
        #[arg(long)]
        query: Option<String>,
        #[arg(long)]
        academic_year: Option<String>,
        #[arg(long)]
        institute: Option<String>,
        #[arg(long)]
        faculty: Option<String>,
        #[arg(long)]
        duration: Option<String>,
        /// Keep only rows inside the expiry window
        #[arg(long)]
        expiring: bool,
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// Print the overview dashboard
    Dashboard {
        #[arg(long)]
        as_of: Option<NaiveDate>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Run one renewal check and print the alerts
    Check {
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// Extend a row's end date by whole months
    Renew {
        #[arg(long)]
        row: usize,
        #[arg(long, default_value_t = 1)]
        months: u32,
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// Overwrite fields of an existing row
    Edit {
        #[arg(long)]
        row: usize,
        #[arg(long)]
        institute: Option<String>,
        #[arg(long)]
        start_date: Option<String>,
        #[arg(long)]
        end_date: Option<String>,
        #[arg(long)]
        signed_by: Option<String>,
        #[arg(long)]
        faculty: Option<String>,
        #[arg(long)]
        academic_year: Option<String>,
        #[arg(long)]
        purpose: Option<String>,
        #[arg(long)]
        outcomes: Option<String>,
    },
    /// Export MOUs to a CSV file
    Export {
        #[arg(long, default_value = "mou-records.csv")]
        out: PathBuf,
        #[arg(long)]
        query: Option<String>,
        #[arg(long)]
        academic_year: Option<String>,
        #[arg(long)]
        institute: Option<String>,
        #[arg(long)]
        faculty: Option<String>,
        #[arg(long)]
        duration: Option<String>,
    },
    /// Download a stored agreement PDF
    Download {
        #[arg(long)]
        file_name: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Keep checking for upcoming renewals until interrupted
    Watch {
        #[arg(long, default_value_t = 24)]
        every_hours: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let base_url = std::env::var("MOU_SERVICE_URL")
        .context("MOU_SERVICE_URL must be set to the sheet service base URL")?;
    let store = SheetClient::new(base_url);

    match cli.command {
        Commands::Seed => {
            let records = seed_records();
            for record in &records {
                store.append_record(record).await?;
            }
            println!("Seeded {} MOU records.", records.len());
        }
        Commands::Add {
            institute,
            start_date,
            end_date,
            signed_by,
            faculty,
            academic_year,
            purpose,
            outcomes,
            created_by,
            agreement,
            file_name,
        } => {
            let start = parse_cli_date(&start_date)?;
            let end = parse_cli_date(&end_date)?;
            let mut record = MouRecord {
                institute_name: institute,
                start_date: start.format("%Y-%m-%d").to_string(),
                end_date: end.format("%Y-%m-%d").to_string(),
                signed_by: signed_by.unwrap_or_default(),
                faculty_details: faculty.unwrap_or_default(),
                academic_year: academic_year.unwrap_or_default(),
                purpose: purpose.unwrap_or_default(),
                outcomes: outcomes.unwrap_or_default(),
                agreement_file_id: String::new(),
                file_name: "No file uploaded".to_string(),
                created_by: created_by.unwrap_or_default(),
                created_at: Utc::now().to_rfc3339(),
                ordinal_index: 0,
            };

            if let Some(path) = agreement {
                let bytes = std::fs::read(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                let name = file_name.unwrap_or_else(|| {
                    default_attachment_name(&record.institute_name, Utc::now().date_naive())
                });
                record.agreement_file_id = store.upload_attachment(bytes, &name).await?;
                record.file_name = name;
            }

            store.append_record(&record).await?;
            println!(
                "Added MOU with {} ({} to {}).",
                record.institute_name, record.start_date, record.end_date
            );
        }
        Commands::List {
            query,
            academic_year,
            institute,
            faculty,
            duration,
            expiring,
            as_of,
        } => {
            let as_of = as_of.unwrap_or_else(|| Utc::now().date_naive());
            let records = store.fetch_all_records().await?;
            let filter = MouFilter {
                query,
                academic_year,
                institute,
                faculty,
                duration,
            };
            let selected: Vec<&MouRecord> = records
                .iter()
                .filter(|record| filter.matches(record))
                .filter(|record| !expiring || expiry::is_expiring(record, as_of))
                .collect();

            if selected.is_empty() {
                println!("No MOU records match.");
                return Ok(());
            }

            if filter.is_empty() && !expiring {
                println!("{} records:", records.len());
            } else {
                println!("{} of {} records:", selected.len(), records.len());
            }
            for record in selected {
                println!(
                    "- row {}: {} ({}) {} to {}",
                    record.ordinal_index,
                    record.institute_name,
                    record.academic_year,
                    record.start_date,
                    record.end_date
                );
            }
        }
        Commands::Dashboard { as_of, out } => {
            let as_of = as_of.unwrap_or_else(|| Utc::now().date_naive());
            let records = store.fetch_all_records().await?;
            let dashboard = report::build_dashboard(&records, as_of);
            match out {
                Some(path) => {
                    std::fs::write(&path, dashboard)?;
                    println!("Dashboard written to {}.", path.display());
                }
                None => print!("{dashboard}"),
            }
        }
        Commands::Check { as_of } => {
            let as_of = as_of.unwrap_or_else(|| Utc::now().date_naive());
            let alerts = watcher::run_renewal_check(&store, as_of).await?;

            if alerts.is_empty() {
                println!("No renewals due as of {as_of}.");
                return Ok(());
            }

            println!("Renewals due as of {as_of}:");
            for alert in &alerts {
                println!("- {}", alert.message);
            }
        }
        Commands::Renew { row, months, as_of } => {
            let as_of = as_of.unwrap_or_else(|| Utc::now().date_naive());
            let records = store.fetch_all_records().await?;
            let updated = renewal::renew(&records, row, months)?;
            let renewed = &updated[row];
            store.update_record_at(row, renewed).await?;

            println!(
                "Row {row} ({}) renewed to {}.",
                renewed.institute_name, renewed.end_date
            );
            if expiry::is_expiring(renewed, as_of) {
                println!("Still inside the expiry window; renew again to push it further out.");
            }
        }
        Commands::Edit {
            row,
            institute,
            start_date,
            end_date,
            signed_by,
            faculty,
            academic_year,
            purpose,
            outcomes,
        } => {
            let mut records = store.fetch_all_records().await?;
            let total = records.len();
            let record = records
                .get_mut(row)
                .with_context(|| format!("row {row} does not exist (sheet has {total} rows)"))?;

            if let Some(value) = institute {
                record.institute_name = value;
            }
            if let Some(value) = start_date {
                record.start_date = parse_cli_date(&value)?.format("%Y-%m-%d").to_string();
            }
            if let Some(value) = end_date {
                record.end_date = parse_cli_date(&value)?.format("%Y-%m-%d").to_string();
            }
            if let Some(value) = signed_by {
                record.signed_by = value;
            }
            if let Some(value) = faculty {
                record.faculty_details = value;
            }
            if let Some(value) = academic_year {
                record.academic_year = value;
            }
            if let Some(value) = purpose {
                record.purpose = value;
            }
            if let Some(value) = outcomes {
                record.outcomes = value;
            }

            store.update_record_at(row, record).await?;
            println!("Row {row} updated.");
        }
        Commands::Export {
            out,
            query,
            academic_year,
            institute,
            faculty,
            duration,
        } => {
            let records = store.fetch_all_records().await?;
            let filter = MouFilter {
                query,
                academic_year,
                institute,
                faculty,
                duration,
            };
            let selected: Vec<MouRecord> = records
                .iter()
                .filter(|record| filter.matches(record))
                .cloned()
                .collect();

            if selected.is_empty() {
                println!("No records match; nothing exported.");
                return Ok(());
            }

            let file = std::fs::File::create(&out)
                .with_context(|| format!("failed to create {}", out.display()))?;
            export::write_csv(&selected, file)?;
            println!("Exported {} records to {}.", selected.len(), out.display());
        }
        Commands::Download { file_name, out } => {
            let bytes = store.download_attachment(&file_name).await?;
            let out = out.unwrap_or_else(|| PathBuf::from(format!("{file_name}.pdf")));
            std::fs::write(&out, &bytes)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Saved {} bytes to {}.", bytes.len(), out.display());
        }
        Commands::Watch { every_hours } => {
            let shared: Arc<dyn RecordStore> = Arc::new(store);
            let (alerts_tx, mut alerts_rx) = mpsc::channel(16);
            let handle = watcher::RenewalWatcher::new(shared)
                .with_interval(Duration::from_secs(every_hours.max(1) * 60 * 60))
                .spawn(alerts_tx);

            println!("Checking renewals every {every_hours}h. Ctrl+C to stop.");
            let ctrl_c = tokio::signal::ctrl_c();
            tokio::pin!(ctrl_c);
            loop {
                tokio::select! {
                    _ = &mut ctrl_c => break,
                    Some(alert) = alerts_rx.recv() => println!("{}", alert.message),
                }
            }
            drop(alerts_rx);
            handle.stop().await;
            println!("Watcher stopped.");
        }
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

fn parse_cli_date(value: &str) -> anyhow::Result<NaiveDate> {
    expiry::parse_iso_date(value)
        .with_context(|| format!("unreadable date {value:?}; expected YYYY-MM-DD"))
}

fn default_attachment_name(institute: &str, on: NaiveDate) -> String {
    format!("MOU_{}_{}", institute.replace(' ', "_"), on)
}

fn seed_records() -> Vec<MouRecord> {
    let now = Utc::now().to_rfc3339();
    let row = |cells: [&str; 8]| {
        let mut full: Vec<String> = cells.iter().map(|cell| cell.to_string()).collect();
        full.extend([
            String::new(),
            "No file uploaded".to_string(),
            "seed".to_string(),
            now.clone(),
        ]);
        MouRecord::from_row(0, &full)
    };

    vec![
        row([
            "Northfield University",
            "2024-08-01",
            "2025-07-31",
            "Dr. Meera Iyer",
            "Dept. of Physics",
            "2024-2025",
            "Student exchange and joint research",
            "Two joint publications",
        ]),
        row([
            "Coastal Technology Institute",
            "2024-06-15",
            "2025-01-15",
            "Prof. Daniel Okafor",
            "School of Computing",
            "2024-2025",
            "Shared laboratory access",
            "Prototype sensor array",
        ]),
        row([
            "Riverbend College of Arts",
            "2023-09-01",
            "2026-08-31",
            "Dr. Lucia Mendes",
            "Faculty of Design",
            "2023-2026",
            "Curriculum development",
            "Revised foundation syllabus",
        ]),
    ]
}
