use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use uniform_desk::config::{DEFAULT_LOG_FILTER, TelemetryConfig};
use uniform_desk::domain::payment;
use uniform_desk::domain::ports::Clock;
use uniform_desk::domain::pricing;
use uniform_desk::infrastructure::clock::SystemClock;
use uniform_desk::interfaces::csv::quotation_reader::QuotationReader;
use uniform_desk::interfaces::csv::report_writer::ReportWriter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log filter directive, used when RUST_LOG is unset
    #[arg(long, global = true, env = "UNIFORM_DESK_LOG", default_value = DEFAULT_LOG_FILTER)]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a CSV batch of quotation candidates and print a CSV report
    Validate {
        /// Input quotations CSV file
        input: PathBuf,

        /// Validation date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Decode a payment gateway return (URL or query string) and print it as JSON
    Callback { query: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    uniform_desk::telemetry::init(&TelemetryConfig {
        filter: cli.log_level,
        json: cli.log_json,
    });

    match cli.command {
        Command::Validate { input, today } => validate(input, today),
        Command::Callback { query } => callback(&query),
    }
}

fn validate(input: PathBuf, today: Option<NaiveDate>) -> Result<()> {
    let today = today.unwrap_or_else(|| SystemClock.today());
    let file = File::open(input).into_diagnostic()?;
    let reader = QuotationReader::new(file);

    let stdout = io::stdout();
    let mut writer = ReportWriter::new(stdout.lock());
    for row in reader.rows() {
        match row {
            Ok(row) => {
                let id = row.id.clone();
                match pricing::validate_quotation(&row.into_draft(), today) {
                    Ok(quotation) => writer.write_valid(&id, &quotation).into_diagnostic()?,
                    Err(rules) => writer.write_invalid(&id, &rules).into_diagnostic()?,
                }
            }
            Err(e) => {
                eprintln!("Error reading quotation: {}", e);
            }
        }
    }
    writer.finish().into_diagnostic()?;

    Ok(())
}

fn callback(query: &str) -> Result<()> {
    let outcome = payment::decode_callback(query).into_diagnostic()?;
    let json = serde_json::to_string_pretty(&outcome).into_diagnostic()?;
    println!("{json}");
    Ok(())
}
