use anyhow::Result;
use clap::Parser;
use csvrecords::{clean_number, load_csv, normalize_name, AutoSource, Record};
use serde_json::{Map, Value};
use std::io::{self, Write};
use tokio::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Load a CSV file or URL and print its records as JSON"
)]
struct Args {
    /// File path, file:// URL or http(s):// URL of the CSV
    location: String,
    /// Column to coerce into an integer (repeatable)
    #[arg(long = "number", value_name = "COLUMN")]
    number_columns: Vec<String>,
    /// Column to trim and title-case (repeatable)
    #[arg(long = "name", value_name = "COLUMN")]
    name_columns: Vec<String>,
    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging (stderr, stdout carries the JSON) ───────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    // ─── 2) load ─────────────────────────────────────────────────────
    let start = Instant::now();
    let dataset = load_csv(&AutoSource::new(), &args.location).await?;
    info!(
        location = %args.location,
        records = dataset.len(),
        elapsed = ?start.elapsed(),
        "loaded"
    );

    if let Some(first) = dataset.first() {
        for col in args.number_columns.iter().chain(&args.name_columns) {
            if !first.contains_key(col) {
                warn!(column = %col, "no such column, ignoring");
            }
        }
    }

    // ─── 3) shape + print ────────────────────────────────────────────
    let rows: Vec<Value> = dataset
        .iter()
        .map(|rec| shape_record(rec, &args.number_columns, &args.name_columns))
        .collect();

    let mut out = io::stdout().lock();
    if args.pretty {
        serde_json::to_writer_pretty(&mut out, &rows)?;
    } else {
        serde_json::to_writer(&mut out, &rows)?;
    }
    writeln!(out)?;
    Ok(())
}

/// Record → JSON object in header order, cleaning the requested columns.
fn shape_record(rec: &Record, number_columns: &[String], name_columns: &[String]) -> Value {
    let mut obj = Map::new();
    for (key, value) in rec.iter() {
        let v = if number_columns.iter().any(|c| c == key) {
            Value::from(clean_number(value))
        } else if name_columns.iter().any(|c| c == key) {
            Value::from(normalize_name(value))
        } else {
            value.map_or(Value::Null, Value::from)
        };
        obj.insert(key.to_string(), v);
    }
    Value::Object(obj)
}
