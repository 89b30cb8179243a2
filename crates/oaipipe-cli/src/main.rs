//! oaipipe - arXiv metadata harvester
//!
//! Walks the OAI-PMH ListRecords endpoint and writes each record into
//! category-partitioned shard files. Running with no flags harvests the
//! complete archive into ./dataset.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "oaipipe")]
#[command(about = "Harvest arXiv metadata into category-partitioned shards")]
#[command(version)]
struct Cli {
    /// Only harvest records updated since this date (YYYY-MM-DD)
    #[arg(short, long, value_parser = parse_date)]
    from: Option<NaiveDate>,

    /// Output directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Consecutive 503 responses tolerated before giving up
    #[arg(long)]
    max_retries: Option<u32>,

    /// OAI-PMH endpoint URL
    #[arg(long)]
    base_url: Option<String>,

    /// Config file path (default: ./oaipipe.toml or ~/.config/oaipipe/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("Invalid date format: {e}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Progress context (TTY auto-detect)
    let progress = Arc::new(oaipipe_core::ProgressContext::new());

    // Logging:
    //   TTY:     quiet (warn) unless --debug  — the progress line shows activity
    //   non-TTY: info unless --debug          — logs are the only progress indicator
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = if is_tty { !cli.debug } else { false };
    oaipipe_core::init_logging(quiet, cli.debug, multi);

    // Load configuration (file defaults, CLI overrides)
    let file_config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };

    let harvest_config = oaipipe_arxiv::Config {
        output_dir: cli.output.unwrap_or(file_config.output.default_dir),
        base_url: cli.base_url.unwrap_or(file_config.oai.base_url),
        from: cli.from,
        max_retries: cli.max_retries.unwrap_or(file_config.oai.max_retries),
        ..Default::default()
    };

    let summary = oaipipe_arxiv::run(&harvest_config, progress)?;

    print_summary(
        "Harvest",
        &[
            ("Pages", summary.pages.to_string()),
            (
                "Records",
                format!(
                    "{} across {} categories",
                    oaipipe_core::fmt_num(summary.records),
                    summary.categories
                ),
            ),
            ("Outcome", summary.outcome.to_string()),
            ("Time", format!("{:.1}s", summary.elapsed.as_secs_f64())),
        ],
    );

    Ok(())
}

/// Print a key-value summary table on stderr
fn print_summary(title: &str, rows: &[(&str, String)]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new(title).fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    eprintln!("\n{table}");
}
