//! Main runner gluing the pagination engine to the shard writer.

use std::time::Instant;

use anyhow::{Context, Result};

use oaipipe_core::{SharedProgress, fmt_num};

use crate::config::Config;
use crate::harvester::{Harvester, Outcome};
use crate::sink::ShardSink;
use crate::transport::{HttpTransport, Transport};

/// Harvest execution summary
#[derive(Debug)]
pub struct Summary {
    pub pages: usize,
    pub records: u64,
    pub categories: usize,
    pub outcome: Outcome,
    pub elapsed: std::time::Duration,
}

/// Run the harvest against the configured endpoint.
pub fn run(config: &Config, progress: SharedProgress) -> Result<Summary> {
    let transport = HttpTransport::new(&config.base_url);
    run_with_transport(config, transport, progress)
}

/// Run the harvest over an arbitrary transport.
///
/// Split out so tests can drive the full pipeline with a scripted
/// transport instead of the network.
pub fn run_with_transport<T: Transport>(
    config: &Config,
    transport: T,
    progress: SharedProgress,
) -> Result<Summary> {
    let start = Instant::now();

    std::fs::create_dir_all(&config.output_dir)
        .context("Failed to create output directory")?;

    log::info!("Harvesting {}", config.base_url);
    if let Some(from) = config.from {
        log::info!("  From: {from}");
    }

    let pb = progress.stage_line("harvest");
    let mut sink = ShardSink::new(&config.output_dir);
    let mut harvester = Harvester::new(transport, config.from, config.max_retries)
        .with_page_delay(config.page_delay);
    let mut pages = 0usize;

    for page in harvester.by_ref() {
        let records = page?;
        pages += 1;
        for record in &records {
            sink.write(record)?;
        }
        log::debug!("page {}: {} records", pages, records.len());
        pb.set_message(format!(
            "page {pages} · {} records",
            fmt_num(sink.written())
        ));
    }
    pb.finish_and_clear();

    // The iterator only stops with an outcome set; Complete covers the
    // degenerate zero-page run.
    let outcome = harvester.outcome().unwrap_or(Outcome::Complete);
    let summary = Summary {
        pages,
        records: sink.written(),
        categories: sink.categories(),
        outcome,
        elapsed: start.elapsed(),
    };

    log::info!("=== Harvest Summary ===");
    log::info!("Pages: {}", summary.pages);
    log::info!(
        "Records: {} across {} categories",
        fmt_num(summary.records),
        summary.categories
    );
    log::info!("Outcome: {}", summary.outcome);
    log::info!("Time: {:.1}s", summary.elapsed.as_secs_f64());

    Ok(summary)
}
