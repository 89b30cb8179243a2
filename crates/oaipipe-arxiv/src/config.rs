//! arXiv harvest configuration

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;

use crate::harvester::PAGE_DELAY;

/// Default OAI-PMH endpoint.
pub const DEFAULT_BASE_URL: &str = "https://export.arxiv.org/oai2";

/// Runtime configuration for the arXiv harvest
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory for the category-partitioned shards
    pub output_dir: PathBuf,
    /// OAI-PMH endpoint URL
    pub base_url: String,
    /// Only harvest records updated on or after this date
    pub from: Option<NaiveDate>,
    /// Consecutive 503 responses tolerated before giving up
    pub max_retries: u32,
    /// Pause between successive page requests
    pub page_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("dataset"),
            base_url: DEFAULT_BASE_URL.to_string(),
            from: None,
            max_retries: 10,
            page_delay: PAGE_DELAY,
        }
    }
}
