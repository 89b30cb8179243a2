//! oaipipe arXiv - OAI-PMH metadata harvesting pipeline
//!
//! Walks the arXiv `ListRecords` endpoint page by page and appends each
//! record to category-partitioned shard files.
//!
//! # Example
//!
//! ```ignore
//! use oaipipe_arxiv::{Config, run};
//!
//! let config = Config {
//!     output_dir: "dataset".into(),
//!     ..Default::default()
//! };
//!
//! let summary = run(&config, progress)?;
//! println!("Harvested {} records", summary.records);
//! ```

pub mod config;
pub mod harvester;
pub mod parser;
pub mod record;
pub mod request;
pub mod runner;
pub mod sink;
pub mod tokenize;
pub mod transport;

// Re-exports
pub use config::Config;
pub use harvester::{Harvester, Outcome};
pub use record::Record;
pub use request::HarvestRequest;
pub use runner::{Summary, run, run_with_transport};
pub use sink::{SHARD_SIZE, ShardSink};
pub use transport::{HttpTransport, ListResponse, Transport};
