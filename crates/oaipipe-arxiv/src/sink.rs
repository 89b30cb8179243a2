//! Category-partitioned shard files.
//!
//! Each record is appended as one tab-separated line to
//! `base/<category>/<shard:08>.txt`, rotating to a new shard after every
//! [`SHARD_SIZE`] records of a category.

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::record::Record;
use crate::tokenize;

/// Records per shard file.
pub const SHARD_SIZE: u64 = 1000;

/// Append position within one category. Lives for the process lifetime;
/// created lazily on the category's first record.
#[derive(Debug, Default, Clone, Copy)]
struct ShardCursor {
    records: u64,
    shard: u64,
}

/// Writer that routes records into per-category shard files.
///
/// Not safe for concurrent use on the same category; `&mut self` keeps all
/// writes serialized.
#[derive(Debug)]
pub struct ShardSink {
    base: PathBuf,
    cursors: HashMap<String, ShardCursor>,
    written: u64,
}

impl ShardSink {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            cursors: HashMap::new(),
            written: 0,
        }
    }

    /// Total records written across all categories.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Number of categories seen so far.
    pub fn categories(&self) -> usize {
        self.cursors.len()
    }

    /// Append one record to its category's current shard.
    ///
    /// Records 1..=SHARD_SIZE of a category land in shard 0, the next
    /// SHARD_SIZE in shard 1, and so on. Writing the same record twice
    /// appends two identical lines; deduplication is the caller's concern.
    pub fn write(&mut self, record: &Record) -> Result<()> {
        let key = record.partition_key();
        let dir = self.base.join(&key);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("cannot create {}", dir.display()))?;

        let cursor = self.cursors.entry(key).or_default();
        let path = dir.join(format!("{:08}.txt", cursor.shard));
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("cannot open {}", path.display()))?;
        writeln!(
            file,
            "{}\t{}\t{}\t{}",
            record.identifier,
            record.categories,
            tokenize::normalize(&record.title),
            tokenize::normalize(&record.abstract_text),
        )
        .with_context(|| format!("cannot write {}", path.display()))?;

        cursor.records += 1;
        if cursor.records % SHARD_SIZE == 0 {
            cursor.shard += 1;
        }
        self.written += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(id: &str, categories: &str) -> Record {
        Record {
            identifier: id.to_string(),
            title: "A Title".to_string(),
            abstract_text: "An abstract.".to_string(),
            categories: categories.to_string(),
        }
    }

    fn lines(path: &std::path::Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(String::from)
            .collect()
    }

    #[test]
    fn routes_by_top_level_category() {
        let tmp = TempDir::new().unwrap();
        let mut sink = ShardSink::new(tmp.path());

        sink.write(&record("0704.0001", "cs.LG stat.ML")).unwrap();
        sink.write(&record("0704.0002", "cond-mat.str-el")).unwrap();

        assert!(tmp.path().join("cs/00000000.txt").is_file());
        assert!(tmp.path().join("cond-mat/00000000.txt").is_file());
        assert_eq!(sink.categories(), 2);
        assert_eq!(sink.written(), 2);
    }

    #[test]
    fn line_format_tab_separated() {
        let tmp = TempDir::new().unwrap();
        let mut sink = ShardSink::new(tmp.path());

        let rec = Record {
            identifier: "0704.0001".to_string(),
            title: "Graphs, and More Graphs".to_string(),
            abstract_text: "We study graphs. They are useful.".to_string(),
            categories: "cs.DM math.CO".to_string(),
        };
        sink.write(&rec).unwrap();

        let lines = lines(&tmp.path().join("cs/00000000.txt"));
        assert_eq!(lines.len(), 1);
        let fields: Vec<&str> = lines[0].split('\t').collect();
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0], "0704.0001");
        assert_eq!(fields[1], "cs.DM math.CO");
        assert_eq!(fields[2], "Graphs , and More Graphs");
        assert_eq!(fields[3], "We study graphs . They are useful .");
    }

    #[test]
    fn duplicate_records_append_identical_lines() {
        let tmp = TempDir::new().unwrap();
        let mut sink = ShardSink::new(tmp.path());

        let rec = record("0704.0001", "cs.AI");
        sink.write(&rec).unwrap();
        sink.write(&rec).unwrap();

        let lines = lines(&tmp.path().join("cs/00000000.txt"));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], lines[1]);
    }

    #[test]
    fn shard_rolls_after_full_batch() {
        let tmp = TempDir::new().unwrap();
        let mut sink = ShardSink::new(tmp.path());

        for i in 0..1001 {
            sink.write(&record(&format!("0704.{i:04}"), "cs.AI")).unwrap();
        }

        let shard0 = lines(&tmp.path().join("cs/00000000.txt"));
        let shard1 = lines(&tmp.path().join("cs/00000001.txt"));
        assert_eq!(shard0.len(), 1000);
        assert_eq!(shard1.len(), 1);
        assert!(shard1[0].starts_with("0704.1000\t"));
    }

    #[test]
    fn cursors_are_independent_per_category() {
        let tmp = TempDir::new().unwrap();
        let mut sink = ShardSink::new(tmp.path());

        for i in 0..1000 {
            sink.write(&record(&format!("a{i}"), "cs.AI")).unwrap();
        }
        sink.write(&record("b0", "math.CO")).unwrap();
        // math cursor starts fresh in shard 0
        assert!(tmp.path().join("math/00000000.txt").is_file());
        assert!(!tmp.path().join("math/00000001.txt").exists());
        // the next cs record opens shard 1
        sink.write(&record("a1000", "cs.AI")).unwrap();
        assert!(tmp.path().join("cs/00000001.txt").is_file());
    }

    #[test]
    fn separator_in_category_sanitized() {
        let tmp = TempDir::new().unwrap();
        let mut sink = ShardSink::new(tmp.path());

        sink.write(&record("9404002", "cmp-lg/9404002")).unwrap();
        assert!(tmp.path().join("cmp-lg/00000000.txt").is_file());
    }
}
