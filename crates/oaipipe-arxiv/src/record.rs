//! Harvested record model

/// One bibliographic record decoded from a ListRecords page.
///
/// Immutable once parsed. `categories` keeps the whitespace-separated list
/// exactly as transmitted so shard lines reproduce it byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub identifier: String,
    pub title: String,
    pub abstract_text: String,
    pub categories: String,
}

impl Record {
    /// Categories in document order.
    pub fn category_list(&self) -> impl Iterator<Item = &str> {
        self.categories.split_whitespace()
    }

    /// First category of the record.
    pub fn primary_category(&self) -> &str {
        self.categories.split_whitespace().next().unwrap_or("")
    }

    /// Directory key for the primary category: the segment before the
    /// first `.` or `/`, sanitized to a single path component.
    pub fn partition_key(&self) -> String {
        let primary = self.primary_category();
        let top = primary.split(['.', '/']).next().unwrap_or(primary);
        top.replace(['/', '\\'], "-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(categories: &str) -> Record {
        Record {
            identifier: "0704.0001".to_string(),
            title: "Title".to_string(),
            abstract_text: "Abstract.".to_string(),
            categories: categories.to_string(),
        }
    }

    #[test]
    fn partition_key_multi_category() {
        assert_eq!(record("cs.LG stat.ML").partition_key(), "cs");
    }

    #[test]
    fn partition_key_hyphenated_archive() {
        assert_eq!(record("cond-mat.str-el").partition_key(), "cond-mat");
    }

    #[test]
    fn partition_key_no_subject_class() {
        assert_eq!(record("hep-th").partition_key(), "hep-th");
    }

    #[test]
    fn partition_key_legacy_slash_identifier() {
        assert_eq!(record("cmp-lg/9404002").partition_key(), "cmp-lg");
    }

    #[test]
    fn primary_category_is_first() {
        assert_eq!(record("math.CO cs.DM").primary_category(), "math.CO");
    }

    #[test]
    fn category_list_preserves_order() {
        let r = record("cs.LG stat.ML math.OC");
        let cats: Vec<&str> = r.category_list().collect();
        assert_eq!(cats, vec!["cs.LG", "stat.ML", "math.OC"]);
    }
}
