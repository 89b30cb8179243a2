//! OAI-PMH request state

use chrono::NaiveDate;

const VERB: &str = "ListRecords";
const METADATA_PREFIX: &str = "arXiv";

/// Protocol state for the next ListRecords call.
///
/// Exactly one shape is active at a time. A continuation carries the
/// resumption token and nothing else; the protocol forbids repeating the
/// initial parameters alongside it, and the enum makes that unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarvestRequest {
    Initial { from: Option<NaiveDate> },
    Resume { token: String },
}

impl HarvestRequest {
    /// First request of a run, optionally filtered by update date.
    pub fn initial(from: Option<NaiveDate>) -> Self {
        Self::Initial { from }
    }

    /// Continuation request carrying the server's token verbatim.
    pub fn resume(token: impl Into<String>) -> Self {
        Self::Resume {
            token: token.into(),
        }
    }

    /// Fields for the form-encoded POST body.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Initial { from } => {
                let mut fields = vec![
                    ("verb", VERB.to_string()),
                    ("metadataPrefix", METADATA_PREFIX.to_string()),
                ];
                if let Some(date) = from {
                    fields.push(("from", date.format("%Y-%m-%d").to_string()));
                }
                fields
            }
            Self::Resume { token } => vec![
                ("verb", VERB.to_string()),
                ("resumptionToken", token.clone()),
            ],
        }
    }
}
