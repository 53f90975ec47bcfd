// ⚠️ Report Errors
// Domain failures that abort a run. File-level helpers wrap these in anyhow
// with the offending path attached.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    /// A required field is absent from the input document
    #[error("missing required field `{path}` in input document")]
    MissingField { path: String },

    /// A receipt object could not be read into its date + totals shape
    #[error("receipt #{index} is malformed: {source}")]
    MalformedReceipt {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    /// A receipt timestamp could not be parsed to a date and time
    #[error("receipt #{index} has an unparseable timestamp: {value:?}")]
    MalformedTimestamp { index: usize, value: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ReportError {
    /// Attach the receipt position to a timestamp error raised without one
    pub fn at_receipt(self, receipt_index: usize) -> Self {
        match self {
            ReportError::MalformedTimestamp { value, .. } => ReportError::MalformedTimestamp {
                index: receipt_index,
                value,
            },
            other => other,
        }
    }
}
