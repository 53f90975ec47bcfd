// Shift Report - Core Library
// Groups POS receipts into day/night shifts and totals revenue per team

pub mod error;
pub mod config;     // Tax-type → team mapping, cutoffs, paths
pub mod receipt;    // Extractor + field selector
pub mod shift;      // Shift classifier
pub mod totals;     // Team totalizer
pub mod aggregate;  // Per-shift fold
pub mod report;     // Rows, summary, CSV output
pub mod pipeline;

// Re-export commonly used types
pub use error::ReportError;
pub use config::{ReportConfig, RowOrder, TeamTaxTypes};
pub use receipt::{extract_receipts, load_document, Receipt, TaxTypeTotal};
pub use shift::{parse_timestamp, Shift, ShiftClassifier, ShiftKey};
pub use totals::{ReceiptTotals, TeamTotalizer, TeamTotals};
pub use aggregate::{aggregate, finalize_rows, ReportRow, ShiftRow};
pub use report::{ReportSummary, ShiftReport};
pub use pipeline::ReportPipeline;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
