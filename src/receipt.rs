// 🧾 Receipt Extraction
// Pulls `receiptAggregates.receipts` out of the POS export and narrows every
// record to its timestamp and per-tax-type totals.

use crate::error::ReportError;
use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Field path of the receipt list inside the export document
pub const RECEIPTS_PATH: [&str; 2] = ["receiptAggregates", "receipts"];

// ============================================================================
// CORE TYPES
// ============================================================================

/// Totals recorded for one tax-type code on a receipt
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxTypeTotal {
    #[serde(rename = "taxInclusive", default, deserialize_with = "null_as_default")]
    pub tax_inclusive: f64,
}

/// Receipt - only the fields the report consumes; everything else in the
/// export is ignored on deserialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    /// Timestamp as written by the POS (e.g. "2023-02-10T03:00:00+01:00")
    pub date: String,

    #[serde(rename = "receiptTotalPerTaxType", default, deserialize_with = "totals_or_empty")]
    pub totals_per_tax_type: HashMap<String, TaxTypeTotal>,
}

// JSON `null` reads the same as an absent field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// `null` map, or `null` under a single code, both count as zero
fn totals_or_empty<'de, D>(deserializer: D) -> Result<HashMap<String, TaxTypeTotal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<HashMap<String, Option<TaxTypeTotal>>> = Option::deserialize(deserializer)?;

    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(code, total)| (code, total.unwrap_or_default()))
        .collect())
}

impl Receipt {
    pub fn new(date: impl Into<String>) -> Self {
        Receipt {
            date: date.into(),
            totals_per_tax_type: HashMap::new(),
        }
    }

    /// Builder pattern: add a tax-inclusive amount under a tax-type code
    pub fn with_total(mut self, tax_type: impl Into<String>, tax_inclusive: f64) -> Self {
        self.totals_per_tax_type
            .insert(tax_type.into(), TaxTypeTotal { tax_inclusive });
        self
    }

    /// Tax-inclusive amount for a code, zero when the receipt has none
    pub fn tax_inclusive(&self, tax_type: &str) -> f64 {
        self.totals_per_tax_type
            .get(tax_type)
            .map(|t| t.tax_inclusive)
            .unwrap_or(0.0)
    }
}

// ============================================================================
// EXTRACTION
// ============================================================================

/// Read and parse the export document from disk
pub fn load_document(path: &Path) -> Result<serde_json::Value> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read receipts file: {:?}", path))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse receipts JSON: {:?}", path))
}

/// Extract every receipt from the document, preserving input order
pub fn extract_receipts(document: &serde_json::Value) -> Result<Vec<Receipt>, ReportError> {
    let missing = || ReportError::MissingField {
        path: RECEIPTS_PATH.join("."),
    };

    let list = RECEIPTS_PATH
        .iter()
        .try_fold(document, |node, key| node.get(key))
        .and_then(|node| node.as_array())
        .ok_or_else(missing)?;

    list.iter()
        .enumerate()
        .map(|(index, raw)| {
            Receipt::deserialize(raw)
                .map_err(|source| ReportError::MalformedReceipt { index, source })
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
