// 📊 Shift Aggregator
// Folds (shift key, team totals) pairs into one row per shift, then stamps
// each row with its spreadsheet date.

use crate::config::RowOrder;
use crate::shift::{Shift, ShiftKey};
use crate::totals::TeamTotals;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashMap;

// ============================================================================
// ROWS
// ============================================================================

/// Running totals for one shift
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftRow {
    pub key: ShiftKey,
    pub totals: TeamTotals,
    pub receipt_count: usize,
}

/// Finished report row, ready to serialize
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    /// "YYYY-MM-DD 00:00:00"
    pub shift_date_excel_format: String,
    pub shift_date: NaiveDate,
    pub shift: Shift,
    pub totals: TeamTotals,
    pub receipt_count: usize,
}

impl ReportRow {
    pub fn key(&self) -> ShiftKey {
        ShiftKey::new(self.shift_date, self.shift)
    }
}

impl From<ShiftRow> for ReportRow {
    fn from(row: ShiftRow) -> Self {
        ReportRow {
            shift_date_excel_format: row.key.excel_date(),
            shift_date: row.key.shift_date,
            shift: row.key.shift,
            totals: row.totals,
            receipt_count: row.receipt_count,
        }
    }
}

// ============================================================================
// FOLD
// ============================================================================

/// Group by shift key, keeping first-appearance order.
///
/// The first entry for a key seeds its row verbatim; later entries are added
/// into that row in place. The index map and row list live only for the
/// duration of this call.
pub fn aggregate<I>(entries: I) -> Vec<ShiftRow>
where
    I: IntoIterator<Item = (ShiftKey, TeamTotals)>,
{
    let mut position: HashMap<ShiftKey, usize> = HashMap::new();
    let mut rows: Vec<ShiftRow> = Vec::new();

    for (key, totals) in entries {
        match position.get(&key) {
            Some(&index) => {
                let row = &mut rows[index];
                row.totals.add(&totals);
                row.receipt_count += 1;
            }
            None => {
                position.insert(key, rows.len());
                rows.push(ShiftRow {
                    key,
                    totals,
                    receipt_count: 1,
                });
            }
        }
    }

    rows
}

/// Attach display dates and apply the configured row order
pub fn finalize_rows(rows: Vec<ShiftRow>, order: RowOrder) -> Vec<ReportRow> {
    let mut finished: Vec<ReportRow> = rows.into_iter().map(ReportRow::from).collect();

    if order == RowOrder::ShiftDateDesc {
        finished.sort_by_key(|row| Reverse((row.shift_date, row.shift)));
    }

    finished
}

// ============================================================================
// TESTS
// ============================================================================
