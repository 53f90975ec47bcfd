// 📄 Shift Report
// Finished rows plus run summary, and the CSV writer for spreadsheet import.

use crate::aggregate::ReportRow;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

/// Leading columns, before one column per team
pub const FIXED_COLUMNS: [&str; 3] = ["shiftDateExcelFormat", "shiftDate", "shift"];

// ============================================================================
// SUMMARY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    pub receipt_count: usize,
    pub row_count: usize,

    /// Sum of every team column over all rows
    pub mapped_total: f64,

    /// Revenue under tax-type codes no team claims (not in any row)
    pub unmapped_total: f64,
    pub unmapped_tax_types: BTreeMap<String, f64>,
}

impl ReportSummary {
    pub fn has_unmapped(&self) -> bool {
        !self.unmapped_tax_types.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} receipts → {} shift rows | mapped {:.2}, unmapped {:.2} ({} codes)",
            self.receipt_count,
            self.row_count,
            self.mapped_total,
            self.unmapped_total,
            self.unmapped_tax_types.len()
        )
    }
}

// ============================================================================
// REPORT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftReport {
    /// Team column names, in the order amounts appear in each row
    pub teams: Vec<String>,
    pub rows: Vec<ReportRow>,
    pub summary: ReportSummary,
}

impl ShiftReport {
    pub fn headers(&self) -> Vec<String> {
        FIXED_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(self.teams.iter().cloned())
            .collect()
    }

    /// Total for one team across all rows
    pub fn team_total(&self, team: &str) -> Option<f64> {
        let index = self.teams.iter().position(|t| t == team)?;
        Some(
            self.rows
                .iter()
                .map(|r| r.totals.amounts.get(index).copied().unwrap_or(0.0))
                .sum(),
        )
    }

    /// Write the report as CSV to any writer
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);

        wtr.write_record(self.headers())
            .context("Failed to write CSV header")?;

        for row in &self.rows {
            let mut record = vec![
                row.shift_date_excel_format.clone(),
                row.shift_date.to_string(),
                row.shift.label().to_string(),
            ];
            record.extend(row.totals.amounts.iter().map(|a| a.to_string()));

            wtr.write_record(&record)
                .with_context(|| format!("Failed to write row for {}", row.key()))?;
        }

        wtr.flush().context("Failed to flush CSV output")?;
        Ok(())
    }

    /// Write the report to a CSV file, creating parent directories
    pub fn write_csv_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory: {:?}", parent))?;
        }

        let file = fs::File::create(path)
            .with_context(|| format!("Failed to create output file: {:?}", path))?;

        self.write_csv(io::BufWriter::new(file))
            .with_context(|| format!("Failed to write report: {:?}", path))
    }
}

// ============================================================================
// TESTS
// ============================================================================
