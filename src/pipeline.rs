// 🔁 Report Pipeline
// extract → classify → totalize → aggregate → finalize, over one in-memory batch.

use crate::aggregate::{aggregate, finalize_rows};
use crate::config::ReportConfig;
use crate::error::ReportError;
use crate::receipt::{extract_receipts, load_document, Receipt};
use crate::report::{ReportSummary, ShiftReport};
use crate::shift::{ShiftClassifier, ShiftKey};
use crate::totals::{TeamTotalizer, TeamTotals};
use anyhow::Result;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

pub struct ReportPipeline {
    config: ReportConfig,
    classifier: ShiftClassifier,
    totalizer: TeamTotalizer,
}

impl ReportPipeline {
    /// Build a pipeline; the configuration is validated here
    pub fn new(config: ReportConfig) -> std::result::Result<Self, ReportError> {
        config.validate()?;

        Ok(ReportPipeline {
            classifier: ShiftClassifier::from_config(&config),
            totalizer: TeamTotalizer::from_config(&config),
            config,
        })
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Run over an already parsed export document
    pub fn run(&self, document: &serde_json::Value) -> std::result::Result<ShiftReport, ReportError> {
        let receipts = extract_receipts(document)?;
        debug!(count = receipts.len(), "extracted receipts");

        self.run_receipts(&receipts)
    }

    /// Run over receipts already narrowed to date + totals
    pub fn run_receipts(&self, receipts: &[Receipt]) -> std::result::Result<ShiftReport, ReportError> {
        let mut entries: Vec<(ShiftKey, TeamTotals)> = Vec::with_capacity(receipts.len());
        let mut unmapped: BTreeMap<String, f64> = BTreeMap::new();

        for (index, receipt) in receipts.iter().enumerate() {
            let key = self
                .classifier
                .classify(&receipt.date)
                .map_err(|e| e.at_receipt(index))?;

            let totals = self.totalizer.totalize(receipt);
            for (code, amount) in totals.unmapped {
                *unmapped.entry(code).or_insert(0.0) += amount;
            }

            entries.push((key, totals.teams));
        }

        let rows = finalize_rows(aggregate(entries), self.config.row_order);

        let mapped_total: f64 = rows.iter().map(|r| r.totals.sum()).sum();
        let unmapped_total: f64 = unmapped.values().sum();

        for (code, amount) in &unmapped {
            warn!(
                tax_type = %code,
                amount = *amount,
                "tax type not mapped to any team; excluded from team totals"
            );
        }

        let summary = ReportSummary {
            receipt_count: receipts.len(),
            row_count: rows.len(),
            mapped_total,
            unmapped_total,
            unmapped_tax_types: unmapped,
        };
        info!("{}", summary.summary());

        Ok(ShiftReport {
            teams: self.totalizer.teams().to_vec(),
            rows,
            summary,
        })
    }

    /// Read the input file, build the report and write it as CSV
    pub fn run_files(&self, input: &Path, output: &Path) -> Result<ShiftReport> {
        info!(input = %input.display(), "loading receipts");
        let document = load_document(input)?;

        let report = self.run(&document)?;

        report.write_csv_file(output)?;
        info!(output = %output.display(), rows = report.rows.len(), "report written");

        Ok(report)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RowOrder, TeamTaxTypes};
    use crate::shift::Shift;
    use chrono::NaiveDate;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn pipeline() -> ReportPipeline {
        ReportPipeline::new(ReportConfig::default()).unwrap()
    }

    #[test]
    fn test_day_and_night_same_date() {
        let receipts = vec![
            Receipt::new("2023-02-10T10:00:00").with_total("0060000", 50.0),
            Receipt::new("2023-02-10T20:00:00").with_total("0210000", 30.0),
        ];

        let report = pipeline().run_receipts(&receipts).unwrap();

        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].shift, Shift::Day);
        assert_eq!(report.rows[0].shift_date, date(2023, 2, 10));
        assert_eq!(report.rows[0].totals.amounts, vec![50.0, 0.0]);
        assert_eq!(report.rows[1].shift, Shift::Night);
        assert_eq!(report.rows[1].shift_date, date(2023, 2, 10));
        assert_eq!(report.rows[1].totals.amounts, vec![0.0, 30.0]);
    }

    #[test]
    fn test_night_tail_goes_to_previous_day() {
        let receipts = vec![Receipt::new("2023-02-10T03:00:00").with_total("0060000", 9.0)];

        let report = pipeline().run_receipts(&receipts).unwrap();

        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].shift_date, date(2023, 2, 9));
        assert_eq!(report.rows[0].shift, Shift::Night);
        assert_eq!(report.rows[0].shift_date_excel_format, "2023-02-09 00:00:00");
    }

    #[test]
    fn test_same_shift_merges() {
        let receipts = vec![
            Receipt::new("2023-02-10T08:00:00").with_total("0060000", 10.0),
            Receipt::new("2023-02-10T08:00:00").with_total("0120000", 15.0),
        ];

        let report = pipeline().run_receipts(&receipts).unwrap();

        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].totals.amounts, vec![25.0, 0.0]);
        assert_eq!(report.rows[0].receipt_count, 2);
    }

    #[test]
    fn test_unmapped_totals_in_summary() {
        let receipts = vec![
            Receipt::new("2023-02-10T12:00:00")
                .with_total("0060000", 10.0)
                .with_total("0550000", 4.0),
            Receipt::new("2023-02-10T13:00:00").with_total("0550000", 1.0),
        ];

        let report = pipeline().run_receipts(&receipts).unwrap();

        assert_eq!(report.summary.receipt_count, 2);
        assert_eq!(report.summary.row_count, 1);
        assert_eq!(report.summary.mapped_total, 10.0);
        assert_eq!(report.summary.unmapped_total, 5.0);
        assert_eq!(report.summary.unmapped_tax_types.get("0550000"), Some(&5.0));
    }

    #[test]
    fn test_malformed_timestamp_aborts_with_index() {
        let receipts = vec![
            Receipt::new("2023-02-10T12:00:00"),
            Receipt::new("garbage"),
            Receipt::new("2023-02-10T13:00:00"),
        ];

        match pipeline().run_receipts(&receipts) {
            Err(ReportError::MalformedTimestamp { index, value }) => {
                assert_eq!(index, 1);
                assert_eq!(value, "garbage");
            }
            other => panic!("expected MalformedTimestamp, got {:?}", other),
        }
    }

    #[test]
    fn test_run_document_missing_receipts() {
        let err = pipeline().run(&json!({ "something": [] })).unwrap_err();
        assert!(matches!(err, ReportError::MissingField { .. }));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ReportConfig {
            teams: vec![
                TeamTaxTypes::new("cuisine", &["0060000"]),
                TeamTaxTypes::new("bar", &["0060000"]),
            ],
            ..ReportConfig::default()
        };

        assert!(matches!(
            ReportPipeline::new(config),
            Err(ReportError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_row_order_from_config() {
        let config = ReportConfig {
            row_order: RowOrder::ShiftDateDesc,
            ..ReportConfig::default()
        };
        let receipts = vec![
            Receipt::new("2023-02-09T10:00:00"),
            Receipt::new("2023-02-11T10:00:00"),
            Receipt::new("2023-02-10T10:00:00"),
        ];

        let report = ReportPipeline::new(config).unwrap().run_receipts(&receipts).unwrap();
        let dates: Vec<NaiveDate> = report.rows.iter().map(|r| r.shift_date).collect();

        assert_eq!(dates, vec![date(2023, 2, 11), date(2023, 2, 10), date(2023, 2, 9)]);
    }
}
