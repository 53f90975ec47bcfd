// ⚙️ Report Configuration - Mapping as Data
// Tax-type → team routing, shift cutoff hours and file locations, loaded once
// and passed into the pipeline.

use crate::error::ReportError;
use crate::report::FIXED_COLUMNS;
use anyhow::{Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_NIGHT_CUTOFF_HOUR: u32 = 7;
pub const DEFAULT_DAY_SHIFT_CUTOFF_HOUR: u32 = 17;
pub const DEFAULT_INPUT_PATH: &str = "data/february_partial_receipts.json";

// ============================================================================
// TEAM MAPPING
// ============================================================================

/// One team and the tax-type codes whose revenue it receives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamTaxTypes {
    /// Team name, also used as the CSV column header
    pub team: String,

    /// Tax-type codes attributed to this team (order preserved)
    pub tax_types: Vec<String>,
}

impl TeamTaxTypes {
    pub fn new(team: impl Into<String>, tax_types: &[&str]) -> Self {
        TeamTaxTypes {
            team: team.into(),
            tax_types: tax_types.iter().map(|t| t.to_string()).collect(),
        }
    }
}

fn default_teams() -> Vec<TeamTaxTypes> {
    vec![
        TeamTaxTypes::new("cuisine", &["0060000", "0120000"]),
        TeamTaxTypes::new("bar", &["0210000"]),
    ]
}

// ============================================================================
// ROW ORDER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowOrder {
    /// Order in which each shift first appears in the input
    #[default]
    Insertion,

    /// Most recent shift date first, night before day within a date
    ShiftDateDesc,
}

// ============================================================================
// REPORT CONFIG
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub teams: Vec<TeamTaxTypes>,

    /// Receipts before this hour belong to the previous day's night shift
    pub night_cutoff_hour: u32,

    /// Receipts from this hour on belong to the current day's night shift
    pub day_shift_cutoff_hour: u32,

    pub row_order: RowOrder,

    pub input_path: PathBuf,

    /// Defaults to `input_path` with a `.csv` extension
    pub output_path: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            teams: default_teams(),
            night_cutoff_hour: DEFAULT_NIGHT_CUTOFF_HOUR,
            day_shift_cutoff_hour: DEFAULT_DAY_SHIFT_CUTOFF_HOUR,
            row_order: RowOrder::default(),
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            output_path: None,
        }
    }
}

impl ReportConfig {
    /// Load and validate configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: ReportConfig =
            serde_json::from_str(&content).context("Failed to parse config JSON")?;

        config.validate()?;
        Ok(config)
    }

    /// Team names in column order
    pub fn team_names(&self) -> Vec<String> {
        self.teams.iter().map(|t| t.team.clone()).collect()
    }

    pub fn resolved_output_path(&self) -> PathBuf {
        self.output_path
            .clone()
            .unwrap_or_else(|| self.input_path.with_extension("csv"))
    }

    /// Reject mappings that would double count or hours that can't partition a day
    pub fn validate(&self) -> std::result::Result<(), ReportError> {
        if self.teams.is_empty() {
            return Err(ReportError::InvalidConfig("no teams configured".to_string()));
        }

        let mut owners: HashMap<&str, &str> = HashMap::new();
        let mut seen_teams = Vec::new();

        for mapping in &self.teams {
            let team = mapping.team.trim();
            if team.is_empty() {
                return Err(ReportError::InvalidConfig("empty team name".to_string()));
            }
            if FIXED_COLUMNS.contains(&team) {
                return Err(ReportError::InvalidConfig(format!(
                    "team `{}` collides with a fixed report column",
                    team
                )));
            }
            if seen_teams.contains(&team) {
                return Err(ReportError::InvalidConfig(format!(
                    "team `{}` configured twice",
                    team
                )));
            }
            seen_teams.push(team);

            for code in &mapping.tax_types {
                if let Some(owner) = owners.insert(code.as_str(), mapping.team.as_str()) {
                    return Err(ReportError::InvalidConfig(format!(
                        "tax type `{}` mapped to both `{}` and `{}`",
                        code, owner, mapping.team
                    )));
                }
            }
        }

        if self.night_cutoff_hour > 24 || self.day_shift_cutoff_hour > 24 {
            return Err(ReportError::InvalidConfig(format!(
                "cutoff hours must be within 0..=24 (got {} and {})",
                self.night_cutoff_hour, self.day_shift_cutoff_hour
            )));
        }

        if self.night_cutoff_hour > self.day_shift_cutoff_hour {
            return Err(ReportError::InvalidConfig(format!(
                "night cutoff ({}) is after day shift cutoff ({})",
                self.night_cutoff_hour, self.day_shift_cutoff_hour
            )));
        }

        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ReportConfig::default();

        assert_eq!(config.team_names(), vec!["cuisine", "bar"]);
        assert_eq!(config.teams[0].tax_types, vec!["0060000", "0120000"]);
        assert_eq!(config.teams[1].tax_types, vec!["0210000"]);
        assert_eq!(config.night_cutoff_hour, 7);
        assert_eq!(config.day_shift_cutoff_hour, 17);
        assert_eq!(config.row_order, RowOrder::Insertion);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_output_path_defaults_to_csv_next_to_input() {
        let config = ReportConfig::default();
        assert_eq!(
            config.resolved_output_path(),
            PathBuf::from("data/february_partial_receipts.csv")
        );

        let config = ReportConfig {
            output_path: Some(PathBuf::from("out/report.csv")),
            ..ReportConfig::default()
        };
        assert_eq!(config.resolved_output_path(), PathBuf::from("out/report.csv"));
    }

    #[test]
    fn test_duplicate_tax_type_rejected() {
        let config = ReportConfig {
            teams: vec![
                TeamTaxTypes::new("cuisine", &["0060000"]),
                TeamTaxTypes::new("bar", &["0060000"]),
            ],
            ..ReportConfig::default()
        };

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("0060000"));
    }

    #[test]
    fn test_duplicate_team_rejected() {
        let config = ReportConfig {
            teams: vec![
                TeamTaxTypes::new("bar", &["0210000"]),
                TeamTaxTypes::new("bar", &["0060000"]),
            ],
            ..ReportConfig::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_team_named_like_fixed_column_rejected() {
        for name in ["shift", "shiftDate", "shiftDateExcelFormat"] {
            let config = ReportConfig {
                teams: vec![
                    TeamTaxTypes::new("cuisine", &["0060000"]),
                    TeamTaxTypes::new(name, &["0210000"]),
                ],
                ..ReportConfig::default()
            };

            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains(name), "{}", name);
        }
    }

    #[test]
    fn test_invalid_cutoffs_rejected() {
        let config = ReportConfig {
            night_cutoff_hour: 18,
            day_shift_cutoff_hour: 17,
            ..ReportConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ReportConfig {
            day_shift_cutoff_hour: 25,
            ..ReportConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ReportConfig {
            teams: Vec::new(),
            ..ReportConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_partial_config_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "teams": [
                    {{ "team": "kitchen", "tax_types": ["0060000"] }},
                    {{ "team": "bar", "tax_types": ["0210000"] }}
                ],
                "night_cutoff_hour": 6,
                "row_order": "shift_date_desc"
            }}"#
        )
        .unwrap();

        let config = ReportConfig::from_file(file.path()).unwrap();

        assert_eq!(config.team_names(), vec!["kitchen", "bar"]);
        assert_eq!(config.night_cutoff_hour, 6);
        assert_eq!(config.day_shift_cutoff_hour, 17);
        assert_eq!(config.row_order, RowOrder::ShiftDateDesc);
        assert_eq!(config.input_path, PathBuf::from(DEFAULT_INPUT_PATH));
    }

    #[test]
    fn test_from_file_rejects_invalid_mapping() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "teams": [
                {{ "team": "a", "tax_types": ["1"] }},
                {{ "team": "b", "tax_types": ["1"] }}
            ] }}"#
        )
        .unwrap();

        assert!(ReportConfig::from_file(file.path()).is_err());
    }
}
