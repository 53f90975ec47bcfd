// 💶 Team Totalizer
// Routes each receipt's per-tax-type amounts to the team that owns the code.

use crate::config::ReportConfig;
use crate::receipt::Receipt;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// ============================================================================
// TEAM TOTALS
// ============================================================================

/// One amount per configured team, in configuration order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TeamTotals {
    pub amounts: Vec<f64>,
}

impl TeamTotals {
    /// Add another receipt's totals into this one, team by team
    pub fn add(&mut self, other: &TeamTotals) {
        debug_assert_eq!(
            self.amounts.len(),
            other.amounts.len(),
            "team totals from different team lists"
        );
        for (total, amount) in self.amounts.iter_mut().zip(&other.amounts) {
            *total += amount;
        }
    }

    pub fn sum(&self) -> f64 {
        self.amounts.iter().sum()
    }
}

/// Totalizer output for one receipt
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReceiptTotals {
    pub teams: TeamTotals,

    /// Amounts under codes no team claims, by code
    pub unmapped: BTreeMap<String, f64>,
}

// ============================================================================
// TOTALIZER
// ============================================================================

pub struct TeamTotalizer {
    teams: Vec<String>,
    /// Codes per team, parallel to `teams`
    tax_types: Vec<Vec<String>>,
    /// tax-type code → index into `teams`
    owner_of: HashMap<String, usize>,
}

impl TeamTotalizer {
    pub fn from_config(config: &ReportConfig) -> Self {
        let mut owner_of = HashMap::new();
        for (index, mapping) in config.teams.iter().enumerate() {
            for code in &mapping.tax_types {
                // validate() rejects double ownership; first owner wins otherwise
                owner_of.entry(code.clone()).or_insert(index);
            }
        }

        TeamTotalizer {
            teams: config.team_names(),
            tax_types: config.teams.iter().map(|t| t.tax_types.clone()).collect(),
            owner_of,
        }
    }

    pub fn teams(&self) -> &[String] {
        &self.teams
    }

    pub fn team_for(&self, tax_type: &str) -> Option<&str> {
        self.owner_of
            .get(tax_type)
            .map(|&index| self.teams[index].as_str())
    }

    /// Sum each team's tax-type buckets; codes absent from the receipt add nothing.
    /// Codes are summed in configuration order so repeated runs agree to the bit.
    pub fn totalize(&self, receipt: &Receipt) -> ReceiptTotals {
        let amounts = self
            .tax_types
            .iter()
            .map(|codes| {
                codes
                    .iter()
                    .fold(0.0, |acc, code| acc + receipt.tax_inclusive(code))
            })
            .collect();

        let unmapped = receipt
            .totals_per_tax_type
            .iter()
            .filter(|(code, _)| !self.owner_of.contains_key(code.as_str()))
            .map(|(code, total)| (code.clone(), total.tax_inclusive))
            .collect();

        ReceiptTotals {
            teams: TeamTotals { amounts },
            unmapped,
        }
    }
}

impl Default for TeamTotalizer {
    fn default() -> Self {
        Self::from_config(&ReportConfig::default())
    }
}

// ============================================================================
// TESTS
// ============================================================================
