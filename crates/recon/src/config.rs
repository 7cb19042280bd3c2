use serde::Deserialize;

use crate::error::ReconError;
use crate::phases::{phase_by_name, Pipeline};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RunConfig {
    pub name: String,
    pub bank: BankSource,
    pub ledger: LedgerSource,
    #[serde(default)]
    pub engine: EngineOptions,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BankSource {
    pub file: String,
    pub columns: BankColumns,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerSource {
    pub file: String,
    pub columns: LedgerColumns,
}

// ---------------------------------------------------------------------------
// Column mappings
// ---------------------------------------------------------------------------

/// Bank statement mapping. Either a single signed `amount` column or
/// separate `credit`/`debit` columns (whichever is populated decides the
/// sign) must be configured.
#[derive(Debug, Clone, Deserialize)]
pub struct BankColumns {
    #[serde(default)]
    pub id: Option<String>,
    pub account: String,
    pub date: String,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub credit: Option<String>,
    #[serde(default)]
    pub debit: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerColumns {
    #[serde(default)]
    pub id: Option<String>,
    pub account: String,
    pub date: String,
    pub amount: String,
    pub item: String,
    #[serde(default)]
    pub document: Option<String>,
    #[serde(default)]
    pub rp: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

// ---------------------------------------------------------------------------
// Engine options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct EngineOptions {
    /// Phase names, in priority order.
    #[serde(default = "default_phases")]
    pub phases: Vec<String>,
    /// Escalate ambiguity warnings to a failing exit at the CLI boundary.
    #[serde(default)]
    pub fail_on_ambiguous: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            phases: default_phases(),
            fail_on_ambiguous: false,
        }
    }
}

fn default_phases() -> Vec<String> {
    vec!["item_group".into(), "document_link".into()]
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl RunConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: RunConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let cols = &self.bank.columns;
        if cols.amount.is_none() && cols.credit.is_none() && cols.debit.is_none() {
            return Err(ReconError::ConfigValidation(
                "bank columns need 'amount' or 'credit'/'debit'".into(),
            ));
        }
        // Phase names must resolve and sit in strictly increasing order.
        self.build_pipeline()?;
        Ok(())
    }

    /// Resolve the configured phase names into an ordered pipeline.
    pub fn build_pipeline(&self) -> Result<Pipeline, ReconError> {
        let mut phases = Vec::with_capacity(self.engine.phases.len());
        for name in &self.engine.phases {
            let phase = phase_by_name(name).ok_or_else(|| {
                ReconError::ConfigValidation(format!("unknown phase: '{name}'"))
            })?;
            phases.push(phase);
        }
        Pipeline::new(phases)
    }
}
