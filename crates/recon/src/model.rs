use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use crate::normalize::format_cents;

// ---------------------------------------------------------------------------
// Input records
// ---------------------------------------------------------------------------

/// Which input collection a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Bank,
    Ledger,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bank => write!(f, "bank"),
            Self::Ledger => write!(f, "ledger"),
        }
    }
}

/// One normalized bank-statement movement.
///
/// `date` / `amount_cents` are `None` when the upstream value could not be
/// normalized; such records skip bucketing and surface as unmatched.
#[derive(Debug, Clone, Serialize)]
pub struct BankRecord {
    pub id: String,
    pub account: String,
    pub date: Option<NaiveDate>,
    pub amount_cents: Option<i64>,
    pub description: String,
}

/// One normalized internal accounting entry.
///
/// `item` is the Phase 1 grouping key. `document` and `rp` are linking
/// signals between split postings; empty string = absent, creates no edge.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerRecord {
    pub id: String,
    pub account: String,
    pub date: Option<NaiveDate>,
    pub amount_cents: Option<i64>,
    pub item: String,
    pub document: String,
    pub rp: String,
    pub description: String,
    pub code: String,
}

// ---------------------------------------------------------------------------
// Phase identity
// ---------------------------------------------------------------------------

/// Ordered phase identifier, stored in tenths so `1.5` sits between `1`
/// and `2`. Renders as the dotted decimal auditors see (`1`, `1.5`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhaseId(u16);

impl PhaseId {
    pub const ITEM_GROUP: PhaseId = PhaseId(10);
    pub const DOCUMENT_LINK: PhaseId = PhaseId(15);

    pub const fn from_tenths(tenths: u16) -> Self {
        PhaseId(tenths)
    }

    pub const fn tenths(self) -> u16 {
        self.0
    }
}

impl std::fmt::Display for PhaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0 % 10 == 0 {
            write!(f, "{}", self.0 / 10)
        } else {
            write!(f, "{}.{}", self.0 / 10, self.0 % 10)
        }
    }
}

impl Serialize for PhaseId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// Matched output
// ---------------------------------------------------------------------------

/// `;`-joined per-member values of the ledger fields that may legitimately
/// differ across a matched group, in `ledger_group` order. This is the audit
/// trail showing which original entries were summed.
#[derive(Debug, Clone, Serialize)]
pub struct MergedFields {
    pub item: String,
    pub document: String,
    pub description: String,
    pub amount: String,
}

/// One successful match: a bank record against a group of ledger entries
/// whose cents-sum equals it exactly.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciledEntry {
    pub phase: PhaseId,
    pub bank: BankRecord,
    pub ledger_group: Vec<LedgerRecord>,
    pub merged: MergedFields,
}

impl ReconciledEntry {
    /// Build an entry from a consumed bank record and ledger group.
    /// The group's cents-sum must equal the bank amount exactly.
    pub fn new(phase: PhaseId, bank: BankRecord, ledger_group: Vec<LedgerRecord>) -> Self {
        debug_assert_eq!(
            ledger_group.iter().filter_map(|r| r.amount_cents).sum::<i64>(),
            bank.amount_cents.unwrap_or(0),
        );
        let merged = MergedFields {
            item: join_field(&ledger_group, |r| r.item.clone()),
            document: join_field(&ledger_group, |r| r.document.clone()),
            description: join_field(&ledger_group, |r| r.description.clone()),
            amount: join_field(&ledger_group, |r| {
                r.amount_cents.map(format_cents).unwrap_or_default()
            }),
        };
        ReconciledEntry {
            phase,
            bank,
            ledger_group,
            merged,
        }
    }
}

fn join_field<F: Fn(&LedgerRecord) -> String>(group: &[LedgerRecord], get: F) -> String {
    group.iter().map(|r| get(r)).collect::<Vec<_>>().join(";")
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// More than one candidate group summed to the same bank amount; the first
/// in scan order was accepted. Soft signal for operators, never an error.
#[derive(Debug, Clone, Serialize)]
pub struct AmbiguityWarning {
    pub account: String,
    pub date: NaiveDate,
    pub bank_id: String,
    pub phase: PhaseId,
    pub chosen_ledger_ids: Vec<String>,
    pub candidates: usize,
}

// ---------------------------------------------------------------------------
// Summary + result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ReconSummary {
    pub bank_records: usize,
    pub ledger_records: usize,
    pub matched: usize,
    pub matched_by_phase: BTreeMap<String, usize>,
    pub unmatched_bank: usize,
    pub unmatched_ledger: usize,
    pub ambiguous: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
}

/// The engine's return value for one reconciliation run. Every input record
/// appears exactly once across `matched` / `unmatched_bank` /
/// `unmatched_ledger`.
#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub matched: Vec<ReconciledEntry>,
    pub unmatched_bank: Vec<BankRecord>,
    pub unmatched_ledger: Vec<LedgerRecord>,
    pub warnings: Vec<AmbiguityWarning>,
}
