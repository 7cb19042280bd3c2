use std::collections::HashMap;

use crate::connect::components;
use crate::error::ReconError;
use crate::model::{BankRecord, LedgerRecord, PhaseId};

// ---------------------------------------------------------------------------
// Phase contract
// ---------------------------------------------------------------------------

/// A bucketed record with its resolved amount. Only records that survived
/// normalization reach a phase, so the amount is always present here.
#[derive(Debug, Clone, Copy)]
pub struct BankItem<'a> {
    pub rec: &'a BankRecord,
    pub cents: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct LedgerItem<'a> {
    pub rec: &'a LedgerRecord,
    pub cents: i64,
}

/// One proposed match: indices into the slices the phase was given.
/// `candidates` counts how many groups summed to the bank amount; more
/// than one means the first in scan order won and the engine records an
/// ambiguity warning.
#[derive(Debug, Clone)]
pub struct PhaseMatch {
    pub bank_idx: usize,
    pub ledger_idxs: Vec<usize>,
    pub candidates: usize,
}

#[derive(Debug, Default)]
pub struct PhaseOutcome {
    pub matches: Vec<PhaseMatch>,
}

/// An ordered matching strategy. Phases see only still-unmatched records
/// and propose index-based matches; consumption bookkeeping stays in the
/// engine, so a phase cannot violate the at-most-once invariant.
pub trait MatchPhase {
    fn id(&self) -> PhaseId;
    fn name(&self) -> &'static str;
    fn run(&self, bank: &[BankItem<'_>], ledger: &[LedgerItem<'_>]) -> PhaseOutcome;
}

// ---------------------------------------------------------------------------
// Shared sum-matching scan
// ---------------------------------------------------------------------------

/// Match bank items against candidate ledger groups by exact cents-sum.
///
/// Bank items are scanned in slice order, groups in the order given; the
/// first group whose sum equals the bank amount wins and is consumed. All
/// equal-sum candidates are counted so the caller can surface ambiguity.
fn match_groups_by_sum(
    bank: &[BankItem<'_>],
    ledger: &[LedgerItem<'_>],
    groups: &[Vec<usize>],
) -> PhaseOutcome {
    let sums: Vec<i64> = groups
        .iter()
        .map(|g| g.iter().map(|&i| ledger[i].cents).sum())
        .collect();

    let mut group_used = vec![false; groups.len()];
    let mut outcome = PhaseOutcome::default();

    for (bi, bank_item) in bank.iter().enumerate() {
        let mut chosen: Option<usize> = None;
        let mut candidates = 0usize;
        for (gi, sum) in sums.iter().enumerate() {
            if group_used[gi] || *sum != bank_item.cents {
                continue;
            }
            candidates += 1;
            if chosen.is_none() {
                chosen = Some(gi);
            }
        }
        if let Some(gi) = chosen {
            group_used[gi] = true;
            outcome.matches.push(PhaseMatch {
                bank_idx: bi,
                ledger_idxs: groups[gi].clone(),
                candidates,
            });
        }
    }
    outcome
}

// ---------------------------------------------------------------------------
// Phase 1 — same-item grouping
// ---------------------------------------------------------------------------

/// Phase 1: ledger records sharing an identical `item` code form one
/// candidate group; a group matches a bank record when its cents-sum
/// equals the bank amount exactly.
pub struct ItemGroupPhase;

impl MatchPhase for ItemGroupPhase {
    fn id(&self) -> PhaseId {
        PhaseId::ITEM_GROUP
    }

    fn name(&self) -> &'static str {
        "item_group"
    }

    fn run(&self, bank: &[BankItem<'_>], ledger: &[LedgerItem<'_>]) -> PhaseOutcome {
        // Groups keyed by item, in first-seen key order.
        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut by_item: HashMap<&str, usize> = HashMap::new();
        for (i, item) in ledger.iter().enumerate() {
            match by_item.get(item.rec.item.as_str()) {
                Some(&g) => groups[g].push(i),
                None => {
                    by_item.insert(&item.rec.item, groups.len());
                    groups.push(vec![i]);
                }
            }
        }
        match_groups_by_sum(bank, ledger, &groups)
    }
}

// ---------------------------------------------------------------------------
// Phase 1.5 — connected-document grouping
// ---------------------------------------------------------------------------

/// Phase 1.5: ledger records left by Phase 1 are linked when they share a
/// non-empty `document` or a non-empty `rp`; union-find components become
/// the candidate groups. This unifies split postings of one underlying
/// transaction whose `item` codes differ.
pub struct DocumentLinkPhase;

impl MatchPhase for DocumentLinkPhase {
    fn id(&self) -> PhaseId {
        PhaseId::DOCUMENT_LINK
    }

    fn name(&self) -> &'static str {
        "document_link"
    }

    fn run(&self, bank: &[BankItem<'_>], ledger: &[LedgerItem<'_>]) -> PhaseOutcome {
        let groups = components(ledger.len(), |a, b| {
            let (ra, rb) = (ledger[a].rec, ledger[b].rec);
            (!ra.document.is_empty() && ra.document == rb.document)
                || (!ra.rp.is_empty() && ra.rp == rb.rp)
        });
        match_groups_by_sum(bank, ledger, &groups)
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Ordered list of phases. Ids must be strictly increasing: earlier phases
/// are higher-confidence and always take priority over later ones.
pub struct Pipeline {
    phases: Vec<Box<dyn MatchPhase>>,
}

impl Pipeline {
    pub fn new(phases: Vec<Box<dyn MatchPhase>>) -> Result<Self, ReconError> {
        if phases.is_empty() {
            return Err(ReconError::ConfigValidation(
                "pipeline requires at least one phase".into(),
            ));
        }
        for pair in phases.windows(2) {
            if pair[1].id() <= pair[0].id() {
                return Err(ReconError::ConfigValidation(format!(
                    "phase '{}' (id {}) must come after '{}' (id {})",
                    pair[1].name(),
                    pair[1].id(),
                    pair[0].name(),
                    pair[0].id(),
                )));
            }
        }
        Ok(Pipeline { phases })
    }

    pub fn phases(&self) -> &[Box<dyn MatchPhase>] {
        &self.phases
    }
}

/// The two specified phases, in priority order.
pub fn default_pipeline() -> Pipeline {
    Pipeline::new(vec![Box::new(ItemGroupPhase), Box::new(DocumentLinkPhase)])
        .expect("default pipeline is valid")
}

/// Registry used by config-driven phase selection.
pub fn phase_by_name(name: &str) -> Option<Box<dyn MatchPhase>> {
    match name {
        "item_group" => Some(Box::new(ItemGroupPhase)),
        "document_link" => Some(Box::new(DocumentLinkPhase)),
        _ => None,
    }
}
