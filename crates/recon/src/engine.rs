use std::collections::{BTreeMap, HashSet};

use crate::bucket::partition;
use crate::error::ReconError;
use crate::model::{
    AmbiguityWarning, BankRecord, LedgerRecord, ReconMeta, ReconResult, ReconSummary,
    ReconciledEntry, Side,
};
use crate::phases::{default_pipeline, BankItem, LedgerItem, Pipeline};

/// Run the default two-phase pipeline over one reconciliation period.
pub fn reconcile(bank: &[BankRecord], ledger: &[LedgerRecord]) -> Result<ReconResult, ReconError> {
    reconcile_with(&default_pipeline(), "default", bank, ledger)
}

/// Run a caller-assembled pipeline.
///
/// Buckets are processed in (account, date) order; within a bucket, phases
/// run in pipeline order and each phase sees only the records every earlier
/// phase left unmatched. Matched records are removed from the pool the
/// moment a phase claims them, so no record is consumed twice.
pub fn reconcile_with(
    pipeline: &Pipeline,
    config_name: &str,
    bank: &[BankRecord],
    ledger: &[LedgerRecord],
) -> Result<ReconResult, ReconError> {
    validate_unique_ids(Side::Bank, bank.iter().map(|r| r.id.as_str()))?;
    validate_unique_ids(Side::Ledger, ledger.iter().map(|r| r.id.as_str()))?;

    let parts = partition(bank, ledger);

    let mut matched: Vec<ReconciledEntry> = Vec::new();
    let mut unmatched_bank: Vec<BankRecord> = Vec::new();
    let mut unmatched_ledger: Vec<LedgerRecord> = Vec::new();
    let mut warnings: Vec<AmbiguityWarning> = Vec::new();

    for (key, bucket) in &parts.buckets {
        let mut bank_used = vec![false; bucket.bank.len()];
        let mut ledger_used = vec![false; bucket.ledger.len()];

        for phase in pipeline.phases() {
            // Live view: indices into the bucket for everything still
            // unmatched, in bucket (id-sorted) order.
            let bank_map: Vec<usize> =
                (0..bucket.bank.len()).filter(|&i| !bank_used[i]).collect();
            let ledger_map: Vec<usize> =
                (0..bucket.ledger.len()).filter(|&i| !ledger_used[i]).collect();
            if bank_map.is_empty() || ledger_map.is_empty() {
                break;
            }

            let bank_items: Vec<BankItem<'_>> = bank_map
                .iter()
                .map(|&i| BankItem {
                    rec: &bucket.bank[i],
                    cents: bucket.bank[i].amount_cents.unwrap_or(0),
                })
                .collect();
            let ledger_items: Vec<LedgerItem<'_>> = ledger_map
                .iter()
                .map(|&i| LedgerItem {
                    rec: &bucket.ledger[i],
                    cents: bucket.ledger[i].amount_cents.unwrap_or(0),
                })
                .collect();

            let outcome = phase.run(&bank_items, &ledger_items);

            for m in outcome.matches {
                let bi = bank_map[m.bank_idx];
                debug_assert!(!bank_used[bi]);
                bank_used[bi] = true;

                let group: Vec<LedgerRecord> = m
                    .ledger_idxs
                    .iter()
                    .map(|&li| {
                        let l = ledger_map[li];
                        debug_assert!(!ledger_used[l]);
                        ledger_used[l] = true;
                        bucket.ledger[l].clone()
                    })
                    .collect();

                if m.candidates > 1 {
                    warnings.push(AmbiguityWarning {
                        account: key.account.clone(),
                        date: key.date,
                        bank_id: bucket.bank[bi].id.clone(),
                        phase: phase.id(),
                        chosen_ledger_ids: group.iter().map(|r| r.id.clone()).collect(),
                        candidates: m.candidates,
                    });
                }

                matched.push(ReconciledEntry::new(
                    phase.id(),
                    bucket.bank[bi].clone(),
                    group,
                ));
            }
        }

        for (i, rec) in bucket.bank.iter().enumerate() {
            if !bank_used[i] {
                unmatched_bank.push(rec.clone());
            }
        }
        for (i, rec) in bucket.ledger.iter().enumerate() {
            if !ledger_used[i] {
                unmatched_ledger.push(rec.clone());
            }
        }
    }

    unmatched_bank.extend(parts.skipped_bank);
    unmatched_ledger.extend(parts.skipped_ledger);

    let summary = compute_summary(
        bank.len(),
        ledger.len(),
        &matched,
        unmatched_bank.len(),
        unmatched_ledger.len(),
        warnings.len(),
    );

    Ok(ReconResult {
        meta: ReconMeta {
            config_name: config_name.to_string(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        matched,
        unmatched_bank,
        unmatched_ledger,
        warnings,
    })
}

fn validate_unique_ids<'a>(
    side: Side,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), ReconError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ReconError::DuplicateId {
                side,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

fn compute_summary(
    bank_records: usize,
    ledger_records: usize,
    matched: &[ReconciledEntry],
    unmatched_bank: usize,
    unmatched_ledger: usize,
    ambiguous: usize,
) -> ReconSummary {
    let mut matched_by_phase: BTreeMap<String, usize> = BTreeMap::new();
    for entry in matched {
        *matched_by_phase.entry(entry.phase.to_string()).or_insert(0) += 1;
    }
    ReconSummary {
        bank_records,
        ledger_records,
        matched: matched.len(),
        matched_by_phase,
        unmatched_bank,
        unmatched_ledger,
        ambiguous,
    }
}
