use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::model::{BankRecord, LedgerRecord};

/// Matching scope: all records sharing one account and one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct BucketKey {
    pub account: String,
    pub date: NaiveDate,
}

#[derive(Debug, Default)]
pub struct Bucket {
    pub bank: Vec<BankRecord>,
    pub ledger: Vec<LedgerRecord>,
}

/// Bucketed view of one run's inputs. `skipped_*` hold records whose
/// account was empty or whose date/amount failed normalization: they never
/// enter a bucket and go straight to the unmatched lists.
#[derive(Debug, Default)]
pub struct Partition {
    pub buckets: BTreeMap<BucketKey, Bucket>,
    pub skipped_bank: Vec<BankRecord>,
    pub skipped_ledger: Vec<LedgerRecord>,
}

/// Partition both inputs by (account, date). Bucket iteration follows the
/// BTreeMap key order (account, then date); bucket contents are sorted by
/// record id so the run is a function of the input multiset, not of input
/// ordering.
pub fn partition(bank: &[BankRecord], ledger: &[LedgerRecord]) -> Partition {
    let mut out = Partition::default();

    for rec in bank {
        match bucket_key(&rec.account, rec.date, rec.amount_cents) {
            Some(key) => out.buckets.entry(key).or_default().bank.push(rec.clone()),
            None => out.skipped_bank.push(rec.clone()),
        }
    }
    for rec in ledger {
        match bucket_key(&rec.account, rec.date, rec.amount_cents) {
            Some(key) => out.buckets.entry(key).or_default().ledger.push(rec.clone()),
            None => out.skipped_ledger.push(rec.clone()),
        }
    }

    for bucket in out.buckets.values_mut() {
        bucket.bank.sort_by(|a, b| a.id.cmp(&b.id));
        bucket.ledger.sort_by(|a, b| a.id.cmp(&b.id));
    }
    out
}

fn bucket_key(account: &str, date: Option<NaiveDate>, amount: Option<i64>) -> Option<BucketKey> {
    if account.is_empty() || amount.is_none() {
        return None;
    }
    Some(BucketKey {
        account: account.to_string(),
        date: date?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank(id: &str, account: &str, date: Option<NaiveDate>, cents: Option<i64>) -> BankRecord {
        BankRecord {
            id: id.into(),
            account: account.into(),
            date,
            amount_cents: cents,
            description: String::new(),
        }
    }

    fn ledger(id: &str, account: &str, date: Option<NaiveDate>, cents: Option<i64>) -> LedgerRecord {
        LedgerRecord {
            id: id.into(),
            account: account.into(),
            date,
            amount_cents: cents,
            item: "001".into(),
            document: String::new(),
            rp: String::new(),
            description: String::new(),
            code: String::new(),
        }
    }

    fn day(d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2023, 10, d)
    }

    #[test]
    fn groups_by_account_and_date() {
        let bank = vec![
            bank("b1", "111", day(27), Some(100)),
            bank("b2", "111", day(28), Some(200)),
            bank("b3", "222", day(27), Some(300)),
        ];
        let ledger = vec![ledger("s1", "111", day(27), Some(100))];
        let part = partition(&bank, &ledger);
        assert_eq!(part.buckets.len(), 3);
        let key = BucketKey { account: "111".into(), date: day(27).unwrap() };
        let bucket = &part.buckets[&key];
        assert_eq!(bucket.bank.len(), 1);
        assert_eq!(bucket.ledger.len(), 1);
    }

    #[test]
    fn iteration_order_is_account_then_date() {
        let bank = vec![
            bank("b1", "222", day(27), Some(1)),
            bank("b2", "111", day(28), Some(1)),
            bank("b3", "111", day(27), Some(1)),
        ];
        let part = partition(&bank, &[]);
        let keys: Vec<_> = part
            .buckets
            .keys()
            .map(|k| (k.account.clone(), k.date))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("111".to_string(), day(27).unwrap()),
                ("111".to_string(), day(28).unwrap()),
                ("222".to_string(), day(27).unwrap()),
            ]
        );
    }

    #[test]
    fn unnormalized_records_are_skipped() {
        let bank = vec![
            bank("b1", "", day(27), Some(100)),
            bank("b2", "111", None, Some(100)),
            bank("b3", "111", day(27), None),
            bank("b4", "111", day(27), Some(100)),
        ];
        let ledger = vec![ledger("s1", "111", None, None)];
        let part = partition(&bank, &ledger);
        assert_eq!(part.buckets.len(), 1);
        assert_eq!(part.skipped_bank.len(), 3);
        assert_eq!(part.skipped_ledger.len(), 1);
    }

    #[test]
    fn bucket_contents_sorted_by_id() {
        let bank = vec![
            bank("b2", "111", day(27), Some(2)),
            bank("b1", "111", day(27), Some(1)),
        ];
        let part = partition(&bank, &[]);
        let bucket = part.buckets.values().next().unwrap();
        assert_eq!(bucket.bank[0].id, "b1");
        assert_eq!(bucket.bank[1].id, "b2");
    }
}
