use crate::config::{BankColumns, LedgerColumns};
use crate::error::ReconError;
use crate::model::{BankRecord, LedgerRecord, Side};
use crate::normalize::{clean_text, parse_amount_cents, parse_date, Sign};

/// Load column-mapped bank statement rows.
///
/// A missing mapped column fails the load; an unparsable date or amount in
/// an individual row does not — the record is kept with the field unset and
/// the engine reports it as unmatched.
pub fn load_bank_csv(data: &str, columns: &BankColumns) -> Result<Vec<BankRecord>, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(data.as_bytes());
    let headers = read_headers(&mut reader)?;
    let idx = HeaderIndex::new(Side::Bank, &headers);

    let id_idx = idx.optional(columns.id.as_deref());
    let account_idx = idx.required(&columns.account)?;
    let date_idx = idx.required(&columns.date)?;
    let amount_idx = match &columns.amount {
        Some(col) => Some(idx.required(col)?),
        None => None,
    };
    let credit_idx = match &columns.credit {
        Some(col) => Some(idx.required(col)?),
        None => None,
    };
    let debit_idx = match &columns.debit {
        Some(col) => Some(idx.required(col)?),
        None => None,
    };
    let desc_idx = idx.optional(columns.description.as_deref());

    let mut out = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| ReconError::Io(e.to_string()))?;
        let cell = |i: Option<usize>| i.and_then(|i| record.get(i)).unwrap_or("");

        // A populated credit/debit column decides the sign regardless of
        // how the raw value is signed.
        let credit = cell(credit_idx);
        let debit = cell(debit_idx);
        let amount_cents = if !credit.trim().is_empty() {
            parse_amount_cents(credit, Some(Sign::Positive))
        } else if !debit.trim().is_empty() {
            parse_amount_cents(debit, Some(Sign::Negative))
        } else {
            parse_amount_cents(cell(amount_idx), None)
        };

        out.push(BankRecord {
            id: record_id(cell(id_idx), Side::Bank, row),
            account: clean_text(cell(Some(account_idx))),
            date: parse_date(cell(Some(date_idx))),
            amount_cents,
            description: clean_text(cell(desc_idx)),
        });
    }
    Ok(out)
}

/// Load column-mapped ledger rows. Same degradation contract as
/// `load_bank_csv`.
pub fn load_ledger_csv(
    data: &str,
    columns: &LedgerColumns,
) -> Result<Vec<LedgerRecord>, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(data.as_bytes());
    let headers = read_headers(&mut reader)?;
    let idx = HeaderIndex::new(Side::Ledger, &headers);

    let id_idx = idx.optional(columns.id.as_deref());
    let account_idx = idx.required(&columns.account)?;
    let date_idx = idx.required(&columns.date)?;
    let amount_idx = idx.required(&columns.amount)?;
    let item_idx = idx.required(&columns.item)?;
    let document_idx = idx.optional(columns.document.as_deref());
    let rp_idx = idx.optional(columns.rp.as_deref());
    let desc_idx = idx.optional(columns.description.as_deref());
    let code_idx = idx.optional(columns.code.as_deref());

    let mut out = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| ReconError::Io(e.to_string()))?;
        let cell = |i: Option<usize>| i.and_then(|i| record.get(i)).unwrap_or("");

        out.push(LedgerRecord {
            id: record_id(cell(id_idx), Side::Ledger, row),
            account: clean_text(cell(Some(account_idx))),
            date: parse_date(cell(Some(date_idx))),
            amount_cents: parse_amount_cents(cell(Some(amount_idx)), None),
            item: clean_text(cell(Some(item_idx))),
            document: clean_text(cell(document_idx)),
            rp: clean_text(cell(rp_idx)),
            description: clean_text(cell(desc_idx)),
            code: clean_text(cell(code_idx)),
        });
    }
    Ok(out)
}

fn read_headers(reader: &mut csv::Reader<&[u8]>) -> Result<Vec<String>, ReconError> {
    Ok(reader
        .headers()
        .map_err(|e| ReconError::Io(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect())
}

fn record_id(mapped: &str, side: Side, row: usize) -> String {
    let mapped = mapped.trim();
    if mapped.is_empty() {
        format!("{}_{}", side, row + 1)
    } else {
        mapped.to_string()
    }
}

struct HeaderIndex<'a> {
    side: Side,
    headers: &'a [String],
}

impl<'a> HeaderIndex<'a> {
    fn new(side: Side, headers: &'a [String]) -> Self {
        HeaderIndex { side, headers }
    }

    fn required(&self, name: &str) -> Result<usize, ReconError> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ReconError::MissingColumn {
                side: self.side,
                column: name.to_string(),
            })
    }

    fn optional(&self, name: Option<&str>) -> Option<usize> {
        name.and_then(|n| self.headers.iter().position(|h| h == n))
    }
}
