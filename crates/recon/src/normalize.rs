use chrono::{Duration, NaiveDate};

/// Caller-supplied sign override, used when a statement's credit/debit
/// marker must win over whatever sign the raw value carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Positive,
    Negative,
}

// ---------------------------------------------------------------------------
// Amounts
// ---------------------------------------------------------------------------

/// Parse a monetary amount into exact cents.
///
/// Accepted shapes:
/// - `1.234,56` / `1234,56` — comma decimal separator, dots are thousands
///   separators and are stripped;
/// - `1234.56` — no comma: a final dot followed by 1–2 digits is the
///   decimal separator, any other dots are thousands separators.
///
/// Values with more than 2 fractional digits are quantized half-to-even.
/// Returns `None` on anything unparsable; the caller degrades the record
/// to the unmatched list instead of aborting the run.
pub fn parse_amount_cents(raw: &str, sign: Option<Sign>) -> Option<i64> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    let (negative, text) = match text.as_bytes()[0] {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };

    let (int_part, frac_part) = split_decimal(text)?;
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit())
        || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    let whole: i64 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().ok()?
    };
    let frac = quantize_fraction(&frac_part)?;

    let mut cents = whole.checked_mul(100)?.checked_add(frac)?;
    if negative {
        cents = -cents;
    }
    Some(match sign {
        Some(Sign::Positive) => cents.abs(),
        Some(Sign::Negative) => -cents.abs(),
        None => cents,
    })
}

/// Split into integer and fraction digit runs, stripping thousands
/// separators per the rules on `parse_amount_cents`.
fn split_decimal(text: &str) -> Option<(String, String)> {
    if let Some(comma) = text.rfind(',') {
        // An earlier comma survives into int_part and fails the digit check.
        let int_part: String = text[..comma].chars().filter(|c| *c != '.').collect();
        return Some((int_part, text[comma + 1..].to_string()));
    }
    if let Some(dot) = text.rfind('.') {
        let tail = &text[dot + 1..];
        if (1..=2).contains(&tail.len()) {
            let int_part: String = text[..dot].chars().filter(|c| *c != '.').collect();
            return Some((int_part, tail.to_string()));
        }
        // No decimal part; all dots are thousands separators.
        return Some((text.chars().filter(|c| *c != '.').collect(), String::new()));
    }
    Some((text.to_string(), String::new()))
}

/// Quantize a fraction digit run to 2 digits, half-to-even on the cut.
fn quantize_fraction(frac: &str) -> Option<i64> {
    let base: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().ok()? * 10,
        _ => frac[..2].parse().ok()?,
    };
    if frac.len() <= 2 {
        return Some(base);
    }
    let rest = &frac[2..];
    let first = rest.as_bytes()[0] - b'0';
    let round_up = match first {
        0..=4 => false,
        6..=9 => true,
        _ => {
            // Exactly half: even base stays, odd base rounds up.
            if rest[1..].bytes().any(|b| b != b'0') {
                true
            } else {
                base % 2 != 0
            }
        }
    };
    Some(if round_up { base + 1 } else { base })
}

/// Render cents as canonical 2-decimal text (`-1234.05` style).
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

/// Parse `DD/MM/YYYY`, `YYYY-MM-DD`, or an integer spreadsheet serial
/// (days since 1899-12-30). `None` on failure — malformed upstream data
/// becomes an explicit discrepancy, never a crash.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }
    for fmt in ["%d/%m/%Y", "%Y-%m-%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return Some(date);
        }
    }
    if let Ok(serial) = text.parse::<i64>() {
        if (1..=120_000).contains(&serial) {
            let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
            return base.checked_add_signed(Duration::days(serial));
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

/// Canonical text: diacritics folded to ASCII, whitespace collapsed,
/// uppercased. Empty string for missing input.
pub fn clean_text(raw: &str) -> String {
    let folded: String = raw.chars().map(fold_diacritic).collect();
    folded
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Fold Latin-1 / Latin Extended-A letters onto their base ASCII letter.
/// Covers the accents that occur in the statement and ledger exports.
fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' => 'a',
        'Á' | 'À' | 'Â' | 'Ã' | 'Ä' | 'Å' | 'Ā' | 'Ă' => 'A',
        'ç' | 'ć' | 'č' => 'c',
        'Ç' | 'Ć' | 'Č' => 'C',
        'é' | 'è' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ę' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' | 'Ē' | 'Ĕ' | 'Ę' => 'E',
        'í' | 'ì' | 'î' | 'ï' | 'ī' => 'i',
        'Í' | 'Ì' | 'Î' | 'Ï' | 'Ī' => 'I',
        'ñ' | 'ń' => 'n',
        'Ñ' | 'Ń' => 'N',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' | 'ō' => 'o',
        'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' | 'Ō' => 'O',
        'ú' | 'ù' | 'û' | 'ü' | 'ū' => 'u',
        'Ú' | 'Ù' | 'Û' | 'Ü' | 'Ū' => 'U',
        'ý' | 'ÿ' => 'y',
        'Ý' => 'Y',
        other => other,
    }
}
