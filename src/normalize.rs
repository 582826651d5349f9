//! Normalization of free-form user input into canonical pairs, dates and
//! amounts. Everything here is pure: no I/O, deterministic given the
//! reference date.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;

use crate::error::NormalizeError;

/// Pairs the engine will quote. Direction matters: the reverse of a listed
/// pair is valid only if listed itself.
pub const SUPPORTED_PAIRS: &[(&str, &str)] = &[
    ("EUR", "USD"),
    ("EUR", "GBP"),
    ("EUR", "CHF"),
    ("USD", "EUR"),
    ("USD", "GBP"),
    ("USD", "CHF"),
    ("EUR", "SGD"),
    ("USD", "SGD"),
    ("UAH", "EUR"),
    ("UAH", "GBP"),
    ("UAH", "USD"),
    ("UAH", "CHF"),
    ("UAH", "PLN"),
    ("USD", "UAH"),
    ("EUR", "UAH"),
    ("GBP", "UAH"),
    ("CHF", "UAH"),
    ("PLN", "UAH"),
];

// Common typos and nicknames, applied after uppercasing and before the
// allowlist check.
const ALIASES: &[(&str, &str)] = &[
    ("GPB", "GBP"),
    ("UDS", "USD"),
    ("ERU", "EUR"),
    ("DOLLAR", "USD"),
    ("EURO", "EUR"),
    ("POUND", "GBP"),
    ("HRYVNIA", "UAH"),
    ("ГРИВНЯ", "UAH"),
    ("ГРИВНА", "UAH"),
    ("ЗЛОТИЙ", "PLN"),
];

/// How far back a requested date may lie.
pub const MAX_HISTORY_DAYS: i64 = 3650;

/// A 3-letter ISO code known to appear in at least one supported pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CurrencyCode(&'static str);

impl CurrencyCode {
    pub const UAH: CurrencyCode = CurrencyCode("UAH");

    pub fn as_str(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Ordered (base, target) tuple matching one supported pair exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CurrencyPair {
    pub base: CurrencyCode,
    pub target: CurrencyCode,
}

impl CurrencyPair {
    pub fn involves(self, code: CurrencyCode) -> bool {
        self.base == code || self.target == code
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.target)
    }
}

/// Maps a raw token to a canonical code, via the alias table, interned
/// against the codes the pair table actually uses.
fn resolve_code(token: &str) -> Option<&'static str> {
    let upper = token.to_uppercase();
    let canonical = ALIASES
        .iter()
        .find(|(alias, _)| *alias == upper)
        .map(|(_, code)| *code)
        .unwrap_or(upper.as_str());
    SUPPORTED_PAIRS
        .iter()
        .flat_map(|(base, target)| [*base, *target])
        .find(|code| *code == canonical)
}

/// Splits `raw` into exactly two tokens, corrects typos/aliases, and
/// validates the result against the supported-pairs allowlist.
pub fn normalize_pair(raw: &str) -> Result<CurrencyPair, NormalizeError> {
    let tokens: Vec<&str> = raw
        .split(|c: char| c == '/' || c == '-' || c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();
    let &[base_raw, target_raw] = tokens.as_slice() else {
        return Err(NormalizeError::MalformedPair(raw.trim().to_string()));
    };

    let (Some(base), Some(target)) = (resolve_code(base_raw), resolve_code(target_raw)) else {
        return Err(NormalizeError::UnsupportedPair(format!(
            "{}/{}",
            base_raw.to_uppercase(),
            target_raw.to_uppercase()
        )));
    };
    if !SUPPORTED_PAIRS.contains(&(base, target)) {
        return Err(NormalizeError::UnsupportedPair(format!("{base}/{target}")));
    }
    Ok(CurrencyPair {
        base: CurrencyCode(base),
        target: CurrencyCode(target),
    })
}

fn parse_relative(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    match text {
        "today" | "сьогодні" | "сегодня" => return Some(today),
        "yesterday" | "вчора" | "вчера" => return today.pred_opt(),
        "tomorrow" | "завтра" => return today.succ_opt(),
        _ => {}
    }

    // "N days ago" and the Ukrainian/Russian equivalents.
    const UNITS: &[&str] = &["day", "days", "день", "дня", "дні", "днів", "дней"];
    const TAILS: &[&str] = &["ago", "тому", "назад"];
    let words: Vec<&str> = text.split_whitespace().collect();
    let &[count, unit, tail] = words.as_slice() else {
        return None;
    };
    let count: u64 = count.parse().ok()?;
    if UNITS.contains(&unit) && TAILS.contains(&tail) {
        today.checked_sub_days(Days::new(count))
    } else {
        None
    }
}

// Priority-ordered candidate formats; the first structurally valid parse
// wins. Day-first comes before month-first, so month-first only applies
// when the day-first reading is impossible (e.g. 01/13/2020).
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%d-%m-%Y", "%d/%m/%Y", "%m/%d/%Y"];

fn parse_absolute(text: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}

/// Parses absolute formats and relative phrases against `today`, then
/// enforces the not-future / not-ancient bounds.
pub fn normalize_date(raw: &str, today: NaiveDate) -> Result<NaiveDate, NormalizeError> {
    let text = raw.trim().to_lowercase();
    let date = parse_relative(&text, today)
        .or_else(|| parse_absolute(&text))
        .ok_or_else(|| NormalizeError::UnparseableDate(raw.trim().to_string()))?;

    if date > today {
        return Err(NormalizeError::FutureDate(date));
    }
    if today.signed_duration_since(date).num_days() > MAX_HISTORY_DAYS {
        return Err(NormalizeError::DateTooOld(date));
    }
    Ok(date)
}

/// Parses a locale-ambiguous amount into a fixed-point decimal.
///
/// Apostrophes (Swiss grouping) are stripped unconditionally. The last
/// `.` or `,` followed by exactly 1-2 trailing digits is the decimal
/// separator; every other `.`, `,` or space groups thousands. A lone
/// separator with more than 2 digits after it groups thousands too, so
/// `1.234` is 1234 while `1.23` is one-and-a-bit.
pub fn normalize_amount(raw: &str) -> Result<Decimal, NormalizeError> {
    let text = raw.trim();
    if text.starts_with('-') {
        return Err(NormalizeError::NegativeAmount(text.to_string()));
    }
    let stripped: String = text.chars().filter(|c| !matches!(c, '\'' | '_')).collect();

    let decimal_pos = stripped.rfind(['.', ',']).filter(|&pos| {
        let frac = &stripped[pos + 1..];
        (1..=2).contains(&frac.len()) && frac.bytes().all(|b| b.is_ascii_digit())
    });

    let mut canonical = String::with_capacity(stripped.len());
    for (pos, ch) in stripped.char_indices() {
        match ch {
            '0'..='9' => canonical.push(ch),
            '.' | ',' if Some(pos) == decimal_pos => canonical.push('.'),
            '.' | ',' | ' ' | '\u{a0}' => {}
            _ => return Err(NormalizeError::UnparseableAmount(text.to_string())),
        }
    }
    if !canonical.bytes().any(|b| b.is_ascii_digit()) {
        return Err(NormalizeError::UnparseableAmount(text.to_string()));
    }
    if canonical.starts_with('.') {
        canonical.insert(0, '0');
    }
    Decimal::from_str(&canonical).map_err(|_| NormalizeError::UnparseableAmount(text.to_string()))
}
