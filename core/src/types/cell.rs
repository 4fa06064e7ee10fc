use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Text written for values that are not available
pub const NOT_AVAILABLE: &str = "N/A";

/// Why a raw value could not be used as a number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Empty or whitespace-only cell
    Empty,
    /// Complex literal such as `(1+2j)`
    Complex,
    /// Text that is not a number
    NotNumeric,
    /// NaN or infinity
    NonFinite,
}

/// Parses a raw table cell into a finite real number
///
/// # Errors
///
/// Returns the reason the value is unusable
pub fn classify(raw: &str) -> Result<f64, Rejection> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(Rejection::Empty);
    }
    if is_complex_literal(text) {
        return Err(Rejection::Complex);
    }
    let value: f64 = text.parse().map_err(|_| Rejection::NotNumeric)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Rejection::NonFinite)
    }
}

fn is_complex_literal(text: &str) -> bool {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    let re = REGEX.get_or_init(|| {
        Regex::new(r"^\(?\s*[-+]?[0-9.eE+-]*[0-9.][jJ]\s*\)?$").expect("Failed to compile regex")
    });
    re.is_match(text)
}

/// A normalized value of the consolidated cohort table
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue {
    /// Finite real value
    Number(f64),
    /// Missing, non-numeric, non-finite or complex value
    NotAvailable,
}

impl CellValue {
    /// Normalizes a raw cell
    ///
    /// Every rejection maps to `NotAvailable`; the reason is returned
    /// alongside for logging.
    pub fn normalize(raw: &str) -> (Self, Option<Rejection>) {
        match classify(raw) {
            Ok(value) => (CellValue::Number(value), None),
            Err(reason) => (CellValue::NotAvailable, Some(reason)),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(v) => write!(f, "{:?}", v),
            CellValue::NotAvailable => f.write_str(NOT_AVAILABLE),
        }
    }
}
