//! Field parsers for raw listing text
//!
//! Pure conversions with no I/O. Reputation scores arrive in several shapes:
//! plain (`"42"`), comma-grouped (`"9,365"`) or abbreviated with a thousands
//! suffix (`"9.7k"`, `"100k"`).

use thiserror::Error;

/// Suffix meaning "thousand" on abbreviated scores
const THOUSANDS_SUFFIX: char = 'k';

/// Thousands separator stripped before parsing
const GROUP_SEPARATOR: char = ',';

/// Why a field could not be converted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("field text is empty")]
    Empty,

    #[error("not a number: '{0}'")]
    InvalidNumber(String),
}

/// Parses a reputation score
///
/// Commas are removed first. A trailing `k` multiplies the remaining decimal
/// by 1000 and truncates, so `"9.7k"` is 9700 and `"1.2345k"` is 1234. The
/// arithmetic is done on the decimal digits directly rather than through a
/// float.
///
/// ```
/// use rep_roster::record::parse_reputation;
///
/// assert_eq!(parse_reputation("9,365"), Ok(9365));
/// assert_eq!(parse_reputation("9.7k"), Ok(9700));
/// ```
pub fn parse_reputation(text: &str) -> Result<u64, FieldError> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| *c != GROUP_SEPARATOR)
        .collect();

    if cleaned.is_empty() {
        return Err(FieldError::Empty);
    }

    match cleaned.strip_suffix(THOUSANDS_SUFFIX) {
        Some(mantissa) => parse_thousands(mantissa),
        None => cleaned
            .parse::<u64>()
            .map_err(|_| FieldError::InvalidNumber(cleaned.clone())),
    }
}

/// Parses `"<int>[.<frac>]"` and scales it by 1000, truncating extra digits
fn parse_thousands(mantissa: &str) -> Result<u64, FieldError> {
    let invalid = || FieldError::InvalidNumber(format!("{}{}", mantissa, THOUSANDS_SUFFIX));

    let (whole, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let whole_value = if whole.is_empty() {
        0
    } else {
        whole.parse::<u64>().map_err(|_| invalid())?
    };

    // Three fractional digits cover the thousands place; pad or truncate to fit
    let frac_value = frac
        .chars()
        .chain(std::iter::repeat('0'))
        .take(3)
        .fold(0u64, |acc, c| acc * 10 + u64::from(c as u8 - b'0'));

    whole_value
        .checked_mul(1000)
        .and_then(|v| v.checked_add(frac_value))
        .ok_or_else(invalid)
}

/// Parses the text of a pagination item as a page number
///
/// Returns `None` for ellipses, "Next" labels and anything else non-numeric.
pub fn parse_page_number(text: &str) -> Option<u64> {
    text.trim().parse::<u64>().ok()
}
