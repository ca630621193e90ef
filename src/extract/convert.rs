use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static NON_NUMERIC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\d.]+").unwrap());
static FEET_INCHES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)\D+(\d+)").unwrap());

/// A scraped cell value. `Missing` is the pipeline's explicit sentinel for
/// "not on the page" — it is never an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    Missing,
}

impl Value {
    pub fn text(s: impl Into<String>) -> Value {
        Value::Text(s.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

impl fmt::Display for Value {
    /// CSV cell rendering; `Missing` serializes as an empty cell.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => f.write_str(s),
            Value::Missing => Ok(()),
        }
    }
}

/// Convert a raw site string into a numeric value.
///
/// Strips everything but digits and `.`, then parses as integer when the
/// remainder is all digits, as float when it contains exactly one `.`, and
/// as `Missing` otherwise. The integer check runs first so an
/// integer-looking string is never widened to float.
pub fn parse_numeric(raw: &str) -> Value {
    let stripped = NON_NUMERIC_RE.replace_all(raw, "");
    if stripped.is_empty() {
        return Value::Missing;
    }
    if stripped.bytes().all(|b| b.is_ascii_digit()) {
        return stripped
            .parse::<i64>()
            .map(Value::Int)
            .unwrap_or(Value::Missing);
    }
    if stripped.matches('.').count() == 1 {
        return stripped
            .parse::<f64>()
            .map(Value::Float)
            .unwrap_or(Value::Missing);
    }
    Value::Missing
}

/// Parse a feet/inches height string (e.g. `6'2"`) into centimeters,
/// rounded to one decimal. Anything that does not decompose into exactly
/// two leading numeric tokens is `Missing`.
pub fn height_to_cm(raw: &str) -> Value {
    let Some(caps) = FEET_INCHES_RE.captures(raw.trim()) else {
        return Value::Missing;
    };
    let (Ok(feet), Ok(inches)) = (caps[1].parse::<f64>(), caps[2].parse::<f64>()) else {
        return Value::Missing;
    };
    let cm = ((feet * 12.0) + inches) * 2.54;
    Value::Float((cm * 10.0).round() / 10.0)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_stays_integer() {
        assert_eq!(parse_numeric("12"), Value::Int(12));
    }

    #[test]
    fn decimal_parses_as_float() {
        assert_eq!(parse_numeric("12.5"), Value::Float(12.5));
    }

    #[test]
    fn garbage_is_missing() {
        assert_eq!(parse_numeric("abc"), Value::Missing);
        assert_eq!(parse_numeric(""), Value::Missing);
        assert_eq!(parse_numeric("-"), Value::Missing);
    }

    #[test]
    fn currency_strips_to_integer() {
        assert_eq!(parse_numeric("$1,234"), Value::Int(1234));
    }

    #[test]
    fn two_dots_is_missing() {
        assert_eq!(parse_numeric("1.2.3"), Value::Missing);
    }

    #[test]
    fn rank_suffix_strips() {
        assert_eq!(parse_numeric("4.56s (78th)"), Value::Float(4.5678));
        assert_eq!(parse_numeric("118.3"), Value::Float(118.3));
    }

    #[test]
    fn height_six_one() {
        // ((6*12)+1)*2.54 = 185.42
        assert_eq!(height_to_cm("6'1\""), Value::Float(185.4));
    }

    #[test]
    fn height_double_digit_inches() {
        // ((5*12)+10)*2.54 = 177.8
        assert_eq!(height_to_cm("5'10\""), Value::Float(177.8));
    }

    #[test]
    fn height_malformed_is_missing() {
        assert_eq!(height_to_cm("6'"), Value::Missing);
        assert_eq!(height_to_cm("tall"), Value::Missing);
        assert_eq!(height_to_cm("-"), Value::Missing);
    }
}
