use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

static LEADING_INT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?[0-9]+").expect("leading integer pattern should compile"));

/// Coerce a loosely formatted number into an integer, defaulting to `0`.
///
/// 1) drop all whitespace
/// 2) drop the *first* comma only, so `"1,234,567"` still stops at `1234`
/// 3) read the longest leading `[+-]digits` run; anything after it is ignored
///
/// Absent, empty and non-numeric input all give `0`, which also hides bad
/// data: look at the raw value if that matters. Out-of-range values saturate.
pub fn clean_number(value: Option<&str>) -> i64 {
    let Some(value) = value else {
        return 0;
    };
    let compact: String = value.chars().filter(|c| !is_blank(*c)).collect();
    let compact = compact.replacen(',', "", 1);

    LEADING_INT
        .find(&compact)
        .map(|m| parse_saturating(m.as_str()))
        .unwrap_or(0)
}

/// Stricter variant for counts such as capacities: every whitespace
/// character and every comma is removed, the rest is read as a decimal and
/// truncated toward zero. Unparseable input logs a warning and gives `0`.
pub fn parse_count(value: Option<&str>) -> i64 {
    let Some(value) = value else {
        return 0;
    };
    let compact: String = value
        .chars()
        .filter(|c| !is_blank(*c) && *c != ',')
        .collect();

    match compact.parse::<f64>() {
        // `as` saturates at the i64 bounds
        Ok(n) if n.is_finite() => n.trunc() as i64,
        _ => {
            warn!(value, "not a count, using 0");
            0
        }
    }
}

/// Trim and title-case a label: the first letter after any non-letter is
/// uppercased, every other letter lowercased. Absent input gives `""`.
pub fn normalize_name(value: Option<&str>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    let value = value.trim();
    let mut out = String::with_capacity(value.len());
    let mut word_start = true;

    for c in value.chars() {
        if c.is_alphabetic() {
            if word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            word_start = false;
        } else {
            out.push(c);
            word_start = true;
        }
    }
    out
}

/// Unicode whitespace plus the zero-width no-break space (BOM), which
/// spreadsheet exports leave in front of values.
fn is_blank(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

fn parse_saturating(digits: &str) -> i64 {
    digits.parse().unwrap_or(if digits.starts_with('-') {
        i64::MIN
    } else {
        i64::MAX
    })
}
