//! Shared helpers for lookup-family functions (MATCH, INDEX, XLOOKUP,
//! XMATCH): unified coercion, comparison and wildcard equality.

use exceval_common::CellValue;

/// Coerce a value to f64 with Excel-like rules for numeric comparisons:
/// Number as-is, numeric text parsed leniently, Boolean 1/0, Empty 0.
pub fn value_to_f64_lenient(v: &CellValue) -> Option<f64> {
    match v {
        CellValue::Number(n) => Some(*n),
        CellValue::Text(s) => s.trim().parse::<f64>().ok(),
        CellValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
        CellValue::Empty => Some(0.0),
        CellValue::Error(_) => None,
    }
}

/// Compare two values for ordering: lenient numeric first, falling back
/// to case-insensitive text. `None` when incomparable.
pub fn cmp_for_lookup(a: &CellValue, b: &CellValue) -> Option<i32> {
    if let (Some(x), Some(y)) = (value_to_f64_lenient(a), value_to_f64_lenient(b)) {
        if (x - y).abs() < 1e-12 {
            return Some(0);
        }
        return Some(if x < y { -1 } else { 1 });
    }
    match (a, b) {
        (CellValue::Text(x), CellValue::Text(y)) => {
            let xl = x.to_ascii_lowercase();
            let yl = y.to_ascii_lowercase();
            Some(match xl.cmp(&yl) {
                std::cmp::Ordering::Less => -1,
                std::cmp::Ordering::Equal => 0,
                std::cmp::Ordering::Greater => 1,
            })
        }
        _ => None,
    }
}

/// Exact equality, with optional `*`/`?` wildcards on the pattern side.
pub fn equals_maybe_wildcard(pattern: &CellValue, candidate: &CellValue, wildcard: bool) -> bool {
    if wildcard {
        if let (CellValue::Text(p), CellValue::Text(c)) = (pattern, candidate) {
            if p.contains('*') || p.contains('?') || p.contains('~') {
                return crate::args::wildcard_to_regex(p)
                    .map(|re| re.is_match(c))
                    .unwrap_or(false);
            }
        }
    }
    matches!(cmp_for_lookup(pattern, candidate), Some(0))
        || pattern.loose_eq(candidate)
}
