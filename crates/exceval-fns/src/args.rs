//! Argument utilities: the error-propagation combinator, positional
//! extraction helpers, and the criteria mini-language shared by
//! SUMIF/COUNTIF/AVERAGEIF.

use crate::coercion::{to_logical, to_number_lenient};
use exceval_common::{CellValue, ExcelError};
use regex::Regex;

/// The error-propagation combinator: the first Error in argument order,
/// if any. The universal pattern is validate arity → `first_error` →
/// coerce/execute.
pub fn first_error(args: &[CellValue]) -> Option<ExcelError> {
    args.iter().find_map(|v| match v {
        CellValue::Error(e) => Some(e.clone()),
        _ => None,
    })
}

/// Numeric argument at `idx` through the lenient coercion lattice.
pub fn num_arg(args: &[CellValue], idx: usize) -> Result<f64, ExcelError> {
    to_number_lenient(&args[idx])
}

/// Optional numeric argument: `default` when absent or Empty.
pub fn opt_num_arg(args: &[CellValue], idx: usize, default: f64) -> Result<f64, ExcelError> {
    match args.get(idx) {
        None | Some(CellValue::Empty) => Ok(default),
        Some(v) => to_number_lenient(v),
    }
}

/// Integral argument at `idx`; Excel truncates toward zero.
pub fn int_arg(args: &[CellValue], idx: usize) -> Result<i64, ExcelError> {
    Ok(num_arg(args, idx)?.trunc() as i64)
}

/// Optional integral argument: `default` when absent or Empty.
pub fn opt_int_arg(args: &[CellValue], idx: usize, default: i64) -> Result<i64, ExcelError> {
    Ok(opt_num_arg(args, idx, default as f64)?.trunc() as i64)
}

/// Text argument at `idx`; non-text values take their display rendition.
pub fn text_arg(args: &[CellValue], idx: usize) -> Result<String, ExcelError> {
    crate::coercion::to_text(&args[idx])
}

/// Logical argument at `idx`.
pub fn logical_arg(args: &[CellValue], idx: usize) -> Result<bool, ExcelError> {
    to_logical(&args[idx])
}

/// Optional logical argument: `default` when absent or Empty.
pub fn opt_logical_arg(
    args: &[CellValue],
    idx: usize,
    default: bool,
) -> Result<bool, ExcelError> {
    match args.get(idx) {
        None | Some(CellValue::Empty) => Ok(default),
        Some(v) => to_logical(v),
    }
}

/// Numeric scratch buffer sized so typical argument lists stay off the
/// heap.
pub type NumBuf = smallvec::SmallVec<[f64; 16]>;

/// Collect the numeric content of an argument slice the way SUM does:
/// Text/Boolean/Empty are skipped, the first Error propagates.
pub fn collect_numbers(args: &[CellValue]) -> Result<NumBuf, ExcelError> {
    let mut out = NumBuf::new();
    for v in args {
        match v {
            CellValue::Number(n) => out.push(*n),
            CellValue::Error(e) => return Err(e.clone()),
            _ => {}
        }
    }
    Ok(out)
}

/* ───────────────────────── Criteria mini-language ─────────────────────────
A numeric criterion is equality against a Number. A text criterion is
`op expr` with op ∈ {>=, <=, <>, =, >, <} defaulting to equality; plain
text equality is ASCII case-folded; * and ? wildcards are enabled only
for equality criteria.
------------------------------------------------------------------------- */

#[derive(Clone, Debug)]
pub enum CriteriaPredicate {
    Eq(CellValue),
    Ne(CellValue),
    Gt(f64),
    Ge(f64),
    Lt(f64),
    Le(f64),
    TextLike { pattern: String },
    IsBlank,
}

/// Translate a `*`/`?` wildcard pattern into regex source, unanchored.
/// `~` escapes the next wildcard character, per Excel.
fn wildcard_pattern(pattern: &str) -> String {
    let mut re = String::with_capacity(pattern.len() * 2);
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            '~' => match chars.next() {
                Some(esc @ ('*' | '?' | '~')) => re.push_str(&regex::escape(&esc.to_string())),
                Some(other) => {
                    re.push_str(&regex::escape(&'~'.to_string()));
                    re.push_str(&regex::escape(&other.to_string()));
                }
                None => re.push_str(&regex::escape("~")),
            },
            other => re.push_str(&regex::escape(&other.to_string())),
        }
    }
    re
}

fn build_wildcard(source: String) -> Result<Regex, ExcelError> {
    regex::RegexBuilder::new(&source)
        .case_insensitive(true)
        .build()
        .map_err(|_| ExcelError::new_value())
}

/// Compile a wildcard pattern to an anchored case-insensitive regex,
/// matching whole values (criteria, MATCH, XLOOKUP).
pub fn wildcard_to_regex(pattern: &str) -> Result<Regex, ExcelError> {
    build_wildcard(format!("^{}$", wildcard_pattern(pattern)))
}

/// Compile a wildcard pattern to an unanchored case-insensitive regex,
/// matching anywhere in the value (SEARCH).
pub fn wildcard_to_regex_unanchored(pattern: &str) -> Result<Regex, ExcelError> {
    build_wildcard(wildcard_pattern(pattern))
}

pub fn parse_criteria(v: &CellValue) -> Result<CriteriaPredicate, ExcelError> {
    match v {
        CellValue::Text(s) => {
            let s_trim = s.trim();
            // Operators: >=, <=, <>, >, <, =
            let ops = [">=", "<=", "<>", ">", "<", "="];
            for op in ops.iter() {
                if let Some(rhs) = s_trim.strip_prefix(op) {
                    // Numeric comparison when the right side parses
                    if let Some(n) = crate::coercion::parse_number_strict(rhs) {
                        return Ok(match *op {
                            ">=" => CriteriaPredicate::Ge(n),
                            "<=" => CriteriaPredicate::Le(n),
                            ">" => CriteriaPredicate::Gt(n),
                            "<" => CriteriaPredicate::Lt(n),
                            "=" => CriteriaPredicate::Eq(CellValue::Number(n)),
                            "<>" => CriteriaPredicate::Ne(CellValue::Number(n)),
                            _ => unreachable!(),
                        });
                    }
                    let lit = CellValue::Text(rhs.to_string());
                    return Ok(match *op {
                        "=" => {
                            if rhs.contains('*') || rhs.contains('?') {
                                CriteriaPredicate::TextLike {
                                    pattern: rhs.to_string(),
                                }
                            } else {
                                CriteriaPredicate::Eq(lit)
                            }
                        }
                        "<>" => CriteriaPredicate::Ne(lit),
                        // Non-numeric ordered compare: degrade to equality
                        // on the full expression, matching the source
                        // engine's behavior.
                        _ => CriteriaPredicate::Eq(CellValue::Text(s_trim.to_string())),
                    });
                }
            }
            // Wildcards * or ? => TextLike
            if s_trim.contains('*') || s_trim.contains('?') {
                return Ok(CriteriaPredicate::TextLike {
                    pattern: s_trim.to_string(),
                });
            }
            // Booleans TRUE/FALSE
            let lower = s_trim.to_ascii_lowercase();
            if lower == "true" {
                return Ok(CriteriaPredicate::Eq(CellValue::Boolean(true)));
            } else if lower == "false" {
                return Ok(CriteriaPredicate::Eq(CellValue::Boolean(false)));
            }
            // Numeric text means numeric equality: COUNTIF(range, "20")
            // matches the number 20.
            if let Some(n) = crate::coercion::parse_number_strict(s_trim) {
                return Ok(CriteriaPredicate::Eq(CellValue::Number(n)));
            }
            // Plain text equality
            Ok(CriteriaPredicate::Eq(CellValue::Text(s_trim.to_string())))
        }
        CellValue::Empty => Ok(CriteriaPredicate::IsBlank),
        CellValue::Number(n) => Ok(CriteriaPredicate::Eq(CellValue::Number(*n))),
        CellValue::Boolean(b) => Ok(CriteriaPredicate::Eq(CellValue::Boolean(*b))),
        CellValue::Error(e) => Err(e.clone()),
    }
}

/// Apply a parsed criterion to a candidate value.
pub fn criteria_match(pred: &CriteriaPredicate, v: &CellValue) -> bool {
    match pred {
        CriteriaPredicate::Eq(target) => match (target, v) {
            // A numeric criterion is equality against a Number; numeric
            // text in the data does not match.
            (CellValue::Number(a), CellValue::Number(b)) => a == b,
            (a, b) => a.loose_eq(b),
        },
        CriteriaPredicate::Ne(target) => !criteria_match(&CriteriaPredicate::Eq(target.clone()), v),
        CriteriaPredicate::Gt(n) => matches!(v, CellValue::Number(x) if x > n),
        CriteriaPredicate::Ge(n) => matches!(v, CellValue::Number(x) if x >= n),
        CriteriaPredicate::Lt(n) => matches!(v, CellValue::Number(x) if x < n),
        CriteriaPredicate::Le(n) => matches!(v, CellValue::Number(x) if x <= n),
        CriteriaPredicate::TextLike { pattern } => match v {
            CellValue::Text(s) => wildcard_to_regex(pattern)
                .map(|re| re.is_match(s))
                .unwrap_or(false),
            _ => false,
        },
        CriteriaPredicate::IsBlank => v.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(criteria: CellValue, v: CellValue) -> bool {
        criteria_match(&parse_criteria(&criteria).unwrap(), &v)
    }

    #[test]
    fn numeric_criteria() {
        assert!(matches(CellValue::Number(5.0), CellValue::Number(5.0)));
        assert!(!matches(CellValue::Number(5.0), CellValue::Number(6.0)));
        assert!(matches(CellValue::text(">=5"), CellValue::Number(5.0)));
        assert!(matches(CellValue::text("<5"), CellValue::Number(4.0)));
        assert!(!matches(CellValue::text("<>5"), CellValue::Number(5.0)));
        assert!(matches(CellValue::text("<>5"), CellValue::Number(6.0)));
    }

    #[test]
    fn text_criteria_fold_case() {
        assert!(matches(CellValue::text("apple"), CellValue::text("APPLE")));
        assert!(!matches(CellValue::text("apple"), CellValue::text("pear")));
    }

    #[test]
    fn wildcard_criteria() {
        assert!(matches(CellValue::text("a*e"), CellValue::text("Apple")));
        assert!(matches(CellValue::text("b?t"), CellValue::text("bat")));
        assert!(!matches(CellValue::text("b?t"), CellValue::text("boat")));
        // Tilde escapes a literal star
        assert!(matches(CellValue::text("2~*3"), CellValue::text("2*3")));
        assert!(!matches(CellValue::text("2~*3"), CellValue::text("2x3")));
    }

    #[test]
    fn error_criteria_propagate() {
        assert!(parse_criteria(&CellValue::Error(ExcelError::new_div())).is_err());
    }

    #[test]
    fn first_error_returns_leading() {
        let args = vec![
            CellValue::Number(1.0),
            CellValue::Error(ExcelError::new_div()),
            CellValue::Error(ExcelError::new_na()),
        ];
        assert_eq!(first_error(&args), Some(ExcelError::new_div()));
        assert_eq!(first_error(&[CellValue::Number(1.0)]), None);
    }
}
