//! The coercion lattice most numeric functions run through, plus the
//! text/logical coercions and the NaN/Inf egress guard.

use exceval_common::{CellValue, ExcelError};

/// Coerce a `CellValue` to `f64` using Excel semantics, in order:
/// Error propagates, Number passes through, Boolean maps to 1.0/0.0,
/// Text takes a strict decimal parse, Empty maps to 0.0.
pub fn to_number_lenient(value: &CellValue) -> Result<f64, ExcelError> {
    match value {
        CellValue::Error(e) => Err(e.clone()),
        CellValue::Number(n) => Ok(*n),
        CellValue::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
        CellValue::Text(s) => parse_number_strict(s).ok_or_else(|| {
            ExcelError::new_value().with_message(format!("Cannot convert {s:?} to number"))
        }),
        CellValue::Empty => Ok(0.0),
    }
}

/// Strict decimal parse: optional sign, optional leading zeros, optional
/// single `.`. No exponent, no separators. Leading/trailing whitespace is
/// stripped.
pub fn parse_number_strict(s: &str) -> Option<f64> {
    let t = s.trim();
    if t.is_empty() {
        return None;
    }
    let body = t.strip_prefix(['+', '-']).unwrap_or(t);
    let mut dot_seen = false;
    let mut digit_seen = false;
    for c in body.chars() {
        match c {
            '0'..='9' => digit_seen = true,
            '.' if !dot_seen => dot_seen = true,
            _ => return None,
        }
    }
    if !digit_seen {
        return None;
    }
    t.parse::<f64>().ok()
}

/// Coerce to the text rendition used by CONCAT/TEXTJOIN/T. Errors
/// propagate; everything else formats per the wire rules (Number without
/// exponent, Boolean as TRUE/FALSE, Empty as empty text).
pub fn to_text(value: &CellValue) -> Result<String, ExcelError> {
    match value {
        CellValue::Error(e) => Err(e.clone()),
        other => Ok(other.to_display_text()),
    }
}

/// Coerce to a logical: Boolean passes through, Number is nonzero, Text
/// accepts "TRUE"/"FALSE" case-insensitively, Empty is false. Other text
/// is `#VALUE!`.
pub fn to_logical(value: &CellValue) -> Result<bool, ExcelError> {
    match value {
        CellValue::Error(e) => Err(e.clone()),
        CellValue::Boolean(b) => Ok(*b),
        CellValue::Number(n) => Ok(*n != 0.0),
        CellValue::Empty => Ok(false),
        CellValue::Text(s) => match s.trim().to_ascii_uppercase().as_str() {
            "TRUE" => Ok(true),
            "FALSE" => Ok(false),
            _ => Err(ExcelError::new_value()
                .with_message(format!("Cannot convert {s:?} to logical"))),
        },
    }
}

/// Finiteness on exit: NaN and ±Inf become `#NUM!`.
pub fn sanitize_numeric(n: f64) -> Result<f64, ExcelError> {
    if n.is_finite() {
        Ok(n)
    } else {
        Err(ExcelError::new_num())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_number_lattice() {
        assert_eq!(to_number_lenient(&CellValue::Number(2.5)), Ok(2.5));
        assert_eq!(to_number_lenient(&CellValue::Boolean(true)), Ok(1.0));
        assert_eq!(to_number_lenient(&CellValue::Boolean(false)), Ok(0.0));
        assert_eq!(to_number_lenient(&CellValue::Empty), Ok(0.0));
        assert_eq!(to_number_lenient(&CellValue::text(" 007.5 ")), Ok(7.5));
        assert_eq!(
            to_number_lenient(&CellValue::text("-12")),
            Ok(-12.0)
        );
        assert_eq!(
            to_number_lenient(&CellValue::Error(ExcelError::new_na())),
            Err(ExcelError::new_na())
        );
    }

    #[test]
    fn strict_parse_rejects_junk() {
        assert_eq!(parse_number_strict("1.2.3"), None);
        assert_eq!(parse_number_strict("1e5"), None);
        assert_eq!(parse_number_strict("abc"), None);
        assert_eq!(parse_number_strict(""), None);
        assert_eq!(parse_number_strict("."), None);
        assert_eq!(parse_number_strict("+.5"), Some(0.5));
        assert_eq!(parse_number_strict("-0.25"), Some(-0.25));
    }

    #[test]
    fn logical_coercion() {
        assert_eq!(to_logical(&CellValue::text("true")), Ok(true));
        assert_eq!(to_logical(&CellValue::text("FALSE")), Ok(false));
        assert_eq!(to_logical(&CellValue::Number(2.0)), Ok(true));
        assert_eq!(to_logical(&CellValue::Number(0.0)), Ok(false));
        assert_eq!(to_logical(&CellValue::Empty), Ok(false));
        assert!(to_logical(&CellValue::text("yes")).is_err());
    }

    #[test]
    fn sanitize_rejects_non_finite() {
        assert_eq!(sanitize_numeric(1.5), Ok(1.5));
        assert_eq!(sanitize_numeric(f64::NAN), Err(ExcelError::new_num()));
        assert_eq!(
            sanitize_numeric(f64::NEG_INFINITY),
            Err(ExcelError::new_num())
        );
    }
}
