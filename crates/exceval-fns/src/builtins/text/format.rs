//! Numeric text formatting: FIXED, DOLLAR, NUMBERVALUE, BAHTTEXT.

use crate::args::{first_error, opt_int_arg, opt_logical_arg};
use crate::coercion::to_text;
use crate::func_caps;
use crate::function::Function;
use crate::numeric::round_half_away;
use crate::traits::FunctionContext;
use exceval_common::{CellValue, ExcelError};

/// Group an unsigned integer digit string by threes.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let len = digits.len();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// FIXED core: round half away from zero at `decimals`, then render
/// with optional thousands grouping. Negative `decimals` round to the
/// left of the point and print no fraction.
fn fixed_format(n: f64, decimals: i32, commas: bool) -> String {
    let rounded = round_half_away(n, decimals);
    let places = decimals.max(0) as usize;
    let formatted = format!("{:.*}", places, rounded.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (formatted, None),
    };
    let int_part = if commas {
        group_thousands(&int_part)
    } else {
        int_part
    };
    let mut out = String::new();
    if rounded < 0.0 {
        out.push('-');
    }
    out.push_str(&int_part);
    if let Some(f) = frac_part {
        out.push('.');
        out.push_str(&f);
    }
    out
}

/* ─────────────────────────── FIXED() ──────────────────────────── */

/// Renders a number as text with a fixed number of decimals.
///
/// # Remarks
/// - Midpoints round half away from zero, matching ROUND.
/// - `decimals` defaults to 2; negative values round left of the point.
/// - `no_commas = TRUE` suppresses thousands grouping.
#[derive(Debug)]
pub struct FixedFn;
impl Function for FixedFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "FIXED"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn max_args(&self) -> Option<usize> {
        Some(3)
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        if let Some(e) = first_error(args) {
            return Err(e);
        }
        let n = crate::coercion::to_number_lenient(&args[0])?;
        let decimals = opt_int_arg(args, 1, 2)? as i32;
        let no_commas = opt_logical_arg(args, 2, false)?;
        Ok(CellValue::Text(fixed_format(n, decimals, !no_commas)))
    }
}

/* ─────────────────────────── DOLLAR() ──────────────────────────── */

/// FIXED with a `$` prefix and mandatory thousands grouping.
#[derive(Debug)]
pub struct DollarFn;
impl Function for DollarFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "DOLLAR"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn max_args(&self) -> Option<usize> {
        Some(2)
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        if let Some(e) = first_error(args) {
            return Err(e);
        }
        let n = crate::coercion::to_number_lenient(&args[0])?;
        let decimals = opt_int_arg(args, 1, 2)? as i32;
        let body = fixed_format(n.abs(), decimals, true);
        let out = if round_half_away(n, decimals) < 0.0 {
            format!("-${body}")
        } else {
            format!("${body}")
        };
        Ok(CellValue::Text(out))
    }
}

/* ─────────────────────────── NUMBERVALUE() ──────────────────────────── */

/// Parses text with configurable decimal and group separators.
///
/// # Remarks
/// - Trailing `%` signs each divide the result by 100.
/// - Identical separators are `#VALUE!`.
/// - Group separators after the decimal point are `#VALUE!`.
/// - Empty text parses to 0.
#[derive(Debug)]
pub struct NumberValueFn;
impl Function for NumberValueFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "NUMBERVALUE"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn max_args(&self) -> Option<usize> {
        Some(3)
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        if let Some(e) = first_error(args) {
            return Err(e);
        }
        let text = to_text(&args[0])?;
        let decimal_sep = match args.get(1) {
            None | Some(CellValue::Empty) => '.',
            Some(v) => to_text(v)?.chars().next().ok_or_else(ExcelError::new_value)?,
        };
        let group_sep = match args.get(2) {
            None | Some(CellValue::Empty) => ',',
            Some(v) => to_text(v)?.chars().next().ok_or_else(ExcelError::new_value)?,
        };
        if decimal_sep == group_sep {
            return Err(ExcelError::new_value());
        }

        let mut body: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        if body.is_empty() {
            return Ok(CellValue::Number(0.0));
        }

        // Peel trailing percent signs; each divides by 100.
        let mut percent_scale = 1.0f64;
        while body.ends_with('%') {
            body.pop();
            percent_scale /= 100.0;
        }

        // Group separators are legal only before the decimal point.
        let mut cleaned = String::with_capacity(body.len());
        let mut seen_decimal = false;
        for c in body.chars() {
            if c == decimal_sep {
                if seen_decimal {
                    return Err(ExcelError::new_value());
                }
                seen_decimal = true;
                cleaned.push('.');
            } else if c == group_sep {
                if seen_decimal {
                    return Err(ExcelError::new_value());
                }
            } else {
                cleaned.push(c);
            }
        }

        let value: f64 = cleaned.parse().map_err(|_| ExcelError::new_value())?;
        crate::coercion::sanitize_numeric(value * percent_scale).map(CellValue::Number)
    }
}

/* ─────────────────────────── BAHTTEXT() ──────────────────────────── */

/// The number rendered to two decimals followed by the baht marker.
#[derive(Debug)]
pub struct BahtTextFn;
impl Function for BahtTextFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "BAHTTEXT"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let n = crate::coercion::to_number_lenient(&args[0])?;
        Ok(CellValue::Text(format!("{}บาท", fixed_format(n, 2, false))))
    }
}

pub fn register_builtins() {
    crate::register_functions!(FixedFn, DollarFn, NumberValueFn, BahtTextFn);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::StaticContext;

    fn n(x: f64) -> CellValue {
        CellValue::Number(x)
    }
    fn t(s: &str) -> CellValue {
        CellValue::text(s)
    }
    fn ctx() -> StaticContext {
        StaticContext::default()
    }

    #[test]
    fn fixed_seed_scenarios() {
        assert_eq!(FixedFn.dispatch(&[n(1234.567), n(1.0)], &ctx()), t("1,234.6"));
        assert_eq!(FixedFn.dispatch(&[n(1234.567)], &ctx()), t("1,234.57"));
        assert_eq!(
            FixedFn.dispatch(&[n(1234.567), n(-2.0)], &ctx()),
            t("1,200")
        );
        assert_eq!(
            FixedFn.dispatch(&[n(1234.567), n(1.0), CellValue::Boolean(true)], &ctx()),
            t("1234.6")
        );
        assert_eq!(FixedFn.dispatch(&[n(-1234.567), n(1.0)], &ctx()), t("-1,234.6"));
    }

    #[test]
    fn fixed_agrees_with_round_on_midpoints() {
        assert_eq!(FixedFn.dispatch(&[n(2.5), n(0.0)], &ctx()), t("3"));
        assert_eq!(FixedFn.dispatch(&[n(-2.5), n(0.0)], &ctx()), t("-3"));
    }

    #[test]
    fn dollar_formatting() {
        assert_eq!(DollarFn.dispatch(&[n(1234.567)], &ctx()), t("$1,234.57"));
        assert_eq!(DollarFn.dispatch(&[n(-1234.567)], &ctx()), t("-$1,234.57"));
        assert_eq!(DollarFn.dispatch(&[n(0.0)], &ctx()), t("$0.00"));
    }

    #[test]
    fn numbervalue_separators() {
        assert_eq!(NumberValueFn.dispatch(&[t("50%")], &ctx()), n(0.5));
        assert_eq!(
            NumberValueFn.dispatch(&[t("1.234,56"), t(","), t(".")], &ctx()),
            n(1234.56)
        );
        assert_eq!(NumberValueFn.dispatch(&[t("2.5")], &ctx()), n(2.5));
        assert_eq!(NumberValueFn.dispatch(&[t("")], &ctx()), n(0.0));
        // Stacked percents keep dividing.
        assert_eq!(NumberValueFn.dispatch(&[t("100%%")], &ctx()), n(0.01));
    }

    #[test]
    fn numbervalue_rejections() {
        assert_eq!(
            NumberValueFn.dispatch(&[t("1,2"), t(","), t(",")], &ctx()),
            CellValue::Error(ExcelError::new_value())
        );
        assert_eq!(
            NumberValueFn.dispatch(&[t("junk")], &ctx()),
            CellValue::Error(ExcelError::new_value())
        );
        // Group separator after the decimal point.
        assert_eq!(
            NumberValueFn.dispatch(&[t("1.2,3")], &ctx()),
            CellValue::Error(ExcelError::new_value())
        );
    }

    #[test]
    fn bahttext_two_decimals() {
        assert_eq!(BahtTextFn.dispatch(&[n(123.456)], &ctx()), t("123.46บาท"));
        assert_eq!(BahtTextFn.dispatch(&[n(0.0)], &ctx()), t("0.00บาท"));
    }
}
