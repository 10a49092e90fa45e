//! Reductions over the flattened argument sequence: SUM, SUMSQ, PRODUCT,
//! AVERAGE, COUNT, COUNTA, COUNTBLANK, MAX, MIN.
//!
//! These all share Excel's "ignore non-numeric" rule: Text, Boolean and
//! Empty arguments are skipped silently, but a leading Error is still the
//! result.

use crate::func_caps;
use crate::function::Function;
use crate::traits::FunctionContext;
use exceval_common::{CellValue, ExcelError};

/// Fold the numeric content of `args`, skipping Text/Boolean/Empty and
/// propagating the first Error.
fn fold_numbers<F>(args: &[CellValue], init: f64, mut f: F) -> Result<(f64, usize), ExcelError>
where
    F: FnMut(f64, f64) -> f64,
{
    let mut acc = init;
    let mut count = 0usize;
    for v in args {
        match v {
            CellValue::Number(n) => {
                acc = f(acc, *n);
                count += 1;
            }
            CellValue::Error(e) => return Err(e.clone()),
            _ => {}
        }
    }
    Ok((acc, count))
}

/* ─────────────────────────── SUM() ──────────────────────────── */

#[derive(Debug)]
pub struct SumFn;

impl Function for SumFn {
    func_caps!(PURE, REDUCTION, NUMERIC_ONLY, STREAM_OK);

    fn name(&self) -> &'static str {
        "SUM"
    }
    fn min_args(&self) -> usize {
        0
    }
    fn variadic(&self) -> bool {
        true
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let (total, _) = fold_numbers(args, 0.0, |acc, n| acc + n)?;
        Ok(CellValue::Number(total))
    }
}

/* ─────────────────────────── SUMSQ() ──────────────────────────── */

/// Sum of squares of the numeric arguments.
#[derive(Debug)]
pub struct SumSqFn;

impl Function for SumSqFn {
    func_caps!(PURE, REDUCTION, NUMERIC_ONLY, STREAM_OK);

    fn name(&self) -> &'static str {
        "SUMSQ"
    }
    fn min_args(&self) -> usize {
        0
    }
    fn variadic(&self) -> bool {
        true
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let (total, _) = fold_numbers(args, 0.0, |acc, n| acc + n * n)?;
        Ok(CellValue::Number(total))
    }
}

/* ─────────────────────────── PRODUCT() ──────────────────────────── */

#[derive(Debug)]
pub struct ProductFn;

impl Function for ProductFn {
    func_caps!(PURE, REDUCTION, NUMERIC_ONLY, STREAM_OK);

    fn name(&self) -> &'static str {
        "PRODUCT"
    }
    fn min_args(&self) -> usize {
        0
    }
    fn variadic(&self) -> bool {
        true
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let (product, count) = fold_numbers(args, 1.0, |acc, n| acc * n)?;
        // An all-skipped input multiplies nothing: Excel returns 0.
        Ok(CellValue::Number(if count == 0 { 0.0 } else { product }))
    }
}

/* ─────────────────────────── AVERAGE() ──────────────────────────── */

/// Arithmetic mean of the numeric arguments.
///
/// # Remarks
/// - Text, logical and empty arguments are skipped, not treated as zero.
/// - An input with no numeric content returns `#DIV/0!`.
#[derive(Debug)]
pub struct AverageFn;

impl Function for AverageFn {
    func_caps!(PURE, REDUCTION, NUMERIC_ONLY, STREAM_OK);

    fn name(&self) -> &'static str {
        "AVERAGE"
    }
    fn min_args(&self) -> usize {
        0
    }
    fn variadic(&self) -> bool {
        true
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let (total, count) = fold_numbers(args, 0.0, |acc, n| acc + n)?;
        if count == 0 {
            return Err(ExcelError::new_div());
        }
        Ok(CellValue::Number(total / count as f64))
    }
}

/* ─────────────────────────── COUNT() ──────────────────────────── */

#[derive(Debug)]
pub struct CountFn;

impl Function for CountFn {
    func_caps!(PURE, REDUCTION, NUMERIC_ONLY, STREAM_OK);

    fn name(&self) -> &'static str {
        "COUNT"
    }
    fn min_args(&self) -> usize {
        0
    }
    fn variadic(&self) -> bool {
        true
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let (_, count) = fold_numbers(args, 0.0, |acc, _| acc)?;
        Ok(CellValue::Number(count as f64))
    }
}

/* ─────────────────────────── COUNTA() ──────────────────────────── */

/// Counts arguments that are not Empty. Empty text still counts.
#[derive(Debug)]
pub struct CountAFn;

impl Function for CountAFn {
    func_caps!(PURE, REDUCTION, STREAM_OK);

    fn name(&self) -> &'static str {
        "COUNTA"
    }
    fn min_args(&self) -> usize {
        0
    }
    fn variadic(&self) -> bool {
        true
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        if let Some(e) = crate::args::first_error(args) {
            return Err(e);
        }
        let count = args.iter().filter(|v| !v.is_empty()).count();
        Ok(CellValue::Number(count as f64))
    }
}

/* ─────────────────────────── COUNTBLANK() ──────────────────────────── */

#[derive(Debug)]
pub struct CountBlankFn;

impl Function for CountBlankFn {
    func_caps!(PURE, REDUCTION, STREAM_OK);

    fn name(&self) -> &'static str {
        "COUNTBLANK"
    }
    fn min_args(&self) -> usize {
        0
    }
    fn variadic(&self) -> bool {
        true
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        if let Some(e) = crate::args::first_error(args) {
            return Err(e);
        }
        // Empty cells and empty text both count as blank.
        let count = args
            .iter()
            .filter(|v| match v {
                CellValue::Empty => true,
                CellValue::Text(s) => s.is_empty(),
                _ => false,
            })
            .count();
        Ok(CellValue::Number(count as f64))
    }
}

/* ─────────────────────────── MAX() / MIN() ──────────────────────────── */

/// Largest numeric argument; 0 when nothing numeric is supplied.
#[derive(Debug)]
pub struct MaxFn;

impl Function for MaxFn {
    func_caps!(PURE, REDUCTION, NUMERIC_ONLY, STREAM_OK);

    fn name(&self) -> &'static str {
        "MAX"
    }
    fn min_args(&self) -> usize {
        0
    }
    fn variadic(&self) -> bool {
        true
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let (best, count) = fold_numbers(args, f64::NEG_INFINITY, f64::max)?;
        Ok(CellValue::Number(if count == 0 { 0.0 } else { best }))
    }
}

/// Smallest numeric argument; 0 when nothing numeric is supplied.
#[derive(Debug)]
pub struct MinFn;

impl Function for MinFn {
    func_caps!(PURE, REDUCTION, NUMERIC_ONLY, STREAM_OK);

    fn name(&self) -> &'static str {
        "MIN"
    }
    fn min_args(&self) -> usize {
        0
    }
    fn variadic(&self) -> bool {
        true
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let (best, count) = fold_numbers(args, f64::INFINITY, f64::min)?;
        Ok(CellValue::Number(if count == 0 { 0.0 } else { best }))
    }
}

pub fn register_builtins() {
    crate::register_functions!(
        SumFn,
        SumSqFn,
        ProductFn,
        AverageFn,
        CountFn,
        CountAFn,
        CountBlankFn,
        MaxFn,
        MinFn,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::StaticContext;

    fn n(x: f64) -> CellValue {
        CellValue::Number(x)
    }
    fn ctx() -> StaticContext {
        StaticContext::default()
    }

    #[test]
    fn sum_skips_non_numeric() {
        let args = vec![n(1.0), CellValue::text("x"), CellValue::Boolean(true), n(2.0)];
        assert_eq!(SumFn.dispatch(&args, &ctx()), n(3.0));
    }

    #[test]
    fn sumsq_seed_scenario() {
        assert_eq!(SumSqFn.dispatch(&[n(3.0), n(4.0)], &ctx()), n(25.0));
        let with_err = vec![n(3.0), CellValue::Error(ExcelError::new_div()), n(4.0)];
        assert_eq!(
            SumSqFn.dispatch(&with_err, &ctx()),
            CellValue::Error(ExcelError::new_div())
        );
    }

    #[test]
    fn average_of_nothing_is_div0() {
        assert_eq!(
            AverageFn.dispatch(&[CellValue::text("a")], &ctx()),
            CellValue::Error(ExcelError::new_div())
        );
        assert_eq!(AverageFn.dispatch(&[n(2.0), n(4.0)], &ctx()), n(3.0));
    }

    #[test]
    fn count_and_counta() {
        let args = vec![
            n(1.0),
            CellValue::text("x"),
            CellValue::Empty,
            CellValue::Boolean(true),
            n(2.0),
        ];
        assert_eq!(CountFn.dispatch(&args, &ctx()), n(2.0));
        assert_eq!(CountAFn.dispatch(&args, &ctx()), n(4.0));
    }

    #[test]
    fn countblank_counts_empty_text() {
        let args = vec![CellValue::Empty, CellValue::text(""), CellValue::text("a")];
        assert_eq!(CountBlankFn.dispatch(&args, &ctx()), n(2.0));
    }

    #[test]
    fn max_min_defaults() {
        assert_eq!(MaxFn.dispatch(&[], &ctx()), n(0.0));
        assert_eq!(MinFn.dispatch(&[], &ctx()), n(0.0));
        assert_eq!(MaxFn.dispatch(&[n(-3.0), n(7.0)], &ctx()), n(7.0));
        assert_eq!(MinFn.dispatch(&[n(-3.0), n(7.0)], &ctx()), n(-3.0));
    }

    #[test]
    fn error_first_beats_skipping() {
        let args = vec![
            CellValue::text("skipped"),
            CellValue::Error(ExcelError::new_na()),
        ];
        assert_eq!(
            MaxFn.dispatch(&args, &ctx()),
            CellValue::Error(ExcelError::new_na())
        );
    }
}
