//! Engineering comparison and error functions: DELTA, GESTEP, ERF,
//! ERFC.

use super::super::utils::coerce_num;
use crate::args::{first_error, opt_num_arg};
use crate::func_caps;
use crate::function::Function;
use crate::traits::FunctionContext;
use exceval_common::{CellValue, ExcelError};

/// Error function via the Abramowitz–Stegun 7.1.26 rational
/// approximation (absolute error below 1.5e-7, well inside display
/// precision).
fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - (((((A5 * t + A4) * t) + A3) * t + A2) * t + A1) * t * (-x * x).exp();
    sign * y
}

#[derive(Debug)]
pub struct DeltaFn;
/// Kronecker delta: 1 when the two numbers are equal, else 0. The
/// second number defaults to 0.
impl Function for DeltaFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "DELTA"
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
        let a = coerce_num(&args[0])?;
        let b = opt_num_arg(args, 1, 0.0)?;
        Ok(CellValue::Number(if a == b { 1.0 } else { 0.0 }))
    }
}

#[derive(Debug)]
pub struct GestepFn;
/// Step function: 1 when number ≥ step (default 0), else 0.
impl Function for GestepFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "GESTEP"
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
        let a = coerce_num(&args[0])?;
        let step = opt_num_arg(args, 1, 0.0)?;
        Ok(CellValue::Number(if a >= step { 1.0 } else { 0.0 }))
    }
}

#[derive(Debug)]
pub struct ErfFn;
/// Error function; with two arguments, the integral between the two
/// bounds (`erf(upper) − erf(lower)`).
impl Function for ErfFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "ERF"
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
        let lower = coerce_num(&args[0])?;
        let v = match args.get(1) {
            None | Some(CellValue::Empty) => erf(lower),
            Some(u) => erf(crate::coercion::to_number_lenient(u)?) - erf(lower),
        };
        Ok(CellValue::Number(v))
    }
}

#[derive(Debug)]
pub struct ErfcFn;
/// Complementary error function `1 − erf(x)`.
impl Function for ErfcFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "ERFC"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let x = coerce_num(&args[0])?;
        Ok(CellValue::Number(1.0 - erf(x)))
    }
}

pub fn register_builtins() {
    crate::register_functions!(DeltaFn, GestepFn, ErfFn, ErfcFn);
    crate::function_registry::register_alias("ERF.PRECISE", "ERF");
    crate::function_registry::register_alias("ERFC.PRECISE", "ERFC");
}
