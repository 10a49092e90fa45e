//! Time-of-day as serial fractions: TIME, HOUR, MINUTE, SECOND, NOW.

use super::coerce_serial;
use crate::args::first_error;
use crate::func_caps;
use crate::function::Function;
use crate::traits::FunctionContext;
use exceval_common::{CellValue, ExcelError};

const SECONDS_PER_DAY: f64 = 86_400.0;

fn seconds_of_day(serial: f64) -> i64 {
    (serial.fract() * SECONDS_PER_DAY).round() as i64 % 86_400
}

/* ─────────────────────────── TIME() ──────────────────────────── */

/// Builds a day fraction from hour/minute/second components.
///
/// Components overflow into each other (`TIME(0, 90, 0)` is 1:30) and
/// the total wraps modulo 24 hours; a negative total is `#NUM!`.
#[derive(Debug)]
pub struct TimeFn;
impl Function for TimeFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "TIME"
    }
    fn min_args(&self) -> usize {
        3
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        if let Some(e) = first_error(args) {
            return Err(e);
        }
        let hour = crate::coercion::to_number_lenient(&args[0])?.trunc() as i64;
        let minute = crate::coercion::to_number_lenient(&args[1])?.trunc() as i64;
        let second = crate::coercion::to_number_lenient(&args[2])?.trunc() as i64;
        let total = hour * 3600 + minute * 60 + second;
        if total < 0 {
            return Err(ExcelError::new_num());
        }
        Ok(CellValue::Number(
            (total % 86_400) as f64 / SECONDS_PER_DAY,
        ))
    }
}

/* ───────────────── HOUR() / MINUTE() / SECOND() ───────────────── */

#[derive(Debug)]
pub struct HourFn;
impl Function for HourFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "HOUR"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let serial = coerce_serial(&args[0])?;
        Ok(CellValue::Number((seconds_of_day(serial) / 3600) as f64))
    }
}

#[derive(Debug)]
pub struct MinuteFn;
impl Function for MinuteFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "MINUTE"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let serial = coerce_serial(&args[0])?;
        Ok(CellValue::Number((seconds_of_day(serial) % 3600 / 60) as f64))
    }
}

#[derive(Debug)]
pub struct SecondFn;
impl Function for SecondFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "SECOND"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let serial = coerce_serial(&args[0])?;
        Ok(CellValue::Number((seconds_of_day(serial) % 60) as f64))
    }
}

/* ─────────────────────────── NOW() ──────────────────────────── */

/// The context's current moment: day serial plus time fraction.
#[derive(Debug)]
pub struct NowFn;
impl Function for NowFn {
    func_caps!(VOLATILE);
    fn name(&self) -> &'static str {
        "NOW"
    }
    fn min_args(&self) -> usize {
        0
    }
    fn eval(
        &self,
        _args: &[CellValue],
        ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        Ok(CellValue::Number(ctx.today()))
    }
}

pub fn register_builtins() {
    crate::register_functions!(TimeFn, HourFn, MinuteFn, SecondFn, NowFn);
}
