//! Depreciation schedules: SLN, SYD, DB, DDB.

use super::super::utils::coerce_num;
use crate::args::{first_error, opt_num_arg};
use crate::func_caps;
use crate::function::Function;
use crate::traits::FunctionContext;
use exceval_common::{CellValue, ExcelError};

/* ─────────────────────────── SLN() ──────────────────────────── */

/// Straight-line depreciation: the same slice of (cost − salvage) every
/// period. Summed over the life it returns exactly cost − salvage.
#[derive(Debug)]
pub struct SlnFn;
impl Function for SlnFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "SLN"
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
        let cost = coerce_num(&args[0])?;
        let salvage = coerce_num(&args[1])?;
        let life = coerce_num(&args[2])?;
        if life <= 0.0 {
            return Err(ExcelError::new_num());
        }
        Ok(CellValue::Number((cost - salvage) / life))
    }
}

/* ─────────────────────────── SYD() ──────────────────────────── */

/// Sum-of-years'-digits depreciation:
/// `(cost − salvage)·(life − per + 1)·2 / (life·(life + 1))`.
#[derive(Debug)]
pub struct SydFn;
impl Function for SydFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "SYD"
    }
    fn min_args(&self) -> usize {
        4
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        if let Some(e) = first_error(args) {
            return Err(e);
        }
        let cost = coerce_num(&args[0])?;
        let salvage = coerce_num(&args[1])?;
        let life = coerce_num(&args[2])?;
        let per = coerce_num(&args[3])?;
        if life <= 0.0 || per < 1.0 || per > life {
            return Err(ExcelError::new_num());
        }
        let dep = (cost - salvage) * (life - per + 1.0) * 2.0 / (life * (life + 1.0));
        crate::coercion::sanitize_numeric(dep).map(CellValue::Number)
    }
}

/* ─────────────────────────── DB() ──────────────────────────── */

/// Fixed-declining-balance depreciation.
///
/// # Remarks
/// - The rate is `1 − (salvage/cost)^(1/life)` rounded to three
///   decimals, per Excel's definition.
/// - The optional `month` prorates the first year; the tail of the
///   proration lands in period `life + 1`.
#[derive(Debug)]
pub struct DbFn;
impl Function for DbFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "DB"
    }
    fn min_args(&self) -> usize {
        4
    }
    fn max_args(&self) -> Option<usize> {
        Some(5)
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        if let Some(e) = first_error(args) {
            return Err(e);
        }
        let cost = coerce_num(&args[0])?;
        let salvage = coerce_num(&args[1])?;
        let life = coerce_num(&args[2])?.trunc();
        let period = coerce_num(&args[3])?.trunc();
        let month = opt_num_arg(args, 4, 12.0)?.trunc();

        if cost < 0.0
            || salvage < 0.0
            || life <= 0.0
            || period < 1.0
            || !(1.0..=12.0).contains(&month)
            || period > life + 1.0
            || (period > life && month == 12.0)
        {
            return Err(ExcelError::new_num());
        }
        if cost == 0.0 {
            return Ok(CellValue::Number(0.0));
        }

        let rate = crate::numeric::round_half_away(1.0 - (salvage / cost).powf(1.0 / life), 3);

        let mut total = 0.0f64;
        let mut dep = 0.0f64;
        for p in 1..=(period as i64) {
            dep = if p == 1 {
                cost * rate * month / 12.0
            } else if p as f64 == life + 1.0 {
                (cost - total) * rate * (12.0 - month) / 12.0
            } else {
                (cost - total) * rate
            };
            total += dep;
        }
        crate::coercion::sanitize_numeric(dep).map(CellValue::Number)
    }
}

/* ─────────────────────────── DDB() ──────────────────────────── */

/// Double-declining-balance depreciation with a configurable factor
/// (default 2). The book value never drops below salvage.
#[derive(Debug)]
pub struct DdbFn;
impl Function for DdbFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "DDB"
    }
    fn min_args(&self) -> usize {
        4
    }
    fn max_args(&self) -> Option<usize> {
        Some(5)
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        if let Some(e) = first_error(args) {
            return Err(e);
        }
        let cost = coerce_num(&args[0])?;
        let salvage = coerce_num(&args[1])?;
        let life = coerce_num(&args[2])?;
        let period = coerce_num(&args[3])?.trunc();
        let factor = opt_num_arg(args, 4, 2.0)?;

        if cost < 0.0
            || salvage < 0.0
            || life <= 0.0
            || factor <= 0.0
            || period < 1.0
            || period > life
        {
            return Err(ExcelError::new_num());
        }

        let rate = (factor / life).min(1.0);
        let mut balance = cost;
        let mut dep = 0.0f64;
        for _ in 0..(period as i64) {
            dep = (balance * rate).min(balance - salvage).max(0.0);
            balance -= dep;
        }
        crate::coercion::sanitize_numeric(dep).map(CellValue::Number)
    }
}

pub fn register_builtins() {
    crate::register_functions!(SlnFn, SydFn, DbFn, DdbFn);
}
