//! Business-day arithmetic: WEEKNUM, NETWORKDAYS, WORKDAY.

use super::coerce_serial;
use crate::args::{first_error, opt_int_arg};
use crate::func_caps;
use crate::function::Function;
use crate::traits::FunctionContext;
use chrono::{Datelike, NaiveDate, Weekday};
use exceval_common::{date_to_serial, serial_to_date, CellValue, ExcelError};
use std::collections::HashSet;

fn is_weekend(date: &NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Trailing holiday arguments: each must coerce to a serial date; Empty
/// entries are skipped.
fn holiday_set(args: &[CellValue]) -> Result<HashSet<NaiveDate>, ExcelError> {
    let mut set = HashSet::new();
    for v in args {
        if v.is_empty() {
            continue;
        }
        set.insert(serial_to_date(coerce_serial(v)?));
    }
    Ok(set)
}

/* ─────────────────────────── WEEKNUM() ──────────────────────────── */

/// Week number of a serial date.
///
/// return_type 1 (default) starts weeks on Sunday, 2 on Monday, 11..17
/// on Monday..Sunday; 21 is ISO-8601 (week 1 contains the first
/// Thursday). Anything else is `#NUM!`.
#[derive(Debug)]
pub struct WeeknumFn;
impl Function for WeeknumFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "WEEKNUM"
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
        let serial = coerce_serial(&args[0])?;
        let return_type = opt_int_arg(args, 1, 1)?;
        let date = serial_to_date(serial);

        // Monday = 0 .. Sunday = 6 offset of the week's starting day.
        let start = match return_type {
            1 => 6, // Sunday
            2 => 0, // Monday
            11..=17 => return_type - 11,
            21 => {
                return Ok(CellValue::Number(date.iso_week().week() as f64));
            }
            _ => return Err(ExcelError::new_num()),
        };

        let jan1 = NaiveDate::from_ymd_opt(date.year(), 1, 1)
            .ok_or_else(ExcelError::new_num)?;
        let day_of_year = date.ordinal0() as i64;
        // Distance from the week start to Jan 1; week 1 is the week
        // containing Jan 1.
        let jan1_offset =
            (jan1.weekday().num_days_from_monday() as i64 - start).rem_euclid(7);
        Ok(CellValue::Number(
            ((day_of_year + jan1_offset) / 7 + 1) as f64,
        ))
    }
}

/* ─────────────────────────── NETWORKDAYS() ──────────────────────────── */

/// Count of weekdays in [start, end], excluding any holidays that land
/// on a weekday. A reversed interval counts the same days negated.
#[derive(Debug)]
pub struct NetworkdaysFn;
impl Function for NetworkdaysFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "NETWORKDAYS"
    }
    fn min_args(&self) -> usize {
        2
    }
    fn variadic(&self) -> bool {
        true
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        if let Some(e) = first_error(args) {
            return Err(e);
        }
        let start_date = serial_to_date(coerce_serial(&args[0])?);
        let end_date = serial_to_date(coerce_serial(&args[1])?);
        let holidays = holiday_set(&args[2..])?;

        let (start, end, sign) = if start_date <= end_date {
            (start_date, end_date, 1i64)
        } else {
            (end_date, start_date, -1i64)
        };

        let mut count = 0i64;
        let mut current = start;
        while current <= end {
            if !is_weekend(&current) && !holidays.contains(&current) {
                count += 1;
            }
            current = match current.succ_opt() {
                Some(d) => d,
                None => break,
            };
        }
        Ok(CellValue::Number((count * sign) as f64))
    }
}

/* ─────────────────────────── WORKDAY() ──────────────────────────── */

/// Serial date a given number of working days from start, stepping past
/// Saturdays, Sundays and holidays. The sign of `days` sets the
/// direction.
#[derive(Debug)]
pub struct WorkdayFn;
impl Function for WorkdayFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "WORKDAY"
    }
    fn min_args(&self) -> usize {
        2
    }
    fn variadic(&self) -> bool {
        true
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        if let Some(e) = first_error(args) {
            return Err(e);
        }
        let start = serial_to_date(coerce_serial(&args[0])?);
        let days = crate::coercion::to_number_lenient(&args[1])?.trunc() as i64;
        let holidays = holiday_set(&args[2..])?;

        let mut current = start;
        let mut remaining = days.abs();
        let forward = days >= 0;

        while remaining > 0 {
            current = if forward {
                current.succ_opt().ok_or_else(ExcelError::new_num)?
            } else {
                current.pred_opt().ok_or_else(ExcelError::new_num)?
            };
            if !is_weekend(&current) && !holidays.contains(&current) {
                remaining -= 1;
            }
        }

        let serial = date_to_serial(&current);
        if serial < 0.0 {
            return Err(ExcelError::new_num());
        }
        Ok(CellValue::Number(serial))
    }
}

pub fn register_builtins() {
    crate::register_functions!(WeeknumFn, NetworkdaysFn, WorkdayFn);
}
