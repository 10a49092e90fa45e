//! DATE, YEAR, MONTH, DAY, WEEKDAY and TODAY over the 1900 serial
//! system.

use super::coerce_serial;
use crate::args::{first_error, opt_int_arg};
use crate::func_caps;
use crate::function::Function;
use crate::traits::FunctionContext;
use chrono::{Datelike, NaiveDate};
use exceval_common::{date_to_serial, serial_to_date, CellValue, ExcelError};

/* ─────────────────────────── DATE() ──────────────────────────── */

/// Builds a serial date from year/month/day components.
///
/// # Remarks
/// - Years 0..=1899 are offset into the 1900 window, per Excel.
/// - Month and day overflow roll across year and month boundaries
///   (`DATE(2024, 14, 1)` is 2025-02-01).
#[derive(Debug)]
pub struct DateFn;
impl Function for DateFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "DATE"
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
        let mut year = crate::coercion::to_number_lenient(&args[0])?.trunc() as i32;
        let month = crate::coercion::to_number_lenient(&args[1])?.trunc() as i64;
        let day = crate::coercion::to_number_lenient(&args[2])?.trunc() as i64;
        if (0..=1899).contains(&year) {
            year += 1900;
        }

        // Roll month overflow/underflow across years.
        let total_months = year as i64 * 12 + (month - 1);
        let (y, m) = (total_months.div_euclid(12), total_months.rem_euclid(12) + 1);
        let base = NaiveDate::from_ymd_opt(y as i32, m as u32, 1)
            .ok_or_else(ExcelError::new_num)?;
        let date = base
            .checked_add_signed(chrono::Duration::days(day - 1))
            .ok_or_else(ExcelError::new_num)?;

        let serial = date_to_serial(&date);
        if serial < 0.0 {
            return Err(ExcelError::new_num());
        }
        Ok(CellValue::Number(serial))
    }
}

/* ───────────────────── YEAR() / MONTH() / DAY() ───────────────────── */

#[derive(Debug)]
pub struct YearFn;
impl Function for YearFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "YEAR"
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
        Ok(CellValue::Number(serial_to_date(serial).year() as f64))
    }
}

#[derive(Debug)]
pub struct MonthFn;
impl Function for MonthFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "MONTH"
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
        Ok(CellValue::Number(serial_to_date(serial).month() as f64))
    }
}

#[derive(Debug)]
pub struct DayFn;
impl Function for DayFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "DAY"
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
        Ok(CellValue::Number(serial_to_date(serial).day() as f64))
    }
}

/* ─────────────────────────── WEEKDAY() ──────────────────────────── */

/// Day-of-week index of a serial date.
///
/// return_type 1 (default) numbers Sunday=1..Saturday=7; 2 numbers
/// Monday=1..Sunday=7; 3 numbers Monday=0..Sunday=6; 11..17 start the
/// week on Monday..Sunday respectively.
#[derive(Debug)]
pub struct WeekdayFn;
impl Function for WeekdayFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "WEEKDAY"
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
        // Monday = 0 .. Sunday = 6
        let mon0 = date.weekday().num_days_from_monday() as i64;

        let value = match return_type {
            1 => (mon0 + 1) % 7 + 1,
            2 => mon0 + 1,
            3 => mon0,
            11..=17 => {
                let start = return_type - 11; // Monday-based offset
                (mon0 - start).rem_euclid(7) + 1
            }
            _ => return Err(ExcelError::new_num()),
        };
        Ok(CellValue::Number(value as f64))
    }
}

/* ─────────────────────────── TODAY() ──────────────────────────── */

/// The context's current day as a serial date. Volatile by nature; the
/// core reads it from the host context rather than the system clock.
#[derive(Debug)]
pub struct TodayFn;
impl Function for TodayFn {
    func_caps!(VOLATILE);
    fn name(&self) -> &'static str {
        "TODAY"
    }
    fn min_args(&self) -> usize {
        0
    }
    fn eval(
        &self,
        _args: &[CellValue],
        ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        Ok(CellValue::Number(ctx.today().trunc()))
    }
}

pub fn register_builtins() {
    crate::register_functions!(DateFn, YearFn, MonthFn, DayFn, WeekdayFn, TodayFn);
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
    fn serial(y: i32, m: u32, d: u32) -> f64 {
        date_to_serial(&NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn date_builds_serials() {
        assert_eq!(
            DateFn.dispatch(&[n(2024.0), n(1.0), n(1.0)], &ctx()),
            n(45292.0)
        );
        // Month overflow rolls into the next year.
        assert_eq!(
            DateFn.dispatch(&[n(2024.0), n(14.0), n(1.0)], &ctx()),
            n(serial(2025, 2, 1))
        );
        // Day overflow rolls into the next month.
        assert_eq!(
            DateFn.dispatch(&[n(2024.0), n(1.0), n(32.0)], &ctx()),
            n(serial(2024, 2, 1))
        );
        // Two-digit years land in the 1900 window.
        assert_eq!(
            DateFn.dispatch(&[n(99.0), n(12.0), n(31.0)], &ctx()),
            n(serial(1999, 12, 31))
        );
    }

    #[test]
    fn date_parts_round_trip() {
        let s = serial(2024, 2, 29);
        assert_eq!(YearFn.dispatch(&[n(s)], &ctx()), n(2024.0));
        assert_eq!(MonthFn.dispatch(&[n(s)], &ctx()), n(2.0));
        assert_eq!(DayFn.dispatch(&[n(s)], &ctx()), n(29.0));
    }

    #[test]
    fn weekday_return_types() {
        // 2024-01-01 is a Monday.
        let s = serial(2024, 1, 1);
        assert_eq!(WeekdayFn.dispatch(&[n(s)], &ctx()), n(2.0));
        assert_eq!(WeekdayFn.dispatch(&[n(s), n(2.0)], &ctx()), n(1.0));
        assert_eq!(WeekdayFn.dispatch(&[n(s), n(3.0)], &ctx()), n(0.0));
        assert_eq!(WeekdayFn.dispatch(&[n(s), n(11.0)], &ctx()), n(1.0));
        // Week starting Sunday (17): Monday is day 2.
        assert_eq!(WeekdayFn.dispatch(&[n(s), n(17.0)], &ctx()), n(2.0));
        assert_eq!(
            WeekdayFn.dispatch(&[n(s), n(4.0)], &ctx()),
            CellValue::Error(ExcelError::new_num())
        );
    }

    #[test]
    fn today_reads_context() {
        assert_eq!(TodayFn.dispatch(&[], &StaticContext::at(45292.5)), n(45292.0));
    }
}
