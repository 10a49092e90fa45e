//! Calendar arithmetic: DATEDIF, EDATE, EOMONTH, DAYS.

use super::coerce_serial;
use crate::args::first_error;
use crate::coercion::to_text;
use crate::func_caps;
use crate::function::Function;
use crate::traits::FunctionContext;
use chrono::{Datelike, NaiveDate};
use exceval_common::{date_to_serial, serial_to_date, CellValue, ExcelError};

fn days_in_month(year: i32, month: u32) -> u32 {
    let (ny, nm) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(ny, nm, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

/// Shift a date by whole months, clamping the day to the target month's
/// length (Jan 31 + 1 month = Feb 29/28).
fn shift_months(date: NaiveDate, months: i64) -> Result<NaiveDate, ExcelError> {
    let total = date.year() as i64 * 12 + date.month0() as i64 + months;
    let (year, month0) = (total.div_euclid(12), total.rem_euclid(12));
    let year = i32::try_from(year).map_err(|_| ExcelError::new_num())?;
    let month = month0 as u32 + 1;
    let day = date.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(ExcelError::new_num)
}

/* ─────────────────────────── DATEDIF() ──────────────────────────── */

/// Difference between two dates in the requested unit.
///
/// Units (case-insensitive): `Y` whole years, `M` whole months, `D`
/// days, `MD` days ignoring months and years, `YM` months ignoring
/// years, `YD` days ignoring years. start > end is `#NUM!`; an unknown
/// unit is `#VALUE!`.
#[derive(Debug)]
pub struct DatedifFn;
impl Function for DatedifFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "DATEDIF"
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
        let start_serial = coerce_serial(&args[0])?;
        let end_serial = coerce_serial(&args[1])?;
        let unit = to_text(&args[2])?.to_ascii_uppercase();
        if start_serial > end_serial {
            return Err(ExcelError::new_num());
        }
        let start = serial_to_date(start_serial);
        let end = serial_to_date(end_serial);

        // Whole months elapsed, borrowing one when the end day-of-month
        // has not been reached.
        let whole_months = (end.year() as i64 - start.year() as i64) * 12
            + end.month() as i64
            - start.month() as i64
            - if end.day() < start.day() { 1 } else { 0 };

        let value = match unit.as_str() {
            "Y" => whole_months / 12,
            "M" => whole_months,
            "D" => (end_serial.trunc() - start_serial.trunc()) as i64,
            "MD" => {
                if end.day() >= start.day() {
                    (end.day() - start.day()) as i64
                } else {
                    // Borrow the length of the month before `end`.
                    let prev = shift_months(end, -1)?;
                    let prev_len = days_in_month(prev.year(), prev.month());
                    (end.day() + prev_len - start.day()) as i64
                }
            }
            "YM" => whole_months.rem_euclid(12),
            "YD" => {
                // Anchor the start date into the last year boundary at
                // or before end.
                let year_shift = (end.year() as i64 - start.year() as i64) * 12;
                let mut anchored = shift_months(start, year_shift)?;
                if anchored > end {
                    anchored = shift_months(anchored, -12)?;
                }
                (end - anchored).num_days()
            }
            _ => return Err(ExcelError::new_value()),
        };
        Ok(CellValue::Number(value as f64))
    }
}

/* ─────────────────────────── EDATE() / EOMONTH() ──────────────────────────── */

#[derive(Debug)]
pub struct EdateFn;
/// Serial of the date a number of months before or after the start,
/// day clamped to the target month's end.
impl Function for EdateFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "EDATE"
    }
    fn min_args(&self) -> usize {
        2
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
        let months = crate::coercion::to_number_lenient(&args[1])?.trunc() as i64;
        let shifted = shift_months(start, months)?;
        let serial = date_to_serial(&shifted);
        if serial < 0.0 {
            return Err(ExcelError::new_num());
        }
        Ok(CellValue::Number(serial))
    }
}

#[derive(Debug)]
pub struct EomonthFn;
/// Serial of the last day of the month a number of months away.
impl Function for EomonthFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "EOMONTH"
    }
    fn min_args(&self) -> usize {
        2
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
        let months = crate::coercion::to_number_lenient(&args[1])?.trunc() as i64;
        let shifted = shift_months(start, months)?;
        let last = NaiveDate::from_ymd_opt(
            shifted.year(),
            shifted.month(),
            days_in_month(shifted.year(), shifted.month()),
        )
        .ok_or_else(ExcelError::new_num)?;
        let serial = date_to_serial(&last);
        if serial < 0.0 {
            return Err(ExcelError::new_num());
        }
        Ok(CellValue::Number(serial))
    }
}

/* ─────────────────────────── DAYS() ──────────────────────────── */

#[derive(Debug)]
pub struct DaysFn;
/// Day count between two serials: end − start, times dropped.
impl Function for DaysFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "DAYS"
    }
    fn min_args(&self) -> usize {
        2
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        if let Some(e) = first_error(args) {
            return Err(e);
        }
        let end = coerce_serial(&args[0])?.trunc();
        let start = coerce_serial(&args[1])?.trunc();
        Ok(CellValue::Number(end - start))
    }
}

pub fn register_builtins() {
    crate::register_functions!(DatedifFn, EdateFn, EomonthFn, DaysFn);
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
    fn serial(y: i32, m: u32, d: u32) -> f64 {
        date_to_serial(&NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn datedif_units() {
        let s = serial(2020, 3, 15);
        let e = serial(2024, 1, 10);
        assert_eq!(DatedifFn.dispatch(&[n(s), n(e), t("Y")], &ctx()), n(3.0));
        assert_eq!(DatedifFn.dispatch(&[n(s), n(e), t("M")], &ctx()), n(45.0));
        assert_eq!(
            DatedifFn.dispatch(&[n(s), n(e), t("D")], &ctx()),
            n(e - s)
        );
        // MD borrows December's 31 days: 10 + 31 - 15.
        assert_eq!(DatedifFn.dispatch(&[n(s), n(e), t("MD")], &ctx()), n(26.0));
        assert_eq!(DatedifFn.dispatch(&[n(s), n(e), t("YM")], &ctx()), n(9.0));
        assert_eq!(
            DatedifFn.dispatch(&[n(e), n(s), t("D")], &ctx()),
            CellValue::Error(ExcelError::new_num())
        );
        assert_eq!(
            DatedifFn.dispatch(&[n(s), n(e), t("Q")], &ctx()),
            CellValue::Error(ExcelError::new_value())
        );
    }

    #[test]
    fn datedif_yd_ignores_years() {
        let s = serial(2020, 3, 15);
        let e = serial(2024, 3, 20);
        assert_eq!(DatedifFn.dispatch(&[n(s), n(e), t("YD")], &ctx()), n(5.0));
        // End's month-day before the start's wraps through year end;
        // the span 2023-03-15 → 2024-03-10 crosses a leap day.
        let e = serial(2024, 3, 10);
        assert_eq!(
            DatedifFn.dispatch(&[n(s), n(e), t("YD")], &ctx()),
            n(361.0)
        );
    }

    #[test]
    fn edate_clamps_month_ends() {
        assert_eq!(
            EdateFn.dispatch(&[n(serial(2024, 1, 31)), n(1.0)], &ctx()),
            n(serial(2024, 2, 29))
        );
        assert_eq!(
            EdateFn.dispatch(&[n(serial(2024, 3, 15)), n(-1.0)], &ctx()),
            n(serial(2024, 2, 15))
        );
    }

    #[test]
    fn eomonth_lands_on_month_end() {
        assert_eq!(
            EomonthFn.dispatch(&[n(serial(2024, 1, 15)), n(1.0)], &ctx()),
            n(serial(2024, 2, 29))
        );
        assert_eq!(
            EomonthFn.dispatch(&[n(serial(2024, 1, 15)), n(-1.0)], &ctx()),
            n(serial(2023, 12, 31))
        );
    }

    #[test]
    fn days_subtracts_serials() {
        assert_eq!(
            DaysFn.dispatch(&[n(serial(2024, 1, 31)), n(serial(2024, 1, 1))], &ctx()),
            n(30.0)
        );
    }
}
