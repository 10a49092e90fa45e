//! Time Value of Money functions: PMT, PV, FV, NPER, RATE, NPV, IRR,
//! IPMT, PPMT.
//!
//! Cash-flow sign convention throughout: money paid out is negative,
//! money received is positive. `type` is 0 for end-of-period payments
//! and 1 for beginning-of-period payments; anything else is `#NUM!`.

use super::super::utils::coerce_num;
use crate::args::{first_error, opt_num_arg};
use crate::func_caps;
use crate::function::Function;
use crate::traits::FunctionContext;
use exceval_common::{CellValue, ExcelError};

/// Rates below this magnitude take the zero-rate closed form to avoid
/// 0/0 in the annuity factor.
const RATE_EPSILON: f64 = 1e-10;

const RATE_MAX_ITERATIONS: u32 = 100;
const RATE_TOLERANCE: f64 = 1e-7;
const IRR_MAX_ITERATIONS: u32 = 50;

fn payment_type(args: &[CellValue], idx: usize) -> Result<i32, ExcelError> {
    let t = opt_num_arg(args, idx, 0.0)? as i32;
    if t != 0 && t != 1 {
        return Err(ExcelError::new_num());
    }
    Ok(t)
}

/// Residual of the TVM equation
/// `pv·(1+r)^n + pmt·(1+r·type)·((1+r)^n − 1)/r + fv = 0`.
fn tvm_residual(rate: f64, nper: f64, pmt: f64, pv: f64, fv: f64, typ: i32) -> f64 {
    if rate.abs() < RATE_EPSILON {
        return pv + pmt * nper + fv;
    }
    let factor = (1.0 + rate).powf(nper);
    let adj = if typ != 0 { 1.0 + rate } else { 1.0 };
    pv * factor + pmt * adj * (factor - 1.0) / rate + fv
}

fn pmt_value(rate: f64, nper: f64, pv: f64, fv: f64, typ: i32) -> Result<f64, ExcelError> {
    if nper <= 0.0 {
        return Err(ExcelError::new_num());
    }
    if rate.abs() < RATE_EPSILON {
        return Ok(-(pv + fv) / nper);
    }
    let factor = (1.0 + rate).powf(nper);
    let adj = if typ != 0 { 1.0 + rate } else { 1.0 };
    crate::coercion::sanitize_numeric(-(rate * (pv * factor + fv)) / ((factor - 1.0) * adj))
}

/* ─────────────────────────── PMT() ──────────────────────────── */

/// Constant payment for a fixed-rate annuity or loan.
///
/// # Remarks
/// - `rate` is the interest rate per payment period.
/// - `nper ≤ 0` returns `#NUM!`.
/// - Satisfies the PV round-trip: `PV(rate, nper, PMT(rate, nper, pv))`
///   recovers `pv`.
#[derive(Debug)]
pub struct PmtFn;
impl Function for PmtFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "PMT"
    }
    fn min_args(&self) -> usize {
        3
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
        let rate = coerce_num(&args[0])?;
        let nper = coerce_num(&args[1])?;
        let pv = coerce_num(&args[2])?;
        let fv = opt_num_arg(args, 3, 0.0)?;
        let typ = payment_type(args, 4)?;
        Ok(CellValue::Number(pmt_value(rate, nper, pv, fv, typ)?))
    }
}

/* ─────────────────────────── PV() ──────────────────────────── */

/// Present value of a payment stream and optional terminal value.
#[derive(Debug)]
pub struct PvFn;
impl Function for PvFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "PV"
    }
    fn min_args(&self) -> usize {
        3
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
        let rate = coerce_num(&args[0])?;
        let nper = coerce_num(&args[1])?;
        let pmt = coerce_num(&args[2])?;
        let fv = opt_num_arg(args, 3, 0.0)?;
        let typ = payment_type(args, 4)?;
        if nper <= 0.0 {
            return Err(ExcelError::new_num());
        }
        let pv = if rate.abs() < RATE_EPSILON {
            -fv - pmt * nper
        } else {
            let factor = (1.0 + rate).powf(nper);
            let adj = if typ != 0 { 1.0 + rate } else { 1.0 };
            (-fv - pmt * adj * (factor - 1.0) / rate) / factor
        };
        crate::coercion::sanitize_numeric(pv).map(CellValue::Number)
    }
}

/* ─────────────────────────── FV() ──────────────────────────── */

/// Future value after compounding a present value and payment stream.
#[derive(Debug)]
pub struct FvFn;
impl Function for FvFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "FV"
    }
    fn min_args(&self) -> usize {
        3
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
        let rate = coerce_num(&args[0])?;
        let nper = coerce_num(&args[1])?;
        let pmt = coerce_num(&args[2])?;
        let pv = opt_num_arg(args, 3, 0.0)?;
        let typ = payment_type(args, 4)?;
        if nper <= 0.0 {
            return Err(ExcelError::new_num());
        }
        let fv = if rate.abs() < RATE_EPSILON {
            -pv - pmt * nper
        } else {
            let factor = (1.0 + rate).powf(nper);
            let adj = if typ != 0 { 1.0 + rate } else { 1.0 };
            -pv * factor - pmt * adj * (factor - 1.0) / rate
        };
        crate::coercion::sanitize_numeric(fv).map(CellValue::Number)
    }
}

/* ─────────────────────────── NPER() ──────────────────────────── */

/// Number of periods needed for the TVM equation to balance.
#[derive(Debug)]
pub struct NperFn;
impl Function for NperFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "NPER"
    }
    fn min_args(&self) -> usize {
        3
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
        let rate = coerce_num(&args[0])?;
        let pmt = coerce_num(&args[1])?;
        let pv = coerce_num(&args[2])?;
        let fv = opt_num_arg(args, 3, 0.0)?;
        let typ = payment_type(args, 4)?;

        if rate.abs() < RATE_EPSILON {
            if pmt == 0.0 {
                return Err(ExcelError::new_num());
            }
            return Ok(CellValue::Number(-(pv + fv) / pmt));
        }
        let adj = if typ != 0 { 1.0 + rate } else { 1.0 };
        let annuity = pmt * adj / rate;
        let numerator = annuity - fv;
        let denominator = pv + annuity;
        if denominator == 0.0 || numerator / denominator <= 0.0 {
            return Err(ExcelError::new_num());
        }
        let n = (numerator / denominator).ln() / (1.0 + rate).ln();
        crate::coercion::sanitize_numeric(n).map(CellValue::Number)
    }
}

/* ─────────────────────────── RATE() ──────────────────────────── */

/// Per-period interest rate solved by Newton iteration on the TVM
/// residual.
///
/// # Remarks
/// - At most 100 iterations; convergence is 1e-7 on the residual.
/// - The optional guess defaults to 0.1.
/// - Non-convergence and non-finite intermediates return `#NUM!`.
#[derive(Debug)]
pub struct RateFn;
impl Function for RateFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "RATE"
    }
    fn min_args(&self) -> usize {
        3
    }
    fn max_args(&self) -> Option<usize> {
        Some(6)
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        if let Some(e) = first_error(args) {
            return Err(e);
        }
        let nper = coerce_num(&args[0])?;
        let pmt = coerce_num(&args[1])?;
        let pv = coerce_num(&args[2])?;
        let fv = opt_num_arg(args, 3, 0.0)?;
        let typ = payment_type(args, 4)?;
        let guess = opt_num_arg(args, 5, 0.1)?;
        if nper <= 0.0 {
            return Err(ExcelError::new_num());
        }

        let mut rate = guess.max(-0.99);
        for _ in 0..RATE_MAX_ITERATIONS {
            let residual = tvm_residual(rate, nper, pmt, pv, fv, typ);
            if !residual.is_finite() {
                return Err(ExcelError::new_num());
            }
            if residual.abs() < RATE_TOLERANCE {
                return Ok(CellValue::Number(rate));
            }
            // Central-difference derivative; the closed-form one is messy
            // around rate = 0.
            let h = 1e-6;
            let derivative = (tvm_residual(rate + h, nper, pmt, pv, fv, typ)
                - tvm_residual(rate - h, nper, pmt, pv, fv, typ))
                / (2.0 * h);
            if derivative == 0.0 || !derivative.is_finite() {
                return Err(ExcelError::new_num());
            }
            let next = (rate - residual / derivative).max(-0.999_999);
            // Quadratic convergence drives the step below any useful
            // residual scale well before the iteration cap.
            if (next - rate).abs() < 1e-10 {
                return Ok(CellValue::Number(next));
            }
            rate = next;
        }
        Err(ExcelError::new_num().with_message("RATE failed to converge"))
    }
}

/* ─────────────────────────── NPV() ──────────────────────────── */

/// Net present value of the period-1..n cash flows at a fixed rate.
///
/// Excel's convention: the first cash flow is discounted one full
/// period, so any time-zero outflow must be added outside the call.
#[derive(Debug)]
pub struct NpvFn;
impl Function for NpvFn {
    func_caps!(PURE, REDUCTION, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "NPV"
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
        let rate = coerce_num(&args[0])?;
        if rate == -1.0 {
            return Err(ExcelError::new_div());
        }
        let mut total = 0.0f64;
        let mut period = 1i32;
        for v in &args[1..] {
            // Non-numeric entries are skipped the way Excel skips text
            // cells inside a range; they do not consume a period.
            if let CellValue::Number(n) = v {
                total += n / (1.0 + rate).powi(period);
                period += 1;
            }
        }
        crate::coercion::sanitize_numeric(total).map(CellValue::Number)
    }
}

pub(crate) fn npv_at(rate: f64, flows: &[f64]) -> f64 {
    // Time-zero flow included: Σ vᵢ/(1+r)^i for i = 0..
    flows
        .iter()
        .enumerate()
        .map(|(i, v)| v / (1.0 + rate).powi(i as i32))
        .sum()
}

/* ─────────────────────────── IRR() ──────────────────────────── */

/// Internal rate of return of the cash-flow sequence: the rate where
/// the time-zero NPV is zero.
///
/// # Remarks
/// - Needs at least one positive and one negative flow, else `#NUM!`.
/// - Bisection over [−0.999, 10.0] (50 steps), then Newton polish.
#[derive(Debug)]
pub struct IrrFn;
impl Function for IrrFn {
    func_caps!(PURE, REDUCTION, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "IRR"
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
        let flows: Vec<f64> = args
            .iter()
            .filter_map(|v| match v {
                CellValue::Number(n) => Some(*n),
                _ => None,
            })
            .collect();
        if !flows.iter().any(|v| *v > 0.0) || !flows.iter().any(|v| *v < 0.0) {
            return Err(ExcelError::new_num());
        }

        let (mut lo, mut hi) = (-0.999f64, 10.0f64);
        let mut f_lo = npv_at(lo, &flows);
        // The NPV is monotone only for conventional flows; scan for a
        // bracketing subinterval when the endpoints agree in sign.
        if f_lo * npv_at(hi, &flows) > 0.0 {
            let mut bracket = None;
            let steps = 100;
            let mut prev_r = lo;
            let mut prev_f = f_lo;
            for i in 1..=steps {
                let r = lo + (hi - lo) * i as f64 / steps as f64;
                let f = npv_at(r, &flows);
                if prev_f * f <= 0.0 && f.is_finite() {
                    bracket = Some((prev_r, r, prev_f));
                    break;
                }
                prev_r = r;
                prev_f = f;
            }
            match bracket {
                Some((a, b, fa)) => {
                    lo = a;
                    hi = b;
                    f_lo = fa;
                }
                None => return Err(ExcelError::new_num()),
            }
        }

        for _ in 0..IRR_MAX_ITERATIONS {
            let mid = (lo + hi) / 2.0;
            let f_mid = npv_at(mid, &flows);
            if f_lo * f_mid <= 0.0 {
                hi = mid;
            } else {
                lo = mid;
                f_lo = f_mid;
            }
        }

        // Newton polish from the bisection estimate.
        let mut rate = (lo + hi) / 2.0;
        for _ in 0..10 {
            let f = npv_at(rate, &flows);
            if f.abs() < RATE_TOLERANCE {
                break;
            }
            let h = 1e-7;
            let d = (npv_at(rate + h, &flows) - npv_at(rate - h, &flows)) / (2.0 * h);
            if d == 0.0 || !d.is_finite() {
                break;
            }
            let next = rate - f / d;
            if !(-0.999..=10.0).contains(&next) {
                break;
            }
            rate = next;
        }
        crate::coercion::sanitize_numeric(rate).map(CellValue::Number)
    }
}

/* ─────────────────────────── IPMT() / PPMT() ──────────────────────────── */

/// Interest and principal split of payment `per`, by amortization
/// recursion. `ppmt = pmt − ipmt` holds by construction.
fn amortize(
    rate: f64,
    per: i64,
    nper: f64,
    pv: f64,
    fv: f64,
    typ: i32,
) -> Result<(f64, f64), ExcelError> {
    if per < 1 || (per as f64) > nper {
        return Err(ExcelError::new_num());
    }
    let pmt = pmt_value(rate, nper, pv, fv, typ)?;
    let mut balance = pv;
    let mut ipmt = 0.0f64;
    for p in 1..=per {
        if p == 1 && typ == 1 {
            // Beginning-of-period schedules pay before any interest
            // accrues, so the first payment is all principal.
            ipmt = 0.0;
            balance += pmt;
        } else {
            ipmt = -balance * rate;
            let ppmt = pmt - ipmt;
            balance += ppmt;
        }
    }
    Ok((ipmt, pmt - ipmt))
}

/// Interest portion of a given payment.
#[derive(Debug)]
pub struct IpmtFn;
impl Function for IpmtFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "IPMT"
    }
    fn min_args(&self) -> usize {
        4
    }
    fn max_args(&self) -> Option<usize> {
        Some(6)
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        if let Some(e) = first_error(args) {
            return Err(e);
        }
        let rate = coerce_num(&args[0])?;
        let per = coerce_num(&args[1])?.trunc() as i64;
        let nper = coerce_num(&args[2])?;
        let pv = coerce_num(&args[3])?;
        let fv = opt_num_arg(args, 4, 0.0)?;
        let typ = payment_type(args, 5)?;
        let (ipmt, _) = amortize(rate, per, nper, pv, fv, typ)?;
        crate::coercion::sanitize_numeric(ipmt).map(CellValue::Number)
    }
}

/// Principal portion of a given payment.
#[derive(Debug)]
pub struct PpmtFn;
impl Function for PpmtFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "PPMT"
    }
    fn min_args(&self) -> usize {
        4
    }
    fn max_args(&self) -> Option<usize> {
        Some(6)
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        if let Some(e) = first_error(args) {
            return Err(e);
        }
        let rate = coerce_num(&args[0])?;
        let per = coerce_num(&args[1])?.trunc() as i64;
        let nper = coerce_num(&args[2])?;
        let pv = coerce_num(&args[3])?;
        let fv = opt_num_arg(args, 4, 0.0)?;
        let typ = payment_type(args, 5)?;
        let (_, ppmt) = amortize(rate, per, nper, pv, fv, typ)?;
        crate::coercion::sanitize_numeric(ppmt).map(CellValue::Number)
    }
}

pub fn register_builtins() {
    crate::register_functions!(
        PmtFn, PvFn, FvFn, NperFn, RateFn, NpvFn, IrrFn, IpmtFn, PpmtFn,
    );
}
