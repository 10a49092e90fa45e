//! Statistical functions: order statistics (MEDIAN, LARGE, SMALL,
//! PERCENTILE, QUARTILE), dispersion (VAR/STDEV), the OLS regression
//! family (FORECAST, TREND, GROWTH, LINEST, LOGEST), and
//! BINOM.DIST.RANGE.
//!
//! Samples are the flattened numeric arguments; Text/Boolean/Empty are
//! skipped the way Excel skips them inside ranges, and a leading Error
//! still propagates.

use crate::args::{collect_numbers, first_error, NumBuf};
use crate::func_caps;
use crate::function::Function;
use crate::numeric::{combin, ln_gamma};
use crate::traits::FunctionContext;
use exceval_common::{CellValue, ExcelError};

fn sorted_sample(args: &[CellValue]) -> Result<NumBuf, ExcelError> {
    let mut s = collect_numbers(args)?;
    s.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    Ok(s)
}

/// Linear interpolation at 1-based fractional position `pos` into a
/// sorted sample.
fn interpolate(sorted: &[f64], pos: f64) -> f64 {
    let idx = pos.floor() as usize;
    let frac = pos - pos.floor();
    if idx >= sorted.len() {
        return sorted[sorted.len() - 1];
    }
    let lo = sorted[idx - 1];
    if frac == 0.0 {
        return lo;
    }
    lo + frac * (sorted[idx] - lo)
}

/// PERCENTILE.INC core: k ∈ [0, 1], position k·(n−1)+1.
fn percentile_inc(sorted: &[f64], k: f64) -> Result<f64, ExcelError> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&k) {
        return Err(ExcelError::new_num());
    }
    Ok(interpolate(sorted, k * (sorted.len() as f64 - 1.0) + 1.0))
}

/// PERCENTILE.EXC core: k ∈ (0, 1) and position k·(n+1) within [1, n].
fn percentile_exc(sorted: &[f64], k: f64) -> Result<f64, ExcelError> {
    let n = sorted.len() as f64;
    if sorted.is_empty() || k <= 0.0 || k >= 1.0 {
        return Err(ExcelError::new_num());
    }
    let pos = k * (n + 1.0);
    if pos < 1.0 || pos > n {
        return Err(ExcelError::new_num());
    }
    Ok(interpolate(sorted, pos))
}

/* ─────────────────── MEDIAN / LARGE / SMALL ─────────────────── */

#[derive(Debug)]
pub struct MedianFn;
/// Middle value of the numeric sample (mean of the two middle values
/// for an even count).
impl Function for MedianFn {
    func_caps!(PURE, REDUCTION, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "MEDIAN"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn variadic(&self) -> bool {
        true
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let s = sorted_sample(args)?;
        if s.is_empty() {
            return Err(ExcelError::new_num());
        }
        let mid = s.len() / 2;
        let median = if s.len() % 2 == 1 {
            s[mid]
        } else {
            (s[mid - 1] + s[mid]) / 2.0
        };
        Ok(CellValue::Number(median))
    }
}

#[derive(Debug)]
pub struct LargeFn;
/// k-th largest sample value; the trailing argument is k (1-based).
impl Function for LargeFn {
    func_caps!(PURE, REDUCTION, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "LARGE"
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
        let (sample, k_arg) = args.split_at(args.len() - 1);
        let k = crate::coercion::to_number_lenient(&k_arg[0])?.trunc() as i64;
        let s = sorted_sample(sample)?;
        if k < 1 || k as usize > s.len() {
            return Err(ExcelError::new_num());
        }
        Ok(CellValue::Number(s[s.len() - k as usize]))
    }
}

#[derive(Debug)]
pub struct SmallFn;
/// k-th smallest sample value; the trailing argument is k (1-based).
impl Function for SmallFn {
    func_caps!(PURE, REDUCTION, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "SMALL"
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
        let (sample, k_arg) = args.split_at(args.len() - 1);
        let k = crate::coercion::to_number_lenient(&k_arg[0])?.trunc() as i64;
        let s = sorted_sample(sample)?;
        if k < 1 || k as usize > s.len() {
            return Err(ExcelError::new_num());
        }
        Ok(CellValue::Number(s[k as usize - 1]))
    }
}

/* ─────────────────── Dispersion ─────────────────── */

fn variance(args: &[CellValue], population: bool) -> Result<f64, ExcelError> {
    let s = collect_numbers(args)?;
    let n = s.len();
    if (population && n < 1) || (!population && n < 2) {
        return Err(ExcelError::new_div());
    }
    let mean = s.iter().sum::<f64>() / n as f64;
    let ss: f64 = s.iter().map(|x| (x - mean) * (x - mean)).sum();
    Ok(ss / if population { n as f64 } else { (n - 1) as f64 })
}

#[derive(Debug)]
pub struct VarSFn;
/// Sample variance; fewer than two numbers is `#DIV/0!`.
impl Function for VarSFn {
    func_caps!(PURE, REDUCTION, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "VAR.S"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn variadic(&self) -> bool {
        true
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        Ok(CellValue::Number(variance(args, false)?))
    }
}

#[derive(Debug)]
pub struct VarPFn;
/// Population variance; a single value yields 0.
impl Function for VarPFn {
    func_caps!(PURE, REDUCTION, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "VAR.P"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn variadic(&self) -> bool {
        true
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        Ok(CellValue::Number(variance(args, true)?))
    }
}

#[derive(Debug)]
pub struct StdevSFn;
impl Function for StdevSFn {
    func_caps!(PURE, REDUCTION, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "STDEV.S"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn variadic(&self) -> bool {
        true
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        Ok(CellValue::Number(variance(args, false)?.sqrt()))
    }
}

#[derive(Debug)]
pub struct StdevPFn;
impl Function for StdevPFn {
    func_caps!(PURE, REDUCTION, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "STDEV.P"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn variadic(&self) -> bool {
        true
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        Ok(CellValue::Number(variance(args, true)?.sqrt()))
    }
}

/* ─────────────────── PERCENTILE / QUARTILE ─────────────────── */

#[derive(Debug)]
pub struct PercentileIncFn;
/// Inclusive percentile; the trailing argument is k ∈ [0, 1].
impl Function for PercentileIncFn {
    func_caps!(PURE, REDUCTION, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "PERCENTILE.INC"
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
        let (sample, k_arg) = args.split_at(args.len() - 1);
        let k = crate::coercion::to_number_lenient(&k_arg[0])?;
        let s = sorted_sample(sample)?;
        Ok(CellValue::Number(percentile_inc(&s, k)?))
    }
}

#[derive(Debug)]
pub struct PercentileExcFn;
/// Exclusive percentile; k must satisfy 1/(n+1) ≤ k ≤ n/(n+1).
impl Function for PercentileExcFn {
    func_caps!(PURE, REDUCTION, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "PERCENTILE.EXC"
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
        let (sample, k_arg) = args.split_at(args.len() - 1);
        let k = crate::coercion::to_number_lenient(&k_arg[0])?;
        let s = sorted_sample(sample)?;
        Ok(CellValue::Number(percentile_exc(&s, k)?))
    }
}

#[derive(Debug)]
pub struct QuartileIncFn;
/// Inclusive quartile; the trailing argument selects quart ∈ {0..4}
/// (0 = min, 2 = median, 4 = max).
impl Function for QuartileIncFn {
    func_caps!(PURE, REDUCTION, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "QUARTILE.INC"
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
        let (sample, q_arg) = args.split_at(args.len() - 1);
        let quart = crate::coercion::to_number_lenient(&q_arg[0])?.trunc();
        if !(0.0..=4.0).contains(&quart) {
            return Err(ExcelError::new_num());
        }
        let s = sorted_sample(sample)?;
        Ok(CellValue::Number(percentile_inc(&s, quart / 4.0)?))
    }
}

#[derive(Debug)]
pub struct QuartileExcFn;
/// Exclusive quartile; quart ∈ {1, 2, 3}.
impl Function for QuartileExcFn {
    func_caps!(PURE, REDUCTION, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "QUARTILE.EXC"
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
        let (sample, q_arg) = args.split_at(args.len() - 1);
        let quart = crate::coercion::to_number_lenient(&q_arg[0])?.trunc();
        if !(1.0..=3.0).contains(&quart) {
            return Err(ExcelError::new_num());
        }
        let s = sorted_sample(sample)?;
        Ok(CellValue::Number(percentile_exc(&s, quart / 4.0)?))
    }
}

/* ─────────────────── Regression family ───────────────────
Flat-argument grammar: an optional trailing Boolean is the `const`
flag; for FORECAST/TREND/GROWTH the first argument is the prediction
abscissa; the remaining numerics split evenly into known-ys then
known-xs. An odd remainder is `#VALUE!`.
---------------------------------------------------------- */

struct Fit {
    slope: f64,
    intercept: f64,
}

fn split_xy(args: &[CellValue]) -> Result<(Vec<f64>, Vec<f64>), ExcelError> {
    let nums = collect_numbers(args)?;
    if nums.is_empty() || nums.len() % 2 != 0 {
        return Err(ExcelError::new_value());
    }
    let half = nums.len() / 2;
    Ok((nums[..half].to_vec(), nums[half..].to_vec()))
}

/// Pop a trailing Boolean `const` flag (default true).
fn split_const_flag(args: &[CellValue]) -> (&[CellValue], bool) {
    match args.last() {
        Some(CellValue::Boolean(b)) => (&args[..args.len() - 1], *b),
        _ => (args, true),
    }
}

/// Ordinary least squares over (x, y) pairs. With `through_origin` the
/// intercept is pinned to zero and the slope is Σxy/Σx².
fn ols(xs: &[f64], ys: &[f64], through_origin: bool) -> Result<Fit, ExcelError> {
    let n = xs.len() as f64;
    if through_origin {
        let sxx: f64 = xs.iter().map(|x| x * x).sum();
        if sxx == 0.0 {
            return Err(ExcelError::new_div());
        }
        let sxy: f64 = xs.iter().zip(ys).map(|(x, y)| x * y).sum();
        return Ok(Fit {
            slope: sxy / sxx,
            intercept: 0.0,
        });
    }
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;
    let sxx: f64 = xs.iter().map(|x| (x - mean_x) * (x - mean_x)).sum();
    if sxx == 0.0 {
        return Err(ExcelError::new_div());
    }
    let sxy: f64 = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();
    let slope = sxy / sxx;
    Ok(Fit {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}

/// Exponential fit `y = b·m^x` via OLS in ln-space; rejects
/// non-positive y.
fn exp_fit(xs: &[f64], ys: &[f64], through_origin: bool) -> Result<Fit, ExcelError> {
    if ys.iter().any(|y| *y <= 0.0) {
        return Err(ExcelError::new_num());
    }
    let ln_ys: Vec<f64> = ys.iter().map(|y| y.ln()).collect();
    ols(xs, &ln_ys, through_origin)
}

#[derive(Debug)]
pub struct ForecastFn;
/// Linear prediction at x from known ys and xs.
///
/// `FORECAST.LINEAR` is registered as an alias of this implementation.
impl Function for ForecastFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "FORECAST"
    }
    fn min_args(&self) -> usize {
        3
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
        let x = crate::coercion::to_number_lenient(&args[0])?;
        let (ys, xs) = split_xy(&args[1..])?;
        let fit = ols(&xs, &ys, false)?;
        crate::coercion::sanitize_numeric(fit.intercept + fit.slope * x).map(CellValue::Number)
    }
}

#[derive(Debug)]
pub struct TrendFn;
/// Linear prediction like FORECAST, honoring an optional trailing
/// `const` flag; FALSE forces the fit through the origin.
impl Function for TrendFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "TREND"
    }
    fn min_args(&self) -> usize {
        3
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
        let x = crate::coercion::to_number_lenient(&args[0])?;
        let (rest, use_const) = split_const_flag(&args[1..]);
        let (ys, xs) = split_xy(rest)?;
        let fit = ols(&xs, &ys, !use_const)?;
        crate::coercion::sanitize_numeric(fit.intercept + fit.slope * x).map(CellValue::Number)
    }
}

#[derive(Debug)]
pub struct GrowthFn;
/// Exponential prediction `b·m^x`; non-positive known ys are `#NUM!`.
impl Function for GrowthFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "GROWTH"
    }
    fn min_args(&self) -> usize {
        3
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
        let x = crate::coercion::to_number_lenient(&args[0])?;
        let (rest, use_const) = split_const_flag(&args[1..]);
        let (ys, xs) = split_xy(rest)?;
        let fit = exp_fit(&xs, &ys, !use_const)?;
        crate::coercion::sanitize_numeric((fit.intercept + fit.slope * x).exp())
            .map(CellValue::Number)
    }
}

#[derive(Debug)]
pub struct LinestFn;
/// OLS slope of ys on xs. `const = FALSE` (trailing Boolean) gives
/// Σxy/Σx².
impl Function for LinestFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "LINEST"
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
        let (rest, use_const) = split_const_flag(args);
        let (ys, xs) = split_xy(rest)?;
        let fit = ols(&xs, &ys, !use_const)?;
        crate::coercion::sanitize_numeric(fit.slope).map(CellValue::Number)
    }
}

#[derive(Debug)]
pub struct LogestFn;
/// Growth coefficient m of the exponential fit `y = b·m^x`. With
/// `const = FALSE`, `m = exp(Σ x·ln y / Σ x²)`.
impl Function for LogestFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "LOGEST"
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
        let (rest, use_const) = split_const_flag(args);
        let (ys, xs) = split_xy(rest)?;
        let fit = exp_fit(&xs, &ys, !use_const)?;
        crate::coercion::sanitize_numeric(fit.slope.exp()).map(CellValue::Number)
    }
}

/* ─────────────────── Means and deviations ─────────────────── */

#[derive(Debug)]
pub struct GeomeanFn;
/// Geometric mean; any non-positive sample value is `#NUM!`.
impl Function for GeomeanFn {
    func_caps!(PURE, REDUCTION, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "GEOMEAN"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn variadic(&self) -> bool {
        true
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let s = collect_numbers(args)?;
        if s.is_empty() || s.iter().any(|x| *x <= 0.0) {
            return Err(ExcelError::new_num());
        }
        // ln-space mean sidesteps overflow in the raw product.
        let mean_ln = s.iter().map(|x| x.ln()).sum::<f64>() / s.len() as f64;
        crate::coercion::sanitize_numeric(mean_ln.exp()).map(CellValue::Number)
    }
}

#[derive(Debug)]
pub struct HarmeanFn;
/// Harmonic mean; any non-positive sample value is `#NUM!`.
impl Function for HarmeanFn {
    func_caps!(PURE, REDUCTION, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "HARMEAN"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn variadic(&self) -> bool {
        true
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let s = collect_numbers(args)?;
        if s.is_empty() || s.iter().any(|x| *x <= 0.0) {
            return Err(ExcelError::new_num());
        }
        let recip_sum: f64 = s.iter().map(|x| 1.0 / x).sum();
        Ok(CellValue::Number(s.len() as f64 / recip_sum))
    }
}

#[derive(Debug)]
pub struct AvedevFn;
/// Mean absolute deviation from the sample mean.
impl Function for AvedevFn {
    func_caps!(PURE, REDUCTION, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "AVEDEV"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn variadic(&self) -> bool {
        true
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let s = collect_numbers(args)?;
        if s.is_empty() {
            return Err(ExcelError::new_num());
        }
        let mean = s.iter().sum::<f64>() / s.len() as f64;
        let dev = s.iter().map(|x| (x - mean).abs()).sum::<f64>() / s.len() as f64;
        Ok(CellValue::Number(dev))
    }
}

#[derive(Debug)]
pub struct DevsqFn;
/// Sum of squared deviations from the sample mean.
impl Function for DevsqFn {
    func_caps!(PURE, REDUCTION, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "DEVSQ"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn variadic(&self) -> bool {
        true
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let s = collect_numbers(args)?;
        if s.is_empty() {
            return Err(ExcelError::new_num());
        }
        let mean = s.iter().sum::<f64>() / s.len() as f64;
        let ss: f64 = s.iter().map(|x| (x - mean) * (x - mean)).sum();
        Ok(CellValue::Number(ss))
    }
}

#[derive(Debug)]
pub struct ModeSnglFn;
/// Most frequent sample value (first-seen wins ties); no repeat at all
/// is `#N/A`.
impl Function for ModeSnglFn {
    func_caps!(PURE, REDUCTION, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "MODE.SNGL"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn variadic(&self) -> bool {
        true
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let s = collect_numbers(args)?;
        let mut best: Option<(f64, usize)> = None;
        for x in s.iter() {
            let count = s.iter().filter(|y| **y == *x).count();
            if count < 2 {
                continue;
            }
            // Strict > keeps the first-seen value on count ties.
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((*x, count));
            }
        }
        match best {
            Some((x, _)) => Ok(CellValue::Number(x)),
            None => Err(ExcelError::new_na()),
        }
    }
}

/* ─────────────────── Correlation family ─────────────────── */

/// Paired-sample statistics share the even-split grammar: the argument
/// numerics divide into ys then xs.
fn paired(args: &[CellValue]) -> Result<(Vec<f64>, Vec<f64>), ExcelError> {
    if let Some(e) = first_error(args) {
        return Err(e);
    }
    split_xy(args)
}

#[derive(Debug)]
pub struct SlopeFn;
/// OLS slope of ys on xs.
impl Function for SlopeFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "SLOPE"
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
        let (ys, xs) = paired(args)?;
        let fit = ols(&xs, &ys, false)?;
        crate::coercion::sanitize_numeric(fit.slope).map(CellValue::Number)
    }
}

#[derive(Debug)]
pub struct InterceptFn;
/// OLS intercept of ys on xs.
impl Function for InterceptFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "INTERCEPT"
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
        let (ys, xs) = paired(args)?;
        let fit = ols(&xs, &ys, false)?;
        crate::coercion::sanitize_numeric(fit.intercept).map(CellValue::Number)
    }
}

/// Pearson correlation coefficient of the paired samples.
fn pearson(xs: &[f64], ys: &[f64]) -> Result<f64, ExcelError> {
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;
    let sxx: f64 = xs.iter().map(|x| (x - mean_x) * (x - mean_x)).sum();
    let syy: f64 = ys.iter().map(|y| (y - mean_y) * (y - mean_y)).sum();
    if sxx == 0.0 || syy == 0.0 {
        return Err(ExcelError::new_div());
    }
    let sxy: f64 = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();
    Ok(sxy / (sxx * syy).sqrt())
}

#[derive(Debug)]
pub struct CorrelFn;
/// Pearson correlation; PEARSON resolves here as an alias.
impl Function for CorrelFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "CORREL"
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
        let (ys, xs) = paired(args)?;
        Ok(CellValue::Number(pearson(&xs, &ys)?))
    }
}

#[derive(Debug)]
pub struct RsqFn;
/// Square of the Pearson correlation.
impl Function for RsqFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "RSQ"
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
        let (ys, xs) = paired(args)?;
        let r = pearson(&xs, &ys)?;
        Ok(CellValue::Number(r * r))
    }
}

/* ─────────────────── BINOM.DIST.RANGE ─────────────────── */

/// P(X = k) for X ~ Binomial(n, p), in ln-space for large n.
fn binom_pmf(n: u64, p: f64, k: u64) -> Result<f64, ExcelError> {
    if p == 0.0 {
        return Ok(if k == 0 { 1.0 } else { 0.0 });
    }
    if p == 1.0 {
        return Ok(if k == n { 1.0 } else { 0.0 });
    }
    if n <= crate::numeric::FACTORIAL_MAX {
        let c = combin(n, k)?;
        return Ok(c * p.powi(k as i32) * (1.0 - p).powi((n - k) as i32));
    }
    let ln_c = ln_gamma(n as f64 + 1.0) - ln_gamma(k as f64 + 1.0) - ln_gamma((n - k) as f64 + 1.0);
    let ln_p = ln_c + k as f64 * p.ln() + (n - k) as f64 * (1.0 - p).ln();
    Ok(ln_p.exp())
}

#[derive(Debug)]
pub struct BinomDistRangeFn;
/// Probability mass of a binomial result: P(X = k) with three
/// arguments, P(k ≤ X ≤ k2) with four.
impl Function for BinomDistRangeFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "BINOM.DIST.RANGE"
    }
    fn min_args(&self) -> usize {
        3
    }
    fn max_args(&self) -> Option<usize> {
        Some(4)
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        if let Some(e) = first_error(args) {
            return Err(e);
        }
        let trials = crate::coercion::to_number_lenient(&args[0])?.trunc();
        let p = crate::coercion::to_number_lenient(&args[1])?;
        let k1 = crate::coercion::to_number_lenient(&args[2])?.trunc();
        let k2 = match args.get(3) {
            Some(v) => crate::coercion::to_number_lenient(v)?.trunc(),
            None => k1,
        };
        if trials < 0.0
            || !(0.0..=1.0).contains(&p)
            || k1 < 0.0
            || k1 > trials
            || k2 < k1
            || k2 > trials
        {
            return Err(ExcelError::new_num());
        }
        let n = trials as u64;
        let mut total = 0.0f64;
        for k in (k1 as u64)..=(k2 as u64) {
            total += binom_pmf(n, p, k)?;
        }
        crate::coercion::sanitize_numeric(total).map(CellValue::Number)
    }
}

pub fn register_builtins() {
    crate::register_functions!(
        MedianFn,
        LargeFn,
        SmallFn,
        VarSFn,
        VarPFn,
        StdevSFn,
        StdevPFn,
        PercentileIncFn,
        PercentileExcFn,
        QuartileIncFn,
        QuartileExcFn,
        ForecastFn,
        TrendFn,
        GrowthFn,
        LinestFn,
        LogestFn,
        BinomDistRangeFn,
        GeomeanFn,
        HarmeanFn,
        AvedevFn,
        DevsqFn,
        ModeSnglFn,
        SlopeFn,
        InterceptFn,
        CorrelFn,
        RsqFn,
    );
    // Legacy spellings and the FORECAST.LINEAR alias.
    crate::function_registry::register_alias("FORECAST.LINEAR", "FORECAST");
    crate::function_registry::register_alias("PERCENTILE", "PERCENTILE.INC");
    crate::function_registry::register_alias("QUARTILE", "QUARTILE.INC");
    crate::function_registry::register_alias("VAR", "VAR.S");
    crate::function_registry::register_alias("VARP", "VAR.P");
    crate::function_registry::register_alias("STDEV", "STDEV.S");
    crate::function_registry::register_alias("STDEVP", "STDEV.P");
    crate::function_registry::register_alias("MODE", "MODE.SNGL");
    crate::function_registry::register_alias("PEARSON", "CORREL");
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
    fn num(v: CellValue) -> f64 {
        match v {
            CellValue::Number(x) => x,
            other => panic!("expected number, got {other:?}"),
        }
    }

    #[test]
    fn median_even_and_odd() {
        assert_eq!(
            MedianFn.dispatch(&[n(3.0), n(1.0), n(2.0)], &ctx()),
            n(2.0)
        );
        assert_eq!(
            MedianFn.dispatch(&[n(4.0), n(1.0), n(2.0), n(3.0)], &ctx()),
            n(2.5)
        );
    }

    #[test]
    fn percentile_inc_interpolates() {
        let sample = [n(1.0), n(2.0), n(3.0), n(4.0)];
        let mut args = sample.to_vec();
        args.push(n(0.25));
        assert_eq!(PercentileIncFn.dispatch(&args, &ctx()), n(1.75));
        let mut args = sample.to_vec();
        args.push(n(1.0));
        assert_eq!(PercentileIncFn.dispatch(&args, &ctx()), n(4.0));
        let mut args = sample.to_vec();
        args.push(n(1.5));
        assert_eq!(
            PercentileIncFn.dispatch(&args, &ctx()),
            CellValue::Error(ExcelError::new_num())
        );
    }

    #[test]
    fn percentile_exc_bounds() {
        let sample = [n(1.0), n(2.0), n(3.0), n(4.0)];
        let mut args = sample.to_vec();
        args.push(n(0.5));
        assert_eq!(PercentileExcFn.dispatch(&args, &ctx()), n(2.5));
        // k outside [1/(n+1), n/(n+1)] is #NUM!
        let mut args = sample.to_vec();
        args.push(n(0.1));
        assert_eq!(
            PercentileExcFn.dispatch(&args, &ctx()),
            CellValue::Error(ExcelError::new_num())
        );
    }

    #[test]
    fn quartiles() {
        let sample = [n(1.0), n(2.0), n(3.0), n(4.0), n(5.0)];
        let mut args = sample.to_vec();
        args.push(n(0.0));
        assert_eq!(QuartileIncFn.dispatch(&args, &ctx()), n(1.0));
        let mut args = sample.to_vec();
        args.push(n(2.0));
        assert_eq!(QuartileIncFn.dispatch(&args, &ctx()), n(3.0));
        let mut args = sample.to_vec();
        args.push(n(4.0));
        assert_eq!(QuartileIncFn.dispatch(&args, &ctx()), n(5.0));
        let mut args = sample.to_vec();
        args.push(n(5.0));
        assert_eq!(
            QuartileIncFn.dispatch(&args, &ctx()),
            CellValue::Error(ExcelError::new_num())
        );
        // Exclusive flavor rejects 0 and 4
        let mut args = sample.to_vec();
        args.push(n(0.0));
        assert_eq!(
            QuartileExcFn.dispatch(&args, &ctx()),
            CellValue::Error(ExcelError::new_num())
        );
    }

    #[test]
    fn variance_degenerate_counts() {
        assert_eq!(
            VarSFn.dispatch(&[n(5.0)], &ctx()),
            CellValue::Error(ExcelError::new_div())
        );
        assert_eq!(VarPFn.dispatch(&[n(5.0)], &ctx()), n(0.0));
        assert_eq!(VarSFn.dispatch(&[n(2.0), n(4.0)], &ctx()), n(2.0));
        assert_eq!(VarPFn.dispatch(&[n(2.0), n(4.0)], &ctx()), n(1.0));
    }

    #[test]
    fn forecast_linear_fit() {
        // y = 2x + 1 over x = 1..4
        let args = vec![
            n(10.0),
            n(3.0),
            n(5.0),
            n(7.0),
            n(9.0),
            n(1.0),
            n(2.0),
            n(3.0),
            n(4.0),
        ];
        let v = num(ForecastFn.dispatch(&args, &ctx()));
        assert!((v - 21.0).abs() < 1e-9, "got {v}");
    }

    #[test]
    fn linest_const_false_forces_origin() {
        // Points (1,2), (2,4): slope 2 either way; with an intercept
        // shift the origin-forced slope differs.
        let args = vec![n(3.0), n(5.0), n(1.0), n(2.0), CellValue::Boolean(false)];
        let v = num(LinestFn.dispatch(&args, &ctx()));
        // Σxy/Σx² = (3 + 10)/5
        assert!((v - 13.0 / 5.0).abs() < 1e-9);
        let args = vec![n(3.0), n(5.0), n(1.0), n(2.0)];
        let v = num(LinestFn.dispatch(&args, &ctx()));
        assert!((v - 2.0).abs() < 1e-9);
    }

    #[test]
    fn growth_rejects_non_positive_y() {
        let args = vec![n(3.0), n(0.0), n(2.0), n(1.0), n(2.0)];
        assert_eq!(
            GrowthFn.dispatch(&args, &ctx()),
            CellValue::Error(ExcelError::new_num())
        );
    }

    #[test]
    fn logest_recovers_growth_factor() {
        // y = 3 · 2^x at x = 1, 2, 3
        let args = vec![n(6.0), n(12.0), n(24.0), n(1.0), n(2.0), n(3.0)];
        let v = num(LogestFn.dispatch(&args, &ctx()));
        assert!((v - 2.0).abs() < 1e-9, "got {v}");
    }

    #[test]
    fn odd_xy_split_is_value_error() {
        let args = vec![n(1.0), n(2.0), n(3.0), n(4.0)]; // 3 after the abscissa
        assert_eq!(
            ForecastFn.dispatch(&args, &ctx()),
            CellValue::Error(ExcelError::new_value())
        );
    }

    #[test]
    fn binom_dist_range() {
        // P(X = 2) for n = 4, p = 0.5 is 6/16
        let v = num(BinomDistRangeFn.dispatch(&[n(4.0), n(0.5), n(2.0)], &ctx()));
        assert!((v - 0.375).abs() < 1e-12);
        // P(0 ≤ X ≤ 4) = 1
        let v = num(BinomDistRangeFn.dispatch(&[n(4.0), n(0.5), n(0.0), n(4.0)], &ctx()));
        assert!((v - 1.0).abs() < 1e-12);
        assert_eq!(
            BinomDistRangeFn.dispatch(&[n(4.0), n(1.5), n(2.0)], &ctx()),
            CellValue::Error(ExcelError::new_num())
        );
        assert_eq!(
            BinomDistRangeFn.dispatch(&[n(4.0), n(0.5), n(3.0), n(2.0)], &ctx()),
            CellValue::Error(ExcelError::new_num())
        );
    }

    #[test]
    fn geomean_harmean() {
        let v = num(GeomeanFn.dispatch(&[n(2.0), n(8.0)], &ctx()));
        assert!((v - 4.0).abs() < 1e-12);
        let v = num(HarmeanFn.dispatch(&[n(2.0), n(6.0)], &ctx()));
        assert!((v - 3.0).abs() < 1e-12);
        assert_eq!(
            GeomeanFn.dispatch(&[n(2.0), n(-8.0)], &ctx()),
            CellValue::Error(ExcelError::new_num())
        );
        assert_eq!(
            HarmeanFn.dispatch(&[n(0.0)], &ctx()),
            CellValue::Error(ExcelError::new_num())
        );
    }

    #[test]
    fn avedev_devsq() {
        let v = num(AvedevFn.dispatch(&[n(1.0), n(2.0), n(3.0), n(4.0)], &ctx()));
        assert!((v - 1.0).abs() < 1e-12);
        assert_eq!(
            DevsqFn.dispatch(&[n(1.0), n(2.0), n(3.0)], &ctx()),
            n(2.0)
        );
    }

    #[test]
    fn mode_sngl() {
        assert_eq!(
            ModeSnglFn.dispatch(&[n(1.0), n(2.0), n(2.0), n(3.0)], &ctx()),
            n(2.0)
        );
        // Count tie keeps the first-seen value.
        assert_eq!(
            ModeSnglFn.dispatch(&[n(5.0), n(5.0), n(2.0), n(2.0)], &ctx()),
            n(5.0)
        );
        assert_eq!(
            ModeSnglFn.dispatch(&[n(1.0), n(2.0), n(3.0)], &ctx()),
            CellValue::Error(ExcelError::new_na())
        );
    }

    #[test]
    fn correlation_family() {
        // Perfect line y = 2x + 1.
        let args = vec![
            n(3.0),
            n(5.0),
            n(7.0),
            n(1.0),
            n(2.0),
            n(3.0),
        ];
        let r = num(CorrelFn.dispatch(&args, &ctx()));
        assert!((r - 1.0).abs() < 1e-12);
        let r2 = num(RsqFn.dispatch(&args, &ctx()));
        assert!((r2 - 1.0).abs() < 1e-12);
        let slope = num(SlopeFn.dispatch(&args, &ctx()));
        assert!((slope - 2.0).abs() < 1e-12);
        let intercept = num(InterceptFn.dispatch(&args, &ctx()));
        assert!((intercept - 1.0).abs() < 1e-12);
        // Constant series has no variance to correlate against.
        let flat = vec![n(1.0), n(1.0), n(1.0), n(2.0), n(3.0), n(4.0)];
        assert_eq!(
            CorrelFn.dispatch(&flat, &ctx()),
            CellValue::Error(ExcelError::new_div())
        );
    }
}
