//! Factorials, combinations, permutations, MULTINOMIAL, SERIESSUM, and
//! the integer lattice helpers GCD/LCM.

use super::super::utils::coerce_num;
use crate::func_caps;
use crate::function::Function;
use crate::numeric;
use crate::traits::FunctionContext;
use exceval_common::{CellValue, ExcelError};

/// Truncate a coerced argument to a non-negative integer, `#NUM!` on
/// negatives.
fn non_negative_int(v: &CellValue) -> Result<u64, ExcelError> {
    let n = coerce_num(v)?.trunc();
    if n < 0.0 {
        return Err(ExcelError::new_num());
    }
    Ok(n as u64)
}

#[derive(Debug)]
pub struct FactFn;
/// Factorial of the truncated argument; negatives are `#NUM!`.
impl Function for FactFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "FACT"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        Ok(CellValue::Number(numeric::factorial(non_negative_int(
            &args[0],
        )?)?))
    }
}

#[derive(Debug)]
pub struct FactDoubleFn;
/// Double factorial n·(n−2)·(n−4)·…
impl Function for FactDoubleFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "FACTDOUBLE"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        Ok(CellValue::Number(numeric::factorial_double(
            non_negative_int(&args[0])?,
        )?))
    }
}

#[derive(Debug)]
pub struct CombinFn;
/// Number of k-item combinations from n items.
impl Function for CombinFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "COMBIN"
    }
    fn min_args(&self) -> usize {
        2
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let n = non_negative_int(&args[0])?;
        let k = non_negative_int(&args[1])?;
        Ok(CellValue::Number(numeric::combin(n, k)?))
    }
}

#[derive(Debug)]
pub struct PermutFn;
/// Number of k-item orderings from n items: n!/(n−k)!.
impl Function for PermutFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "PERMUT"
    }
    fn min_args(&self) -> usize {
        2
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let n = non_negative_int(&args[0])?;
        let k = non_negative_int(&args[1])?;
        if k > n {
            return Err(ExcelError::new_num());
        }
        let mut acc = 1.0f64;
        for i in 0..k {
            acc *= (n - i) as f64;
        }
        crate::coercion::sanitize_numeric(acc).map(CellValue::Number)
    }
}

#[derive(Debug)]
pub struct MultinomialFn;
/// `(Σkᵢ)! / Πkᵢ!` over the truncated arguments; any negative input is
/// `#NUM!`.
impl Function for MultinomialFn {
    func_caps!(PURE, REDUCTION, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "MULTINOMIAL"
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
        if let Some(e) = crate::args::first_error(args) {
            return Err(e);
        }
        let mut total = 0u64;
        let mut denom = 1.0f64;
        for v in args {
            let k = non_negative_int(v)?;
            total += k;
            denom *= numeric::factorial(k)?;
        }
        Ok(CellValue::Number(numeric::factorial(total)? / denom))
    }
}

#[derive(Debug)]
pub struct SeriesSumFn;
/// Power series `Σ coeffsᵢ · x^(n + i·m)`.
///
/// x = 0 with a non-positive effective exponent is `#NUM!` (0^0 and
/// negative powers of zero are undefined here).
impl Function for SeriesSumFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "SERIESSUM"
    }
    fn min_args(&self) -> usize {
        4
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
        let x = coerce_num(&args[0])?;
        let n = coerce_num(&args[1])?;
        let m = coerce_num(&args[2])?;
        let mut total = 0.0f64;
        for (i, coeff) in args[3..].iter().enumerate() {
            let c = coerce_num(coeff)?;
            let exp = n + i as f64 * m;
            if x == 0.0 && exp <= 0.0 {
                return Err(ExcelError::new_num());
            }
            total += c * x.powf(exp);
        }
        crate::coercion::sanitize_numeric(total).map(CellValue::Number)
    }
}

fn gcd_u64(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

#[derive(Debug)]
pub struct GcdFn;
/// Greatest common divisor of the truncated non-negative arguments.
impl Function for GcdFn {
    func_caps!(PURE, REDUCTION, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "GCD"
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
        if let Some(e) = crate::args::first_error(args) {
            return Err(e);
        }
        let mut acc = 0u64;
        for v in args {
            acc = gcd_u64(acc, non_negative_int(v)?);
        }
        Ok(CellValue::Number(acc as f64))
    }
}

#[derive(Debug)]
pub struct LcmFn;
/// Least common multiple of the truncated non-negative arguments.
impl Function for LcmFn {
    func_caps!(PURE, REDUCTION, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "LCM"
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
        if let Some(e) = crate::args::first_error(args) {
            return Err(e);
        }
        let mut acc = 1u64;
        for v in args {
            let k = non_negative_int(v)?;
            if k == 0 {
                return Ok(CellValue::Number(0.0));
            }
            let g = gcd_u64(acc, k);
            acc = acc
                .checked_mul(k / g)
                .ok_or_else(ExcelError::new_num)?;
        }
        Ok(CellValue::Number(acc as f64))
    }
}

pub fn register_builtins() {
    crate::register_functions!(
        FactFn,
        FactDoubleFn,
        CombinFn,
        PermutFn,
        MultinomialFn,
        SeriesSumFn,
        GcdFn,
        LcmFn,
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
    fn fact_truncates_and_rejects_negatives() {
        assert_eq!(FactFn.dispatch(&[n(5.9)], &ctx()), n(120.0));
        assert_eq!(
            FactFn.dispatch(&[n(-1.0)], &ctx()),
            CellValue::Error(ExcelError::new_num())
        );
    }

    #[test]
    fn multinomial_seed_scenario() {
        assert_eq!(
            MultinomialFn.dispatch(&[n(2.0), n(3.0), n(4.0)], &ctx()),
            n(1260.0)
        );
        assert_eq!(
            MultinomialFn.dispatch(&[n(-1.0), n(2.0)], &ctx()),
            CellValue::Error(ExcelError::new_num())
        );
    }

    #[test]
    fn seriessum_seed_scenario() {
        // 3 * 2^(2 + 0*1) = 12
        assert_eq!(
            SeriesSumFn.dispatch(&[n(2.0), n(2.0), n(1.0), n(3.0)], &ctx()),
            n(12.0)
        );
        // x=0 with exponent 0 is undefined
        assert_eq!(
            SeriesSumFn.dispatch(&[n(0.0), n(0.0), n(1.0), n(3.0)], &ctx()),
            CellValue::Error(ExcelError::new_num())
        );
        // Multiple coefficients: 1*x^1 + 2*x^2 at x=3 → 3 + 18
        assert_eq!(
            SeriesSumFn.dispatch(&[n(3.0), n(1.0), n(1.0), n(1.0), n(2.0)], &ctx()),
            n(21.0)
        );
    }

    #[test]
    fn combin_permut() {
        assert_eq!(CombinFn.dispatch(&[n(8.0), n(2.0)], &ctx()), n(28.0));
        assert_eq!(PermutFn.dispatch(&[n(8.0), n(2.0)], &ctx()), n(56.0));
        assert_eq!(
            CombinFn.dispatch(&[n(2.0), n(8.0)], &ctx()),
            CellValue::Error(ExcelError::new_num())
        );
    }

    #[test]
    fn gcd_lcm() {
        assert_eq!(GcdFn.dispatch(&[n(24.0), n(36.0), n(60.0)], &ctx()), n(12.0));
        assert_eq!(LcmFn.dispatch(&[n(4.0), n(6.0)], &ctx()), n(12.0));
        assert_eq!(LcmFn.dispatch(&[n(4.0), n(0.0)], &ctx()), n(0.0));
        assert_eq!(
            GcdFn.dispatch(&[n(-4.0)], &ctx()),
            CellValue::Error(ExcelError::new_num())
        );
    }
}
