//! Elementwise numeric functions: sign and magnitude, the rounding
//! family, modulo and quotient, powers, logs and their domain checks.

use super::super::utils::{coerce_num, sanitize_numeric_result};
use crate::func_caps;
use crate::function::Function;
use crate::numeric;
use crate::traits::FunctionContext;
use exceval_common::{CellValue, ExcelError};

#[derive(Debug)]
pub struct AbsFn;
/// Returns the absolute value of a number.
impl Function for AbsFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "ABS"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        Ok(CellValue::Number(coerce_num(&args[0])?.abs()))
    }
}

#[derive(Debug)]
pub struct SignFn;
/// Returns the sign of a number as -1, 0, or 1.
impl Function for SignFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "SIGN"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let n = coerce_num(&args[0])?;
        Ok(CellValue::Number(if n > 0.0 {
            1.0
        } else if n < 0.0 {
            -1.0
        } else {
            0.0
        }))
    }
}

#[derive(Debug)]
pub struct IntFn;
/// Rounds a number down to the nearest integer.
///
/// `INT` uses floor semantics, so negative values move farther from
/// zero: `INT(-8.9)` is `-9`.
impl Function for IntFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "INT"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        Ok(CellValue::Number(coerce_num(&args[0])?.floor()))
    }
}

#[derive(Debug)]
pub struct TruncFn;
/// Truncates toward zero, optionally at a digit position. `TRUNC(-8.9)`
/// is `-8`, unlike `INT`.
impl Function for TruncFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "TRUNC"
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
        let n = coerce_num(&args[0])?;
        let digits = crate::args::opt_int_arg(args, 1, 0)? as i32;
        Ok(CellValue::Number(numeric::trunc_digits(n, digits)))
    }
}

#[derive(Debug)]
pub struct RoundFn;
/// Rounds half away from zero at the requested decimal place:
/// `ROUND(2.5, 0)` is `3` and `ROUND(-2.5, 0)` is `-3`, not banker's
/// rounding.
impl Function for RoundFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "ROUND"
    }
    fn min_args(&self) -> usize {
        2
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let n = coerce_num(&args[0])?;
        let digits = crate::args::int_arg(args, 1)? as i32;
        Ok(CellValue::Number(numeric::round_half_away(n, digits)))
    }
}

#[derive(Debug)]
pub struct RoundUpFn;
impl Function for RoundUpFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "ROUNDUP"
    }
    fn min_args(&self) -> usize {
        2
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let n = coerce_num(&args[0])?;
        let digits = crate::args::int_arg(args, 1)? as i32;
        Ok(CellValue::Number(numeric::round_up_digits(n, digits)))
    }
}

#[derive(Debug)]
pub struct RoundDownFn;
impl Function for RoundDownFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "ROUNDDOWN"
    }
    fn min_args(&self) -> usize {
        2
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let n = coerce_num(&args[0])?;
        let digits = crate::args::int_arg(args, 1)? as i32;
        Ok(CellValue::Number(numeric::trunc_digits(n, digits)))
    }
}

#[derive(Debug)]
pub struct CeilingFn;
/// Rounds |x| up to the nearest multiple of |significance| with the sign
/// of x. Zero significance yields 0; mismatched signs yield `#NUM!`.
impl Function for CeilingFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "CEILING"
    }
    fn min_args(&self) -> usize {
        2
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let x = coerce_num(&args[0])?;
        let s = coerce_num(&args[1])?;
        Ok(CellValue::Number(numeric::round_to_significance(
            x, s, true,
        )?))
    }
}

#[derive(Debug)]
pub struct FloorFn;
impl Function for FloorFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "FLOOR"
    }
    fn min_args(&self) -> usize {
        2
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let x = coerce_num(&args[0])?;
        let s = coerce_num(&args[1])?;
        Ok(CellValue::Number(numeric::round_to_significance(
            x, s, false,
        )?))
    }
}

#[derive(Debug)]
pub struct ModFn;
/// Excel modulo: `a - b*INT(a/b)`, so the result takes the divisor's
/// sign. `MOD(-10, 3)` is `2`. Division by zero is `#DIV/0!`.
impl Function for ModFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "MOD"
    }
    fn min_args(&self) -> usize {
        2
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let a = coerce_num(&args[0])?;
        let b = coerce_num(&args[1])?;
        Ok(CellValue::Number(numeric::excel_mod(a, b)?))
    }
}

#[derive(Debug)]
pub struct QuotientFn;
/// Integer portion of a division, truncated toward zero.
impl Function for QuotientFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "QUOTIENT"
    }
    fn min_args(&self) -> usize {
        2
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let a = coerce_num(&args[0])?;
        let b = coerce_num(&args[1])?;
        if b == 0.0 {
            return Err(ExcelError::new_div());
        }
        Ok(CellValue::Number((a / b).trunc()))
    }
}

#[derive(Debug)]
pub struct PowerFn;
/// Exponentiation under Excel's domain rules: `POWER(0,0)` is 1,
/// `POWER(0, n<0)` and a negative base with a fractional exponent are
/// `#NUM!`.
impl Function for PowerFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "POWER"
    }
    fn min_args(&self) -> usize {
        2
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let base = coerce_num(&args[0])?;
        let exp = coerce_num(&args[1])?;
        Ok(CellValue::Number(numeric::excel_power(base, exp)?))
    }
}

#[derive(Debug)]
pub struct SqrtFn;
impl Function for SqrtFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "SQRT"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let n = coerce_num(&args[0])?;
        if n < 0.0 {
            return Err(ExcelError::new_num());
        }
        Ok(CellValue::Number(n.sqrt()))
    }
}

#[derive(Debug)]
pub struct SqrtPiFn;
/// Square root of n·π.
impl Function for SqrtPiFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "SQRTPI"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let n = coerce_num(&args[0])?;
        if n < 0.0 {
            return Err(ExcelError::new_num());
        }
        Ok(CellValue::Number((n * std::f64::consts::PI).sqrt()))
    }
}

#[derive(Debug)]
pub struct ExpFn;
impl Function for ExpFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "EXP"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let n = coerce_num(&args[0])?;
        Ok(CellValue::Number(sanitize_numeric_result(n.exp())?))
    }
}

#[derive(Debug)]
pub struct LnFn;
impl Function for LnFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "LN"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let n = coerce_num(&args[0])?;
        if n <= 0.0 {
            return Err(ExcelError::new_num());
        }
        Ok(CellValue::Number(n.ln()))
    }
}

#[derive(Debug)]
pub struct LogFn;
/// Logarithm in an arbitrary base (default 10). A base of 1 or any
/// non-positive base is `#NUM!`.
impl Function for LogFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "LOG"
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
        let n = coerce_num(&args[0])?;
        let base = crate::args::opt_num_arg(args, 1, 10.0)?;
        if n <= 0.0 || base <= 0.0 || base == 1.0 {
            return Err(ExcelError::new_num());
        }
        Ok(CellValue::Number(sanitize_numeric_result(
            n.ln() / base.ln(),
        )?))
    }
}

#[derive(Debug)]
pub struct Log10Fn;
impl Function for Log10Fn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "LOG10"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let n = coerce_num(&args[0])?;
        if n <= 0.0 {
            return Err(ExcelError::new_num());
        }
        Ok(CellValue::Number(n.log10()))
    }
}

#[derive(Debug)]
pub struct EvenFn;
/// Rounds away from zero to the nearest even integer.
impl Function for EvenFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "EVEN"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let n = coerce_num(&args[0])?;
        let m = (n.abs() / 2.0).ceil() * 2.0;
        Ok(CellValue::Number(m * n.signum()))
    }
}

#[derive(Debug)]
pub struct OddFn;
/// Rounds away from zero to the nearest odd integer.
impl Function for OddFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "ODD"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let n = coerce_num(&args[0])?;
        let m = ((n.abs() + 1.0) / 2.0).ceil() * 2.0 - 1.0;
        Ok(CellValue::Number(if n == 0.0 { 1.0 } else { m * n.signum() }))
    }
}

pub fn register_builtins() {
    crate::register_functions!(
        AbsFn,
        SignFn,
        IntFn,
        TruncFn,
        RoundFn,
        RoundUpFn,
        RoundDownFn,
        CeilingFn,
        FloorFn,
        ModFn,
        QuotientFn,
        PowerFn,
        SqrtFn,
        SqrtPiFn,
        ExpFn,
        LnFn,
        LogFn,
        Log10Fn,
        EvenFn,
        OddFn,
    );
}
