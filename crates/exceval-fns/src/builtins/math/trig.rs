//! Trigonometric functions, their hyperbolic and reciprocal variants,
//! and the angle-unit helpers PI/RADIANS/DEGREES.
//!
//! Reciprocal functions (SEC, CSC, COT and the hyperbolic counterparts)
//! report `#DIV/0!` when the underlying value is zero; zero detection
//! uses a near-zero epsilon because π/2 and friends are not exactly
//! representable.

use super::super::utils::{coerce_num, EPSILON_NEAR_ZERO};
use crate::func_caps;
use crate::function::Function;
use crate::traits::FunctionContext;
use exceval_common::{CellValue, ExcelError};

fn unary(args: &[CellValue], f: impl Fn(f64) -> f64) -> Result<CellValue, ExcelError> {
    Ok(CellValue::Number(f(coerce_num(&args[0])?)))
}

/// 1/f(x) with the `#DIV/0!` guard shared by every reciprocal function.
fn reciprocal(args: &[CellValue], f: impl Fn(f64) -> f64) -> Result<CellValue, ExcelError> {
    let v = f(coerce_num(&args[0])?);
    if v.abs() < EPSILON_NEAR_ZERO {
        return Err(ExcelError::new_div());
    }
    Ok(CellValue::Number(1.0 / v))
}

#[derive(Debug)]
pub struct PiFn;
/// The constant π. Takes no arguments; any argument is an arity error.
impl Function for PiFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "PI"
    }
    fn min_args(&self) -> usize {
        0
    }
    fn eval(
        &self,
        _args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        Ok(CellValue::Number(std::f64::consts::PI))
    }
}

#[derive(Debug)]
pub struct RadiansFn;
impl Function for RadiansFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "RADIANS"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        unary(args, f64::to_radians)
    }
}

#[derive(Debug)]
pub struct DegreesFn;
impl Function for DegreesFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "DEGREES"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        unary(args, f64::to_degrees)
    }
}

#[derive(Debug)]
pub struct SinFn;
impl Function for SinFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "SIN"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        unary(args, f64::sin)
    }
}

#[derive(Debug)]
pub struct CosFn;
impl Function for CosFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "COS"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        unary(args, f64::cos)
    }
}

#[derive(Debug)]
pub struct TanFn;
impl Function for TanFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "TAN"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        unary(args, f64::tan)
    }
}

#[derive(Debug)]
pub struct AsinFn;
/// Inverse sine; the argument must lie in [-1, 1].
impl Function for AsinFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "ASIN"
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
        if !(-1.0..=1.0).contains(&n) {
            return Err(ExcelError::new_num());
        }
        Ok(CellValue::Number(n.asin()))
    }
}

#[derive(Debug)]
pub struct AcosFn;
/// Inverse cosine; the argument must lie in [-1, 1].
impl Function for AcosFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "ACOS"
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
        if !(-1.0..=1.0).contains(&n) {
            return Err(ExcelError::new_num());
        }
        Ok(CellValue::Number(n.acos()))
    }
}

#[derive(Debug)]
pub struct AtanFn;
impl Function for AtanFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "ATAN"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        unary(args, f64::atan)
    }
}

#[derive(Debug)]
pub struct Atan2Fn;
/// Signed angle of the point (x, y) in (−π, π]. Excel's argument order
/// is (x_num, y_num). The origin is `#DIV/0!`.
impl Function for Atan2Fn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "ATAN2"
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
        let y = coerce_num(&args[1])?;
        if x == 0.0 && y == 0.0 {
            return Err(ExcelError::new_div());
        }
        Ok(CellValue::Number(y.atan2(x)))
    }
}

#[derive(Debug)]
pub struct SinhFn;
impl Function for SinhFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "SINH"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        unary(args, f64::sinh)
    }
}

#[derive(Debug)]
pub struct CoshFn;
impl Function for CoshFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "COSH"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        unary(args, f64::cosh)
    }
}

#[derive(Debug)]
pub struct TanhFn;
impl Function for TanhFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "TANH"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        unary(args, f64::tanh)
    }
}

#[derive(Debug)]
pub struct AsinhFn;
impl Function for AsinhFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "ASINH"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        unary(args, f64::asinh)
    }
}

#[derive(Debug)]
pub struct AcoshFn;
/// Inverse hyperbolic cosine; requires x ≥ 1.
impl Function for AcoshFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "ACOSH"
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
        if n < 1.0 {
            return Err(ExcelError::new_num());
        }
        Ok(CellValue::Number(n.acosh()))
    }
}

#[derive(Debug)]
pub struct AtanhFn;
/// Inverse hyperbolic tangent; requires |x| < 1.
impl Function for AtanhFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "ATANH"
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
        if n.abs() >= 1.0 {
            return Err(ExcelError::new_num());
        }
        Ok(CellValue::Number(n.atanh()))
    }
}

#[derive(Debug)]
pub struct SecFn;
impl Function for SecFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "SEC"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        reciprocal(args, f64::cos)
    }
}

#[derive(Debug)]
pub struct CscFn;
impl Function for CscFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "CSC"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        reciprocal(args, f64::sin)
    }
}

#[derive(Debug)]
pub struct CotFn;
impl Function for CotFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "COT"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        reciprocal(args, f64::tan)
    }
}

#[derive(Debug)]
pub struct SechFn;
impl Function for SechFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "SECH"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        reciprocal(args, f64::cosh)
    }
}

#[derive(Debug)]
pub struct CschFn;
impl Function for CschFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "CSCH"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        reciprocal(args, f64::sinh)
    }
}

#[derive(Debug)]
pub struct CothFn;
impl Function for CothFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "COTH"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        reciprocal(args, f64::tanh)
    }
}

#[derive(Debug)]
pub struct AcotFn;
/// Inverse cotangent in (0, π); ACOT(0) is π/2.
impl Function for AcotFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "ACOT"
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
        Ok(CellValue::Number(std::f64::consts::FRAC_PI_2 - n.atan()))
    }
}

#[derive(Debug)]
pub struct AcothFn;
/// Inverse hyperbolic cotangent; requires |x| > 1.
impl Function for AcothFn {
    func_caps!(PURE, ELEMENTWISE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "ACOTH"
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
        if n.abs() <= 1.0 {
            return Err(ExcelError::new_num());
        }
        Ok(CellValue::Number((1.0 / n).atanh()))
    }
}

pub fn register_builtins() {
    crate::register_functions!(
        PiFn,
        RadiansFn,
        DegreesFn,
        SinFn,
        CosFn,
        TanFn,
        AsinFn,
        AcosFn,
        AtanFn,
        Atan2Fn,
        SinhFn,
        CoshFn,
        TanhFn,
        AsinhFn,
        AcoshFn,
        AtanhFn,
        SecFn,
        CscFn,
        CotFn,
        SechFn,
        CschFn,
        CothFn,
        AcotFn,
        AcothFn,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::StaticContext;
    use std::f64::consts::{FRAC_PI_2, PI};

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
    fn pi_rejects_arguments() {
        assert_eq!(PiFn.dispatch(&[], &ctx()), n(PI));
        assert_eq!(
            PiFn.dispatch(&[n(1.0)], &ctx()),
            CellValue::Error(ExcelError::new_value())
        );
    }

    #[test]
    fn inverse_domains() {
        assert_eq!(
            AsinFn.dispatch(&[n(1.5)], &ctx()),
            CellValue::Error(ExcelError::new_num())
        );
        assert_eq!(
            AcosFn.dispatch(&[n(-1.01)], &ctx()),
            CellValue::Error(ExcelError::new_num())
        );
        assert_eq!(
            AcoshFn.dispatch(&[n(0.5)], &ctx()),
            CellValue::Error(ExcelError::new_num())
        );
        assert_eq!(
            AtanhFn.dispatch(&[n(1.0)], &ctx()),
            CellValue::Error(ExcelError::new_num())
        );
        assert_eq!(
            AcothFn.dispatch(&[n(0.5)], &ctx()),
            CellValue::Error(ExcelError::new_num())
        );
    }

    #[test]
    fn reciprocals_guard_zero() {
        assert_eq!(
            CscFn.dispatch(&[n(0.0)], &ctx()),
            CellValue::Error(ExcelError::new_div())
        );
        assert_eq!(
            CotFn.dispatch(&[n(0.0)], &ctx()),
            CellValue::Error(ExcelError::new_div())
        );
        assert_eq!(
            SecFn.dispatch(&[n(FRAC_PI_2)], &ctx()),
            CellValue::Error(ExcelError::new_div())
        );
        assert!((num(SecFn.dispatch(&[n(0.0)], &ctx())) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn atan2_quadrants() {
        assert_eq!(
            Atan2Fn.dispatch(&[n(0.0), n(0.0)], &ctx()),
            CellValue::Error(ExcelError::new_div())
        );
        assert!((num(Atan2Fn.dispatch(&[n(1.0), n(1.0)], &ctx())) - PI / 4.0).abs() < 1e-12);
        assert!((num(Atan2Fn.dispatch(&[n(-1.0), n(0.0)], &ctx())) - PI).abs() < 1e-12);
    }

    #[test]
    fn angle_units_are_linear() {
        assert!((num(RadiansFn.dispatch(&[n(180.0)], &ctx())) - PI).abs() < 1e-12);
        assert!((num(DegreesFn.dispatch(&[n(PI)], &ctx())) - 180.0).abs() < 1e-12);
    }

    #[test]
    fn acot_branch() {
        assert!((num(AcotFn.dispatch(&[n(0.0)], &ctx())) - FRAC_PI_2).abs() < 1e-12);
        assert!((num(AcotFn.dispatch(&[n(1.0)], &ctx())) - PI / 4.0).abs() < 1e-12);
    }
}
