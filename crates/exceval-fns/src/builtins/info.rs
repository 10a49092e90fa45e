//! Type predicates and error trapping: the IS* family, IFERROR/IFNA,
//! N and NA.
//!
//! Unlike the rest of the library, the predicates *inspect* Error
//! arguments rather than propagating them; that is their entire point.

use crate::func_caps;
use crate::function::Function;
use crate::traits::FunctionContext;
use exceval_common::{CellValue, ExcelError, ExcelErrorKind};

#[derive(Debug)]
pub struct IsBlankFn;
/// TRUE only for an absent cell; empty text is not blank.
impl Function for IsBlankFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "ISBLANK"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        Ok(CellValue::Boolean(args[0].is_empty()))
    }
}

#[derive(Debug)]
pub struct IsNumberFn;
impl Function for IsNumberFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "ISNUMBER"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        Ok(CellValue::Boolean(args[0].is_number()))
    }
}

#[derive(Debug)]
pub struct IsTextFn;
impl Function for IsTextFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "ISTEXT"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        Ok(CellValue::Boolean(args[0].is_text()))
    }
}

#[derive(Debug)]
pub struct IsNonTextFn;
impl Function for IsNonTextFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "ISNONTEXT"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        Ok(CellValue::Boolean(!args[0].is_text()))
    }
}

#[derive(Debug)]
pub struct IsLogicalFn;
impl Function for IsLogicalFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "ISLOGICAL"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        Ok(CellValue::Boolean(args[0].is_boolean()))
    }
}

#[derive(Debug)]
pub struct IsErrorFn;
/// TRUE for any of the seven error kinds.
impl Function for IsErrorFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "ISERROR"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        Ok(CellValue::Boolean(args[0].is_error()))
    }
}

#[derive(Debug)]
pub struct IsErrFn;
/// TRUE for every error kind except `#N/A`.
impl Function for IsErrFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "ISERR"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let hit = matches!(&args[0], CellValue::Error(e) if e.kind != ExcelErrorKind::Na);
        Ok(CellValue::Boolean(hit))
    }
}

#[derive(Debug)]
pub struct IsNaFn;
/// TRUE only for `#N/A`.
impl Function for IsNaFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "ISNA"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let hit = matches!(&args[0], CellValue::Error(e) if e.kind == ExcelErrorKind::Na);
        Ok(CellValue::Boolean(hit))
    }
}

#[derive(Debug)]
pub struct IfErrorFn;
/// The first argument unless it is an error (any kind, `#N/A`
/// included), in which case the fallback.
impl Function for IfErrorFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "IFERROR"
    }
    fn min_args(&self) -> usize {
        2
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        match &args[0] {
            CellValue::Error(_) => Ok(args[1].clone()),
            v => Ok(v.clone()),
        }
    }
}

#[derive(Debug)]
pub struct IfNaFn;
/// Substitutes the fallback only for `#N/A`; other errors pass through.
impl Function for IfNaFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "IFNA"
    }
    fn min_args(&self) -> usize {
        2
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        match &args[0] {
            CellValue::Error(e) if e.kind == ExcelErrorKind::Na => Ok(args[1].clone()),
            v => Ok(v.clone()),
        }
    }
}

#[derive(Debug)]
pub struct NFn;
/// Numeric rendition: numbers pass through, TRUE is 1, everything else
/// is 0; errors propagate.
impl Function for NFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "N"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        match &args[0] {
            CellValue::Error(e) => Err(e.clone()),
            CellValue::Number(n) => Ok(CellValue::Number(*n)),
            CellValue::Boolean(b) => Ok(CellValue::Number(if *b { 1.0 } else { 0.0 })),
            _ => Ok(CellValue::Number(0.0)),
        }
    }
}

#[derive(Debug)]
pub struct IsEvenFn;
/// TRUE when the truncated numeric argument is even.
impl Function for IsEvenFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "ISEVEN"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let n = crate::coercion::to_number_lenient(&args[0])?.trunc() as i64;
        Ok(CellValue::Boolean(n % 2 == 0))
    }
}

#[derive(Debug)]
pub struct IsOddFn;
/// TRUE when the truncated numeric argument is odd.
impl Function for IsOddFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "ISODD"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let n = crate::coercion::to_number_lenient(&args[0])?.trunc() as i64;
        Ok(CellValue::Boolean(n % 2 != 0))
    }
}

#[derive(Debug)]
pub struct NaFn;
/// The `#N/A` error as a value.
impl Function for NaFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "NA"
    }
    fn min_args(&self) -> usize {
        0
    }
    fn eval(
        &self,
        _args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        Err(ExcelError::new_na())
    }
}

pub fn register_builtins() {
    crate::register_functions!(
        IsBlankFn,
        IsNumberFn,
        IsTextFn,
        IsNonTextFn,
        IsLogicalFn,
        IsErrorFn,
        IsErrFn,
        IsNaFn,
        IfErrorFn,
        IfNaFn,
        IsEvenFn,
        IsOddFn,
        NFn,
        NaFn,
    );
}
