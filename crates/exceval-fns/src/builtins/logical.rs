//! Logical functions: IF, AND, OR, XOR, NOT, TRUE, FALSE.

use crate::coercion::to_logical;
use crate::func_caps;
use crate::function::Function;
use crate::traits::FunctionContext;
use exceval_common::{CellValue, ExcelError};

/// Fold the logical content of an argument slice the way AND/OR do:
/// Empty is skipped, everything else must coerce to a logical, errors
/// propagate in order. An all-skipped input is `#VALUE!`.
fn fold_logicals(
    args: &[CellValue],
    init: bool,
    f: impl Fn(bool, bool) -> bool,
) -> Result<bool, ExcelError> {
    let mut acc = init;
    let mut seen = false;
    for v in args {
        if v.is_empty() {
            continue;
        }
        acc = f(acc, to_logical(v)?);
        seen = true;
    }
    if !seen {
        return Err(ExcelError::new_value());
    }
    Ok(acc)
}

#[derive(Debug)]
pub struct IfFn;
/// Branches on the condition: the second argument when truthy, the
/// third (default FALSE) otherwise.
impl Function for IfFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "IF"
    }
    fn min_args(&self) -> usize {
        2
    }
    fn max_args(&self) -> Option<usize> {
        Some(3)
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let condition = to_logical(&args[0])?;
        if condition {
            Ok(args[1].clone())
        } else {
            Ok(args.get(2).cloned().unwrap_or(CellValue::Boolean(false)))
        }
    }
}

#[derive(Debug)]
pub struct AndFn;
impl Function for AndFn {
    func_caps!(PURE, REDUCTION);
    fn name(&self) -> &'static str {
        "AND"
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
        Ok(CellValue::Boolean(fold_logicals(args, true, |a, b| a && b)?))
    }
}

#[derive(Debug)]
pub struct OrFn;
impl Function for OrFn {
    func_caps!(PURE, REDUCTION);
    fn name(&self) -> &'static str {
        "OR"
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
        Ok(CellValue::Boolean(fold_logicals(args, false, |a, b| a || b)?))
    }
}

#[derive(Debug)]
pub struct XorFn;
/// Logical exclusive-or: TRUE when an odd number of arguments are
/// truthy.
impl Function for XorFn {
    func_caps!(PURE, REDUCTION);
    fn name(&self) -> &'static str {
        "XOR"
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
        Ok(CellValue::Boolean(fold_logicals(args, false, |a, b| a ^ b)?))
    }
}

#[derive(Debug)]
pub struct NotFn;
impl Function for NotFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "NOT"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        Ok(CellValue::Boolean(!to_logical(&args[0])?))
    }
}

#[derive(Debug)]
pub struct TrueFn;
impl Function for TrueFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "TRUE"
    }
    fn min_args(&self) -> usize {
        0
    }
    fn eval(
        &self,
        _args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        Ok(CellValue::Boolean(true))
    }
}

#[derive(Debug)]
pub struct FalseFn;
impl Function for FalseFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "FALSE"
    }
    fn min_args(&self) -> usize {
        0
    }
    fn eval(
        &self,
        _args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        Ok(CellValue::Boolean(false))
    }
}

pub fn register_builtins() {
    crate::register_functions!(IfFn, AndFn, OrFn, XorFn, NotFn, TrueFn, FalseFn);
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
    fn b(v: bool) -> CellValue {
        CellValue::Boolean(v)
    }
    fn ctx() -> StaticContext {
        StaticContext::default()
    }

    #[test]
    fn if_branches() {
        assert_eq!(IfFn.dispatch(&[b(true), t("yes"), t("no")], &ctx()), t("yes"));
        assert_eq!(IfFn.dispatch(&[n(0.0), t("yes"), t("no")], &ctx()), t("no"));
        // Omitted else-branch defaults to FALSE.
        assert_eq!(IfFn.dispatch(&[b(false), t("yes")], &ctx()), b(false));
        assert_eq!(
            IfFn.dispatch(&[t("maybe"), t("yes"), t("no")], &ctx()),
            CellValue::Error(ExcelError::new_value())
        );
    }

    #[test]
    fn and_or_xor() {
        assert_eq!(AndFn.dispatch(&[b(true), n(1.0)], &ctx()), b(true));
        assert_eq!(AndFn.dispatch(&[b(true), n(0.0)], &ctx()), b(false));
        assert_eq!(OrFn.dispatch(&[b(false), n(0.0)], &ctx()), b(false));
        assert_eq!(OrFn.dispatch(&[b(false), n(2.0)], &ctx()), b(true));
        assert_eq!(XorFn.dispatch(&[b(true), b(true), b(true)], &ctx()), b(true));
        assert_eq!(XorFn.dispatch(&[b(true), b(true)], &ctx()), b(false));
        // All-skipped input has nothing logical to fold.
        assert_eq!(
            AndFn.dispatch(&[CellValue::Empty], &ctx()),
            CellValue::Error(ExcelError::new_value())
        );
    }

    #[test]
    fn not_and_constants() {
        assert_eq!(NotFn.dispatch(&[b(false)], &ctx()), b(true));
        assert_eq!(TrueFn.dispatch(&[], &ctx()), b(true));
        assert_eq!(FalseFn.dispatch(&[], &ctx()), b(false));
    }

    #[test]
    fn errors_propagate_in_order() {
        assert_eq!(
            AndFn.dispatch(
                &[b(true), CellValue::Error(ExcelError::new_num())],
                &ctx()
            ),
            CellValue::Error(ExcelError::new_num())
        );
    }
}
