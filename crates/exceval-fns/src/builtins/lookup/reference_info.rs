//! Workbook-scope placeholders: SHEET, SHEETS, ISFORMULA, FORMULATEXT,
//! GETPIVOTDATA.
//!
//! These accept their arity and propagate errors; with no `SheetScope`
//! capability on the context they return the stub defaults `1`, `1`,
//! `FALSE`, `#N/A` and `#REF!` respectively.

use crate::args::first_error;
use crate::func_caps;
use crate::function::Function;
use crate::traits::FunctionContext;
use exceval_common::{CellValue, ExcelError};

#[derive(Debug)]
pub struct SheetFn;
/// 1-based ordinal of the current sheet; 1 without a workbook scope.
impl Function for SheetFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "SHEET"
    }
    fn min_args(&self) -> usize {
        0
    }
    fn max_args(&self) -> Option<usize> {
        Some(1)
    }
    fn eval(
        &self,
        args: &[CellValue],
        ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        if let Some(e) = first_error(args) {
            return Err(e);
        }
        let ordinal = ctx.sheet_scope().map(|s| s.sheet_ordinal()).unwrap_or(1);
        Ok(CellValue::Number(ordinal as f64))
    }
}

#[derive(Debug)]
pub struct SheetsFn;
/// Number of sheets in scope; 1 without a workbook scope.
impl Function for SheetsFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "SHEETS"
    }
    fn min_args(&self) -> usize {
        0
    }
    fn max_args(&self) -> Option<usize> {
        Some(1)
    }
    fn eval(
        &self,
        args: &[CellValue],
        ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        if let Some(e) = first_error(args) {
            return Err(e);
        }
        let count = ctx.sheet_scope().map(|s| s.sheet_count()).unwrap_or(1);
        Ok(CellValue::Number(count as f64))
    }
}

#[derive(Debug)]
pub struct IsFormulaFn;
impl Function for IsFormulaFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "ISFORMULA"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        if let Some(e) = first_error(args) {
            return Err(e);
        }
        let has_formula = ctx
            .sheet_scope()
            .map(|s| s.cell_has_formula())
            .unwrap_or(false);
        Ok(CellValue::Boolean(has_formula))
    }
}

#[derive(Debug)]
pub struct FormulaTextFn;
impl Function for FormulaTextFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "FORMULATEXT"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        if let Some(e) = first_error(args) {
            return Err(e);
        }
        match ctx.sheet_scope().and_then(|s| s.formula_text()) {
            Some(text) => Ok(CellValue::Text(text)),
            None => Err(ExcelError::new_na()),
        }
    }
}

#[derive(Debug)]
pub struct GetPivotDataFn;
/// Pivot materialization lives outside the function core; the stub
/// always reports a broken reference.
impl Function for GetPivotDataFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "GETPIVOTDATA"
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
        Err(ExcelError::new_ref())
    }
}

pub fn register_builtins() {
    crate::register_functions!(SheetFn, SheetsFn, IsFormulaFn, FormulaTextFn, GetPivotDataFn);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::StaticContext;

    fn ctx() -> StaticContext {
        StaticContext::default()
    }

    #[test]
    fn stub_defaults_without_scope() {
        assert_eq!(SheetFn.dispatch(&[], &ctx()), CellValue::Number(1.0));
        assert_eq!(SheetsFn.dispatch(&[], &ctx()), CellValue::Number(1.0));
        assert_eq!(
            IsFormulaFn.dispatch(&[CellValue::text("A1")], &ctx()),
            CellValue::Boolean(false)
        );
        assert_eq!(
            FormulaTextFn.dispatch(&[CellValue::text("A1")], &ctx()),
            CellValue::Error(ExcelError::new_na())
        );
        assert_eq!(
            GetPivotDataFn.dispatch(
                &[CellValue::text("Sales"), CellValue::text("A1")],
                &ctx()
            ),
            CellValue::Error(ExcelError::new_ref())
        );
    }

    #[test]
    fn stubs_still_propagate_errors() {
        assert_eq!(
            SheetFn.dispatch(&[CellValue::Error(ExcelError::new_div())], &ctx()),
            CellValue::Error(ExcelError::new_div())
        );
    }
}
