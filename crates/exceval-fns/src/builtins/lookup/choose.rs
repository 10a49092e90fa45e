//! CHOOSE: 1-based selection from the argument tail.

use crate::func_caps;
use crate::function::Function;
use crate::traits::FunctionContext;
use exceval_common::{CellValue, ExcelError};

/// Picks the index-th value (1-based, fractional indices truncate).
/// An index below 1, past the value count, or non-numeric is `#VALUE!`.
#[derive(Debug)]
pub struct ChooseFn;
impl Function for ChooseFn {
    func_caps!(PURE, LOOKUP);
    fn name(&self) -> &'static str {
        "CHOOSE"
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
        // The index argument leads; its own error propagates ahead of
        // the selection.
        let index = match &args[0] {
            CellValue::Error(e) => return Err(e.clone()),
            CellValue::Number(x) => x.trunc() as i64,
            _ => return Err(ExcelError::new_value()),
        };
        let values = &args[1..];
        if index < 1 || index as usize > values.len() {
            return Err(ExcelError::new_value());
        }
        match &values[index as usize - 1] {
            CellValue::Error(e) => Err(e.clone()),
            v => Ok(v.clone()),
        }
    }
}

pub fn register_builtins() {
    crate::register_functions!(ChooseFn);
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

    #[test]
    fn choose_selects_one_based() {
        let args = vec![n(2.0), t("a"), t("b"), t("c")];
        assert_eq!(ChooseFn.dispatch(&args, &ctx()), t("b"));
        // Fractional index truncates.
        let args = vec![n(2.9), t("a"), t("b"), t("c")];
        assert_eq!(ChooseFn.dispatch(&args, &ctx()), t("b"));
    }

    #[test]
    fn choose_rejects_bad_indices() {
        for index in [n(0.0), n(4.0), t("x"), CellValue::Boolean(true)] {
            let args = vec![index, t("a"), t("b"), t("c")];
            assert_eq!(
                ChooseFn.dispatch(&args, &ctx()),
                CellValue::Error(ExcelError::new_value())
            );
        }
    }
}
