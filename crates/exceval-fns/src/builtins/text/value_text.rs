//! VALUE: the strict text-to-number coercion exposed as a function.

use crate::coercion::to_number_lenient;
use crate::func_caps;
use crate::function::Function;
use crate::traits::FunctionContext;
use exceval_common::{CellValue, ExcelError};

#[derive(Debug)]
pub struct ValueFn;
/// Parses numeric text through the standard coercion lattice; anything
/// unparseable is `#VALUE!`. A trailing `%` divides by 100.
impl Function for ValueFn {
    func_caps!(PURE, ELEMENTWISE);
    fn name(&self) -> &'static str {
        "VALUE"
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
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if let Some(body) = trimmed.strip_suffix('%') {
                    let n = to_number_lenient(&CellValue::text(body))?;
                    return Ok(CellValue::Number(n / 100.0));
                }
                Ok(CellValue::Number(to_number_lenient(&args[0])?))
            }
            other => Ok(CellValue::Number(to_number_lenient(other)?)),
        }
    }
}

#[derive(Debug)]
pub struct PhoneticFn;
/// Furigana extraction needs workbook phonetic runs, which live outside
/// the function core; the fallback is the display text itself.
impl Function for PhoneticFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "PHONETIC"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        Ok(CellValue::Text(crate::coercion::to_text(&args[0])?))
    }
}

pub fn register_builtins() {
    crate::register_functions!(ValueFn, PhoneticFn);
    // Legacy spelling of CONCAT.
    crate::function_registry::register_alias("CONCATENATE", "CONCAT");
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
    fn value_parses_numeric_text() {
        assert_eq!(ValueFn.dispatch(&[t(" 12.5 ")], &ctx()), n(12.5));
        assert_eq!(ValueFn.dispatch(&[t("40%")], &ctx()), n(0.4));
        assert_eq!(ValueFn.dispatch(&[n(7.0)], &ctx()), n(7.0));
        assert_eq!(
            ValueFn.dispatch(&[t("12x")], &ctx()),
            CellValue::Error(ExcelError::new_value())
        );
    }
}
