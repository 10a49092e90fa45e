//! Criteria-driven aggregation: SUMIF, COUNTIF, AVERAGEIF.
//!
//! With flattened arguments the grammar is `(range…, criteria)` — the
//! trailing argument is the criterion, everything before it the range.
//! Criteria parsing is shared with the lookup family via
//! `crate::args::parse_criteria`.

use crate::args::{criteria_match, first_error, parse_criteria};
use crate::func_caps;
use crate::function::Function;
use crate::traits::FunctionContext;
use exceval_common::{CellValue, ExcelError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AggregationType {
    Sum,
    Count,
    Average,
}

fn eval_if_family(
    args: &[CellValue],
    agg_type: AggregationType,
) -> Result<CellValue, ExcelError> {
    let (range, criteria) = args.split_at(args.len() - 1);
    if let Some(e) = first_error(range) {
        return Err(e);
    }
    let pred = parse_criteria(&criteria[0])?;

    let mut total = 0.0f64;
    let mut count = 0u64;
    for v in range {
        if !criteria_match(&pred, v) {
            continue;
        }
        match agg_type {
            AggregationType::Count => count += 1,
            AggregationType::Sum | AggregationType::Average => {
                // Only numeric cells contribute to the accumulation,
                // matching SUMIF over a mixed range.
                if let CellValue::Number(n) = v {
                    total += n;
                    count += 1;
                }
            }
        }
    }

    match agg_type {
        AggregationType::Sum => Ok(CellValue::Number(total)),
        AggregationType::Count => Ok(CellValue::Number(count as f64)),
        AggregationType::Average => {
            if count == 0 {
                Err(ExcelError::new_div())
            } else {
                Ok(CellValue::Number(total / count as f64))
            }
        }
    }
}

#[derive(Debug)]
pub struct SumIfFn;
/// Sums the range entries that satisfy the trailing criterion.
impl Function for SumIfFn {
    func_caps!(PURE, REDUCTION, STREAM_OK);
    fn name(&self) -> &'static str {
        "SUMIF"
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
        eval_if_family(args, AggregationType::Sum)
    }
}

#[derive(Debug)]
pub struct CountIfFn;
/// Counts the range entries that satisfy the trailing criterion.
impl Function for CountIfFn {
    func_caps!(PURE, REDUCTION, STREAM_OK);
    fn name(&self) -> &'static str {
        "COUNTIF"
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
        eval_if_family(args, AggregationType::Count)
    }
}

#[derive(Debug)]
pub struct AverageIfFn;
/// Averages the numeric range entries that satisfy the trailing
/// criterion; nothing matching is `#DIV/0!`.
impl Function for AverageIfFn {
    func_caps!(PURE, REDUCTION, STREAM_OK);
    fn name(&self) -> &'static str {
        "AVERAGEIF"
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
        eval_if_family(args, AggregationType::Average)
    }
}

pub fn register_builtins() {
    crate::register_functions!(SumIfFn, CountIfFn, AverageIfFn);
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
    fn sumif_numeric_threshold() {
        let args = vec![n(1.0), n(5.0), n(10.0), n(20.0), t(">=5")];
        assert_eq!(SumIfFn.dispatch(&args, &ctx()), n(35.0));
    }

    #[test]
    fn countif_wildcards() {
        let args = vec![t("Apple"), t("Banana"), t("Avocado"), t("a*")];
        assert_eq!(CountIfFn.dispatch(&args, &ctx()), n(2.0));
    }

    #[test]
    fn countif_equality_folds_case() {
        let args = vec![t("red"), t("RED"), t("blue"), t("red")];
        assert_eq!(CountIfFn.dispatch(&args, &ctx()), n(2.0));
    }

    #[test]
    fn averageif_no_match_is_div0() {
        let args = vec![n(1.0), n(2.0), t(">100")];
        assert_eq!(
            AverageIfFn.dispatch(&args, &ctx()),
            CellValue::Error(ExcelError::new_div())
        );
        let args = vec![n(2.0), n(4.0), n(100.0), t("<10")];
        assert_eq!(AverageIfFn.dispatch(&args, &ctx()), n(3.0));
    }

    #[test]
    fn range_error_propagates_before_aggregation() {
        let args = vec![
            n(1.0),
            CellValue::Error(ExcelError::new_ref()),
            t(">0"),
        ];
        assert_eq!(
            SumIfFn.dispatch(&args, &ctx()),
            CellValue::Error(ExcelError::new_ref())
        );
    }
}
