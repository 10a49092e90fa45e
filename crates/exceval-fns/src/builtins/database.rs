//! Database functions (D-functions): criteria-filtered aggregation over
//! a single field column.
//!
//! With flattened arguments the field column arrives as the leading
//! values and the criterion is the trailing argument, the same grammar
//! SUMIF/COUNTIF/AVERAGEIF use; the criteria mini-language is shared
//! through `crate::args::parse_criteria`.

use crate::args::{criteria_match, first_error, parse_criteria};
use crate::func_caps;
use crate::function::Function;
use crate::traits::FunctionContext;
use exceval_common::{CellValue, ExcelError};

/// Aggregation operation type for database functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DAggregate {
    Sum,
    Average,
    Count,
    CountA,
    Max,
    Min,
    Product,
    Get,
}

fn eval_database(args: &[CellValue], agg: DAggregate) -> Result<CellValue, ExcelError> {
    let (column, criteria) = args.split_at(args.len() - 1);
    if let Some(e) = first_error(column) {
        return Err(e);
    }
    let pred = parse_criteria(&criteria[0])?;

    let mut matched: Vec<&CellValue> = Vec::new();
    for v in column {
        if criteria_match(&pred, v) {
            matched.push(v);
        }
    }

    match agg {
        DAggregate::Count => {
            let count = matched.iter().filter(|v| v.is_number()).count();
            Ok(CellValue::Number(count as f64))
        }
        DAggregate::CountA => {
            let count = matched.iter().filter(|v| !v.is_empty()).count();
            Ok(CellValue::Number(count as f64))
        }
        DAggregate::Get => {
            let mut values = matched.iter().filter(|v| !v.is_empty());
            match (values.next(), values.next()) {
                (Some(v), None) => Ok((*v).clone()),
                (None, _) => Err(ExcelError::new_value()),
                // More than one record satisfies the criteria.
                (Some(_), Some(_)) => Err(ExcelError::new_num()),
            }
        }
        _ => {
            let numbers: Vec<f64> = matched
                .iter()
                .filter_map(|v| match v {
                    CellValue::Number(n) => Some(*n),
                    _ => None,
                })
                .collect();
            match agg {
                DAggregate::Sum => Ok(CellValue::Number(numbers.iter().sum())),
                DAggregate::Product => Ok(CellValue::Number(if numbers.is_empty() {
                    0.0
                } else {
                    numbers.iter().product()
                })),
                DAggregate::Average => {
                    if numbers.is_empty() {
                        Err(ExcelError::new_div())
                    } else {
                        Ok(CellValue::Number(
                            numbers.iter().sum::<f64>() / numbers.len() as f64,
                        ))
                    }
                }
                DAggregate::Max => {
                    if numbers.is_empty() {
                        Ok(CellValue::Number(0.0))
                    } else {
                        Ok(CellValue::Number(
                            numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                        ))
                    }
                }
                DAggregate::Min => {
                    if numbers.is_empty() {
                        Ok(CellValue::Number(0.0))
                    } else {
                        Ok(CellValue::Number(
                            numbers.iter().copied().fold(f64::INFINITY, f64::min),
                        ))
                    }
                }
                _ => unreachable!("handled above"),
            }
        }
    }
}

macro_rules! database_fn {
    ($struct_name:ident, $fn_name:literal, $agg:expr) => {
        #[derive(Debug)]
        pub struct $struct_name;
        impl Function for $struct_name {
            func_caps!(PURE, REDUCTION);
            fn name(&self) -> &'static str {
                $fn_name
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
                eval_database(args, $agg)
            }
        }
    };
}

database_fn!(DSumFn, "DSUM", DAggregate::Sum);
database_fn!(DAverageFn, "DAVERAGE", DAggregate::Average);
database_fn!(DCountFn, "DCOUNT", DAggregate::Count);
database_fn!(DCountAFn, "DCOUNTA", DAggregate::CountA);
database_fn!(DMaxFn, "DMAX", DAggregate::Max);
database_fn!(DMinFn, "DMIN", DAggregate::Min);
database_fn!(DProductFn, "DPRODUCT", DAggregate::Product);
database_fn!(DGetFn, "DGET", DAggregate::Get);

pub fn register_builtins() {
    crate::register_functions!(
        DSumFn, DAverageFn, DCountFn, DCountAFn, DMaxFn, DMinFn, DProductFn, DGetFn,
    );
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
    fn dsum_and_daverage_filter() {
        let args = vec![n(10.0), n(20.0), n(30.0), t(">=20")];
        assert_eq!(DSumFn.dispatch(&args, &ctx()), n(50.0));
        assert_eq!(DAverageFn.dispatch(&args, &ctx()), n(25.0));
    }

    #[test]
    fn dcount_variants() {
        let args = vec![n(10.0), t("x"), n(30.0), CellValue::Empty, t("*")];
        // DCOUNT sees only numbers among the matches; the wildcard
        // criterion matches text only, so nothing numeric survives.
        assert_eq!(DCountFn.dispatch(&args, &ctx()), n(0.0));
        assert_eq!(DCountAFn.dispatch(&args, &ctx()), n(1.0));
        let args = vec![n(10.0), n(20.0), n(5.0), t(">6")];
        assert_eq!(DCountFn.dispatch(&args, &ctx()), n(2.0));
    }

    #[test]
    fn dmax_dmin() {
        let args = vec![n(10.0), n(20.0), n(30.0), t("<25")];
        assert_eq!(DMaxFn.dispatch(&args, &ctx()), n(20.0));
        assert_eq!(DMinFn.dispatch(&args, &ctx()), n(10.0));
        // Nothing matching falls back to 0, like MAX of nothing.
        let args = vec![n(10.0), t(">100")];
        assert_eq!(DMaxFn.dispatch(&args, &ctx()), n(0.0));
    }

    #[test]
    fn dget_uniqueness() {
        let args = vec![n(10.0), n(20.0), n(30.0), t("20")];
        assert_eq!(DGetFn.dispatch(&args, &ctx()), n(20.0));
        let args = vec![n(10.0), n(20.0), n(30.0), t(">100")];
        assert_eq!(
            DGetFn.dispatch(&args, &ctx()),
            CellValue::Error(ExcelError::new_value())
        );
        let args = vec![n(20.0), n(20.0), t("20")];
        assert_eq!(
            DGetFn.dispatch(&args, &ctx()),
            CellValue::Error(ExcelError::new_num())
        );
    }

    #[test]
    fn daverage_empty_match_is_div0() {
        let args = vec![n(10.0), t(">100")];
        assert_eq!(
            DAverageFn.dispatch(&args, &ctx()),
            CellValue::Error(ExcelError::new_div())
        );
    }
}
