//! Radix conversions between binary, octal, decimal and hexadecimal.
//!
//! Digit strings are signed two's-complement over a 10-digit window: a
//! full-width value whose leading digit has the sign bit set is
//! negative. Outputs are upper-case with no prefix; negative values
//! always print the full 10-digit window.

use super::super::utils::coerce_num;
use crate::args::first_error;
use crate::func_caps;
use crate::function::Function;
use crate::traits::FunctionContext;
use exceval_common::{CellValue, ExcelError};

const WINDOW: u32 = 10;

/// Inclusive decimal range representable in the 10-digit window of a
/// base: [−base^10/2, base^10/2 − 1].
fn range_of(base: i64) -> (i64, i64) {
    let window = base.pow(WINDOW);
    (-window / 2, window / 2 - 1)
}

/// Coerce a conversion operand to its digit string. Numbers take their
/// integer rendition so `BIN2DEC(101)` behaves like `BIN2DEC("101")`.
fn coerce_base_text(v: &CellValue) -> Result<String, ExcelError> {
    match v {
        CellValue::Text(s) => Ok(s.trim().to_string()),
        CellValue::Number(n) => Ok(format!("{}", n.trunc() as i64)),
        CellValue::Error(e) => Err(e.clone()),
        _ => Err(ExcelError::new_value()),
    }
}

/// Parse a digit string as signed two's complement over the 10-digit
/// window. Overlong input or an invalid digit is `#NUM!`.
fn parse_in_base(text: &str, base: i64) -> Result<i64, ExcelError> {
    if text.is_empty() || text.len() > WINDOW as usize {
        return Err(ExcelError::new_num());
    }
    let value = i64::from_str_radix(text, base as u32).map_err(|_| ExcelError::new_num())?;
    if value < 0 {
        // from_str_radix accepted a sign character; Excel does not.
        return Err(ExcelError::new_num());
    }
    let window = base.pow(WINDOW);
    if text.len() == WINDOW as usize && value >= window / 2 {
        Ok(value - window)
    } else {
        Ok(value)
    }
}

fn format_digits(value: i64, base: i64) -> String {
    let digits = match base {
        2 => format!("{value:b}"),
        8 => format!("{value:o}"),
        16 => format!("{value:X}"),
        _ => unreachable!("unsupported radix"),
    };
    digits
}

/// Render a decimal value in the target base, two's complement for
/// negatives, optional zero-padding for non-negatives.
fn format_in_base(value: i64, base: i64, places: Option<i64>) -> Result<String, ExcelError> {
    let (lo, hi) = range_of(base);
    if value < lo || value > hi {
        return Err(ExcelError::new_num());
    }
    if value < 0 {
        // Negative values fill the whole window; places is ignored.
        return Ok(format_digits(base.pow(WINDOW) + value, base));
    }
    let digits = format_digits(value, base);
    match places {
        None => Ok(digits),
        Some(p) => {
            if p < digits.len() as i64 || p > WINDOW as i64 {
                return Err(ExcelError::new_num());
            }
            Ok(format!("{:0>width$}", digits, width = p as usize))
        }
    }
}

fn places_arg(args: &[CellValue], idx: usize) -> Result<Option<i64>, ExcelError> {
    match args.get(idx) {
        None | Some(CellValue::Empty) => Ok(None),
        Some(v) => {
            let p = coerce_num(v)?.trunc() as i64;
            if p < 1 {
                return Err(ExcelError::new_num());
            }
            Ok(Some(p))
        }
    }
}

/// One conversion endpoint: source radix → decimal Number, or source
/// radix → target radix Text.
fn convert_base(
    args: &[CellValue],
    from: i64,
    to: Option<i64>,
) -> Result<CellValue, ExcelError> {
    if let Some(e) = first_error(args) {
        return Err(e);
    }
    let value = if from == 10 {
        coerce_num(&args[0])?.trunc() as i64
    } else {
        parse_in_base(&coerce_base_text(&args[0])?, from)?
    };
    match to {
        None => Ok(CellValue::Number(value as f64)),
        Some(base) => {
            let places = places_arg(args, 1)?;
            Ok(CellValue::Text(format_in_base(value, base, places)?))
        }
    }
}

macro_rules! base_conversion_fn {
    ($struct_name:ident, $fn_name:literal, $from:expr, $to:expr, $max:expr) => {
        #[derive(Debug)]
        pub struct $struct_name;
        impl Function for $struct_name {
            func_caps!(PURE);
            fn name(&self) -> &'static str {
                $fn_name
            }
            fn min_args(&self) -> usize {
                1
            }
            fn max_args(&self) -> Option<usize> {
                Some($max)
            }
            fn eval(
                &self,
                args: &[CellValue],
                _ctx: &dyn FunctionContext,
            ) -> Result<CellValue, ExcelError> {
                convert_base(args, $from, $to)
            }
        }
    };
}

base_conversion_fn!(Bin2DecFn, "BIN2DEC", 2, None, 1);
base_conversion_fn!(Bin2OctFn, "BIN2OCT", 2, Some(8), 2);
base_conversion_fn!(Bin2HexFn, "BIN2HEX", 2, Some(16), 2);
base_conversion_fn!(Oct2BinFn, "OCT2BIN", 8, Some(2), 2);
base_conversion_fn!(Oct2DecFn, "OCT2DEC", 8, None, 1);
base_conversion_fn!(Oct2HexFn, "OCT2HEX", 8, Some(16), 2);
base_conversion_fn!(Dec2BinFn, "DEC2BIN", 10, Some(2), 2);
base_conversion_fn!(Dec2OctFn, "DEC2OCT", 10, Some(8), 2);
base_conversion_fn!(Dec2HexFn, "DEC2HEX", 10, Some(16), 2);
base_conversion_fn!(Hex2BinFn, "HEX2BIN", 16, Some(2), 2);
base_conversion_fn!(Hex2OctFn, "HEX2OCT", 16, Some(8), 2);
base_conversion_fn!(Hex2DecFn, "HEX2DEC", 16, None, 1);

pub fn register_builtins() {
    crate::register_functions!(
        Bin2DecFn, Bin2OctFn, Bin2HexFn, Oct2BinFn, Oct2DecFn, Oct2HexFn, Dec2BinFn, Dec2OctFn,
        Dec2HexFn, Hex2BinFn, Hex2OctFn, Hex2DecFn,
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
    fn bin2dec_twos_complement() {
        assert_eq!(Bin2DecFn.dispatch(&[t("101010")], &ctx()), n(42.0));
        assert_eq!(Bin2DecFn.dispatch(&[t("1111111111")], &ctx()), n(-1.0));
        assert_eq!(Bin2DecFn.dispatch(&[t("1000000000")], &ctx()), n(-512.0));
        assert_eq!(Bin2DecFn.dispatch(&[n(101.0)], &ctx()), n(5.0));
    }

    #[test]
    fn bin2dec_rejects_invalid() {
        assert_eq!(
            Bin2DecFn.dispatch(&[t("102")], &ctx()),
            CellValue::Error(ExcelError::new_num())
        );
        assert_eq!(
            Bin2DecFn.dispatch(&[t("10101010101")], &ctx()),
            CellValue::Error(ExcelError::new_num())
        );
    }

    #[test]
    fn dec2bin_range_and_padding() {
        assert_eq!(Dec2BinFn.dispatch(&[n(42.0)], &ctx()), t("101010"));
        assert_eq!(Dec2BinFn.dispatch(&[n(-1.0)], &ctx()), t("1111111111"));
        assert_eq!(Dec2BinFn.dispatch(&[n(5.0), n(8.0)], &ctx()), t("00000101"));
        assert_eq!(
            Dec2BinFn.dispatch(&[n(512.0)], &ctx()),
            CellValue::Error(ExcelError::new_num())
        );
        assert_eq!(
            Dec2BinFn.dispatch(&[n(-513.0)], &ctx()),
            CellValue::Error(ExcelError::new_num())
        );
        // places smaller than the needed width
        assert_eq!(
            Dec2BinFn.dispatch(&[n(42.0), n(3.0)], &ctx()),
            CellValue::Error(ExcelError::new_num())
        );
    }

    #[test]
    fn hex_seed_scenarios() {
        assert_eq!(Dec2HexFn.dispatch(&[n(-1.0)], &ctx()), t("FFFFFFFFFF"));
        assert_eq!(Hex2DecFn.dispatch(&[t("FF")], &ctx()), n(255.0));
        assert_eq!(Hex2DecFn.dispatch(&[t("FFFFFFFFFF")], &ctx()), n(-1.0));
        assert_eq!(Dec2HexFn.dispatch(&[n(255.0)], &ctx()), t("FF"));
        assert_eq!(Dec2HexFn.dispatch(&[n(255.0), n(4.0)], &ctx()), t("00FF"));
    }

    #[test]
    fn oct_window() {
        assert_eq!(Oct2DecFn.dispatch(&[t("7777777777")], &ctx()), n(-1.0));
        assert_eq!(Dec2OctFn.dispatch(&[n(8.0)], &ctx()), t("10"));
        let max = (1i64 << 29) - 1;
        assert_eq!(
            Dec2OctFn.dispatch(&[n(max as f64)], &ctx()),
            t("3777777777")
        );
        assert_eq!(
            Dec2OctFn.dispatch(&[n((max + 1) as f64)], &ctx()),
            CellValue::Error(ExcelError::new_num())
        );
    }

    #[test]
    fn cross_base_round_trips() {
        assert_eq!(Bin2HexFn.dispatch(&[t("1111111111")], &ctx()), t("FFFFFFFFFF"));
        assert_eq!(Hex2BinFn.dispatch(&[t("FFFFFFFFFF")], &ctx()), t("1111111111"));
        assert_eq!(Bin2OctFn.dispatch(&[t("101010")], &ctx()), t("52"));
        assert_eq!(Oct2BinFn.dispatch(&[t("52")], &ctx()), t("101010"));
        assert_eq!(Oct2HexFn.dispatch(&[t("52")], &ctx()), t("2A"));
        assert_eq!(Hex2OctFn.dispatch(&[t("2A")], &ctx()), t("52"));
    }

    #[test]
    fn hex2bin_out_of_bin_window() {
        // 0x200 = 512 exceeds the binary window
        assert_eq!(
            Hex2BinFn.dispatch(&[t("200")], &ctx()),
            CellValue::Error(ExcelError::new_num())
        );
    }
}
