//! Bitwise functions over the 48-bit non-negative range: BITAND, BITOR,
//! BITXOR, BITLSHIFT, BITRSHIFT.

use super::super::utils::coerce_num;
use crate::args::first_error;
use crate::func_caps;
use crate::function::Function;
use crate::traits::FunctionContext;
use exceval_common::{CellValue, ExcelError};

/// Upper bound (exclusive) of the bitwise operand range: 2^48.
const BIT_LIMIT: i64 = 1 << 48;

/// Coerce to a bitwise operand: a non-negative integer below 2^48.
fn to_bitwise_int(v: &CellValue) -> Result<i64, ExcelError> {
    let n = coerce_num(v)?;
    if n < 0.0 || n.fract() != 0.0 {
        return Err(ExcelError::new_num());
    }
    let i = n as i64;
    if i >= BIT_LIMIT {
        return Err(ExcelError::new_num());
    }
    Ok(i)
}

fn binary_bit_op(
    args: &[CellValue],
    op: impl Fn(i64, i64) -> i64,
) -> Result<CellValue, ExcelError> {
    if let Some(e) = first_error(args) {
        return Err(e);
    }
    let a = to_bitwise_int(&args[0])?;
    let b = to_bitwise_int(&args[1])?;
    Ok(CellValue::Number(op(a, b) as f64))
}

#[derive(Debug)]
pub struct BitAndFn;
impl Function for BitAndFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "BITAND"
    }
    fn min_args(&self) -> usize {
        2
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        binary_bit_op(args, |a, b| a & b)
    }
}

#[derive(Debug)]
pub struct BitOrFn;
impl Function for BitOrFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "BITOR"
    }
    fn min_args(&self) -> usize {
        2
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        binary_bit_op(args, |a, b| a | b)
    }
}

#[derive(Debug)]
pub struct BitXorFn;
impl Function for BitXorFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "BITXOR"
    }
    fn min_args(&self) -> usize {
        2
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        binary_bit_op(args, |a, b| a ^ b)
    }
}

/// Shared shift core: positive amounts shift the named direction,
/// negative amounts shift the other way. A result ≥ 2^48 or a shift
/// magnitude over 53 is `#NUM!`.
fn shift(value: i64, amount: i64, left: bool) -> Result<i64, ExcelError> {
    if amount.abs() > 53 {
        return Err(ExcelError::new_num());
    }
    let (magnitude, go_left) = if amount >= 0 {
        (amount as u32, left)
    } else {
        ((-amount) as u32, !left)
    };
    if go_left {
        let shifted = value.checked_shl(magnitude).ok_or_else(ExcelError::new_num)?;
        if shifted >= BIT_LIMIT {
            return Err(ExcelError::new_num());
        }
        Ok(shifted)
    } else {
        Ok(if magnitude >= 63 { 0 } else { value >> magnitude })
    }
}

#[derive(Debug)]
pub struct BitLShiftFn;
/// Shifts left by `shift_amount`; a negative amount shifts right.
impl Function for BitLShiftFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "BITLSHIFT"
    }
    fn min_args(&self) -> usize {
        2
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        if let Some(e) = first_error(args) {
            return Err(e);
        }
        let n = to_bitwise_int(&args[0])?;
        let amount = coerce_num(&args[1])?.trunc() as i64;
        Ok(CellValue::Number(shift(n, amount, true)? as f64))
    }
}

#[derive(Debug)]
pub struct BitRShiftFn;
/// Shifts right by `shift_amount`; a negative amount shifts left.
impl Function for BitRShiftFn {
    func_caps!(PURE, NUMERIC_ONLY);
    fn name(&self) -> &'static str {
        "BITRSHIFT"
    }
    fn min_args(&self) -> usize {
        2
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        if let Some(e) = first_error(args) {
            return Err(e);
        }
        let n = to_bitwise_int(&args[0])?;
        let amount = coerce_num(&args[1])?.trunc() as i64;
        Ok(CellValue::Number(shift(n, amount, false)? as f64))
    }
}

pub fn register_builtins() {
    crate::register_functions!(BitAndFn, BitOrFn, BitXorFn, BitLShiftFn, BitRShiftFn);
}
