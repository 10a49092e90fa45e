//! Width folding between half-width and full-width forms: ASC and DBCS.
//!
//! The fold covers the full-width Latin/numeric/symbol block
//! (U+FF01..U+FF5E ↔ ASCII 0x21..0x7E) and the ideographic space
//! (U+3000 ↔ U+0020). Kana are passed through unchanged. The two
//! functions are mutual inverses over that domain.

use crate::coercion::to_text;
use crate::func_caps;
use crate::function::Function;
use crate::traits::FunctionContext;
use exceval_common::{CellValue, ExcelError};

const FULLWIDTH_BASE: u32 = 0xFF01;
const FULLWIDTH_END: u32 = 0xFF5E;
const ASCII_BASE: u32 = 0x21;
const IDEOGRAPHIC_SPACE: char = '\u{3000}';

fn to_half_width(c: char) -> char {
    let code = c as u32;
    if (FULLWIDTH_BASE..=FULLWIDTH_END).contains(&code) {
        return char::from_u32(code - FULLWIDTH_BASE + ASCII_BASE).unwrap_or(c);
    }
    if c == IDEOGRAPHIC_SPACE {
        return ' ';
    }
    c
}

fn to_full_width(c: char) -> char {
    let code = c as u32;
    if (ASCII_BASE..=0x7E).contains(&code) {
        return char::from_u32(code - ASCII_BASE + FULLWIDTH_BASE).unwrap_or(c);
    }
    if c == ' ' {
        return IDEOGRAPHIC_SPACE;
    }
    c
}

#[derive(Debug)]
pub struct AscFn;
/// Folds full-width Latin, digits, symbols and the ideographic space to
/// their half-width forms.
impl Function for AscFn {
    func_caps!(PURE, ELEMENTWISE);
    fn name(&self) -> &'static str {
        "ASC"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let text = to_text(&args[0])?;
        Ok(CellValue::Text(text.chars().map(to_half_width).collect()))
    }
}

#[derive(Debug)]
pub struct DbcsFn;
/// The inverse fold: half-width ASCII to full-width forms.
impl Function for DbcsFn {
    func_caps!(PURE, ELEMENTWISE);
    fn name(&self) -> &'static str {
        "DBCS"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let text = to_text(&args[0])?;
        Ok(CellValue::Text(text.chars().map(to_full_width).collect()))
    }
}

pub fn register_builtins() {
    crate::register_functions!(AscFn, DbcsFn);
    // JIS function is the historical name for the full-width fold.
    crate::function_registry::register_alias("JIS", "DBCS");
}
