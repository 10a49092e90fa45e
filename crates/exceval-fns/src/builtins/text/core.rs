//! Core text operations. Offsets and lengths count Unicode scalar
//! values, not bytes.

use crate::args::{first_error, opt_int_arg};
use crate::coercion::{to_logical, to_text};
use crate::func_caps;
use crate::function::Function;
use crate::traits::FunctionContext;
use exceval_common::{CellValue, ExcelError};

#[derive(Debug)]
pub struct LenFn;
/// Length of the textified argument in scalar values.
impl Function for LenFn {
    func_caps!(PURE, ELEMENTWISE);
    fn name(&self) -> &'static str {
        "LEN"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        Ok(CellValue::Number(to_text(&args[0])?.chars().count() as f64))
    }
}

#[derive(Debug)]
pub struct LeftFn;
/// Leading characters of the text (default 1). Negative counts are
/// `#VALUE!`.
impl Function for LeftFn {
    func_caps!(PURE, ELEMENTWISE);
    fn name(&self) -> &'static str {
        "LEFT"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn max_args(&self) -> Option<usize> {
        Some(2)
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        if let Some(e) = first_error(args) {
            return Err(e);
        }
        let text = to_text(&args[0])?;
        let count = opt_int_arg(args, 1, 1)?;
        if count < 0 {
            return Err(ExcelError::new_value());
        }
        Ok(CellValue::Text(text.chars().take(count as usize).collect()))
    }
}

#[derive(Debug)]
pub struct RightFn;
/// Trailing characters of the text (default 1).
impl Function for RightFn {
    func_caps!(PURE, ELEMENTWISE);
    fn name(&self) -> &'static str {
        "RIGHT"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn max_args(&self) -> Option<usize> {
        Some(2)
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        if let Some(e) = first_error(args) {
            return Err(e);
        }
        let text = to_text(&args[0])?;
        let count = opt_int_arg(args, 1, 1)?;
        if count < 0 {
            return Err(ExcelError::new_value());
        }
        let total = text.chars().count();
        let skip = total.saturating_sub(count as usize);
        Ok(CellValue::Text(text.chars().skip(skip).collect()))
    }
}

#[derive(Debug)]
pub struct MidFn;
/// Substring from a 1-based start. start < 1 or a negative length is
/// `#VALUE!`; a start past the end yields empty text.
impl Function for MidFn {
    func_caps!(PURE, ELEMENTWISE);
    fn name(&self) -> &'static str {
        "MID"
    }
    fn min_args(&self) -> usize {
        3
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        if let Some(e) = first_error(args) {
            return Err(e);
        }
        let text = to_text(&args[0])?;
        let start = crate::args::int_arg(args, 1)?;
        let len = crate::args::int_arg(args, 2)?;
        if start < 1 || len < 0 {
            return Err(ExcelError::new_value());
        }
        Ok(CellValue::Text(
            text.chars()
                .skip(start as usize - 1)
                .take(len as usize)
                .collect(),
        ))
    }
}

#[derive(Debug)]
pub struct TrimFn;
/// Strips leading/trailing spaces and collapses interior runs to a
/// single space, per Excel (ASCII space only).
impl Function for TrimFn {
    func_caps!(PURE, ELEMENTWISE);
    fn name(&self) -> &'static str {
        "TRIM"
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
        let collapsed = text
            .split(' ')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Ok(CellValue::Text(collapsed))
    }
}

#[derive(Debug)]
pub struct UpperFn;
impl Function for UpperFn {
    func_caps!(PURE, ELEMENTWISE);
    fn name(&self) -> &'static str {
        "UPPER"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        Ok(CellValue::Text(to_text(&args[0])?.to_uppercase()))
    }
}

#[derive(Debug)]
pub struct LowerFn;
impl Function for LowerFn {
    func_caps!(PURE, ELEMENTWISE);
    fn name(&self) -> &'static str {
        "LOWER"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        Ok(CellValue::Text(to_text(&args[0])?.to_lowercase()))
    }
}

#[derive(Debug)]
pub struct ReplaceFn;
/// Splices `new_text` over `len` characters starting at the 1-based
/// `start`. A start beyond the end appends.
impl Function for ReplaceFn {
    func_caps!(PURE, ELEMENTWISE);
    fn name(&self) -> &'static str {
        "REPLACE"
    }
    fn min_args(&self) -> usize {
        4
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        if let Some(e) = first_error(args) {
            return Err(e);
        }
        let text = to_text(&args[0])?;
        let start = crate::args::int_arg(args, 1)?;
        let len = crate::args::int_arg(args, 2)?;
        let new_text = to_text(&args[3])?;
        if start < 1 || len < 0 {
            return Err(ExcelError::new_value());
        }
        let chars: Vec<char> = text.chars().collect();
        let from = (start as usize - 1).min(chars.len());
        let to = (from + len as usize).min(chars.len());
        let mut out: String = chars[..from].iter().collect();
        out.push_str(&new_text);
        out.extend(&chars[to..]);
        Ok(CellValue::Text(out))
    }
}

#[derive(Debug)]
pub struct ReptFn;
/// Repeats text n times; n = 0 is empty, n < 0 is `#VALUE!`.
impl Function for ReptFn {
    func_caps!(PURE, ELEMENTWISE);
    fn name(&self) -> &'static str {
        "REPT"
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
        let text = to_text(&args[0])?;
        let count = crate::args::int_arg(args, 1)?;
        if count < 0 {
            return Err(ExcelError::new_value());
        }
        Ok(CellValue::Text(text.repeat(count as usize)))
    }
}

#[derive(Debug)]
pub struct ExactFn;
/// Case-sensitive binary equality, bypassing the ASCII fold other text
/// comparisons use.
impl Function for ExactFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "EXACT"
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
        let a = to_text(&args[0])?;
        let b = to_text(&args[1])?;
        Ok(CellValue::Boolean(a == b))
    }
}

#[derive(Debug)]
pub struct CharFn;
/// Character for a Latin-1 code in 1..=255.
impl Function for CharFn {
    func_caps!(PURE, ELEMENTWISE);
    fn name(&self) -> &'static str {
        "CHAR"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let code = crate::args::int_arg(args, 0)?;
        if !(1..=255).contains(&code) {
            return Err(ExcelError::new_value());
        }
        let c = char::from_u32(code as u32).ok_or_else(ExcelError::new_value)?;
        Ok(CellValue::Text(c.to_string()))
    }
}

#[derive(Debug)]
pub struct CodeFn;
/// Latin-1 code of the first character; empty text is `#VALUE!`.
impl Function for CodeFn {
    func_caps!(PURE, ELEMENTWISE);
    fn name(&self) -> &'static str {
        "CODE"
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
        let first = text.chars().next().ok_or_else(ExcelError::new_value)?;
        let code = first as u32;
        if code > 255 {
            return Err(ExcelError::new_value());
        }
        Ok(CellValue::Number(code as f64))
    }
}

#[derive(Debug)]
pub struct UnicharFn;
/// Character for any Unicode scalar value; surrogates and zero are
/// `#VALUE!`.
impl Function for UnicharFn {
    func_caps!(PURE, ELEMENTWISE);
    fn name(&self) -> &'static str {
        "UNICHAR"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let code = crate::args::int_arg(args, 0)?;
        if !(1..=0x10FFFF).contains(&code) {
            return Err(ExcelError::new_value());
        }
        let c = char::from_u32(code as u32).ok_or_else(ExcelError::new_value)?;
        Ok(CellValue::Text(c.to_string()))
    }
}

#[derive(Debug)]
pub struct UnicodeFn;
/// Scalar value of the first character.
impl Function for UnicodeFn {
    func_caps!(PURE, ELEMENTWISE);
    fn name(&self) -> &'static str {
        "UNICODE"
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
        let first = text.chars().next().ok_or_else(ExcelError::new_value)?;
        Ok(CellValue::Number(first as u32 as f64))
    }
}

#[derive(Debug)]
pub struct CleanFn;
/// Strips control characters (code < 32).
impl Function for CleanFn {
    func_caps!(PURE, ELEMENTWISE);
    fn name(&self) -> &'static str {
        "CLEAN"
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
        Ok(CellValue::Text(
            text.chars().filter(|c| (*c as u32) >= 32).collect(),
        ))
    }
}

#[derive(Debug)]
pub struct TFn;
/// The text value of a Text argument; anything else becomes empty text
/// (errors still propagate).
impl Function for TFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "T"
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
            CellValue::Text(s) => Ok(CellValue::Text(s.clone())),
            _ => Ok(CellValue::Text(String::new())),
        }
    }
}

#[derive(Debug)]
pub struct ConcatFn;
/// Concatenation of the textified arguments.
impl Function for ConcatFn {
    func_caps!(PURE, REDUCTION);
    fn name(&self) -> &'static str {
        "CONCAT"
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
        let mut out = String::new();
        for v in args {
            out.push_str(&to_text(v)?);
        }
        Ok(CellValue::Text(out))
    }
}

#[derive(Debug)]
pub struct TextJoinFn;
/// Joins the textified parts with a delimiter.
///
/// `ignore_empty` accepts a Boolean, a Number (nonzero = true) or the
/// text "TRUE"/"FALSE" case-insensitively; other text is `#VALUE!`.
/// Ignored parts are Empty cells and empty text.
impl Function for TextJoinFn {
    func_caps!(PURE, REDUCTION);
    fn name(&self) -> &'static str {
        "TEXTJOIN"
    }
    fn min_args(&self) -> usize {
        3
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
        let delim = to_text(&args[0])?;
        let ignore_empty = to_logical(&args[1])?;
        let mut parts = Vec::with_capacity(args.len() - 2);
        for v in &args[2..] {
            let s = to_text(v)?;
            if ignore_empty && s.is_empty() {
                continue;
            }
            parts.push(s);
        }
        Ok(CellValue::Text(parts.join(&delim)))
    }
}

#[derive(Debug)]
pub struct ReverseFn;
/// Code-point reversal of the textified input.
impl Function for ReverseFn {
    func_caps!(PURE, ELEMENTWISE);
    fn name(&self) -> &'static str {
        "REVERSE"
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
        Ok(CellValue::Text(text.chars().rev().collect()))
    }
}

pub fn register_builtins() {
    crate::register_functions!(
        LenFn,
        LeftFn,
        RightFn,
        MidFn,
        TrimFn,
        UpperFn,
        LowerFn,
        ReplaceFn,
        ReptFn,
        ExactFn,
        CharFn,
        CodeFn,
        UnicharFn,
        UnicodeFn,
        CleanFn,
        TFn,
        ConcatFn,
        TextJoinFn,
        ReverseFn,
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
    fn len_left_right_mid_count_scalars() {
        assert_eq!(LenFn.dispatch(&[t("héllo")], &ctx()), n(5.0));
        assert_eq!(LeftFn.dispatch(&[t("héllo"), n(2.0)], &ctx()), t("hé"));
        assert_eq!(RightFn.dispatch(&[t("héllo"), n(3.0)], &ctx()), t("llo"));
        assert_eq!(MidFn.dispatch(&[t("héllo"), n(2.0), n(3.0)], &ctx()), t("éll"));
        assert_eq!(MidFn.dispatch(&[t("abc"), n(10.0), n(2.0)], &ctx()), t(""));
        assert_eq!(
            MidFn.dispatch(&[t("abc"), n(0.0), n(2.0)], &ctx()),
            CellValue::Error(ExcelError::new_value())
        );
    }

    #[test]
    fn replace_contract() {
        assert_eq!(
            ReplaceFn.dispatch(&[t("abcdef"), n(2.0), n(3.0), t("XY")], &ctx()),
            t("aXYef")
        );
        // Start beyond length appends.
        assert_eq!(
            ReplaceFn.dispatch(&[t("abc"), n(10.0), n(2.0), t("XY")], &ctx()),
            t("abcXY")
        );
        assert_eq!(
            ReplaceFn.dispatch(&[t("abc"), n(0.0), n(1.0), t("X")], &ctx()),
            CellValue::Error(ExcelError::new_value())
        );
        assert_eq!(
            ReplaceFn.dispatch(&[t("abc"), n(1.0), n(-1.0), t("X")], &ctx()),
            CellValue::Error(ExcelError::new_value())
        );
    }

    #[test]
    fn rept_contract() {
        assert_eq!(ReptFn.dispatch(&[t("ab"), n(3.0)], &ctx()), t("ababab"));
        assert_eq!(ReptFn.dispatch(&[t("ab"), n(0.0)], &ctx()), t(""));
        assert_eq!(
            ReptFn.dispatch(&[t("ab"), n(-1.0)], &ctx()),
            CellValue::Error(ExcelError::new_value())
        );
    }

    #[test]
    fn exact_is_binary() {
        assert_eq!(ExactFn.dispatch(&[t("Word"), t("Word")], &ctx()), CellValue::Boolean(true));
        assert_eq!(ExactFn.dispatch(&[t("Word"), t("word")], &ctx()), CellValue::Boolean(false));
    }

    #[test]
    fn char_code_latin1() {
        assert_eq!(CharFn.dispatch(&[n(65.0)], &ctx()), t("A"));
        assert_eq!(CodeFn.dispatch(&[t("A")], &ctx()), n(65.0));
        assert_eq!(
            CharFn.dispatch(&[n(0.0)], &ctx()),
            CellValue::Error(ExcelError::new_value())
        );
        assert_eq!(
            CharFn.dispatch(&[n(256.0)], &ctx()),
            CellValue::Error(ExcelError::new_value())
        );
        assert_eq!(
            CodeFn.dispatch(&[t("€")], &ctx()),
            CellValue::Error(ExcelError::new_value())
        );
    }

    #[test]
    fn unichar_unicode_scalars() {
        assert_eq!(UnicharFn.dispatch(&[n(0x20AC as f64)], &ctx()), t("€"));
        assert_eq!(UnicodeFn.dispatch(&[t("€")], &ctx()), n(0x20AC as f64));
        // Surrogate range is invalid.
        assert_eq!(
            UnicharFn.dispatch(&[n(0xD800 as f64)], &ctx()),
            CellValue::Error(ExcelError::new_value())
        );
        assert_eq!(
            UnicharFn.dispatch(&[n(0.0)], &ctx()),
            CellValue::Error(ExcelError::new_value())
        );
    }

    #[test]
    fn clean_strips_controls() {
        assert_eq!(
            CleanFn.dispatch(&[t("a\u{0001}b\nc")], &ctx()),
            t("abc")
        );
    }

    #[test]
    fn t_passes_text_only() {
        assert_eq!(TFn.dispatch(&[t("abc")], &ctx()), t("abc"));
        assert_eq!(TFn.dispatch(&[n(5.0)], &ctx()), t(""));
        assert_eq!(TFn.dispatch(&[CellValue::Boolean(true)], &ctx()), t(""));
        assert_eq!(
            TFn.dispatch(&[CellValue::Error(ExcelError::new_na())], &ctx()),
            CellValue::Error(ExcelError::new_na())
        );
    }

    #[test]
    fn concat_textifies() {
        let args = vec![t("x="), n(2.5), CellValue::Boolean(true), CellValue::Empty];
        assert_eq!(ConcatFn.dispatch(&args, &ctx()), t("x=2.5TRUE"));
    }

    #[test]
    fn textjoin_ignore_empty_forms() {
        let parts = [t("a"), t(""), t("b"), CellValue::Empty, t("c")];
        let mut args = vec![t("-"), CellValue::Boolean(true)];
        args.extend(parts.clone());
        assert_eq!(TextJoinFn.dispatch(&args, &ctx()), t("a-b-c"));

        let mut args = vec![t("-"), CellValue::Boolean(false)];
        args.extend(parts.clone());
        assert_eq!(TextJoinFn.dispatch(&args, &ctx()), t("a--b--c"));

        // Number and text renditions of the flag.
        let mut args = vec![t("-"), n(1.0)];
        args.extend(parts.clone());
        assert_eq!(TextJoinFn.dispatch(&args, &ctx()), t("a-b-c"));
        let mut args = vec![t("-"), t("false")];
        args.extend(parts.clone());
        assert_eq!(TextJoinFn.dispatch(&args, &ctx()), t("a--b--c"));
        let mut args = vec![t("-"), t("maybe")];
        args.extend(parts);
        assert_eq!(
            TextJoinFn.dispatch(&args, &ctx()),
            CellValue::Error(ExcelError::new_value())
        );
    }

    #[test]
    fn reverse_code_points() {
        assert_eq!(ReverseFn.dispatch(&[t("abc")], &ctx()), t("cba"));
        assert_eq!(ReverseFn.dispatch(&[n(125.0)], &ctx()), t("521"));
    }

    #[test]
    fn trim_collapses_interior_runs() {
        assert_eq!(TrimFn.dispatch(&[t("  a   b  ")], &ctx()), t("a b"));
    }
}
