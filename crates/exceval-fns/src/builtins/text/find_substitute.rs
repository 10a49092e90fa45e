//! Locating and rewriting substrings: FIND, SEARCH, SUBSTITUTE,
//! PROPER.

use crate::args::{first_error, opt_int_arg, wildcard_to_regex_unanchored};
use crate::coercion::to_text;
use crate::func_caps;
use crate::function::Function;
use crate::traits::FunctionContext;
use exceval_common::{CellValue, ExcelError};

/// Map a byte offset into a 1-based character position.
fn char_position(text: &str, byte_offset: usize) -> usize {
    text[..byte_offset].chars().count() + 1
}

/// Byte offset of the 1-based character position `start`.
fn byte_offset(text: &str, start: usize) -> Option<usize> {
    if start == 1 {
        return Some(0);
    }
    text.char_indices()
        .nth(start - 1)
        .map(|(i, _)| i)
        .or_else(|| (text.chars().count() + 1 == start).then(|| text.len()))
}

/// Case-sensitive position of one text inside another (1-based).
///
/// # Remarks
/// - The optional start position is 1-based; values below 1 or past
///   the end are `#VALUE!`.
/// - A miss is `#VALUE!`, matching Excel (SEARCH shares the behavior).
#[derive(Debug)]
pub struct FindFn;

#[derive(Debug)]
pub struct SearchFn;

fn find_core(args: &[CellValue], case_sensitive: bool) -> Result<CellValue, ExcelError> {
    if let Some(e) = first_error(args) {
        return Err(e);
    }
    let needle = to_text(&args[0])?;
    let haystack = to_text(&args[1])?;
    let start = opt_int_arg(args, 2, 1)?;
    if start < 1 {
        return Err(ExcelError::new_value());
    }
    let offset = byte_offset(&haystack, start as usize).ok_or_else(ExcelError::new_value)?;
    let window = &haystack[offset..];

    let found = if case_sensitive {
        window.find(&needle)
    } else if needle.contains('*') || needle.contains('?') || needle.contains('~') {
        // SEARCH enables the * / ? wildcards, matched mid-string.
        let re = wildcard_to_regex_unanchored(&needle)?;
        re.find(window).map(|m| m.start())
    } else {
        window
            .to_lowercase()
            .find(&needle.to_lowercase())
    };

    match found {
        Some(byte) => Ok(CellValue::Number(
            (char_position(&haystack, offset + byte)) as f64,
        )),
        None => Err(ExcelError::new_value()),
    }
}

impl Function for FindFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "FIND"
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
        find_core(args, true)
    }
}

/// Case-insensitive FIND with `*`/`?` wildcards enabled.
impl Function for SearchFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "SEARCH"
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
        find_core(args, false)
    }
}

#[derive(Debug)]
pub struct SubstituteFn;
/// Replaces occurrences of one text with another.
///
/// Without `instance_num` every occurrence is replaced; with it, only
/// the k-th (1-based). `instance_num < 1` is `#VALUE!`.
impl Function for SubstituteFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "SUBSTITUTE"
    }
    fn min_args(&self) -> usize {
        3
    }
    fn max_args(&self) -> Option<usize> {
        Some(4)
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
        let old = to_text(&args[1])?;
        let new = to_text(&args[2])?;
        if old.is_empty() {
            return Ok(CellValue::Text(text));
        }
        match args.get(3) {
            None | Some(CellValue::Empty) => {
                Ok(CellValue::Text(text.replace(&old, &new)))
            }
            Some(v) => {
                let instance = crate::coercion::to_number_lenient(v)?.trunc() as i64;
                if instance < 1 {
                    return Err(ExcelError::new_value());
                }
                match text.match_indices(&old).nth(instance as usize - 1) {
                    Some((at, _)) => {
                        let mut out = String::with_capacity(text.len());
                        out.push_str(&text[..at]);
                        out.push_str(&new);
                        out.push_str(&text[at + old.len()..]);
                        Ok(CellValue::Text(out))
                    }
                    None => Ok(CellValue::Text(text)),
                }
            }
        }
    }
}

#[derive(Debug)]
pub struct ProperFn;
/// Capitalizes the first letter of each word and lowers the rest.
impl Function for ProperFn {
    func_caps!(PURE, ELEMENTWISE);
    fn name(&self) -> &'static str {
        "PROPER"
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
        let mut out = String::with_capacity(text.len());
        let mut at_word_start = true;
        for c in text.chars() {
            if c.is_alphabetic() {
                if at_word_start {
                    out.extend(c.to_uppercase());
                } else {
                    out.extend(c.to_lowercase());
                }
                at_word_start = false;
            } else {
                out.push(c);
                at_word_start = true;
            }
        }
        Ok(CellValue::Text(out))
    }
}

pub fn register_builtins() {
    crate::register_functions!(FindFn, SearchFn, SubstituteFn, ProperFn);
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
    fn find_is_case_sensitive() {
        assert_eq!(FindFn.dispatch(&[t("M"), t("Miriam")], &ctx()), n(1.0));
        assert_eq!(FindFn.dispatch(&[t("m"), t("Miriam")], &ctx()), n(6.0));
        assert_eq!(
            FindFn.dispatch(&[t("x"), t("Miriam")], &ctx()),
            CellValue::Error(ExcelError::new_value())
        );
        // Start offset skips the first hit.
        assert_eq!(FindFn.dispatch(&[t("i"), t("Miriam"), n(3.0)], &ctx()), n(4.0));
        assert_eq!(
            FindFn.dispatch(&[t("i"), t("Miriam"), n(0.0)], &ctx()),
            CellValue::Error(ExcelError::new_value())
        );
    }

    #[test]
    fn search_folds_case_and_wildcards() {
        assert_eq!(SearchFn.dispatch(&[t("m"), t("Miriam")], &ctx()), n(1.0));
        assert_eq!(SearchFn.dispatch(&[t("b?t"), t("about")], &ctx()), n(2.0));
        assert_eq!(
            SearchFn.dispatch(&[t("z"), t("about")], &ctx()),
            CellValue::Error(ExcelError::new_value())
        );
    }

    #[test]
    fn substitute_all_and_nth() {
        assert_eq!(
            SubstituteFn.dispatch(&[t("a-b-c"), t("-"), t("+")], &ctx()),
            t("a+b+c")
        );
        assert_eq!(
            SubstituteFn.dispatch(&[t("a-b-c"), t("-"), t("+"), n(2.0)], &ctx()),
            t("a-b+c")
        );
        // Instance past the count leaves the text unchanged.
        assert_eq!(
            SubstituteFn.dispatch(&[t("a-b-c"), t("-"), t("+"), n(5.0)], &ctx()),
            t("a-b-c")
        );
        assert_eq!(
            SubstituteFn.dispatch(&[t("a-b"), t("-"), t("+"), n(0.0)], &ctx()),
            CellValue::Error(ExcelError::new_value())
        );
    }

    #[test]
    fn proper_capitalizes_words() {
        assert_eq!(
            ProperFn.dispatch(&[t("hello WORLD 2x")], &ctx()),
            t("Hello World 2X")
        );
    }
}
