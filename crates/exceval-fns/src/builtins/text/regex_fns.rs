//! Regular-expression functions: REGEXTEST, REGEXEXTRACT, REGEXREPLACE.
//!
//! All three accept a mode bitmask: 1 = case-insensitive, 2 = multiline
//! (`^`/`$` per line), 4 = dotall (`.` matches newline). The bits
//! combine freely; anything outside 0..=7 is `#VALUE!`.

use crate::args::{first_error, opt_int_arg};
use crate::coercion::to_text;
use crate::func_caps;
use crate::function::Function;
use crate::traits::FunctionContext;
use exceval_common::{CellValue, ExcelError};
use regex::{Regex, RegexBuilder};

fn build_regex(pattern: &str, mode: i64) -> Result<Regex, ExcelError> {
    if !(0..=7).contains(&mode) {
        return Err(ExcelError::new_value());
    }
    RegexBuilder::new(pattern)
        .case_insensitive(mode & 1 != 0)
        .multi_line(mode & 2 != 0)
        .dot_matches_new_line(mode & 4 != 0)
        .build()
        .map_err(|_| ExcelError::new_value())
}

/// Rewrite Excel replacement syntax for the regex engine: `$1`..`$9`
/// are single-digit backreferences (`${1}` underneath, so `$12` means
/// group 1 followed by a literal 2), `$$` is a literal dollar, and any
/// other `$` is literal.
fn rewrite_replacement(replacement: &str) -> String {
    let mut out = String::with_capacity(replacement.len() + 8);
    let mut chars = replacement.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some(d @ '0'..='9') => {
                out.push_str("${");
                out.push(*d);
                out.push('}');
                chars.next();
            }
            Some('$') => {
                out.push_str("$$");
                chars.next();
            }
            _ => out.push_str("$$"),
        }
    }
    out
}

/* ─────────────────────────── REGEXTEST() ──────────────────────────── */

/// TRUE when the pattern matches anywhere in the text.
#[derive(Debug)]
pub struct RegexTestFn;
impl Function for RegexTestFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "REGEXTEST"
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
        if let Some(e) = first_error(args) {
            return Err(e);
        }
        let text = to_text(&args[0])?;
        let pattern = to_text(&args[1])?;
        let mode = opt_int_arg(args, 2, 0)?;
        let re = build_regex(&pattern, mode)?;
        Ok(CellValue::Boolean(re.is_match(&text)))
    }
}

/* ─────────────────────────── REGEXEXTRACT() ──────────────────────────── */

/// First match of the pattern, or a single capture group of it.
///
/// # Remarks
/// - `return_mode` is reserved and must be 0.
/// - `capture_group` 0 extracts the whole match; k > 0 extracts that
///   group. A group index the pattern does not define is `#VALUE!`.
/// - No match is `#N/A`.
#[derive(Debug)]
pub struct RegexExtractFn;
impl Function for RegexExtractFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "REGEXEXTRACT"
    }
    fn min_args(&self) -> usize {
        2
    }
    fn max_args(&self) -> Option<usize> {
        Some(5)
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
        let pattern = to_text(&args[1])?;
        let return_mode = opt_int_arg(args, 2, 0)?;
        if return_mode != 0 {
            return Err(ExcelError::new_value());
        }
        let capture_group = opt_int_arg(args, 3, 0)?;
        let mode = opt_int_arg(args, 4, 0)?;
        let re = build_regex(&pattern, mode)?;
        if capture_group < 0 || capture_group as usize > re.captures_len() - 1 {
            return Err(ExcelError::new_value());
        }

        let caps = re.captures(&text).ok_or_else(ExcelError::new_na)?;
        let m = caps
            .get(capture_group as usize)
            .ok_or_else(ExcelError::new_na)?;
        Ok(CellValue::Text(m.as_str().to_string()))
    }
}

/* ─────────────────────────── REGEXREPLACE() ──────────────────────────── */

/// Replaces pattern matches, honoring `$1`..`$9` backreferences in the
/// replacement.
///
/// # Remarks
/// - `occurrence` 0 (default) replaces every match; k > 0 replaces only
///   the k-th (1-based). More than the match count leaves the text
///   unchanged.
#[derive(Debug)]
pub struct RegexReplaceFn;
impl Function for RegexReplaceFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "REGEXREPLACE"
    }
    fn min_args(&self) -> usize {
        3
    }
    fn max_args(&self) -> Option<usize> {
        Some(5)
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
        let pattern = to_text(&args[1])?;
        let replacement = rewrite_replacement(&to_text(&args[2])?);
        let mode = opt_int_arg(args, 3, 0)?;
        let occurrence = opt_int_arg(args, 4, 0)?;
        if occurrence < 0 {
            return Err(ExcelError::new_value());
        }
        let re = build_regex(&pattern, mode)?;

        if occurrence == 0 {
            return Ok(CellValue::Text(
                re.replace_all(&text, replacement.as_str()).into_owned(),
            ));
        }

        // Replace only the k-th match, splicing around it.
        let caps = match re.captures_iter(&text).nth(occurrence as usize - 1) {
            Some(c) => c,
            None => return Ok(CellValue::Text(text)),
        };
        let whole = caps.get(0).ok_or_else(ExcelError::new_value)?;
        let mut expanded = String::new();
        caps.expand(&replacement, &mut expanded);
        let mut out = String::with_capacity(text.len());
        out.push_str(&text[..whole.start()]);
        out.push_str(&expanded);
        out.push_str(&text[whole.end()..]);
        Ok(CellValue::Text(out))
    }
}

pub fn register_builtins() {
    crate::register_functions!(RegexTestFn, RegexExtractFn, RegexReplaceFn);
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
    fn regextest_modes() {
        assert_eq!(
            RegexTestFn.dispatch(&[t("Hello"), t("^h")], &ctx()),
            CellValue::Boolean(false)
        );
        assert_eq!(
            RegexTestFn.dispatch(&[t("Hello"), t("^h"), n(1.0)], &ctx()),
            CellValue::Boolean(true)
        );
        // Multiline: ^ anchors per line.
        assert_eq!(
            RegexTestFn.dispatch(&[t("a\nb"), t("^b"), n(2.0)], &ctx()),
            CellValue::Boolean(true)
        );
        // Dotall: . crosses newlines.
        assert_eq!(
            RegexTestFn.dispatch(&[t("a\nb"), t("a.b"), n(4.0)], &ctx()),
            CellValue::Boolean(true)
        );
        // Combined bits.
        assert_eq!(
            RegexTestFn.dispatch(&[t("A\nB"), t("^a.b"), n(7.0)], &ctx()),
            CellValue::Boolean(true)
        );
        assert_eq!(
            RegexTestFn.dispatch(&[t("x"), t("x"), n(8.0)], &ctx()),
            CellValue::Error(ExcelError::new_value())
        );
        assert_eq!(
            RegexTestFn.dispatch(&[t("x"), t("x"), n(-1.0)], &ctx()),
            CellValue::Error(ExcelError::new_value())
        );
    }

    #[test]
    fn invalid_pattern_is_value_error() {
        assert_eq!(
            RegexTestFn.dispatch(&[t("x"), t("(")], &ctx()),
            CellValue::Error(ExcelError::new_value())
        );
    }

    #[test]
    fn regexextract_seed_scenario() {
        let v = RegexExtractFn.dispatch(
            &[
                t("user@example.com"),
                t(r"^([\w\.-]+)@([\w\.-]+)\.(\w+)$"),
                n(0.0),
                n(2.0),
            ],
            &ctx(),
        );
        assert_eq!(v, t("example"));
        // Whole match by default.
        assert_eq!(
            RegexExtractFn.dispatch(&[t("abc123def"), t(r"\d+")], &ctx()),
            t("123")
        );
        // No match is #N/A.
        assert_eq!(
            RegexExtractFn.dispatch(&[t("abc"), t(r"\d+")], &ctx()),
            CellValue::Error(ExcelError::new_na())
        );
        // Reserved return_mode must stay 0.
        assert_eq!(
            RegexExtractFn.dispatch(&[t("abc"), t("a"), n(1.0)], &ctx()),
            CellValue::Error(ExcelError::new_value())
        );
        // Capture group beyond the pattern.
        assert_eq!(
            RegexExtractFn.dispatch(&[t("abc"), t("(a)"), n(0.0), n(2.0)], &ctx()),
            CellValue::Error(ExcelError::new_value())
        );
    }

    #[test]
    fn regexreplace_seed_scenario() {
        let v = RegexReplaceFn.dispatch(
            &[
                t("555-123-4567"),
                t(r"(\d{3})-(\d{3})-(\d{4})"),
                t("($1) $2-$3"),
            ],
            &ctx(),
        );
        assert_eq!(v, t("(555) 123-4567"));
    }

    #[test]
    fn regexreplace_occurrence() {
        let args = |occ: f64| {
            vec![
                t("a1 a2 a3"),
                t(r"a(\d)"),
                t("b$1"),
                n(0.0),
                n(occ),
            ]
        };
        assert_eq!(RegexReplaceFn.dispatch(&args(0.0), &ctx()), t("b1 b2 b3"));
        assert_eq!(RegexReplaceFn.dispatch(&args(2.0), &ctx()), t("a1 b2 a3"));
        // Occurrence past the match count leaves the text unchanged.
        assert_eq!(RegexReplaceFn.dispatch(&args(5.0), &ctx()), t("a1 a2 a3"));
    }

    #[test]
    fn replacement_dollar_forms() {
        // $$ is a literal dollar; a bare $ stays literal.
        assert_eq!(
            RegexReplaceFn.dispatch(&[t("x"), t("x"), t("$$9")], &ctx()),
            t("$9")
        );
        assert_eq!(
            RegexReplaceFn.dispatch(&[t("x"), t("x"), t("a$z")], &ctx()),
            t("a$z")
        );
        // $1 followed by a digit stays a single-digit reference.
        assert_eq!(
            RegexReplaceFn.dispatch(&[t("ab"), t("(a)(b)"), t("$12")], &ctx()),
            t("a2")
        );
    }
}
