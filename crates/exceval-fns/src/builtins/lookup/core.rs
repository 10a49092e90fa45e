//! MATCH, INDEX, XLOOKUP and XMATCH over flattened argument sequences.
//!
//! Flat grammars (the caller materializes ranges and supplies
//! dimensions, so none of these reflect on container shape):
//! - `MATCH(lookup, array…, match_type)` — the trailing argument is the
//!   match type; the caller passes 1 when the formula omitted it.
//! - `INDEX(values…, row)` — 1-D; `INDEX(values…, ncols, col, row)` —
//!   row-major 2-D with an explicit trailing width.
//! - `XLOOKUP(lookup, n, lookup_array×n, return_array×n,
//!   [if_not_found], [match_mode], [search_mode])` — n is the explicit
//!   array length.
//! - `XMATCH(lookup, n, array×n, [match_mode], [search_mode])`.

use super::lookup_utils::{cmp_for_lookup, equals_maybe_wildcard};
use crate::args::{first_error, opt_int_arg};
use crate::func_caps;
use crate::function::Function;
use crate::traits::FunctionContext;
use exceval_common::{CellValue, ExcelError};

/* ─────────────────────────── MATCH() ──────────────────────────── */

/// Position of a lookup value in an array (1-based).
///
/// match_type 0 is an exact scan (first match, ASCII case-insensitive,
/// wildcards enabled for text); 1 finds the largest value ≤ lookup in
/// an ascending array; −1 the smallest value ≥ lookup in a descending
/// array. A miss is `#N/A`; any other match_type is `#VALUE!`.
#[derive(Debug)]
pub struct MatchFn;
impl Function for MatchFn {
    func_caps!(PURE, LOOKUP);
    fn name(&self) -> &'static str {
        "MATCH"
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
        let lookup = &args[0];
        let array = &args[1..args.len() - 1];
        let match_type = crate::coercion::to_number_lenient(&args[args.len() - 1])?.trunc() as i64;

        let pos = match match_type {
            0 => array
                .iter()
                .position(|v| equals_maybe_wildcard(lookup, v, true)),
            1 => {
                // Largest value ≤ lookup; the array is ascending.
                let mut best = None;
                for (i, v) in array.iter().enumerate() {
                    match cmp_for_lookup(v, lookup) {
                        Some(c) if c <= 0 => best = Some(i),
                        Some(_) => break,
                        None => {}
                    }
                }
                best
            }
            -1 => {
                // Smallest value ≥ lookup; the array is descending.
                let mut best = None;
                for (i, v) in array.iter().enumerate() {
                    match cmp_for_lookup(v, lookup) {
                        Some(c) if c >= 0 => best = Some(i),
                        Some(_) => break,
                        None => {}
                    }
                }
                best
            }
            _ => return Err(ExcelError::new_value()),
        };

        match pos {
            Some(i) => Ok(CellValue::Number((i + 1) as f64)),
            None => Err(ExcelError::new_na()),
        }
    }
}

/* ─────────────────────────── INDEX() ──────────────────────────── */

/// Element of an array by 1-based index.
///
/// The 2-D form carries its width explicitly (`values…, ncols, col,
/// row`) and reads row-major; out-of-bounds indices are `#REF!`,
/// non-numeric ones `#VALUE!`.
#[derive(Debug)]
pub struct IndexFn;

impl IndexFn {
    /// The 2-D decode: trailing `(ncols, col, row)` Numbers whose width
    /// divides the value count evenly.
    fn try_2d(args: &[CellValue]) -> Option<(usize, i64, i64)> {
        if args.len() < 5 {
            return None;
        }
        let tail = &args[args.len() - 3..];
        let nums: Vec<f64> = tail
            .iter()
            .filter_map(|v| match v {
                CellValue::Number(n) => Some(*n),
                _ => None,
            })
            .collect();
        if nums.len() != 3 {
            return None;
        }
        let ncols = nums[0].trunc() as i64;
        let values = args.len() - 3;
        if ncols >= 1 && values % ncols as usize == 0 {
            Some((ncols as usize, nums[1].trunc() as i64, nums[2].trunc() as i64))
        } else {
            None
        }
    }
}

impl Function for IndexFn {
    func_caps!(PURE, LOOKUP);
    fn name(&self) -> &'static str {
        "INDEX"
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
        if let Some(e) = first_error(args) {
            return Err(e);
        }
        if let Some((ncols, col, row)) = Self::try_2d(args) {
            let values = &args[..args.len() - 3];
            let nrows = values.len() / ncols;
            if col < 1 || row < 1 || col as usize > ncols || row as usize > nrows {
                return Err(ExcelError::new_ref());
            }
            return Ok(values[(row as usize - 1) * ncols + (col as usize - 1)].clone());
        }

        let values = &args[..args.len() - 1];
        let row = match &args[args.len() - 1] {
            CellValue::Number(n) => n.trunc() as i64,
            _ => return Err(ExcelError::new_value()),
        };
        if row < 1 || row as usize > values.len() {
            return Err(ExcelError::new_ref());
        }
        Ok(values[row as usize - 1].clone())
    }
}

/* ─────────────────── XLOOKUP() / XMATCH() ─────────────────── */

/// Locate `lookup` in `array` under the XLOOKUP mode matrix. Returns
/// the 0-based position or `#N/A`; invalid modes are `#VALUE!`.
fn xmatch_position(
    lookup: &CellValue,
    array: &[CellValue],
    match_mode: i64,
    search_mode: i64,
) -> Result<Option<usize>, ExcelError> {
    if !matches!(match_mode, -1 | 0 | 1 | 2) {
        return Err(ExcelError::new_value());
    }
    if !matches!(search_mode, 1 | -1 | 2 | -2) {
        return Err(ExcelError::new_value());
    }
    // Wildcards only pair with the linear search modes.
    if match_mode == 2 && matches!(search_mode, 2 | -2) {
        return Err(ExcelError::new_value());
    }

    if matches!(search_mode, 2 | -2) {
        return Ok(binary_search(lookup, array, match_mode, search_mode == 2));
    }

    let indices: Vec<usize> = if search_mode == 1 {
        (0..array.len()).collect()
    } else {
        (0..array.len()).rev().collect()
    };

    // Exact hit wins outright; otherwise track the nearest candidate on
    // the allowed side.
    let mut best: Option<(usize, &CellValue)> = None;
    for i in indices {
        let v = &array[i];
        if match_mode == 2 {
            if equals_maybe_wildcard(lookup, v, true) {
                return Ok(Some(i));
            }
            continue;
        }
        if equals_maybe_wildcard(lookup, v, false) {
            return Ok(Some(i));
        }
        let Some(c) = cmp_for_lookup(v, lookup) else {
            continue;
        };
        match match_mode {
            -1 if c < 0 => {
                let better = match best {
                    None => true,
                    Some((_, b)) => matches!(cmp_for_lookup(v, b), Some(x) if x > 0),
                };
                if better {
                    best = Some((i, v));
                }
            }
            1 if c > 0 => {
                let better = match best {
                    None => true,
                    Some((_, b)) => matches!(cmp_for_lookup(v, b), Some(x) if x < 0),
                };
                if better {
                    best = Some((i, v));
                }
            }
            _ => {}
        }
    }
    Ok(best.map(|(i, _)| i))
}

/// Binary search over a sorted array, keeping the exact-or-nearer
/// semantics of match modes −1/0/1 on a miss.
fn binary_search(
    lookup: &CellValue,
    array: &[CellValue],
    match_mode: i64,
    ascending: bool,
) -> Option<usize> {
    let mut lo = 0usize;
    let mut hi = array.len();
    while lo < hi {
        let mid = (lo + hi) / 2;
        let c = cmp_for_lookup(&array[mid], lookup).unwrap_or(0);
        let before = if ascending { c < 0 } else { c > 0 };
        if c == 0 {
            return Some(mid);
        }
        if before {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    // lo is the first element "after" lookup in scan order.
    match match_mode {
        0 => None,
        // Exact or next smaller.
        -1 => {
            if ascending {
                lo.checked_sub(1)
            } else if lo < array.len() {
                Some(lo)
            } else {
                None
            }
        }
        // Exact or next larger.
        1 => {
            if ascending {
                if lo < array.len() {
                    Some(lo)
                } else {
                    None
                }
            } else {
                lo.checked_sub(1)
            }
        }
        _ => None,
    }
}

/// Modern lookup with explicit match and search modes.
///
/// # Remarks
/// - The second argument is the shared length of the lookup and return
///   arrays (flat sequences cannot carry shape).
/// - `if_not_found`, when present, is returned as-is on a miss; the
///   default miss is `#N/A`.
#[derive(Debug)]
pub struct XlookupFn;
impl Function for XlookupFn {
    func_caps!(PURE, LOOKUP);
    fn name(&self) -> &'static str {
        "XLOOKUP"
    }
    fn min_args(&self) -> usize {
        4
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
        let lookup = &args[0];
        let n = crate::coercion::to_number_lenient(&args[1])?.trunc() as i64;
        if n < 1 || args.len() < 2 + 2 * n as usize {
            return Err(ExcelError::new_value());
        }
        let n = n as usize;
        let lookup_array = &args[2..2 + n];
        let return_array = &args[2 + n..2 + 2 * n];
        let extras = &args[2 + 2 * n..];
        if extras.len() > 3 {
            return Err(ExcelError::new_value());
        }
        let if_not_found = extras.first();
        let match_mode = opt_int_arg(extras, 1, 0)?;
        let search_mode = opt_int_arg(extras, 2, 1)?;

        match xmatch_position(lookup, lookup_array, match_mode, search_mode)? {
            Some(i) => Ok(return_array[i].clone()),
            None => match if_not_found {
                Some(v) => Ok(v.clone()),
                None => Err(ExcelError::new_na()),
            },
        }
    }
}

/// Positional sibling of XLOOKUP: the 1-based position of the match.
/// search_mode 0 is `#VALUE!`.
#[derive(Debug)]
pub struct XmatchFn;
impl Function for XmatchFn {
    func_caps!(PURE, LOOKUP);
    fn name(&self) -> &'static str {
        "XMATCH"
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
        let lookup = &args[0];
        let n = crate::coercion::to_number_lenient(&args[1])?.trunc() as i64;
        if n < 1 || args.len() < 2 + n as usize {
            return Err(ExcelError::new_value());
        }
        let n = n as usize;
        let array = &args[2..2 + n];
        let extras = &args[2 + n..];
        if extras.len() > 2 {
            return Err(ExcelError::new_value());
        }
        let match_mode = opt_int_arg(extras, 0, 0)?;
        let search_mode = opt_int_arg(extras, 1, 1)?;

        match xmatch_position(lookup, array, match_mode, search_mode)? {
            Some(i) => Ok(CellValue::Number((i + 1) as f64)),
            None => Err(ExcelError::new_na()),
        }
    }
}

pub fn register_builtins() {
    crate::register_functions!(MatchFn, IndexFn, XlookupFn, XmatchFn);
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
    fn match_exact_and_approximate() {
        // Exact scan, case-insensitive.
        let args = vec![t("banana"), t("Apple"), t("Banana"), t("Cherry"), n(0.0)];
        assert_eq!(MatchFn.dispatch(&args, &ctx()), n(2.0));
        // Ascending type 1: largest ≤ lookup.
        let args = vec![n(25.0), n(10.0), n(20.0), n(30.0), n(40.0), n(1.0)];
        assert_eq!(MatchFn.dispatch(&args, &ctx()), n(2.0));
        // Descending type -1: smallest ≥ lookup.
        let args = vec![n(25.0), n(40.0), n(30.0), n(20.0), n(10.0), n(-1.0)];
        assert_eq!(MatchFn.dispatch(&args, &ctx()), n(2.0));
        // Miss and invalid type.
        let args = vec![t("kiwi"), t("Apple"), t("Banana"), n(0.0)];
        assert_eq!(
            MatchFn.dispatch(&args, &ctx()),
            CellValue::Error(ExcelError::new_na())
        );
        let args = vec![n(1.0), n(1.0), n(0.0)];
        assert_eq!(MatchFn.dispatch(&args, &ctx()), n(1.0));
        let args = vec![n(1.0), n(1.0), n(2.0), n(3.0)];
        assert_eq!(
            MatchFn.dispatch(&args, &ctx()),
            CellValue::Error(ExcelError::new_value())
        );
    }

    #[test]
    fn match_wildcards_in_exact_mode() {
        let args = vec![t("B*"), t("Apple"), t("Banana"), t("Cherry"), n(0.0)];
        assert_eq!(MatchFn.dispatch(&args, &ctx()), n(2.0));
    }

    #[test]
    fn index_one_dimensional() {
        let args = vec![t("a"), t("b"), t("c"), n(2.0)];
        assert_eq!(IndexFn.dispatch(&args, &ctx()), t("b"));
        let args = vec![t("a"), t("b"), t("c"), n(4.0)];
        assert_eq!(
            IndexFn.dispatch(&args, &ctx()),
            CellValue::Error(ExcelError::new_ref())
        );
        let args = vec![t("a"), t("b"), t("c"), t("x")];
        assert_eq!(
            IndexFn.dispatch(&args, &ctx()),
            CellValue::Error(ExcelError::new_value())
        );
    }

    #[test]
    fn index_two_dimensional() {
        // 2×3 row-major grid: a b c / d e f, width 3.
        let grid = vec![t("a"), t("b"), t("c"), t("d"), t("e"), t("f")];
        let mut args = grid.clone();
        args.extend([n(3.0), n(2.0), n(2.0)]); // ncols=3, col=2, row=2
        assert_eq!(IndexFn.dispatch(&args, &ctx()), t("e"));
        let mut args = grid;
        args.extend([n(3.0), n(4.0), n(1.0)]); // col out of range
        assert_eq!(
            IndexFn.dispatch(&args, &ctx()),
            CellValue::Error(ExcelError::new_ref())
        );
    }

    fn xlookup_args(extras: &[CellValue]) -> Vec<CellValue> {
        let mut args = vec![n(25.0), n(4.0)];
        args.extend([n(10.0), n(20.0), n(30.0), n(40.0)]);
        args.extend([t("A"), t("B"), t("C"), t("D")]);
        args.extend_from_slice(extras);
        args
    }

    #[test]
    fn xlookup_match_modes() {
        // Exact miss defaults to #N/A.
        assert_eq!(
            XlookupFn.dispatch(&xlookup_args(&[]), &ctx()),
            CellValue::Error(ExcelError::new_na())
        );
        // if_not_found is returned as-is.
        assert_eq!(
            XlookupFn.dispatch(&xlookup_args(&[t("none")]), &ctx()),
            t("none")
        );
        // Exact or next larger: 25 → 30 → "C".
        assert_eq!(
            XlookupFn.dispatch(
                &xlookup_args(&[CellValue::Error(ExcelError::new_na()), n(1.0)]),
                &ctx()
            ),
            CellValue::Error(ExcelError::new_na())
        );
        let mut args = xlookup_args(&[]);
        args.extend([t("miss"), n(1.0)]);
        assert_eq!(XlookupFn.dispatch(&args, &ctx()), t("C"));
        // Exact or next smaller: 25 → 20 → "B".
        let mut args = xlookup_args(&[]);
        args.extend([t("miss"), n(-1.0)]);
        assert_eq!(XlookupFn.dispatch(&args, &ctx()), t("B"));
    }

    #[test]
    fn xlookup_explicit_empty_if_not_found() {
        // Presence of the slot controls the branch: an explicitly
        // supplied Empty comes back as-is on a miss instead of #N/A.
        assert_eq!(
            XlookupFn.dispatch(&xlookup_args(&[CellValue::Empty]), &ctx()),
            CellValue::Empty
        );
        // Supplied alongside the mode flags it still wins over the
        // default.
        let mut args = xlookup_args(&[]);
        args.extend([CellValue::Empty, n(0.0), n(1.0)]);
        assert_eq!(XlookupFn.dispatch(&args, &ctx()), CellValue::Empty);
    }

    #[test]
    fn xlookup_wildcard_mode() {
        let mut args = vec![t("B*"), n(3.0)];
        args.extend([t("Apple"), t("Banana"), t("Cherry")]);
        args.extend([n(1.0), n(2.0), n(3.0)]);
        args.extend([CellValue::Empty, n(2.0)]);
        assert_eq!(XlookupFn.dispatch(&args, &ctx()), n(2.0));
    }

    #[test]
    fn xlookup_binary_modes() {
        // Binary ascending keeps exact-or-nearer semantics on a miss.
        let mut args = xlookup_args(&[]);
        args.extend([t("miss"), n(1.0), n(2.0)]);
        assert_eq!(XlookupFn.dispatch(&args, &ctx()), t("C"));
        let mut args = xlookup_args(&[]);
        args.extend([t("miss"), n(-1.0), n(2.0)]);
        assert_eq!(XlookupFn.dispatch(&args, &ctx()), t("B"));
        // Binary descending array.
        let mut args = vec![n(25.0), n(4.0)];
        args.extend([n(40.0), n(30.0), n(20.0), n(10.0)]);
        args.extend([t("A"), t("B"), t("C"), t("D")]);
        args.extend([t("miss"), n(1.0), n(-2.0)]);
        assert_eq!(XlookupFn.dispatch(&args, &ctx()), t("B"));
        // Exact binary hit.
        let mut args = xlookup_args(&[]);
        args.extend([t("miss"), n(0.0), n(2.0)]);
        assert_eq!(
            XlookupFn.dispatch(&args, &ctx()),
            t("miss")
        );
        let mut args = vec![n(30.0), n(4.0)];
        args.extend([n(10.0), n(20.0), n(30.0), n(40.0)]);
        args.extend([t("A"), t("B"), t("C"), t("D")]);
        args.extend([t("miss"), n(0.0), n(2.0)]);
        assert_eq!(XlookupFn.dispatch(&args, &ctx()), t("C"));
    }

    #[test]
    fn xlookup_search_last_to_first() {
        let mut args = vec![t("x"), n(3.0)];
        args.extend([t("x"), t("y"), t("x")]);
        args.extend([n(1.0), n(2.0), n(3.0)]);
        args.extend([CellValue::Empty, n(0.0), n(-1.0)]);
        assert_eq!(XlookupFn.dispatch(&args, &ctx()), n(3.0));
    }

    #[test]
    fn xmatch_contract() {
        let mut args = vec![n(30.0), n(4.0)];
        args.extend([n(10.0), n(20.0), n(30.0), n(40.0)]);
        assert_eq!(XmatchFn.dispatch(&args, &ctx()), n(3.0));
        // search_mode 0 is invalid.
        let mut args = vec![n(30.0), n(4.0)];
        args.extend([n(10.0), n(20.0), n(30.0), n(40.0)]);
        args.extend([n(0.0), n(0.0)]);
        assert_eq!(
            XmatchFn.dispatch(&args, &ctx()),
            CellValue::Error(ExcelError::new_value())
        );
    }
}
