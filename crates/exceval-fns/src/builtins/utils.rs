use exceval_common::{CellValue, ExcelError};

/// Small epsilon used to detect near-zero denominators in
/// trig/hyperbolic reciprocal functions.
pub const EPSILON_NEAR_ZERO: f64 = 1e-12;

/// Coerce a `CellValue` to `f64` using Excel semantics.
/// - Number maps to f64
/// - Boolean maps to 1.0/0.0
/// - Text takes a strict decimal parse
/// - Empty maps to 0.0
/// - Others -> `#VALUE!`
pub fn coerce_num(value: &CellValue) -> Result<f64, ExcelError> {
    crate::coercion::to_number_lenient(value)
}

/// Clamp a computed result to Excel-friendly finite values; NaN/±Inf
/// become `#NUM!`.
pub fn sanitize_numeric_result(n: f64) -> Result<f64, ExcelError> {
    crate::coercion::sanitize_numeric(n)
}
