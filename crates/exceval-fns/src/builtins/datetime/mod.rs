pub mod date_math;
pub mod date_parts;
pub mod time_parts;
pub mod workdays;

use exceval_common::{CellValue, ExcelError};

/// Coerce an argument to a serial date, truncating time-of-day is the
/// caller's choice. Negative serials are outside the 1900 system.
pub(crate) fn coerce_serial(v: &CellValue) -> Result<f64, ExcelError> {
    let serial = crate::coercion::to_number_lenient(v)?;
    if serial < 0.0 {
        return Err(ExcelError::new_num());
    }
    Ok(serial)
}

pub fn register_builtins() {
    date_parts::register_builtins();
    date_math::register_builtins();
    time_parts::register_builtins();
    workdays::register_builtins();
}
