//! The opaque evaluation context handed to every function.
//!
//! The core consumes exactly two capabilities from its host: the current
//! day (for TODAY and friends) and an optional workbook scope backing
//! SHEET/SHEETS/ISFORMULA/FORMULATEXT. Everything else about the host —
//! parser, resolver, recalculation graph — stays on the other side of
//! this trait.

use exceval_common::date_to_serial;

/// Workbook-scope capability. Hosts that evaluate inside a real workbook
/// implement this; the pure core runs fine without it and the dependent
/// functions fall back to their stub defaults.
pub trait SheetScope: Send + Sync {
    /// 1-based position of the sheet the formula lives on.
    fn sheet_ordinal(&self) -> u32;
    /// Number of sheets in the workbook.
    fn sheet_count(&self) -> u32;
    /// Whether the referenced cell contains a formula.
    fn cell_has_formula(&self) -> bool {
        false
    }
    /// Source text of the referenced formula, if any.
    fn formula_text(&self) -> Option<String> {
        None
    }
}

pub trait FunctionContext: Send + Sync {
    /// The current date as an Excel serial (fractional part is
    /// time-of-day, usually zero).
    fn today(&self) -> f64;

    /// Optional workbook scope. `None` in a pure-library setting.
    fn sheet_scope(&self) -> Option<&dyn SheetScope> {
        None
    }
}

/// Fixed-clock context. The core deliberately takes no dependency on the
/// system clock; hosts that want a live TODAY implement
/// [`FunctionContext`] over their own clock and pass it in.
#[derive(Debug, Clone, Copy)]
pub struct StaticContext {
    today_serial: f64,
}

impl StaticContext {
    /// Context pinned to the given serial date.
    pub fn at(today_serial: f64) -> Self {
        Self { today_serial }
    }

    /// Context pinned to the given calendar day.
    pub fn at_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        let d = chrono::NaiveDate::from_ymd_opt(year, month, day)?;
        Some(Self {
            today_serial: date_to_serial(&d),
        })
    }
}

impl Default for StaticContext {
    /// Pinned to 2024-01-01 (serial 45292); a stable anchor for tests.
    fn default() -> Self {
        Self {
            today_serial: 45292.0,
        }
    }
}

impl FunctionContext for StaticContext {
    fn today(&self) -> f64 {
        self.today_serial
    }
}
