//! The core `Function` trait and its capability flags.

use crate::traits::FunctionContext;
use exceval_common::{CellValue, ExcelError};

bitflags::bitflags! {
    /// Describes the capabilities and properties of a function.
    ///
    /// Hosts use these to pick evaluation strategies (vectorized,
    /// parallel) and to enforce semantic contracts; the core itself only
    /// reads `VOLATILE`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct FnCaps: u16 {
        // --- Semantics ---
        /// Same output for the same input, no side effects. The default.
        const PURE          = 0b0000_0000_0001;
        /// Output can change with identical inputs (e.g. `TODAY()`).
        const VOLATILE      = 0b0000_0000_0010;

        // --- Shape / Evaluation Strategy ---
        /// Reduces its inputs to a single value (e.g. `SUM`, `AVERAGE`).
        const REDUCTION     = 0b0000_0000_0100;
        /// Operates on each input independently (e.g. `SIN`, `ABS`).
        const ELEMENTWISE   = 0b0000_0000_1000;
        /// Performs a search over its inputs (e.g. `MATCH`, `XLOOKUP`).
        const LOOKUP        = 0b0000_0001_0000;

        // --- Input Data Types ---
        /// Primarily numeric; hosts may prepare `&[f64]` stripes.
        const NUMERIC_ONLY  = 0b0000_0010_0000;

        // --- Backend hints ---
        /// Can process input as a stream without materializing it.
        const STREAM_OK     = 0b0000_0100_0000;
    }
}

/// Object-safe trait for all Excel-style functions.
///
/// Implementations are process-wide singletons: stateless, `Send + Sync`,
/// registered once at startup. `eval` is the only required operation;
/// `dispatch` wraps it with the two universal contracts — arity precedence
/// and NaN/Inf hygiene — so individual functions never re-implement them.
pub trait Function: Send + Sync + 'static {
    /// Capability flags for this function.
    fn caps(&self) -> FnCaps {
        FnCaps::PURE
    }

    /// Canonical upper-case ASCII name.
    fn name(&self) -> &'static str;

    fn min_args(&self) -> usize {
        0
    }

    /// `None` means unbounded (variadic tail). The default derives the
    /// upper bound from `variadic()`: exactly `min_args` for fixed-arity
    /// functions.
    fn max_args(&self) -> Option<usize> {
        if self.variadic() {
            None
        } else {
            Some(self.min_args())
        }
    }

    fn variadic(&self) -> bool {
        false
    }

    fn volatile(&self) -> bool {
        self.caps().contains(FnCaps::VOLATILE)
    }

    /// The scalar evaluation path. Arity has already been verified by
    /// `dispatch`; everything else — error scan, coercion, semantics —
    /// is the implementation's responsibility, in that order.
    fn eval(
        &self,
        args: &[CellValue],
        ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError>;

    /// The evaluation entry point consumed by hosts.
    ///
    /// Applies the universal contracts around `eval`:
    /// 1. arity precedence — an argument count outside
    ///    `min_args..=max_args` is `#VALUE!` regardless of content;
    /// 2. errors are values — an `Err` from `eval` becomes
    ///    `CellValue::Error`;
    /// 3. finiteness on exit — a non-finite Number is coerced to `#NUM!`.
    fn dispatch(&self, args: &[CellValue], ctx: &dyn FunctionContext) -> CellValue {
        if args.len() < self.min_args() {
            return CellValue::Error(ExcelError::new_value().with_message(format!(
                "{} expects at least {} argument(s), got {}",
                self.name(),
                self.min_args(),
                args.len()
            )));
        }
        if let Some(max) = self.max_args() {
            if args.len() > max {
                return CellValue::Error(ExcelError::new_value().with_message(format!(
                    "{} expects at most {} argument(s), got {}",
                    self.name(),
                    max,
                    args.len()
                )));
            }
        }
        match self.eval(args, ctx) {
            Ok(CellValue::Number(n)) if !n.is_finite() => {
                CellValue::Error(ExcelError::new_num())
            }
            Ok(v) => v,
            Err(e) => CellValue::Error(e),
        }
    }
}
