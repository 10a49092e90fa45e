//! Excel-style error representation shared by every function in the engine.
//!
//! - **`ExcelErrorKind`** : the canonical set of Excel error codes
//! - **`ExcelError`**     : kind plus an optional human-readable message
//!
//! Errors are *values*, not exceptions: they flow through argument
//! sequences and out of functions like any other `CellValue`.

use std::{error::Error, fmt};

use crate::CellValue;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// All recognised Excel error codes.
///
/// **Note:** names are CamelCase (idiomatic Rust) while `Display`
/// renders them exactly as Excel shows them (`#DIV/0!`, …).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ExcelErrorKind {
    Null,
    Ref,
    Name,
    Value,
    Div,
    Na,
    Num,
}

impl fmt::Display for ExcelErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Null => "#NULL!",
            Self::Ref => "#REF!",
            Self::Name => "#NAME?",
            Self::Value => "#VALUE!",
            Self::Div => "#DIV/0!",
            Self::Na => "#N/A",
            Self::Num => "#NUM!",
        })
    }
}

impl ExcelErrorKind {
    /// Parse a canonical error spelling. Case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "#null!" => Some(Self::Null),
            "#ref!" => Some(Self::Ref),
            "#name?" => Some(Self::Name),
            "#value!" => Some(Self::Value),
            "#div/0!" => Some(Self::Div),
            "#n/a" => Some(Self::Na),
            "#num!" => Some(Self::Num),
            _ => None,
        }
    }
}

/// The single error struct the API passes around.
///
/// Combines the mandatory Excel error code with an optional human
/// explanation. The message never participates in equality or the wire
/// format; it exists for diagnostics only.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct ExcelError {
    pub kind: ExcelErrorKind,
    pub message: Option<String>,
}

impl PartialEq for ExcelError {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for ExcelError {}

impl std::hash::Hash for ExcelError {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
    }
}

/* ───────────────────── Constructors & helpers ─────────────────────── */

impl From<ExcelErrorKind> for ExcelError {
    fn from(kind: ExcelErrorKind) -> Self {
        Self {
            kind,
            message: None,
        }
    }
}

impl ExcelError {
    /// Basic constructor (no message).
    pub fn new(kind: ExcelErrorKind) -> Self {
        kind.into()
    }

    pub fn new_null() -> Self {
        Self::new(ExcelErrorKind::Null)
    }
    pub fn new_ref() -> Self {
        Self::new(ExcelErrorKind::Ref)
    }
    pub fn new_name() -> Self {
        Self::new(ExcelErrorKind::Name)
    }
    pub fn new_value() -> Self {
        Self::new(ExcelErrorKind::Value)
    }
    pub fn new_div() -> Self {
        Self::new(ExcelErrorKind::Div)
    }
    pub fn new_na() -> Self {
        Self::new(ExcelErrorKind::Na)
    }
    pub fn new_num() -> Self {
        Self::new(ExcelErrorKind::Num)
    }

    /// Attach a human-readable explanation.
    pub fn with_message<S: Into<String>>(mut self, msg: S) -> Self {
        self.message = Some(msg.into());
        self
    }

    /// The canonical wire spelling (`#DIV/0!`, `#VALUE!`, …).
    pub fn spelling(&self) -> String {
        self.kind.to_string()
    }
}

/* ───────────────────────── Display / Error ────────────────────────── */

impl fmt::Display for ExcelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(ref msg) = self.message {
            write!(f, ": {msg}")?;
        }
        Ok(())
    }
}

impl Error for ExcelError {}

impl From<ExcelError> for String {
    fn from(error: ExcelError) -> Self {
        format!("{error}")
    }
}

impl From<ExcelError> for CellValue {
    fn from(error: ExcelError) -> Self {
        CellValue::Error(error)
    }
}

impl PartialEq<str> for ExcelErrorKind {
    fn eq(&self, other: &str) -> bool {
        self.to_string() == other
    }
}

impl PartialEq<&str> for ExcelError {
    fn eq(&self, other: &&str) -> bool {
        self.kind.to_string() == *other
    }
}

impl PartialEq<str> for ExcelError {
    fn eq(&self, other: &str) -> bool {
        self.kind.to_string() == other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_spellings() {
        assert_eq!(ExcelErrorKind::Div.to_string(), "#DIV/0!");
        assert_eq!(ExcelErrorKind::Value.to_string(), "#VALUE!");
        assert_eq!(ExcelErrorKind::Ref.to_string(), "#REF!");
        assert_eq!(ExcelErrorKind::Name.to_string(), "#NAME?");
        assert_eq!(ExcelErrorKind::Num.to_string(), "#NUM!");
        assert_eq!(ExcelErrorKind::Na.to_string(), "#N/A");
        assert_eq!(ExcelErrorKind::Null.to_string(), "#NULL!");
    }

    #[test]
    fn parse_round_trips() {
        for kind in [
            ExcelErrorKind::Null,
            ExcelErrorKind::Ref,
            ExcelErrorKind::Name,
            ExcelErrorKind::Value,
            ExcelErrorKind::Div,
            ExcelErrorKind::Na,
            ExcelErrorKind::Num,
        ] {
            assert_eq!(ExcelErrorKind::parse(&kind.to_string()), Some(kind));
        }
        assert_eq!(ExcelErrorKind::parse("#BOGUS!"), None);
    }

    #[test]
    fn message_does_not_affect_equality() {
        let bare = ExcelError::new_num();
        let chatty = ExcelError::new_num().with_message("IRR failed to converge");
        assert_eq!(bare, chatty);
        assert_eq!(chatty, "#NUM!");
    }
}
