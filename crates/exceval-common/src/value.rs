use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::ExcelError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// Excel 1900-system serial dates. Serial 1 is 1900-01-01 and the
// fractional part carries time-of-day. The system also counts a
// phantom 1900-02-29: serial 59 is 1900-02-28, serial 60 the phantom
// day, serial 61 is 1900-03-01. Conversions anchor on the 1900-03-01
// cutover, so real-calendar arithmetic never crosses the phantom day;
// the phantom serial itself renders as 1900-02-28.

/// First day on which the serial and a plain day count disagree.
const CUTOVER: NaiveDate = NaiveDate::from_ymd_opt(1900, 3, 1).unwrap();
/// Serial of the cutover day.
const CUTOVER_SERIAL: i64 = 61;

const SECONDS_PER_DAY: f64 = 86_400.0;

fn whole_serial(date: NaiveDate) -> i64 {
    let offset = (date - CUTOVER).num_days();
    if offset >= 0 {
        CUTOVER_SERIAL + offset
    } else {
        // Below the cutover the line shifts down by one: counting back
        // lands serial 59 on 1900-02-28 and serial 0 on 1899-12-31.
        CUTOVER_SERIAL - 1 + offset
    }
}

pub fn datetime_to_serial(dt: &NaiveDateTime) -> f64 {
    let day_fraction = dt.time().num_seconds_from_midnight() as f64 / SECONDS_PER_DAY;
    whole_serial(dt.date()) as f64 + day_fraction
}

pub fn serial_to_datetime(serial: f64) -> NaiveDateTime {
    let whole = serial.trunc() as i64;
    let date = if whole >= CUTOVER_SERIAL {
        CUTOVER + Duration::days(whole - CUTOVER_SERIAL)
    } else {
        // The phantom serial maps to the last real February day; the
        // rest count back along the shifted pre-cutover line.
        let whole = if whole == CUTOVER_SERIAL - 1 {
            whole - 1
        } else {
            whole
        };
        CUTOVER + Duration::days(whole - (CUTOVER_SERIAL - 1))
    };

    let seconds = (serial.fract() * SECONDS_PER_DAY).round() as i64;
    let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds.rem_euclid(86_400) as u32, 0)
        .unwrap_or(NaiveTime::MIN);
    date.and_time(time)
}

/// Serial for a whole date (midnight).
pub fn date_to_serial(date: &NaiveDate) -> f64 {
    whole_serial(*date) as f64
}

/// Date part of a serial, dropping time-of-day.
pub fn serial_to_date(serial: f64) -> NaiveDate {
    serial_to_datetime(serial).date()
}

/// The tagged value transported between functions.
///
/// Exactly five variants; a `Number` always carries a finite double (the
/// dispatch layer maps NaN/±Inf to `#NUM!` before a value escapes), and an
/// `Error` renders as its canonical wire spelling.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// An absent cell. Distinct from empty text.
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
    Error(ExcelError),
}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            CellValue::Empty => state.write_u8(0),
            CellValue::Number(n) => n.to_bits().hash(state),
            CellValue::Text(s) => s.hash(state),
            CellValue::Boolean(b) => b.hash(state),
            CellValue::Error(e) => e.hash(state),
        }
    }
}

impl Eq for CellValue {}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => write!(f, ""),
            CellValue::Number(n) => write!(f, "{}", format_number(*n)),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            CellValue::Error(e) => write!(f, "{}", e.kind),
        }
    }
}

/// Round-trip decimal formatting without exponent notation for the
/// magnitudes Excel displays plainly. Integral values print without a
/// fractional part.
pub fn format_number(n: f64) -> String {
    if n == n.trunc() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

impl CellValue {
    pub fn text<S: Into<String>>(s: S) -> Self {
        CellValue::Text(s.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, CellValue::Number(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, CellValue::Text(_))
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, CellValue::Boolean(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, CellValue::Error(_))
    }

    /// The payload of a `Number`, or `#VALUE!` when the tag differs.
    pub fn as_number(&self) -> Result<f64, ExcelError> {
        match self {
            CellValue::Number(n) => Ok(*n),
            CellValue::Error(e) => Err(e.clone()),
            _ => Err(ExcelError::new_value()),
        }
    }

    /// The payload of a `Text`, or `#VALUE!` when the tag differs.
    pub fn as_text(&self) -> Result<&str, ExcelError> {
        match self {
            CellValue::Text(s) => Ok(s),
            CellValue::Error(e) => Err(e.clone()),
            _ => Err(ExcelError::new_value()),
        }
    }

    /// The payload of a `Boolean`, or `#VALUE!` when the tag differs.
    pub fn as_boolean(&self) -> Result<bool, ExcelError> {
        match self {
            CellValue::Boolean(b) => Ok(*b),
            CellValue::Error(e) => Err(e.clone()),
            _ => Err(ExcelError::new_value()),
        }
    }

    /// Text rendition used by CONCAT/TEXTJOIN/T and friends.
    pub fn to_display_text(&self) -> String {
        self.to_string()
    }

    /// Case-insensitive structural equality under the ASCII folding used
    /// by MATCH/COUNTIF/XLOOKUP. `EXACT` bypasses this and compares
    /// binary.
    pub fn loose_eq(&self, other: &CellValue) -> bool {
        match (self, other) {
            (CellValue::Text(a), CellValue::Text(b)) => a.eq_ignore_ascii_case(b),
            (a, b) => a == b,
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_maps_1900_quirk() {
        // Serial 1 = 1900-01-01
        let d = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap();
        assert_eq!(date_to_serial(&d), 1.0);
        // Serial 59 = 1900-02-28, serial 61 = 1900-03-01 (60 is phantom)
        assert_eq!(
            date_to_serial(&NaiveDate::from_ymd_opt(1900, 2, 28).unwrap()),
            59.0
        );
        assert_eq!(
            date_to_serial(&NaiveDate::from_ymd_opt(1900, 3, 1).unwrap()),
            61.0
        );
        // Phantom serial 60 maps back to Feb 28
        assert_eq!(
            serial_to_date(60.0),
            NaiveDate::from_ymd_opt(1900, 2, 28).unwrap()
        );
    }

    #[test]
    fn serial_round_trips_modern_dates() {
        for ymd in [(2024, 1, 1), (2024, 2, 29), (1999, 12, 31), (2100, 6, 15)] {
            let d = NaiveDate::from_ymd_opt(ymd.0, ymd.1, ymd.2).unwrap();
            assert_eq!(serial_to_date(date_to_serial(&d)), d);
        }
        // A well-known anchor: 2024-01-01 is serial 45292.
        assert_eq!(
            date_to_serial(&NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            45292.0
        );
    }

    #[test]
    fn fractional_serial_is_time_of_day() {
        let dt = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap();
        assert_eq!(datetime_to_serial(&dt), 45292.25);
        assert_eq!(serial_to_datetime(45292.25), dt);
    }

    #[test]
    fn display_text_forms() {
        assert_eq!(CellValue::Number(42.0).to_display_text(), "42");
        assert_eq!(CellValue::Number(2.5).to_display_text(), "2.5");
        assert_eq!(CellValue::Boolean(true).to_display_text(), "TRUE");
        assert_eq!(CellValue::Empty.to_display_text(), "");
        assert_eq!(
            CellValue::Error(ExcelError::new_div()).to_display_text(),
            "#DIV/0!"
        );
    }

    #[test]
    fn accessors_reject_mismatched_tags() {
        assert_eq!(CellValue::text("abc").as_number(), Err(ExcelError::new_value()));
        assert_eq!(CellValue::Number(1.0).as_text(), Err(ExcelError::new_value()));
        assert_eq!(
            CellValue::Error(ExcelError::new_na()).as_number(),
            Err(ExcelError::new_na())
        );
    }

    #[test]
    fn loose_eq_folds_ascii_case() {
        assert!(CellValue::text("Apple").loose_eq(&CellValue::text("aPPle")));
        assert!(!CellValue::text("Apple").loose_eq(&CellValue::text("Apples")));
        assert!(CellValue::Number(1.0).loose_eq(&CellValue::Number(1.0)));
        assert!(!CellValue::Empty.loose_eq(&CellValue::text("")));
    }
}
