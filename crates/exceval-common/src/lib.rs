pub mod error;
pub mod value;

pub use error::{ExcelError, ExcelErrorKind};
pub use value::{
    date_to_serial, datetime_to_serial, serial_to_date, serial_to_datetime, CellValue,
};
