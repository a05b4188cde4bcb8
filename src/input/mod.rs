use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;

pub mod readings;
pub mod time;

pub use readings::{Readings, load_readings};
pub use time::TimeOfDay;

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing input: {0}")]
    MissingInput(String),
    #[error("invalid number: {0:?}")]
    InvalidNumber(String),
    #[error("invalid time {0:?} (use HH:MM in 5-minute steps)")]
    InvalidTime(String),
    #[error("parse error: {0}")]
    Parse(String),
}

pub fn open_maybe_gz(path: &Path) -> Result<Box<dyn BufRead>, InputError> {
    if !path.exists() {
        return Err(InputError::MissingInput(path.display().to_string()));
    }
    let file = File::open(path)?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Parses a finite decimal with `.` as separator. Grouping commas are rejected.
pub fn parse_number(raw: &str) -> Result<f64, InputError> {
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(InputError::InvalidNumber(trimmed.to_string())),
    }
}

/// Like [`parse_number`], but empty, `NA` and `-` mean "not entered".
pub fn parse_optional_number(raw: &str) -> Result<Option<f64>, InputError> {
    let trimmed = raw.trim();
    if is_absent_marker(trimmed) {
        return Ok(None);
    }
    parse_number(trimmed).map(Some)
}

pub(crate) fn is_absent_marker(raw: &str) -> bool {
    raw.is_empty() || raw == "-" || raw.eq_ignore_ascii_case("na") || raw.eq_ignore_ascii_case("none")
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
