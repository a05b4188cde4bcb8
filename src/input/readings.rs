use std::io::BufRead;
use std::path::Path;

use crate::catalog::Quantity;
use crate::catalog::defs::QUANTITY_COUNT;
use crate::input::{InputError, TimeOfDay, is_absent_marker, open_maybe_gz, parse_optional_number};

pub const TIME_KEY: &str = "time";

/// Values collected from the user. Every slot may be left empty.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Readings {
    pub time: Option<TimeOfDay>,
    values: [Option<f64>; QUANTITY_COUNT],
}

impl Readings {
    pub fn get(&self, quantity: Quantity) -> Option<f64> {
        self.values[quantity.index()]
    }

    pub fn set(&mut self, quantity: Quantity, value: Option<f64>) {
        self.values[quantity.index()] = value;
    }

    pub fn supplied_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Fills every slot of `self` that `other` has a value for.
    pub fn overlay(&mut self, other: &Readings) {
        if other.time.is_some() {
            self.time = other.time;
        }
        for quantity in Quantity::ALL {
            if let Some(v) = other.get(quantity) {
                self.set(quantity, Some(v));
            }
        }
    }
}

/// Reads a `key<TAB>value` readings file. Keys are `time` and the quantity keys.
pub fn load_readings(path: &Path) -> Result<Readings, InputError> {
    let reader = open_maybe_gz(path)?;
    let readings = parse_readings(reader)?;
    tracing::debug!(
        path = %path.display(),
        supplied = readings.supplied_count(),
        "loaded readings file"
    );
    Ok(readings)
}

pub fn parse_readings(mut reader: impl BufRead) -> Result<Readings, InputError> {
    let mut buf = String::new();
    let mut readings = Readings::default();
    let mut line_no = 0usize;
    let mut first_row = true;
    let mut seen = [false; QUANTITY_COUNT + 1];

    loop {
        buf.clear();
        let read = reader.read_line(&mut buf)?;
        if read == 0 {
            break;
        }
        line_no += 1;
        let line = buf.trim_end();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (key, value) = match line.split_once('\t') {
            Some((k, v)) => (k.trim(), v.trim()),
            None => (line.trim(), ""),
        };
        let is_header = first_row && key.eq_ignore_ascii_case("key");
        first_row = false;
        if is_header {
            continue;
        }
        if key == TIME_KEY {
            if std::mem::replace(&mut seen[QUANTITY_COUNT], true) {
                tracing::warn!(line = line_no, key, "duplicate reading; keeping last");
            }
            readings.time = if is_absent_marker(value) {
                None
            } else {
                Some(value.parse()?)
            };
            continue;
        }
        let quantity = Quantity::from_key(key).ok_or_else(|| {
            InputError::Parse(format!("readings line {}: unknown key {:?}", line_no, key))
        })?;
        if std::mem::replace(&mut seen[quantity.index()], true) {
            tracing::warn!(line = line_no, key, "duplicate reading; keeping last");
        }
        let parsed = parse_optional_number(value)
            .map_err(|e| InputError::Parse(format!("readings line {}: {}", line_no, e)))?;
        readings.set(quantity, parsed);
    }

    Ok(readings)
}
