use std::fmt;
use std::str::FromStr;

use crate::input::InputError;

pub const MINUTE_STEP: u8 = 5;

/// Wall-clock time of the readings, in 5-minute slots. Display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8) -> Result<Self, InputError> {
        if hour > 23 || minute > 59 || minute % MINUTE_STEP != 0 {
            return Err(InputError::InvalidTime(format!("{:02}:{:02}", hour, minute)));
        }
        Ok(Self { hour, minute })
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let invalid = || InputError::InvalidTime(raw.to_string());
        let (h, m) = raw.split_once(':').ok_or_else(invalid)?;
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return Err(invalid());
        }
        let hour: u8 = h.parse().map_err(|_| invalid())?;
        let minute: u8 = m.parse().map_err(|_| invalid())?;
        TimeOfDay::new(hour, minute).map_err(|_| invalid())
    }
}

impl serde::Serialize for TimeOfDay {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
