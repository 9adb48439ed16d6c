use std::fmt;

use clap::ValueEnum;
use colored::Colorize;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Issue priority. On the wire this is a bare integer 0..=4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Priority {
    None = 0,
    Urgent = 1,
    High = 2,
    Medium = 3,
    Low = 4,
}

impl Priority {
    pub fn from_i32(value: i32) -> Self {
        match value {
            1 => Priority::Urgent,
            2 => Priority::High,
            3 => Priority::Medium,
            4 => Priority::Low,
            _ => Priority::None,
        }
    }

    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::None => "None",
            Priority::Urgent => "Urgent",
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    /// Colored label for terminal output.
    pub fn colored(self) -> String {
        let label = self.label();
        match self {
            Priority::None => label.to_string(),
            Priority::Urgent => label.red().bold().to_string(),
            Priority::High => label.yellow().bold().to_string(),
            Priority::Medium => label.blue().to_string(),
            Priority::Low => label.bright_black().to_string(),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Serialize for Priority {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i32(self.as_i32())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = i32::deserialize(deserializer)?;
        Ok(Priority::from_i32(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_i32() {
        for value in 0..=4 {
            assert_eq!(Priority::from_i32(value).as_i32(), value);
        }
    }

    #[test]
    fn out_of_range_maps_to_none() {
        assert_eq!(Priority::from_i32(7), Priority::None);
        assert_eq!(Priority::from_i32(-1), Priority::None);
    }

    #[test]
    fn serializes_as_bare_integer() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "2");
        let parsed: Priority = serde_json::from_str("1").unwrap();
        assert_eq!(parsed, Priority::Urgent);
    }
}
