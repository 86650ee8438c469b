use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// A duration as expressed by the mesh API: an integral value and a unit.
///
/// Unlike Kubernetes durations, values are not normalized, so `1s` and
/// `1000ms` are distinct specs to the remote control plane.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize, JsonSchema)]
pub struct Duration {
    pub unit: DurationUnit,
    pub value: u64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize, JsonSchema)]
pub enum DurationUnit {
    #[serde(rename = "s")]
    Seconds,
    #[serde(rename = "ms")]
    Milliseconds,
}

#[derive(Debug, thiserror::Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum ParseError {
    #[error("invalid unit: {}", EXPECTED_UNITS)]
    InvalidUnit,

    #[error("missing a unit: {}", EXPECTED_UNITS)]
    NoUnit,

    #[error("invalid integer: {}", .0)]
    NotANumber(#[from] std::num::ParseIntError),
}

const EXPECTED_UNITS: &str = "expected one of 'ms' or 's'";

// === impl Duration ===

impl Duration {
    pub const fn seconds(value: u64) -> Self {
        Self {
            unit: DurationUnit::Seconds,
            value,
        }
    }

    pub const fn millis(value: u64) -> Self {
        Self {
            unit: DurationUnit::Milliseconds,
            value,
        }
    }
}

impl From<Duration> for std::time::Duration {
    fn from(Duration { unit, value }: Duration) -> Self {
        match unit {
            DurationUnit::Seconds => Self::from_secs(value),
            DurationUnit::Milliseconds => Self::from_millis(value),
        }
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit)
    }
}

impl FromStr for Duration {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or(ParseError::NoUnit)?;
        let (value, unit) = s.split_at(split);
        let unit = match unit {
            "s" => DurationUnit::Seconds,
            "ms" => DurationUnit::Milliseconds,
            _ => return Err(ParseError::InvalidUnit),
        };
        Ok(Self {
            unit,
            value: value.parse()?,
        })
    }
}

// === impl DurationUnit ===

impl fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seconds => f.write_str("s"),
            Self::Milliseconds => f.write_str("ms"),
        }
    }
}
