use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A pump's sleep interval between pumps, parsed from the grammar
/// `^\d+(ms|s|m)$` — a non-negative integer magnitude followed by a unit.
/// Deliberately a small hand-rolled state machine rather than a general
/// duration-parsing crate: the grammar is fixed and tiny, and rejecting
/// anything outside it (fractional values, compound durations like
/// `1h30m`) is itself part of the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval(Duration);

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("interval does not match ^\\d+(ms|s|m)$")]
pub struct IntervalParseError;

impl Interval {
    pub fn as_duration(&self) -> Duration {
        self.0
    }

    pub fn parse(s: &str) -> Result<Self, IntervalParseError> {
        let (digits, unit) = split_digits_and_unit(s).ok_or(IntervalParseError)?;

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(IntervalParseError);
        }

        let magnitude: u64 = digits.parse().map_err(|_| IntervalParseError)?;

        let duration = match unit {
            "ms" => Duration::from_millis(magnitude),
            "s" => Duration::from_secs(magnitude),
            "m" => Duration::from_secs(magnitude * 60),
            _ => return Err(IntervalParseError),
        };

        Ok(Interval(duration))
    }
}

/// Split a string into its leading digit run and trailing unit, trying
/// the longest unit (`ms`) before the shorter ones (`s`, `m`) so `"10ms"`
/// is not misread as digits `"10m"` plus a dangling `"s"`.
fn split_digits_and_unit(s: &str) -> Option<(&str, &str)> {
    for unit in ["ms", "s", "m"] {
        if let Some(digits) = s.strip_suffix(unit) {
            return Some((digits, unit));
        }
    }
    None
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0.as_millis())
    }
}

impl<'de> Deserialize<'de> for Interval {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Interval::parse(&raw).map_err(serde::de::Error::custom)
    }
}

impl Serialize for Interval {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
