//! Duration wire format: the `"250ms"`-style strings used by JSON filters,
//! bucketing arrays, and stream `stats` intervals (§6).

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug)]
pub struct ParseDurationError(String);

impl fmt::Display for ParseDurationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "invalid duration string {:?}", self.0)
  }
}

impl std::error::Error for ParseDurationError {}

fn segment_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?i)([0-9]*\.?[0-9]+)(ns|us|µs|ms|s|m|h)").expect("static regex"))
}

/// Parses Go-style duration strings: a sequence of `<number><unit>` segments
/// (`"1h2m3s"`, `"250ms"`), or the bare literal `"0"`.
pub fn parse_duration(input: &str) -> Result<Duration, ParseDurationError> {
  let trimmed = input.trim();
  if trimmed == "0" {
    return Ok(Duration::ZERO);
  }

  let mut total_nanos: f64 = 0.0;
  let mut matched_len = 0usize;
  for caps in segment_re().captures_iter(trimmed) {
    let whole = caps.get(0).expect("capture 0 always present");
    matched_len += whole.as_str().len();

    let value: f64 = caps[1]
      .parse()
      .map_err(|_| ParseDurationError(input.to_string()))?;
    let unit = caps[2].to_ascii_lowercase();
    let nanos_per_unit = match unit.as_str() {
      "ns" => 1.0,
      "us" | "µs" => 1_000.0,
      "ms" => 1_000_000.0,
      "s" => 1_000_000_000.0,
      "m" => 60.0 * 1_000_000_000.0,
      "h" => 3_600.0 * 1_000_000_000.0,
      _ => unreachable!("regex only captures known units"),
    };
    total_nanos += value * nanos_per_unit;
  }

  if matched_len == 0 || matched_len != trimmed.len() {
    return Err(ParseDurationError(input.to_string()));
  }
  Ok(Duration::from_nanos(total_nanos.round() as u64))
}

/// Renders a duration as the largest unit that divides it evenly, falling
/// back to nanoseconds. Not a general-purpose formatter — good enough for
/// bucketing thresholds and operator-facing display.
pub fn format_duration(d: Duration) -> String {
  const USEC: u128 = 1_000;
  const MSEC: u128 = 1_000_000;
  const SEC: u128 = 1_000_000_000;
  const MIN: u128 = 60 * SEC;
  const HOUR: u128 = 60 * MIN;

  let nanos = d.as_nanos();
  if nanos == 0 {
    return "0s".to_string();
  }

  let (value, unit) = if nanos >= HOUR && nanos % HOUR == 0 {
    (nanos / HOUR, "h")
  } else if nanos >= MIN && nanos % MIN == 0 {
    (nanos / MIN, "m")
  } else if nanos >= SEC && nanos % SEC == 0 {
    (nanos / SEC, "s")
  } else if nanos >= MSEC && nanos % MSEC == 0 {
    (nanos / MSEC, "ms")
  } else if nanos >= USEC && nanos % USEC == 0 {
    (nanos / USEC, "us")
  } else {
    (nanos, "ns")
  };
  format!("{value}{unit}")
}

/// `#[serde(with = "crate::duration::duration_string")]` for a plain `Duration` field.
pub mod duration_string {
  use super::{format_duration, parse_duration};
  use serde::{Deserialize, Deserializer, Serializer};
  use std::time::Duration;

  pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_duration(*value))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_duration(&raw).map_err(serde::de::Error::custom)
  }
}

/// `#[serde(with = "crate::duration::option_duration_string")]` for `Option<Duration>`.
pub mod option_duration_string {
  use super::{format_duration, parse_duration};
  use serde::{Deserialize, Deserializer, Serializer};
  use std::time::Duration;

  pub fn serialize<S: Serializer>(
    value: &Option<Duration>,
    serializer: S,
  ) -> Result<S::Ok, S::Error> {
    match value {
      Some(d) => serializer.serialize_str(&format_duration(*d)),
      None => serializer.serialize_none(),
    }
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
  ) -> Result<Option<Duration>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
      Some(s) => parse_duration(&s).map(Some).map_err(serde::de::Error::custom),
      None => Ok(None),
    }
  }
}

/// `#[serde(with = "crate::duration::duration_vec_string")]` for `Vec<Duration>` (bucketing).
pub mod duration_vec_string {
  use super::{format_duration, parse_duration};
  use serde::{Deserialize, Deserializer, Serialize, Serializer};
  use std::time::Duration;

  pub fn serialize<S: Serializer>(values: &[Duration], serializer: S) -> Result<S::Ok, S::Error> {
    let rendered: Vec<String> = values.iter().copied().map(format_duration).collect();
    rendered.serialize(serializer)
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
  ) -> Result<Vec<Duration>, D::Error> {
    let raw: Vec<String> = Vec::deserialize(deserializer)?;
    raw
      .iter()
      .map(|s| parse_duration(s))
      .collect::<Result<Vec<_>, _>>()
      .map_err(serde::de::Error::custom)
  }
}
