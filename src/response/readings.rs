// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Meter reading responses and their short form.
//!
//! The device reports counters in Wh (power) and liters (gas). The short form
//! converts them to kWh and m³ and keeps only the fields most callers need.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::ParseError;

/// Meter readings as returned by [`Session::meter_readings`](crate::Session::meter_readings).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MeterReadings {
    /// The raw payload, exactly as the device sent it.
    Full(Value),
    /// The short-form projection of the payload.
    Short(ShortReadings),
}

impl MeterReadings {
    /// Returns the raw payload if this is a full reading.
    #[must_use]
    pub fn as_full(&self) -> Option<&Value> {
        match self {
            Self::Full(raw) => Some(raw),
            Self::Short(_) => None,
        }
    }

    /// Returns the projection if this is a short reading.
    #[must_use]
    pub fn as_short(&self) -> Option<&ShortReadings> {
        match self {
            Self::Full(_) => None,
            Self::Short(short) => Some(short),
        }
    }
}

/// Short-form meter readings.
///
/// Power and gas are extracted independently: a meter without gas still
/// yields power fields and vice versa. Serializes to the flat field set
/// `pwr`, `net`, `p1`, `p2`, `n1`, `n2`, `tm`, `gas`, `gtm`.
///
/// # Examples
///
/// ```
/// use beeclear::response::ShortReadings;
///
/// let raw = serde_json::json!({
///     "d": 1600798993, "u": 812, "g": 0,
///     "ul": 12637314, "uh": 8553028, "gl": 4288455, "gh": 10048153,
///     "gas": [{ "slot": 0, "val": 6399475, "time": 1600797600 }]
/// });
/// let short = ShortReadings::from_raw(&raw).unwrap();
/// assert_eq!(short.power.unwrap().net_energy, 6853.734);
/// assert_eq!(short.gas.unwrap().volume, 6399.475);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortReadings {
    /// Electricity summary, if the payload carried one.
    #[serde(flatten)]
    pub power: Option<PowerSummary>,
    /// Gas summary, if the payload carried one.
    #[serde(flatten)]
    pub gas: Option<GasSummary>,
}

impl ShortReadings {
    /// Projects a raw device payload onto the short form.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MeterReadings`] if neither the power nor the gas
    /// family carries a non-zero timestamp.
    pub fn from_raw(raw: &Value) -> Result<Self, ParseError> {
        let readings = Self {
            power: PowerSummary::from_raw(raw),
            gas: GasSummary::from_raw(raw),
        };

        let power_missing = readings.power.as_ref().is_none_or(|p| p.timestamp == 0);
        let gas_missing = readings.gas.as_ref().is_none_or(|g| g.timestamp == 0);
        if power_missing && gas_missing {
            return Err(ParseError::MeterReadings);
        }

        Ok(readings)
    }

    /// Returns the time of the electricity measurement.
    #[must_use]
    pub fn measured_at(&self) -> Option<DateTime<Utc>> {
        self.power
            .as_ref()
            .and_then(|power| DateTime::from_timestamp(power.timestamp, 0))
    }

    /// Returns the time of the last gas measurement.
    #[must_use]
    pub fn gas_measured_at(&self) -> Option<DateTime<Utc>> {
        self.gas
            .as_ref()
            .and_then(|gas| DateTime::from_timestamp(gas.timestamp, 0))
    }
}

/// Electricity part of a short reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerSummary {
    /// Actual power, consumption minus production, in W.
    #[serde(rename = "pwr", serialize_with = "whole_as_integer")]
    pub power: f64,
    /// Meter total, consumption minus production over both tariffs, in kWh.
    /// Rounded to 4 decimals.
    #[serde(rename = "net", serialize_with = "whole_as_integer")]
    pub net_energy: f64,
    /// Off-peak (low tariff) consumption counter in kWh.
    #[serde(rename = "p1", serialize_with = "whole_as_integer")]
    pub consumed_offpeak: f64,
    /// Peak (high tariff) consumption counter in kWh.
    #[serde(rename = "p2", serialize_with = "whole_as_integer")]
    pub consumed_peak: f64,
    /// Off-peak (low tariff) production counter in kWh.
    #[serde(rename = "n1", serialize_with = "whole_as_integer")]
    pub produced_offpeak: f64,
    /// Peak (high tariff) production counter in kWh.
    #[serde(rename = "n2", serialize_with = "whole_as_integer")]
    pub produced_peak: f64,
    /// Unix time of the measurement.
    #[serde(rename = "tm")]
    pub timestamp: i64,
}

impl PowerSummary {
    /// Extracts the electricity summary, or `None` if any field is missing.
    #[must_use]
    pub fn from_raw(raw: &Value) -> Option<Self> {
        let number = |key: &str| raw.get(key).and_then(Value::as_f64);

        let consumed = number("u")?;
        let produced = number("g")?;
        let consumed_peak = number("uh")? / 1000.0;
        let consumed_offpeak = number("ul")? / 1000.0;
        let produced_peak = number("gh")? / 1000.0;
        let produced_offpeak = number("gl")? / 1000.0;
        let timestamp = raw.get("d").and_then(unix_time)?;

        Some(Self {
            power: consumed - produced,
            net_energy: round4(
                consumed_peak + consumed_offpeak - produced_peak - produced_offpeak,
            ),
            consumed_offpeak,
            consumed_peak,
            produced_offpeak,
            produced_peak,
            timestamp,
        })
    }
}

/// Gas part of a short reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GasSummary {
    /// Gas meter counter in m³.
    #[serde(rename = "gas", serialize_with = "whole_as_integer")]
    pub volume: f64,
    /// Unix time of the last gas measurement.
    #[serde(rename = "gtm")]
    pub timestamp: i64,
}

impl GasSummary {
    /// Extracts the first gas meter slot, or `None` if there is none.
    #[must_use]
    pub fn from_raw(raw: &Value) -> Option<Self> {
        let slot = raw.get("gas")?.get(0)?;
        let volume = slot.get("val").and_then(Value::as_f64)? / 1000.0;
        let timestamp = slot.get("time").and_then(unix_time)?;
        Some(Self { volume, timestamp })
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Integer seconds, also when the device sends them as a whole float.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn unix_time(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|secs| secs.fract() == 0.0 && secs.abs() < MAX_EXACT_INTEGER)
            .map(|secs| secs as i64)
    })
}

// 2^53, the largest range in which every integer is an exact f64.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Writes whole numbers without a fraction, so `812.0` W reads as `812`.
#[allow(
    clippy::trivially_copy_pass_by_ref,
    clippy::cast_possible_truncation,
    clippy::float_cmp
)]
fn whole_as_integer<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < MAX_EXACT_INTEGER {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}
