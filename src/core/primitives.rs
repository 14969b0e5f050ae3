use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

use crate::error::{AxisError, AxisResult};

pub fn decimal_to_f64(value: Decimal, field_name: &str) -> AxisResult<f64> {
    value.to_f64().ok_or_else(|| {
        AxisError::InvalidData(format!("{field_name} cannot be represented as f64"))
    })
}

/// Converts back from interaction space; non-finite or out-of-range input
/// saturates at the decimal limits.
#[must_use]
pub fn f64_to_decimal_saturating(value: f64) -> Decimal {
    if value.is_nan() {
        return Decimal::ZERO;
    }
    Decimal::from_f64(value).unwrap_or(if value.is_sign_negative() {
        Decimal::MIN
    } else {
        Decimal::MAX
    })
}

#[must_use]
pub fn datetime_to_unix_seconds(time: DateTime<Utc>) -> f64 {
    time.timestamp_micros() as f64 / 1_000_000.0
}

/// Inverse of [`datetime_to_unix_seconds`], clamped to the representable
/// chrono range.
#[must_use]
pub fn unix_seconds_to_datetime_saturating(seconds: f64) -> DateTime<Utc> {
    micros_to_datetime_saturating(seconds * 1_000_000.0)
}

#[must_use]
pub(crate) fn micros_to_datetime_saturating(micros: f64) -> DateTime<Utc> {
    if micros.is_nan() {
        return DateTime::<Utc>::UNIX_EPOCH;
    }
    let min = DateTime::<Utc>::MIN_UTC.timestamp_micros();
    let max = DateTime::<Utc>::MAX_UTC.timestamp_micros();
    let clamped = micros.round().clamp(min as f64, max as f64) as i64;
    DateTime::from_timestamp_micros(clamped.clamp(min, max)).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}
