//! Per-data-type capability bundles.
//!
//! Each data type supplies its ordering and interpolation through
//! [`DataProvider`] and its "no value" representation through
//! [`OptionalProvider`]. Both are resolved statically, so hot loops over
//! samples never dispatch dynamically.

use std::cmp::Ordering;
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};

use crate::core::primitives::micros_to_datetime_saturating;

/// Ordering, equality and linear interpolation for a data-space type.
pub trait DataProvider: Copy + Debug {
    fn compare(a: Self, b: Self) -> Ordering;

    fn equals(a: Self, b: Self) -> bool {
        Self::compare(a, b).is_eq()
    }

    /// `v0 * (1 - c) + v1 * c`.
    fn interpolate(v0: Self, v1: Self, c: f64) -> Self;

    /// Returns `c` such that `interpolate(v0, v1, c) == v`; `0.0` when
    /// `v0 == v1`.
    fn deinterpolate(v0: Self, v1: Self, v: Self) -> f64;
}

/// Smaller of two values; returns `a` on ties.
#[inline]
#[must_use]
pub fn min_of<T: DataProvider>(a: T, b: T) -> T {
    if T::compare(b, a).is_lt() { b } else { a }
}

/// Larger of two values; returns `b` on ties, the opposite of [`min_of`].
#[inline]
#[must_use]
pub fn max_of<T: DataProvider>(a: T, b: T) -> T {
    if T::compare(b, a).is_lt() { a } else { b }
}

/// Represents "no value set" without boxing or reference semantics.
pub trait OptionalProvider: Sized + Copy {
    type Optional: Copy + Debug;

    fn none() -> Self::Optional;

    fn some(value: Self) -> Self::Optional;

    fn has_value(optional: Self::Optional) -> bool {
        Self::try_get_value(optional).is_some()
    }

    fn try_get_value(optional: Self::Optional) -> Option<Self>;
}

impl DataProvider for f64 {
    #[inline]
    fn compare(a: Self, b: Self) -> Ordering {
        // -0.0 and 0.0 compare equal; NaN is rejected before reaching here.
        a.partial_cmp(&b).unwrap_or_else(|| a.total_cmp(&b))
    }

    #[inline]
    fn interpolate(v0: Self, v1: Self, c: f64) -> Self {
        v0 * (1.0 - c) + v1 * c
    }

    #[inline]
    fn deinterpolate(v0: Self, v1: Self, v: Self) -> f64 {
        let span = v1 - v0;
        if span == 0.0 { 0.0 } else { (v - v0) / span }
    }
}

/// NaN is the absent sentinel for doubles.
impl OptionalProvider for f64 {
    type Optional = f64;

    #[inline]
    fn none() -> f64 {
        f64::NAN
    }

    #[inline]
    fn some(value: Self) -> f64 {
        value
    }

    #[inline]
    fn has_value(optional: f64) -> bool {
        !optional.is_nan()
    }

    #[inline]
    fn try_get_value(optional: f64) -> Option<Self> {
        (!optional.is_nan()).then_some(optional)
    }
}

impl DataProvider for DateTime<Utc> {
    #[inline]
    fn compare(a: Self, b: Self) -> Ordering {
        a.cmp(&b)
    }

    fn interpolate(v0: Self, v1: Self, c: f64) -> Self {
        let m0 = v0.timestamp_micros() as f64;
        let m1 = v1.timestamp_micros() as f64;
        micros_to_datetime_saturating(m0 + (m1 - m0) * c)
    }

    fn deinterpolate(v0: Self, v1: Self, v: Self) -> f64 {
        let m0 = v0.timestamp_micros() as f64;
        let span = v1.timestamp_micros() as f64 - m0;
        if span == 0.0 {
            0.0
        } else {
            (v.timestamp_micros() as f64 - m0) / span
        }
    }
}

/// Optional timestamp stored as a value plus an explicit presence tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionalDateTime {
    value: DateTime<Utc>,
    has_value: bool,
}

impl OptionalDateTime {
    pub const NONE: Self = Self {
        value: DateTime::<Utc>::UNIX_EPOCH,
        has_value: false,
    };

    #[must_use]
    pub fn some(value: DateTime<Utc>) -> Self {
        Self {
            value,
            has_value: true,
        }
    }

    #[must_use]
    pub fn get(self) -> Option<DateTime<Utc>> {
        self.has_value.then_some(self.value)
    }
}

impl Default for OptionalDateTime {
    fn default() -> Self {
        Self::NONE
    }
}

impl OptionalProvider for DateTime<Utc> {
    type Optional = OptionalDateTime;

    fn none() -> OptionalDateTime {
        OptionalDateTime::NONE
    }

    fn some(value: Self) -> OptionalDateTime {
        OptionalDateTime::some(value)
    }

    fn has_value(optional: OptionalDateTime) -> bool {
        optional.has_value
    }

    fn try_get_value(optional: OptionalDateTime) -> Option<Self> {
        optional.get()
    }
}

impl DataProvider for Decimal {
    #[inline]
    fn compare(a: Self, b: Self) -> Ordering {
        a.cmp(&b)
    }

    fn interpolate(v0: Self, v1: Self, c: f64) -> Self {
        let exact = Decimal::from_f64(c)
            .and_then(|c| v1.checked_sub(v0).and_then(|span| span.checked_mul(c)))
            .and_then(|delta| v0.checked_add(delta));
        match exact {
            Some(value) => value,
            None => {
                let (Some(a), Some(b)) = (v0.to_f64(), v1.to_f64()) else {
                    return v0;
                };
                Decimal::from_f64(f64::interpolate(a, b, c)).unwrap_or(v0)
            }
        }
    }

    fn deinterpolate(v0: Self, v1: Self, v: Self) -> f64 {
        let Some(span) = v1.checked_sub(v0) else {
            return f64::deinterpolate(
                v0.to_f64().unwrap_or(0.0),
                v1.to_f64().unwrap_or(0.0),
                v.to_f64().unwrap_or(0.0),
            );
        };
        if span.is_zero() {
            return 0.0;
        }
        v.checked_sub(v0)
            .and_then(|offset| offset.checked_div(span))
            .and_then(|ratio| ratio.to_f64())
            .unwrap_or(0.0)
    }
}

impl OptionalProvider for Decimal {
    type Optional = Option<Decimal>;

    fn none() -> Option<Decimal> {
        None
    }

    fn some(value: Self) -> Option<Decimal> {
        Some(value)
    }

    fn try_get_value(optional: Option<Decimal>) -> Option<Self> {
        optional
    }
}
