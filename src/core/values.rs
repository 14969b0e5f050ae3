use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use crate::core::provider::{DataProvider, max_of, min_of};
use crate::error::{AxisError, AxisResult};

/// Position in interaction space, the type-independent scalar that all view
/// math (center, radius, pan, zoom) runs on.
///
/// Finiteness is checked only in debug builds; callers feeding the hot loops
/// must reject non-finite values upstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InteractionValue(f64);

impl InteractionValue {
    pub const ZERO: Self = Self(0.0);

    #[inline]
    #[must_use]
    pub fn new(value: f64) -> Self {
        debug_assert!(value.is_finite(), "interaction value must be finite");
        Self(value)
    }

    /// Checked constructor used at transformation boundaries.
    #[inline]
    #[must_use]
    pub fn try_new(value: f64) -> Option<Self> {
        value.is_finite().then_some(Self(value))
    }

    #[inline]
    #[must_use]
    pub fn get(self) -> f64 {
        self.0
    }

    #[inline]
    #[must_use]
    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }
}

/// Device-independent pixel position along one axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScreenValue(f64);

impl ScreenValue {
    pub const ZERO: Self = Self(0.0);

    #[inline]
    #[must_use]
    pub fn new(value: f64) -> Self {
        debug_assert!(value.is_finite(), "screen value must be finite");
        Self(value)
    }

    #[inline]
    #[must_use]
    pub fn try_new(value: f64) -> Option<Self> {
        value.is_finite().then_some(Self(value))
    }

    #[inline]
    #[must_use]
    pub fn get(self) -> f64 {
        self.0
    }

    #[inline]
    #[must_use]
    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }
}

macro_rules! impl_scalar_ops {
    ($ty:ident) => {
        impl Add for $ty {
            type Output = Self;

            #[inline]
            fn add(self, rhs: Self) -> Self {
                Self(self.0 + rhs.0)
            }
        }

        impl AddAssign for $ty {
            #[inline]
            fn add_assign(&mut self, rhs: Self) {
                self.0 += rhs.0;
            }
        }

        impl Sub for $ty {
            type Output = Self;

            #[inline]
            fn sub(self, rhs: Self) -> Self {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $ty {
            type Output = Self;

            #[inline]
            fn mul(self, rhs: f64) -> Self {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $ty {
            type Output = Self;

            #[inline]
            fn div(self, rhs: f64) -> Self {
                Self(self.0 / rhs)
            }
        }

        impl Neg for $ty {
            type Output = Self;

            #[inline]
            fn neg(self) -> Self {
                Self(-self.0)
            }
        }

        impl From<$ty> for f64 {
            #[inline]
            fn from(value: $ty) -> f64 {
                value.0
            }
        }
    };
}

impl_scalar_ops!(InteractionValue);
impl_scalar_ops!(ScreenValue);

/// Projected point in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn from_values(x: ScreenValue, y: ScreenValue) -> Self {
        Self { x: x.get(), y: y.get() }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Possibly-empty inclusive range over any ordered data type.
///
/// Ordering goes through [`DataProvider`], so the same range works for
/// doubles, timestamps, and decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange<T> {
    bounds: Option<(T, T)>,
}

impl<T> Default for ValueRange<T> {
    fn default() -> Self {
        Self { bounds: None }
    }
}

impl<T: DataProvider> ValueRange<T> {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a range from two bounds given in either order.
    #[must_use]
    pub fn new(a: T, b: T) -> Self {
        Self {
            bounds: Some((min_of(a, b), max_of(a, b))),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bounds.is_none()
    }

    /// Returns `(minimum, maximum)`, or `None` for an empty range.
    #[must_use]
    pub fn try_get_min_max(&self) -> Option<(T, T)> {
        self.bounds
    }

    #[must_use]
    pub fn minimum(&self) -> Option<T> {
        self.bounds.map(|(min, _)| min)
    }

    #[must_use]
    pub fn maximum(&self) -> Option<T> {
        self.bounds.map(|(_, max)| max)
    }

    /// Grows the range so it covers `value`.
    pub fn include(&mut self, value: T) {
        self.bounds = Some(match self.bounds {
            None => (value, value),
            Some((min, max)) => (min_of(min, value), max_of(max, value)),
        });
    }

    #[must_use]
    pub fn union(self, other: Self) -> Self {
        match (self.bounds, other.bounds) {
            (None, _) => other,
            (_, None) => self,
            (Some((a_min, a_max)), Some((b_min, b_max))) => Self {
                bounds: Some((min_of(a_min, b_min), max_of(a_max, b_max))),
            },
        }
    }

    #[must_use]
    pub fn contains(&self, value: T) -> bool {
        self.bounds.is_some_and(|(min, max)| {
            T::compare(min, value).is_le() && T::compare(value, max).is_le()
        })
    }
}

/// Pixel size of a plot surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Fails with [`AxisError::InvalidViewport`] for a zero-sized surface.
    pub fn validate(self) -> AxisResult<Self> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(AxisError::InvalidViewport {
                width: self.width,
                height: self.height,
            })
        }
    }
}
