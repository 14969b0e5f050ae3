//! Major/minor tick location for linear, logarithmic, and time axes.
//!
//! Locators append into caller-owned buffers. Every tick lies inside
//! `[min, max]`, no minor tick sits on a major one, and identical inputs
//! always produce identical output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::primitives::{datetime_to_unix_seconds, unix_seconds_to_datetime_saturating};
use crate::error::{AxisError, AxisResult};

/// Upper bound on ticks a single call may produce.
pub const MAX_TICKS: usize = 10_000;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Calendar-free time steps, in seconds, tried before whole-day multiples.
const TIME_STEP_LADDER: [f64; 18] = [
    1.0, 2.0, 5.0, 10.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0, 900.0, 1_800.0, 3_600.0,
    7_200.0, 10_800.0, 21_600.0, 43_200.0, 86_400.0,
];

/// Pixel spacing requested between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickSpacing {
    pub major_spacing_px: f64,
    /// Minor intervals per major interval; values below 2 disable minors.
    pub minor_per_major: u32,
}

impl Default for TickSpacing {
    fn default() -> Self {
        Self {
            major_spacing_px: 80.0,
            minor_per_major: 5,
        }
    }
}

impl TickSpacing {
    pub fn validate(self) -> AxisResult<Self> {
        if !self.major_spacing_px.is_finite() || self.major_spacing_px <= 0.0 {
            return Err(AxisError::InvalidData(
                "tick major spacing must be finite and > 0".to_owned(),
            ));
        }
        Ok(self)
    }

    /// Number of major intervals that fit into `available_width`, at least one.
    #[must_use]
    pub fn target_count(self, available_width: f64) -> usize {
        let count = (available_width / self.major_spacing_px).floor();
        if count.is_finite() && count >= 1.0 {
            (count as usize).min(MAX_TICKS)
        } else {
            1
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick<T> {
    pub value: T,
    pub label: Option<String>,
}

impl<T> Tick<T> {
    #[must_use]
    pub fn new(value: T, label: Option<String>) -> Self {
        Self { value, label }
    }
}

/// Produces major and minor ticks for a visible range.
pub trait TickLocator {
    type Data;

    /// Appends ticks for `[min, max]` (either order) laid out over
    /// `available_width` pixels. A non-positive width yields no ticks.
    fn get_ticks(
        &self,
        min: Self::Data,
        max: Self::Data,
        available_width: f64,
        spacing: TickSpacing,
        major: &mut Vec<Tick<Self::Data>>,
        minor: &mut Vec<Tick<Self::Data>>,
    ) -> AxisResult<()>;
}

/// Smallest 1, 2 or 5 times a power of ten that is at least `raw`.
pub fn nice_step(raw: f64) -> AxisResult<f64> {
    if !raw.is_finite() || raw <= 0.0 {
        return Err(AxisError::InvalidTickStep(raw));
    }
    let base = 10_f64.powf(raw.log10().floor());
    let fraction = raw / base;
    let nice = if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    Ok(nice * base)
}

fn validated_bounds(min: f64, max: f64) -> AxisResult<(f64, f64)> {
    if !min.is_finite() || !max.is_finite() {
        return Err(AxisError::InvalidData(
            "tick range bounds must be finite".to_owned(),
        ));
    }
    Ok((min.min(max), min.max(max)))
}

/// Multiples of `step` within `[min, max]`, plus `minor_per_major` evenly
/// spaced minors per major interval.
fn arithmetic_ticks(
    min: f64,
    max: f64,
    step: f64,
    minor_per_major: u32,
    mut emit_major: impl FnMut(f64),
    mut emit_minor: impl FnMut(f64),
) -> AxisResult<()> {
    if !step.is_finite() || step <= 0.0 {
        return Err(AxisError::InvalidTickStep(step));
    }
    let epsilon = step * 1e-9;
    let first = (min / step).ceil();
    let last = (max / step).floor();
    if !(last - first).is_finite() || last - first + 1.0 > MAX_TICKS as f64 {
        return Err(AxisError::InvalidTickStep(step));
    }
    for index in first as i64..=last as i64 {
        if let Some(value) = snap_inside(index as f64 * step, min, max, epsilon) {
            emit_major(value);
        }
    }

    if minor_per_major < 2 {
        return Ok(());
    }
    let divisions = i64::from(minor_per_major);
    let minor_step = step / f64::from(minor_per_major);
    let first = (min / minor_step).ceil();
    let last = (max / minor_step).floor();
    if last - first + 1.0 > (MAX_TICKS as f64) * f64::from(minor_per_major) {
        return Err(AxisError::InvalidTickStep(minor_step));
    }
    for index in first as i64..=last as i64 {
        if index.rem_euclid(divisions) == 0 {
            continue;
        }
        let value = index as f64 * minor_step;
        let ratio = value / step;
        if (ratio - ratio.round()).abs() * step <= epsilon {
            continue;
        }
        if let Some(value) = snap_inside(value, min, max, epsilon) {
            emit_minor(value);
        }
    }
    Ok(())
}

#[inline]
fn snap_inside(value: f64, min: f64, max: f64, epsilon: f64) -> Option<f64> {
    (value >= min - epsilon && value <= max + epsilon).then(|| value.clamp(min, max))
}

fn format_linear_label(value: f64, step: f64) -> String {
    let value = if value.abs() < step * 1e-9 { 0.0 } else { value };
    if step >= 1.0 {
        format!("{value:.0}")
    } else {
        let decimals = (-step.log10().floor()).max(0.0) as usize;
        format!("{value:.decimals$}")
    }
}

/// Ticks at 1/2/5 x 10^k multiples, or at a fixed step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearTickLocator {
    fixed_step: Option<f64>,
}

impl LinearTickLocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_step(step: f64) -> AxisResult<Self> {
        if !step.is_finite() || step <= 0.0 {
            return Err(AxisError::InvalidTickStep(step));
        }
        Ok(Self {
            fixed_step: Some(step),
        })
    }

    fn step_for(&self, span: f64, target: usize) -> AxisResult<f64> {
        match self.fixed_step {
            Some(step) => Ok(step),
            None => nice_step(span / target as f64),
        }
    }
}

impl TickLocator for LinearTickLocator {
    type Data = f64;

    fn get_ticks(
        &self,
        min: f64,
        max: f64,
        available_width: f64,
        spacing: TickSpacing,
        major: &mut Vec<Tick<f64>>,
        minor: &mut Vec<Tick<f64>>,
    ) -> AxisResult<()> {
        let spacing = spacing.validate()?;
        let (min, max) = validated_bounds(min, max)?;
        if !(available_width > 0.0) {
            return Ok(());
        }
        let span = max - min;
        if span == 0.0 {
            major.push(Tick::new(min, Some(format_linear_label(min, 1.0))));
            return Ok(());
        }

        let step = self.step_for(span, spacing.target_count(available_width))?;
        arithmetic_ticks(
            min,
            max,
            step,
            spacing.minor_per_major,
            |value| major.push(Tick::new(value, Some(format_linear_label(value, step)))),
            |value| minor.push(Tick::new(value, None)),
        )
    }
}

/// Decade ticks with 2..9 minors for positive ranges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LogTickLocator;

impl TickLocator for LogTickLocator {
    type Data = f64;

    /// Non-positive bounds are clamped to the smallest positive double; a
    /// range entirely at or below zero yields no ticks.
    fn get_ticks(
        &self,
        min: f64,
        max: f64,
        available_width: f64,
        spacing: TickSpacing,
        major: &mut Vec<Tick<f64>>,
        minor: &mut Vec<Tick<f64>>,
    ) -> AxisResult<()> {
        let spacing = spacing.validate()?;
        let (min, max) = validated_bounds(min, max)?;
        if !(available_width > 0.0) || max <= 0.0 {
            return Ok(());
        }
        let min = min.max(f64::MIN_POSITIVE);

        let lowest = min.log10().floor() as i32;
        let highest = max.log10().floor() as i32;
        let decades = usize::try_from(highest - lowest + 1).unwrap_or(1);
        let target = spacing.target_count(available_width);
        let stride = decades.div_ceil(target).max(1);

        for exponent in lowest..=highest {
            let decade = 10_f64.powi(exponent);
            if decade >= min && decade <= max {
                let on_stride = usize::try_from(exponent - lowest).unwrap_or(0) % stride == 0;
                if on_stride {
                    major.push(Tick::new(decade, Some(format!("1e{exponent}"))));
                } else {
                    minor.push(Tick::new(decade, None));
                }
            }
            if stride > 1 || spacing.minor_per_major < 2 {
                continue;
            }
            for multiple in 2..=9_u8 {
                let value = f64::from(multiple) * decade;
                if value >= min && value <= max {
                    minor.push(Tick::new(value, None));
                }
            }
        }
        Ok(())
    }
}

/// Time ticks on a fixed-duration ladder (seconds up to a day, then nice
/// multiples of days), aligned to the unix epoch in UTC.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DateTimeTickLocator;

impl DateTimeTickLocator {
    /// Step in seconds for a raw (minimum) step in seconds.
    pub fn step_for(raw_seconds: f64) -> AxisResult<f64> {
        if !raw_seconds.is_finite() || raw_seconds <= 0.0 {
            return Err(AxisError::InvalidTickStep(raw_seconds));
        }
        if let Some(step) = TIME_STEP_LADDER.iter().copied().find(|step| *step >= raw_seconds) {
            return Ok(step);
        }
        Ok(nice_step(raw_seconds / SECONDS_PER_DAY)? * SECONDS_PER_DAY)
    }

    fn label(time: DateTime<Utc>, step: f64) -> String {
        let pattern = if step >= SECONDS_PER_DAY {
            "%Y-%m-%d"
        } else if step >= 60.0 {
            "%H:%M"
        } else {
            "%H:%M:%S"
        };
        time.format(pattern).to_string()
    }
}

impl TickLocator for DateTimeTickLocator {
    type Data = DateTime<Utc>;

    fn get_ticks(
        &self,
        min: DateTime<Utc>,
        max: DateTime<Utc>,
        available_width: f64,
        spacing: TickSpacing,
        major: &mut Vec<Tick<DateTime<Utc>>>,
        minor: &mut Vec<Tick<DateTime<Utc>>>,
    ) -> AxisResult<()> {
        let spacing = spacing.validate()?;
        let (min, max) =
            validated_bounds(datetime_to_unix_seconds(min), datetime_to_unix_seconds(max))?;
        if !(available_width > 0.0) {
            return Ok(());
        }
        let span = max - min;
        if span == 0.0 {
            let time = unix_seconds_to_datetime_saturating(min);
            major.push(Tick::new(time, Some(Self::label(time, 1.0))));
            return Ok(());
        }

        let step = Self::step_for(span / spacing.target_count(available_width) as f64)?;
        arithmetic_ticks(
            min,
            max,
            step,
            spacing.minor_per_major,
            |seconds| {
                let time = unix_seconds_to_datetime_saturating(seconds);
                major.push(Tick::new(time, Some(Self::label(time, step))));
            },
            |seconds| minor.push(Tick::new(unix_seconds_to_datetime_saturating(seconds), None)),
        )
    }
}
