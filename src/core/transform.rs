//! Data -> Interaction -> Screen transformations.

use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::primitives::{
    datetime_to_unix_seconds, decimal_to_f64, f64_to_decimal_saturating,
    unix_seconds_to_datetime_saturating,
};
use crate::core::provider::DataProvider;
use crate::core::values::{InteractionValue, ScreenValue};
use crate::error::{AxisError, AxisResult};

/// Maps a data-space type to interaction space and back.
pub trait DataTransformation {
    type Data: DataProvider;

    fn is_linear(&self) -> bool;

    /// `true` when [`Self::is_discontinuous`] can never report a gap.
    fn is_non_discontinuous(&self) -> bool;

    /// Returns `None` for values outside the transformation's domain
    /// (e.g. non-positive values on a log axis).
    fn transform(&self, value: Self::Data) -> Option<InteractionValue>;

    fn inverse_transform(&self, value: InteractionValue) -> Self::Data;

    /// Whether `a` and `b` lie on opposite sides of a gap, in which case no
    /// line may connect them.
    fn is_discontinuous(&self, _a: Self::Data, _b: Self::Data) -> bool {
        false
    }
}

/// Identity mapping for doubles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearTransformation;

impl DataTransformation for LinearTransformation {
    type Data = f64;

    fn is_linear(&self) -> bool {
        true
    }

    fn is_non_discontinuous(&self) -> bool {
        true
    }

    #[inline]
    fn transform(&self, value: f64) -> Option<InteractionValue> {
        InteractionValue::try_new(value)
    }

    #[inline]
    fn inverse_transform(&self, value: InteractionValue) -> f64 {
        value.get()
    }
}

/// Logarithmic mapping for strictly positive doubles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogTransformation {
    base: f64,
    ln_base: f64,
}

impl LogTransformation {
    pub fn new(base: f64) -> AxisResult<Self> {
        if !base.is_finite() || base <= 0.0 || base == 1.0 {
            return Err(AxisError::InvalidData(
                "log base must be finite, > 0 and != 1".to_owned(),
            ));
        }
        Ok(Self {
            base,
            ln_base: base.ln(),
        })
    }

    #[must_use]
    pub fn base(&self) -> f64 {
        self.base
    }
}

impl Default for LogTransformation {
    fn default() -> Self {
        Self {
            base: 10.0,
            ln_base: std::f64::consts::LN_10,
        }
    }
}

impl DataTransformation for LogTransformation {
    type Data = f64;

    fn is_linear(&self) -> bool {
        false
    }

    fn is_non_discontinuous(&self) -> bool {
        false
    }

    #[inline]
    fn transform(&self, value: f64) -> Option<InteractionValue> {
        if value <= 0.0 {
            return None;
        }
        InteractionValue::try_new(value.ln() / self.ln_base)
    }

    #[inline]
    fn inverse_transform(&self, value: InteractionValue) -> f64 {
        self.base.powf(value.get())
    }

    /// Any pair touching the non-positive half-line straddles the domain edge.
    #[inline]
    fn is_discontinuous(&self, a: f64, b: f64) -> bool {
        !(a > 0.0 && b > 0.0)
    }
}

/// Timestamps mapped to fractional unix seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DateTimeTransformation;

impl DataTransformation for DateTimeTransformation {
    type Data = DateTime<Utc>;

    fn is_linear(&self) -> bool {
        true
    }

    fn is_non_discontinuous(&self) -> bool {
        true
    }

    #[inline]
    fn transform(&self, value: DateTime<Utc>) -> Option<InteractionValue> {
        InteractionValue::try_new(datetime_to_unix_seconds(value))
    }

    #[inline]
    fn inverse_transform(&self, value: InteractionValue) -> DateTime<Utc> {
        unix_seconds_to_datetime_saturating(value.get())
    }
}

/// Fixed-point decimals mapped through `f64`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DecimalTransformation;

impl DataTransformation for DecimalTransformation {
    type Data = Decimal;

    fn is_linear(&self) -> bool {
        true
    }

    fn is_non_discontinuous(&self) -> bool {
        true
    }

    fn transform(&self, value: Decimal) -> Option<InteractionValue> {
        decimal_to_f64(value, "decimal value")
            .ok()
            .and_then(InteractionValue::try_new)
    }

    fn inverse_transform(&self, value: InteractionValue) -> Decimal {
        f64_to_decimal_saturating(value.get())
    }
}

/// Closed interval removed from an axis, in the base transformation's
/// interaction units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    pub start: f64,
    pub end: f64,
}

/// Wraps a base transformation and collapses configured gaps (market-closed
/// hours, weekends, missing acquisition windows) out of interaction space.
///
/// Values inside a gap collapse onto the gap start. Two values separated by a
/// gap are reported as discontinuous so no line bridges the gap.
#[derive(Debug, Clone, PartialEq)]
pub struct GapTransformation<B> {
    base: B,
    gaps: SmallVec<[Gap; 4]>,
    /// Total gap length strictly before gap `i`.
    removed_before: SmallVec<[f64; 4]>,
    /// Gap starts after earlier gaps have been collapsed.
    collapsed_starts: SmallVec<[f64; 4]>,
}

impl<B: DataTransformation> GapTransformation<B> {
    /// Builds the transformation from data-space `(start, end)` pairs.
    ///
    /// Pairs may come in any order; overlapping or touching gaps are merged and
    /// empty ones dropped.
    pub fn new<I>(base: B, gaps: I) -> AxisResult<Self>
    where
        I: IntoIterator<Item = (B::Data, B::Data)>,
    {
        let mut raw: SmallVec<[Gap; 4]> = SmallVec::new();
        for (start, end) in gaps {
            let (Some(a), Some(b)) = (base.transform(start), base.transform(end)) else {
                return Err(AxisError::InvalidData(
                    "gap bounds must lie inside the base transformation domain".to_owned(),
                ));
            };
            let (a, b) = (a.get(), b.get());
            if a != b {
                raw.push(Gap {
                    start: a.min(b),
                    end: a.max(b),
                });
            }
        }
        raw.sort_by_key(|gap| OrderedFloat(gap.start));

        let mut merged: SmallVec<[Gap; 4]> = SmallVec::new();
        for gap in raw {
            if let Some(last) = merged.last_mut() {
                if gap.start <= last.end {
                    last.end = last.end.max(gap.end);
                    continue;
                }
            }
            merged.push(gap);
        }

        let mut removed_before = SmallVec::with_capacity(merged.len());
        let mut collapsed_starts = SmallVec::with_capacity(merged.len());
        let mut removed = 0.0;
        for gap in &merged {
            removed_before.push(removed);
            collapsed_starts.push(gap.start - removed);
            removed += gap.end - gap.start;
        }

        Ok(Self {
            base,
            gaps: merged,
            removed_before,
            collapsed_starts,
        })
    }

    #[must_use]
    pub fn base(&self) -> &B {
        &self.base
    }

    #[must_use]
    pub fn gaps(&self) -> &[Gap] {
        &self.gaps
    }

    fn collapse(&self, raw: f64) -> f64 {
        let below = self.gaps.partition_point(|gap| gap.end <= raw);
        let removed = self.removed_before_index(below);
        match self.gaps.get(below) {
            Some(gap) if gap.start < raw => gap.start - removed,
            _ => raw - removed,
        }
    }

    fn expand(&self, collapsed: f64) -> f64 {
        let below = self
            .collapsed_starts
            .partition_point(|start| *start < collapsed);
        collapsed + self.removed_before_index(below)
    }

    fn removed_before_index(&self, index: usize) -> f64 {
        match self.gaps.get(index) {
            Some(_) => self.removed_before[index],
            None => self
                .gaps
                .last()
                .map_or(0.0, |last| self.removed_before[index - 1] + (last.end - last.start)),
        }
    }
}

impl<B: DataTransformation> DataTransformation for GapTransformation<B> {
    type Data = B::Data;

    fn is_linear(&self) -> bool {
        self.gaps.is_empty() && self.base.is_linear()
    }

    fn is_non_discontinuous(&self) -> bool {
        self.gaps.is_empty() && self.base.is_non_discontinuous()
    }

    fn transform(&self, value: B::Data) -> Option<InteractionValue> {
        let raw = self.base.transform(value)?;
        InteractionValue::try_new(self.collapse(raw.get()))
    }

    fn inverse_transform(&self, value: InteractionValue) -> B::Data {
        self.base
            .inverse_transform(InteractionValue::new(self.expand(value.get())))
    }

    fn is_discontinuous(&self, a: B::Data, b: B::Data) -> bool {
        if self.base.is_discontinuous(a, b) {
            return true;
        }
        if self.gaps.is_empty() {
            return false;
        }
        let (Some(a), Some(b)) = (self.base.transform(a), self.base.transform(b)) else {
            return true;
        };
        let (lo, hi) = (a.get().min(b.get()), a.get().max(b.get()));
        let first = self.gaps.partition_point(|gap| gap.start < lo);
        self.gaps.get(first).is_some_and(|gap| gap.end <= hi)
    }
}

/// Affine Interaction -> Screen mapping: `screen = interaction * scale + offset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InteractionScreenTransformation {
    scale: f64,
    offset: f64,
}

impl Default for InteractionScreenTransformation {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: 0.0,
        }
    }
}

impl InteractionScreenTransformation {
    #[must_use]
    pub fn new(scale: f64, offset: f64) -> Self {
        Self { scale, offset }
    }

    /// Maps `[interaction_min, interaction_max]` onto `[screen_start, screen_end]`.
    ///
    /// Returns `None` when either span is zero or the result is not finite.
    #[must_use]
    pub fn from_bounds(
        interaction_min: InteractionValue,
        interaction_max: InteractionValue,
        screen_start: ScreenValue,
        screen_end: ScreenValue,
    ) -> Option<Self> {
        let interaction_span = (interaction_max - interaction_min).get();
        let screen_span = (screen_end - screen_start).get();
        if interaction_span == 0.0 || screen_span == 0.0 {
            return None;
        }
        let scale = screen_span / interaction_span;
        let offset = screen_start.get() - interaction_min.get() * scale;
        (scale.is_finite() && offset.is_finite()).then_some(Self { scale, offset })
    }

    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[must_use]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    #[inline]
    #[must_use]
    pub fn transform(&self, value: InteractionValue) -> Option<ScreenValue> {
        ScreenValue::try_new(value.get() * self.scale + self.offset)
    }

    #[inline]
    #[must_use]
    pub fn inverse_transform(&self, value: ScreenValue) -> Option<InteractionValue> {
        InteractionValue::try_new((value.get() - self.offset) / self.scale)
    }

    /// Converts a pixel distance into an interaction-space distance.
    #[inline]
    #[must_use]
    pub fn inverse_delta(&self, delta: ScreenValue) -> Option<InteractionValue> {
        InteractionValue::try_new(delta.get() / self.scale)
    }
}

/// Composite Data -> Screen transformation for one axis.
#[derive(Debug, Clone, Copy)]
pub struct AxisScreenTransformation<'a, D> {
    data: &'a D,
    screen: InteractionScreenTransformation,
}

impl<'a, D: DataTransformation> AxisScreenTransformation<'a, D> {
    #[must_use]
    pub fn new(data: &'a D, screen: InteractionScreenTransformation) -> Self {
        Self { data, screen }
    }

    #[must_use]
    pub fn data(&self) -> &'a D {
        self.data
    }

    #[must_use]
    pub fn interaction(&self) -> InteractionScreenTransformation {
        self.screen
    }

    #[inline]
    #[must_use]
    pub fn transform(&self, value: D::Data) -> Option<ScreenValue> {
        self.screen.transform(self.data.transform(value)?)
    }

    #[inline]
    #[must_use]
    pub fn inverse_transform(&self, value: ScreenValue) -> Option<D::Data> {
        self.screen
            .inverse_transform(value)
            .map(|interaction| self.data.inverse_transform(interaction))
    }

    #[inline]
    #[must_use]
    pub fn is_discontinuous(&self, a: D::Data, b: D::Data) -> bool {
        !self.data.is_non_discontinuous() && self.data.is_discontinuous(a, b)
    }

    /// Orders two data values with the axis data type's provider.
    #[inline]
    #[must_use]
    pub fn compare(&self, a: D::Data, b: D::Data) -> std::cmp::Ordering {
        D::Data::compare(a, b)
    }
}
