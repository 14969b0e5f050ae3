use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::transform::{
    AxisScreenTransformation, DataTransformation, InteractionScreenTransformation,
};
use crate::core::values::{InteractionValue, ScreenValue, ValueRange, Viewport};
use crate::error::{AxisError, AxisResult};

/// Tuning controls for view resolution and screen layout of one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisTuning {
    /// Fraction of the data span added below the data minimum when no
    /// explicit view is set.
    pub start_padding_ratio: f64,
    pub end_padding_ratio: f64,
    /// Interaction-space span given to a degenerate (single value) data range.
    pub min_span: f64,
    /// Pixels reserved at the screen start position.
    pub start_margin_px: f64,
    pub end_margin_px: f64,
    /// Pixels by which the clip bounds extend past the actual bounds.
    pub data_margin_px: f64,
}

impl Default for AxisTuning {
    fn default() -> Self {
        Self {
            start_padding_ratio: 0.0,
            end_padding_ratio: 0.0,
            min_span: 1.0,
            start_margin_px: 0.0,
            end_margin_px: 0.0,
            data_margin_px: 0.0,
        }
    }
}

impl AxisTuning {
    pub fn validate(self) -> AxisResult<Self> {
        if !self.start_padding_ratio.is_finite()
            || !self.end_padding_ratio.is_finite()
            || self.start_padding_ratio < 0.0
            || self.end_padding_ratio < 0.0
        {
            return Err(AxisError::InvalidData(
                "axis padding ratios must be finite and >= 0".to_owned(),
            ));
        }

        if !self.min_span.is_finite() || self.min_span <= 0.0 {
            return Err(AxisError::InvalidData(
                "axis min span must be finite and > 0".to_owned(),
            ));
        }

        if !self.start_margin_px.is_finite()
            || !self.end_margin_px.is_finite()
            || !self.data_margin_px.is_finite()
            || self.start_margin_px < 0.0
            || self.end_margin_px < 0.0
        {
            return Err(AxisError::InvalidData(
                "axis margins must be finite and >= 0".to_owned(),
            ));
        }

        Ok(self)
    }
}

/// Lifecycle state of an [`Axis`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisState {
    /// No screen bounds yet; refreshing is a no-op.
    Unconfigured,
    /// Bounds derive from the data range or the default range.
    Unzoomed,
    /// Bounds derive from an explicit view center and radius.
    Zoomed,
}

/// Bounds published by the last successful [`Axis::refresh_view`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisView<T> {
    pub actual_minimum: T,
    pub actual_maximum: T,
    pub clip_minimum: T,
    pub clip_maximum: T,
    pub actual_interaction_minimum: InteractionValue,
    pub actual_interaction_maximum: InteractionValue,
    pub clip_interaction_minimum: InteractionValue,
    pub clip_interaction_maximum: InteractionValue,
    pub interaction_center: InteractionValue,
    pub interaction_radius: InteractionValue,
    pub screen: InteractionScreenTransformation,
}

/// Type-independent, serializable view of an axis for fixtures and debugging.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisViewSnapshot {
    pub state: AxisState,
    pub actual_interaction: (f64, f64),
    pub clip_interaction: (f64, f64),
    pub interaction_center: f64,
    pub interaction_radius: f64,
    pub scale: f64,
    pub offset: f64,
}

impl AxisViewSnapshot {
    pub fn to_json_pretty(&self) -> AxisResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            AxisError::InvalidData(format!("failed to serialize axis view snapshot: {e}"))
        })
    }

    pub fn from_json_str(input: &str) -> AxisResult<Self> {
        serde_json::from_str(input).map_err(|e| {
            AxisError::InvalidData(format!("failed to parse axis view snapshot json: {e}"))
        })
    }
}

/// View-state machine for one axis.
///
/// All view math runs in interaction space. Setters only mark the axis dirty;
/// [`Axis::refresh_view`] is the single place that resolves the center and
/// radius, derives the Interaction -> Screen affine and publishes actual and
/// clip bounds in both interaction and data space.
#[derive(Debug, Clone)]
pub struct Axis<D: DataTransformation> {
    transformation: D,
    tuning: AxisTuning,
    data_range: ValueRange<D::Data>,
    default_range: Option<(D::Data, D::Data)>,
    screen_bounds: Option<(ScreenValue, ScreenValue)>,
    view_center: Option<InteractionValue>,
    view_radius: Option<InteractionValue>,
    view: Option<AxisView<D::Data>>,
    dirty: bool,
}

impl<D: DataTransformation> Axis<D> {
    #[must_use]
    pub fn new(transformation: D) -> Self {
        Self {
            transformation,
            tuning: AxisTuning::default(),
            data_range: ValueRange::empty(),
            default_range: None,
            screen_bounds: None,
            view_center: None,
            view_radius: None,
            view: None,
            dirty: true,
        }
    }

    pub fn with_tuning(transformation: D, tuning: AxisTuning) -> AxisResult<Self> {
        let mut axis = Self::new(transformation);
        axis.tuning = tuning.validate()?;
        Ok(axis)
    }

    #[must_use]
    pub fn transformation(&self) -> &D {
        &self.transformation
    }

    #[must_use]
    pub fn tuning(&self) -> AxisTuning {
        self.tuning
    }

    pub fn set_tuning(&mut self, tuning: AxisTuning) -> AxisResult<()> {
        self.tuning = tuning.validate()?;
        self.dirty = true;
        Ok(())
    }

    #[must_use]
    pub fn state(&self) -> AxisState {
        if self.screen_bounds.is_none() {
            AxisState::Unconfigured
        } else if self.has_explicit_view() {
            AxisState::Zoomed
        } else {
            AxisState::Unzoomed
        }
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Grows the data range by one sample value.
    ///
    /// Values outside the transformation's domain are ignored and reported
    /// with `false`.
    pub fn include(&mut self, value: D::Data) -> bool {
        if self.transformation.transform(value).is_none() {
            return false;
        }
        self.data_range.include(value);
        if !self.has_explicit_view() {
            self.dirty = true;
        }
        true
    }

    pub fn reset_data_max_min(&mut self) {
        self.data_range = ValueRange::empty();
        if !self.has_explicit_view() {
            self.dirty = true;
        }
    }

    #[must_use]
    pub fn data_range(&self) -> ValueRange<D::Data> {
        self.data_range
    }

    /// Range used when no data has been included.
    pub fn set_default_range(&mut self, minimum: D::Data, maximum: D::Data) {
        self.default_range = Some((minimum, maximum));
        self.dirty = true;
    }

    /// Screen positions of the axis start (data minimum) and end (data
    /// maximum). `start > end` describes a reversed axis such as a Y axis
    /// growing upwards.
    pub fn set_screen_bounds(&mut self, start: ScreenValue, end: ScreenValue) {
        if self.screen_bounds != Some((start, end)) {
            self.screen_bounds = Some((start, end));
            self.dirty = true;
        }
    }

    /// Spans the viewport width left to right.
    pub fn configure_horizontal(&mut self, viewport: Viewport) -> AxisResult<()> {
        let viewport = viewport.validate()?;
        self.set_screen_bounds(ScreenValue::ZERO, ScreenValue::new(f64::from(viewport.width)));
        Ok(())
    }

    /// Spans the viewport height bottom to top.
    pub fn configure_vertical(&mut self, viewport: Viewport) -> AxisResult<()> {
        let viewport = viewport.validate()?;
        self.set_screen_bounds(ScreenValue::new(f64::from(viewport.height)), ScreenValue::ZERO);
        Ok(())
    }

    #[must_use]
    pub fn screen_bounds(&self) -> Option<(ScreenValue, ScreenValue)> {
        self.screen_bounds
    }

    #[must_use]
    pub fn view(&self) -> Option<&AxisView<D::Data>> {
        self.view.as_ref()
    }

    #[must_use]
    pub fn actual_minimum(&self) -> Option<D::Data> {
        self.view.map(|view| view.actual_minimum)
    }

    #[must_use]
    pub fn actual_maximum(&self) -> Option<D::Data> {
        self.view.map(|view| view.actual_maximum)
    }

    #[must_use]
    pub fn clip_minimum(&self) -> Option<D::Data> {
        self.view.map(|view| view.clip_minimum)
    }

    #[must_use]
    pub fn clip_maximum(&self) -> Option<D::Data> {
        self.view.map(|view| view.clip_maximum)
    }

    #[must_use]
    pub fn view_interaction_center(&self) -> Option<InteractionValue> {
        self.view_center
    }

    #[must_use]
    pub fn view_interaction_radius(&self) -> Option<InteractionValue> {
        self.view_radius
    }

    /// Composite Data -> Screen transformation of the published view.
    #[must_use]
    pub fn screen_transformation(&self) -> Option<AxisScreenTransformation<'_, D>> {
        self.view
            .map(|view| AxisScreenTransformation::new(&self.transformation, view.screen))
    }

    /// Screen positions of the clip minimum and maximum.
    #[must_use]
    pub fn clip_screen_bounds(&self) -> Option<(ScreenValue, ScreenValue)> {
        let view = self.view?;
        Some((
            view.screen.transform(view.clip_interaction_minimum)?,
            view.screen.transform(view.clip_interaction_maximum)?,
        ))
    }

    /// Screen span covered by the clip bounds, in pixels.
    #[must_use]
    pub fn clip_width_px(&self) -> Option<f64> {
        self.view.map(|view| {
            ((view.clip_interaction_maximum - view.clip_interaction_minimum).get()
                * view.screen.scale())
            .abs()
        })
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<AxisViewSnapshot> {
        self.view.map(|view| AxisViewSnapshot {
            state: self.state(),
            actual_interaction: (
                view.actual_interaction_minimum.get(),
                view.actual_interaction_maximum.get(),
            ),
            clip_interaction: (
                view.clip_interaction_minimum.get(),
                view.clip_interaction_maximum.get(),
            ),
            interaction_center: view.interaction_center.get(),
            interaction_radius: view.interaction_radius.get(),
            scale: view.screen.scale(),
            offset: view.screen.offset(),
        })
    }

    /// Drops any explicit view so bounds follow the data again.
    pub fn reset(&mut self) -> bool {
        self.view_center = None;
        self.view_radius = None;
        self.dirty = true;
        self.refresh_view()
    }

    /// Shrinks (`factor > 1`) or grows (`factor < 1`) the view around its center.
    pub fn zoom_at_center(&mut self, factor: f64) -> AxisResult<bool> {
        validate_zoom_factor(factor)?;
        let Some((center, radius)) = self.current_center_radius() else {
            trace!("zoom ignored: axis has no resolvable range");
            return Ok(false);
        };
        Ok(self.set_explicit_view(center, radius / factor))
    }

    /// Zooms keeping the data under `point` fixed on screen.
    ///
    /// Before the first published view the anchor is unknown and this falls
    /// back to [`Axis::zoom_at_center`].
    pub fn zoom_at(&mut self, point: ScreenValue, factor: f64) -> AxisResult<bool> {
        validate_zoom_factor(factor)?;
        let anchor = self
            .view
            .and_then(|view| view.screen.inverse_transform(point));
        let Some(anchor) = anchor else {
            return self.zoom_at_center(factor);
        };
        let Some((center, radius)) = self.current_center_radius() else {
            return Ok(false);
        };
        let new_center = anchor + (center - anchor) / factor;
        Ok(self.set_explicit_view(new_center, radius / factor))
    }

    /// Shows exactly `[minimum, maximum]`; bounds may come in either order.
    pub fn zoom_to(&mut self, minimum: D::Data, maximum: D::Data) -> AxisResult<bool> {
        let (Some(a), Some(b)) = (
            self.transformation.transform(minimum),
            self.transformation.transform(maximum),
        ) else {
            return Err(AxisError::InvalidData(
                "zoom bounds must lie inside the axis transformation domain".to_owned(),
            ));
        };
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        Ok(self.set_explicit_view((lo + hi) / 2.0, (hi - lo) / 2.0))
    }

    /// Moves the view by an interaction-space delta.
    pub fn pan(&mut self, delta: InteractionValue) -> AxisResult<bool> {
        if !delta.get().is_finite() {
            return Err(AxisError::InvalidData(
                "pan delta must be finite".to_owned(),
            ));
        }
        let Some((center, radius)) = self.current_center_radius() else {
            trace!("pan ignored: axis has no resolvable range");
            return Ok(false);
        };
        Ok(self.set_explicit_view(center + delta, radius))
    }

    /// Drags the content by `delta` pixels: data under the pointer follows it.
    pub fn pan_screen(&mut self, delta: ScreenValue) -> AxisResult<bool> {
        if !delta.get().is_finite() {
            return Err(AxisError::InvalidData(
                "pan delta must be finite".to_owned(),
            ));
        }
        let Some(interaction_delta) = self
            .view
            .and_then(|view| view.screen.inverse_delta(delta))
        else {
            trace!("screen pan ignored: no published view");
            return Ok(false);
        };
        self.pan(-interaction_delta)
    }

    /// Recomputes the published view if anything changed since the last call.
    ///
    /// Returns `true` when new bounds were published. Without screen bounds, a
    /// resolvable range, a non-zero radius and a non-zero plot width the
    /// previous view is kept and the axis stays dirty.
    pub fn refresh_view(&mut self) -> bool {
        if !self.dirty {
            return false;
        }
        let Some((start, end)) = self.screen_bounds else {
            trace!("refresh skipped: axis has no screen bounds");
            return false;
        };
        let Some((center, radius)) = self.current_center_radius() else {
            trace!("refresh skipped: axis has no resolvable range");
            return false;
        };
        if radius.get() <= 0.0 {
            trace!(radius = radius.get(), "refresh skipped: zero view radius");
            return false;
        }

        let direction = (end - start).get().signum();
        let plot_start = start + ScreenValue::new(self.tuning.start_margin_px * direction);
        let plot_end = end - ScreenValue::new(self.tuning.end_margin_px * direction);
        if (plot_end - plot_start).get() * direction <= 0.0 {
            trace!(
                start = start.get(),
                end = end.get(),
                "refresh skipped: zero plot width"
            );
            return false;
        }

        let actual_min = center - radius;
        let actual_max = center + radius;
        let Some(screen) =
            InteractionScreenTransformation::from_bounds(actual_min, actual_max, plot_start, plot_end)
        else {
            trace!("refresh skipped: degenerate interaction to screen mapping");
            return false;
        };

        let margin = InteractionValue::new(self.tuning.data_margin_px / screen.scale().abs());
        let clip_min = actual_min - margin;
        let clip_max = actual_max + margin;

        let view = AxisView {
            actual_minimum: self.transformation.inverse_transform(actual_min),
            actual_maximum: self.transformation.inverse_transform(actual_max),
            clip_minimum: self.transformation.inverse_transform(clip_min),
            clip_maximum: self.transformation.inverse_transform(clip_max),
            actual_interaction_minimum: actual_min,
            actual_interaction_maximum: actual_max,
            clip_interaction_minimum: clip_min,
            clip_interaction_maximum: clip_max,
            interaction_center: center,
            interaction_radius: radius,
            screen,
        };
        debug!(
            state = ?self.state(),
            actual_min = actual_min.get(),
            actual_max = actual_max.get(),
            scale = screen.scale(),
            offset = screen.offset(),
            "axis view refreshed"
        );
        self.view = Some(view);
        self.dirty = false;
        true
    }

    fn has_explicit_view(&self) -> bool {
        self.view_center.is_some() && self.view_radius.is_some()
    }

    fn set_explicit_view(&mut self, center: InteractionValue, radius: InteractionValue) -> bool {
        self.view_center = Some(center);
        self.view_radius = Some(radius.abs());
        self.dirty = true;
        self.refresh_view()
    }

    fn current_center_radius(&self) -> Option<(InteractionValue, InteractionValue)> {
        match (self.view_center, self.view_radius) {
            (Some(center), Some(radius)) => Some((center, radius)),
            _ => self.fallback_center_radius(),
        }
    }

    /// Center and radius derived from the data range, else the default range,
    /// with padding applied.
    fn fallback_center_radius(&self) -> Option<(InteractionValue, InteractionValue)> {
        let (minimum, maximum) = self.data_range.try_get_min_max().or(self.default_range)?;
        let a = self.transformation.transform(minimum)?.get();
        let b = self.transformation.transform(maximum)?.get();
        let (lo, hi) = (a.min(b), a.max(b));
        let span = hi - lo;
        let (lo, hi) = if span == 0.0 {
            let half = self.tuning.min_span / 2.0;
            (lo - half, hi + half)
        } else {
            (
                lo - span * self.tuning.start_padding_ratio,
                hi + span * self.tuning.end_padding_ratio,
            )
        };
        let center = InteractionValue::try_new((lo + hi) / 2.0)?;
        let radius = InteractionValue::try_new((hi - lo) / 2.0)?;
        Some((center, radius))
    }
}

fn validate_zoom_factor(factor: f64) -> AxisResult<()> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(AxisError::InvalidData(
            "zoom factor must be finite and > 0".to_owned(),
        ));
    }
    Ok(())
}
