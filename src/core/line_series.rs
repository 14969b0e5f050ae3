use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::axis::Axis;
use crate::core::decimate::decimate_run;
use crate::core::line_builder::{ClipRect, LineBuilder, LineCursor, LineSegment};
use crate::core::monotonicity::{XySequence, analyze_xy};
use crate::core::provider::DataProvider;
use crate::core::sampling::XySampleAccess;
use crate::core::transform::DataTransformation;
use crate::core::values::ScreenPoint;
use crate::core::window_search::{XyWindowQuery, find_xy_window};
use crate::error::AxisResult;

/// How a series narrows the scanned index range to the visible window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowingMode {
    /// Window when the cached analysis allows it, scan everything otherwise.
    #[default]
    Auto,
    /// Window or fail: an unusable analysis surfaces as
    /// [`AxisError::NotMonotonic`](crate::AxisError::NotMonotonic).
    Required,
    /// Always scan every sample.
    Disabled,
}

/// Reusable output of [`LineSeries::render`].
///
/// `points` holds every continuous run back to back; `runs` indexes into it.
#[derive(Debug, Clone, Default)]
pub struct LineGeometry {
    points: Vec<ScreenPoint>,
    runs: Vec<Range<usize>>,
    broken: Vec<LineSegment>,
    scratch: Vec<ScreenPoint>,
}

impl LineGeometry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empties all buffers, keeping their capacity.
    pub fn clear(&mut self) {
        self.points.clear();
        self.runs.clear();
        self.broken.clear();
        self.scratch.clear();
    }

    #[must_use]
    pub fn points(&self) -> &[ScreenPoint] {
        &self.points
    }

    pub fn runs(&self) -> impl Iterator<Item = &[ScreenPoint]> + '_ {
        self.runs.iter().map(|run| &self.points[run.clone()])
    }

    #[must_use]
    pub fn run_ranges(&self) -> &[Range<usize>] {
        &self.runs
    }

    /// Bridging segments drawn across breaks in the line.
    #[must_use]
    pub fn broken(&self) -> &[LineSegment] {
        &self.broken
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.broken.is_empty()
    }
}

/// Owning line series: samples, their accessor, and a cached analysis.
///
/// The X/Y analysis is computed lazily and dropped on every mutation, so
/// repeated renders of an unchanged series never rescan it for monotonicity.
#[derive(Debug, Clone)]
pub struct LineSeries<S, A>
where
    A: XySampleAccess<S>,
{
    samples: Vec<S>,
    access: A,
    windowing: WindowingMode,
    decimate: bool,
    analysis: Option<XySequence<A::X, A::Y>>,
}

impl<S, A> LineSeries<S, A>
where
    A: XySampleAccess<S>,
    A::X: DataProvider,
    A::Y: DataProvider,
{
    #[must_use]
    pub fn new(access: A) -> Self {
        Self::with_samples(access, Vec::new())
    }

    #[must_use]
    pub fn with_samples(access: A, samples: Vec<S>) -> Self {
        Self {
            samples,
            access,
            windowing: WindowingMode::Auto,
            decimate: false,
            analysis: None,
        }
    }

    #[must_use]
    pub fn samples(&self) -> &[S] {
        &self.samples
    }

    #[must_use]
    pub fn access(&self) -> &A {
        &self.access
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn push(&mut self, sample: S) {
        self.samples.push(sample);
        self.analysis = None;
    }

    pub fn set_samples(&mut self, samples: Vec<S>) {
        self.samples = samples;
        self.analysis = None;
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.analysis = None;
    }

    /// Mutable access to the samples; the cached analysis is dropped.
    pub fn samples_mut(&mut self) -> &mut Vec<S> {
        self.analysis = None;
        &mut self.samples
    }

    #[must_use]
    pub fn windowing(&self) -> WindowingMode {
        self.windowing
    }

    pub fn set_windowing(&mut self, mode: WindowingMode) {
        self.windowing = mode;
    }

    #[must_use]
    pub fn decimation(&self) -> bool {
        self.decimate
    }

    /// Reduces every emitted run to at most four points per pixel column.
    pub fn set_decimation(&mut self, enabled: bool) {
        self.decimate = enabled;
    }

    #[must_use]
    pub fn is_analysis_cached(&self) -> bool {
        self.analysis.is_some()
    }

    /// Monotonicity and extrema of the accepted (X, Y) pairs.
    pub fn analysis(&mut self) -> &XySequence<A::X, A::Y> {
        let samples = &self.samples;
        let access = &self.access;
        self.analysis.get_or_insert_with(|| {
            let sequence = analyze_xy(samples, access);
            trace!(
                samples = samples.len(),
                accepted = sequence.x.count(),
                x_monotonicity = ?sequence.x.monotonicity(),
                y_monotonicity = ?sequence.y.monotonicity(),
                "line series analyzed"
            );
            sequence
        })
    }

    /// Data pass: includes every accepted (X, Y) pair into the axes.
    ///
    /// Each value goes through [`Axis::include`] on its own, so values outside
    /// an axis' domain (non-positive Y on a log axis) drop out individually.
    pub fn include_into<DX, DY>(&self, x_axis: &mut Axis<DX>, y_axis: &mut Axis<DY>)
    where
        DX: DataTransformation<Data = A::X>,
        DY: DataTransformation<Data = A::Y>,
    {
        let mut accepted = 0_usize;
        for sample in &self.samples {
            if let Some((x, y)) = self.access.try_xy(sample) {
                x_axis.include(x);
                y_axis.include(y);
                accepted += 1;
            }
        }
        trace!(samples = self.samples.len(), accepted, "line series data pass");
    }

    /// Half-open index range worth scanning for the axes' current clip bounds.
    ///
    /// Fails only in [`WindowingMode::Required`] when neither axis is monotone.
    pub fn visible_range<DX, DY>(
        &mut self,
        x_axis: &Axis<DX>,
        y_axis: &Axis<DY>,
    ) -> AxisResult<Range<usize>>
    where
        DX: DataTransformation<Data = A::X>,
        DY: DataTransformation<Data = A::Y>,
    {
        let all = 0..self.samples.len();
        if self.windowing == WindowingMode::Disabled {
            return Ok(all);
        }
        let (Some(x_view), Some(y_view)) = (x_axis.view(), y_axis.view()) else {
            return Ok(all);
        };
        let analysis = *self.analysis();
        let query = XyWindowQuery {
            x_monotonicity: analysis.x.monotonicity(),
            y_monotonicity: analysis.y.monotonicity(),
            x_window: (x_view.clip_minimum, x_view.clip_maximum),
            y_window: (y_view.clip_minimum, y_view.clip_maximum),
        };
        match find_xy_window(&self.samples, &self.access, query) {
            Ok(Some(window)) => Ok(window.as_range()),
            Ok(None) => Ok(0..0),
            Err(err) if self.windowing == WindowingMode::Required => Err(err),
            Err(err) => {
                trace!(error = %err, "line series not windowable; scanning all samples");
                Ok(all)
            }
        }
    }

    /// Appends the visible polyline to `geometry`.
    ///
    /// Returns `Ok(false)` without touching `geometry` when either axis has no
    /// published view yet. Errors come from [`LineSeries::visible_range`].
    pub fn render<DX, DY>(
        &mut self,
        x_axis: &Axis<DX>,
        y_axis: &Axis<DY>,
        geometry: &mut LineGeometry,
    ) -> AxisResult<bool>
    where
        DX: DataTransformation<Data = A::X>,
        DY: DataTransformation<Data = A::Y>,
    {
        let (Some((x0, x1)), Some((y0, y1))) =
            (x_axis.clip_screen_bounds(), y_axis.clip_screen_bounds())
        else {
            trace!("line series render skipped: axes have no published view");
            return Ok(false);
        };
        let range = self.visible_range(x_axis, y_axis)?;
        let (Some(x), Some(y)) = (x_axis.screen_transformation(), y_axis.screen_transformation())
        else {
            return Ok(false);
        };
        let clip = ClipRect::new(x0.get(), x1.get(), y0.get(), y1.get());
        let builder = LineBuilder::new(&self.samples, &self.access, x, y, clip);
        let mut cursor = LineCursor::new(range.start, range.end);

        let LineGeometry {
            points,
            runs,
            broken,
            scratch,
        } = geometry;
        loop {
            let start = points.len();
            let more = if self.decimate {
                scratch.clear();
                let more = builder.next_run(&mut cursor, scratch, broken);
                decimate_run(scratch, points);
                more
            } else {
                builder.next_run(&mut cursor, points, broken)
            };
            if points.len() > start {
                runs.push(start..points.len());
            }
            if !more {
                break;
            }
        }

        trace!(
            scanned = range.len(),
            points = points.len(),
            runs = runs.len(),
            broken = broken.len(),
            "line series rendered"
        );
        Ok(true)
    }
}
