//! Resumable polyline extraction.
//!
//! [`LineBuilder::next_run`] emits one maximal continuous run per call and
//! keeps all scan state in a caller-owned [`LineCursor`], so a render pass can
//! loop over millions of samples without allocating or rescanning.

use serde::{Deserialize, Serialize};

use crate::core::sampling::XySampleAccess;
use crate::core::transform::{AxisScreenTransformation, DataTransformation};
use crate::core::values::ScreenPoint;
use crate::core::window_search::WindowRange;

/// Projected line segment in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl LineSegment {
    #[must_use]
    pub fn new(start: ScreenPoint, end: ScreenPoint) -> Self {
        Self {
            x1: start.x,
            y1: start.y,
            x2: end.x,
            y2: end.y,
        }
    }
}

/// Position of one coordinate relative to the clip interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClipSide {
    Inside,
    Below,
    Above,
}

impl ClipSide {
    #[inline]
    fn classify(value: f64, min: f64, max: f64) -> Self {
        if value < min {
            Self::Below
        } else if value > max {
            Self::Above
        } else {
            Self::Inside
        }
    }
}

/// Clip classification of a screen point on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipInfo {
    pub x: ClipSide,
    pub y: ClipSide,
}

impl ClipInfo {
    pub const INSIDE: Self = Self {
        x: ClipSide::Inside,
        y: ClipSide::Inside,
    };

    #[must_use]
    pub fn is_inside(self) -> bool {
        self == Self::INSIDE
    }

    /// `true` when both points lie outside on the same side of the same axis,
    /// so the segment joining them can never cross the visible area.
    #[inline]
    #[must_use]
    pub fn should_reject(self, other: Self) -> bool {
        (self.x != ClipSide::Inside && self.x == other.x)
            || (self.y != ClipSide::Inside && self.y == other.y)
    }
}

/// Screen-space clip rectangle with normalized bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipRect {
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
}

impl ClipRect {
    /// Builds the rectangle from two X and two Y positions in any order.
    #[must_use]
    pub fn new(x0: f64, x1: f64, y0: f64, y1: f64) -> Self {
        Self {
            min_x: x0.min(x1),
            max_x: x0.max(x1),
            min_y: y0.min(y1),
            max_y: y0.max(y1),
        }
    }

    /// Rectangle that never clips.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::new(
            f64::NEG_INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::INFINITY,
        )
    }

    #[must_use]
    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    #[must_use]
    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    #[must_use]
    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    #[must_use]
    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    #[inline]
    #[must_use]
    pub fn classify(&self, point: ScreenPoint) -> ClipInfo {
        ClipInfo {
            x: ClipSide::classify(point.x, self.min_x, self.max_x),
            y: ClipSide::classify(point.y, self.min_y, self.max_y),
        }
    }
}

/// Sample projected to screen space, with its data values kept for the
/// discontinuity checks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedSample<X, Y> {
    pub point: ScreenPoint,
    pub clip: ClipInfo,
    pub x: X,
    pub y: Y,
}

/// Scan position carried between [`LineBuilder::next_run`] calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineCursor<X, Y> {
    index: usize,
    end: usize,
    last: Option<ProjectedSample<X, Y>>,
}

impl<X, Y> LineCursor<X, Y> {
    /// Cursor over the half-open index range `start..end`.
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            index: start,
            end: end.max(start),
            last: None,
        }
    }

    #[must_use]
    pub fn full(len: usize) -> Self {
        Self::new(0, len)
    }

    #[must_use]
    pub fn for_window(window: WindowRange) -> Self {
        let range = window.as_range();
        Self::new(range.start, range.end)
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn end(&self) -> usize {
        self.end
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.index >= self.end
    }

    /// Last point emitted by the previous run, if it may still be bridged.
    #[must_use]
    pub fn last(&self) -> Option<&ProjectedSample<X, Y>> {
        self.last.as_ref()
    }
}

/// Projects samples through an X and a Y axis and splits them into runs.
pub struct LineBuilder<'a, S, A, DX, DY>
where
    DX: DataTransformation,
    DY: DataTransformation,
{
    samples: &'a [S],
    access: &'a A,
    x: AxisScreenTransformation<'a, DX>,
    y: AxisScreenTransformation<'a, DY>,
    clip: ClipRect,
}

impl<'a, S, A, DX, DY> LineBuilder<'a, S, A, DX, DY>
where
    A: XySampleAccess<S, X = DX::Data, Y = DY::Data>,
    DX: DataTransformation,
    DY: DataTransformation,
{
    #[must_use]
    pub fn new(
        samples: &'a [S],
        access: &'a A,
        x: AxisScreenTransformation<'a, DX>,
        y: AxisScreenTransformation<'a, DY>,
        clip: ClipRect,
    ) -> Self {
        Self {
            samples,
            access,
            x,
            y,
            clip,
        }
    }

    #[must_use]
    pub fn clip(&self) -> ClipRect {
        self.clip
    }

    #[must_use]
    pub fn cursor(&self) -> LineCursor<DX::Data, DY::Data> {
        LineCursor::full(self.samples.len())
    }

    /// Projects one sample; `None` when any sampling stage rejects it or the
    /// screen position is not finite.
    #[inline]
    pub fn project(&self, sample: &S) -> Option<ProjectedSample<DX::Data, DY::Data>> {
        let (x, y) = self.access.try_xy(sample)?;
        let sx = self.x.transform(x)?;
        let sy = self.y.transform(y)?;
        let point = ScreenPoint::from_values(sx, sy);
        Some(ProjectedSample {
            point,
            clip: self.clip.classify(point),
            x,
            y,
        })
    }

    #[inline]
    fn breaks_between(
        &self,
        a: &ProjectedSample<DX::Data, DY::Data>,
        b: &ProjectedSample<DX::Data, DY::Data>,
    ) -> bool {
        self.x.is_discontinuous(a.x, b.x) || self.y.is_discontinuous(a.y, b.y)
    }

    /// Appends the next continuous run to `continuous` and, when the previous
    /// run left a connectable endpoint, one bridging segment to `broken`.
    ///
    /// A run ends on an invalid sample, a discontinuity on either axis, or two
    /// consecutive points outside the same side of the clip rectangle. In the
    /// last case the cursor skips the whole rejected stretch. It stops on the
    /// stretch's final point when the following sample can connect to it, so
    /// that point opens the next run; otherwise it moves past the stretch. A
    /// run whose only point starts a rejected stretch is dropped. Returns
    /// `true` while the cursor has samples left, even when this call emitted
    /// nothing.
    pub fn next_run(
        &self,
        cursor: &mut LineCursor<DX::Data, DY::Data>,
        continuous: &mut Vec<ScreenPoint>,
        broken: &mut Vec<LineSegment>,
    ) -> bool {
        let end = cursor.end.min(self.samples.len());
        let run_start = continuous.len();
        let mut previous: Option<ProjectedSample<DX::Data, DY::Data>> = None;
        let mut bridge_from = cursor.last.take();

        while cursor.index < end {
            let Some(current) = self.project(&self.samples[cursor.index]) else {
                cursor.index += 1;
                if previous.is_some() {
                    break;
                }
                continue;
            };

            let Some(prev) = previous else {
                if let Some(last) = bridge_from.take() {
                    if !last.clip.should_reject(current.clip) {
                        broken.push(LineSegment::new(last.point, current.point));
                    }
                }
                continuous.push(current.point);
                previous = Some(current);
                cursor.index += 1;
                continue;
            };

            if self.breaks_between(&prev, &current) {
                break;
            }

            if prev.clip.should_reject(current.clip) {
                if continuous.len() - run_start == 1 {
                    continuous.truncate(run_start);
                }
                let (tail, reconnects) = self.skip_rejected(cursor.index, end, current);
                cursor.index = if reconnects { tail } else { tail + 1 };
                if cursor.index >= end {
                    cursor.index = cursor.end;
                }
                cursor.last = None;
                return cursor.index < cursor.end;
            }

            continuous.push(current.point);
            previous = Some(current);
            cursor.index += 1;
        }

        if previous.is_some() {
            cursor.last = previous;
        } else if bridge_from.is_some() {
            // Nothing emitted: keep the open endpoint for the next call.
            cursor.last = bridge_from;
        }
        if cursor.index >= end {
            cursor.index = cursor.end;
        }
        cursor.index < cursor.end
    }

    /// Index of the last point of the rejected stretch starting at `index`,
    /// and whether the sample after it can continue a line from there.
    fn skip_rejected(
        &self,
        index: usize,
        end: usize,
        first: ProjectedSample<DX::Data, DY::Data>,
    ) -> (usize, bool) {
        let mut tail_index = index;
        let mut tail = first;
        let mut scan = index + 1;
        while scan < end {
            let Some(next) = self.project(&self.samples[scan]) else {
                return (tail_index, false);
            };
            if self.breaks_between(&tail, &next) {
                return (tail_index, false);
            }
            if !tail.clip.should_reject(next.clip) {
                return (tail_index, true);
            }
            tail_index = scan;
            tail = next;
            scan += 1;
        }
        (tail_index, false)
    }

    /// Drains every run into the buffers; `on_run` sees each run's point range.
    pub fn build_all<F>(
        &self,
        cursor: &mut LineCursor<DX::Data, DY::Data>,
        continuous: &mut Vec<ScreenPoint>,
        broken: &mut Vec<LineSegment>,
        mut on_run: F,
    ) where
        F: FnMut(std::ops::Range<usize>),
    {
        loop {
            let start = continuous.len();
            let more = self.next_run(cursor, continuous, broken);
            if continuous.len() > start {
                on_run(start..continuous.len());
            }
            if !more {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ClipInfo, ClipRect, ClipSide, LineBuilder, LineCursor};
    use crate::core::sampling::{AcceptAll, XySamplers, finite};
    use crate::core::transform::{
        AxisScreenTransformation, GapTransformation, InteractionScreenTransformation,
        LinearTransformation,
    };
    use crate::core::values::{InteractionValue, ScreenPoint, ScreenValue};

    fn affine() -> InteractionScreenTransformation {
        InteractionScreenTransformation::from_bounds(
            InteractionValue::new(0.0),
            InteractionValue::new(10.0),
            ScreenValue::new(0.0),
            ScreenValue::new(100.0),
        )
        .expect("non-degenerate")
    }

    fn access() -> XySamplers<
        AcceptAll,
        fn(&(f64, f64)) -> Option<f64>,
        fn(&(f64, f64)) -> Option<f64>,
    > {
        XySamplers::new(
            AcceptAll,
            |s: &(f64, f64)| finite(s.0),
            |s: &(f64, f64)| finite(s.1),
        )
    }

    #[test]
    fn should_reject_only_same_side() {
        let below_x = ClipInfo {
            x: ClipSide::Below,
            y: ClipSide::Inside,
        };
        let above_x = ClipInfo {
            x: ClipSide::Above,
            y: ClipSide::Inside,
        };
        assert!(below_x.should_reject(below_x));
        assert!(!below_x.should_reject(above_x));
        assert!(!below_x.should_reject(ClipInfo::INSIDE));
        assert!(!ClipInfo::INSIDE.should_reject(ClipInfo::INSIDE));
    }

    #[test]
    fn clip_rect_normalizes_bounds() {
        let rect = ClipRect::new(10.0, 0.0, 5.0, -5.0);
        assert_eq!(rect.min_x(), 0.0);
        assert_eq!(rect.max_y(), 5.0);
        assert!(rect.classify(ScreenPoint::new(5.0, 0.0)).is_inside());
        assert_eq!(rect.classify(ScreenPoint::new(-1.0, 6.0)).y, ClipSide::Above);
    }

    #[test]
    fn invalid_sample_splits_runs_and_bridges() {
        let samples = [(0.0, 0.0), (1.0, 1.0), (f64::NAN, 2.0), (3.0, 3.0), (4.0, 4.0)];
        let access = access();
        let x = LinearTransformation;
        let y = LinearTransformation;
        let builder = LineBuilder::new(
            &samples,
            &access,
            AxisScreenTransformation::new(&x, affine()),
            AxisScreenTransformation::new(&y, affine()),
            ClipRect::new(0.0, 100.0, 0.0, 100.0),
        );

        let mut cursor = builder.cursor();
        let mut continuous = Vec::new();
        let mut broken = Vec::new();

        assert!(builder.next_run(&mut cursor, &mut continuous, &mut broken));
        assert_eq!(continuous.len(), 2);
        assert!(broken.is_empty());
        assert_eq!(cursor.index(), 3);

        continuous.clear();
        assert!(!builder.next_run(&mut cursor, &mut continuous, &mut broken));
        assert_eq!(continuous, vec![ScreenPoint::new(30.0, 30.0), ScreenPoint::new(40.0, 40.0)]);
        assert_eq!(broken.len(), 1);
        assert_eq!((broken[0].x1, broken[0].x2), (10.0, 30.0));
    }

    #[test]
    fn discontinuity_breaks_without_consuming_sample() {
        let samples = [(1.0, 1.0), (2.0, 2.0), (6.0, 3.0), (7.0, 4.0)];
        let access = access();
        let x = GapTransformation::new(LinearTransformation, [(3.0, 5.0)]).expect("valid gap");
        let y = LinearTransformation;
        let builder = LineBuilder::new(
            &samples,
            &access,
            AxisScreenTransformation::new(&x, affine()),
            AxisScreenTransformation::new(&y, affine()),
            ClipRect::unbounded(),
        );

        let mut cursor = builder.cursor();
        let mut continuous = Vec::new();
        let mut broken = Vec::new();
        assert!(builder.next_run(&mut cursor, &mut continuous, &mut broken));
        assert_eq!(continuous.len(), 2);
        assert_eq!(cursor.index(), 2);
        assert!(!builder.next_run(&mut cursor, &mut continuous, &mut broken));
        assert_eq!(continuous.len(), 4);
        assert_eq!(broken.len(), 1);
    }

    #[test]
    fn same_side_rejection_skips_hidden_stretch() {
        // Points 1..=3 sit above the clip rectangle.
        let samples = [(0.0, 5.0), (1.0, 20.0), (2.0, 30.0), (3.0, 40.0), (4.0, 5.0)];
        let access = access();
        let x = LinearTransformation;
        let y = LinearTransformation;
        let builder = LineBuilder::new(
            &samples,
            &access,
            AxisScreenTransformation::new(&x, affine()),
            AxisScreenTransformation::new(&y, affine()),
            ClipRect::new(0.0, 100.0, 0.0, 100.0),
        );

        let mut cursor = LineCursor::full(samples.len());
        let mut continuous = Vec::new();
        let mut broken = Vec::new();
        let mut runs = Vec::new();
        builder.build_all(&mut cursor, &mut continuous, &mut broken, |run| runs.push(run));

        // Entry edge, then the last hidden point opens the exit edge.
        assert_eq!(runs, vec![0..2, 2..4]);
        assert_eq!(continuous[2], ScreenPoint::new(30.0, 400.0));
        assert!(broken.is_empty());
        assert!(cursor.is_finished());
    }

    #[test]
    fn hidden_stretch_opens_no_lone_point_runs() {
        let access = access();
        let x = LinearTransformation;
        let y = LinearTransformation;
        let clip = ClipRect::new(0.0, 100.0, 0.0, 100.0);

        // Every point above the clip rectangle.
        let hidden = [(0.0, 20.0), (1.0, 30.0), (2.0, 40.0)];
        let builder = LineBuilder::new(
            &hidden,
            &access,
            AxisScreenTransformation::new(&x, affine()),
            AxisScreenTransformation::new(&y, affine()),
            clip,
        );
        let mut cursor = builder.cursor();
        let mut continuous = Vec::new();
        let mut broken = Vec::new();
        let mut runs = Vec::new();
        builder.build_all(&mut cursor, &mut continuous, &mut broken, |run| runs.push(run));
        assert!(runs.is_empty());
        assert!(continuous.is_empty());
        assert!(cursor.is_finished());

        // Visible head, then a stretch that never comes back.
        let trailing = [(0.0, 5.0), (1.0, 20.0), (2.0, 30.0), (3.0, 40.0)];
        let builder = LineBuilder::new(
            &trailing,
            &access,
            AxisScreenTransformation::new(&x, affine()),
            AxisScreenTransformation::new(&y, affine()),
            clip,
        );
        let mut cursor = builder.cursor();
        let mut runs = Vec::new();
        builder.build_all(&mut cursor, &mut continuous, &mut broken, |run| runs.push(run));
        assert_eq!(runs, vec![0..2]);
        assert!(cursor.is_finished());
    }
}
