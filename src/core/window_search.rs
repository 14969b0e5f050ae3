//! Binary search over monotone, possibly gappy sample sequences.
//!
//! Samples that fail their filter or sampler are invisible to the search:
//! when a midpoint lands on one, the search scans forward inside the current
//! sub-interval for a valid sample and collapses that half when none exists.
//! Bounds err outward by one valid sample so a polyline entering or leaving
//! the window keeps its edge segment; downstream clipping culls the extra.

use serde::{Deserialize, Serialize};

use crate::core::monotonicity::{Monotonicity, SearchDirection};
use crate::core::provider::{DataProvider, max_of, min_of};
use crate::core::sampling::{SampleFilter, ValueSampler, XySampleAccess};
use crate::error::{AxisError, AxisResult};

/// Inclusive index range `[start, end]` into a sample slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRange {
    pub start: usize,
    pub end: usize,
}

impl WindowRange {
    /// Number of indices covered; never zero.
    #[must_use]
    pub fn count(self) -> usize {
        self.end - self.start + 1
    }

    #[must_use]
    pub fn contains(self, index: usize) -> bool {
        self.start <= index && index <= self.end
    }

    /// Half-open equivalent, for slicing.
    #[must_use]
    pub fn as_range(self) -> std::ops::Range<usize> {
        self.start..self.end + 1
    }
}

#[derive(Debug, Clone, Copy)]
struct Bounds<T> {
    min: T,
    max: T,
}

impl<T: DataProvider> Bounds<T> {
    fn new((a, b): (T, T)) -> Self {
        Self {
            min: min_of(a, b),
            max: max_of(a, b),
        }
    }

    #[inline]
    fn is_before(&self, direction: SearchDirection, value: T) -> bool {
        match direction {
            SearchDirection::Increasing => T::compare(value, self.min).is_lt(),
            SearchDirection::Decreasing => T::compare(value, self.max).is_gt(),
        }
    }

    #[inline]
    fn is_after(&self, direction: SearchDirection, value: T) -> bool {
        match direction {
            SearchDirection::Increasing => T::compare(value, self.max).is_gt(),
            SearchDirection::Decreasing => T::compare(value, self.min).is_lt(),
        }
    }
}

fn direction_of(monotonicity: Monotonicity) -> AxisResult<SearchDirection> {
    monotonicity
        .search_direction()
        .ok_or(AxisError::NotMonotonic(monotonicity))
}

/// First index whose valid samples, from there on, all fail `predicate`.
///
/// `predicate` returns `None` for invalid samples and must be monotone
/// (`true...true false...false`) over the valid ones.
fn partition_valid<S>(samples: &[S], predicate: impl Fn(&S) -> Option<bool>) -> usize {
    let (mut lo, mut hi) = (0, samples.len());
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        let mut scan = mid;
        let verdict = loop {
            if scan >= hi {
                break None;
            }
            match predicate(&samples[scan]) {
                Some(verdict) => break Some(verdict),
                None => scan += 1,
            }
        };
        match verdict {
            Some(true) => lo = scan + 1,
            // Either `scan` is past the boundary or [mid, hi) holds no valid
            // sample; both let the upper half collapse.
            Some(false) | None => hi = mid,
        }
    }
    lo
}

fn previous_valid<S>(samples: &[S], from: usize, is_valid: impl Fn(&S) -> bool) -> Option<usize> {
    samples[..from].iter().rposition(is_valid)
}

fn next_valid<S>(samples: &[S], from: usize, is_valid: impl Fn(&S) -> bool) -> Option<usize> {
    samples[from..]
        .iter()
        .position(is_valid)
        .map(|offset| from + offset)
}

fn window_start_by<S>(
    samples: &[S],
    before: impl Fn(&S) -> Option<bool>,
    is_valid: impl Fn(&S) -> bool + Copy,
) -> Option<usize> {
    let boundary = partition_valid(samples, before);
    previous_valid(samples, boundary, is_valid).or_else(|| next_valid(samples, boundary, is_valid))
}

fn window_end_by<S>(
    samples: &[S],
    after: impl Fn(&S) -> Option<bool>,
    is_valid: impl Fn(&S) -> bool + Copy,
) -> Option<usize> {
    let boundary = partition_valid(samples, |sample| after(sample).map(|is_after| !is_after));
    next_valid(samples, boundary, is_valid).or_else(|| previous_valid(samples, boundary, is_valid))
}

#[inline]
fn sample_value<S, T, F, V>(filter: &F, sampler: &V, sample: &S) -> Option<T>
where
    F: SampleFilter<S> + ?Sized,
    V: ValueSampler<S, T> + ?Sized,
{
    if filter.filter(sample) {
        sampler.try_sample(sample)
    } else {
        None
    }
}

/// Index of the first sample that can fall inside `window`, stepped back to
/// the preceding valid sample when there is one.
///
/// Returns `Ok(None)` when no sample is valid, and
/// [`AxisError::NotMonotonic`] when `monotonicity` has no search direction.
pub fn find_window_start<S, T, F, V>(
    samples: &[S],
    monotonicity: Monotonicity,
    filter: &F,
    sampler: &V,
    window: (T, T),
) -> AxisResult<Option<usize>>
where
    T: DataProvider,
    F: SampleFilter<S> + ?Sized,
    V: ValueSampler<S, T> + ?Sized,
{
    let direction = direction_of(monotonicity)?;
    let bounds = Bounds::new(window);
    Ok(window_start_by(
        samples,
        |sample| sample_value(filter, sampler, sample).map(|v| bounds.is_before(direction, v)),
        |sample| sample_value(filter, sampler, sample).is_some(),
    ))
}

/// Index of the last sample that can fall inside `window`, stepped forward to
/// the following valid sample when there is one.
pub fn find_window_end<S, T, F, V>(
    samples: &[S],
    monotonicity: Monotonicity,
    filter: &F,
    sampler: &V,
    window: (T, T),
) -> AxisResult<Option<usize>>
where
    T: DataProvider,
    F: SampleFilter<S> + ?Sized,
    V: ValueSampler<S, T> + ?Sized,
{
    let direction = direction_of(monotonicity)?;
    let bounds = Bounds::new(window);
    Ok(window_end_by(
        samples,
        |sample| sample_value(filter, sampler, sample).map(|v| bounds.is_after(direction, v)),
        |sample| sample_value(filter, sampler, sample).is_some(),
    ))
}

/// Inclusive index range overlapping `window` in data space.
///
/// An empty slice yields `Ok(None)` regardless of `monotonicity`.
pub fn find_window<S, T, F, V>(
    samples: &[S],
    monotonicity: Monotonicity,
    filter: &F,
    sampler: &V,
    window: (T, T),
) -> AxisResult<Option<WindowRange>>
where
    T: DataProvider,
    F: SampleFilter<S> + ?Sized,
    V: ValueSampler<S, T> + ?Sized,
{
    if samples.is_empty() {
        return Ok(None);
    }
    let start = find_window_start(samples, monotonicity, filter, sampler, window)?;
    let end = find_window_end(samples, monotonicity, filter, sampler, window)?;
    Ok(start.zip(end).map(|(start, end)| WindowRange {
        start: start.min(end),
        end: start.max(end),
    }))
}

/// Monotonicity and window of both axes for [`find_xy_window`].
#[derive(Debug, Clone, Copy)]
pub struct XyWindowQuery<X, Y> {
    pub x_monotonicity: Monotonicity,
    pub y_monotonicity: Monotonicity,
    pub x_window: (X, X),
    pub y_window: (Y, Y),
}

/// Windowed search over paired samples where either axis may be monotone.
///
/// Axes without a search direction are ignored; a sample lies before (after)
/// the window when any directed axis says so. Fails when neither axis has a
/// direction.
pub fn find_xy_window<S, A>(
    samples: &[S],
    access: &A,
    query: XyWindowQuery<A::X, A::Y>,
) -> AxisResult<Option<WindowRange>>
where
    A: XySampleAccess<S> + ?Sized,
    A::X: DataProvider,
    A::Y: DataProvider,
{
    if samples.is_empty() {
        return Ok(None);
    }
    let x_direction = query.x_monotonicity.search_direction();
    let y_direction = query.y_monotonicity.search_direction();
    if x_direction.is_none() && y_direction.is_none() {
        return Err(AxisError::NotMonotonic(query.x_monotonicity));
    }
    let x_bounds = Bounds::new(query.x_window);
    let y_bounds = Bounds::new(query.y_window);

    let is_valid = |sample: &S| access.try_xy(sample).is_some();
    let before = |sample: &S| {
        access.try_xy(sample).map(|(x, y)| {
            x_direction.is_some_and(|d| x_bounds.is_before(d, x))
                || y_direction.is_some_and(|d| y_bounds.is_before(d, y))
        })
    };
    let after = |sample: &S| {
        access.try_xy(sample).map(|(x, y)| {
            x_direction.is_some_and(|d| x_bounds.is_after(d, x))
                || y_direction.is_some_and(|d| y_bounds.is_after(d, y))
        })
    };

    let start = window_start_by(samples, before, is_valid);
    let end = window_end_by(samples, after, is_valid);
    Ok(start.zip(end).map(|(start, end)| WindowRange {
        start: start.min(end),
        end: start.max(end),
    }))
}
