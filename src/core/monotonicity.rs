//! Single-pass monotonicity and extrema tracking over sample streams.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel-analysis")]
use rayon::prelude::*;

use crate::core::provider::{DataProvider, max_of, min_of};
use crate::core::sampling::{SampleFilter, ValueSampler, XySampleAccess};
use crate::core::values::ValueRange;

const SAW_INCREASE: u8 = 0b001;
const SAW_DECREASE: u8 = 0b010;
const SAW_REPEAT: u8 = 0b100;
const SAW_VALUE: u8 = 0b1000;

/// Direction a monotone, non-constant sequence runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchDirection {
    Increasing,
    Decreasing,
}

impl SearchDirection {
    /// `+1` for increasing, `-1` for decreasing.
    #[must_use]
    pub fn sign(self) -> i8 {
        match self {
            Self::Increasing => 1,
            Self::Decreasing => -1,
        }
    }
}

/// Compact record of whether a sequence increased, decreased and/or repeated.
///
/// Predicates over an empty sequence hold vacuously, so an empty descriptor is
/// also constant, non-decreasing and strictly increasing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Monotonicity {
    bits: u8,
}

impl Monotonicity {
    pub const EMPTY: Self = Self { bits: 0 };

    #[must_use]
    pub fn saw_increase(self) -> bool {
        self.bits & SAW_INCREASE != 0
    }

    #[must_use]
    pub fn saw_decrease(self) -> bool {
        self.bits & SAW_DECREASE != 0
    }

    #[must_use]
    pub fn saw_repeat(self) -> bool {
        self.bits & SAW_REPEAT != 0
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.bits & SAW_VALUE == 0
    }

    #[must_use]
    pub fn is_constant(self) -> bool {
        !self.saw_increase() && !self.saw_decrease()
    }

    #[must_use]
    pub fn is_non_decreasing(self) -> bool {
        !self.saw_decrease()
    }

    #[must_use]
    pub fn is_non_increasing(self) -> bool {
        !self.saw_increase()
    }

    #[must_use]
    pub fn is_strictly_increasing(self) -> bool {
        !self.saw_decrease() && !self.saw_repeat()
    }

    #[must_use]
    pub fn is_strictly_decreasing(self) -> bool {
        !self.saw_increase() && !self.saw_repeat()
    }

    #[must_use]
    pub fn is_monotone(self) -> bool {
        !(self.saw_increase() && self.saw_decrease())
    }

    #[must_use]
    pub fn is_not_monotonic(self) -> bool {
        !self.is_monotone()
    }

    /// Direction usable for binary search: monotone and not constant.
    #[must_use]
    pub fn search_direction(self) -> Option<SearchDirection> {
        match (self.saw_increase(), self.saw_decrease()) {
            (true, false) => Some(SearchDirection::Increasing),
            (false, true) => Some(SearchDirection::Decreasing),
            _ => None,
        }
    }

    /// Descriptor of two sequences laid end to end, given how the last value
    /// of `self` compares to the first value of `next`.
    #[must_use]
    pub fn concat(self, next: Self, boundary: Option<Ordering>) -> Self {
        let mut merged = Self {
            bits: self.bits | next.bits,
        };
        if let Some(ordering) = boundary {
            merged.observe(ordering);
        }
        merged
    }

    #[inline]
    fn observe(&mut self, ordering: Ordering) {
        self.bits |= match ordering {
            Ordering::Less => SAW_INCREASE,
            Ordering::Greater => SAW_DECREASE,
            Ordering::Equal => SAW_REPEAT,
        };
    }

    #[inline]
    fn mark_value(&mut self) {
        self.bits |= SAW_VALUE;
    }
}

/// Online monotonicity, count, and min/max tracker.
///
/// `next` compares against the last accepted value; callers reject invalid
/// samples before calling it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequenceTracker<T> {
    count: usize,
    first: Option<T>,
    last: Option<T>,
    minimum: Option<T>,
    maximum: Option<T>,
    monotonicity: Monotonicity,
}

impl<T> Default for SequenceTracker<T> {
    fn default() -> Self {
        Self {
            count: 0,
            first: None,
            last: None,
            minimum: None,
            maximum: None,
            monotonicity: Monotonicity::EMPTY,
        }
    }
}

impl<T: DataProvider> SequenceTracker<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn next(&mut self, value: T) {
        match self.last {
            None => {
                self.first = Some(value);
                self.minimum = Some(value);
                self.maximum = Some(value);
                self.monotonicity.mark_value();
            }
            Some(last) => {
                self.monotonicity.observe(T::compare(last, value));
                self.minimum = self.minimum.map(|min| min_of(min, value));
                self.maximum = self.maximum.map(|max| max_of(max, value));
            }
        }
        self.last = Some(value);
        self.count += 1;
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn minimum(&self) -> Option<T> {
        self.minimum
    }

    #[must_use]
    pub fn maximum(&self) -> Option<T> {
        self.maximum
    }

    #[must_use]
    pub fn first(&self) -> Option<T> {
        self.first
    }

    #[must_use]
    pub fn last(&self) -> Option<T> {
        self.last
    }

    #[must_use]
    pub fn monotonicity(&self) -> Monotonicity {
        self.monotonicity
    }

    #[must_use]
    pub fn range(&self) -> ValueRange<T> {
        match (self.minimum, self.maximum) {
            (Some(min), Some(max)) => ValueRange::new(min, max),
            _ => ValueRange::empty(),
        }
    }

    /// Tracker state after observing `self`'s values followed by `next`'s.
    #[must_use]
    pub fn merge(self, next: Self) -> Self {
        if self.is_empty() {
            return next;
        }
        if next.is_empty() {
            return self;
        }
        let boundary = self
            .last
            .zip(next.first)
            .map(|(last, first)| T::compare(last, first));
        Self {
            count: self.count + next.count,
            first: self.first,
            last: next.last,
            minimum: self.minimum.zip(next.minimum).map(|(a, b)| min_of(a, b)),
            maximum: self.maximum.zip(next.maximum).map(|(a, b)| max_of(a, b)),
            monotonicity: self.monotonicity.concat(next.monotonicity, boundary),
        }
    }
}

/// Runs `filter` and `sampler` over `samples` and tracks every accepted value.
pub fn analyze<S, T, F, V>(samples: &[S], filter: &F, sampler: &V) -> SequenceTracker<T>
where
    T: DataProvider,
    F: SampleFilter<S> + ?Sized,
    V: ValueSampler<S, T> + ?Sized,
{
    let mut tracker = SequenceTracker::new();
    for sample in samples {
        if !filter.filter(sample) {
            continue;
        }
        if let Some(value) = sampler.try_sample(sample) {
            tracker.next(value);
        }
    }
    tracker
}

/// Per-axis trackers for paired samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XySequence<X, Y> {
    pub x: SequenceTracker<X>,
    pub y: SequenceTracker<Y>,
}

impl<X, Y> Default for XySequence<X, Y> {
    fn default() -> Self {
        Self {
            x: SequenceTracker::default(),
            y: SequenceTracker::default(),
        }
    }
}

impl<X: DataProvider, Y: DataProvider> XySequence<X, Y> {
    #[must_use]
    pub fn merge(self, next: Self) -> Self {
        Self {
            x: self.x.merge(next.x),
            y: self.y.merge(next.y),
        }
    }
}

/// Tracks X and Y jointly: a sample counts only when it passes every stage
/// of `access`.
pub fn analyze_xy<S, A>(samples: &[S], access: &A) -> XySequence<A::X, A::Y>
where
    A: XySampleAccess<S> + ?Sized,
    A::X: DataProvider,
    A::Y: DataProvider,
{
    let mut sequence = XySequence::default();
    for sample in samples {
        if let Some((x, y)) = access.try_xy(sample) {
            sequence.x.next(x);
            sequence.y.next(y);
        }
    }
    sequence
}

/// Chunk length used by the parallel analysis.
#[cfg(feature = "parallel-analysis")]
pub const PARALLEL_CHUNK_LEN: usize = 64 * 1024;

/// Parallel [`analyze`]; produces the same tracker as the sequential pass.
#[cfg(feature = "parallel-analysis")]
pub fn analyze_parallel<S, T, F, V>(samples: &[S], filter: &F, sampler: &V) -> SequenceTracker<T>
where
    S: Sync,
    T: DataProvider + Send,
    F: SampleFilter<S> + Sync + ?Sized,
    V: ValueSampler<S, T> + Sync + ?Sized,
{
    samples
        .par_chunks(PARALLEL_CHUNK_LEN)
        .map(|chunk| analyze(chunk, filter, sampler))
        .reduce(SequenceTracker::new, SequenceTracker::merge)
}

/// Parallel [`analyze_xy`].
#[cfg(feature = "parallel-analysis")]
pub fn analyze_xy_parallel<S, A>(samples: &[S], access: &A) -> XySequence<A::X, A::Y>
where
    S: Sync,
    A: XySampleAccess<S> + Sync + ?Sized,
    A::X: DataProvider + Send,
    A::Y: DataProvider + Send,
{
    samples
        .par_chunks(PARALLEL_CHUNK_LEN)
        .map(|chunk| analyze_xy(chunk, access))
        .reduce(XySequence::default, XySequence::merge)
}
