//! Sample-stream contract.
//!
//! A series is a random-access slice of samples plus two capabilities: a
//! [`SampleFilter`] deciding whether a sample participates at all, and a
//! [`ValueSampler`] extracting a data-space value. A sampler returning `None`
//! means "skip this sample", the same as an invalid or NaN value.

use std::marker::PhantomData;

use crate::core::provider::OptionalProvider;

pub trait SampleFilter<S> {
    fn filter(&self, sample: &S) -> bool;
}

impl<S, F> SampleFilter<S> for F
where
    F: Fn(&S) -> bool,
{
    #[inline]
    fn filter(&self, sample: &S) -> bool {
        self(sample)
    }
}

/// Filter that accepts every sample.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl<S> SampleFilter<S> for AcceptAll {
    #[inline]
    fn filter(&self, _sample: &S) -> bool {
        true
    }
}

pub trait ValueSampler<S, V> {
    fn try_sample(&self, sample: &S) -> Option<V>;
}

impl<S, V, F> ValueSampler<S, V> for F
where
    F: Fn(&S) -> Option<V>,
{
    #[inline]
    fn try_sample(&self, sample: &S) -> Option<V> {
        self(sample)
    }
}

/// Adapts an accessor returning the type's optional representation (NaN for
/// doubles, [`OptionalDateTime`](crate::core::OptionalDateTime) for
/// timestamps) into a [`ValueSampler`].
pub struct OptionalSampler<F, T> {
    accessor: F,
    _value: PhantomData<fn() -> T>,
}

impl<F, T> OptionalSampler<F, T> {
    pub fn new(accessor: F) -> Self {
        Self {
            accessor,
            _value: PhantomData,
        }
    }
}

impl<F, T> std::fmt::Debug for OptionalSampler<F, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionalSampler").finish_non_exhaustive()
    }
}

impl<S, T, F> ValueSampler<S, T> for OptionalSampler<F, T>
where
    T: OptionalProvider,
    F: Fn(&S) -> T::Optional,
{
    #[inline]
    fn try_sample(&self, sample: &S) -> Option<T> {
        T::try_get_value((self.accessor)(sample))
    }
}

/// Everything segment extraction needs to read an (X, Y) pair out of a sample.
pub trait XySampleAccess<S> {
    type X;
    type Y;

    fn filter(&self, sample: &S) -> bool;

    fn try_x(&self, sample: &S) -> Option<Self::X>;

    fn try_y(&self, sample: &S) -> Option<Self::Y>;

    /// Axis-level value restriction, independent of view clipping.
    fn filter_x(&self, _value: &Self::X) -> bool {
        true
    }

    fn filter_y(&self, _value: &Self::Y) -> bool {
        true
    }

    /// Both components, or `None` when any stage rejects the sample.
    #[inline]
    fn try_xy(&self, sample: &S) -> Option<(Self::X, Self::Y)> {
        if !self.filter(sample) {
            return None;
        }
        let x = self.try_x(sample)?;
        if !self.filter_x(&x) {
            return None;
        }
        let y = self.try_y(sample)?;
        if !self.filter_y(&y) {
            return None;
        }
        Some((x, y))
    }
}

/// Accept-everything value filter for [`XySamplers`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NoValueFilter;

pub trait ValueFilter<V> {
    fn accept(&self, value: &V) -> bool;
}

impl<V> ValueFilter<V> for NoValueFilter {
    #[inline]
    fn accept(&self, _value: &V) -> bool {
        true
    }
}

impl<V, F> ValueFilter<V> for F
where
    F: Fn(&V) -> bool,
{
    #[inline]
    fn accept(&self, value: &V) -> bool {
        self(value)
    }
}

/// [`XySampleAccess`] assembled from closures.
#[derive(Debug, Clone, Copy)]
pub struct XySamplers<F, SX, SY, FX = NoValueFilter, FY = NoValueFilter, X = f64, Y = f64> {
    pub filter: F,
    pub x: SX,
    pub y: SY,
    pub filter_x: FX,
    pub filter_y: FY,
    _values: PhantomData<fn() -> (X, Y)>,
}

impl<F, SX, SY, X, Y> XySamplers<F, SX, SY, NoValueFilter, NoValueFilter, X, Y> {
    pub fn new(filter: F, x: SX, y: SY) -> Self {
        Self {
            filter,
            x,
            y,
            filter_x: NoValueFilter,
            filter_y: NoValueFilter,
            _values: PhantomData,
        }
    }
}

impl<F, SX, SY, FX, FY, X, Y> XySamplers<F, SX, SY, FX, FY, X, Y> {
    /// Replaces the per-axis value filters.
    pub fn with_value_filters<GX, GY>(
        self,
        filter_x: GX,
        filter_y: GY,
    ) -> XySamplers<F, SX, SY, GX, GY, X, Y> {
        XySamplers {
            filter: self.filter,
            x: self.x,
            y: self.y,
            filter_x,
            filter_y,
            _values: PhantomData,
        }
    }
}

impl<S, F, SX, SY, FX, FY, X, Y> XySampleAccess<S> for XySamplers<F, SX, SY, FX, FY, X, Y>
where
    F: SampleFilter<S>,
    SX: ValueSampler<S, X>,
    SY: ValueSampler<S, Y>,
    FX: ValueFilter<X>,
    FY: ValueFilter<Y>,
{
    type X = X;
    type Y = Y;

    #[inline]
    fn filter(&self, sample: &S) -> bool {
        self.filter.filter(sample)
    }

    #[inline]
    fn try_x(&self, sample: &S) -> Option<X> {
        self.x.try_sample(sample)
    }

    #[inline]
    fn try_y(&self, sample: &S) -> Option<Y> {
        self.y.try_sample(sample)
    }

    #[inline]
    fn filter_x(&self, value: &X) -> bool {
        self.filter_x.accept(value)
    }

    #[inline]
    fn filter_y(&self, value: &Y) -> bool {
        self.filter_y.accept(value)
    }
}

/// Samples a finite `f64` field, treating NaN and infinities as missing.
#[inline]
#[must_use]
pub fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::{AcceptAll, OptionalSampler, ValueSampler, XySampleAccess, XySamplers, finite};

    #[derive(Debug, Clone, Copy)]
    struct Reading {
        t: f64,
        v: f64,
        valid: bool,
    }

    #[test]
    fn xy_samplers_apply_every_stage() {
        let access = XySamplers::new(
            |r: &Reading| r.valid,
            |r: &Reading| finite(r.t),
            |r: &Reading| finite(r.v),
        )
        .with_value_filters(|_x: &f64| true, |y: &f64| *y >= 0.0);

        let ok = Reading { t: 1.0, v: 2.0, valid: true };
        let flagged = Reading { t: 1.0, v: 2.0, valid: false };
        let nan = Reading { t: f64::NAN, v: 2.0, valid: true };
        let negative = Reading { t: 1.0, v: -2.0, valid: true };

        assert_eq!(access.try_xy(&ok), Some((1.0, 2.0)));
        assert_eq!(access.try_xy(&flagged), None);
        assert_eq!(access.try_xy(&nan), None);
        assert_eq!(access.try_xy(&negative), None);
    }

    #[test]
    fn optional_sampler_uses_type_sentinel() {
        let sampler = OptionalSampler::<_, f64>::new(|v: &f64| *v);
        assert_eq!(sampler.try_sample(&3.0), Some(3.0));
        assert_eq!(sampler.try_sample(&f64::NAN), None);

        let access = XySamplers::new(AcceptAll, sampler, |v: &f64| Some(*v * 2.0));
        assert_eq!(access.try_xy(&1.5), Some((1.5, 3.0)));
    }
}
