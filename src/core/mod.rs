pub mod axis;
pub mod decimate;
pub mod line_builder;
pub mod line_series;
pub mod monotonicity;
pub mod primitives;
pub mod provider;
pub mod sampling;
pub mod ticks;
pub mod transform;
pub mod values;
pub mod window_search;

pub use axis::{Axis, AxisState, AxisTuning, AxisView, AxisViewSnapshot};
pub use decimate::decimate_run;
pub use line_builder::{
    ClipInfo, ClipRect, ClipSide, LineBuilder, LineCursor, LineSegment, ProjectedSample,
};
pub use line_series::{LineGeometry, LineSeries, WindowingMode};
pub use monotonicity::{
    Monotonicity, SearchDirection, SequenceTracker, XySequence, analyze, analyze_xy,
};
#[cfg(feature = "parallel-analysis")]
pub use monotonicity::{analyze_parallel, analyze_xy_parallel};
pub use provider::{DataProvider, OptionalDateTime, OptionalProvider, max_of, min_of};
pub use sampling::{
    AcceptAll, NoValueFilter, OptionalSampler, SampleFilter, ValueFilter, ValueSampler,
    XySampleAccess, XySamplers, finite,
};
pub use ticks::{
    DateTimeTickLocator, LinearTickLocator, LogTickLocator, Tick, TickLocator, TickSpacing,
};
pub use transform::{
    AxisScreenTransformation, DataTransformation, DateTimeTransformation, DecimalTransformation,
    Gap, GapTransformation, InteractionScreenTransformation, LinearTransformation,
    LogTransformation,
};
pub use values::{InteractionValue, ScreenPoint, ScreenValue, ValueRange, Viewport};
pub use window_search::{
    WindowRange, XyWindowQuery, find_window, find_window_end, find_window_start, find_xy_window,
};
