//! composable-axis: generic Data -> Interaction -> Screen axis pipeline.
//!
//! Data values of any ordered type are mapped to a plain `f64` interaction
//! space where all pan/zoom math happens, then to device-independent pixels.
//! On top of that pipeline the crate tracks sequence monotonicity in one pass,
//! binary-searches the visible window of large series, and extracts clipped
//! screen-space polylines into caller-owned buffers.

pub mod core;
pub mod error;
pub mod telemetry;

pub use crate::core::{Axis, AxisTuning, LineSeries};
pub use error::{AxisError, AxisResult};
