use thiserror::Error;

use crate::core::Monotonicity;

pub type AxisResult<T> = Result<T, AxisError>;

#[derive(Debug, Error)]
pub enum AxisError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Windowed search was asked to run over a sequence with no usable order.
    #[error("sequence is not searchable: {0:?}")]
    NotMonotonic(Monotonicity),

    #[error("tick step must be finite and > 0, got {0}")]
    InvalidTickStep(f64),
}
