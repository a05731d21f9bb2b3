//! Trace analyzer: decodes captured samples into per-pin waveforms.

mod decode;
mod wave;

pub use decode::*;
use thiserror::Error;
pub use wave::*;

use crate::constants::trace::MAX_NUM_TRACE_SAMPLES;

#[allow(missing_docs)]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TraceError {
    #[error("cannot use the trace analyzer without a valid trace specification")]
    MissingSpec,
    #[error("number of samples {0} is outside [1, {}]", MAX_NUM_TRACE_SAMPLES)]
    SampleCount(usize),
    #[error("pin {0} is not traced")]
    UnknownPin(String),
    #[error("malformed wave {wave:?} at {position}")]
    MalformedWave { wave: String, position: usize },
}

/// Checks that the number of samples fits the trace buffer.
pub fn check_num_samples(num_samples: usize) -> Result<usize, TraceError> {
    if !(1..=MAX_NUM_TRACE_SAMPLES).contains(&num_samples) {
        return Err(TraceError::SampleCount(num_samples));
    }
    Ok(num_samples)
}
