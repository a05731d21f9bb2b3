//! Generators: drive compiled configurations through a transport.
//!
//! Every generator follows the same cycle: `config`, `arm`, `run`, `stop`. Compilation happens at the start of
//! `config`, before the first transport call, so a rejected design never reaches the co-processor.

mod boolean_generator;
mod fsm_generator;
mod trace_analyzer;

pub use boolean_generator::*;
pub use fsm_generator::*;
use thiserror::Error;
pub use trace_analyzer::*;

use crate::boolean::BooleanError;
use crate::constants::trace::DEFAULT_NUM_TRACE_SAMPLES;
use crate::fsm::FsmError;
use crate::intf::TransportError;
use crate::trace::TraceError;

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error(transparent)]
    Boolean(#[from] BooleanError),
    #[error(transparent)]
    Fsm(#[from] FsmError),
    #[error(transparent)]
    Trace(#[from] TraceError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("the generator has no trace analyzer")]
    NoAnalyzer,
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

/// Trace analyzer options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzerConfig {
    /// Number of samples to capture.
    pub num_samples: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self { Self { num_samples: DEFAULT_NUM_TRACE_SAMPLES } }
}

/// FSM generator options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FsmConfig {
    /// Drives the current state code on output pins.
    pub use_state_bits: bool,

    /// Clock of the FSM and of the captured samples.
    pub frequency_mhz: f64,

    /// Trace analyzer capturing the FSM pins, if any.
    pub analyzer: Option<AnalyzerConfig>,
}

impl Default for FsmConfig {
    fn default() -> Self {
        Self { use_state_bits: false, frequency_mhz: 10.0, analyzer: Some(AnalyzerConfig::default()) }
    }
}
