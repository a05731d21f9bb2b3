//! Boolean generator: compiles boolean expressions into LUT lane configurations.

mod expr;
mod lut;

pub use expr::*;
pub use lut::*;
use thiserror::Error;

use crate::intf::IntfSpec;

#[allow(missing_docs)]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BooleanError {
    #[error("boolean expression must have form OUTPUT_PIN = Expression: {0:?}")]
    MalformedExpression(String),
    #[error("parse error at {position}: {message}")]
    Parse { position: usize, message: String },
    #[error("invalid pin {0}")]
    UnknownPin(String),
    #[error("pin {pin} has index {index}, outside the header")]
    PinOffHeader { pin: String, index: usize },
    #[error("pin {0} has no LUT lane")]
    NoLane(String),
    #[error("at most 5 inputs are allowed, found {0:?}")]
    TooManyInputs(Vec<String>),
    #[error("pin {0} is used as both input and output")]
    PinConflict(String),
}

/// Compiles `OUTPUT_PIN = expression` and returns the lane configuration with the header pins it uses.
pub fn compile_boolean(expression: &str, intf: &IntfSpec) -> Result<(LutConfig, Vec<usize>), BooleanError> {
    let config = LutConfig::compile(expression, intf)?;
    let route = config.route();
    Ok((config, route))
}
