//! FSM generator: compiles Moore machines into microcode for the co-processor's block memory.
//!
//! Compilation runs through typed stages, each consuming the previous one:
//!
//! - [`FsmSpec::validate`] checks names, pins, bit widths and the Moore condition.
//! - [`ValidatedFsm::encode`] assigns state codes and optionally exports them on output pins.
//! - [`EncodedFsm::expand`] resolves state and input wildcards.
//! - [`ExpandedFsm::microcode`] and [`ExpandedFsm::registers`] produce the hardware image.
//!
//! A failing stage returns an error and nothing of the partial compilation.

mod dot;
mod encode;
mod expand;
mod microcode;
mod registers;
mod spec;

pub use encode::*;
pub use expand::*;
pub use microcode::*;
pub use registers::*;
pub use spec::*;
use thiserror::Error;

use crate::intf::IntfSpec;

#[allow(missing_docs)]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FsmError {
    #[error("malformed FSM specification: {0}")]
    SpecFormat(String),
    #[error("duplicate {kind}: {entry}")]
    Duplicate { kind: &'static str, entry: String },
    #[error("{0} not in pin map - please check against the FSM specification")]
    UnknownPin(String),
    #[error("pin {pin} has index {index}, outside the header")]
    PinOffHeader { pin: String, index: usize },
    #[error("unknown state {0}")]
    UnknownState(String),
    #[error("I/O pin conflicts: {0:?}")]
    PinConflict(Vec<String>),
    #[error("{label} used {used} bits, more than the maximum number ({max}) of bits allowed")]
    BitBudgetExceeded { label: &'static str, used: usize, max: usize },
    #[error("specified FSM is not Moore: {states} states but {outputs} outputs")]
    NotMoore { states: usize, outputs: usize },
    #[error("conflicting transitions from state {state} on input {input}")]
    ConflictingTransition { input: String, state: String },
    #[error("input index offset {0} is outside the routable address bits")]
    IndexOffsetOutOfRange(usize),
}

/// Fully compiled FSM.
#[derive(Debug, Clone)]
pub struct CompiledFsm {
    /// The expanded state machine.
    pub fsm: ExpandedFsm,

    /// Microcode table.
    pub microcode: MicrocodeTable,

    /// Configuration registers, except the microcode address.
    pub registers: FsmRegisters,
}

impl CompiledFsm {
    /// Compiles the specification.
    pub fn compile(spec: &FsmSpec, intf: &IntfSpec, use_state_bits: bool) -> Result<Self, FsmError> {
        let fsm = spec.validate(intf)?.encode(use_state_bits, intf)?.expand()?;
        let microcode = fsm.microcode();
        let registers = fsm.registers()?;
        log::debug!(
            target: "fsm",
            "compiled {} states, {} transitions into {} microcode words",
            fsm.states().len(),
            fsm.transitions().len(),
            microcode.words().len()
        );

        Ok(Self { fsm, microcode, registers })
    }

    /// Returns the header pins routed to the FSM: inputs, then outputs.
    pub fn route(&self) -> Vec<usize> { self.fsm.route() }
}

/// Compiles the specification into microcode, registers and the header pins it uses.
pub fn compile_fsm(spec: &FsmSpec, intf: &IntfSpec, use_state_bits: bool) -> Result<CompiledFsm, FsmError> {
    CompiledFsm::compile(spec, intf, use_state_bits)
}
