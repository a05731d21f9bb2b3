//! FSM specification and its validation.

use std::collections::HashSet;
use std::fmt;

use itertools::Itertools;

use crate::constants::fsm::*;
use crate::fsm::FsmError;
use crate::intf::IntfSpec;
use crate::utils::clog2;

/// Current-state symbol matching every state.
pub const STATE_WILDCARD: &str = "*";

/// Input-pattern symbol matching both values of the bit.
pub const INPUT_WILDCARD: char = '-';

/// Current state of a transition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CurrentState {
    /// Every state other than the transition's next state.
    Any,

    /// The named state.
    Named(String),
}

impl From<&str> for CurrentState {
    fn from(name: &str) -> Self {
        if name == STATE_WILDCARD {
            Self::Any
        } else {
            Self::Named(name.to_string())
        }
    }
}

impl fmt::Display for CurrentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "{}", STATE_WILDCARD),
            Self::Named(name) => write!(f, "{}", name),
        }
    }
}

/// Row of a transition table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Transition {
    /// Input pattern over `0`, `1` and `-`, first input first.
    pub input: String,

    /// Current state.
    pub current: CurrentState,

    /// Next state.
    pub next: String,

    /// Output pattern over `0` and `1`, first output first. Empty if the row leaves the output to the state.
    pub output: String,
}

impl Transition {
    /// Creates a transition. A current state of `*` matches every state.
    pub fn new(input: &str, current: &str, next: &str, output: &str) -> Self {
        Self { input: input.to_string(), current: current.into(), next: next.to_string(), output: output.to_string() }
    }
}

/// Named signal bound to a header pin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    /// Name of the signal.
    pub name: String,

    /// Name of the pin.
    pub pin: String,
}

/// FSM specification.
///
/// The order of `states` defines the state codes. The order of `inputs` and `outputs` defines the positions in the
/// transition patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FsmSpec {
    /// Input signals.
    pub inputs: Vec<Signal>,

    /// Output signals.
    pub outputs: Vec<Signal>,

    /// States.
    pub states: Vec<String>,

    /// Transitions.
    pub transitions: Vec<Transition>,
}

impl FsmSpec {
    /// Creates an empty specification.
    pub fn new() -> Self { Self::default() }

    /// Adds an input signal.
    pub fn input(mut self, name: &str, pin: &str) -> Self {
        self.inputs.push(Signal { name: name.to_string(), pin: pin.to_string() });
        self
    }

    /// Adds an output signal.
    pub fn output(mut self, name: &str, pin: &str) -> Self {
        self.outputs.push(Signal { name: name.to_string(), pin: pin.to_string() });
        self
    }

    /// Adds states.
    pub fn states<'a, I: IntoIterator<Item = &'a str>>(mut self, states: I) -> Self {
        self.states.extend(states.into_iter().map(str::to_string));
        self
    }

    /// Adds a transition.
    pub fn transition(mut self, input: &str, current: &str, next: &str, output: &str) -> Self {
        self.transitions.push(Transition::new(input, current, next, output));
        self
    }

    /// Returns the number of state bits.
    pub fn num_state_bits(&self) -> usize { clog2(self.states.len()) }

    /// Returns the distinct non-empty output patterns.
    pub fn output_patterns(&self) -> Vec<&str> {
        self.transitions.iter().map(|tr| tr.output.as_str()).filter(|output| !output.is_empty()).unique().collect()
    }

    /// Validates the specification against the interface.
    pub fn validate(&self, intf: &IntfSpec) -> Result<ValidatedFsm, FsmError> {
        check_unique("input names", self.inputs.iter().map(|s| s.name.as_str()))?;
        check_unique("input pins", self.inputs.iter().map(|s| s.pin.as_str()))?;
        check_unique("output names", self.outputs.iter().map(|s| s.name.as_str()))?;
        check_unique("output pins", self.outputs.iter().map(|s| s.pin.as_str()))?;
        check_unique("states", self.states.iter().map(String::as_str))?;
        if self.states.is_empty() {
            return Err(FsmError::SpecFormat("no states declared".to_string()));
        }

        let num_state_bits = self.num_state_bits();
        check_budget("inputs", self.inputs.len(), FSM_MAX_INPUT_BITS)?;
        check_budget("outputs", self.outputs.len(), FSM_MAX_OUTPUT_BITS)?;
        check_budget("states", num_state_bits, FSM_MAX_STATE_BITS)?;
        check_budget("states and inputs", num_state_bits + self.inputs.len(), FSM_MAX_STATE_INPUT_BITS)?;

        let inputs = resolve_pins(&self.inputs, intf)?;
        let outputs = resolve_pins(&self.outputs, intf)?;
        let conflicts = self
            .inputs
            .iter()
            .filter(|input| self.outputs.iter().any(|output| output.pin == input.pin))
            .map(|input| input.pin.clone())
            .collect::<Vec<_>>();
        if !conflicts.is_empty() {
            return Err(FsmError::PinConflict(conflicts));
        }

        for tr in &self.transitions {
            self.check_transition(tr)?;
        }

        let num_patterns = self.output_patterns().len();
        if num_patterns > self.states.len() {
            return Err(FsmError::NotMoore { states: self.states.len(), outputs: num_patterns });
        }

        log::debug!(
            target: "fsm",
            "validated {} inputs, {} outputs, {} states ({} bits)",
            inputs.len(),
            outputs.len(),
            self.states.len(),
            num_state_bits
        );

        Ok(ValidatedFsm { spec: self.clone(), inputs, outputs, num_state_bits })
    }

    fn check_transition(&self, tr: &Transition) -> Result<(), FsmError> {
        let malformed = |what: &str| FsmError::SpecFormat(format!("{} in transition {:?}", what, tr));

        if tr.input.chars().count() != self.inputs.len() || !tr.input.chars().all(|c| matches!(c, '0' | '1' | '-')) {
            return Err(malformed("input pattern must cover every input with 0, 1 or -"));
        }
        if !tr.output.is_empty()
            && (tr.output.chars().count() != self.outputs.len() || !tr.output.chars().all(|c| matches!(c, '0' | '1')))
        {
            return Err(malformed("output pattern must cover every output with 0 or 1"));
        }
        if let CurrentState::Named(state) = &tr.current {
            if !self.states.contains(state) {
                return Err(FsmError::UnknownState(state.clone()));
            }
        }
        if !self.states.contains(&tr.next) {
            return Err(FsmError::UnknownState(tr.next.clone()));
        }

        Ok(())
    }
}

fn check_unique<'a, I: Iterator<Item = &'a str>>(kind: &'static str, names: I) -> Result<(), FsmError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(FsmError::Duplicate { kind, entry: name.to_string() });
        }
    }
    Ok(())
}

fn check_budget(label: &'static str, used: usize, max: usize) -> Result<(), FsmError> {
    if used > max {
        return Err(FsmError::BitBudgetExceeded { label, used, max });
    }
    Ok(())
}

fn resolve_pins(signals: &[Signal], intf: &IntfSpec) -> Result<Vec<FsmPin>, FsmError> {
    signals
        .iter()
        .map(|signal| {
            let index = intf.pin(&signal.pin).ok_or_else(|| FsmError::UnknownPin(signal.pin.clone()))?;
            if !intf.routable(index) {
                return Err(FsmError::PinOffHeader { pin: signal.pin.clone(), index });
            }
            Ok(FsmPin { name: signal.name.clone(), pin: signal.pin.clone(), index })
        })
        .collect()
}

/// Signal resolved to a physical pin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsmPin {
    /// Name of the signal.
    pub name: String,

    /// Name of the pin.
    pub pin: String,

    /// Physical index of the pin.
    pub index: usize,
}

/// FSM specification that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedFsm {
    pub(super) spec: FsmSpec,
    pub(super) inputs: Vec<FsmPin>,
    pub(super) outputs: Vec<FsmPin>,
    pub(super) num_state_bits: usize,
}

impl ValidatedFsm {
    /// Returns the specification.
    pub fn spec(&self) -> &FsmSpec { &self.spec }

    /// Returns the resolved inputs.
    pub fn inputs(&self) -> &[FsmPin] { &self.inputs }

    /// Returns the resolved outputs.
    pub fn outputs(&self) -> &[FsmPin] { &self.outputs }

    /// Returns the number of state bits.
    pub fn num_state_bits(&self) -> usize { self.num_state_bits }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn counter() -> FsmSpec {
        FsmSpec::new()
            .input("rst", "D0")
            .input("dir", "D1")
            .output("q1", "D3")
            .output("q0", "D4")
            .states(["S0", "S1", "S2", "S3"])
            .transition("1-", "*", "S0", "")
            .transition("00", "S0", "S1", "00")
            .transition("00", "S1", "S2", "01")
            .transition("00", "S2", "S3", "10")
            .transition("00", "S3", "S0", "11")
    }

    #[test]
    fn valid_spec() {
        let fsm = counter().validate(&IntfSpec::pynq_z1()).unwrap();
        assert_eq!(fsm.num_state_bits(), 2);
        assert_eq!(fsm.inputs().iter().map(|pin| pin.index).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(fsm.outputs().iter().map(|pin| pin.index).collect::<Vec<_>>(), vec![3, 4]);
    }

    #[rstest]
    #[case(counter().input("rst", "D5"), FsmError::Duplicate { kind: "input names", entry: "rst".to_string() })]
    #[case(counter().output("q2", "D4"), FsmError::Duplicate { kind: "output pins", entry: "D4".to_string() })]
    #[case(counter().states(["S1"]), FsmError::Duplicate { kind: "states", entry: "S1".to_string() })]
    #[case(counter().output("q2", "LD0"), FsmError::UnknownPin("LD0".to_string()))]
    #[case(counter().output("q2", "D1"), FsmError::PinConflict(vec!["D1".to_string()]))]
    #[case(counter().transition("01", "S4", "S0", ""), FsmError::UnknownState("S4".to_string()))]
    #[case(counter().transition("01", "S0", "*", ""), FsmError::UnknownState("*".to_string()))]
    fn rejected_specs(#[case] spec: FsmSpec, #[case] expected: FsmError) {
        assert_eq!(spec.validate(&IntfSpec::pynq_z1()), Err(expected));
    }

    /// Header with extra pins mapped past the I/O switch.
    fn wide_intf() -> IntfSpec {
        let mut intf = IntfSpec::pynq_z1();
        for (name, index) in [("LD0", 40), ("LD1", 25), ("PB0", 31), ("PB1", 20)] {
            let _ = intf.pins.insert(name.to_string(), index);
        }
        intf
    }

    #[rstest]
    #[case(counter().output("led", "LD0"), "LD0", 40)]
    #[case(counter().output("led", "LD1"), "LD1", 25)]
    #[case(counter().output("led", "PB1"), "PB1", 20)]
    #[case(counter().input("button", "PB0"), "PB0", 31)]
    fn pins_off_the_header(#[case] spec: FsmSpec, #[case] pin: &str, #[case] index: usize) {
        assert_eq!(spec.validate(&wide_intf()), Err(FsmError::PinOffHeader { pin: pin.to_string(), index }));
    }

    #[rstest]
    #[case("0", "00")]
    #[case("0x", "00")]
    #[case("01", "0")]
    #[case("01", "0-")]
    fn malformed_patterns(#[case] input: &str, #[case] output: &str) {
        let spec = counter().transition(input, "S0", "S1", output);
        assert!(matches!(spec.validate(&IntfSpec::pynq_z1()), Err(FsmError::SpecFormat(_))));
    }

    #[test]
    fn more_outputs_than_states_is_not_moore() {
        assert_eq!(counter().output_patterns(), vec!["00", "01", "10", "11"]);
        let spec = FsmSpec::new()
            .input("a", "D0")
            .output("y", "D1")
            .states(["A"])
            .transition("0", "A", "A", "0")
            .transition("1", "A", "A", "1");
        assert_eq!(spec.validate(&IntfSpec::pynq_z1()), Err(FsmError::NotMoore { states: 1, outputs: 2 }));
    }

    #[test]
    fn bit_budgets() {
        let mut spec = FsmSpec::new().states(["A"]);
        for i in 0..9 {
            spec = spec.input(&format!("i{}", i), &format!("D{}", i));
        }
        assert_eq!(
            spec.validate(&IntfSpec::pynq_z1()),
            Err(FsmError::BitBudgetExceeded { label: "inputs", used: 9, max: FSM_MAX_INPUT_BITS })
        );

        let states = (0..513).map(|i| format!("S{}", i)).collect::<Vec<_>>();
        let spec = FsmSpec::new().states(states.iter().map(String::as_str));
        assert_eq!(
            spec.validate(&IntfSpec::pynq_z1()),
            Err(FsmError::BitBudgetExceeded { label: "states", used: 10, max: FSM_MAX_STATE_BITS })
        );

        let states = (0..512).map(|i| format!("S{}", i)).collect::<Vec<_>>();
        let mut spec = FsmSpec::new().states(states.iter().map(String::as_str));
        for i in 0..5 {
            spec = spec.input(&format!("i{}", i), &format!("D{}", i));
        }
        assert_eq!(
            spec.validate(&IntfSpec::pynq_z1()),
            Err(FsmError::BitBudgetExceeded { label: "states and inputs", used: 14, max: FSM_MAX_STATE_INPUT_BITS })
        );
    }

    #[test]
    fn no_states() {
        assert!(matches!(FsmSpec::new().validate(&IntfSpec::pynq_z1()), Err(FsmError::SpecFormat(_))));
    }
}
