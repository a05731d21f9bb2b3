//! Wildcard expansion.

use std::collections::HashMap;

use itertools::Itertools;

use crate::fsm::{CurrentState, EncodedFsm, FsmError, FsmPin, StateCode, Transition, INPUT_WILDCARD};

/// Transition with concrete input values and a concrete current state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpandedTransition {
    /// Input pattern over `0` and `1`, first input first.
    pub input: String,

    /// Current state.
    pub current: String,

    /// Next state.
    pub next: String,

    /// Output pattern of the current state.
    pub output: String,
}

impl ExpandedTransition {
    /// Returns the input pattern as an integer; the first input is the MSB.
    pub fn input_value(&self) -> usize { self.input.chars().fold(0, |value, c| (value << 1) | usize::from(c == '1')) }
}

/// Expands the first `-` of the pattern into `0` and `1`, until none remains.
///
/// A pattern with `w` wildcards yields `2^w` patterns, in increasing order of the wildcard bits.
pub fn expand_input_pattern(pattern: &str) -> Vec<String> {
    match pattern.find(INPUT_WILDCARD) {
        None => vec![pattern.to_string()],
        Some(pos) => ["0", "1"]
            .iter()
            .flat_map(|bit| {
                let mut concrete = pattern.to_string();
                concrete.replace_range(pos..pos + 1, bit);
                expand_input_pattern(&concrete)
            })
            .collect(),
    }
}

/// FSM with every wildcard resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedFsm {
    encoded: EncodedFsm,
    state_transitions: Vec<Transition>,
    transitions: Vec<ExpandedTransition>,
}

impl EncodedFsm {
    /// Resolves state wildcards, then input wildcards.
    ///
    /// A row with the state wildcard stands for one row per state other than its next state, carrying that state's
    /// output. Rows without an output pattern take the output of their current state. Exact duplicates are merged
    /// after each pass. Two rows leaving the same state on the same input to a different next state or with a
    /// different output are rejected.
    pub fn expand(self) -> Result<ExpandedFsm, FsmError> {
        let state_transitions = self.expand_states();
        let transitions = state_transitions
            .iter()
            .filter_map(|tr| match &tr.current {
                CurrentState::Named(current) => Some((tr, current)),
                CurrentState::Any => None,
            })
            .flat_map(|(tr, current)| {
                expand_input_pattern(&tr.input).into_iter().map(move |input| ExpandedTransition {
                    input,
                    current: current.clone(),
                    next: tr.next.clone(),
                    output: tr.output.clone(),
                })
            })
            .unique()
            .collect::<Vec<_>>();

        let mut seen = HashMap::new();
        for tr in &transitions {
            if seen.insert((tr.input.as_str(), tr.current.as_str()), tr).is_some() {
                return Err(FsmError::ConflictingTransition { input: tr.input.clone(), state: tr.current.clone() });
            }
        }
        log::debug!(
            target: "fsm",
            "expanded {} rows into {} state transitions and {} concrete transitions",
            self.transitions.len(),
            state_transitions.len(),
            transitions.len()
        );

        Ok(ExpandedFsm { encoded: self, state_transitions, transitions })
    }

    fn expand_states(&self) -> Vec<Transition> {
        let named = self.transitions.iter().filter_map(|tr| match &tr.current {
            CurrentState::Named(state) if tr.output.is_empty() => {
                Some(Transition { output: self.state_outputs.get(state).cloned().unwrap_or_default(), ..tr.clone() })
            }
            CurrentState::Named(_) => Some(tr.clone()),
            CurrentState::Any => None,
        });
        let state_outputs = &self.state_outputs;
        let wildcards = self.transitions.iter().filter(|tr| tr.current == CurrentState::Any).flat_map(move |tr| {
            state_outputs.iter().filter(move |(state, _)| **state != tr.next).map(move |(state, output)| {
                Transition {
                    input: tr.input.clone(),
                    current: CurrentState::Named(state.clone()),
                    next: tr.next.clone(),
                    output: output.clone(),
                }
            })
        });

        named.chain(wildcards).unique().collect()
    }
}

impl ExpandedFsm {
    /// Returns the encoded FSM.
    pub fn encoded(&self) -> &EncodedFsm { &self.encoded }

    /// Returns the inputs.
    pub fn inputs(&self) -> &[FsmPin] { self.encoded.inputs() }

    /// Returns the outputs, including exported state bits.
    pub fn outputs(&self) -> &[FsmPin] { self.encoded.outputs() }

    /// Returns the states in declaration order.
    pub fn states(&self) -> Vec<&str> { self.encoded.states() }

    /// Returns the code of the state.
    pub fn state_code(&self, state: &str) -> Option<StateCode> { self.encoded.state_code(state) }

    /// Returns the output pattern of the state.
    pub fn state_output(&self, state: &str) -> Option<&str> { self.encoded.state_output(state) }

    /// Returns the address bit where the input value starts.
    pub fn index_offset(&self) -> usize { self.encoded.index_offset() }

    /// Returns the transitions after state-wildcard expansion. Input patterns may still hold wildcards.
    pub fn state_transitions(&self) -> &[Transition] { &self.state_transitions }

    /// Returns the fully expanded transitions.
    pub fn transitions(&self) -> &[ExpandedTransition] { &self.transitions }

    /// Returns the header pins used by the FSM: inputs, then outputs.
    pub fn route(&self) -> Vec<usize> { self.inputs().iter().chain(self.outputs()).map(|pin| pin.index).collect() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fsm::FsmSpec;
    use crate::intf::IntfSpec;

    fn expand(spec: FsmSpec) -> Result<ExpandedFsm, FsmError> {
        let intf = IntfSpec::pynq_z1();
        spec.validate(&intf)?.encode(false, &intf)?.expand()
    }

    fn traffic_light() -> FsmSpec {
        FsmSpec::new()
            .input("rst", "D0")
            .input("car", "D1")
            .output("red", "D2")
            .output("green", "D3")
            .states(["RED", "GREEN", "YELLOW"])
            .transition("1-", "*", "RED", "")
            .transition("01", "RED", "GREEN", "10")
            .transition("0-", "GREEN", "YELLOW", "01")
            .transition("0-", "YELLOW", "RED", "00")
    }

    #[test]
    fn input_patterns() {
        assert_eq!(expand_input_pattern("01"), vec!["01"]);
        assert_eq!(expand_input_pattern("-1-"), vec!["010", "011", "110", "111"]);
        assert_eq!(expand_input_pattern(""), vec![""]);
    }

    #[test]
    fn state_wildcard_skips_next_state() {
        let fsm = expand(traffic_light()).unwrap();
        let reset = fsm.state_transitions().iter().filter(|tr| tr.input == "1-").collect::<Vec<_>>();
        assert_eq!(reset.len(), 2);
        assert_eq!(reset[0].current, CurrentState::Named("GREEN".to_string()));
        assert_eq!(reset[0].output, "01");
        assert_eq!(reset[1].current, CurrentState::Named("YELLOW".to_string()));
        assert_eq!(reset[1].output, "00");
    }

    #[test]
    fn concrete_transitions() {
        let fsm = expand(traffic_light()).unwrap();
        // RED: 1 row; GREEN and YELLOW: 2 rows each; reset: 2 states x 2 rows.
        assert_eq!(fsm.transitions().len(), 9);
        assert!(fsm.transitions().iter().all(|tr| !tr.input.contains('-')));
        assert!(fsm.transitions().contains(&ExpandedTransition {
            input: "11".to_string(),
            current: "GREEN".to_string(),
            next: "RED".to_string(),
            output: "01".to_string(),
        }));
        assert_eq!(fsm.route(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn duplicates_are_merged() {
        let spec = traffic_light().transition("01", "RED", "GREEN", "10").transition("00", "GREEN", "YELLOW", "01");
        assert_eq!(expand(spec).unwrap().transitions().len(), 9);
    }

    #[test]
    fn overlapping_rows_conflict() {
        let spec = traffic_light().transition("-1", "RED", "YELLOW", "10");
        assert_eq!(
            expand(spec),
            Err(FsmError::ConflictingTransition { input: "01".to_string(), state: "RED".to_string() })
        );
    }

    #[test]
    fn missing_output_takes_state_output() {
        let spec = traffic_light().transition("00", "RED", "RED", "");
        let fsm = expand(spec).unwrap();
        let row = fsm.transitions().iter().find(|tr| tr.input == "00" && tr.current == "RED").unwrap();
        assert_eq!(row.output, "10");
        assert_eq!(row.input_value(), 0);
    }
}
