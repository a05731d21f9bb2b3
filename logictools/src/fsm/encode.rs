//! State encoding.

use std::collections::HashSet;
use std::fmt;

use linked_hash_map::LinkedHashMap;

use crate::constants::fsm::*;
use crate::fsm::{CurrentState, FsmError, FsmPin, Transition, ValidatedFsm};
use crate::intf::IntfSpec;
use crate::utils::to_binary_string;

/// Binary code of a state: its index in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateCode {
    value: usize,
    width: usize,
}

impl StateCode {
    /// Returns the code as an integer.
    pub fn value(&self) -> usize { self.value }

    /// Returns the number of bits.
    pub fn width(&self) -> usize { self.width }
}

impl fmt::Display for StateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", to_binary_string(self.value, self.width))
    }
}

/// Appends `tail` to `head`, dropping characters from the end of `head` so the result is at most `length` long.
///
/// `tail` is kept whole even if it alone is longer than `length`.
pub fn merge_to_length(head: &str, tail: &str, length: usize) -> String {
    let keep = length.saturating_sub(tail.len()).min(head.len());
    format!("{}{}", &head[..keep], tail)
}

/// FSM with state codes assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFsm {
    pub(super) inputs: Vec<FsmPin>,
    pub(super) outputs: Vec<FsmPin>,
    pub(super) codes: LinkedHashMap<String, StateCode>,
    pub(super) state_outputs: LinkedHashMap<String, String>,
    pub(super) transitions: Vec<Transition>,
    pub(super) num_state_bits: usize,
}

impl ValidatedFsm {
    /// Assigns state codes and resolves the output of every state.
    ///
    /// With `use_state_bits`, the current state code is also driven on output pins. State bit `b` is named
    /// `state_bit{b}`. It takes the first header pin used by no input or output. Once the header runs out of pins,
    /// the remaining state bits take over the pins of the last declared outputs, last output first, and the outputs
    /// that lose their pin are no longer driven. Non-empty output patterns get the state code merged into their tail.
    pub fn encode(self, use_state_bits: bool, intf: &IntfSpec) -> Result<EncodedFsm, FsmError> {
        let Self { spec, inputs, mut outputs, num_state_bits } = self;
        let codes = spec
            .states
            .iter()
            .enumerate()
            .map(|(value, state)| (state.clone(), StateCode { value, width: num_state_bits }))
            .collect::<LinkedHashMap<_, _>>();

        let mut transitions = spec.transitions;
        let zeros = "0".repeat(outputs.len());
        let merge_length = intf.interface_width.saturating_sub(inputs.len());
        if use_state_bits {
            outputs = export_state_bits(&inputs, outputs, num_state_bits, intf)?;
            for tr in &mut transitions {
                if let (CurrentState::Named(state), false) = (&tr.current, tr.output.is_empty()) {
                    if let Some(code) = codes.get(state) {
                        tr.output = merge_to_length(&tr.output, &code.to_string(), merge_length);
                    }
                }
            }
        }

        let state_outputs = codes
            .iter()
            .map(|(state, code)| {
                let output = transitions
                    .iter()
                    .rev()
                    .find(|tr| matches!(&tr.current, CurrentState::Named(s) if s == state) && !tr.output.is_empty())
                    .map(|tr| tr.output.clone())
                    .unwrap_or_else(|| {
                        if use_state_bits {
                            merge_to_length(&zeros, &code.to_string(), merge_length)
                        } else {
                            zeros.clone()
                        }
                    });
                (state.clone(), output)
            })
            .collect::<LinkedHashMap<_, _>>();

        for ((state, code), output) in codes.iter().zip(state_outputs.values()) {
            log::debug!(target: "fsm", "state {} = {}, output {}", state, code, output);
        }

        Ok(EncodedFsm { inputs, outputs, codes, state_outputs, transitions, num_state_bits })
    }
}

fn export_state_bits(
    inputs: &[FsmPin], mut outputs: Vec<FsmPin>, num_state_bits: usize, intf: &IntfSpec,
) -> Result<Vec<FsmPin>, FsmError> {
    let used = inputs.iter().chain(&outputs).map(|pin| pin.index).collect::<HashSet<_>>();
    let free = intf
        .pins
        .iter()
        .filter(|(_, index)| intf.routable(**index) && !used.contains(*index))
        .take(num_state_bits)
        .collect::<Vec<_>>();
    let capacity = free.len() + outputs.len();
    if num_state_bits > capacity {
        return Err(FsmError::BitBudgetExceeded { label: "state bits", used: num_state_bits, max: capacity });
    }

    let mut state_pins = Vec::new();
    for bit in 0..num_state_bits {
        let name = format!("state_bit{}", bit);
        match free.get(bit) {
            Some((pin, index)) => state_pins.insert(0, FsmPin { name, pin: pin.to_string(), index: **index }),
            None => {
                let slot = outputs.len() - (bit - free.len() + 1);
                log::debug!(
                    target: "fsm",
                    "{} takes over pin {} of output {}",
                    name,
                    outputs[slot].pin,
                    outputs[slot].name
                );
                outputs[slot].name = name;
            }
        }
    }
    outputs.extend(state_pins);

    if outputs.len() > FSM_MAX_OUTPUT_BITS {
        return Err(FsmError::BitBudgetExceeded {
            label: "outputs with state bits",
            used: outputs.len(),
            max: FSM_MAX_OUTPUT_BITS,
        });
    }
    Ok(outputs)
}

impl EncodedFsm {
    /// Returns the inputs.
    pub fn inputs(&self) -> &[FsmPin] { &self.inputs }

    /// Returns the outputs, including exported state bits.
    pub fn outputs(&self) -> &[FsmPin] { &self.outputs }

    /// Returns the states in declaration order.
    pub fn states(&self) -> Vec<&str> { self.codes.keys().map(String::as_str).collect() }

    /// Returns the code of the state.
    pub fn state_code(&self, state: &str) -> Option<StateCode> { self.codes.get(state).copied() }

    /// Returns the output pattern of the state.
    pub fn state_output(&self, state: &str) -> Option<&str> { self.state_outputs.get(state).map(String::as_str) }

    /// Returns the transitions with state codes merged into their outputs.
    pub fn transitions(&self) -> &[Transition] { &self.transitions }

    /// Returns the number of state bits.
    pub fn num_state_bits(&self) -> usize { self.num_state_bits }

    /// Returns the address bit where the input value starts.
    pub fn index_offset(&self) -> usize { self.num_state_bits.max(FSM_MIN_INDEX_OFFSET) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fsm::FsmSpec;

    fn encode(spec: FsmSpec, use_state_bits: bool) -> Result<EncodedFsm, FsmError> {
        let intf = IntfSpec::pynq_z1();
        spec.validate(&intf)?.encode(use_state_bits, &intf)
    }

    fn gray() -> FsmSpec {
        FsmSpec::new()
            .input("rst", "D0")
            .output("y1", "D1")
            .output("y0", "D2")
            .states(["S0", "S1", "S2", "S3"])
            .transition("1", "*", "S0", "")
            .transition("0", "S0", "S1", "00")
            .transition("0", "S1", "S2", "01")
            .transition("0", "S2", "S3", "11")
            .transition("0", "S3", "S0", "10")
    }

    #[test]
    fn merge() {
        assert_eq!(merge_to_length("0101", "11", 8), "010111");
        assert_eq!(merge_to_length("0101", "11", 5), "01011");
        assert_eq!(merge_to_length("0101", "11", 4), "0111");
        assert_eq!(merge_to_length("0101", "111", 2), "111");
        assert_eq!(merge_to_length("", "", 3), "");
    }

    #[test]
    fn codes_follow_declaration_order() {
        let fsm = encode(gray(), false).unwrap();
        assert_eq!(fsm.states(), vec!["S0", "S1", "S2", "S3"]);
        assert_eq!(fsm.state_code("S2").unwrap().to_string(), "10");
        assert_eq!(fsm.state_output("S2"), Some("11"));
        assert_eq!(fsm.index_offset(), 5);
    }

    #[test]
    fn state_bits_on_spare_pins() {
        let fsm = encode(gray(), true).unwrap();
        let outputs = fsm.outputs().iter().map(|pin| (pin.name.as_str(), pin.index)).collect::<Vec<_>>();
        assert_eq!(outputs, vec![("y1", 1), ("y0", 2), ("state_bit1", 4), ("state_bit0", 3)]);
        assert_eq!(fsm.state_output("S2"), Some("1110"));
        assert_eq!(fsm.state_output("S3"), Some("1011"));
    }

    #[test]
    fn state_bits_take_over_last_outputs() {
        let mut spec = FsmSpec::new();
        for i in 0..8 {
            spec = spec.input(&format!("i{}", i), &format!("D{}", i));
        }
        for i in 8..20 {
            spec = spec.output(&format!("o{}", i), &format!("D{}", i));
        }
        let spec = spec
            .states(["A", "B", "C"])
            .transition("00000000", "A", "B", "111111111111")
            .transition("00000000", "B", "C", "000000000000");

        let fsm = encode(spec, true).unwrap();
        assert_eq!(fsm.outputs().len(), 12);
        assert_eq!(fsm.outputs()[10].name, "state_bit1");
        assert_eq!(fsm.outputs()[10].index, 18);
        assert_eq!(fsm.outputs()[11].name, "state_bit0");
        assert_eq!(fsm.state_output("A"), Some("111111111100"));
        assert_eq!(fsm.state_output("B"), Some("000000000001"));
        assert_eq!(fsm.state_output("C"), Some("000000000010"));
    }

    #[test]
    fn state_bits_split_between_spare_pin_and_last_output() {
        let mut spec = FsmSpec::new().input("a", "D0").input("b", "D1");
        for i in 0..17 {
            spec = spec.output(&format!("o{}", i), &format!("D{}", i + 2));
        }
        let spec = spec
            .states(["A", "B", "C", "D"])
            .transition("00", "A", "B", &"0".repeat(17))
            .transition("00", "B", "C", &"1".repeat(17));

        // D19 is the only spare pin: state bit 0 takes it, state bit 1 takes over o16 on D18.
        let fsm = encode(spec, true).unwrap();
        let outputs = fsm.outputs();
        assert_eq!(outputs.len(), 18);
        assert_eq!((outputs[15].name.as_str(), outputs[15].index), ("o15", 17));
        assert_eq!((outputs[16].name.as_str(), outputs[16].pin.as_str()), ("state_bit1", "D18"));
        assert_eq!((outputs[17].name.as_str(), outputs[17].pin.as_str()), ("state_bit0", "D19"));

        assert_eq!(fsm.state_output("A"), Some(format!("{}00", "0".repeat(16)).as_str()));
        assert_eq!(fsm.state_output("B"), Some(format!("{}01", "1".repeat(16)).as_str()));
        assert_eq!(fsm.state_output("D"), Some(format!("{}11", "0".repeat(16)).as_str()));
    }

    #[test]
    fn output_less_state_emits_zeros() {
        let spec = FsmSpec::new()
            .input("go", "D0")
            .output("y", "D1")
            .states(["IDLE", "BUSY"])
            .transition("1", "IDLE", "BUSY", "1");
        let fsm = encode(spec, false).unwrap();
        assert_eq!(fsm.state_output("BUSY"), Some("0"));
    }
}
