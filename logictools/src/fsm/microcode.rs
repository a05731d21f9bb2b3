//! Microcode table.

use crate::constants::fsm::*;
use crate::fsm::ExpandedFsm;

/// Packs an output pattern into an integer; bit `i` is output `i`.
pub fn output_value(pattern: &str) -> u32 {
    pattern.chars().rev().fold(0, |value, c| (value << 1) | u32::from(c == '1'))
}

/// Decoded microcode word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MicrocodeEntry {
    /// Code of the next state.
    pub next_state: usize,

    /// Outputs; bit `i` is output `i`.
    pub output: u32,
}

impl MicrocodeEntry {
    /// Decodes the word.
    pub fn from_word(word: u32) -> Self {
        Self {
            next_state: (word & ((1 << FSM_MAX_STATE_INPUT_BITS) - 1)) as usize,
            output: word >> FSM_MAX_STATE_INPUT_BITS,
        }
    }

    /// Encodes the entry: outputs above the state and input bits, the next state code below.
    pub fn to_word(&self) -> u32 { (self.output << FSM_MAX_STATE_INPUT_BITS) | self.next_state as u32 }
}

/// Microcode table of an FSM.
///
/// The word at address `(input_value << index_offset) | state_code` holds the next state and the outputs of the
/// current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MicrocodeTable {
    index_offset: usize,
    num_input_bits: usize,
    words: Vec<u32>,
}

impl MicrocodeTable {
    /// Returns the address bit where the input value starts.
    pub fn index_offset(&self) -> usize { self.index_offset }

    /// Returns the number of input bits.
    pub fn num_input_bits(&self) -> usize { self.num_input_bits }

    /// Returns the address width.
    pub fn addr_width(&self) -> usize { self.index_offset + self.num_input_bits }

    /// Returns the address of the entry.
    pub fn address(&self, input_value: usize, state_code: usize) -> usize {
        (input_value << self.index_offset) | state_code
    }

    /// Returns the entry for the input value and state code.
    pub fn entry(&self, input_value: usize, state_code: usize) -> Option<MicrocodeEntry> {
        self.words.get(self.address(input_value, state_code)).copied().map(MicrocodeEntry::from_word)
    }

    /// Returns the words.
    pub fn words(&self) -> &[u32] { &self.words }

    /// Returns the block-memory image: the words padded with zeros to the memory depth.
    pub fn to_bram_image(&self) -> Vec<u32> {
        let mut image = self.words.clone();
        image.resize(FSM_BRAM_DEPTH, 0);
        image
    }
}

impl ExpandedFsm {
    /// Builds the microcode table.
    ///
    /// Every state first loops on itself for every input value, emitting its own output. The expanded transitions
    /// then overwrite their entries.
    pub fn microcode(&self) -> MicrocodeTable {
        let index_offset = self.index_offset();
        let num_input_bits = self.inputs().len();
        let mut words = vec![0; 1 << (index_offset + num_input_bits)];
        let address = |input_value: usize, state_code: usize| (input_value << index_offset) | state_code;

        let defaults = self
            .states()
            .into_iter()
            .filter_map(|state| Some((self.state_code(state)?, self.state_output(state)?)))
            .collect::<Vec<_>>();
        for input_value in 0..1 << num_input_bits {
            for (code, output) in &defaults {
                let entry = MicrocodeEntry { next_state: code.value(), output: output_value(output) };
                words[address(input_value, code.value())] = entry.to_word();
            }
        }

        for tr in self.transitions() {
            if let (Some(current), Some(next)) = (self.state_code(&tr.current), self.state_code(&tr.next)) {
                let entry = MicrocodeEntry { next_state: next.value(), output: output_value(&tr.output) };
                words[address(tr.input_value(), current.value())] = entry.to_word();
            }
        }
        log::debug!(target: "fsm", "microcode: {} words, index offset {}", words.len(), index_offset);

        MicrocodeTable { index_offset, num_input_bits, words }
    }
}
