//! Configuration registers of the FSM generator.

use crate::constants::fsm::*;
use crate::constants::INTERFACE_WIDTH;
use crate::fsm::{ExpandedFsm, FsmError};

/// Configuration registers of the FSM generator.
///
/// The block-memory address bits from `index_offset` up are driven by input pins, the last input on the lowest bit.
/// Bits 5 to 8 are routed by the shared slot and bits 9 to 12 by the dedicated slot. Byte `k` of a slot routes the
/// slot's `k`-th address bit, so bytes are shifted in from the bottom, highest address bit first: `0x80 | pin` for an
/// input pin, `0x1f` for a state bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsmRegisters {
    /// Input routing of address bits 5 to 8.
    pub shared_inputs: u32,

    /// Input routing of address bits 9 to 12.
    pub dedicated_inputs: u32,

    /// Output pins; byte `k` of word `j` is the pin of output `4j + k`.
    pub output_pins: [u32; FSM_OUTPUT_REGS],

    /// Pin directions; a cleared bit marks an output.
    pub direction: u32,
}

impl FsmRegisters {
    /// Number of register words, including the microcode address.
    pub const NUM_WORDS: usize = FSM_OUTPUT_REGS + 4;

    /// Returns the register words, ending with the physical address of the microcode.
    pub fn to_words(&self, microcode_addr: u32) -> Vec<u32> {
        let mut words = Vec::with_capacity(Self::NUM_WORDS);
        words.push(self.shared_inputs);
        words.push(self.dedicated_inputs);
        words.extend_from_slice(&self.output_pins);
        words.push(self.direction);
        words.push(microcode_addr);
        words
    }
}

fn push_byte(slot: u32, byte: u32) -> u32 { (slot << 8) | byte }

impl ExpandedFsm {
    /// Packs the configuration registers.
    pub fn registers(&self) -> Result<FsmRegisters, FsmError> {
        let index_offset = self.index_offset();
        if !(FSM_MIN_INDEX_OFFSET..=FSM_MAX_INDEX_BIT).contains(&index_offset) {
            return Err(FsmError::IndexOffsetOutOfRange(index_offset));
        }

        // Pin indices are bounded by the header width.
        let input_pins = self.inputs().iter().map(|pin| pin.index as u32).collect::<Vec<_>>();
        let num_shared = input_pins.len().min(FSM_DEDICATED_INPUT_LSB.saturating_sub(index_offset));
        // The last inputs hold the low address bits.
        let (dedicated, shared) = input_pins.split_at(input_pins.len() - num_shared);

        let mut shared_inputs = FSM_SLOT_INIT;
        for pin in shared {
            shared_inputs = push_byte(shared_inputs, FSM_SLOT_INPUT | pin);
        }
        for _ in FSM_MIN_INDEX_OFFSET..index_offset.min(FSM_DEDICATED_INPUT_LSB) {
            shared_inputs = push_byte(shared_inputs, FSM_SLOT_STATE);
        }

        let mut dedicated_inputs = FSM_SLOT_INIT;
        for pin in dedicated {
            dedicated_inputs = push_byte(dedicated_inputs, FSM_SLOT_INPUT | pin);
        }
        for _ in FSM_DEDICATED_INPUT_LSB..index_offset {
            dedicated_inputs = push_byte(dedicated_inputs, FSM_SLOT_STATE);
        }

        let mut output_pins = [0; FSM_OUTPUT_REGS];
        for (i, pin) in self.outputs().iter().enumerate() {
            output_pins[i / FSM_PINS_PER_REG] |= (pin.index as u32) << (8 * (i % FSM_PINS_PER_REG));
        }

        let direction = self.outputs().iter().fold((1 << INTERFACE_WIDTH) - 1, |mask, pin| mask & !(1 << pin.index));

        let registers = FsmRegisters { shared_inputs, dedicated_inputs, output_pins, direction };
        log::debug!(target: "fsm", "registers {:#010x?}", registers.to_words(0));
        Ok(registers)
    }
}
