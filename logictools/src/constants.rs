//! Hardware contract of the logic co-processor.
//!
//! Every layout constant the compilers and the decoder depend on lives here, so that a change of the
//! co-processor image touches exactly one file.

use static_assertions::const_assert;

/// Number of user pins on the header.
pub const INTERFACE_WIDTH: usize = 20;

/// Mailbox words addressable by the control interface.
pub const MAILBOX_WORDS: usize = 64;

/// Boolean generator (CFGLUT5 lanes).
pub mod lut {
    /// Inputs of one LUT.
    pub const LUT_INPUTS: usize = 5;

    /// Entries of a LUT truth table.
    pub const LUT_ENTRIES: usize = 1 << LUT_INPUTS;

    /// Width of one input-selector field.
    pub const SELECTOR_WIDTH: usize = 5;

    /// Selector value of an unused LUT input.
    pub const SELECTOR_UNUSED: u32 = 0x1f;

    /// Number of output lanes; one per header pin.
    pub const NUM_LANES: usize = super::INTERFACE_WIDTH;

    /// Mailbox word holding the lane enables. A cleared bit marks an active lane.
    pub const ENABLE_WORD: usize = 48;

    /// Mailbox word holding the armed-lane bitmap.
    pub const ARMED_WORD: usize = 49;
}

/// FSM generator.
pub mod fsm {
    /// Address width of the microcode block memory.
    pub const FSM_BRAM_ADDR_WIDTH: usize = 13;

    /// Depth of the microcode block memory.
    pub const FSM_BRAM_DEPTH: usize = 1 << FSM_BRAM_ADDR_WIDTH;

    /// Maximum number of state bits.
    pub const FSM_MAX_STATE_BITS: usize = 9;

    /// Maximum number of input bits.
    pub const FSM_MAX_INPUT_BITS: usize = 8;

    /// Maximum number of state and input bits together.
    pub const FSM_MAX_STATE_INPUT_BITS: usize = 13;

    /// Maximum number of output bits.
    pub const FSM_MAX_OUTPUT_BITS: usize = 19;

    /// Address bits always reserved for the state code.
    pub const FSM_MIN_INDEX_OFFSET: usize = 5;

    /// First address bit of the dedicated input slot.
    pub const FSM_DEDICATED_INPUT_LSB: usize = 9;

    /// Last address bit an input can be routed to.
    pub const FSM_MAX_INDEX_BIT: usize = 12;

    /// Number of output-pin registers.
    pub const FSM_OUTPUT_REGS: usize = 5;

    /// Output pins packed into one output-pin register.
    pub const FSM_PINS_PER_REG: usize = 4;

    /// Initial value of an input-pin slot: every byte routes a state bit.
    pub const FSM_SLOT_INIT: u32 = 0x1f1f1f1f;

    /// Byte marking an address bit driven by the state register.
    pub const FSM_SLOT_STATE: u32 = 0x1f;

    /// Flag marking an address bit driven by an input pin.
    pub const FSM_SLOT_INPUT: u32 = 0x80;
}

/// Trace analyzer.
pub mod trace {
    /// Width of one captured sample in bits.
    pub const MONITOR_WIDTH: usize = 64;

    /// Maximum number of captured samples.
    pub const MAX_NUM_TRACE_SAMPLES: usize = 131072;

    /// Default number of captured samples.
    pub const DEFAULT_NUM_TRACE_SAMPLES: usize = 4096;

    /// Bit of the output-value plane for pin 0.
    pub const OUTPUT_PLANE_LSB: usize = 0;

    /// Bit of the input-value plane for pin 0.
    pub const INPUT_PLANE_LSB: usize = 20;

    /// Bit of the tri-state plane for pin 0.
    pub const TRI_PLANE_LSB: usize = 42;
}

/// Mailbox command opcodes.
pub mod cmd {
    /// Configures the boolean lanes from the mailbox.
    pub const CMD_CONFIG_BOOLEAN: u32 = 0x2;
    /// Arms the boolean lanes.
    pub const CMD_ARM_BOOLEAN: u32 = 0x3;
    /// Returns the current lane enables in mailbox word 0.
    pub const CMD_READ_BOOLEAN_DIRECTION: u32 = 0x4;
    /// Configures the FSM from the mailbox.
    pub const CMD_CONFIG_FSM: u32 = 0x8;
    /// Arms the FSM.
    pub const CMD_ARM_FSM: u32 = 0x9;
    /// Configures the trace buffer from the mailbox.
    pub const CMD_CONFIG_TRACE: u32 = 0x10;
    /// Arms the trace buffer.
    pub const CMD_ARM_TRACE: u32 = 0x11;
    /// Starts every armed generator.
    pub const CMD_RUN: u32 = 0x20;
    /// Stops every generator.
    pub const CMD_STOP: u32 = 0x21;
    /// Returns the I/O switch words in mailbox words 0 and 1.
    pub const CMD_READ_IOSWITCH: u32 = 0x30;
    /// Writes the I/O switch words from mailbox words 0 and 1.
    pub const CMD_CONFIG_IOSWITCH: u32 = 0x31;
}

/// I/O switch selectors.
pub mod ioswitch {
    /// Bits of one pin selector.
    pub const SELECT_WIDTH: usize = 2;
    /// Pins per I/O switch word.
    pub const PINS_PER_WORD: usize = 10;
    /// Routes a pin to the boolean generator.
    pub const IOSWITCH_BG_SELECT: u32 = 0;
    /// Routes a pin to the pattern generator.
    pub const IOSWITCH_PG_SELECT: u32 = 1;
    /// Routes a pin to the FSM generator.
    pub const IOSWITCH_SMG_SELECT: u32 = 2;
}

const_assert!(lut::LUT_INPUTS * lut::SELECTOR_WIDTH <= 32);
const_assert!(lut::LUT_ENTRIES == 32);
const_assert!(2 * lut::NUM_LANES <= lut::ENABLE_WORD);
const_assert!(lut::ARMED_WORD < MAILBOX_WORDS);
const_assert!(fsm::FSM_MAX_STATE_INPUT_BITS == fsm::FSM_BRAM_ADDR_WIDTH);
const_assert!(fsm::FSM_MAX_STATE_INPUT_BITS + fsm::FSM_MAX_OUTPUT_BITS <= 32);
const_assert!(fsm::FSM_MIN_INDEX_OFFSET + fsm::FSM_MAX_INPUT_BITS <= fsm::FSM_BRAM_ADDR_WIDTH);
const_assert!(fsm::FSM_OUTPUT_REGS * fsm::FSM_PINS_PER_REG >= INTERFACE_WIDTH);
const_assert!(trace::TRI_PLANE_LSB + INTERFACE_WIDTH <= trace::MONITOR_WIDTH);
const_assert!(ioswitch::PINS_PER_WORD * ioswitch::SELECT_WIDTH <= 32);
