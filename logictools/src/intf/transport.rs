//! Command/mailbox transport.

use std::fmt;

use thiserror::Error;

use crate::constants::cmd::*;
use crate::intf::IoSwitchConfig;

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("no such buffer {0} allocated previously")]
    NoSuchBuffer(String),
    #[error("buffer {0} is already allocated")]
    BufferExists(String),
    #[error("buffer {name} holds {capacity} elements, {requested} requested")]
    BufferTooSmall { name: String, capacity: usize, requested: usize },
    #[error("pin index {0} is not on the I/O switch")]
    InvalidPin(usize),
    #[error("device error: {0}")]
    Device(String),
}

/// Mailbox command.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    ConfigBoolean,
    ArmBoolean,
    ReadBooleanDirection,
    ConfigFsm,
    ArmFsm,
    ConfigTrace,
    ArmTrace,
    Run,
    Stop,
    ReadIoSwitch,
    ConfigIoSwitch,
}

impl Command {
    /// Returns the opcode written to the command word.
    pub fn opcode(self) -> u32 {
        match self {
            Self::ConfigBoolean => CMD_CONFIG_BOOLEAN,
            Self::ArmBoolean => CMD_ARM_BOOLEAN,
            Self::ReadBooleanDirection => CMD_READ_BOOLEAN_DIRECTION,
            Self::ConfigFsm => CMD_CONFIG_FSM,
            Self::ArmFsm => CMD_ARM_FSM,
            Self::ConfigTrace => CMD_CONFIG_TRACE,
            Self::ArmTrace => CMD_ARM_TRACE,
            Self::Run => CMD_RUN,
            Self::Stop => CMD_STOP,
            Self::ReadIoSwitch => CMD_READ_IOSWITCH,
            Self::ConfigIoSwitch => CMD_CONFIG_IOSWITCH,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{:?}({:#x})", self, self.opcode()) }
}

/// Channel to the co-processor.
///
/// Every call is synchronous: `write_command` returns once the co-processor acknowledged the command.
pub trait Transport {
    /// Issues the command and waits for the acknowledgment.
    fn write_command(&mut self, command: Command) -> Result<(), TransportError>;

    /// Writes the words into the mailbox, starting at word 0.
    fn write_control(&mut self, words: &[u32]) -> Result<(), TransportError>;

    /// Reads `num_words` mailbox words, starting at word 0.
    fn read_results(&mut self, num_words: usize) -> Result<Vec<u32>, TransportError>;

    /// Allocates a shared buffer of `length` elements of `element_width` bytes and returns its physical address.
    fn allocate_buffer(&mut self, name: &str, length: usize, element_width: usize) -> Result<u32, TransportError>;

    /// Writes the words to the start of the buffer.
    fn write_buffer(&mut self, name: &str, data: &[u32]) -> Result<(), TransportError>;

    /// Reads every element of the buffer, sign-extended.
    fn read_buffer(&mut self, name: &str) -> Result<Vec<i64>, TransportError>;

    /// Frees the buffer.
    fn free_buffer(&mut self, name: &str) -> Result<(), TransportError>;

    /// Sets the clock of the generators.
    fn set_clock(&mut self, frequency_mhz: f64) -> Result<(), TransportError>;

    /// Routes the pins to the generator selected by `select`, leaving other pins untouched.
    fn set_io_switch(&mut self, pins: &[usize], select: u32) -> Result<(), TransportError> {
        self.write_command(Command::ReadIoSwitch)?;
        let mut config = IoSwitchConfig::from_words(&self.read_results(IoSwitchConfig::NUM_WORDS)?);
        for pin in pins {
            config.set(*pin, select)?;
        }
        log::debug!(target: "transport", "io switch {:#010x?} for pins {:?}", config.words(), pins);

        self.write_control(&config.words())?;
        self.write_command(Command::ConfigIoSwitch)
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write_command(&mut self, command: Command) -> Result<(), TransportError> { (**self).write_command(command) }

    fn write_control(&mut self, words: &[u32]) -> Result<(), TransportError> { (**self).write_control(words) }

    fn read_results(&mut self, num_words: usize) -> Result<Vec<u32>, TransportError> {
        (**self).read_results(num_words)
    }

    fn allocate_buffer(&mut self, name: &str, length: usize, element_width: usize) -> Result<u32, TransportError> {
        (**self).allocate_buffer(name, length, element_width)
    }

    fn write_buffer(&mut self, name: &str, data: &[u32]) -> Result<(), TransportError> {
        (**self).write_buffer(name, data)
    }

    fn read_buffer(&mut self, name: &str) -> Result<Vec<i64>, TransportError> { (**self).read_buffer(name) }

    fn free_buffer(&mut self, name: &str) -> Result<(), TransportError> { (**self).free_buffer(name) }

    fn set_clock(&mut self, frequency_mhz: f64) -> Result<(), TransportError> { (**self).set_clock(frequency_mhz) }

    fn set_io_switch(&mut self, pins: &[usize], select: u32) -> Result<(), TransportError> {
        (**self).set_io_switch(pins, select)
    }
}
