//! In-memory co-processor.

use linked_hash_map::LinkedHashMap;

use crate::constants::{lut, MAILBOX_WORDS};
use crate::intf::{Command, IoSwitchConfig, Transport, TransportError};

/// Base of the physical addresses handed out by `MemoryTransport`.
const BUFFER_BASE_ADDR: u32 = 0x1800_0000;

#[derive(Debug, Clone)]
struct Buffer {
    addr: u32,
    element_width: usize,
    data: Vec<i64>,
}

/// FSM configuration latched by a `ConfigFsm` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatchedFsm {
    /// Register words read from the mailbox.
    pub registers: Vec<u32>,
    /// Microcode words copied from the buffer named by the last register word.
    pub microcode: Vec<u32>,
}

/// A transport backed by memory, acting like the co-processor firmware.
///
/// Commands are recorded in order. Configure commands latch the mailbox the way the firmware does, so the effect
/// of a configuration survives the release of its staging buffers.
#[derive(Debug)]
pub struct MemoryTransport {
    commands: Vec<Command>,
    mailbox: Vec<u32>,
    buffers: LinkedHashMap<String, Buffer>,
    next_addr: u32,
    lane_enables: u32,
    lane_armed: u32,
    io_switch: IoSwitchConfig,
    clock_mhz: Option<f64>,
    fsm: Option<LatchedFsm>,
    trace_addr: Option<u32>,
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
            mailbox: vec![0; MAILBOX_WORDS],
            buffers: LinkedHashMap::new(),
            next_addr: BUFFER_BASE_ADDR,
            lane_enables: u32::MAX,
            lane_armed: 0,
            io_switch: IoSwitchConfig::default(),
            clock_mhz: None,
            fsm: None,
            trace_addr: None,
        }
    }
}

impl MemoryTransport {
    /// Creates a new transport with every boolean lane disabled.
    pub fn new() -> Self { Self::default() }

    /// Returns the commands issued so far.
    pub fn commands(&self) -> &[Command] { &self.commands }

    /// Returns the mailbox.
    pub fn mailbox(&self) -> &[u32] { &self.mailbox }

    /// Returns the latched boolean lane enables.
    pub fn lane_enables(&self) -> u32 { self.lane_enables }

    /// Returns the latched armed-lane bitmap.
    pub fn lane_armed(&self) -> u32 { self.lane_armed }

    /// Returns the I/O switch configuration.
    pub fn io_switch(&self) -> IoSwitchConfig { self.io_switch }

    /// Returns the generator clock, if set.
    pub fn clock_mhz(&self) -> Option<f64> { self.clock_mhz }

    /// Returns the latched FSM configuration.
    pub fn fsm(&self) -> Option<&LatchedFsm> { self.fsm.as_ref() }

    /// Returns the address of the configured trace buffer.
    pub fn trace_addr(&self) -> Option<u32> { self.trace_addr }

    /// Returns `true` if the buffer is allocated.
    pub fn has_buffer(&self, name: &str) -> bool { self.buffers.contains_key(name) }

    /// Fills the buffer with captured samples, truncated to the element width.
    pub fn load_samples(&mut self, name: &str, samples: &[i64]) -> Result<(), TransportError> {
        let buffer = self.buffers.get_mut(name).ok_or_else(|| TransportError::NoSuchBuffer(name.to_string()))?;
        if samples.len() > buffer.data.len() {
            return Err(TransportError::BufferTooSmall {
                name: name.to_string(),
                capacity: buffer.data.len(),
                requested: samples.len(),
            });
        }
        let element_width = buffer.element_width;
        for (slot, sample) in buffer.data.iter_mut().zip(samples) {
            *slot = sign_extend(*sample, element_width);
        }
        Ok(())
    }

    fn buffer_at(&self, addr: u32) -> Option<&Buffer> { self.buffers.values().find(|buffer| buffer.addr == addr) }

    fn latch(&mut self, command: Command) {
        match command {
            Command::ConfigBoolean => {
                self.lane_enables = self.mailbox[lut::ENABLE_WORD];
                self.lane_armed = self.mailbox[lut::ARMED_WORD];
            }
            Command::ReadBooleanDirection => self.mailbox[0] = self.lane_enables,
            Command::ReadIoSwitch => {
                self.mailbox[..IoSwitchConfig::NUM_WORDS].copy_from_slice(&self.io_switch.words())
            }
            Command::ConfigIoSwitch => {
                self.io_switch = IoSwitchConfig::from_words(&self.mailbox[..IoSwitchConfig::NUM_WORDS])
            }
            Command::ConfigFsm => {
                let registers = self.mailbox[..crate::fsm::FsmRegisters::NUM_WORDS].to_vec();
                let microcode = registers
                    .last()
                    .and_then(|addr| self.buffer_at(*addr))
                    .map(|buffer| buffer.data.iter().map(|word| *word as u32).collect())
                    .unwrap_or_default();
                self.fsm = Some(LatchedFsm { registers, microcode });
            }
            Command::ConfigTrace => self.trace_addr = Some(self.mailbox[0]),
            Command::ArmBoolean | Command::ArmFsm | Command::ArmTrace | Command::Run | Command::Stop => (),
        }
    }
}

impl Transport for MemoryTransport {
    fn write_command(&mut self, command: Command) -> Result<(), TransportError> {
        log::trace!(target: "transport", "command {}", command);
        self.commands.push(command);
        self.latch(command);
        Ok(())
    }

    fn write_control(&mut self, words: &[u32]) -> Result<(), TransportError> {
        if words.len() > self.mailbox.len() {
            return Err(TransportError::BufferTooSmall {
                name: "mailbox".to_string(),
                capacity: self.mailbox.len(),
                requested: words.len(),
            });
        }
        self.mailbox[..words.len()].copy_from_slice(words);
        Ok(())
    }

    fn read_results(&mut self, num_words: usize) -> Result<Vec<u32>, TransportError> {
        self.mailbox.get(..num_words).map(<[u32]>::to_vec).ok_or(TransportError::BufferTooSmall {
            name: "mailbox".to_string(),
            capacity: MAILBOX_WORDS,
            requested: num_words,
        })
    }

    fn allocate_buffer(&mut self, name: &str, length: usize, element_width: usize) -> Result<u32, TransportError> {
        if self.buffers.contains_key(name) {
            return Err(TransportError::BufferExists(name.to_string()));
        }
        if !(1..=8).contains(&element_width) {
            return Err(TransportError::Device(format!("unsupported element width {}", element_width)));
        }
        let addr = self.next_addr;
        let size = u32::try_from(length * element_width)
            .map_err(|_| TransportError::Device(format!("buffer {} of {} elements is too large", name, length)))?;
        // Keeps every buffer 4 KiB aligned.
        let span = (size.saturating_add(0xfff) & !0xfff).max(0x1000);
        self.next_addr = addr.wrapping_add(span);
        let _ = self.buffers.insert(name.to_string(), Buffer { addr, element_width, data: vec![0; length] });
        log::trace!(target: "transport", "allocated {} ({} x {} bytes) at {:#x}", name, length, element_width, addr);
        Ok(addr)
    }

    fn write_buffer(&mut self, name: &str, data: &[u32]) -> Result<(), TransportError> {
        let buffer = self.buffers.get_mut(name).ok_or_else(|| TransportError::NoSuchBuffer(name.to_string()))?;
        if data.len() > buffer.data.len() {
            return Err(TransportError::BufferTooSmall {
                name: name.to_string(),
                capacity: buffer.data.len(),
                requested: data.len(),
            });
        }
        let element_width = buffer.element_width;
        for (slot, word) in buffer.data.iter_mut().zip(data) {
            *slot = sign_extend(i64::from(*word), element_width);
        }
        Ok(())
    }

    fn read_buffer(&mut self, name: &str) -> Result<Vec<i64>, TransportError> {
        self.buffers
            .get(name)
            .map(|buffer| buffer.data.clone())
            .ok_or_else(|| TransportError::NoSuchBuffer(name.to_string()))
    }

    fn free_buffer(&mut self, name: &str) -> Result<(), TransportError> {
        self.buffers.remove(name).map(|_| ()).ok_or_else(|| TransportError::NoSuchBuffer(name.to_string()))
    }

    fn set_clock(&mut self, frequency_mhz: f64) -> Result<(), TransportError> {
        if !(frequency_mhz > 0.0) {
            return Err(TransportError::Device(format!("invalid clock frequency {} MHz", frequency_mhz)));
        }
        self.clock_mhz = Some(frequency_mhz);
        Ok(())
    }
}

/// Truncates the value to `width` bytes and sign-extends it back to 64 bits.
fn sign_extend(value: i64, width: usize) -> i64 {
    let shift = 64 - 8 * width as u32;
    if shift == 0 {
        value
    } else {
        (value << shift) >> shift
    }
}
