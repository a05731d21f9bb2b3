//! FSM generator driver.

use crate::constants::fsm::FSM_BRAM_DEPTH;
use crate::constants::ioswitch::IOSWITCH_SMG_SELECT;
use crate::fsm::{CompiledFsm, FsmSpec};
use crate::generator::{FsmConfig, GeneratorError, TraceAnalyzer};
use crate::intf::{Command, IntfSpec, Transport};
use crate::trace::{TraceSpec, WaveLane};

/// Name of the shared buffer staging the microcode.
pub const MICROCODE_BUFFER: &str = "bram_data_buf";

/// Bytes of one microcode word.
const MICROCODE_WORD_BYTES: usize = 4;

/// Runs a Moore machine on the FSM generator of the co-processor.
#[derive(Debug)]
pub struct FsmGenerator<T: Transport> {
    transport: T,
    intf: IntfSpec,
    config: FsmConfig,
    compiled: Option<CompiledFsm>,
    analyzer: Option<TraceAnalyzer>,
}

impl<T: Transport> FsmGenerator<T> {
    /// Creates a generator.
    pub fn new(transport: T, intf: IntfSpec, config: FsmConfig) -> Result<Self, GeneratorError> {
        let analyzer = config.analyzer.map(|analyzer| TraceAnalyzer::new(analyzer, None)).transpose()?;
        Ok(Self { transport, intf, config, compiled: None, analyzer })
    }

    /// Compiles the specification and loads it into the co-processor.
    ///
    /// The microcode is staged in a shared buffer that is freed once the co-processor has copied it, also when the
    /// configuration fails half-way.
    pub fn config(&mut self, spec: &FsmSpec) -> Result<&CompiledFsm, GeneratorError> {
        let compiled = CompiledFsm::compile(spec, &self.intf, self.config.use_state_bits)?;

        self.transport.set_clock(self.config.frequency_mhz)?;
        self.transport.set_io_switch(&compiled.route(), IOSWITCH_SMG_SELECT)?;

        let addr = self.transport.allocate_buffer(MICROCODE_BUFFER, FSM_BRAM_DEPTH, MICROCODE_WORD_BYTES)?;
        let loaded = self.load(&compiled, addr);
        let freed = self.transport.free_buffer(MICROCODE_BUFFER);
        loaded?;
        freed?;

        Ok(self.compiled.insert(compiled))
    }

    fn load(&mut self, compiled: &CompiledFsm, addr: u32) -> Result<(), GeneratorError> {
        self.transport.write_buffer(MICROCODE_BUFFER, &compiled.microcode.to_bram_image())?;
        let words = compiled.registers.to_words(addr);
        log::debug!(target: "generator", "fsm registers {:#010x?}", words);
        self.transport.write_control(&words)?;
        self.transport.write_command(Command::ConfigFsm)?;

        if let Some(analyzer) = &mut self.analyzer {
            let pins = compiled.fsm.inputs().iter().chain(compiled.fsm.outputs()).map(|pin| pin.pin.as_str());
            analyzer.set_spec(TraceSpec::with_pins(&self.intf, &pins.collect::<Vec<_>>())?);
            let _ = analyzer.config(&mut self.transport)?;
        }
        Ok(())
    }

    /// Arms the FSM and the analyzer.
    pub fn arm(&mut self) -> Result<(), GeneratorError> {
        if self.compiled.is_none() {
            return Err(GeneratorError::NotConfigured("FSM generator"));
        }
        self.transport.write_command(Command::ArmFsm)?;
        if let Some(analyzer) = &self.analyzer {
            analyzer.arm(&mut self.transport)?;
        }
        Ok(())
    }

    /// Starts every armed generator.
    pub fn run(&mut self) -> Result<(), GeneratorError> {
        self.transport.write_command(Command::Run)?;
        Ok(())
    }

    /// Stops every generator. A new specification may be configured afterwards.
    pub fn stop(&mut self) -> Result<(), GeneratorError> {
        self.transport.write_command(Command::Stop)?;
        Ok(())
    }

    /// Decodes the samples captured on the FSM pins.
    pub fn analyze(&mut self) -> Result<Vec<WaveLane>, GeneratorError> {
        let mut lanes = self.analyzer.as_ref().ok_or(GeneratorError::NoAnalyzer)?.analyze(&mut self.transport)?;
        if let Some(compiled) = &self.compiled {
            for (lane, pin) in lanes.iter_mut().zip(compiled.fsm.inputs().iter().chain(compiled.fsm.outputs())) {
                lane.name = pin.name.clone();
            }
        }
        Ok(lanes)
    }

    /// Releases the analyzer's buffer and forgets the configuration.
    pub fn reset(&mut self) -> Result<(), GeneratorError> {
        self.compiled = None;
        if let Some(analyzer) = &mut self.analyzer {
            analyzer.reset(&mut self.transport)?;
        }
        Ok(())
    }

    /// Returns the configured FSM.
    pub fn compiled(&self) -> Option<&CompiledFsm> { self.compiled.as_ref() }

    /// Returns the analyzer.
    pub fn analyzer(&self) -> Option<&TraceAnalyzer> { self.analyzer.as_ref() }

    /// Returns the transport.
    pub fn transport(&self) -> &T { &self.transport }

    /// Returns the transport mutably.
    pub fn transport_mut(&mut self) -> &mut T { &mut self.transport }

    /// Consumes the generator and returns the transport.
    pub fn into_transport(self) -> T { self.transport }
}
