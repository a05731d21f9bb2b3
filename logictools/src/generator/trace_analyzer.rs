//! Trace analyzer driver.

use crate::generator::{AnalyzerConfig, GeneratorError};
use crate::intf::{Command, Transport};
use crate::trace::{check_num_samples, decode, TraceError, TraceSpec, WaveLane};

/// Name of the shared buffer holding the captured samples.
pub const TRACE_BUFFER: &str = "trace_buf";

/// Captures the header pins into a shared buffer and decodes them.
///
/// The analyzer does not own a transport; it runs on the transport of the generator it observes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceAnalyzer {
    spec: Option<TraceSpec>,
    num_samples: usize,
    buffer_addr: Option<u32>,
}

impl TraceAnalyzer {
    /// Creates an analyzer. The trace specification may be supplied later with [`TraceAnalyzer::set_spec`].
    pub fn new(config: AnalyzerConfig, spec: Option<TraceSpec>) -> Result<Self, TraceError> {
        Ok(Self { spec, num_samples: check_num_samples(config.num_samples)?, buffer_addr: None })
    }

    /// Replaces the trace specification.
    pub fn set_spec(&mut self, spec: TraceSpec) { self.spec = Some(spec); }

    /// Returns the trace specification.
    pub fn spec(&self) -> Option<&TraceSpec> { self.spec.as_ref() }

    /// Returns the number of samples captured per run.
    pub fn num_samples(&self) -> usize { self.num_samples }

    /// Returns the physical address of the trace buffer, if configured.
    pub fn buffer_addr(&self) -> Option<u32> { self.buffer_addr }

    /// Allocates the trace buffer and hands it to the co-processor.
    pub fn config<T: Transport>(&mut self, transport: &mut T) -> Result<u32, GeneratorError> {
        let sample_bytes = self.spec.as_ref().ok_or(TraceError::MissingSpec)?.sample_bytes();
        self.reset(transport)?;

        let addr = transport.allocate_buffer(TRACE_BUFFER, self.num_samples, sample_bytes)?;
        self.buffer_addr = Some(addr);
        transport.write_control(&[addr])?;
        transport.write_command(Command::ConfigTrace)?;
        log::debug!(target: "trace", "trace buffer of {} samples at {:#x}", self.num_samples, addr);
        Ok(addr)
    }

    /// Arms the capture.
    pub fn arm<T: Transport>(&self, transport: &mut T) -> Result<(), GeneratorError> {
        transport.write_command(Command::ArmTrace)?;
        Ok(())
    }

    /// Starts the capture.
    pub fn run<T: Transport>(&self, transport: &mut T) -> Result<(), GeneratorError> {
        transport.write_command(Command::Run)?;
        Ok(())
    }

    /// Stops the capture.
    pub fn stop<T: Transport>(&self, transport: &mut T) -> Result<(), GeneratorError> {
        transport.write_command(Command::Stop)?;
        Ok(())
    }

    /// Decodes the captured samples.
    pub fn analyze<T: Transport>(&self, transport: &mut T) -> Result<Vec<WaveLane>, GeneratorError> {
        let spec = self.spec.as_ref().ok_or(TraceError::MissingSpec)?;
        if self.buffer_addr.is_none() {
            return Err(GeneratorError::NotConfigured("trace analyzer"));
        }
        let mut samples = transport.read_buffer(TRACE_BUFFER)?;
        samples.truncate(self.num_samples);
        Ok(decode(&samples, spec))
    }

    /// Frees the trace buffer.
    pub fn reset<T: Transport>(&mut self, transport: &mut T) -> Result<(), GeneratorError> {
        if self.buffer_addr.take().is_some() {
            transport.free_buffer(TRACE_BUFFER)?;
        }
        Ok(())
    }
}
