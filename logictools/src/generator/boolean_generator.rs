//! Boolean generator driver.

use crate::boolean::{LutConfig, LutImage};
use crate::constants::ioswitch::IOSWITCH_BG_SELECT;
use crate::generator::{AnalyzerConfig, GeneratorError, TraceAnalyzer};
use crate::intf::{Command, IntfSpec, Transport};
use crate::trace::{TraceSpec, WaveLane};

/// Drives boolean functions on the LUT lanes of the co-processor.
#[derive(Debug)]
pub struct BooleanGenerator<T: Transport> {
    transport: T,
    intf: IntfSpec,
    image: LutImage,
    analyzer: Option<TraceAnalyzer>,
}

impl<T: Transport> BooleanGenerator<T> {
    /// Creates a generator, optionally with a trace analyzer on every pin of the interface.
    pub fn new(transport: T, intf: IntfSpec, analyzer: Option<AnalyzerConfig>) -> Result<Self, GeneratorError> {
        let analyzer = analyzer.map(|config| TraceAnalyzer::new(config, Some(TraceSpec::new(&intf)))).transpose()?;
        Ok(Self { transport, intf, image: LutImage::new(), analyzer })
    }

    /// Compiles `OUTPUT_PIN = expression` and loads it into its lane.
    ///
    /// Lanes loaded earlier, by this generator or by any other, stay active.
    pub fn config(&mut self, expression: &str) -> Result<LutConfig, GeneratorError> {
        let config = LutConfig::compile(expression, &self.intf)?;

        self.transport.set_io_switch(&config.route(), IOSWITCH_BG_SELECT)?;
        self.transport.write_command(Command::ReadBooleanDirection)?;
        let enables = self.transport.read_results(1)?;
        self.image.merge_enables(enables.first().copied().unwrap_or(u32::MAX));
        let config = self.image.insert(config)?.clone();
        log::debug!(
            target: "generator",
            "lane {}: selectors {:#010x}, truth table {:#010x}, enables {:#010x}",
            config.lane,
            config.selector_word(),
            config.truth_table_word(),
            self.image.enables()
        );

        self.transport.write_control(&self.image.mailbox_words())?;
        self.transport.write_command(Command::ConfigBoolean)?;

        if let Some(analyzer) = &mut self.analyzer {
            let _ = analyzer.config(&mut self.transport)?;
        }
        Ok(config)
    }

    /// Arms the configured lanes and the analyzer.
    pub fn arm(&mut self) -> Result<(), GeneratorError> {
        self.transport.write_command(Command::ArmBoolean)?;
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

    /// Stops every generator.
    pub fn stop(&mut self) -> Result<(), GeneratorError> {
        self.transport.write_command(Command::Stop)?;
        Ok(())
    }

    /// Decodes the samples captured by the analyzer.
    pub fn analyze(&mut self) -> Result<Vec<WaveLane>, GeneratorError> {
        self.analyzer.as_ref().ok_or(GeneratorError::NoAnalyzer)?.analyze(&mut self.transport)
    }

    /// Releases the analyzer's buffer.
    pub fn reset(&mut self) -> Result<(), GeneratorError> {
        if let Some(analyzer) = &mut self.analyzer {
            analyzer.reset(&mut self.transport)?;
        }
        Ok(())
    }

    /// Returns the lane image.
    pub fn image(&self) -> &LutImage { &self.image }

    /// Returns the analyzer.
    pub fn analyzer(&self) -> Option<&TraceAnalyzer> { self.analyzer.as_ref() }

    /// Returns the transport.
    pub fn transport(&self) -> &T { &self.transport }

    /// Returns the transport mutably.
    pub fn transport_mut(&mut self) -> &mut T { &mut self.transport }

    /// Consumes the generator and returns the transport.
    pub fn into_transport(self) -> T { self.transport }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boolean::BooleanError;
    use crate::constants::lut::ENABLE_WORD;
    use crate::intf::MemoryTransport;

    #[test]
    fn config_cycle() {
        let mut transport = MemoryTransport::new();
        let mut generator = BooleanGenerator::new(&mut transport, IntfSpec::pynq_z1(), None).unwrap();
        let config = generator.config("D4 = D0 & D1").unwrap();
        assert_eq!(config.lane, 4);
        generator.arm().unwrap();
        generator.run().unwrap();
        generator.stop().unwrap();
        assert!(matches!(generator.analyze(), Err(GeneratorError::NoAnalyzer)));

        assert_eq!(transport.commands(), &[
            Command::ReadIoSwitch,
            Command::ConfigIoSwitch,
            Command::ReadBooleanDirection,
            Command::ConfigBoolean,
            Command::ArmBoolean,
            Command::Run,
            Command::Stop,
        ]);
        assert_eq!(transport.lane_enables(), !(1 << 4));
        assert_eq!(transport.mailbox()[9], 0x8888_8888);
        assert_eq!(transport.io_switch().get(4).unwrap(), IOSWITCH_BG_SELECT);
    }

    #[test]
    fn lanes_of_other_generators_stay_active() {
        let mut transport = MemoryTransport::new();
        let intf = IntfSpec::pynq_z1();
        let _ = BooleanGenerator::new(&mut transport, intf.clone(), None).unwrap().config("D4 = D0").unwrap();
        let mut second = BooleanGenerator::new(&mut transport, intf, None).unwrap();
        let _ = second.config("D9 = ~D5").unwrap();
        assert_eq!(second.image().enables(), !((1 << 4) | (1 << 9)));
        assert_eq!(transport.mailbox()[ENABLE_WORD], !((1 << 4) | (1 << 9)));
    }

    #[test]
    fn rejected_expression_reaches_no_hardware() {
        let mut transport = MemoryTransport::new();
        let mut generator = BooleanGenerator::new(&mut transport, IntfSpec::pynq_z1(), None).unwrap();
        assert!(matches!(
            generator.config("D4 = D0 & D1 & D2 & D3 & D5 & D6"),
            Err(GeneratorError::Boolean(BooleanError::TooManyInputs(_)))
        ));
        assert!(transport.commands().is_empty());
    }

    #[test]
    fn analyzer_follows_the_generator() {
        let mut transport = MemoryTransport::new();
        let analyzer = AnalyzerConfig { num_samples: 2 };
        let mut generator = BooleanGenerator::new(&mut transport, IntfSpec::pynq_z1(), Some(analyzer)).unwrap();
        let _ = generator.config("D4 = D0").unwrap();
        generator.arm().unwrap();
        generator.transport_mut().load_samples("trace_buf", &[0b1_0001, 0]).unwrap();

        let lanes = generator.analyze().unwrap();
        assert_eq!(lanes.len(), 20);
        assert_eq!(lanes[0].wave.to_string(), "hl");
        assert_eq!(lanes[4].wave.to_string(), "hl");
        generator.reset().unwrap();
        assert!(!transport.has_buffer("trace_buf"));
    }
}
