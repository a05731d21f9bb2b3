//! Three gates on separate lanes, sharing one capture.

use logictools::{AnalyzerConfig, BooleanGenerator, GeneratorError, IntfSpec, MemoryTransport};

pub fn run(transport: &mut MemoryTransport, intf: &IntfSpec) -> Result<(), GeneratorError> {
    let mut generator = BooleanGenerator::new(transport, intf.clone(), Some(AnalyzerConfig { num_samples: 16 }))?;
    for expression in ["D4 = D0 & D1", "D5 = D2 ^ D3", "D9 = ~(D6 | D7) & D8"] {
        let config = generator.config(expression)?;
        log::info!(
            "{}: lane {}, selectors {:#010x}, truth table {:#010x}",
            expression,
            config.lane,
            config.selector_word(),
            config.truth_table_word()
        );
    }
    generator.arm()?;
    generator.run()?;
    generator.stop()?;
    log::info!("lane enables {:#010x}", generator.image().enables());
    generator.reset()
}
