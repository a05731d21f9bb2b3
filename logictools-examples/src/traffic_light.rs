//! A traffic light with a pedestrian button and a global reset.

use logictools::{FsmConfig, FsmGenerator, FsmSpec, GeneratorError, IntfSpec, MemoryTransport};

fn spec() -> FsmSpec {
    FsmSpec::new()
        .input("reset", "D0")
        .input("button", "D1")
        .output("red", "D2")
        .output("yellow", "D3")
        .output("green", "D4")
        .states(["GREEN", "YELLOW", "RED"])
        .transition("01", "GREEN", "YELLOW", "001")
        .transition("00", "GREEN", "GREEN", "001")
        .transition("0-", "YELLOW", "RED", "010")
        .transition("0-", "RED", "GREEN", "100")
        .transition("1-", "*", "GREEN", "")
}

/// Loads the light and returns its state graph in DOT.
pub fn run(transport: &mut MemoryTransport, intf: &IntfSpec) -> Result<String, GeneratorError> {
    let config = FsmConfig { use_state_bits: true, analyzer: None, ..FsmConfig::default() };
    let mut generator = FsmGenerator::new(transport, intf.clone(), config)?;
    let compiled = generator.config(&spec())?;
    for state in compiled.fsm.states() {
        if let (Some(code), Some(output)) = (compiled.fsm.state_code(state), compiled.fsm.state_output(state)) {
            log::info!("{}: code {}, output {}", state, code, output);
        }
    }
    log::info!("{} microcode rows, registers {:x?}", compiled.fsm.transitions().len(), compiled.registers);
    let dot = compiled.fsm.to_dot();

    generator.arm()?;
    generator.run()?;
    generator.stop()?;
    Ok(dot)
}
