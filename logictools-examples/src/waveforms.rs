//! Decodes a synthetic capture: a clock driven on D0 and a slower signal sensed on D1.

use logictools::constants::trace::{INPUT_PLANE_LSB, TRI_PLANE_LSB};
use logictools::{decode, IntfSpec, TraceError, TraceSpec};

pub fn run(intf: &IntfSpec) -> Result<(), TraceError> {
    let spec = TraceSpec::with_pins(intf, &["D0", "D1"])?;
    let samples = (0..32i64)
        .map(|cycle| {
            let clock = cycle & 1;
            let slow = (cycle >> 3) & 1;
            clock | (1 << (TRI_PLANE_LSB + 1)) | (slow << (INPUT_PLANE_LSB + 1))
        })
        .collect::<Vec<_>>();

    for lane in decode(&samples, &spec) {
        log::info!("{:>3} {}", lane.pin, lane.wave);
    }
    Ok(())
}
