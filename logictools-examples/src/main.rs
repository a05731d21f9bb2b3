mod boolean_gates;
mod traffic_light;
mod waveforms;

use std::error::Error;
use std::fs;
use std::path::Path;

use logictools::{IntfSpec, MemoryTransport};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env("LOGICTOOLS_LOG").format_timestamp(None).init();

    let intf = IntfSpec::pynq_z1();
    let mut transport = MemoryTransport::new();
    boolean_gates::run(&mut transport, &intf)?;
    let dot = traffic_light::run(&mut transport, &intf)?;
    waveforms::run(&intf)?;

    let build = Path::new("./build");
    fs::create_dir_all(build)?;
    fs::write(build.join("traffic_light.dot"), dot)?;
    log::info!("wrote {}", build.join("traffic_light.dot").display());
    Ok(())
}
