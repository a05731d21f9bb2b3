use logictools::constants::ioswitch::{IOSWITCH_BG_SELECT, IOSWITCH_SMG_SELECT};
use logictools::intf::Command;
use logictools::*;

#[test]
fn boolean_and_fsm_share_the_header() {
    let intf = IntfSpec::pynq_z1();
    let mut transport = MemoryTransport::new();

    let mut boolean = BooleanGenerator::new(&mut transport, intf.clone(), None).unwrap();
    let _ = boolean.config("D10 = D11 | D12").unwrap();
    boolean.arm().unwrap();

    let spec = FsmSpec::new()
        .input("go", "D0")
        .output("busy", "D1")
        .states(["IDLE", "RUN"])
        .transition("1", "IDLE", "RUN", "0")
        .transition("-", "RUN", "IDLE", "1");
    let config = FsmConfig { analyzer: Some(AnalyzerConfig { num_samples: 8 }), ..FsmConfig::default() };
    let mut fsm = FsmGenerator::new(&mut transport, intf, config).unwrap();
    let _ = fsm.config(&spec).unwrap();
    fsm.arm().unwrap();
    fsm.run().unwrap();
    fsm.stop().unwrap();
    fsm.reset().unwrap();

    let io_switch = transport.io_switch();
    assert_eq!(io_switch.get(10).unwrap(), IOSWITCH_BG_SELECT);
    assert_eq!(io_switch.get(0).unwrap(), IOSWITCH_SMG_SELECT);
    assert_eq!(io_switch.get(1).unwrap(), IOSWITCH_SMG_SELECT);
    assert_eq!(transport.lane_enables(), !(1 << 10));
    assert!(transport.fsm().is_some());
    assert!(!transport.has_buffer("trace_buf"));
    assert!(!transport.has_buffer("bram_data_buf"));
    assert_eq!(transport.commands().iter().filter(|command| **command == Command::Run).count(), 1);
}
