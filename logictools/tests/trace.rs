use logictools::constants::trace::{INPUT_PLANE_LSB, MAX_NUM_TRACE_SAMPLES, TRI_PLANE_LSB};
use logictools::*;
use proptest::prelude::*;
use rstest::rstest;

/// Drives the bitstring on output D0 and senses its complement on input D1.
fn capture(bits: &str) -> Vec<i64> {
    let tri_d1 = 1i64 << (TRI_PLANE_LSB + 1);
    bits.chars()
        .map(|bit| if bit == '1' { 1 } else { tri_d1 | (1 << (INPUT_PLANE_LSB + 1)) })
        .collect()
}

fn complement(bits: &str) -> String { bits.chars().map(|bit| if bit == '1' { '0' } else { '1' }).collect() }

fn decode_pins(bits: &str) -> Vec<WaveLane> {
    let spec = TraceSpec::with_pins(&IntfSpec::pynq_z1(), &["D0", "D1"]).unwrap();
    decode(&capture(bits), &spec)
}

proptest! {
    #[test]
    fn captured_levels_survive_decoding(bits in "[01]{0,512}") {
        let lanes = decode_pins(&bits);
        prop_assert_eq!(lanes[0].wave.to_bitstring(), bits.clone());
        prop_assert_eq!(lanes[1].wave.to_bitstring(), complement(&bits));
        prop_assert_eq!(lanes[0].wave.to_string().parse::<Wave>().unwrap(), lanes[0].wave.clone());
    }
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(MAX_NUM_TRACE_SAMPLES)]
fn sample_count_edges(#[case] len: usize) {
    let bits = (0..len).map(|i| if i % 3 == 0 { '1' } else { '0' }).collect::<String>();
    let lanes = decode_pins(&bits);
    assert_eq!(lanes.len(), 2);
    assert_eq!(lanes[0].wave.len(), len);
    assert_eq!(lanes[0].wave.to_bitstring(), bits);
    assert_eq!(lanes[1].wave.to_bitstring(), complement(&bits));
}

#[test]
fn unknown_pins_are_rejected() {
    let error = TraceSpec::with_pins(&IntfSpec::pynq_z1(), &["D0", "A3"]).unwrap_err();
    assert_eq!(error, TraceError::UnknownPin("A3".to_string()));
}
