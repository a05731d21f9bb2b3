//! Sample decoding.

use linked_hash_map::LinkedHashMap;

use crate::intf::{IntfSpec, PlaneBits};
use crate::trace::{TraceError, Wave};

/// Which bits of a captured sample belong to which pin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceSpec {
    /// Capture-plane bits of every traced pin, in display order.
    pub planes: LinkedHashMap<String, PlaneBits>,

    /// Width of one sample in bits.
    pub monitor_width: usize,
}

impl TraceSpec {
    /// Traces every pin of the interface.
    pub fn new(intf: &IntfSpec) -> Self { Self { planes: intf.planes.clone(), monitor_width: intf.monitor_width } }

    /// Traces the given pins of the interface, in the given order.
    pub fn with_pins(intf: &IntfSpec, pins: &[&str]) -> Result<Self, TraceError> {
        let planes = pins
            .iter()
            .map(|pin| {
                let bits = intf.planes.get(*pin).copied().ok_or_else(|| TraceError::UnknownPin(pin.to_string()))?;
                Ok((pin.to_string(), bits))
            })
            .collect::<Result<LinkedHashMap<_, _>, TraceError>>()?;
        Ok(Self { planes, monitor_width: intf.monitor_width })
    }

    /// Returns the width of one sample in bytes.
    pub fn sample_bytes(&self) -> usize { (self.monitor_width + 7) / 8 }
}

impl From<&IntfSpec> for TraceSpec {
    fn from(intf: &IntfSpec) -> Self { Self::new(intf) }
}

/// Waveform of one traced pin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveLane {
    /// Display name of the lane; empty unless set by the caller.
    pub name: String,

    /// Name of the pin.
    pub pin: String,

    /// Levels of the pin.
    pub wave: Wave,
}

fn bit(sample: i64, index: usize) -> bool {
    u32::try_from(index).ok().and_then(|index| (sample as u64).checked_shr(index)).map_or(false, |word| word & 1 == 1)
}

/// Decodes the samples into one waveform per traced pin.
///
/// For every sample, the tri-state bit of a pin selects the level: the driven output value if `0`, the sensed input
/// value if `1`.
pub fn decode(samples: &[i64], spec: &TraceSpec) -> Vec<WaveLane> {
    let lanes = spec
        .planes
        .iter()
        .map(|(pin, planes)| {
            let levels = samples
                .iter()
                .map(|sample| {
                    let plane = if bit(*sample, planes.tri) { planes.input } else { planes.output };
                    bit(*sample, plane)
                })
                .collect();
            WaveLane { name: String::new(), pin: pin.clone(), wave: Wave::from_levels(levels) }
        })
        .collect::<Vec<_>>();
    log::debug!(target: "trace", "decoded {} samples on {} pins", samples.len(), lanes.len());
    lanes
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Packs per-pin levels into samples: pin `i` drives `outputs[i]` unless `tri[i]` selects `inputs[i]`.
    fn pack(intf: &IntfSpec, lanes: &[(&str, &str, &str, &str)]) -> Vec<i64> {
        let len = lanes.first().map_or(0, |(_, outputs, _, _)| outputs.len());
        (0..len)
            .map(|t| {
                lanes.iter().fold(0u64, |word, (pin, outputs, inputs, tri)| {
                    let bits = intf.planes[*pin];
                    let at = |s: &str| u64::from(s.as_bytes()[t] == b'1');
                    word | (at(*outputs) << bits.output) | (at(*inputs) << bits.input) | (at(*tri) << bits.tri)
                }) as i64
            })
            .collect()
    }

    #[test]
    fn tri_state_selects_the_plane() {
        let intf = IntfSpec::pynq_z1();
        let samples = pack(&intf, &[("D0", "0101", "1111", "0011"), ("D19", "1100", "0000", "0000")]);
        let spec = TraceSpec::with_pins(&intf, &["D0", "D19"]).unwrap();
        let lanes = decode(&samples, &spec);

        assert_eq!(lanes.len(), 2);
        assert_eq!(lanes[0].pin, "D0");
        assert_eq!(lanes[0].wave.to_bitstring(), "0111");
        assert_eq!(lanes[0].wave.to_string(), "lh..");
        assert_eq!(lanes[1].wave.to_string(), "h.l.");
    }

    #[test]
    fn negative_samples_use_the_top_planes() {
        let intf = IntfSpec::pynq_z1();
        let samples = pack(&intf, &[("D19", "0", "1", "1")]);
        assert!(samples[0] > 0);
        // A tri-state bit at 63 would make the sample negative; every plane bit still decodes.
        let spec = TraceSpec {
            planes: [("X".to_string(), PlaneBits { output: 0, input: 62, tri: 63 })].into_iter().collect(),
            monitor_width: 64,
        };
        let lanes = decode(&[i64::MIN | (1 << 62), 1], &spec);
        assert_eq!(lanes[0].wave.to_bitstring(), "11");
    }

    #[test]
    fn every_pin_by_default() {
        let intf = IntfSpec::pynq_z1();
        let spec = TraceSpec::from(&intf);
        assert_eq!(spec.sample_bytes(), 8);
        let lanes = decode(&[], &spec);
        assert_eq!(lanes.len(), 20);
        assert!(lanes.iter().all(|lane| lane.wave.is_empty()));
        assert_eq!(TraceSpec::with_pins(&intf, &["A0"]), Err(TraceError::UnknownPin("A0".to_string())));
    }
}
