//! Interface specification: the pins of the header and where their samples land in a capture word.

use linked_hash_map::LinkedHashMap;

use crate::constants::{trace, INTERFACE_WIDTH};

/// Bit positions of one pin in the three capture planes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneBits {
    /// Bit of the driven output value.
    pub output: usize,
    /// Bit of the sensed input value.
    pub input: usize,
    /// Bit of the tri-state control; `0` selects `output`, `1` selects `input`.
    pub tri: usize,
}

/// Interface specification of a board.
///
/// Pins are kept in declaration order; that order is used when searching for spare pins and when
/// listing decoded waveforms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntfSpec {
    /// Physical index of every pin.
    pub pins: LinkedHashMap<String, usize>,

    /// Capture-plane bits of every traceable pin.
    pub planes: LinkedHashMap<String, PlaneBits>,

    /// Number of physical pins on the header.
    pub interface_width: usize,

    /// Width of one capture sample in bits.
    pub monitor_width: usize,
}

impl IntfSpec {
    /// Interface of the PYNQ-Z1 Arduino header: `D0` to `D19` on indices 0 to 19.
    pub fn pynq_z1() -> Self {
        let mut pins = LinkedHashMap::new();
        let mut planes = LinkedHashMap::new();
        for index in 0..INTERFACE_WIDTH {
            let name = format!("D{}", index);
            let _ = pins.insert(name.clone(), index);
            let _ = planes.insert(name, PlaneBits {
                output: trace::OUTPUT_PLANE_LSB + index,
                input: trace::INPUT_PLANE_LSB + index,
                tri: trace::TRI_PLANE_LSB + index,
            });
        }

        Self { pins, planes, interface_width: INTERFACE_WIDTH, monitor_width: trace::MONITOR_WIDTH }
    }

    /// Returns the physical index of the pin.
    pub fn pin(&self, name: &str) -> Option<usize> { self.pins.get(name).copied() }

    /// Returns `true` if the physical index can be routed: it lies on the header and on the I/O switch.
    pub fn routable(&self, index: usize) -> bool { index < self.interface_width.min(INTERFACE_WIDTH) }

    /// Returns `true` if the pin is on the header.
    pub fn contains(&self, name: &str) -> bool { self.pins.contains_key(name) }

    /// Returns the pin names in declaration order.
    pub fn pin_names(&self) -> impl Iterator<Item = &str> { self.pins.keys().map(String::as_str) }
}

impl Default for IntfSpec {
    fn default() -> Self { Self::pynq_z1() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pynq_z1_header() {
        let spec = IntfSpec::pynq_z1();
        assert_eq!(spec.pins.len(), 20);
        assert_eq!(spec.pin("D0"), Some(0));
        assert_eq!(spec.pin("D19"), Some(19));
        assert_eq!(spec.pin("A0"), None);
        assert!(spec.routable(19));
        assert!(!spec.routable(20));
        assert_eq!(spec.planes["D3"], PlaneBits { output: 3, input: 23, tri: 45 });
        assert_eq!(spec.pin_names().next(), Some("D0"));
    }
}
