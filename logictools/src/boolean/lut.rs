//! LUT lane configuration.

use arrayvec::ArrayVec;
use itertools::Itertools;

use crate::boolean::{is_word_char, BoolExpr, BooleanError};
use crate::constants::lut::*;
use crate::intf::IntfSpec;
use crate::utils::{bitvec_to_usize, usize_to_bitvec};

/// Truth table of a 5-input LUT.
///
/// Entry `i` is the output for the assignment whose bit `j` is the value of LUT input `j`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TruthTable([bool; LUT_ENTRIES]);

impl TruthTable {
    /// Tabulates `f` over every assignment of the LUT inputs.
    pub fn from_fn<F: Fn(&[bool]) -> bool>(f: F) -> Self {
        let mut entries = [false; LUT_ENTRIES];
        for (index, entry) in entries.iter_mut().enumerate() {
            *entry = f(usize_to_bitvec(LUT_INPUTS, index).as_slice());
        }
        Self(entries)
    }

    /// Constructs from the table word; bit `i` is entry `i`.
    pub fn from_word(word: u32) -> Self { Self::from_fn(|inputs| word & (1 << bitvec_to_usize(inputs)) != 0) }

    /// Returns the entry at `index`.
    pub fn get(&self, index: usize) -> bool { self.0[index] }

    /// Returns the entries.
    pub fn entries(&self) -> &[bool; LUT_ENTRIES] { &self.0 }

    /// Returns the table word; bit `i` is entry `i`.
    pub fn to_word(&self) -> u32 {
        self.0.iter().enumerate().fold(0, |word, (i, entry)| if *entry { word | (1 << i) } else { word })
    }
}

/// Variable bound to a LUT input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LutInput {
    /// Header pin.
    Pin {
        /// Name of the pin.
        name: String,
        /// Physical index of the pin.
        index: usize,
    },

    /// Don't-care padding variable.
    DontCare(String),
}

impl LutInput {
    /// Returns the name of the variable.
    pub fn name(&self) -> &str {
        match self {
            Self::Pin { name, .. } | Self::DontCare(name) => name,
        }
    }

    /// Returns the input-selector value.
    pub fn selector(&self) -> u32 {
        match self {
            // Pin indices are bounded by the lane count, far below the sentinel.
            Self::Pin { index, .. } => *index as u32,
            Self::DontCare(_) => SELECTOR_UNUSED,
        }
    }
}

/// Configuration of one LUT lane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LutConfig {
    /// Output pin.
    pub output_pin: String,

    /// Lane index, i.e. the physical index of the output pin.
    pub lane: usize,

    /// Variables bound to the LUT inputs, LSB first.
    pub inputs: ArrayVec<LutInput, LUT_INPUTS>,

    /// Expression after don't-care padding.
    pub expr: BoolExpr,

    /// Truth table of `expr`.
    pub truth_table: TruthTable,
}

impl LutConfig {
    /// Compiles an expression of the form `OUTPUT_PIN = expression`.
    pub fn compile(expression: &str, intf: &IntfSpec) -> Result<Self, BooleanError> {
        let (output, rhs) = match expression.split('=').collect::<Vec<_>>().as_slice() {
            [output, rhs] => (output.trim(), *rhs),
            _ => return Err(BooleanError::MalformedExpression(expression.to_string())),
        };
        let lane = intf.pin(output).ok_or_else(|| BooleanError::UnknownPin(output.to_string()))?;
        if lane >= NUM_LANES || !intf.routable(lane) {
            return Err(BooleanError::NoLane(output.to_string()));
        }

        let input_pins = rhs.split(|c: char| !is_word_char(c)).filter(|s| !s.is_empty()).unique().collect::<Vec<_>>();
        log::debug!(target: "boolean", "input pins {:?}", input_pins);

        let mut inputs = ArrayVec::<LutInput, LUT_INPUTS>::new();
        for name in &input_pins {
            let index = intf.pin(name).ok_or_else(|| BooleanError::UnknownPin(name.to_string()))?;
            if !intf.routable(index) {
                return Err(BooleanError::PinOffHeader { pin: name.to_string(), index });
            }
            if *name == output {
                return Err(BooleanError::PinConflict(output.to_string()));
            }
            inputs.try_push(LutInput::Pin { name: name.to_string(), index }).map_err(|_| {
                BooleanError::TooManyInputs(input_pins.iter().map(|name| name.to_string()).collect())
            })?;
        }

        let mut expr = BoolExpr::parse(rhs)?;
        for slot in inputs.len()..LUT_INPUTS {
            let mut name = format!("X{}", slot);
            while input_pins.contains(&name.as_str()) {
                name.insert(0, '_');
            }
            expr = expr.pad(&name);
            inputs.push(LutInput::DontCare(name));
        }
        log::debug!(
            target: "boolean",
            "padded inputs {:?}: {}",
            inputs.iter().map(LutInput::name).collect::<Vec<_>>(),
            expr
        );

        let truth_table = TruthTable::from_fn(|values| {
            expr.eval(&|name: &str| inputs.iter().position(|input| input.name() == name).map_or(false, |i| values[i]))
        });
        log::debug!(target: "boolean", "truth table {:#010x}", truth_table.to_word());

        Ok(Self { output_pin: output.to_string(), lane, inputs, expr, truth_table })
    }

    /// Returns the input-selector word: five 5-bit selectors, LSB first.
    pub fn selector_word(&self) -> u32 {
        self.inputs
            .iter()
            .enumerate()
            .fold(0, |word, (i, input)| word | (input.selector() << (i * SELECTOR_WIDTH)))
    }

    /// Returns the truth-table word.
    pub fn truth_table_word(&self) -> u32 { self.truth_table.to_word() }

    /// Returns the header pins routed to the lane: the input pins, then the output pin.
    pub fn route(&self) -> Vec<usize> {
        self.inputs
            .iter()
            .filter_map(|input| match input {
                LutInput::Pin { index, .. } => Some(*index),
                LutInput::DontCare(_) => None,
            })
            .chain(std::iter::once(self.lane))
            .collect()
    }
}

/// Mailbox image shared by every boolean lane of one co-processor.
///
/// A lane is owned by whoever wrote it last; callers serialize writes to the same lane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LutImage {
    lanes: Vec<Option<LutConfig>>,
    enables: u32,
    armed: u32,
}

impl Default for LutImage {
    fn default() -> Self { Self::with_enables(u32::MAX) }
}

impl LutImage {
    /// Creates an image with every lane disabled.
    pub fn new() -> Self { Self::default() }

    /// Creates an image from the lane enables currently held by the co-processor.
    pub fn with_enables(enables: u32) -> Self { Self { lanes: vec![None; NUM_LANES], enables, armed: 0 } }

    /// Compiles the expression into its lane and returns the lane configuration.
    pub fn compile(&mut self, expression: &str, intf: &IntfSpec) -> Result<&LutConfig, BooleanError> {
        let config = LutConfig::compile(expression, intf)?;
        self.insert(config)
    }

    /// Places the configuration in its lane, replacing the previous one.
    pub fn insert(&mut self, config: LutConfig) -> Result<&LutConfig, BooleanError> {
        let lane = config.lane;
        let slot = self.lanes.get_mut(lane).ok_or_else(|| BooleanError::NoLane(config.output_pin.clone()))?;
        self.enables &= !(1 << lane);
        self.armed |= 1 << lane;
        Ok(slot.insert(config))
    }

    /// Marks the lanes active on the co-processor as active in the image too.
    pub fn merge_enables(&mut self, enables: u32) { self.enables &= enables; }

    /// Returns the configuration of the lane.
    pub fn lane(&self, lane: usize) -> Option<&LutConfig> { self.lanes.get(lane).and_then(Option::as_ref) }

    /// Returns the lane enable word. A cleared bit marks an active lane.
    pub fn enables(&self) -> u32 { self.enables }

    /// Returns the armed-lane bitmap.
    pub fn armed(&self) -> u32 { self.armed }

    /// Returns the mailbox words: selector and truth table of every lane, then enables and armed lanes.
    pub fn mailbox_words(&self) -> Vec<u32> {
        let mut words = vec![0; ARMED_WORD + 1];
        for config in self.lanes.iter().flatten() {
            words[2 * config.lane] = config.selector_word();
            words[2 * config.lane + 1] = config.truth_table_word();
        }
        words[ENABLE_WORD] = self.enables;
        words[ARMED_WORD] = self.armed;
        words
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn and_of_two_pins() {
        let intf = IntfSpec::pynq_z1();
        let config = LutConfig::compile("D4=D0&D1", &intf).unwrap();

        assert_eq!(config.lane, 4);
        // D0 and D1 in the first two selectors, don't-cares in the rest.
        assert_eq!(config.selector_word(), (1 << 5) | (0x1f << 10) | (0x1f << 15) | (0x1f << 20));
        assert_eq!(config.truth_table_word(), 0x8888_8888);
        for index in 0..LUT_ENTRIES {
            assert_eq!(config.truth_table.get(index), index & 0b11 == 0b11);
        }
        assert_eq!(config.route(), vec![0, 1, 4]);
    }

    #[test]
    fn five_inputs_use_every_selector() {
        let intf = IntfSpec::pynq_z1();
        let config = LutConfig::compile("D0 = D5 | D6 | D7 | D8 | D9", &intf).unwrap();
        assert_eq!(config.selector_word(), 5 | (6 << 5) | (7 << 10) | (8 << 15) | (9 << 20));
        assert_eq!(config.truth_table_word(), 0xffff_fffe);
    }

    #[rstest]
    #[case("D0 & D1", BooleanError::MalformedExpression("D0 & D1".to_string()))]
    #[case("D4 = D0 = D1", BooleanError::MalformedExpression("D4 = D0 = D1".to_string()))]
    #[case("LD0 = D0", BooleanError::UnknownPin("LD0".to_string()))]
    #[case("D4 = D0 & Q1", BooleanError::UnknownPin("Q1".to_string()))]
    #[case("D4 = D0 & D4", BooleanError::PinConflict("D4".to_string()))]
    fn rejected_expressions(#[case] expression: &str, #[case] expected: BooleanError) {
        assert_eq!(LutConfig::compile(expression, &IntfSpec::pynq_z1()), Err(expected));
    }

    #[rstest]
    #[case("D4 = PB0", "PB0", 31)]
    #[case("D4 = D0 & LD1", "LD1", 25)]
    #[case("D4 = PB1 | D1", "PB1", 20)]
    fn inputs_off_the_header(#[case] expression: &str, #[case] pin: &str, #[case] index: usize) {
        let mut intf = IntfSpec::pynq_z1();
        for (name, index) in [("PB0", 31), ("LD1", 25), ("PB1", 20)] {
            let _ = intf.pins.insert(name.to_string(), index);
        }
        let expected = BooleanError::PinOffHeader { pin: pin.to_string(), index };
        assert_eq!(LutConfig::compile(expression, &intf), Err(expected));
        assert_eq!(LutConfig::compile("PB0 = D0", &intf), Err(BooleanError::NoLane("PB0".to_string())));
    }

    #[test]
    fn six_inputs_are_too_many() {
        let result = LutConfig::compile("D10 = D0 & D1 & D2 & D3 & D4 & D5", &IntfSpec::pynq_z1());
        assert!(matches!(result, Err(BooleanError::TooManyInputs(names)) if names.len() == 6));
    }

    #[test]
    fn repeated_inputs_count_once() {
        let config = LutConfig::compile("D4 = (D0 & D1) | (~D0 & ~D1)", &IntfSpec::pynq_z1()).unwrap();
        assert_eq!(config.route(), vec![0, 1, 4]);
        assert!(config.truth_table.get(0b00000));
        assert!(!config.truth_table.get(0b00001));
        assert!(config.truth_table.get(0b11111));
    }

    #[test]
    fn image_tracks_lanes() {
        let intf = IntfSpec::pynq_z1();
        let mut image = LutImage::new();
        let _ = image.compile("D4 = D0 & D1", &intf).unwrap();
        let _ = image.compile("D9 = ~D5", &intf).unwrap();

        assert_eq!(image.enables(), !((1 << 4) | (1 << 9)));
        assert_eq!(image.armed(), (1 << 4) | (1 << 9));

        let words = image.mailbox_words();
        assert_eq!(words.len(), 50);
        assert_eq!(words[9], 0x8888_8888);
        assert_eq!(words[19], 0x5555_5555);
        assert_eq!(words[18] & 0x1f, 5);
        assert_eq!(words[ENABLE_WORD], image.enables());
        assert_eq!(TruthTable::from_word(words[19]), image.lane(9).unwrap().truth_table);
    }
}
