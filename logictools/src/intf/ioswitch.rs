//! I/O switch words.

use crate::constants::ioswitch::*;
use crate::intf::TransportError;

/// Routing of the header pins to the generators.
///
/// Every pin owns a 2-bit selector. Pins 0 to 9 live in word 0 and pins 10 to 19 in word 1, pin `i` of a word
/// occupying bits `2i` and `2i + 1`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IoSwitchConfig {
    words: [u32; 2],
}

impl IoSwitchConfig {
    /// Number of mailbox words.
    pub const NUM_WORDS: usize = 2;

    /// Constructs from the mailbox words. Missing words read as zero.
    pub fn from_words(words: &[u32]) -> Self {
        let mut config = Self::default();
        for (slot, word) in config.words.iter_mut().zip(words) {
            *slot = *word;
        }
        config
    }

    /// Returns the mailbox words.
    pub fn words(&self) -> [u32; 2] { self.words }

    /// Routes the pin to the generator selected by `select`.
    pub fn set(&mut self, pin: usize, select: u32) -> Result<(), TransportError> {
        let (word, lsb) = Self::locate(pin)?;
        let mask = ((1 << SELECT_WIDTH) - 1) << lsb;
        self.words[word] = (self.words[word] & !mask) | ((select << lsb) & mask);
        Ok(())
    }

    /// Returns the selector of the pin.
    pub fn get(&self, pin: usize) -> Result<u32, TransportError> {
        let (word, lsb) = Self::locate(pin)?;
        Ok((self.words[word] >> lsb) & ((1 << SELECT_WIDTH) - 1))
    }

    fn locate(pin: usize) -> Result<(usize, usize), TransportError> {
        let word = pin / PINS_PER_WORD;
        if word >= Self::NUM_WORDS {
            return Err(TransportError::InvalidPin(pin));
        }
        Ok((word, (pin % PINS_PER_WORD) * SELECT_WIDTH))
    }
}
