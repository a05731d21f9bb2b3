//! Run-length waveforms.

use std::fmt;
use std::str::FromStr;

use crate::trace::TraceError;

/// Token of a waveform string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveToken {
    /// The level changes to low: `l`.
    Low,

    /// The level changes to high: `h`.
    High,

    /// The level stays: `.`.
    Continue,
}

impl WaveToken {
    /// Returns the character of the token.
    pub fn as_char(self) -> char {
        match self {
            Self::Low => 'l',
            Self::High => 'h',
            Self::Continue => '.',
        }
    }
}

/// Logic levels of one pin, one per sample.
///
/// Displays as a run-length token string: `l` or `h` where a run of equal levels starts, `.` for every other sample
/// of the run. `010011000111` displays as `lhl.h.l..h..`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Wave {
    levels: Vec<bool>,
}

impl Wave {
    /// Constructs from the levels.
    pub fn from_levels(levels: Vec<bool>) -> Self { Self { levels } }

    /// Constructs from a string over `0` and `1`.
    pub fn from_bitstring(bits: &str) -> Result<Self, TraceError> {
        bits.chars()
            .enumerate()
            .map(|(position, c)| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                _ => Err(TraceError::MalformedWave { wave: bits.to_string(), position }),
            })
            .collect::<Result<_, _>>()
            .map(Self::from_levels)
    }

    /// Returns the levels.
    pub fn levels(&self) -> &[bool] { &self.levels }

    /// Returns the number of samples.
    pub fn len(&self) -> usize { self.levels.len() }

    /// Returns `true` if the wave has no samples.
    pub fn is_empty(&self) -> bool { self.levels.is_empty() }

    /// Returns the levels as a string over `0` and `1`.
    pub fn to_bitstring(&self) -> String { self.levels.iter().map(|level| if *level { '1' } else { '0' }).collect() }

    /// Returns the run-length tokens, one per sample.
    pub fn tokens(&self) -> Vec<WaveToken> {
        let mut previous = None;
        self.levels
            .iter()
            .map(|level| {
                let token = match (previous, *level) {
                    (Some(p), l) if p == l => WaveToken::Continue,
                    (_, false) => WaveToken::Low,
                    (_, true) => WaveToken::High,
                };
                previous = Some(*level);
                token
            })
            .collect()
    }

    /// Constructs from run-length tokens.
    pub fn from_tokens(tokens: &[WaveToken]) -> Result<Self, TraceError> {
        let mut levels = Vec::with_capacity(tokens.len());
        for (position, token) in tokens.iter().enumerate() {
            let level = match token {
                WaveToken::Low => false,
                WaveToken::High => true,
                WaveToken::Continue => *levels.last().ok_or_else(|| TraceError::MalformedWave {
                    wave: tokens.iter().map(|token| token.as_char()).collect(),
                    position,
                })?,
            };
            levels.push(level);
        }
        Ok(Self { levels })
    }
}

impl fmt::Display for Wave {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let wave = self.tokens().into_iter().map(WaveToken::as_char).collect::<String>();
        write!(f, "{}", wave)
    }
}

impl FromStr for Wave {
    type Err = TraceError;

    fn from_str(wave: &str) -> Result<Self, Self::Err> {
        let tokens = wave
            .chars()
            .enumerate()
            .map(|(position, c)| match c {
                'l' | '0' => Ok(WaveToken::Low),
                'h' | '1' => Ok(WaveToken::High),
                '.' => Ok(WaveToken::Continue),
                _ => Err(TraceError::MalformedWave { wave: wave.to_string(), position }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_tokens(&tokens).map_err(|_| TraceError::MalformedWave { wave: wave.to_string(), position: 0 })
    }
}
