//! Run-length packed automaton tables, as embedded by generated code.
//!
//! Every array is a sequence of `(count, value)` pairs of `u16`s expanding to
//! `count` copies of `value`. `0xFFFF` stands for "none" (-1) in the signed
//! arrays; `min` and `max` are unsigned token types.

use super::{Dfa, DfaState, DecisionId, SpecialState, StateId};
use crate::base::TokenType;
use crate::errors::{RecognitionError, RecognitionResult};

/// Version of the packed layout this runtime reads.
pub const PACKED_FORMAT_VERSION: u16 = 3;

/// Packed tables of one decision.
#[derive(Debug, Clone, Copy)]
pub struct PackedDfa {
    pub version: u16,
    pub decision: DecisionId,
    pub description: &'static str,
    pub eot: &'static [u16],
    pub eof: &'static [u16],
    pub min: &'static [u16],
    pub max: &'static [u16],
    pub accept: &'static [u16],
    pub special: &'static [u16],
    /// One packed row per state covering `min..=max`
    pub transition: &'static [&'static [u16]],
}

/// Expand `(count, value)` pairs.
fn unpack(encoded: &[u16]) -> RecognitionResult<Vec<u16>> {
    if encoded.len() % 2 != 0 {
        return Err(RecognitionError::invalid_argument(
            "packed array has an odd number of entries",
        ));
    }
    let mut data = Vec::new();
    for pair in encoded.chunks_exact(2) {
        data.extend(std::iter::repeat_n(pair[1], pair[0] as usize));
    }
    Ok(data)
}

fn signed(value: u16) -> Option<u32> {
    (value != u16::MAX).then_some(u32::from(value))
}

impl PackedDfa {
    fn column(&self, name: &str, encoded: &[u16], states: usize) -> RecognitionResult<Vec<u16>> {
        let data = unpack(encoded)?;
        if data.len() != states {
            return Err(RecognitionError::invalid_argument(format!(
                "decision {}: packed `{name}` has {} entries for {states} states",
                self.decision,
                data.len()
            )));
        }
        Ok(data)
    }
}

impl Dfa {
    /// Decode and validate packed tables. `specials` are indexed by the
    /// values of the packed `special` array.
    pub fn from_packed(packed: &PackedDfa, specials: Vec<SpecialState>) -> RecognitionResult<Dfa> {
        if packed.version != PACKED_FORMAT_VERSION {
            return Err(RecognitionError::invalid_argument(format!(
                "decision {}: packed format version {} (expected {PACKED_FORMAT_VERSION})",
                packed.decision, packed.version
            )));
        }
        let accept = unpack(packed.accept)?;
        let states = accept.len();
        let eot = packed.column("eot", packed.eot, states)?;
        let eof = packed.column("eof", packed.eof, states)?;
        let min = packed.column("min", packed.min, states)?;
        let max = packed.column("max", packed.max, states)?;
        let special = packed.column("special", packed.special, states)?;
        if packed.transition.len() != states {
            return Err(RecognitionError::invalid_argument(format!(
                "decision {}: {} transition rows for {states} states",
                packed.decision,
                packed.transition.len()
            )));
        }

        let mut decoded = Vec::with_capacity(states);
        for s in 0..states {
            let row = unpack(packed.transition[s])?;
            let width = usize::from(max[s]).saturating_sub(usize::from(min[s])) + 1;
            if row.len() > width {
                return Err(RecognitionError::invalid_argument(format!(
                    "decision {}: transition row {s} is wider than {}..{}",
                    packed.decision, min[s], max[s]
                )));
            }
            decoded.push(DfaState {
                accept: signed(accept[s]).filter(|&alt| alt >= 1),
                special: signed(special[s]).map(|i| i as usize),
                eot: signed(eot[s]).map(|t| t as StateId),
                eof: signed(eof[s]).map(|t| t as StateId),
                min: TokenType::from(min[s]),
                edges: row.into_iter().map(|t| signed(t).map(|t| t as StateId)).collect(),
            });
        }
        Dfa::new(packed.decision, packed.description, decoded, specials)
    }
}
