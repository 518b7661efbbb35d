//! Arbitrary-width bit vector used for token-set membership.
//!
//! Generated recognizers embed their follow sets as `static` word arrays, so a
//! [`Bitset`] can borrow `'static` words and only allocates once it is mutated.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::{EOF, INVALID_TOKEN_TYPE, TokenType};
use crate::errors::{RecognitionError, RecognitionResult};

const WORD_BITS: usize = u64::BITS as usize;

/// Set of non-negative bit positions backed by 64-bit words.
///
/// Bit 0 is never a real token type (`INVALID_TOKEN_TYPE`), so the
/// token-type helpers ([`Bitset::add_type`], [`Bitset::member`]) use it as
/// the slot for [`EOF`]. `INVALID_TOKEN_TYPE` itself is never a member.
#[derive(Clone, Default)]
pub struct Bitset {
    words: Cow<'static, [u64]>,
}

impl Bitset {
    /// Create an empty set wide enough for `initial_bits` bits.
    pub fn new(initial_bits: usize) -> Self {
        let words = initial_bits.div_ceil(WORD_BITS).max(1);
        Self {
            words: Cow::Owned(vec![0; words]),
        }
    }

    /// Borrow a set from static words, as generated follow sets do.
    pub const fn from_static(words: &'static [u64]) -> Self {
        Self {
            words: Cow::Borrowed(words),
        }
    }

    pub fn from_words(words: Vec<u64>) -> Self {
        Self {
            words: Cow::Owned(words),
        }
    }

    /// Build a set from token types. `EOF` lands in the EOF slot; other
    /// negative values are not token types and are ignored.
    pub fn of(types: &[TokenType]) -> Self {
        let mut set = Self::new(0);
        for &ttype in types {
            set.add_type(ttype);
        }
        set
    }

    // =========================================================================
    // Checked bit operations
    // =========================================================================

    /// Set `bit`, growing the set if needed.
    pub fn set_bit(&mut self, bit: i32) -> RecognitionResult<()> {
        let bit = Self::checked_index(bit)?;
        self.grow_to(bit + 1);
        self.words.to_mut()[bit / WORD_BITS] |= 1u64 << (bit % WORD_BITS);
        Ok(())
    }

    /// Clear `bit`. Bits beyond the current width are already clear.
    pub fn clear_bit(&mut self, bit: i32) -> RecognitionResult<()> {
        let bit = Self::checked_index(bit)?;
        let word = bit / WORD_BITS;
        if word < self.words.len() && self.words[word] & (1u64 << (bit % WORD_BITS)) != 0 {
            self.words.to_mut()[word] &= !(1u64 << (bit % WORD_BITS));
        }
        Ok(())
    }

    /// Test `bit`. Never grows the set; bits beyond the width are unset.
    pub fn test_bit(&self, bit: i32) -> RecognitionResult<bool> {
        let bit = Self::checked_index(bit)?;
        Ok(self.test_unchecked(bit))
    }

    fn checked_index(bit: i32) -> RecognitionResult<usize> {
        usize::try_from(bit).map_err(|_| {
            RecognitionError::invalid_argument(format!("negative bit index {bit}"))
        })
    }

    fn test_unchecked(&self, bit: usize) -> bool {
        self.words
            .get(bit / WORD_BITS)
            .is_some_and(|w| w & (1u64 << (bit % WORD_BITS)) != 0)
    }

    // =========================================================================
    // Token-type view
    // =========================================================================

    fn slot(ttype: TokenType) -> Option<usize> {
        match ttype {
            EOF => Some(0),
            INVALID_TOKEN_TYPE => None,
            _ => usize::try_from(ttype).ok(),
        }
    }

    /// Add a token type (`EOF` allowed).
    pub fn add_type(&mut self, ttype: TokenType) {
        if let Some(bit) = Self::slot(ttype) {
            self.grow_to(bit + 1);
            self.words.to_mut()[bit / WORD_BITS] |= 1u64 << (bit % WORD_BITS);
        }
    }

    /// Remove a token type (`EOF` allowed).
    pub fn remove_type(&mut self, ttype: TokenType) {
        match Self::slot(ttype) {
            Some(bit) if self.test_unchecked(bit) => {
                self.words.to_mut()[bit / WORD_BITS] &= !(1u64 << (bit % WORD_BITS));
            }
            _ => {}
        }
    }

    /// Membership test for a token type; `EOF` is looked up in its slot.
    pub fn member(&self, ttype: TokenType) -> bool {
        Self::slot(ttype).is_some_and(|bit| self.test_unchecked(bit))
    }

    // =========================================================================
    // Set algebra
    // =========================================================================

    /// Union `other` into `self`, growing `self` when `other` is wider.
    pub fn or_in_place(&mut self, other: &Bitset) {
        let highest = other.highest_word();
        let Some(highest) = highest else {
            return;
        };
        self.grow_to((highest + 1) * WORD_BITS);
        let words = self.words.to_mut();
        for (dst, src) in words.iter_mut().zip(other.words.iter()) {
            *dst |= *src;
        }
    }

    /// Union as a new set.
    pub fn or(&self, other: &Bitset) -> Bitset {
        let mut result = self.clone();
        result.or_in_place(other);
        result
    }

    /// Explicitly widen the set to hold at least `bits` bits.
    pub fn grow_to(&mut self, bits: usize) {
        let needed = bits.div_ceil(WORD_BITS);
        if needed > self.words.len() {
            self.words.to_mut().resize(needed, 0);
        }
    }

    /// Number of allocated words.
    pub fn size(&self) -> usize {
        self.words.len()
    }

    /// Number of set bits.
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// True when no bit is set.
    pub fn is_nil(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    fn highest_word(&self) -> Option<usize> {
        self.words.iter().rposition(|&w| w != 0)
    }

    /// Set bit positions in ascending order. Each call starts a fresh pass.
    pub fn bits(&self) -> Bits<'_> {
        Bits {
            words: &self.words,
            word: 0,
            pending: self.words.first().copied().unwrap_or(0),
        }
    }

    /// Members as token types, with the EOF slot reported as [`EOF`].
    pub fn types(&self) -> impl Iterator<Item = TokenType> + '_ {
        self.bits()
            .map(|bit| if bit == 0 { EOF } else { bit as TokenType })
    }
}

/// Ascending iterator over the set bits of a [`Bitset`].
#[derive(Debug, Clone)]
pub struct Bits<'a> {
    words: &'a [u64],
    word: usize,
    pending: u64,
}

impl Iterator for Bits<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            if self.pending != 0 {
                let offset = self.pending.trailing_zeros() as usize;
                self.pending &= self.pending - 1;
                return Some(self.word * WORD_BITS + offset);
            }
            self.word += 1;
            self.pending = *self.words.get(self.word)?;
        }
    }
}

impl PartialEq for Bitset {
    fn eq(&self, other: &Self) -> bool {
        let len = self.words.len().max(other.words.len());
        (0..len).all(|i| {
            self.words.get(i).copied().unwrap_or(0) == other.words.get(i).copied().unwrap_or(0)
        })
    }
}

impl Eq for Bitset {}

impl Hash for Bitset {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let significant = self.highest_word().map_or(0, |w| w + 1);
        self.words[..significant].hash(state);
    }
}

impl fmt::Debug for Bitset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for Bitset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, bit) in self.bits().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{bit}")?;
        }
        f.write_str("}")
    }
}
