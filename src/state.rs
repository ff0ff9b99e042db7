use zeroize::Zeroize;

use crate::codec::Word;

/// Largest byte count the low counter limb holds before carrying.
const LOW_LIMB_MAX: u64 = 0x1fff_ffff_ffff_ffff;

/// HashState is one lane's chaining value plus its processed-byte counter.
///
/// The counter is split so that `counter[0] * 8` always fits in 64 bits:
/// the low limb counts bytes below 2^61 and the high limb counts whole
/// units of 2^61 bytes (2^64 bits).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HashState<W: Word> {
    pub(crate) words: [W; 8],
    pub(crate) counter: [u64; 2],
}

impl<W: Word> HashState<W> {
    /// new returns a state loaded with `iv`.
    pub fn new(iv: &[W; 8]) -> Self {
        Self {
            words: *iv,
            counter: [0; 2],
        }
    }

    /// initialize restores the IV and zeroes the counter.
    pub fn initialize(&mut self, iv: &[W; 8]) {
        self.words = *iv;
        self.counter = [0; 2];
    }

    /// increase adds `length` processed bytes to the counter.
    pub fn increase(&mut self, length: usize) {
        self.counter[0] = self.counter[0].wrapping_add(length as u64);
        if self.counter[0] > LOW_LIMB_MAX {
            self.counter[1] = self.counter[1].wrapping_add(self.counter[0] >> 61);
            self.counter[0] &= LOW_LIMB_MAX;
        }
    }

    /// clear zero-fills words and counter.
    pub fn clear(&mut self) {
        self.words.zeroize();
        self.counter.zeroize();
    }

    /// is_empty reports whether no byte was ever compressed into this lane.
    pub fn is_empty(&self) -> bool {
        self.counter == [0; 2]
    }

    /// bit_length is the message length in bits that this lane has seen.
    pub fn bit_length(&self) -> u128 {
        ((self.counter[1] as u128) << 64) | ((self.counter[0] << 3) as u128)
    }

    /// words returns the chaining value.
    pub fn words(&self) -> &[W; 8] {
        &self.words
    }

    /// write_be serializes the chaining value big-endian into `out`.
    pub fn write_be(&self, out: &mut [u8]) {
        self.words
            .iter()
            .enumerate()
            .for_each(|(i, w)| w.write_be(out, i * W::BYTES));
    }
}

impl<W: Word> Drop for HashState<W> {
    fn drop(&mut self) {
        self.clear();
    }
}
