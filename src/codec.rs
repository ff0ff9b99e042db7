use byteorder::{BigEndian, ByteOrder, LittleEndian};
use zeroize::Zeroize;

/// Reads a big-endian 32-bit word at `offset`.
#[inline(always)]
pub fn be_bytes_to_u32(buf: &[u8], offset: usize) -> u32 {
    BigEndian::read_u32(&buf[offset..offset + 4])
}

/// Writes `word` big-endian at `offset`.
#[inline(always)]
pub fn u32_to_be_bytes(word: u32, buf: &mut [u8], offset: usize) {
    BigEndian::write_u32(&mut buf[offset..offset + 4], word)
}

/// Reads a big-endian 64-bit word at `offset`.
#[inline(always)]
pub fn be_bytes_to_u64(buf: &[u8], offset: usize) -> u64 {
    BigEndian::read_u64(&buf[offset..offset + 8])
}

/// Writes `word` big-endian at `offset`.
#[inline(always)]
pub fn u64_to_be_bytes(word: u64, buf: &mut [u8], offset: usize) {
    BigEndian::write_u64(&mut buf[offset..offset + 8], word)
}

// Little-endian forms, used by the tree parameter header.

/// le_bytes_to_u16 loads a little-endian u16 from `buf` at `offset`.
pub fn le_bytes_to_u16(buf: &[u8], offset: usize) -> u16 {
    LittleEndian::read_u16(&buf[offset..offset + 2])
}

/// u16_to_le_bytes stores `word` little-endian into `buf` at `offset`.
pub fn u16_to_le_bytes(word: u16, buf: &mut [u8], offset: usize) {
    LittleEndian::write_u16(&mut buf[offset..offset + 2], word)
}

/// le_bytes_to_u32 loads a little-endian u32 from `buf` at `offset`.
pub fn le_bytes_to_u32(buf: &[u8], offset: usize) -> u32 {
    LittleEndian::read_u32(&buf[offset..offset + 4])
}

/// u32_to_le_bytes stores `word` little-endian into `buf` at `offset`.
pub fn u32_to_le_bytes(word: u32, buf: &mut [u8], offset: usize) {
    LittleEndian::write_u32(&mut buf[offset..offset + 4], word)
}

// rotate_* lower to a single instruction and are defined for a zero shift.
/// Rotate left.
#[inline(always)]
pub fn rotl32(x: u32, n: u32) -> u32 {
    x.rotate_left(n)
}

/// Rotate right.
#[inline(always)]
pub fn rotr32(x: u32, n: u32) -> u32 {
    x.rotate_right(n)
}

/// Rotate left.
#[inline(always)]
pub fn rotl64(x: u64, n: u32) -> u64 {
    x.rotate_left(n)
}

/// Rotate right.
#[inline(always)]
pub fn rotr64(x: u64, n: u32) -> u64 {
    x.rotate_right(n)
}

/// Word is an unsigned state word of a SHA-2 variant.
pub trait Word: Copy + Default + Eq + std::fmt::Debug + Send + Sync + Zeroize + 'static {
    /// Width of the word in bytes.
    const BYTES: usize;
    /// read_be loads a big-endian word from `buf` at `offset`.
    fn read_be(buf: &[u8], offset: usize) -> Self;
    /// write_be stores the word big-endian into `buf` at `offset`.
    fn write_be(self, buf: &mut [u8], offset: usize);
}

impl Word for u32 {
    const BYTES: usize = 4;

    fn read_be(buf: &[u8], offset: usize) -> Self {
        be_bytes_to_u32(buf, offset)
    }

    fn write_be(self, buf: &mut [u8], offset: usize) {
        u32_to_be_bytes(self, buf, offset)
    }
}

impl Word for u64 {
    const BYTES: usize = 8;

    fn read_be(buf: &[u8], offset: usize) -> Self {
        be_bytes_to_u64(buf, offset)
    }

    fn write_be(self, buf: &mut [u8], offset: usize) {
        u64_to_be_bytes(self, buf, offset)
    }
}

#[cfg(test)]
pub mod test {
    use super::*;

    #[test]
    fn big_endian_words() {
        let buf = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09];
        assert_eq!(be_bytes_to_u32(&buf, 1), 0x0203_0405);
        assert_eq!(be_bytes_to_u64(&buf, 1), 0x0203_0405_0607_0809);

        let mut out = [0u8; 12];
        u32_to_be_bytes(0xdead_beef, &mut out, 0);
        u64_to_be_bytes(0x0011_2233_4455_6677, &mut out, 4);
        assert_eq!(hex::encode(out), "deadbeef0011223344556677");
    }

    #[test]
    fn little_endian_words() {
        let mut out = [0u8; 6];
        u16_to_le_bytes(0x0102, &mut out, 0);
        u32_to_le_bytes(0x0a0b_0c0d, &mut out, 2);
        assert_eq!(out, [0x02, 0x01, 0x0d, 0x0c, 0x0b, 0x0a]);
        assert_eq!(le_bytes_to_u16(&out, 0), 0x0102);
        assert_eq!(le_bytes_to_u32(&out, 2), 0x0a0b_0c0d);
    }

    #[test]
    fn word_trait_matches_free_functions() {
        let mut out = [0u8; 16];
        0x6a09_e667u32.write_be(&mut out, 0);
        0xbb67_ae85_84ca_a73bu64.write_be(&mut out, 4);
        assert_eq!(u32::read_be(&out, 0), 0x6a09_e667);
        assert_eq!(u64::read_be(&out, 4), 0xbb67_ae85_84ca_a73b);
        assert_eq!(<u32 as Word>::BYTES, 4);
        assert_eq!(<u64 as Word>::BYTES, 8);
    }

    #[test]
    fn rotate_by_zero_is_identity() {
        assert_eq!(rotl32(0x8000_0001, 0), 0x8000_0001);
        assert_eq!(rotr32(0x8000_0001, 0), 0x8000_0001);
        assert_eq!(rotl64(0x8000_0000_0000_0001, 0), 0x8000_0000_0000_0001);
        assert_eq!(rotr64(0x8000_0000_0000_0001, 0), 0x8000_0000_0000_0001);
    }

    #[test]
    fn rotate() {
        assert_eq!(rotr32(0x0000_0001, 1), 0x8000_0000);
        assert_eq!(rotl32(0x8000_0000, 1), 0x0000_0001);
        assert_eq!(rotr64(0x1, 14), 0x0004_0000_0000_0000);
        assert_eq!(rotl64(0x0004_0000_0000_0000, 14), 0x1);
    }
}
