use crate::compress::{Compressor, BATCHED_256, SCALAR_256};
use crate::cpu::Capabilities;
use crate::sha2::{Digest, Variant};

/// Size of a SHA-256 hash in bytes.
pub const DIGEST_SIZE: usize = 32;

/// Size of a SHA-256 input block in bytes.
pub const BLOCK_SIZE: usize = 64;

/// Initial hash value H(0), FIPS 180-4 section 5.3.3.
pub const IV256: [u32; 8] = [
    0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a, 0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19,
];

/// Sha256 selects the 32-bit SHA-2 variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sha256;

impl Variant for Sha256 {
    type Word = u32;

    const NAME: &'static str = "SHA-256";
    const BLOCK_SIZE: usize = BLOCK_SIZE;
    const DIGEST_SIZE: usize = DIGEST_SIZE;
    const INTERLEAVE: usize = 4;
    const LENGTH_FIELD: usize = 8;
    const IV: [u32; 8] = IV256;

    fn compressor(caps: &Capabilities) -> &'static dyn Compressor<u32> {
        if caps.has_wide_vectors() {
            &BATCHED_256
        } else {
            &SCALAR_256
        }
    }
}

/// new returns a sequential SHA-256 digest.
pub fn new() -> Digest<Sha256> {
    Digest::new()
}

/// new_parallel returns a depth 1 tree digest using every available core.
pub fn new_parallel() -> Digest<Sha256> {
    Digest::new_parallel()
}

/// hash returns the standard SHA-256 hash of `data`.
pub fn hash(data: &[u8]) -> [u8; DIGEST_SIZE] {
    let mut h = new();
    h.update(data);
    let mut out = [0u8; DIGEST_SIZE];
    h.finish(&mut out);
    out
}
