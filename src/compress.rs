use std::marker::PhantomData;
use std::ops::{BitAnd, BitXor, Not};

use crate::codec::{rotr32, rotr64, Word};
use crate::state::HashState;

/// SHA-256 round constants.
pub const K256: [u32; 64] = [
    0x428a2f98, 0x71374491, 0xb5c0fbcf, 0xe9b5dba5,
    0x3956c25b, 0x59f111f1, 0x923f82a4, 0xab1c5ed5,
    0xd807aa98, 0x12835b01, 0x243185be, 0x550c7dc3,
    0x72be5d74, 0x80deb1fe, 0x9bdc06a7, 0xc19bf174,
    0xe49b69c1, 0xefbe4786, 0x0fc19dc6, 0x240ca1cc,
    0x2de92c6f, 0x4a7484aa, 0x5cb0a9dc, 0x76f988da,
    0x983e5152, 0xa831c66d, 0xb00327c8, 0xbf597fc7,
    0xc6e00bf3, 0xd5a79147, 0x06ca6351, 0x14292967,
    0x27b70a85, 0x2e1b2138, 0x4d2c6dfc, 0x53380d13,
    0x650a7354, 0x766a0abb, 0x81c2c92e, 0x92722c85,
    0xa2bfe8a1, 0xa81a664b, 0xc24b8b70, 0xc76c51a3,
    0xd192e819, 0xd6990624, 0xf40e3585, 0x106aa070,
    0x19a4c116, 0x1e376c08, 0x2748774c, 0x34b0bcb5,
    0x391c0cb3, 0x4ed8aa4a, 0x5b9cca4f, 0x682e6ff3,
    0x748f82ee, 0x78a5636f, 0x84c87814, 0x8cc70208,
    0x90befffa, 0xa4506ceb, 0xbef9a3f7, 0xc67178f2,
];

/// SHA-512 round constants.
pub const K512: [u64; 80] = [
    0x428a2f98d728ae22, 0x7137449123ef65cd,
    0xb5c0fbcfec4d3b2f, 0xe9b5dba58189dbbc,
    0x3956c25bf348b538, 0x59f111f1b605d019,
    0x923f82a4af194f9b, 0xab1c5ed5da6d8118,
    0xd807aa98a3030242, 0x12835b0145706fbe,
    0x243185be4ee4b28c, 0x550c7dc3d5ffb4e2,
    0x72be5d74f27b896f, 0x80deb1fe3b1696b1,
    0x9bdc06a725c71235, 0xc19bf174cf692694,
    0xe49b69c19ef14ad2, 0xefbe4786384f25e3,
    0x0fc19dc68b8cd5b5, 0x240ca1cc77ac9c65,
    0x2de92c6f592b0275, 0x4a7484aa6ea6e483,
    0x5cb0a9dcbd41fbd4, 0x76f988da831153b5,
    0x983e5152ee66dfab, 0xa831c66d2db43210,
    0xb00327c898fb213f, 0xbf597fc7beef0ee4,
    0xc6e00bf33da88fc2, 0xd5a79147930aa725,
    0x06ca6351e003826f, 0x142929670a0e6e70,
    0x27b70a8546d22ffc, 0x2e1b21385c26c926,
    0x4d2c6dfc5ac42aed, 0x53380d139d95b3df,
    0x650a73548baf63de, 0x766a0abb3c77b2a8,
    0x81c2c92e47edaee6, 0x92722c851482353b,
    0xa2bfe8a14cf10364, 0xa81a664bbc423001,
    0xc24b8b70d0f89791, 0xc76c51a30654be30,
    0xd192e819d6ef5218, 0xd69906245565a910,
    0xf40e35855771202a, 0x106aa07032bbd1b8,
    0x19a4c116b8d2d0c8, 0x1e376c085141ab53,
    0x2748774cdf8eeb99, 0x34b0bcb5e19b48a8,
    0x391c0cb3c5c95a63, 0x4ed8aa4ae3418acb,
    0x5b9cca4f7763e373, 0x682e6ff3d6b2b8a3,
    0x748f82ee5defb2fc, 0x78a5636f43172f60,
    0x84c87814a1f0ab72, 0x8cc702081a6439ec,
    0x90befffa23631e28, 0xa4506cebde82bde9,
    0xbef9a3f7b2c67915, 0xc67178f2e372532b,
    0xca273eceea26619c, 0xd186b8c721c0c207,
    0xeada7dd6cde0eb1e, 0xf57d4f7fee6ed178,
    0x06f067aa72176fba, 0x0a637dc5a2c898a6,
    0x113f9804bef90dae, 0x1b710b35131c471b,
    0x28db77f523047d84, 0x32caab7b40c72493,
    0x3c9ebe0a15c9bebc, 0x431d67c49c100d4c,
    0x4cc5d4becb3e42b6, 0x597f299cfc657e2a,
    0x5fcb6fab3ad6faec, 0x6c44198c4a475817,
];

/// RoundFunctions fixes the word width, round count, constants and the
/// sigma functions of one SHA-2 width. The round structure itself is shared.
pub trait RoundFunctions: Send + Sync + 'static {
    /// State word.
    type Word: Word
        + BitAnd<Output = Self::Word>
        + BitXor<Output = Self::Word>
        + Not<Output = Self::Word>;

    /// Rounds per block.
    const ROUNDS: usize;

    /// k is the constant of round `t`.
    fn k(t: usize) -> Self::Word;
    /// Wrapping addition.
    fn add(a: Self::Word, b: Self::Word) -> Self::Word;
    /// Σ0 of the round function.
    fn big_sigma0(x: Self::Word) -> Self::Word;
    /// Σ1 of the round function.
    fn big_sigma1(x: Self::Word) -> Self::Word;
    /// σ0 of the message schedule.
    fn small_sigma0(x: Self::Word) -> Self::Word;
    /// σ1 of the message schedule.
    fn small_sigma1(x: Self::Word) -> Self::Word;
}

/// Rounds256 are the 64 rounds over 32-bit words.
pub struct Rounds256;

impl RoundFunctions for Rounds256 {
    type Word = u32;
    const ROUNDS: usize = 64;

    #[inline(always)]
    fn k(t: usize) -> u32 {
        K256[t]
    }

    #[inline(always)]
    fn add(a: u32, b: u32) -> u32 {
        a.wrapping_add(b)
    }

    #[inline(always)]
    fn big_sigma0(x: u32) -> u32 {
        rotr32(x, 2) ^ rotr32(x, 13) ^ rotr32(x, 22)
    }

    #[inline(always)]
    fn big_sigma1(x: u32) -> u32 {
        rotr32(x, 6) ^ rotr32(x, 11) ^ rotr32(x, 25)
    }

    #[inline(always)]
    fn small_sigma0(x: u32) -> u32 {
        rotr32(x, 7) ^ rotr32(x, 18) ^ (x >> 3)
    }

    #[inline(always)]
    fn small_sigma1(x: u32) -> u32 {
        rotr32(x, 17) ^ rotr32(x, 19) ^ (x >> 10)
    }
}

/// Rounds512 are the 80 rounds over 64-bit words.
pub struct Rounds512;

impl RoundFunctions for Rounds512 {
    type Word = u64;
    const ROUNDS: usize = 80;

    #[inline(always)]
    fn k(t: usize) -> u64 {
        K512[t]
    }

    #[inline(always)]
    fn add(a: u64, b: u64) -> u64 {
        a.wrapping_add(b)
    }

    #[inline(always)]
    fn big_sigma0(x: u64) -> u64 {
        rotr64(x, 28) ^ rotr64(x, 34) ^ rotr64(x, 39)
    }

    #[inline(always)]
    fn big_sigma1(x: u64) -> u64 {
        rotr64(x, 14) ^ rotr64(x, 18) ^ rotr64(x, 41)
    }

    #[inline(always)]
    fn small_sigma0(x: u64) -> u64 {
        rotr64(x, 1) ^ rotr64(x, 8) ^ (x >> 7)
    }

    #[inline(always)]
    fn small_sigma1(x: u64) -> u64 {
        rotr64(x, 19) ^ rotr64(x, 61) ^ (x >> 6)
    }
}

#[inline(always)]
fn ch<W: Copy + BitAnd<Output = W> + BitXor<Output = W> + Not<Output = W>>(e: W, f: W, g: W) -> W {
    (e & f) ^ (!e & g)
}

#[inline(always)]
fn maj<W: Copy + BitAnd<Output = W> + BitXor<Output = W>>(a: W, b: W, c: W) -> W {
    (a & b) ^ (a & c) ^ (b & c)
}

// Extends the 16-word window in place: on entry w[t & 15] holds W[t-16].
#[inline(always)]
fn schedule<R: RoundFunctions>(w: &[R::Word; 16], t: usize) -> R::Word {
    let x = R::add(R::small_sigma1(w[(t - 2) & 15]), w[(t - 7) & 15]);
    R::add(R::add(x, R::small_sigma0(w[(t - 15) & 15])), w[t & 15])
}

#[inline(always)]
fn round<R: RoundFunctions>(v: &mut [R::Word; 8], k: R::Word, wt: R::Word) {
    let [a, b, c, d, e, f, g, h] = *v;
    let t1 = R::add(R::add(R::add(h, R::big_sigma1(e)), R::add(ch(e, f, g), k)), wt);
    let t2 = R::add(R::big_sigma0(a), maj(a, b, c));
    *v = [R::add(t1, t2), a, b, c, R::add(d, t1), e, f, g];
}

/// compress_block runs the full round sequence of one block into `h`.
/// `block` must hold exactly sixteen words.
pub fn compress_block<R: RoundFunctions>(h: &mut [R::Word; 8], block: &[u8]) {
    let bytes = R::Word::BYTES;
    let mut w = [R::Word::default(); 16];
    w.iter_mut()
        .enumerate()
        .for_each(|(t, x)| *x = R::Word::read_be(block, t * bytes));

    let mut v = *h;
    for t in 0..R::ROUNDS {
        if t >= 16 {
            w[t & 15] = schedule::<R>(&w, t);
        }
        round::<R>(&mut v, R::k(t), w[t & 15]);
    }

    h.iter_mut().zip(v).for_each(|(hi, vi)| *hi = R::add(*hi, vi));
}

/// compress_batch runs N independent blocks through the rounds side by
/// side. Every working variable is an N-wide array so each step is a
/// straight-line loop over lanes the compiler can keep in vector registers.
pub fn compress_batch<R: RoundFunctions, const N: usize>(
    lanes: &mut [HashState<R::Word>],
    blocks: &[u8],
) {
    let bytes = R::Word::BYTES;
    let block_size = 16 * bytes;
    let zero = [R::Word::default(); N];

    let mut w = [zero; 16];
    (0..16).for_each(|t| {
        (0..N).for_each(|l| w[t][l] = R::Word::read_be(blocks, l * block_size + t * bytes))
    });

    let mut v = [zero; 8];
    (0..8).for_each(|j| (0..N).for_each(|l| v[j][l] = lanes[l].words[j]));

    for t in 0..R::ROUNDS {
        if t >= 16 {
            let mut x = zero;
            (0..N).for_each(|l| {
                let s = R::add(R::small_sigma1(w[(t - 2) & 15][l]), w[(t - 7) & 15][l]);
                x[l] = R::add(R::add(s, R::small_sigma0(w[(t - 15) & 15][l])), w[t & 15][l]);
            });
            w[t & 15] = x;
        }

        let k = R::k(t);
        let mut t1 = zero;
        let mut t2 = zero;
        (0..N).for_each(|l| {
            let e = v[4][l];
            t1[l] = R::add(
                R::add(R::add(v[7][l], R::big_sigma1(e)), R::add(ch(e, v[5][l], v[6][l]), k)),
                w[t & 15][l],
            );
            t2[l] = R::add(R::big_sigma0(v[0][l]), maj(v[0][l], v[1][l], v[2][l]));
        });

        let mut a = zero;
        let mut e = zero;
        (0..N).for_each(|l| {
            a[l] = R::add(t1[l], t2[l]);
            e[l] = R::add(v[3][l], t1[l]);
        });
        v = [a, v[0], v[1], v[2], e, v[4], v[5], v[6]];
    }

    lanes.iter_mut().take(N).enumerate().for_each(|(l, lane)| {
        (0..8).for_each(|j| lane.words[j] = R::add(lane.words[j], v[j][l]));
        lane.increase(block_size);
    });
}

/// Compressor runs the compression function over a set of lanes.
pub trait Compressor<W: Word>: Send + Sync {
    /// name identifies the implementation in logs and benchmarks.
    fn name(&self) -> &'static str;

    /// block_size returns the number of input bytes per compression.
    fn block_size(&self) -> usize;

    /// compress_lanes compresses one block into each lane. `blocks` holds
    /// `lanes.len()` contiguous blocks in lane order. Each lane's counter
    /// grows by the block size.
    fn compress_lanes(&self, lanes: &mut [HashState<W>], blocks: &[u8]);

    /// compress_blocks compresses every whole block of `data` into one lane.
    fn compress_blocks(&self, state: &mut HashState<W>, data: &[u8]) {
        data.chunks_exact(self.block_size())
            .for_each(|block| self.compress_lanes(std::slice::from_mut(state), block));
    }
}

/// ScalarCompressor runs the transform one lane at a time.
pub struct ScalarCompressor<R>(PhantomData<fn() -> R>);

impl<R> ScalarCompressor<R> {
    /// new returns the compressor. It holds no state.
    pub const fn new() -> Self {
        ScalarCompressor(PhantomData)
    }
}

impl<R: RoundFunctions> Compressor<R::Word> for ScalarCompressor<R> {
    fn name(&self) -> &'static str {
        "scalar"
    }

    fn block_size(&self) -> usize {
        16 * R::Word::BYTES
    }

    fn compress_lanes(&self, lanes: &mut [HashState<R::Word>], blocks: &[u8]) {
        let block_size = self.block_size();
        lanes
            .iter_mut()
            .zip(blocks.chunks_exact(block_size))
            .for_each(|(lane, block)| {
                compress_block::<R>(&mut lane.words, block);
                lane.increase(block_size);
            });
    }
}

/// BatchedCompressor packs N lanes into wide registers. Lanes that don't
/// fill a whole batch fall back to the scalar transform.
pub struct BatchedCompressor<R, const N: usize>(PhantomData<fn() -> R>);

impl<R, const N: usize> BatchedCompressor<R, N> {
    /// new returns the compressor. It holds no state.
    pub const fn new() -> Self {
        BatchedCompressor(PhantomData)
    }
}

impl<R: RoundFunctions, const N: usize> Compressor<R::Word> for BatchedCompressor<R, N> {
    fn name(&self) -> &'static str {
        "batched"
    }

    fn block_size(&self) -> usize {
        16 * R::Word::BYTES
    }

    fn compress_lanes(&self, lanes: &mut [HashState<R::Word>], blocks: &[u8]) {
        let block_size = self.block_size();
        let mut groups = lanes.chunks_exact_mut(N);
        let mut offset = 0;
        for group in &mut groups {
            compress_batch::<R, N>(group, &blocks[offset..offset + N * block_size]);
            offset += N * block_size;
        }
        groups
            .into_remainder()
            .iter_mut()
            .zip(blocks[offset..].chunks_exact(block_size))
            .for_each(|(lane, block)| {
                compress_block::<R>(&mut lane.words, block);
                lane.increase(block_size);
            });
    }
}

/// One lane at a time, SHA-256.
pub static SCALAR_256: ScalarCompressor<Rounds256> = ScalarCompressor::new();
/// One lane at a time, SHA-512.
pub static SCALAR_512: ScalarCompressor<Rounds512> = ScalarCompressor::new();
/// Four SHA-256 lanes per pass.
pub static BATCHED_256: BatchedCompressor<Rounds256, 4> = BatchedCompressor::new();
/// Two SHA-512 lanes per pass.
pub static BATCHED_512: BatchedCompressor<Rounds512, 2> = BatchedCompressor::new();

#[cfg(test)]
pub mod test {
    use super::*;
    use crate::sha256::IV256;
    use crate::sha512::IV512;

    fn abc_block(block_size: usize) -> Vec<u8> {
        let mut block = vec![0u8; block_size];
        block[..3].copy_from_slice(b"abc");
        block[3] = 0x80;
        block[block_size - 1] = 24;
        block
    }

    #[test]
    fn single_block_abc_256() {
        let mut h = IV256;
        compress_block::<Rounds256>(&mut h, &abc_block(64));
        assert_eq!(h[0], 0xba7816bf);
        assert_eq!(h[7], 0xf20015ad);
    }

    #[test]
    fn single_block_abc_512() {
        let mut h = IV512;
        compress_block::<Rounds512>(&mut h, &abc_block(128));
        assert_eq!(h[0], 0xddaf35a193617aba);
        assert_eq!(h[7], 0x2a9ac94fa54ca49f);
    }

    #[test]
    fn compression() {
        // Both implementations must agree for any lane count, including a
        // count that leaves a partial batch.
        (1..=9).for_each(|lanes| {
            let blocks: Vec<u8> = (0..lanes * 64).map(|_| rand::random::<u8>()).collect();
            let mut a = vec![HashState::new(&IV256); lanes];
            let mut b = vec![HashState::new(&IV256); lanes];
            SCALAR_256.compress_lanes(&mut a, &blocks);
            BATCHED_256.compress_lanes(&mut b, &blocks);
            assert_eq!(a, b, "scalar and batched outputs differ for {} lanes", lanes);

            let blocks: Vec<u8> = (0..lanes * 128).map(|_| rand::random::<u8>()).collect();
            let mut a = vec![HashState::new(&IV512); lanes];
            let mut b = vec![HashState::new(&IV512); lanes];
            SCALAR_512.compress_lanes(&mut a, &blocks);
            BATCHED_512.compress_lanes(&mut b, &blocks);
            assert_eq!(a, b, "scalar and batched outputs differ for {} lanes", lanes);
        });
    }

    #[test]
    fn counter_grows_per_block() {
        let mut s = HashState::new(&IV512);
        SCALAR_512.compress_blocks(&mut s, &[0u8; 128 * 3]);
        assert_eq!(s.bit_length(), 3 * 1024);

        let mut s = HashState::new(&IV256);
        BATCHED_256.compress_blocks(&mut s, &[0u8; 64 * 2]);
        assert_eq!(s.bit_length(), 2 * 512);
    }
}
