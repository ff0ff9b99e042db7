use crate::compress::{Compressor, BATCHED_512, SCALAR_512};
use crate::cpu::Capabilities;
use crate::sha2::{Digest, Variant};

/// Size of a SHA-512 hash in bytes.
pub const DIGEST_SIZE: usize = 64;

/// Size of a SHA-512 input block in bytes.
pub const BLOCK_SIZE: usize = 128;

/// Initial hash value H(0), FIPS 180-4 section 5.3.5.
pub const IV512: [u64; 8] = [
    0x6a09e667f3bcc908,
    0xbb67ae8584caa73b,
    0x3c6ef372fe94f82b,
    0xa54ff53a5f1d36f1,
    0x510e527fade682d1,
    0x9b05688c2b3e6c1f,
    0x1f83d9abfb41bd6b,
    0x5be0cd19137e2179,
];

/// Sha512 selects the 64-bit SHA-2 variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sha512;

impl Variant for Sha512 {
    type Word = u64;

    const NAME: &'static str = "SHA-512";
    const BLOCK_SIZE: usize = BLOCK_SIZE;
    const DIGEST_SIZE: usize = DIGEST_SIZE;
    const INTERLEAVE: usize = 2;
    const LENGTH_FIELD: usize = 16;
    const IV: [u64; 8] = IV512;

    fn compressor(caps: &Capabilities) -> &'static dyn Compressor<u64> {
        if caps.has_wide_vectors() {
            &BATCHED_512
        } else {
            &SCALAR_512
        }
    }
}

/// new returns a sequential SHA-512 digest.
pub fn new() -> Digest<Sha512> {
    Digest::new()
}

/// new_parallel returns a depth 1 tree digest using every available core.
pub fn new_parallel() -> Digest<Sha512> {
    Digest::new_parallel()
}

/// hash returns the standard SHA-512 hash of `data`.
pub fn hash(data: &[u8]) -> [u8; DIGEST_SIZE] {
    let mut h = new();
    h.update(data);
    let mut out = [0u8; DIGEST_SIZE];
    h.finish(&mut out);
    out
}

#[cfg(test)]
pub mod test {
    use super::*;
    use crate::params::TreeParameters;
    use crate::sha2::{test::shake_input, HashMode};
    use anyhow::Result;

    #[test]
    fn million_a() {
        let mut h = new();
        (0..1000).for_each(|_| h.update(&[b'a'; 1000]));
        assert_eq!(
            hex::encode(h.compute_hash(&[])),
            "e718483d0ce769644e2e42c7bc15b4638e1f98b13b2044285632a803afa973ebde0ff244877ea60a4cb0432ce577c31beb009c5c2c49aa2e4eadb217ad8cc09b"
        );
    }

    #[test]
    fn parallel_sizes() -> Result<()> {
        let h = Digest::<Sha512>::with_parameters(TreeParameters::parallel::<Sha512>(4))?;
        assert_eq!(h.lane_count(), 8);
        assert_eq!(h.parallel_minimum_size(), 8 * 128);
        Ok(())
    }

    #[test]
    fn depth_two() -> Result<()> {
        let flat = TreeParameters::parallel::<Sha512>(4);
        let deep = TreeParameters::tree::<Sha512>(4, 4);
        let input = shake_input("depth two", 4 * 8 * 128 + 300);

        let mut a = Digest::<Sha512>::with_parameters(flat)?;
        let mut b = Digest::<Sha512>::with_parameters(deep)?;
        let tree = b.compute_hash(&input);
        assert_eq!(b.effective_mode(), HashMode::Tree);
        assert_ne!(a.compute_hash(&input), tree);
        assert_ne!(tree.as_slice(), hash(&input).as_slice());

        // the node offset is part of every branch
        let mut c = Digest::<Sha512>::with_parameters(deep.with_node_offset(9))?;
        assert_ne!(c.compute_hash(&input), tree);

        // and the configured offset isn't consumed by finalize
        assert_eq!(b.compute_hash(&input), tree);
        assert_eq!(b.parameters().node_offset, 0);
        Ok(())
    }

    #[test]
    fn depth_two_small_input_is_standard() -> Result<()> {
        let mut h = Digest::<Sha512>::with_parameters(TreeParameters::tree::<Sha512>(4, 4))?;
        let input = shake_input("short", 1000);
        assert_eq!(h.compute_hash(&input).as_slice(), hash(&input).as_slice());
        assert_eq!(h.effective_mode(), HashMode::Sequential);
        Ok(())
    }

    #[test]
    fn tree_independent_of_pool_size() -> Result<()> {
        let params = TreeParameters::tree::<Sha512>(4, 4);
        let input = shake_input("pool", 7 * 8 * 128 + 5);

        let run = |threads: usize| -> Result<Vec<u8>> {
            let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
            let mut h = Digest::<Sha512>::with_parameters(params)?;
            Ok(pool.install(|| h.compute_hash(&input)))
        };

        assert_eq!(run(1)?, run(4)?);
        Ok(())
    }

    #[test]
    fn tree_scalar_matches_batched() -> Result<()> {
        let params = TreeParameters::parallel::<Sha512>(2);
        let input = shake_input("caps", 3000);
        let mut a = Digest::<Sha512>::with_capabilities(params, Capabilities::scalar())?;
        let mut b = Digest::<Sha512>::with_capabilities(
            params,
            Capabilities {
                neon: true,
                ..Capabilities::scalar()
            },
        )?;
        assert_eq!(a.compute_hash(&input), b.compute_hash(&input));
        Ok(())
    }
}
