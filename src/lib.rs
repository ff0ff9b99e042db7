#![warn(missing_docs)]
//! SHA-256 and SHA-512 (FIPS 180-4) with HMAC, HKDF and a parallel tree
//! hashing mode.
//!
//! The sequential digests produce the standard SHA-2 outputs. The tree mode
//! spreads a message over several lanes, hashes them on a rayon pool and
//! reduces the lane hashes into one root hash. Its output is deterministic
//! for a given set of [`TreeParameters`] but is not the SHA-2 hash of the
//! message. Messages too short to fill one block per lane are hashed
//! sequentially and do yield the standard hash.
//!
//! # Example
//! ```
//! use sha2tree::{sha256, hkdf, Sha2Error, Sha256, TreeParameters};
//! use std::io::Write;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!   let mut h = sha256::new();
//!   h.write_all("hello world".as_bytes())?;
//!   println!("Result: {}", hex::encode(h.sum(vec![])));
//!
//!   let mut tree = sha2tree::Digest::<Sha256>::with_parameters(TreeParameters::parallel::<Sha256>(2))?;
//!   let root = tree.compute_hash(&[7u8; 4096]);
//!   println!("Tree root: {}", hex::encode(root));
//!
//!   let mut okm = [0u8; 42];
//!   hkdf::generate::<Sha256>(b"input key", b"salt", b"info", &mut okm)?;
//!   assert!(matches!(sha256::new().set_parallel_degree(3), Err(Sha2Error::InvalidDegree(3))));
//!
//!   Ok(())
//! }
//! ```

/// `codec` converts between words and big-endian bytes.
pub mod codec;
/// `compress` is the SHA-2 compression function, scalar and lane-batched.
pub mod compress;
/// `cpu` detects the vector extensions used to pick a compressor.
pub mod cpu;
/// `error` holds the crate's error type.
pub mod error;
/// `hkdf` is HKDF key derivation over the HMAC.
pub mod hkdf;
/// `hmac` is HMAC over the sequential digests.
pub mod hmac;
/// `params` configures sequential and tree hashing.
pub mod params;
/// `sha2` is the streaming engine shared by both widths.
pub mod sha2;
/// `sha256` is the 32-bit word variant with a 32-byte output.
pub mod sha256;
/// `sha2core` adapts the digests to the `digest` crate's `core_api`.
pub mod sha2core;
/// `sha512` is the 64-bit word variant with a 64-byte output.
pub mod sha512;
/// `state` is the per-lane chaining value and length counter.
pub mod state;
mod tree;

pub use error::{Result, Sha2Error};
pub use hkdf::Hkdf;
pub use hmac::Hmac;
pub use params::TreeParameters;
pub use sha2::{Digest, HashMode, Variant};
pub use sha256::Sha256;
pub use sha2core::{Sha256Core, Sha256Hasher, Sha512Core, Sha512Hasher};
pub use sha512::Sha512;
