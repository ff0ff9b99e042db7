//! Error types for the SHA-2 digests, MAC and key derivation.

use std::borrow::Cow;
use thiserror::Error;

/// Sha2Error is returned by every fallible operation in the crate.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum Sha2Error {
    /// The tree parameters describe a configuration the engine can't run.
    #[error("invalid tree configuration: {0}")]
    Configuration(Cow<'static, str>),

    /// set_parallel_degree got a degree the engine can't run.
    #[error("invalid parallel degree {0}: must be even, non-zero and at most the available cores")]
    InvalidDegree(usize),

    /// The output slice can't hold the digest.
    #[error("output buffer too short: need {needed} bytes, {available} available")]
    BufferTooShort {
        /// Bytes the digest needs.
        needed: usize,
        /// Bytes left after the offset.
        available: usize,
    },

    /// A MAC key, HKDF salt or PRK is shorter than MIN_KEY_SIZE.
    #[error("invalid MAC key size {0}: the minimum is 4 bytes")]
    InvalidKeySize(usize),

    /// HKDF was asked for more than 255 blocks of output.
    #[error("requested {requested} bytes, the maximum output is {max} bytes")]
    OutputTooLarge {
        /// Length asked for.
        requested: usize,
        /// Longest output available.
        max: usize,
    },

    /// from_bytes got a header of the wrong size.
    #[error("tree parameter header needs 16 bytes, got {0}")]
    InvalidHeaderSize(usize),

    /// update_range got a range outside its input.
    #[error("input range {offset}+{length} exceeds the {available} bytes supplied")]
    InvalidLength {
        /// Start of the range.
        offset: usize,
        /// Length of the range.
        length: usize,
        /// Length of the input.
        available: usize,
    },

    /// The caller broke a usage contract (e.g. finalizing a MAC with no key).
    #[error("contract violation: {0}")]
    ContractViolation(Cow<'static, str>),
}

/// Result is the crate's result type.
pub type Result<T> = std::result::Result<T, Sha2Error>;
