//! Cores for the `digest` crate's buffered hashers.
//!
//! These always hash sequentially; wrap them in [`CoreWrapper`] (or use the
//! `Sha256Hasher` / `Sha512Hasher` aliases) to get the `digest::Digest` API.

use std::fmt;

use digest::{
    block_buffer::Eager,
    core_api::{
        AlgorithmName, Buffer, BufferKindUser, CoreWrapper, FixedOutputCore, UpdateCore,
    },
    crypto_common::{Block, BlockSizeUser},
    typenum::{U128, U32, U64},
    HashMarker, Output, OutputSizeUser, Reset,
};

use crate::compress::Compressor;
use crate::cpu::Capabilities;
use crate::sha2::Variant;
use crate::sha256::Sha256;
use crate::sha512::Sha512;
use crate::state::HashState;

/// Sha256Hasher is SHA-256 behind the `digest` traits.
pub type Sha256Hasher = CoreWrapper<Sha256Core>;

/// Sha512Hasher is SHA-512 behind the `digest` traits.
pub type Sha512Hasher = CoreWrapper<Sha512Core>;

macro_rules! sha2_core {
    ($core:ident, $variant:ty, $block:ty, $output:ty, $padding:ident, $len:ty, $name:literal) => {
        #[doc = concat!("Block-level core of ", $name, ".")]
        #[derive(Clone)]
        pub struct $core {
            state: HashState<<$variant as Variant>::Word>,
            compressor: &'static dyn Compressor<<$variant as Variant>::Word>,
        }

        impl $core {
            /// with_capabilities returns a core using the compressor picked for `caps`.
            pub fn with_capabilities(caps: Capabilities) -> Self {
                Self {
                    state: HashState::new(&<$variant as Variant>::IV),
                    compressor: <$variant as Variant>::compressor(&caps),
                }
            }
        }

        impl Default for $core {
            fn default() -> Self {
                Self::with_capabilities(Capabilities::detect())
            }
        }

        impl Reset for $core {
            fn reset(&mut self) {
                self.state.initialize(&<$variant as Variant>::IV);
            }
        }

        impl HashMarker for $core {}

        impl BlockSizeUser for $core {
            type BlockSize = $block;
        }

        impl BufferKindUser for $core {
            type BufferKind = Eager;
        }

        impl OutputSizeUser for $core {
            type OutputSize = $output;
        }

        impl UpdateCore for $core {
            fn update_blocks(&mut self, blocks: &[Block<Self>]) {
                for b in blocks {
                    self.compressor.compress_blocks(&mut self.state, b);
                }
            }
        }

        impl FixedOutputCore for $core {
            fn finalize_fixed_core(&mut self, buffer: &mut Buffer<Self>, out: &mut Output<Self>) {
                self.state.increase(buffer.get_pos());
                let bit_length = self.state.bit_length() as $len; // number of input bits written

                let compressor = self.compressor;
                let state = &mut self.state;
                buffer.$padding(bit_length, |b| compressor.compress_blocks(state, b));

                state.write_be(out);
            }
        }

        impl AlgorithmName for $core {
            fn write_alg_name(f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str($name)
            }
        }

        impl fmt::Debug for $core {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(concat!($name, "Core { ... }"))
            }
        }
    };
}

sha2_core!(Sha256Core, Sha256, U64, U32, len64_padding_be, u64, "Sha256");
sha2_core!(Sha512Core, Sha512, U128, U64, len128_padding_be, u128, "Sha512");
