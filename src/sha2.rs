use std::io::Write;

use log::{debug, trace};
use rayon::prelude::*;
use zeroize::{Zeroize, Zeroizing};

use crate::codec::Word;
use crate::compress::Compressor;
use crate::cpu::Capabilities;
use crate::error::{Result, Sha2Error};
use crate::params::{available_cores, default_parallel_degree, TreeParameters};
use crate::state::HashState;
use crate::tree;

/// Variant fixes the sizes and constants of one SHA-2 width.
pub trait Variant: Send + Sync + 'static {
    /// Word is the state word type (u32 or u64).
    type Word: Word;

    /// Display name, e.g. "SHA-256".
    const NAME: &'static str;
    /// Number of bytes in an input block, per compression.
    const BLOCK_SIZE: usize;
    /// Number of bytes in a hash output.
    const DIGEST_SIZE: usize;
    /// Number of lanes each worker owns in tree mode.
    const INTERLEAVE: usize;
    /// Number of bytes holding the message bit length in the final block.
    const LENGTH_FIELD: usize;
    /// Initial hash value.
    const IV: [Self::Word; 8];

    /// compressor picks the compression implementation for `caps`.
    fn compressor(caps: &Capabilities) -> &'static dyn Compressor<Self::Word>;
}

/// HashMode is how a message was actually hashed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashMode {
    /// Standard SHA-2: one lane, FIPS 180-4 output.
    Sequential,
    /// Lanes hashed in parallel and reduced into a root hash.
    Tree,
}

/// Digest is the streaming SHA-2 engine, in sequential or tree mode.
///
/// In tree mode the input is split across `parallel_degree * INTERLEAVE`
/// lanes and the lane hashes are reduced into a root on finalize. That
/// output is not the standard SHA-2 hash of the message.
pub struct Digest<V: Variant> {
    params: TreeParameters,
    compressor: &'static dyn Compressor<V::Word>,

    lanes: Vec<HashState<V::Word>>, // lane 0 doubles as the root
    buffer: Zeroizing<Vec<u8>>,     // data written since last dispatch
    buffered: usize,                // number of bytes held in buffer
    last_mode: HashMode,            // mode used by the most recent finalize
}

impl<V: Variant> Digest<V> {
    /// new returns a sequential digest.
    pub fn new() -> Self {
        Self::build(TreeParameters::sequential::<V>(), Capabilities::detect())
    }

    /// new_parallel returns a depth 1 tree digest using every available core.
    pub fn new_parallel() -> Self {
        Self::build(
            TreeParameters::parallel::<V>(default_parallel_degree()),
            Capabilities::detect(),
        )
    }

    /// with_parameters returns a digest configured by `params`.
    pub fn with_parameters(params: TreeParameters) -> Result<Self> {
        Self::with_capabilities(params, Capabilities::detect())
    }

    /// with_capabilities is with_parameters with an explicit capability set,
    /// e.g. `Capabilities::scalar()` to force the scalar transform. Zero
    /// digest and leaf lengths take the sizes of `V`.
    pub fn with_capabilities(params: TreeParameters, caps: Capabilities) -> Result<Self> {
        let params = params.complete::<V>();
        params.validate::<V>()?;
        Ok(Self::build(params, caps))
    }

    fn build(params: TreeParameters, caps: Capabilities) -> Self {
        let lanes = params.lane_count::<V>();
        let compressor = V::compressor(&caps);
        debug!(
            "{}: depth {} with {} lane(s), {} compressor",
            V::NAME,
            params.tree_depth,
            lanes,
            compressor.name()
        );

        Digest {
            params,
            compressor,
            lanes: vec![HashState::new(&V::IV); lanes],
            buffer: Zeroizing::new(vec![0; lanes * V::BLOCK_SIZE]),
            buffered: 0,
            last_mode: HashMode::Sequential,
        }
    }

    /// name returns the variant name, e.g. "SHA-256".
    pub fn name(&self) -> &'static str {
        V::NAME
    }

    /// digest_size is the output length in bytes.
    pub fn digest_size(&self) -> usize {
        V::DIGEST_SIZE
    }

    /// block_size is the compression block length in bytes.
    pub fn block_size(&self) -> usize {
        V::BLOCK_SIZE
    }

    /// parameters returns the configured tree parameters.
    pub fn parameters(&self) -> &TreeParameters {
        &self.params
    }

    /// is_parallel reports whether the digest is configured for tree mode.
    pub fn is_parallel(&self) -> bool {
        self.params.is_parallel()
    }

    /// lane_count is the number of lane states, 1 when sequential.
    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    /// compressor_name names the compression implementation in use.
    pub fn compressor_name(&self) -> &'static str {
        self.compressor.name()
    }

    /// parallel_minimum_size is the number of bytes one fork/join dispatch
    /// consumes: one block per lane. Messages shorter than this are hashed
    /// sequentially even in tree mode.
    pub fn parallel_minimum_size(&self) -> usize {
        self.lanes.len() * V::BLOCK_SIZE
    }

    /// effective_mode is the mode the most recent finalize used. A tree
    /// digest reports Sequential after finalizing a message that was too
    /// short to reach any lane.
    pub fn effective_mode(&self) -> HashMode {
        self.last_mode
    }

    /// update absorbs `input` into the digest.
    pub fn update(&mut self, mut input: &[u8]) {
        if input.is_empty() {
            return;
        }

        let unit = self.parallel_minimum_size();
        if self.buffered != 0 && self.buffered + input.len() >= unit {
            // complete and empty the buffer
            let fill = unit - self.buffered;
            self.buffer[self.buffered..unit].copy_from_slice(&input[..fill]);
            process_leaves(
                self.compressor,
                &mut self.lanes,
                &self.buffer[..unit],
                V::INTERLEAVE,
            );
            self.buffered = 0;
            input = &input[fill..];
        }

        if input.len() >= unit {
            // whole units go straight from the caller's slice
            let n = input.len() - input.len() % unit;
            process_leaves(self.compressor, &mut self.lanes, &input[..n], V::INTERLEAVE);
            input = &input[n..];
        }

        if !input.is_empty() {
            self.buffer[self.buffered..self.buffered + input.len()].copy_from_slice(input);
            self.buffered += input.len();
        }
    }

    /// update_range absorbs `input[offset..offset + length]`.
    pub fn update_range(&mut self, input: &[u8], offset: usize, length: usize) -> Result<()> {
        match offset.checked_add(length) {
            Some(end) if end <= input.len() => {
                self.update(&input[offset..end]);
                Ok(())
            }
            _ => Err(Sha2Error::InvalidLength {
                offset,
                length,
                available: input.len(),
            }),
        }
    }

    /// finalize writes the hash into `output[offset..]`, resets the digest
    /// for the next message and returns the number of bytes written.
    /// A short output fails with BufferTooShort and leaves the digest as is.
    pub fn finalize(&mut self, output: &mut [u8], offset: usize) -> Result<usize> {
        let available = output.len().saturating_sub(offset);
        if available < V::DIGEST_SIZE {
            return Err(Sha2Error::BufferTooShort {
                needed: V::DIGEST_SIZE,
                available,
            });
        }

        self.finish(&mut output[offset..offset + V::DIGEST_SIZE]);
        Ok(V::DIGEST_SIZE)
    }

    /// compute_hash hashes `input` as (the rest of) one message.
    pub fn compute_hash(&mut self, input: &[u8]) -> Vec<u8> {
        self.update(input);
        let mut out = vec![0u8; V::DIGEST_SIZE];
        self.finish(&mut out);
        out
    }

    /// sum appends the hash of the data written so far to `prefix`. The
    /// digest itself is left untouched so the caller can keep writing.
    pub fn sum(&self, mut prefix: Vec<u8>) -> Vec<u8> {
        let mut d = self.clone();
        prefix.extend(d.compute_hash(&[]));
        prefix
    }

    /// reset discards buffered data and restores every lane to the IV.
    pub fn reset(&mut self) {
        self.buffer.as_mut_slice().zeroize();
        self.buffered = 0;
        self.lanes
            .iter_mut()
            .for_each(|lane| lane.initialize(&V::IV));
    }

    /// set_parallel_degree switches to tree mode with `degree` workers. A
    /// sequential digest becomes a depth 1 tree. Any pending data is dropped.
    pub fn set_parallel_degree(&mut self, degree: usize) -> Result<()> {
        if degree == 0 || degree % 2 != 0 || degree > 254 || degree > available_cores() {
            return Err(Sha2Error::InvalidDegree(degree));
        }

        let mut params = self.params;
        params.parallel_degree = degree as u8;
        if params.tree_depth == 0 {
            params.tree_depth = 1;
        }
        params.validate::<V>()?;

        let lanes = params.lane_count::<V>();
        debug!("{}: parallel degree set to {} ({} lanes)", V::NAME, degree, lanes);

        self.params = params;
        self.lanes = vec![HashState::new(&V::IV); lanes];
        self.buffer = Zeroizing::new(vec![0; lanes * V::BLOCK_SIZE]);
        self.buffered = 0;
        Ok(())
    }

    /// destroy wipes and releases the digest. Dropping a digest wipes it
    /// too; destroy just makes the point of erasure explicit.
    pub fn destroy(self) {
        drop(self)
    }

    /// absorb_block compresses one whole block into the root lane. The
    /// buffer must be empty.
    pub(crate) fn absorb_block(&mut self, block: &[u8]) {
        debug_assert_eq!(self.buffered, 0);
        self.compressor.compress_blocks(&mut self.lanes[0], block);
    }

    // out must be exactly DIGEST_SIZE bytes.
    pub(crate) fn finish(&mut self, out: &mut [u8]) {
        let compressor = self.compressor;
        let mut mode = HashMode::Sequential;

        if self.is_parallel() {
            if self.lanes[0].is_empty() {
                debug!(
                    "{}: {} bytes is below the parallel minimum of {}, hashing sequentially",
                    V::NAME,
                    self.buffered,
                    self.parallel_minimum_size()
                );
            } else {
                tree::reduce::<V>(&mut self.lanes, &self.params, compressor);
                mode = HashMode::Tree;
            }
        }

        // whatever is still buffered belongs to the root lane
        let full = self.buffered - self.buffered % V::BLOCK_SIZE;
        compressor.compress_blocks(&mut self.lanes[0], &self.buffer[..full]);
        self.buffer.copy_within(full..self.buffered, 0);
        self.buffered -= full;

        finalize_state::<V>(
            compressor,
            &mut self.lanes[0],
            &mut self.buffer[..V::BLOCK_SIZE],
            self.buffered,
        );
        self.lanes[0].write_be(out);

        self.last_mode = mode;
        self.reset();
    }
}

/// finalize_state pads the `length` message bytes at the front of `block`
/// and runs the last compression(s). `block` is one block long and is
/// overwritten.
pub(crate) fn finalize_state<V: Variant>(
    compressor: &dyn Compressor<V::Word>,
    state: &mut HashState<V::Word>,
    block: &mut [u8],
    length: usize,
) {
    state.increase(length);
    let bit_length = state.bit_length();

    // Padding. Add a 1 bit and 0 bits until the length field.
    block[length] = 0x80;
    block[length + 1..].iter_mut().for_each(|b| *b = 0);
    if length + 1 > V::BLOCK_SIZE - V::LENGTH_FIELD {
        compressor.compress_blocks(state, block);
        block.iter_mut().for_each(|b| *b = 0);
    }

    let len = bit_length.to_be_bytes();
    block[V::BLOCK_SIZE - V::LENGTH_FIELD..].copy_from_slice(&len[16 - V::LENGTH_FIELD..]);
    compressor.compress_blocks(state, block);
}

// process_leaves compresses `data`, a whole number of lane-rows, into the
// lanes. Worker i owns lanes [i*interleave, (i+1)*interleave) and, in every
// row, the interleave blocks starting at i*interleave*block_size.
fn process_leaves<W: Word>(
    compressor: &'static dyn Compressor<W>,
    lanes: &mut [HashState<W>],
    data: &[u8],
    interleave: usize,
) {
    if lanes.len() == 1 {
        compressor.compress_blocks(&mut lanes[0], data);
        return;
    }

    let block_size = compressor.block_size();
    let row = lanes.len() * block_size;
    let stride = interleave * block_size;
    trace!(
        "fork/join over {} workers, {} rows",
        lanes.len() / interleave,
        data.len() / row
    );

    lanes
        .par_chunks_mut(interleave)
        .enumerate()
        .for_each(|(i, group)| {
            data.chunks_exact(row)
                .for_each(|r| compressor.compress_lanes(group, &r[i * stride..(i + 1) * stride]))
        });
}

impl<V: Variant> Clone for Digest<V> {
    fn clone(&self) -> Self {
        Digest {
            params: self.params,
            compressor: self.compressor,
            lanes: self.lanes.clone(),
            buffer: self.buffer.clone(),
            buffered: self.buffered,
            last_mode: self.last_mode,
        }
    }
}

impl<V: Variant> Default for Digest<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Variant> Write for Digest<V> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
