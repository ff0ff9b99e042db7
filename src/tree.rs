//! Tree reduction: folds the lane states of a parallel digest into lane 0.
//!
//! A SHA-2 block holds exactly two digests, so every pair of lane hashes
//! `hash(i) || hash(i + 1)` is one synthetic block compressed into the
//! root. An odd node out (a single depth 2 branch, or the last lane of an
//! odd-sized branch) is paired with a zero digest. Lane 0 keeps its own leaf state and continues as the root; its
//! counter grows with each pair, and the final padding covers the whole
//! root input.

use log::trace;

use crate::compress::Compressor;
use crate::params::{TreeParameters, HEADER_SIZE};
use crate::sha2::{finalize_state, Variant};
use crate::state::HashState;

/// reduce combines `lanes` into `lanes[0]` according to `params.tree_depth`.
pub(crate) fn reduce<V: Variant>(
    lanes: &mut [HashState<V::Word>],
    params: &TreeParameters,
    compressor: &dyn Compressor<V::Word>,
) {
    if params.tree_depth == 2 {
        let branches = branch_states::<V>(lanes, params, compressor);
        trace!("{}: reducing {} branches into the root", V::NAME, branches.len());
        compress_pairs::<V>(&branches, &mut lanes[0], compressor);
    } else {
        trace!("{}: reducing {} lanes into the root", V::NAME, lanes.len());
        let leaves = lanes.to_vec();
        compress_pairs::<V>(&leaves, &mut lanes[0], compressor);
    }
}

// compress_pairs compresses hash(i) || hash(i + 1) into root for every
// non-empty even index i, in order. A trailing unpaired node is followed by
// DIGEST_SIZE zero bytes.
fn compress_pairs<V: Variant>(
    nodes: &[HashState<V::Word>],
    root: &mut HashState<V::Word>,
    compressor: &dyn Compressor<V::Word>,
) {
    let mut block = vec![0u8; V::BLOCK_SIZE];
    nodes.chunks(2).for_each(|pair| {
        if pair[0].is_empty() {
            return;
        }
        pair[0].write_be(&mut block[..V::DIGEST_SIZE]);
        match pair.get(1) {
            Some(right) => right.write_be(&mut block[V::DIGEST_SIZE..]),
            None => block[V::DIGEST_SIZE..].iter_mut().for_each(|b| *b = 0),
        }
        compressor.compress_blocks(root, &block);
    });
}

// branch_states hashes every group of sub_tree_length lanes into its own
// state, closed by the node header. Branch b carries node offset
// params.node_offset + b + 1.
fn branch_states<V: Variant>(
    lanes: &[HashState<V::Word>],
    params: &TreeParameters,
    compressor: &dyn Compressor<V::Word>,
) -> Vec<HashState<V::Word>> {
    let mut node = *params;
    let mut block = vec![0u8; V::BLOCK_SIZE];

    lanes
        .chunks_exact(params.sub_tree_length as usize)
        .map(|branch| {
            node.node_offset = node.node_offset.wrapping_add(1);

            let mut state = HashState::new(&V::IV);
            if branch[0].is_empty() {
                return state;
            }
            compress_pairs::<V>(branch, &mut state, compressor);

            block[..HEADER_SIZE].copy_from_slice(&node.to_bytes());
            finalize_state::<V>(compressor, &mut state, &mut block, HEADER_SIZE);
            state
        })
        .collect()
}

#[cfg(test)]
pub mod test {
    use super::*;
    use crate::compress::{SCALAR_256, SCALAR_512};
    use crate::sha256::{Sha256, IV256};
    use crate::sha512::{Sha512, IV512};

    fn leaves<W: crate::codec::Word>(
        iv: &[W; 8],
        n: usize,
        compressor: &dyn Compressor<W>,
    ) -> Vec<HashState<W>> {
        let mut lanes = vec![HashState::new(iv); n];
        let block_size = compressor.block_size();
        lanes.iter_mut().enumerate().for_each(|(i, lane)| {
            compressor.compress_blocks(lane, &vec![i as u8 + 1; block_size]);
        });
        lanes
    }

    #[test]
    fn depth_one_uses_every_pair() {
        let params = TreeParameters::parallel::<Sha256>(2);
        let lanes = leaves::<u32>(&IV256, 8, &SCALAR_256);

        let mut reduced = lanes.clone();
        reduce::<Sha256>(&mut reduced, &params, &SCALAR_256);
        // one leaf block plus four pair blocks
        assert_eq!(reduced[0].bit_length(), 5 * 512);

        // a change in the last lane reaches the root
        let mut changed = lanes;
        SCALAR_256.compress_blocks(&mut changed[7], &[0u8; 64]);
        reduce::<Sha256>(&mut changed, &params, &SCALAR_256);
        assert_ne!(reduced[0].words(), changed[0].words());
    }

    #[test]
    fn depth_one_skips_empty_pairs() {
        let params = TreeParameters::parallel::<Sha512>(2);
        let mut lanes = vec![HashState::new(&IV512); 4];
        reduce::<Sha512>(&mut lanes, &params, &SCALAR_512);
        assert!(lanes[0].is_empty());
        assert_eq!(lanes[0].words(), &IV512);
    }

    #[test]
    fn single_branch() {
        // 8 SHA-256 lanes in one branch of 8
        let params = TreeParameters::tree::<Sha256>(2, 8);
        let lanes = leaves::<u32>(&IV256, 8, &SCALAR_256);

        let branches = branch_states::<Sha256>(&lanes, &params, &SCALAR_256);
        assert_eq!(branches.len(), 1);

        let mut deep = lanes.clone();
        reduce::<Sha256>(&mut deep, &params, &SCALAR_256);
        // one leaf block plus the branch hash padded with a zero digest
        assert_eq!(deep[0].bit_length(), 2 * 512);

        let mut block = vec![0u8; 64];
        branches[0].write_be(&mut block[..32]);
        let mut expected = lanes[0].clone();
        SCALAR_256.compress_blocks(&mut expected, &block);
        assert_eq!(deep[0].words(), expected.words());
    }

    #[test]
    fn odd_sized_branches() {
        // 12 SHA-512 lanes in four branches of 3
        let params = TreeParameters::tree::<Sha512>(6, 3);
        let lanes = leaves::<u64>(&IV512, 12, &SCALAR_512);

        let branches = branch_states::<Sha512>(&lanes, &params, &SCALAR_512);
        assert_eq!(branches.len(), 4);
        // a full pair, the lone third lane, the header and its padding block
        assert_eq!(branches[0].counter, [3 * 128 + HEADER_SIZE as u64, 0]);

        let mut deep = lanes;
        reduce::<Sha512>(&mut deep, &params, &SCALAR_512);
        assert_eq!(deep[0].bit_length(), 3 * 1024);
    }

    #[test]
    fn depth_two_branches() {
        // 8 SHA-512 lanes in two branches of 4
        let params = TreeParameters::tree::<Sha512>(4, 4);
        let lanes = leaves::<u64>(&IV512, 8, &SCALAR_512);

        let branches = branch_states::<Sha512>(&lanes, &params, &SCALAR_512);
        assert_eq!(branches.len(), 2);
        // two pair blocks, the header and its padding block
        assert_eq!(branches[0].counter, [3 * 128 + HEADER_SIZE as u64, 0]);
        assert_ne!(branches[0].words(), branches[1].words());

        // the node offset feeds into every branch
        let shifted = branch_states::<Sha512>(&lanes, &params.with_node_offset(5), &SCALAR_512);
        assert_ne!(branches[0].words(), shifted[0].words());

        let mut flat = lanes.clone();
        reduce::<Sha512>(&mut flat, &TreeParameters::parallel::<Sha512>(4), &SCALAR_512);
        let mut deep = lanes;
        reduce::<Sha512>(&mut deep, &params, &SCALAR_512);
        assert_ne!(flat[0].words(), deep[0].words());
        // one leaf block plus one block for the branch pair
        assert_eq!(deep[0].bit_length(), 2 * 1024);
    }
}
