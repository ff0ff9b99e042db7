use crate::codec::{le_bytes_to_u16, le_bytes_to_u32, u16_to_le_bytes, u32_to_le_bytes};
use crate::error::{Result, Sha2Error};
use crate::sha2::Variant;

/// Size in bytes of a serialized TreeParameters header.
pub const HEADER_SIZE: usize = 16;

/// TreeParameters configures a digest: sequential (depth 0), flat tree
/// (depth 1) or branch-then-root tree (depth 2).
///
/// The serialized header is also hashed into every branch of a depth 2
/// tree, so every field (including `node_offset` and the reserved ones)
/// affects tree-mode output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TreeParameters {
    /// Output length in bytes. Zero takes the variant's digest size.
    pub digest_length: u8,
    /// Key length in bytes; zero when unkeyed.
    pub key_length: u8,
    /// 0 for sequential, 1 or 2 for a tree.
    pub tree_depth: u8,
    /// Leaf length in bytes. Zero takes the variant's block size.
    pub leaf_length: u32,
    /// Number of lanes.
    pub parallel_degree: u8,
    /// Lanes per branch at depth 2.
    pub sub_tree_length: u8,
    /// Offset of this node in the tree.
    pub node_offset: u8,
    /// Reserved, hashed into the header.
    pub reserved1: u16,
    /// Reserved, hashed into the header.
    pub reserved2: u32,
}

impl TreeParameters {
    /// sequential returns parameters for standard SHA-2 hashing.
    pub fn sequential<V: Variant>() -> Self {
        Self {
            digest_length: V::DIGEST_SIZE as u8,
            leaf_length: V::BLOCK_SIZE as u32,
            ..Default::default()
        }
    }

    /// parallel returns depth 1 tree parameters with `degree` workers.
    pub fn parallel<V: Variant>(degree: u8) -> Self {
        Self {
            tree_depth: 1,
            parallel_degree: degree,
            ..Self::sequential::<V>()
        }
    }

    /// tree returns depth 2 parameters: lanes are grouped in branches of
    /// `sub_tree_length` before the root reduction.
    pub fn tree<V: Variant>(degree: u8, sub_tree_length: u8) -> Self {
        Self {
            tree_depth: 2,
            parallel_degree: degree,
            sub_tree_length,
            ..Self::sequential::<V>()
        }
    }

    /// with_node_offset sets the node offset mixed into depth 2 branches.
    pub fn with_node_offset(mut self, node_offset: u8) -> Self {
        self.node_offset = node_offset;
        self
    }

    /// with_key_length sets the key length recorded in the header.
    pub fn with_key_length(mut self, key_length: u8) -> Self {
        self.key_length = key_length;
        self
    }

    /// with_reserved sets the two reserved header fields.
    pub fn with_reserved(mut self, reserved1: u16, reserved2: u32) -> Self {
        self.reserved1 = reserved1;
        self.reserved2 = reserved2;
        self
    }

    /// complete fills a zero digest or leaf length with the sizes of `V`,
    /// so `TreeParameters::default()` describes a sequential `V` digest.
    pub fn complete<V: Variant>(mut self) -> Self {
        if self.digest_length == 0 {
            self.digest_length = V::DIGEST_SIZE as u8;
        }
        if self.leaf_length == 0 {
            self.leaf_length = V::BLOCK_SIZE as u32;
        }
        self
    }

    /// is_parallel reports whether these parameters select tree mode.
    pub fn is_parallel(&self) -> bool {
        self.tree_depth > 0
    }

    /// lane_count is the number of lane states the parameters require.
    pub fn lane_count<V: Variant>(&self) -> usize {
        if self.is_parallel() {
            self.parallel_degree as usize * V::INTERLEAVE
        } else {
            1
        }
    }

    /// validate checks the parameters against variant `V`.
    pub fn validate<V: Variant>(&self) -> Result<()> {
        if self.digest_length as usize != V::DIGEST_SIZE {
            return Err(Sha2Error::Configuration(
                format!(
                    "{} digest length must be {}, got {}",
                    V::NAME,
                    V::DIGEST_SIZE,
                    self.digest_length
                )
                .into(),
            ));
        }
        if self.leaf_length as usize != V::BLOCK_SIZE {
            return Err(Sha2Error::Configuration(
                format!(
                    "{} leaf length must be {}, got {}",
                    V::NAME,
                    V::BLOCK_SIZE,
                    self.leaf_length
                )
                .into(),
            ));
        }
        if self.tree_depth > 2 {
            return Err(Sha2Error::Configuration(
                format!("tree depth must be 0, 1 or 2, got {}", self.tree_depth).into(),
            ));
        }
        if !self.is_parallel() {
            return Ok(());
        }

        if self.parallel_degree < 2 || self.parallel_degree % 2 != 0 {
            return Err(Sha2Error::Configuration(
                format!(
                    "parallel degree must be an even number of at least 2, got {}",
                    self.parallel_degree
                )
                .into(),
            ));
        }

        if self.tree_depth == 2 {
            let lanes = self.lane_count::<V>();
            let sub = self.sub_tree_length as usize;
            if sub < 2 || lanes % sub != 0 {
                return Err(Sha2Error::Configuration(
                    format!(
                        "sub-tree length {} must be at least 2 and divide the {} lanes",
                        sub, lanes
                    )
                    .into(),
                ));
            }
        }

        Ok(())
    }

    /// to_bytes serializes the parameters into the 16-byte header.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0] = self.digest_length;
        out[1] = self.key_length;
        out[2] = self.tree_depth;
        u32_to_le_bytes(self.leaf_length, &mut out, 3);
        out[7] = self.parallel_degree;
        out[8] = self.sub_tree_length;
        out[9] = self.node_offset;
        u16_to_le_bytes(self.reserved1, &mut out, 10);
        u32_to_le_bytes(self.reserved2, &mut out, 12);
        out
    }

    /// from_bytes parses a header. Bytes past the first 16 are ignored.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(Sha2Error::InvalidHeaderSize(bytes.len()));
        }

        Ok(Self {
            digest_length: bytes[0],
            key_length: bytes[1],
            tree_depth: bytes[2],
            leaf_length: le_bytes_to_u32(bytes, 3),
            parallel_degree: bytes[7],
            sub_tree_length: bytes[8],
            node_offset: bytes[9],
            reserved1: le_bytes_to_u16(bytes, 10),
            reserved2: le_bytes_to_u32(bytes, 12),
        })
    }
}

/// default_parallel_degree is the largest even worker count that doesn't
/// exceed the available cores, and never less than 2.
pub fn default_parallel_degree() -> u8 {
    let cores = available_cores().min(254);
    ((cores & !1).max(2)) as u8
}

pub(crate) fn available_cores() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
pub mod test {
    use super::*;
    use crate::sha256::Sha256;
    use crate::sha512::Sha512;
    use anyhow::Result;

    #[test]
    fn header_layout() -> Result<()> {
        let p = TreeParameters::tree::<Sha512>(4, 4)
            .with_key_length(7)
            .with_node_offset(3)
            .with_reserved(0x0102, 0x0a0b0c0d);

        let bytes = p.to_bytes();
        assert_eq!(hex::encode(bytes), "4007028000000004040302010d0c0b0a");

        let back = TreeParameters::from_bytes(&bytes)?;
        assert_eq!(back, p);
        Ok(())
    }

    #[test]
    fn short_header() {
        assert_eq!(
            TreeParameters::from_bytes(&[0u8; 15]),
            Err(Sha2Error::InvalidHeaderSize(15))
        );
    }

    #[test]
    fn validation() {
        assert!(TreeParameters::sequential::<Sha256>().validate::<Sha256>().is_ok());
        assert!(TreeParameters::parallel::<Sha256>(2).validate::<Sha256>().is_ok());
        // 8 SHA-512 lanes in branches of 4: two branches.
        assert!(TreeParameters::tree::<Sha512>(4, 4).validate::<Sha512>().is_ok());
        // a single branch, and branches of an odd size
        assert!(TreeParameters::tree::<Sha512>(4, 8).validate::<Sha512>().is_ok());
        assert!(TreeParameters::tree::<Sha256>(2, 8).validate::<Sha256>().is_ok());
        assert!(TreeParameters::tree::<Sha512>(6, 3).validate::<Sha512>().is_ok());

        let bad = [
            TreeParameters::sequential::<Sha256>(),
            TreeParameters::parallel::<Sha512>(3),
            TreeParameters::parallel::<Sha512>(0),
            TreeParameters::tree::<Sha512>(4, 3),
            TreeParameters::tree::<Sha512>(4, 16),
            TreeParameters::tree::<Sha256>(2, 1),
            TreeParameters {
                tree_depth: 3,
                ..TreeParameters::parallel::<Sha512>(2)
            },
        ];
        bad.iter().for_each(|p| {
            assert!(
                matches!(p.validate::<Sha512>(), Err(Sha2Error::Configuration(_))),
                "{:?} should be rejected",
                p
            )
        });
    }

    #[test]
    fn default_is_completed_per_variant() {
        let p = TreeParameters::default();
        assert!(p.validate::<Sha256>().is_err());
        assert_eq!(p.complete::<Sha256>(), TreeParameters::sequential::<Sha256>());
        assert_eq!(p.complete::<Sha512>(), TreeParameters::sequential::<Sha512>());

        // explicit sizes are left alone
        let wrong = TreeParameters::sequential::<Sha256>();
        assert_eq!(wrong.complete::<Sha512>(), wrong);
    }

    #[test]
    fn lane_count() {
        assert_eq!(TreeParameters::sequential::<Sha256>().lane_count::<Sha256>(), 1);
        assert_eq!(TreeParameters::parallel::<Sha256>(4).lane_count::<Sha256>(), 16);
        assert_eq!(TreeParameters::parallel::<Sha512>(4).lane_count::<Sha512>(), 8);
    }

    #[test]
    fn default_degree_is_even() {
        let d = default_parallel_degree();
        assert!(d >= 2);
        assert_eq!(d % 2, 0);
    }
}
