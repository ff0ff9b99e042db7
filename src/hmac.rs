use zeroize::{Zeroize, Zeroizing};

use crate::cpu::Capabilities;
use crate::error::{Result, Sha2Error};
use crate::params::TreeParameters;
use crate::sha2::{Digest, Variant};

/// Shortest key load_key accepts.
pub const MIN_KEY_SIZE: usize = 4;

const IPAD: u8 = 0x36;
const OPAD: u8 = 0x5c;

/// Hmac is HMAC (RFC 2104) over a sequential SHA-2 digest.
///
/// After a key is loaded the MAC can authenticate any number of messages:
/// every finalize re-primes the inner pad for the next one.
pub struct Hmac<V: Variant> {
    digest: Digest<V>,
    ipad: Zeroizing<Vec<u8>>,
    opad: Zeroizing<Vec<u8>>,
    keyed: bool,
}

impl<V: Variant> Hmac<V> {
    /// new returns an unkeyed MAC.
    pub fn new() -> Self {
        Self::from_digest(Digest::new())
    }

    /// with_capabilities returns an unkeyed MAC whose digest uses `caps`.
    pub fn with_capabilities(caps: Capabilities) -> Result<Self> {
        Ok(Self::from_digest(Digest::with_capabilities(
            TreeParameters::sequential::<V>(),
            caps,
        )?))
    }

    /// with_key returns a MAC keyed with `key`.
    pub fn with_key(key: &[u8]) -> Result<Self> {
        let mut mac = Self::new();
        mac.load_key(key, &[], &[])?;
        Ok(mac)
    }

    fn from_digest(digest: Digest<V>) -> Self {
        Hmac {
            digest,
            ipad: Zeroizing::new(vec![0; V::BLOCK_SIZE]),
            opad: Zeroizing::new(vec![0; V::BLOCK_SIZE]),
            keyed: false,
        }
    }

    /// mac_size is the MAC length in bytes.
    pub fn mac_size(&self) -> usize {
        V::DIGEST_SIZE
    }

    /// block_size is the HMAC block length in bytes.
    pub fn block_size(&self) -> usize {
        V::BLOCK_SIZE
    }

    /// is_keyed reports whether a key is loaded.
    pub fn is_keyed(&self) -> bool {
        self.keyed
    }

    /// load_key keys the MAC with `key || salt || info`. Material longer
    /// than a block is hashed first. Any message in progress is dropped.
    pub fn load_key(&mut self, key: &[u8], salt: &[u8], info: &[u8]) -> Result<()> {
        if key.len() < MIN_KEY_SIZE {
            return Err(Sha2Error::InvalidKeySize(key.len()));
        }

        let mut material = Zeroizing::new(Vec::with_capacity(key.len() + salt.len() + info.len()));
        material.extend_from_slice(key);
        material.extend_from_slice(salt);
        material.extend_from_slice(info);

        self.digest.reset();
        if material.len() > V::BLOCK_SIZE {
            material = Zeroizing::new(self.digest.compute_hash(&material));
        }
        material.resize(V::BLOCK_SIZE, 0);

        self.ipad
            .iter_mut()
            .zip(self.opad.iter_mut())
            .zip(material.iter())
            .for_each(|((i, o), m)| {
                *i = m ^ IPAD;
                *o = m ^ OPAD;
            });

        self.keyed = true;
        self.reset();
        Ok(())
    }

    /// update absorbs `input` into the message.
    pub fn update(&mut self, input: &[u8]) {
        self.digest.update(input);
    }

    /// finalize writes the MAC of the message into `output[offset..]` and
    /// readies the MAC for the next message under the same key.
    pub fn finalize(&mut self, output: &mut [u8], offset: usize) -> Result<usize> {
        if !self.keyed {
            return Err(Sha2Error::ContractViolation(
                "HMAC finalized before a key was loaded".into(),
            ));
        }
        let available = output.len().saturating_sub(offset);
        if available < V::DIGEST_SIZE {
            return Err(Sha2Error::BufferTooShort {
                needed: V::DIGEST_SIZE,
                available,
            });
        }

        let mut inner = Zeroizing::new(vec![0u8; V::DIGEST_SIZE]);
        self.digest.finish(&mut inner);

        self.digest.absorb_block(&self.opad);
        self.digest.update(&inner);
        self.digest
            .finish(&mut output[offset..offset + V::DIGEST_SIZE]);

        self.digest.absorb_block(&self.ipad);
        Ok(V::DIGEST_SIZE)
    }

    /// compute_mac authenticates `input` as one whole message.
    pub fn compute_mac(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        self.update(input);
        self.finalize(output, 0)
    }

    /// reset drops the message in progress; the key is kept.
    pub fn reset(&mut self) {
        self.digest.reset();
        if self.keyed {
            self.digest.absorb_block(&self.ipad);
        }
    }

    /// clear_key wipes the pads and returns the MAC to the unkeyed state.
    pub fn clear_key(&mut self) {
        self.ipad.as_mut_slice().zeroize();
        self.opad.as_mut_slice().zeroize();
        self.keyed = false;
        self.digest.reset();
    }
}

impl<V: Variant> Default for Hmac<V> {
    fn default() -> Self {
        Self::new()
    }
}
