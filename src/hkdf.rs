//! HKDF (RFC 5869) over the SHA-2 HMAC.

use std::marker::PhantomData;

use zeroize::Zeroizing;

use crate::error::{Result, Sha2Error};
use crate::hmac::Hmac;
use crate::sha2::Variant;

/// Hkdf holds a pseudorandom key and expands it into output keying material.
pub struct Hkdf<V: Variant> {
    prk: Zeroizing<Vec<u8>>,
    _variant: PhantomData<fn() -> V>,
}

impl<V: Variant> Hkdf<V> {
    /// extract derives the PRK from `ikm`. An empty salt stands for
    /// `DIGEST_SIZE` zero bytes. A non-empty salt is an HMAC key and must be
    /// at least MIN_KEY_SIZE bytes.
    pub fn extract(ikm: &[u8], salt: &[u8]) -> Result<Self> {
        let zeros = [0u8; 64];
        let salt = if salt.is_empty() {
            &zeros[..V::DIGEST_SIZE]
        } else {
            salt
        };

        let mut prk = Zeroizing::new(vec![0u8; V::DIGEST_SIZE]);
        Hmac::<V>::with_key(salt)?.compute_mac(ikm, &mut prk)?;
        Ok(Self::with_prk(prk))
    }

    /// from_prk skips extraction and uses `prk` as is.
    pub fn from_prk(prk: &[u8]) -> Result<Self> {
        if prk.len() < crate::hmac::MIN_KEY_SIZE {
            return Err(Sha2Error::InvalidKeySize(prk.len()));
        }
        Ok(Self::with_prk(Zeroizing::new(prk.to_vec())))
    }

    fn with_prk(prk: Zeroizing<Vec<u8>>) -> Self {
        Hkdf {
            prk,
            _variant: PhantomData,
        }
    }

    /// prk returns the pseudorandom key.
    pub fn prk(&self) -> &[u8] {
        &self.prk
    }

    /// max_output_size is the longest output expand can produce.
    pub fn max_output_size() -> usize {
        255 * V::DIGEST_SIZE
    }

    /// expand fills `output` with T(1) || T(2) || ... where
    /// T(n) = HMAC(PRK, T(n - 1) || info || n).
    pub fn expand(&self, info: &[u8], output: &mut [u8]) -> Result<()> {
        if output.len() > Self::max_output_size() {
            return Err(Sha2Error::OutputTooLarge {
                requested: output.len(),
                max: Self::max_output_size(),
            });
        }

        let mut mac = Hmac::<V>::with_key(&self.prk)?;
        let mut t = Zeroizing::new(vec![0u8; V::DIGEST_SIZE]);
        for (i, chunk) in output.chunks_mut(V::DIGEST_SIZE).enumerate() {
            if i != 0 {
                mac.update(&t);
            }
            mac.update(info);
            mac.update(&[i as u8 + 1]);
            mac.finalize(&mut t, 0)?;
            chunk.copy_from_slice(&t[..chunk.len()]);
        }
        Ok(())
    }
}

/// generate runs extract then expand.
pub fn generate<V: Variant>(
    ikm: &[u8],
    salt: &[u8],
    info: &[u8],
    output: &mut [u8],
) -> Result<()> {
    Hkdf::<V>::extract(ikm, salt)?.expand(info, output)
}
