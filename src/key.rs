use rsa::pkcs8::{DecodePrivateKey, EncodePrivateKey};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};

use crate::error::{CertGenError, Result};

/// Key strength used when a request does not carry a positive override.
pub const DEFAULT_KEY_BITS: usize = 2048;

/// Resolves a requested key strength to the number of bits actually used.
///
/// Absent or non-positive values fall back to [`DEFAULT_KEY_BITS`] and are
/// never passed through to key generation unchecked.
pub fn resolve_key_bits(requested: Option<usize>) -> usize {
    requested.filter(|bits| *bits > 0).unwrap_or(DEFAULT_KEY_BITS)
}

/// An RSA key pair used both as a certificate subject key and, when issuing
/// chain-signed certificates, as the parent signing key.
#[derive(Debug, Clone)]
pub struct KeyPair {
    private: RsaPrivateKey,
    public: RsaPublicKey,
}

impl KeyPair {
    /// Generate an RSA key pair with the specified number of bits.
    ///
    /// Uses the operating system's secure random source. Generation failure
    /// is fatal to the issuing call and is never retried.
    pub fn generate(bits: usize) -> Result<Self> {
        let mut rng = rand_core::OsRng;
        let private = RsaPrivateKey::new(&mut rng, bits)
            .map_err(|e| CertGenError::KeyGeneration(e.to_string()))?;
        let public = RsaPublicKey::from(&private);
        Ok(Self { private, public })
    }

    pub fn private(&self) -> &RsaPrivateKey {
        &self.private
    }

    pub fn public(&self) -> &RsaPublicKey {
        &self.public
    }

    /// The modulus size in bits.
    pub fn bits(&self) -> usize {
        self.public.size() * 8
    }

    /// Serialize the private key to PKCS#8 DER.
    pub fn to_pkcs8_der(&self) -> Result<Vec<u8>> {
        self.private
            .to_pkcs8_der()
            .map(|doc| doc.as_bytes().to_vec())
            .map_err(|e| CertGenError::KeySerialization(e.to_string()))
    }

    /// Load a key pair from PKCS#8 DER bytes.
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self> {
        let private = RsaPrivateKey::from_pkcs8_der(der)
            .map_err(|e| CertGenError::Decoding(e.to_string()))?;
        let public = RsaPublicKey::from(&private);
        Ok(Self { private, public })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_positive_strength_falls_back_to_default() {
        assert_eq!(resolve_key_bits(None), DEFAULT_KEY_BITS);
        assert_eq!(resolve_key_bits(Some(0)), DEFAULT_KEY_BITS);
    }

    #[test]
    fn positive_strength_is_used_as_given() {
        assert_eq!(resolve_key_bits(Some(1024)), 1024);
        assert_eq!(resolve_key_bits(Some(4096)), 4096);
    }
}
