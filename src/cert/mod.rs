pub mod extensions;
pub mod params;

use der::{Decode, Encode, EncodePem};
use rsa::RsaPublicKey;
use rsa::pkcs1v15::VerifyingKey;
use rsa::signature::Verifier;
use sha2::Sha256;
use x509_cert::certificate::CertificateInner;
use x509_cert::name::Name;

use extensions::{BasicConstraints, SubjectAltName, ToAndFromX509Extension};

use crate::error::{CertGenError, Result};

/// Represents a signed X.509 certificate.
///
/// Wraps the `x509-cert` representation and provides DER/PEM encoding plus
/// the accessors the issuing pipeline and its tests rely on.
#[derive(Debug, Clone)]
pub struct Certificate {
    /// The inner representation of the certificate.
    pub inner: CertificateInner,
}

impl Certificate {
    /// Encodes the certificate into DER format.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        self.inner
            .to_der()
            .map_err(|e| CertGenError::Encoding(e.to_string()))
    }

    /// Encodes the certificate into PEM format.
    pub fn to_pem(&self) -> Result<String> {
        self.inner
            .to_pem(pkcs8::LineEnding::LF)
            .map_err(|e| CertGenError::Encoding(e.to_string()))
    }

    /// Decodes a certificate from DER bytes.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let inner = CertificateInner::from_der(der)?;
        Ok(Self { inner })
    }

    /// Decodes a certificate from a PEM string.
    pub fn from_pem(pem: &str) -> Result<Self> {
        let (_, der) = crate::pem_utils::pem_to_der(pem)?;
        Self::from_der(&der)
    }

    pub fn subject(&self) -> &Name {
        &self.inner.tbs_certificate.subject
    }

    pub fn issuer(&self) -> &Name {
        &self.inner.tbs_certificate.issuer
    }

    /// Whether the certificate carries a CA BasicConstraints extension.
    pub fn is_ca(&self) -> Result<bool> {
        Ok(self
            .extension::<BasicConstraints>()?
            .map(|bc| bc.is_ca)
            .unwrap_or(false))
    }

    /// The Subject Alternative Name extension, if present.
    pub fn subject_alt_names(&self) -> Result<Option<SubjectAltName>> {
        self.extension::<SubjectAltName>()
    }

    /// Looks up and decodes a typed extension by its OID.
    pub fn extension<E: ToAndFromX509Extension>(&self) -> Result<Option<E>> {
        let Some(extensions) = &self.inner.tbs_certificate.extensions else {
            return Ok(None);
        };
        for ext in extensions {
            if ext.extn_id == E::OID {
                return Ok(Some(E::from_x509_extension_value(
                    ext.extn_value.as_bytes(),
                )?));
            }
        }
        Ok(None)
    }

    /// Verifies the SHA-256/RSA-PKCS1v15 signature over the TBS bytes
    /// against the given issuer public key.
    ///
    /// A self-signed certificate verifies against its own key; a
    /// chain-signed one only against its parent's.
    pub fn verify_signed_by(&self, issuer_public_key: &RsaPublicKey) -> Result<()> {
        let tbs_der = self
            .inner
            .tbs_certificate
            .to_der()
            .map_err(|e| CertGenError::Encoding(e.to_string()))?;
        let signature = rsa::pkcs1v15::Signature::try_from(self.inner.signature.raw_bytes())
            .map_err(|e| CertGenError::Verification(e.to_string()))?;
        let verifying_key = VerifyingKey::<Sha256>::new(issuer_public_key.clone());
        verifying_key
            .verify(&tbs_der, &signature)
            .map_err(|e| CertGenError::Verification(e.to_string()))
    }
}
