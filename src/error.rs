//! use certgen::error::CertGenError;

use std::io;

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = CertGenError> = std::result::Result<T, E>;

/// Represents errors that can occur while issuing certificates.
///
/// The issuance pipeline surfaces the first error it encounters and performs
/// no further work in that call; nothing is retried or rolled back.
#[derive(Debug, Error)]
pub enum CertGenError {
    /// No issue request was supplied at all.
    #[error("no issue request supplied")]
    NoOptions,

    /// The issue request carries an empty artifact name.
    #[error("issue request has an empty artifact name")]
    NoName,

    /// The issue request carries no certificate template source.
    #[error("issue request carries no certificate template")]
    NoTemplate,

    /// RSA key generation failed.
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    /// Signing the certificate failed.
    #[error("certificate signing failed: {0}")]
    Signing(String),

    /// Verifying a certificate signature against a public key failed.
    ///
    /// Produced by [`crate::cert::Certificate::verify_signed_by`] when
    /// checking an already-issued certificate; issuance itself never returns
    /// this kind.
    #[error("certificate verification failed: {0}")]
    Verification(String),

    /// Serializing the private key to PKCS#8 failed.
    #[error("private key serialization failed: {0}")]
    KeySerialization(String),

    /// Writing an artifact to the store failed.
    #[error("failed to persist {path}: {source}")]
    Persistence {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Error during data encoding.
    #[error("failed to encode data: {0}")]
    Encoding(String),

    /// Error during data decoding.
    #[error("failed to decode data: {0}")]
    Decoding(String),

    /// Error due to invalid input.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<der::Error> for CertGenError {
    fn from(err: der::Error) -> Self {
        CertGenError::Decoding(err.to_string())
    }
}

impl From<x509_cert::spki::Error> for CertGenError {
    fn from(err: x509_cert::spki::Error) -> Self {
        CertGenError::Encoding(err.to_string())
    }
}

impl From<pem::PemError> for CertGenError {
    fn from(err: pem::PemError) -> Self {
        CertGenError::Decoding(err.to_string())
    }
}
