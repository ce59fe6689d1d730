//! # certgen - A Small Private Certificate Authority
//!
//! certgen issues X.509 certificates and their RSA key pairs for a private
//! CA, built entirely with rustcrypto libraries: a self-signed root
//! certificate, a server certificate with host/IP subject-alternative-names,
//! and a client certificate, each persisted as a PEM certificate file and a
//! PEM PKCS#8 private-key file.
//!
//! ## Key Features
//!
//! - **Template builders**: descriptors for the CA, server, and client
//!   archetypes with security-relevant defaults applied in one place
//! - **Self-signed and chain-signed issuance**: an issuance is either
//!   self-signed or carries both the parent descriptor and the parent key
//! - **Pluggable persistence**: artifacts are written through the
//!   [`store::ArtifactStore`] interface
//! - **Pure Rust**: no OpenSSL dependency (except for testing)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use certgen::cert::params::{CertTemplate, TemplateDefaults};
//! use certgen::issuer::{CertIssuer, IssueMode, IssueRequest, TemplateSource};
//! use certgen::store::DirStore;
//!
//! # fn main() -> Result<(), certgen::error::CertGenError> {
//! let defaults = TemplateDefaults::default();
//! let issuer = CertIssuer::new(DirStore::new("."));
//!
//! // Self-signed root; the returned key signs everything below it.
//! let ca_template = CertTemplate::common(&defaults, true);
//! let ca_key = issuer.issue(
//!     IssueRequest::builder()
//!         .name("ca".to_string())
//!         .template(TemplateSource::Template(ca_template.clone()))
//!         .build(),
//! )?;
//!
//! // Server certificate chained to the root.
//! issuer.issue(
//!     IssueRequest::builder()
//!         .name("server".to_string())
//!         .template(TemplateSource::Template(CertTemplate::server(
//!             &defaults,
//!             &["localhost".to_string(), "127.0.0.1".to_string()],
//!         )))
//!         .mode(IssueMode::ChainSigned {
//!             parent: ca_template,
//!             parent_key: ca_key,
//!         })
//!         .build(),
//! )?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`key`]: RSA key pair generation and PKCS#8 serialization
//! - [`cert`]: certificate templates, extensions, and the signed certificate
//! - [`issuer`]: issue requests and the issuing pipeline
//! - [`store`]: the persistence interface and the filesystem store
//! - [`pem_utils`]: DER/PEM conversion helpers
//! - [`error`]: error types
//! - [`tbs_certificate`]: low-level TBS certificate assembly

pub mod cert;
pub mod error;
pub mod issuer;
pub mod key;
pub mod pem_utils;
pub mod store;
pub mod tbs_certificate;
