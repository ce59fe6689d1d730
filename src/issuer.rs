use std::fmt;

use bon::Builder;
use der::Encode;
use rsa::RsaPublicKey;
use rsa::pkcs1v15::SigningKey;
use rsa::signature::{SignatureEncoding, Signer};
use sha1::Sha1;
use sha2::Sha256;
use tracing::{debug, info};
use x509_cert::certificate::CertificateInner;
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use crate::cert::Certificate;
use crate::cert::extensions::{
    AuthorityKeyIdentifier, BasicConstraints, ExtendedKeyUsage, KeyUsage, SubjectAltName,
};
use crate::cert::params::{CertTemplate, ExtensionParam};
use crate::error::{CertGenError, Result};
use crate::key::{KeyPair, resolve_key_bits};
use crate::store::{ArtifactKind, ArtifactStore};
use crate::tbs_certificate::{TbsCertificate, rsa_sha256_signature_algorithm};

/// One source for the certificate descriptor of an issue request: either a
/// pre-built template or a function producing one on demand.
pub enum TemplateSource {
    Template(CertTemplate),
    Builder(Box<dyn Fn() -> CertTemplate + Send + Sync>),
}

impl TemplateSource {
    /// Resolves to a concrete descriptor, invoking the builder at most once.
    fn resolve(self) -> CertTemplate {
        match self {
            TemplateSource::Template(template) => template,
            TemplateSource::Builder(build) => build(),
        }
    }
}

impl From<CertTemplate> for TemplateSource {
    fn from(template: CertTemplate) -> Self {
        TemplateSource::Template(template)
    }
}

impl fmt::Debug for TemplateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateSource::Template(template) => {
                f.debug_tuple("Template").field(template).finish()
            }
            TemplateSource::Builder(_) => f.debug_tuple("Builder").finish(),
        }
    }
}

/// How the new certificate is signed.
///
/// A chain-signed certificate always carries both the parent descriptor and
/// the parent key; a parent certificate without its key (or vice versa) is
/// unrepresentable.
#[derive(Debug, Clone, Default)]
pub enum IssueMode {
    /// The certificate is its own issuer, signed with its own fresh key.
    #[default]
    SelfSigned,
    /// Signed with the parent's key; issuer identity taken from the parent
    /// descriptor.
    ChainSigned {
        parent: CertTemplate,
        parent_key: KeyPair,
    },
}

/// The aggregate input to [`CertIssuer::issue`].
#[derive(Builder)]
pub struct IssueRequest {
    /// Base name for the output artifacts (`<name>.pem` / `<name>.key`).
    pub name: String,
    /// The descriptor source; absent is a configuration error.
    pub template: Option<TemplateSource>,
    #[builder(default)]
    pub mode: IssueMode,
    /// RSA strength override in bits. Absent or zero resolves to the
    /// default.
    pub key_strength: Option<usize>,
}

/// Turns issue requests into persisted certificate/key artifact pairs.
///
/// Stateless across calls; each `issue` invocation is an independent
/// transaction that validates, resolves defaults, generates a key, signs,
/// serializes, and persists, stopping at the first failure.
#[derive(Debug, Clone)]
pub struct CertIssuer<S: ArtifactStore> {
    store: S,
}

impl<S: ArtifactStore> CertIssuer<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Issues a certificate and its key pair, persists both, and returns the
    /// freshly generated key so it can serve as the parent key for
    /// subsequent issuances.
    ///
    /// Passing `None` yields [`CertGenError::NoOptions`]; an empty name
    /// [`CertGenError::NoName`]; a request without a template source
    /// [`CertGenError::NoTemplate`]. All validation happens before any key
    /// is generated.
    pub fn issue(&self, request: impl Into<Option<IssueRequest>>) -> Result<KeyPair> {
        let request = request.into().ok_or(CertGenError::NoOptions)?;
        if request.name.is_empty() {
            return Err(CertGenError::NoName);
        }
        let template = request.template.ok_or(CertGenError::NoTemplate)?.resolve();

        let bits = resolve_key_bits(request.key_strength);
        debug!(name = %request.name, bits, "generating RSA key pair");
        let key = KeyPair::generate(bits)?;

        let (issuer_template, signing_key) = match &request.mode {
            IssueMode::SelfSigned => (&template, &key),
            IssueMode::ChainSigned { parent, parent_key } => (parent, parent_key),
        };

        debug!(name = %request.name, serial = template.serial_number, "signing certificate");
        let certificate = sign_certificate(&template, issuer_template, key.public(), signing_key)?;
        let cert_der = certificate.to_der()?;
        let key_der = key.to_pkcs8_der()?;

        self.store
            .save(&request.name, ArtifactKind::Certificate, &cert_der)?;
        self.store
            .save(&request.name, ArtifactKind::PrivateKey, &key_der)?;
        info!(name = %request.name, "issued certificate and private key");

        Ok(key)
    }
}

/// Signs `template` with `signing_key`, binding `subject_public_key` as the
/// subject key and taking the issuer identity from `issuer_template`. For
/// self-signed certificates both templates are the same descriptor.
fn sign_certificate(
    template: &CertTemplate,
    issuer_template: &CertTemplate,
    subject_public_key: &RsaPublicKey,
    signing_key: &KeyPair,
) -> Result<Certificate> {
    let mut extensions = Vec::new();

    if template.basic_constraints_valid {
        extensions.push(ExtensionParam::from_extension(
            BasicConstraints {
                is_ca: template.is_ca,
                max_path_length: None,
            },
            true,
        )?);
    }

    if !template.key_usages.is_empty() {
        extensions.push(ExtensionParam::from_extension(
            KeyUsage(template.key_usages),
            true,
        )?);
    }

    if !template.extended_key_usages.is_empty() {
        extensions.push(ExtensionParam::from_extension(
            ExtendedKeyUsage {
                usage: template.extended_key_usages.clone(),
            },
            false,
        )?);
    }

    let san = SubjectAltName {
        dns_names: template.dns_sans.clone(),
        ip_addresses: template.ip_sans.clone(),
    };
    if !san.is_empty() {
        extensions.push(ExtensionParam::from_extension(san, false)?);
    }

    // Key identifier of the signer, SHA-1 over its SPKI bits.
    let signer_spki = SubjectPublicKeyInfoOwned::from_key(signing_key.public().clone())?;
    let key_id = <Sha1 as sha1::Digest>::digest(signer_spki.subject_public_key.raw_bytes());
    extensions.push(ExtensionParam::from_extension(
        AuthorityKeyIdentifier {
            key_identifier: key_id.to_vec(),
        },
        false,
    )?);

    let tbs_cert = TbsCertificate {
        serial_number: template.serial_number,
        issuer: issuer_template.subject.clone(),
        not_before: template.not_before,
        not_after: template.not_after,
        subject: template.subject.clone(),
        subject_public_key: subject_public_key.clone(),
        extensions,
    };

    let tbs_cert_inner = tbs_cert.to_tbs_certificate_inner()?;
    let tbs_der = tbs_cert_inner
        .to_der()
        .map_err(|e| CertGenError::Encoding(e.to_string()))?;

    let signer: SigningKey<Sha256> = SigningKey::new(signing_key.private().clone());
    let signature = signer
        .try_sign(&tbs_der)
        .map_err(|e| CertGenError::Signing(e.to_string()))?;

    let cert_inner = CertificateInner {
        tbs_certificate: tbs_cert_inner,
        signature_algorithm: rsa_sha256_signature_algorithm(),
        signature: der::asn1::BitString::from_bytes(&signature.to_vec())
            .map_err(|e| CertGenError::Signing(e.to_string()))?,
    };

    Ok(Certificate { inner: cert_inner })
}
