use std::net::IpAddr;
use std::str::FromStr;

use bon::Builder;
use const_oid::ObjectIdentifier;
use der::flagset::FlagSet;
use time::{Duration, OffsetDateTime};
use x509_cert::ext::pkix::KeyUsages;
use x509_cert::name::Name;

use super::extensions::ToAndFromX509Extension;
pub use crate::cert::extensions::ExtendedKeyUsageOption;
use crate::error::{CertGenError, Result};

/// Distinguished name parameters for building an X.509 certificate.
///
/// # Fields
/// * `common_name` - The common name (CN).
/// * `country` - The country (C).
/// * `state` - The state or province (ST).
/// * `locality` - The locality or city (L).
/// * `organization` - The organization (O).
/// * `organization_unit` - The organizational unit (OU).
#[derive(Clone, Debug, Builder, Default, PartialEq, Eq)]
pub struct DistinguishedName {
    pub common_name: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub locality: Option<String>,
    pub organization: Option<String>,
    pub organization_unit: Option<String>,
}

impl DistinguishedName {
    /// Converts the distinguished name to an X.509-compatible format.
    ///
    /// Absent attributes are omitted rather than encoded as empty strings.
    pub fn as_x509_name(&self) -> Result<Name> {
        let mut parts = Vec::new();
        for (key, value) in [
            ("CN", &self.common_name),
            ("OU", &self.organization_unit),
            ("O", &self.organization),
            ("L", &self.locality),
            ("ST", &self.state),
            ("C", &self.country),
        ] {
            if let Some(value) = value {
                parts.push(format!("{key}={value}"));
            }
        }
        let name = Name::from_str(&parts.join(","))?;
        Ok(name)
    }
}

/// Injectable defaults applied by the template builders.
///
/// Carries the organizational identity and validity window that
/// [`CertTemplate::common`] stamps onto every descriptor, so tests can
/// override identity and validity without touching signing logic.
#[derive(Clone, Debug)]
pub struct TemplateDefaults {
    pub subject: DistinguishedName,
    pub validity: Duration,
}

impl Default for TemplateDefaults {
    fn default() -> Self {
        Self {
            subject: DistinguishedName::builder()
                .country("CN".to_string())
                .organization("2SE".to_string())
                .organization_unit("BOX".to_string())
                .state("Shanghai".to_string())
                .locality("Shanghai".to_string())
                .build(),
            // 100 years. Far too long for a public CA, kept for parity with
            // the private deployments this tool provisions.
            validity: Duration::days(36_500),
        }
    }
}

/// An unsigned certificate descriptor: everything about the certificate
/// except the key it will be bound to and the issuer that will sign it.
#[derive(Clone, Debug)]
pub struct CertTemplate {
    /// Serial number, random 63-bit. Unique per issuing authority only in
    /// expectation; collisions are possible at scale.
    pub serial_number: u64,
    pub subject: DistinguishedName,
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
    pub key_usages: FlagSet<KeyUsages>,
    pub extended_key_usages: Vec<ExtendedKeyUsageOption>,
    pub is_ca: bool,
    /// Whether the BasicConstraints extension is emitted at all. The
    /// builders set this together with `is_ca`; a CA flag without it would
    /// be unenforceable.
    pub basic_constraints_valid: bool,
    pub ip_sans: Vec<IpAddr>,
    pub dns_sans: Vec<String>,
}

impl CertTemplate {
    /// Builds the descriptor shared by all three archetypes: random serial,
    /// the defaults' identity and validity window, client+server extended
    /// key usage and digital-signature/cert-sign key usage.
    pub fn common(defaults: &TemplateDefaults, is_ca: bool) -> Self {
        let not_before = OffsetDateTime::now_utc();
        Self {
            serial_number: rand::random::<u64>() >> 1,
            subject: defaults.subject.clone(),
            not_before,
            not_after: not_before + defaults.validity,
            key_usages: KeyUsages::DigitalSignature | KeyUsages::KeyCertSign,
            extended_key_usages: vec![
                ExtendedKeyUsageOption::ClientAuth,
                ExtendedKeyUsageOption::ServerAuth,
            ],
            is_ca,
            basic_constraints_valid: is_ca,
            ip_sans: Vec::new(),
            dns_sans: Vec::new(),
        }
    }

    /// Server-side descriptor: each host that parses as a literal IP address
    /// becomes an IP SAN, anything else a DNS SAN. Input order is preserved
    /// within each list and nothing is deduplicated.
    pub fn server(defaults: &TemplateDefaults, hosts: &[String]) -> Self {
        let mut template = Self::common(defaults, false);
        for host in hosts {
            match host.parse::<IpAddr>() {
                Ok(ip) => template.ip_sans.push(ip),
                Err(_) => template.dns_sans.push(host.clone()),
            }
        }
        template
    }

    /// Client-side descriptor: no SANs.
    pub fn client(defaults: &TemplateDefaults) -> Self {
        Self::common(defaults, false)
    }
}

/// Represents an X.509 extension as carried on a TBS certificate.
///
/// # Fields
/// * `oid` - The object identifier of the extension.
/// * `critical` - Indicates if the extension is critical.
/// * `value` - The DER-encoded value of the extension.
#[derive(Clone, Debug)]
pub struct ExtensionParam {
    pub oid: ObjectIdentifier,
    pub critical: bool,
    /// DER-encoded extension value
    pub value: Vec<u8>,
}

impl ExtensionParam {
    /// Creates an `ExtensionParam` from a typed extension.
    pub fn from_extension<E: ToAndFromX509Extension>(extension: E, critical: bool) -> Result<Self> {
        let value = extension.to_x509_extension_value()?;
        Ok(Self {
            oid: E::OID,
            critical,
            value,
        })
    }

    /// Decodes an `ExtensionParam` into a typed extension.
    pub fn to_extension<E: ToAndFromX509Extension>(&self) -> Result<E, CertGenError> {
        E::from_x509_extension_value(&self.value)
    }
}
