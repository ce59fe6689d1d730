use der::asn1::{GeneralizedTime, OctetString, UtcTime};
use rsa::RsaPublicKey;
use x509_cert::Version;
use x509_cert::certificate::TbsCertificateInner;
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};

use crate::cert::params::{DistinguishedName, ExtensionParam};
use crate::error::Result;

/// The AlgorithmIdentifier for sha256WithRSAEncryption.
///
/// RFC 4055 requires an explicit NULL parameter here.
pub fn rsa_sha256_signature_algorithm() -> AlgorithmIdentifierOwned {
    AlgorithmIdentifierOwned {
        oid: const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION,
        parameters: Some(der::asn1::Any::from(der::asn1::AnyRef::NULL)),
    }
}

/// Big-endian serial bytes with leading zero octets stripped, as expected by
/// [`SerialNumber::new`]. At least one byte is always kept.
pub(crate) fn serial_to_bytes(serial: u64) -> Vec<u8> {
    let bytes = serial.to_be_bytes();
    let first = bytes
        .iter()
        .position(|b| *b != 0)
        .unwrap_or(bytes.len() - 1);
    bytes[first..].to_vec()
}

/// Represents the "To Be Signed" (TBS) portion of an X.509 certificate: the
/// resolved descriptor fields plus the issuer identity and the subject's
/// freshly generated public key.
pub struct TbsCertificate {
    pub serial_number: u64,
    pub issuer: DistinguishedName,
    pub not_before: time::OffsetDateTime,
    pub not_after: time::OffsetDateTime,
    pub subject: DistinguishedName,
    pub subject_public_key: RsaPublicKey,
    pub extensions: Vec<ExtensionParam>,
}

impl TbsCertificate {
    /// Converts the `TbsCertificate` into a `TbsCertificateInner` for DER
    /// encoding and signing.
    pub fn to_tbs_certificate_inner(&self) -> Result<TbsCertificateInner> {
        let extensions = self
            .extensions
            .iter()
            .map(|ext| {
                Ok(x509_cert::ext::Extension {
                    extn_id: ext.oid,
                    critical: ext.critical,
                    extn_value: OctetString::new(ext.value.clone())?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let validity = x509_cert::time::Validity {
            not_before: encode_time(self.not_before)?,
            not_after: encode_time(self.not_after)?,
        };

        let serial_number = SerialNumber::new(&serial_to_bytes(self.serial_number))?;

        let subject_public_key_info =
            SubjectPublicKeyInfoOwned::from_key(self.subject_public_key.clone())?;

        Ok(TbsCertificateInner {
            version: Version::V3,
            serial_number,
            signature: rsa_sha256_signature_algorithm(),
            issuer: self.issuer.as_x509_name()?,
            validity,
            subject: self.subject.as_x509_name()?,
            subject_public_key_info,
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions: Some(extensions),
        })
    }
}

/// RFC 5280 4.1.2.5: dates through 2049 are UTCTime, 2050 and later are
/// GeneralizedTime. The default 100-year validity lands well past the
/// cutover, so both arms are exercised in practice.
fn encode_time(t: time::OffsetDateTime) -> Result<x509_cert::time::Time> {
    let system_time: std::time::SystemTime = t.into();
    if t.year() < 2050 {
        Ok(x509_cert::time::Time::UtcTime(UtcTime::from_system_time(
            system_time,
        )?))
    } else {
        Ok(x509_cert::time::Time::GeneralTime(
            GeneralizedTime::from_system_time(system_time)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_bytes_strip_leading_zeros() {
        assert_eq!(serial_to_bytes(0), vec![0]);
        assert_eq!(serial_to_bytes(1), vec![1]);
        assert_eq!(serial_to_bytes(0x0100), vec![1, 0]);
        let mut max_63_bit = vec![0xff; 8];
        max_63_bit[0] = 0x7f;
        assert_eq!(serial_to_bytes(u64::MAX >> 1), max_63_bit);
    }

    #[test]
    fn times_cross_the_generalized_time_cutover() {
        // 2030-01-01 and 2130-01-01, either side of the 2050 boundary.
        let before = time::OffsetDateTime::from_unix_timestamp(1_893_456_000).unwrap();
        let after = time::OffsetDateTime::from_unix_timestamp(5_049_129_600).unwrap();
        assert!(matches!(
            encode_time(before).unwrap(),
            x509_cert::time::Time::UtcTime(_)
        ));
        assert!(matches!(
            encode_time(after).unwrap(),
            x509_cert::time::Time::GeneralTime(_)
        ));
    }
}
