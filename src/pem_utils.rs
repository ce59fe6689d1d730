use crate::error::Result;

/// Convert DER-encoded data into a PEM-encoded string with the provided
/// label. Output uses LF line endings and the standard 64-column base64
/// wrap, so persisted artifacts round-trip byte-for-byte.
pub fn der_to_pem(der: &[u8], label: &str) -> String {
    let pem = pem::Pem::new(label, der);
    pem::encode_config(
        &pem,
        pem::EncodeConfig::new().set_line_ending(pem::LineEnding::LF),
    )
}

/// Convert a PEM-encoded string into its label and DER-encoded bytes.
pub fn pem_to_der(pem_str: &str) -> Result<(String, Vec<u8>)> {
    let pem = pem::parse(pem_str)?;
    Ok((pem.tag().to_string(), pem.contents().to_vec()))
}
