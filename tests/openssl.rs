mod util;

use std::fs;
use std::process::Command;

use regex::Regex;

use certgen::cert::Certificate;
use certgen::cert::params::{CertTemplate, TemplateDefaults};
use certgen::issuer::{CertIssuer, IssueMode, IssueRequest, TemplateSource};
use certgen::store::ArtifactKind;

use util::MemoryStore;

fn issue_ca_and_server() -> (Certificate, Certificate) {
    let defaults = TemplateDefaults::default();
    let issuer = CertIssuer::new(MemoryStore::new());

    let ca_template = CertTemplate::common(&defaults, true);
    let ca_key = issuer
        .issue(
            IssueRequest::builder()
                .name("ca".to_string())
                .template(TemplateSource::Template(ca_template.clone()))
                .key_strength(1024)
                .build(),
        )
        .unwrap();

    issuer
        .issue(
            IssueRequest::builder()
                .name("server".to_string())
                .template(TemplateSource::Template(CertTemplate::server(
                    &defaults,
                    &["localhost".to_string(), "127.0.0.1".to_string()],
                )))
                .mode(IssueMode::ChainSigned {
                    parent: ca_template,
                    parent_key: ca_key,
                })
                .key_strength(1024)
                .build(),
        )
        .unwrap();

    let ca = Certificate::from_der(&issuer.store().get("ca", ArtifactKind::Certificate).unwrap())
        .unwrap();
    let server = Certificate::from_der(
        &issuer
            .store()
            .get("server", ArtifactKind::Certificate)
            .unwrap(),
    )
    .unwrap();
    (ca, server)
}

#[test]
fn test_openssl_crate_validate_chain() {
    let (ca, server) = issue_ca_and_server();

    use openssl::x509::X509;
    let ca_x509 = X509::from_der(&ca.to_der().unwrap()).expect("openssl rejected CA DER");
    let server_x509 =
        X509::from_der(&server.to_der().unwrap()).expect("openssl rejected server DER");

    // The server certificate chains to the CA.
    let ca_public = ca_x509.public_key().unwrap();
    assert!(
        server_x509.verify(&ca_public).unwrap(),
        "server certificate does not verify against the CA key"
    );
    // And a self-signed root verifies against itself.
    assert!(ca_x509.verify(&ca_public).unwrap());

    // Organization from the default identity.
    let org = ca_x509
        .subject_name()
        .entries_by_nid(openssl::nid::Nid::ORGANIZATIONNAME)
        .next()
        .expect("missing O attribute")
        .data()
        .as_utf8()
        .unwrap();
    assert_eq!(org.to_string(), "2SE");

    // SANs survive the encode: one DNS name, one IP, in order.
    let sans = server_x509
        .subject_alt_names()
        .expect("server certificate has no SANs");
    let dns: Vec<_> = sans.iter().filter_map(|gn| gn.dnsname().map(str::to_string)).collect();
    let ips: Vec<_> = sans.iter().filter_map(|gn| gn.ipaddress().map(<[u8]>::to_vec)).collect();
    assert_eq!(dns, vec!["localhost".to_string()]);
    assert_eq!(ips, vec![vec![127, 0, 0, 1]]);
}

/// Requires the openssl CLI on the host; run with `cargo test -- --ignored`.
#[test]
#[ignore]
fn test_openssl_cli_validate_cert() {
    let (_, server) = issue_ca_and_server();

    let dir = util::scratch_dir("openssl-cli");
    let cert_path = dir.join("server.pem");
    fs::write(&cert_path, server.to_pem().unwrap()).expect("failed to write server certificate");

    let output = Command::new("openssl")
        .arg("x509")
        .arg("-in")
        .arg(&cert_path)
        .arg("-noout")
        .arg("-text")
        .output()
        .expect("failed to execute openssl");

    assert!(
        output.status.success(),
        "openssl command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let output_text = String::from_utf8_lossy(&output.stdout);
    assert!(output_text.contains("Version: 3 (0x2)"));
    assert!(output_text.contains("sha256WithRSAEncryption"));
    assert!(output_text.contains("localhost"));

    let not_before_regex = Regex::new(r"Not Before: .+").unwrap();
    let not_after_regex = Regex::new(r"Not After : .+").unwrap();
    assert!(not_before_regex.is_match(&output_text));
    assert!(not_after_regex.is_match(&output_text));

    fs::remove_dir_all(&dir).ok();
}
