//! certgen CLI.
//!
//! Issues a private CA root, a server certificate, and a client certificate
//! into an output directory, then shells out to the `openssl` tool to
//! produce the binary (DER) forms and a password-less PKCS#12 bundle for the
//! client.

use std::path::PathBuf;
use std::process::Command;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use certgen::cert::params::{CertTemplate, TemplateDefaults};
use certgen::issuer::{CertIssuer, IssueMode, IssueRequest, TemplateSource};
use certgen::store::DirStore;

#[derive(Debug, Parser)]
#[command(name = "certgen")]
#[command(about = "Generate a private CA with server and client certificates", long_about = None)]
struct Cli {
    /// Server certificate host, repeatable (DNS name or IP address).
    /// Defaults to localhost and 127.0.0.1 when none given.
    #[arg(long = "host")]
    hosts: Vec<String>,

    /// RSA key strength in bits
    #[arg(long, default_value_t = 2048)]
    bits: usize,

    /// Output directory for the generated artifacts
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let hosts = if cli.hosts.is_empty() {
        vec!["localhost".to_string(), "127.0.0.1".to_string()]
    } else {
        cli.hosts
    };

    ensure_openssl()?;

    std::fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("creating output directory {}", cli.out_dir.display()))?;
    let issuer = CertIssuer::new(DirStore::new(&cli.out_dir));
    let defaults = TemplateDefaults::default();

    let ca_template = CertTemplate::common(&defaults, true);
    let ca_key = issuer
        .issue(
            IssueRequest::builder()
                .name("ca".to_string())
                .template(TemplateSource::Template(ca_template.clone()))
                .key_strength(cli.bits)
                .build(),
        )
        .context("issuing CA certificate")?;
    convert_to_der(&cli.out_dir, "ca")?;

    issuer
        .issue(
            IssueRequest::builder()
                .name("server".to_string())
                .template(TemplateSource::Template(CertTemplate::server(
                    &defaults, &hosts,
                )))
                .mode(IssueMode::ChainSigned {
                    parent: ca_template.clone(),
                    parent_key: ca_key.clone(),
                })
                .key_strength(cli.bits)
                .build(),
        )
        .context("issuing server certificate")?;
    convert_to_der(&cli.out_dir, "server")?;

    let client_defaults = defaults.clone();
    issuer
        .issue(
            IssueRequest::builder()
                .name("client".to_string())
                .template(TemplateSource::Builder(Box::new(move || {
                    CertTemplate::client(&client_defaults)
                })))
                .mode(IssueMode::ChainSigned {
                    parent: ca_template,
                    parent_key: ca_key,
                })
                .key_strength(cli.bits)
                .build(),
        )
        .context("issuing client certificate")?;
    convert_to_der(&cli.out_dir, "client")?;
    package_pkcs12(&cli.out_dir)?;

    Ok(())
}

fn ensure_openssl() -> Result<()> {
    Command::new("openssl")
        .arg("version")
        .output()
        .context("the openssl tool was not found on this system; install it first")?;
    Ok(())
}

/// `openssl x509 -outform der -in <name>.pem -out <name>.der`
fn convert_to_der(dir: &PathBuf, name: &str) -> Result<()> {
    let status = Command::new("openssl")
        .current_dir(dir)
        .args(["x509", "-outform", "der"])
        .args(["-in", &format!("{name}.pem")])
        .args(["-out", &format!("{name}.der")])
        .status()
        .context("invoking openssl x509")?;
    if !status.success() {
        bail!("openssl x509 failed for {name}.pem ({status})");
    }
    Ok(())
}

/// `openssl pkcs12 -export -clcerts` with empty passwords, bundling the
/// client certificate and key into client.p12.
fn package_pkcs12(dir: &PathBuf) -> Result<()> {
    let status = Command::new("openssl")
        .current_dir(dir)
        .args(["pkcs12", "-export", "-clcerts"])
        .args(["-inkey", "client.key"])
        .args(["-passin", "pass:", "-password", "pass:"])
        .args(["-in", "client.pem"])
        .args(["-out", "client.p12"])
        .status()
        .context("invoking openssl pkcs12")?;
    if !status.success() {
        bail!("openssl pkcs12 failed ({status})");
    }
    Ok(())
}
