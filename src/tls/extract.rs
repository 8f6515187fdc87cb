//! Certificate text rendering.

use std::fmt::Write;
use std::net::IpAddr;

use anyhow::Result;
use chrono::DateTime;
use x509_parser::certificate::X509Certificate;
use x509_parser::extensions::{GeneralName, ParsedExtension};
use x509_parser::time::ASN1Time;

/// Renders a DER certificate as a multi-line description.
///
/// Lists version, serial, signature algorithm, issuer, validity, subject,
/// public key, and each extension.
///
/// # Errors
///
/// Returns an error if the DER bytes are not a certificate.
pub fn certificate_text(der: &[u8]) -> Result<String> {
    let (_, cert) = x509_parser::parse_x509_certificate(der)?;
    let mut out = String::new();

    writeln!(out, "Certificate:")?;
    writeln!(out, "    Version: {}", cert.version().0 + 1)?;
    writeln!(out, "    Serial Number: {}", serial(&cert))?;
    writeln!(
        out,
        "    Signature Algorithm: {}",
        algorithm_name(&cert.signature_algorithm.algorithm.to_id_string())
    )?;
    writeln!(out, "    Issuer: {}", cert.issuer())?;
    writeln!(out, "    Validity:")?;
    writeln!(out, "        Not Before: {}", format_time(&cert.validity().not_before))?;
    writeln!(out, "        Not After : {}", format_time(&cert.validity().not_after))?;
    writeln!(out, "    Subject: {}", cert.subject())?;
    writeln!(out, "    Subject Public Key Info:")?;
    writeln!(out, "        Public Key Algorithm: {}", key_algorithm(&cert))?;
    if let Some(bits) = key_bits(&cert) {
        writeln!(out, "        Public-Key: ({bits} bit)")?;
    }

    let extensions = cert.extensions();
    if !extensions.is_empty() {
        writeln!(out, "    X509v3 extensions:")?;
    }
    for ext in extensions {
        let critical = if ext.critical { " (critical)" } else { "" };
        match ext.parsed_extension() {
            ParsedExtension::SubjectAlternativeName(san) => {
                writeln!(out, "        X509v3 Subject Alternative Name:{critical}")?;
                let names: Vec<String> = san.general_names.iter().map(general_name).collect();
                writeln!(out, "            {}", names.join(", "))?;
            }
            ParsedExtension::KeyUsage(ku) => {
                writeln!(out, "        X509v3 Key Usage:{critical}")?;
                let mut usages = Vec::new();
                if ku.digital_signature() {
                    usages.push("Digital Signature");
                }
                if ku.non_repudiation() {
                    usages.push("Non Repudiation");
                }
                if ku.key_encipherment() {
                    usages.push("Key Encipherment");
                }
                if ku.data_encipherment() {
                    usages.push("Data Encipherment");
                }
                if ku.key_agreement() {
                    usages.push("Key Agreement");
                }
                if ku.key_cert_sign() {
                    usages.push("Certificate Sign");
                }
                if ku.crl_sign() {
                    usages.push("CRL Sign");
                }
                if ku.encipher_only() {
                    usages.push("Encipher Only");
                }
                if ku.decipher_only() {
                    usages.push("Decipher Only");
                }
                writeln!(out, "            {}", usages.join(", "))?;
            }
            ParsedExtension::ExtendedKeyUsage(eku) => {
                writeln!(out, "        X509v3 Extended Key Usage:{critical}")?;
                let mut purposes: Vec<String> = Vec::new();
                if eku.any {
                    purposes.push("Any Extended Key Usage".to_string());
                }
                if eku.server_auth {
                    purposes.push("TLS Web Server Authentication".to_string());
                }
                if eku.client_auth {
                    purposes.push("TLS Web Client Authentication".to_string());
                }
                if eku.code_signing {
                    purposes.push("Code Signing".to_string());
                }
                if eku.email_protection {
                    purposes.push("E-mail Protection".to_string());
                }
                if eku.time_stamping {
                    purposes.push("Time Stamping".to_string());
                }
                if eku.ocsp_signing {
                    purposes.push("OCSP Signing".to_string());
                }
                purposes.extend(eku.other.iter().map(|oid| oid.to_id_string()));
                writeln!(out, "            {}", purposes.join(", "))?;
            }
            ParsedExtension::BasicConstraints(bc) => {
                writeln!(out, "        X509v3 Basic Constraints:{critical}")?;
                match bc.path_len_constraint {
                    Some(len) => writeln!(out, "            CA:{}, pathlen:{len}", upper(bc.ca))?,
                    None => writeln!(out, "            CA:{}", upper(bc.ca))?,
                }
            }
            ParsedExtension::CertificatePolicies(policies) => {
                writeln!(out, "        X509v3 Certificate Policies:{critical}")?;
                for policy in policies.iter() {
                    writeln!(out, "            Policy: {}", policy.policy_id.to_id_string())?;
                }
            }
            ParsedExtension::SubjectKeyIdentifier(id) => {
                writeln!(out, "        X509v3 Subject Key Identifier:{critical}")?;
                writeln!(out, "            {}", hex(id.0))?;
            }
            ParsedExtension::AuthorityKeyIdentifier(aki) => {
                writeln!(out, "        X509v3 Authority Key Identifier:{critical}")?;
                if let Some(id) = &aki.key_identifier {
                    writeln!(out, "            {}", hex(id.0))?;
                }
            }
            _ => {
                writeln!(out, "        {}:{critical}", ext.oid.to_id_string())?;
                writeln!(out, "            {}", hex(ext.value))?;
            }
        }
    }

    Ok(out)
}

/// Renders a DER certificate as a short summary.
///
/// The first line gives the key type, size and serial; the following lines
/// give subject (with SANs), issuer and validity.
///
/// # Errors
///
/// Returns an error if the DER bytes are not a certificate.
pub fn certificate_short_text(der: &[u8]) -> Result<String> {
    let (_, cert) = x509_parser::parse_x509_certificate(der)?;
    let mut out = String::new();

    match key_bits(&cert) {
        Some(bits) => writeln!(
            out,
            "{} {bits} bits; serial {}",
            key_algorithm(&cert),
            serial(&cert)
        )?,
        None => writeln!(out, "{}; serial {}", key_algorithm(&cert), serial(&cert))?,
    }

    write!(out, "Subject: {}", cert.subject())?;
    let sans = subject_alt_names(&cert);
    if !sans.is_empty() {
        write!(out, ", SANs: {}", sans.join(", "))?;
    }
    writeln!(out)?;
    writeln!(out, "Issuer: {}", cert.issuer())?;
    writeln!(
        out,
        "Validity: {} - {}",
        format_time(&cert.validity().not_before),
        format_time(&cert.validity().not_after)
    )?;

    Ok(out)
}

fn serial(cert: &X509Certificate<'_>) -> String {
    let raw = cert.raw_serial_as_string();
    if raw.is_empty() {
        "0".to_string()
    } else {
        raw
    }
}

fn subject_alt_names(cert: &X509Certificate<'_>) -> Vec<String> {
    cert.extensions()
        .iter()
        .filter_map(|ext| match ext.parsed_extension() {
            ParsedExtension::SubjectAlternativeName(san) => Some(san),
            _ => None,
        })
        .flat_map(|san| san.general_names.iter().map(general_name))
        .collect()
}

fn general_name(name: &GeneralName<'_>) -> String {
    match name {
        GeneralName::DNSName(dns) => format!("DNS:{dns}"),
        GeneralName::RFC822Name(email) => format!("email:{email}"),
        GeneralName::URI(uri) => format!("URI:{uri}"),
        GeneralName::IPAddress(bytes) => match ip_from_bytes(bytes) {
            Some(ip) => format!("IP:{ip}"),
            None => format!("IP:{}", hex(bytes)),
        },
        GeneralName::DirectoryName(dn) => format!("DirName:{dn}"),
        other => format!("{other:?}"),
    }
}

fn ip_from_bytes(bytes: &[u8]) -> Option<IpAddr> {
    match bytes.len() {
        4 => <[u8; 4]>::try_from(bytes).ok().map(IpAddr::from),
        16 => <[u8; 16]>::try_from(bytes).ok().map(IpAddr::from),
        _ => None,
    }
}

fn key_algorithm(cert: &X509Certificate<'_>) -> String {
    let oid = cert.public_key().algorithm.algorithm.to_id_string();
    match oid.as_str() {
        "1.2.840.113549.1.1.1" => "RSA".to_string(),
        "1.2.840.10045.2.1" => "ECDSA".to_string(),
        "1.3.101.112" => "Ed25519".to_string(),
        "1.3.101.113" => "Ed448".to_string(),
        _ => oid,
    }
}

fn key_bits(cert: &X509Certificate<'_>) -> Option<usize> {
    cert.public_key()
        .parsed()
        .ok()
        .map(|key| key.key_size())
        .filter(|bits| *bits > 0)
}

fn algorithm_name(oid: &str) -> String {
    match oid {
        "1.2.840.113549.1.1.5" => "sha1WithRSAEncryption",
        "1.2.840.113549.1.1.11" => "sha256WithRSAEncryption",
        "1.2.840.113549.1.1.12" => "sha384WithRSAEncryption",
        "1.2.840.113549.1.1.13" => "sha512WithRSAEncryption",
        "1.2.840.113549.1.1.10" => "rsassaPss",
        "1.2.840.10045.4.3.2" => "ecdsa-with-SHA256",
        "1.2.840.10045.4.3.3" => "ecdsa-with-SHA384",
        "1.2.840.10045.4.3.4" => "ecdsa-with-SHA512",
        "1.3.101.112" => "ED25519",
        "1.3.101.113" => "ED448",
        other => return other.to_string(),
    }
    .to_string()
}

fn format_time(time: &ASN1Time) -> String {
    DateTime::from_timestamp(time.timestamp(), 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| time.to_string())
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(":")
}

fn upper(flag: bool) -> &'static str {
    if flag {
        "TRUE"
    } else {
        "FALSE"
    }
}
