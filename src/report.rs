// report.rs — Serializable views of discovered bundles and contexts
//
// Used by the CLI for `bundles list --json` and `bundles inspect`. Material
// is summarized (subject, issuer, serial, SHA-256 over DER) rather than
// embedded.

use serde::Serialize;
use std::path::Path;
use x509_cert::crl::CertificateList;
use x509_cert::Certificate;

use crate::bundle::load::BundleLoad;
use crate::bundle::model::{TestCase, XadesForm};
use crate::config::Accumulation;
use crate::hash;
use crate::verify::context::{Material, ValidationContext};

// ── Material ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CertificateSummary {
    pub subject: String,
    pub issuer: String,
    pub serial: String,
    pub sha256: String,
}

impl CertificateSummary {
    pub fn new(cert: &Certificate) -> Result<Self, der::Error> {
        let tbs = &cert.tbs_certificate;
        Ok(CertificateSummary {
            subject: tbs.subject.to_string(),
            issuer: tbs.issuer.to_string(),
            serial: hash::hex_encode(tbs.serial_number.as_bytes()),
            sha256: hash::fingerprint(cert)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CrlSummary {
    pub issuer: String,
    pub revoked: usize,
    pub sha256: String,
}

impl CrlSummary {
    pub fn new(crl: &CertificateList) -> Result<Self, der::Error> {
        let tbs = &crl.tbs_cert_list;
        Ok(CrlSummary {
            issuer: tbs.issuer.to_string(),
            revoked: tbs.revoked_certificates.as_ref().map_or(0, Vec::len),
            sha256: hash::fingerprint(crl)?,
        })
    }
}

// ── Discovery ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct DiscoveryReport {
    pub generated_at: String,
    pub root: String,
    pub accumulation: Accumulation,
    pub bundles: Vec<BundleReport>,
}

#[derive(Debug, Serialize)]
pub struct BundleReport {
    pub name: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub cases: Vec<CaseSummary>,
}

#[derive(Debug, Serialize)]
pub struct CaseSummary {
    pub description: String,
    pub document: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_form: Option<XadesForm>,
    pub revocation_enabled: bool,
    pub trust_anchors: Vec<CertificateSummary>,
    pub certificates: Vec<CertificateSummary>,
    pub crls: Vec<CrlSummary>,
}

impl CaseSummary {
    pub fn new(case: &TestCase) -> Result<Self, der::Error> {
        Ok(CaseSummary {
            description: case.description().to_string(),
            document: case.signature_document.path().display().to_string(),
            expected_form: case.expected_form,
            revocation_enabled: !case.crls.is_empty(),
            trust_anchors: case
                .trust_anchors
                .iter()
                .map(CertificateSummary::new)
                .collect::<Result<_, _>>()?,
            certificates: case
                .certificates
                .iter()
                .map(CertificateSummary::new)
                .collect::<Result<_, _>>()?,
            crls: case
                .crls
                .iter()
                .map(CrlSummary::new)
                .collect::<Result<_, _>>()?,
        })
    }
}

impl DiscoveryReport {
    pub fn new(
        root: &Path,
        accumulation: Accumulation,
        bundles: &[BundleLoad],
    ) -> Result<Self, der::Error> {
        let mut reports = Vec::with_capacity(bundles.len());
        for bundle in bundles {
            reports.push(BundleReport {
                name: bundle.name.clone(),
                path: bundle.path.display().to_string(),
                error: bundle.result.as_ref().err().map(|e| e.to_string()),
                cases: bundle
                    .cases()
                    .iter()
                    .map(CaseSummary::new)
                    .collect::<Result<_, _>>()?,
            });
        }

        Ok(DiscoveryReport {
            generated_at: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            root: root.display().to_string(),
            accumulation,
            bundles: reports,
        })
    }

    pub fn failed_bundles(&self) -> usize {
        self.bundles.iter().filter(|b| b.error.is_some()).count()
    }
}

// ── Validation context ──────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AnchorEntry {
    pub alias: String,
    pub certificate: CertificateSummary,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MaterialEntry {
    Certificate(CertificateSummary),
    Crl(CrlSummary),
}

#[derive(Debug, Serialize)]
pub struct ContextReport {
    pub description: String,
    pub revocation_enabled: bool,
    pub trust_anchors: Vec<AnchorEntry>,
    pub material: Vec<MaterialEntry>,
}

impl ContextReport {
    pub fn new(case: &TestCase, context: &ValidationContext) -> Result<Self, der::Error> {
        let trust_anchors = context
            .trust_anchors
            .iter()
            .map(|(alias, cert)| -> Result<AnchorEntry, der::Error> {
                Ok(AnchorEntry {
                    alias: alias.to_string(),
                    certificate: CertificateSummary::new(cert)?,
                })
            })
            .collect::<Result<_, _>>()?;

        let material = context
            .material
            .iter()
            .map(|m| match m {
                Material::Certificate(c) => {
                    CertificateSummary::new(c).map(MaterialEntry::Certificate)
                }
                Material::Crl(c) => CrlSummary::new(c).map(MaterialEntry::Crl),
            })
            .collect::<Result<_, _>>()?;

        Ok(ContextReport {
            description: case.description().to_string(),
            revocation_enabled: context.revocation_enabled,
            trust_anchors,
            material,
        })
    }
}
