use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use x509_cert::crl::CertificateList;
use x509_cert::Certificate;

use crate::bundle::decode::DocumentParser;
use crate::error::HarnessResult;

// ── Expected result ─────────────────────────────────────────────────────────

/// XAdES signature forms a verification run can report.
///
/// Labels are case-sensitive and appear verbatim in fixture names
/// (`sig.X_L.xades`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(non_camel_case_types, clippy::upper_case_acronyms)]
pub enum XadesForm {
    BES,
    EPES,
    T,
    C,
    X,
    X_L,
    A,
}

impl XadesForm {
    pub const ALL: [XadesForm; 7] = [
        XadesForm::BES,
        XadesForm::EPES,
        XadesForm::T,
        XadesForm::C,
        XadesForm::X,
        XadesForm::X_L,
        XadesForm::A,
    ];

    pub fn label(self) -> &'static str {
        match self {
            XadesForm::BES => "BES",
            XadesForm::EPES => "EPES",
            XadesForm::T => "T",
            XadesForm::C => "C",
            XadesForm::X => "X",
            XadesForm::X_L => "X_L",
            XadesForm::A => "A",
        }
    }
}

impl fmt::Display for XadesForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Returned when a label is not one of the known forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownForm(pub String);

impl FromStr for XadesForm {
    type Err = UnknownForm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        XadesForm::ALL
            .iter()
            .copied()
            .find(|form| form.label() == s)
            .ok_or_else(|| UnknownForm(s.to_string()))
    }
}

// ── File roles ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    TrustAnchorCertificate,
    Certificate,
    Crl,
    SignatureDocument,
    Unrecognized,
}

/// Result of classifying one file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub role: FileRole,
    /// Only ever set for signature documents.
    pub expected_form: Option<XadesForm>,
}

// ── Signature document ──────────────────────────────────────────────────────

/// A signature document checked for well-formedness at load time.
///
/// The text is owned so the case stays self-contained; each consumer parses
/// its own tree from it.
#[derive(Debug, Clone)]
pub struct SignatureDocument {
    path: PathBuf,
    text: String,
}

impl SignatureDocument {
    pub(crate) fn new(path: PathBuf, text: String) -> Self {
        SignatureDocument { path, text }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn parse<'a>(&'a self, parser: &DocumentParser) -> HarnessResult<roxmltree::Document<'a>> {
        parser.parse(&self.path, &self.text)
    }
}

// ── Trust material ──────────────────────────────────────────────────────────

/// Running collections of a bundle while its directory is scanned.
#[derive(Debug, Clone, Default)]
pub struct TrustMaterial {
    pub trust_anchors: Vec<Certificate>,
    pub certificates: Vec<Certificate>,
    pub crls: Vec<CertificateList>,
}

// ── Test case ───────────────────────────────────────────────────────────────

/// One signature document plus the validation material it is checked with.
///
/// Built once by the loader and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct TestCase {
    pub signature_document: SignatureDocument,
    pub expected_form: Option<XadesForm>,
    pub trust_anchors: Vec<Certificate>,
    pub certificates: Vec<Certificate>,
    pub crls: Vec<CertificateList>,
    description: String,
}

impl TestCase {
    pub fn new(
        signature_document: SignatureDocument,
        expected_form: Option<XadesForm>,
        material: TrustMaterial,
        description: String,
    ) -> Self {
        TestCase {
            signature_document,
            expected_form,
            trust_anchors: material.trust_anchors,
            certificates: material.certificates,
            crls: material.crls,
            description,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Display for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}
