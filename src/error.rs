// error.rs — Error taxonomy for bundle discovery and case verification
//
// Discovery-time errors abort the affected bundle only. Per-case errors are
// captured in that case's report. A result mismatch is not an error: it is
// the `Failed` outcome in verify::driver.

use std::path::PathBuf;
use thiserror::Error;

pub type HarnessResult<T> = Result<T, HarnessError>;

/// What kind of validation material failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialKind {
    Certificate,
    Crl,
}

impl std::fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MaterialKind::Certificate => f.write_str("certificate"),
            MaterialKind::Crl => f.write_str("CRL"),
        }
    }
}

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("malformed fixture name {name:?}: missing file extension")]
    MalformedFixtureName { name: String },

    #[error("fixture {name:?} declares unknown expected form {label:?}")]
    UnrecognizedExpectedForm { name: String, label: String },

    #[error("cannot decode {kind} {}: {detail}", path.display())]
    Decoding {
        path: PathBuf,
        kind: MaterialKind,
        detail: String,
    },

    #[error("cannot parse signature document {}: {detail}", path.display())]
    DocumentParse { path: PathBuf, detail: String },

    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("identifier resolution failed: {0}")]
    IdentifierResolution(String),

    #[error("no ds:Signature element found in document")]
    SignatureElementMissing,

    #[error("verification error: {0:#}")]
    Verification(anyhow::Error),

    #[error("certificate decoder unavailable: {0}")]
    CertificateDecoderUnavailable(String),

    #[error("document parser unavailable: {0}")]
    DocumentParserUnavailable(String),

    #[error("identifier query does not compile: {0}")]
    QueryCompilation(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl HarnessError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HarnessError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_error_keeps_context_chain() {
        let err = anyhow::anyhow!("path building failed").context("validating signer");
        let msg = HarnessError::Verification(err).to_string();
        assert!(msg.contains("validating signer"));
        assert!(msg.contains("path building failed"));
    }

    #[test]
    fn decoding_error_names_the_material() {
        let err = HarnessError::Decoding {
            path: PathBuf::from("bundle/revoked.crl"),
            kind: MaterialKind::Crl,
            detail: "unexpected tag".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "cannot decode CRL bundle/revoked.crl: unexpected tag"
        );
    }
}
