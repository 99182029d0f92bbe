// config.rs — Fixture naming conventions and loader limits
//
// Every field has a default matching the bundle layout documented in
// tests/fixtures/verification/README.md, so an empty JSON object is a valid
// configuration. Values are checked when components are built from them
// (FileRules, CertificateDecoder, DocumentParser, IdQuery), not here.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{HarnessError, HarnessResult};

/// How trust material is gathered for the signature documents of a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Accumulation {
    /// Collect all material in the directory first, then build every case
    /// from the complete set. Independent of directory listing order.
    #[default]
    Complete,
    /// Single pass in raw listing order; each case only sees material from
    /// files listed before its signature document.
    ListingOrder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub certificate_extensions: Vec<String>,
    pub crl_extensions: Vec<String>,
    pub signature_extensions: Vec<String>,
    pub trust_anchor_prefix: String,
    pub excluded_bundle_prefix: String,
    pub id_attributes: Vec<String>,
    pub accumulation: Accumulation,
    pub max_document_nodes: u32,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        HarnessConfig {
            certificate_extensions: vec!["cer".to_string(), "crt".to_string()],
            crl_extensions: vec!["crl".to_string()],
            signature_extensions: vec!["xml".to_string(), "xades".to_string()],
            trust_anchor_prefix: "root".to_string(),
            excluded_bundle_prefix: "_".to_string(),
            id_attributes: vec!["Id".to_string(), "id".to_string()],
            accumulation: Accumulation::Complete,
            max_document_nodes: 1_000_000,
        }
    }
}

impl HarnessConfig {
    /// Read a configuration file. Missing fields take their defaults.
    pub fn load(path: &Path) -> HarnessResult<Self> {
        let data = fs::read_to_string(path).map_err(|e| HarnessError::io(path, e))?;
        serde_json::from_str(&data)
            .map_err(|e| HarnessError::Config(format!("parsing {}: {}", path.display(), e)))
    }

    /// Load from `path` when given, otherwise use the defaults.
    pub fn load_or_default(path: Option<&Path>) -> HarnessResult<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config: HarnessConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, HarnessConfig::default());
    }

    #[test]
    fn accumulation_uses_kebab_case() {
        let config: HarnessConfig =
            serde_json::from_str(r#"{"accumulation":"listing-order"}"#).unwrap();
        assert_eq!(config.accumulation, Accumulation::ListingOrder);
        assert_eq!(config.trust_anchor_prefix, "root");
    }

    #[test]
    fn load_reads_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("harness.json");
        fs::write(&path, r#"{"trust_anchor_prefix":"ta-","max_document_nodes":10}"#).unwrap();

        let config = HarnessConfig::load(&path).unwrap();
        assert_eq!(config.trust_anchor_prefix, "ta-");
        assert_eq!(config.max_document_nodes, 10);
        assert_eq!(config.id_attributes, vec!["Id", "id"]);
    }

    #[test]
    fn load_rejects_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("harness.json");
        fs::write(&path, "{not json").unwrap();

        let err = HarnessConfig::load(&path).unwrap_err();
        assert!(matches!(err, HarnessError::Config(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = HarnessConfig::load(Path::new("/nonexistent/harness.json")).unwrap_err();
        assert!(matches!(err, HarnessError::Io { .. }));
    }
}
