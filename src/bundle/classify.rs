// classify.rs — File role inference from fixture names
//
// Naming micro-format:
//   <base>.<ext>                 certificate, CRL or signature document
//   <base>.<FORM>.<ext>          signature document expected to verify as FORM
//   root*.<cert ext>             trust anchor
//
// Classification is a pure function of the name; no file is opened here.

use std::collections::HashSet;

use crate::bundle::model::{Classification, FileRole, XadesForm};
use crate::config::HarnessConfig;
use crate::error::{HarnessError, HarnessResult};

#[derive(Debug, Clone)]
pub struct FileRules {
    certificate_extensions: Vec<String>,
    crl_extensions: Vec<String>,
    signature_extensions: Vec<String>,
    trust_anchor_prefix: String,
}

impl Default for FileRules {
    fn default() -> Self {
        let config = HarnessConfig::default();
        FileRules {
            certificate_extensions: config.certificate_extensions,
            crl_extensions: config.crl_extensions,
            signature_extensions: config.signature_extensions,
            trust_anchor_prefix: config.trust_anchor_prefix,
        }
    }
}

impl FileRules {
    pub fn from_config(config: &HarnessConfig) -> HarnessResult<Self> {
        if config.trust_anchor_prefix.is_empty() {
            return Err(HarnessError::Config(
                "trust_anchor_prefix must not be empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for ext in config
            .certificate_extensions
            .iter()
            .chain(&config.crl_extensions)
            .chain(&config.signature_extensions)
        {
            if ext.is_empty() || ext.contains('.') {
                return Err(HarnessError::Config(format!("invalid extension {:?}", ext)));
            }
            if !seen.insert(ext.as_str()) {
                return Err(HarnessError::Config(format!(
                    "extension {:?} is assigned to more than one role",
                    ext
                )));
            }
        }

        Ok(FileRules {
            certificate_extensions: config.certificate_extensions.clone(),
            crl_extensions: config.crl_extensions.clone(),
            signature_extensions: config.signature_extensions.clone(),
            trust_anchor_prefix: config.trust_anchor_prefix.clone(),
        })
    }

    /// Classify a file by name.
    ///
    /// Fails with `MalformedFixtureName` when the name has no extension and
    /// with `UnrecognizedExpectedForm` when a signature document carries a
    /// label that is not a known form.
    pub fn classify(&self, name: &str) -> HarnessResult<Classification> {
        let mut parts: Vec<&str> = name.split('.').collect();
        // "foo." has no extension, same as "foo"
        while parts.last().is_some_and(|p| p.is_empty()) {
            parts.pop();
        }
        if parts.len() < 2 {
            return Err(HarnessError::MalformedFixtureName {
                name: name.to_string(),
            });
        }

        let ext = parts[parts.len() - 1];
        let matches = |exts: &[String]| exts.iter().any(|e| e == ext);

        let role = if matches(&self.certificate_extensions) {
            if name.starts_with(&self.trust_anchor_prefix) {
                FileRole::TrustAnchorCertificate
            } else {
                FileRole::Certificate
            }
        } else if matches(&self.crl_extensions) {
            FileRole::Crl
        } else if matches(&self.signature_extensions) {
            FileRole::SignatureDocument
        } else {
            FileRole::Unrecognized
        };

        let expected_form = if role == FileRole::SignatureDocument && parts.len() > 2 {
            let label = parts[parts.len() - 2];
            let form = label
                .parse::<XadesForm>()
                .map_err(|_| HarnessError::UnrecognizedExpectedForm {
                    name: name.to_string(),
                    label: label.to_string(),
                })?;
            Some(form)
        } else {
            None
        };

        Ok(Classification {
            role,
            expected_form,
        })
    }
}

/// Classify with the default naming conventions.
pub fn classify(name: &str) -> HarnessResult<Classification> {
    FileRules::default().classify(name)
}
