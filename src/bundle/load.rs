// load.rs — Bundle discovery and test case assembly
//
// A bundle is one directory of fixtures. Every regular file directly inside
// it is classified by name; certificates and CRLs become validation material
// and each signature document becomes one TestCase.
//
// Accumulation::Complete (default) is two-pass: all material is decoded
// first, then every case gets the full set. Accumulation::ListingOrder keeps
// the single-pass behaviour where a case only sees material from files
// listed before it.
//
// Errors abort the bundle being loaded. discover() loads bundles
// independently, so one broken bundle never hides the others.

use std::fs;
use std::path::{Path, PathBuf};

use crate::bundle::classify::FileRules;
use crate::bundle::decode::{CertificateDecoder, DocumentParser};
use crate::bundle::model::*;
use crate::config::{Accumulation, HarnessConfig};
use crate::error::{HarnessError, HarnessResult};

/// A regular file found in a bundle directory.
#[derive(Debug, Clone)]
struct FixtureFile {
    path: PathBuf,
    name: String,
}

/// Outcome of loading one bundle directory during discovery.
#[derive(Debug)]
pub struct BundleLoad {
    pub name: String,
    pub path: PathBuf,
    pub result: HarnessResult<Vec<TestCase>>,
}

impl BundleLoad {
    pub fn cases(&self) -> &[TestCase] {
        match &self.result {
            Ok(cases) => cases,
            Err(_) => &[],
        }
    }
}

pub struct BundleLoader {
    rules: FileRules,
    decoder: CertificateDecoder,
    parser: DocumentParser,
    accumulation: Accumulation,
    excluded_bundle_prefix: String,
}

impl BundleLoader {
    pub fn new(config: &HarnessConfig) -> HarnessResult<Self> {
        Ok(BundleLoader {
            rules: FileRules::from_config(config)?,
            decoder: CertificateDecoder::new(config)?,
            parser: DocumentParser::new(config)?,
            accumulation: config.accumulation,
            excluded_bundle_prefix: config.excluded_bundle_prefix.clone(),
        })
    }

    /// Load every bundle directory under `root`.
    ///
    /// Subdirectories whose name starts with the excluded prefix are skipped;
    /// plain files in `root` are ignored. Bundles are returned sorted by name.
    pub fn discover(&self, root: &Path) -> HarnessResult<Vec<BundleLoad>> {
        let mut dirs: Vec<(String, PathBuf)> = Vec::new();
        for entry in fs::read_dir(root).map_err(|e| HarnessError::io(root, e))? {
            let entry = entry.map_err(|e| HarnessError::io(root, e))?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            if !path.is_dir() {
                continue;
            }
            if !self.excluded_bundle_prefix.is_empty()
                && name.starts_with(&self.excluded_bundle_prefix)
            {
                log::debug!("skipping excluded bundle {}", name);
                continue;
            }
            dirs.push((name, path));
        }
        dirs.sort();

        let mut bundles = Vec::with_capacity(dirs.len());
        for (name, path) in dirs {
            let result = self.load_from(&path);
            if let Err(ref e) = result {
                log::warn!("bundle {} failed to load: {}", name, e);
            }
            bundles.push(BundleLoad { name, path, result });
        }
        Ok(bundles)
    }

    /// Load the test cases of a single bundle directory (non-recursive).
    pub fn load_from(&self, dir: &Path) -> HarnessResult<Vec<TestCase>> {
        let mut files = list_files(dir)?;
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let dir_name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| dir.display().to_string());

        let cases = match self.accumulation {
            Accumulation::Complete => {
                files.sort_by(|a, b| a.name.cmp(&b.name));
                self.load_complete(&dir_name, files)?
            }
            Accumulation::ListingOrder => self.load_in_listing_order(&dir_name, files)?,
        };

        log::info!("bundle {}: {} case(s)", dir_name, cases.len());
        Ok(cases)
    }

    fn load_complete(
        &self,
        dir_name: &str,
        files: Vec<FixtureFile>,
    ) -> HarnessResult<Vec<TestCase>> {
        let classified = files
            .into_iter()
            .map(|f| self.rules.classify(&f.name).map(|c| (f, c)))
            .collect::<HarnessResult<Vec<_>>>()?;

        // Pass 1: all validation material in the directory.
        let mut material = TrustMaterial::default();
        for (file, class) in &classified {
            self.add_material(&mut material, file, class.role)?;
        }

        // Pass 2: one case per signature document, each with the full set.
        let mut cases = Vec::new();
        for (file, class) in &classified {
            if class.role == FileRole::SignatureDocument {
                cases.push(self.build_case(dir_name, file, class.expected_form, material.clone())?);
            }
        }
        Ok(cases)
    }

    fn load_in_listing_order(
        &self,
        dir_name: &str,
        files: Vec<FixtureFile>,
    ) -> HarnessResult<Vec<TestCase>> {
        let mut material = TrustMaterial::default();
        let mut cases = Vec::new();
        for file in &files {
            let class = self.rules.classify(&file.name)?;
            if class.role == FileRole::SignatureDocument {
                // snapshot of what has been seen so far
                cases.push(self.build_case(dir_name, file, class.expected_form, material.clone())?);
            } else {
                self.add_material(&mut material, file, class.role)?;
            }
        }
        Ok(cases)
    }

    fn add_material(
        &self,
        material: &mut TrustMaterial,
        file: &FixtureFile,
        role: FileRole,
    ) -> HarnessResult<()> {
        log::debug!("{}: {:?}", file.name, role);
        match role {
            FileRole::TrustAnchorCertificate => {
                material
                    .trust_anchors
                    .push(self.decoder.read_certificate(&file.path)?);
            }
            FileRole::Certificate => {
                material
                    .certificates
                    .push(self.decoder.read_certificate(&file.path)?);
            }
            FileRole::Crl => material.crls.push(self.decoder.read_crl(&file.path)?),
            FileRole::Unrecognized => log::debug!("ignoring {}", file.path.display()),
            FileRole::SignatureDocument => {}
        }
        Ok(())
    }

    fn build_case(
        &self,
        dir_name: &str,
        file: &FixtureFile,
        expected_form: Option<XadesForm>,
        material: TrustMaterial,
    ) -> HarnessResult<TestCase> {
        let text = self.parser.read_document(&file.path)?;
        // Reject malformed documents while loading, not when the case runs.
        self.parser.parse(&file.path, &text)?;

        Ok(TestCase::new(
            SignatureDocument::new(file.path.clone(), text),
            expected_form,
            material,
            format!("{} - {}", dir_name, file.name),
        ))
    }
}

fn list_files(dir: &Path) -> HarnessResult<Vec<FixtureFile>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| HarnessError::io(dir, e))? {
        let entry = entry.map_err(|e| HarnessError::io(dir, e))?;
        let path = entry.path();
        if path.is_file() {
            files.push(FixtureFile {
                name: entry.file_name().to_string_lossy().into_owned(),
                path,
            });
        }
    }
    Ok(files)
}
