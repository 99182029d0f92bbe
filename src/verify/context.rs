// context.rs — Validation context for one test case
//
// Trust anchors go into their own store under generated aliases. The other
// certificates and the CRLs form a single material pool used for path
// building and revocation evidence. Revocation checking is enabled exactly
// when the case carries at least one CRL: with no CRLs a PKIX validator
// would find no revocation status for any certificate and reject valid paths.

use std::collections::BTreeMap;
use x509_cert::crl::CertificateList;
use x509_cert::Certificate;

use crate::bundle::model::TestCase;

/// Trust anchors keyed by a generated alias (UUID v4).
#[derive(Debug, Clone, Default)]
pub struct TrustAnchorStore {
    entries: BTreeMap<String, Certificate>,
}

impl TrustAnchorStore {
    pub fn new<'a>(anchors: impl IntoIterator<Item = &'a Certificate>) -> Self {
        let mut entries = BTreeMap::new();
        for cert in anchors {
            let mut alias = uuid::Uuid::new_v4().to_string();
            while entries.contains_key(&alias) {
                alias = uuid::Uuid::new_v4().to_string();
            }
            entries.insert(alias, cert.clone());
        }
        TrustAnchorStore { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, alias: &str) -> Option<&Certificate> {
        self.entries.get(alias)
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Certificate)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// One entry of the combined validation material pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Material {
    Certificate(Certificate),
    Crl(CertificateList),
}

/// Non-anchor certificates and CRLs exposed as one lookup source.
#[derive(Debug, Clone, Default)]
pub struct ValidationMaterial {
    entries: Vec<Material>,
}

impl ValidationMaterial {
    pub fn new(certificates: &[Certificate], crls: &[CertificateList]) -> Self {
        let entries = certificates
            .iter()
            .cloned()
            .map(Material::Certificate)
            .chain(crls.iter().cloned().map(Material::Crl))
            .collect();
        ValidationMaterial { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Material> {
        self.entries.iter()
    }

    pub fn certificates(&self) -> impl Iterator<Item = &Certificate> {
        self.entries.iter().filter_map(|m| match m {
            Material::Certificate(c) => Some(c),
            Material::Crl(_) => None,
        })
    }

    pub fn crls(&self) -> impl Iterator<Item = &CertificateList> {
        self.entries.iter().filter_map(|m| match m {
            Material::Crl(c) => Some(c),
            Material::Certificate(_) => None,
        })
    }
}

/// Everything the external validator needs for one case.
#[derive(Debug, Clone)]
pub struct ValidationContext {
    pub trust_anchors: TrustAnchorStore,
    pub material: ValidationMaterial,
    pub revocation_enabled: bool,
}

impl ValidationContext {
    pub fn for_case(case: &TestCase) -> Self {
        ValidationContext {
            trust_anchors: TrustAnchorStore::new(&case.trust_anchors),
            material: ValidationMaterial::new(&case.certificates, &case.crls),
            revocation_enabled: !case.crls.is_empty(),
        }
    }
}
