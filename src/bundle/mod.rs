// bundle/ — Fixture discovery and test case assembly
//
// model.rs    — TestCase, file roles, expected XAdES forms
// classify.rs — File role inference from fixture names
// decode.rs   — Certificate/CRL decoding and XML parsing
// load.rs     — Directory scanning and case assembly

pub mod classify;
pub mod decode;
pub mod load;
pub mod model;

pub use classify::{classify, FileRules};
pub use decode::{CertificateDecoder, DocumentParser};
pub use load::{BundleLoad, BundleLoader};
pub use model::{Classification, FileRole, SignatureDocument, TestCase, TrustMaterial, XadesForm};
