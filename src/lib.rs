//! Convention-driven fixture loader and harness for XML signature
//! verification tests.
//!
//! A fixture root holds one directory per bundle. Each bundle's files are
//! classified by name (trust anchors, certificates, CRLs, signature
//! documents), turned into self-contained [`TestCase`]s, and run through a
//! [`Driver`] that builds the validation context and checks the form
//! reported by an external verifier against the form declared in the
//! file name.

pub mod bundle;
pub mod config;
pub mod error;
pub mod hash;
pub mod report;
pub mod verify;

pub use bundle::{BundleLoad, BundleLoader, FileRole, TestCase, XadesForm};
pub use config::{Accumulation, HarnessConfig};
pub use error::{HarnessError, HarnessResult};
pub use verify::{
    CaseReport, Driver, Outcome, RunSummary, SignatureTarget, SignatureVerifier,
    ValidationContext, ValidatorFactory, VerificationResult,
};
