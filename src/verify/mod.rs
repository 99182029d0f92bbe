// verify/ — Running test cases against an external signature verifier
//
// context.rs — Trust anchor store, material pool, revocation flag
// ids.rs     — Identifier index and ds:Signature lookup
// driver.rs  — Per-case run, verifier traits, outcomes
// summary.rs — Pass/fail/error tally for a run

pub mod context;
pub mod driver;
pub mod ids;
pub mod summary;

pub use context::{Material, TrustAnchorStore, ValidationContext, ValidationMaterial};
pub use driver::{
    CaseReport, Driver, Outcome, SignatureTarget, SignatureVerifier, Stage, TerminalState,
    ValidatorFactory, VerificationResult,
};
pub use ids::{locate_signature, IdIndex, IdQuery};
pub use summary::RunSummary;
