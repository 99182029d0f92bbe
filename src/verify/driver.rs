// driver.rs — Runs one test case against the external verifier
//
// Per case: parse document → index identifiers → locate ds:Signature →
// build validation context → verify → compare form with expectation.
//
// The verifier and the PKIX validator are supplied by the caller through
// ValidatorFactory and SignatureVerifier. Their errors are recorded as the
// case's Errored outcome and never retried. A form that differs from the
// declared expectation is a Failed outcome, not an error.

use roxmltree::{Document, Node};
use std::fmt;
use std::sync::mpsc;
use std::thread;

use crate::bundle::decode::DocumentParser;
use crate::bundle::model::{TestCase, XadesForm};
use crate::config::HarnessConfig;
use crate::error::{HarnessError, HarnessResult};
use crate::verify::context::ValidationContext;
use crate::verify::ids::{locate_signature, IdIndex, IdQuery};
use crate::verify::summary::RunSummary;

/// What the external verifier reports for a signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub signature_form: XadesForm,
}

/// The signature handed to the verifier, with its document and identifier
/// index for reference resolution.
pub struct SignatureTarget<'a, 'input> {
    pub document: &'a Document<'input>,
    pub signature: Node<'a, 'input>,
    pub ids: &'a IdIndex,
}

/// Builds a PKIX-style certificate validator from a case's context.
pub trait ValidatorFactory {
    type Validator;

    fn create(&self, context: &ValidationContext) -> anyhow::Result<Self::Validator>;
}

/// Verifies one signature element using a validator from the factory.
pub trait SignatureVerifier {
    type Validator;

    fn verify(
        &self,
        target: &SignatureTarget<'_, '_>,
        validator: &Self::Validator,
    ) -> anyhow::Result<VerificationResult>;
}

/// Last stage a case reached before finishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Loaded,
    IdentifiersResolved,
    SignatureLocated,
    Verified,
}

#[derive(Debug)]
pub enum Outcome {
    Passed { form: XadesForm },
    Failed { expected: XadesForm, actual: XadesForm },
    Errored(HarnessError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalState {
    Passed,
    Failed,
    Errored,
}

#[derive(Debug)]
pub struct CaseReport {
    pub description: String,
    pub stage: Stage,
    pub outcome: Outcome,
}

impl CaseReport {
    pub fn terminal_state(&self) -> TerminalState {
        match self.outcome {
            Outcome::Passed { .. } => TerminalState::Passed,
            Outcome::Failed { .. } => TerminalState::Failed,
            Outcome::Errored(_) => TerminalState::Errored,
        }
    }
}

impl fmt::Display for CaseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Outcome::Passed { .. } => write!(f, "PASS {}", self.description),
            Outcome::Failed { expected, actual } => write!(
                f,
                "FAIL {}: expected {}, got {}",
                self.description, expected, actual
            ),
            Outcome::Errored(e) => write!(f, "ERROR {}: {}", self.description, e),
        }
    }
}

pub struct Driver<F, V> {
    factory: F,
    verifier: V,
    parser: DocumentParser,
    query: IdQuery,
}

impl<F, V> Driver<F, V>
where
    F: ValidatorFactory,
    V: SignatureVerifier<Validator = F::Validator>,
{
    pub fn new(config: &HarnessConfig, factory: F, verifier: V) -> HarnessResult<Self> {
        Ok(Driver {
            factory,
            verifier,
            parser: DocumentParser::new(config)?,
            query: IdQuery::compile(&config.id_attributes)?,
        })
    }

    /// Run a case once and report its terminal state.
    pub fn run(&self, case: &TestCase) -> CaseReport {
        let mut stage = Stage::Loaded;
        let outcome = match self.execute(case, &mut stage) {
            Ok(outcome) => outcome,
            Err(e) => Outcome::Errored(e),
        };

        match &outcome {
            Outcome::Passed { form } => log::info!("{}: passed ({})", case, form),
            Outcome::Failed { expected, actual } => {
                log::warn!("{}: expected {}, got {}", case, expected, actual)
            }
            Outcome::Errored(e) => log::warn!("{}: error after {:?}: {}", case, stage, e),
        }

        CaseReport {
            description: case.description().to_string(),
            stage,
            outcome,
        }
    }

    fn execute(&self, case: &TestCase, stage: &mut Stage) -> HarnessResult<Outcome> {
        let document = case.signature_document.parse(&self.parser)?;

        let ids = IdIndex::build(&document, &self.query)?;
        *stage = Stage::IdentifiersResolved;
        log::debug!("{}: {} identified element(s)", case, ids.len());

        let signature = locate_signature(&document)?;
        *stage = Stage::SignatureLocated;

        let context = ValidationContext::for_case(case);
        log::debug!(
            "{}: {} anchor(s), {} material entr(ies), revocation {}",
            case,
            context.trust_anchors.len(),
            context.material.len(),
            if context.revocation_enabled { "on" } else { "off" }
        );
        let validator = self
            .factory
            .create(&context)
            .map_err(HarnessError::Verification)?;

        let target = SignatureTarget {
            document: &document,
            signature,
            ids: &ids,
        };
        let result = self
            .verifier
            .verify(&target, &validator)
            .map_err(HarnessError::Verification)?;
        *stage = Stage::Verified;

        Ok(match case.expected_form {
            Some(expected) if expected != result.signature_form => Outcome::Failed {
                expected,
                actual: result.signature_form,
            },
            _ => Outcome::Passed {
                form: result.signature_form,
            },
        })
    }

    /// Run cases one after another.
    pub fn run_all(&self, cases: &[TestCase]) -> RunSummary {
        RunSummary::new(cases.iter().map(|c| self.run(c)).collect())
    }

    /// Run cases on up to `workers` threads. Reports keep the input order.
    pub fn run_all_parallel(&self, cases: &[TestCase], workers: usize) -> RunSummary
    where
        F: Sync,
        V: Sync,
    {
        let workers = workers.clamp(1, cases.len().max(1));
        let (tx, rx) = mpsc::channel::<(usize, CaseReport)>();

        thread::scope(|scope| {
            for worker in 0..workers {
                let tx = tx.clone();
                scope.spawn(move || {
                    for (i, case) in cases.iter().enumerate().skip(worker).step_by(workers) {
                        let _ = tx.send((i, self.run(case)));
                    }
                });
            }
        });
        drop(tx);

        let mut indexed: Vec<(usize, CaseReport)> = rx.iter().collect();
        indexed.sort_by_key(|(i, _)| *i);
        RunSummary::new(indexed.into_iter().map(|(_, r)| r).collect())
    }
}
