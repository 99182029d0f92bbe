use std::fmt;

use crate::verify::driver::{CaseReport, TerminalState};

/// Reports of a verification run, in case order.
#[derive(Debug, Default)]
pub struct RunSummary {
    reports: Vec<CaseReport>,
}

impl RunSummary {
    pub fn new(reports: Vec<CaseReport>) -> Self {
        RunSummary { reports }
    }

    pub fn reports(&self) -> &[CaseReport] {
        &self.reports
    }

    fn count(&self, state: TerminalState) -> usize {
        self.reports
            .iter()
            .filter(|r| r.terminal_state() == state)
            .count()
    }

    pub fn passed(&self) -> usize {
        self.count(TerminalState::Passed)
    }

    pub fn failed(&self) -> usize {
        self.count(TerminalState::Failed)
    }

    pub fn errored(&self) -> usize {
        self.count(TerminalState::Errored)
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0 && self.errored() == 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for report in &self.reports {
            writeln!(f, "{}", report)?;
        }
        write!(
            f,
            "{} passed, {} failed, {} errored",
            self.passed(),
            self.failed(),
            self.errored()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::model::XadesForm;
    use crate::error::HarnessError;
    use crate::verify::driver::{Outcome, Stage};

    fn report(name: &str, outcome: Outcome) -> CaseReport {
        CaseReport {
            description: name.to_string(),
            stage: Stage::Verified,
            outcome,
        }
    }

    #[test]
    fn counts_and_renders_each_case() {
        let summary = RunSummary::new(vec![
            report("a - sig.xml", Outcome::Passed { form: XadesForm::BES }),
            report(
                "b - sig.T.xml",
                Outcome::Failed {
                    expected: XadesForm::T,
                    actual: XadesForm::BES,
                },
            ),
            report("c - sig.xml", Outcome::Errored(HarnessError::SignatureElementMissing)),
        ]);

        assert_eq!((summary.passed(), summary.failed(), summary.errored()), (1, 1, 1));
        assert!(!summary.is_success());
        assert_eq!(
            summary.to_string(),
            "PASS a - sig.xml\n\
             FAIL b - sig.T.xml: expected T, got BES\n\
             ERROR c - sig.xml: no ds:Signature element found in document\n\
             1 passed, 1 failed, 1 errored"
        );
    }

    #[test]
    fn empty_run_is_a_success() {
        let summary = RunSummary::default();
        assert!(summary.is_success());
        assert_eq!(summary.to_string(), "0 passed, 0 failed, 0 errored");
    }
}
