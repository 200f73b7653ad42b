use std::path::PathBuf;

use prs_model::{OutcomeRecord, OutcomeState};

/// Result of one batch run.
#[derive(Debug)]
pub struct BatchResult {
    pub output_dir: PathBuf,
    pub quarantine_dir: PathBuf,
    pub outcomes: Vec<OutcomeRecord>,
}

impl BatchResult {
    pub fn archived_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.state == OutcomeState::Archived)
            .count()
    }

    pub fn quarantined_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.state == OutcomeState::Quarantined)
            .count()
    }

    pub fn has_failures(&self) -> bool {
        self.quarantined_count() > 0
    }
}
