use std::time::Duration;

use chrono::{DateTime, Utc};

/// The phases of one bootstrap run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Probing,
    Synchronizing,
    Publishing,
    Provisioning,
    Launching,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Probing => "probing",
            Phase::Synchronizing => "synchronizing",
            Phase::Publishing => "publishing",
            Phase::Provisioning => "provisioning",
            Phase::Launching => "launching",
        };
        f.write_str(name)
    }
}

/// Outcome of the account-provisioning step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    Created,
    AlreadyExists,
}

#[derive(Debug, Clone)]
pub struct PhaseRecord {
    pub phase: Phase,
    pub elapsed: Duration,
}

/// Operator-facing record of what one bootstrap run did and how long each
/// phase took. Never persisted; surfaced through the logs before launch.
#[derive(Debug, Clone)]
pub struct BootstrapReport {
    pub started_at: DateTime<Utc>,
    pub phases: Vec<PhaseRecord>,
    pub provision_outcome: Option<ProvisionOutcome>,
}

impl BootstrapReport {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            phases: Vec::new(),
            provision_outcome: None,
        }
    }

    pub fn record(&mut self, phase: Phase, elapsed: Duration) {
        self.phases.push(PhaseRecord { phase, elapsed });
    }

    pub fn completed(&self, phase: Phase) -> bool {
        self.phases.iter().any(|record| record.phase == phase)
    }
}

impl Default for BootstrapReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_phases_in_order() {
        let mut report = BootstrapReport::new();
        report.record(Phase::Probing, Duration::from_millis(120));
        report.record(Phase::Synchronizing, Duration::from_secs(2));
        assert!(report.completed(Phase::Probing));
        assert!(!report.completed(Phase::Launching));
        assert_eq!(report.phases.len(), 2);
        assert_eq!(report.phases[0].phase, Phase::Probing);
    }
}
