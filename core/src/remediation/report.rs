use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Setup,
    Step(&'static str),
    Teardown,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Setup => f.write_str("setup"),
            Phase::Step(name) => f.write_str(name),
            Phase::Teardown => f.write_str("teardown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseOutcome {
    Completed,
    /// Holds the rendered error chain.
    Failed(String),
}

impl PhaseOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, PhaseOutcome::Completed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseReport {
    pub phase: Phase,
    pub outcome: PhaseOutcome,
    pub elapsed: Duration,
}

/// Outcome of every phase of one remediation cycle, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    phases: Vec<PhaseReport>,
}

impl CycleReport {
    pub(crate) fn record(&mut self, report: PhaseReport) {
        self.phases.push(report);
    }

    pub fn phases(&self) -> &[PhaseReport] {
        &self.phases
    }

    pub fn outcome_of(&self, phase: Phase) -> Option<&PhaseOutcome> {
        self.phases
            .iter()
            .find(|report| report.phase == phase)
            .map(|report| &report.outcome)
    }

    pub fn failures(&self) -> impl Iterator<Item = &PhaseReport> {
        self.phases
            .iter()
            .filter(|report| !report.outcome.is_completed())
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    /// At least one step changed the switch while another one failed.
    pub fn is_partial(&self) -> bool {
        let mut steps = self
            .phases
            .iter()
            .filter(|report| matches!(report.phase, Phase::Step(_)));
        let completed = steps.clone().any(|report| report.outcome.is_completed());
        let failed = steps.any(|report| !report.outcome.is_completed());
        completed && failed
    }

    pub fn elapsed(&self) -> Duration {
        self.phases.iter().map(|report| report.elapsed).sum()
    }
}
