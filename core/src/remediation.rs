//! # Remediation Orchestrator
//!
//! Runs one remediation cycle: **setup**, every step of the workflow, then
//! **teardown**. Phases run strictly in order and each one is guarded on its
//! own: a failure is logged and recorded in the [`CycleReport`] but never
//! stops the phases after it. Teardown runs on every cycle, so the automation
//! session is always released before the monitor polls again.

use std::future::Future;
use std::sync::Arc;

use switchwatch_common::automation::AutomationDriver;
use switchwatch_common::config::Config;
use switchwatch_common::{error, info, success, warn};
use tokio::time::Instant;
use tracing::{Instrument, info_span};

pub mod report;
pub mod session;
pub mod steps;

pub use report::{CycleReport, Phase, PhaseOutcome, PhaseReport};
pub use session::RemediationSession;
pub use steps::RemediationStep;

pub struct RemediationOrchestrator {
    config: Arc<Config>,
    driver: Box<dyn AutomationDriver>,
    steps: Vec<Box<dyn RemediationStep>>,
}

impl RemediationOrchestrator {
    /// Orchestrator running the [`steps::standard_workflow`].
    pub fn new(config: Arc<Config>, driver: Box<dyn AutomationDriver>) -> Self {
        Self::with_steps(config, driver, steps::standard_workflow())
    }

    pub fn with_steps(
        config: Arc<Config>,
        driver: Box<dyn AutomationDriver>,
        steps: Vec<Box<dyn RemediationStep>>,
    ) -> Self {
        Self {
            config,
            driver,
            steps,
        }
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|step| step.name()).collect()
    }

    pub async fn run_cycle(&self) -> CycleReport {
        let span = info_span!("remediation");
        self.execute_phases().instrument(span).await
    }

    async fn execute_phases(&self) -> CycleReport {
        let config: &Config = &self.config;
        let mut report = CycleReport::default();
        let mut session = RemediationSession::new();

        report.record(
            guarded(
                Phase::Setup,
                session.establish(self.driver.as_ref(), config.timing.operation_timeout),
            )
            .await,
        );

        for step in &self.steps {
            let phase = Phase::Step(step.name());
            report.record(guarded(phase, step.run(&mut session, config)).await);
        }

        report.record(guarded(Phase::Teardown, session.release()).await);

        summarize(&report);
        report
    }
}

async fn guarded<F>(phase: Phase, work: F) -> PhaseReport
where
    F: Future<Output = anyhow::Result<()>>,
{
    let started: Instant = Instant::now();
    let span = info_span!("phase", name = %phase);

    let outcome: PhaseOutcome = match work.instrument(span).await {
        Ok(()) => {
            info!("Finished {phase}");
            PhaseOutcome::Completed
        }
        Err(e) => {
            error!("Error during {phase}: {e:#}");
            PhaseOutcome::Failed(format!("{e:#}"))
        }
    };

    PhaseReport {
        phase,
        outcome,
        elapsed: started.elapsed(),
    }
}

fn summarize(report: &CycleReport) {
    if report.is_success() {
        success!("Remediation cycle completed in {:?}", report.elapsed());
        return;
    }

    let failed: Vec<String> = report.failures().map(|r| r.phase.to_string()).collect();
    if report.is_partial() {
        warn!(
            "Remediation cycle left the switch partially remediated, failed: {}",
            failed.join(", ")
        );
    } else {
        warn!("Remediation cycle failed: {}", failed.join(", "));
    }
}
