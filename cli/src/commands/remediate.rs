use std::sync::Arc;

use colored::*;
use switchwatch_common::config::Config;
use switchwatch_core::automation::WebDriverAutomation;
use switchwatch_core::remediation::{CycleReport, PhaseOutcome, RemediationOrchestrator};

use crate::commands::CommandLine;
use crate::terminal::{colors, print};

/// Runs one remediation cycle without probing first.
pub async fn remediate(cfg: Arc<Config>, commands: &CommandLine) -> anyhow::Result<()> {
    let driver = WebDriverAutomation::new(commands.webdriver_settings());
    let orchestrator = RemediationOrchestrator::new(cfg, Box::new(driver));

    let report: CycleReport = orchestrator.run_cycle().await;

    print::header("cycle report");
    for phase in report.phases() {
        let outcome: ColoredString = match &phase.outcome {
            PhaseOutcome::Completed => "completed".color(colors::SUCCESS),
            PhaseOutcome::Failed(reason) => format!("failed: {reason}").color(colors::FAILURE),
        };
        print::aligned_line(&phase.phase.to_string(), outcome);
    }
    print::aligned_line("Elapsed", format!("{:?}", report.elapsed()));

    if !report.is_success() {
        anyhow::bail!("remediation cycle did not complete");
    }
    Ok(())
}
