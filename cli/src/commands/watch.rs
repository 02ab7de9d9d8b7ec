use std::sync::Arc;

use switchwatch_common::config::Config;
use switchwatch_core::automation::WebDriverAutomation;
use switchwatch_core::monitor::ReachabilityMonitor;
use switchwatch_core::network;
use switchwatch_core::remediation::RemediationOrchestrator;

use crate::commands::CommandLine;

pub async fn watch(cfg: Arc<Config>, commands: &CommandLine) -> anyhow::Result<()> {
    let driver = WebDriverAutomation::new(commands.webdriver_settings());
    let orchestrator = RemediationOrchestrator::new(Arc::clone(&cfg), Box::new(driver));
    let monitor = ReachabilityMonitor::new(
        cfg,
        network::probe_for(commands.probe.probe_method),
        orchestrator,
    );
    monitor.run().await
}
