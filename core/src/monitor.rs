//! # Reachability Monitor
//!
//! The process's only driving loop. Every poll cycle probes the configured
//! address and, when that stays silent, the factory-default address:
//!
//! | expected | factory | state          | then                                 |
//! |----------|---------|----------------|--------------------------------------|
//! | alive    | -       | `Configured`   | healthy cooldown                     |
//! | silent   | alive   | `FactoryReset` | reset settle, one remediation cycle  |
//! | silent   | silent  | `Unreachable`  | re-poll (after the optional backoff) |
//!
//! Nothing is remembered between cycles. As long as the factory-default
//! address keeps answering, every cycle triggers a new remediation.

use std::sync::Arc;

use switchwatch_common::config::Config;
use switchwatch_common::device::SwitchState;
use switchwatch_common::probe::ReachabilityProbe;
use switchwatch_common::{debug, info, success, warn};
use tokio::time::sleep;

use crate::remediation::{CycleReport, RemediationOrchestrator};

pub mod classifier;

pub use classifier::SwitchClassifier;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOutcome {
    pub state: SwitchState,
    /// Report of the remediation cycle triggered by a `FactoryReset`.
    pub remediation: Option<CycleReport>,
}

pub struct ReachabilityMonitor {
    config: Arc<Config>,
    classifier: SwitchClassifier,
    orchestrator: RemediationOrchestrator,
}

impl ReachabilityMonitor {
    pub fn new(
        config: Arc<Config>,
        probe: Box<dyn ReachabilityProbe>,
        orchestrator: RemediationOrchestrator,
    ) -> Self {
        Self {
            classifier: SwitchClassifier::new(Arc::clone(&config), probe),
            config,
            orchestrator,
        }
    }

    /// Polls forever. Only returns if the hosting process is torn down.
    pub async fn run(&self) -> anyhow::Result<()> {
        let mut cycle: u64 = 0;
        loop {
            cycle += 1;
            let outcome: PollOutcome = self.poll_cycle().await;
            match &outcome.remediation {
                Some(report) if outcome.state.is_anomaly() => info!(
                    "Poll cycle {cycle} remediated a {}, {} of {} phases failed",
                    outcome.state,
                    report.failures().count(),
                    report.phases().len()
                ),
                _ => debug!("Poll cycle {cycle} ended with state {}", outcome.state),
            }
        }
    }

    /// Classifies the switch once and performs the side effects of that state.
    pub async fn poll_cycle(&self) -> PollOutcome {
        let state: SwitchState = self.classifier.classify().await;
        let timing = &self.config.timing;
        let device = &self.config.device;

        match state {
            SwitchState::Configured => {
                success!(
                    "Detected switch configured at {}. Sleeping for {:?}",
                    device.expected_addr,
                    timing.healthy_cooldown
                );
                sleep(timing.healthy_cooldown).await;
                PollOutcome {
                    state,
                    remediation: None,
                }
            }
            SwitchState::FactoryReset => {
                warn!(
                    "Unauthorized factory reset detected at {}. Remediating in {:?}",
                    device.factory_addr,
                    timing.reset_settle
                );
                sleep(timing.reset_settle).await;
                let report: CycleReport = self.orchestrator.run_cycle().await;
                PollOutcome {
                    state,
                    remediation: Some(report),
                }
            }
            SwitchState::Unreachable => {
                warn!(
                    "Switch answers neither at {} nor at {}",
                    device.expected_addr, device.factory_addr
                );
                if !timing.unreachable_backoff.is_zero() {
                    sleep(timing.unreachable_backoff).await;
                }
                PollOutcome {
                    state,
                    remediation: None,
                }
            }
        }
    }
}
