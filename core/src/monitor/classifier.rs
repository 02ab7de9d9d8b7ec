use std::net::IpAddr;
use std::sync::Arc;

use switchwatch_common::config::Config;
use switchwatch_common::device::SwitchState;
use switchwatch_common::probe::ReachabilityProbe;
use switchwatch_common::{info, warn};
use tokio::time::{Instant, sleep};

/// Probes the two addresses of the switch and derives its state.
pub struct SwitchClassifier {
    config: Arc<Config>,
    probe: Box<dyn ReachabilityProbe>,
}

impl SwitchClassifier {
    pub fn new(config: Arc<Config>, probe: Box<dyn ReachabilityProbe>) -> Self {
        Self { config, probe }
    }

    /// Probes both addresses, the factory one only when needed.
    pub async fn classify(&self) -> SwitchState {
        let device = &self.config.device;

        let expected_alive: bool = self.is_alive(device.expected_addr).await;
        if expected_alive {
            return SwitchState::classify(true, None);
        }

        info!(
            "Switch not detected at {}. Checking factory default address",
            device.expected_addr
        );
        let factory_alive: bool = self.is_alive(device.factory_addr).await;
        SwitchState::classify(false, Some(factory_alive))
    }

    /// A failed probe counts as silence but still takes the full probe
    /// timeout, so an unreachable switch never turns into a busy loop.
    async fn is_alive(&self, addr: IpAddr) -> bool {
        let timeout = self.config.timing.probe_timeout;
        let started: Instant = Instant::now();
        info!("Pinging {addr}, timeout = {timeout:?}");

        match self.probe.probe(addr, timeout).await {
            Ok(alive) => alive,
            Err(e) => {
                warn!("Could not probe {addr}: {e:#}");
                sleep(timeout.saturating_sub(started.elapsed())).await;
                false
            }
        }
    }
}
