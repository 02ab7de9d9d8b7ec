//! Reachability probes.
//!
//! [`icmp::IcmpProbe`] sends raw echo requests and needs root.
//! [`ping::SystemPingProbe`] runs the system `ping` and works unprivileged.
//! [`probe_for`] picks one according to a [`ProbeMethod`].

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use is_root::is_root;
use switchwatch_common::debug;
use switchwatch_common::probe::ReachabilityProbe;

pub mod icmp;
pub mod ping;

use icmp::IcmpProbe;
use ping::SystemPingProbe;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProbeMethod {
    /// Raw ICMP for IPv4 targets when running as root, `ping` otherwise.
    #[default]
    Auto,
    Icmp,
    System,
}

impl FromStr for ProbeMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(ProbeMethod::Auto),
            "icmp" | "raw" => Ok(ProbeMethod::Icmp),
            "system" | "ping" => Ok(ProbeMethod::System),
            _ => Err(format!("invalid probe method: {s} (expected auto, icmp or system)")),
        }
    }
}

impl fmt::Display for ProbeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProbeMethod::Auto => "auto",
            ProbeMethod::Icmp => "icmp",
            ProbeMethod::System => "system",
        };
        f.write_str(name)
    }
}

pub fn probe_for(method: ProbeMethod) -> Box<dyn ReachabilityProbe> {
    match method {
        ProbeMethod::Icmp => Box::new(IcmpProbe),
        ProbeMethod::System => Box::new(SystemPingProbe::default()),
        ProbeMethod::Auto => Box::new(AdaptiveProbe::new(is_root())),
    }
}

/// Uses raw ICMP where it can and falls back to the system `ping` elsewhere.
pub struct AdaptiveProbe {
    raw: Option<IcmpProbe>,
    system: SystemPingProbe,
}

impl AdaptiveProbe {
    pub fn new(privileged: bool) -> Self {
        Self {
            raw: privileged.then_some(IcmpProbe),
            system: SystemPingProbe::default(),
        }
    }
}

#[async_trait]
impl ReachabilityProbe for AdaptiveProbe {
    async fn probe(&self, addr: IpAddr, timeout: Duration) -> anyhow::Result<bool> {
        match (&self.raw, addr) {
            (Some(raw), IpAddr::V4(_)) => raw.probe(addr, timeout).await,
            _ => {
                debug!("Probing {addr} with the system ping");
                self.system.probe(addr, timeout).await
            }
        }
    }
}
