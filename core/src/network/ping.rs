//! Unprivileged fallback: asks the operating system's `ping` binary.

use std::net::IpAddr;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use switchwatch_common::probe::ReachabilityProbe;
use tokio::process::Command;

// `ping` may round its own deadline up; give it a little room.
const GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct SystemPingProbe {
    binary: PathBuf,
}

impl SystemPingProbe {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for SystemPingProbe {
    fn default() -> Self {
        Self::new("ping")
    }
}

#[async_trait]
impl ReachabilityProbe for SystemPingProbe {
    async fn probe(&self, addr: IpAddr, timeout: Duration) -> anyhow::Result<bool> {
        let mut command = Command::new(&self.binary);
        command
            .args(ping_args(addr, timeout))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        match tokio::time::timeout(timeout + GRACE, command.status()).await {
            Ok(status) => {
                let status = status.with_context(|| format!("running {}", self.binary.display()))?;
                Ok(status.success())
            }
            Err(_elapsed) => Ok(false),
        }
    }
}

/// One echo request, bounded by `timeout` (rounded up to whole seconds where
/// the platform's `ping` only takes seconds).
fn ping_args(addr: IpAddr, timeout: Duration) -> Vec<String> {
    let secs: u64 = timeout.as_secs() + u64::from(timeout.subsec_nanos() > 0);
    let secs: String = secs.max(1).to_string();

    #[cfg(target_os = "windows")]
    {
        let _ = secs;
        vec![
            "-n".into(),
            "1".into(),
            "-w".into(),
            timeout.as_millis().max(1).to_string(),
            addr.to_string(),
        ]
    }
    #[cfg(target_os = "macos")]
    {
        vec!["-c".into(), "1".into(), "-t".into(), secs, addr.to_string()]
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        vec!["-c".into(), "1".into(), "-W".into(), secs, addr.to_string()]
    }
}
