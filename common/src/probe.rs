use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;

/// Answers whether a host responds within a bounded time.
///
/// A host that stays silent is `Ok(false)`. `Err` is reserved for probes that
/// could not be carried out at all (no raw socket, missing `ping` binary);
/// the monitor treats both as "not reachable".
#[async_trait]
pub trait ReachabilityProbe: Send + Sync {
    async fn probe(&self, addr: IpAddr, timeout: Duration) -> anyhow::Result<bool>;
}
