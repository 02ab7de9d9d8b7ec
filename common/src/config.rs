use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_EXPECTED_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 4, 20, 240));
pub const DEFAULT_FACTORY_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 168, 0, 239));
pub const DEFAULT_FACTORY_PASSWORD: &str = "password";
pub const DEFAULT_TARGET_PASSWORD: &str = "newPassword$123";
pub const DEFAULT_KNOWN_GOOD_CONFIG: &str = "startup-config.cfg";
pub const DEFAULT_EXPECTED_TITLE: &str = "NETGEAR XS712Tv2";
pub const DEFAULT_SCHEME: &str = "http";

/// Everything the watcher knows about the one switch it guards.
///
/// Built once at startup and shared read-only afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct DeviceAddressSet {
    /// Address of the switch while it runs the known-good configuration.
    pub expected_addr: IpAddr,
    /// Address the switch falls back to after a factory reset.
    pub factory_addr: IpAddr,
    pub factory_password: String,
    /// Password installed during remediation and used for every later login.
    pub target_password: String,
    pub known_good_config: PathBuf,
    /// Marker the management UI must show in its page title.
    pub expected_title: String,
    pub scheme: String,
}

impl DeviceAddressSet {
    pub fn expected_url(&self) -> String {
        management_url(&self.scheme, self.expected_addr)
    }

    pub fn factory_url(&self) -> String {
        management_url(&self.scheme, self.factory_addr)
    }
}

impl Default for DeviceAddressSet {
    fn default() -> Self {
        Self {
            expected_addr: DEFAULT_EXPECTED_ADDR,
            factory_addr: DEFAULT_FACTORY_ADDR,
            factory_password: DEFAULT_FACTORY_PASSWORD.to_string(),
            target_password: DEFAULT_TARGET_PASSWORD.to_string(),
            known_good_config: PathBuf::from(DEFAULT_KNOWN_GOOD_CONFIG),
            expected_title: DEFAULT_EXPECTED_TITLE.to_string(),
            scheme: DEFAULT_SCHEME.to_string(),
        }
    }
}

// Passwords never reach the logs.
impl fmt::Debug for DeviceAddressSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceAddressSet")
            .field("expected_addr", &self.expected_addr)
            .field("factory_addr", &self.factory_addr)
            .field("factory_password", &"<redacted>")
            .field("target_password", &"<redacted>")
            .field("known_good_config", &self.known_good_config)
            .field("expected_title", &self.expected_title)
            .field("scheme", &self.scheme)
            .finish()
    }
}

fn management_url(scheme: &str, addr: IpAddr) -> String {
    match addr {
        IpAddr::V4(v4) => format!("{scheme}://{v4}/"),
        IpAddr::V6(v6) => format!("{scheme}://[{v6}]/"),
    }
}

/// Fixed waits of the control loop.
///
/// None of these are real synchronization points. They encode how long the
/// switch usually needs to answer, reboot its web server or reconfigure, so
/// they are exposed for tuning rather than hard-coded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub probe_timeout: Duration,
    /// Pause after a poll found the switch correctly configured.
    pub healthy_cooldown: Duration,
    /// Pause between detecting a factory reset and starting remediation.
    pub reset_settle: Duration,
    /// Pause after a poll where neither address answered. Zero re-polls at once.
    pub unreachable_backoff: Duration,
    /// Default timeout of every automation operation.
    pub operation_timeout: Duration,
    /// Pause after each navigation click in the management UI.
    pub navigation_pause: Duration,
    /// Time the switch gets to apply an uploaded configuration.
    pub apply_settle: Duration,
    /// Time the switch gets to come back on its configured address.
    pub reconfigure_wait: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(5),
            healthy_cooldown: Duration::from_secs(20),
            reset_settle: Duration::from_secs(10),
            unreachable_backoff: Duration::ZERO,
            operation_timeout: Duration::from_secs(300),
            navigation_pause: Duration::from_millis(1_000),
            apply_settle: Duration::from_secs(20),
            reconfigure_wait: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub device: DeviceAddressSet,
    pub timing: Timing,
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
