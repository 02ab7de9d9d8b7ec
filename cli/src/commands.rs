pub mod probe;
pub mod remediate;
pub mod watch;

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use switchwatch_common::config::{self, Config, DeviceAddressSet, Timing};
use switchwatch_core::automation::WebDriverSettings;
use switchwatch_core::network::ProbeMethod;

#[derive(Parser, Debug)]
#[command(name = "switchwatch")]
#[command(about = "Watches a managed switch and restores its configuration after a factory reset.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Print debug output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(flatten)]
    pub device: DeviceArgs,

    #[command(flatten)]
    pub timing: TimingArgs,

    #[command(flatten)]
    pub probe: ProbeArgs,

    #[command(flatten)]
    pub webdriver: WebDriverArgs,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Poll the switch forever and remediate factory resets (default)
    #[command(alias = "w")]
    Watch,
    /// Classify the switch once and exit
    #[command(alias = "p")]
    Probe,
    /// Run one remediation cycle now, whatever state the switch is in
    #[command(alias = "r")]
    Remediate,
}

#[derive(Args, Debug)]
#[command(next_help_heading = "Switch")]
pub struct DeviceArgs {
    /// Address of the switch running the known-good configuration
    #[arg(long, env = "CONFIGURED_SWITCH_IP", default_value_t = config::DEFAULT_EXPECTED_ADDR)]
    pub configured_ip: IpAddr,

    /// Address the switch answers on after a factory reset
    #[arg(long, env = "DEFAULT_SWITCH_IP", default_value_t = config::DEFAULT_FACTORY_ADDR)]
    pub default_ip: IpAddr,

    /// Admin password of a factory-reset switch
    #[arg(
        long,
        env = "FACTORY_DEFAULT_PASSWORD",
        default_value = config::DEFAULT_FACTORY_PASSWORD,
        hide_env_values = true,
        hide_default_value = true
    )]
    pub factory_password: String,

    /// Admin password installed during remediation
    #[arg(
        long,
        env = "NEW_SWITCH_PASSWORD",
        default_value = config::DEFAULT_TARGET_PASSWORD,
        hide_env_values = true,
        hide_default_value = true
    )]
    pub new_password: String,

    /// Configuration file uploaded to a factory-reset switch
    #[arg(long, env = "KNOWN_GOOD_CONFIG_PATH", default_value = config::DEFAULT_KNOWN_GOOD_CONFIG)]
    pub config_path: PathBuf,

    /// Page title the management UI must show
    #[arg(long, default_value = config::DEFAULT_EXPECTED_TITLE)]
    pub expected_title: String,

    /// URL scheme of the management UI
    #[arg(long, default_value = config::DEFAULT_SCHEME)]
    pub scheme: String,
}

#[derive(Args, Debug)]
#[command(next_help_heading = "Timing")]
pub struct TimingArgs {
    /// Seconds to wait for an echo reply
    #[arg(long, value_name = "SECS", default_value_t = 5)]
    pub probe_timeout: u64,

    /// Seconds to sleep after finding the switch configured
    #[arg(long, value_name = "SECS", default_value_t = 20)]
    pub healthy_cooldown: u64,

    /// Seconds to wait after detecting a factory reset
    #[arg(long, value_name = "SECS", default_value_t = 10)]
    pub reset_settle: u64,

    /// Seconds the switch gets to apply the uploaded configuration
    #[arg(long, value_name = "SECS", default_value_t = 20)]
    pub apply_settle: u64,

    /// Seconds the switch gets to come back on its configured address
    #[arg(long, value_name = "SECS", default_value_t = 60)]
    pub reconfigure_wait: u64,

    /// Default timeout of every browser operation, in seconds
    #[arg(long, value_name = "SECS", default_value_t = 300)]
    pub operation_timeout: u64,

    /// Seconds to sleep when the switch answers on neither address
    #[arg(long, value_name = "SECS", default_value_t = 0)]
    pub unreachable_backoff: u64,

    /// Milliseconds to pause after each navigation click
    #[arg(long, value_name = "MS", default_value_t = 1000)]
    pub navigation_pause: u64,
}

#[derive(Args, Debug)]
#[command(next_help_heading = "Probing")]
pub struct ProbeArgs {
    /// auto, icmp or system
    #[arg(long, default_value_t = ProbeMethod::Auto)]
    pub probe_method: ProbeMethod,
}

#[derive(Args, Debug)]
#[command(next_help_heading = "Browser")]
pub struct WebDriverArgs {
    /// Use an already running WebDriver server instead of spawning one
    #[arg(long, env = "WEBDRIVER_URL")]
    pub webdriver_url: Option<String>,

    /// WebDriver server binary to spawn
    #[arg(long, default_value = "chromedriver")]
    pub webdriver_binary: PathBuf,

    /// Port of the spawned WebDriver server
    #[arg(long, default_value_t = 9515)]
    pub webdriver_port: u16,

    /// Show the browser window
    #[arg(long)]
    pub headful: bool,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn config(&self) -> Config {
        Config {
            device: self.device.to_address_set(),
            timing: self.timing.to_timing(),
        }
    }

    pub fn webdriver_settings(&self) -> WebDriverSettings {
        WebDriverSettings {
            server_url: self.webdriver.webdriver_url.clone(),
            binary: self.webdriver.webdriver_binary.clone(),
            port: self.webdriver.webdriver_port,
            headless: !self.webdriver.headful,
        }
    }
}

impl DeviceArgs {
    fn to_address_set(&self) -> DeviceAddressSet {
        DeviceAddressSet {
            expected_addr: self.configured_ip,
            factory_addr: self.default_ip,
            factory_password: self.factory_password.clone(),
            target_password: self.new_password.clone(),
            known_good_config: self.config_path.clone(),
            expected_title: self.expected_title.clone(),
            scheme: self.scheme.clone(),
        }
    }
}

impl TimingArgs {
    fn to_timing(&self) -> Timing {
        Timing {
            probe_timeout: Duration::from_secs(self.probe_timeout),
            healthy_cooldown: Duration::from_secs(self.healthy_cooldown),
            reset_settle: Duration::from_secs(self.reset_settle),
            unreachable_backoff: Duration::from_secs(self.unreachable_backoff),
            operation_timeout: Duration::from_secs(self.operation_timeout),
            navigation_pause: Duration::from_millis(self.navigation_pause),
            apply_settle: Duration::from_secs(self.apply_settle),
            reconfigure_wait: Duration::from_secs(self.reconfigure_wait),
        }
    }
}
