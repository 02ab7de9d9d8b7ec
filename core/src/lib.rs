//! # Switchwatch core
//!
//! The detection and remediation control loop plus the adapters it runs on.
//!
//! * **[`monitor`]**: classifies the switch every poll cycle and triggers remediation.
//! * **[`remediation`]**: the setup, steps, teardown workflow and its report.
//! * **[`network`]**: reachability probes (raw ICMP, system `ping`).
//! * **[`automation`]**: the WebDriver implementation of the automation port.

pub mod automation;
pub mod monitor;
pub mod network;
pub mod remediation;
