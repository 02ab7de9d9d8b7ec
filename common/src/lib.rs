//! # Shared building blocks
//!
//! Configuration, domain models and the outbound ports used by the
//! monitor and the remediation workflow.
//!
//! * **[`config`]**: the immutable device description and loop timings.
//! * **[`device`]**: switch classification.
//! * **[`probe`]**: the reachability probe port.
//! * **[`automation`]**: the UI automation driver port.
//! * **[`error`]**: domain failures raised by remediation steps.

pub mod automation;
pub mod config;
pub mod device;
pub mod error;
pub mod logging;
pub mod probe;

#[doc(hidden)]
pub use tracing as __tracing;
