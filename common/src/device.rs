//! # Switch classification
//!
//! The state of the guarded switch as seen from one poll cycle.

use std::fmt;

/// Derived from two reachability probes each cycle and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwitchState {
    /// The switch answers on its configured address.
    Configured,
    /// Only the factory-default address answers: the switch was reset.
    FactoryReset,
    /// Neither address answers.
    Unreachable,
}

impl SwitchState {
    /// Maps the two probe results onto a state.
    ///
    /// `factory_alive` is `None` when the factory address was never probed,
    /// which only happens when the configured address already answered.
    pub fn classify(expected_alive: bool, factory_alive: Option<bool>) -> Self {
        match (expected_alive, factory_alive) {
            (true, _) => SwitchState::Configured,
            (false, Some(true)) => SwitchState::FactoryReset,
            (false, _) => SwitchState::Unreachable,
        }
    }

    pub fn is_anomaly(&self) -> bool {
        matches!(self, SwitchState::FactoryReset)
    }
}

impl fmt::Display for SwitchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SwitchState::Configured => "configured",
            SwitchState::FactoryReset => "factory reset",
            SwitchState::Unreachable => "unreachable",
        };
        f.write_str(label)
    }
}
