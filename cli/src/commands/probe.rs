use std::sync::Arc;

use colored::*;
use switchwatch_common::config::Config;
use switchwatch_common::device::SwitchState;
use switchwatch_core::monitor::SwitchClassifier;
use switchwatch_core::network;

use crate::commands::CommandLine;
use crate::terminal::{colors, print};

/// Classifies the switch once. Never remediates.
pub async fn probe(cfg: Arc<Config>, commands: &CommandLine) -> anyhow::Result<()> {
    let classifier = SwitchClassifier::new(cfg, network::probe_for(commands.probe.probe_method));

    let state: SwitchState = classifier.classify().await;
    let color: Color = match state {
        SwitchState::Configured => colors::SUCCESS,
        SwitchState::FactoryReset => colors::FAILURE,
        SwitchState::Unreachable => colors::WARNING,
    };
    print::aligned_line("State", state.to_string().color(color).bold());
    Ok(())
}
