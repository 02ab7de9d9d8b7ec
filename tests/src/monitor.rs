#![cfg(test)]
use std::sync::Arc;
use std::time::Duration;

use switchwatch_common::config::{Config, DEFAULT_EXPECTED_ADDR, DEFAULT_FACTORY_ADDR};
use switchwatch_common::device::SwitchState;
use switchwatch_core::monitor::{PollOutcome, SwitchClassifier};
use tokio::time::Instant;

use crate::support::{self, Call, Recorder, ScriptedProbe};

fn config() -> Arc<Config> {
    Arc::new(Config::default())
}

#[tokio::test(start_paused = true)]
async fn configured_switch_only_sleeps() {
    let cfg = config();
    let recorder = Recorder::new();
    let probe = ScriptedProbe::new(&recorder, &[DEFAULT_EXPECTED_ADDR]);
    let monitor = support::monitor(&cfg, &recorder, probe);

    let started = Instant::now();
    let outcome: PollOutcome = monitor.poll_cycle().await;
    let elapsed: Duration = started.elapsed();

    assert_eq!(outcome.state, SwitchState::Configured);
    assert!(outcome.remediation.is_none());
    assert!(elapsed >= Duration::from_secs(20), "slept only {elapsed:?}");
    assert!(elapsed < Duration::from_secs(21), "slept {elapsed:?}");
    assert_eq!(recorder.calls(), vec![Call::Probe(DEFAULT_EXPECTED_ADDR)]);
}

#[tokio::test(start_paused = true)]
async fn configured_address_wins_over_factory_address() {
    let cfg = config();
    let recorder = Recorder::new();
    let probe = ScriptedProbe::new(&recorder, &[DEFAULT_EXPECTED_ADDR, DEFAULT_FACTORY_ADDR]);
    let monitor = support::monitor(&cfg, &recorder, probe);

    let outcome: PollOutcome = monitor.poll_cycle().await;

    assert_eq!(outcome.state, SwitchState::Configured);
    assert_eq!(recorder.count(|c| *c == Call::Probe(DEFAULT_FACTORY_ADDR)), 0);
    assert_eq!(recorder.count(support::is_engine_launch), 0);
}

#[tokio::test(start_paused = true)]
async fn unreachable_switch_repolls_without_sleeping() {
    let cfg = config();
    let recorder = Recorder::new();
    let probe = ScriptedProbe::new(&recorder, &[]);
    let monitor = support::monitor(&cfg, &recorder, probe);

    let started = Instant::now();
    let outcome: PollOutcome = monitor.poll_cycle().await;

    assert_eq!(outcome.state, SwitchState::Unreachable);
    assert!(outcome.remediation.is_none());
    assert_eq!(started.elapsed(), Duration::ZERO);
    assert_eq!(
        recorder.calls(),
        vec![
            Call::Probe(DEFAULT_EXPECTED_ADDR),
            Call::Probe(DEFAULT_FACTORY_ADDR)
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn unreachable_backoff_is_honoured_when_set() {
    let mut cfg = Config::default();
    cfg.timing.unreachable_backoff = Duration::from_secs(7);
    let cfg = Arc::new(cfg);
    let recorder = Recorder::new();
    let monitor = support::monitor(&cfg, &recorder, ScriptedProbe::new(&recorder, &[]));

    let started = Instant::now();
    let outcome: PollOutcome = monitor.poll_cycle().await;
    let elapsed: Duration = started.elapsed();

    assert_eq!(outcome.state, SwitchState::Unreachable);
    assert!(elapsed >= Duration::from_secs(7) && elapsed < Duration::from_secs(8));
}

#[tokio::test(start_paused = true)]
async fn factory_reset_settles_then_remediates_once() {
    let cfg = config();
    let recorder = Recorder::new();
    let probe = ScriptedProbe::new(&recorder, &[DEFAULT_FACTORY_ADDR]);
    let monitor = support::monitor(&cfg, &recorder, probe);

    let outcome: PollOutcome = monitor.poll_cycle().await;

    assert_eq!(outcome.state, SwitchState::FactoryReset);
    let report = outcome.remediation.expect("factory reset triggers remediation");
    assert!(report.is_success(), "{report:?}");
    assert_eq!(recorder.count(support::is_engine_launch), 1);

    let launched: Duration = recorder.time_of(support::is_engine_launch).unwrap();
    assert!(launched >= Duration::from_secs(10) && launched < Duration::from_secs(11));
}

#[tokio::test(start_paused = true)]
async fn probe_errors_count_as_silence() {
    let cfg = config();
    let recorder = Recorder::new();
    let probe = ScriptedProbe::new(&recorder, &[DEFAULT_FACTORY_ADDR]).failing_on(DEFAULT_EXPECTED_ADDR);
    let classifier = SwitchClassifier::new(Arc::clone(&cfg), Box::new(probe));

    assert_eq!(classifier.classify().await, SwitchState::FactoryReset);
    assert_eq!(recorder.count(support::is_engine_launch), 0);
}

#[tokio::test(start_paused = true)]
async fn failing_probes_take_the_full_timeout() {
    let cfg = config();
    let recorder = Recorder::new();
    let probe = ScriptedProbe::new(&recorder, &[])
        .failing_on(DEFAULT_EXPECTED_ADDR)
        .failing_on(DEFAULT_FACTORY_ADDR);
    let monitor = support::monitor(&cfg, &recorder, probe);

    let started = Instant::now();
    for _ in 0..3 {
        assert_eq!(monitor.poll_cycle().await.state, SwitchState::Unreachable);
    }
    let elapsed: Duration = started.elapsed();

    // Two 5 s probes per cycle, even though every probe fails at once.
    assert!(elapsed >= Duration::from_secs(30), "three cycles took {elapsed:?}");
    assert!(elapsed < Duration::from_secs(31), "three cycles took {elapsed:?}");
    assert_eq!(recorder.count(|c| matches!(c, Call::Probe(_))), 6);
}

#[tokio::test(start_paused = true)]
async fn every_factory_reset_poll_starts_a_new_cycle() {
    let cfg = config();
    let recorder = Recorder::new();
    let probe = ScriptedProbe::new(&recorder, &[DEFAULT_FACTORY_ADDR]);
    let monitor = support::monitor(&cfg, &recorder, probe);

    monitor.poll_cycle().await;
    monitor.poll_cycle().await;

    assert_eq!(recorder.count(support::is_engine_launch), 2);
    assert_eq!(recorder.count(|c| *c == Call::CloseEngine), 2);
}
