//! Scenario tests of the watcher against scripted probes and a recording
//! automation driver. Every test runs on a paused clock, so the long fixed
//! waits of the control loop elapse instantly but stay measurable.

mod monitor;
mod support;
