#![cfg(test)]
//! Scripted fakes of the probe and automation ports.

use std::collections::HashSet;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use switchwatch_common::automation::{
    AutomationContext, AutomationDriver, AutomationEngine, ClickOptions, Element, FileChooser,
    Key, Page,
};
use switchwatch_common::config::{Config, DEFAULT_EXPECTED_TITLE};
use switchwatch_common::probe::ReachabilityProbe;
use switchwatch_core::monitor::ReachabilityMonitor;
use switchwatch_core::remediation::RemediationOrchestrator;
use tokio::time::Instant;

pub const FOREIGN_TITLE: &str = "Some Other Router";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Probe(IpAddr),
    LaunchEngine,
    NewContext(Duration),
    NewPage,
    Goto(String),
    Title,
    NetworkIdle,
    Wait(Duration),
    Type { element: Element, text: String },
    Press { element: Element, key: Key },
    Click { element: Element, options: ClickOptions },
    Select { element: Element, value: String },
    FileChooser(Element),
    SupplyFiles(Vec<PathBuf>),
    CloseContext,
    CloseEngine,
}

/// Every call made through the fakes, stamped with the (paused) time since
/// the recorder was created.
pub struct Recorder {
    start: Instant,
    calls: Mutex<Vec<(Duration, Call)>>,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            start: Instant::now(),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn record(&self, call: Call) {
        let at: Duration = self.start.elapsed();
        self.calls.lock().unwrap().push((at, call));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, call)| call.clone())
            .collect()
    }

    /// Time of the first call matching `pred`.
    pub fn time_of(&self, pred: impl Fn(&Call) -> bool) -> Option<Duration> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .find(|(_, call)| pred(call))
            .map(|(at, _)| *at)
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|&call| pred(call)).count()
    }

    pub fn typed_texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Type { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Selector of every typed-into field, in order.
    pub fn typed_fields(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Type { element, .. } => Some(element.selector),
                _ => None,
            })
            .collect()
    }

    /// Selector and visible text of every clicked element, in order.
    pub fn clicked(&self) -> Vec<(String, Option<String>)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Click { element, .. } => Some((element.selector, element.text)),
                _ => None,
            })
            .collect()
    }

    pub fn visited_urls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Goto(url) => Some(url),
                _ => None,
            })
            .collect()
    }
}

pub struct ScriptedProbe {
    alive: HashSet<IpAddr>,
    failing: HashSet<IpAddr>,
    recorder: Arc<Recorder>,
}

impl ScriptedProbe {
    pub fn new(recorder: &Arc<Recorder>, alive: &[IpAddr]) -> Self {
        Self {
            alive: alive.iter().copied().collect(),
            failing: HashSet::new(),
            recorder: Arc::clone(recorder),
        }
    }

    /// Probing `addr` returns an error instead of an answer.
    pub fn failing_on(mut self, addr: IpAddr) -> Self {
        self.failing.insert(addr);
        self
    }
}

#[async_trait]
impl ReachabilityProbe for ScriptedProbe {
    async fn probe(&self, addr: IpAddr, _timeout: Duration) -> anyhow::Result<bool> {
        self.recorder.record(Call::Probe(addr));
        if self.failing.contains(&addr) {
            anyhow::bail!("probe socket unavailable");
        }
        Ok(self.alive.contains(&addr))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Faults {
    pub launch: bool,
    pub new_context: bool,
    pub close_context: bool,
    /// Index of the page (in opening order) that shows a foreign title.
    pub foreign_title_on_page: Option<usize>,
}

pub struct RecordingDriver {
    recorder: Arc<Recorder>,
    faults: Faults,
}

impl RecordingDriver {
    pub fn new(recorder: &Arc<Recorder>, faults: Faults) -> Self {
        Self {
            recorder: Arc::clone(recorder),
            faults,
        }
    }
}

#[async_trait]
impl AutomationDriver for RecordingDriver {
    async fn launch_engine(&self) -> anyhow::Result<Box<dyn AutomationEngine>> {
        self.recorder.record(Call::LaunchEngine);
        if self.faults.launch {
            anyhow::bail!("browser binary not found");
        }
        Ok(Box::new(RecordingEngine {
            recorder: Arc::clone(&self.recorder),
            faults: self.faults.clone(),
        }))
    }
}

struct RecordingEngine {
    recorder: Arc<Recorder>,
    faults: Faults,
}

#[async_trait]
impl AutomationEngine for RecordingEngine {
    async fn new_context(
        &mut self,
        default_timeout: Duration,
    ) -> anyhow::Result<Box<dyn AutomationContext>> {
        self.recorder.record(Call::NewContext(default_timeout));
        if self.faults.new_context {
            anyhow::bail!("session not created");
        }
        Ok(Box::new(RecordingContext {
            recorder: Arc::clone(&self.recorder),
            faults: self.faults.clone(),
            pages_opened: 0,
        }))
    }

    async fn close(self: Box<Self>) -> anyhow::Result<()> {
        self.recorder.record(Call::CloseEngine);
        Ok(())
    }
}

struct RecordingContext {
    recorder: Arc<Recorder>,
    faults: Faults,
    pages_opened: usize,
}

#[async_trait]
impl AutomationContext for RecordingContext {
    async fn new_page(&mut self) -> anyhow::Result<Box<dyn Page>> {
        self.recorder.record(Call::NewPage);
        let index: usize = self.pages_opened;
        self.pages_opened += 1;

        let title: &str = if self.faults.foreign_title_on_page == Some(index) {
            FOREIGN_TITLE
        } else {
            DEFAULT_EXPECTED_TITLE
        };
        Ok(Box::new(RecordingPage {
            recorder: Arc::clone(&self.recorder),
            title: format!("{title} - Login"),
        }))
    }

    async fn close(self: Box<Self>) -> anyhow::Result<()> {
        self.recorder.record(Call::CloseContext);
        if self.faults.close_context {
            anyhow::bail!("session already gone");
        }
        Ok(())
    }
}

struct RecordingPage {
    recorder: Arc<Recorder>,
    title: String,
}

#[async_trait]
impl Page for RecordingPage {
    async fn goto(&mut self, url: &str) -> anyhow::Result<()> {
        self.recorder.record(Call::Goto(url.to_string()));
        Ok(())
    }

    async fn title(&mut self) -> anyhow::Result<String> {
        self.recorder.record(Call::Title);
        Ok(self.title.clone())
    }

    async fn wait_for_network_idle(&mut self) -> anyhow::Result<()> {
        self.recorder.record(Call::NetworkIdle);
        Ok(())
    }

    async fn wait_for_duration(&mut self, duration: Duration) -> anyhow::Result<()> {
        self.recorder.record(Call::Wait(duration));
        tokio::time::sleep(duration).await;
        Ok(())
    }

    async fn type_sequentially(&mut self, element: &Element, text: &str) -> anyhow::Result<()> {
        self.recorder.record(Call::Type {
            element: element.clone(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn press_key(&mut self, element: &Element, key: Key) -> anyhow::Result<()> {
        self.recorder.record(Call::Press {
            element: element.clone(),
            key,
        });
        Ok(())
    }

    async fn click(&mut self, element: &Element, options: ClickOptions) -> anyhow::Result<()> {
        self.recorder.record(Call::Click {
            element: element.clone(),
            options,
        });
        Ok(())
    }

    async fn select_option(&mut self, element: &Element, value: &str) -> anyhow::Result<()> {
        self.recorder.record(Call::Select {
            element: element.clone(),
            value: value.to_string(),
        });
        Ok(())
    }

    async fn await_file_chooser(
        &mut self,
        trigger: &Element,
    ) -> anyhow::Result<Box<dyn FileChooser>> {
        self.recorder.record(Call::FileChooser(trigger.clone()));
        Ok(Box::new(RecordingChooser {
            recorder: Arc::clone(&self.recorder),
        }))
    }
}

struct RecordingChooser {
    recorder: Arc<Recorder>,
}

#[async_trait]
impl FileChooser for RecordingChooser {
    async fn supply_files(self: Box<Self>, paths: &[PathBuf]) -> anyhow::Result<()> {
        self.recorder.record(Call::SupplyFiles(paths.to_vec()));
        Ok(())
    }
}

pub fn orchestrator(config: &Arc<Config>, recorder: &Arc<Recorder>, faults: Faults) -> RemediationOrchestrator {
    RemediationOrchestrator::new(
        Arc::clone(config),
        Box::new(RecordingDriver::new(recorder, faults)),
    )
}

pub fn monitor(config: &Arc<Config>, recorder: &Arc<Recorder>, probe: ScriptedProbe) -> ReachabilityMonitor {
    ReachabilityMonitor::new(
        Arc::clone(config),
        Box::new(probe),
        orchestrator(config, recorder, Faults::default()),
    )
}

pub fn is_engine_launch(call: &Call) -> bool {
    matches!(call, Call::LaunchEngine)
}
