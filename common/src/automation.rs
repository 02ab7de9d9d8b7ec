//! # UI Automation Port
//!
//! The contract the remediation workflow needs from a browser automation
//! backend. Nothing here knows how pages are rendered; adapters in
//! `switchwatch-core` implement it (WebDriver) and the tests script it.
//!
//! Lifetimes follow the resource hierarchy: an [`AutomationEngine`] hands out
//! [`AutomationContext`]s, a context hands out [`Page`]s. Closing consumes the
//! handle, so a closed engine or context cannot be reused.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

/// Entry point of an automation backend.
#[async_trait]
pub trait AutomationDriver: Send + Sync {
    async fn launch_engine(&self) -> anyhow::Result<Box<dyn AutomationEngine>>;
}

#[async_trait]
pub trait AutomationEngine: Send {
    /// Opens an isolated working context whose operations time out after
    /// `default_timeout` unless told otherwise.
    async fn new_context(
        &mut self,
        default_timeout: Duration,
    ) -> anyhow::Result<Box<dyn AutomationContext>>;

    async fn close(self: Box<Self>) -> anyhow::Result<()>;
}

#[async_trait]
pub trait AutomationContext: Send {
    async fn new_page(&mut self) -> anyhow::Result<Box<dyn Page>>;

    async fn close(self: Box<Self>) -> anyhow::Result<()>;
}

/// One browser tab.
///
/// Element actions take an [`Element`] description and resolve it at call
/// time, so a description can be built before the page has loaded.
#[async_trait]
pub trait Page: Send {
    async fn goto(&mut self, url: &str) -> anyhow::Result<()>;

    async fn title(&mut self) -> anyhow::Result<String>;

    /// Waits until the page has loaded and stopped issuing requests.
    async fn wait_for_network_idle(&mut self) -> anyhow::Result<()>;

    async fn wait_for_duration(&mut self, duration: Duration) -> anyhow::Result<()>;

    /// Types `text` one key at a time, like a user would.
    async fn type_sequentially(&mut self, element: &Element, text: &str) -> anyhow::Result<()>;

    async fn press_key(&mut self, element: &Element, key: Key) -> anyhow::Result<()>;

    async fn click(&mut self, element: &Element, options: ClickOptions) -> anyhow::Result<()>;

    async fn select_option(&mut self, element: &Element, value: &str) -> anyhow::Result<()>;

    /// Resolves `trigger` and returns a chooser that supplies files to the
    /// file input in the trigger's frame.
    async fn await_file_chooser(&mut self, trigger: &Element)
    -> anyhow::Result<Box<dyn FileChooser>>;

    fn locate(&self, selector: &str) -> Element {
        Element::new(selector)
    }

    fn frame_by_name(&self, name: &str) -> Frame {
        Frame::new(name)
    }
}

#[async_trait]
pub trait FileChooser: Send {
    async fn supply_files(self: Box<Self>, paths: &[PathBuf]) -> anyhow::Result<()>;
}

/// Description of an element: a CSS selector, optionally scoped to a named
/// frame and narrowed to elements whose visible text contains `text`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Element {
    pub frame: Option<String>,
    pub selector: String,
    pub text: Option<String>,
}

impl Element {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            frame: None,
            selector: selector.into(),
            text: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn in_frame(mut self, frame: impl Into<String>) -> Self {
        self.frame = Some(frame.into());
        self
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(frame) = &self.frame {
            write!(f, "iframe[name=\"{frame}\"] >> ")?;
        }
        f.write_str(&self.selector)?;
        if let Some(text) = &self.text {
            write!(f, ":has-text(\"{text}\")")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Frame {
    name: String,
}

impl Frame {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn locate(&self, selector: &str) -> Element {
        Element::new(selector).in_frame(self.name.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Enter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClickOptions {
    /// Time between pressing and releasing the button.
    pub delay: Duration,
    /// Overrides the context's default timeout for finding the element.
    pub timeout: Option<Duration>,
    /// Skips actionability checks (visibility, overlap).
    pub force: bool,
}
