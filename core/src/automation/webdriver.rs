//! # WebDriver adapter
//!
//! Maps the automation port onto a W3C WebDriver server using `fantoccini`:
//!
//! * **engine**: a spawned `chromedriver` process, or an already running
//!   server when a URL is configured.
//! * **context**: one WebDriver session with its timeouts set to the
//!   context's default timeout.
//! * **page**: one browser tab of that session.
//!
//! WebDriver has no notion of "network idle" or file-chooser events, so both
//! are approximated: idle means `document.readyState` is `complete` and no new
//! resource entries appeared for [`NETWORK_QUIET`]; a file chooser supplies
//! the files straight to the `input[type=file]` next to its trigger.

use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use fantoccini::elements::Element as WebElement;
use fantoccini::key::Key as WebKey;
use fantoccini::wd::{Capabilities, TimeoutConfiguration, WindowHandle};
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{Value, json};
use switchwatch_common::automation::{
    AutomationContext, AutomationDriver, AutomationEngine, ClickOptions, Element, FileChooser,
    Key, Page,
};
use switchwatch_common::debug;
use switchwatch_common::error::RemediationError;
use tokio::net::TcpStream;
use tokio::process::{Child, Command};
use tokio::time::{Instant, sleep};

const SERVER_STARTUP: Duration = Duration::from_secs(10);
const POLL_INTERVAL: Duration = Duration::from_millis(100);
pub const NETWORK_QUIET: Duration = Duration::from_millis(500);
const FILE_INPUT: &str = r#"input[type="file"]"#;
const IDLE_PROBE: &str =
    "return [document.readyState, performance.getEntriesByType('resource').length];";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebDriverSettings {
    /// Existing WebDriver server. When unset, `binary` is spawned on `port`.
    pub server_url: Option<String>,
    pub binary: PathBuf,
    pub port: u16,
    pub headless: bool,
}

impl Default for WebDriverSettings {
    fn default() -> Self {
        Self {
            server_url: None,
            binary: PathBuf::from("chromedriver"),
            port: 9515,
            headless: true,
        }
    }
}

pub struct WebDriverAutomation {
    settings: WebDriverSettings,
}

impl WebDriverAutomation {
    pub fn new(settings: WebDriverSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl AutomationDriver for WebDriverAutomation {
    async fn launch_engine(&self) -> anyhow::Result<Box<dyn AutomationEngine>> {
        let settings: &WebDriverSettings = &self.settings;
        let engine = match &settings.server_url {
            Some(url) => {
                debug!("Using WebDriver server at {url}");
                WebDriverEngine {
                    server_url: url.clone(),
                    server: None,
                    headless: settings.headless,
                }
            }
            None => {
                let server: Child = spawn_server(&settings.binary, settings.port).await?;
                WebDriverEngine {
                    server_url: format!("http://{}:{}", Ipv4Addr::LOCALHOST, settings.port),
                    server: Some(server),
                    headless: settings.headless,
                }
            }
        };
        Ok(Box::new(engine))
    }
}

async fn spawn_server(binary: &Path, port: u16) -> anyhow::Result<Child> {
    let mut child: Child = Command::new(binary)
        .arg(format!("--port={port}"))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("starting {}", binary.display()))?;

    let deadline: Instant = Instant::now() + SERVER_STARTUP;
    loop {
        if TcpStream::connect((Ipv4Addr::LOCALHOST, port)).await.is_ok() {
            debug!("{} listening on port {port}", binary.display());
            return Ok(child);
        }
        if let Some(status) = child.try_wait()? {
            anyhow::bail!("{} exited with {status} before accepting connections", binary.display());
        }
        if Instant::now() >= deadline {
            let _ = child.kill().await;
            anyhow::bail!(
                "{} did not listen on port {port} within {SERVER_STARTUP:?}",
                binary.display()
            );
        }
        sleep(POLL_INTERVAL).await;
    }
}

struct WebDriverEngine {
    server_url: String,
    server: Option<Child>,
    headless: bool,
}

#[async_trait]
impl AutomationEngine for WebDriverEngine {
    async fn new_context(
        &mut self,
        default_timeout: Duration,
    ) -> anyhow::Result<Box<dyn AutomationContext>> {
        let mut builder = ClientBuilder::native();
        builder.capabilities(chrome_capabilities(self.headless));
        let client: Client = builder
            .connect(&self.server_url)
            .await
            .with_context(|| format!("creating WebDriver session on {}", self.server_url))?;

        let timeouts = TimeoutConfiguration::new(Some(default_timeout), Some(default_timeout), None);
        client
            .update_timeouts(timeouts)
            .await
            .context("setting session timeouts")?;

        Ok(Box::new(WebDriverContext {
            client,
            default_timeout,
            initial_window_taken: false,
        }))
    }

    async fn close(self: Box<Self>) -> anyhow::Result<()> {
        let WebDriverEngine { server, .. } = *self;
        if let Some(mut server) = server {
            server.kill().await.context("stopping WebDriver server")?;
        }
        Ok(())
    }
}

fn chrome_capabilities(headless: bool) -> Capabilities {
    let mut args: Vec<&str> = vec!["--no-sandbox", "--disable-dev-shm-usage"];
    if headless {
        args.push("--headless=new");
    }
    let mut caps = Capabilities::new();
    caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
    caps
}

struct WebDriverContext {
    client: Client,
    default_timeout: Duration,
    initial_window_taken: bool,
}

#[async_trait]
impl AutomationContext for WebDriverContext {
    async fn new_page(&mut self) -> anyhow::Result<Box<dyn Page>> {
        // A fresh session already has one blank window; use it for the first page.
        let handle: WindowHandle = if self.initial_window_taken {
            self.client
                .new_window(true)
                .await
                .context("opening tab")?
                .handle
        } else {
            self.initial_window_taken = true;
            self.client.window().await.context("reading current window")?
        };

        Ok(Box::new(WebDriverPage {
            tab: Tab {
                client: self.client.clone(),
                handle,
                timeout: self.default_timeout,
            },
        }))
    }

    async fn close(self: Box<Self>) -> anyhow::Result<()> {
        let WebDriverContext { client, .. } = *self;
        client.close().await.context("ending WebDriver session")
    }
}

/// Tab handle shared by a page and the file choosers it hands out.
#[derive(Clone)]
struct Tab {
    client: Client,
    handle: WindowHandle,
    timeout: Duration,
}

impl Tab {
    /// Switches to this tab and into `frame`. Returns `false` when the frame
    /// is not (yet) part of the page.
    async fn focus(&self, frame: Option<&str>) -> anyhow::Result<bool> {
        self.client
            .switch_to_window(self.handle.clone())
            .await
            .context("switching tab")?;
        self.client
            .enter_frame(None)
            .await
            .context("returning to top-level document")?;

        let Some(name) = frame else {
            return Ok(true);
        };
        let selector: String = format!(r#"iframe[name="{name}"]"#);
        let frames: Vec<WebElement> = self.client.find_all(Locator::Css(&selector)).await?;
        match frames.into_iter().next() {
            Some(frame) => {
                frame
                    .enter_frame()
                    .await
                    .with_context(|| format!("entering frame {name}"))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn resolve(&self, element: &Element, timeout: Duration) -> anyhow::Result<WebElement> {
        let deadline: Instant = Instant::now() + timeout;
        loop {
            if self.focus(element.frame.as_deref()).await?
                && let Some(found) = self.find_matching(element).await?
            {
                return Ok(found);
            }
            if Instant::now() >= deadline {
                return Err(RemediationError::ElementNotFound(element.to_string()).into());
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    async fn find_matching(&self, element: &Element) -> anyhow::Result<Option<WebElement>> {
        let candidates: Vec<WebElement> = self
            .client
            .find_all(Locator::Css(&element.selector))
            .await?;

        let Some(text) = &element.text else {
            return Ok(candidates.into_iter().next());
        };
        for candidate in candidates {
            if candidate.text().await?.contains(text.as_str()) {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }
}

struct WebDriverPage {
    tab: Tab,
}

#[async_trait]
impl Page for WebDriverPage {
    async fn goto(&mut self, url: &str) -> anyhow::Result<()> {
        self.tab.focus(None).await?;
        self.tab.client.goto(url).await?;
        Ok(())
    }

    async fn title(&mut self) -> anyhow::Result<String> {
        self.tab.focus(None).await?;
        Ok(self.tab.client.title().await?)
    }

    async fn wait_for_network_idle(&mut self) -> anyhow::Result<()> {
        let deadline: Instant = Instant::now() + self.tab.timeout;
        let mut last_count: Option<u64> = None;
        let mut quiet_since: Instant = Instant::now();

        loop {
            self.tab.focus(None).await?;
            // Scripts fail while a navigation is in flight; that is just "not idle yet".
            match self.tab.client.execute(IDLE_PROBE, Vec::new()).await {
                Ok(state) => {
                    let complete: bool = state[0].as_str() == Some("complete");
                    let count: Option<u64> = state[1].as_u64();
                    if !complete || count != last_count {
                        last_count = count;
                        quiet_since = Instant::now();
                    } else if quiet_since.elapsed() >= NETWORK_QUIET {
                        return Ok(());
                    }
                }
                Err(e) => {
                    debug!("Page not ready: {e}");
                    last_count = None;
                    quiet_since = Instant::now();
                }
            }

            if Instant::now() >= deadline {
                anyhow::bail!("page did not become idle within {:?}", self.tab.timeout);
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    async fn wait_for_duration(&mut self, duration: Duration) -> anyhow::Result<()> {
        sleep(duration).await;
        Ok(())
    }

    async fn type_sequentially(&mut self, element: &Element, text: &str) -> anyhow::Result<()> {
        let target: WebElement = self.tab.resolve(element, self.tab.timeout).await?;
        target.send_keys(text).await?;
        Ok(())
    }

    async fn press_key(&mut self, element: &Element, key: Key) -> anyhow::Result<()> {
        let target: WebElement = self.tab.resolve(element, self.tab.timeout).await?;
        let key: char = char::from(match key {
            Key::Enter => WebKey::Enter,
        });
        target.send_keys(&key.to_string()).await?;
        Ok(())
    }

    async fn click(&mut self, element: &Element, options: ClickOptions) -> anyhow::Result<()> {
        let timeout: Duration = options.timeout.unwrap_or(self.tab.timeout);
        let target: WebElement = self.tab.resolve(element, timeout).await?;
        if !options.delay.is_zero() {
            sleep(options.delay).await;
        }

        if options.force {
            // A script click ignores overlays and visibility, like a forced click.
            let args: Vec<Value> = vec![serde_json::to_value(&target)?];
            self.tab
                .client
                .execute("arguments[0].click();", args)
                .await?;
        } else {
            target.click().await?;
        }
        Ok(())
    }

    async fn select_option(&mut self, element: &Element, value: &str) -> anyhow::Result<()> {
        let target: WebElement = self.tab.resolve(element, self.tab.timeout).await?;
        if target.select_by_value(value).await.is_err() {
            target
                .select_by_label(value)
                .await
                .with_context(|| format!("no option {value:?} in {element}"))?;
        }
        Ok(())
    }

    async fn await_file_chooser(
        &mut self,
        trigger: &Element,
    ) -> anyhow::Result<Box<dyn FileChooser>> {
        self.tab.resolve(trigger, self.tab.timeout).await?;
        let mut input: Element = Element::new(FILE_INPUT);
        input.frame = trigger.frame.clone();
        Ok(Box::new(WebDriverFileChooser {
            tab: self.tab.clone(),
            input,
        }))
    }
}

struct WebDriverFileChooser {
    tab: Tab,
    input: Element,
}

#[async_trait]
impl FileChooser for WebDriverFileChooser {
    async fn supply_files(self: Box<Self>, paths: &[PathBuf]) -> anyhow::Result<()> {
        let mut absolute: Vec<String> = Vec::with_capacity(paths.len());
        for path in paths {
            let resolved: PathBuf = tokio::fs::canonicalize(path)
                .await
                .with_context(|| format!("locating {}", path.display()))?;
            absolute.push(resolved.display().to_string());
        }

        let input: WebElement = self.tab.resolve(&self.input, self.tab.timeout).await?;
        input.send_keys(&absolute.join("\n")).await?;
        Ok(())
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
