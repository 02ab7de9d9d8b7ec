//! The three remediation steps against the switch's web management UI.
//!
//! Selectors target the NETGEAR XS712Tv2 firmware. Each step opens its own
//! page and logs in again, so a step never depends on state left behind by
//! the previous one.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use switchwatch_common::automation::{ClickOptions, Element, Key, Page};
use switchwatch_common::config::Config;
use switchwatch_common::error::RemediationError;
use switchwatch_common::{debug, info};

use super::session::RemediationSession;

pub const INITIAL_PASSWORD: &str = "initial password remediation";
pub const CONFIGURATION_RECOVERY: &str = "configuration recovery";
pub const LOGIN_VERIFICATION: &str = "login verification";

const LOGIN_PASSWORD: &str = r#"input[type="password"].loginPage_textbox"#;
const NEW_PASSWORD: &str = r#"input[type="password"][name="newPassword"]"#;
const CONFIRM_NEW_PASSWORD: &str = r#"input[type="password"][name="confirmNewPassword"]"#;

const MAINTENANCE_TAB: (&str, &str) = ("a[aid=tab_Maintenance]", "Maintenance");
const UPDATE_MENU: (&str, &str) = ("a[aid=Update]", "Update");
const FILE_UPDATE_MENU: (&str, &str) = (
    r#"a[aid="lvl1_HTTPFirmware_FileUpdate"]"#,
    "HTTP Firmware/File Update",
);

const MAIN_FRAME: &str = "maincontent";
const FILE_TYPE_SELECT: &str = r#"select[name="v_1_10_1"]"#;
const TEXT_CONFIGURATION: &str = "Text Configuration";
const BROWSE_LABEL: (&str, &str) = ("label.fakeInputFormUrl", "Browse..");
const APPLY_BUTTON: (&str, &str) = (r#"a.buttonSubmitUrl_enable[alt="Apply"]"#, "Apply");

const NAVIGATION_CLICK: ClickOptions = ClickOptions {
    delay: Duration::from_millis(100),
    timeout: Some(Duration::from_secs(5)),
    force: true,
};

/// A named unit of work against the switch UI.
///
/// Steps hold no state of their own; everything they need comes from the
/// session and the configuration.
#[async_trait]
pub trait RemediationStep: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, session: &mut RemediationSession, config: &Config) -> anyhow::Result<()>;
}

/// The workflow run on every detected factory reset, in order.
pub fn standard_workflow() -> Vec<Box<dyn RemediationStep>> {
    vec![
        Box::new(InitialPasswordStep),
        Box::new(ConfigurationRecoveryStep),
        Box::new(LoginVerificationStep),
    ]
}

/// Logs in with the factory password and installs the target password.
pub struct InitialPasswordStep;

#[async_trait]
impl RemediationStep for InitialPasswordStep {
    fn name(&self) -> &'static str {
        INITIAL_PASSWORD
    }

    async fn run(&self, session: &mut RemediationSession, config: &Config) -> anyhow::Result<()> {
        let device = &config.device;
        info!("Setting new password on {}", device.factory_addr);

        let mut page = open_management_page(session, &device.factory_url(), &device.expected_title).await?;
        login(page.as_mut(), &device.factory_password).await?;

        let new_password: Element = page.locate(NEW_PASSWORD);
        page.type_sequentially(&new_password, &device.target_password)
            .await
            .context("typing new password")?;

        let confirm: Element = page.locate(CONFIRM_NEW_PASSWORD);
        page.type_sequentially(&confirm, &device.target_password)
            .await
            .context("typing password confirmation")?;
        page.press_key(&confirm, Key::Enter).await?;
        page.wait_for_network_idle().await
    }
}

/// Uploads the known-good configuration as a text configuration file.
pub struct ConfigurationRecoveryStep;

#[async_trait]
impl RemediationStep for ConfigurationRecoveryStep {
    fn name(&self) -> &'static str {
        CONFIGURATION_RECOVERY
    }

    async fn run(&self, session: &mut RemediationSession, config: &Config) -> anyhow::Result<()> {
        let device = &config.device;
        let pause: Duration = config.timing.navigation_pause;
        info!(
            "Restoring configuration on {} from {}",
            device.factory_addr,
            device.known_good_config.display()
        );

        let mut page = open_management_page(session, &device.factory_url(), &device.expected_title).await?;
        login(page.as_mut(), &device.target_password).await?;

        for (selector, text) in [MAINTENANCE_TAB, UPDATE_MENU, FILE_UPDATE_MENU] {
            let link: Element = page.locate(selector).with_text(text);
            navigate(page.as_mut(), &link, pause).await?;
        }

        let frame = page.frame_by_name(MAIN_FRAME);
        let file_type: Element = frame.locate(FILE_TYPE_SELECT);
        page.select_option(&file_type, TEXT_CONFIGURATION)
            .await
            .context("selecting upload file type")?;
        settle(page.as_mut(), pause).await?;

        let browse: Element = frame.locate(BROWSE_LABEL.0).with_text(BROWSE_LABEL.1);
        let chooser = page.await_file_chooser(&browse).await?;
        chooser
            .supply_files(std::slice::from_ref(&device.known_good_config))
            .await
            .context("supplying known-good configuration")?;

        let apply: Element = page.locate(APPLY_BUTTON.0).with_text(APPLY_BUTTON.1);
        page.click(&apply, ClickOptions::default())
            .await
            .context("applying configuration")?;

        debug!("Giving the switch {:?} to apply the configuration", config.timing.apply_settle);
        settle(page.as_mut(), config.timing.apply_settle).await
    }
}

/// Logs in once on the configured address with the target password.
pub struct LoginVerificationStep;

#[async_trait]
impl RemediationStep for LoginVerificationStep {
    fn name(&self) -> &'static str {
        LOGIN_VERIFICATION
    }

    async fn run(&self, session: &mut RemediationSession, config: &Config) -> anyhow::Result<()> {
        let device = &config.device;
        info!(
            "Waiting {:?} for the switch to reconfigure before logging in on {}",
            config.timing.reconfigure_wait, device.expected_addr
        );
        tokio::time::sleep(config.timing.reconfigure_wait).await;

        let mut page = open_management_page(session, &device.expected_url(), &device.expected_title).await?;
        login(page.as_mut(), &device.target_password).await
    }
}

async fn open_management_page(
    session: &mut RemediationSession,
    url: &str,
    expected_title: &str,
) -> anyhow::Result<Box<dyn Page>> {
    let mut page: Box<dyn Page> = session.new_page().await?;
    page.goto(url).await.with_context(|| format!("opening {url}"))?;
    verify_device(page.as_mut(), expected_title).await?;
    page.wait_for_network_idle().await?;
    Ok(page)
}

async fn verify_device(page: &mut dyn Page, expected_title: &str) -> anyhow::Result<()> {
    let title: String = page.title().await.context("reading page title")?;
    if !title.contains(expected_title) {
        return Err(RemediationError::UnexpectedDevice {
            expected: expected_title.to_string(),
            found: title,
        }
        .into());
    }
    Ok(())
}

async fn login(page: &mut dyn Page, password: &str) -> anyhow::Result<()> {
    let field: Element = page.locate(LOGIN_PASSWORD);
    page.type_sequentially(&field, password)
        .await
        .context("typing login password")?;
    page.press_key(&field, Key::Enter).await?;
    page.wait_for_network_idle().await
}

async fn navigate(page: &mut dyn Page, link: &Element, pause: Duration) -> anyhow::Result<()> {
    page.click(link, NAVIGATION_CLICK)
        .await
        .with_context(|| format!("clicking {link}"))?;
    settle(page, pause).await
}

async fn settle(page: &mut dyn Page, pause: Duration) -> anyhow::Result<()> {
    page.wait_for_duration(pause).await?;
    page.wait_for_network_idle().await
}
