use std::time::Duration;

use anyhow::Context;
use switchwatch_common::automation::{AutomationContext, AutomationDriver, AutomationEngine, Page};
use switchwatch_common::error::RemediationError;
use switchwatch_common::{debug, info};

/// Automation resources of one remediation cycle.
///
/// Created empty when a cycle starts, filled by [`establish`](Self::establish)
/// and consumed by [`release`](Self::release). When setup fails half way the
/// session keeps whatever was acquired so teardown can still close it.
#[derive(Default)]
pub struct RemediationSession {
    engine: Option<Box<dyn AutomationEngine>>,
    context: Option<Box<dyn AutomationContext>>,
}

impl RemediationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn establish(
        &mut self,
        driver: &dyn AutomationDriver,
        default_timeout: Duration,
    ) -> anyhow::Result<()> {
        info!("Starting automation engine");
        let mut engine: Box<dyn AutomationEngine> = driver
            .launch_engine()
            .await
            .context("launching automation engine")?;

        let context = engine.new_context(default_timeout).await;
        self.engine = Some(engine);
        self.context = Some(context.context("opening automation context")?);
        debug!("Automation context ready, default timeout {default_timeout:?}");
        Ok(())
    }

    pub async fn new_page(&mut self) -> anyhow::Result<Box<dyn Page>> {
        let context = self.context.as_mut().ok_or(RemediationError::NoContext)?;
        context.new_page().await.context("opening page")
    }

    /// Closes the context, then the engine. Both are attempted even when the
    /// first one fails.
    pub async fn release(mut self) -> anyhow::Result<()> {
        info!("Shutting down automation engine");
        let mut failures: Vec<String> = Vec::new();

        if let Some(context) = self.context.take()
            && let Err(e) = context.close().await
        {
            failures.push(format!("closing automation context: {e:#}"));
        }

        if let Some(engine) = self.engine.take()
            && let Err(e) = engine.close().await
        {
            failures.push(format!("closing automation engine: {e:#}"));
        }

        if failures.is_empty() {
            Ok(())
        } else {
            anyhow::bail!("{}", failures.join("; "))
        }
    }
}
