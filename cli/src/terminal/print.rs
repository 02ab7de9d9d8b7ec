use std::fmt::Display;
use std::path::Path;

use colored::*;
use switchwatch_common::config::{Config, Timing};
use switchwatch_common::warn;
use tracing::info;
use unicode_width::UnicodeWidthStr;

use crate::commands::CommandLine;
use crate::terminal::colors;
use crate::terminal::logging::PRINT_TARGET;

pub const TOTAL_WIDTH: usize = 64;
const KEY_WIDTH: usize = 28;

pub trait WithDefaultColor {
    fn with_default(self, default_color: Color) -> ColoredString;
}

impl WithDefaultColor for &str {
    fn with_default(self, default_color: Color) -> ColoredString {
        self.color(default_color)
    }
}

impl WithDefaultColor for String {
    fn with_default(self, default_color: Color) -> ColoredString {
        self.color(default_color)
    }
}

impl WithDefaultColor for ColoredString {
    fn with_default(self, _default_color: Color) -> ColoredString {
        self
    }
}

pub fn print(msg: &str) {
    info!(target: PRINT_TARGET, "{msg}");
}

pub fn banner() {
    let text_content: String = format!("⟦ SWITCHWATCH v{} ⟧ ", env!("CARGO_PKG_VERSION"));
    let text_width: usize = UnicodeWidthStr::width(text_content.as_str());
    let text: ColoredString = text_content.color(colors::PRIMARY).bold();
    let sep: ColoredString = "═"
        .repeat(TOTAL_WIDTH.saturating_sub(text_width) / 2)
        .color(colors::SEPARATOR);
    print(&format!("{sep}{text}{sep}"));
}

pub fn header(msg: &str) {
    let formatted: String = format!("⟦ {} ⟧", msg);
    let msg_len: usize = UnicodeWidthStr::width(formatted.as_str());

    let dash_count: usize = TOTAL_WIDTH.saturating_sub(msg_len);
    let left: usize = dash_count / 2;
    let right: usize = dash_count - left;

    let line: String = format!(
        "{}{}{}",
        "─".repeat(left).color(colors::SEPARATOR),
        formatted.to_uppercase().color(colors::PRIMARY),
        "─".repeat(right).color(colors::SEPARATOR)
    );
    print(&line);
}

pub fn aligned_line<V>(key: &str, value: V)
where
    V: Display + WithDefaultColor,
{
    let dots: String = ".".repeat((KEY_WIDTH + 1).saturating_sub(key.len()));
    let colon: String = format!(
        "{}{}",
        dots.color(colors::SEPARATOR),
        ":".color(colors::SEPARATOR)
    );
    let value: ColoredString = value.with_default(colors::TEXT_DEFAULT);
    print_status(format!("{}{} {}", key.color(colors::ACCENT), colon, value));
}

pub fn print_status<T: AsRef<str>>(msg: T) {
    let prefix: ColoredString = ">".color(colors::SEPARATOR);
    print(&format!("{} {}", prefix, msg.as_ref()));
}

/// Effective configuration, passwords masked.
pub fn configuration(cfg: &Config, commands: &CommandLine) {
    header("configuration");
    let device = &cfg.device;
    aligned_line("Configured address", device.expected_addr.to_string());
    aligned_line("Factory default address", device.factory_addr.to_string());
    aligned_line("Factory password", secret());
    aligned_line("New password", secret());
    aligned_line("Known-good configuration", device.known_good_config.display().to_string());
    aligned_line("Expected title", device.expected_title.as_str());
    aligned_line("Probe method", commands.probe.probe_method.to_string());

    let browser: String = match &commands.webdriver.webdriver_url {
        Some(url) => url.clone(),
        None => format!(
            "{} on port {}",
            commands.webdriver.webdriver_binary.display(),
            commands.webdriver.webdriver_port
        ),
    };
    aligned_line("WebDriver", browser);
    timing(&cfg.timing);
}

fn timing(timing: &Timing) {
    aligned_line("Probe timeout", format!("{:?}", timing.probe_timeout));
    aligned_line("Healthy cooldown", format!("{:?}", timing.healthy_cooldown));
    aligned_line("Reset settle", format!("{:?}", timing.reset_settle));
    aligned_line("Unreachable backoff", format!("{:?}", timing.unreachable_backoff));
    aligned_line("Operation timeout", format!("{:?}", timing.operation_timeout));
}

fn secret() -> ColoredString {
    "********".color(colors::SECRET)
}

pub fn missing_config_warning(path: &Path) {
    if !path.is_file() {
        warn!(
            "Known-good configuration {} does not exist, configuration recovery will fail",
            path.display().to_string().color(colors::WARNING)
        );
    }
}

pub fn end_of_program() {
    print(&"═".repeat(TOTAL_WIDTH).color(colors::SEPARATOR).to_string());
}
