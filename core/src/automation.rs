//! Concrete implementations of the automation port.
//!
//! * [`webdriver`]: drives Chrome through a W3C WebDriver server.

pub mod webdriver;

pub use webdriver::{WebDriverAutomation, WebDriverSettings};
