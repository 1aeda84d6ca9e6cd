//! Driver layer for browser automation.
//!
//! This crate owns the WebDriver session used to render pages before their
//! content is extracted.
//!
//! - [`skimmer_browser::driver::SkimmerDriver`]: WebDriver client wrapper
//! - [`skimmer_browser::options::BrowserSettings`]: endpoint, window mode and
//!   optional chromedriver binary
//! - [`skimmer_browser::process::ChromedriverProcess`]: spawned chromedriver child
pub mod skimmer_browser;
