//! Chromium-backed page driver.
//!
//! Implements [`docpress_crawler::PageDriver`] on top of a headless browser
//! launched through the DevTools protocol.

pub mod print;
pub mod session;

pub use print::print_params;
pub use session::BrowserSession;
