//! Pagination crawl over a rendered documentation site.
//!
//! This crate provides:
//! - [`driver`] — The [`PageDriver`] seam a browser session implements
//! - [`assets`] — Stylesheet/script reference lifting from page markup
//! - [`engine`] — The sequential "next page" crawl loop
pub mod assets;
pub mod driver;
pub mod engine;

pub use assets::{locate_script, locate_stylesheet};
pub use driver::PageDriver;
pub use engine::{
    crawl, CrawlOutcome, CrawlProgress, SilentCrawl, CONTENT_SELECTOR, NEXT_PAGE_SELECTOR,
};
