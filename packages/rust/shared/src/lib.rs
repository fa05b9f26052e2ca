//! Shared types, error model, and configuration for docpress.
//!
//! This crate is the foundation depended on by all other docpress crates.
//! It provides:
//! - [`DocpressError`] — the unified error type
//! - Domain types ([`HeadingEntry`], [`ResolvedAssets`], [`RenderOptions`])
//! - Configuration ([`AppConfig`], config loading)
//! - Path-segment normalization shared by the crawl modes

pub mod config;
pub mod error;
pub mod paths;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BrowserConfig, RenderConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from,
};
pub use error::{DocpressError, Result};
pub use paths::normalize_path_segment;
pub use types::{
    BrowserOptions, HeadingEntry, Length, LengthUnit, Margins, PageFormat, RenderOptions,
    ResolvedAssets,
};
