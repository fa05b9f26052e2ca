//! Local serving and configuration reading for built documentation sites.
//!
//! Build-artifact mode crawls a site that exists only as files on disk;
//! [`StaticSite`] turns that directory into a localhost origin and
//! [`load_site_config`] recovers the path settings the crawl starts from.

pub mod config;
pub mod serve;

pub use config::{load_site_config, SiteConfig, SITE_CONFIG_FILE};
pub use serve::StaticSite;
