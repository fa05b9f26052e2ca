//! Reading path settings out of a Docusaurus site configuration.
//!
//! The configuration is a JavaScript module; rather than executing it, the
//! loader scans the source for the two quoted settings a crawl needs. This
//! covers the common literal forms and ignores computed values.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use docpress_shared::{DocpressError, Result};

/// File the loader looks for inside the site directory.
pub const SITE_CONFIG_FILE: &str = "docusaurus.config.js";

/// Docs route used when the configuration does not set one.
const DEFAULT_FIRST_DOC_PATH: &str = "docs";

static ROUTE_BASE_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"routeBasePath\s*:\s*["']([^"']*)["']"#).expect("valid regex")
});
static BASE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"baseUrl\s*:\s*["']([^"']*)["']"#).expect("valid regex"));

/// Path settings lifted from a site configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    /// Route of the first docs page, relative to the base URL.
    pub first_doc_path: String,
    /// URL prefix the whole site is served under.
    pub base_url: String,
}

/// Read `docusaurus.config.js` from `site_dir` and extract the docs route
/// and base URL. A route set more than once resolves to the last occurrence,
/// with a warning.
pub async fn load_site_config(site_dir: &Path) -> Result<SiteConfig> {
    let config_path = site_dir.join(SITE_CONFIG_FILE);
    let source = tokio::fs::read_to_string(&config_path).await.map_err(|_| {
        DocpressError::config(format!("could not read '{}'", config_path.display()))
    })?;

    let route_base_paths: Vec<String> = ROUTE_BASE_PATH_RE
        .captures_iter(&source)
        .map(|caps| caps[1].to_string())
        .collect();

    let first_doc_path = match route_base_paths.as_slice() {
        [] => DEFAULT_FIRST_DOC_PATH.to_string(),
        [only] => only.clone(),
        [.., last] => {
            warn!(
                count = route_base_paths.len(),
                picked = %last,
                config = %config_path.display(),
                "found multiple routeBasePath settings, picking the last"
            );
            last.clone()
        }
    };

    let base_url = BASE_URL_RE
        .captures(&source)
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| "/".to_string());

    debug!(%first_doc_path, %base_url, "site config loaded");

    Ok(SiteConfig {
        first_doc_path,
        base_url,
    })
}
