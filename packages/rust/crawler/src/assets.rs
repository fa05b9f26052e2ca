//! Stylesheet and script reference extraction from raw page markup.
//!
//! Documentation sites ship their styling as hashed bundles whose names
//! carry a `styles` token (`styles.65a0e4fd.css`, `styles.f2e54a36.js`).
//! The locators scan for the first such reference and resolve it against
//! the crawl origin, so the final document can point back at the live site
//! for its look and feel.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use docpress_shared::{DocpressError, Result};

/// First quoted `href` value containing a `styles` token and a `.css` tail.
static STYLESHEET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href="([^"]*styles[^"]*?\.css)""#).expect("valid regex"));

/// First quoted `src` value containing a `styles` token and a `.js` tail.
static SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"src="([^"]*styles[^"]*?\.js)""#).expect("valid regex"));

/// Find the site stylesheet referenced by `markup`, resolved against `origin`.
pub fn locate_stylesheet(markup: &str, origin: &str) -> Result<Url> {
    let path = STYLESHEET_RE
        .captures(markup)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| {
            DocpressError::asset_not_found(
                "no stylesheet reference matching styles*.css found in page markup",
            )
        })?;
    origin_relative(origin, &path)
}

/// Find the site script bundle referenced by `markup`, resolved against `origin`.
pub fn locate_script(markup: &str, origin: &str) -> Result<Url> {
    let path = SCRIPT_RE
        .captures(markup)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| {
            DocpressError::asset_not_found(
                "no script reference matching styles*.js found in page markup",
            )
        })?;
    origin_relative(origin, &path)
}

/// Resolve a captured asset path against the crawl origin. Captured paths
/// are treated as origin-relative whether or not they carry a leading slash.
fn origin_relative(origin: &str, path: &str) -> Result<Url> {
    let absolute = format!(
        "{}/{}",
        origin.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&absolute).map_err(|e| {
        DocpressError::asset_not_found(format!(
            "asset path '{path}' did not resolve against origin {origin}: {e}"
        ))
    })
}
