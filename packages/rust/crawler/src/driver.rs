//! The page-session seam between the crawl engine and the browser.

use async_trait::async_trait;
use url::Url;

use docpress_shared::{RenderOptions, ResolvedAssets, Result};

/// One live browser-like page that the crawl drives.
///
/// The engine is written against this trait; `docpress-browser` provides the
/// Chromium-backed implementation and tests provide in-memory fakes. Selector
/// queries operate on the most recently loaded page.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to `url` and return the fully rendered page markup.
    async fn navigate_and_fetch(&self, url: &Url) -> Result<String>;

    /// Absolute target URL of the first anchor matching `selector` in the
    /// currently loaded page, or `None` when nothing matches.
    async fn query_selector_href(&self, selector: &str) -> Result<Option<String>>;

    /// Serialized markup of the first element matching `selector` in the
    /// currently loaded page, or `None` when nothing matches.
    async fn query_selector_outer_html(&self, selector: &str) -> Result<Option<String>>;

    /// Render `html` with the given assets attached by reference, returning
    /// the document bytes. Called exactly once per run, after assembly.
    async fn render_document(
        &self,
        html: &str,
        assets: &ResolvedAssets,
        options: &RenderOptions,
    ) -> Result<Vec<u8>>;
}
