//! Sequential "next page" pagination crawl.
//!
//! The engine walks a linear chain of documentation pages: fetch a page,
//! lift the stylesheet/script references the first time they appear, extract
//! the main content container, pipe it through the table-of-contents
//! synthesizer, then follow the "next" navigation anchor until the chain
//! ends. One page is fully processed before the next fetch begins.

use tracing::{debug, info, instrument};
use url::Url;

use docpress_compose::TocSynthesizer;
use docpress_shared::{DocpressError, HeadingEntry, ResolvedAssets, Result};

use crate::assets;
use crate::driver::PageDriver;

/// Selector for a page's main content container.
pub const CONTENT_SELECTOR: &str = "article";

/// Selector for the "next page" navigation anchor.
pub const NEXT_PAGE_SELECTOR: &str = ".pagination-nav__item--next > a";

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Observer for per-page crawl progress.
pub trait CrawlProgress: Send + Sync {
    /// Called before each page fetch with the 1-based page number.
    fn page_started(&self, url: &str, page_number: usize);
}

/// No-op progress reporter for library use and tests.
pub struct SilentCrawl;

impl CrawlProgress for SilentCrawl {
    fn page_started(&self, _url: &str, _page_number: usize) {}
}

// ---------------------------------------------------------------------------
// CrawlOutcome
// ---------------------------------------------------------------------------

/// Everything a finished crawl hands to the assembler.
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// Ordered content fragments, TOC block already spliced in when a marker
    /// appeared (the marker page contributes its split halves).
    pub fragments: Vec<String>,
    /// Assets lifted from page markup, write-once per field.
    pub assets: ResolvedAssets,
    /// Headings recorded from the marker page onward, in encounter order.
    pub headings: Vec<HeadingEntry>,
    /// Number of pages visited.
    pub pages_visited: usize,
    /// Whether a TOC block was spliced into the sequence.
    pub toc_included: bool,
}

// ---------------------------------------------------------------------------
// Crawl session
// ---------------------------------------------------------------------------

/// Per-run crawl state: created at run start, mutated only by the loop and
/// the synthesizer, consumed once by the assembler, then discarded.
struct CrawlSession {
    cursor: Option<Url>,
    origin: String,
    assets: ResolvedAssets,
    fragments: Vec<String>,
    synthesizer: TocSynthesizer,
    pages_visited: usize,
}

/// Walk the "next page" chain from `start_url`, returning the assembled
/// fragment sequence and everything needed to render it.
#[instrument(skip_all, fields(start_url = %start_url))]
pub async fn crawl<D: PageDriver + ?Sized>(
    driver: &D,
    start_url: &Url,
    progress: &dyn CrawlProgress,
) -> Result<CrawlOutcome> {
    let mut session = CrawlSession {
        cursor: Some(start_url.clone()),
        origin: start_url.origin().ascii_serialization(),
        assets: ResolvedAssets::default(),
        fragments: Vec::new(),
        synthesizer: TocSynthesizer::new(),
        pages_visited: 0,
    };

    while let Some(url) = session.cursor.take() {
        session.pages_visited += 1;
        progress.page_started(url.as_str(), session.pages_visited);
        info!(%url, page = session.pages_visited, "retrieving page");

        let markup = driver.navigate_and_fetch(&url).await?;
        if markup.trim().is_empty() {
            return Err(DocpressError::fetch(format!(
                "page could not be loaded: no markup returned for {url}"
            )));
        }

        // The first page carrying each asset wins; once a field is set,
        // later pages are never consulted for it.
        if session.assets.stylesheet_url.is_none() {
            session.assets.stylesheet_url =
                Some(assets::locate_stylesheet(&markup, &session.origin)?);
        }
        if session.assets.script_url.is_none() {
            session.assets.script_url = Some(assets::locate_script(&markup, &session.origin)?);
        }

        let fragment = driver
            .query_selector_outer_html(CONTENT_SELECTOR)
            .await?
            .ok_or_else(|| {
                DocpressError::content_not_found(format!(
                    "no '{CONTENT_SELECTOR}' element found on {url}"
                ))
            })?;

        session.cursor = next_page_url(driver, &url).await?;

        session
            .synthesizer
            .process_fragment(&fragment, &mut session.fragments);

        debug!(
            fragments = session.fragments.len(),
            has_next = session.cursor.is_some(),
            "page processed"
        );
    }

    let toc_included = session.synthesizer.insertion_index().is_some();
    let headings = session.synthesizer.finalize(&mut session.fragments);

    info!(
        pages = session.pages_visited,
        fragments = session.fragments.len(),
        headings = headings.len(),
        toc_included,
        "crawl completed"
    );

    Ok(CrawlOutcome {
        fragments: session.fragments,
        assets: session.assets,
        headings,
        pages_visited: session.pages_visited,
        toc_included,
    })
}

/// Resolve the next page's URL. A missing anchor, an empty href, or a target
/// that does not resolve is the normal end of the chain, never an error.
async fn next_page_url<D: PageDriver + ?Sized>(driver: &D, current: &Url) -> Result<Option<Url>> {
    let href = driver.query_selector_href(NEXT_PAGE_SELECTOR).await?;
    Ok(href
        .filter(|href| !href.is_empty())
        .and_then(|href| match current.join(&href) {
            Ok(next) => Some(next),
            Err(error) => {
                debug!(%href, %error, "next link did not resolve, ending crawl");
                None
            }
        }))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use scraper::{Html, Selector};

    use docpress_shared::RenderOptions;

    use super::*;

    /// In-memory driver backed by a map of URL -> page markup. Selector
    /// queries run against the most recently loaded page through a real DOM
    /// parse, mirroring how the browser driver evaluates them in the tab.
    struct FakeDriver {
        pages: HashMap<String, String>,
        loaded: Mutex<Option<(Url, String)>>,
    }

    impl FakeDriver {
        fn new(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(url, markup)| (url.to_string(), markup.to_string()))
                    .collect(),
                loaded: Mutex::new(None),
            }
        }

        fn with_loaded<T>(&self, f: impl FnOnce(&Url, &Html) -> T) -> T {
            let guard = self.loaded.lock().expect("driver lock");
            let (url, markup) = guard.as_ref().expect("a page is loaded");
            f(url, &Html::parse_document(markup))
        }
    }

    #[async_trait]
    impl PageDriver for FakeDriver {
        async fn navigate_and_fetch(&self, url: &Url) -> Result<String> {
            let markup = self.pages.get(url.as_str()).cloned().ok_or_else(|| {
                DocpressError::fetch(format!("navigation failed for {url}"))
            })?;
            *self.loaded.lock().expect("driver lock") = Some((url.clone(), markup.clone()));
            Ok(markup)
        }

        async fn query_selector_href(&self, selector: &str) -> Result<Option<String>> {
            let sel = Selector::parse(selector).expect("valid selector");
            Ok(self.with_loaded(|url, doc| {
                doc.select(&sel)
                    .next()
                    .and_then(|el| el.value().attr("href"))
                    .and_then(|href| url.join(href).ok())
                    .map(|abs| abs.to_string())
            }))
        }

        async fn query_selector_outer_html(&self, selector: &str) -> Result<Option<String>> {
            let sel = Selector::parse(selector).expect("valid selector");
            Ok(self.with_loaded(|_, doc| doc.select(&sel).next().map(|el| el.html())))
        }

        async fn render_document(
            &self,
            html: &str,
            _assets: &ResolvedAssets,
            _options: &RenderOptions,
        ) -> Result<Vec<u8>> {
            Ok(html.as_bytes().to_vec())
        }
    }

    fn page(article: &str, next_href: Option<&str>) -> String {
        let nav = next_href
            .map(|href| {
                format!(
                    r#"<nav><div class="pagination-nav__item--next"><a href="{href}">Next</a></div></nav>"#
                )
            })
            .unwrap_or_default();
        format!(
            r#"<html><head>
<link rel="stylesheet" href="/assets/css/styles.65a0e4fd.css">
<script src="/assets/js/styles.f2e54a36.js"></script>
</head><body>{article}{nav}</body></html>"#
        )
    }

    fn start_url() -> Url {
        Url::parse("https://docs.example.com/docs/intro").expect("valid url")
    }

    #[tokio::test]
    async fn walks_chain_until_next_link_missing() {
        let driver = FakeDriver::new(&[
            (
                "https://docs.example.com/docs/intro",
                &page("<article><h2>A</h2></article>", Some("/docs/install")),
            ),
            (
                "https://docs.example.com/docs/install",
                &page("<article><h2>B</h2></article>", Some("/docs/usage")),
            ),
            (
                "https://docs.example.com/docs/usage",
                &page("<article><h2>C</h2></article>", None),
            ),
        ]);

        let outcome = crawl(&driver, &start_url(), &SilentCrawl)
            .await
            .expect("crawl");

        assert_eq!(outcome.pages_visited, 3);
        assert_eq!(outcome.fragments.len(), 3);
        assert!(outcome.headings.is_empty());
        assert!(!outcome.toc_included);
        // No marker: fragments pass through verbatim.
        assert_eq!(outcome.fragments[0], "<article><h2>A</h2></article>");
        assert_eq!(outcome.fragments[2], "<article><h2>C</h2></article>");
    }

    #[tokio::test]
    async fn assets_come_from_the_first_page() {
        let driver = FakeDriver::new(&[
            (
                "https://docs.example.com/docs/intro",
                &page("<article>one</article>", Some("/docs/next")),
            ),
            (
                // No asset references at all; must not abort the run.
                "https://docs.example.com/docs/next",
                "<html><body><article>two</article></body></html>",
            ),
        ]);

        let outcome = crawl(&driver, &start_url(), &SilentCrawl)
            .await
            .expect("crawl");

        assert_eq!(outcome.pages_visited, 2);
        assert_eq!(
            outcome.assets.stylesheet_url.as_ref().map(Url::as_str),
            Some("https://docs.example.com/assets/css/styles.65a0e4fd.css")
        );
        assert_eq!(
            outcome.assets.script_url.as_ref().map(Url::as_str),
            Some("https://docs.example.com/assets/js/styles.f2e54a36.js")
        );
    }

    #[tokio::test]
    async fn missing_stylesheet_on_first_page_aborts() {
        let driver = FakeDriver::new(&[(
            "https://docs.example.com/docs/intro",
            "<html><body><article>content</article></body></html>",
        )]);

        let err = crawl(&driver, &start_url(), &SilentCrawl)
            .await
            .unwrap_err();

        assert!(matches!(err, DocpressError::AssetNotFound { .. }));
    }

    #[tokio::test]
    async fn missing_content_container_aborts() {
        let driver = FakeDriver::new(&[(
            "https://docs.example.com/docs/intro",
            &page("<main>not an article</main>", None),
        )]);

        let err = crawl(&driver, &start_url(), &SilentCrawl)
            .await
            .unwrap_err();

        assert!(matches!(err, DocpressError::ContentNotFound { .. }));
    }

    #[tokio::test]
    async fn navigation_failure_aborts() {
        let driver = FakeDriver::new(&[]);

        let err = crawl(&driver, &start_url(), &SilentCrawl)
            .await
            .unwrap_err();

        assert!(matches!(err, DocpressError::Fetch { .. }));
    }

    #[tokio::test]
    async fn empty_markup_aborts() {
        let driver = FakeDriver::new(&[("https://docs.example.com/docs/intro", "   ")]);

        let err = crawl(&driver, &start_url(), &SilentCrawl)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("no markup returned"));
    }

    #[tokio::test]
    async fn marker_page_splits_and_toc_is_spliced() {
        let driver = FakeDriver::new(&[
            (
                "https://docs.example.com/docs/intro",
                &page(
                    "<article><toc></toc><h2>Intro</h2></article>",
                    Some("/docs/details"),
                ),
            ),
            (
                "https://docs.example.com/docs/details",
                &page("<article><h2>Details</h2></article>", None),
            ),
        ]);

        let outcome = crawl(&driver, &start_url(), &SilentCrawl)
            .await
            .expect("crawl");

        assert!(outcome.toc_included);
        // Marker-prefix, TOC block, marker page remainder, page 2.
        assert_eq!(outcome.fragments.len(), 4);
        assert_eq!(outcome.fragments[0], "<article>");
        assert!(outcome.fragments[1].starts_with(r#"<h2 class="toc-header">"#));
        assert!(outcome.fragments[2].starts_with("<toc></toc>"));

        assert_eq!(outcome.headings.len(), 2);
        assert_eq!(outcome.headings[0].label, "Intro");
        assert_eq!(outcome.headings[1].label, "Details");
        assert_ne!(outcome.headings[0].anchor_id, outcome.headings[1].anchor_id);

        // Both headings are h2, so both block items share the same indent.
        let block = &outcome.fragments[1];
        assert_eq!(block.matches(r#"style="margin-left:20px""#).count(), 2);
    }

    #[tokio::test]
    async fn heading_order_is_preserved_across_pages() {
        let driver = FakeDriver::new(&[
            (
                "https://docs.example.com/docs/intro",
                &page(
                    "<article><toc></toc><h2>One</h2><h3>Two</h3></article>",
                    Some("/docs/more"),
                ),
            ),
            (
                "https://docs.example.com/docs/more",
                &page("<article><h2>Three</h2></article>", None),
            ),
        ]);

        let outcome = crawl(&driver, &start_url(), &SilentCrawl)
            .await
            .expect("crawl");

        let labels: Vec<&str> = outcome
            .headings
            .iter()
            .map(|entry| entry.label.as_str())
            .collect();
        assert_eq!(labels, vec!["One", "Two", "Three"]);
    }
}
