//! End-to-end generation pipeline: crawl → assemble → render → write.
//!
//! Three entry points map to the three source modes: a live site URL, a
//! build directory served locally, and a build directory whose paths come
//! from the site's own configuration file. All of them funnel into
//! [`generate_with_driver`]; the wrappers only manage the scoped browser
//! and server resources around it.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};
use url::Url;

use docpress_browser::BrowserSession;
use docpress_crawler::{crawl, CrawlProgress, PageDriver};
use docpress_shared::{
    normalize_path_segment, BrowserOptions, DocpressError, RenderOptions, Result,
};
use docpress_site::{load_site_config, StaticSite};

use crate::assembler;

// ---------------------------------------------------------------------------
// Configuration and summary
// ---------------------------------------------------------------------------

/// Configuration for one generation run.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Where the finished document is written.
    pub output_path: PathBuf,
    /// Print options for the single render call.
    pub render: RenderOptions,
    /// Browser launch options.
    pub browser: BrowserOptions,
}

/// Source settings for build-artifact mode.
#[derive(Debug, Clone)]
pub struct BuildSourceConfig {
    /// Directory holding the site build output.
    pub build_dir: PathBuf,
    /// Route of the first docs page, relative to the base URL.
    pub first_doc_path: String,
    /// URL prefix the site is served under.
    pub base_url: String,
}

/// What a finished run reports back.
#[derive(Debug, Clone)]
pub struct GenerateSummary {
    /// Where the document was written.
    pub output_path: PathBuf,
    /// Number of pages crawled.
    pub pages_visited: usize,
    /// Number of headings collected for the table of contents.
    pub headings: usize,
    /// Whether a TOC block was inserted.
    pub toc_included: bool,
    /// Size of the written document.
    pub output_bytes: usize,
    /// Total elapsed time.
    pub elapsed: Duration,
}

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Progress callback for reporting run status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called before each page fetch with the 1-based page number.
    fn page_started(&self, url: &str, page_number: usize);
    /// Called when the run completes.
    fn done(&self, summary: &GenerateSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn page_started(&self, _url: &str, _page_number: usize) {}
    fn done(&self, _summary: &GenerateSummary) {}
}

/// Adapts a [`ProgressReporter`] to the crawl's progress interface.
struct PipelineCrawlProgress<'a> {
    inner: &'a dyn ProgressReporter,
}

impl CrawlProgress for PipelineCrawlProgress<'_> {
    fn page_started(&self, url: &str, page_number: usize) {
        self.inner.page_started(url, page_number);
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Generate a document from a live site.
#[instrument(skip_all, fields(start_url = %start_url, output = %config.output_path.display()))]
pub async fn generate_pdf(
    start_url: &Url,
    config: &GenerateConfig,
    progress: &dyn ProgressReporter,
) -> Result<GenerateSummary> {
    let start = Instant::now();

    let mut summary = run_browser_session(start_url, config, progress).await?;
    summary.elapsed = start.elapsed();

    progress.done(&summary);
    Ok(summary)
}

/// Generate a document from a site build directory on disk, serving it
/// locally for the duration of the run.
#[instrument(skip_all, fields(build_dir = %source.build_dir.display()))]
pub async fn generate_pdf_from_build(
    source: &BuildSourceConfig,
    config: &GenerateConfig,
    progress: &dyn ProgressReporter,
) -> Result<GenerateSummary> {
    let start = Instant::now();

    progress.phase("Starting local server");
    let site = StaticSite::serve(&source.build_dir, &source.base_url).await?;

    let first_doc_path = normalize_path_segment(&source.first_doc_path, true);
    let raw_url = format!("{}{}", site.base_url(), first_doc_path);
    let run = match Url::parse(&raw_url) {
        Ok(start_url) => run_browser_session(&start_url, config, progress).await,
        Err(error) => Err(DocpressError::config(format!(
            "could not build a start URL from '{raw_url}': {error}"
        ))),
    };

    // The server comes down whether the run succeeded or not.
    site.shutdown().await;

    let mut summary = run?;
    summary.elapsed = start.elapsed();

    progress.done(&summary);
    Ok(summary)
}

/// Generate a document from a site build directory, reading the docs route
/// and base URL out of the site's configuration file.
#[instrument(skip_all, fields(site_dir = %site_dir.display()))]
pub async fn generate_pdf_from_build_config(
    site_dir: &Path,
    build_dir: &Path,
    config: &GenerateConfig,
    progress: &dyn ProgressReporter,
) -> Result<GenerateSummary> {
    progress.phase("Reading site configuration");
    let site_config = load_site_config(site_dir).await?;

    let source = BuildSourceConfig {
        build_dir: build_dir.to_path_buf(),
        first_doc_path: site_config.first_doc_path,
        base_url: site_config.base_url,
    };
    generate_pdf_from_build(&source, config, progress).await
}

/// Run the crawl/assemble/render/write stages through an already-running
/// page driver. The driver's lifecycle belongs to the caller.
pub async fn generate_with_driver<D: PageDriver + ?Sized>(
    driver: &D,
    start_url: &Url,
    config: &GenerateConfig,
    progress: &dyn ProgressReporter,
) -> Result<GenerateSummary> {
    let start = Instant::now();

    progress.phase("Crawling pages");
    let crawl_progress = PipelineCrawlProgress { inner: progress };
    let outcome = crawl(driver, start_url, &crawl_progress).await?;

    progress.phase("Rendering document");
    let bytes = assembler::render_assembled(driver, &outcome, &config.render).await?;

    progress.phase("Writing output");
    assembler::write_output(&config.output_path, &bytes)?;

    let summary = GenerateSummary {
        output_path: config.output_path.clone(),
        pages_visited: outcome.pages_visited,
        headings: outcome.headings.len(),
        toc_included: outcome.toc_included,
        output_bytes: bytes.len(),
        elapsed: start.elapsed(),
    };

    info!(
        pages = summary.pages_visited,
        headings = summary.headings,
        toc_included = summary.toc_included,
        output_bytes = summary.output_bytes,
        elapsed_ms = summary.elapsed.as_millis(),
        "generation complete"
    );

    Ok(summary)
}

/// Launch the browser, run the generation stages, and tear the browser down
/// on every exit path.
async fn run_browser_session(
    start_url: &Url,
    config: &GenerateConfig,
    progress: &dyn ProgressReporter,
) -> Result<GenerateSummary> {
    progress.phase("Launching browser");
    let session = BrowserSession::launch(&config.browser).await?;

    let run = generate_with_driver(&session, start_url, config, progress).await;

    if let Err(error) = session.close().await {
        warn!(%error, "browser session did not close cleanly");
    }
    run
}
