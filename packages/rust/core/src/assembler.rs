//! Document assembly and output writing.
//!
//! Assembly joins the crawl's fragment sequence into one logical document;
//! the render call happens exactly once over that document. Output lands on
//! disk through a temp-file rename so a failed run never leaves a partial
//! file at the destination.

use std::path::Path;

use tracing::{debug, info, instrument};

use docpress_crawler::{CrawlOutcome, PageDriver};
use docpress_shared::{DocpressError, RenderOptions, Result};

/// Separator between fragments in the assembled document.
const FRAGMENT_SEPARATOR: &str = "\n";

/// Join the fragment sequence into one document.
pub fn assemble_document(fragments: &[String]) -> String {
    fragments.join(FRAGMENT_SEPARATOR)
}

/// Assemble the crawl outcome and render it through the driver.
#[instrument(skip_all, fields(fragments = outcome.fragments.len()))]
pub async fn render_assembled<D: PageDriver + ?Sized>(
    driver: &D,
    outcome: &CrawlOutcome,
    options: &RenderOptions,
) -> Result<Vec<u8>> {
    let document = assemble_document(&outcome.fragments);
    debug!(document_len = document.len(), "document assembled");
    driver
        .render_document(&document, &outcome.assets, options)
        .await
}

/// Write the rendered bytes to `path`. The bytes land in a hidden sibling
/// first and are renamed over the destination, so the destination never
/// holds a partial document.
#[instrument(skip_all, fields(path = %path.display(), bytes = bytes.len()))]
pub fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| DocpressError::io(parent, e))?;
    }

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            DocpressError::config(format!(
                "output path '{}' has no file name",
                path.display()
            ))
        })?;
    let temp = path.with_file_name(format!(".{file_name}.tmp"));

    std::fs::write(&temp, bytes).map_err(|e| DocpressError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| DocpressError::io(path, e))?;

    info!(path = %path.display(), "output written");
    Ok(())
}
