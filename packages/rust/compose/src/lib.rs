//! Content transforms for the assembled document: heading rewriting and
//! table-of-contents synthesis.
//!
//! Everything here is pure string work over page content fragments. The
//! scanning is deliberately regex-based (no structural HTML parse) and kept
//! behind this crate's API so the crawl engine never touches markup details.

pub mod headings;
pub mod toc;

pub use headings::rewrite_headings;
pub use toc::{TocSynthesizer, render_toc_block};
