//! Table-of-contents synthesis over the assembled fragment sequence.
//!
//! Pages stream through [`TocSynthesizer::process_fragment`] in crawl order.
//! The first fragment containing the literal `<toc></toc>` or `<toc/>`
//! marker is split at the marker: the prefix is appended untouched, the
//! insertion point is recorded, and from the marker onward every fragment
//! (including the marker page's remainder) is heading-rewritten. After the
//! crawl, [`TocSynthesizer::finalize`] splices the rendered block in at the
//! recorded index. Without a marker the synthesizer is a passthrough.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use docpress_shared::HeadingEntry;

use crate::headings::rewrite_headings;

/// Literal marker, open/close pair or self-closing form. Case-sensitive.
static TOC_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("(<toc></toc>)|(<toc/>)").expect("valid regex"));

/// Left indent per heading level in the rendered block.
const INDENT_PER_LEVEL_PX: usize = 20;

/// Two-state synthesizer: before the marker it passes fragments through
/// verbatim; once the marker is seen there is no way back.
#[derive(Debug, Default)]
pub struct TocSynthesizer {
    insertion_index: Option<usize>,
    entries: Vec<HeadingEntry>,
}

impl TocSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index in the assembled sequence where the block will be spliced,
    /// once the marker has been seen.
    pub fn insertion_index(&self) -> Option<usize> {
        self.insertion_index
    }

    /// Headings recorded so far, in encounter order across the whole run.
    pub fn headings(&self) -> &[HeadingEntry] {
        &self.entries
    }

    /// Process one page's content fragment, appending its output (one
    /// fragment, or two for the marker page) to the assembled sequence.
    pub fn process_fragment(&mut self, fragment: &str, sequence: &mut Vec<String>) {
        if self.insertion_index.is_none() {
            match TOC_MARKER_RE.find(fragment) {
                Some(marker) => {
                    sequence.push(fragment[..marker.start()].to_string());
                    self.insertion_index = Some(sequence.len());
                    debug!(insertion_index = sequence.len(), "toc marker found");
                    // The marker text stays at the head of the suffix;
                    // browsers render the unknown element as nothing.
                    self.append_rewritten(&fragment[marker.start()..], sequence);
                }
                None => sequence.push(fragment.to_string()),
            }
            return;
        }

        self.append_rewritten(fragment, sequence);
    }

    fn append_rewritten(&mut self, fragment: &str, sequence: &mut Vec<String>) {
        let (rewritten, new_entries) = rewrite_headings(fragment, self.entries.len());
        self.entries.extend(new_entries);
        sequence.push(rewritten);
    }

    /// Splice the rendered block into the sequence at the recorded index and
    /// return the heading entries. A no-op splice when the marker never
    /// appeared.
    pub fn finalize(self, sequence: &mut Vec<String>) -> Vec<HeadingEntry> {
        if let Some(index) = self.insertion_index {
            debug!(
                insertion_index = index,
                headings = self.entries.len(),
                "splicing toc block"
            );
            sequence.insert(index, render_toc_block(&self.entries));
        }
        self.entries
    }
}

/// Render the heading entries into the block spliced into the document:
/// a caption followed by one indented, anchor-linked item per entry.
pub fn render_toc_block(entries: &[HeadingEntry]) -> String {
    let items = entries
        .iter()
        .map(|entry| {
            format!(
                r##"<li class="toc-item" style="margin-left:{}px"><a href="#{}">{}</a></li>"##,
                (usize::from(entry.level) - 1) * INDENT_PER_LEVEL_PX,
                entry.anchor_id,
                entry.label
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(r#"<h2 class="toc-header">Table of contents:</h2><ul class="toc-list">{items}</ul>"#)
}
