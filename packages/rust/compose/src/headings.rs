//! Heading rewriting for assembled page fragments.
//!
//! Each `h1`..`h6` element gets a freshly generated anchor id so the
//! synthesized table of contents can deep-link into the final document.
//! Labels are derived from the heading's visible text: the `#` self-link
//! documentation generators inject is dropped, remaining tags are stripped,
//! and the result is trimmed.

use std::sync::LazyLock;

use rand::Rng;
use rand::distr::Alphanumeric;
use regex::{Captures, Regex};

use docpress_shared::HeadingEntry;

/// A whole heading element, non-greedy to the first closing tag of the
/// `h1`..`h6` family. Matching stays within one line: a heading element
/// broken across lines is passed through untouched.
static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<h([1-6])[^>\n]*>.*?</h[1-6] *>").expect("valid regex"));

/// The heading's opening tag.
static OPENING_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<h[1-6][^>]*>").expect("valid regex"));

/// A self-link anchor whose visible text is exactly `#`.
static SELF_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<a[^>]*>#</a *>").expect("valid regex"));

/// Any tag, for plain-text label extraction.
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

/// An existing id attribute inside an opening tag.
static ID_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"id *= *"[^"]*""#).expect("valid regex"));

/// Rewrite every heading in `fragment`, assigning anchor ids and recording
/// entries in encounter order.
///
/// `start_ordinal` is the number of headings already recorded in the run;
/// ordinals continue from it, which keeps anchor ids unique across fragments
/// even when random tokens collide.
pub fn rewrite_headings(fragment: &str, start_ordinal: usize) -> (String, Vec<HeadingEntry>) {
    let mut entries: Vec<HeadingEntry> = Vec::new();

    let rewritten = HEADING_RE.replace_all(fragment, |caps: &Captures<'_>| {
        let element = &caps[0];
        // The capture is a single ASCII digit 1-6.
        let level = caps[1].as_bytes()[0] - b'0';

        let without_self_link = SELF_LINK_RE.replace_all(element, "");
        let label = TAG_RE
            .replace_all(without_self_link.as_ref(), "")
            .trim()
            .to_string();

        let anchor_id = format!("{}-{}", random_token(), start_ordinal + entries.len());
        entries.push(HeadingEntry {
            level,
            label,
            anchor_id: anchor_id.clone(),
        });

        OPENING_TAG_RE
            .replacen(element, 1, |tag_caps: &Captures<'_>| {
                let tag = &tag_caps[0];
                if ID_ATTR_RE.is_match(tag) {
                    ID_ATTR_RE
                        .replace(tag, format!(r#"id="{anchor_id}""#))
                        .into_owned()
                } else {
                    format!(r#"{} id="{anchor_id}">"#, &tag[..tag.len() - 1])
                }
            })
            .into_owned()
    });

    (rewritten.into_owned(), entries)
}

/// Five lowercase alphanumeric characters, matching the anchor id prefix
/// format `<token>-<ordinal>`.
fn random_token() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(5)
        .map(char::from)
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor_of(entry: &HeadingEntry) -> (&str, usize) {
        let (token, ordinal) = entry
            .anchor_id
            .split_once('-')
            .expect("anchor id has token-ordinal form");
        (token, ordinal.parse().expect("numeric ordinal"))
    }

    #[test]
    fn records_entries_in_encounter_order() {
        let fragment = "<h1>First</h1><p>body</p><h3>Second</h3>";
        let (_, entries) = rewrite_headings(fragment, 0);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].label, "First");
        assert_eq!(entries[0].level, 1);
        assert_eq!(entries[1].label, "Second");
        assert_eq!(entries[1].level, 3);
    }

    #[test]
    fn ordinals_continue_from_start() {
        let (_, entries) = rewrite_headings("<h2>A</h2><h2>B</h2>", 7);

        assert_eq!(anchor_of(&entries[0]).1, 7);
        assert_eq!(anchor_of(&entries[1]).1, 8);
    }

    #[test]
    fn anchor_ids_unique_for_identical_labels() {
        let (_, entries) = rewrite_headings("<h2>Setup</h2><h2>Setup</h2>", 0);

        assert_eq!(entries[0].label, entries[1].label);
        assert_ne!(entries[0].anchor_id, entries[1].anchor_id);
    }

    #[test]
    fn anchor_token_is_five_lowercase_alphanumerics() {
        let (_, entries) = rewrite_headings("<h2>Only</h2>", 0);
        let (token, _) = anchor_of(&entries[0]);

        assert_eq!(token.len(), 5);
        assert!(token.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn injects_id_when_absent() {
        let (rewritten, entries) = rewrite_headings(r#"<h2 class="title">Intro</h2>"#, 0);
        let id = &entries[0].anchor_id;

        assert!(rewritten.contains(&format!(r#"<h2 class="title" id="{id}">Intro</h2>"#)));
    }

    #[test]
    fn replaces_existing_id_value() {
        let (rewritten, entries) = rewrite_headings(r#"<h2 id="old-anchor">Intro</h2>"#, 0);
        let id = &entries[0].anchor_id;

        assert!(rewritten.contains(&format!(r#"<h2 id="{id}">Intro</h2>"#)));
        assert!(!rewritten.contains("old-anchor"));
    }

    #[test]
    fn strips_self_link_from_label() {
        let fragment = r##"<h2>Install<a class="hash-link" href="#install">#</a></h2>"##;
        let (rewritten, entries) = rewrite_headings(fragment, 0);

        assert_eq!(entries[0].label, "Install");
        // The self-link survives in the rewritten markup, only the label drops it.
        assert!(rewritten.contains("hash-link"));
    }

    #[test]
    fn strips_nested_tags_and_trims_label() {
        let fragment = "<h4>  <code>docpress</code> usage  </h4>";
        let (_, entries) = rewrite_headings(fragment, 0);

        assert_eq!(entries[0].label, "docpress usage");
        assert_eq!(entries[0].level, 4);
    }

    #[test]
    fn leaves_headings_spanning_lines_untouched() {
        let fragment = "<h2>\n  Broken\n</h2><h2>Inline</h2>";
        let (rewritten, entries) = rewrite_headings(fragment, 0);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].label, "Inline");
        assert!(rewritten.starts_with("<h2>\n  Broken\n</h2>"));
    }

    #[test]
    fn leaves_headingless_fragments_untouched() {
        let fragment = "<p>no headings here</p>";
        let (rewritten, entries) = rewrite_headings(fragment, 0);

        assert_eq!(rewritten, fragment);
        assert!(entries.is_empty());
    }
}
