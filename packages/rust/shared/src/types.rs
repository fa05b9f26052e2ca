//! Core domain types for docpress runs.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::error::{DocpressError, Result};

// ---------------------------------------------------------------------------
// HeadingEntry
// ---------------------------------------------------------------------------

/// One heading discovered during the crawl, in encounter order.
///
/// Entries exist only for headings seen on or after the page carrying the
/// table-of-contents marker. They are immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingEntry {
    /// Heading level, 1 through 6.
    pub level: u8,
    /// Plain-text label with tags and self-links stripped, trimmed.
    pub label: String,
    /// Anchor id injected into the rewritten heading, unique within the run.
    pub anchor_id: String,
}

// ---------------------------------------------------------------------------
// ResolvedAssets
// ---------------------------------------------------------------------------

/// Stylesheet and script URLs lifted from page markup.
///
/// Each field is write-once: the first page that yields a match wins and
/// later pages are never consulted for that field again.
#[derive(Debug, Clone, Default)]
pub struct ResolvedAssets {
    /// Absolute URL of the site stylesheet bundle.
    pub stylesheet_url: Option<Url>,
    /// Absolute URL of the site script bundle.
    pub script_url: Option<Url>,
}

// ---------------------------------------------------------------------------
// Length
// ---------------------------------------------------------------------------

/// Units accepted in margin specifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthUnit {
    Px,
    In,
    Mm,
    Cm,
}

/// A single margin length, e.g. `25px` or `1in`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    pub value: f64,
    pub unit: LengthUnit,
}

impl Length {
    pub const fn px(value: f64) -> Self {
        Self {
            value,
            unit: LengthUnit::Px,
        }
    }

    /// Convert to inches for the print call (96 px/in, 25.4 mm/in, 2.54 cm/in).
    pub fn to_inches(self) -> f64 {
        match self.unit {
            LengthUnit::Px => self.value / 96.0,
            LengthUnit::In => self.value,
            LengthUnit::Mm => self.value / 25.4,
            LengthUnit::Cm => self.value / 2.54,
        }
    }
}

impl FromStr for Length {
    type Err = DocpressError;

    fn from_str(s: &str) -> Result<Self> {
        let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            return Err(DocpressError::config(format!(
                "invalid margin length '{s}': expected digits with an optional unit"
            )));
        }
        let value: f64 = digits
            .parse()
            .map_err(|_| DocpressError::config(format!("invalid margin length '{s}'")))?;
        let unit = match &s[digits.len()..] {
            "" | "px" => LengthUnit::Px,
            "in" => LengthUnit::In,
            "mm" => LengthUnit::Mm,
            "cm" => LengthUnit::Cm,
            other => {
                return Err(DocpressError::config(format!(
                    "unknown margin unit '{other}' in '{s}' (expected px, in, mm, or cm)"
                )));
            }
        };
        Ok(Self { value, unit })
    }
}

impl std::fmt::Display for Length {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let unit = match self.unit {
            LengthUnit::Px => "px",
            LengthUnit::In => "in",
            LengthUnit::Mm => "mm",
            LengthUnit::Cm => "cm",
        };
        write!(f, "{}{unit}", self.value)
    }
}

// ---------------------------------------------------------------------------
// Margins
// ---------------------------------------------------------------------------

/// Page margins in CSS shorthand order: top, right, bottom, left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: Length,
    pub right: Length,
    pub bottom: Length,
    pub left: Length,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: Length::px(25.0),
            right: Length::px(35.0),
            bottom: Length::px(25.0),
            left: Length::px(35.0),
        }
    }
}

impl FromStr for Margins {
    type Err = DocpressError;

    /// Parse a margin string of exactly four specifiers, e.g.
    /// `"25px 35px 25px 35px"`.
    fn from_str(s: &str) -> Result<Self> {
        static SPECIFIER_RE: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"\d+[a-z]{0,2}").expect("valid regex"));

        let specifiers: Vec<&str> = SPECIFIER_RE.find_iter(s).map(|m| m.as_str()).collect();
        if specifiers.len() != 4 {
            return Err(DocpressError::config(format!(
                "expected exactly 4 margin values (top right bottom left), got {} in '{s}'",
                specifiers.len()
            )));
        }

        Ok(Self {
            top: specifiers[0].parse()?,
            right: specifiers[1].parse()?,
            bottom: specifiers[2].parse()?,
            left: specifiers[3].parse()?,
        })
    }
}

impl std::fmt::Display for Margins {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}

// ---------------------------------------------------------------------------
// PageFormat
// ---------------------------------------------------------------------------

/// Output paper format for the print call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageFormat {
    A0,
    A1,
    A2,
    A3,
    #[default]
    A4,
    A5,
    A6,
    Letter,
    Legal,
    Tabloid,
    Ledger,
}

impl PageFormat {
    /// Paper dimensions in inches, `(width, height)`.
    pub fn paper_size(self) -> (f64, f64) {
        match self {
            Self::A0 => (33.1, 46.8),
            Self::A1 => (23.4, 33.1),
            Self::A2 => (16.54, 23.4),
            Self::A3 => (11.7, 16.54),
            Self::A4 => (8.27, 11.7),
            Self::A5 => (5.83, 8.27),
            Self::A6 => (4.13, 5.83),
            Self::Letter => (8.5, 11.0),
            Self::Legal => (8.5, 14.0),
            Self::Tabloid => (11.0, 17.0),
            Self::Ledger => (17.0, 11.0),
        }
    }
}

impl FromStr for PageFormat {
    type Err = DocpressError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "a0" => Ok(Self::A0),
            "a1" => Ok(Self::A1),
            "a2" => Ok(Self::A2),
            "a3" => Ok(Self::A3),
            "a4" => Ok(Self::A4),
            "a5" => Ok(Self::A5),
            "a6" => Ok(Self::A6),
            "letter" => Ok(Self::Letter),
            "legal" => Ok(Self::Legal),
            "tabloid" => Ok(Self::Tabloid),
            "ledger" => Ok(Self::Ledger),
            other => Err(DocpressError::config(format!(
                "unknown page format '{other}' (expected A0-A6, Letter, Legal, Tabloid, or Ledger)"
            ))),
        }
    }
}

impl std::fmt::Display for PageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::A0 => "A0",
            Self::A1 => "A1",
            Self::A2 => "A2",
            Self::A3 => "A3",
            Self::A4 => "A4",
            Self::A5 => "A5",
            Self::A6 => "A6",
            Self::Letter => "Letter",
            Self::Legal => "Legal",
            Self::Tabloid => "Tabloid",
            Self::Ledger => "Ledger",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// RenderOptions
// ---------------------------------------------------------------------------

/// Options handed to the single render call.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub format: PageFormat,
    pub margin: Margins,
    /// Print CSS backgrounds. On by default.
    pub print_background: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            format: PageFormat::A4,
            margin: Margins::default(),
            print_background: true,
        }
    }
}

// ---------------------------------------------------------------------------
// BrowserOptions
// ---------------------------------------------------------------------------

/// Launch options for the headless browser session.
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// Run Chromium with its sandbox. Disable only in containers that
    /// cannot grant the sandbox's privileges.
    pub sandbox: bool,
    /// Extra command-line arguments passed through to the browser.
    pub args: Vec<String>,
    /// Explicit browser executable; auto-detected when unset.
    pub executable: Option<String>,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            sandbox: true,
            args: Vec::new(),
            executable: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn margin_string_parses_four_specifiers() {
        let margins: Margins = "25px 35px 25px 35px".parse().expect("parse margins");
        assert_eq!(margins.top, Length::px(25.0));
        assert_eq!(margins.right, Length::px(35.0));
        assert_eq!(margins.bottom, Length::px(25.0));
        assert_eq!(margins.left, Length::px(35.0));
    }

    #[test]
    fn margin_string_accepts_mixed_units_and_bare_numbers() {
        let margins: Margins = "1in 10mm 2cm 40".parse().expect("parse margins");
        assert_eq!(margins.top.unit, LengthUnit::In);
        assert_eq!(margins.right.unit, LengthUnit::Mm);
        assert_eq!(margins.bottom.unit, LengthUnit::Cm);
        assert_eq!(margins.left.unit, LengthUnit::Px);
    }

    #[test]
    fn margin_string_rejects_wrong_count() {
        let err = "10px 20px 30px".parse::<Margins>().unwrap_err();
        assert!(err.to_string().contains("exactly 4 margin values"));

        let err = "10px 20px 30px 40px 50px".parse::<Margins>().unwrap_err();
        assert!(err.to_string().contains("exactly 4 margin values"));
    }

    #[test]
    fn length_rejects_unknown_unit() {
        let err = "25pt".parse::<Length>().unwrap_err();
        assert!(err.to_string().contains("unknown margin unit 'pt'"));

        // The rejection surfaces at parse time, not at the print call.
        let err = "25em 35px 25px 35px".parse::<Margins>().unwrap_err();
        assert!(err.to_string().contains("unknown margin unit 'em'"));
    }

    #[test]
    fn length_converts_to_inches() {
        assert!((Length::px(96.0).to_inches() - 1.0).abs() < 1e-9);
        assert!(("1in".parse::<Length>().unwrap().to_inches() - 1.0).abs() < 1e-9);
        assert!(("254mm".parse::<Length>().unwrap().to_inches() - 10.0).abs() < 1e-9);
        assert!(("254cm".parse::<Length>().unwrap().to_inches() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn page_format_parses_case_insensitively() {
        assert_eq!("a4".parse::<PageFormat>().unwrap(), PageFormat::A4);
        assert_eq!("LETTER".parse::<PageFormat>().unwrap(), PageFormat::Letter);
        assert_eq!("Tabloid".parse::<PageFormat>().unwrap(), PageFormat::Tabloid);
        assert!("b5".parse::<PageFormat>().is_err());
    }

    #[test]
    fn page_format_paper_sizes() {
        let (w, h) = PageFormat::A4.paper_size();
        assert!((w - 8.27).abs() < 1e-9);
        assert!((h - 11.7).abs() < 1e-9);

        let (w, h) = PageFormat::Letter.paper_size();
        assert!((w - 8.5).abs() < 1e-9);
        assert!((h - 11.0).abs() < 1e-9);
    }
}
