//! Error types for docpress.
//!
//! Library crates use [`DocpressError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all docpress operations.
#[derive(Debug, thiserror::Error)]
pub enum DocpressError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// A page failed to return markup. Always aborts the run.
    #[error("fetch error: {message}")]
    Fetch { message: String },

    /// Stylesheet or script reference missing from page markup while the
    /// corresponding asset was still unresolved.
    #[error("asset not found: {message}")]
    AssetNotFound { message: String },

    /// The page's main content container is absent.
    #[error("content not found: {message}")]
    ContentNotFound { message: String },

    /// The final render call failed. No retry.
    #[error("render error: {0}")]
    Render(String),

    /// The local static server failed to bind or report its address.
    #[error("server error: {0}")]
    ServerStart(String),

    /// Launching or driving the browser session failed.
    #[error("browser error: {0}")]
    Browser(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocpressError>;

impl DocpressError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a fetch error from any displayable message.
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch {
            message: msg.into(),
        }
    }

    /// Create an asset-not-found error from any displayable message.
    pub fn asset_not_found(msg: impl Into<String>) -> Self {
        Self::AssetNotFound {
            message: msg.into(),
        }
    }

    /// Create a content-not-found error from any displayable message.
    pub fn content_not_found(msg: impl Into<String>) -> Self {
        Self::ContentNotFound {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = DocpressError::fetch("no markup returned for https://example.com/docs");
        assert_eq!(
            err.to_string(),
            "fetch error: no markup returned for https://example.com/docs"
        );

        let err = DocpressError::asset_not_found("no stylesheet matching styles*.css");
        assert!(err.to_string().contains("styles*.css"));
    }
}
