//! Application configuration for docpress.
//!
//! User config lives at `~/.docpress/docpress.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DocpressError, Result};
use crate::types::{BrowserOptions, Margins, RenderOptions};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "docpress.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".docpress";

// ---------------------------------------------------------------------------
// Config structs (matching docpress.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Render defaults.
    #[serde(default)]
    pub render: RenderConfig,

    /// Browser launch settings.
    #[serde(default)]
    pub browser: BrowserConfig,
}

/// `[render]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Paper format name (A0-A6, Letter, Legal, Tabloid, Ledger).
    #[serde(default = "default_format")]
    pub format: String,

    /// Margin string: four specifiers, top right bottom left.
    #[serde(default = "default_margin")]
    pub margin: String,

    /// Print CSS backgrounds.
    #[serde(default = "default_true")]
    pub print_background: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            margin: default_margin(),
            print_background: true,
        }
    }
}

fn default_format() -> String {
    "A4".into()
}
fn default_margin() -> String {
    "25px 35px 25px 35px".into()
}
fn default_true() -> bool {
    true
}

/// `[browser]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Run Chromium with its sandbox enabled.
    #[serde(default = "default_true")]
    pub sandbox: bool,

    /// Extra command-line arguments passed through to the browser.
    #[serde(default)]
    pub args: Vec<String>,

    /// Explicit browser executable path; auto-detected when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            sandbox: true,
            args: Vec::new(),
            executable: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Runtime option resolution (config file -> runtime types)
// ---------------------------------------------------------------------------

impl TryFrom<&AppConfig> for RenderOptions {
    type Error = DocpressError;

    fn try_from(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            format: config.render.format.parse()?,
            margin: config.render.margin.parse::<Margins>()?,
            print_background: config.render.print_background,
        })
    }
}

impl From<&AppConfig> for BrowserOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            sandbox: config.browser.sandbox,
            args: config.browser.args.clone(),
            executable: config.browser.executable.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.docpress/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| DocpressError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.docpress/docpress.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DocpressError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| DocpressError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| DocpressError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| DocpressError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DocpressError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
