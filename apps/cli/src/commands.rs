//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use docpress_core::pipeline::{
    BuildSourceConfig, GenerateConfig, GenerateSummary, ProgressReporter,
};
use docpress_shared::{AppConfig, BrowserOptions, RenderOptions, init_config, load_config};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use url::Url;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// docpress — turn a documentation website into a single PDF.
#[derive(Parser)]
#[command(
    name = "docpress",
    version,
    about = "Crawl next-linked documentation pages and print them as one PDF.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Paper format (A0-A6, Letter, Legal, Tabloid, Ledger).
    #[arg(long, global = true)]
    pub format: Option<String>,

    /// Page margins: four values in order top, right, bottom, left.
    #[arg(long, global = true)]
    pub margin: Option<String>,

    /// Do not print CSS backgrounds.
    #[arg(long, global = true)]
    pub no_print_background: bool,

    /// Launch the browser without its sandbox.
    #[arg(long, global = true)]
    pub no_sandbox: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Generate a PDF from a documentation site that is already hosted.
    FromWebsite {
        /// URL of the first docs page.
        url: String,

        /// Output file path.
        #[arg(default_value = "docs.pdf")]
        output_file: PathBuf,
    },

    /// Generate a PDF from a site build directory on disk.
    FromBuild {
        /// Path to the build directory.
        build_dir: PathBuf,

        /// Route of the first docs page, e.g. docs/intro.
        first_doc_path: String,

        /// URL prefix the site was built for.
        #[arg(default_value = "/")]
        base_url: String,

        /// Output file path.
        #[arg(short, long, default_value = "docs.pdf")]
        output_file: PathBuf,
    },

    /// Generate a PDF from a build directory, reading the docs route and
    /// base URL from the site's own configuration file.
    FromBuildConfig {
        /// Path to the build directory.
        #[arg(default_value = "build")]
        build_dir: PathBuf,

        /// Directory containing the site configuration file.
        #[arg(long, default_value = "./")]
        site_dir: PathBuf,

        /// Output file path.
        #[arg(short, long, default_value = "docs.pdf")]
        output_file: PathBuf,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "info,chromiumoxide=warn,hyper=warn,tower_http=warn",
        1 => "debug,chromiumoxide=info,hyper=info,tower_http=info",
        _ => "trace",
    };

    // DOCPRESS_LOG replaces the verbosity flags entirely when set.
    let env_filter =
        EnvFilter::try_from_env("DOCPRESS_LOG").unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let overrides = cli.overrides();

    match cli.command {
        Command::FromWebsite { url, output_file } => {
            cmd_from_website(&url, output_file, &overrides).await
        }
        Command::FromBuild {
            build_dir,
            first_doc_path,
            base_url,
            output_file,
        } => cmd_from_build(build_dir, first_doc_path, base_url, output_file, &overrides).await,
        Command::FromBuildConfig {
            build_dir,
            site_dir,
            output_file,
        } => cmd_from_build_config(build_dir, site_dir, output_file, &overrides).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Option resolution (defaults < config file < flags)
// ---------------------------------------------------------------------------

/// Flag values that override the config file for a generation run.
struct FlagOverrides {
    format: Option<String>,
    margin: Option<String>,
    no_print_background: bool,
    no_sandbox: bool,
}

impl Cli {
    fn overrides(&self) -> FlagOverrides {
        FlagOverrides {
            format: self.format.clone(),
            margin: self.margin.clone(),
            no_print_background: self.no_print_background,
            no_sandbox: self.no_sandbox,
        }
    }
}

fn resolve_render_options(overrides: &FlagOverrides, config: &AppConfig) -> Result<RenderOptions> {
    let mut render = RenderOptions::try_from(config)?;

    if let Some(format) = &overrides.format {
        render.format = format.parse()?;
    }
    if let Some(margin) = &overrides.margin {
        render.margin = margin.parse()?;
    }
    if overrides.no_print_background {
        render.print_background = false;
    }

    Ok(render)
}

fn resolve_browser_options(overrides: &FlagOverrides, config: &AppConfig) -> BrowserOptions {
    let mut browser = BrowserOptions::from(config);
    if overrides.no_sandbox {
        browser.sandbox = false;
    }
    browser
}

fn build_generate_config(
    overrides: &FlagOverrides,
    output_path: PathBuf,
) -> Result<GenerateConfig> {
    let config = load_config()?;

    Ok(GenerateConfig {
        output_path,
        render: resolve_render_options(overrides, &config)?,
        browser: resolve_browser_options(overrides, &config),
    })
}

// ---------------------------------------------------------------------------
// Generation command handlers
// ---------------------------------------------------------------------------

async fn cmd_from_website(
    url: &str,
    output_file: PathBuf,
    overrides: &FlagOverrides,
) -> Result<()> {
    let generate = build_generate_config(overrides, output_file)?;

    let start_url = Url::parse(url).map_err(|e| eyre!("invalid URL '{url}': {e}"))?;

    info!(
        url,
        output = %generate.output_path.display(),
        "generating PDF from website"
    );

    let reporter = CliProgress::new();
    let summary = docpress_core::pipeline::generate_pdf(&start_url, &generate, &reporter).await?;

    print_summary(&summary);
    Ok(())
}

async fn cmd_from_build(
    build_dir: PathBuf,
    first_doc_path: String,
    base_url: String,
    output_file: PathBuf,
    overrides: &FlagOverrides,
) -> Result<()> {
    let generate = build_generate_config(overrides, output_file)?;

    let source = BuildSourceConfig {
        build_dir,
        first_doc_path,
        base_url,
    };

    info!(
        build_dir = %source.build_dir.display(),
        first_doc_path = %source.first_doc_path,
        "generating PDF from build directory"
    );

    let reporter = CliProgress::new();
    let summary =
        docpress_core::pipeline::generate_pdf_from_build(&source, &generate, &reporter).await?;

    print_summary(&summary);
    Ok(())
}

async fn cmd_from_build_config(
    build_dir: PathBuf,
    site_dir: PathBuf,
    output_file: PathBuf,
    overrides: &FlagOverrides,
) -> Result<()> {
    let generate = build_generate_config(overrides, output_file)?;

    info!(
        site_dir = %site_dir.display(),
        build_dir = %build_dir.display(),
        "generating PDF from site configuration"
    );

    let reporter = CliProgress::new();
    let summary = docpress_core::pipeline::generate_pdf_from_build_config(
        &site_dir, &build_dir, &generate, &reporter,
    )
    .await?;

    print_summary(&summary);
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn page_started(&self, url: &str, page_number: usize) {
        self.spinner
            .set_message(format!("Retrieving [{page_number}] {url}"));
    }

    fn done(&self, _summary: &GenerateSummary) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// Summary output
// ---------------------------------------------------------------------------

fn print_summary(summary: &GenerateSummary) {
    println!();
    println!("  PDF generated successfully!");
    println!("  Output:   {}", summary.output_path.display());
    println!("  Pages:    {}", summary.pages_visited);
    println!("  Headings: {}", summary.headings);
    println!(
        "  TOC:      {}",
        if summary.toc_included {
            "included"
        } else {
            "no marker found"
        }
    );
    println!("  Size:     {}", format_size(summary.output_bytes));
    println!(
        "  Time:     {:.1}s",
        summary.elapsed.as_secs_f64()
    );
    println!();
}

/// Human-readable size for the summary block.
fn format_size(bytes: usize) -> String {
    const KIB: f64 = 1024.0;
    let size = bytes as f64;
    if size >= KIB * KIB {
        format!("{:.1} MiB", size / (KIB * KIB))
    } else if size >= KIB {
        format!("{:.1} KiB", size / KIB)
    } else {
        format!("{bytes} B")
    }
}

// ---------------------------------------------------------------------------
// Config command handlers
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
