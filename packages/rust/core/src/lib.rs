//! Pipeline orchestration for docpress.
//!
//! Ties the crawl, document assembly, browser rendering, and local serving
//! together into the end-to-end generation workflows the CLI exposes.

pub mod assembler;
pub mod pipeline;

pub use assembler::{assemble_document, render_assembled, write_output};
pub use pipeline::{
    generate_pdf, generate_pdf_from_build, generate_pdf_from_build_config, generate_with_driver,
    BuildSourceConfig, GenerateConfig, GenerateSummary, ProgressReporter, SilentProgress,
};
