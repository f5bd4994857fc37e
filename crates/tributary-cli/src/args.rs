//! Command-line argument definitions for the Tributary CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the input (a snapshot file, or a catalog
//! directory together with `--product`), the output path and format, the
//! configuration file, and logging verbosity.

use clap::{Parser, ValueEnum};

/// Output document format.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Rendered SVG drawing
    #[default]
    Svg,
    /// Positioned nodes and edges as JSON
    Json,
}

impl OutputFormat {
    fn default_output(self) -> &'static str {
        match self {
            OutputFormat::Svg => "out.svg",
            OutputFormat::Json => "out.json",
        }
    }
}

/// Command-line arguments for the Tributary lineage layout tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Snapshot JSON file, or a catalog directory when `--product` is given
    #[arg(help = "Path to the input snapshot or catalog directory")]
    pub input: String,

    /// Path to the output file [default: out.svg or out.json]
    #[arg(short, long)]
    pub output: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Svg)]
    pub format: OutputFormat,

    /// Data product to read from the catalog directory
    #[arg(short, long)]
    pub product: Option<String>,

    /// Version of the product to read instead of its current one
    #[arg(long, requires = "product")]
    pub pin: Option<u32>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Returns the output path, falling back to a default for the format.
    pub fn output_path(&self) -> &str {
        self.output
            .as_deref()
            .unwrap_or_else(|| self.format.default_output())
    }
}
