//! CLI logic for the Tributary lineage layout tool.
//!
//! The CLI reads either a single snapshot file or, with `--product`, the
//! current (or `--pin`ned) version of a product from a catalog directory,
//! lays it out and writes SVG or JSON.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, OutputFormat};

use std::fs;

use log::{info, warn};

use tributary::{
    LineageBuilder, TributaryError,
    layout::LayoutResult,
    source::{DirectorySource, FetchError},
};

/// Run the Tributary CLI application
///
/// # Errors
///
/// Returns `TributaryError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Snapshot decode errors
/// - Catalog lookup errors (unknown product or version)
/// - Rendering errors
pub fn run(args: &Args) -> Result<(), TributaryError> {
    info!(
        input_path = args.input,
        output_path = args.output_path(),
        format:? = args.format;
        "Processing lineage"
    );

    let app_config = config::load_config(args.config.as_ref())?;
    let builder = LineageBuilder::new(app_config);

    let rendered = match &args.product {
        Some(product) => {
            let source = DirectorySource::new(&args.input);
            let mut view = builder.view()?;
            view.load(&source, product, args.pin)?;
            let Some(layout) = view.layout() else {
                return Err(FetchError::UnknownProduct(product.clone()).into());
            };
            render(&builder, layout, args.format)?
        }
        None => {
            let source = fs::read_to_string(&args.input)?;
            let snapshot = builder.parse(&source)?;
            let layout = builder.layout(&snapshot)?;
            render(&builder, &layout, args.format)?
        }
    };

    fs::write(args.output_path(), rendered)?;

    info!(output_file = args.output_path(); "Lineage exported successfully");

    Ok(())
}

fn render(
    builder: &LineageBuilder,
    layout: &LayoutResult,
    format: OutputFormat,
) -> Result<String, TributaryError> {
    if !layout.warnings().is_empty() {
        warn!(
            warnings = layout.warnings().len();
            "Snapshot has data problems; the affected nodes and edges were skipped"
        );
    }

    match format {
        OutputFormat::Svg => builder.render_svg(layout),
        OutputFormat::Json => builder.render_json(layout),
    }
}
