//! Extract body text from an exam paper's page dump.
//!
//! Usage:
//!   exam_extract paper.json --elements paper_elements.json --output-dir out
//!   exam_extract paper.json --dpi 200 --no-skip-first-page -v

use clap::Parser;
use exam_chemtext::exclusion::ElementMetadata;
use exam_chemtext::{DocumentDump, ExtractionPipeline, OutputWriter, PipelineConfig};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "exam_extract")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Reconstruct exam text with chemistry notation from a JSON page dump", long_about = None)]
struct Cli {
    /// JSON page dump of the document
    document: PathBuf,

    /// Figure/table element metadata (JSON)
    #[arg(long)]
    elements: Option<PathBuf>,

    /// Directory the output files are written to
    #[arg(long, default_value = "combined_output")]
    output_dir: PathBuf,

    /// DPI the element boxes were produced at
    #[arg(long)]
    dpi: Option<f32>,

    /// Process the first page too
    #[arg(long)]
    no_skip_first_page: bool,

    /// Shrink of caption-derived figure zones, in points
    #[arg(long)]
    caption_figure_padding: Option<f32>,

    /// Shrink of visually detected figure zones, in points
    #[arg(long)]
    visual_figure_padding: Option<f32>,

    /// Keep header, footer and margin text
    #[arg(long)]
    disable_noise_removal: bool,

    /// Pipeline configuration file (JSON); flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn pipeline_config(&self) -> exam_chemtext::Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)?,
            None => PipelineConfig::default(),
        };
        if let Some(dpi) = self.dpi {
            config = config.with_dpi(dpi);
        }
        if self.no_skip_first_page {
            config = config.with_skip_first_page(false);
        }
        if self.disable_noise_removal {
            config = config.with_noise_removal(false);
        }
        if let Some(padding) = self.caption_figure_padding {
            config.padding.caption_figure_padding = padding;
        }
        if let Some(padding) = self.visual_figure_padding {
            config.padding.visual_figure_padding = padding;
        }
        config.validate()?;
        Ok(config)
    }
}

fn run(cli: &Cli) -> exam_chemtext::Result<()> {
    let config = cli.pipeline_config()?;
    let doc = DocumentDump::open(&cli.document)?;
    let elements = match &cli.elements {
        Some(path) => ElementMetadata::from_json_file(path)?.elements,
        None => Vec::new(),
    };
    log::info!("Loaded {} figure/table elements", elements.len());

    let result = ExtractionPipeline::new(config).process(&doc, &elements)?;

    let stem = cli
        .document
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let files = OutputWriter::new(&cli.output_dir).write(&stem, &result)?;

    let stats = &result.statistics;
    println!("Pages with text: {}", stats.pages_with_text);
    println!("Total characters (before filtering): {}", stats.total_chars_before);
    println!("Total characters (after filtering): {}", stats.total_chars_after);
    println!(
        "Characters filtered out: {} ({:.1}%)",
        stats.chars_filtered, stats.filter_percentage
    );
    println!("Formulas found: {}", stats.formulas.total);
    println!("Output: {}", files.cleaned_latex.display());
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        },
    }
}
