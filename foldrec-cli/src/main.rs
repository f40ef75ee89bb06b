use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use anyhow::Result;

mod config;
mod commands;
mod error;

use config::Config;
use foldrec_core::triangle::{TriangleHalf, TriangleShading};
use foldrec_core::ValueMode;

#[derive(Parser)]
#[command(name = "foldrec")]
#[command(about = "FoldRec - chromosome contact-map viewer")]
#[command(version)]
#[command(long_about = "
FoldRec renders chromosome contact matrices (Hi-C style interaction data) as
square heatmaps or 45-degree rotated triangles, and resolves brush and click
selections into new genomic ranges.

Examples:
  foldrec render -i chr1.csv.gz --range 1M-1.5M -o chr1.svg --mode raw-count
  foldrec triangle -i chr1.json --range 1M-1.5M -o tri.svg --click 300,150
  foldrec zoom -i chr1.json --range 1M-1.5M --brush 120,380
  foldrec ticks --range 1M-1.5M --width 700
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Inputs shared by every command that draws or reads records.
#[derive(clap::Args, Clone, Debug)]
pub struct ViewArgs {
    /// Interaction records (JSON, CSV or TSV, optionally .gz)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Genomic range to show (e.g. '1M-1.5M' or 'chr1:1000000-1500000')
    #[arg(long)]
    pub range: String,

    /// Value mode
    #[arg(long)]
    pub mode: Option<ModeArg>,

    /// Bin size in base pairs
    #[arg(long)]
    pub step: Option<u64>,

    /// Covered ranges (JSON array of {start, end}); cells outside stay blank
    #[arg(long)]
    pub coverage: Option<PathBuf>,

    /// Lower end of the color range
    #[arg(long)]
    pub color_min: Option<f64>,

    /// Upper end of the color range
    #[arg(long)]
    pub color_max: Option<f64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a square heatmap to SVG or PNG
    Render {
        #[command(flatten)]
        view: ViewArgs,

        /// Output file (SVG/PNG)
        #[arg(short, long, required = true)]
        out: PathBuf,

        /// Output format (auto-detected from extension)
        #[arg(long)]
        format: Option<RenderFormat>,

        /// Second cell line shown in the lower half
        #[arg(long)]
        comparison: Option<PathBuf>,

        /// Gene span to mark (e.g. '1.2M-1.25M')
        #[arg(long)]
        gene: Option<String>,

        /// Width in pixels
        #[arg(long)]
        width: Option<u32>,

        /// Height in pixels
        #[arg(long)]
        height: Option<u32>,

        /// Plot title
        #[arg(long)]
        title: Option<String>,
    },

    /// Render the rotated half-matrix view, optionally with a picked sub-region
    Triangle {
        #[command(flatten)]
        view: ViewArgs,

        /// Output file (SVG/PNG)
        #[arg(short, long, required = true)]
        out: PathBuf,

        /// Output format (auto-detected from extension)
        #[arg(long)]
        format: Option<RenderFormat>,

        /// Second cell line, read through the lower half
        #[arg(long)]
        comparison: Option<PathBuf>,

        /// Container size in pixels
        #[arg(long)]
        size: Option<u32>,

        /// Matrix half to show
        #[arg(long)]
        half: Option<HalfArg>,

        /// Show every measured value instead of significant ones only
        #[arg(long)]
        full: bool,

        /// Canvas click to pick a sub-region (e.g. '300,150')
        #[arg(long)]
        click: Option<String>,
    },

    /// Resolve a brush selection into the next range to fetch
    Zoom {
        #[command(flatten)]
        view: ViewArgs,

        /// Brush pixel interval along the x axis (e.g. '120,380'); omit to reset
        #[arg(long)]
        brush: Option<String>,

        /// Heatmap container width in pixels
        #[arg(long)]
        width: Option<u32>,
    },

    /// Print axis ticks and labels for a range
    Ticks {
        /// Genomic range (e.g. '1M-1.5M')
        #[arg(long)]
        range: String,

        /// Bin size in base pairs
        #[arg(long)]
        step: Option<u64>,

        /// Available axis length in pixels
        #[arg(long, default_value = "700")]
        width: f64,

        /// Records to derive a sparse axis from
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Value mode
        #[arg(long)]
        mode: Option<ModeArg>,
    },

    /// Print or write an example configuration file
    Config {
        /// Write the example to this path instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ModeArg {
    Probability,
    RawCount,
    Distance,
    BinaryPresence,
}

impl From<ModeArg> for ValueMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Probability => ValueMode::Probability,
            ModeArg::RawCount => ValueMode::RawCount,
            ModeArg::Distance => ValueMode::Distance,
            ModeArg::BinaryPresence => ValueMode::BinaryPresence,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum HalfArg {
    Upper,
    Lower,
}

impl From<HalfArg> for TriangleHalf {
    fn from(half: HalfArg) -> Self {
        match half {
            HalfArg::Upper => TriangleHalf::Upper,
            HalfArg::Lower => TriangleHalf::Lower,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderFormat {
    Svg,
    Png,
}

fn setup_logging(verbose: u8, quiet: bool) -> Result<()> {
    if quiet {
        std::env::set_var("RUST_LOG", "error");
    } else {
        let level = match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        std::env::set_var("RUST_LOG", level);
    }

    env_logger::Builder::from_default_env()
        .format_timestamp_secs()
        .init();

    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Render { view, out, format, comparison, gene, width, height, title } => {
            commands::render::execute(
                &config,
                commands::render::RenderArgs { view, out, format, comparison, gene, width, height, title },
            )?;
        }

        Commands::Triangle { view, out, format, comparison, size, half, full, click } => {
            let shading = if full { Some(TriangleShading::Full) } else { None };
            commands::triangle::execute(
                &config,
                commands::triangle::TriangleArgs {
                    view,
                    out,
                    format,
                    comparison,
                    size,
                    half: half.map(Into::into),
                    shading,
                    click,
                },
            )?;
        }

        Commands::Zoom { view, brush, width } => {
            commands::zoom::execute(&config, view, brush, width)?;
        }

        Commands::Ticks { range, step, width, input, mode } => {
            commands::ticks::execute(&config, &range, step, width, input, mode)?;
        }

        Commands::Config { out } => match out {
            Some(path) => {
                Config::default().save_to_file(&path)?;
                log::info!("Wrote example configuration to {}", path.display());
            }
            None => println!("{}", Config::example_toml()?),
        },
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = setup_logging(cli.verbose, cli.quiet) {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }

    if let Err(err) = run(cli) {
        match err.downcast_ref::<error::CliError>() {
            Some(cli_err) => error::print_error_and_exit(cli_err),
            None => {
                eprintln!("Error: {:#}", err);
                std::process::exit(1);
            }
        }
    }
}
