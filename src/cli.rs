//! Command-line interface.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use crate::error::{SheetError, EXIT_SUCCESS};
use crate::layout::PageSize;
use crate::profile::SheetProfile;
use crate::sheet::{build_sheet, PreviewOptions, DEFAULT_PREVIEW_DPI};

/// Lay out SVG icons as circular, recolored tokens on a printable PDF grid
#[derive(Debug, Parser)]
#[command(name = "icon-tokens", version, about)]
pub struct Cli {
    /// Directory searched recursively for .svg icons
    pub input: PathBuf,

    /// PDF file to write; parent directories are created
    pub output: Option<PathBuf>,

    /// Page size: A4 or A4landscape [default: A4]
    #[arg(long)]
    pub page: Option<String>,

    /// Cell side length in inches [default: 1.0]
    #[arg(long = "cell-size-in", value_name = "INCHES")]
    pub cell_size_in: Option<f32>,

    /// Token circle diameter in inches [default: 0.9]
    #[arg(long = "circle-diameter-in", value_name = "INCHES")]
    pub circle_diameter_in: Option<f32>,

    /// Cut-guide stroke width in points [default: 0.25]
    #[arg(long = "grid-hairline-pt", value_name = "POINTS")]
    pub grid_hairline_pt: Option<f32>,

    /// Cut-guide gray level from 0 (black) to 1 (white) [default: 0.2]
    #[arg(long = "grid-gray", value_name = "LEVEL")]
    pub grid_gray: Option<f32>,

    /// Color replacing white icon paint, CSS name or hex [default: fff]
    #[arg(long, value_name = "COLOR")]
    pub foreground: Option<String>,

    /// Circle fill color, CSS name or hex [default: 000]
    #[arg(long, value_name = "COLOR")]
    pub background: Option<String>,

    /// Label each cell with the icon's path
    #[arg(long)]
    pub annotate: bool,

    /// JSON profile with option values; flags given here override it
    #[arg(long, value_name = "FILE")]
    pub profile: Option<PathBuf>,

    /// Print the effective profile as JSON and exit
    #[arg(long)]
    pub print_profile: bool,

    /// Also rasterize the first page to this PNG file
    #[arg(long, value_name = "PNG")]
    pub preview: Option<PathBuf>,

    /// Preview resolution
    #[arg(long = "preview-dpi", value_name = "DPI", default_value_t = DEFAULT_PREVIEW_DPI)]
    pub preview_dpi: f32,

    /// Log progress at info level (RUST_LOG overrides)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// The option values given as flags.
    pub fn overrides(&self) -> Result<SheetProfile, SheetError> {
        let page = self
            .page
            .as_deref()
            .map(str::parse::<PageSize>)
            .transpose()?;
        Ok(SheetProfile {
            page,
            cell_size_in: self.cell_size_in,
            circle_diameter_in: self.circle_diameter_in,
            grid_hairline_pt: self.grid_hairline_pt,
            grid_gray: self.grid_gray,
            foreground: self.foreground.clone(),
            background: self.background.clone(),
            annotate: self.annotate.then_some(true),
        })
    }

    /// The profile file, if any, with flags layered on top.
    pub fn effective_profile(&self) -> Result<SheetProfile, SheetError> {
        let base = match &self.profile {
            Some(path) => SheetProfile::load(path)?,
            None => SheetProfile::new(),
        };
        Ok(base.merge(self.overrides()?))
    }
}

/// Parses arguments, runs, and maps the outcome to an exit code.
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match execute(&cli) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(SheetError::NoIconsFound { path }) => {
            println!("no icons found under {}; nothing written", path.display());
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn execute(cli: &Cli) -> Result<(), SheetError> {
    let profile = cli.effective_profile()?;
    if cli.print_profile {
        let full = SheetProfile::defaults().merge(profile);
        full.resolve()?;
        let json = full.to_json_pretty().map_err(|e| SheetError::Profile {
            path: cli.profile.clone().unwrap_or_default(),
            source: e,
        })?;
        println!("{json}");
        return Ok(());
    }

    let Some(output) = &cli.output else {
        return Err(SheetError::invalid_argument(
            "OUTPUT_PDF",
            "an output path is required unless --print-profile is given",
        ));
    };
    let settings = profile.resolve()?;
    let preview = cli.preview.clone().map(|path| PreviewOptions {
        path,
        dpi: cli.preview_dpi,
    });

    let summary = build_sheet(&cli.input, output, &settings, preview.as_ref())?;
    println!("{summary}");
    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}
