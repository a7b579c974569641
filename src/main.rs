use clap::{ArgAction, Parser, Subcommand};
use pixtrim::imaging::{
    CropAnchor, CropOptions, OperationResult, Quality, ResizeOptions, crop_to_square_file,
    parse_file_mode, resize_file,
};
use pixtrim::{config, output};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(name = "pixtrim")]
#[command(about = "Square-crop or shrink raster images")]
#[command(long_about = "\
Square-crop or shrink raster images

Supported formats: JPEG, PNG, GIF, BMP, XBM, WBMP. The input format is
detected from file content; the output format follows the destination's
extension (or the input format when the destination has none).

Without --dest the source file is overwritten.

Run 'pixtrim gen-config' to generate a documented config file.")]
#[command(version)]
struct Cli {
    /// TOML file with defaults for crop and resize
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Print the result as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

/// Flags shared by both image commands.
#[derive(clap::Args)]
struct CommonArgs {
    /// Image to read
    source: PathBuf,

    /// Output file or existing directory (default: overwrite SOURCE)
    #[arg(long)]
    dest: Option<PathBuf>,

    /// JPEG quality, 1-100
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
    quality: Option<u32>,

    /// Octal permission bits for the written file, e.g. 644
    #[arg(long, value_parser = parse_file_mode)]
    mode: Option<u32>,
}

#[derive(Subcommand)]
enum Command {
    /// Crop to a square of side min(width, height)
    Crop {
        #[command(flatten)]
        common: CommonArgs,

        /// Which end of the longer side to keep: left, center or right
        #[arg(long)]
        anchor: Option<CropAnchor>,
    },
    /// Shrink to fit a bounding box, keeping the aspect ratio
    Resize {
        #[command(flatten)]
        common: CommonArgs,

        #[arg(long)]
        max_width: Option<u32>,

        #[arg(long)]
        max_height: Option<u32>,
    },
    /// Print a stock config file with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            return Ok(());
        }
        Command::Crop { common, anchor } => {
            let config = config::load_config(cli.config.as_deref())?;
            let mut options = CropOptions::from(&config.crop);
            if let Some(anchor) = anchor {
                options.anchor = anchor;
            }
            apply_common(&common, &mut options.quality, &mut options.file_mode);
            crop_to_square_file(&common.source, common.dest.as_deref(), &options)?
        }
        Command::Resize {
            common,
            max_width,
            max_height,
        } => {
            let config = config::load_config(cli.config.as_deref())?;
            let mut options = ResizeOptions::from(&config.resize);
            if let Some(width) = max_width {
                options.max_width = width;
            }
            if let Some(height) = max_height {
                options.max_height = height;
            }
            apply_common(&common, &mut options.quality, &mut options.file_mode);
            resize_file(&common.source, common.dest.as_deref(), &options)?
        }
    };

    report(&result, cli.json)
}

/// Install the stderr log subscriber. Default level is warn.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn apply_common(common: &CommonArgs, quality: &mut Quality, file_mode: &mut Option<u32>) {
    if let Some(q) = common.quality {
        *quality = Quality::new(q);
    }
    if let Some(mode) = common.mode {
        *file_mode = Some(mode);
    }
}

fn report(result: &OperationResult, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        output::print_result(result);
    }
    Ok(())
}
