use clap::Parser;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;
use tilecutter_core::pipeline::{self, PipelineConfig};
use tilecutter_core::property::PropertyFilter;

/// Build a pyramid of vector tiles from a GeoJSON dataset.
#[derive(Parser)]
#[command(name = "tilecutter", version, about)]
struct Cli {
    /// GeoJSON file to read; omit to read from standard input
    input: Option<PathBuf>,

    /// Output archive path
    #[arg(short = 'o', long)]
    output: PathBuf,

    /// Name stored in the archive's metadata; defaults to the output file stem
    #[arg(short = 'n', long)]
    name: Option<String>,

    /// Layer name; defaults to the input file stem with non-alphanumerics stripped
    #[arg(short = 'l', long)]
    layer: Option<String>,

    /// Maximum zoom level to generate
    #[arg(short = 'z', long, default_value_t = 14)]
    maxzoom: u8,

    /// Minimum zoom level to generate
    #[arg(short = 'Z', long, default_value_t = 0)]
    minzoom: u8,

    /// Detail bits at maxzoom; defaults to 26 - maxzoom
    #[arg(short = 'd', long)]
    full_detail: Option<u8>,

    /// Detail bits below maxzoom
    #[arg(short = 'D', long, default_value_t = 10)]
    low_detail: u8,

    /// Exclude this property key; may be repeated
    #[arg(short = 'x', long = "exclude")]
    exclude: Vec<String>,

    /// Include this property key, implies excluding all others not named; may be repeated
    #[arg(short = 'y', long = "include")]
    include: Vec<String>,

    /// Exclude all properties except those named by -y
    #[arg(short = 'X', long = "exclude-all")]
    exclude_all: bool,

    /// Rate at which point density is thinned per zoom level dropped
    #[arg(short = 'r', long, default_value_t = 2.5)]
    droprate: f64,

    /// Tile buffer, in screen pixels at a 256px tile
    #[arg(short = 'b', long, default_value_t = 5)]
    buffer: i64,

    /// Overwrite the output file if it already exists
    #[arg(short = 'f', long)]
    force: bool,

    /// Directory for intermediate temp files
    #[arg(short = 't', long, default_value = "/tmp")]
    tmp_dir: PathBuf,

    /// Increase log verbosity; repeatable
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn stem_of(path: &std::path::Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("tiles")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

fn run(cli: Cli) -> tilecutter_core::Result<()> {
    let name = cli.name.clone().unwrap_or_else(|| stem_of(&cli.output));
    let layer_name = cli
        .layer
        .clone()
        .or_else(|| cli.input.as_ref().map(|p| stem_of(p)))
        .unwrap_or_else(|| "tiles".to_string());

    let mut property_filter = PropertyFilter::new();
    property_filter.exclude = cli.exclude.into_iter().collect();
    property_filter.include = cli.include.into_iter().collect();
    property_filter.exclude_all = cli.exclude_all || !property_filter.include.is_empty();

    let full_detail = cli
        .full_detail
        .unwrap_or_else(|| PipelineConfig::default_full_detail(cli.maxzoom));

    let config = PipelineConfig {
        name,
        layer_name,
        maxzoom: cli.maxzoom,
        minzoom: cli.minzoom,
        full_detail,
        low_detail: cli.low_detail,
        droprate: cli.droprate,
        buffer_pixels: cli.buffer,
        property_filter,
        tmp_dir: cli.tmp_dir,
    };

    let (archive, _meta) = match &cli.input {
        Some(path) => {
            let reader = BufReader::new(std::fs::File::open(path)?);
            pipeline::run(reader, &config)?
        }
        None => {
            let stdin = io::stdin();
            pipeline::run(BufReader::new(stdin.lock()), &config)?
        }
    };

    pipeline::write_archive(archive, &cli.output, cli.force)?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        })
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
