//! MultiResize CLI - writes HIGH/MEDIUM/SMALL style variants of every JPEG in a directory

use std::path::{Path, PathBuf};
use std::process;
use std::thread;

use anyhow::{bail, Context};
use clap::error::ErrorKind;
use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use multiresize::config::VariantConfig;
use multiresize::processing::FilterType;
use multiresize::{
    init_with_config, Config, JpegCodec, LoggingConfig, ProgressUpdate, ResizeEngine, ResizeError,
    ResizeSpec, RunReport,
};

/// Exit status for configuration, usage and lifecycle errors
const EXIT_CONFIG_ERROR: i32 = 1;

/// Exit status when the run completed but some files or variants failed
const EXIT_PARTIAL_FAILURE: i32 = 2;

/// MultiResize - Parallel multi-variant JPEG resizer
#[derive(Parser)]
#[command(
    name = "multiresize",
    version,
    about = "Resize every JPEG in a directory into several fixed-box variants",
    long_about = "MultiResize scans a directory for *.jpg files and writes one resized copy per \
                  variant into its Resize subdirectory, named <stem>-<SUFFIX>.jpg. Landscape \
                  images take the variant's box width and portrait images its box height, \
                  keeping their aspect ratio.",
    subcommand_negates_reqs = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory holding the source JPEG files
    #[arg(value_name = "DIRECTORY", required = true)]
    directory: Option<PathBuf>,

    /// Number of workers (default: available parallelism)
    #[arg(short, long, value_name = "COUNT", env = "MULTIRESIZE_WORKERS")]
    workers: Option<usize>,

    /// Process files one at a time on a single worker
    /// (takes precedence over --workers and MULTIRESIZE_WORKERS)
    #[arg(short, long)]
    sequential: bool,

    /// Configuration file path (.toml or .yaml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output variant, replaces the configured ones (repeatable)
    #[arg(long = "variant", value_name = "SUFFIX:WxH:QUALITY", value_parser = parse_variant)]
    variants: Vec<VariantConfig>,

    /// Write baseline instead of progressive JPEGs
    #[arg(long)]
    baseline: bool,

    /// Resample filter
    #[arg(long, value_enum, value_name = "FILTER")]
    filter: Option<CliFilter>,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short = 'Q', long, conflicts_with = "verbose")]
    quiet: bool,
}

/// Available subcommands
#[derive(Subcommand)]
enum Commands {
    /// Validate configuration file
    Config {
        /// Configuration file to validate
        file: PathBuf,
    },
    /// Generate example configuration file
    ExampleConfig {
        /// Output file path (.toml or .yaml)
        #[arg(short, long, default_value = "multiresize.toml")]
        output: PathBuf,
    },
}

/// CLI-compatible resample filter enum
#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<CliFilter> for FilterType {
    fn from(filter: CliFilter) -> Self {
        match filter {
            CliFilter::Nearest => FilterType::Nearest,
            CliFilter::Triangle => FilterType::Triangle,
            CliFilter::CatmullRom => FilterType::CatmullRom,
            CliFilter::Gaussian => FilterType::Gaussian,
            CliFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Parse a variant string (e.g., "HIGH:900x600:95")
fn parse_variant(s: &str) -> Result<VariantConfig, String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 3 {
        return Err("Variants must be in format 'SUFFIX:WIDTHxHEIGHT:QUALITY' (e.g., 'HIGH:900x600:95')".to_string());
    }

    let (width, height) = parts[1]
        .split_once('x')
        .ok_or_else(|| "Box must be in format 'WIDTHxHEIGHT'".to_string())?;
    let width = width.parse::<u32>().map_err(|_| "Invalid width value".to_string())?;
    let height = height.parse::<u32>().map_err(|_| "Invalid height value".to_string())?;
    let quality = parts[2]
        .parse::<u8>()
        .map_err(|_| "Quality must be a number between 0 and 100".to_string())?;

    let variant = VariantConfig::new(parts[0], width, height, quality);
    ResizeSpec::from(&variant)
        .validate()
        .map_err(|e| e.user_message())?;

    Ok(variant)
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                // clap reports usage errors with 2, which is reserved for partial failures
                let _ = e.print();
                process::exit(EXIT_CONFIG_ERROR);
            }
        },
    };

    let code = match cli.command {
        Some(ref command) => handle_subcommand(command).map(|()| 0),
        None => run(&cli),
    };

    match code {
        Ok(code) => process::exit(code),
        Err(e) => {
            let message = match e.downcast_ref::<ResizeError>() {
                Some(err) => err.user_message(),
                None => format!("{:#}", e),
            };
            eprintln!("{}: {}", style("Error").red().bold(), message);
            process::exit(EXIT_CONFIG_ERROR);
        }
    }
}

/// Handle subcommands
fn handle_subcommand(command: &Commands) -> anyhow::Result<()> {
    match command {
        Commands::Config { file } => validate_config_file(file),
        Commands::ExampleConfig { output } => generate_example_config(output),
    }
}

/// Resize the directory and return the process exit code
fn run(cli: &Cli) -> anyhow::Result<i32> {
    let config = load_config(cli)?;

    let logging = LoggingConfig {
        level: if cli.quiet {
            "error".to_string()
        } else if cli.verbose {
            "debug".to_string()
        } else {
            config.logging.level.clone()
        },
        json_format: config.logging.json_format,
    };
    init_with_config(&logging)?;

    config.validate().context("Invalid configuration")?;

    let directory = cli
        .directory
        .as_deref()
        .context("A pictures directory is required")?;
    let workers = if cli.sequential {
        1
    } else {
        cli.workers.unwrap_or_else(|| config.processing.worker_count())
    };

    let codec = JpegCodec::with_filter(config.encoding.filter);
    let mut engine = ResizeEngine::with_codec(directory, codec)?.with_hints(config.encoding.hints());
    engine.configure(config.variants.iter().map(ResizeSpec::from))?;

    for spec in engine.specs() {
        debug!("Variant {}", spec);
    }

    let progress = if cli.json || cli.quiet {
        None
    } else {
        Some(spawn_progress_bar(&engine)?)
    };

    let report = engine.run(workers)?;

    if let Some(handle) = progress {
        if handle.join().is_err() {
            debug!("Progress display thread panicked");
        }
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report, cli.quiet);
    }

    if report.has_failures() {
        Ok(EXIT_PARTIAL_FAILURE)
    } else {
        Ok(0)
    }
}

/// Merge the config file (or defaults) with command line overrides
fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };

    if !cli.variants.is_empty() {
        config.variants = cli.variants.clone();
    }
    if cli.baseline {
        config.encoding.progressive = false;
    }
    if let Some(filter) = cli.filter {
        config.encoding.filter = filter.into();
    }
    if let Some(workers) = cli.workers {
        if workers == 0 {
            bail!(ResizeError::config("Worker count must be at least 1"));
        }
        config.processing.workers = Some(workers);
    }

    Ok(config)
}

/// Drive an indicatif bar from the engine's progress events until the run ends
fn spawn_progress_bar(engine: &ResizeEngine) -> anyhow::Result<thread::JoinHandle<()>> {
    let updates = engine.subscribe();
    let pb = ProgressBar::new(engine.source_files().len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({per_sec}, {eta}) {msg}")?
            .progress_chars("#>-"),
    );

    let handle = thread::Builder::new()
        .name("multiresize-progress".to_string())
        .spawn(move || {
            for update in updates {
                match update {
                    ProgressUpdate::Started { workers, .. } => {
                        pb.set_message(format!("{} worker(s)", workers));
                    }
                    ProgressUpdate::FileCompleted { file, .. } | ProgressUpdate::FileFailed { file, .. } => {
                        pb.set_message(
                            file.file_name()
                                .unwrap_or_default()
                                .to_string_lossy()
                                .into_owned(),
                        );
                        pb.inc(1);
                    }
                    ProgressUpdate::Finished { .. } => {
                        pb.finish_with_message("done");
                    }
                }
            }
        })?;

    Ok(handle)
}

/// Validate configuration file
fn validate_config_file(file_path: &Path) -> anyhow::Result<()> {
    let config = Config::from_file(file_path)?;
    config.validate()?;

    println!("{}: Configuration file is valid", style("Success").green().bold());
    for variant in &config.variants {
        println!("  {}", ResizeSpec::from(variant));
    }
    match config.processing.workers {
        Some(workers) => println!("Workers: {}", workers),
        None => println!("Workers: auto ({})", config.processing.worker_count()),
    }

    Ok(())
}

/// Generate example configuration file
fn generate_example_config(output_path: &Path) -> anyhow::Result<()> {
    Config::default().to_file(output_path)?;

    println!(
        "{}: Generated example configuration: {}",
        style("Success").green().bold(),
        output_path.display()
    );
    info!("Example configuration written to {:?}", output_path);

    Ok(())
}

/// Print processing summary
fn print_summary(report: &RunReport, quiet: bool) {
    if !quiet {
        println!();
        println!("{}", style("Processing Summary:").bold());
        println!("  {}: {}", style("Workers").blue(), report.workers);
        println!(
            "  {}: {} of {}",
            style("Processed").green(),
            report.processed_files,
            report.source_files
        );
        println!("  {}: {}", style("Variants").cyan(), report.variants_written);
        if report.processed_files > 0 {
            println!("  {}: {:.1} files/sec", style("Speed").cyan(), report.files_per_second());
        }

        for failure in &report.failures {
            match &failure.suffix {
                Some(suffix) => println!(
                    "  {}: {} [{}] {}",
                    style("Failed").red(),
                    failure.file.display(),
                    suffix,
                    failure.message
                ),
                None => println!(
                    "  {}: {} {}",
                    style("Failed").red(),
                    failure.file.display(),
                    failure.message
                ),
            }
        }
        println!();
    }

    println!(
        "Elapsed time: {}ms / file count: {}",
        report.elapsed.as_millis(),
        report.processed_files
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_variant() {
        assert_eq!(
            parse_variant("HIGH:900x600:95").unwrap(),
            VariantConfig::new("HIGH", 900, 600, 95)
        );
        assert!(parse_variant("HIGH:900x600").is_err());
        assert!(parse_variant("HIGH:900:95").is_err());
        assert!(parse_variant("HIGH:0x600:95").is_err());
        assert!(parse_variant("HIGH:900x600:101").is_err());
        assert!(parse_variant(":900x600:95").is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_overrides_replace_config() {
        let cli = Cli::parse_from([
            "multiresize",
            "--variant",
            "THUMB:160x160:80",
            "--baseline",
            "--filter",
            "triangle",
            "-w",
            "3",
            "/srv/pictures",
        ]);

        let config = load_config(&cli).unwrap();
        assert_eq!(config.variants, vec![VariantConfig::new("THUMB", 160, 160, 80)]);
        assert!(!config.encoding.progressive);
        assert_eq!(config.encoding.filter, FilterType::Triangle);
        assert_eq!(config.processing.workers, Some(3));
    }
}
