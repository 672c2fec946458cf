//! Command-line front end for region file conversion.
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use skyregions::format::{ImportOptions, OperationKind, RegionsRegistry, TargetType};
use skyregions::model::Regions;
use skyregions::{RegionError, RegionsConfig};

#[derive(Parser)]
#[command(name = "skyregions")]
#[command(about = "Read, write and convert astronomical region files")]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List registered formats and the operations they support
    Formats {
        #[arg(long, value_enum, default_value_t = Target::Regions)]
        target: Target,
    },
    /// Print the format a file is recognized as
    Identify {
        path: PathBuf,

        /// Identify for writing instead of reading
        #[arg(long)]
        for_write: bool,
    },
    /// Convert a region file to another format
    Convert {
        input: PathBuf,
        output: PathBuf,

        /// Input format (identified from the file when omitted)
        #[arg(long)]
        from: Option<String>,

        /// Output format (identified from the file name when omitted)
        #[arg(long)]
        to: Option<String>,

        /// Decimal places for written values
        #[arg(long)]
        precision: Option<usize>,

        /// Replace the output file if it exists
        #[arg(long)]
        overwrite: bool,

        /// Fail on unsupported shapes instead of skipping them
        #[arg(long)]
        strict: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Target {
    Region,
    Regions,
}

impl From<Target> for TargetType {
    fn from(target: Target) -> Self {
        match target {
            Target::Region => TargetType::Region,
            Target::Regions => TargetType::Regions,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    env_logger::Builder::new()
        .filter_level(config.log_level.to_level_filter())
        .parse_default_env()
        .init();
    log::debug!("Log level {}", config.log_level.name());

    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<RegionsConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(RegionsConfig::load(path)?),
        None => Ok(RegionsConfig::load_from_default_path().unwrap_or_default()),
    }
}

fn run(command: Command, config: &RegionsConfig) -> Result<(), RegionError> {
    let registry = RegionsRegistry::with_defaults()?;

    match command {
        Command::Formats { target } => {
            print!("{}", registry.format_table(target.into()));
        }
        Command::Identify { path, for_write } => {
            let operation = if for_write {
                OperationKind::Write
            } else {
                OperationKind::Read
            };
            println!("{}", registry.identify(&path, TargetType::Regions, operation)?);
        }
        Command::Convert {
            input,
            output,
            from,
            to,
            precision,
            overwrite,
            strict,
        } => {
            let regions = Regions::read(
                &registry,
                &input,
                from.as_deref(),
                &ImportOptions::new().strict(strict),
            )?;

            let to = to.or_else(|| {
                registry
                    .identify(&output, TargetType::Regions, OperationKind::Write)
                    .is_err()
                    .then(|| config.default_format.clone())
                    .flatten()
            });

            let mut options = config.export_options();
            if let Some(precision) = precision {
                options.precision = precision;
            }
            options.overwrite |= overwrite;

            let result = regions.write(&registry, &output, to.as_deref(), &options)?;
            for warning in &result.warnings {
                eprintln!("Warning: {}", warning.message);
            }
            println!(
                "Wrote {} of {} regions to {}",
                result.regions_written,
                regions.len(),
                output.display()
            );
        }
    }
    Ok(())
}
