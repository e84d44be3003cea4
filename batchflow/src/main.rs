//! Batchflow CLI
//!
//! Loads, resizes, grayscales and saves a list of images, sequentially,
//! in parallel, or both with a timing comparison.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use batchflow::prelude::*;

#[derive(Parser)]
#[command(name = "batchflow")]
#[command(about = "Run images through load, resize, grayscale and save", long_about = None)]
struct Cli {
    /// Path to a JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,

    /// Run options, usable without the `run` subcommand
    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Process images (default if no command specified)
    Run(RunArgs),

    /// Validate configuration
    Validate,

    /// Generate a sample configuration file
    GenerateConfig {
        /// Output path; prints to stdout if omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Default, PartialEq, Eq)]
struct RunArgs {
    /// Images to process, replacing any listed in the config file
    items: Vec<PathBuf>,

    /// sequential, parallel (or concurrent), or both
    #[arg(short, long)]
    mode: Option<ExecutionMode>,

    /// Directory processed images are written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Target width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Target height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Maximum number of images processed at once in parallel mode
    #[arg(long)]
    max_concurrency: Option<usize>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

impl RunArgs {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Fills options missing here from `outer`, the flags given before the subcommand.
    fn or(self, outer: Self) -> Self {
        Self {
            items: if self.items.is_empty() { outer.items } else { self.items },
            mode: self.mode.or(outer.mode),
            output_dir: self.output_dir.or(outer.output_dir),
            width: self.width.or(outer.width),
            height: self.height.or(outer.height),
            max_concurrency: self.max_concurrency.or(outer.max_concurrency),
            json: self.json || outer.json,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => run_command(cli.config, cli.run).await,
        Some(Commands::Run(args)) => run_command(cli.config, args.or(cli.run)).await,
        Some(_) if !cli.run.is_empty() => bail!("Run options are only accepted by the run command"),
        Some(Commands::Validate) => validate_command(cli.config),
        Some(Commands::GenerateConfig { output }) => generate_config_command(output),
    }
}

fn load_config(path: Option<PathBuf>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::from_file(&path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(AppConfig::default()),
    }
}

async fn run_command(config_path: Option<PathBuf>, args: RunArgs) -> Result<()> {
    let mut config = load_config(config_path)?;

    // Apply overrides
    if !args.items.is_empty() {
        config.items = WorkItem::from_paths(args.items);
    }
    if let Some(mode) = args.mode {
        config.batch.mode = mode;
    }
    if let Some(dir) = args.output_dir {
        config.images.output_dir = dir;
    }
    if let Some(width) = args.width {
        config.images.width = width;
    }
    if let Some(height) = args.height {
        config.images.height = height;
    }
    if args.max_concurrency.is_some() {
        config.batch.max_concurrency = args.max_concurrency;
    }

    config.validate()?;
    check_output_names(&config.items)?;
    init_tracing(&config.logging)?;

    let chain = image_chain(&config.images)?;
    let runner = BatchRunner::new(chain)
        .with_config(config.batch.clone())
        .with_event_sink(Arc::new(LoggingEventSink::debug()));
    runner.validate(&config.items)?;

    if !args.json {
        println!("Processing {} images...\n", config.items.len());
    }

    let report = runner.run_mode(&config.items).await?;

    if args.json {
        println!("{}", report.to_json_pretty()?);
    } else {
        println!("{report}");
    }

    Ok(())
}

fn validate_command(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;
    config.validate()?;

    println!("Configuration is valid");
    println!("  Items: {}", config.items.len());
    println!("  Mode: {}", config.batch.mode);
    match config.batch.max_concurrency {
        Some(limit) => println!("  Max concurrency: {limit}"),
        None => println!("  Max concurrency: unbounded"),
    }
    println!("  Output: {}", config.images.output_dir.display());
    println!("  Size: {}x{}", config.images.width, config.images.height);

    Ok(())
}

fn generate_config_command(output: Option<PathBuf>) -> Result<()> {
    let config = AppConfig {
        items: WorkItem::from_paths([
            "images/cat1.jpg",
            "images/cat2.jpg",
            "images/cat3.jpg",
            "images/cat4.jpg",
        ]),
        ..AppConfig::default()
    };
    let json = serde_json::to_string_pretty(&config)?;

    match output {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Generated sample configuration: {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_flags_without_subcommand() {
        let cli = Cli::try_parse_from(["batchflow", "--mode", "both", "x.jpg"]).unwrap();

        assert!(cli.command.is_none());
        assert_eq!(cli.run.mode, Some(ExecutionMode::Both));
        assert_eq!(cli.run.items, vec![PathBuf::from("x.jpg")]);
    }

    #[test]
    fn test_run_subcommand_still_parses() {
        let cli = Cli::try_parse_from(["batchflow", "run", "--json", "a.png"]).unwrap();

        assert!(cli.run.is_empty());
        match cli.command {
            Some(Commands::Run(args)) => {
                assert!(args.json);
                assert_eq!(args.items, vec![PathBuf::from("a.png")]);
            }
            _ => panic!("expected the run subcommand"),
        }
    }

    #[test]
    fn test_config_before_subcommand() {
        let cli = Cli::try_parse_from(["batchflow", "-c", "app.json", "validate"]).unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("app.json")));
        assert!(matches!(cli.command, Some(Commands::Validate)));
        assert!(cli.run.is_empty());
    }

    #[test]
    fn test_run_args_merge_outer_flags() {
        let cli = Cli::try_parse_from(["batchflow", "--width", "64", "run", "--width", "32", "--json", "a.png"])
            .unwrap();
        let Some(Commands::Run(args)) = cli.command else {
            panic!("expected the run subcommand");
        };

        let merged = args.or(cli.run);

        assert_eq!(merged.width, Some(32));
        assert!(merged.json);
        assert_eq!(merged.items, vec![PathBuf::from("a.png")]);
    }
}
