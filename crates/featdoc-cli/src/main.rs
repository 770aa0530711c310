//! featdoc turns a finished test run into a living feature document.
//!
//! This CLI renders a serialized suite tree the same way the reporter does at
//! the end of a run, and prints the placeholder markers to paste into a
//! document.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use featdoc_adapters_fs::FsDocumentStore;
use featdoc_app::{AppError, Reporter, adapter_for, generate_report};
use featdoc_config::{
    CliOverrides, EffectiveOptions, OutputFormat, ReporterOptions, discover_config, load_config,
    resolve_config,
};
use featdoc_types::{DEFAULT_PLACEHOLDER_BASE, Placeholders, RunConfig, RunResult, SuiteNode};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// featdoc turns a finished test run into a living feature document.
#[derive(Parser)]
#[command(name = "featdoc")]
#[command(about = "featdoc turns a finished test run into a living feature document.")]
#[command(version)]
struct Cli {
    /// Log pipeline steps to stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// CLI output format option
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliFormat {
    Markdown,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a serialized suite tree into the feature document
    Render {
        /// Path to the suite tree JSON (`-` for stdin)
        #[arg(long)]
        input: String,

        /// Destination document (overrides config file)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Output format (overrides config file)
        #[arg(long, value_enum)]
        format: Option<CliFormat>,

        /// Link to the full test report, appended to Markdown output
        #[arg(long)]
        full_report_link: Option<String>,

        /// Show each project as a heading (`--report-projects false` turns a
        /// config file's setting off)
        #[arg(
            long,
            num_args = 0..=1,
            default_missing_value = "true",
            action = ArgAction::Set
        )]
        report_projects: Option<bool>,

        /// Base name of the placeholder markers
        #[arg(long)]
        placeholder: Option<String>,

        /// Test type treated as behavioral
        #[arg(long)]
        behavior_type: Option<String>,

        /// Path to config file (default: auto-discover featdoc.toml)
        #[arg(long, short = 'c')]
        config: Option<String>,

        /// Print the rendered fragment instead of writing the document
        #[arg(long)]
        stdout: bool,
    },
    /// Print the placeholder markers for a document
    Markers {
        /// Base name of the placeholder markers
        #[arg(long, default_value = DEFAULT_PLACEHOLDER_BASE)]
        placeholder: String,
    },
}

/// CLI errors
#[derive(Debug, Error)]
enum CliError {
    #[error("Failed to read input '{path}': {source}")]
    InputRead {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse suite tree '{path}': {source}")]
    InputParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to load config: {0}")]
    ConfigLoad(String),

    #[error("{0}")]
    App(#[from] AppError),
}

const EXIT_CODE_SUCCESS: i32 = 0;
const EXIT_CODE_ERROR: i32 = 1;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            EXIT_CODE_ERROR
        }
    };
    std::process::exit(exit_code);
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("featdoc=debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("featdoc=warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<i32, CliError> {
    match cli.command {
        Commands::Render {
            input,
            out,
            format,
            full_report_link,
            report_projects,
            placeholder,
            behavior_type,
            config,
            stdout,
        } => {
            let cli_overrides = CliOverrides {
                output_file: out,
                format: format.map(|f| match f {
                    CliFormat::Markdown => OutputFormat::Markdown,
                    CliFormat::Json => OutputFormat::Json,
                }),
                full_report_link,
                report_projects,
                placeholder,
                behavior_test_type: behavior_type,
            };
            let options = load_options(config.as_deref(), &cli_overrides)?;
            let tree = read_tree(&input)?;
            run_render(tree, options, stdout)
        }
        Commands::Markers { placeholder } => {
            let markers = Placeholders::from_base(&placeholder);
            println!("{}", markers.start);
            println!("{}", markers.end);
            Ok(EXIT_CODE_SUCCESS)
        }
    }
}

fn load_options(
    config_path: Option<&str>,
    cli_overrides: &CliOverrides,
) -> Result<EffectiveOptions, CliError> {
    let loaded_config: Option<ReporterOptions> = match config_path {
        Some(path) => {
            Some(load_config(Path::new(path)).map_err(|e| CliError::ConfigLoad(e.to_string()))?)
        }
        None => discover_config().map(|(path, config)| {
            tracing::debug!(path = %path.display(), "using discovered config");
            config
        }),
    };

    let options = resolve_config(loaded_config.as_ref(), cli_overrides);
    options
        .validate()
        .map_err(|e| CliError::ConfigLoad(e.to_string()))?;
    Ok(options)
}

fn read_tree(input: &str) -> Result<SuiteNode, CliError> {
    let content = if input == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| CliError::InputRead {
                path: "stdin".to_string(),
                source: e,
            })?;
        buf
    } else {
        fs::read_to_string(input).map_err(|e| CliError::InputRead {
            path: input.to_string(),
            source: e,
        })?
    };

    serde_json::from_str(&content).map_err(|e| CliError::InputParse {
        path: input.to_string(),
        source: e,
    })
}

fn run_render(tree: SuiteNode, options: EffectiveOptions, stdout: bool) -> Result<i32, CliError> {
    if stdout {
        let adapter = adapter_for(options.format);
        let fragment = generate_report(tree, &options, adapter.as_adapter())?;
        print!("{}", fragment);
        return Ok(EXIT_CODE_SUCCESS);
    }

    let mut reporter = Reporter::with_store(options, FsDocumentStore::current_dir())?;
    reporter.begin(&RunConfig::default(), tree);
    let written = reporter.end(&RunResult::default())?;
    eprintln!("wrote {}", written.path.display());
    Ok(EXIT_CODE_SUCCESS)
}
