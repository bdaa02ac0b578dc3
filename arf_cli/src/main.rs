//! # ARF Compose CLI
//!

use arf_builder::prelude::*;
use arf_core::config::runtime::LogLevel;
use arf_core::logging::{self, service};
use arf_core::{log_error, log_info, RuntimeConfig};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "arf-compose")]
#[command(about = "Compose and split SCAP Asset Reporting Format result collections", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Runtime configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an asset report collection from a data stream and XCCDF results
    Compose {
        /// Source data stream collection
        #[arg(short, long)]
        datastream: PathBuf,

        /// XCCDF results (TestResult or Benchmark root)
        #[arg(short, long)]
        results: PathBuf,

        /// XCCDF tailoring file to merge into the data stream
        #[arg(short, long)]
        tailoring: Option<PathBuf>,

        /// Sub-result file referenced by check-content-ref (repeatable)
        #[arg(short = 'R', long = "sub-report")]
        sub_reports: Vec<PathBuf>,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Fail when the result root is neither TestResult nor Benchmark
        #[arg(long)]
        strict: bool,

        /// Do not embed sub-reports or rewrite references to them
        #[arg(long)]
        no_sub_reports: bool,

        /// Write without indentation
        #[arg(long)]
        no_indent: bool,

        /// Print a JSON summary of the composed collection
        #[arg(long)]
        summary: bool,
    },

    /// Export the content of one component of a collection to a file
    Split {
        /// Asset report collection to read
        #[arg(short, long)]
        input: PathBuf,

        /// Container holding the component
        #[arg(long, default_value = "reports")]
        container: String,

        /// Component element name
        #[arg(long, default_value = "report")]
        component: String,

        /// Component id
        #[arg(long)]
        id: String,

        /// Directory to write `<component>.xml` into
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Write without indentation
        #[arg(long)]
        no_indent: bool,
    },

    /// Print a JSON summary of an existing collection
    Summary {
        /// Asset report collection to read
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    let verbose = cli.verbose;

    let config = match load_runtime_config(cli.config.as_deref(), cli.verbose) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("Error: {}", message);
            std::process::exit(1);
        }
    };

    if let Err(message) = init_logging(&config) {
        eprintln!(
            "Error [{}]: {}",
            logging::codes::system::INITIALIZATION_FAILURE.as_str(),
            message
        );
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::Compose {
            datastream,
            results,
            tailoring,
            sub_reports,
            output,
            strict,
            no_sub_reports,
            no_indent,
            summary,
        } => {
            let mut composer_config = ComposerConfig::from_preferences(&config.composer);
            if strict {
                composer_config = composer_config.with_strict_result_root(true);
            }
            if no_sub_reports {
                composer_config = composer_config.with_sub_reports(false);
            }
            if no_indent {
                composer_config = composer_config.with_indent(false);
            }

            let mut inputs = ComposeInputs::new(datastream, results);
            inputs.tailoring = tailoring;
            inputs.sub_reports = sub_reports;

            run_compose(&Composer::new(composer_config), &inputs, &output, summary)
        }
        Commands::Split {
            input,
            container,
            component,
            id,
            output_dir,
            no_indent,
        } => run_split(
            &input,
            &container,
            &component,
            &id,
            &output_dir,
            config.composer.indent_output && !no_indent,
        ),
        Commands::Summary { input } => run_summary(&input),
    };

    if logging::config::use_cargo_style_output() {
        if let Some(summary) = logging::cargo_style_summary() {
            eprintln!("{}", summary);
        }
    }

    if let Err(error) = result {
        log_error!(error.code(), &error.to_string());
        eprintln!("Error: {}", error.user_message());
        if verbose > 0 {
            for (path, event) in logging::critical_errors() {
                eprintln!("{}: {}", path.display(), event.format_detailed());
            }
        }
        std::process::exit(1);
    }
}

fn load_runtime_config(path: Option<&Path>, verbose: u8) -> Result<RuntimeConfig, String> {
    let mut config = match path {
        Some(path) => RuntimeConfig::load(path).map_err(|e| e.to_string())?,
        None => RuntimeConfig::default(),
    };

    config.logging.min_log_level = match verbose {
        0 => config.logging.min_log_level,
        1 => config.logging.min_log_level.max(LogLevel::Info),
        _ => LogLevel::Debug,
    };

    Ok(config)
}

fn level_filter(level: LogLevel) -> log::LevelFilter {
    match level {
        LogLevel::Error => log::LevelFilter::Error,
        LogLevel::Warning => log::LevelFilter::Warn,
        LogLevel::Info => log::LevelFilter::Info,
        LogLevel::Debug => log::LevelFilter::Debug,
    }
}

/// Structured output goes through the configured service; otherwise events
/// are forwarded to `env_logger`
fn init_logging(config: &RuntimeConfig) -> Result<(), String> {
    logging::config::init_runtime_preferences(config.logging.clone())?;

    if config.logging.use_structured_logging {
        return logging::init_global_logging();
    }

    env_logger::Builder::new()
        .filter_level(level_filter(config.logging.min_log_level))
        .parse_default_env()
        .init();
    logging::init_global_logging_with_service(Arc::new(service::create_facade_service()))
}

fn run_compose(
    composer: &Composer,
    inputs: &ComposeInputs,
    output: &Path,
    print_summary: bool,
) -> Result<(), ComposeError> {
    let outcome = compose_files(composer, inputs, output)?;

    for event in &outcome.diagnostics {
        eprintln!("{}", event.format());
    }
    if outcome.dropped_diagnostics > 0 {
        eprintln!("... {} more diagnostics not shown", outcome.dropped_diagnostics);
    }
    log_info!("Composition finished",
        "output" => output.display(),
        "reports" => outcome.reports.len()
    );

    if print_summary {
        print_json(&CompositionSummary::from_outcome(&outcome));
    }
    Ok(())
}

fn run_split(
    input: &Path,
    container: &str,
    component: &str,
    id: &str,
    output_dir: &Path,
    indent: bool,
) -> Result<(), ComposeError> {
    let doc = load_document(input, "collection")?;
    let dumped = dump_arf_content(&doc, container, component, id, output_dir, indent)?;

    for event in dumped.diagnostics.events() {
        eprintln!("{}", event.format());
    }
    println!("{}", dumped.path.display());
    Ok(())
}

fn run_summary(input: &Path) -> Result<(), ComposeError> {
    let doc = load_document(input, "collection")?;
    print_json(&CompositionSummary::from_document(&doc));
    Ok(())
}

fn print_json(summary: &CompositionSummary) {
    match summary.to_json() {
        Ok(json) => println!("{}", json),
        Err(error) => eprintln!("Error: failed to render summary: {}", error),
    }
}
