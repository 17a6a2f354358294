//! YACS CLI
//!
//! Entry point for the `yacs` command-line tool.

use clap::{Args, Parser, Subcommand};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use tracing::debug;
use yacs::config::PROJECT_CONFIG_FILE;
use yacs::{
    compare, discover, logging, render_report, save_json, to_pretty_json, BatchCoordinator,
    CancelState, EffectiveConfig, ExcludeRules, Settings, SignalHandler, TransportLoader,
};
use yacs_core::{parse_document, Loader, ProcessOptions, Processor, ResolutionCache};

/// Exit code for any failure
const EXIT_ERROR: i32 = 1;

/// Exit code when `compare` finds differences
const EXIT_DIFFERENT: i32 = 2;

#[derive(Parser)]
#[command(name = "yacs")]
#[command(about = "Resolve, merge and validate JSON configuration documents", version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Leave `$ref` nodes unresolved
    #[arg(long, global = true)]
    skip_resolution: bool,

    /// Leave `@parent` directives unmerged
    #[arg(long, global = true)]
    skip_inheritance: bool,

    /// Strip `@schemas` without validating
    #[arg(long, global = true)]
    skip_validation: bool,

    /// Batch worker threads (default: detected parallelism)
    #[arg(long, global = true)]
    workers: Option<usize>,

    /// Project config file (default: ./yacs.toml)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Debug logging; also reports each valid document
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Errors only
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Process one document
    Process {
        /// Document path or http(s) URL
        file: String,

        /// Write the result here instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Process every file under a directory
    Batch {
        #[arg(long)]
        in_dir: PathBuf,

        #[arg(long)]
        out_dir: PathBuf,
    },

    /// Process a document and count its differences from an expected one
    /// (listed with --verbose)
    Compare {
        /// Document path or http(s) URL
        file: String,

        /// Expected result, read as-is
        expected: String,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.global.verbose, cli.global.quiet);

    let settings = match load_settings(&cli.global) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            process::exit(EXIT_ERROR);
        }
    };

    let loader = match TransportLoader::with_timeout_seconds(settings.http.timeout_seconds) {
        Ok(l) => Arc::new(l),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(EXIT_ERROR);
        }
    };
    let processor = Processor::new(loader.clone(), Arc::new(ResolutionCache::new()));
    let options = settings.process_options(cli.global.verbose);

    match cli.command {
        Commands::Process { file, output } => {
            run_process(&processor, &options, &file, output.as_deref());
        }
        Commands::Batch { in_dir, out_dir } => {
            run_batch(processor, options, &settings, &in_dir, &out_dir);
        }
        Commands::Compare { file, expected } => {
            run_compare(&processor, &options, loader.as_ref(), &file, &expected);
        }
    }
}

/// Builtin → host → project → CLI flags.
fn load_settings(global: &GlobalArgs) -> Result<Settings, yacs::ConfigError> {
    let host = EffectiveConfig::default_host_path();
    let project = global
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(PROJECT_CONFIG_FILE));

    if let Some(path) = global.config.as_deref().filter(|p| !p.exists()) {
        return Err(yacs::ConfigError::IoError(format!(
            "config file not found: {}",
            path.display()
        )));
    }

    let effective = EffectiveConfig::build(host.as_deref(), Some(&project), cli_overrides(global))?;
    for source in &effective.sources {
        debug!(
            origin = ?source.origin,
            path = source.path.as_deref().unwrap_or("-"),
            digest = source.digest.as_deref().unwrap_or("-"),
            "config source"
        );
    }
    match effective.to_json() {
        Ok(json) => debug!("effective config:\n{}", json),
        Err(e) => debug!(error = %e, "cannot render effective config"),
    }
    effective.settings()
}

fn cli_overrides(global: &GlobalArgs) -> Option<Value> {
    let mut overrides = Map::new();
    if global.skip_resolution {
        overrides.insert("resolve".to_string(), json!(false));
    }
    if global.skip_inheritance {
        overrides.insert("inherit".to_string(), json!(false));
    }
    if global.skip_validation {
        overrides.insert("validate".to_string(), json!(false));
    }
    if let Some(workers) = global.workers {
        overrides.insert("workers".to_string(), json!(workers));
    }

    (!overrides.is_empty()).then_some(Value::Object(overrides))
}

fn run_process(processor: &Processor, options: &ProcessOptions, file: &str, output: Option<&Path>) {
    let value = match processor.process(file, options) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(EXIT_ERROR);
        }
    };

    let result = match output {
        Some(path) => save_json(path, &value).map_err(|e| e.to_string()),
        None => to_pretty_json(&value)
            .map(|json| print!("{}", json))
            .map_err(|e| e.to_string()),
    };
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(EXIT_ERROR);
    }
}

fn run_batch(
    processor: Processor,
    options: ProcessOptions,
    settings: &Settings,
    in_dir: &Path,
    out_dir: &Path,
) {
    let cancel = Arc::new(CancelState::new());
    if let Err(e) = SignalHandler::new(Arc::clone(&cancel)).install() {
        eprintln!("Warning: cannot install interrupt handler: {}", e);
    }

    let result = ExcludeRules::new(&settings.batch.exclude)
        .map_err(yacs::BatchError::from)
        .and_then(|rules| discover(in_dir, out_dir, &rules))
        .and_then(|items| {
            BatchCoordinator::new(processor, options, settings.worker_count())
                .with_queue_capacity(settings.queue_capacity())
                .with_cancel_state(cancel)
                .run(items)
        });

    match result {
        Ok(summary) => {
            println!(
                "processed {} of {} files with {} workers in {} ms",
                summary.processed,
                summary.total,
                summary.workers,
                summary.duration_ms()
            );
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(EXIT_ERROR);
        }
    }
}

fn run_compare(
    processor: &Processor,
    options: &ProcessOptions,
    loader: &dyn Loader,
    file: &str,
    expected: &str,
) {
    let actual = processor.process(file, options);
    let expected = loader
        .load(expected)
        .and_then(|bytes| parse_document(expected, &bytes));

    let (actual, expected) = match (actual, expected) {
        (Ok(a), Ok(e)) => (a, e),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("Error: {}", e);
            process::exit(EXIT_ERROR);
        }
    };

    let differences = compare(&expected, &actual);
    print!("{}", render_report(&differences, options.verbose));
    if !differences.is_empty() {
        process::exit(EXIT_DIFFERENT);
    }
}
