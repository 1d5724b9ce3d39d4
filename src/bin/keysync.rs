//! keysync - Keyed collection reconciliation CLI tool
//!
//! Computes the update actions between two collection snapshots stored as
//! YAML or JSON files, and checks drafts for duplicate keys.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use keyed_sync::{
    batch_elements, reconcile, validate_no_duplicates, Action, Collection, FieldComparator,
    SyncConfig, SyncOptions,
};

#[derive(Parser, Debug)]
#[command(name = "keysync", version, about = "Keyed collection reconciliation tool")]
struct Cli {
    /// Output location. Use '-' for stdout.
    #[arg(short, long, global = true, default_value = "-")]
    output: String,

    /// Output format.
    #[arg(short, long, global = true, value_enum, default_value_t = Format::Json)]
    format: Format,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute the sequenced update actions from OLD to NEW
    Diff {
        /// Persisted collection
        #[arg(long)]
        old: PathBuf,

        /// Draft collection. Required unless --unset is given.
        #[arg(long, required_unless_present = "unset", conflicts_with = "unset")]
        new: Option<PathBuf>,

        /// Treat the draft collection as unset
        #[arg(long)]
        unset: bool,

        /// Payload field holding a keyed sub-collection
        #[arg(long = "nested", value_name = "FIELD")]
        nested: Vec<String>,

        /// Payload field excluded from comparison
        #[arg(long = "ignore", value_name = "FIELD")]
        ignored: Vec<String>,

        /// Synchronization config file (batchSize, cache)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Group the actions into update requests of at most batchSize
        #[arg(long)]
        batches: bool,
    },
    /// Check a collection for duplicate keys
    Validate {
        file: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Yaml,
    Text,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut output: Box<dyn Write> = if cli.output == "-" {
        Box::new(io::stdout())
    } else {
        Box::new(
            fs::File::create(&cli.output)
                .map_err(|e| format!("Failed to create output file {:?}: {}", cli.output, e))?,
        )
    };

    match cli.command {
        Command::Diff {
            old,
            new,
            unset: _,
            nested,
            ignored,
            config,
            batches,
        } => {
            let config = match config {
                Some(path) => load_config(&path)?,
                None => SyncConfig::default(),
            };
            let comparator = build_comparator(nested, ignored);
            diff(&old, new.as_deref(), &comparator, &config, batches, cli.format, &mut output)?;
        }
        Command::Validate { file } => {
            validate(&file, &mut output)?;
        }
    }

    Ok(())
}

fn build_comparator(nested: Vec<String>, ignored: Vec<String>) -> FieldComparator {
    let comparator = nested.into_iter().fold(FieldComparator::new(), FieldComparator::nested);
    ignored.into_iter().fold(comparator, FieldComparator::ignored)
}

fn load_config(path: &Path) -> Result<SyncConfig, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file {:?}: {}", path, e))?;
    Ok(SyncConfig::from_yaml(&content)?)
}

fn load_collection(path: &Path) -> Result<Collection, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read file {:?}: {}", path, e))?;
    let collection: Collection = serde_yaml::from_str(&content)
        .map_err(|e| format!("Failed to parse collection {:?}: {}", path, e))?;
    debug!(file = ?path, elements = collection.len(), "loaded collection");
    Ok(collection)
}

fn diff(
    old_file: &Path,
    new_file: Option<&Path>,
    comparator: &FieldComparator,
    config: &SyncConfig,
    batches: bool,
    format: Format,
    output: &mut dyn Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let old = load_collection(old_file)?;
    let new = new_file.map(load_collection).transpose()?;
    let draft = new.clone().unwrap_or_default();

    let options: SyncOptions<Collection, Collection> = SyncOptions::builder()
        .config(config)
        .error_callback(|err, _, _, _| error!("{}", err))
        .build()?;

    let resource = old_file.display().to_string();
    let actions = options
        .build_update_actions(&resource, &old, &draft, || {
            reconcile(&old, new.as_deref(), |o, n| comparator.compare(o, n))
        })
        .ok_or("Reconciliation failed")?;

    if batches {
        let grouped = batch_elements(actions, options.batch_size());
        write_batches(&grouped, format, output)
    } else {
        write_actions(&actions, format, output)
    }
}

fn write_actions(actions: &[Action], format: Format, output: &mut dyn Write) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        Format::Json => writeln!(output, "{}", serde_json::to_string_pretty(actions)?)?,
        Format::Yaml => write!(output, "{}", serde_yaml::to_string(actions)?)?,
        Format::Text => {
            if actions.is_empty() {
                writeln!(output, "Collections are identical")?;
            }
            for action in actions {
                writeln!(output, "{}", action)?;
            }
        }
    }
    Ok(())
}

fn write_batches(
    batches: &[Vec<Action>],
    format: Format,
    output: &mut dyn Write,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        Format::Json => writeln!(output, "{}", serde_json::to_string_pretty(batches)?)?,
        Format::Yaml => write!(output, "{}", serde_yaml::to_string(batches)?)?,
        Format::Text => {
            for (i, batch) in batches.iter().enumerate() {
                writeln!(output, "Request {} ({} actions):", i + 1, batch.len())?;
                for action in batch {
                    writeln!(output, "  {}", action)?;
                }
            }
        }
    }
    Ok(())
}

fn validate(file: &Path, output: &mut dyn Write) -> Result<(), Box<dyn std::error::Error>> {
    let collection = load_collection(file)?;

    match validate_no_duplicates(&collection) {
        Ok(by_key) => {
            writeln!(output, "Validation successful: {} elements, keys unique", by_key.len())?;
            Ok(())
        }
        Err(err) => {
            writeln!(output, "Validation errors:")?;
            writeln!(output, "  - {}", err)?;
            Err("Validation failed".into())
        }
    }
}
