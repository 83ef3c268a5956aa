//! ofxwise - Convert Wise/TransferWise CSV exports.
//!
//! # Usage
//!
//! ```bash
//! ofxwise convert statement.csv statement.ofx
//! ofxwise convert -t transferwise --currency EUR statement.csv
//! ofxwise convert -t wise-usd --config settings.json statement.csv
//! ofxwise list-plugins
//! ```

use crate::cmd::completions::ShellType;
use crate::ofx;
use crate::settings::{Section, Settings};
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand, ValueEnum};
use ofxwise_core::Statement;
use ofxwise_importer::{Importer, ImporterRegistry, RowErrorPolicy};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Convert Wise/TransferWise CSV exports to OFX.
#[derive(Parser, Debug)]
#[command(name = "ofxwise")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Generate shell completions and exit
    #[arg(long, value_name = "SHELL", hide = true)]
    generate_completions: Option<ShellType>,

    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a CSV export into a statement
    Convert {
        /// Settings section or importer name (detected from the header if omitted)
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        kind: Option<String>,

        /// Settings file (defaults to the user config directory)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Keep only transactions in this currency
        #[arg(long)]
        currency: Option<String>,

        /// Account id written to the statement
        #[arg(long)]
        account: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Ofx)]
        format: OutputFormat,

        /// What to do with rows that cannot be parsed
        #[arg(long, value_enum)]
        on_error: Option<OnError>,

        /// The CSV export to read
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Where to write the result ('-' or omitted for stdout)
        #[arg(value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// List available importers and configured sections
    ListPlugins {
        /// Settings file (defaults to the user config directory)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

/// Output format for converted statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// OFX 2 XML
    Ofx,
    /// The statement as JSON
    Json,
}

/// Bad-row handling, as chosen on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OnError {
    /// Stop at the first bad row
    Abort,
    /// Skip bad rows and report them
    Collect,
}

impl From<OnError> for RowErrorPolicy {
    fn from(value: OnError) -> Self {
        match value {
            OnError::Abort => Self::Abort,
            OnError::Collect => Self::Collect,
        }
    }
}

/// Main entry point for the convert command.
pub fn main() -> ExitCode {
    main_with_name("ofxwise")
}

/// Main entry point with custom binary name.
pub fn main_with_name(bin_name: &str) -> ExitCode {
    let args = Args::parse();

    // Handle shell completion generation
    if let Some(shell) = args.generate_completions {
        crate::cmd::completions::generate_completions::<Args>(shell, bin_name);
        return ExitCode::SUCCESS;
    }

    init_tracing(args.verbose);

    let Some(command) = args.command else {
        eprintln!("error: a subcommand is required");
        eprintln!("For more information, try '--help'");
        return ExitCode::from(2);
    };

    match run(command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Convert {
            kind,
            config,
            currency,
            account,
            format,
            on_error,
            input,
            output,
        } => {
            let settings = load_settings(config.as_deref())?;
            let registry = ImporterRegistry::with_builtin();
            let (importer, section) = select_importer(&registry, &settings, kind.as_deref(), &input)?;
            tracing::debug!(importer = importer.name(), "selected importer");

            let section_policy = section.and_then(|s| s.on_error);
            let config = importer
                .configure()
                .maybe_currency(currency.or_else(|| section.and_then(|s| s.currency.clone())))
                .maybe_account(account.or_else(|| section.and_then(|s| s.account.clone())))
                .error_policy(on_error.map(RowErrorPolicy::from).or(section_policy).unwrap_or_default())
                .build();

            let result = config
                .parse_file(&input)
                .with_context(|| format!("failed to convert {}", input.display()))?;

            for err in &result.row_errors {
                eprintln!("warning: {err}");
            }
            result.statement.validate()?;

            let rendered = render(&result.statement, format, chrono::Local::now().naive_local())?;
            write_output(output.as_deref(), &rendered)?;

            eprintln!(
                "Converted {} transactions from {} ({} skipped, {} errors)",
                result.statement.len(),
                input.display(),
                result.skipped,
                result.row_errors.len()
            );
            Ok(())
        }
        Command::ListPlugins { config } => {
            let settings = load_settings(config.as_deref())?;
            let registry = ImporterRegistry::with_builtin();
            let mut stdout = io::stdout().lock();
            list_plugins(&registry, &settings, &mut stdout)
        }
    }
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let settings = match path {
        Some(path) => Settings::load(path)?,
        None => Settings::load_default()?,
    };
    Ok(settings)
}

/// Pick the importer for a conversion.
///
/// `kind` names a settings section first and a registered importer second.
/// Without it the registry sniffs the input's header row.
fn select_importer<'s>(
    registry: &ImporterRegistry,
    settings: &'s Settings,
    kind: Option<&str>,
    input: &Path,
) -> Result<(Arc<dyn Importer>, Option<&'s Section>)> {
    match kind {
        Some(name) => match settings.section(name) {
            Some(section) => {
                let importer = registry
                    .get(&section.plugin)
                    .with_context(|| format!("in settings section '{name}'"))?;
                Ok((importer, Some(section)))
            }
            None => Ok((registry.get(name)?, None)),
        },
        None => Ok((registry.identify(input)?, None)),
    }
}

/// Render a statement in the requested format.
pub fn render(statement: &Statement, format: OutputFormat, generated: NaiveDateTime) -> Result<String> {
    match format {
        OutputFormat::Ofx => ofx::to_ofx_string(statement, generated),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(statement)?;
            json.push('\n');
            Ok(json)
        }
    }
}

fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) if path != Path::new("-") => fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display())),
        _ => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            Ok(())
        }
    }
}

fn list_plugins<W: Write>(registry: &ImporterRegistry, settings: &Settings, out: &mut W) -> Result<()> {
    writeln!(out, "Importers:")?;
    for (name, description) in registry.list_importers() {
        writeln!(out, "  {name:<14} {description}")?;
    }

    let mut sections = settings.sections().peekable();
    if sections.peek().is_some() {
        writeln!(out)?;
        writeln!(out, "Configured sections:")?;
        for (name, section) in sections {
            write!(out, "  {name:<14} plugin={}", section.plugin)?;
            if let Some(currency) = &section.currency {
                write!(out, " currency={currency}")?;
            }
            if let Some(account) = &section.account {
                write!(out, " account={account}")?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}
