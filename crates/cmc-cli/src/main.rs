//! CLI entry point for cxx-modules-converter.
//!
//! This binary converts a directory of C++ headers and sources into C++20
//! module interface and implementation units, or copies a tree through the
//! headers action unchanged.
//!
//! # Usage
//!
//! ```bash
//! cxx-modules-converter [OPTIONS] --directory <DIR>
//!
//! # Convert include/ into modules/
//! cxx-modules-converter -s include -d modules
//!
//! # Name modules relative to the parent of the source directory
//! cxx-modules-converter -s lib/include -d out -p -n org
//!
//! # Keep legacy headers usable through the compat macro
//! cxx-modules-converter -s include -d out --compat 'legacy/*' --json
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::io::Write;

use camino::Utf8PathBuf;
use cmc_core::{ConfigFile, ConvertAction, Options};
use cmc_scanner::{ConvertReport, DirectoryConverter, StatsSnapshot};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Convert C++ headers to C++20 modules.
///
/// Walks the source directory, turns headers into module interfaces and
/// sources into implementation units, and copies everything else. Outputs
/// are written only when their content changed.
#[derive(Parser)]
#[command(name = "cxx-modules-converter", version, about, long_about = None)]
struct Cli {
    /// The directory with files to convert.
    #[arg(short = 's', long, env = "CMC_DIRECTORY")]
    directory: Utf8PathBuf,

    /// Convert files in the source directory itself.
    #[arg(short, long)]
    inplace: bool,

    /// Destination directory for conversion results (ignored with --inplace).
    #[arg(short, long)]
    destination: Option<Utf8PathBuf>,

    /// Conversion to perform.
    #[arg(short, long, value_enum, default_value_t = ActionArg::Modules)]
    action: ActionArg,

    /// Resolve module names starting from this root directory.
    #[arg(short, long, conflicts_with = "parent")]
    root: Option<Utf8PathBuf>,

    /// Resolve module names starting from the parent of the source directory.
    #[arg(short, long)]
    parent: bool,

    /// Include search path, relative to the root.
    #[arg(short = 'I', long = "include", value_name = "DIR")]
    includes: Vec<Utf8PathBuf>,

    /// Module name prefix for files under the root.
    #[arg(short, long, default_value = "")]
    name: String,

    /// Files and directories matching a pattern are neither converted nor copied.
    #[arg(short = 'k', long = "skip", value_name = "PATTERN")]
    skip: Vec<String>,

    /// Files and directories matching a pattern are converted with a
    /// forwarding header.
    #[arg(long = "compat", value_name = "PATTERN")]
    compat: Vec<String>,

    /// Macro that selects the module-only lines in compat output.
    #[arg(long, value_name = "MACRO")]
    compat_macro: Option<String>,

    /// Re-export an import: `OWNER=TARGET`, `*` as TARGET for all imports.
    #[arg(long = "export", value_name = "OWNER=TARGET")]
    exports: Vec<String>,

    /// Re-export imports whose module name is the owner's plus this suffix.
    #[arg(long = "export-suffix", value_name = "SUFFIX")]
    export_suffixes: Vec<String>,

    /// Includes matching a pattern stay literal in the global module fragment.
    #[arg(long = "always-include", value_name = "PATTERN")]
    always_include: Vec<String>,

    /// JSON configuration file applied before the command-line flags.
    #[arg(long, env = "CMC_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Print run statistics as JSON.
    #[arg(long)]
    json: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long)]
    no_color: bool,
}

/// Conversion direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ActionArg {
    /// Headers and sources to module units.
    Modules,
    /// Copy the tree as headers.
    Headers,
}

impl From<ActionArg> for ConvertAction {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::Modules => Self::Modules,
            ActionArg::Headers => Self::Headers,
        }
    }
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable if set. Otherwise, uses
/// `debug` level if `--verbose` is set, or `info` level by default.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!("{level},ignore=warn,globset=warn"))
    });

    // Check if colors should be disabled (flag or NO_COLOR env var)
    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_ansi(use_ansi))
        .with(filter)
        .init();
}

/// Builds [`Options`] from the configuration file and CLI arguments.
///
/// The file is applied first so flags extend or override it.
///
/// # Errors
///
/// Returns an error if the configuration file cannot be loaded or a pattern,
/// export rule or macro name is invalid.
fn build_options(cli: &Cli) -> color_eyre::Result<Options> {
    let mut options = Options::default();

    if let Some(path) = &cli.config {
        info!(path = %path, "Loading configuration");
        ConfigFile::load(path)?.apply(&mut options)?;
    }

    if cli.parent {
        options.root_dir = cli.directory.parent().map(ToOwned::to_owned);
    } else if let Some(root) = &cli.root {
        options.root_dir = Some(root.clone());
    }
    if !cli.name.is_empty() {
        options.root_module_name.clone_from(&cli.name);
    }

    for include in &cli.includes {
        info!(path = %include, "Include search path");
        options.search_paths.push(include.clone());
    }
    for pattern in &cli.skip {
        info!(pattern = %pattern, "Skip pattern");
        options.skip_patterns.push(pattern)?;
    }
    for pattern in &cli.compat {
        options.compat_patterns.push(pattern)?;
    }
    if let Some(name) = &cli.compat_macro {
        options.set_compat_macro(name.as_str())?;
    }
    for rule in &cli.exports {
        options.add_export_rule(rule)?;
    }
    options
        .export_suffixes
        .extend(cli.export_suffixes.iter().cloned());
    for pattern in &cli.always_include {
        options.always_include.push(pattern)?;
    }

    Ok(options)
}

/// Resolves the destination directory.
///
/// # Errors
///
/// Returns an error if neither `--inplace` nor a distinct `--destination`
/// was given.
fn resolve_destination(cli: &Cli) -> color_eyre::Result<Utf8PathBuf> {
    if cli.inplace {
        return Ok(cli.directory.clone());
    }

    let Some(destination) = &cli.destination else {
        return Err(color_eyre::eyre::eyre!(
            "--destination is required unless --inplace is given"
        ));
    };
    if destination == &cli.directory {
        return Err(color_eyre::eyre::eyre!(
            "destination must differ from the source directory: {destination} (use --inplace)"
        ));
    }

    Ok(destination.clone())
}

// =============================================================================
// COMMAND IMPLEMENTATION
// =============================================================================

/// Converts the source directory and prints the run summary.
///
/// # Errors
///
/// Returns an error if the run fails or any file could not be converted.
fn run_convert(cli: &Cli) -> color_eyre::Result<()> {
    let options = build_options(cli)?;
    let destination = resolve_destination(cli)?;
    let action = ConvertAction::from(cli.action);

    info!(
        directory = %cli.directory,
        destination = %destination,
        action = %action,
        inplace = cli.inplace,
        "Converting directory"
    );

    let converter = DirectoryConverter::new(action, options);
    let report = converter.convert_directory(&cli.directory, &destination)?;

    if cli.json {
        print_json_stats(&report.stats)?;
    } else {
        print_stats_summary(&report.stats);
    }
    print_errors(&report)?;

    if !report.errors.is_empty() {
        return Err(color_eyre::eyre::eyre!(
            "{} file(s) failed to convert",
            report.errors.len()
        ));
    }

    info!("Done");
    Ok(())
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

/// Prints a summary of run statistics.
fn print_stats_summary(stats: &StatsSnapshot) {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    let _ = writeln!(handle);
    let _ = writeln!(handle, "Conversion Summary");
    let _ = writeln!(handle, "==================");
    let _ = writeln!(handle);
    let _ = writeln!(handle, "Files visited:      {}", stats.all);
    let _ = writeln!(handle, "  Convertible:      {}", stats.convertible);
    let _ = writeln!(handle, "  Outputs written:  {}", stats.converted);
    let _ = writeln!(handle, "  Copied:           {}", stats.copied);
    let _ = writeln!(handle, "  Errors:           {}", stats.errors);
    if stats.is_up_to_date() {
        let _ = writeln!(handle);
        let _ = writeln!(handle, "Destination is up to date.");
    }
}

/// Prints run statistics as pretty JSON.
fn print_json_stats(stats: &StatsSnapshot) -> color_eyre::Result<()> {
    let json = serde_json::to_string_pretty(stats)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to serialize JSON: {}", e))?;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{json}")?;
    Ok(())
}

/// Prints per-file errors to stderr.
fn print_errors(report: &ConvertReport) -> color_eyre::Result<()> {
    if report.errors.is_empty() {
        return Ok(());
    }

    let stderr = std::io::stderr();
    let mut handle = stderr.lock();
    writeln!(handle)?;
    writeln!(handle, "Errors ({}):", report.errors.len())?;
    for (path, error) in &report.errors {
        warn!(path = %path, "Conversion failed");
        writeln!(handle, "  {path} - {error}")?;
    }
    Ok(())
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
fn main() -> color_eyre::Result<()> {
    // 1. Install color-eyre FIRST (before any potential panics)
    color_eyre::install()?;

    // 2. Parse CLI arguments
    let cli = Cli::parse();

    // 3. Initialize tracing (handles --no-color for log output)
    init_tracing(cli.verbose, cli.no_color);

    run_convert(&cli)
}
