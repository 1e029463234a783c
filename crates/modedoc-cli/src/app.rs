//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info};

use modedoc_ast::Node;
use modedoc_core::{Diagnostic, Diagnostics, FilterReport, Mode, ModeTransform, Settings};

/// Output format for diagnostics
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for tool consumption
    Json,
}

#[derive(Parser)]
#[command(name = "modedoc")]
#[command(author, version, about = "One source, one document per language", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transform a parsed document tree (mdast JSON) for one mode
    Transform {
        /// Input JSON file
        input: PathBuf,

        /// Output JSON file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Active mode, overriding configuration and MODEDOC_MODE
        #[arg(short, long)]
        mode: Option<Mode>,

        /// Configuration file (defaults to modedoc.toml next to the input)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Diagnostics format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Exit with an error if any short-code failed to expand
        #[arg(long)]
        strict: bool,
    },

    /// List short-code variables for a mode
    Vars {
        /// Mode to list (defaults to the configured mode)
        #[arg(short, long, conflicts_with = "all")]
        mode: Option<Mode>,

        /// List every mode with a dictionary
        #[arg(long)]
        all: bool,

        /// Configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Check that every variable is defined for every mode
    Check {
        /// Configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

/// What a transform command produced
#[derive(Debug)]
pub struct TransformSummary {
    /// Mode the document was transformed for
    pub mode: Mode,
    /// Div filter counts
    pub report: FilterReport,
    /// Diagnostics raised during the run, tagged with the input path
    pub diagnostics: Diagnostics,
}

/// Install the tracing subscriber (RUST_LOG controls verbosity)
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::Transform {
            input,
            output,
            mode,
            config,
            format,
            strict,
        } => {
            let base = input.parent().unwrap_or(Path::new("."));
            let settings = load_settings(config.as_deref(), base, mode)?;
            let summary = transform_command(&input, output.as_deref(), &settings)?;
            eprint!("{}", render_diagnostics(summary.diagnostics.iter(), format)?);
            if strict && summary.diagnostics.has_errors() {
                anyhow::bail!(
                    "{} short-code error(s) in {}",
                    summary.diagnostics.error_count(),
                    input.display()
                );
            }
        }
        Commands::Vars { mode, all, config } => {
            let settings = load_settings(config.as_deref(), Path::new("."), mode)?;
            print!("{}", vars_command(&settings, all));
        }
        Commands::Check { config, format } => {
            let settings = load_settings(config.as_deref(), Path::new("."), None)?;
            let diagnostics = check_command(&settings);
            print!("{}", render_diagnostics(diagnostics.iter(), format)?);
            if !diagnostics.is_empty() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Load settings and apply mode overrides
///
/// Precedence: `mode` argument, then `MODEDOC_MODE`, then the file.
/// Without an explicit `config`, `modedoc.toml` in `base_dir` is used when
/// present.
pub fn load_settings(config: Option<&Path>, base_dir: &Path, mode: Option<Mode>) -> Result<Settings> {
    let settings = match config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => Settings::discover(base_dir)
            .with_context(|| format!("Failed to load config from: {}", base_dir.display()))?,
    };
    let env_mode = Settings::mode_from_env().context("Invalid MODEDOC_MODE")?;
    let settings = settings
        .with_mode_override(env_mode)
        .with_mode_override(mode);
    debug!(mode = %settings.mode, "settings loaded");
    Ok(settings)
}

/// Execute the transform command
pub fn transform_command(
    input: &Path,
    output: Option<&Path>,
    settings: &Settings,
) -> Result<TransformSummary> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let content = fs::read_to_string(input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))?;
    let tree: Node = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse document tree: {}", input.display()))?;

    let transform = ModeTransform::from_settings(settings);
    let outcome = transform.run_collect(tree);
    info!(
        input = %input.display(),
        mode = %transform.mode(),
        lifted = outcome.report.lifted,
        removed = outcome.report.removed,
        diagnostics = outcome.diagnostics.len(),
        "document transformed"
    );

    let json = serde_json::to_string_pretty(&outcome.tree)
        .context("Failed to serialize document tree")?;
    match output {
        Some(path) => fs::write(path, json)
            .with_context(|| format!("Failed to write output file: {}", path.display()))?,
        None => println!("{}", json),
    }

    let mut diagnostics = Diagnostics::new();
    diagnostics.extend(
        outcome
            .diagnostics
            .into_iter()
            .map(|d| d.with_file(input.display().to_string())),
    );

    Ok(TransformSummary {
        mode: transform.mode(),
        report: outcome.report,
        diagnostics,
    })
}

/// Execute the vars command, returning one `name = replacement` line per entry
///
/// With `all`, every mode that has a dictionary is listed in turn.
pub fn vars_command(settings: &Settings, all: bool) -> String {
    let registry = settings.registry();
    let modes: Vec<Mode> = if all {
        registry.modes().collect()
    } else {
        vec![settings.mode]
    };

    let mut output = String::new();
    for mode in modes {
        output.push_str(&format!("# {} variables\n", mode));
        if let Some(dictionary) = registry.dictionary(mode) {
            for (name, content) in dictionary {
                let rendered = content
                    .to_nodes()
                    .iter()
                    .map(render_inline)
                    .collect::<String>();
                output.push_str(&format!("{} = {}\n", name, rendered));
            }
        }
    }
    output
}

/// Execute the check command
pub fn check_command(settings: &Settings) -> Vec<Diagnostic> {
    settings.registry().consistency_report()
}

/// Format diagnostics for display
pub fn render_diagnostics<'a>(
    diagnostics: impl Iterator<Item = &'a Diagnostic>,
    format: OutputFormat,
) -> Result<String> {
    let diagnostics: Vec<&Diagnostic> = diagnostics.collect();
    match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&diagnostics)
                .context("Failed to serialize diagnostics to JSON")?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Text => {
            let mut output = String::new();
            for diag in &diagnostics {
                output.push_str(&format!("{}\n\n", diag));
            }
            let errors = diagnostics.iter().filter(|d| d.is_error()).count();
            let warnings = diagnostics.iter().filter(|d| d.is_warning()).count();
            if errors + warnings > 0 {
                output.push_str(&format!(
                    "Found {} error(s) and {} warning(s)\n",
                    errors, warnings
                ));
            }
            Ok(output)
        }
    }
}

/// Markdown-ish rendering of a replacement for listings
fn render_inline(node: &Node) -> String {
    match &node.kind {
        modedoc_ast::NodeKind::InlineCode { value } => format!("`{}`", value),
        _ => node.text_content(),
    }
}
