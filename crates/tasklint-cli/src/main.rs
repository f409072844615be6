//! tasklint CLI - lint CI task catalogs

mod json;

use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::{Path, PathBuf};
use std::process;
use tasklint_core::{validate_catalog, DiagnosticLevel, LintConfig, ResourceReport};
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tasklint")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Lint CI task catalogs",
    long_about = "Validate Task and ClusterTask definitions in a catalog.\n\nChecks: images • secrets • params • step scripts (via external linters)"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to validate (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Strict mode (treat warnings as errors)
    #[arg(short, long)]
    strict: bool,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Verbose output (rule ids, suggestions, debug logs)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a catalog directory or a single file
    Validate {
        /// Path to validate
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Initialize config file
    Init {
        /// Output path for config
        #[arg(default_value = ".tasklint.toml")]
        output: PathBuf,
    },

    /// List all rules
    Rules,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match &cli.command {
        Some(Commands::Validate { path }) => validate_command(path, &cli),
        Some(Commands::Init { output }) => init_command(output),
        Some(Commands::Rules) => rules_command(),
        None => validate_command(&cli.path, &cli),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

/// Logs go to stderr so JSON on stdout stays parseable. `RUST_LOG` wins over
/// the default level.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn validate_command(path: &Path, cli: &Cli) -> anyhow::Result<()> {
    let config = LintConfig::load_or_default(cli.config.as_ref());

    if cli.format == OutputFormat::Text {
        println!("{} {}", "Validating:".cyan().bold(), path.display());
        println!();
    }

    let reports = validate_catalog(path, &config)?;

    let errors: usize = reports.iter().map(|r| r.result.errors().count()).sum();
    let warnings: usize = reports.iter().map(|r| r.result.warnings().count()).sum();

    match cli.format {
        OutputFormat::Json => {
            let output = json::reports_to_json(&reports, path);
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => print_text(&reports, errors, warnings, cli.verbose),
    }

    if errors > 0 || (cli.strict && warnings > 0) {
        process::exit(1);
    }

    Ok(())
}

fn print_text(reports: &[ResourceReport], errors: usize, warnings: usize, verbose: bool) {
    if errors + warnings == 0 {
        println!(
            "{} ({} {} checked)",
            "✓ No issues found".green().bold(),
            reports.len(),
            if reports.len() == 1 { "resource" } else { "resources" }
        );
        return;
    }

    for report in reports {
        for diag in report.result.diagnostics() {
            let level_str = match diag.level {
                DiagnosticLevel::Error => "error".red().bold(),
                DiagnosticLevel::Warning => "warning".yellow().bold(),
            };

            let resource = if report.name.is_empty() {
                String::new()
            } else {
                format!(" {}/{}", report.kind, report.name)
            };

            println!(
                "{}{} {}: {}",
                report.file.display().to_string().dimmed(),
                resource.dimmed(),
                level_str,
                diag.message
            );

            if verbose {
                println!("  {} {}", "rule:".dimmed(), diag.rule.dimmed());
                if let Some(suggestion) = &diag.suggestion {
                    println!("  {} {}", "help:".cyan(), suggestion);
                }
            }
            println!();
        }
    }

    println!("{}", "─".repeat(60).dimmed());
    println!(
        "Found {} {}, {} {}",
        errors,
        if errors == 1 { "error" } else { "errors" },
        warnings,
        if warnings == 1 { "warning" } else { "warnings" }
    );
}

fn init_command(output: &Path) -> anyhow::Result<()> {
    let default_config = LintConfig::default();
    let toml_content = toml::to_string_pretty(&default_config)?;

    std::fs::write(output, toml_content)?;

    println!(
        "{} Created config file: {}",
        "✓".green().bold(),
        output.display()
    );

    Ok(())
}

fn rules_command() -> anyhow::Result<()> {
    for (id, name) in tasklint_rules::RULES_DATA {
        let category = tasklint_rules::get_category_for_rule(id).unwrap_or("other");
        println!(
            "{} {} {}",
            format!("{:<12}", id).bold(),
            format!("{:<10}", category).dimmed(),
            name
        );
    }
    println!();
    println!("{} rules", tasklint_rules::rule_count());
    Ok(())
}
