//! SchemGuard CLI - hierarchical schematic ERC and export from the command line.

use clap::{Parser, Subcommand, ValueEnum};
use schemguard::{
    ErcConfig, ErcEngine, ErcOptions, Issue, SchemGuardCore, SchemGuardError, Severity,
    ValidationResult,
};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "schemguard")]
#[command(about = "Hierarchical schematic ERC and export tool", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    verbosity: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run electrical rule checks on a design document
    Check {
        /// Path to a JSON design document
        #[arg(value_name = "DESIGN")]
        design: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,

        /// JSON file overriding the default ERC settings
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Only run these rule ids (repeatable)
        #[arg(long = "rule", value_name = "ID")]
        rules: Vec<String>,
    },

    /// Export the hierarchy descriptor and per-sheet dumps
    Export {
        /// Path to a JSON design document
        #[arg(value_name = "DESIGN")]
        design: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        out: PathBuf,

        /// Refuse to export unless every rule passes
        #[arg(long)]
        erc: bool,

        /// JSON file overriding the default ERC settings
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Show sheets, ports, signal groups and floating ports
    Inspect {
        /// Path to a JSON design document
        #[arg(value_name = "DESIGN")]
        design: PathBuf,
    },

    /// List available rules
    Rules {
        /// Show rule descriptions
        #[arg(long)]
        verbose: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output for CI/CD
    Json,
    /// GitHub Actions format
    Github,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbosity);
    tracing::debug!("schemguard-cli {}", env!("CARGO_PKG_VERSION"));

    let exit_code = match cli.command {
        Commands::Check {
            design,
            format,
            config,
            rules,
        } => handle_check(&design, format, config.as_deref(), rules),
        Commands::Export {
            design,
            out,
            erc,
            config,
        } => handle_export(&design, &out, erc, config.as_deref()),
        Commands::Inspect { design } => handle_inspect(&design),
        Commands::Rules { verbose } => {
            handle_rules(verbose);
            0
        }
    };

    process::exit(exit_code);
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_options(config: Option<&Path>, rules: Vec<String>) -> Result<ErcOptions, SchemGuardError> {
    let config = match config {
        Some(path) => ErcConfig::load(path)?,
        None => ErcConfig::default(),
    };
    Ok(ErcOptions { config, rules })
}

fn handle_check(
    design: &Path,
    format: OutputFormat,
    config: Option<&Path>,
    rules: Vec<String>,
) -> i32 {
    let result = load_options(config, rules)
        .and_then(|options| SchemGuardCore::check_design(design, &options));

    match result {
        Ok(validation) => {
            if let Err(e) = output_results(&validation, &format) {
                eprintln!("Error: {}", e);
                return 1;
            }
            if validation.passed() {
                0
            } else {
                1
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn handle_export(design: &Path, out: &Path, require_erc: bool, config: Option<&Path>) -> i32 {
    let result = load_options(config, Vec::new())
        .and_then(|options| SchemGuardCore::export_design(design, out, &options, require_erc));

    match result {
        Ok(report) => {
            println!("Exported {} file(s) to {}", report.files.len(), out.display());
            for file in &report.files {
                println!("  {}", file.display());
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn handle_inspect(design: &Path) -> i32 {
    let graph = match SchemGuardCore::load_design(design, &ErcOptions::default()) {
        Ok(graph) => graph,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    println!("\nDesign: {}", graph.title);
    println!("{}", "─".repeat(60));

    println!("\n  Sheets ({}):", graph.sheet_count());
    for sheet in graph.sheets() {
        println!(
            "    {} ({} symbols, {} ports)",
            sheet.name,
            sheet.schematic.symbols.len(),
            sheet.ports().len()
        );
        for port in sheet.ports() {
            println!("      {} [{}]", port.name, port.direction);
        }
    }

    println!("\n  Connections ({}):", graph.connections().len());
    for connection in graph.connections() {
        println!("    {}", connection);
    }

    let groups = graph.signal_groups();
    println!("\n  Signal groups ({}):", groups.len());
    for group in &groups {
        println!("    {}", group.ports.join(" = "));
    }

    let floating = graph.floating_ports();
    if !floating.is_empty() {
        println!("\n  Floating ports ({}):", floating.len());
        for port in floating {
            println!("    {}", port.qualified_name());
        }
    }
    0
}

fn output_results(result: &ValidationResult, format: &OutputFormat) -> Result<(), SchemGuardError> {
    match format {
        OutputFormat::Human => output_human(result),
        OutputFormat::Json => output_json(result)?,
        OutputFormat::Github => output_github(result),
    }
    Ok(())
}

fn severity_label(severity: &Severity) -> &'static str {
    match severity {
        Severity::Error => "ERROR",
        Severity::Warning => "WARNING",
        Severity::Info => "INFO",
    }
}

fn output_human(result: &ValidationResult) {
    println!("\nDesign: {} ({})", result.title, result.file.display());
    println!("{}", "─".repeat(60));

    if result.total_issues() == 0 {
        println!("  No issues found");
        return;
    }

    for severity in [Severity::Error, Severity::Warning, Severity::Info] {
        let issues: Vec<_> = result
            .issues
            .iter()
            .filter(|i| i.severity == severity)
            .collect();
        if issues.is_empty() {
            continue;
        }
        println!("\n  {}:", severity_label(&severity));
        for issue in issues {
            println!("    - [{}] {}", issue.rule_id, issue.message);
            if let Some(ref sheet) = issue.sheet {
                println!("      Sheet: {}", sheet);
            }
        }
    }

    println!("\n  Summary:");
    println!("    Errors:   {}", result.stats.errors);
    println!("    Warnings: {}", result.stats.warnings);
    println!("    Info:     {}", result.stats.info);
}

fn output_json(result: &ValidationResult) -> Result<(), SchemGuardError> {
    let output = serde_json::json!({
        "file": result.file.display().to_string(),
        "title": result.title,
        "passed": result.passed(),
        "issues": result.issues,
        "stats": result.stats,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn severity_to_github(issue: &Issue) -> &'static str {
    match issue.severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "notice",
    }
}

fn output_github(result: &ValidationResult) {
    for issue in &result.issues {
        println!(
            "::{} file={},title={}::{}",
            severity_to_github(issue),
            result.file.display(),
            issue.code,
            issue.message.replace('\n', " ")
        );
    }
}

fn handle_rules(verbose: bool) {
    println!("Available ERC rules:\n");

    let engine = ErcEngine::default();
    for rule in engine.rules() {
        println!("  {}", rule.id());
        println!("    {}", rule.name());
        if verbose {
            println!("    {}", rule.description());
        }
        println!();
    }
}
