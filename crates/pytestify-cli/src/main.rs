mod conftest;
mod paths;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use pytestify_rewrite::{convert, ConvertConfig};

#[derive(Parser)]
#[command(author, version, about = "Pytestify - Convert mamba specs to pytest modules")]
struct Cli {
    /// Conversion settings (TOML)
    #[arg(long, global = true, env = "PYTESTIFY_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert mamba spec files and disable the originals
    Convert {
        /// Spec files, directories or glob patterns
        #[arg(value_name = "PATHS", required = true)]
        paths: Vec<PathBuf>,
        /// Stop at the first file that fails
        #[arg(long)]
        fail_fast: bool,
        /// Output format
        #[arg(long, short, default_value = "text")]
        format: SummaryFormat,
    },
    /// Convert in memory and report problems without writing anything
    Check {
        /// Spec files, directories or glob patterns
        #[arg(value_name = "PATHS", required = true)]
        paths: Vec<PathBuf>,
    },
    /// Print the converted module to stdout
    Print {
        /// Path to the mamba spec
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Print the conftest.py that converted modules need
    Conftest,
}

#[derive(Clone, Copy, ValueEnum)]
enum SummaryFormat {
    /// Human-readable text
    Text,
    /// JSON output
    Json,
}

/// Outcome of converting one file.
#[derive(Debug, Default, Serialize)]
struct FileReport {
    input: PathBuf,
    output: Option<PathBuf>,
    disabled: Option<PathBuf>,
    warnings: Vec<String>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct Summary {
    total: usize,
    succeeded: usize,
    files: Vec<FileReport>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Convert {
            paths,
            fail_fast,
            format,
        } => convert_files(&paths, &config, fail_fast, format),
        Commands::Check { paths } => check_files(&paths, &config),
        Commands::Print { file } => print_file(&file, &config),
        Commands::Conftest => {
            print!("{}", conftest::render(&config.fixtures));
            Ok(true)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<ConvertConfig> {
    let Some(path) = path else {
        return Ok(ConvertConfig::default());
    };
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
    toml::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Invalid config {}: {}", path.display(), e))
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))
}

fn convert_files(
    args: &[PathBuf],
    config: &ConvertConfig,
    fail_fast: bool,
    format: SummaryFormat,
) -> Result<bool> {
    let files = paths::expand(args)?;
    debug!(files = files.len(), "expanded inputs");
    let mut reports = Vec::with_capacity(files.len());

    for file in files {
        let mut report = FileReport {
            input: file.clone(),
            ..FileReport::default()
        };
        let result = convert_file(&file, config, &mut report);
        if let Err(e) = &result {
            report.error = Some(e.to_string());
        }
        if let SummaryFormat::Text = format {
            print_report(&report);
        }
        reports.push(report);

        if fail_fast {
            if let Err(e) = result {
                if let SummaryFormat::Json = format {
                    print_summary(reports, format)?;
                }
                return Err(e);
            }
        }
    }

    print_summary(reports, format)
}

/// Convert one file fully in memory, then write the output and disable the
/// input.
fn convert_file(input: &Path, config: &ConvertConfig, report: &mut FileReport) -> Result<()> {
    let plan = paths::plan(input)?;
    debug!(input = %input.display(), output = %plan.output.display(), "converting");
    report.output = Some(plan.output.clone());
    if plan.disabled.is_some() && plan.output.exists() {
        anyhow::bail!("Output file already exists: {}", plan.output.display());
    }

    let source = read_source(input)?;
    let conversion = convert(&source, config)?;
    report.warnings = conversion.warnings.iter().map(ToString::to_string).collect();

    std::fs::write(&plan.output, &conversion.output)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", plan.output.display(), e))?;

    if let Some(disabled) = &plan.disabled {
        if let Err(e) = std::fs::rename(input, disabled) {
            // A leftover output would block the next run.
            let _ = std::fs::remove_file(&plan.output);
            anyhow::bail!("Failed to rename {}: {}", input.display(), e);
        }
        report.disabled = Some(disabled.clone());
    }
    Ok(())
}

fn print_report(report: &FileReport) {
    println!("Convert {}", report.input.display());
    if let Some(output) = &report.output {
        println!("     to {}", output.display());
    }
    if let Some(disabled) = &report.disabled {
        println!(
            "    and renaming the original file so it no longer runs\n     to {}",
            disabled.display()
        );
    }
    for warning in &report.warnings {
        println!("    {}: {}", "warning".yellow().bold(), warning);
    }
    if let Some(error) = &report.error {
        println!("{} failed", report.input.display());
        println!("{}", indent(error, "    "));
    }
}

fn print_summary(files: Vec<FileReport>, format: SummaryFormat) -> Result<bool> {
    let total = files.len();
    let succeeded = files.iter().filter(|report| report.error.is_none()).count();

    match format {
        SummaryFormat::Text => println!("{}/{} succeeded", succeeded, total),
        SummaryFormat::Json => {
            let summary = Summary {
                total,
                succeeded,
                files,
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(succeeded == total)
}

fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| format!("{prefix}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn check_files(args: &[PathBuf], config: &ConvertConfig) -> Result<bool> {
    let files = paths::expand(args)?;
    let mut all_ok = true;

    for path in files {
        let result = read_source(&path)
            .and_then(|content| convert(&content, config).map_err(anyhow::Error::from));
        match result {
            Ok(conversion) if conversion.warnings.is_empty() => {
                println!("{} {}", "✓".green().bold(), path.display());
            }
            Ok(conversion) => {
                for warning in &conversion.warnings {
                    eprintln!(
                        "{}: {}: {}",
                        path.display(),
                        "warning".yellow().bold(),
                        warning
                    );
                }
            }
            Err(e) => {
                eprintln!("{}: {}: {}", path.display(), "error".red().bold(), e);
                all_ok = false;
            }
        }
    }

    Ok(all_ok)
}

fn print_file(path: &Path, config: &ConvertConfig) -> Result<bool> {
    let content = read_source(path)?;
    let conversion = convert(&content, config)?;
    for warning in &conversion.warnings {
        eprintln!("{}: {}", "warning".yellow().bold(), warning);
    }
    print!("{}", conversion.output);
    Ok(true)
}
