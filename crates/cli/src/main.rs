// concilia CLI - config-driven bank/ledger reconciliation runs

mod exit_codes;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use concilia_recon::{reconcile_with, ReconError, ReconResult, RunConfig};
use exit_codes::{
    recon_exit_code, EXIT_AMBIGUOUS, EXIT_DISCREPANCIES, EXIT_SUCCESS, EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "concilia")]
#[command(about = "Bank statement / accounting ledger reconciliation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a reconciliation from a TOML config file
    #[command(after_help = "\
Examples:
  concilia run daily-close.toml
  concilia run daily-close.toml --json
  concilia run daily-close.toml --output result.json")]
    Run {
        /// Path to the run config file
        config: PathBuf,

        /// Output JSON to stdout instead of human summary only
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Validate a run config without reconciling
    #[command(after_help = "\
Examples:
  concilia validate daily-close.toml")]
    Validate {
        /// Path to the run config file
        config: PathBuf,
    },
}

pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    fn usage(msg: impl Into<String>) -> Self {
        CliError { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    fn engine(err: ReconError) -> Self {
        CliError { code: recon_exit_code(&err), message: err.to_string(), hint: None }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run { config, json, output } => cmd_run(config, json, output),
        Commands::Validate { config } => cmd_validate(config),
    };
    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {hint}");
            }
            ExitCode::from(err.code)
        }
    }
}

fn cmd_run(config_path: PathBuf, json: bool, output: Option<PathBuf>) -> Result<(), CliError> {
    let config_str = std::fs::read_to_string(&config_path)
        .map_err(|e| CliError::usage(format!("cannot read config: {e}")))?;
    let config = RunConfig::from_toml(&config_str).map_err(CliError::engine)?;

    // Source files resolve relative to the config file's directory.
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    let bank_csv = read_source(base_dir, &config.bank.file)?;
    let ledger_csv = read_source(base_dir, &config.ledger.file)?;

    let bank = concilia_recon::load_bank_csv(&bank_csv, &config.bank.columns)
        .map_err(CliError::engine)?;
    let ledger = concilia_recon::load_ledger_csv(&ledger_csv, &config.ledger.columns)
        .map_err(CliError::engine)?;

    let pipeline = config.build_pipeline().map_err(CliError::engine)?;
    let result =
        reconcile_with(&pipeline, &config.name, &bank, &ledger).map_err(CliError::engine)?;

    write_output(&result, json, output)?;
    print_summary(&result);

    let s = &result.summary;
    if s.ambiguous > 0 && config.engine.fail_on_ambiguous {
        return Err(CliError {
            code: EXIT_AMBIGUOUS,
            message: "ambiguous matches found (fail_on_ambiguous)".into(),
            hint: None,
        });
    }
    if s.unmatched_bank > 0 || s.unmatched_ledger > 0 {
        return Err(CliError {
            code: EXIT_DISCREPANCIES,
            message: format!(
                "discrepancies found: {} bank, {} ledger",
                s.unmatched_bank, s.unmatched_ledger
            ),
            hint: None,
        });
    }
    Ok(())
}

fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config_str = std::fs::read_to_string(&config_path)
        .map_err(|e| CliError::usage(format!("cannot read config: {e}")))?;
    let config = RunConfig::from_toml(&config_str).map_err(CliError::engine)?;
    eprintln!(
        "valid: '{}' with {} phase(s)",
        config.name,
        config.engine.phases.len(),
    );
    Ok(())
}

fn read_source(base_dir: &Path, file: &str) -> Result<String, CliError> {
    let path = base_dir.join(file);
    std::fs::read_to_string(&path)
        .map_err(|e| CliError::usage(format!("cannot read {}: {e}", path.display())))
}

fn write_output(
    result: &ReconResult,
    json: bool,
    output: Option<PathBuf>,
) -> Result<(), CliError> {
    if !json && output.is_none() {
        return Ok(());
    }
    let json_str = serde_json::to_string_pretty(result)
        .map_err(|e| CliError::usage(format!("JSON serialization error: {e}")))?;
    if let Some(ref path) = output {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::usage(format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }
    if json {
        println!("{json_str}");
    }
    Ok(())
}

fn print_summary(result: &ReconResult) {
    let s = &result.summary;
    let by_phase: Vec<String> = s
        .matched_by_phase
        .iter()
        .map(|(phase, count)| format!("{count} in phase {phase}"))
        .collect();
    eprintln!(
        "recon '{}': {} bank x {} ledger — {} matched ({}), {} unmatched bank, {} unmatched ledger, {} ambiguous",
        result.meta.config_name,
        s.bank_records,
        s.ledger_records,
        s.matched,
        if by_phase.is_empty() { "none".to_string() } else { by_phase.join(", ") },
        s.unmatched_bank,
        s.unmatched_ledger,
        s.ambiguous,
    );
}
