//! Intake Sentinel CLI - Command-line boundary for the content gate
//!
//! Verdicts and reports go to stdout as JSON; logs go to stderr
//! (`RUST_LOG` controls verbosity).

mod boundary;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use intake_core::{ContentGate, FailurePolicy, GateConfig, RuleSet};
use intake_ledger::{AuditLedger, ChainStatus};

use crate::boundary::{exit_code, BoundaryReport};

#[derive(Parser)]
#[command(name = "intake")]
#[command(about = "Intake Sentinel - Deterministic content gate for agent pipelines")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a file and print its verdict
    Scan(ScanArgs),
    /// Rule file utilities
    Rules {
        #[command(subcommand)]
        command: RulesCommand,
    },
    /// Audit ledger utilities
    Ledger {
        #[command(subcommand)]
        command: LedgerCommand,
    },
}

#[derive(clap::Args)]
struct ScanArgs {
    /// File to evaluate, or `-` for stdin
    file: String,

    /// Identifier used for format classification (defaults to the file name)
    #[arg(long = "as", value_name = "ID")]
    identifier: Option<String>,

    /// Rule file (overrides the configuration)
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Gate configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Append the verdict to the audit ledger in this directory
    #[arg(long, value_name = "DIR")]
    ledger: Option<PathBuf>,

    /// Let content through when the gate cannot run
    #[arg(long)]
    fail_open: bool,
}

#[derive(Subcommand)]
enum RulesCommand {
    /// Load a rule file and report its contents
    Check {
        path: PathBuf,
    },
}

#[derive(Subcommand)]
enum LedgerCommand {
    /// Verify the ledger hash chain
    Verify {
        dir: PathBuf,
    },
    /// Print the most recent entries
    Tail {
        dir: PathBuf,
        /// Number of entries
        #[arg(short, default_value_t = 10)]
        n: usize,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Scan(args) => scan(args),
        Commands::Rules {
            command: RulesCommand::Check { path },
        } => check_rules(&path),
        Commands::Ledger {
            command: LedgerCommand::Verify { dir },
        } => verify_ledger(&dir),
        Commands::Ledger {
            command: LedgerCommand::Tail { dir, n },
        } => tail_ledger(&dir, n),
    }
}

fn scan(args: ScanArgs) -> Result<ExitCode> {
    let content = read_content(&args.file)?;
    let identifier = args
        .identifier
        .clone()
        .unwrap_or_else(|| default_identifier(&args.file));

    let cli_policy = args.fail_open.then_some(FailurePolicy::FailOpen);

    let mut config = match &args.config {
        Some(path) => match GateConfig::load_from_path(path) {
            Ok(config) => config,
            Err(e) => {
                let policy = cli_policy.unwrap_or_default();
                return emit_boundary_failure(policy, &identifier, &e);
            }
        },
        None => GateConfig::default(),
    };
    if let Some(rules) = args.rules {
        config.rules.path = Some(rules);
    }
    if let Some(ledger) = args.ledger {
        config.ledger.path = Some(ledger);
    }
    let policy = cli_policy.unwrap_or(config.boundary.failure_policy);

    let gate = match ContentGate::new(&config) {
        Ok(gate) => gate,
        Err(e) => return emit_boundary_failure(policy, &identifier, &e),
    };

    let verdict = gate.evaluate(&content, &identifier);

    if let Some(dir) = &config.ledger.path {
        // Auditing is best-effort; the verdict stands either way.
        match AuditLedger::open(dir).and_then(|ledger| {
            let entry = ledger.record_verdict(&verdict, &content)?;
            ledger.flush()?;
            Ok(entry)
        }) {
            Ok(entry) => info!("Verdict recorded as ledger entry {}", entry.sequence),
            Err(e) => warn!("Failed to record verdict in {}: {}", dir.display(), e),
        }
    }

    println!("{}", serde_json::to_string_pretty(&verdict)?);
    Ok(ExitCode::from(exit_code(verdict.decision)))
}

fn emit_boundary_failure(
    policy: FailurePolicy,
    identifier: &str,
    cause: &dyn std::fmt::Display,
) -> Result<ExitCode> {
    let report = BoundaryReport::new(policy, identifier, cause);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(report.exit_code())
}

fn read_content(file: &str) -> Result<String> {
    if file == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file))
}

fn default_identifier(file: &str) -> String {
    if file == "-" {
        return "stdin".to_string();
    }
    Path::new(file)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.to_string())
}

fn check_rules(path: &Path) -> Result<ExitCode> {
    let rules = RuleSet::load_from_path(path)
        .with_context(|| format!("rule file {} rejected", path.display()))?;
    println!(
        "{}: version {} ({} detection, {} encoding rules)",
        path.display(),
        rules.version(),
        rules.detection_rules().len(),
        rules.encoding_rules().len()
    );
    Ok(ExitCode::SUCCESS)
}

fn verify_ledger(dir: &Path) -> Result<ExitCode> {
    let ledger = AuditLedger::open(dir)
        .with_context(|| format!("failed to open ledger {}", dir.display()))?;
    match ledger.verify_chain()? {
        ChainStatus::Intact { entries } => {
            println!("ledger intact: {} entries", entries);
            Ok(ExitCode::SUCCESS)
        }
        ChainStatus::Broken { sequence, reason } => {
            println!("ledger broken at entry {}: {}", sequence, reason);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn tail_ledger(dir: &Path, n: usize) -> Result<ExitCode> {
    let ledger = AuditLedger::open(dir)
        .with_context(|| format!("failed to open ledger {}", dir.display()))?;
    for entry in ledger.tail(n)? {
        println!("{}", serde_json::to_string(&entry)?);
    }
    Ok(ExitCode::SUCCESS)
}
