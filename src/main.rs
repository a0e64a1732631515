//! klc-check: convention checker for KiCad library components
//!
//! Loads JSON library documents, runs the selected rules against every
//! footprint and symbol, and optionally writes fixed documents back.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use klc_check::config::{self, Config};
use klc_check::error::LibraryError;
use klc_check::library::discover_documents;
use klc_check::rules::{MessageKind, RuleId};
use klc_check::runner::{check_document, RuleOutcome};

/// Convention checker for KiCad footprints and symbols.
///
/// Exits with 1 when violations remain and 2 on configuration or I/O errors.
#[derive(Parser, Debug)]
#[command(name = "klc-check")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Library documents (JSON) or directories containing them
    #[arg(value_name = "FILES", required = true)]
    files: Vec<PathBuf>,

    /// Path to configuration file
    #[arg(short, long, value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Only run these rules (e.g. 7.4, 4.3); overrides the configuration
    #[arg(short, long = "rule", value_name = "ID")]
    rules: Vec<String>,

    /// Apply automatic fixes and write the documents back
    #[arg(long)]
    fix: bool,

    /// Print outcomes as JSON
    #[arg(long)]
    json: bool,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN, // Default to warn for unknown levels
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Picks the rules to run: CLI selection first, then the configuration.
fn select_rules(args: &Args, cfg: &Config) -> Result<Vec<RuleId>, LibraryError> {
    if args.rules.is_empty() {
        return Ok(cfg.enabled_rules());
    }
    args.rules.iter().map(|id| id.parse()).collect()
}

/// Prints outcomes with violations or fix narration in plain text.
fn print_outcomes(path: &Path, outcomes: &[RuleOutcome]) {
    for outcome in outcomes.iter().filter(|o| !o.messages.is_empty()) {
        println!(
            "{}: {} - {} ({})",
            path.display(),
            outcome.component,
            outcome.rule,
            outcome.rule.title()
        );
        for message in &outcome.messages {
            match message.kind {
                MessageKind::ErrorDetail => println!("      {}", message.text),
                kind => println!("  {kind}: {}", message.text),
            }
        }
    }
}

/// Checks one document and prints the outcome. Returns whether violations remain.
fn process_document(
    path: &Path,
    rules: &[RuleId],
    cfg: &Config,
    args: &Args,
) -> Result<bool, LibraryError> {
    let document = check_document(path, rules, cfg.conventions, args.fix)?;

    if args.json {
        let json = serde_json::to_string_pretty(&document)
            .map_err(|source| LibraryError::Serialize { source })?;
        println!("{json}");
    } else {
        print_outcomes(path, &document.outcomes);
    }

    Ok(document.remaining())
}

/// Entry point for the klc-check tool.
fn main() -> ExitCode {
    let args = Args::parse();

    // Load configuration
    let cfg = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::from(2);
        }
    };

    // Initialise logging
    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    let rules = match select_rules(&args, &cfg) {
        Ok(rules) => rules,
        Err(e) => {
            error!(error = %e, "Invalid rule selection");
            return ExitCode::from(2);
        }
    };

    let documents = match discover_documents(&args.files) {
        Ok(documents) => documents,
        Err(e) => {
            error!(error = %e, "Failed to collect library documents");
            return ExitCode::from(2);
        }
    };

    info!(
        documents = documents.len(),
        rules = ?rules,
        fix = args.fix,
        "Starting klc-check"
    );

    let mut violations = false;
    for path in &documents {
        match process_document(path, &rules, &cfg, &args) {
            Ok(remaining) => violations |= remaining,
            Err(e) => {
                error!(error = %e, path = %path.display(), "Failed to process library");
                return ExitCode::from(2);
            }
        }
    }

    if violations {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn quiet_overrides_verbosity() {
        assert_eq!(get_log_level(3, true, "trace"), Level::ERROR);
        assert_eq!(get_log_level(0, false, "debug"), Level::DEBUG);
        assert_eq!(get_log_level(0, false, "bogus"), Level::WARN);
        assert_eq!(get_log_level(2, false, "error"), Level::DEBUG);
    }

    #[test]
    fn cli_rules_override_config() {
        let args = Args::parse_from(["klc-check", "-r", "4.3", "lib.json"]);
        let rules = select_rules(&args, &Config::default()).unwrap();
        assert_eq!(rules, vec![RuleId::PinStacking]);

        let args = Args::parse_from(["klc-check", "lib.json"]);
        let rules = select_rules(&args, &Config::default()).unwrap();
        assert_eq!(rules, RuleId::ALL.to_vec());
    }
}
