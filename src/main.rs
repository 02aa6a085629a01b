//! cc-hookguard: PreToolUse hook for Claude Code.
//!
//! `cc-hookguard guard` reads one hook invocation from stdin and exits
//! 0 (allow), 2 (block, message on stderr) or 1 (configuration error).

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use cc_hookguard::builtins::Builtin;
use cc_hookguard::config::{CONFIG_FILE_NAME, Config, Options, PROJECT_DIR_ENV};
use cc_hookguard::{doctor, hook, logging};

#[derive(Parser, Debug)]
#[command(name = "cc-hookguard", version, about = "Block dangerous agent tool calls before they run", long_about = None)]
struct Cli {
    /// Use this config file instead of discovering .cc-hookguard.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Raise diagnostic verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run as a PreToolUse hook: read JSON on stdin, exit 0/1/2
    Guard,

    /// Check that configuration loads and rules compile
    Doctor {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a starter config and print the hook registration snippet
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,

        /// Directory to write into (default: current directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// List the builtin checks
    Builtins,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let options = match options(&cli) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("cc-hookguard: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Command::Guard => Ok(run_guard(&options)),
        Command::Doctor { .. } => run_doctor(&options),
        Command::Init { force, ref dir } => run_init(&options, force, dir.as_deref()),
        Command::Builtins => {
            list_builtins();
            Ok(ExitCode::SUCCESS)
        }
    };

    result.unwrap_or_else(|e| {
        eprintln!("cc-hookguard: {e:#}");
        ExitCode::FAILURE
    })
}

fn options(cli: &Cli) -> Result<Options> {
    let cwd = std::env::current_dir().context("cannot determine current directory")?;
    Ok(Options {
        config_path: cli.config.clone(),
        project_dir: std::env::var_os(PROJECT_DIR_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from),
        cwd,
        json: matches!(cli.command, Command::Doctor { json: true }),
    })
}

// ── guard ──

fn run_guard(options: &Options) -> ExitCode {
    let mut stdin = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut stdin) {
        // Unreadable input is treated like malformed input.
        log::warn!("failed to read stdin: {e}");
        stdin.clear();
    }

    let outcome = hook::run(&stdin, options);
    if let Some(text) = outcome.stderr() {
        eprintln!("{text}");
    }
    ExitCode::from(outcome.exit_code())
}

// ── doctor ──

fn run_doctor(options: &Options) -> Result<ExitCode> {
    let report = doctor::diagnose(options);
    if options.json {
        let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
        println!("{json}");
    } else {
        print!("{}", report.render());
    }
    Ok(if report.healthy() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

// ── init ──

fn run_init(options: &Options, force: bool, dir: Option<&Path>) -> Result<ExitCode> {
    let dir = dir.map_or_else(|| options.cwd.clone(), |d| options.cwd.join(d));
    let path = dir.join(CONFIG_FILE_NAME);
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    std::fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;
    std::fs::write(&path, Config::scaffold())
        .with_context(|| format!("failed to write {}", path.display()))?;

    println!("Wrote {}", path.display());
    println!();
    println!("Register the hook in .claude/settings.json:");
    println!("{}", hook_snippet()?);
    Ok(ExitCode::SUCCESS)
}

fn hook_snippet() -> Result<String> {
    let snippet = serde_json::json!({
        "hooks": {
            "PreToolUse": [{
                "matcher": "*",
                "hooks": [{ "type": "command", "command": "cc-hookguard guard" }]
            }]
        }
    });
    serde_json::to_string_pretty(&snippet).context("failed to render hook snippet")
}

// ── builtins ──

fn list_builtins() {
    let width = Builtin::ALL.iter().map(|b| b.name().len()).max().unwrap_or(0);
    for builtin in Builtin::ALL {
        println!("{:width$}  {}", builtin.name(), builtin.description());
    }
}
