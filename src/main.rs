// Copyright (c) 2025 Robert August Vincent II <pillarsdotnet@gmail.com>

//! # tt — work timer CLI
//!
//! Times work sessions per project. Sessions can be paused and resumed; on stop the
//! session is titled, annotated with commits from configured git repositories, and
//! appended to the current project's log. Data lives under `~/.tt` by default
//! (override with `--dir` or `$TT_DIR`).
//!
//! ## Files
//!
//! - `timer`: `status:startEpoch:lastPauseEpoch:pausedAccumulatedSeconds`
//! - `project`: current project name
//! - `projects/<name>`: one session per line: `YYYY-MM-DD/HH:MM:SS HH:MM:SS title[ >> repo || commit...]`
//! - `config`: TOML: `editor`, `repositories`, `[aliases]`
//!
//! ## Subcommands
//!
//! | Command    | Description |
//! |------------|-------------|
//! | `start`    | Start the timer. |
//! | `stop`     | Stop the timer; title from `-m`, the editor (`-e`), or a prompt. |
//! | `pause`    | Pause the running timer. |
//! | `resume`   | Resume a paused timer. |
//! | `status`   | Show timer state and time worked; `--raw` for scripts. |
//! | `list`     | List sessions of the current project; `--short`, `--sum`. |
//! | `switch`   | Make a project current, creating it if new. |
//! | `edit`     | Open the config file in the editor. |
//! | `update`   | Rebuild from a local checkout and replace this binary. |
//! | `version`  | Print the version. |
//! | `help`     | Show help. |
//!
//! Any other command is looked up in the config's `[aliases]` table.

mod config;
mod elapsed;
mod error;
mod migrate;
mod paths;
mod project;
mod prompt;
mod record;
mod timer;
mod tracker;
mod update;
mod vcs;

use std::env;
use std::fs;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process;

use chrono::{Local, TimeZone};
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::paths::Paths;
use crate::prompt::{Prompt, StdinPrompt};
use crate::timer::{PauseOutcome, Timer};
use crate::tracker::{ListOptions, Tracker};

/// Display format for wall-clock times.
const TIME_FORMAT: &str = "%a %b %d %H:%M:%S %Z %Y";

#[derive(Parser, Debug)]
#[command(name = "tt")]
#[command(about = "Work timer: start, stop, pause, resume and list sessions per project")]
struct Cli {
    /// Data directory (default: $TT_DIR or ~/.tt)
    #[arg(long, global = true, value_name = "PATH")]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Cmd {
    /// Start the timer
    Start,

    /// Stop the timer and record the session
    Stop {
        /// Session title
        #[arg(short = 'm', long = "message", value_name = "TITLE")]
        message: Option<String>,

        /// Write the title in the editor
        #[arg(short, long, conflicts_with = "message")]
        edit: bool,
    },

    /// Pause the running timer
    Pause,

    /// Resume a paused timer
    Resume,

    /// Show timer state
    Status {
        /// Print `<status> <HH:MM:SS> <project>` only
        #[arg(long)]
        raw: bool,
    },

    /// List sessions of the current project
    List {
        /// One line per session, without commits
        #[arg(long)]
        short: bool,

        /// Print the total time
        #[arg(long)]
        sum: bool,
    },

    /// Make a project current, creating it if new
    Switch {
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Open the config file in the editor
    Edit,

    /// Rebuild from a local checkout and replace this binary
    Update {
        /// Checkout to build (default: current directory)
        #[arg(value_name = "SOURCE_DIR")]
        source: Option<PathBuf>,
    },

    /// Print the version
    Version,

    #[command(external_subcommand)]
    Alias(Vec<String>),
}

fn init_logging() {
    let debug_enabled = env::var("TT_DEBUG")
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false);
    let filter = if debug_enabled {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .init();
}

/// Replaces an alias with its expansion from the config and re-parses once.
fn expand_alias(words: &[String], config: &Config) -> std::result::Result<Cmd, String> {
    let (name, rest) = words.split_first().ok_or("missing command")?;
    let expansion = config
        .expand_alias(name)
        .ok_or_else(|| format!("unrecognized command '{}'", name))?;
    let argv = std::iter::once("tt".to_string())
        .chain(expansion)
        .chain(rest.iter().cloned());
    let cli = Cli::try_parse_from(argv).map_err(|e| format!("alias '{}': {}", name, e))?;
    match cli.command {
        Cmd::Alias(inner) => Err(format!(
            "alias '{}' expands to unknown command '{}'",
            name,
            inner.first().map(String::as_str).unwrap_or("")
        )),
        cmd => Ok(cmd),
    }
}

fn format_epoch(epoch: i64) -> String {
    Local
        .timestamp_opt(epoch, 0)
        .single()
        .unwrap_or_else(Local::now)
        .format(TIME_FORMAT)
        .to_string()
}

fn cmd_start(tracker: &mut Tracker, now: i64) -> Result<()> {
    tracker.start(now)?;
    println!("Started on {} at {}", tracker.current_project(), format_epoch(now));
    Ok(())
}

fn cmd_stop(
    tracker: &mut Tracker,
    now: i64,
    message: Option<String>,
    edit: bool,
    config: &Config,
) -> Result<()> {
    tracker.timer().ensure_can_stop()?;
    let since = tracker.timer().started_at().unwrap_or(now);
    let title = match message {
        Some(m) => m,
        None if edit => prompt::title_from_editor(&config.editor_command(), &format_epoch(since))?,
        None => StdinPrompt.ask_line("Title: ")?,
    };
    if title.trim().is_empty() {
        return Err(Error::EmptyTitle);
    }
    let commits = vcs::collect_annotations(&config.repository_paths(), since);
    let project = tracker.current_project().to_string();
    let record = tracker.stop(now, title.trim(), commits)?;
    println!("Stopped after {}: {} ({})", record.duration, record.title, project);
    for repo in &record.commits {
        println!("  {} commit(s) in {}", repo.commits.len(), repo.repo);
    }
    Ok(())
}

fn cmd_pause(tracker: &mut Tracker, now: i64) -> Result<()> {
    match tracker.pause(now)? {
        PauseOutcome::Paused => println!("Paused at {} ({} worked)", format_epoch(now), tracker.timer().elapsed(now)),
        PauseOutcome::AlreadyPaused => tracing::warn!("tt pause: timer is already paused"),
    }
    Ok(())
}

fn cmd_resume(tracker: &mut Tracker, now: i64) -> Result<()> {
    tracker.resume(now)?;
    println!("Resumed at {} ({} worked)", format_epoch(now), tracker.timer().elapsed(now));
    Ok(())
}

fn cmd_status(tracker: &Tracker, now: i64, raw: bool) -> Result<()> {
    let timer = tracker.timer();
    let project = tracker.current_project();
    if raw {
        println!("{} {} {}", timer.status(), timer.elapsed(now), project);
        return Ok(());
    }
    match *timer {
        Timer::Stopped => println!("Stopped. Current project: {}", project),
        Timer::Running { started_at, .. } => println!(
            "Running on {} since {}: {} worked",
            project,
            format_epoch(started_at),
            timer.elapsed(now)
        ),
        Timer::Paused { paused_at, .. } => println!(
            "Paused on {} since {}: {} worked, {} paused",
            project,
            format_epoch(paused_at),
            timer.elapsed(now),
            elapsed::Elapsed::from_seconds(timer.paused_seconds(now))
        ),
    }
    Ok(())
}

fn cmd_list(tracker: &Tracker, opts: ListOptions) -> Result<()> {
    let lines = tracker.list_current(opts)?;
    if lines.is_empty() {
        println!("No sessions recorded for {}.", tracker.current_project());
        return Ok(());
    }
    for line in lines {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_switch(tracker: &mut Tracker, name: &str) -> Result<()> {
    if tracker.switch_to(name)? {
        println!("Created project {}", name);
    }
    println!("Current project: {}", name);
    Ok(())
}

fn cmd_edit(paths: &Paths, config: &Config) -> Result<()> {
    fs::create_dir_all(paths.base())?;
    let path = paths.config();
    prompt::open_in_editor(&config.editor_command(), &path)?;
    // Report a broken file now.
    Config::load(&path);
    Ok(())
}

fn run(command: Cmd, paths: Paths, config: &Config) -> Result<()> {
    match command {
        Cmd::Version => {
            println!("tt {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Cmd::Update { source } => {
            let dest = update::run(source.as_deref())?;
            println!("Rebuilt and installed to {}", dest.display());
            return Ok(());
        }
        _ => {}
    }

    migrate::run(&paths, &mut StdinPrompt)?;
    if command == Cmd::Edit {
        return cmd_edit(&paths, config);
    }

    let mut tracker = Tracker::load(paths)?;
    let now = Local::now().timestamp();
    tracing::debug!(?command, project = %tracker.current_project(), "dispatching");
    match command {
        Cmd::Start => cmd_start(&mut tracker, now)?,
        Cmd::Stop { message, edit } => cmd_stop(&mut tracker, now, message, edit, config)?,
        Cmd::Pause => cmd_pause(&mut tracker, now)?,
        Cmd::Resume => cmd_resume(&mut tracker, now)?,
        Cmd::Status { raw } => cmd_status(&tracker, now, raw)?,
        Cmd::List { short, sum } => cmd_list(&tracker, ListOptions { short, sum })?,
        Cmd::Switch { name } => cmd_switch(&mut tracker, &name)?,
        other @ (Cmd::Edit | Cmd::Update { .. } | Cmd::Version | Cmd::Alias(_)) => {
            unreachable!("{:?} is handled before the tracker is loaded", other)
        }
    }
    tracker.finish()
}

fn main() {
    #[cfg(unix)]
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
    init_logging();

    let cli = Cli::parse();
    let paths = Paths::resolve(cli.dir);
    let config = Config::load(&paths.config());
    let command = match cli.command {
        Cmd::Alias(words) => match expand_alias(&words, &config) {
            Ok(cmd) => cmd,
            Err(msg) => Cli::command()
                .error(clap::error::ErrorKind::InvalidSubcommand, msg)
                .exit(),
        },
        cmd => cmd,
    };

    if let Err(e) = run(command, paths, &config) {
        eprintln!("{}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_aliases(pairs: &[(&str, &str)]) -> Config {
        Config {
            aliases: pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            ..Config::default()
        }
    }

    fn words(ws: &[&str]) -> Vec<String> {
        ws.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["tt", "--dir", "/tmp/tt", "stop", "-m", "wrote parser"]).unwrap();
        assert_eq!(cli.dir, Some(PathBuf::from("/tmp/tt")));
        assert_eq!(
            cli.command,
            Cmd::Stop {
                message: Some("wrote parser".to_string()),
                edit: false
            }
        );
        let cli = Cli::try_parse_from(["tt", "list", "--short", "--sum"]).unwrap();
        assert_eq!(cli.command, Cmd::List { short: true, sum: true });
        assert!(Cli::try_parse_from(["tt", "stop", "-m", "x", "-e"]).is_err());
    }

    #[test]
    fn test_unknown_command_is_alias_candidate() {
        let cli = Cli::try_parse_from(["tt", "s", "extra"]).unwrap();
        assert_eq!(cli.command, Cmd::Alias(words(&["s", "extra"])));
    }

    #[test]
    fn test_expand_alias() {
        let config = config_with_aliases(&[("s", "status --raw"), ("done", "stop -m"), ("loop", "nothere")]);
        assert_eq!(expand_alias(&words(&["s"]), &config).unwrap(), Cmd::Status { raw: true });
        assert_eq!(
            expand_alias(&words(&["done", "finished it"]), &config).unwrap(),
            Cmd::Stop {
                message: Some("finished it".to_string()),
                edit: false
            }
        );
        assert!(expand_alias(&words(&["loop"]), &config).unwrap_err().contains("unknown command"));
        assert!(expand_alias(&words(&["zzz"]), &config).unwrap_err().contains("unrecognized"));
    }
}
