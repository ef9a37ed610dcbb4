// Copyright (c) 2025 Robert August Vincent II <pillarsdotnet@gmail.com>

//! Interactive input: line prompts, yes/no confirmations and the external editor.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::Command;

use crate::error::{Error, Result};

/// Source of interactive answers. Tests substitute a scripted implementation.
pub trait Prompt {
    /// Shows `prompt` and returns one line of input without the trailing newline.
    fn ask_line(&mut self, prompt: &str) -> io::Result<String>;
}

/// Reads answers from stdin, printing prompts to stdout.
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn ask_line(&mut self, prompt: &str) -> io::Result<String> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", prompt)?;
        stdout.flush()?;
        let mut buf = String::new();
        io::stdin().lock().read_line(&mut buf)?;
        Ok(buf.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// Asks a yes/no question; only `y` or `yes` (any case) counts as yes.
pub fn confirm(prompt: &mut dyn Prompt, question: &str) -> io::Result<bool> {
    let answer = prompt.ask_line(&format!("{} [y/N] ", question))?;
    let answer = answer.trim();
    Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}

/// Runs `editor` (split on whitespace) on `path` and blocks until it exits.
pub fn open_in_editor(editor: &str, path: &Path) -> Result<()> {
    let mut words = editor.split_whitespace();
    let program = words
        .next()
        .ok_or_else(|| Error::Editor("no editor configured".to_string()))?;
    tracing::debug!(editor = %editor, path = %path.display(), "launching editor");
    let status = Command::new(program)
        .args(words)
        .arg(path)
        .status()
        .map_err(|e| Error::Editor(format!("{}: {}", program, e)))?;
    if !status.success() {
        return Err(Error::Editor(format!("{} exited with {}", program, status)));
    }
    Ok(())
}

/// First line of `path` that is neither blank nor a `#` comment; empty if none.
pub fn title_from_file(path: &Path) -> Result<String> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with('#'))
        .unwrap_or("")
        .to_string())
}

/// Opens a scratch file in the editor and returns the title typed into it.
pub fn title_from_editor(editor: &str, started_at: &str) -> Result<String> {
    let mut tmp = tempfile::Builder::new().prefix("tt-title-").suffix(".txt").tempfile()?;
    writeln!(tmp)?;
    writeln!(tmp, "# Title for the session started {}.", started_at)?;
    writeln!(tmp, "# Lines starting with '#' are ignored; an empty title aborts the stop.")?;
    tmp.flush()?;
    open_in_editor(editor, tmp.path())?;
    title_from_file(tmp.path())
}
