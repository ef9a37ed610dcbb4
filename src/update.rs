// Copyright (c) 2025 Robert August Vincent II <pillarsdotnet@gmail.com>

//! `tt update`: rebuild from a local checkout and replace the running binary.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Error, Result};

const BIN_NAME: &str = if cfg!(windows) { "tt.exe" } else { "tt" };

/// Builds `source` (default: current directory) with `cargo build --release` and installs the result over
/// the current executable.
pub fn run(source: Option<&Path>) -> Result<PathBuf> {
    let build_dir = match source {
        Some(p) => p.to_path_buf(),
        None => env::current_dir()?,
    };
    let build_dir = checkout_dir(&build_dir)?;
    tracing::debug!(dir = %build_dir.display(), "building release binary");
    let status = Command::new("cargo")
        .args(["build", "--release"])
        .current_dir(&build_dir)
        .status()
        .map_err(|e| Error::Update(format!("cargo build failed: {}", e)))?;
    if !status.success() {
        return Err(Error::Update("cargo build failed.".to_string()));
    }
    let built = build_dir.join("target").join("release").join(BIN_NAME);
    if !built.exists() {
        return Err(Error::Update(format!("binary not found after build: {}", built.display())));
    }
    let dest = env::current_exe()?;
    install(&built, &dest)?;
    Ok(dest)
}

/// Checks that `dir` is a directory containing `Cargo.toml`, returning it canonicalized.
fn checkout_dir(dir: &Path) -> Result<PathBuf> {
    if !dir.is_dir() {
        return Err(Error::Update(format!("not a directory: {}", dir.display())));
    }
    if !dir.join("Cargo.toml").is_file() {
        return Err(Error::Update(format!("no Cargo.toml in {}", dir.display())));
    }
    Ok(dir.canonicalize()?)
}

/// Copies `src` next to `dest` and renames it into place, keeping it executable.
fn install(src: &Path, dest: &Path) -> Result<()> {
    let staged = dest.with_extension("new");
    fs::copy(src, &staged).map_err(|e| Error::Update(format!("copy failed: {}", e)))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&staged)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&staged, perms)?;
    }
    fs::rename(&staged, dest).map_err(|e| Error::Update(format!("install failed: {}", e)))?;
    Ok(())
}
