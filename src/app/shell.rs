use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::thread::{self, JoinHandle};

/// Program and arguments that open `path` with its default application.
pub(crate) fn open_command(path: &Path) -> (&'static str, Vec<PathBuf>) {
    if cfg!(target_os = "windows") {
        ("explorer", vec![path.to_path_buf()])
    } else if cfg!(target_os = "macos") {
        ("open", vec![path.to_path_buf()])
    } else {
        ("xdg-open", vec![path.to_path_buf()])
    }
}

/// Program and arguments that show `path` in the platform file manager.
pub(crate) fn reveal_command(path: &Path) -> (&'static str, Vec<PathBuf>) {
    if cfg!(target_os = "windows") {
        let mut arg = std::ffi::OsString::from("/select,");
        arg.push(path.as_os_str());
        ("explorer", vec![PathBuf::from(arg)])
    } else if cfg!(target_os = "macos") {
        ("open", vec![PathBuf::from("-R"), path.to_path_buf()])
    } else {
        let folder = if path.is_dir() { path } else { path.parent().unwrap_or(path) };
        ("xdg-open", vec![folder.to_path_buf()])
    }
}

pub(crate) fn open_path(path: &Path) -> Result<()> {
    let (program, args) = open_command(path);
    spawn(program, &args).map(drop)
}

pub(crate) fn reveal_path(path: &Path) -> Result<()> {
    let (program, args) = reveal_command(path);
    spawn(program, &args).map(drop)
}

/// Launches `program` and waits for it on a detached thread.
fn spawn(program: &str, args: &[PathBuf]) -> Result<JoinHandle<Option<ExitStatus>>> {
    let mut child =
        Command::new(program).args(args).spawn().with_context(|| format!("Failed to launch {program}"))?;
    let program = program.to_string();
    thread::Builder::new()
        .name("shell-reaper".to_string())
        .spawn(move || match child.wait() {
            Ok(status) => {
                log::debug!(target: "history", "{program} exited with {status}");
                Some(status)
            }
            Err(err) => {
                log::warn!(target: "history", "failed to wait for {program}: {err}");
                None
            }
        })
        .context("Failed to start reaper thread")
}
