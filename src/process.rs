// ============================================
// process.rs - Running external programs
// ============================================
//
// Two flavours:
//   run_and_wait()  - the ODT and setup.exe; we only care about the exit code
//   run_captured()  - reg.exe and PowerShell; we need their stdout
//
// Both block until the child exits. Nothing here runs in the background.
// ============================================

use anyhow::{Context, Result};
use std::ffi::OsStr;
use std::path::Path;
use std::process::Command;

#[cfg(windows)]
use std::os::windows::process::CommandExt;

/// CREATE_NO_WINDOW - start a console program without flashing a window
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Whether the child may show a console window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Visible,
    Hidden,
}

fn command<S: AsRef<OsStr>>(program: S, window: Window) -> Command {
    #[allow(unused_mut)]
    let mut cmd = Command::new(program);
    #[cfg(windows)]
    if window == Window::Hidden {
        cmd.creation_flags(CREATE_NO_WINDOW);
    }
    #[cfg(not(windows))]
    let _ = window;
    cmd
}

/// Run `program` and wait for it to finish.
///
/// Returns the exit code (None if the process was killed by a signal).
/// An Err means the program could not be started at all.
pub fn run_and_wait(program: &Path, args: &[String], window: Window) -> Result<Option<i32>> {
    log::debug!("Running {} {}", program.display(), args.join(" "));

    let status = command(program, window)
        .args(args)
        .status()
        .with_context(|| format!("Failed to launch {}", program.display()))?;

    log::debug!("{} exited with {:?}", program.display(), status.code());
    Ok(status.code())
}

/// Run `program` hidden, wait, and return its stdout.
/// A non-zero exit is an error carrying stderr (or stdout if stderr is empty).
pub fn run_captured(program: &str, args: &[&str]) -> Result<String> {
    let output = command(program, Window::Hidden)
        .args(args)
        .output()
        .with_context(|| format!("Failed to run {}", program))?;

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = if stderr.trim().is_empty() { stdout.trim() } else { stderr.trim() };
        anyhow::bail!(
            "{} failed (exit code {}): {}",
            program,
            output.status.code().unwrap_or(-1),
            detail
        );
    }

    Ok(stdout)
}

/// Run a PowerShell snippet and return its output.
pub fn run_powershell(script: &str) -> Result<String> {
    run_captured(
        "powershell",
        &[
            "-NoProfile",
            "-NonInteractive",
            "-ExecutionPolicy",
            "Bypass",
            "-Command",
            script,
        ],
    )
}
