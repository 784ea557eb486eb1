// ============================================
// elevation.rs - Privilege Guard
// ============================================
//
// The Office Deployment Tool, the registry checks and the AppX removal
// all need administrator rights. If we were started without them we
// relaunch ourselves through the UAC prompt ("runas" verb) with the
// same arguments, and the non-elevated copy exits.
// ============================================

use crate::error::{DeployError, Result};
use std::path::Path;

/// Options whose value is a path. The elevated copy may not start in our
/// working directory, so relative values are made absolute first.
const PATH_OPTIONS: &[&str] = &["--config", "--configure", "--settings"];

/// True when the current process is NOT running as administrator.
#[cfg(windows)]
pub fn requires_elevation() -> bool {
    // IsUserAnAdmin returns non-zero when the token is elevated
    unsafe { winapi::um::shlobj::IsUserAnAdmin() == 0 }
}

/// Outside Windows there is no UAC to ask, so never relaunch.
#[cfg(not(windows))]
pub fn requires_elevation() -> bool {
    false
}

/// Start an elevated copy of this EXE with `args` (argv without argv[0]).
///
/// Returns Ok once the elevated process has been launched. The caller
/// is expected to exit with code 0 right after.
pub fn relaunch_elevated(args: &[String]) -> Result<()> {
    let exe = std::env::current_exe().map_err(DeployError::ExecutablePath)?;
    let cwd = std::env::current_dir().map_err(DeployError::WorkingDirectory)?;
    let params = build_command_line(&absolutize_path_args(args, &cwd));

    log::info!("Requesting administrator rights...");
    log::debug!("Relaunching {} {}", exe.display(), params);

    // "runas" ignores lpDirectory, so this is only a hint
    shell_execute_runas(&exe, &params, &cwd)
}

/// Rewrite relative values of `--config`, `--configure` and `--settings`
/// (both `--flag value` and `--flag=value`) against `cwd`.
/// Everything else is passed through unchanged.
pub fn absolutize_path_args(args: &[String], cwd: &Path) -> Vec<String> {
    let absolute = |value: &str| -> String {
        let path = Path::new(value);
        if value.is_empty() || path.is_absolute() {
            value.to_string()
        } else {
            cwd.join(path).to_string_lossy().into_owned()
        }
    };

    let mut out = Vec::with_capacity(args.len());
    let mut value_follows = false;

    for arg in args {
        if value_follows {
            out.push(absolute(arg));
            value_follows = false;
            continue;
        }
        if PATH_OPTIONS.contains(&arg.as_str()) {
            value_follows = true;
            out.push(arg.clone());
            continue;
        }
        let inline = arg.split_once('=').filter(|(flag, _)| PATH_OPTIONS.contains(flag));
        match inline {
            Some((flag, value)) => out.push(format!("{}={}", flag, absolute(value))),
            None => out.push(arg.clone()),
        }
    }
    out
}

/// Join arguments into one Windows command line.
pub fn build_command_line(args: &[String]) -> String {
    args.iter()
        .map(|a| quote_arg(a))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Quote one argument so CommandLineToArgvW splits it back unchanged.
///
/// Backslashes are only special right before a quote: those runs are
/// doubled, and an embedded quote becomes \".
pub fn quote_arg(arg: &str) -> String {
    let needs_quotes = arg.is_empty()
        || arg
            .chars()
            .any(|c| matches!(c, ' ' | '\t' | '\n' | '\u{b}' | '"'));
    if !needs_quotes {
        return arg.to_string();
    }

    let mut out = String::with_capacity(arg.len() + 2);
    out.push('"');
    let mut backslashes = 0usize;

    for c in arg.chars() {
        match c {
            '\\' => backslashes += 1,
            '"' => {
                out.push_str(&"\\".repeat(backslashes * 2 + 1));
                out.push('"');
                backslashes = 0;
            }
            _ => {
                out.push_str(&"\\".repeat(backslashes));
                out.push(c);
                backslashes = 0;
            }
        }
    }

    // Trailing backslashes sit in front of our closing quote
    out.push_str(&"\\".repeat(backslashes * 2));
    out.push('"');
    out
}

#[cfg(windows)]
fn shell_execute_runas(exe: &Path, params: &str, cwd: &Path) -> Result<()> {
    use std::ffi::OsStr;
    use std::os::windows::ffi::OsStrExt;
    use winapi::um::shellapi::ShellExecuteW;
    use winapi::um::winuser::SW_SHOWNORMAL;

    // Windows wants NUL-terminated UTF-16 strings
    fn wide(s: &OsStr) -> Vec<u16> {
        s.encode_wide().chain(std::iter::once(0)).collect()
    }

    let verb = wide(OsStr::new("runas"));
    let file = wide(exe.as_os_str());
    let parameters = wide(OsStr::new(params));
    let directory = wide(cwd.as_os_str());

    let result = unsafe {
        ShellExecuteW(
            std::ptr::null_mut(),
            verb.as_ptr(),
            file.as_ptr(),
            parameters.as_ptr(),
            directory.as_ptr(),
            SW_SHOWNORMAL,
        )
    };

    // ShellExecute reports success with a value greater than 32.
    // ERROR_CANCELLED (the user clicked "No") comes back as 5.
    let code = result as isize;
    if code > 32 {
        Ok(())
    } else {
        Err(DeployError::ElevationDenied { code })
    }
}

#[cfg(not(windows))]
fn shell_execute_runas(_exe: &Path, _params: &str, _cwd: &Path) -> Result<()> {
    Err(DeployError::ElevationDenied { code: 0 })
}

// ============================================
// TESTS
// ============================================
