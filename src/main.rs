// ============================================
// office-deployer - main.rs
// ============================================
// This is the entry point of the application.
//
// The program flow is:
// 1. Parse the command line and start logging
// 2. Privilege Guard: relaunch elevated if we are not administrator
// 3. Load settings (office-deployer.toml, optional)
// 4. Run the deployment pipeline (see pipeline.rs)
// 5. Exit 0 on success, 1 on any fatal error
// ============================================

use std::path::{Path, PathBuf};
use std::process::ExitCode;

// Our modules
mod acquire;    // Tool Acquirer - find or download ODTSetup.exe
mod appx;       // Store app removal scripts
mod cli;        // Command-line flags
mod config;     // Config Resolver + built-in configuration XML
mod download;   // HTTP helpers
mod elevation;  // Privilege Guard
mod error;      // DeployError
mod host;       // OS side effects behind one trait
mod pipeline;   // Stage sequencing + run context
mod post;       // Store app removal and cleanup
mod process;    // Running external programs
mod registry;   // reg.exe queries
mod runner;     // Installer Runner - extract + configure
mod settings;   // office-deployer.toml
mod verify;     // Registry verification

use error::DeployError;

// ============================================
// MAIN FUNCTION
// ============================================

fn main() -> ExitCode {
    let args = cli::parse_args();
    init_logging(args.verbose);

    // Print startup message to console (helpful for debugging)
    println!("============================================");
    println!("office-deployer v{}", env!("CARGO_PKG_VERSION"));
    println!("============================================");

    // Step 1: administrator rights
    if elevation::requires_elevation() {
        let original_args: Vec<String> = std::env::args_os()
            .skip(1)
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        return match elevation::relaunch_elevated(&original_args) {
            Ok(()) => {
                log::info!("Installation continues in the elevated window");
                ExitCode::SUCCESS
            }
            Err(e) => fail(&e),
        };
    }

    // Step 2: settings and run context
    let app_dir = app_directory();
    log::debug!("App directory: {}", app_dir.display());

    let settings = match settings::load(args.settings.as_deref(), &app_dir) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    let ctx = pipeline::Context::new(args.config, args.cleanup, app_dir, settings);
    log::debug!("Work directory: {}", ctx.work_dir().display());

    let host = match host::WindowsHost::new(ctx.settings.http_timeout_secs) {
        Ok(h) => h,
        Err(e) => return fail(&DeployError::HttpClient(e)),
    };

    // Step 3: the pipeline
    match pipeline::run(&ctx, &host) {
        Ok(summary) => {
            pipeline::log_summary(&summary);
            log::info!("Microsoft 365 deployment finished");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

// ============================================
// HELPER FUNCTIONS
// ============================================

/// Log a fatal error and pick the exit code (always 1).
fn fail(err: &DeployError) -> ExitCode {
    log::error!("{} failed: {}", err.stage(), err);
    ExitCode::from(1)
}

/// Default to info, --verbose for debug; RUST_LOG wins over both.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_target(false)
        .init();
}

/// Get the directory where office-deployer.exe is located.
///
/// The bundled files\ folder and office-deployer.toml live next to the
/// EXE, even when the current working directory is somewhere else
/// (a shortcut, an RMM agent, the elevated relaunch).
fn app_directory() -> PathBuf {
    if let Ok(exe_path) = std::env::current_exe() {
        // Canonicalize to resolve any symlinks/junctions, then get parent
        let resolved = exe_path.canonicalize().unwrap_or(exe_path);
        if let Some(parent) = resolved.parent() {
            return strip_verbatim_prefix(parent);
        }
    }
    // Last resort: use current directory (shouldn't normally happen)
    log::warn!("Could not determine EXE directory, using current directory");
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// canonicalize() on Windows returns \\?\C:\... paths, which setup.exe
/// and reg.exe do not accept. Strip the prefix.
fn strip_verbatim_prefix(path: &Path) -> PathBuf {
    let text = path.to_string_lossy();
    match text.strip_prefix(r"\\?\") {
        Some(rest) => PathBuf::from(rest),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_verbatim_prefix() {
        assert_eq!(
            strip_verbatim_prefix(Path::new(r"\\?\C:\Tools\Office")),
            PathBuf::from(r"C:\Tools\Office")
        );
        assert_eq!(
            strip_verbatim_prefix(Path::new("/opt/office-deployer")),
            PathBuf::from("/opt/office-deployer")
        );
    }
}
