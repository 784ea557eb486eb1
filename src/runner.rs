// ============================================
// runner.rs - Installer Runner
// ============================================
//
// The ODT download is a self-extracting EXE. Running it is two steps:
//
//   ODTSetup.exe /quiet /extract:<work_dir>      -> unpacks setup.exe
//   setup.exe /configure <configuration.xml>     -> installs Office
//
// Both block until they finish. The second one runs without a console
// window; Office shows nothing either (Display Level="None").
// ============================================

use crate::error::{DeployError, Result};
use crate::host::Host;
use crate::pipeline::Context;
use crate::process::Window;
use std::fs;
use std::path::{Path, PathBuf};

use crate::acquire::Installer;

/// Extract the ODT into the work folder and run setup.exe /configure.
pub fn install(ctx: &Context, host: &dyn Host, installer: &Installer, config: &Path) -> Result<()> {
    let setup = extract(host, &installer.path, &ctx.work_dir())?;
    configure(host, &setup, config)
}

/// Unpack the ODT. Returns the path of the extracted setup.exe.
pub fn extract(host: &dyn Host, installer: &Path, work_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(work_dir).map_err(|e| {
        DeployError::Extraction(format!("could not create {}: {}", work_dir.display(), e))
    })?;

    log::info!("Extracting deployment tool to {}", work_dir.display());
    let args = vec![
        "/quiet".to_string(),
        format!("/extract:{}", work_dir.display()),
    ];

    let code = host
        .run(installer, &args, Window::Visible)
        .map_err(|e| DeployError::Extraction(format!("{:#}", e)))?;
    check_exit("ODTSetup.exe", code).map_err(DeployError::Extraction)?;

    let setup = work_dir.join("setup.exe");
    if !setup.is_file() {
        return Err(DeployError::Extraction(format!(
            "setup.exe not found in {}",
            work_dir.display()
        )));
    }
    Ok(setup)
}

/// Run setup.exe against the configuration, hidden, and wait.
pub fn configure(host: &dyn Host, setup: &Path, config: &Path) -> Result<()> {
    log::info!("Running setup.exe /configure {}", config.display());
    let args = vec!["/configure".to_string(), config.display().to_string()];

    let code = host
        .run(setup, &args, Window::Hidden)
        .map_err(|e| DeployError::Install(format!("{:#}", e)))?;
    check_exit("setup.exe", code).map_err(DeployError::Install)?;

    log::info!("Office setup completed");
    Ok(())
}

/// Anything but exit code 0 is a failure.
fn check_exit(program: &str, code: Option<i32>) -> std::result::Result<(), String> {
    match code {
        Some(0) => Ok(()),
        Some(code) => Err(format!("{} exited with code {}", program, code)),
        None => Err(format!("{} was terminated", program)),
    }
}

// ============================================
// TESTS
// ============================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::fake::FakeHost;

    #[test]
    fn test_extract_then_configure() {
        let dir = tempfile::tempdir().unwrap();
        let work = dir.path().join("OfficeInstall");
        let host = FakeHost::default();

        let setup = extract(&host, Path::new("ODTSetup.exe"), &work).unwrap();
        assert_eq!(setup, work.join("setup.exe"));

        configure(&host, &setup, Path::new("configuration.xml")).unwrap();
        assert_eq!(host.calls(), vec!["extract", "configure"]);
    }

    #[test]
    fn test_extract_nonzero_exit_fails() {
        let dir = tempfile::tempdir().unwrap();
        let host = FakeHost {
            extract_exit: Some(1),
            ..FakeHost::default()
        };

        let err = extract(&host, Path::new("ODTSetup.exe"), dir.path()).unwrap_err();

        assert!(matches!(err, DeployError::Extraction(_)));
        assert!(err.to_string().contains("exited with code 1"));
    }

    #[test]
    fn test_extract_without_setup_exe_fails() {
        let dir = tempfile::tempdir().unwrap();
        let host = FakeHost {
            extract_creates_setup: false,
            ..FakeHost::default()
        };

        let err = extract(&host, Path::new("ODTSetup.exe"), dir.path()).unwrap_err();

        assert!(err.to_string().contains("setup.exe not found"));
    }

    #[test]
    fn test_configure_failure_is_install_error() {
        let host = FakeHost {
            configure_exit: None,
            ..FakeHost::default()
        };

        let err = configure(&host, Path::new("setup.exe"), Path::new("c.xml")).unwrap_err();

        assert!(matches!(err, DeployError::Install(_)));
        assert!(err.to_string().contains("terminated"));
    }

    #[test]
    fn test_check_exit() {
        assert!(check_exit("x", Some(0)).is_ok());
        assert_eq!(check_exit("x", Some(17)).unwrap_err(), "x exited with code 17");
    }
}
