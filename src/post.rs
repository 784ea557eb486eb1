// ============================================
// post.rs - Post-steps
// ============================================
//
// After Office is installed:
//   1. Remove the "Office Hub" store app (Microsoft.MicrosoftOfficeHub)
//      for all users - it only advertises Office and is redundant now.
//   2. With --cleanup, delete the work folder and, if we downloaded it,
//      the ODT executable.
//
// Nothing here can fail the run. Store app problems are warnings and
// cleanup errors are ignored.
// ============================================

use crate::acquire::Installer;
use crate::appx;
use crate::host::Host;
use crate::pipeline::Context;
use std::fs;

/// What the post-steps did
#[derive(Debug, Clone, Default)]
pub struct PostReport {
    pub provisioned_removed: usize,
    pub user_packages_removed: usize,
    pub cleaned_up: bool,
}

/// Run the post-steps.
pub fn run(ctx: &Context, host: &dyn Host, installer: &Installer) -> PostReport {
    let mut report = PostReport::default();

    let package = &ctx.settings.store_package;
    log::info!("Removing store app {} for all users", package);

    report.provisioned_removed = remove_with(host, &appx::remove_provisioned_script(package), "provisioned package");
    report.user_packages_removed = remove_with(host, &appx::remove_user_packages_script(package), "per-user packages");

    if ctx.cleanup {
        cleanup(ctx, installer);
        report.cleaned_up = true;
    }

    report
}

/// Run one removal script; returns how many packages it removed.
fn remove_with(host: &dyn Host, script: &str, what: &str) -> usize {
    match host.powershell(script) {
        Ok(output) => {
            let removed = appx::removed_packages(&output);
            if removed.is_empty() {
                log::info!("No {} to remove", what);
            }
            for name in &removed {
                log::info!("Removed {}: {}", what, name);
            }
            removed.len()
        }
        Err(e) => {
            log::warn!("Could not remove {}: {:#}", what, e);
            0
        }
    }
}

/// Delete temporary files. Errors are ignored.
pub fn cleanup(ctx: &Context, installer: &Installer) {
    let work_dir = ctx.work_dir();
    log::info!("Cleaning up {}", work_dir.display());
    let _ = fs::remove_dir_all(&work_dir);

    // A bundled or previously downloaded ODT belongs to someone else
    if installer.downloaded {
        log::debug!("Removing downloaded {}", installer.path.display());
        let _ = fs::remove_file(&installer.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::fake::FakeHost;
    use crate::settings::Settings;
    use std::path::Path;

    fn context(temp: &Path, cleanup: bool) -> Context {
        let settings = Settings {
            temp_root: Some(temp.to_path_buf()),
            ..Settings::default()
        };
        Context::new(None, cleanup, temp.join("app"), settings)
    }

    #[test]
    fn test_counts_removed_packages() {
        let temp = tempfile::tempdir().unwrap();
        let ctx = context(temp.path(), false);
        let host = FakeHost {
            powershell_output: Some("Microsoft.MicrosoftOfficeHub_18.2306.1061.0_neutral_~_8wekyb3d8bbwe\r\n".to_string()),
            ..FakeHost::default()
        };
        let installer = Installer { path: ctx.temp_installer(), downloaded: true };

        let report = run(&ctx, &host, &installer);

        assert_eq!(report.provisioned_removed, 1);
        assert_eq!(report.user_packages_removed, 1);
        assert!(!report.cleaned_up);
        assert_eq!(host.calls(), vec!["powershell", "powershell"]);
    }

    #[test]
    fn test_cleanup_keeps_local_installer() {
        let temp = tempfile::tempdir().unwrap();
        let ctx = context(temp.path(), true);
        fs::create_dir_all(ctx.work_dir()).unwrap();
        fs::write(ctx.work_dir().join("setup.exe"), b"MZ").unwrap();
        fs::write(ctx.temp_installer(), b"MZ").unwrap();
        let installer = Installer { path: ctx.temp_installer(), downloaded: false };

        cleanup(&ctx, &installer);

        assert!(!ctx.work_dir().exists());
        assert!(ctx.temp_installer().exists());
    }

    #[test]
    fn test_cleanup_tolerates_missing_files() {
        let temp = tempfile::tempdir().unwrap();
        let ctx = context(temp.path(), true);
        let installer = Installer { path: ctx.temp_installer(), downloaded: true };

        // Nothing exists yet - must not panic
        cleanup(&ctx, &installer);
        assert!(!ctx.work_dir().exists());
    }
}
