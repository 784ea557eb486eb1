// ============================================
// pipeline.rs - The deployment sequence
// ============================================
//
// Stages run strictly in this order:
//
//   1. Config Resolver   (config.rs)
//   2. Tool Acquirer     (acquire.rs)
//   3. Installer Runner  (runner.rs)
//   4. Verification      (verify.rs)
//   5. Post-steps        (post.rs)
//
// The Privilege Guard (elevation.rs) runs in main() before any of this,
// because a successful relaunch ends the current process.
//
// The first fatal error stops the run; nothing after it executes.
// ============================================

use crate::acquire::{self, Installer};
use crate::config::{self, ConfigSource, ResolvedConfig};
use crate::error::Result;
use crate::host::Host;
use crate::post::{self, PostReport};
use crate::runner;
use crate::settings::Settings;
use crate::verify::{self, Verification};
use std::path::PathBuf;

/// Folder (inside the temp root) holding the extracted ODT and default config
pub const WORK_DIR_NAME: &str = "OfficeInstall";

/// Folder next to the EXE that may hold a bundled config and/or ODT
pub const BUNDLED_DIR_NAME: &str = "files";

pub const CONFIG_FILE_NAME: &str = "configuration.xml";
pub const INSTALLER_FILE_NAME: &str = "ODTSetup.exe";

/// Everything a run needs to know, decided once up front.
#[derive(Debug, Clone)]
pub struct Context {
    /// `--config` value, if any
    pub config_arg: Option<PathBuf>,
    /// `--cleanup`
    pub cleanup: bool,
    /// Folder holding our EXE
    pub app_dir: PathBuf,
    /// Parent of the work folder and the downloaded ODT
    pub temp_root: PathBuf,
    pub settings: Settings,
}

impl Context {
    pub fn new(
        config_arg: Option<PathBuf>,
        cleanup: bool,
        app_dir: PathBuf,
        settings: Settings,
    ) -> Self {
        let temp_root = settings.temp_root();
        Self {
            config_arg,
            cleanup,
            app_dir,
            temp_root,
            settings,
        }
    }

    pub fn bundled_dir(&self) -> PathBuf {
        self.app_dir.join(BUNDLED_DIR_NAME)
    }

    pub fn work_dir(&self) -> PathBuf {
        self.temp_root.join(WORK_DIR_NAME)
    }

    pub fn bundled_config(&self) -> PathBuf {
        self.bundled_dir().join(CONFIG_FILE_NAME)
    }

    /// Where the generated default configuration goes
    pub fn default_config(&self) -> PathBuf {
        self.work_dir().join(CONFIG_FILE_NAME)
    }

    pub fn bundled_installer(&self) -> PathBuf {
        self.bundled_dir().join(INSTALLER_FILE_NAME)
    }

    /// Download target, and where a previous run may have left the ODT.
    /// Kept outside the work folder so cleanup can treat it separately.
    pub fn temp_installer(&self) -> PathBuf {
        self.temp_root.join(INSTALLER_FILE_NAME)
    }
}

/// What happened, for the end-of-run summary.
#[derive(Debug)]
pub struct Summary {
    pub config: ResolvedConfig,
    pub installer: Installer,
    pub verification: Verification,
    pub post: PostReport,
}

/// Run stages 2-6 against `host`.
pub fn run(ctx: &Context, host: &dyn Host) -> Result<Summary> {
    log::info!("[1/5] Resolving configuration...");
    let config = config::resolve(ctx)?;

    log::info!("[2/5] Acquiring Office Deployment Tool...");
    let installer = acquire::acquire(ctx, host)?;

    log::info!("[3/5] Installing Office (this can take a while)...");
    runner::install(ctx, host, &installer, &config.path)?;

    log::info!("[4/5] Verifying installation...");
    let verification = verify::verify(host, &ctx.settings.product_match);

    log::info!("[5/5] Post-install steps...");
    let post = post::run(ctx, host, &installer);

    Ok(Summary {
        config,
        installer,
        verification,
        post,
    })
}

/// Log the end-of-run summary.
pub fn log_summary(summary: &Summary) {
    let source = match summary.config.source {
        ConfigSource::Explicit => "supplied with --config",
        ConfigSource::Bundled => "bundled",
        ConfigSource::Generated => "generated default",
    };
    log::info!("Configuration: {} ({})", summary.config.path.display(), source);

    let origin = if summary.installer.downloaded { "downloaded" } else { "local copy" };
    log::info!("Deployment tool: {} ({})", summary.installer.path.display(), origin);

    match &summary.verification {
        Verification::Found(name) => log::info!("Installed product: {}", name),
        Verification::NotFound => log::info!("Installed product: not confirmed"),
    }

    log::info!(
        "Store app removal: {} provisioned, {} per-user package(s)",
        summary.post.provisioned_removed,
        summary.post.user_packages_removed
    );

    if summary.post.cleaned_up {
        log::info!("Temporary files removed");
    }
}

// ============================================
// TESTS
// ============================================
