// ============================================
// error.rs - What can go wrong during a deployment
// ============================================
//
// Every fatal problem in the pipeline is one of these variants.
// main() logs the message and exits with code 1.
//
// Non-fatal problems (verification miss, store app removal failure,
// cleanup errors) never become a DeployError - they are logged as
// warnings where they happen.
// ============================================

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline stages
pub type Result<T> = std::result::Result<T, DeployError>;

/// Fatal errors, grouped by the stage that raises them.
#[derive(Error, Debug)]
pub enum DeployError {
    // --- Privilege Guard ---
    /// Could not find our own EXE to relaunch it
    #[error("could not resolve the path of the running executable: {0}")]
    ExecutablePath(#[source] std::io::Error),

    /// Could not read the working directory to resolve relative paths
    #[error("could not determine the current directory: {0}")]
    WorkingDirectory(#[source] std::io::Error),

    /// The UAC prompt was declined, or ShellExecute failed
    #[error("elevation request was denied or cancelled (ShellExecute returned {code})")]
    ElevationDenied { code: isize },

    // --- Config Resolver ---
    /// `--config` pointed at a file that does not exist
    #[error("configuration file not found: {}", .path.display())]
    ConfigNotFound { path: PathBuf },

    /// The default configuration could not be written
    #[error("could not write default configuration to {}: {source}", .path.display())]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// office-deployer.toml is missing (when given explicitly) or malformed
    #[error("invalid settings file {}: {message}", .path.display())]
    Settings { path: PathBuf, message: String },

    // --- Tool Acquirer ---
    /// TLS backend or client configuration failure, before any request
    #[error("could not create HTTP client: {0:#}")]
    HttpClient(#[source] anyhow::Error),

    /// The vendor page did not contain a deployment tool link
    #[error("no Office Deployment Tool link found at {url}")]
    DownloadLinkNotFound { url: String },

    /// Network or HTTP failure while fetching `url`
    #[error("download from {url} failed: {source:#}")]
    Download {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    /// The downloaded file is not a Windows executable
    #[error("file downloaded from {url} is not a Windows executable")]
    NotAnExecutable { url: String },

    // --- Installer Runner ---
    #[error("extracting the deployment tool failed: {0}")]
    Extraction(String),

    #[error("Office setup failed: {0}")]
    Install(String),
}

impl DeployError {
    /// Name of the stage that failed, for the final error line
    pub fn stage(&self) -> &'static str {
        match self {
            DeployError::ExecutablePath(_)
            | DeployError::WorkingDirectory(_)
            | DeployError::ElevationDenied { .. } => "Privilege check",
            DeployError::ConfigNotFound { .. }
            | DeployError::ConfigWrite { .. }
            | DeployError::Settings { .. } => "Configuration",
            DeployError::HttpClient(_)
            | DeployError::DownloadLinkNotFound { .. }
            | DeployError::Download { .. }
            | DeployError::NotAnExecutable { .. } => "Download",
            DeployError::Extraction(_) => "Extraction",
            DeployError::Install(_) => "Installation",
        }
    }
}
