// ============================================
// acquire.rs - Tool Acquirer
// ============================================
//
// Finds the Office Deployment Tool (ODTSetup.exe):
//
//   1. files\ODTSetup.exe next to our EXE   (bundled, offline installs)
//   2. %TEMP%\ODTSetup.exe                  (left behind by an earlier run)
//   3. download it                          (scrape the vendor page for the link)
//
// Only case 3 touches the network, and only case 3 marks the file as
// "downloaded" - cleanup deletes downloaded copies and nothing else.
// ============================================

use crate::error::{DeployError, Result};
use crate::host::Host;
use crate::pipeline::Context;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

/// The ODT executable used for this run.
#[derive(Debug, Clone)]
pub struct Installer {
    pub path: PathBuf,
    /// True if we fetched it during this run
    pub downloaded: bool,
}

/// Locate or download the deployment tool.
pub fn acquire(ctx: &Context, host: &dyn Host) -> Result<Installer> {
    let bundled = ctx.bundled_installer();
    if bundled.is_file() {
        log::info!("Using bundled deployment tool: {}", bundled.display());
        return Ok(Installer {
            path: bundled,
            downloaded: false,
        });
    }

    // A leftover from an interrupted or broken download is not reusable
    let previous = ctx.temp_installer();
    if previous.is_file() {
        if is_windows_executable(&previous) {
            log::info!("Using deployment tool from a previous run: {}", previous.display());
            return Ok(Installer {
                path: previous,
                downloaded: false,
            });
        }
        log::warn!(
            "{} is not a valid executable, downloading a fresh copy",
            previous.display()
        );
        let _ = fs::remove_file(&previous);
    }

    let url = find_download_url(ctx, host)?;
    let dest = ctx.temp_installer();
    let partial = partial_path(&dest);

    log::info!("Downloading {}", url);
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| DeployError::Download {
            url: url.clone(),
            source: e.into(),
        })?;
    }

    // Stream into ODTSetup.exe.part; only a complete, valid file gets the real name
    let size = match host.download(&url, &partial) {
        Ok(size) => size,
        Err(source) => {
            let _ = fs::remove_file(&partial);
            return Err(DeployError::Download { url, source });
        }
    };

    if !is_windows_executable(&partial) {
        let _ = fs::remove_file(&partial);
        return Err(DeployError::NotAnExecutable { url });
    }

    if let Err(e) = fs::rename(&partial, &dest) {
        let _ = fs::remove_file(&partial);
        return Err(DeployError::Download {
            url,
            source: anyhow::Error::new(e).context(format!("Failed to move download to {}", dest.display())),
        });
    }

    log::info!("Downloaded {} ({} bytes)", dest.display(), size);
    Ok(Installer {
        path: dest,
        downloaded: true,
    })
}

/// ODTSetup.exe -> ODTSetup.exe.part
fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_os_string();
    name.push(".part");
    PathBuf::from(name)
}

/// Fetch the vendor page and pull out the first ODT link.
fn find_download_url(ctx: &Context, host: &dyn Host) -> Result<String> {
    let page_url = &ctx.settings.download_page;
    log::debug!("Looking for the download link on {}", page_url);

    let page = host.fetch_text(page_url).map_err(|source| DeployError::Download {
        url: page_url.clone(),
        source,
    })?;

    extract_link(&page, &ctx.settings.download_pattern).ok_or_else(|| {
        DeployError::DownloadLinkNotFound {
            url: page_url.clone(),
        }
    })
}

/// First match of `pattern` in `page`.
pub fn extract_link(page: &str, pattern: &regex::Regex) -> Option<String> {
    pattern.find(page).map(|m| m.as_str().to_string())
}

/// A Windows PE file starts with "MZ". Anything else (an HTML error
/// page, a truncated file) must not be executed.
fn is_windows_executable(path: &Path) -> bool {
    let mut header = [0u8; 2];
    File::open(path)
        .and_then(|mut f| f.read_exact(&mut header))
        .map(|_| &header == b"MZ")
        .unwrap_or(false)
}

// ============================================
// TESTS
// ============================================
