// ============================================
// config.rs - Config Resolver
// ============================================
//
// Decides which ODT configuration XML to install with:
//
//   1. --config <path>          the caller's file, used exactly as given
//   2. files\configuration.xml  bundled next to the EXE
//   3. built-in default         written to %TEMP%\OfficeInstall\configuration.xml
//
// WARNING: the built-in default contains <Remove All="TRUE"/>, which
// makes the ODT uninstall EVERY existing Office product before installing.
// Ship a bundled configuration.xml (or pass --config) to avoid that.
// ============================================

use crate::error::{DeployError, Result};
use crate::pipeline::Context;
use std::fs;
use std::path::{Path, PathBuf};

/// Where the resolved configuration came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    Explicit,
    Bundled,
    Generated,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub path: PathBuf,
    pub source: ConfigSource,
}

/// Product installed by the built-in configuration
pub const DEFAULT_PRODUCT_ID: &str = "O365BusinessRetail";

/// Built-in ODT configuration.
///
/// Microsoft 365 Apps for business, 64-bit, Current Channel, OS language,
/// without OneDrive for Business (Groove) and Skype for Business (Lync).
/// The AppSettings block makes Excel, PowerPoint and Word save in the
/// Office Open XML formats by default.
pub const DEFAULT_CONFIGURATION: &str = r#"<Configuration>
  <Remove All="TRUE" />
  <Add OfficeClientEdition="64" Channel="Current">
    <Product ID="O365BusinessRetail">
      <Language ID="MatchOS" />
      <ExcludeApp ID="Groove" />
      <ExcludeApp ID="Lync" />
    </Product>
  </Add>
  <Property Name="SharedComputerLicensing" Value="0" />
  <Property Name="FORCEAPPSHUTDOWN" Value="TRUE" />
  <Property Name="DeviceBasedLicensing" Value="0" />
  <Property Name="SCLCacheOverride" Value="0" />
  <Updates Enabled="TRUE" />
  <RemoveMSI />
  <AppSettings>
    <User Key="software\microsoft\office\16.0\excel\options" Name="defaultformat" Value="51" Type="REG_DWORD" App="excel16" Id="L_SaveExcelfilesas" />
    <User Key="software\microsoft\office\16.0\powerpoint\options" Name="defaultformat" Value="27" Type="REG_DWORD" App="ppt16" Id="L_SavePowerPointfileas" />
    <User Key="software\microsoft\office\16.0\word\options" Name="defaultformat" Value="" Type="REG_SZ" App="word16" Id="L_SaveWordfilesas" />
  </AppSettings>
  <Display Level="None" AcceptEULA="TRUE" />
</Configuration>
"#;

/// Pick the configuration file for this run.
pub fn resolve(ctx: &Context) -> Result<ResolvedConfig> {
    // 1. Explicit path - must exist, never rewritten
    if let Some(path) = &ctx.config_arg {
        if !path.is_file() {
            return Err(DeployError::ConfigNotFound { path: path.clone() });
        }
        log::info!("Using configuration: {}", path.display());
        return Ok(ResolvedConfig {
            path: path.clone(),
            source: ConfigSource::Explicit,
        });
    }

    // 2. Bundled next to the EXE
    let bundled = ctx.bundled_config();
    if bundled.is_file() {
        log::info!("Using bundled configuration: {}", bundled.display());
        return Ok(ResolvedConfig {
            path: bundled,
            source: ConfigSource::Bundled,
        });
    }

    // 3. Built-in default
    let path = ctx.default_config();
    write_default(&path)?;
    log::info!("Generated default configuration ({}): {}", DEFAULT_PRODUCT_ID, path.display());
    log::warn!(
        "The default configuration removes ALL existing Office installations (Remove All=\"TRUE\")"
    );

    Ok(ResolvedConfig {
        path,
        source: ConfigSource::Generated,
    })
}

/// Write DEFAULT_CONFIGURATION to `path`, creating parent folders.
pub fn write_default(path: &Path) -> Result<()> {
    let to_error = |source| DeployError::ConfigWrite {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(to_error)?;
    }
    fs::write(path, DEFAULT_CONFIGURATION).map_err(to_error)
}

// ============================================
// TESTS
// ============================================
