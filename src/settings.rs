// ============================================
// settings.rs - Optional office-deployer.toml
// ============================================
//
// Everything here has a sensible default, so the settings file is
// optional. Drop an office-deployer.toml next to the EXE to override
// any of these values:
//
//   download_page     = "https://www.microsoft.com/en-us/download/details.aspx?id=49117"
//   download_pattern  = "https://download\\.microsoft\\.com/download/.../officedeploymenttool_...\\.exe"
//   product_match     = "Microsoft 365"
//   store_package     = "Microsoft.MicrosoftOfficeHub"
//   temp_root         = "D:\\Staging"
//   http_timeout_secs = 300
// ============================================

use crate::error::{DeployError, Result};
use regex::Regex;
use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::{Path, PathBuf};

/// Filename we look for next to the EXE
pub const SETTINGS_FILE_NAME: &str = "office-deployer.toml";

/// Vendor page that links to the current Office Deployment Tool build
pub const DEFAULT_DOWNLOAD_PAGE: &str =
    "https://www.microsoft.com/en-us/download/details.aspx?id=49117";

/// Matches links like
/// https://download.microsoft.com/download/<guid>/officedeploymenttool_18129-20030.exe
pub const DEFAULT_DOWNLOAD_PATTERN: &str =
    r#"https://download\.microsoft\.com/download/[^"'\s<>]+?/officedeploymenttool_[^"'\s<>]+?\.exe"#;

/// Substring searched for in uninstall DisplayName values
pub const DEFAULT_PRODUCT_MATCH: &str = "Microsoft 365";

/// The "Office Hub" store app that ships with Windows
pub const DEFAULT_STORE_PACKAGE: &str = "Microsoft.MicrosoftOfficeHub";

/// Tunable values for a deployment run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Page scraped for the ODT download link
    pub download_page: String,

    /// Regex for the download link inside that page, compiled on load
    #[serde(deserialize_with = "deserialize_pattern")]
    pub download_pattern: Regex,

    /// Substring that proves Office is installed
    pub product_match: String,

    /// Store package removed in the post-steps
    pub store_package: String,

    /// Where the work folder and downloaded ODT live.
    /// None = the OS temp directory.
    pub temp_root: Option<PathBuf>,

    /// Timeout for each HTTP request
    pub http_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            download_page: DEFAULT_DOWNLOAD_PAGE.to_string(),
            download_pattern: Regex::new(DEFAULT_DOWNLOAD_PATTERN)
                .expect("built-in download pattern is a valid regex"),
            product_match: DEFAULT_PRODUCT_MATCH.to_string(),
            store_package: DEFAULT_STORE_PACKAGE.to_string(),
            temp_root: None,
            http_timeout_secs: 300,
        }
    }
}

impl Settings {
    /// The temp root, falling back to the OS temp directory.
    pub fn temp_root(&self) -> PathBuf {
        self.temp_root.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Load settings.
///
/// * `explicit` - path from `--settings`; must exist
/// * `app_dir` - folder holding the EXE; office-deployer.toml there is optional
pub fn load(explicit: Option<&Path>, app_dir: &Path) -> Result<Settings> {
    let path = match explicit {
        Some(path) => {
            if !path.is_file() {
                return Err(DeployError::Settings {
                    path: path.to_path_buf(),
                    message: "file does not exist".to_string(),
                });
            }
            path.to_path_buf()
        }
        None => {
            let default_path = app_dir.join(SETTINGS_FILE_NAME);
            if !default_path.is_file() {
                log::debug!("No {} found, using built-in defaults", SETTINGS_FILE_NAME);
                return Ok(Settings::default());
            }
            default_path
        }
    };

    log::info!("Loading settings from {}", path.display());
    let text = fs::read_to_string(&path).map_err(|e| DeployError::Settings {
        path: path.clone(),
        message: e.to_string(),
    })?;
    parse(&text, &path)
}

/// Parse and validate settings text. `path` is only used in error messages.
pub fn parse(text: &str, path: &Path) -> Result<Settings> {
    toml::from_str(text).map_err(|e| DeployError::Settings {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// A bad regex fails the settings load, before anything is written.
fn deserialize_pattern<'de, D>(deserializer: D) -> std::result::Result<Regex, D::Error>
where
    D: Deserializer<'de>,
{
    let pattern = String::deserialize(deserializer)?;
    Regex::new(&pattern)
        .map_err(|e| serde::de::Error::custom(format!("invalid download_pattern: {}", e)))
}

// ============================================
// TESTS
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let settings = parse("", Path::new("office-deployer.toml")).unwrap();
        assert_eq!(settings.download_page, DEFAULT_DOWNLOAD_PAGE);
        assert_eq!(settings.product_match, "Microsoft 365");
        assert_eq!(settings.store_package, "Microsoft.MicrosoftOfficeHub");
        assert_eq!(settings.http_timeout_secs, 300);
        assert!(settings.temp_root.is_none());
    }

    #[test]
    fn test_overrides() {
        let text = r#"
product_match = "Office"
temp_root = "/tmp/staging"
http_timeout_secs = 30
"#;
        let settings = parse(text, Path::new("x.toml")).unwrap();
        assert_eq!(settings.product_match, "Office");
        assert_eq!(settings.temp_root(), PathBuf::from("/tmp/staging"));
        assert_eq!(settings.http_timeout_secs, 30);
        // Untouched keys keep their defaults
        assert_eq!(settings.store_package, DEFAULT_STORE_PACKAGE);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = parse("colour = \"blue\"", Path::new("x.toml")).unwrap_err();
        assert!(matches!(err, DeployError::Settings { .. }));
    }

    #[test]
    fn test_bad_regex_rejected() {
        let err = parse("download_pattern = \"(unclosed\"", Path::new("x.toml")).unwrap_err();
        assert!(err.to_string().contains("download_pattern"));
    }

    #[test]
    fn test_bad_regex_names_the_file_it_came_from() {
        let dir = tempfile::tempdir().unwrap();
        let custom = dir.path().join("site.toml");
        fs::write(&custom, "download_pattern = \"[a-\"\n").unwrap();

        match load(Some(&custom), dir.path()).unwrap_err() {
            DeployError::Settings { path, message } => {
                assert_eq!(path, custom);
                assert!(message.contains("invalid download_pattern"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_custom_pattern_is_compiled() {
        let text = "download_pattern = \"https://mirror\\\\.example/odt\\\\.exe\"\n";
        let settings = parse(text, Path::new("x.toml")).unwrap();
        assert!(settings.download_pattern.is_match("get https://mirror.example/odt.exe now"));
        assert!(!settings.download_pattern.is_match("https://mirrorXexample/odt.exe"));
    }

    #[test]
    fn test_default_pattern_matches_vendor_link() {
        let re = Settings::default().download_pattern;
        let page = r#"<a href="https://download.microsoft.com/download/6c1eeb25-cf8b-41d9-8d0d-cc1dbc032140/officedeploymenttool_18129-20030.exe">Download</a>"#;
        let found = re.find(page).unwrap().as_str();
        assert_eq!(
            found,
            "https://download.microsoft.com/download/6c1eeb25-cf8b-41d9-8d0d-cc1dbc032140/officedeploymenttool_18129-20030.exe"
        );
    }

    #[test]
    fn test_load_missing_default_file_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load(None, dir.path()).unwrap();
        assert_eq!(settings.download_page, DEFAULT_DOWNLOAD_PAGE);
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(load(Some(&missing), dir.path()).is_err());
    }

    #[test]
    fn test_load_reads_file_next_to_exe() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE_NAME), "store_package = \"Contoso.Hub\"\n").unwrap();
        let settings = load(None, dir.path()).unwrap();
        assert_eq!(settings.store_package, "Contoso.Hub");
    }
}
