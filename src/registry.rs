// ============================================
// registry.rs - Reading uninstall entries
// ============================================
//
// We read the registry through reg.exe, the same way the rest of our
// deployment tooling does. `reg query <key> /s /v DisplayName` prints:
//
//   HKEY_LOCAL_MACHINE\SOFTWARE\...\Uninstall\O365BusinessRetail - en-us
//       DisplayName    REG_SZ    Microsoft 365 Apps for business - en-us
//
//   End of search: 1 match(es) found.
// ============================================

use anyhow::Result;

/// 64-bit and 32-bit uninstall locations
pub const UNINSTALL_KEYS: [&str; 2] = [
    r"HKLM\SOFTWARE\Microsoft\Windows\CurrentVersion\Uninstall",
    r"HKLM\SOFTWARE\WOW6432Node\Microsoft\Windows\CurrentVersion\Uninstall",
];

/// Run `reg query` for `value` under `key` and every subkey. Raw output.
pub fn query_recursive(key: &str, value: &str) -> Result<String> {
    crate::process::run_captured("reg", &["query", key, "/s", "/v", value])
}

/// Pull the data of every `value` line out of `reg query` output.
pub fn parse_values(output: &str, value: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| {
            let rest = line.trim_start().strip_prefix(value)?;
            // "DisplayName" must be followed by whitespace, not "DisplayNameX"
            if !rest.starts_with(char::is_whitespace) {
                return None;
            }
            let rest = rest.trim_start();
            if !rest.starts_with("REG_") {
                return None;
            }
            // Skip the type column (REG_SZ, REG_EXPAND_SZ, ...)
            let data = match rest.split_once(char::is_whitespace) {
                Some((_, data)) => data.trim(),
                None => "",
            };
            Some(data.to_string())
        })
        .collect()
}
