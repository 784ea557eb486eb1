// ============================================
// appx.rs - Removing a store app for all users
// ============================================
//
// A store app lives in two places:
//   1. The provisioned package - installed into every NEW user profile
//   2. Per-user packages       - already installed for existing users
//
// We remove both through PowerShell. Each script prints the name of
// every package it removed, one per line, so we can count them.
// ============================================

/// Quote a string as a PowerShell single-quoted literal ('O''Brien').
pub fn ps_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Script removing the provisioned registration of `display_name`.
pub fn remove_provisioned_script(display_name: &str) -> String {
    format!(
        "$ErrorActionPreference = 'Stop'; \
         Get-AppxProvisionedPackage -Online | \
         Where-Object {{ $_.DisplayName -eq {} }} | \
         ForEach-Object {{ Remove-AppxProvisionedPackage -Online -AllUsers -PackageName $_.PackageName | Out-Null; $_.PackageName }}",
        ps_quote(display_name)
    )
}

/// Script removing every per-user install of `name`.
pub fn remove_user_packages_script(name: &str) -> String {
    format!(
        "$ErrorActionPreference = 'Stop'; \
         Get-AppxPackage -AllUsers -Name {} | \
         ForEach-Object {{ Remove-AppxPackage -Package $_.PackageFullName -AllUsers; $_.PackageFullName }}",
        ps_quote(name)
    )
}

/// Package names printed by one of the scripts above.
pub fn removed_packages(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}
