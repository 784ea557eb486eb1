// ============================================
// verify.rs - Verification
// ============================================
//
// A successful install registers an uninstall entry whose DisplayName
// contains "Microsoft 365". We look in both the 64-bit and the 32-bit
// (WOW6432Node) uninstall keys.
//
// Not finding it is only a warning: other product IDs (e.g. a bundled
// configuration installing Office LTSC) register under other names.
// ============================================

use crate::host::Host;
use crate::registry::{self, UNINSTALL_KEYS};

/// Outcome of the registry check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// DisplayName of the first matching entry
    Found(String),
    NotFound,
}

/// Search the uninstall keys for `product_match`. Never fails.
pub fn verify(host: &dyn Host, product_match: &str) -> Verification {
    for key in UNINSTALL_KEYS {
        let output = match host.reg_query(key, "DisplayName") {
            Ok(output) => output,
            Err(e) => {
                log::warn!("Could not read {}: {:#}", key, e);
                continue;
            }
        };

        if let Some(name) = find_product(&output, product_match) {
            log::info!("Installation verified: {}", name);
            return Verification::Found(name);
        }
    }

    log::warn!(
        "No installed product matching \"{}\" was found. This is expected if the configuration installs a different product.",
        product_match
    );
    Verification::NotFound
}

/// First DisplayName in `reg query` output containing `product_match`.
fn find_product(output: &str, product_match: &str) -> Option<String> {
    registry::parse_values(output, "DisplayName")
        .into_iter()
        .find(|name| name.contains(product_match))
}
