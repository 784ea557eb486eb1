// ============================================
// download.rs - HTTP helpers
// ============================================
//
// Two requests per fresh install:
// 1. GET the vendor download page (text) to find the current ODT link
// 2. GET the ODT executable itself (streamed to disk)
// ============================================

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

/// Build the HTTP client used for both requests.
pub fn build_client(timeout_secs: u64) -> Result<Client> {
    let client = Client::builder()
        .user_agent(concat!("office-deployer/", env!("CARGO_PKG_VERSION")))
        .redirect(reqwest::redirect::Policy::limited(10)) // Follow up to 10 redirects
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .context("Failed to create HTTP client")?;
    Ok(client)
}

/// GET `url` and return the body as text.
pub fn fetch_text(client: &Client, url: &str) -> Result<String> {
    log::debug!("Fetching {}", url);

    let response = client
        .get(url)
        .send()
        .context("Failed to connect to server")?;

    if !response.status().is_success() {
        anyhow::bail!("Server returned status {}", response.status());
    }

    response.text().context("Failed to read response body")
}

/// Stream `url` into `dest`. Returns the number of bytes written.
pub fn download_file(client: &Client, url: &str, dest: &Path) -> Result<u64> {
    let mut response = client
        .get(url)
        .send()
        .context("Failed to connect to download server")?;

    log::debug!("Response status: {}", response.status());
    log::debug!("Final URL: {}", response.url());

    if !response.status().is_success() {
        anyhow::bail!("Download failed with status: {}", response.status());
    }

    let total_size = response.content_length().unwrap_or(0);
    let mut downloaded: u64 = 0;
    let mut last_reported = 0u64;

    let mut file = File::create(dest)
        .with_context(|| format!("Failed to create {}", dest.display()))?;
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = response.read(&mut buffer).context("Connection interrupted")?;
        if bytes_read == 0 {
            break;
        }
        file.write_all(&buffer[..bytes_read])?;
        downloaded += bytes_read as u64;

        if total_size > 0 {
            let percent = (downloaded * 100) / total_size;
            if percent >= last_reported + 10 {
                log::debug!("Downloaded {}%", percent);
                last_reported = percent - percent % 10;
            }
        }
    }

    // Flush and close before anyone tries to execute it
    file.flush()?;
    drop(file);

    Ok(downloaded)
}
