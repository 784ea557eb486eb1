// ============================================
// host.rs - The machine we are deploying to
// ============================================
//
// Every side effect the pipeline has on the outside world (network,
// child processes, registry, PowerShell) goes through the Host trait.
// WindowsHost is the real thing. Tests use FakeHost, which records
// what was asked of it instead of touching the system.
//
// Plain file operations (exists, write, remove) stay as std::fs calls
// in the stages themselves - tests run them against temp folders.
// ============================================

use crate::process::Window;
use anyhow::Result;
use std::path::Path;

/// OS capabilities used by the pipeline stages.
pub trait Host {
    /// GET a page as text
    fn fetch_text(&self, url: &str) -> Result<String>;

    /// Download `url` to `dest`, returning the size in bytes
    fn download(&self, url: &str, dest: &Path) -> Result<u64>;

    /// Run a program and wait; Ok carries the exit code
    fn run(&self, program: &Path, args: &[String], window: Window) -> Result<Option<i32>>;

    /// `reg query <key> /s /v <value>` output
    fn reg_query(&self, key: &str, value: &str) -> Result<String>;

    /// Run a PowerShell snippet and return its stdout
    fn powershell(&self, script: &str) -> Result<String>;
}

/// The real Windows machine.
pub struct WindowsHost {
    client: reqwest::blocking::Client,
}

impl WindowsHost {
    pub fn new(http_timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: crate::download::build_client(http_timeout_secs)?,
        })
    }
}

impl Host for WindowsHost {
    fn fetch_text(&self, url: &str) -> Result<String> {
        crate::download::fetch_text(&self.client, url)
    }

    fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        crate::download::download_file(&self.client, url, dest)
    }

    fn run(&self, program: &Path, args: &[String], window: Window) -> Result<Option<i32>> {
        crate::process::run_and_wait(program, args, window)
    }

    fn reg_query(&self, key: &str, value: &str) -> Result<String> {
        crate::registry::query_recursive(key, value)
    }

    fn powershell(&self, script: &str) -> Result<String> {
        crate::process::run_powershell(script)
    }
}

// ============================================
// TEST DOUBLE
// ============================================

#[cfg(test)]
pub mod fake {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::fs;

    /// Scriptable Host. Every call is appended to `calls` as a short
    /// string ("fetch <url>", "download <url>", "extract", "configure",
    /// "reg <key>", "powershell").
    pub struct FakeHost {
        pub calls: RefCell<Vec<String>>,
        /// Body returned by fetch_text
        pub page: String,
        /// Bytes written by download
        pub payload: Vec<u8>,
        /// download writes half of `payload`, then fails
        pub download_fails: bool,
        /// Exit code of the /extract run
        pub extract_exit: Option<i32>,
        /// Whether /extract drops a setup.exe into the target folder
        pub extract_creates_setup: bool,
        /// Exit code of setup.exe /configure
        pub configure_exit: Option<i32>,
        /// reg query output per key; missing keys fail
        pub registry: HashMap<String, String>,
        /// PowerShell output; None = the script fails
        pub powershell_output: Option<String>,
    }

    impl Default for FakeHost {
        fn default() -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                page: String::new(),
                payload: b"MZ\x90\x00fake-odt".to_vec(),
                download_fails: false,
                extract_exit: Some(0),
                extract_creates_setup: true,
                configure_exit: Some(0),
                registry: HashMap::new(),
                powershell_output: Some(String::new()),
            }
        }
    }

    impl FakeHost {
        pub fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }

        /// True if anything touched the network
        pub fn used_network(&self) -> bool {
            self.calls
                .borrow()
                .iter()
                .any(|c| c.starts_with("fetch ") || c.starts_with("download "))
        }

        fn record(&self, call: String) {
            self.calls.borrow_mut().push(call);
        }
    }

    impl Host for FakeHost {
        fn fetch_text(&self, url: &str) -> Result<String> {
            self.record(format!("fetch {}", url));
            Ok(self.page.clone())
        }

        fn download(&self, url: &str, dest: &Path) -> Result<u64> {
            self.record(format!("download {}", url));
            if self.download_fails {
                // Connection drops halfway: half the bytes are on disk
                fs::write(dest, &self.payload[..self.payload.len() / 2])?;
                anyhow::bail!("Connection interrupted");
            }
            fs::write(dest, &self.payload)?;
            Ok(self.payload.len() as u64)
        }

        fn run(&self, _program: &Path, args: &[String], _window: Window) -> Result<Option<i32>> {
            if let Some(dir) = args.iter().find_map(|a| a.strip_prefix("/extract:")) {
                self.record("extract".to_string());
                if self.extract_creates_setup {
                    fs::create_dir_all(dir)?;
                    fs::write(Path::new(dir).join("setup.exe"), b"MZ")?;
                }
                return Ok(self.extract_exit);
            }
            if args.first().map(String::as_str) == Some("/configure") {
                self.record("configure".to_string());
                return Ok(self.configure_exit);
            }
            anyhow::bail!("unexpected command: {:?}", args)
        }

        fn reg_query(&self, key: &str, _value: &str) -> Result<String> {
            self.record(format!("reg {}", key));
            match self.registry.get(key) {
                Some(output) => Ok(output.clone()),
                None => anyhow::bail!("ERROR: The system was unable to find the specified registry key or value."),
            }
        }

        fn powershell(&self, _script: &str) -> Result<String> {
            self.record("powershell".to_string());
            match &self.powershell_output {
                Some(output) => Ok(output.clone()),
                None => anyhow::bail!("Access is denied."),
            }
        }
    }
}
