use clap::Parser;
use std::path::PathBuf;

/// Installs Microsoft 365 with the Office Deployment Tool
#[derive(Parser, Debug)]
#[command(name = "office-deployer")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Unattended Microsoft 365 installer built on the Office Deployment Tool", long_about = None)]
pub struct Args {
    /// ODT configuration XML to install with (default: bundled or built-in)
    #[arg(long = "config", visible_alias = "configure", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Remove temporary files after a successful install
    #[arg(long = "cleanup")]
    pub cleanup: bool,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Settings file (default: office-deployer.toml next to the EXE)
    #[arg(long = "settings", value_name = "PATH")]
    pub settings: Option<PathBuf>,
}

/// Parses command-line arguments
pub fn parse_args() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["office-deployer"]).unwrap();
        assert!(args.config.is_none());
        assert!(!args.cleanup);
        assert!(!args.verbose);
        assert!(args.settings.is_none());
    }

    #[test]
    fn test_config_and_alias() {
        let args = Args::try_parse_from(["office-deployer", "--config", "a.xml"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("a.xml")));

        let args =
            Args::try_parse_from(["office-deployer", "--configure", "b.xml", "--cleanup"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("b.xml")));
        assert!(args.cleanup);
    }

    #[test]
    fn test_config_requires_value() {
        assert!(Args::try_parse_from(["office-deployer", "--config"]).is_err());
    }
}
