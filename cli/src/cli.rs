use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "DebugView",
    version = debugview_core::version(),
    about = "DebugView - replays host lifecycle scripts against the debug overlay on a simulated platform",
)]
pub struct Args {
    /// Specify custom configuration file path
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Specify custom configuration file path"
    )]
    pub config_path: Option<PathBuf>,

    /// Validate configuration and script, then exit
    #[arg(long = "dry-run", help = "Validate configuration and script, then exit")]
    pub dry_run: bool,

    /// Use default configuration and ignore config files
    #[arg(
        long = "defaults",
        help = "Use default configuration and ignore config files"
    )]
    pub use_defaults: bool,

    #[arg(short = 'q', long, conflicts_with = "verbose", help = "Only log info and above")]
    pub quiet: bool,

    #[arg(short = 'v', long, help = "Log everything, including trace output")]
    pub verbose: bool,

    /// YAML script of lifecycle steps to replay. The built-in demo runs when omitted.
    #[arg(
        short = 's',
        long = "script",
        value_name = "FILE",
        help = "YAML script of lifecycle steps to replay"
    )]
    pub script: Option<PathBuf>,

    #[arg(
        long = "write-default-config",
        help = "Write the default configuration file and exit"
    )]
    pub write_default_config: bool,
}

pub fn parse_args() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "debugview",
            "--config",
            "custom.yaml",
            "--script",
            "flow.yaml",
            "--verbose",
        ])
        .unwrap();

        assert_eq!(args.config_path, Some(PathBuf::from("custom.yaml")));
        assert_eq!(args.script, Some(PathBuf::from("flow.yaml")));
        assert!(args.verbose);
        assert!(!args.dry_run);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Args::try_parse_from(["debugview", "-q", "-v"]).is_err());
    }
}
