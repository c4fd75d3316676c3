//! CLI argument parsing with clap

use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;

/// Expert Onboarding - step-by-step signup wizard for the expert marketplace
///
/// Run without arguments for the interactive terminal wizard. With
/// `--answers` the wizard runs headless: the answers file is fed through
/// every step and submitted to the outbox.
#[derive(Parser, Debug, Default)]
#[command(name = "expert-onboarding")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file (TOML format)
    ///
    /// When specified, settings from the config file are used as defaults.
    /// CLI arguments will override config file settings.
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Directory submissions are written to
    #[arg(short, long)]
    pub outbox: Option<PathBuf>,

    /// JSON object with answers, run headless and submit it
    #[arg(short, long, conflicts_with = "list")]
    pub answers: Option<PathBuf>,

    /// Inline JSON object merged over the answers file
    #[arg(short, long, requires = "answers")]
    pub data: Option<String>,

    /// Seconds before a pending submission is reported as failed (0 = never)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Artificial submission latency in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// List stored submissions, newest first
    #[arg(short, long)]
    pub list: bool,

    /// Print a commented sample configuration and exit
    #[arg(long)]
    pub print_sample_config: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Output log format as JSON
    #[arg(long)]
    pub json_log: bool,
}

impl Cli {
    /// Get config file name (without extension) for log naming
    pub fn config_name(&self) -> Option<String> {
        self.config.as_ref().and_then(|p| {
            p.file_stem()
                .and_then(|s| s.to_str())
                .map(|s| s.to_string())
        })
    }

    /// Merge CLI arguments with config from file
    /// CLI arguments take precedence over config file settings
    pub fn merge_with_config(&self, mut config: Config) -> Config {
        if let Some(ref outbox) = self.outbox {
            config.outbox_dir = outbox.clone();
        }
        if let Some(timeout) = self.timeout {
            config.submit_timeout_secs = Some(timeout);
        }
        if let Some(delay_ms) = self.delay_ms {
            config.submit_delay_ms = delay_ms;
        }
        if self.verbose {
            config.verbose = true;
        }

        config
    }

    /// Convert CLI arguments to Config (when no config file is used)
    pub fn to_config(&self) -> Config {
        self.merge_with_config(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_headless_run() {
        let cli = Cli::try_parse_from([
            "expert-onboarding",
            "-C",
            "partners",
            "--answers",
            "ada.json",
            "-d",
            r#"{"notes":"hi"}"#,
            "--timeout",
            "5",
        ])
        .unwrap();

        assert_eq!(cli.config_name().as_deref(), Some("partners"));
        assert_eq!(cli.answers, Some(PathBuf::from("ada.json")));
        assert_eq!(cli.timeout, Some(5));
        assert!(!cli.list);
    }

    #[test]
    fn test_data_requires_answers() {
        assert!(Cli::try_parse_from(["expert-onboarding", "-d", "{}"]).is_err());
    }

    #[test]
    fn test_list_conflicts_with_answers() {
        assert!(
            Cli::try_parse_from(["expert-onboarding", "--list", "--answers", "a.json"]).is_err()
        );
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli {
            outbox: Some(PathBuf::from("elsewhere")),
            delay_ms: Some(250),
            verbose: true,
            ..Cli::default()
        };

        let mut file_config = Config::default();
        file_config.submit_timeout_secs = Some(9);
        let merged = cli.merge_with_config(file_config);

        assert_eq!(merged.outbox_dir, PathBuf::from("elsewhere"));
        assert_eq!(merged.submit_delay_ms, 250);
        assert_eq!(merged.submit_timeout_secs, Some(9));
        assert!(merged.verbose);
    }

    #[test]
    fn test_to_config_defaults() {
        let config = Cli::default().to_config();
        assert_eq!(config, Config::default());
    }
}
