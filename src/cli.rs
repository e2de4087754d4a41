//! Command-line interface definitions for Article Ethics.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Backend options can also come from environment variables.

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for the Article Ethics client.
///
/// # Examples
///
/// ```sh
/// # Evaluate one article against a local backend
/// article_ethics evaluate https://n.news.naver.com/mnews/article/001/0014612345
///
/// # Prompt for URLs, talking to a remote backend
/// API_BASE=https://ethics.example.org article_ethics
///
/// # Machine-readable output
/// article_ethics --format json evaluate https://www.yna.co.kr/view/AKR20251115000100001
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Base URL of the scraping/evaluation backend
    #[arg(long, env = "API_BASE", global = true)]
    pub api_base: Option<String>,

    /// Optional path to a YAML config file (api_base, timeout_secs)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "API_TIMEOUT_SECS", global = true)]
    pub timeout_secs: Option<u64>,

    /// Output format for results
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Markdown, global = true)]
    pub format: OutputFormat,

    /// Disable ANSI colors in score bars
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Scrape and evaluate a single article, then exit
    Evaluate {
        /// Article URL
        url: String,
    },
    /// Read article URLs from stdin, one per line (default)
    Interactive,
    /// Check that the backend is reachable
    Health,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Markdown,
    Json,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Interactive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_to_interactive() {
        let cli = Cli::parse_from(["article_ethics"]);
        assert_eq!(cli.command(), Command::Interactive);
        assert_eq!(cli.format, OutputFormat::Markdown);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_evaluate() {
        let cli = Cli::parse_from([
            "article_ethics",
            "--api-base",
            "http://10.0.0.5:8000",
            "evaluate",
            "https://n.news.naver.com/mnews/article/001/0014612345",
        ]);

        assert_eq!(cli.api_base.as_deref(), Some("http://10.0.0.5:8000"));
        assert_eq!(
            cli.command(),
            Command::Evaluate {
                url: "https://n.news.naver.com/mnews/article/001/0014612345".to_string()
            }
        );
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "article_ethics",
            "health",
            "-f",
            "json",
            "-c",
            "/etc/article_ethics.yaml",
            "--timeout-secs",
            "30",
        ]);

        assert_eq!(cli.command(), Command::Health);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.config.as_deref(), Some("/etc/article_ethics.yaml"));
        assert_eq!(cli.timeout_secs, Some(30));
    }
}
