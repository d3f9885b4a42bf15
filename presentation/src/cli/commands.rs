//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for analysis results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Detections, pricing, sentiment and alternatives
    Full,
    /// The session as JSON
    Json,
}

impl From<OutputFormat> for shoplens_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => shoplens_domain::OutputFormat::Full,
            OutputFormat::Json => shoplens_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for shoplens
#[derive(Parser, Debug)]
#[command(name = "shoplens")]
#[command(author, version, about = "Photo-based product analysis in the terminal")]
#[command(long_about = r#"
shoplens sends a photo to the analysis service, lists the objects it found,
and runs a deep analysis (price, community sentiment, alternatives) for the
objects you select.

The flow has two stages:
1. Detection: the service localizes the objects in the picture
2. Analysis: a selected object is identified, then analyzed in depth

Configuration files are loaded from (in priority order):
1. SHOPLENS_<SECTION>__<KEY>   Environment overrides
2. --config <path>             Explicit config file
3. ./shoplens.toml             Project-level config
4. ~/.config/shoplens/config.toml   Global config

Example:
  shoplens desk.jpg
  shoplens desk.jpg --select 0 --select 2
  shoplens desk.jpg --ask "Is the lamp worth the price?"
  shoplens desk.jpg --chat
"#)]
pub struct Cli {
    /// Image to analyze (not required with --show-config)
    pub image: Option<PathBuf>,

    /// Analyze the detected object at this index (can be repeated)
    #[arg(short, long, value_name = "N")]
    pub select: Vec<usize>,

    /// Ask a question about the image (can be repeated; asked in order)
    #[arg(short, long, value_name = "TEXT")]
    pub ask: Vec<String>,

    /// Start interactive chat after detection
    #[arg(short, long)]
    pub chat: bool,

    /// Output format (overrides [output].format)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Also write diagnostic logs to this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_repeated_select_and_ask() {
        let cli = Cli::try_parse_from([
            "shoplens", "desk.jpg", "-s", "0", "--select", "2", "--ask", "price?", "-a", "reviews?",
        ])
        .unwrap();
        assert_eq!(cli.image, Some(PathBuf::from("desk.jpg")));
        assert_eq!(cli.select, vec![0, 2]);
        assert_eq!(cli.ask, vec!["price?", "reviews?"]);
        assert!(!cli.chat);
        assert_eq!(cli.output, None);
    }

    #[test]
    fn test_output_and_verbosity() {
        let cli = Cli::try_parse_from(["shoplens", "a.png", "-o", "json", "-vv", "-q"]).unwrap();
        assert_eq!(cli.output, Some(OutputFormat::Json));
        assert_eq!(cli.verbose, 2);
        assert!(cli.quiet);
        assert_eq!(
            shoplens_domain::OutputFormat::from(OutputFormat::Json),
            shoplens_domain::OutputFormat::Json
        );
    }

    #[test]
    fn test_show_config_needs_no_image() {
        let cli = Cli::try_parse_from(["shoplens", "--show-config"]).unwrap();
        assert!(cli.show_config);
        assert!(cli.image.is_none());
    }

    #[test]
    fn test_rejects_negative_index() {
        assert!(Cli::try_parse_from(["shoplens", "a.png", "--select", "-1"]).is_err());
    }
}
