use crate::config::{CliOverrides, Config};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "treecat")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Concatenate a directory tree into a single annotated text file")]
#[command(
    long_about = "Treecat walks a directory recursively and writes every file's content into \
                       one output file, each entry prefixed by a '===== <path> =====' header. \
                       Files that cannot be read as UTF-8 text are recorded with an inline \
                       error marker instead of aborting the run."
)]
#[command(after_help = "EXAMPLES:\n  \
    treecat ./my-project\n  \
    treecat ./my-project --output project.txt\n  \
    treecat . -o all_files.txt --exclude all_files.txt,Cargo.lock\n  \
    treecat src --exclude-dir target --exclude-pattern '.*\\.bin'\n  \
    treecat . --config my-config.toml")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Directory to aggregate
    pub root: PathBuf,

    /// Output file path (created or truncated)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Filenames to skip, matched against the base name only
    #[arg(short, long, value_delimiter = ',')]
    pub exclude: Option<Vec<String>>,

    /// Directory names whose subtrees are skipped entirely
    #[arg(long, value_delimiter = ',')]
    pub exclude_dir: Option<Vec<String>>,

    /// Regular expressions matched against file base names
    #[arg(long)]
    pub exclude_pattern: Option<Vec<String>>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Dry run (list what would be aggregated without writing)
    #[arg(long, help = "Show what would be aggregated without writing the output file")]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_exclude_files(self.exclude.clone())
            .with_exclude_dirs(self.exclude_dir.clone())
            .with_exclude_patterns(self.exclude_pattern.clone())
            .with_output(self.output.clone())
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose > 0 && !self.quiet
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(args)
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_minimal_invocation() {
        let cli = parse(&["treecat", "./src"]);
        assert_eq!(cli.root, PathBuf::from("./src"));
        assert!(cli.output.is_none());
        assert!(cli.exclude.is_none());
        assert!(!cli.quiet);
    }

    #[test]
    fn test_comma_separated_excludes() {
        let cli = parse(&["treecat", ".", "--exclude", "all_files.txt,Cargo.lock"]);
        assert_eq!(
            cli.exclude.unwrap(),
            vec!["all_files.txt".to_string(), "Cargo.lock".to_string()]
        );
    }

    #[test]
    fn test_repeated_exclude_patterns() {
        let cli = parse(&[
            "treecat",
            ".",
            "--exclude-pattern",
            r".*\.bin",
            "--exclude-pattern",
            r".*\.lock",
        ]);
        assert_eq!(cli.exclude_pattern.unwrap().len(), 2);
    }

    #[test]
    fn test_overrides_reach_config() {
        let cli = parse(&["treecat", ".", "-o", "bundle.txt", "-e", "bundle.txt"]);
        let config = cli.load_config().unwrap();
        assert_eq!(config.output.path, PathBuf::from("bundle.txt"));
        assert!(config
            .filters
            .exclude_files
            .contains(&"bundle.txt".to_string()));
    }

    #[test]
    fn test_verbosity_levels() {
        let cli = parse(&["treecat", ".", "-vv"]);
        assert_eq!(cli.verbosity_level(), 2);
        assert!(cli.is_verbose());

        let quiet = parse(&["treecat", ".", "--quiet"]);
        assert_eq!(quiet.verbosity_level(), 0);
        assert!(!quiet.is_verbose());
    }
}
