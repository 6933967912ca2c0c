use crate::error::{Result, TreecatError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_OUTPUT_FILE: &str = "all_files.txt";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    pub filters: FilterConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FilterConfig {
    /// Bare filenames to skip, matched exactly against a file's base name.
    pub exclude_files: Vec<String>,
    /// Directory names whose subtrees are never descended into.
    pub exclude_dirs: Vec<String>,
    /// Regular expressions matched against a file's base name.
    pub exclude_patterns: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_OUTPUT_FILE),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(TreecatError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| TreecatError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| TreecatError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["treecat.toml", ".treecat.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref exclude) = cli_args.exclude_files {
            self.filters.exclude_files.extend(exclude.clone());
        }

        if let Some(ref exclude_dirs) = cli_args.exclude_dirs {
            self.filters.exclude_dirs.extend(exclude_dirs.clone());
        }

        if let Some(ref patterns) = cli_args.exclude_patterns {
            self.filters.exclude_patterns.extend(patterns.clone());
        }

        if let Some(ref output) = cli_args.output {
            self.output.path = output.clone();
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| TreecatError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| TreecatError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        for pattern in &self.filters.exclude_patterns {
            if let Err(e) = Regex::new(pattern) {
                return Err(TreecatError::Pattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                });
            }
        }

        for name in &self.filters.exclude_files {
            if name.contains('/') || name.contains('\\') {
                return Err(TreecatError::Config {
                    message: format!(
                        "exclude_files entries must be bare filenames, not paths: {}",
                        name
                    ),
                });
            }
        }

        if self.output.path.as_os_str().is_empty() {
            return Err(TreecatError::Config {
                message: "Output path must not be empty".to_string(),
            });
        }

        if let Some(parent) = self.output.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(TreecatError::Config {
                    message: format!("Parent directory does not exist: {}", parent.display()),
                });
            }
        }

        Ok(())
    }

    pub fn create_sample_config() -> String {
        let mut sample = Self::default();
        sample.filters.exclude_files = vec!["all_files.txt".to_string()];
        sample.filters.exclude_dirs = vec![".git".to_string(), "node_modules".to_string()];
        sample.filters.exclude_patterns = vec![r".*\.lock".to_string()];
        toml::to_string_pretty(&sample).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub exclude_files: Option<Vec<String>>,
    pub exclude_dirs: Option<Vec<String>>,
    pub exclude_patterns: Option<Vec<String>>,
    pub output: Option<PathBuf>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_exclude_files(mut self, exclude: Option<Vec<String>>) -> Self {
        self.exclude_files = exclude;
        self
    }

    pub fn with_exclude_dirs(mut self, exclude_dirs: Option<Vec<String>>) -> Self {
        self.exclude_dirs = exclude_dirs;
        self
    }

    pub fn with_exclude_patterns(mut self, patterns: Option<Vec<String>>) -> Self {
        self.exclude_patterns = patterns;
        self
    }

    pub fn with_output(mut self, output: Option<PathBuf>) -> Self {
        self.output = output;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.filters.exclude_files.is_empty());
        assert!(config.filters.exclude_dirs.is_empty());
        assert_eq!(config.output.path, PathBuf::from(DEFAULT_OUTPUT_FILE));
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.filters.exclude_patterns.push("[unclosed".to_string());
        assert!(matches!(
            config.validate().unwrap_err(),
            TreecatError::Pattern { .. }
        ));
    }

    #[test]
    fn test_exclude_file_must_be_bare_name() {
        let mut config = Config::default();
        config.filters.exclude_files.push("sub/notes.txt".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_output_parent_rejected() {
        let mut config = Config::default();
        config.output.path = PathBuf::from("/definitely/missing/dir/out.txt");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_file_operations() {
        let config = Config::default();
        let temp_file = NamedTempFile::new().unwrap();

        config.save_to_file(temp_file.path()).unwrap();

        let loaded_config = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(config.output.path, loaded_config.output.path);
    }

    #[test]
    fn test_cli_overrides_extend_excludes() {
        let mut config = Config::default();
        config.filters.exclude_files.push("from_config.txt".to_string());

        let overrides = CliOverrides::new()
            .with_exclude_files(Some(vec!["from_cli.txt".to_string()]))
            .with_output(Some(PathBuf::from("bundle.txt")));

        config.merge_with_cli_args(&overrides);

        assert_eq!(
            config.filters.exclude_files,
            vec!["from_config.txt", "from_cli.txt"]
        );
        assert_eq!(config.output.path, PathBuf::from("bundle.txt"));
    }

    #[test]
    fn test_sample_config_generation() {
        let sample = Config::create_sample_config();
        assert!(!sample.is_empty());
        assert!(sample.contains("[filters]"));
        assert!(sample.contains("[output]"));
        assert!(sample.contains("all_files.txt"));
    }
}
