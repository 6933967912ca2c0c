use crate::config::FilterConfig;
use crate::error::{Result, TreecatError};
use regex::Regex;
use std::path::Path;

/// Decides which files and directories the walk keeps. File exclusion is an
/// exact match on the base name, never the full path.
#[derive(Debug)]
pub struct FileFilter {
    exclude_files: Vec<String>,
    exclude_dirs: Vec<String>,
    exclude_patterns: Vec<Regex>,
}

impl FileFilter {
    pub fn new(config: &FilterConfig) -> Result<Self> {
        let mut exclude_patterns = Vec::with_capacity(config.exclude_patterns.len());
        for pattern in &config.exclude_patterns {
            let compiled = Regex::new(pattern).map_err(|e| TreecatError::Pattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
            exclude_patterns.push(compiled);
        }

        Ok(Self {
            exclude_files: config.exclude_files.clone(),
            exclude_dirs: config.exclude_dirs.clone(),
            exclude_patterns,
        })
    }

    pub fn should_include_file(&self, path: &Path) -> bool {
        let Some(filename) = path.file_name().and_then(|s| s.to_str()) else {
            return false;
        };

        if self.exclude_files.iter().any(|name| name == filename) {
            return false;
        }

        !self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.is_match(filename))
    }

    pub fn should_traverse_directory(&self, path: &Path) -> bool {
        if let Some(dir_name) = path.file_name().and_then(|s| s.to_str()) {
            if self.exclude_dirs.iter().any(|exclude| exclude == dir_name) {
                return false;
            }
        }

        true
    }
}
