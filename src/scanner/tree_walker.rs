use crate::config::FilterConfig;
use crate::error::{Result, TreecatError};
use crate::scanner::file_filter::FileFilter;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// One regular file selected for the bundle.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Root-joined path as produced by the walk; used verbatim in headers.
    pub path: PathBuf,
    pub relative_path: PathBuf,
    pub filename: String,
    pub size: u64,
}

impl SourceFile {
    pub fn new(path: PathBuf, relative_path: PathBuf, size: u64) -> Self {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string();

        Self {
            path,
            relative_path,
            filename,
            size,
        }
    }

    pub fn display_path(&self) -> String {
        self.path.display().to_string()
    }
}

/// Result of one pass over the tree. Warnings are non-fatal walk problems
/// (unreadable subdirectories and the like), not per-file read failures.
#[derive(Debug, Default)]
pub struct TreeScan {
    pub files: Vec<SourceFile>,
    pub warnings: Vec<String>,
}

pub struct TreeWalker {
    filter: FileFilter,
    /// Canonical path of the output file, skipped if it lives under the root.
    skip_path: Option<PathBuf>,
}

impl TreeWalker {
    pub fn new(config: &FilterConfig) -> Result<Self> {
        Ok(Self {
            filter: FileFilter::new(config)?,
            skip_path: None,
        })
    }

    /// Never bundle the file we are writing into, even when the caller did
    /// not list it in the exclusions.
    pub fn skipping_output<P: AsRef<Path>>(mut self, output: P) -> Self {
        self.skip_path = output.as_ref().canonicalize().ok();
        self
    }

    pub fn scan<P: AsRef<Path>>(&self, root: P) -> Result<TreeScan> {
        let root_path = root.as_ref();

        if !root_path.exists() {
            return Err(TreecatError::InvalidPath {
                path: root_path.display().to_string(),
            });
        }

        if !root_path.is_dir() {
            return Err(TreecatError::InvalidPath {
                path: format!("{} is not a directory", root_path.display()),
            });
        }

        let mut scan = TreeScan::default();

        let walker = WalkDir::new(root_path)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| self.should_traverse(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    scan.warnings.push(format!("Scan error: {}", err));
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            match self.process_file(&entry, root_path) {
                Ok(Some(file)) => scan.files.push(file),
                Ok(None) => {} // excluded
                Err(err) => {
                    scan.warnings
                        .push(format!("Error processing {}: {}", entry.path().display(), err));
                }
            }
        }

        // Deterministic output: identical trees produce identical bundles.
        scan.files.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(scan)
    }

    fn should_traverse(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || entry.file_type().is_file() {
            return true;
        }

        if entry.file_type().is_dir() {
            return self.filter.should_traverse_directory(entry.path());
        }

        true
    }

    fn process_file(&self, entry: &DirEntry, root_path: &Path) -> Result<Option<SourceFile>> {
        let path = entry.path();

        if !self.filter.should_include_file(path) {
            return Ok(None);
        }

        if self.is_output_file(path) {
            return Ok(None);
        }

        let metadata = entry.metadata().map_err(|e| match e.into_io_error() {
            Some(io_err) => TreecatError::Io(io_err),
            None => TreecatError::InvalidPath {
                path: path.display().to_string(),
            },
        })?;

        let relative_path = path
            .strip_prefix(root_path)
            .map_err(|_| TreecatError::InvalidPath {
                path: format!(
                    "Cannot calculate relative path for {} from root {}",
                    path.display(),
                    root_path.display()
                ),
            })?
            .to_path_buf();

        Ok(Some(SourceFile::new(
            path.to_path_buf(),
            relative_path,
            metadata.len(),
        )))
    }

    fn is_output_file(&self, path: &Path) -> bool {
        let Some(ref skip) = self.skip_path else {
            return false;
        };

        // Cheap filename check first; canonicalize only on a candidate match.
        if path.file_name() != skip.file_name() {
            return false;
        }

        path.canonicalize().map(|p| p == *skip).unwrap_or(false)
    }

    pub fn get_statistics(&self, files: &[SourceFile]) -> ScanStatistics {
        let total_files = files.len();
        let total_size = files.iter().map(|f| f.size).sum();

        let (largest_file_size, largest_file_path) = files
            .iter()
            .max_by_key(|f| f.size)
            .map(|f| (f.size, f.relative_path.clone()))
            .unwrap_or((0, PathBuf::new()));

        ScanStatistics {
            total_files,
            total_size,
            largest_file_size,
            largest_file_path,
        }
    }
}

#[derive(Debug, Default)]
pub struct ScanStatistics {
    pub total_files: usize,
    pub total_size: u64,
    pub largest_file_size: u64,
    pub largest_file_path: PathBuf,
}

impl ScanStatistics {
    pub fn display_summary(&self) -> String {
        let mut summary = format!(
            "Scan results:\n  Total files: {}\n  Total size: {} bytes\n",
            self.total_files, self.total_size
        );

        if self.largest_file_size > 0 {
            summary.push_str(&format!(
                "  Largest file: {} ({} bytes)\n",
                self.largest_file_path.display(),
                self.largest_file_size
            ));
        }

        summary
    }
}
