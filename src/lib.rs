pub mod bundle;
pub mod cli;
pub mod config;
pub mod error;
pub mod scanner;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, FilterConfig, OutputConfig};
pub use error::{Result, TreecatError, UserFriendlyError};

// Core functionality re-exports
pub use bundle::{BundleProgress, BundleReport, BundleWriter};
pub use scanner::{FileFilter, ScanStatistics, SourceFile, TreeScan, TreeWalker};
pub use ui::{GracefulShutdown, OutputFormatter, OutputMode, ProgressManager};

use std::collections::HashSet;
use std::path::Path;

/// Main library interface. Wires the scanner and the bundle writer together
/// with progress display and Ctrl-C handling.
pub struct Treecat {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
}

impl Treecat {
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);
        let shutdown = GracefulShutdown::new()?;

        Ok(Self {
            config,
            output_formatter,
            progress_manager,
            shutdown,
        })
    }

    /// Instance without signal handler registration or progress bars, for
    /// embedding in other programs (and for tests, where a process-global
    /// Ctrl-C handler would conflict across threads).
    pub fn headless(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(false);
        let shutdown = GracefulShutdown::new_for_test();

        Self {
            config,
            output_formatter,
            progress_manager,
            shutdown,
        }
    }

    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Self::new(config, output_mode, cli_args.verbose, cli_args.quiet)
    }

    /// Aggregate the tree under `root` into the configured output file.
    ///
    /// The output is opened (and truncated) before the root is validated, so
    /// the output file exists even when the walk never starts. Individual
    /// unreadable files degrade to inline markers; only opening the output or
    /// an invalid root aborts the run.
    pub fn bundle<P: AsRef<Path>>(&self, root: P) -> Result<BundleReport> {
        let root = root.as_ref();
        let output = self.config.output.path.clone();

        self.shutdown.check_shutdown()?;
        self.output_formatter.start_operation("Starting aggregation");

        let mut writer = BundleWriter::create(&output)?;

        let scan = self.scan_tree(root, &output)?;
        self.shutdown.check_shutdown()?;

        for warning in &scan.warnings {
            self.output_formatter.warning(warning);
        }

        let progress = self.write_bundle(&mut writer, &scan.files)?;

        self.output_formatter.success(&format!(
            "Finished writing contents to {}",
            output.display()
        ));
        self.output_formatter.print_bundle_summary(&progress);

        Ok(BundleReport::new(root, &output, &scan, &progress, &self.config))
    }

    /// Scan without writing anything; used by dry-run mode.
    pub fn scan_only<P: AsRef<Path>>(&self, root: P) -> Result<TreeScan> {
        self.scan_tree(root.as_ref(), &self.config.output.path)
    }

    fn scan_tree(&self, root: &Path, output: &Path) -> Result<TreeScan> {
        self.output_formatter.start_operation("Scanning directory tree");

        let walker = TreeWalker::new(&self.config.filters)?.skipping_output(output);
        let spinner = self.progress_manager.create_spinner("Scanning directory tree");
        let result = walker.scan(root);
        spinner.finish_and_clear();
        let scan = result?;

        let stats = walker.get_statistics(&scan.files);
        self.output_formatter.debug(&stats.display_summary());

        Ok(scan)
    }

    fn write_bundle(
        &self,
        writer: &mut BundleWriter,
        files: &[SourceFile],
    ) -> Result<BundleProgress> {
        self.output_formatter.start_operation("Writing records");

        let file_progress = self.progress_manager.create_file_progress(files.len() as u64);
        let progress_callback = {
            let pb = file_progress.clone();
            move |progress: &BundleProgress| {
                ui::progress::update_bundle_progress(&pb, progress);
            }
        };

        let cancel_check = || self.shutdown.check_shutdown();
        let progress = writer.write_records(files, Some(&progress_callback), Some(&cancel_check))?;

        ui::progress::finish_progress_with_summary(
            &file_progress,
            &format!("Wrote {} records", progress.records_written),
            progress.elapsed(),
        );

        Ok(progress)
    }

    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config).map_err(TreecatError::Io)?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn is_running(&self) -> bool {
        self.shutdown.is_running()
    }

    pub fn request_shutdown(&self) {
        self.shutdown.request_shutdown();
    }

    pub fn handle_error(&self, error: &TreecatError) {
        self.progress_manager.clear();
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Bare aggregation contract for library callers: walk `root`, skip files
/// whose base name is in `exclude`, write everything else into `output`, and
/// print a confirmation. The exclusion set is owned by this call; there is no
/// shared default.
pub fn aggregate<P: AsRef<Path>, Q: AsRef<Path>>(
    root: P,
    output: Q,
    exclude: HashSet<String>,
) -> Result<BundleReport> {
    let mut config = Config::default();
    config.filters.exclude_files = exclude.into_iter().collect();
    config.output.path = output.as_ref().to_path_buf();

    let treecat = Treecat::headless(config, OutputMode::Plain, 0, true);
    treecat.bundle(root)
}

/// Get version information
pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
