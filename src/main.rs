use clap::Parser;
use std::process;
use treecat::{Cli, OutputFormatter, OutputMode, Treecat, TreecatError, UserFriendlyError};

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let cli = Cli::parse();

    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let treecat = match Treecat::from_cli(&cli) {
        Ok(treecat) => treecat,
        Err(e) => {
            print_startup_error(&e);
            return exit_code_for(&e);
        }
    };

    if cli.dry_run {
        return handle_dry_run(&cli, &treecat);
    }

    match treecat.bundle(&cli.root) {
        Ok(report) => {
            treecat.output_formatter().print_bundle_report(&report);

            if report.is_clean() {
                0
            } else {
                2 // Completed, but some files were recorded with error markers
            }
        }
        Err(e) => {
            treecat.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn exit_code_for(error: &TreecatError) -> i32 {
    match error {
        TreecatError::Cancelled => 130, // Interrupted (SIGINT)
        TreecatError::InvalidPath { .. } => 3,
        TreecatError::OutputUnwritable { .. } => 4,
        TreecatError::Config { .. } | TreecatError::Pattern { .. } => 5,
        _ => 1, // General error
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "treecat.toml".to_string());

    match Treecat::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  treecat <root> --config {}", config_path);
            println!("\nEdit the file to customize exclusions for your needs.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(cli: &Cli, treecat: &Treecat) -> i32 {
    let formatter = treecat.output_formatter();

    formatter.info("DRY RUN MODE - No output file will be written");
    formatter.print_separator();

    let config = treecat.config();
    println!("  Root: {}", cli.root.display());
    println!("  Output: {}", config.output.path.display());
    if !config.filters.exclude_files.is_empty() {
        println!("  Exclude files: {}", config.filters.exclude_files.join(", "));
    }
    if !config.filters.exclude_dirs.is_empty() {
        println!("  Exclude dirs: {}", config.filters.exclude_dirs.join(", "));
    }
    if !config.filters.exclude_patterns.is_empty() {
        println!(
            "  Exclude patterns: {}",
            config.filters.exclude_patterns.join(", ")
        );
    }
    formatter.print_separator();

    let scan = match treecat.scan_only(&cli.root) {
        Ok(scan) => scan,
        Err(e) => {
            treecat.handle_error(&e);
            return exit_code_for(&e);
        }
    };

    for file in &scan.files {
        println!("{}", file.display_path());
    }
    for warning in &scan.warnings {
        formatter.warning(warning);
    }

    formatter.print_separator();
    formatter.success(&format!("Would aggregate {} files", scan.files.len()));
    formatter.info("Run without --dry-run to write the output file");

    0
}

fn print_startup_error(error: &TreecatError) {
    // Basic formatter; the configured one never came up
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}
