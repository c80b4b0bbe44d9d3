//! kodirepo CLI - build a Kodi add-on repository.

mod cli;
mod error;

use std::process::ExitCode;

use clap::Parser;
use kodirepo::config::{default_config_path, Config, ConfigFile};
use kodirepo::logging::{init_logging, LoggingConfig};
use kodirepo::repo::{BuildReport, RepoBuilder};
use tracing::debug;

use cli::Cli;
use error::CliError;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::new().with_verbosity(cli.verbose);
    if let Some(path) = &cli.log_file {
        logging = logging.with_log_file(path);
    }
    let _guard = match init_logging(&logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(error::EXIT_FAILURE);
        }
    };

    match run(cli) {
        Ok(report) => {
            print_summary(&report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<BuildReport, CliError> {
    let overrides = cli.overrides();
    let config_file = ConfigFile::new(cli.config_file.unwrap_or_else(default_config_path));
    debug!(path = %config_file.path().display(), "Using config file");

    let stored = config_file.load()?;
    let config = Config::validate(stored.merged_with(overrides))?;
    config_file.save(&config)?;

    Ok(RepoBuilder::new(config).run()?)
}

fn print_summary(report: &BuildReport) {
    println!(
        "Repository ready: {} new add-on(s), {} already packaged, {} manifest entries, {} archive(s) written",
        report.fresh, report.packaged, report.manifest_entries, report.archives_written
    );
    if report.missing_assets > 0 {
        println!("  {} declared asset(s) missing", report.missing_assets);
    }
    if report.failures > 0 {
        println!("  {} add-on step(s) failed, see log", report.failures);
    }
}
