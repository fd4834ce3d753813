//! Command execution: argument parsing through to the process exit status.
//!
//! Exit status is 0 when every validated document is valid, 1 when any is
//! invalid, 1 on a usage error, and 0 for `--help` / `--version`.

use crate::cli::{Cli, Target};
use crate::config::{self, Effective, Overrides};
use crate::output;
use crate::utils::{error_prefix, info_prefix, note_prefix};
use crate::validate::{validate_batch, validate_file, BatchOptions};
use clap::Parser;
use std::ffi::OsString;
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub const EXIT_OK: u8 = 0;
pub const EXIT_FAILED: u8 = 1;

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_env("WFCHECK_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn effective_config(ov: Overrides<'_>) -> Effective {
    match config::resolve_effective(ov) {
        Ok(eff) => eff,
        Err(e) => {
            eprintln!("{} {}; using defaults.", note_prefix(), e);
            config::merge(config::discovered_root(ov), None, ov)
        }
    }
}

/// Parse `args` (program name first) and run. Returns the exit status.
pub fn run_from<I, T>(args: I) -> u8
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => run(&cli),
        Err(e) => {
            let _ = e.print();
            if e.use_stderr() {
                EXIT_FAILED
            } else {
                EXIT_OK
            }
        }
    }
}

/// Run an already-parsed command line. Returns the exit status.
pub fn run(cli: &Cli) -> u8 {
    let Some(target) = cli.target() else {
        eprintln!("{} pass a workflow file or --batch <PATTERN>", error_prefix());
        return EXIT_FAILED;
    };

    let ov = Overrides {
        repo_root: cli.repo_root.as_deref(),
        output: cli.output_override(),
        verbose: cli.verbose_override(),
    };
    let eff = effective_config(ov);
    init_tracing(eff.verbose);
    match &eff.config_path {
        Some(path) => info!(
            repo_root = %eff.repo_root.display(),
            config = %path.display(),
            "loaded config"
        ),
        None => info!(repo_root = %eff.repo_root.display(), "no config file; using defaults"),
    }

    let human = eff.output != "json";
    let annotate = eff.annotations.enabled();
    let (valid, printed) = match target {
        Target::File(file) => {
            if human {
                eprintln!("{} Validating: {}", info_prefix(), file);
            }
            let res = validate_file(Path::new(file));
            let printed = output::print_result(&res, file, &eff.output, eff.verbose, annotate);
            (res.valid(), printed)
        }
        Target::Batch(pattern) => {
            if human {
                eprintln!("{} Batch validating: {}", info_prefix(), pattern);
            }
            let opts = BatchOptions {
                extensions: eff.extensions.clone(),
            };
            let batch = validate_batch(pattern, &opts);
            let printed = output::print_batch(&batch, &eff.output, eff.verbose, annotate);
            (batch.overall_valid(), printed)
        }
    };

    if let Err(e) = printed {
        eprintln!("{} cannot render output: {}", error_prefix(), e);
        return EXIT_FAILED;
    }
    if valid {
        EXIT_OK
    } else {
        EXIT_FAILED
    }
}
