//! CLI argument parsing via `clap`.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "wfcheck",
    version,
    about = "Validate CI workflow YAML files",
    long_about = "wfcheck validates CI workflow definitions in three phases: YAML syntax, workflow schema, and line-level lint.\n\nConfiguration precedence: CLI > wfcheck.toml > defaults.",
    after_help = "Examples:\n  wfcheck .github/workflows/ci.yml\n  wfcheck --batch .github/workflows\n  wfcheck --batch '.github/workflows/*.yml' --json",
    arg_required_else_help = true
)]
/// Top-level CLI options.
pub struct Cli {
    #[arg(help = "Workflow file to validate", conflicts_with = "batch")]
    pub file: Option<String>,

    #[arg(long, value_name = "PATTERN", help = "Validate every workflow matched by a directory or glob pattern")]
    pub batch: Option<String>,

    #[arg(short, long, action = clap::ArgAction::SetTrue, help = "Show job ids and log progress")]
    pub verbose: bool,

    #[arg(short, long, action = clap::ArgAction::SetTrue, help = "Shorthand for --output json")]
    pub json: bool,

    #[arg(long, help = "Output mode: human|json (default: human)")]
    pub output: Option<String>,

    #[arg(long, help = "Repository root used for config discovery (default: current dir)")]
    pub repo_root: Option<String>,
}

/// What a parsed command line asks for.
#[derive(Debug, PartialEq, Eq)]
pub enum Target<'a> {
    File(&'a str),
    Batch(&'a str),
}

impl Cli {
    /// `None` when neither a file nor `--batch` was given.
    pub fn target(&self) -> Option<Target<'_>> {
        match (&self.file, &self.batch) {
            (_, Some(p)) => Some(Target::Batch(p)),
            (Some(f), None) => Some(Target::File(f)),
            (None, None) => None,
        }
    }

    /// `--json` wins over `--output`; `None` defers to config.
    pub fn output_override(&self) -> Option<&str> {
        if self.json {
            Some("json")
        } else {
            self.output.as_deref()
        }
    }

    /// A flag that is absent defers to config rather than forcing `false`.
    pub fn verbose_override(&self) -> Option<bool> {
        self.verbose.then_some(true)
    }
}
