//! Configuration discovery and effective settings resolution.
//!
//! wfcheck reads `wfcheck.toml|yaml|yml` from the repository root (or the
//! closest ancestor) and merges it with CLI flags to produce an `Effective`
//! config.
//! Defaults:
//! - `output`: `human`
//! - `verbose`: false
//! - `extensions`: `["yml", "yaml"]`
//! - `annotations`: `auto` (on when `GITHUB_ACTIONS=true`)
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::validate::DEFAULT_EXTENSIONS;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONFIG_NAMES: [&str; 3] = ["wfcheck.toml", "wfcheck.yaml", "wfcheck.yml"];

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `wfcheck.toml|yaml`.
pub struct WfcheckConfig {
    pub output: Option<String>,
    pub verbose: Option<bool>,
    /// Extensions that count as workflow documents in batch mode.
    pub extensions: Option<Vec<String>>,
    pub annotations: Option<AnnotationMode>,
}

#[derive(Debug, Default, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
/// When to emit CI annotation lines.
pub enum AnnotationMode {
    #[default]
    Auto,
    Always,
    Never,
}

impl AnnotationMode {
    /// Resolve `Auto` against the CI environment signal.
    pub fn enabled(self) -> bool {
        match self {
            AnnotationMode::Always => true,
            AnnotationMode::Never => false,
            AnnotationMode::Auto => std::env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("invalid TOML in {}: {source}", .path.display())]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid YAML in {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Default, Clone, Copy)]
/// CLI-provided values; `None` means "not given on the command line".
pub struct Overrides<'a> {
    pub repo_root: Option<&'a str>,
    pub output: Option<&'a str>,
    pub verbose: Option<bool>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by the CLI after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    /// Config file that contributed values, if any.
    pub config_path: Option<PathBuf>,
    pub output: String,
    pub verbose: bool,
    pub extensions: Vec<String>,
    pub annotations: AnnotationMode,
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when a `wfcheck.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_NAMES.iter().any(|n| cur.join(n).exists()) {
            return cur.to_path_buf();
        }
        if cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load the config file from `root` if one is present.
pub fn load_config(root: &Path) -> Result<Option<(PathBuf, WfcheckConfig)>, ConfigError> {
    for name in CONFIG_NAMES {
        let path = root.join(name);
        if !path.is_file() {
            continue;
        }
        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let cfg = if name.ends_with(".toml") {
            toml::from_str(&text).map_err(|source| ConfigError::Toml {
                path: path.clone(),
                source,
            })?
        } else {
            serde_yaml::from_str(&text).map_err(|source| ConfigError::Yaml {
                path: path.clone(),
                source,
            })?
        };
        return Ok(Some((path, cfg)));
    }
    Ok(None)
}

/// Resolve `Effective` by merging CLI flags, the discovered config file, and
/// defaults. A config file that cannot be loaded is returned as an error so
/// the caller can report it and fall back to `merge` without a file.
pub fn resolve_effective(ov: Overrides<'_>) -> Result<Effective, ConfigError> {
    let repo_root = discovered_root(ov);
    let loaded = load_config(&repo_root)?;
    Ok(merge(repo_root, loaded, ov))
}

/// Repository root implied by the overrides.
pub fn discovered_root(ov: Overrides<'_>) -> PathBuf {
    let start = PathBuf::from(ov.repo_root.unwrap_or("."));
    detect_repo_root(&start)
}

/// Apply precedence over an already-loaded (or absent) config file.
pub fn merge(
    repo_root: PathBuf,
    loaded: Option<(PathBuf, WfcheckConfig)>,
    ov: Overrides<'_>,
) -> Effective {
    let (config_path, cfg) = match loaded {
        Some((p, c)) => (Some(p), c),
        None => (None, WfcheckConfig::default()),
    };

    let output = ov
        .output
        .map(|s| s.to_string())
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());
    let verbose = ov.verbose.or(cfg.verbose).unwrap_or(false);
    let extensions = cfg
        .extensions
        .map(|xs| {
            xs.into_iter()
                .map(|x| x.trim_start_matches('.').to_string())
                .filter(|x| !x.is_empty())
                .collect::<Vec<_>>()
        })
        .filter(|xs| !xs.is_empty())
        .unwrap_or_else(|| DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect());

    Effective {
        repo_root,
        config_path,
        output,
        verbose,
        extensions,
        annotations: cfg.annotations.unwrap_or_default(),
    }
}
