//! Validation pipeline and batch runner.
//!
//! `validate_str` runs the three phases over in-memory text: parse, schema,
//! heuristic lint. A parse failure is terminal and is reported alone.
//! `validate_file` adds the I/O boundary, and `validate_batch` fans a glob
//! pattern out over many files.

use crate::lint::{document_warnings, lint_lines};
use crate::models::{BatchResult, ErrorKind, ValidationError, ValidationResult};
use crate::parse::{parse_document, split_lines, ParseError};
use crate::schema::validate_schema;
use crate::structure::summarize;
use glob::{glob, Pattern};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

/// Extensions recognized when a batch pattern expands a directory.
pub const DEFAULT_EXTENSIONS: [&str; 2] = ["yml", "yaml"];

/// Validate document text that is already in memory.
pub fn validate_str(text: &str) -> ValidationResult {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let doc = match parse_document(text) {
        Ok(doc) => doc,
        Err(e) => return ValidationResult::failed(parse_failure(e)),
    };

    let errors = validate_schema(&doc);
    let structure = summarize(&doc);
    let lines = split_lines(text);
    let (mut warnings, stats) = lint_lines(&lines);
    if doc.as_mapping().is_some() {
        warnings.extend(document_warnings(&structure));
    }

    ValidationResult::new(errors, warnings, stats, structure)
}

fn parse_failure(err: ParseError) -> ValidationError {
    let kind = match err {
        ParseError::Syntax { .. } => ErrorKind::YamlSyntaxError,
        ParseError::TooComplex { .. } => ErrorKind::DocumentTooComplex,
    };
    ValidationError::new(err.line(), kind, err.to_string())
}

/// Read and validate one file. Missing or unreadable files become
/// single-error results rather than Rust errors.
pub fn validate_file(path: &Path) -> ValidationResult {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return ValidationResult::failed(ValidationError::new(
                0,
                ErrorKind::FileNotFound,
                format!("File not found: {}", path.display()),
            ));
        }
        Err(e) => {
            return ValidationResult::failed(ValidationError::new(
                0,
                ErrorKind::ReadError,
                format!("Error reading file {}: {}", path.display(), e),
            ));
        }
    };
    let text = match String::from_utf8(bytes) {
        Ok(t) => t,
        Err(e) => {
            return ValidationResult::failed(ValidationError::new(
                0,
                ErrorKind::ReadError,
                format!("File {} is not valid UTF-8: {}", path.display(), e),
            ));
        }
    };

    let result = validate_str(&text);
    debug!(
        path = %path.display(),
        valid = result.valid(),
        errors = result.errors().len(),
        warnings = result.warnings().len(),
        "validated document"
    );
    result
}

#[derive(Debug, Clone)]
/// Options for batch resolution.
pub struct BatchOptions {
    /// File extensions (without dot) that count as workflow documents.
    pub extensions: Vec<String>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

impl BatchOptions {
    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|x| x == ext))
    }
}

/// Validate every document matched by `pattern`.
///
/// Directories expand recursively. Entries are keyed by their path relative
/// to the literal prefix of the pattern. Files are validated in parallel;
/// the sorted map keeps output order independent of scheduling.
pub fn validate_batch(pattern: &str, opts: &BatchOptions) -> BatchResult {
    let base = pattern_base(pattern);
    let paths = match resolve_pattern(pattern, opts) {
        Ok(p) => p,
        Err(e) => {
            return BatchResult::no_files(
                base,
                format!("No YAML files matched pattern: {} ({})", pattern, e),
            );
        }
    };
    info!(pattern, files = paths.len(), "resolved batch pattern");
    if paths.is_empty() {
        return BatchResult::no_files(base, format!("No YAML files matched pattern: {}", pattern));
    }

    let per_file: Vec<(String, ValidationResult)> = paths
        .par_iter()
        .map(|path| (batch_key(path, &base), validate_file(path)))
        .collect();
    BatchResult::new(base, per_file.into_iter().collect::<BTreeMap<_, _>>())
}

/// Resolve a glob pattern to a sorted, deduplicated set of document paths.
pub fn resolve_pattern(
    pattern: &str,
    opts: &BatchOptions,
) -> Result<BTreeSet<PathBuf>, glob::PatternError> {
    let mut out = BTreeSet::new();
    for entry in glob(pattern)?.flatten() {
        if entry.is_dir() {
            let nested = format!("{}/**/*", Pattern::escape(&entry.to_string_lossy()));
            for p in glob(&nested)?.flatten() {
                if p.is_file() && opts.accepts(&p) {
                    out.insert(p);
                }
            }
        } else if opts.accepts(&entry) {
            out.insert(entry);
        }
    }
    Ok(out)
}

/// Directory that batch keys are relative to: the pattern itself when it
/// names a directory, else its leading components without glob syntax.
pub fn pattern_base(pattern: &str) -> PathBuf {
    let path = Path::new(pattern);
    if path.is_dir() {
        return path.to_path_buf();
    }
    let mut base = PathBuf::new();
    let mut literal = true;
    for comp in path.components() {
        let has_meta = match comp {
            Component::Normal(s) => s.to_string_lossy().contains(['*', '?', '[']),
            _ => false,
        };
        if has_meta {
            literal = false;
            break;
        }
        base.push(comp);
    }
    if literal {
        // The pattern named a file; key it by its file name.
        base.pop();
    }
    base
}

fn batch_key(path: &Path, base: &Path) -> String {
    pathdiff::diff_paths(path, base)
        .filter(|rel| !rel.as_os_str().is_empty())
        .unwrap_or_else(|| path.to_path_buf())
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{WarningKind, NO_FILES_KEY};
    use tempfile::tempdir;

    const VALID: &str = "name: T\non: push\njobs:\n  build:\n    runs-on: ubuntu-latest\n    steps:\n      - run: echo hi\n";

    fn error_kinds(r: &ValidationResult) -> Vec<ErrorKind> {
        r.errors().iter().map(|e| e.kind).collect()
    }

    fn warning_kinds(r: &ValidationResult) -> Vec<WarningKind> {
        r.warnings().iter().map(|w| w.kind).collect()
    }

    #[test]
    fn test_valid_workflow() {
        let r = validate_str(VALID);
        assert!(r.valid());
        assert!(r.errors().is_empty());
        assert!(r.warnings().is_empty());
        assert_eq!(r.structure().jobs, vec!["build"]);
        assert_eq!(r.structure().triggers, vec!["push"]);
        assert!(r.structure().has_name);
        assert_eq!(r.structure().job_count, 1);
        assert_eq!(r.stats().total_lines, 7);
    }

    #[test]
    fn test_missing_on_is_single_error() {
        let r = validate_str(
            "name: T\njobs:\n  build:\n    runs-on: ubuntu-latest\n    steps:\n      - run: echo hi\n",
        );
        assert!(!r.valid());
        assert_eq!(error_kinds(&r), vec![ErrorKind::MissingOn]);
        assert_eq!(warning_kinds(&r), vec![WarningKind::NoTrigger]);
    }

    #[test]
    fn test_invalid_permissions_string() {
        let r = validate_str(
            "name: T\non: push\npermissions: \"invalid\"\njobs:\n  build:\n    runs-on: x\n",
        );
        assert!(error_kinds(&r).contains(&ErrorKind::InvalidPermissionsType));
    }

    #[test]
    fn test_duplicate_scope() {
        let r = validate_str(
            "on: push\npermissions: {contents: write, contents: read}\njobs:\n  build:\n    runs-on: x\n",
        );
        assert!(!r.valid());
        assert!(error_kinds(&r).contains(&ErrorKind::DuplicateScope));
    }

    #[test]
    fn test_merge_keys_resolve_before_schema() {
        let r = validate_str(
            "on: push\nx-defaults: &d\n  runs-on: ubuntu-latest\njobs:\n  build:\n    <<: *d\n    steps:\n      - run: echo\n",
        );
        assert!(r.valid(), "{:?}", r.errors());

        let r = validate_str(
            "on: push\nx-perms: &p\n  contents: read\npermissions:\n  <<: *p\n  contents: write\njobs:\n  build:\n    runs-on: x\n",
        );
        assert!(r.valid(), "{:?}", r.errors());
    }

    #[test]
    fn test_tab_and_unterminated_quote_in_valid_document() {
        let r = validate_str(
            "on: push\njobs:\n  build:\n    runs-on: ubuntu-latest\n    env:\n      A: \"x\ty\"\n    steps:\n      - run: echo it's\n",
        );
        assert!(r.valid(), "errors: {:?}", r.errors());
        assert_eq!(
            warning_kinds(&r),
            vec![WarningKind::TabWarning, WarningKind::PossibleUnclosedString]
        );
        assert_eq!(r.warnings()[0].line, 6);
        assert_eq!(r.warnings()[1].line, 8);
    }

    #[test]
    fn test_syntax_error_surfaces_alone() {
        let r = validate_str(
            "name: Test\non: push\njobs:\n  build:\n    runs-on: ubuntu-latest\n    steps:\n      - run: echo hello\n  invalid_indent\n",
        );
        assert!(!r.valid());
        assert_eq!(error_kinds(&r), vec![ErrorKind::YamlSyntaxError]);
        assert!(r.errors()[0].line > 0);
        assert!(r.warnings().is_empty());
        assert_eq!(r.stats(), &Default::default());
        assert_eq!(r.structure(), &Default::default());
    }

    #[test]
    fn test_too_deep_document() {
        let depth = crate::parse::MAX_DEPTH + 1;
        let text = format!("on: {}1{}\n", "[".repeat(depth), "]".repeat(depth));
        let r = validate_str(&text);
        assert_eq!(error_kinds(&r), vec![ErrorKind::DocumentTooComplex]);
        assert!(r.warnings().is_empty());
    }

    #[test]
    fn test_empty_jobs_warns_and_bare_jobs_errors() {
        let r = validate_str("name: Test\non: push\njobs: {}\n");
        assert!(r.valid());
        assert_eq!(warning_kinds(&r), vec![WarningKind::EmptyJobs]);

        let r = validate_str("name: Test\non: push\njobs:\n");
        assert_eq!(error_kinds(&r), vec![ErrorKind::InvalidJobs]);
        assert_eq!(warning_kinds(&r), vec![WarningKind::EmptyJobs]);
    }

    #[test]
    fn test_non_mapping_root_has_no_document_warnings() {
        let r = validate_str("- a\n- b\n");
        assert_eq!(error_kinds(&r), vec![ErrorKind::InvalidRoot]);
        assert!(r.warnings().is_empty());
        assert_eq!(r.stats().code_lines, 2);
    }

    #[test]
    fn test_validation_is_idempotent() {
        let text = "on: push\npermissions: nope\njobs:\n  a: 1\n  b: \"x\ty\"\n";
        assert_eq!(validate_str(text), validate_str(text));
    }

    #[test]
    fn test_stats_partition_holds() {
        let r = validate_str("# c\nname: T\n\non: push\n  # c2\njobs: {}\n");
        let s = r.stats();
        assert_eq!(s.total_lines, 6);
        assert_eq!(s.total_lines, s.empty_lines + s.comment_lines + s.code_lines);
        assert_eq!((s.empty_lines, s.comment_lines, s.code_lines), (1, 2, 3));
    }

    #[test]
    fn test_file_not_found() {
        let dir = tempdir().unwrap();
        let r = validate_file(&dir.path().join("missing.yml"));
        assert!(!r.valid());
        assert_eq!(error_kinds(&r), vec![ErrorKind::FileNotFound]);
        assert_eq!(r.errors()[0].line, 0);
    }

    #[test]
    fn test_non_utf8_is_read_error() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("bad.yml");
        fs::write(&p, [0x6f, 0x6e, 0x3a, 0x20, 0xff, 0xfe, 0x0a]).unwrap();
        let r = validate_file(&p);
        assert_eq!(error_kinds(&r), vec![ErrorKind::ReadError]);
    }

    #[test]
    fn test_directory_is_read_error() {
        let dir = tempdir().unwrap();
        let r = validate_file(dir.path());
        assert_eq!(error_kinds(&r), vec![ErrorKind::ReadError]);
    }

    #[test]
    fn test_batch_directory() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("wf1.yml"), VALID).unwrap();
        fs::write(
            dir.path().join("wf2.yml"),
            VALID.replace("on: push", "on: pull_request"),
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("wf3.yaml"), VALID).unwrap();
        fs::write(dir.path().join("notes.txt"), "not yaml").unwrap();

        let batch = validate_batch(&dir.path().to_string_lossy(), &BatchOptions::default());
        let keys: Vec<&String> = batch.files().keys().collect();
        let nested = Path::new("nested").join("wf3.yaml").to_string_lossy().to_string();
        assert_eq!(keys.len(), 3);
        assert!(batch.files().contains_key("wf1.yml"));
        assert!(batch.files().contains_key("wf2.yml"));
        assert!(batch.files().contains_key(&nested));
        assert!(batch.overall_valid());
        assert_eq!(batch.path_of("wf1.yml"), dir.path().join("wf1.yml"));
    }

    #[test]
    fn test_batch_mixed_validity() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("valid.yml"), VALID).unwrap();
        fs::write(
            dir.path().join("invalid.yml"),
            "name: Invalid\n# Missing 'on' trigger\njobs:\n  build:\n    runs-on: x\n",
        )
        .unwrap();

        let batch = validate_batch(&dir.path().to_string_lossy(), &BatchOptions::default());
        assert_eq!(batch.files().len(), 2);
        assert_eq!(batch.files().values().filter(|r| r.valid()).count(), 1);
        assert!(!batch.overall_valid());
    }

    #[test]
    fn test_batch_glob_pattern() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.yml"), VALID).unwrap();
        fs::write(dir.path().join("b.yaml"), VALID).unwrap();
        let pattern = format!("{}/*.yml", dir.path().to_string_lossy());

        let batch = validate_batch(&pattern, &BatchOptions::default());
        let keys: Vec<&str> = batch.files().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a.yml"]);
    }

    #[test]
    fn test_batch_no_files() {
        let dir = tempdir().unwrap();
        let pattern = format!("{}/*.nonexistent", dir.path().to_string_lossy());
        let batch = validate_batch(&pattern, &BatchOptions::default());
        assert!(!batch.overall_valid());
        assert_eq!(batch.files().len(), 1);
        let r = &batch.files()[NO_FILES_KEY];
        assert_eq!(error_kinds(r), vec![ErrorKind::NoFilesFound]);
        assert!(batch.no_files_result().is_some());
    }

    #[test]
    fn test_batch_custom_extensions() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("ci.workflow"), VALID).unwrap();
        fs::write(dir.path().join("ci.yml"), VALID).unwrap();
        let opts = BatchOptions {
            extensions: vec!["workflow".into()],
        };
        let batch = validate_batch(&dir.path().to_string_lossy(), &opts);
        let keys: Vec<&str> = batch.files().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["ci.workflow"]);
    }

    #[test]
    fn test_pattern_base() {
        assert_eq!(pattern_base("wf/*.yml"), PathBuf::from("wf"));
        assert_eq!(pattern_base("a/b/**/*.yaml"), PathBuf::from("a/b"));
        assert_eq!(pattern_base("a/ci.yml"), PathBuf::from("a"));
        assert_eq!(pattern_base("*.yml"), PathBuf::new());
    }

    #[test]
    fn test_batch_key_relative_to_base() {
        assert_eq!(batch_key(Path::new("wf/ci.yml"), Path::new("wf")), "ci.yml");
        assert_eq!(batch_key(Path::new("ci.yml"), Path::new("")), "ci.yml");
    }
}
