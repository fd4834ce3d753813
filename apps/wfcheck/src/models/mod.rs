//! Shared data models: the document tree plus diagnostics and result structs.

pub mod document;

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
/// Severity carried by errors. Warnings are implicitly `Warning`.
pub enum Severity {
    Error,
    Warning,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Closed set of error kinds. Serialized by variant name.
pub enum ErrorKind {
    FileNotFound,
    ReadError,
    #[serde(rename = "YAMLSyntaxError")]
    YamlSyntaxError,
    DocumentTooComplex,
    InvalidRoot,
    MissingOn,
    InvalidOn,
    MissingJobs,
    InvalidJobs,
    InvalidJob,
    MissingRunsOn,
    InvalidSteps,
    InvalidStep,
    InvalidPermissions,
    InvalidPermissionsType,
    DuplicateScope,
    InvalidScope,
    InvalidLevel,
    InvalidStrategy,
    InvalidFailFast,
    InvalidMaxParallel,
    InvalidContinueOnError,
    InvalidMatrix,
    InvalidMatrixSpecial,
    InvalidMatrixVariants,
    InvalidEnv,
    NoFilesFound,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::FileNotFound => "FileNotFound",
            ErrorKind::ReadError => "ReadError",
            ErrorKind::YamlSyntaxError => "YAMLSyntaxError",
            ErrorKind::DocumentTooComplex => "DocumentTooComplex",
            ErrorKind::InvalidRoot => "InvalidRoot",
            ErrorKind::MissingOn => "MissingOn",
            ErrorKind::InvalidOn => "InvalidOn",
            ErrorKind::MissingJobs => "MissingJobs",
            ErrorKind::InvalidJobs => "InvalidJobs",
            ErrorKind::InvalidJob => "InvalidJob",
            ErrorKind::MissingRunsOn => "MissingRunsOn",
            ErrorKind::InvalidSteps => "InvalidSteps",
            ErrorKind::InvalidStep => "InvalidStep",
            ErrorKind::InvalidPermissions => "InvalidPermissions",
            ErrorKind::InvalidPermissionsType => "InvalidPermissionsType",
            ErrorKind::DuplicateScope => "DuplicateScope",
            ErrorKind::InvalidScope => "InvalidScope",
            ErrorKind::InvalidLevel => "InvalidLevel",
            ErrorKind::InvalidStrategy => "InvalidStrategy",
            ErrorKind::InvalidFailFast => "InvalidFailFast",
            ErrorKind::InvalidMaxParallel => "InvalidMaxParallel",
            ErrorKind::InvalidContinueOnError => "InvalidContinueOnError",
            ErrorKind::InvalidMatrix => "InvalidMatrix",
            ErrorKind::InvalidMatrixSpecial => "InvalidMatrixSpecial",
            ErrorKind::InvalidMatrixVariants => "InvalidMatrixVariants",
            ErrorKind::InvalidEnv => "InvalidEnv",
            ErrorKind::NoFilesFound => "NoFilesFound",
        }
    }

    /// Phase 1 kinds: the document never reached schema validation.
    pub fn is_load_failure(self) -> bool {
        matches!(
            self,
            ErrorKind::FileNotFound
                | ErrorKind::ReadError
                | ErrorKind::YamlSyntaxError
                | ErrorKind::DocumentTooComplex
        )
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Closed set of heuristic warning kinds.
pub enum WarningKind {
    TabWarning,
    PossibleUnclosedString,
    EmptyJobs,
    NoTrigger,
}

impl WarningKind {
    pub fn as_str(self) -> &'static str {
        match self {
            WarningKind::TabWarning => "TabWarning",
            WarningKind::PossibleUnclosedString => "PossibleUnclosedString",
            WarningKind::EmptyJobs => "EmptyJobs",
            WarningKind::NoTrigger => "NoTrigger",
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
/// A blocking diagnostic. `line = 0` means document-level.
pub struct ValidationError {
    pub line: usize,
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub message: String,
    pub severity: Severity,
}

impl ValidationError {
    pub fn new(line: usize, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            line,
            kind,
            message: message.into(),
            severity: Severity::Error,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
/// A non-blocking heuristic finding.
pub struct ValidationWarning {
    pub line: usize,
    #[serde(rename = "type")]
    pub kind: WarningKind,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(line: usize, kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            line,
            kind,
            message: message.into(),
        }
    }
}

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
/// Line counts; every physical line lands in exactly one bucket.
pub struct FileStats {
    pub total_lines: usize,
    pub empty_lines: usize,
    pub comment_lines: usize,
    pub code_lines: usize,
}

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
/// Read-only facts derived from a document's top level.
pub struct WorkflowStructure {
    pub has_name: bool,
    pub has_on: bool,
    pub has_jobs: bool,
    pub has_env: bool,
    pub has_permissions: bool,
    pub job_count: usize,
    pub jobs: Vec<String>,
    pub triggers: Vec<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
/// Outcome of validating one document.
///
/// `valid` is derived from `errors` when the value is built and cannot be
/// set independently.
pub struct ValidationResult {
    valid: bool,
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationWarning>,
    stats: FileStats,
    structure: WorkflowStructure,
}

impl ValidationResult {
    pub fn new(
        errors: Vec<ValidationError>,
        warnings: Vec<ValidationWarning>,
        stats: FileStats,
        structure: WorkflowStructure,
    ) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
            stats,
            structure,
        }
    }

    /// Result carrying a single error and inert stats/structure.
    pub fn failed(error: ValidationError) -> Self {
        Self::new(
            vec![error],
            Vec::new(),
            FileStats::default(),
            WorkflowStructure::default(),
        )
    }

    pub fn valid(&self) -> bool {
        self.valid
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn warnings(&self) -> &[ValidationWarning] {
        &self.warnings
    }

    pub fn stats(&self) -> &FileStats {
        &self.stats
    }

    pub fn structure(&self) -> &WorkflowStructure {
        &self.structure
    }
}

/// Key used for the synthetic entry of a batch that matched nothing.
pub const NO_FILES_KEY: &str = "no_files";

#[derive(Serialize, Debug, Clone, PartialEq)]
/// Aggregate over many independently validated documents.
pub struct BatchResult {
    files: BTreeMap<String, ValidationResult>,
    overall_valid: bool,
    #[serde(skip)]
    root: PathBuf,
}

impl BatchResult {
    /// `files` is keyed by names relative to `root`.
    pub fn new(root: PathBuf, files: BTreeMap<String, ValidationResult>) -> Self {
        let overall_valid = files.values().all(ValidationResult::valid);
        Self {
            files,
            overall_valid,
            root,
        }
    }

    /// Single synthetic entry reporting that the pattern matched nothing.
    pub fn no_files(root: PathBuf, message: impl Into<String>) -> Self {
        let mut files = BTreeMap::new();
        files.insert(
            NO_FILES_KEY.to_string(),
            ValidationResult::failed(ValidationError::new(0, ErrorKind::NoFilesFound, message)),
        );
        Self {
            files,
            overall_valid: false,
            root,
        }
    }

    pub fn files(&self) -> &BTreeMap<String, ValidationResult> {
        &self.files
    }

    pub fn overall_valid(&self) -> bool {
        self.overall_valid
    }

    /// The synthetic no-match result, when the pattern resolved to nothing.
    pub fn no_files_result(&self) -> Option<&ValidationResult> {
        let r = self.files.get(NO_FILES_KEY)?;
        r.errors()
            .iter()
            .any(|e| e.kind == ErrorKind::NoFilesFound)
            .then_some(r)
    }

    /// Filesystem path for a batch entry.
    pub fn path_of(&self, key: &str) -> PathBuf {
        if self.root.as_os_str().is_empty() {
            PathBuf::from(key)
        } else {
            self.root.join(key)
        }
    }
}
