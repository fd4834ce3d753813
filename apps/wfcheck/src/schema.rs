//! Schema validation for workflow documents.
//!
//! Walks the parsed `Node` tree and reports structural violations as
//! `ValidationError`s. Pure: the raw text is never consulted. Permissions and
//! strategy rules are shared between workflow and job scope; the `context`
//! label only shows up in messages.

use crate::models::document::{Mapping, Node, Scalar};
use crate::models::{ErrorKind, ValidationError};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Permission scopes recognized in mapping-form `permissions`.
pub const PERMISSION_SCOPES: [&str; 13] = [
    "actions",
    "checks",
    "contents",
    "deployments",
    "id-token",
    "issues",
    "discussions",
    "packages",
    "pages",
    "pull-requests",
    "repository-projects",
    "security-events",
    "statuses",
];

pub const PERMISSION_LEVELS: [&str; 3] = ["read", "write", "none"];

pub const PERMISSION_SHORTHANDS: [&str; 2] = ["read-all", "write-all"];

// Shape of a shorthand: `<word>-all`.
static SHORTHAND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*-all$").unwrap());

/// Validate a whole document. Errors come back in rule order.
pub fn validate_schema(doc: &Node) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let root = match doc {
        Node::Mapping(m) => m,
        other => {
            errors.push(ValidationError::new(
                1,
                ErrorKind::InvalidRoot,
                format!("Workflow must be a mapping, found {}", other.kind_name()),
            ));
            return errors;
        }
    };

    check_on(root, &mut errors);
    check_jobs(root, &mut errors);

    if let Some(perms) = root.get("permissions") {
        check_permissions(perms, "workflow", &mut errors);
    }

    if let Some(env) = root.get("env") {
        if env.as_mapping().is_none() {
            errors.push(ValidationError::new(
                0,
                ErrorKind::InvalidEnv,
                format!("\"env\" must be a mapping, found {}", env.kind_name()),
            ));
        }
    }

    errors
}

fn check_on(root: &Mapping, errors: &mut Vec<ValidationError>) {
    match root.get("on") {
        None => errors.push(ValidationError::new(
            0,
            ErrorKind::MissingOn,
            "Required \"on\" trigger is missing",
        )),
        Some(Node::Scalar(Scalar::Str(_))) | Some(Node::Sequence(_)) | Some(Node::Mapping(_)) => {}
        Some(other) => errors.push(ValidationError::new(
            0,
            ErrorKind::InvalidOn,
            format!(
                "\"on\" must be an event name, a list of events, or a mapping; found {}",
                other.kind_name()
            ),
        )),
    }
}

fn check_jobs(root: &Mapping, errors: &mut Vec<ValidationError>) {
    let jobs = match root.get("jobs") {
        None => {
            errors.push(ValidationError::new(
                0,
                ErrorKind::MissingJobs,
                "Required \"jobs\" section is missing",
            ));
            return;
        }
        Some(Node::Mapping(m)) => m,
        Some(other) => {
            errors.push(ValidationError::new(
                0,
                ErrorKind::InvalidJobs,
                format!(
                    "\"jobs\" must be a mapping of job ids to jobs, found {}",
                    other.kind_name()
                ),
            ));
            return;
        }
    };

    for (job_id, job) in jobs.iter() {
        check_job(job_id, job, errors);
    }
}

fn check_job(job_id: &str, job: &Node, errors: &mut Vec<ValidationError>) {
    let job = match job {
        Node::Mapping(m) => m,
        other => {
            errors.push(ValidationError::new(
                0,
                ErrorKind::InvalidJob,
                format!("Job \"{}\" must be a mapping, found {}", job_id, other.kind_name()),
            ));
            return;
        }
    };

    if !job.contains_key("runs-on") && !job.contains_key("uses") {
        errors.push(ValidationError::new(
            0,
            ErrorKind::MissingRunsOn,
            format!("Job \"{}\" needs either \"runs-on\" or \"uses\"", job_id),
        ));
    }

    if let Some(steps) = job.get("steps") {
        check_steps(job_id, steps, errors);
    }

    let context = format!("job \"{}\"", job_id);
    if let Some(perms) = job.get("permissions") {
        check_permissions(perms, &context, errors);
    }
    if let Some(strategy) = job.get("strategy") {
        check_strategy(strategy, &context, errors);
    }
}

fn check_steps(job_id: &str, steps: &Node, errors: &mut Vec<ValidationError>) {
    let Some(steps) = steps.as_sequence() else {
        errors.push(ValidationError::new(
            0,
            ErrorKind::InvalidSteps,
            format!(
                "Steps of job \"{}\" must be a list, found {}",
                job_id,
                steps.kind_name()
            ),
        ));
        return;
    };

    for (idx, step) in steps.iter().enumerate() {
        let runnable = step
            .as_mapping()
            .is_some_and(|m| m.contains_key("run") || m.contains_key("uses"));
        if !runnable {
            errors.push(ValidationError::new(
                0,
                ErrorKind::InvalidStep,
                format!(
                    "Step #{} in job \"{}\" needs \"run\" or \"uses\"",
                    idx + 1,
                    job_id
                ),
            ));
        }
    }
}

/// Permissions rule, shared by workflow and job scope.
pub fn check_permissions(perms: &Node, context: &str, errors: &mut Vec<ValidationError>) {
    match perms {
        Node::Scalar(Scalar::Str(s)) => {
            if PERMISSION_SHORTHANDS.contains(&s.as_str()) {
                return;
            }
            // Two outcomes only: a misspelled shorthand (`admin-all`) is an
            // invalid value, any other string is the wrong type.
            if SHORTHAND_RE.is_match(s) {
                errors.push(ValidationError::new(
                    0,
                    ErrorKind::InvalidPermissions,
                    format!(
                        "Unknown permissions shorthand \"{}\" in {}: use \"read-all\" or \"write-all\"",
                        s, context
                    ),
                ));
            } else {
                errors.push(ValidationError::new(
                    0,
                    ErrorKind::InvalidPermissionsType,
                    format!(
                        "Permissions in {} must be a mapping of scopes or \"read-all\"/\"write-all\", found \"{}\"",
                        context, s
                    ),
                ));
            }
        }
        Node::Mapping(scopes) => {
            let mut seen: HashSet<&str> = HashSet::new();
            for (scope, level) in scopes.pairs() {
                if !seen.insert(scope) {
                    errors.push(ValidationError::new(
                        0,
                        ErrorKind::DuplicateScope,
                        format!("Scope \"{}\" is declared more than once in permissions for {}", scope, context),
                    ));
                }
                if !PERMISSION_SCOPES.contains(&scope) {
                    errors.push(ValidationError::new(
                        0,
                        ErrorKind::InvalidScope,
                        format!("Unknown scope \"{}\" in permissions for {}", scope, context),
                    ));
                }
                let level_ok = level
                    .as_str()
                    .is_some_and(|l| PERMISSION_LEVELS.contains(&l));
                if !level_ok {
                    errors.push(ValidationError::new(
                        0,
                        ErrorKind::InvalidLevel,
                        format!(
                            "Level \"{}\" for scope \"{}\" in {} must be read, write, or none",
                            level, scope, context
                        ),
                    ));
                }
            }
        }
        other => errors.push(ValidationError::new(
            0,
            ErrorKind::InvalidPermissionsType,
            format!(
                "Permissions in {} must be a mapping of scopes or \"read-all\"/\"write-all\", found {}",
                context,
                other.kind_name()
            ),
        )),
    }
}

/// Strategy rule: `fail-fast`, `max-parallel`, `continue-on-error`, `matrix`.
pub fn check_strategy(strategy: &Node, context: &str, errors: &mut Vec<ValidationError>) {
    let Some(strategy) = strategy.as_mapping() else {
        errors.push(ValidationError::new(
            0,
            ErrorKind::InvalidStrategy,
            format!(
                "Strategy in {} must be a mapping, found {}",
                context,
                strategy.kind_name()
            ),
        ));
        return;
    };

    if let Some(v) = strategy.get("fail-fast") {
        if v.as_bool().is_none() {
            errors.push(ValidationError::new(
                0,
                ErrorKind::InvalidFailFast,
                format!("\"fail-fast\" in strategy for {} must be a boolean", context),
            ));
        }
    }

    if let Some(v) = strategy.get("max-parallel") {
        if !v.as_int().is_some_and(|n| n > 0) {
            errors.push(ValidationError::new(
                0,
                ErrorKind::InvalidMaxParallel,
                format!(
                    "\"max-parallel\" in strategy for {} must be a positive integer, found {}",
                    context, v
                ),
            ));
        }
    }

    if let Some(v) = strategy.get("continue-on-error") {
        if v.as_bool().is_none() {
            errors.push(ValidationError::new(
                0,
                ErrorKind::InvalidContinueOnError,
                format!(
                    "\"continue-on-error\" in strategy for {} must be a boolean (expressions are not supported)",
                    context
                ),
            ));
        }
    }

    if let Some(matrix) = strategy.get("matrix") {
        check_matrix(matrix, context, errors);
    }
}

fn check_matrix(matrix: &Node, context: &str, errors: &mut Vec<ValidationError>) {
    let Some(matrix) = matrix.as_mapping() else {
        errors.push(ValidationError::new(
            0,
            ErrorKind::InvalidMatrix,
            format!(
                "\"matrix\" in strategy for {} must be a mapping, found {}",
                context,
                matrix.kind_name()
            ),
        ));
        return;
    };

    for (name, variants) in matrix.iter() {
        let items = variants.as_sequence();
        if name == "include" || name == "exclude" {
            let ok = items.is_some_and(|xs| xs.iter().all(|x| x.as_mapping().is_some()));
            if !ok {
                errors.push(ValidationError::new(
                    0,
                    ErrorKind::InvalidMatrixSpecial,
                    format!("\"{}\" in matrix for {} must be a list of mappings", name, context),
                ));
            }
        } else {
            let ok = items.is_some_and(|xs| xs.iter().all(is_matrix_value));
            if !ok {
                errors.push(ValidationError::new(
                    0,
                    ErrorKind::InvalidMatrixVariants,
                    format!(
                        "Variants for \"{}\" in matrix for {} must be a list of strings, integers, or booleans",
                        name, context
                    ),
                ));
            }
        }
    }
}

fn is_matrix_value(node: &Node) -> bool {
    matches!(
        node,
        Node::Scalar(Scalar::Str(_)) | Node::Scalar(Scalar::Int(_)) | Node::Scalar(Scalar::Bool(_))
    )
}
