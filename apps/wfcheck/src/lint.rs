//! Heuristic line lint.
//!
//! Produces `ValidationWarning`s and `FileStats` from the raw lines of a
//! document. These checks are textual and knowingly imprecise (block scalars
//! and multi-line strings can trip or hide them), so they only ever warn.

use crate::models::{FileStats, ValidationWarning, WarningKind, WorkflowStructure};

#[derive(Debug, PartialEq, Eq)]
enum LineClass {
    Empty,
    Comment,
    Code,
}

fn classify(trimmed: &str) -> LineClass {
    if trimmed.is_empty() {
        LineClass::Empty
    } else if trimmed.starts_with('#') {
        LineClass::Comment
    } else {
        LineClass::Code
    }
}

/// Scan physical lines (1-based numbering), counting line categories and
/// collecting per-line warnings.
pub fn lint_lines(lines: &[&str]) -> (Vec<ValidationWarning>, FileStats) {
    let mut warnings = Vec::new();
    let mut stats = FileStats {
        total_lines: lines.len(),
        ..FileStats::default()
    };

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        match classify(trimmed) {
            LineClass::Empty => {
                stats.empty_lines += 1;
                continue;
            }
            LineClass::Comment => {
                stats.comment_lines += 1;
                continue;
            }
            LineClass::Code => stats.code_lines += 1,
        }

        if line.contains('\t') {
            warnings.push(ValidationWarning::new(
                line_no,
                WarningKind::TabWarning,
                "Tab character found; indent with spaces",
            ));
        }

        let continued = trimmed.ends_with('\\');
        for (quote, label) in [('"', "double"), ('\'', "single")] {
            let count = trimmed.matches(quote).count();
            if count % 2 != 0 && !continued {
                warnings.push(ValidationWarning::new(
                    line_no,
                    WarningKind::PossibleUnclosedString,
                    format!("Odd number of {} quotes ({}) on this line", label, count),
                ));
            }
        }
    }

    (warnings, stats)
}

/// Document-level (line 0) warnings derived from the structural summary.
pub fn document_warnings(structure: &WorkflowStructure) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    if structure.has_jobs && structure.job_count == 0 {
        warnings.push(ValidationWarning::new(
            0,
            WarningKind::EmptyJobs,
            "Jobs section exists but declares no jobs",
        ));
    }
    if !structure.has_on {
        warnings.push(ValidationWarning::new(
            0,
            WarningKind::NoTrigger,
            "No workflow trigger (on:); the workflow will not run automatically",
        ));
    }
    warnings
}
