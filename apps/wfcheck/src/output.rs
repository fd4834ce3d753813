//! Output rendering for single-file and batch validation.
//!
//! Supports `human` (default) and `json` outputs, plus GitHub Actions
//! annotation lines. JSON is emitted with sorted keys and a `version` tag.

use crate::models::{BatchResult, ErrorKind, Severity, ValidationResult};
use owo_colors::OwoColorize;
use serde_json::Value as JsonVal;

/// Version tag carried by machine-readable output.
pub const OUTPUT_VERSION: &str = "1.0";

const RULE: &str = "======================================================================";
const MAX_LISTED: usize = 10;
const MAX_JOBS_LISTED: usize = 8;

pub fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

struct Palette {
    color: bool,
}

impl Palette {
    fn ok(&self) -> String {
        if self.color {
            "✔".green().to_string()
        } else {
            "✔".to_string()
        }
    }

    fn fail(&self) -> String {
        if self.color {
            "✖".red().to_string()
        } else {
            "✖".to_string()
        }
    }

    fn warn(&self) -> String {
        if self.color {
            "▲".yellow().to_string()
        } else {
            "▲".to_string()
        }
    }

    fn info(&self) -> String {
        if self.color {
            "◆".blue().to_string()
        } else {
            "◆".to_string()
        }
    }

    fn status(&self, cond: bool) -> String {
        if cond {
            self.ok()
        } else {
            self.fail()
        }
    }

    fn heading(&self, s: &str) -> String {
        if self.color {
            s.bold().to_string()
        } else {
            s.to_string()
        }
    }
}

fn line_label(line: usize) -> String {
    if line > 0 {
        format!("Line {}", line)
    } else {
        "General".to_string()
    }
}

/// Human-readable report for one document.
pub fn render_report(res: &ValidationResult, verbose: bool, color: bool) -> String {
    let p = Palette { color };
    let mut lines: Vec<String> = Vec::new();

    lines.push(RULE.to_string());
    lines.push(p.heading("WORKFLOW VALIDATION REPORT"));
    lines.push(RULE.to_string());
    lines.push(String::new());

    let stats = res.stats();
    lines.push(format!("{} {}", p.info(), p.heading("FILE STATISTICS")));
    lines.push(format!("  Total lines:     {}", stats.total_lines));
    lines.push(format!("  Code lines:      {}", stats.code_lines));
    lines.push(format!("  Empty lines:     {}", stats.empty_lines));
    lines.push(format!("  Comment lines:   {}", stats.comment_lines));
    lines.push(String::new());

    let st = res.structure();
    lines.push(format!("{} {}", p.info(), p.heading("WORKFLOW STRUCTURE")));
    lines.push(format!("  {} Has 'name' field", p.status(st.has_name)));
    lines.push(format!("  {} Has 'on' triggers", p.status(st.has_on)));
    lines.push(format!("  {} Has 'jobs' section", p.status(st.has_jobs)));
    lines.push(format!("  {} Has 'env' variables", p.status(st.has_env)));
    lines.push(format!("  {} Has 'permissions'", p.status(st.has_permissions)));
    if !st.triggers.is_empty() {
        lines.push(format!("  → Triggers: {}", st.triggers.join(", ")));
    }
    if !st.jobs.is_empty() {
        lines.push(format!("  → Jobs defined: {}", st.job_count));
        if verbose {
            let shown: Vec<&str> = st.jobs.iter().take(MAX_JOBS_LISTED).map(String::as_str).collect();
            lines.push(format!("     {}", shown.join(", ")));
            if st.job_count > MAX_JOBS_LISTED {
                lines.push(format!("     ... and {} more jobs", st.job_count - MAX_JOBS_LISTED));
            }
        }
    }
    lines.push(String::new());

    let (load, schema): (Vec<_>, Vec<_>) = res
        .errors()
        .iter()
        .partition(|e| e.kind.is_load_failure());

    lines.push(p.heading("PHASE 1: SYNTAX VALIDATION"));
    if load.is_empty() {
        lines.push(format!("  {} YAML syntax is valid", p.ok()));
    } else {
        lines.push(format!("  {} Found {} syntax error(s)", p.fail(), load.len()));
        for (i, e) in load.iter().take(MAX_LISTED).enumerate() {
            lines.push(format!("    {}. {}: {}", i + 1, line_label(e.line), e.kind.as_str()));
            lines.push(format!("       {}", e.message));
        }
    }
    lines.push(String::new());

    lines.push(p.heading("PHASE 2: SCHEMA VALIDATION"));
    if schema.is_empty() {
        lines.push(format!("  {} Workflow schema is valid", p.ok()));
    } else {
        lines.push(format!("  {} Found {} schema error(s)", p.fail(), schema.len()));
        for (i, e) in schema.iter().take(MAX_LISTED).enumerate() {
            lines.push(format!("    {}. {}: {}", i + 1, line_label(e.line), e.kind.as_str()));
            lines.push(format!("       {}", e.message));
        }
        if schema.len() > MAX_LISTED {
            lines.push(format!("    ... and {} more errors", schema.len() - MAX_LISTED));
        }
    }
    lines.push(String::new());

    let warnings = res.warnings();
    if warnings.is_empty() {
        lines.push(format!("{} No lint warnings", p.ok()));
    } else {
        lines.push(format!(
            "{} {}",
            p.warn(),
            p.heading(&format!("PHASE 3: LINT WARNINGS ({} found)", warnings.len()))
        ));
        for (i, w) in warnings.iter().take(MAX_LISTED).enumerate() {
            lines.push(format!("  {}. {}: {}", i + 1, line_label(w.line), w.message));
        }
        if warnings.len() > MAX_LISTED {
            lines.push(format!("  ... and {} more warnings", warnings.len() - MAX_LISTED));
        }
    }
    lines.push(String::new());
    lines.push(RULE.to_string());

    if res.valid() {
        lines.push(format!("{} RESULT: WORKFLOW IS VALID", p.ok()));
    } else {
        lines.push(format!("{} RESULT: FIX ERRORS BEFORE USING THIS WORKFLOW", p.fail()));
    }
    lines.push(RULE.to_string());
    lines.join("\n") + "\n"
}

/// Human-readable report for a batch: one report per file plus a summary.
pub fn render_batch(batch: &BatchResult, verbose: bool, color: bool) -> String {
    let p = Palette { color };
    let mut lines: Vec<String> = Vec::new();

    if let Some(r) = batch.no_files_result() {
        lines.push("\n--- Error ---".to_string());
        for e in r.errors() {
            lines.push(e.message.clone());
        }
        return lines.join("\n") + "\n";
    }

    for (name, res) in batch.files() {
        lines.push(format!("\n--- {} ---", name));
        lines.push(render_report(res, verbose, color).trim_end().to_string());
    }
    lines.push("\n--- Summary ---".to_string());
    lines.push(format!(
        "Overall valid: {} ({} files)",
        p.status(batch.overall_valid()),
        batch.files().len()
    ));
    lines.join("\n") + "\n"
}

/// JSON for one document, with the version tag.
pub fn compose_result_json(res: &ValidationResult) -> Result<JsonVal, serde_json::Error> {
    let mut v = serde_json::to_value(res)?;
    if let JsonVal::Object(map) = &mut v {
        map.insert("version".into(), JsonVal::from(OUTPUT_VERSION));
    }
    Ok(v)
}

/// JSON for a batch, with the version tag.
pub fn compose_batch_json(batch: &BatchResult) -> Result<JsonVal, serde_json::Error> {
    let mut v = serde_json::to_value(batch)?;
    if let JsonVal::Object(map) = &mut v {
        map.insert("version".into(), JsonVal::from(OUTPUT_VERSION));
    }
    Ok(v)
}

/// GitHub Actions annotation lines for one document. Line 0 is reported
/// as line 1.
pub fn annotations(file: &str, res: &ValidationResult) -> Vec<String> {
    let mut lines = Vec::with_capacity(res.errors().len() + res.warnings().len());
    for e in res.errors() {
        let level = match e.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        lines.push(format!(
            "::{} file={},line={}::{}: {}",
            level,
            file,
            e.line.max(1),
            e.kind.as_str(),
            e.message
        ));
    }
    for w in res.warnings() {
        lines.push(format!(
            "::warning file={},line={}::{}: {}",
            file,
            w.line.max(1),
            w.kind.as_str(),
            w.message
        ));
    }
    lines
}

/// Annotation lines for every file of a batch, using real paths.
pub fn batch_annotations(batch: &BatchResult) -> Vec<String> {
    let mut lines = Vec::new();
    for (name, res) in batch.files() {
        let is_synthetic = res.errors().iter().any(|e| e.kind == ErrorKind::NoFilesFound);
        let file = if is_synthetic {
            name.clone()
        } else {
            batch.path_of(name).to_string_lossy().to_string()
        };
        lines.extend(annotations(&file, res));
    }
    lines
}

/// Print a single-document result in the requested format.
pub fn print_result(
    res: &ValidationResult,
    file: &str,
    output: &str,
    verbose: bool,
    annotate: bool,
) -> Result<(), serde_json::Error> {
    match output {
        "json" => println!("{}", serde_json::to_string_pretty(&compose_result_json(res)?)?),
        _ => print!("{}", render_report(res, verbose, use_colors(output))),
    }
    if annotate {
        for line in annotations(file, res) {
            eprintln!("{}", line);
        }
    }
    Ok(())
}

/// Print a batch result in the requested format.
pub fn print_batch(
    batch: &BatchResult,
    output: &str,
    verbose: bool,
    annotate: bool,
) -> Result<(), serde_json::Error> {
    match output {
        "json" => println!("{}", serde_json::to_string_pretty(&compose_batch_json(batch)?)?),
        _ => print!("{}", render_batch(batch, verbose, use_colors(output))),
    }
    if annotate {
        for line in batch_annotations(batch) {
            eprintln!("{}", line);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        FileStats, ValidationError, ValidationWarning, WarningKind, WorkflowStructure,
    };
    use crate::validate::validate_str;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn sample() -> ValidationResult {
        ValidationResult::new(
            vec![ValidationError::new(0, ErrorKind::MissingOn, "Required \"on\" trigger is missing")],
            vec![ValidationWarning::new(4, WarningKind::TabWarning, "Tab character found")],
            FileStats {
                total_lines: 5,
                empty_lines: 0,
                comment_lines: 1,
                code_lines: 4,
            },
            WorkflowStructure {
                has_jobs: true,
                job_count: 1,
                jobs: vec!["build".into()],
                ..WorkflowStructure::default()
            },
        )
    }

    #[test]
    fn test_annotation_lines() {
        let lines = annotations("ci.yml", &sample());
        assert_eq!(
            lines,
            vec![
                "::error file=ci.yml,line=1::MissingOn: Required \"on\" trigger is missing",
                "::warning file=ci.yml,line=4::TabWarning: Tab character found",
            ]
        );
    }

    #[test]
    fn test_compose_result_json_shape() {
        let out = compose_result_json(&sample()).unwrap();
        assert_eq!(out["version"], OUTPUT_VERSION);
        assert_eq!(out["valid"], false);
        assert_eq!(out["errors"][0]["type"], "MissingOn");
        assert_eq!(out["errors"][0]["severity"], "ERROR");
        assert_eq!(out["warnings"][0]["line"], 4);
        assert_eq!(out["stats"]["code_lines"], 4);
        assert_eq!(out["structure"]["jobs"][0], "build");
    }

    #[test]
    fn test_json_keys_are_sorted() {
        let out = compose_result_json(&sample()).unwrap();
        let keys: Vec<&String> = out.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["errors", "stats", "structure", "valid", "version", "warnings"]);
    }

    #[test]
    fn test_compose_batch_json_shape() {
        let mut files = BTreeMap::new();
        files.insert("a.yml".to_string(), sample());
        let batch = BatchResult::new(PathBuf::from("wf"), files);
        let out = compose_batch_json(&batch).unwrap();
        assert_eq!(out["overall_valid"], false);
        assert_eq!(out["files"]["a.yml"]["errors"][0]["type"], "MissingOn");
        assert_eq!(out["version"], OUTPUT_VERSION);
        assert!(out.get("root").is_none());
    }

    #[test]
    fn test_batch_annotations_use_real_paths() {
        let mut files = BTreeMap::new();
        files.insert("a.yml".to_string(), sample());
        let batch = BatchResult::new(PathBuf::from("wf"), files);
        let lines = batch_annotations(&batch);
        let expected = format!("file={},", PathBuf::from("wf").join("a.yml").display());
        assert!(lines[0].contains(&expected));
    }

    #[test]
    fn test_render_report_sections() {
        let text = render_report(&sample(), true, false);
        assert!(text.contains("FILE STATISTICS"));
        assert!(text.contains("✖ Found 1 schema error(s)"));
        assert!(text.contains("General: MissingOn"));
        assert!(text.contains("PHASE 3: LINT WARNINGS (1 found)"));
        assert!(text.contains("     build"));
        assert!(text.contains("FIX ERRORS"));
    }

    #[test]
    fn test_render_report_syntax_error_in_phase_one() {
        let res = validate_str("on: [push\n");
        let text = render_report(&res, false, false);
        assert!(text.contains("Found 1 syntax error(s)"));
        assert!(text.contains("Workflow schema is valid"));
    }

    #[test]
    fn test_render_report_framing() {
        let text = render_report(&sample(), false, false);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], RULE);
        assert_eq!(lines[1], "WORKFLOW VALIDATION REPORT");
        assert_eq!(lines.last(), Some(&RULE));
        assert!(text.ends_with(&format!("{}\n", RULE)));
        assert!(!text.contains("     build"));
    }

    #[test]
    fn test_render_batch_no_files() {
        let batch = BatchResult::no_files(PathBuf::new(), "No YAML files matched pattern: x/*.yml");
        let text = render_batch(&batch, false, false);
        assert!(text.contains("--- Error ---"));
        assert!(text.contains("No YAML files matched pattern: x/*.yml"));
        assert!(!text.contains("Summary"));
    }

    #[test]
    fn test_render_batch_summary() {
        let mut files = BTreeMap::new();
        files.insert("ok.yml".to_string(), validate_str("on: push\njobs:\n  b:\n    runs-on: x\n"));
        let batch = BatchResult::new(PathBuf::new(), files);
        let text = render_batch(&batch, false, false);
        assert!(text.contains("--- ok.yml ---"));
        assert!(text.contains("Overall valid: ✔ (1 files)"));
    }
}
