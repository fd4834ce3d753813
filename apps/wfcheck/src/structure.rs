//! Structural summary of a parsed workflow.

use crate::models::document::Node;
use crate::models::WorkflowStructure;
use std::collections::BTreeSet;

/// Summarize top-level facts. Non-mapping roots yield an empty summary.
pub fn summarize(doc: &Node) -> WorkflowStructure {
    let Some(root) = doc.as_mapping() else {
        return WorkflowStructure::default();
    };

    let jobs = root.get("jobs").and_then(Node::as_mapping);
    let job_permissions = jobs.is_some_and(|jobs| {
        jobs.iter().any(|(_, job)| {
            job.as_mapping()
                .is_some_and(|j| j.contains_key("permissions"))
        })
    });

    let mut job_ids: Vec<String> = jobs
        .map(|jobs| jobs.keys().map(str::to_string).collect())
        .unwrap_or_default();
    job_ids.sort();

    WorkflowStructure {
        has_name: root.get("name").and_then(Node::as_str).is_some(),
        has_on: root.contains_key("on"),
        has_jobs: root.contains_key("jobs"),
        has_env: root.contains_key("env"),
        has_permissions: root.contains_key("permissions") || job_permissions,
        job_count: job_ids.len(),
        jobs: job_ids,
        triggers: triggers(root.get("on")),
    }
}

/// Distinct trigger names from the string, list, or mapping form of `on`.
fn triggers(on: Option<&Node>) -> Vec<String> {
    let mut names: BTreeSet<String> = BTreeSet::new();
    match on {
        Some(node @ Node::Scalar(_)) => {
            if let Some(name) = node.as_str() {
                names.insert(name.to_string());
            }
        }
        Some(Node::Sequence(items)) => {
            for item in items {
                if let Node::Scalar(s) = item {
                    names.insert(s.to_string());
                }
            }
        }
        Some(Node::Mapping(events)) => {
            names.extend(events.keys().map(str::to_string));
        }
        None => {}
    }
    names.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_document;

    fn summary(text: &str) -> WorkflowStructure {
        summarize(&parse_document(text).unwrap())
    }

    #[test]
    fn test_summary_of_multi_job_workflow() {
        let s = summary(
            "name: Multi\non:\n  push:\n    branches: [main]\n  pull_request:\njobs:\n  lint:\n    runs-on: x\n  build:\n    runs-on: x\n  deploy:\n    runs-on: x\n",
        );
        assert!(s.has_name && s.has_on && s.has_jobs);
        assert!(!s.has_env && !s.has_permissions);
        assert_eq!(s.job_count, 3);
        assert_eq!(s.jobs, vec!["build", "deploy", "lint"]);
        assert_eq!(s.triggers, vec!["pull_request", "push"]);
    }

    #[test]
    fn test_trigger_forms() {
        assert_eq!(summary("on: push\n").triggers, vec!["push"]);
        assert_eq!(
            summary("on: [push, push, workflow_dispatch]\n").triggers,
            vec!["push", "workflow_dispatch"]
        );
        assert!(summary("on: 3\n").triggers.is_empty());
    }

    #[test]
    fn test_job_level_permissions_count() {
        let s = summary("on: push\njobs:\n  d:\n    runs-on: x\n    permissions:\n      contents: write\n");
        assert!(s.has_permissions);
    }

    #[test]
    fn test_absent_and_empty_jobs_differ() {
        let absent = summary("on: push\n");
        assert!(!absent.has_jobs);
        assert_eq!(absent.job_count, 0);

        let bare = summary("on: push\njobs:\n");
        assert!(bare.has_jobs);
        assert_eq!(bare.job_count, 0);
        assert!(bare.jobs.is_empty());
    }

    #[test]
    fn test_name_must_be_a_string() {
        assert!(!summary("name: [a]\non: push\n").has_name);
    }

    #[test]
    fn test_non_mapping_root() {
        assert_eq!(summary("- a\n"), WorkflowStructure::default());
    }
}
