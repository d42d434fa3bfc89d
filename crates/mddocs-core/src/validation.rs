//! Validation findings.
//!
//! Recoverable problems are reported as [`ValidationIssue`]s collected into a
//! [`ValidationReport`]. Validators live with the document model; this module
//! only defines the vocabulary they report in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Severity level for validation issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    /// Informational message (not a problem)
    Info,
    /// Warning (should be addressed but not critical)
    Warning,
    /// Error (should be fixed)
    Error,
}

impl Severity {
    /// Check if this severity is considered a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Error)
    }
}

/// What kind of problem an issue describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueKind {
    EmptyRelativeLink,
    BrokenRelativeLink,
    BrokenAbsoluteUrl,
    Redirect,
    BrokenImage,
    MissingCaption,
    HtmlImageMissingSource,
    AssetNameCollision,
    MissingYamlBlock,
    MalformedYaml,
    MissingUuid,
    EmptyUuid,
    MalformedUuid,
    DuplicateUuid,
    MissingListEntry,
    UnlistedDocument,
    RepairCandidate,
}

impl IssueKind {
    /// Short human label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            Self::EmptyRelativeLink => "Empty - Relative Link",
            Self::BrokenRelativeLink => "Broken - Relative Link",
            Self::BrokenAbsoluteUrl => "Broken - Absolute URL",
            Self::Redirect => "Redirect",
            Self::BrokenImage => "Broken - Relative Image Link",
            Self::MissingCaption => "Image Missing Caption",
            Self::HtmlImageMissingSource => "HTML Image Missing Source",
            Self::AssetNameCollision => "Asset Name Collision",
            Self::MissingYamlBlock => "Missing YAML Block",
            Self::MalformedYaml => "Malformed YAML Block",
            Self::MissingUuid => "Missing UUID",
            Self::EmptyUuid => "Empty UUID",
            Self::MalformedUuid => "Malformed UUID",
            Self::DuplicateUuid => "Duplicate UUID",
            Self::MissingListEntry => "Missing LST Entry",
            Self::UnlistedDocument => "Unlisted Document",
            Self::RepairCandidate => "Repair Candidate",
        }
    }
}

/// A validation issue found in a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub kind: IssueKind,
    /// Document the issue was found in
    pub file: PathBuf,
    /// 0-based line number, when the issue is tied to a line
    pub line: Option<usize>,
    pub message: String,
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    /// Create a new validation issue
    pub fn new(
        severity: Severity,
        kind: IssueKind,
        file: impl Into<PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            kind,
            file: file.into(),
            line: None,
            message: message.into(),
            suggestion: None,
        }
    }

    /// Set the line number
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Set a suggested fix
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{}", line + 1)?;
        }
        write!(f, " [{}] {}", self.kind.label(), self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " ({})", suggestion)?;
        }
        Ok(())
    }
}

/// Aggregated result of a validation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Whether validation passed (no errors)
    pub passed: bool,
    pub issues: Vec<ValidationIssue>,
    pub summary: ValidationSummary,
}

/// Summary of validation results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub info_count: usize,
    pub warning_count: usize,
    pub error_count: usize,
}

impl ValidationReport {
    /// Create a new validation report
    pub fn new() -> Self {
        Self {
            passed: true,
            issues: Vec::new(),
            summary: ValidationSummary::default(),
        }
    }

    /// Add an issue to the report
    pub fn add_issue(&mut self, issue: ValidationIssue) {
        match issue.severity {
            Severity::Info => self.summary.info_count += 1,
            Severity::Warning => self.summary.warning_count += 1,
            Severity::Error => {
                self.summary.error_count += 1;
                self.passed = false;
            }
        }

        self.issues.push(issue);
    }

    /// Merge another report into this one
    pub fn merge(&mut self, other: ValidationReport) {
        for issue in other.issues {
            self.add_issue(issue);
        }
    }

    /// Order issues by file, then line. Parallel validation aggregates in
    /// completion order, so reports are sorted before display.
    pub fn sort(&mut self) {
        self.issues
            .sort_by(|a, b| (&a.file, a.line).cmp(&(&b.file, b.line)));
    }

    /// Get issues by severity
    pub fn issues_by_severity(&self, severity: Severity) -> Vec<&ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == severity)
            .collect()
    }

    /// Get issues of one kind
    pub fn issues_of_kind(&self, kind: IssueKind) -> Vec<&ValidationIssue> {
        self.issues.iter().filter(|i| i.kind == kind).collect()
    }

    /// Check if there are any failures
    pub fn has_failures(&self) -> bool {
        !self.passed
    }

    /// Total issue count
    pub fn total_issues(&self) -> usize {
        self.issues.len()
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<ValidationIssue> for ValidationReport {
    fn from_iter<I: IntoIterator<Item = ValidationIssue>>(iter: I) -> Self {
        let mut report = Self::new();
        for issue in iter {
            report.add_issue(issue);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts_and_failure() {
        let mut report = ValidationReport::new();
        report.add_issue(ValidationIssue::new(
            Severity::Warning,
            IssueKind::MissingCaption,
            "a.md",
            "no caption",
        ));
        assert!(report.passed);

        report.add_issue(
            ValidationIssue::new(
                Severity::Error,
                IssueKind::BrokenRelativeLink,
                "a.md",
                "[x](y.md)",
            )
            .with_line(2),
        );
        assert!(report.has_failures());
        assert_eq!(report.summary.warning_count, 1);
        assert_eq!(report.summary.error_count, 1);
        assert_eq!(report.issues_of_kind(IssueKind::MissingCaption).len(), 1);
    }

    #[test]
    fn test_sort_orders_by_file_then_line() {
        let mut report: ValidationReport = [
            ValidationIssue::new(Severity::Info, IssueKind::Redirect, "b.md", "x").with_line(1),
            ValidationIssue::new(Severity::Info, IssueKind::Redirect, "a.md", "x").with_line(5),
            ValidationIssue::new(Severity::Info, IssueKind::Redirect, "a.md", "x").with_line(0),
        ]
        .into_iter()
        .collect();
        report.sort();

        let order: Vec<_> = report
            .issues
            .iter()
            .map(|i| (i.file.to_string_lossy().to_string(), i.line))
            .collect();
        assert_eq!(
            order,
            vec![
                ("a.md".to_string(), Some(0)),
                ("a.md".to_string(), Some(5)),
                ("b.md".to_string(), Some(1)),
            ]
        );
    }

    #[test]
    fn test_display_is_one_based() {
        let issue = ValidationIssue::new(
            Severity::Error,
            IssueKind::BrokenRelativeLink,
            "a.md",
            "[x](y.md)",
        )
        .with_line(0)
        .with_suggestion("did you mean ../y.md?");
        let text = issue.to_string();
        assert!(text.starts_with("a.md:1 [Broken - Relative Link]"));
        assert!(text.ends_with("(did you mean ../y.md?)"));
    }
}
