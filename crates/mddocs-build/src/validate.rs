//! Document and list validation.
//!
//! Validators never fail on malformed content; every problem becomes a
//! [`ValidationIssue`]. Only I/O and list structure errors are returned as
//! `Err`.

use mddocs_core::prelude::*;
use mddocs_graph::{Document, ListDocument, MarkdownDocument, resolve_list};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::instrument;

/// Length of a hyphenated UUID
pub const UUID_LENGTH: usize = 36;

/// Result of checking an absolute URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlStatus {
    /// Not checked
    Unchecked,
    Ok,
    Redirect { status: u16 },
    Broken { status: Option<u16> },
}

/// Reachability check for absolute URLs
pub trait UrlChecker: Send + Sync {
    fn check(&self, url: &str) -> UrlStatus;
}

/// Accepts every URL without a request
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopUrlChecker;

impl UrlChecker for NoopUrlChecker {
    fn check(&self, _url: &str) -> UrlStatus {
        UrlStatus::Unchecked
    }
}

/// Validation rule applied to a single document
pub trait Validator: Send + Sync {
    fn validate(&self, doc: &MarkdownDocument) -> Result<ValidationReport>;

    /// Name of this validator
    fn name(&self) -> &str;
}

fn quoted(link: &Link) -> String {
    format!("`{}`", link.full)
}

fn absolute_issue(doc: &MarkdownDocument, link: &Link, status: UrlStatus) -> Option<ValidationIssue> {
    let (severity, kind, message) = match status {
        UrlStatus::Unchecked | UrlStatus::Ok => return None,
        UrlStatus::Redirect { status } => (
            Severity::Warning,
            IssueKind::Redirect,
            format!("{} ({})", quoted(link), status),
        ),
        UrlStatus::Broken { status: Some(status) } => (
            Severity::Error,
            IssueKind::BrokenAbsoluteUrl,
            format!("{} ({})", quoted(link), status),
        ),
        UrlStatus::Broken { status: None } => {
            (Severity::Error, IssueKind::BrokenAbsoluteUrl, quoted(link))
        }
    };
    Some(ValidationIssue::new(severity, kind, doc.path(), message).with_line(link.line))
}

/// Relative link targets exist; absolute URLs pass the configured checker
#[derive(Clone)]
pub struct LinkValidator {
    checker: Arc<dyn UrlChecker>,
}

impl LinkValidator {
    pub fn new() -> Self {
        Self {
            checker: Arc::new(NoopUrlChecker),
        }
    }

    pub fn with_url_checker(mut self, checker: Arc<dyn UrlChecker>) -> Self {
        self.checker = checker;
        self
    }
}

impl Default for LinkValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for LinkValidator {
    fn validate(&self, doc: &MarkdownDocument) -> Result<ValidationReport> {
        let mut report = ValidationReport::new();
        let links = doc.links()?;

        for link in &links.relative {
            let empty = link.url.trim().is_empty()
                || link.relative.as_ref().is_none_or(RelativeUrl::is_empty);
            if empty {
                report.add_issue(
                    ValidationIssue::new(
                        Severity::Error,
                        IssueKind::EmptyRelativeLink,
                        doc.path(),
                        quoted(link),
                    )
                    .with_line(link.line),
                );
                continue;
            }
            if doc.resolve_target(link).is_some_and(|target| !target.exists()) {
                report.add_issue(
                    ValidationIssue::new(
                        Severity::Error,
                        IssueKind::BrokenRelativeLink,
                        doc.path(),
                        quoted(link),
                    )
                    .with_line(link.line),
                );
            }
        }

        for link in &links.absolute {
            if let Some(issue) = absolute_issue(doc, link, self.checker.check(&link.url)) {
                report.add_issue(issue);
            }
        }

        Ok(report)
    }

    fn name(&self) -> &str {
        "LinkValidator"
    }
}

/// Images resolve, carry a caption, and HTML images have a source
#[derive(Clone)]
pub struct ImageValidator {
    checker: Arc<dyn UrlChecker>,
    require_caption: bool,
}

impl ImageValidator {
    pub fn new() -> Self {
        Self {
            checker: Arc::new(NoopUrlChecker),
            require_caption: true,
        }
    }

    pub fn with_url_checker(mut self, checker: Arc<dyn UrlChecker>) -> Self {
        self.checker = checker;
        self
    }

    pub fn require_caption(mut self, require: bool) -> Self {
        self.require_caption = require;
        self
    }
}

impl Default for ImageValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for ImageValidator {
    fn validate(&self, doc: &MarkdownDocument) -> Result<ValidationReport> {
        let mut report = ValidationReport::new();

        for image in &doc.links()?.images {
            if image.kind == LinkKind::HtmlImage && image.url.is_empty() {
                report.add_issue(
                    ValidationIssue::new(
                        Severity::Warning,
                        IssueKind::HtmlImageMissingSource,
                        doc.path(),
                        quoted(image),
                    )
                    .with_line(image.line),
                );
                continue;
            }
            if self.require_caption && image.kind == LinkKind::Image && image.text.is_none() {
                report.add_issue(
                    ValidationIssue::new(
                        Severity::Warning,
                        IssueKind::MissingCaption,
                        doc.path(),
                        quoted(image),
                    )
                    .with_line(image.line),
                );
            }

            if !image.is_relative() {
                if let Some(issue) = absolute_issue(doc, image, self.checker.check(&image.url)) {
                    report.add_issue(issue);
                }
                continue;
            }
            if doc.resolve_target(image).is_some_and(|target| !target.exists()) {
                report.add_issue(
                    ValidationIssue::new(
                        Severity::Error,
                        IssueKind::BrokenImage,
                        doc.path(),
                        quoted(image),
                    )
                    .with_line(image.line),
                );
            }
        }

        Ok(report)
    }

    fn name(&self) -> &str {
        "ImageValidator"
    }
}

/// YAML block present with a well-formed `UUID`
#[derive(Debug, Clone)]
pub struct MetadataValidator {
    require_uuid: bool,
}

impl MetadataValidator {
    pub fn new() -> Self {
        Self { require_uuid: true }
    }

    /// When disabled, a missing YAML block is only a warning and UUIDs are
    /// not checked
    pub fn require_uuid(mut self, require: bool) -> Self {
        self.require_uuid = require;
        self
    }
}

impl Default for MetadataValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for MetadataValidator {
    fn validate(&self, doc: &MarkdownDocument) -> Result<ValidationReport> {
        let mut report = ValidationReport::new();
        let path = doc.path();
        let metadata = match doc.yaml_block() {
            Ok(metadata) => metadata,
            Err(Error::MalformedYaml { line, reason, .. }) => {
                report.add_issue(
                    ValidationIssue::new(Severity::Error, IssueKind::MalformedYaml, path, reason)
                        .with_line(line),
                );
                return Ok(report);
            }
            Err(err) => return Err(err),
        };

        if !metadata.has_block() {
            let severity = if self.require_uuid {
                Severity::Error
            } else {
                Severity::Warning
            };
            report.add_issue(ValidationIssue::new(
                severity,
                IssueKind::MissingYamlBlock,
                path,
                "No YAML block",
            ));
            return Ok(report);
        }
        if !self.require_uuid {
            return Ok(report);
        }

        match metadata.uuid() {
            None => report.add_issue(
                ValidationIssue::new(Severity::Error, IssueKind::MissingUuid, path, "No UUID key")
                    .with_suggestion(format!("Add 'UUID: {}'", uuid::Uuid::new_v4())),
            ),
            Some(id) if id.is_empty() => report.add_issue(
                ValidationIssue::new(Severity::Error, IssueKind::EmptyUuid, path, "UUID is empty")
                    .with_suggestion(format!("Use {}", uuid::Uuid::new_v4())),
            ),
            Some(id) if id.len() != UUID_LENGTH || uuid::Uuid::parse_str(&id).is_err() => {
                report.add_issue(ValidationIssue::new(
                    Severity::Error,
                    IssueKind::MalformedUuid,
                    path,
                    format!("UUID '{}' is not a {}-character UUID", id, UUID_LENGTH),
                ))
            }
            Some(_) => {}
        }

        Ok(report)
    }

    fn name(&self) -> &str {
        "MetadataValidator"
    }
}

/// Runs several validators over the same document
pub struct CompositeValidator {
    validators: Vec<Box<dyn Validator>>,
}

impl CompositeValidator {
    pub fn new() -> Self {
        Self {
            validators: Vec::new(),
        }
    }

    pub fn add_validator(mut self, validator: Box<dyn Validator>) -> Self {
        self.validators.push(validator);
        self
    }

    /// Link, image and metadata rules without URL checks
    pub fn default_rules() -> Self {
        Self::new()
            .add_validator(Box::new(LinkValidator::new()))
            .add_validator(Box::new(ImageValidator::new()))
            .add_validator(Box::new(MetadataValidator::new()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.validators.iter().map(|v| v.name()).collect()
    }
}

impl Default for CompositeValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for CompositeValidator {
    fn validate(&self, doc: &MarkdownDocument) -> Result<ValidationReport> {
        let mut report = ValidationReport::new();
        for validator in &self.validators {
            report.merge(validator.validate(doc)?);
        }
        Ok(report)
    }

    fn name(&self) -> &str {
        "CompositeValidator"
    }
}

/// Validate every document in parallel and merge the findings in path order
#[instrument(skip(docs, validator), fields(documents = docs.len(), validator = validator.name()), name = "validate_documents")]
pub fn validate_documents(
    docs: &[MarkdownDocument],
    validator: &dyn Validator,
) -> Result<ValidationReport> {
    let reports = docs
        .par_iter()
        .map(|doc| validator.validate(doc))
        .collect::<Result<Vec<_>>>()?;

    let mut report: ValidationReport = reports.into_iter().flat_map(|r| r.issues).collect();
    report.sort();
    log::info!(
        "Validated {} documents: {} errors, {} warnings",
        docs.len(),
        report.summary.error_count,
        report.summary.warning_count
    );
    Ok(report)
}

/// Report every document sharing its UUID with another document. Documents
/// whose YAML does not parse are skipped; [`MetadataValidator`] reports them.
pub fn check_duplicate_uuids(docs: &[MarkdownDocument]) -> Result<ValidationReport> {
    let mut by_uuid: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    for doc in docs {
        let Some(metadata) = doc.yaml_block_lenient()? else {
            continue;
        };
        if let Some(id) = metadata.uuid().filter(|id| !id.is_empty()) {
            by_uuid.entry(id).or_default().push(doc.path().to_path_buf());
        }
    }

    let mut report = ValidationReport::new();
    for (id, paths) in by_uuid.iter().filter(|(_, paths)| paths.len() > 1) {
        for path in paths {
            let others = paths
                .iter()
                .filter(|p| *p != path)
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            report.add_issue(ValidationIssue::new(
                Severity::Error,
                IssueKind::DuplicateUuid,
                path,
                format!("UUID {} is also used by {}", id, others),
            ));
        }
    }
    Ok(report)
}

/// The default rules plus the cross-document UUID check
pub fn validate_markdown(docs: &[MarkdownDocument]) -> Result<ValidationReport> {
    let mut report = validate_documents(docs, &CompositeValidator::default_rules())?;
    report.merge(check_duplicate_uuids(docs)?);
    report.sort();
    Ok(report)
}

/// List entries that do not exist and Markdown documents no list names.
///
/// A list including itself or naming an unknown file type is an error. A
/// missing nested list is reported as a missing entry of its parent.
#[instrument(skip(lists, docs), fields(lists = lists.len(), documents = docs.len()), name = "validate_lists")]
pub fn validate_lists(lists: &[ListDocument], docs: &[MarkdownDocument]) -> Result<ValidationReport> {
    let mut report = ValidationReport::new();
    let mut listed = HashSet::new();

    for list in lists {
        match resolve_list(list.path()) {
            Ok(_) | Err(Error::FileNotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        for entry in list.entries()? {
            if !entry.path.exists() {
                report.add_issue(
                    ValidationIssue::new(
                        Severity::Error,
                        IssueKind::MissingListEntry,
                        list.path(),
                        format!("`{}` does not exist", entry.token),
                    )
                    .with_line(entry.line),
                );
            }
            listed.insert(entry.path);
        }
    }

    for doc in docs.iter().filter(|d| !listed.contains(d.path())) {
        report.add_issue(ValidationIssue::new(
            Severity::Warning,
            IssueKind::UnlistedDocument,
            doc.path(),
            "Not referenced by any list file",
        ));
    }

    report.sort();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, name: &str, text: &str) -> PathBuf {
        let path = root.join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, text).unwrap();
        path
    }

    struct StatusChecker;

    impl UrlChecker for StatusChecker {
        fn check(&self, url: &str) -> UrlStatus {
            if url.contains("moved") {
                UrlStatus::Redirect { status: 301 }
            } else if url.contains("gone") {
                UrlStatus::Broken { status: Some(404) }
            } else {
                UrlStatus::Ok
            }
        }
    }

    #[test]
    fn test_link_validator() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "b.md", "# B");
        let a = MarkdownDocument::load(write(
            root,
            "a.md",
            "[ok](b.md#x) [missing](c.md) [empty]() [here](#top)\n[web](https://moved.example) [dead](https://gone.example)",
        ))
        .unwrap();

        let report = LinkValidator::new()
            .with_url_checker(Arc::new(StatusChecker))
            .validate(&a)
            .unwrap();
        assert_eq!(report.issues_of_kind(IssueKind::BrokenRelativeLink).len(), 1);
        assert_eq!(report.issues_of_kind(IssueKind::EmptyRelativeLink).len(), 1);
        assert_eq!(report.issues_of_kind(IssueKind::Redirect).len(), 1);
        assert_eq!(report.issues_of_kind(IssueKind::BrokenAbsoluteUrl).len(), 1);
        assert_eq!(report.summary.error_count, 3);

        let quiet = LinkValidator::new().validate(&a).unwrap();
        assert_eq!(quiet.total_issues(), 2);
    }

    #[test]
    fn test_image_validator() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "img/ok.png", "");
        let doc = MarkdownDocument::load(write(
            root,
            "a.md",
            "![Fine](img/ok.png) ![](img/ok.png) ![Gone](img/no.png) <img alt=\"x\">",
        ))
        .unwrap();

        let report = ImageValidator::new().validate(&doc).unwrap();
        assert_eq!(report.issues_of_kind(IssueKind::MissingCaption).len(), 1);
        assert_eq!(report.issues_of_kind(IssueKind::BrokenImage).len(), 1);
        assert_eq!(report.issues_of_kind(IssueKind::HtmlImageMissingSource).len(), 1);
        assert!(report.has_failures());
    }

    #[test]
    fn test_metadata_validator() {
        let check = |text: &str| {
            let doc = MarkdownDocument::with_contents("/d/a.md", text.lines().map(str::to_string).collect());
            MetadataValidator::new().validate(&doc).unwrap()
        };

        assert!(check("---\nUUID: 0f8fad5b-d9cb-469f-a165-70867728950e\n---").issues.is_empty());
        assert_eq!(check("# none").issues[0].kind, IssueKind::MissingYamlBlock);
        assert_eq!(check("---\ntitle: x\n---").issues[0].kind, IssueKind::MissingUuid);
        assert_eq!(check("---\nUUID:\n---").issues[0].kind, IssueKind::EmptyUuid);
        assert_eq!(check("---\nUUID: 1234\n---").issues[0].kind, IssueKind::MalformedUuid);

        let relaxed = MetadataValidator::new()
            .require_uuid(false)
            .validate(&MarkdownDocument::with_contents("/d/a.md", vec!["# x".into()]))
            .unwrap();
        assert!(!relaxed.has_failures());
        assert_eq!(relaxed.summary.warning_count, 1);
    }

    #[test]
    fn test_duplicate_uuids() {
        let id = "---\nUUID: 0f8fad5b-d9cb-469f-a165-70867728950e\n---";
        let docs: Vec<_> = ["/d/a.md", "/d/b.md"]
            .into_iter()
            .map(|p| MarkdownDocument::with_contents(p, id.lines().map(str::to_string).collect()))
            .chain(std::iter::once(MarkdownDocument::with_contents(
                "/d/c.md",
                vec!["---".into(), "UUID: 7c9e6679-7425-40de-944b-e07fc1f90ae7".into(), "---".into()],
            )))
            .collect();

        let report = check_duplicate_uuids(&docs).unwrap();
        assert_eq!(report.total_issues(), 2);
        assert!(report.issues[0].message.contains("/d/b.md"));
    }

    #[test]
    fn test_thematic_breaks_do_not_abort_validation() {
        let lines = |text: &str| text.lines().map(str::to_string).collect::<Vec<_>>();
        let docs = vec![
            MarkdownDocument::with_contents("/d/a.md", lines("# A\n\nok")),
            MarkdownDocument::with_contents(
                "/d/b.md",
                lines("# B\n\nIntro\n\n---\n\nNote: see: this\n\n---"),
            ),
        ];

        let report = validate_markdown(&docs).unwrap();
        let malformed = report.issues_of_kind(IssueKind::MalformedYaml);
        assert_eq!(malformed.len(), 1);
        assert_eq!(malformed[0].file, PathBuf::from("/d/b.md"));
        assert_eq!(malformed[0].line, Some(4));
        assert_eq!(malformed[0].severity, Severity::Error);
        assert_eq!(report.issues_of_kind(IssueKind::MissingYamlBlock).len(), 1);

        assert_eq!(check_duplicate_uuids(&docs).unwrap().total_issues(), 0);
    }

    #[test]
    fn test_composite() {
        let composite = CompositeValidator::default_rules();
        assert_eq!(
            composite.names(),
            vec!["LinkValidator", "ImageValidator", "MetadataValidator"]
        );
        let doc = MarkdownDocument::with_contents("/nowhere/a.md", vec!["[x](y.md)".into()]);
        let report = validate_documents(std::slice::from_ref(&doc), &composite).unwrap();
        assert_eq!(report.summary.error_count, 2);
    }

    #[test]
    fn test_validate_lists() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "book.lst", "a.md\nmissing.md\nsub/sub.lst\n");
        write(root, "sub/sub.lst", "../b.md\n");
        let a = write(root, "a.md", "# A");
        let b = write(root, "b.md", "# B");
        let stray = write(root, "stray.md", "# Stray");

        let lists = vec![
            ListDocument::new(root.join("book.lst")),
            ListDocument::new(root.join("sub/sub.lst")),
        ];
        let docs: Vec<_> = [a, b, stray.clone()]
            .iter()
            .map(|p| MarkdownDocument::load(p).unwrap())
            .collect();

        let report = validate_lists(&lists, &docs).unwrap();
        let missing = report.issues_of_kind(IssueKind::MissingListEntry);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].line, Some(1));
        let unlisted = report.issues_of_kind(IssueKind::UnlistedDocument);
        assert_eq!(unlisted.len(), 1);
        assert_eq!(unlisted[0].file, stray);
    }

    #[test]
    fn test_validate_lists_rejects_cycles() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "a.lst", "b.lst\n");
        write(root, "b.lst", "a.lst\n");
        let lists = vec![ListDocument::new(root.join("a.lst"))];
        assert!(matches!(
            validate_lists(&lists, &[]),
            Err(Error::SelfReferentialList { .. })
        ));
    }
}
