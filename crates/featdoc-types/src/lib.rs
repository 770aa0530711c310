//! Core types and DTOs for featdoc.
//!
//! This crate defines the data shared by every other featdoc crate:
//! the captured suite tree, test outcomes and report statuses, annotations,
//! the filtered report records handed to renderers, and the placeholder
//! markers used to embed a report into an existing document.

use serde::{Deserialize, Serialize};

// ============================================================================
// Annotation and Option Constants
// ============================================================================

/// Annotation key whose value is rendered inline next to a test.
pub const ANNOTATION_COMMENT: &str = "comment";

/// Annotation key carrying the test classification.
pub const ANNOTATION_TEST_TYPE: &str = "test-type";

/// Classification of tests that describe user-visible behavior.
///
/// Unannotated tests are assumed to belong to this class.
pub const TEST_TYPE_BEHAVIOR: &str = "behavior";

/// Default destination document.
pub const DEFAULT_OUTPUT_FILE: &str = "FEATURES.md";

/// Default base string used to derive the embedding markers.
pub const DEFAULT_PLACEHOLDER_BASE: &str = "featdoc";

/// Start marker written by earlier releases.
pub const LEGACY_PLACEHOLDER_START: &str = "<!-- generated-features-start -->";

/// End marker written by earlier releases.
pub const LEGACY_PLACEHOLDER_END: &str = "<!-- generated-features-end -->";

/// Label of the trailing full-report link.
pub const REPORT_LINK_LABEL: &str = "Test report";

// ============================================================================
// Suite Kinds and Outcomes
// ============================================================================

/// Kind of a suite node in the result tree.
///
/// Hosts that speak their own vocabulary are accepted too: `describe` maps
/// to [`SuiteKind::Grouping`] and `project` to [`SuiteKind::Context`].
/// Anything unrecognized becomes [`SuiteKind::Other`] and is traversed
/// without contributing a heading or taking part in merges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SuiteKind {
    /// Synthetic top of the tree.
    Root,
    /// A named feature or sub-feature block.
    Grouping,
    /// A parallel execution profile boundary.
    Context,
    /// Any other structural node (e.g. a file).
    #[default]
    Other,
}

impl SuiteKind {
    /// Canonical string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            SuiteKind::Root => "root",
            SuiteKind::Grouping => "grouping",
            SuiteKind::Context => "context",
            SuiteKind::Other => "other",
        }
    }
}

impl From<&str> for SuiteKind {
    fn from(value: &str) -> Self {
        match value {
            "root" => SuiteKind::Root,
            "grouping" | "describe" => SuiteKind::Grouping,
            "context" | "project" => SuiteKind::Context,
            _ => SuiteKind::Other,
        }
    }
}

impl From<String> for SuiteKind {
    fn from(value: String) -> Self {
        SuiteKind::from(value.as_str())
    }
}

impl From<SuiteKind> for String {
    fn from(kind: SuiteKind) -> Self {
        kind.as_str().to_string()
    }
}

/// Raw execution outcome of a test, as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Outcome {
    Skipped,
    Expected,
    Unexpected,
    Flaky,
    /// An outcome this version does not know; kept verbatim.
    Unknown(String),
}

impl Outcome {
    /// String form as used by the host.
    pub fn as_str(&self) -> &str {
        match self {
            Outcome::Skipped => "skipped",
            Outcome::Expected => "expected",
            Outcome::Unexpected => "unexpected",
            Outcome::Flaky => "flaky",
            Outcome::Unknown(raw) => raw,
        }
    }

    /// Map the raw outcome to the status shown in the report.
    ///
    /// Flaky tests count as failed: a feature that only sometimes works does
    /// not behave as expected.
    ///
    /// ```
    /// use featdoc_types::{Outcome, Status};
    ///
    /// assert_eq!(Outcome::Expected.status(), Status::Passed);
    /// assert_eq!(Outcome::Flaky.status(), Status::Failed);
    /// ```
    pub fn status(&self) -> Status {
        match self {
            Outcome::Skipped => Status::Skipped,
            Outcome::Expected => Status::Passed,
            Outcome::Unexpected | Outcome::Flaky => Status::Failed,
            Outcome::Unknown(raw) => Status::Unknown(raw.clone()),
        }
    }
}

impl From<&str> for Outcome {
    fn from(value: &str) -> Self {
        match value {
            "skipped" => Outcome::Skipped,
            "expected" => Outcome::Expected,
            "unexpected" => Outcome::Unexpected,
            "flaky" => Outcome::Flaky,
            other => Outcome::Unknown(other.to_string()),
        }
    }
}

impl From<String> for Outcome {
    fn from(value: String) -> Self {
        Outcome::from(value.as_str())
    }
}

impl From<Outcome> for String {
    fn from(outcome: Outcome) -> Self {
        outcome.as_str().to_string()
    }
}

/// Status of a feature in the report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    Passed,
    Failed,
    Skipped,
    /// Carried over from an unknown outcome.
    Unknown(String),
}

impl Status {
    pub fn as_str(&self) -> &str {
        match self {
            Status::Passed => "passed",
            Status::Failed => "failed",
            Status::Skipped => "skipped",
            Status::Unknown(raw) => raw,
        }
    }
}

impl From<String> for Status {
    fn from(value: String) -> Self {
        match value.as_str() {
            "passed" => Status::Passed,
            "failed" => Status::Failed,
            "skipped" => Status::Skipped,
            _ => Status::Unknown(value),
        }
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        status.as_str().to_string()
    }
}

// ============================================================================
// Annotations
// ============================================================================

/// A keyed label attached to a test.
///
/// Hosts commonly serialize annotations as `{ "type": .., "description": .. }`;
/// both that shape and `{ "key": .., "value": .. }` are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(alias = "type")]
    pub key: String,
    #[serde(default, alias = "description", skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Annotation {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
        }
    }
}

/// Look up the payload of the first annotation with the given key.
///
/// Later annotations with the same key are ignored, even when the first one
/// carries no value.
///
/// ```
/// use featdoc_types::{Annotation, lookup_annotation};
///
/// let annotations = vec![
///     Annotation::new("comment", "first"),
///     Annotation::new("comment", "second"),
/// ];
/// assert_eq!(lookup_annotation(&annotations, "comment"), Some("first"));
/// assert_eq!(lookup_annotation(&annotations, "test-type"), None);
/// ```
pub fn lookup_annotation<'a>(annotations: &'a [Annotation], key: &str) -> Option<&'a str> {
    annotations
        .iter()
        .find(|annotation| annotation.key == key)
        .and_then(|annotation| annotation.value.as_deref())
}

// ============================================================================
// Captured Result Tree
// ============================================================================

/// A test case captured from the host, with its outcome already resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestNode {
    pub title: String,
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl TestNode {
    pub fn new(title: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            title: title.into(),
            outcome,
            annotations: Vec::new(),
        }
    }

    /// Add an annotation.
    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.push(Annotation::new(key, value));
        self
    }

    /// Payload of the first annotation with `key`.
    pub fn annotation(&self, key: &str) -> Option<&str> {
        lookup_annotation(&self.annotations, key)
    }
}

/// A suite captured from the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteNode {
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "type")]
    pub kind: SuiteKind,
    #[serde(default, alias = "children")]
    pub suites: Vec<SuiteNode>,
    #[serde(default)]
    pub tests: Vec<TestNode>,
}

impl SuiteNode {
    pub fn new(kind: SuiteKind, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind,
            suites: Vec::new(),
            tests: Vec::new(),
        }
    }

    /// An untitled root suite.
    pub fn root() -> Self {
        Self::new(SuiteKind::Root, "")
    }

    /// A feature block.
    pub fn grouping(title: impl Into<String>) -> Self {
        Self::new(SuiteKind::Grouping, title)
    }

    /// A parallel execution profile.
    pub fn context(title: impl Into<String>) -> Self {
        Self::new(SuiteKind::Context, title)
    }

    pub fn with_suite(mut self, suite: SuiteNode) -> Self {
        self.suites.push(suite);
        self
    }

    pub fn with_test(mut self, test: TestNode) -> Self {
        self.tests.push(test);
        self
    }

    /// Total number of tests in this subtree.
    pub fn test_count(&self) -> usize {
        self.tests.len() + self.suites.iter().map(SuiteNode::test_count).sum::<usize>()
    }
}

// ============================================================================
// Report Records
// ============================================================================

/// A test as it appears in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTest {
    pub title: String,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(
        default,
        rename = "testType",
        skip_serializing_if = "Option::is_none"
    )]
    pub test_type: Option<String>,
}

/// A suite that survived filtering.
///
/// `transparent` suites do not open a heading; their tests and children are
/// rendered at the enclosing level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSuite {
    pub title: String,
    pub transparent: bool,
    pub suites: Vec<ReportSuite>,
    pub tests: Vec<ReportTest>,
}

impl ReportSuite {
    /// Number of tests in this subtree.
    pub fn test_count(&self) -> usize {
        self.tests.len() + self.suites.iter().map(ReportSuite::test_count).sum::<usize>()
    }
}

// ============================================================================
// Placeholders
// ============================================================================

/// A start/end marker pair delimiting the embedded report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholders {
    pub start: String,
    pub end: String,
}

impl Placeholders {
    /// Derive the marker pair from a base string.
    ///
    /// ```
    /// use featdoc_types::Placeholders;
    ///
    /// let markers = Placeholders::from_base("featdoc");
    /// assert_eq!(markers.start, "<!-- featdoc--start -->");
    /// assert_eq!(markers.end, "<!-- featdoc--end -->");
    /// ```
    pub fn from_base(base: &str) -> Self {
        Self {
            start: format!("<!-- {}--start -->", base),
            end: format!("<!-- {}--end -->", base),
        }
    }

    /// The marker pair written by earlier releases.
    pub fn legacy() -> Self {
        Self {
            start: LEGACY_PLACEHOLDER_START.to_string(),
            end: LEGACY_PLACEHOLDER_END.to_string(),
        }
    }
}

impl Default for Placeholders {
    fn default() -> Self {
        Self::from_base(DEFAULT_PLACEHOLDER_BASE)
    }
}

// ============================================================================
// Host Run Information
// ============================================================================

/// Host configuration handed over at the start of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Root directory of the host's test project, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_dir: Option<String>,
    /// Number of parallel workers the host used.
    #[serde(default)]
    pub workers: u32,
}

/// Overall status of a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    #[default]
    Passed,
    Failed,
    Timedout,
    Interrupted,
}

/// Result handed over at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub status: RunStatus,
}

// ============================================================================
// Tests
// ============================================================================
