//! Pure domain logic for featdoc.
//!
//! This crate has no side effects. It takes the captured suite tree and:
//! 1. Merges same-titled feature groupings into one node
//! 2. Filters the merged tree down to what the report shows
//! 3. Resolves the extra list depth encoded in test titles

use std::collections::{HashMap, HashSet};

use featdoc_types::{
    ANNOTATION_COMMENT, ANNOTATION_TEST_TYPE, ReportSuite, ReportTest, SuiteKind, SuiteNode,
    TEST_TYPE_BEHAVIOR, TestNode,
};

// ============================================================================
// Merging
// ============================================================================

/// How grouping titles are matched while merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeScope {
    /// One title table for the whole tree.
    #[default]
    Global,
    /// Every context starts a fresh title table for its subtree.
    PerContext,
}

impl MergeScope {
    /// Scope matching the projects option: reported projects keep their own
    /// features, unreported ones are folded together.
    pub fn for_projects(report_projects: bool) -> Self {
        if report_projects {
            MergeScope::PerContext
        } else {
            MergeScope::Global
        }
    }
}

struct MergeNode {
    title: String,
    kind: SuiteKind,
    tests: Vec<TestNode>,
    children: Vec<usize>,
}

struct Merger {
    nodes: Vec<MergeNode>,
    scope: MergeScope,
}

/// Merge groupings that share a title.
///
/// The tree is walked depth-first, parents before children. The first
/// grouping seen with a given title becomes the canonical node; every later
/// grouping with that title hands its tests and child suites to it (appended
/// after the canonical node's own content) and disappears from its original
/// position. Moved children are visited too, so they merge in turn.
///
/// Only groupings take part. Contexts, roots and other nodes are never merged,
/// though their descendants are.
pub fn merge_suites(root: SuiteNode, scope: MergeScope) -> SuiteNode {
    let mut merger = Merger {
        nodes: Vec::new(),
        scope,
    };
    let mut titles = HashMap::new();
    let root_id = merger.visit(root, None, &mut titles);
    merger.build(root_id)
}

impl Merger {
    fn visit(
        &mut self,
        suite: SuiteNode,
        parent: Option<usize>,
        titles: &mut HashMap<String, usize>,
    ) -> usize {
        let SuiteNode {
            title,
            kind,
            suites,
            tests,
        } = suite;

        let canonical = match kind {
            SuiteKind::Grouping => titles.get(&title).copied(),
            _ => None,
        };

        let target = match canonical {
            Some(id) => {
                self.nodes[id].tests.extend(tests);
                id
            }
            None => {
                let id = self.nodes.len();
                if kind == SuiteKind::Grouping {
                    titles.insert(title.clone(), id);
                }
                self.nodes.push(MergeNode {
                    title,
                    kind,
                    tests,
                    children: Vec::new(),
                });
                if let Some(parent) = parent {
                    self.nodes[parent].children.push(id);
                }
                id
            }
        };

        if kind == SuiteKind::Context && self.scope == MergeScope::PerContext {
            let mut scoped = HashMap::new();
            for child in suites {
                self.visit(child, Some(target), &mut scoped);
            }
        } else {
            for child in suites {
                self.visit(child, Some(target), titles);
            }
        }

        target
    }

    fn build(&mut self, id: usize) -> SuiteNode {
        let node = &mut self.nodes[id];
        let title = std::mem::take(&mut node.title);
        let kind = node.kind;
        let tests = std::mem::take(&mut node.tests);
        let children = std::mem::take(&mut node.children);

        SuiteNode {
            title,
            kind,
            suites: children.into_iter().map(|child| self.build(child)).collect(),
            tests,
        }
    }
}

// ============================================================================
// Visibility
// ============================================================================

/// Options controlling which nodes the report shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visibility {
    /// Show contexts as headings and keep every context, not just the first.
    pub report_projects: bool,
    /// Classification treated as behavioral.
    pub behavior_test_type: String,
}

impl Default for Visibility {
    fn default() -> Self {
        Self {
            report_projects: false,
            behavior_test_type: TEST_TYPE_BEHAVIOR.to_string(),
        }
    }
}

/// Whether a test shows up in the report.
///
/// Tests without a classification are behavioral. A classification without a
/// value does not exclude the test.
pub fn is_test_visible(test: &TestNode, behavior_test_type: &str) -> bool {
    match test.annotation(ANNOTATION_TEST_TYPE) {
        Some(test_type) => test_type == behavior_test_type,
        None => true,
    }
}

/// Whether a node of this kind opens a heading in the report.
pub fn opens_heading(kind: SuiteKind, report_projects: bool) -> bool {
    match kind {
        SuiteKind::Grouping => true,
        SuiteKind::Context => report_projects,
        SuiteKind::Root | SuiteKind::Other => false,
    }
}

/// Builds the report tree from a merged suite tree.
///
/// The filter is stateful: it counts the contexts it has encountered in
/// document order, so one filter serves exactly one tree.
#[derive(Debug)]
pub struct ReportFilter<'a> {
    visibility: &'a Visibility,
    contexts_seen: usize,
}

impl<'a> ReportFilter<'a> {
    pub fn new(visibility: &'a Visibility) -> Self {
        Self {
            visibility,
            contexts_seen: 0,
        }
    }

    /// Number of contexts encountered so far, including skipped ones.
    pub fn contexts_seen(&self) -> usize {
        self.contexts_seen
    }

    /// Filter a suite, returning `None` when nothing in it is visible.
    ///
    /// Unless projects are reported, only the first context is kept; later
    /// contexts are dropped with their whole subtree. A suite survives only if
    /// it has a visible test or a surviving child.
    pub fn filter(&mut self, suite: &SuiteNode) -> Option<ReportSuite> {
        if suite.kind == SuiteKind::Context {
            self.contexts_seen += 1;
            if !self.visibility.report_projects && self.contexts_seen > 1 {
                return None;
            }
        }

        let tests = self.visible_tests(&suite.tests);
        let suites: Vec<ReportSuite> = suite
            .suites
            .iter()
            .filter_map(|child| self.filter(child))
            .collect();

        if tests.is_empty() && suites.is_empty() {
            return None;
        }

        Some(ReportSuite {
            title: suite.title.clone(),
            transparent: !opens_heading(suite.kind, self.visibility.report_projects),
            suites,
            tests,
        })
    }

    fn visible_tests(&self, tests: &[TestNode]) -> Vec<ReportTest> {
        let mut seen = HashSet::new();
        tests
            .iter()
            .filter(|test| is_test_visible(test, &self.visibility.behavior_test_type))
            .filter(|test| seen.insert(test.title.as_str()))
            .map(report_test)
            .collect()
    }
}

/// Filter a merged tree with a fresh [`ReportFilter`].
pub fn filter_report(root: &SuiteNode, visibility: &Visibility) -> Option<ReportSuite> {
    ReportFilter::new(visibility).filter(root)
}

fn report_test(test: &TestNode) -> ReportTest {
    ReportTest {
        title: test.title.clone(),
        status: test.outcome.status(),
        comment: test
            .annotation(ANNOTATION_COMMENT)
            .filter(|comment| !comment.is_empty())
            .map(str::to_string),
        test_type: test.annotation(ANNOTATION_TEST_TYPE).map(str::to_string),
    }
}

// ============================================================================
// Title Depth
// ============================================================================

/// Character repeated at the start of a title to nest it deeper.
pub const DEPTH_MARKER: char = '-';

/// A test title with its encoded extra depth removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTitle<'a> {
    /// Additional list levels requested by the title.
    pub extra_depth: usize,
    /// Title as displayed.
    pub title: &'a str,
}

/// Split the leading depth markers off a test title.
///
/// One or more `-` followed by a space request one extra list level per dash.
/// Titles without that exact prefix are returned unchanged.
///
/// ```
/// use featdoc_domain::resolve_depth;
///
/// let nested = resolve_depth("-- sub case");
/// assert_eq!(nested.extra_depth, 2);
/// assert_eq!(nested.title, "sub case");
///
/// let plain = resolve_depth("-sub case");
/// assert_eq!(plain.extra_depth, 0);
/// assert_eq!(plain.title, "-sub case");
/// ```
pub fn resolve_depth(title: &str) -> ResolvedTitle<'_> {
    let markers = title.len() - title.trim_start_matches(DEPTH_MARKER).len();
    match title[markers..].strip_prefix(' ') {
        Some(rest) if markers > 0 => ResolvedTitle {
            extra_depth: markers,
            title: rest,
        },
        _ => ResolvedTitle {
            extra_depth: 0,
            title,
        },
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use featdoc_types::{Outcome, Status};

    fn passing(title: &str) -> TestNode {
        TestNode::new(title, Outcome::Expected)
    }

    fn titles(suite: &SuiteNode) -> Vec<&str> {
        suite.tests.iter().map(|t| t.title.as_str()).collect()
    }

    // ========================================================================
    // merge_suites tests
    // ========================================================================

    #[test]
    fn test_merge_without_duplicates_is_noop() {
        let tree = SuiteNode::root()
            .with_suite(
                SuiteNode::grouping("Feature title")
                    .with_test(passing("case title"))
                    .with_suite(SuiteNode::grouping("Subfeature title").with_test(passing("a"))),
            )
            .with_suite(SuiteNode::grouping("Other feature").with_test(passing("b")));

        assert_eq!(merge_suites(tree.clone(), MergeScope::Global), tree);
    }

    #[test]
    fn test_merge_siblings_with_same_title() {
        let tree = SuiteNode::root()
            .with_suite(SuiteNode::grouping("Feature title").with_test(passing("case title")))
            .with_suite(SuiteNode::grouping("Feature title").with_test(passing("case 2 title")));

        let merged = merge_suites(tree, MergeScope::Global);

        assert_eq!(merged.suites.len(), 1);
        assert_eq!(titles(&merged.suites[0]), vec!["case title", "case 2 title"]);
    }

    #[test]
    fn test_merge_across_contexts() {
        let tree = SuiteNode::root()
            .with_suite(
                SuiteNode::context("project1")
                    .with_suite(SuiteNode::grouping("Feature title").with_test(passing("one"))),
            )
            .with_suite(
                SuiteNode::context("project2")
                    .with_suite(SuiteNode::grouping("Feature title").with_test(passing("two"))),
            );

        let merged = merge_suites(tree, MergeScope::Global);

        assert_eq!(merged.suites.len(), 2, "contexts are never merged");
        assert_eq!(titles(&merged.suites[0].suites[0]), vec!["one", "two"]);
        assert!(merged.suites[1].suites.is_empty());
    }

    #[test]
    fn test_merge_per_context_keeps_projects_apart() {
        let tree = SuiteNode::root()
            .with_suite(
                SuiteNode::context("project1")
                    .with_suite(SuiteNode::grouping("Feature title").with_test(passing("one"))),
            )
            .with_suite(
                SuiteNode::context("project2")
                    .with_suite(SuiteNode::grouping("Feature title").with_test(passing("two"))),
            );

        let merged = merge_suites(tree, MergeScope::PerContext);

        assert_eq!(titles(&merged.suites[0].suites[0]), vec!["one"]);
        assert_eq!(titles(&merged.suites[1].suites[0]), vec!["two"]);
    }

    #[test]
    fn test_same_titled_contexts_stay_isolated() {
        let tree = SuiteNode::root()
            .with_suite(SuiteNode::context("chromium").with_test(passing("a")))
            .with_suite(SuiteNode::context("chromium").with_test(passing("b")));

        let merged = merge_suites(tree, MergeScope::Global);
        assert_eq!(merged.suites.len(), 2);
    }

    #[test]
    fn test_merge_folds_moved_children() {
        let tree = SuiteNode::root()
            .with_suite(
                SuiteNode::grouping("Feature")
                    .with_suite(SuiteNode::grouping("Sub").with_test(passing("a"))),
            )
            .with_suite(
                SuiteNode::grouping("Feature")
                    .with_suite(SuiteNode::grouping("Sub").with_test(passing("b"))),
            );

        let merged = merge_suites(tree, MergeScope::Global);

        let feature = &merged.suites[0];
        assert_eq!(merged.suites.len(), 1);
        assert_eq!(feature.suites.len(), 1);
        assert_eq!(titles(&feature.suites[0]), vec!["a", "b"]);
    }

    #[test]
    fn test_merge_across_different_parents() {
        let tree = SuiteNode::root()
            .with_suite(
                SuiteNode::grouping("Parent A")
                    .with_suite(SuiteNode::grouping("Shared").with_test(passing("a"))),
            )
            .with_suite(
                SuiteNode::grouping("Parent B")
                    .with_test(passing("own"))
                    .with_suite(SuiteNode::grouping("Shared").with_test(passing("b"))),
            );

        let merged = merge_suites(tree, MergeScope::Global);

        assert_eq!(titles(&merged.suites[0].suites[0]), vec!["a", "b"]);
        assert!(merged.suites[1].suites.is_empty());
        assert_eq!(titles(&merged.suites[1]), vec!["own"]);
    }

    #[test]
    fn test_merge_with_grouping_root() {
        let tree = SuiteNode::grouping("Feature title")
            .with_test(passing("a"))
            .with_suite(SuiteNode::grouping("Feature title").with_test(passing("b")));

        let merged = merge_suites(tree, MergeScope::Global);

        assert_eq!(merged.title, "Feature title");
        assert!(merged.suites.is_empty());
        assert_eq!(titles(&merged), vec!["a", "b"]);
    }

    // ========================================================================
    // Visibility tests
    // ========================================================================

    #[test]
    fn test_unannotated_test_is_visible() {
        assert!(is_test_visible(&passing("a"), TEST_TYPE_BEHAVIOR));
    }

    #[test]
    fn test_non_behavioral_test_is_hidden() {
        let behavioral = passing("a").with_annotation(ANNOTATION_TEST_TYPE, TEST_TYPE_BEHAVIOR);
        let compatibility = passing("b").with_annotation(ANNOTATION_TEST_TYPE, "compatibility");

        assert!(is_test_visible(&behavioral, TEST_TYPE_BEHAVIOR));
        assert!(!is_test_visible(&compatibility, TEST_TYPE_BEHAVIOR));
        assert!(is_test_visible(&compatibility, "compatibility"));
    }

    #[test]
    fn test_opens_heading() {
        assert!(opens_heading(SuiteKind::Grouping, false));
        assert!(!opens_heading(SuiteKind::Context, false));
        assert!(opens_heading(SuiteKind::Context, true));
        assert!(!opens_heading(SuiteKind::Root, true));
        assert!(!opens_heading(SuiteKind::Other, true));
    }

    #[test]
    fn test_grouping_with_only_hidden_tests_is_dropped() {
        let tree = SuiteNode::root()
            .with_suite(
                SuiteNode::grouping("Feature title")
                    .with_test(passing("a").with_annotation(ANNOTATION_TEST_TYPE, "compatibility"))
                    .with_test(passing("b").with_annotation(ANNOTATION_TEST_TYPE, "regression")),
            );

        assert_eq!(filter_report(&tree, &Visibility::default()), None);
    }

    #[test]
    fn test_empty_child_grouping_is_dropped() {
        let tree = SuiteNode::grouping("Feature title")
            .with_test(passing("a"))
            .with_suite(SuiteNode::grouping("Empty"));

        let report = filter_report(&tree, &Visibility::default()).unwrap();
        assert!(report.suites.is_empty());
        assert_eq!(report.tests.len(), 1);
        assert!(!report.transparent);
    }

    #[test]
    fn test_duplicate_test_titles_keep_first() {
        let tree = SuiteNode::grouping("Feature title")
            .with_test(passing("case title"))
            .with_test(TestNode::new("case title", Outcome::Unexpected))
            .with_test(passing("other"));

        let report = filter_report(&tree, &Visibility::default()).unwrap();

        assert_eq!(report.tests.len(), 2);
        assert_eq!(report.tests[0].status, Status::Passed);
        assert_eq!(report.tests[1].title, "other");
    }

    #[test]
    fn test_only_first_context_is_kept() {
        let tree = SuiteNode::root()
            .with_suite(
                SuiteNode::context("project1")
                    .with_suite(SuiteNode::grouping("A").with_test(passing("a"))),
            )
            .with_suite(
                SuiteNode::context("project2")
                    .with_suite(SuiteNode::grouping("B").with_test(passing("b"))),
            );

        let visibility = Visibility::default();
        let mut filter = ReportFilter::new(&visibility);
        let report = filter.filter(&tree).unwrap();

        assert_eq!(filter.contexts_seen(), 2);
        assert_eq!(report.suites.len(), 1);
        assert!(report.suites[0].transparent);
        assert_eq!(report.suites[0].suites[0].title, "A");
    }

    #[test]
    fn test_all_contexts_kept_when_reporting_projects() {
        let tree = SuiteNode::root()
            .with_suite(SuiteNode::context("project1").with_test(passing("a")))
            .with_suite(SuiteNode::context("project2").with_test(passing("b")));

        let visibility = Visibility {
            report_projects: true,
            ..Visibility::default()
        };
        let report = filter_report(&tree, &visibility).unwrap();

        assert!(report.transparent);
        assert_eq!(report.suites.len(), 2);
        assert!(!report.suites[1].transparent);
    }

    #[test]
    fn test_report_test_carries_annotations() {
        let tree = SuiteNode::grouping("Feature").with_test(
            passing("a")
                .with_annotation(ANNOTATION_COMMENT, "needs login")
                .with_annotation(ANNOTATION_TEST_TYPE, TEST_TYPE_BEHAVIOR),
        );

        let report = filter_report(&tree, &Visibility::default()).unwrap();
        let test = &report.tests[0];
        assert_eq!(test.comment.as_deref(), Some("needs login"));
        assert_eq!(test.test_type.as_deref(), Some(TEST_TYPE_BEHAVIOR));
    }

    #[test]
    fn test_empty_comment_is_dropped() {
        let tree = SuiteNode::grouping("Feature")
            .with_test(passing("a").with_annotation(ANNOTATION_COMMENT, ""));

        let report = filter_report(&tree, &Visibility::default()).unwrap();
        assert_eq!(report.tests[0].comment, None);
    }

    #[test]
    fn test_unknown_kind_is_pass_through() {
        let tree = SuiteNode::root().with_suite(
            SuiteNode::new(SuiteKind::Other, "spec.ts")
                .with_suite(SuiteNode::grouping("Feature").with_test(passing("a"))),
        );

        let report = filter_report(&tree, &Visibility::default()).unwrap();
        assert!(report.suites[0].transparent);
        assert_eq!(report.suites[0].suites[0].title, "Feature");
    }

    // ========================================================================
    // resolve_depth tests
    // ========================================================================

    #[test]
    fn test_resolve_depth_single_marker() {
        assert_eq!(
            resolve_depth("- sub case"),
            ResolvedTitle {
                extra_depth: 1,
                title: "sub case"
            }
        );
    }

    #[test]
    fn test_resolve_depth_without_marker() {
        assert_eq!(resolve_depth("case title").extra_depth, 0);
        assert_eq!(resolve_depth("case - title").title, "case - title");
        assert_eq!(resolve_depth("---").extra_depth, 0);
        assert_eq!(resolve_depth("").title, "");
    }

    #[test]
    fn test_resolve_depth_keeps_inner_spaces() {
        let resolved = resolve_depth("---  spaced");
        assert_eq!(resolved.extra_depth, 3);
        assert_eq!(resolved.title, " spaced");
    }
}
