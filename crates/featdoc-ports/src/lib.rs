//! Port traits at the boundary between featdoc and the test host.

use std::io;
use std::path::Path;

use featdoc_types::{
    Annotation, Outcome, RunConfig, RunResult, SuiteKind, SuiteNode, TestNode,
};

/// Read access to a test case owned by the host.
pub trait HostTest {
    fn title(&self) -> &str;

    /// Resolve the test's outcome.
    ///
    /// Hosts may compute this on every call; featdoc calls it exactly once
    /// per test, when the tree is captured.
    fn outcome(&self) -> Outcome;

    fn annotations(&self) -> &[Annotation];
}

/// Read access to a suite owned by the host.
pub trait HostSuite: Sized {
    type Test: HostTest;

    fn title(&self) -> &str;

    fn kind(&self) -> SuiteKind;

    fn suites(&self) -> &[Self];

    fn tests(&self) -> &[Self::Test];
}

/// Copy a host tree into an owned [`SuiteNode`], resolving every outcome once.
pub fn snapshot<S: HostSuite>(suite: &S) -> SuiteNode {
    SuiteNode {
        title: suite.title().to_string(),
        kind: suite.kind(),
        suites: suite.suites().iter().map(snapshot).collect(),
        tests: suite
            .tests()
            .iter()
            .map(|test| TestNode {
                title: test.title().to_string(),
                outcome: test.outcome(),
                annotations: test.annotations().to_vec(),
            })
            .collect(),
    }
}

impl HostTest for TestNode {
    fn title(&self) -> &str {
        &self.title
    }

    fn outcome(&self) -> Outcome {
        self.outcome.clone()
    }

    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

impl HostSuite for SuiteNode {
    type Test = TestNode;

    fn title(&self) -> &str {
        &self.title
    }

    fn kind(&self) -> SuiteKind {
        self.kind
    }

    fn suites(&self) -> &[Self] {
        &self.suites
    }

    fn tests(&self) -> &[TestNode] {
        &self.tests
    }
}

/// Port for reading and writing the destination document.
pub trait DocumentStore {
    /// Returns the document's content, or `None` when it does not exist.
    fn read(&self, path: &Path) -> io::Result<Option<String>>;

    /// Replaces the document's content.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;
}

/// The lifecycle a test host drives a reporter through.
///
/// The host guarantees `on_begin` precedes `on_end` and that every outcome
/// is resolvable by the time `on_end` is called.
pub trait LifecycleReporter<S: HostSuite> {
    type Error;

    fn on_begin(&mut self, config: &RunConfig, suite: S);

    fn on_test_begin(&mut self, _test: &S::Test) {}

    fn on_test_end(&mut self, _test: &S::Test) {}

    fn on_end(&mut self, result: &RunResult) -> Result<(), Self::Error>;
}
