//! Application orchestration for featdoc.
//!
//! This crate provides the [`Reporter`] a test host drives through a run,
//! and the end-of-run pipeline behind it:
//!
//! 1. Snapshot the host's suite tree, reading every outcome once
//! 2. Merge same-titled feature groupings
//! 3. Filter the merged tree down to the visible report
//! 4. Render the report with the configured adapter
//! 5. Embed the fragment into the existing document and write it once
//!
//! # Example
//!
//! ```rust
//! use featdoc_adapters_fs::MemoryDocumentStore;
//! use featdoc_app::Reporter;
//! use featdoc_config::EffectiveOptions;
//! use featdoc_types::{Outcome, RunConfig, RunResult, SuiteNode, TestNode};
//!
//! let root = SuiteNode::root().with_suite(
//!     SuiteNode::grouping("Feature title")
//!         .with_test(TestNode::new("case title", Outcome::Expected)),
//! );
//!
//! let mut reporter =
//!     Reporter::with_store(EffectiveOptions::default(), MemoryDocumentStore::new())?;
//! reporter.begin(&RunConfig::default(), root);
//! let written = reporter.end(&RunResult::default())?;
//!
//! assert_eq!(written.content, "\n## Feature title\n - \u{2705} case title\n");
//! # Ok::<(), featdoc_app::AppError>(())
//! ```

use std::io;
use std::path::PathBuf;

use featdoc_adapters_fs::FsDocumentStore;
use featdoc_config::{ConfigError, EffectiveOptions, OutputFormat, ReporterOptions};
use featdoc_domain::{MergeScope, Visibility, filter_report, merge_suites};
use featdoc_ports::{DocumentStore, HostSuite, LifecycleReporter, snapshot};
use featdoc_render::{
    Adapter, JsonAdapter, MarkdownAdapter, RenderError, RenderOptions, ReportAdapter, embed,
};
use featdoc_types::{ReportSuite, RunConfig, RunResult, SuiteNode};
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Errors that can occur while reporting.
#[derive(Debug, Error)]
pub enum AppError {
    /// `end` was called before `begin`.
    #[error("Reporter has not started: end was called before begin")]
    NotStarted,

    /// `end` was called a second time.
    #[error("Reporter has already finished")]
    AlreadyFinished,

    /// The reporter options are invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The adapter failed or rejected its options.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// The existing document could not be read.
    #[error("Failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    /// The document could not be written.
    #[error("Failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

// ============================================================================
// Report Generation
// ============================================================================

/// The adapter matching a configured output format.
pub fn adapter_for(format: OutputFormat) -> Adapter {
    match format {
        OutputFormat::Markdown => Adapter::Markdown(MarkdownAdapter),
        OutputFormat::Json => Adapter::Json(JsonAdapter),
    }
}

/// Run the pure part of the pipeline: merge, filter and render.
///
/// Returns the fragment before embedding.
pub fn generate_report(
    root: SuiteNode,
    options: &EffectiveOptions,
    adapter: &dyn ReportAdapter,
) -> Result<String, AppError> {
    let merged = merge_suites(root, MergeScope::for_projects(options.report_projects));

    let visibility = Visibility {
        report_projects: options.report_projects,
        behavior_test_type: options.behavior_test_type.clone(),
    };
    let report: Vec<_> = filter_report(&merged, &visibility).into_iter().collect();
    tracing::debug!(
        visible_tests = report.iter().map(ReportSuite::test_count).sum::<usize>(),
        adapter = adapter.name(),
        "rendering feature report"
    );

    let render_options = RenderOptions {
        full_report_link: options.full_report_link.clone(),
    };
    Ok(adapter.render(&report, &render_options)?)
}

// ============================================================================
// Reporter
// ============================================================================

/// What a finished run wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenReport {
    pub path: PathBuf,
    pub content: String,
}

enum State<H> {
    Idle,
    Began(H),
    Ended,
}

/// The reporter a test host drives through one run.
///
/// `begin` stores the host's root suite, `end` runs the pipeline and writes
/// the destination document exactly once. Options and the adapter are
/// validated at construction, so a misconfigured reporter never starts.
pub struct Reporter<H, D = FsDocumentStore> {
    options: EffectiveOptions,
    adapter: Adapter,
    store: D,
    state: State<H>,
}

impl<H: HostSuite> Reporter<H, FsDocumentStore> {
    /// Create a reporter writing relative to the working directory.
    pub fn new(options: &ReporterOptions) -> Result<Self, AppError> {
        featdoc_config::validate_config(options)?;
        Self::with_store(
            EffectiveOptions::from_options(options),
            FsDocumentStore::current_dir(),
        )
    }
}

impl<H: HostSuite, D: DocumentStore> Reporter<H, D> {
    /// Create a reporter over an explicit document store.
    pub fn with_store(options: EffectiveOptions, store: D) -> Result<Self, AppError> {
        options.validate()?;
        let adapter = adapter_for(options.format);
        Ok(Self {
            options,
            adapter,
            store,
            state: State::Idle,
        })
    }

    /// Replace the adapter chosen by the output format.
    pub fn with_adapter(mut self, adapter: Adapter) -> Result<Self, AppError> {
        adapter.as_adapter().validate()?;
        self.adapter = adapter;
        Ok(self)
    }

    pub fn store(&self) -> &D {
        &self.store
    }

    /// Store the root suite for this run.
    ///
    /// Calling it again before `end` replaces the stored suite.
    pub fn begin(&mut self, config: &RunConfig, root: H) {
        if matches!(self.state, State::Began(_)) {
            tracing::debug!("begin called again, replacing the stored suite");
        }
        tracing::debug!(
            root = root.title(),
            root_dir = config.root_dir.as_deref().unwrap_or("."),
            workers = config.workers,
            format = self.options.format.as_str(),
            adapter = self.adapter.as_adapter().name(),
            "feature report run started"
        );
        self.state = State::Began(root);
    }

    /// Generate the report and write it.
    ///
    /// A failed read, render or write keeps the stored suite, so `end` can
    /// be called again once the cause is fixed.
    pub fn end(&mut self, result: &RunResult) -> Result<WrittenReport, AppError> {
        let root = match std::mem::replace(&mut self.state, State::Ended) {
            State::Began(root) => root,
            State::Idle => {
                self.state = State::Idle;
                return Err(AppError::NotStarted);
            }
            State::Ended => return Err(AppError::AlreadyFinished),
        };
        tracing::debug!(status = ?result.status, "feature report run ended");

        match self.write_report(&root) {
            Ok(written) => Ok(written),
            Err(err) => {
                tracing::warn!(error = %err, "feature report failed, run can be ended again");
                self.state = State::Began(root);
                Err(err)
            }
        }
    }

    fn write_report(&self, root: &H) -> Result<WrittenReport, AppError> {
        let adapter = self.adapter.as_adapter();
        let fragment = generate_report(snapshot(root), &self.options, adapter)?;

        let path = self.options.output_file.clone();
        let content = if adapter.embeddable() {
            let existing = self
                .store
                .read(&path)
                .map_err(|source| AppError::Read {
                    path: path.clone(),
                    source,
                })?;
            embed(existing.as_deref(), &fragment, &self.options.placeholders())
        } else {
            fragment
        };

        self.store
            .write(&path, &content)
            .map_err(|source| AppError::Write {
                path: path.clone(),
                source,
            })?;
        tracing::info!(
            path = %path.display(),
            adapter = adapter.name(),
            bytes = content.len(),
            "wrote feature report"
        );

        Ok(WrittenReport { path, content })
    }
}

impl<H: HostSuite, D: DocumentStore> LifecycleReporter<H> for Reporter<H, D> {
    type Error = AppError;

    fn on_begin(&mut self, config: &RunConfig, suite: H) {
        self.begin(config, suite);
    }

    fn on_end(&mut self, result: &RunResult) -> Result<(), AppError> {
        self.end(result).map(|_| ())
    }
}

// ============================================================================
// Tests
// ============================================================================
