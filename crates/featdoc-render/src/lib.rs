//! Rendering for featdoc reports.
//!
//! This crate turns a filtered report tree into output text:
//! - Markdown, headings per feature and one list item per test
//! - JSON, the report records as-is
//!
//! Both are exposed through the [`ReportAdapter`] trait so hosts can plug in
//! their own renderer. The [`embed`] function splices a rendered fragment into
//! an existing document between placeholder markers.
//!
//! # Example
//!
//! ```rust
//! use featdoc_render::{render_markdown, status_glyph};
//! use featdoc_types::{ReportSuite, ReportTest, Status};
//!
//! let report = vec![ReportSuite {
//!     title: "Feature title".to_string(),
//!     transparent: false,
//!     suites: vec![],
//!     tests: vec![ReportTest {
//!         title: "case title".to_string(),
//!         status: Status::Passed,
//!         comment: None,
//!         test_type: None,
//!     }],
//! }];
//!
//! let markdown = render_markdown(&report, None);
//! let glyph = status_glyph(&Status::Passed);
//! assert_eq!(markdown, format!("\n## Feature title\n - {glyph} case title\n"));
//! ```

use std::fmt;

use featdoc_types::ReportSuite;
use thiserror::Error;

mod embed;
mod json;
mod markdown;

pub use embed::embed;
pub use json::{JsonAdapter, render_json};
pub use markdown::{MarkdownAdapter, render_markdown, status_glyph};

// ============================================================================
// Errors
// ============================================================================

/// Errors that can occur while rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The report could not be serialized.
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A custom adapter rejected its options.
    #[error("Invalid options for adapter '{adapter}': {reason}")]
    InvalidOptions { adapter: String, reason: String },

    /// A custom adapter failed.
    #[error("Adapter '{adapter}' failed: {reason}")]
    Adapter { adapter: String, reason: String },
}

// ============================================================================
// Adapter Interface
// ============================================================================

/// Options shared by every adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Link to the full test report, appended by adapters that support it.
    pub full_report_link: Option<String>,
}

/// A renderer for the filtered report.
///
/// `report` holds the top-level report records: empty when nothing in the run
/// is visible, otherwise the filtered root.
pub trait ReportAdapter {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Render the report.
    fn render(&self, report: &[ReportSuite], options: &RenderOptions)
    -> Result<String, RenderError>;

    /// Whether the output may be spliced into an existing document between
    /// placeholder markers. Non-embeddable output overwrites the destination.
    fn embeddable(&self) -> bool {
        false
    }

    /// Check adapter-specific options before a run starts.
    fn validate(&self) -> Result<(), RenderError> {
        Ok(())
    }
}

/// The adapter selected by configuration.
pub enum Adapter {
    Markdown(MarkdownAdapter),
    Json(JsonAdapter),
    Custom(Box<dyn ReportAdapter>),
}

impl Adapter {
    /// Wrap a host-supplied adapter.
    pub fn custom(adapter: impl ReportAdapter + 'static) -> Self {
        Adapter::Custom(Box::new(adapter))
    }

    pub fn as_adapter(&self) -> &dyn ReportAdapter {
        match self {
            Adapter::Markdown(adapter) => adapter,
            Adapter::Json(adapter) => adapter,
            Adapter::Custom(adapter) => adapter.as_ref(),
        }
    }
}

impl Default for Adapter {
    fn default() -> Self {
        Adapter::Markdown(MarkdownAdapter)
    }
}

impl fmt::Debug for Adapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Adapter")
            .field(&self.as_adapter().name())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
