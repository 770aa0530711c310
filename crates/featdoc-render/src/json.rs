//! JSON rendering.

use featdoc_types::ReportSuite;

use crate::{RenderError, RenderOptions, ReportAdapter};

/// Renders the report records as compact JSON.
///
/// The output always replaces the destination; it is never embedded.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonAdapter;

impl ReportAdapter for JsonAdapter {
    fn name(&self) -> &str {
        "json"
    }

    fn render(
        &self,
        report: &[ReportSuite],
        _options: &RenderOptions,
    ) -> Result<String, RenderError> {
        render_json(report)
    }
}

/// Serialize the report records.
///
/// Test titles are kept as reported; depth markers are a Markdown concern.
pub fn render_json(report: &[ReportSuite]) -> Result<String, RenderError> {
    Ok(serde_json::to_string(report)?)
}
