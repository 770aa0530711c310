//! Markdown rendering.

use std::collections::HashSet;

use featdoc_domain::resolve_depth;
use featdoc_types::{REPORT_LINK_LABEL, ReportSuite, ReportTest, Status};

use crate::{RenderError, RenderOptions, ReportAdapter};

/// The default adapter: a Markdown fragment that can be embedded.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownAdapter;

impl ReportAdapter for MarkdownAdapter {
    fn name(&self) -> &str {
        "markdown"
    }

    fn render(
        &self,
        report: &[ReportSuite],
        options: &RenderOptions,
    ) -> Result<String, RenderError> {
        Ok(render_markdown(report, options.full_report_link.as_deref()))
    }

    fn embeddable(&self) -> bool {
        true
    }
}

/// Returns the glyph marking a feature's status.
///
/// Unknown statuses are shown verbatim.
///
/// # Examples
///
/// ```rust
/// use featdoc_render::status_glyph;
/// use featdoc_types::Status;
///
/// assert_eq!(status_glyph(&Status::Passed), "\u{2705}");
/// assert_eq!(status_glyph(&Status::Failed), "\u{274C}");
/// assert_eq!(status_glyph(&Status::Unknown("odd".to_string())), "odd");
/// ```
pub fn status_glyph(status: &Status) -> &str {
    match status {
        Status::Passed => "\u{2705}",
        Status::Failed => "\u{274C}",
        Status::Skipped => "\u{1F6A7}",
        Status::Unknown(raw) => raw,
    }
}

/// Renders the report as a Markdown fragment.
///
/// # Example Output
///
/// ```markdown
///
/// ## Feature
///  - ✅ a feature that works
///    - ✅ a sub-feature, titled "- a sub-feature"
/// ### Sub-feature
///  - ❌ something broken *(tracked upstream)*
///
/// [Test report](playwright-report/index.html)
/// ```
///
/// The fragment always starts with a blank line so it can follow a marker
/// directly. Each visible grouping is a heading one level deeper than its
/// parent, starting at `##`. Tests come before child groupings, and only the
/// first test with a given title in a suite is listed.
pub fn render_markdown(report: &[ReportSuite], full_report_link: Option<&str>) -> String {
    let mut output = String::from("\n");

    for suite in report {
        write_suite(&mut output, suite, 0);
    }

    if let Some(link) = full_report_link.filter(|link| !link.is_empty()) {
        output.push_str(&format!("\n[{}]({})\n", REPORT_LINK_LABEL, link));
    }

    output
}

fn write_suite(output: &mut String, suite: &ReportSuite, nesting_level: usize) {
    let inner_level = if suite.transparent {
        nesting_level
    } else {
        output.push_str(&format!(
            "{} {}\n",
            "#".repeat(nesting_level + 2),
            suite.title
        ));
        nesting_level + 1
    };

    let mut seen = HashSet::new();
    for test in &suite.tests {
        if seen.insert(test.title.as_str()) {
            write_test(output, test);
        }
    }

    for child in &suite.suites {
        write_suite(output, child, inner_level);
    }
}

fn write_test(output: &mut String, test: &ReportTest) {
    let resolved = resolve_depth(&test.title);

    output.push_str(&"  ".repeat(resolved.extra_depth));
    output.push_str(&format!(
        " - {} {}",
        status_glyph(&test.status),
        resolved.title
    ));
    if let Some(comment) = &test.comment {
        output.push_str(&format!(" *({})*", comment));
    }
    output.push('\n');
}
