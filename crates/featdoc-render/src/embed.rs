//! Embedding a rendered fragment into an existing document.

use featdoc_types::Placeholders;

/// Compose the final document from the previous one and a fresh fragment.
///
/// Without a previous document, or when it contains neither the current nor
/// the legacy start marker, the fragment becomes the whole document.
/// Otherwise everything from the start marker up to (not including) the end
/// marker is replaced by the marker followed by the fragment. The current
/// pair is preferred over the legacy pair.
///
/// The end marker is searched only after the start marker. An end marker
/// that appears earlier sits in the kept prefix, so embedding the output
/// again replaces the same region and yields the same document. When there
/// is no end marker after the start, the replacement runs to the end of the
/// document and no end marker is added.
///
/// ```
/// use featdoc_render::embed;
/// use featdoc_types::Placeholders;
///
/// let markers = Placeholders::from_base("featdoc");
/// let doc = "intro<!-- featdoc--start -->old<!-- featdoc--end -->outro";
/// assert_eq!(
///     embed(Some(doc), "\nnew\n", &markers),
///     "intro<!-- featdoc--start -->\nnew\n<!-- featdoc--end -->outro"
/// );
/// assert_eq!(embed(None, "\nnew\n", &markers), "\nnew\n");
/// ```
pub fn embed(existing: Option<&str>, fragment: &str, markers: &Placeholders) -> String {
    let Some(content) = existing else {
        return fragment.to_string();
    };

    let legacy = Placeholders::legacy();
    let found = [markers, &legacy].into_iter().find_map(|pair| {
        content
            .find(pair.start.as_str())
            .map(|start_index| (pair, start_index))
    });
    let Some((pair, start_index)) = found else {
        return fragment.to_string();
    };

    let search_from = start_index + pair.start.len();
    let end_index = content[search_from..]
        .find(pair.end.as_str())
        .map_or(content.len(), |offset| search_from + offset);

    format!(
        "{}{}{}{}",
        &content[..start_index],
        pair.start,
        fragment,
        &content[end_index..]
    )
}
