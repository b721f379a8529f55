/// Separator the source uses before footnote-style qualifiers.
const QUALIFIER_MARKER: &str = " ♦";
const FOOTNOTE_OPENER: char = '[';
const FORMERLY_SUFFIX: &str = " (formerly)";

/// Normalizes free-text cell content.
///
/// Truncation can expose trailing whitespace, so the result is trimmed once more;
/// this keeps `clean(clean(s)) == clean(s)`.
pub fn clean_text(text: &str) -> String {
    let mut text = text.trim().replace("&nbsp", "");

    if let Some(pos) = text.find(QUALIFIER_MARKER) {
        text.truncate(pos);
    }
    if let Some(pos) = text.find(FOOTNOTE_OPENER) {
        text.truncate(pos);
    }
    if let Some(pos) = text.find(FORMERLY_SUFFIX) {
        text.truncate(pos);
    }

    text.replace('\n', "").trim().to_string()
}
