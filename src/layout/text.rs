use crate::geometry::search::fit_prefix;

/// Marker appended to the last permitted line when content is cut off.
pub const ELLIPSIS: &str = "...";

/// Break `content` into lines no wider than `available_width`.
///
/// Each line is the longest run of characters whose measured width fits, found by binary
/// search over the remaining characters. A single character wider than the box still takes a
/// line of its own. When `line_clamp` lines are produced and content remains, the last line
/// drops its final character and ends in [`ELLIPSIS`].
///
/// Without a width the content is returned as a single line. A clamp of `None` or `Some(0)`
/// means unlimited. Empty content yields no lines.
pub fn break_lines(
    content: &str,
    available_width: Option<f64>,
    mut measure: impl FnMut(&str) -> f64,
    line_clamp: Option<usize>,
) -> Vec<String> {
    let Some(width) = available_width else {
        return vec![content.to_owned()];
    };

    // Byte offset of every char boundary, including the end.
    let bounds: Vec<usize> = content
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(content.len()))
        .collect();
    let char_count = bounds.len() - 1;
    let clamp = line_clamp.filter(|&c| c > 0).unwrap_or(usize::MAX);

    let mut lines = Vec::new();
    let mut cursor = 0;
    while cursor < char_count && lines.len() < clamp {
        let start = cursor;
        let slice = |end: usize| &content[bounds[start]..bounds[end]];

        let fitted = fit_prefix(char_count - start, |k| measure(slice(start + k + 1)) > width);
        let end = match fitted {
            Some(k) => start + k + 1,
            None => start + 1,
        };

        if lines.len() + 1 == clamp && end < char_count {
            lines.push(format!("{}{ELLIPSIS}", slice(end - 1)));
        } else {
            lines.push(slice(end).to_owned());
        }
        cursor = end;
    }
    lines
}

#[cfg(test)]
#[path = "../../tests/unit/layout/text.rs"]
mod tests;
