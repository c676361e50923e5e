//! Markdown code-fence stripping.

const FENCE: &str = "```";

/// Returns the payload inside the first fenced block, or the trimmed input
/// when there is no fence.
///
/// An opening fence with no closing fence (typical of a truncated reply)
/// yields everything after the opening line.
pub fn strip_code_fence(raw: &str) -> &str {
    let Some(open) = raw.find(FENCE) else {
        return raw.trim();
    };

    // Skip the info string (`json`, `JSON`, ...) up to the end of the line.
    let after_open = &raw[open + FENCE.len()..];
    let body_start = match after_open.find('\n') {
        Some(nl) if is_info_string(&after_open[..nl]) => nl + 1,
        // ```{"a":1}``` on a single line
        _ => after_open
            .char_indices()
            .find(|(_, c)| !c.is_ascii_alphabetic())
            .map(|(i, _)| i)
            .unwrap_or(after_open.len()),
    };
    let body = &after_open[body_start..];

    match body.find(FENCE) {
        Some(close) => body[..close].trim(),
        None => body.trim(),
    }
}

fn is_info_string(line: &str) -> bool {
    line.trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
