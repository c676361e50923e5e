//! Minimal markdown → HTML substitution for proposal drafts.
//!
//! Handles headings (`#`, `##`, `###`), `**bold**`, `- ` list items,
//! blank-line paragraphs and single line breaks. Input is HTML-escaped
//! before any tag is inserted.

use once_cell::sync::Lazy;
use regex::Regex;

static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(#{1,3}) (.+)$").expect("heading pattern is valid"));
static BOLD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("bold pattern is valid"));
static LIST_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^- (.+)$").expect("list pattern is valid"));

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Renders a draft for on-page display: `#` becomes `<h2>`.
pub fn render_html(markdown: &str) -> String {
    render_html_from(markdown, 2)
}

/// Renders with `#` mapped to `<h{top_level}>`. Levels are capped at 6.
pub fn render_html_from(markdown: &str, top_level: u8) -> String {
    let text = escape_html(&markdown.replace("\r\n", "\n"));
    let text = HEADING.replace_all(&text, |caps: &regex::Captures| {
        let level = (top_level as usize + caps[1].len() - 1).min(6);
        format!("<h{level}>{}</h{level}>", &caps[2])
    });
    let text = BOLD.replace_all(&text, "<strong>$1</strong>");
    let text = LIST_ITEM.replace_all(&text, "<li>$1</li>");
    let text = text.trim().replace("\n\n", "</p><p>").replace('\n', "<br>");
    format!("<p>{}</p>", text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings_shift_levels() {
        let html = render_html("# Title\n## Methods\n### Sampling");
        assert!(html.contains("<h2>Title</h2>"));
        assert!(html.contains("<h3>Methods</h3>"));
        assert!(html.contains("<h4>Sampling</h4>"));
        assert!(render_html_from("# T", 1).contains("<h1>T</h1>"));
    }

    #[test]
    fn test_bold_and_list() {
        let html = render_html("- **Aim**: reduce falls\n- second");
        assert!(html.contains("<li><strong>Aim</strong>: reduce falls</li>"));
        assert!(html.contains("<br><li>second</li>"));
    }

    #[test]
    fn test_paragraphs() {
        assert_eq!(render_html("one\n\ntwo"), "<p>one</p><p>two</p>");
    }

    #[test]
    fn test_escapes_markup() {
        let html = render_html("a <script> & **b**");
        assert!(html.contains("&lt;script&gt; &amp; <strong>b</strong>"));
    }
}
