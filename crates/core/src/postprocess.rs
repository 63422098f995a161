//! Markdown post-processing after conversion.
//!
//! [`normalize_markdown`] removes the whitespace noise HTML converters leave
//! behind so the machine view spends fewer tokens on layout. Fenced code
//! blocks are passed through byte for byte.

use std::sync::LazyLock;

use regex::Regex;

/// Prepended, followed by a blank line, when the HTML was cut by the size guard.
pub const TRUNCATION_NOTICE: &str = "> NOTE: This machine view was generated from a **truncated** version of the original HTML because the page was too large to convert in full.\n> If you need complete detail, fetch the original HTML by requesting the same URL **without** the `.md` extension or `view=machine`/`format=markdown` query parameters.";

/// Served instead of a conversion when the converter fails.
pub const FALLBACK_DOCUMENT: &str = "# Machine view unavailable\n\n> This page was too large or complex to convert to markdown safely.\n\nYou can still access all of the content by requesting the same URL in its **normal HTML** form (for example, without the `.md` extension or the `view=machine` / `format=markdown` query parameters).\n";

/// Blank lines kept in a row by the line pass.
const MAX_BLANK_RUN: usize = 2;

/// Indentation outside lists is clamped to this many spaces.
const MAX_INDENT: usize = 4;

static EMPTY_LINK_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\[\]$").expect("empty link marker pattern is valid"));

static ENDS_WITH_EMPTY_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!?\[\]$").expect("empty link suffix pattern is valid"));

static ENDS_WITH_OPEN_DESTINATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!?\[[^\]]*\]\($").expect("open destination pattern is valid"));

static PAREN_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\(https?://[^)]+\)$").expect("parenthesized url pattern is valid"));

static LIST_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*+]\s").expect("list item pattern is valid"));

static SPACE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").expect("space run pattern is valid"));

/// Cleans converted Markdown and, when `truncated`, prepends the
/// [`TRUNCATION_NOTICE`].
pub fn normalize_markdown(markdown: &str, truncated: bool) -> String {
    let cleaned = clean_whitespace(markdown);
    if truncated { format!("{}\n\n{}", TRUNCATION_NOTICE, cleaned) } else { cleaned }
}

/// Applies every whitespace rule; see the module docs.
pub fn clean_whitespace(markdown: &str) -> String {
    let mut cleaned: Vec<String> = Vec::new();
    let mut in_code_block = false;
    let mut blank_run = 0;

    for raw in markdown.split('\n') {
        if is_fence(raw) {
            in_code_block = !in_code_block;
            cleaned.push(raw.to_string());
            blank_run = 0;
            continue;
        }

        if in_code_block {
            cleaned.push(raw.to_string());
            continue;
        }

        let line = raw.trim_end();

        if line.is_empty() {
            blank_run += 1;
            if blank_run <= MAX_BLANK_RUN {
                cleaned.push(String::new());
            }
            continue;
        }
        blank_run = 0;

        if EMPTY_LINK_MARKER_RE.is_match(line)
            && previous_content_line(&cleaned).is_some_and(|i| ENDS_WITH_EMPTY_LINK_RE.is_match(&cleaned[i]))
        {
            continue;
        }

        if PAREN_URL_RE.is_match(line)
            && let Some(i) = previous_content_line(&cleaned)
            && let Some(merged) = merge_split_link(&cleaned[i], line.trim())
        {
            cleaned[i] = merged;
            continue;
        }

        let line = clamp_indent(line);
        cleaned.push(collapse_interior_spaces(&line));
    }

    collapse_blank_runs(cleaned).join("\n").trim().to_string()
}

/// Code fences toggle on lines whose first non-blank characters are three
/// backticks.
fn is_fence(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

/// Index of the last non-blank line in `lines`.
fn previous_content_line(lines: &[String]) -> Option<usize> {
    lines.iter().rposition(|l| !l.trim().is_empty())
}

/// Joins a `(url)` line onto a previous line left as `[]`, `![]` or `[..](`.
fn merge_split_link(previous: &str, url_line: &str) -> Option<String> {
    let previous = previous.trim_end();
    if ENDS_WITH_EMPTY_LINK_RE.is_match(previous) {
        Some(format!("{} {}", previous, url_line))
    } else if ENDS_WITH_OPEN_DESTINATION_RE.is_match(previous) {
        Some(format!("{}{}", previous, &url_line[1..]))
    } else {
        None
    }
}

/// Collapses 5+ leading whitespace characters to four spaces, except on list
/// items.
fn clamp_indent(line: &str) -> String {
    let content = line.trim_start();
    let indent = line.len() - content.len();

    if indent > MAX_INDENT && !LIST_ITEM_RE.is_match(line) {
        format!("{}{}", " ".repeat(MAX_INDENT), content)
    } else {
        line.to_string()
    }
}

/// Collapses runs of 2+ whitespace after the indentation to a single space,
/// leaving runs that sit right after `http:`/`https:` or right before `//`.
fn collapse_interior_spaces(line: &str) -> String {
    let content = line.trim_start();
    let (indent, rest) = line.split_at(line.len() - content.len());

    let collapsed = SPACE_RUN_RE.replace_all(rest, |caps: &regex::Captures| {
        let run = caps.get(0).map(|m| (m.start(), m.end())).unwrap_or_default();
        let before = &rest[..run.0];
        let after = &rest[run.1..];
        if before.ends_with("http:") || before.ends_with("https:") || after.starts_with("//") {
            rest[run.0..run.1].to_string()
        } else {
            " ".to_string()
        }
    });

    format!("{}{}", indent, collapsed)
}

/// Leaves at most one blank line between blocks outside code fences.
fn collapse_blank_runs(lines: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut in_code_block = false;

    for line in lines {
        if is_fence(&line) {
            in_code_block = !in_code_block;
        } else if !in_code_block && line.is_empty() && out.last().is_some_and(|l| l.is_empty()) {
            continue;
        }
        out.push(line);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_trailing_whitespace() {
        assert_eq!(clean_whitespace("Line one   \nLine two\t"), "Line one\nLine two");
    }

    #[test]
    fn test_collapses_blank_line_runs() {
        let md = "First\n\n\n\n\nSecond\n\n\nThird\n\nFourth";
        assert_eq!(clean_whitespace(md), "First\n\nSecond\n\nThird\n\nFourth");
    }

    #[test]
    fn test_whitespace_only_lines_count_as_blank() {
        assert_eq!(clean_whitespace("A\n   \n\t\n  \nB"), "A\n\nB");
    }

    #[test]
    fn test_drops_redundant_empty_link_marker() {
        let md = "![]\n  []\nAfter";
        assert_eq!(clean_whitespace(md), "![]\nAfter");
    }

    #[test]
    fn test_keeps_empty_link_marker_without_split_link() {
        let md = "Some text\n[]";
        assert_eq!(clean_whitespace(md), "Some text\n[]");
    }

    #[test]
    fn test_merges_url_onto_empty_link() {
        let md = "[]\n    (https://example.com/page)";
        assert_eq!(clean_whitespace(md), "[] (https://example.com/page)");
    }

    #[test]
    fn test_merges_url_onto_open_image_destination() {
        let md = "![](\n(https://example.com/x.png)";
        assert_eq!(clean_whitespace(md), "![](https://example.com/x.png)");
    }

    #[test]
    fn test_merges_across_blank_lines() {
        let md = "![]\n\n(http://example.com/a.png)\nNext";
        assert_eq!(clean_whitespace(md), "![] (http://example.com/a.png)\n\nNext");
    }

    #[test]
    fn test_does_not_merge_after_ordinary_line() {
        let md = "Plain text\n(https://example.com)";
        assert_eq!(clean_whitespace(md), md);
    }

    #[test]
    fn test_clamps_deep_indentation() {
        assert_eq!(clean_whitespace("Intro\n          deep text"), "Intro\n    deep text");
        assert_eq!(clean_whitespace("Intro\n\t\t\t\t\tdeep"), "Intro\n    deep");
    }

    #[test]
    fn test_keeps_list_item_indentation() {
        let md = "- top\n        - nested item";
        assert_eq!(clean_whitespace(md), md);
    }

    #[test]
    fn test_keeps_moderate_indentation() {
        let md = "- top\n    continued paragraph";
        assert_eq!(clean_whitespace(md), md);
    }

    #[test]
    fn test_collapses_interior_spaces() {
        assert_eq!(clean_whitespace("Too    many   spaces"), "Too many spaces");
    }

    #[test]
    fn test_space_collapse_spares_url_heuristic() {
        assert_eq!(clean_whitespace("see http:  example"), "see http:  example");
        assert_eq!(clean_whitespace("path  //comment"), "path  //comment");
        assert_eq!(clean_whitespace("a  b https:   c"), "a b https:   c");
    }

    #[test]
    fn test_preserves_fenced_code_blocks() {
        let md = "Intro\n\n```rust\nfn main() {\n\n\n\n        let  x   =  1;   \n}\n```\n\n\n\nOutro";
        let expected = "Intro\n\n```rust\nfn main() {\n\n\n\n        let  x   =  1;   \n}\n```\n\nOutro";
        assert_eq!(clean_whitespace(md), expected);
    }

    #[test]
    fn test_trims_document() {
        assert_eq!(clean_whitespace("\n\n  \n# Title\n\nBody\n\n\n"), "# Title\n\nBody");
    }

    #[test]
    fn test_idempotent_on_normalized_input() {
        let md = "# Title\n\nParagraph with [a link](https://example.com).\n\n- item\n    - nested\n\n```\ncode  block\n```\n\n![] (https://example.com/i.png)";
        let once = clean_whitespace(md);
        assert_eq!(once, md);
        assert_eq!(clean_whitespace(&once), once);
    }

    #[test]
    fn test_truncation_notice_prepended() {
        let out = normalize_markdown("# Title\n\n\n\nBody", true);
        assert!(out.starts_with(TRUNCATION_NOTICE));
        assert!(out.ends_with("\n\n# Title\n\nBody"));
    }

    #[test]
    fn test_no_notice_when_not_truncated() {
        assert_eq!(normalize_markdown("# Title", false), "# Title");
    }

    #[test]
    fn test_fixed_documents() {
        assert!(FALLBACK_DOCUMENT.starts_with("# Machine view unavailable\n\n> This page was too large"));
        assert!(TRUNCATION_NOTICE.starts_with("> NOTE: This machine view was generated from a **truncated** version"));
        assert_eq!(TRUNCATION_NOTICE.lines().count(), 2);
    }
}
