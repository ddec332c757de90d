use crate::verbatim::{TOKEN_CLOSE, TOKEN_OPEN};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static BOLD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\*\*(.+?)\*\*").expect("valid bold regex"));

static ITALIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*([^*`\n\x{E000}\x{E001}]+)\*").expect("valid italic regex"));

static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,3}) (.*)$").expect("valid heading regex"));

static LIST_ITEM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^- (.*)$").expect("valid list regex"));

pub(crate) fn is_heading(line: &str) -> bool {
    HEADING_RE.is_match(line)
}

pub(crate) fn is_list_item(line: &str) -> bool {
    LIST_ITEM_RE.is_match(line)
}

/// Bold, then italic, over one block unit
pub(crate) fn emphasize(unit: &str) -> String {
    let bold = BOLD_RE.replace_all(unit, "<strong>$1</strong>");
    ITALIC_RE
        .replace_all(&bold, |caps: &Captures<'_>| {
            let Some(whole) = caps.get(0) else {
                return String::new();
            };
            // protected code has already been swapped for a token
            let before = bold[..whole.start()].ends_with(['`', TOKEN_CLOSE]);
            let after = bold[whole.end()..].starts_with(['`', TOKEN_OPEN]);
            if before || after {
                whole.as_str().to_string()
            } else {
                format!("<em>{}</em>", &caps[1])
            }
        })
        .into_owned()
}

/// `# Title` -> `<h1>Title</h1>`, `- item` -> `<li>item</li>`; other lines unchanged
pub(crate) fn rewrite_line(line: &str) -> String {
    if let Some(caps) = HEADING_RE.captures(line) {
        let level = caps[1].len();
        return format!("<h{level}>{}</h{level}>", caps[2].trim());
    }
    if let Some(caps) = LIST_ITEM_RE.captures(line) {
        return format!("<li>{}</li>", caps[1].trim_end());
    }
    line.to_string()
}
