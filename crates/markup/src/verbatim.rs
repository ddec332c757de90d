//! Verbatim regions (fences, `<pre>` blocks, code spans) are swapped for
//! opaque tokens before any rewrite pass runs, then restored at the end.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

pub(crate) const TOKEN_OPEN: char = '\u{E000}';
pub(crate) const TOKEN_CLOSE: char = '\u{E001}';

static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x{E000}(\d+)\x{E001}").expect("valid token regex"));

static CODE_ELEMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<code\b[^>]*>.*?</code>").expect("valid code element regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlotKind {
    /// Occupies whole lines; acts as a block element
    Block,
    /// Sits inside a line of text
    Inline,
}

#[derive(Debug, Clone)]
struct Slot {
    html: String,
    kind: SlotKind,
}

/// Store of protected regions for one render call
#[derive(Debug, Default)]
pub(crate) struct Vault {
    slots: Vec<Slot>,
}

impl Vault {
    fn stash(&mut self, html: String, kind: SlotKind) -> String {
        let token = format!("{TOKEN_OPEN}{}{TOKEN_CLOSE}", self.slots.len());
        self.slots.push(Slot { html, kind });
        token
    }

    /// True when `line` is exactly one block token
    pub(crate) fn is_block_token(&self, line: &str) -> bool {
        TOKEN_RE
            .captures(line)
            .filter(|caps| caps.get(0).is_some_and(|m| m.as_str().len() == line.len()))
            .and_then(|caps| caps[1].parse::<usize>().ok())
            .and_then(|idx| self.slots.get(idx))
            .is_some_and(|slot| slot.kind == SlotKind::Block)
    }

    /// Replace every token with its stored HTML
    pub(crate) fn restore(&self, text: &str) -> String {
        TOKEN_RE
            .replace_all(text, |caps: &Captures<'_>| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|idx| self.slots.get(idx))
                    .map_or_else(|| caps[0].to_string(), |slot| slot.html.clone())
            })
            .into_owned()
    }
}

/// Tokenize fenced blocks, `<pre>` blocks, `<code>` elements and backtick spans.
///
/// Input must already be free of the token delimiter characters.
pub(crate) fn protect(text: &str, vault: &mut Vault) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim_start();

        if let Some(info) = trimmed.strip_prefix("```") {
            if let Some(end) = (i + 1..lines.len()).find(|&j| lines[j].trim_start().starts_with("```")) {
                let body = lines[i + 1..end].join("\n");
                out.push(vault.stash(fenced_block(info, &body), SlotKind::Block));
                i = end + 1;
                continue;
            }
            log::debug!("Unterminated code fence at line {}; left as text", i + 1);
        } else if starts_pre(trimmed) {
            if let Some(end) = (i..lines.len()).find(|&j| lines[j].contains("</pre>")) {
                let block = lines[i..=end].join("\n");
                out.push(vault.stash(block.trim().to_string(), SlotKind::Block));
                i = end + 1;
                continue;
            }
        }

        out.push(protect_inline(line, vault));
        i += 1;
    }

    out.join("\n")
}

fn starts_pre(line: &str) -> bool {
    line.strip_prefix("<pre")
        .is_some_and(|rest| rest.starts_with('>') || rest.starts_with(char::is_whitespace))
}

fn fenced_block(info: &str, body: &str) -> String {
    let lang: String = info
        .split_whitespace()
        .next()
        .unwrap_or("")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '#' | '.'))
        .collect();

    if lang.is_empty() {
        format!("<pre><code>{}</code></pre>", escape_html(body))
    } else {
        format!(
            "<pre><code class=\"language-{lang}\">{}</code></pre>",
            escape_html(body)
        )
    }
}

fn protect_inline(line: &str, vault: &mut Vault) -> String {
    let line = CODE_ELEMENT_RE.replace_all(line, |caps: &Captures<'_>| {
        vault.stash(caps[0].to_string(), SlotKind::Inline)
    });
    protect_backtick_spans(&line, vault)
}

/// `` `code` `` on a single line, where neither backtick touches another backtick
fn protect_backtick_spans(line: &str, vault: &mut Vault) -> String {
    let bytes = line.as_bytes();
    let mut out = String::with_capacity(line.len());
    let mut copied = 0;
    let mut search = 0;

    while let Some(rel) = line[search..].find('`') {
        let open = search + rel;
        search = open + 1;

        if open > 0 && bytes[open - 1] == b'`' {
            continue;
        }
        let Some(rel_close) = line[open + 1..].find('`') else {
            break;
        };
        let close = open + 1 + rel_close;
        if close == open + 1 || bytes.get(close + 1) == Some(&b'`') {
            continue;
        }

        out.push_str(&line[copied..open]);
        let code = format!("<code>{}</code>", escape_html(&line[open + 1..close]));
        out.push_str(&vault.stash(code, SlotKind::Inline));
        copied = close + 1;
        search = close + 1;
    }

    out.push_str(&line[copied..]);
    out
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Drop characters that would be mistaken for token delimiters
pub(crate) fn strip_token_chars(text: &str) -> String {
    text.chars()
        .filter(|&c| c != TOKEN_OPEN && c != TOKEN_CLOSE)
        .collect()
}
