use crate::fsm::{BlockMachine, LineKind};
use crate::inline::{emphasize, is_heading, is_list_item, rewrite_line};
use crate::verbatim::{protect, strip_token_chars, Vault};

/// Markdown-to-HTML rewriter for the subset models emit: fenced and inline
/// code, bold, italic, `#`-`###` headings, `- ` lists and paragraphs.
///
/// Rendering is total and deterministic, and rendering its own output again
/// returns that output unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownToHtmlTransducer;

impl MarkdownToHtmlTransducer {
    pub const fn new() -> Self {
        Self
    }

    pub fn render(&self, text: &str) -> String {
        let text = strip_token_chars(&text.replace("\r\n", "\n").replace('\r', "\n"));
        if text.trim().is_empty() {
            return String::new();
        }

        let mut vault = Vault::default();
        let protected = protect(&text, &mut vault);

        let mut machine = BlockMachine::new();
        for line in rewrite_units(&protected, &vault) {
            let line = line.trim();
            machine.feed(line, LineKind::classify(line, vault.is_block_token(line)));
        }

        vault.restore(&machine.finish().join("\n"))
    }
}

/// Render with the default transducer
pub fn render(text: &str) -> String {
    MarkdownToHtmlTransducer.render(text)
}

/// A line that joins its neighbours into one paragraph unit
fn is_run_line(line: &str, vault: &Vault) -> bool {
    let trimmed = line.trim();
    !is_heading(trimmed)
        && !is_list_item(trimmed)
        && LineKind::classify(trimmed, vault.is_block_token(trimmed)) == LineKind::Text
}

/// Apply inline and line rewrites per block unit so emphasis never pairs
/// across a heading, list item, blank line or block element
fn rewrite_units(text: &str, vault: &Vault) -> Vec<String> {
    let mut out = Vec::new();
    let mut run: Vec<&str> = Vec::new();

    for line in text.split('\n') {
        if is_run_line(line, vault) {
            run.push(line);
            continue;
        }
        flush_run(&mut run, &mut out);
        out.push(rewrite_line(&emphasize(line.trim_start())));
    }
    flush_run(&mut run, &mut out);

    out
}

fn flush_run(run: &mut Vec<&str>, out: &mut Vec<String>) {
    if run.is_empty() {
        return;
    }
    let unit = emphasize(&run.join("\n"));
    out.extend(unit.split('\n').map(str::to_string));
    run.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_and_blank_input() {
        assert_eq!(render(""), "");
        assert_eq!(render("  \n\t\n"), "");
    }

    #[test]
    fn crlf_is_normalized() {
        assert_eq!(render("a\r\nb"), "<p>\na\nb\n</p>");
    }

    #[test]
    fn token_characters_in_input_are_dropped() {
        assert_eq!(render("x\u{E000}0\u{E001}y"), "<p>\nx0y\n</p>");
    }

    #[test]
    fn heading_then_list_without_blank_line() {
        assert_eq!(
            render("## Files\n- a.py\n- b.py"),
            "<h2>Files</h2>\n<ul>\n<li>a.py</li>\n<li>b.py</li>\n</ul>"
        );
    }

    #[test]
    fn inline_html_line_is_paragraph_text() {
        assert_eq!(
            render("<strong>Note:</strong> keep this"),
            "<p>\n<strong>Note:</strong> keep this\n</p>"
        );
    }

    #[test]
    fn indented_markers_still_count() {
        let html = render("text\n  - item\n   ## Sub");
        assert_eq!(html, "<p>\ntext\n</p>\n<ul>\n<li>item</li>\n</ul>\n<h2>Sub</h2>");
        assert_eq!(render(&html), html);
    }

    #[test]
    fn emphasis_inside_code_span_is_untouched() {
        assert_eq!(render("run `a*b*c` now"), "<p>\nrun <code>a*b*c</code> now\n</p>");
    }
}
