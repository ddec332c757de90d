//! Line-level state machine that wraps text runs in `<p>` and list-item runs in `<ul>`.

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "details", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section", "summary", "table",
    "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

/// Classification of one trimmed line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineKind {
    Blank,
    /// `<li>...`
    ListItem,
    /// `<ul>` / `<ol>` without its closing tag on the same line
    ListOpen,
    /// `</ul>` / `</ol>`
    ListClose,
    /// `<p>` without `</p>` on the same line
    ParagraphOpen,
    /// `...</p>`
    ParagraphClose,
    /// Self-contained block element, emitted as-is
    Block,
    Text,
}

impl LineKind {
    /// `is_block_token` reports lines holding a protected block region
    pub(crate) fn classify(line: &str, is_block_token: bool) -> Self {
        if line.is_empty() {
            return LineKind::Blank;
        }
        if is_block_token {
            return LineKind::Block;
        }

        let Some(tag) = leading_tag(line) else {
            return if line.ends_with("</p>") {
                LineKind::ParagraphClose
            } else {
                LineKind::Text
            };
        };

        match (tag.closing, tag.name.as_str()) {
            (false, "li") => LineKind::ListItem,
            (false, "ul" | "ol") if !line.contains("</ul>") && !line.contains("</ol>") => {
                LineKind::ListOpen
            }
            (true, "ul" | "ol") => LineKind::ListClose,
            (false, "p") if !line.contains("</p>") => LineKind::ParagraphOpen,
            (true, "p") => LineKind::ParagraphClose,
            (_, name) if BLOCK_TAGS.contains(&name) && line.ends_with('>') => LineKind::Block,
            _ if line.ends_with("</p>") => LineKind::ParagraphClose,
            _ => LineKind::Text,
        }
    }
}

struct LeadingTag {
    name: String,
    closing: bool,
}

/// Tag name at the very start of `line`, lowercased
fn leading_tag(line: &str) -> Option<LeadingTag> {
    let rest = line.strip_prefix('<')?;
    let (closing, rest) = match rest.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, rest),
    };
    let name_len = rest
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(rest.len());
    if name_len == 0 {
        return None;
    }
    let terminator = rest[name_len..].chars().next();
    if !matches!(terminator, None | Some('>' | '/') | Some(' ' | '\t')) {
        return None;
    }
    Some(LeadingTag {
        name: rest[..name_len].to_ascii_lowercase(),
        closing,
    })
}

/// Where the machine is between lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BlockState {
    Idle,
    /// `explicit` when the input itself opened the paragraph with `<p>`
    InParagraph { explicit: bool },
    /// `depth` counts explicit `<ul>`/`<ol>` nesting; 0 is a list opened for bare `<li>` lines
    InList { depth: usize },
}

/// Emits wrapped lines into `out` as classified lines are fed in
#[derive(Debug)]
pub(crate) struct BlockMachine {
    state: BlockState,
    out: Vec<String>,
}

impl BlockMachine {
    pub(crate) fn new() -> Self {
        Self {
            state: BlockState::Idle,
            out: Vec::new(),
        }
    }

    #[cfg(test)]
    pub(crate) const fn state(&self) -> BlockState {
        self.state
    }

    pub(crate) fn feed(&mut self, line: &str, kind: LineKind) {
        match self.state {
            BlockState::Idle => self.from_idle(line, kind),

            BlockState::InParagraph { explicit: false } => match kind {
                LineKind::Text => self.emit(line),
                LineKind::ParagraphClose => {
                    self.emit(line);
                    self.state = BlockState::Idle;
                }
                LineKind::Blank => self.close_paragraph(),
                _ => {
                    self.close_paragraph();
                    self.from_idle(line, kind);
                }
            },

            BlockState::InParagraph { explicit: true } => match kind {
                LineKind::Blank => {}
                LineKind::ParagraphClose => {
                    self.emit(line);
                    self.state = BlockState::Idle;
                }
                _ => self.emit(line),
            },

            BlockState::InList { depth: 0 } => match kind {
                LineKind::ListItem => self.emit(line),
                _ => {
                    self.close_list();
                    self.from_idle(line, kind);
                }
            },

            BlockState::InList { depth } => match kind {
                LineKind::Blank => {}
                LineKind::ListOpen => {
                    self.emit(line);
                    self.state = BlockState::InList { depth: depth + 1 };
                }
                LineKind::ListClose => {
                    self.emit(line);
                    self.state = if depth == 1 {
                        BlockState::Idle
                    } else {
                        BlockState::InList { depth: depth - 1 }
                    };
                }
                _ => self.emit(line),
            },
        }
    }

    /// Close whatever is still open and return the output lines
    pub(crate) fn finish(mut self) -> Vec<String> {
        match self.state {
            BlockState::Idle => {}
            BlockState::InParagraph { .. } => self.close_paragraph(),
            BlockState::InList { depth: 0 } => self.close_list(),
            BlockState::InList { depth } => {
                log::debug!("Closing {depth} unterminated list element(s) at end of input");
                for _ in 0..depth {
                    self.emit("</ul>");
                }
            }
        }
        self.out
    }

    fn from_idle(&mut self, line: &str, kind: LineKind) {
        self.state = BlockState::Idle;
        match kind {
            LineKind::Blank => {}
            LineKind::Text => {
                self.emit("<p>");
                self.emit(line);
                self.state = BlockState::InParagraph { explicit: false };
            }
            LineKind::ListItem => {
                self.emit("<ul>");
                self.emit(line);
                self.state = BlockState::InList { depth: 0 };
            }
            LineKind::ListOpen => {
                self.emit(line);
                self.state = BlockState::InList { depth: 1 };
            }
            LineKind::ParagraphOpen => {
                self.emit(line);
                self.state = BlockState::InParagraph { explicit: true };
            }
            // stray closers and self-contained blocks pass through
            LineKind::ListClose | LineKind::ParagraphClose | LineKind::Block => self.emit(line),
        }
    }

    fn close_paragraph(&mut self) {
        self.emit("</p>");
        self.state = BlockState::Idle;
    }

    fn close_list(&mut self) {
        self.emit("</ul>");
        self.state = BlockState::Idle;
    }

    fn emit(&mut self, line: &str) {
        self.out.push(line.to_string());
    }
}
