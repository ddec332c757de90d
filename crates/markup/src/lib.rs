//! # codedoc markup
//!
//! Turns semi-structured model output (markdown mixed with HTML) into clean
//! HTML fragments.
//!
//! ```text
//! raw text
//!     │
//!     ├──> Protect verbatim regions (fences, <pre>, <code>, `spans`) as tokens
//!     │
//!     ├──> Per block unit: **bold**, *italic*, # headings, - list items
//!     │
//!     ├──> Block machine: Idle / InParagraph / InList → <p>, <ul> wrapping
//!     │
//!     └──> Restore tokens
//! ```
//!
//! ## Example
//!
//! ```rust
//! let html = codedoc_markup::render("### Title\nbody");
//! assert_eq!(html, "<h3>Title</h3>\n<p>\nbody\n</p>");
//! ```

mod fsm;
mod inline;
mod transducer;
mod verbatim;

pub use transducer::{render, MarkdownToHtmlTransducer};
