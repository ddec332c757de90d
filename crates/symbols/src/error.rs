use thiserror::Error;

/// Result type for analyzer operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors raised by a single language analyzer.
///
/// These never leave [`crate::SymbolExtractor`]: they are folded into a
/// degraded [`crate::AnalysisRecord`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// Source text does not parse
    #[error("invalid syntax (line {line}, column {column})")]
    Syntax { line: usize, column: usize },

    /// Parser produced no tree (cancelled or timed out)
    #[error("Parse error: {0}")]
    ParseError(String),

    /// No analyzer registered for this language
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Tree-sitter error
    #[error("Tree-sitter error: {0}")]
    TreeSitterError(String),
}

impl AnalysisError {
    /// Create a syntax error from a zero-based tree-sitter position
    pub const fn syntax_at(row: usize, column: usize) -> Self {
        Self::Syntax {
            line: row + 1,
            column: column + 1,
        }
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create an unsupported language error
    pub fn unsupported_language(lang: impl Into<String>) -> Self {
        Self::UnsupportedLanguage(lang.into())
    }

    /// Create a tree-sitter error
    pub fn tree_sitter(msg: impl Into<String>) -> Self {
        Self::TreeSitterError(msg.into())
    }
}
