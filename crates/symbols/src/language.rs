use crate::error::{AnalysisError, Result};
use serde::{Serialize, Serializer};
use std::fmt;

/// Language of an ingested file, detected from its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Java,
    C,
    Cpp,
    Go,
    Rust,
    Php,
    Ruby,
    Swift,
    Kotlin,
    Scala,
    R,
    Sql,
    Html,
    Css,
    Vue,
    Svelte,
    Markdown,
    Yaml,
    Json,
    Xml,
    Toml,
    Ini,
    Shell,
    Batch,
    PowerShell,
    Text,
    Unknown,
}

impl Language {
    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "py" | "pyi" => Language::Python,
            "js" | "jsx" | "mjs" | "cjs" => Language::JavaScript,
            "ts" | "tsx" => Language::TypeScript,
            "java" => Language::Java,
            "c" => Language::C,
            "cpp" | "cc" | "cxx" | "h" | "hpp" => Language::Cpp,
            "go" => Language::Go,
            "rs" => Language::Rust,
            "php" => Language::Php,
            "rb" => Language::Ruby,
            "swift" => Language::Swift,
            "kt" => Language::Kotlin,
            "scala" => Language::Scala,
            "r" => Language::R,
            "sql" => Language::Sql,
            "html" | "htm" => Language::Html,
            "css" | "scss" | "sass" => Language::Css,
            "vue" => Language::Vue,
            "svelte" => Language::Svelte,
            "md" | "mdx" => Language::Markdown,
            "yaml" | "yml" => Language::Yaml,
            "json" => Language::Json,
            "xml" => Language::Xml,
            "toml" => Language::Toml,
            "ini" | "cfg" => Language::Ini,
            "sh" | "bash" | "zsh" => Language::Shell,
            "bat" | "cmd" => Language::Batch,
            "ps1" => Language::PowerShell,
            "txt" => Language::Text,
            _ => Language::Unknown,
        }
    }

    /// Detect language from a relative path; both `/` and `\` separate segments
    pub fn from_path(path: &str) -> Self {
        let name = path.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(path);
        match name.rfind('.') {
            Some(idx) if idx > 0 && idx + 1 < name.len() => Self::from_extension(&name[idx + 1..]),
            _ => Language::Unknown,
        }
    }

    /// Get language name as string
    pub const fn as_str(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Java => "java",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::Php => "php",
            Language::Ruby => "ruby",
            Language::Swift => "swift",
            Language::Kotlin => "kotlin",
            Language::Scala => "scala",
            Language::R => "r",
            Language::Sql => "sql",
            Language::Html => "html",
            Language::Css => "css",
            Language::Vue => "vue",
            Language::Svelte => "svelte",
            Language::Markdown => "markdown",
            Language::Yaml => "yaml",
            Language::Json => "json",
            Language::Xml => "xml",
            Language::Toml => "toml",
            Language::Ini => "ini",
            Language::Shell => "shell",
            Language::Batch => "batch",
            Language::PowerShell => "powershell",
            Language::Text => "text",
            Language::Unknown => "unknown",
        }
    }

    /// Check if this language is analyzed from a syntax tree
    pub const fn supports_ast(self) -> bool {
        matches!(self, Language::Python)
    }

    /// Get Tree-sitter language instance
    pub fn tree_sitter_language(self) -> Result<tree_sitter::Language> {
        match self {
            Language::Python => Ok(tree_sitter_python::LANGUAGE.into()),
            _ => Err(AnalysisError::unsupported_language(self.as_str())),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
