use crate::language::Language;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::sync::Arc;

/// Structural summary of one file.
///
/// `detail` carries either the full structure, a degraded error, or nothing
/// beyond the line count; a record can never mix structural fields with an
/// error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRecord {
    /// Language detected from the file extension
    pub language: Language,

    /// Relative path of the analyzed file
    pub file_path: String,

    /// Number of lines in the file content
    pub line_count: usize,

    /// What the analyzer was able to extract
    pub detail: AnalysisDetail,
}

impl AnalysisRecord {
    /// Record with no structural detail (no analyzer for the language)
    pub fn summary(language: Language, file_path: impl Into<String>, content: &str) -> Self {
        Self {
            language,
            file_path: file_path.into(),
            line_count: count_lines(content),
            detail: AnalysisDetail::Summary,
        }
    }

    /// Degraded record after a recoverable analysis failure
    pub fn degraded(
        language: Language,
        file_path: impl Into<String>,
        content: &str,
        error: impl Into<String>,
    ) -> Self {
        Self {
            language,
            file_path: file_path.into(),
            line_count: count_lines(content),
            detail: AnalysisDetail::Degraded {
                error: error.into(),
            },
        }
    }

    #[must_use]
    pub const fn structure(&self) -> Option<&FileStructure> {
        match &self.detail {
            AnalysisDetail::Structure(structure) => Some(structure),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.detail {
            AnalysisDetail::Degraded { error } => Some(error),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        matches!(self.detail, AnalysisDetail::Degraded { .. })
    }

    #[must_use]
    pub fn function_count(&self) -> usize {
        self.structure().map_or(0, |s| s.functions.len())
    }

    #[must_use]
    pub fn class_count(&self) -> usize {
        self.structure().map_or(0, |s| s.classes.len())
    }
}

/// Outcome of analysis for a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisDetail {
    /// Full structural outline
    Structure(FileStructure),

    /// Analysis failed; only `line_count` is meaningful
    Degraded { error: String },

    /// No analyzer for this language
    Summary,
}

/// How structural details were obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Fidelity {
    /// Walked a concrete syntax tree; line numbers and signatures are exact
    SyntaxTree,

    /// Pattern matching over raw text; no arguments, no line numbers
    Heuristic,
}

/// Imports, classes and functions found in a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileStructure {
    pub fidelity: Fidelity,

    /// Imported module references as dotted names, in source order
    pub imports: Vec<String>,

    pub classes: Vec<ClassSummary>,

    /// Every function and method; methods are shared with their class
    pub functions: Vec<Arc<FunctionSummary>>,
}

impl FileStructure {
    pub const fn new(fidelity: Fidelity) -> Self {
        Self {
            fidelity,
            imports: Vec::new(),
            classes: Vec::new(),
            functions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassSummary {
    pub name: String,

    /// Base class expressions as dotted names
    pub bases: Vec<String>,

    /// Same values as the matching entries of [`FileStructure::functions`]
    pub methods: Vec<Arc<FunctionSummary>>,

    /// 1-based line of the definition; `None` when not tracked
    pub line_number: Option<usize>,

    pub docstring: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionSummary {
    pub name: String,
    pub args: Vec<Parameter>,
    pub return_annotation: Option<String>,

    /// 1-based line of the `def`; `None` when not tracked
    pub line_number: Option<usize>,

    pub docstring: Option<String>,

    /// Name of the class whose body directly contains this function
    pub enclosing_class: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub name: String,
    pub type_annotation: Option<String>,
}

impl Serialize for AnalysisRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("language", &self.language)?;
        map.serialize_entry("file_path", &self.file_path)?;
        map.serialize_entry("line_count", &self.line_count)?;
        match &self.detail {
            AnalysisDetail::Structure(structure) => {
                map.serialize_entry("fidelity", &structure.fidelity)?;
                map.serialize_entry("imports", &structure.imports)?;
                map.serialize_entry("classes", &structure.classes)?;
                map.serialize_entry("functions", &structure.functions)?;
            }
            AnalysisDetail::Degraded { error } => {
                map.serialize_entry("error", error)?;
            }
            AnalysisDetail::Summary => {}
        }
        map.end()
    }
}

/// Line count the way a text editor reports it (a trailing newline adds no line)
pub fn count_lines(content: &str) -> usize {
    content.lines().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn summary_record_serializes_without_structure() {
        let record = AnalysisRecord::summary(Language::Go, "main.go", "package main\n\nfunc main() {}\n");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({"language": "go", "file_path": "main.go", "line_count": 3})
        );
    }

    #[test]
    fn degraded_record_carries_only_error() {
        let record = AnalysisRecord::degraded(Language::Python, "a.py", "def (:\n", "invalid syntax");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["error"], "invalid syntax");
        assert!(value.get("functions").is_none());
        assert!(record.is_degraded());
        assert_eq!(record.function_count(), 0);
    }

    #[test]
    fn count_lines_ignores_trailing_newline() {
        assert_eq!(count_lines(""), 0);
        assert_eq!(count_lines("a"), 1);
        assert_eq!(count_lines("a\nb\n"), 2);
        assert_eq!(count_lines("a\r\nb"), 2);
    }
}
