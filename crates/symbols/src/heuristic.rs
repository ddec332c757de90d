use crate::error::Result;
use crate::language::Language;
use crate::registry::LanguageAnalyzer;
use crate::types::{ClassSummary, Fidelity, FileStructure, FunctionSummary};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

static FUNCTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"function\s+(\w+)\s*\([^)]*\)").expect("valid function regex"));

static CLASS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"class\s+(\w+)").expect("valid class regex"));

static IMPORT_FROM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"import\s+.*?from\s+['"]([^'"]+)['"]"#).expect("valid import regex")
});

static BARE_IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^\s*import\s+['"]([^'"]+)['"]"#).expect("valid bare import regex")
});

static REQUIRE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\brequire\s*\(\s*['"]([^'"]+)['"]\s*\)"#).expect("valid require regex")
});

/// Pattern-matching analyzer for JavaScript-family sources.
///
/// Only names are recovered: no arguments, bases, docstrings or line numbers.
#[derive(Debug, Clone, Copy)]
pub struct HeuristicAnalyzer {
    language: Language,
}

impl HeuristicAnalyzer {
    pub const fn new(language: Language) -> Self {
        Self { language }
    }

    pub const fn javascript() -> Self {
        Self::new(Language::JavaScript)
    }

    pub const fn typescript() -> Self {
        Self::new(Language::TypeScript)
    }
}

impl LanguageAnalyzer for HeuristicAnalyzer {
    fn language(&self) -> Language {
        self.language
    }

    fn analyze(&self, content: &str) -> Result<FileStructure> {
        let mut structure = FileStructure::new(Fidelity::Heuristic);

        let mut imports: Vec<(usize, String)> = Vec::new();
        for re in [&*IMPORT_FROM_RE, &*BARE_IMPORT_RE, &*REQUIRE_RE] {
            for caps in re.captures_iter(content) {
                if let Some(module) = caps.get(1) {
                    imports.push((module.start(), module.as_str().to_string()));
                }
            }
        }
        // source order across the three patterns
        imports.sort_by_key(|(pos, _)| *pos);
        imports.dedup_by_key(|(pos, _)| *pos);
        structure.imports = imports.into_iter().map(|(_, module)| module).collect();

        structure.functions = FUNCTION_RE
            .captures_iter(content)
            .filter_map(|caps| caps.get(1))
            .map(|name| {
                Arc::new(FunctionSummary {
                    name: name.as_str().to_string(),
                    args: Vec::new(),
                    return_annotation: None,
                    line_number: None,
                    docstring: None,
                    enclosing_class: None,
                })
            })
            .collect();

        structure.classes = CLASS_RE
            .captures_iter(content)
            .filter_map(|caps| caps.get(1))
            .map(|name| ClassSummary {
                name: name.as_str().to_string(),
                bases: Vec::new(),
                methods: Vec::new(),
                line_number: None,
                docstring: None,
            })
            .collect();

        Ok(structure)
    }
}
