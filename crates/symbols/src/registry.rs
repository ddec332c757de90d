use crate::error::Result;
use crate::heuristic::HeuristicAnalyzer;
use crate::language::Language;
use crate::python::PythonAnalyzer;
use crate::types::{AnalysisDetail, AnalysisRecord, FileStructure};
use std::collections::HashMap;

/// Structural analyzer for one language
pub trait LanguageAnalyzer: Send + Sync {
    /// Language this analyzer is registered under
    fn language(&self) -> Language;

    /// Extract the structure of `content`. Must not panic on malformed input.
    fn analyze(&self, content: &str) -> Result<FileStructure>;
}

/// Maps a language tag to its analyzer
#[derive(Default)]
pub struct AnalyzerRegistry {
    analyzers: HashMap<Language, Box<dyn LanguageAnalyzer>>,
}

impl AnalyzerRegistry {
    /// Registry with no analyzers; every file gets a summary record
    pub fn empty() -> Self {
        Self::default()
    }

    /// Python via syntax tree, JavaScript and TypeScript via heuristics
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(PythonAnalyzer));
        registry.register(Box::new(HeuristicAnalyzer::javascript()));
        registry.register(Box::new(HeuristicAnalyzer::typescript()));
        registry
    }

    /// Register an analyzer, replacing any previous one for the same language
    pub fn register(&mut self, analyzer: Box<dyn LanguageAnalyzer>) {
        self.analyzers.insert(analyzer.language(), analyzer);
    }

    pub fn get(&self, language: Language) -> Option<&dyn LanguageAnalyzer> {
        self.analyzers.get(&language).map(|a| a.as_ref())
    }

    pub fn supports(&self, language: Language) -> bool {
        self.analyzers.contains_key(&language)
    }
}

impl std::fmt::Debug for AnalyzerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut languages: Vec<_> = self.analyzers.keys().copied().collect();
        languages.sort();
        f.debug_struct("AnalyzerRegistry")
            .field("languages", &languages)
            .finish()
    }
}

/// Produces an [`AnalysisRecord`] for any file; analysis failures degrade
/// instead of propagating
#[derive(Debug)]
pub struct SymbolExtractor {
    registry: AnalyzerRegistry,
}

impl Default for SymbolExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolExtractor {
    pub fn new() -> Self {
        Self::with_registry(AnalyzerRegistry::with_defaults())
    }

    pub const fn with_registry(registry: AnalyzerRegistry) -> Self {
        Self { registry }
    }

    pub const fn registry(&self) -> &AnalyzerRegistry {
        &self.registry
    }

    /// Analyze one file; the language comes from the extension of `file_path`
    pub fn analyze(&self, file_path: &str, content: &str) -> AnalysisRecord {
        let language = Language::from_path(file_path);

        let Some(analyzer) = self.registry.get(language) else {
            return AnalysisRecord::summary(language, file_path, content);
        };

        match analyzer.analyze(content) {
            Ok(structure) => {
                log::debug!(
                    "Analyzed {file_path} ({language}): {} functions, {} classes",
                    structure.functions.len(),
                    structure.classes.len()
                );
                let mut record = AnalysisRecord::summary(language, file_path, content);
                record.detail = AnalysisDetail::Structure(structure);
                record
            }
            Err(e) => {
                log::warn!("Analysis of {file_path} degraded: {e}");
                AnalysisRecord::degraded(language, file_path, content, e.to_string())
            }
        }
    }
}
