use codedoc_ingest::{Collection, FileRecord, IngestStats};
use codedoc_symbols::{count_lines, AnalysisRecord, Language, SymbolExtractor};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// A collected file and, when analysis ran, its outline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyzedFile {
    #[serde(flatten)]
    pub file: FileRecord,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisRecord>,
}

impl AnalyzedFile {
    /// Language tag from the analysis, or from the extension when analysis was skipped
    pub fn language(&self) -> Language {
        self.analysis
            .as_ref()
            .map_or_else(|| Language::from_path(&self.file.path), |a| a.language)
    }

    pub fn line_count(&self) -> usize {
        self.analysis
            .as_ref()
            .map_or_else(|| count_lines(&self.file.content), |a| a.line_count)
    }
}

/// Run the extractor over every record, preserving collection order
pub fn analyze_collection(collection: &Collection, extractor: &SymbolExtractor) -> Vec<AnalyzedFile> {
    collection
        .records
        .iter()
        .map(|record| AnalyzedFile {
            analysis: Some(extractor.analyze(&record.path, &record.content)),
            file: record.clone(),
        })
        .collect()
}

/// Wrap records without running analysis
pub fn skip_analysis(collection: &Collection) -> Vec<AnalyzedFile> {
    collection
        .records
        .iter()
        .map(|record| AnalyzedFile {
            file: record.clone(),
            analysis: None,
        })
        .collect()
}

/// Project-wide totals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectMetrics {
    pub files_processed: usize,
    pub total_lines: usize,
    pub total_functions: usize,
    pub total_classes: usize,
    /// Sorted, without duplicates
    pub languages: Vec<String>,
}

impl ProjectMetrics {
    pub fn from_files(files: &[AnalyzedFile]) -> Self {
        let mut languages = BTreeSet::new();
        let mut metrics = Self {
            files_processed: files.len(),
            ..Self::default()
        };

        for file in files {
            metrics.total_lines += file.line_count();
            if let Some(analysis) = &file.analysis {
                metrics.total_functions += analysis.function_count();
                metrics.total_classes += analysis.class_count();
            }
            languages.insert(file.language().as_str());
        }

        metrics.languages = languages.into_iter().map(str::to_string).collect();
        metrics
    }
}

/// Files keyed by language tag; keys sorted, files in collection order
pub fn group_by_language(files: &[AnalyzedFile]) -> BTreeMap<&'static str, Vec<&AnalyzedFile>> {
    let mut groups: BTreeMap<&'static str, Vec<&AnalyzedFile>> = BTreeMap::new();
    for file in files {
        groups.entry(file.language().as_str()).or_default().push(file);
    }
    groups
}

/// What `codedoc ingest` prints
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub files: Vec<AnalyzedFile>,
    pub stats: IngestStats,
    pub metrics: ProjectMetrics,
}

impl IngestReport {
    /// Analyze `collection` unless `extractor` is `None`
    pub fn build(collection: &Collection, extractor: Option<&SymbolExtractor>) -> Self {
        let files = match extractor {
            Some(extractor) => analyze_collection(collection, extractor),
            None => skip_analysis(collection),
        };
        let metrics = ProjectMetrics::from_files(&files);
        Self {
            files,
            stats: collection.stats,
            metrics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(path: &str, content: &str) -> FileRecord {
        FileRecord {
            path: path.to_string(),
            content: content.to_string(),
            extension: path.rsplit('.').next().unwrap_or("txt").to_string(),
        }
    }

    fn collection() -> Collection {
        Collection {
            records: vec![
                record("app/models.py", "class User:\n    def save(self):\n        pass\n"),
                record("web/index.js", "function boot() {}\nfunction run() {}\n"),
                record("app/views.py", "def index():\n    return 1\n"),
                record("README.md", "# Readme\n"),
            ],
            stats: IngestStats {
                discovered: 4,
                ingested: 4,
                ..IngestStats::default()
            },
        }
    }

    #[test]
    fn metrics_sum_over_analyzed_files() {
        let files = analyze_collection(&collection(), &SymbolExtractor::new());
        let metrics = ProjectMetrics::from_files(&files);
        assert_eq!(
            metrics,
            ProjectMetrics {
                files_processed: 4,
                total_lines: 8,
                total_functions: 4,
                total_classes: 1,
                languages: vec!["javascript".into(), "markdown".into(), "python".into()],
            }
        );
    }

    #[test]
    fn metrics_without_analysis_still_count_lines() {
        let report = IngestReport::build(&collection(), None);
        assert!(report.files.iter().all(|f| f.analysis.is_none()));
        assert_eq!(report.metrics.total_lines, 8);
        assert_eq!(report.metrics.total_functions, 0);
        assert_eq!(report.metrics.languages.len(), 3);
    }

    #[test]
    fn groups_keep_collection_order() {
        let files = analyze_collection(&collection(), &SymbolExtractor::new());
        let groups = group_by_language(&files);
        let keys: Vec<&str> = groups.keys().copied().collect();
        assert_eq!(keys, vec!["javascript", "markdown", "python"]);
        let python: Vec<&str> = groups["python"].iter().map(|f| f.file.path.as_str()).collect();
        assert_eq!(python, vec!["app/models.py", "app/views.py"]);
    }

    #[test]
    fn analyzed_file_serializes_flat() {
        let files = analyze_collection(&collection(), &SymbolExtractor::new());
        let value = serde_json::to_value(&files[3]).unwrap();
        assert_eq!(value["path"], "README.md");
        assert_eq!(value["extension"], "md");
        assert_eq!(value["analysis"]["language"], "markdown");
    }
}
