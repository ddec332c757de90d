//! Wiring between collection, analysis and output for the `codedoc` binary.

pub mod pipeline;

pub use pipeline::{
    analyze_collection, group_by_language, skip_analysis, AnalyzedFile, IngestReport,
    ProjectMetrics,
};
