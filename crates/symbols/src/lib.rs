//! # codedoc symbols
//!
//! Best-effort structural outline of ingested source files: imports,
//! classes and functions, for the languages that have an analyzer.
//!
//! ## Architecture
//!
//! ```text
//! (path, content)
//!     │
//!     ├──> Language Detection (from extension)
//!     │
//!     ├──> AnalyzerRegistry lookup
//!     │    ├─> Python: tree-sitter syntax tree walk
//!     │    ├─> JavaScript / TypeScript: regex heuristics
//!     │    └─> anything else: line count only
//!     │
//!     └──> AnalysisRecord (structure | degraded error | summary)
//! ```
//!
//! The extractor never fails: malformed input produces a degraded record
//! that still carries the language and line count.
//!
//! ## Example
//!
//! ```rust
//! use codedoc_symbols::{Language, SymbolExtractor};
//!
//! let extractor = SymbolExtractor::new();
//! let record = extractor.analyze("pkg/util.py", "def helper(x: int) -> int:\n    return x\n");
//!
//! assert_eq!(record.language, Language::Python);
//! assert_eq!(record.function_count(), 1);
//! ```

mod error;
mod heuristic;
mod language;
mod python;
mod registry;
mod types;

pub use error::{AnalysisError, Result};
pub use heuristic::HeuristicAnalyzer;
pub use language::Language;
pub use python::PythonAnalyzer;
pub use registry::{AnalyzerRegistry, LanguageAnalyzer, SymbolExtractor};
pub use types::{
    count_lines, AnalysisDetail, AnalysisRecord, ClassSummary, Fidelity, FileStructure,
    FunctionSummary, Parameter,
};
