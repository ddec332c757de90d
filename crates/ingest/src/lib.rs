//! # codedoc ingest
//!
//! Normalizes an arbitrary source tree into `{path, content, extension}`
//! records.
//!
//! ```text
//! Uploads ─┐
//! Zip ─────┼──> PathFilter (ignored segments, extension allow-list)
//! Git URL ─┘        │
//!                   ├──> UTF-8 decode (binary skipped or rejected)
//!                   ├──> empty-content skip
//!                   └──> Collection { records, stats }
//! ```
//!
//! Ordering is deterministic: upload order, archive entry order, or sorted
//! directory walk order for clones.

mod clone;
mod collector;
mod config;
mod error;
mod path_filter;
mod types;

pub use collector::{sanitize_path, SourceCollector};
pub use config::{
    IngestConfig, DEFAULT_CLONE_TIMEOUT_SECS, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_REPOSITORY_PREFIX,
    IGNORE_PATTERNS, SUPPORTED_EXTENSIONS,
};
pub use error::{ErrorKind, IngestError, Result};
pub use path_filter::PathFilter;
pub use types::{Collection, FileRecord, IngestStats, Origin, UploadedFile};
