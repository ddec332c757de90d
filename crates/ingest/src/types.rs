use serde::Serialize;

/// One ingested text file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    /// Relative, `/`-separated path
    pub path: String,

    /// UTF-8 text; never empty after trimming
    pub content: String,

    /// Lowercase extension without the dot; `txt` when the name has none
    pub extension: String,
}

/// A named byte payload from a direct upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Where a collection request gets its files from
#[derive(Debug, Clone)]
pub enum Origin {
    Uploads(Vec<UploadedFile>),
    Archive(Vec<u8>),
    Repository(String),
}

/// Counters for one collection request.
///
/// `discovered` counts entries that passed the path filter, so
/// `ingested == discovered - skipped_binary - skipped_empty - skipped_unreadable`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub discovered: usize,
    pub ingested: usize,
    /// Rejected by the path filter
    pub filtered: usize,
    /// Not valid UTF-8
    pub skipped_binary: usize,
    /// Empty after trimming
    pub skipped_empty: usize,
    /// Archive entries that could not be read (checksum, encryption, compression method)
    pub skipped_unreadable: usize,
}

impl IngestStats {
    pub(crate) fn merge(&mut self, other: Self) {
        self.discovered += other.discovered;
        self.ingested += other.ingested;
        self.filtered += other.filtered;
        self.skipped_binary += other.skipped_binary;
        self.skipped_empty += other.skipped_empty;
        self.skipped_unreadable += other.skipped_unreadable;
    }
}

/// Records in deterministic order plus the counters that produced them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Collection {
    pub records: Vec<FileRecord>,
    pub stats: IngestStats,
}

impl Collection {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn extend(&mut self, other: Collection) {
        self.records.extend(other.records);
        self.stats.merge(other.stats);
    }
}
