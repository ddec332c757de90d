use crate::clone::clone_shallow;
use crate::config::IngestConfig;
use crate::error::{IngestError, Result};
use crate::path_filter::PathFilter;
use crate::types::{Collection, FileRecord, Origin, UploadedFile};
use std::io::{Cursor, Read};
use std::path::Path;
use walkdir::WalkDir;
use zip::result::ZipError;
use zip::ZipArchive;

/// Turns uploads, zip archives and repositories into [`FileRecord`]s
#[derive(Debug, Clone)]
pub struct SourceCollector {
    config: IngestConfig,
    filter: PathFilter,
}

impl SourceCollector {
    pub fn new(config: &IngestConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
            filter: PathFilter::new(config)?,
        })
    }

    pub const fn filter(&self) -> &PathFilter {
        &self.filter
    }

    /// Dispatch on the origin; an empty result fails with [`IngestError::NoEligibleFiles`]
    pub async fn collect(&self, origin: Origin) -> Result<Collection> {
        let collection = match origin {
            Origin::Uploads(files) => self.collect_uploads(&files)?,
            Origin::Archive(bytes) => self.collect_archive(&bytes)?,
            Origin::Repository(url) => self.collect_repository(&url).await?,
        };

        if collection.is_empty() {
            return Err(IngestError::NoEligibleFiles);
        }
        Ok(collection)
    }

    /// Direct uploads, in request order. A `.zip` item is expanded in place.
    pub fn collect_uploads(&self, files: &[UploadedFile]) -> Result<Collection> {
        let named: Vec<&UploadedFile> = files
            .iter()
            .filter(|file| !file.name.trim().is_empty())
            .collect();
        if named.is_empty() {
            return Err(IngestError::NoFilesSelected);
        }

        let total: u64 = named.iter().map(|file| file.bytes.len() as u64).sum();
        if total > self.config.max_upload_bytes {
            return Err(IngestError::PayloadTooLarge {
                size: total,
                limit: self.config.max_upload_bytes,
            });
        }

        let mut collection = Collection::default();
        for file in named {
            let path = sanitize_path(&file.name);

            if path.to_lowercase().ends_with(".zip") {
                log::debug!("Expanding uploaded archive {path}");
                collection.extend(self.collect_archive(&file.bytes)?);
                continue;
            }

            if !self.filter.is_eligible(&path) {
                log::debug!("Skipping unsupported upload {path}");
                collection.stats.filtered += 1;
                continue;
            }
            collection.stats.discovered += 1;

            let content = std::str::from_utf8(&file.bytes).map_err(|_| IngestError::decode(&path))?;
            self.push_text(&mut collection, path, content);
        }

        collection.stats.ingested = collection.records.len();
        log::info!(
            "Collected {} of {} uploaded files",
            collection.stats.ingested,
            collection.stats.discovered
        );
        Ok(collection)
    }

    /// Entries of a zip archive, in archive order. Only an unreadable container
    /// aborts; binary or unreadable entries are skipped.
    pub fn collect_archive(&self, bytes: &[u8]) -> Result<Collection> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut collection = Collection::default();

        for index in 0..archive.len() {
            let name = archive.name_for_index(index).unwrap_or_default().to_string();
            if name.ends_with('/') || name.ends_with('\\') {
                continue;
            }

            let path = sanitize_path(&name);
            if !self.filter.is_eligible(&path) {
                log::debug!("Skipping archive entry {path}");
                collection.stats.filtered += 1;
                continue;
            }
            collection.stats.discovered += 1;

            match read_entry(&mut archive, index) {
                Ok(buf) => self.push_bytes(&mut collection, path, buf),
                Err(err) => {
                    log::warn!("Skipping unreadable archive entry {path}: {err}");
                    collection.stats.skipped_unreadable += 1;
                }
            }
        }

        collection.stats.ingested = collection.records.len();
        log::info!(
            "Collected {} of {} archive entries",
            collection.stats.ingested,
            archive.len()
        );
        Ok(collection)
    }

    /// Shallow-clone `url` into a scratch directory and collect its working tree
    pub async fn collect_repository(&self, url: &str) -> Result<Collection> {
        let url = url.trim();
        if !url.starts_with(&self.config.repository_prefix) {
            return Err(IngestError::InvalidRepositoryUrl {
                url: url.to_string(),
                expected_prefix: self.config.repository_prefix.clone(),
            });
        }

        let mut builder = tempfile::Builder::new();
        builder.prefix("codedoc-clone-");
        let workdir = match &self.config.scratch_dir {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };
        let checkout = workdir.path().join("repo");

        log::info!("Cloning {url}");
        clone_shallow(url, &checkout, self.config.clone_timeout).await?;
        let collection = self.collect_directory(&checkout);

        if let Err(err) = workdir.close() {
            log::warn!("Failed to remove clone directory: {err}");
        }
        collection
    }

    /// Walk a local tree in file-name order, pruning ignored directories
    pub fn collect_directory(&self, root: &Path) -> Result<Collection> {
        let mut collection = Collection::default();

        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry
                        .file_name()
                        .to_str()
                        .is_some_and(|name| self.filter.is_ignored_dir(name))
            });

        for result in walker {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    log::warn!("Failed to read entry: {err}");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            let path = sanitize_path(&relative.to_string_lossy());
            if !self.filter.is_eligible(&path) {
                collection.stats.filtered += 1;
                continue;
            }

            let bytes = match std::fs::read(entry.path()) {
                Ok(bytes) => bytes,
                Err(err) => {
                    log::warn!("Failed to read {path}: {err}");
                    continue;
                }
            };
            collection.stats.discovered += 1;
            self.push_bytes(&mut collection, path, bytes);
        }

        collection.stats.ingested = collection.records.len();
        log::info!("Found {} source files", collection.stats.ingested);
        Ok(collection)
    }

    /// Decode-or-skip, then empty-or-skip
    fn push_bytes(&self, collection: &mut Collection, path: String, bytes: Vec<u8>) {
        match String::from_utf8(bytes) {
            Ok(content) => self.push_text(collection, path, &content),
            Err(_) => {
                log::debug!("Skipping binary file {path}");
                collection.stats.skipped_binary += 1;
            }
        }
    }

    fn push_text(&self, collection: &mut Collection, path: String, content: &str) {
        if content.trim().is_empty() {
            log::debug!("Skipping empty file {path}");
            collection.stats.skipped_empty += 1;
            return;
        }
        collection.records.push(FileRecord {
            extension: PathFilter::extension_of(&path),
            path,
            content: content.to_string(),
        });
    }
}

fn read_entry(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    index: usize,
) -> std::result::Result<Vec<u8>, ZipError> {
    let mut entry = archive.by_index(index)?;
    let mut buf = Vec::new();
    entry.read_to_end(&mut buf)?;
    Ok(buf)
}

/// Relative `/`-separated path with empty, `.` and `..` segments dropped
pub fn sanitize_path(name: &str) -> String {
    name.split(['/', '\\'])
        .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn collector() -> SourceCollector {
        SourceCollector::new(&IngestConfig::default()).unwrap()
    }

    #[test]
    fn sanitizes_upload_names() {
        assert_eq!(sanitize_path(r"..\..\etc\app.py"), "etc/app.py");
        assert_eq!(sanitize_path("./a//b/./c.rs"), "a/b/c.rs");
        assert_eq!(sanitize_path("/abs/x.py"), "abs/x.py");
    }

    #[test]
    fn uploads_keep_request_order() {
        let collection = collector()
            .collect_uploads(&[
                UploadedFile::new("z.py", "print(1)\n"),
                UploadedFile::new("a.js", "let a = 1;\n"),
                UploadedFile::new("image.png", vec![0x89u8, 0x50]),
                UploadedFile::new("blank.md", "  \n"),
            ])
            .unwrap();

        let paths: Vec<&str> = collection.records.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["z.py", "a.js"]);
        assert_eq!(collection.records[0].extension, "py");
        assert_eq!(collection.stats.filtered, 1);
        assert_eq!(collection.stats.skipped_empty, 1);
        assert_eq!(collection.stats.discovered, 3);
        assert_eq!(collection.stats.ingested, 2);
    }

    #[test]
    fn no_named_uploads_is_rejected() {
        let err = collector().collect_uploads(&[]).unwrap_err();
        assert!(matches!(err, IngestError::NoFilesSelected));

        let err = collector()
            .collect_uploads(&[UploadedFile::new("  ", "x")])
            .unwrap_err();
        assert!(matches!(err, IngestError::NoFilesSelected));
    }

    #[test]
    fn upload_over_limit_is_rejected() {
        let config = IngestConfig {
            max_upload_bytes: 8,
            ..IngestConfig::default()
        };
        let collector = SourceCollector::new(&config).unwrap();
        let err = collector
            .collect_uploads(&[
                UploadedFile::new("a.py", "x = 1\n"),
                UploadedFile::new("b.py", "y = 2\n"),
            ])
            .unwrap_err();
        assert!(matches!(err, IngestError::PayloadTooLarge { size: 12, limit: 8 }));
    }

    #[test]
    fn undecodable_upload_aborts() {
        let err = collector()
            .collect_uploads(&[
                UploadedFile::new("ok.py", "x = 1\n"),
                UploadedFile::new("bad.txt", vec![0xffu8, 0xfe, 0x00]),
            ])
            .unwrap_err();
        assert!(matches!(err, IngestError::Decode { ref path } if path == "bad.txt"));
    }

    #[test]
    fn malformed_archive_is_container_error() {
        let err = collector().collect_archive(b"not a zip").unwrap_err();
        assert!(matches!(err, IngestError::Archive(_)), "{err}");
    }

    #[tokio::test]
    async fn invalid_repository_url_is_rejected_before_cloning() {
        let err = collector()
            .collect_repository("https://gitlab.com/user/repo")
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::InvalidRepositoryUrl { .. }), "{err}");

        let err = collector()
            .collect(Origin::Repository("file:///etc".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::InvalidRepositoryUrl { .. }), "{err}");
    }

    #[tokio::test]
    async fn empty_result_is_no_eligible_files() {
        let err = collector()
            .collect(Origin::Uploads(vec![UploadedFile::new("logo.png", vec![1u8, 2, 3])]))
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::NoEligibleFiles));
    }
}
