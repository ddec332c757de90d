use crate::config::IngestConfig;
use crate::error::{IngestError, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::collections::HashSet;

/// Decides whether a relative path is ingested
#[derive(Debug, Clone)]
pub struct PathFilter {
    ignored: GlobSet,
    extensions: HashSet<String>,
}

impl PathFilter {
    pub fn new(config: &IngestConfig) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &config.ignore_patterns {
            let glob = GlobBuilder::new(pattern)
                .case_insensitive(true)
                .literal_separator(true)
                .build()
                .map_err(|err| {
                    IngestError::invalid_config(format!("ignore pattern '{pattern}': {err}"))
                })?;
            builder.add(glob);
        }
        let ignored = builder
            .build()
            .map_err(|err| IngestError::invalid_config(format!("ignore patterns: {err}")))?;

        let extensions = config
            .supported_extensions
            .iter()
            .map(|ext| ext.to_lowercase())
            .collect();

        Ok(Self {
            ignored,
            extensions,
        })
    }

    /// Accept when no segment is ignored and the extension is allowed
    pub fn is_eligible(&self, path: &str) -> bool {
        let mut segments = path.split(['/', '\\']).filter(|s| !s.is_empty()).peekable();
        let mut last = None;
        while let Some(segment) = segments.next() {
            if self.is_ignored_dir(segment) {
                return false;
            }
            if segments.peek().is_none() {
                last = Some(segment);
            }
        }

        last.and_then(extension)
            .is_some_and(|ext| self.extensions.contains(&ext))
    }

    /// Whether a single path segment matches an ignore pattern
    pub fn is_ignored_dir(&self, name: &str) -> bool {
        self.ignored.is_match(name)
    }

    /// Lowercase extension of the final segment, `txt` when there is none
    pub fn extension_of(path: &str) -> String {
        path.rsplit(['/', '\\'])
            .next()
            .and_then(extension)
            .unwrap_or_else(|| "txt".to_string())
    }
}

/// `.bashrc` has no extension; `a.` has an empty one and is treated as none
fn extension(name: &str) -> Option<String> {
    let idx = name.rfind('.')?;
    if idx == 0 || idx + 1 == name.len() {
        return None;
    }
    Some(name[idx + 1..].to_lowercase())
}
