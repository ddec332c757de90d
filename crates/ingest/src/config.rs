use crate::error::{IngestError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Extensions accepted by default (lowercase, no dot)
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "bash", "bat", "c", "cc", "cfg", "cjs", "cmd", "cpp", "css", "cxx", "go", "h", "hpp",
    "htm", "html", "ini", "java", "js", "json", "jsx", "kt", "md", "mdx", "mjs", "php", "ps1",
    "py", "pyi", "r", "rb", "rs", "sass", "scala", "scss", "sh", "sql", "svelte", "swift",
    "toml", "ts", "tsx", "txt", "vue", "xml", "yaml", "yml", "zsh",
];

/// Path segments rejected by default; glob syntax, matched case-insensitively
pub const IGNORE_PATTERNS: &[&str] = &[
    ".git",
    "__pycache__",
    "node_modules",
    ".vscode",
    ".idea",
    "dist",
    "build",
    "target",
    "bin",
    "obj",
    "venv",
    "env",
    ".DS_Store",
    "Thumbs.db",
    ".gitignore",
    ".env",
    "*.pyc",
    "*.class",
    "*.o",
    "*.so",
    "*.dll",
    "*.exe",
];

pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;
pub const DEFAULT_CLONE_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_REPOSITORY_PREFIX: &str = "https://github.com/";

/// Read-only ingestion settings, built once and passed by reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestConfig {
    /// Allowed file extensions (lowercase, without the dot)
    pub supported_extensions: Vec<String>,

    /// Glob patterns; a path is rejected when any segment matches one
    pub ignore_patterns: Vec<String>,

    /// Upper bound on the summed size of one upload request
    pub max_upload_bytes: u64,

    /// Hard limit on `git clone`
    #[serde(rename = "clone_timeout_secs", serialize_with = "serialize_secs")]
    pub clone_timeout: Duration,

    /// Repository URLs must start with this
    pub repository_prefix: String,

    /// Parent directory for clone checkouts; the system temp dir when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scratch_dir: Option<PathBuf>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            supported_extensions: SUPPORTED_EXTENSIONS.iter().map(|s| (*s).to_string()).collect(),
            ignore_patterns: IGNORE_PATTERNS.iter().map(|s| (*s).to_string()).collect(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            clone_timeout: Duration::from_secs(DEFAULT_CLONE_TIMEOUT_SECS),
            repository_prefix: DEFAULT_REPOSITORY_PREFIX.to_string(),
            scratch_dir: None,
        }
    }
}

/// Optional overlay read from a config file; absent fields keep their defaults
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawIngestConfig {
    supported_extensions: Option<Vec<String>>,
    /// Added on top of `supported_extensions` instead of replacing it
    extra_extensions: Option<Vec<String>>,
    ignore_patterns: Option<Vec<String>>,
    extra_ignore_patterns: Option<Vec<String>>,
    max_upload_bytes: Option<u64>,
    clone_timeout_secs: Option<u64>,
    repository_prefix: Option<String>,
    scratch_dir: Option<PathBuf>,
}

impl IngestConfig {
    /// Load from a JSON or TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes).map_err(|err| match err {
            IngestError::InvalidConfig(msg) => {
                IngestError::invalid_config(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Parse JSON or TOML bytes and merge them over the defaults
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let raw = parse_raw(bytes)?;
        let mut config = Self::default();

        if let Some(extensions) = raw.supported_extensions {
            config.supported_extensions = extensions;
        }
        config
            .supported_extensions
            .extend(raw.extra_extensions.unwrap_or_default());
        if let Some(patterns) = raw.ignore_patterns {
            config.ignore_patterns = patterns;
        }
        config
            .ignore_patterns
            .extend(raw.extra_ignore_patterns.unwrap_or_default());
        if let Some(limit) = raw.max_upload_bytes {
            config.max_upload_bytes = limit;
        }
        if let Some(secs) = raw.clone_timeout_secs {
            config.clone_timeout = Duration::from_secs(secs);
        }
        if let Some(prefix) = raw.repository_prefix {
            config.repository_prefix = prefix;
        }
        if raw.scratch_dir.is_some() {
            config.scratch_dir = raw.scratch_dir;
        }

        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make every request fail
    pub fn validate(&self) -> Result<()> {
        if self.supported_extensions.is_empty() {
            return Err(IngestError::invalid_config("supported_extensions is empty"));
        }
        if let Some(bad) = self
            .supported_extensions
            .iter()
            .find(|ext| ext.is_empty() || ext.contains(['.', '/', '\\']))
        {
            return Err(IngestError::invalid_config(format!(
                "extension '{bad}' must be a bare extension without dots or separators"
            )));
        }
        if self.max_upload_bytes == 0 {
            return Err(IngestError::invalid_config("max_upload_bytes must be positive"));
        }
        if self.clone_timeout.is_zero() {
            return Err(IngestError::invalid_config("clone_timeout_secs must be positive"));
        }
        if self.repository_prefix.trim().is_empty() {
            return Err(IngestError::invalid_config("repository_prefix is empty"));
        }
        Ok(())
    }

    /// Lowercase extensions, strip leading dots, drop duplicates
    fn normalize(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.supported_extensions = self
            .supported_extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| seen.insert(ext.clone()))
            .collect();
    }
}

fn parse_raw(bytes: &[u8]) -> Result<RawIngestConfig> {
    let value: serde_json::Value = match serde_json::from_slice(bytes) {
        Ok(value) => value,
        Err(json_err) => {
            let utf8 = std::str::from_utf8(bytes)
                .map_err(|err| IngestError::invalid_config(format!("{json_err}; {err}")))?;
            let toml_value: toml::Value = toml::from_str(utf8).map_err(|toml_err| {
                IngestError::invalid_config(format!(
                    "not valid JSON or TOML ({json_err}); TOML parse error: {toml_err}"
                ))
            })?;
            serde_json::to_value(toml_value).map_err(|err| {
                IngestError::invalid_config(format!("failed to convert TOML config: {err}"))
            })?
        }
    };

    serde_json::from_value(value).map_err(|err| IngestError::invalid_config(err.to_string()))
}

fn serialize_secs<S: serde::Serializer>(
    duration: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_service_limits() {
        let config = IngestConfig::default();
        assert_eq!(config.max_upload_bytes, 104_857_600);
        assert_eq!(config.clone_timeout, Duration::from_secs(300));
        assert_eq!(config.repository_prefix, "https://github.com/");
        assert!(config.supported_extensions.iter().any(|e| e == "py"));
        assert!(config.ignore_patterns.iter().any(|p| p == "node_modules"));
        config.validate().unwrap();
    }

    #[test]
    fn toml_overlay_merges_over_defaults() {
        let config = IngestConfig::from_bytes(
            br#"
extra_extensions = [".Proto"]
clone_timeout_secs = 30
repository_prefix = "https://git.example.com/"
"#,
        )
        .unwrap();
        assert!(config.supported_extensions.iter().any(|e| e == "proto"));
        assert!(config.supported_extensions.iter().any(|e| e == "rs"));
        assert_eq!(config.clone_timeout, Duration::from_secs(30));
        assert_eq!(config.repository_prefix, "https://git.example.com/");
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    fn json_replaces_lists() {
        let config =
            IngestConfig::from_bytes(br#"{"supported_extensions": ["PY", "py"], "ignore_patterns": []}"#)
                .unwrap();
        assert_eq!(config.supported_extensions, vec!["py"]);
        assert!(config.ignore_patterns.is_empty());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = IngestConfig::from_bytes(b"max_upload = 5\n").unwrap_err();
        assert!(matches!(err, IngestError::InvalidConfig(_)), "{err}");
    }

    #[test]
    fn zero_timeout_is_invalid() {
        let err = IngestConfig::from_bytes(b"clone_timeout_secs = 0\n").unwrap_err();
        assert!(err.to_string().contains("clone_timeout_secs"), "{err}");
    }

    #[test]
    fn serializes_timeout_as_seconds() {
        let value = serde_json::to_value(IngestConfig::default()).unwrap();
        assert_eq!(value["clone_timeout_secs"], 300);
        assert!(value.get("clone_timeout").is_none());
    }
}
