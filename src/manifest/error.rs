use std::fmt;
use std::io;
use std::path::PathBuf;

/// Failure while persisting or loading a manifest.
///
/// A manifest that simply does not exist yet is never an error; see
/// [`read_manifest`](super::read_manifest).
#[derive(Debug)]
pub enum ManifestError {
    /// The manifest could not be read or written.
    Io {
        /// Manifest path involved
        path: PathBuf,
        source: io::Error,
    },
    /// A manifest exists at `path` but is not valid manifest JSON.
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// The in-memory manifest could not be serialized.
    Serialize(serde_json::Error),
}

impl fmt::Display for ManifestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestError::Io { path, source } => {
                write!(f, "manifest I/O failed for {}: {}", path.display(), source)
            }
            ManifestError::Malformed { path, source } => {
                write!(f, "malformed manifest at {}: {}", path.display(), source)
            }
            ManifestError::Serialize(source) => {
                write!(f, "failed to serialize manifest: {source}")
            }
        }
    }
}

impl std::error::Error for ManifestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ManifestError::Io { source, .. } => Some(source),
            ManifestError::Malformed { source, .. } => Some(source),
            ManifestError::Serialize(source) => Some(source),
        }
    }
}

impl ManifestError {
    /// `true` when the manifest existed but could not be parsed.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, ManifestError::Malformed { .. })
    }
}
