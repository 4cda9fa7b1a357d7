//! Classification of paths that regeneration must never delete.
//!
//! Hand-written business logic lives under two directory prefixes; a handful of
//! environment, lock and manifest files are protected wherever they appear.
//! Everything else in a generated service (`src/core`, `tests/core`,
//! `tests/factories`, `docs`, ...) is owned by the generator.

use std::borrow::Cow;
use std::collections::BTreeSet;

/// Directory prefixes holding custom code, relative to a service root.
pub const PROTECTED_DIRS: [&str; 2] = ["src/domain", "tests/domain"];

/// File names protected regardless of the directory they live in.
pub const PROTECTED_FILES: [&str; 8] = [
    ".env",
    ".env.local",
    ".env.production",
    ".env.test",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    ".generated-manifest.json",
];

/// Normalize a relative path for matching: `\` becomes `/`, a leading `./`
/// and any trailing `/` are dropped.
fn normalize(path: &str) -> Cow<'_, str> {
    let replaced: Cow<'_, str> = if path.contains('\\') {
        Cow::Owned(path.replace('\\', "/"))
    } else {
        Cow::Borrowed(path)
    };
    let trimmed = replaced.trim_start_matches("./").trim_end_matches('/');
    if trimmed.len() == replaced.len() {
        replaced
    } else {
        Cow::Owned(trimmed.to_string())
    }
}

fn under_dir(path: &str, dir: &str) -> bool {
    path == dir
        || path
            .strip_prefix(dir)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Returns `true` when `path` (relative to a service root) must survive
/// regeneration.
///
/// Pure and total: empty or malformed input classifies as unprotected.
/// Directory protection is a prefix match on whole segments, so `src/domainx`
/// is not protected. File protection matches the trailing segment only.
///
/// ```
/// use msgen::regen::is_protected_path;
///
/// assert!(is_protected_path("src/domain/orders/service.js"));
/// assert!(is_protected_path("src\\domain\\orders"));
/// assert!(is_protected_path("config/.env.local"));
/// assert!(!is_protected_path("src/core/controllers/order.js"));
/// ```
#[must_use]
pub fn is_protected_path(path: &str) -> bool {
    ProtectedPaths::canonical().is_protected(path)
}

/// The set of protected directory prefixes and file names.
///
/// [`ProtectedPaths::canonical`] is the set the generator always honours.
/// Extra file names may be layered on top from configuration, but the two
/// protected directories never change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedPaths {
    dirs: Vec<&'static str>,
    files: BTreeSet<String>,
}

impl Default for ProtectedPaths {
    fn default() -> Self {
        Self::canonical()
    }
}

impl ProtectedPaths {
    #[must_use]
    pub fn canonical() -> Self {
        Self {
            dirs: PROTECTED_DIRS.to_vec(),
            files: PROTECTED_FILES.iter().map(|f| (*f).to_string()).collect(),
        }
    }

    /// Extend the protected file-name set. Names containing a separator are
    /// reduced to their last segment.
    #[must_use]
    pub fn with_extra_files<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let normalized = normalize(name.as_ref());
            let base = file_name(&normalized);
            if !base.is_empty() {
                self.files.insert(base.to_string());
            }
        }
        self
    }

    /// Protected directory prefixes in canonical order.
    #[must_use]
    pub fn dirs(&self) -> &[&'static str] {
        &self.dirs
    }

    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(String::as_str)
    }

    /// Directory prefixes as owned strings, the form recorded in manifests.
    #[must_use]
    pub fn dir_list(&self) -> Vec<String> {
        self.dirs.iter().map(|d| (*d).to_string()).collect()
    }

    #[must_use]
    pub fn is_protected(&self, path: &str) -> bool {
        let normalized = normalize(path);
        if normalized.is_empty() {
            return false;
        }
        if self.dirs.iter().any(|dir| under_dir(&normalized, dir)) {
            return true;
        }
        self.files.contains(file_name(&normalized))
    }
}
