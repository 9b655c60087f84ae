use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Searches for executables by name, honouring optional suffixes and extra
/// directories that are checked after the search path.
#[derive(Debug, Clone, Default)]
pub struct BinaryLocator {
    search_path: Option<OsString>,
}

impl BinaryLocator {
    /// A locator over the process `PATH`.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            search_path: std::env::var_os("PATH"),
        }
    }

    /// A locator over an explicit `PATH`-style list of directories.
    #[must_use]
    pub fn with_search_path(search_path: impl Into<OsString>) -> Self {
        Self {
            search_path: Some(search_path.into()),
        }
    }

    /// Find `name` as an executable file.
    ///
    /// The search path is tried first, in order, then every directory in
    /// `extra_dirs`. Within each directory the bare name is tried before each
    /// `name.<suffix>`; a leading dot on a suffix is optional. The first hit
    /// wins and is returned as an absolute path.
    #[must_use]
    pub fn find(&self, name: &str, suffixes: &[&str], extra_dirs: &[PathBuf]) -> Option<PathBuf> {
        let candidates = candidate_names(name, suffixes);

        for dir in self.directories(extra_dirs) {
            for candidate in &candidates {
                trace!(dir = %dir.display(), candidate = %candidate, "Probing for binary");
                if let Ok(found) = which::which_in(candidate, Some(dir.as_os_str()), &dir) {
                    let found = std::path::absolute(&found).unwrap_or(found);
                    debug!(binary = %found.display(), "Found binary");
                    return Some(found);
                }
            }
        }

        debug!(name, "Binary not found");
        None
    }

    fn directories(&self, extra_dirs: &[PathBuf]) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = match &self.search_path {
            Some(path) => std::env::split_paths(path)
                .filter(|d| !d.as_os_str().is_empty())
                .collect(),
            None => Vec::new(),
        };
        dirs.extend_from_slice(extra_dirs);
        dirs
    }
}

fn candidate_names(name: &str, suffixes: &[&str]) -> Vec<String> {
    let mut names = vec![name.to_string()];
    for suffix in suffixes {
        let suffix = suffix.trim_start_matches('.');
        if suffix.is_empty() {
            continue;
        }
        let candidate = format!("{name}.{suffix}");
        if !names.contains(&candidate) {
            names.push(candidate);
        }
    }
    names
}

/// `start` followed by each of its ancestors up to the filesystem root.
#[must_use]
pub fn ancestor_dirs(start: &Path) -> Vec<PathBuf> {
    start.ancestors().map(Path::to_path_buf).collect()
}
