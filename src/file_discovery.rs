use crate::error::{ActionError, ConfigError, ConfigResult, Result};
use globset::{GlobBuilder, GlobMatcher};
use ignore::{DirEntry, Walk, WalkBuilder};
use std::path::{Path, PathBuf};

/// Recursive glob-based file discovery rooted at a relative folder.
#[derive(Debug, Clone)]
pub struct FileDiscovery {
    /// Folder to search, relative to the workspace
    root: PathBuf,
    /// Pattern as given by the user
    pattern: String,
    /// Compiled pattern, anchored at any depth below the root
    matcher: GlobMatcher,
}

impl FileDiscovery {
    /// Create a new FileDiscovery instance.
    ///
    /// Fails before anything is read if `root` is absolute or `pattern` is
    /// not a valid glob.
    pub fn new(root: impl Into<PathBuf>, pattern: &str) -> ConfigResult<Self> {
        let root = root.into();
        if root.is_absolute() {
            return Err(ConfigError::AbsoluteRoot { path: root });
        }

        let recursive = if pattern.starts_with("**/") || pattern == "**" {
            pattern.to_string()
        } else {
            format!("**/{pattern}")
        };

        let matcher = GlobBuilder::new(&recursive)
            .literal_separator(true)
            .build()
            .map_err(|e| ConfigError::InvalidPattern {
                pattern: pattern.to_string(),
                details: e.to_string(),
            })?
            .compile_matcher();

        Ok(Self {
            root,
            pattern: pattern.to_string(),
            matcher,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Start a fresh traversal of `workspace/root`.
    ///
    /// Files are yielded lazily, sorted by name within each directory. A root
    /// that does not exist yields nothing.
    pub fn walk(&self, workspace: &Path) -> MatchingFiles {
        let base: PathBuf = workspace.join(&self.root).components().collect();
        let walk = if base.exists() {
            Some(
                WalkBuilder::new(&base)
                    .standard_filters(false)
                    .follow_links(false)
                    .sort_by_file_name(|a, b| a.cmp(b))
                    .build(),
            )
        } else {
            tracing::warn!("Root folder {} does not exist, nothing to check", base.display());
            None
        };

        MatchingFiles {
            walk,
            base,
            discovery: self.clone(),
        }
    }

    /// Check if a path relative to the root matches the pattern
    pub fn should_process(&self, relative: &Path) -> bool {
        self.matcher.is_match(relative)
    }
}

/// Lazy sequence of regular files matching a [`FileDiscovery`] pattern.
pub struct MatchingFiles {
    walk: Option<Walk>,
    base: PathBuf,
    discovery: FileDiscovery,
}

impl Iterator for MatchingFiles {
    type Item = Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walk.as_mut()?.next()? {
                Ok(entry) => entry,
                // unreadable entries below the root are skipped
                Err(e) if e.depth().is_some_and(|depth| depth > 0) => {
                    tracing::warn!("Skipping unreadable entry under {}: {}", self.base.display(), e);
                    continue;
                }
                Err(e) => {
                    return Some(Err(ActionError::FileSystemTraversal {
                        path: self.base.clone(),
                        reason: e.to_string(),
                    }));
                }
            };

            if !is_regular_file(&entry) {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(&self.base) else {
                continue;
            };
            if self.discovery.should_process(relative) {
                return Some(Ok(entry.into_path()));
            }
        }
    }
}

/// Regular files, and symbolic links that resolve to one.
fn is_regular_file(entry: &DirEntry) -> bool {
    match entry.file_type() {
        Some(file_type) if file_type.is_file() => true,
        Some(file_type) if file_type.is_symlink() => match std::fs::metadata(entry.path()) {
            Ok(metadata) => metadata.is_file(),
            Err(e) => {
                tracing::debug!("Skipping broken link {}: {}", entry.path().display(), e);
                false
            }
        },
        _ => false,
    }
}
