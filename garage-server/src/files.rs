//! Resolution of import file names.

use std::path::{Component, Path, PathBuf};

use crate::errors::ResolveError;

/// Maps a caller-supplied file identifier to an absolute path on disk.
pub trait FileResolver: Send + Sync {
    fn resolve(&self, file_name: &str) -> Result<PathBuf, ResolveError>;
}

/// Resolves bare file names inside a single import directory.
///
/// Anything that is not a single plain path component (separators, `..`,
/// absolute paths) is rejected, so callers cannot reach outside the directory.
#[derive(Debug, Clone)]
pub struct DirectoryResolver {
    root: PathBuf,
}

impl DirectoryResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileResolver for DirectoryResolver {
    fn resolve(&self, file_name: &str) -> Result<PathBuf, ResolveError> {
        let file_name = file_name.trim();
        if file_name.is_empty() {
            return Err(ResolveError::Empty);
        }

        let mut components = Path::new(file_name).components();
        let plain = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !plain || file_name.contains(['/', '\\']) {
            return Err(ResolveError::InvalidName(file_name.to_string()));
        }

        let path = self.root.join(file_name);
        if !path.is_file() {
            return Err(ResolveError::NotFound(path));
        }
        path.canonicalize().map_err(|_| ResolveError::NotFound(path))
    }
}
