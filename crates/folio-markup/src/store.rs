//! Loading and saving page text.

use std::fs;
use std::path::{Component, Path, PathBuf};

use folio_core::StoreError;

/// Where a page's text is read from and written to.
pub trait DocumentStore {
    fn load(&self) -> Result<String, StoreError>;
    fn save(&self, text: &str) -> Result<(), StoreError>;
}

/// A page stored as `<root>/<page>`, where `page` is a relative path
/// ending in `index.html`.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    depth: usize,
}

impl FileStore {
    pub fn new(root: impl AsRef<Path>, page: impl AsRef<Path>) -> Result<Self, StoreError> {
        let page = page.as_ref();
        let display = page.display().to_string();

        if page.file_name().map_or(true, |name| name != "index.html") {
            return Err(StoreError::UnsupportedPath { path: display });
        }
        if !page.components().all(|c| matches!(c, Component::Normal(_))) {
            return Err(StoreError::PathNotAllowed { path: display });
        }

        Ok(Self {
            path: root.as_ref().join(page),
            depth: page.components().count() - 1,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Relative prefix from the page back to the store root, e.g. `"../"`
    /// for `blog/index.html`.
    pub fn root_prefix(&self) -> String {
        "../".repeat(self.depth)
    }
}

impl DocumentStore for FileStore {
    fn load(&self) -> Result<String, StoreError> {
        Ok(fs::read_to_string(&self.path)?)
    }

    fn save(&self, text: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, text)?;
        log::debug!("saved {} bytes to {}", text.len(), self.path.display());
        Ok(())
    }
}
