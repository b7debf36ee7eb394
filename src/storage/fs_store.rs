use std::path::{Path, PathBuf};

use crate::utils::{Result, UNetError};

use super::{ObjectStore, key_to_relative_path, make_folder};

/// A local directory acting as a bucket. Keys are `/`-separated paths
/// relative to the root.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(UNetError::Storage(format!(
                "Directory not found: {}",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    fn key_for(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<&str> = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<Vec<_>>>()?;
        Some(parts.join("/"))
    }
}

impl ObjectStore for FsObjectStore {
    fn list_objects_by_prefix(&self, prefix: &str, suffix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();

        // iteratively walk the bucket instead of recursing
        let mut stack = vec![self.root.clone()];
        while let Some(dir) = stack.pop() {
            for entry in std::fs::read_dir(&dir)?.filter_map(|e| e.ok()) {
                let path = entry.path();
                if path.is_dir() {
                    stack.push(path);
                    continue;
                }

                if let Some(key) = self.key_for(&path) {
                    if key.starts_with(prefix) && key.ends_with(suffix) {
                        keys.push(key);
                    }
                }
            }
        }

        keys.sort_unstable();
        Ok(keys)
    }

    fn download_object(&self, key: &str, destination: &Path) -> Result<()> {
        let source = self.root.join(key_to_relative_path(key)?);
        if !source.is_file() {
            return Err(UNetError::Storage(format!("No object with key {}", key)));
        }

        if let Some(parent) = destination.parent() {
            make_folder(parent)?;
        }
        std::fs::copy(&source, destination)?;
        Ok(())
    }

    fn upload_object(&self, source: &Path, key: &str) -> Result<()> {
        let destination = self.root.join(key_to_relative_path(key)?);
        if !source.is_file() {
            return Err(UNetError::Storage(format!(
                "Upload source is not a file: {}",
                source.display()
            )));
        }

        if let Some(parent) = destination.parent() {
            make_folder(parent)?;
        }
        std::fs::copy(source, &destination)?;
        Ok(())
    }
}
