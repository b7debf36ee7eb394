//! Staging of training imagery from an object store onto local disk.

pub mod credentials;
pub mod fs_store;

use std::path::{Component, Path, PathBuf};

use log::{info, warn};

use crate::utils::{Result, UNetError};

pub use credentials::StorageCredentials;
pub use fs_store::FsObjectStore;

pub trait ObjectStore {
    /// Keys starting with `prefix` and ending with `suffix`, in key order.
    fn list_objects_by_prefix(&self, prefix: &str, suffix: &str) -> Result<Vec<String>>;

    fn download_object(&self, key: &str, destination: &Path) -> Result<()>;

    fn upload_object(&self, source: &Path, key: &str) -> Result<()>;
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct StageReport {
    pub downloaded: Vec<PathBuf>,
    pub failed: Vec<(String, String)>,
}

/// Relative path for a `/`-separated key. Empty keys and keys with root,
/// `.` or `..` components are rejected so a key can never leave the
/// directory it is joined onto.
pub fn key_to_relative_path(key: &str) -> Result<PathBuf> {
    let path = Path::new(key);
    let plain = path.components().all(|c| matches!(c, Component::Normal(_)));

    if key.is_empty() || !plain {
        return Err(UNetError::Storage(format!("Unsafe object key {:?}", key)));
    }
    Ok(path.to_path_buf())
}

/// Creates `path` and any missing parents. An existing directory is fine.
pub fn make_folder(path: impl AsRef<Path>) -> Result<()> {
    std::fs::create_dir_all(path)?;
    Ok(())
}

/// Downloads every object under `prefix` into `dest_root`, keeping the key
/// layout. A failed object is logged and recorded, the rest still download.
pub fn stage_objects(
    store: &dyn ObjectStore,
    prefix: &str,
    dest_root: impl AsRef<Path>,
) -> Result<StageReport> {
    let dest_root = dest_root.as_ref();
    make_folder(dest_root)?;

    let keys = store.list_objects_by_prefix(prefix, "")?;
    let mut report = StageReport::default();

    for key in keys {
        let destination = match key_to_relative_path(&key) {
            Ok(relative) => dest_root.join(relative),
            Err(err) => {
                warn!("Skipping {}: {}", key, err);
                report.failed.push((key, err.to_string()));
                continue;
            }
        };
        info!("Downloading {}", key);

        match store.download_object(&key, &destination) {
            Ok(()) => report.downloaded.push(destination),
            Err(err) => {
                warn!("Download error for {}: {}", key, err);
                report.failed.push((key, err.to_string()));
            }
        }
    }

    Ok(report)
}
