/// Asset store — source GIF frames and the per-run folder of numbered copies.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::schema::step::CopyRequest;

/// Extension of every animation frame.
pub const ASSET_EXT: &str = "gif";

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("missing asset: {}", path.display())]
    MissingAsset { path: PathBuf },
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Named GIF resources plus an exclusively owned output folder.
pub trait AssetStore {
    /// Delete the output folder and everything in it, then create it empty.
    fn clear_and_recreate(&mut self) -> Result<(), AssetError>;

    /// Copy the `source` asset into the output folder under `dest`.
    fn copy(&mut self, source: &str, dest: &str) -> Result<(), AssetError>;

    /// Perform a planned copy.
    fn copy_request(&mut self, request: &CopyRequest) -> Result<(), AssetError> {
        self.copy(&request.source, &request.dest_name())
    }
}

/// Filesystem-backed store: `<assets_root>/<name>.gif` copied to
/// `<output_root>/<name>_<index>.gif`.
#[derive(Debug, Clone)]
pub struct FsAssetStore {
    assets_root: PathBuf,
    output_root: PathBuf,
}

impl FsAssetStore {
    pub fn new(assets_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            assets_root: assets_root.into(),
            output_root: output_root.into(),
        }
    }

    pub fn source_path(&self, name: &str) -> PathBuf {
        self.assets_root.join(format!("{}.{}", name, ASSET_EXT))
    }

    pub fn dest_path(&self, name: &str) -> PathBuf {
        self.output_root.join(format!("{}.{}", name, ASSET_EXT))
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }
}

impl AssetStore for FsAssetStore {
    fn clear_and_recreate(&mut self) -> Result<(), AssetError> {
        match std::fs::remove_dir_all(&self.output_root) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(AssetError::Io {
                    path: self.output_root.clone(),
                    source,
                })
            }
        }
        std::fs::create_dir_all(&self.output_root).map_err(|source| AssetError::Io {
            path: self.output_root.clone(),
            source,
        })
    }

    fn copy(&mut self, source: &str, dest: &str) -> Result<(), AssetError> {
        let from = self.source_path(source);
        let to = self.dest_path(dest);
        match std::fs::copy(&from, &to) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound && !from.exists() => {
                Err(AssetError::MissingAsset { path: from })
            }
            Err(source) => Err(AssetError::Io { path: to, source }),
        }
    }
}
