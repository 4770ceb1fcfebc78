//! On-disk storage of per-region intermediates.
//!
//! Every region leaves a crop image and a fragment, both named after the
//! region's key with each coordinate zero-padded to eight digits. Directory
//! order therefore equals merge order, and a directory of fragments can be
//! merged again later without the regions that produced it.
//!
//! Regions that share bounds get a sequence suffix after the first one:
//! `<stem>.hocr`, `<stem>.1.hocr`, `<stem>.2.hocr`.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::{Error, Result};
use crate::hocr::Fragment;
use crate::layout::RegionKey;

const IMAGE_EXT: &str = "png";
const FRAGMENT_EXT: &str = "hocr";

/// Name of one region's artifacts: its key plus the number of earlier
/// regions in the same run with identical bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ArtifactId {
    /// Region the artifacts belong to
    pub key: RegionKey,
    /// Zero for the first region with these bounds
    pub seq: u32,
}

impl ArtifactId {
    /// Id of the first region with bounds `key`.
    pub fn new(key: RegionKey) -> Self {
        Self { key, seq: 0 }
    }

    /// File stem: the key's padded stem, plus `.<seq>` after the first.
    pub fn file_stem(&self) -> String {
        if self.seq == 0 {
            self.key.file_stem()
        } else {
            format!("{}.{}", self.key.file_stem(), self.seq)
        }
    }

    /// Parse a stem produced by [`ArtifactId::file_stem`].
    pub fn from_file_stem(stem: &str) -> Option<Self> {
        let (key, seq) = match stem.split_once('.') {
            Some((key, seq)) => (key, seq.parse().ok()?),
            None => (stem, 0),
        };
        Some(Self {
            key: RegionKey::from_file_stem(key)?,
            seq,
        })
    }
}

impl From<RegionKey> for ArtifactId {
    fn from(key: RegionKey) -> Self {
        Self::new(key)
    }
}

/// A directory of per-region artifacts.
#[derive(Debug)]
pub struct IntermediateStore {
    root: PathBuf,
    // removed on drop when set
    temp: Option<TempDir>,
}

impl IntermediateStore {
    /// Use `dir`, creating it if needed. Its contents outlive the store.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let root = dir.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root, temp: None })
    }

    /// A scratch directory deleted when the store is dropped.
    pub fn temporary() -> Result<Self> {
        let temp = tempfile::Builder::new().prefix("pageseg-").tempdir()?;
        Ok(Self {
            root: temp.path().to_path_buf(),
            temp: Some(temp),
        })
    }

    /// Whether the directory is removed on drop.
    pub fn is_temporary(&self) -> bool {
        self.temp.is_some()
    }

    /// Directory holding the artifacts.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the crop image for `id`.
    pub fn image_path(&self, id: &ArtifactId) -> PathBuf {
        self.root.join(format!("{}.{}", id.file_stem(), IMAGE_EXT))
    }

    /// Path of the fragment for `id`.
    pub fn fragment_path(&self, id: &ArtifactId) -> PathBuf {
        self.root.join(format!("{}.{}", id.file_stem(), FRAGMENT_EXT))
    }

    /// Persist a fragment already translated to page coordinates.
    pub fn write_fragment(&self, id: &ArtifactId, markup: &str) -> Result<PathBuf> {
        let path = self.fragment_path(id);
        fs::write(&path, markup)?;
        log::debug!("wrote fragment {}", path.display());
        Ok(path)
    }

    /// Read the fragment for `id`.
    pub fn read_fragment(&self, id: &ArtifactId) -> Result<Fragment> {
        let path = self.fragment_path(id);
        if !path.is_file() {
            return Err(Error::MissingArtifact(path));
        }
        Ok(Fragment::global(id.key, fs::read_to_string(&path)?))
    }

    /// Ids of every fragment in the directory, in merge order. Files whose
    /// names are not artifact ids are ignored.
    pub fn fragment_ids(&self) -> Result<Vec<ArtifactId>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(FRAGMENT_EXT) {
                continue;
            }
            if let Some(id) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(ArtifactId::from_file_stem)
            {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Read the fragments for `ids`, skipping any that are missing.
    pub fn load_fragments(&self, ids: &[ArtifactId]) -> Result<Vec<Fragment>> {
        let mut fragments = Vec::with_capacity(ids.len());
        for id in ids {
            match self.read_fragment(id) {
                Ok(fragment) => fragments.push(fragment),
                Err(e) if e.is_recoverable() => log::warn!("skipping region {}: {}", id.key, e),
                Err(e) => return Err(e),
            }
        }
        Ok(fragments)
    }

    /// Read every fragment in the directory.
    pub fn load_all(&self) -> Result<Vec<Fragment>> {
        let ids = self.fragment_ids()?;
        self.load_fragments(&ids)
    }
}
