//! Asset server trait and the file-backed implementation

use crate::handle::LoadHandle;
use crate::types::{ClipData, ClipFile, MeshData, MeshFile};
use std::path::{Path, PathBuf};

/// External asset-loading collaborator.
///
/// The runtime only requires "eventually resolves or fails"; a failed load
/// is recoverable, never fatal to the process. Implementations return
/// immediately; consumers poll the handle from the frame tick.
pub trait AssetServer {
    /// Load the animation clips stored under `source`. A source may yield
    /// zero clips; the caller decides whether that is an error.
    fn load_clips(&self, source: &str) -> LoadHandle<Vec<ClipData>>;

    /// Load the mesh descriptor stored under `source`.
    fn load_mesh(&self, source: &str) -> LoadHandle<MeshData>;
}

/// File-backed asset server reading TOML sidecar files.
///
/// Reads complete synchronously, so handles come back already resolved or
/// failed. Consumers must not rely on that: other servers resolve later.
pub struct FileAssets {
    root: PathBuf,
}

impl FileAssets {
    /// Create a server rooted at the given asset directory.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn read(&self, source: &str) -> Result<String, String> {
        let path = self.root.join(source);
        std::fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))
    }
}

impl AssetServer for FileAssets {
    fn load_clips(&self, source: &str) -> LoadHandle<Vec<ClipData>> {
        let content = match self.read(source) {
            Ok(content) => content,
            Err(message) => return LoadHandle::failed(message),
        };
        match toml::from_str::<ClipFile>(&content) {
            Ok(file) => {
                let mut clips = file.clips;
                clips.retain(|clip| {
                    if clip.duration <= 0.0 {
                        log::warn!(
                            "Dropping clip '{}' from {}: non-positive duration {}",
                            clip.name,
                            source,
                            clip.duration
                        );
                        false
                    } else {
                        true
                    }
                });
                LoadHandle::ready(clips)
            }
            Err(e) => LoadHandle::failed(format!("Failed to parse {}: {}", source, e)),
        }
    }

    fn load_mesh(&self, source: &str) -> LoadHandle<MeshData> {
        let content = match self.read(source) {
            Ok(content) => content,
            Err(message) => return LoadHandle::failed(message),
        };
        match toml::from_str::<MeshFile>(&content) {
            Ok(file) => LoadHandle::ready(file.mesh),
            Err(e) => LoadHandle::failed(format!("Failed to parse {}: {}", source, e)),
        }
    }
}
