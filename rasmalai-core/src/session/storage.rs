//! Durable slot holding the serialized history

use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A single key-value slot for the serialized history.
///
/// `load` returns `Ok(None)` when nothing was stored yet. `save` replaces any
/// previous value.
pub trait HistoryStore: Send + Sync {
    fn load(&self) -> crate::Result<Option<String>>;

    fn save(&self, data: &str) -> crate::Result<()>;
}

/// History stored as one JSON file on disk
#[derive(Debug, Clone)]
pub struct FileHistoryStore {
    path: PathBuf,
}

impl FileHistoryStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for FileHistoryStore {
    fn load(&self) -> crate::Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, data: &str) -> crate::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Write then rename so a crash never leaves a half-written file.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, data)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-process slot. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistoryStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `data`
    pub fn with_data(data: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(data.into()))),
        }
    }

    /// Current raw contents of the slot
    pub fn contents(&self) -> Option<String> {
        self.slot.lock().clone()
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn load(&self) -> crate::Result<Option<String>> {
        Ok(self.slot.lock().clone())
    }

    fn save(&self, data: &str) -> crate::Result<()> {
        *self.slot.lock() = Some(data.to_string());
        Ok(())
    }
}
