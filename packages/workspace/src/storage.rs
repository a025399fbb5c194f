use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Plain-text document storage used by the snapshot store
pub trait Storage: Send + Sync {
    /// Read a whole document. Invalid UTF-8 is replaced rather than rejected.
    fn read(&self, path: &Path) -> io::Result<String>;

    /// Replace a document's content. Readers must never see a partial write.
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;

    fn exists(&self, path: &Path) -> bool;
}

/// Real file system storage
pub struct DiskStorage;

impl Storage for DiskStorage {
    fn read(&self, path: &Path) -> io::Result<String> {
        let bytes = fs::read(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        write_atomic(path, contents.as_bytes())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Write through a sibling temp file and rename it over the target.
fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut temp_path = path.to_path_buf();
    let temp_name = match path.file_name() {
        Some(name) => format!(".{}.tmp", name.to_string_lossy()),
        None => ".cascade.tmp".to_string(),
    };
    temp_path.set_file_name(temp_name);

    {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(contents)?;
        file.sync_all()?;
    }

    fs::rename(&temp_path, path).map_err(|err| {
        let _ = fs::remove_file(&temp_path);
        err
    })
}

/// In-memory storage for testing
#[derive(Default)]
pub struct MemoryStorage {
    files: Mutex<HashMap<PathBuf, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.lock().insert(path.into(), contents.into());
    }

    pub fn get(&self, path: &Path) -> Option<String> {
        self.lock().get(path).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, String>> {
        self.files.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Storage for MemoryStorage {
    fn read(&self, path: &Path) -> io::Result<String> {
        self.get(path).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such document: {}", path.display()),
            )
        })
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        self.insert(path, contents);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.lock().contains_key(path)
    }
}
