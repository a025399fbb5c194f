use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::warn;

const CHANNEL_CAPACITY: usize = 1024;

#[derive(Error, Debug)]
pub enum WatcherError {
    #[error("Failed to create watcher: {0}")]
    CreateError(#[from] notify::Error),

    #[error("Watch root is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

pub type WatcherResult<T> = Result<T, WatcherError>;

/// A path that was created or written under the watched root
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WatchEvent {
    pub path: PathBuf,
    pub is_dir: bool,
}

impl WatchEvent {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_dir: false,
        }
    }
}

/// Recursive watcher on a directory tree.
///
/// Notifications arrive on notify's own thread and are forwarded into a
/// tokio channel; dropping the watcher stops them.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    root: PathBuf,
}

impl FileWatcher {
    pub fn new(root: PathBuf) -> WatcherResult<(Self, mpsc::Receiver<WatchEvent>)> {
        if !root.is_dir() {
            return Err(WatcherError::NotADirectory(root));
        }

        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    for watch_event in to_watch_events(event) {
                        // Receiver gone means the loop has shut down
                        if tx.blocking_send(watch_event).is_err() {
                            return;
                        }
                    }
                }
                Err(err) => warn!(error = %err, "file watcher error"),
            },
            Config::default(),
        )?;

        watcher.watch(&root, RecursiveMode::Recursive)?;

        Ok((
            Self {
                _watcher: watcher,
                root,
            },
            rx,
        ))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn to_watch_events(event: Event) -> Vec<WatchEvent> {
    if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
        return Vec::new();
    }
    event
        .paths
        .into_iter()
        .map(|path| WatchEvent {
            is_dir: path.is_dir(),
            path,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_only_create_and_modify_are_forwarded() {
        let created = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/r/resume.html"));
        let modified = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/r/a/resume.html"));
        let removed = Event::new(EventKind::Remove(RemoveKind::File))
            .add_path(PathBuf::from("/r/resume.html"));

        assert_eq!(
            to_watch_events(created),
            vec![WatchEvent::file("/r/resume.html")]
        );
        assert_eq!(
            to_watch_events(modified),
            vec![WatchEvent::file("/r/a/resume.html")]
        );
        assert!(to_watch_events(removed).is_empty());
    }

    #[test]
    fn test_rejects_missing_root() {
        let temp = TempDir::new().unwrap();
        let result = FileWatcher::new(temp.path().join("missing"));
        assert!(matches!(result, Err(WatcherError::NotADirectory(_))));
    }

    #[tokio::test]
    async fn test_file_watcher_reports_writes() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().canonicalize().unwrap();
        let (_watcher, mut rx) = FileWatcher::new(root.clone()).unwrap();

        let target = root.join("resume.html");
        let writer = target.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            fs::write(writer, "<html></html>").unwrap();
        });

        let event = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                match rx.recv().await {
                    Some(event) if event.path.ends_with("resume.html") => return Some(event),
                    Some(_) => continue,
                    None => return None,
                }
            }
        })
        .await
        .expect("no watch event within timeout");

        let event = event.expect("watcher channel closed");
        assert!(!event.is_dir);
    }
}
