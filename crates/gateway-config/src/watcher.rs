//! Hot reload of routing profiles.
//!
//! The parent directory is watched so editors that replace the file on save
//! still trigger a reload. A failed reload leaves the active snapshot as is.

use crate::error::ConfigResult;
use crate::loader::ConfigLoader;
use gateway_routing::ProfileRegistry;
use notify::{Config as NotifyConfig, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Reloads a config file into a [`ProfileRegistry`]
#[derive(Debug, Clone)]
pub struct ConfigWatcher {
    registry: Arc<ProfileRegistry>,
    loader: ConfigLoader,
    path: PathBuf,
}

/// Keeps a running watch alive; dropping it stops watching
pub struct WatchHandle {
    _watcher: RecommendedWatcher,
    task: JoinHandle<()>,
}

impl WatchHandle {
    /// Stop watching
    pub fn stop(self) {
        self.task.abort();
    }
}

impl std::fmt::Debug for WatchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchHandle")
            .field("finished", &self.task.is_finished())
            .finish_non_exhaustive()
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl ConfigWatcher {
    /// Create a watcher for `path`
    pub fn new(registry: Arc<ProfileRegistry>, path: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            loader: ConfigLoader::new(),
            path: path.into(),
        }
    }

    /// Watched file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the file and publish its profiles
    ///
    /// # Errors
    /// Returns error if loading or validation fails; the registry is unchanged
    pub async fn reload(&self) -> ConfigResult<u64> {
        let config = self.loader.load_file(&self.path).await?;
        let version = self.registry.replace(config.effective_profiles())?;
        Ok(version)
    }

    /// Start watching. Must be called inside a tokio runtime.
    ///
    /// # Errors
    /// Returns error if the OS watcher cannot be created
    pub fn watch(self) -> ConfigResult<WatchHandle> {
        let (tx, mut rx) = mpsc::channel::<()>(1);
        let file_name = self.path.file_name().map(ToOwned::to_owned);

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let Ok(event) = res else { return };
                if !(event.kind.is_modify() || event.kind.is_create()) {
                    return;
                }
                let relevant = event
                    .paths
                    .iter()
                    .any(|p| p.file_name().map(ToOwned::to_owned) == file_name);
                if relevant {
                    // A full channel already has a reload queued
                    let _ = tx.try_send(());
                }
            },
            NotifyConfig::default(),
        )?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        info!(path = %self.path.display(), "Watching routing config");

        let task = tokio::spawn(async move {
            while rx.recv().await.is_some() {
                match self.reload().await {
                    Ok(version) => info!(path = %self.path.display(), version, "Routing config reloaded"),
                    Err(e) => warn!(
                        path = %self.path.display(),
                        error = %e,
                        "Routing config reload failed; keeping previous profiles"
                    ),
                }
            }
        });

        Ok(WatchHandle {
            _watcher: watcher,
            task,
        })
    }
}
