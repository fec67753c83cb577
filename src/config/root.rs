//! Materialized configuration with reload-on-change.

use super::settings::Settings;
use super::sources::ConfigSource;
use crate::error::ConfigurationError;
use crate::file_provider::FileProvider;
use config::Config;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Quiet period after a file event before reloading, so bursts of writes
/// produce one reload.
pub const RELOAD_DELAY: Duration = Duration::from_millis(250);

type ReloadCallback = Box<dyn Fn(&Settings) + Send + Sync>;

/// Merged configuration built from an ordered source list.
///
/// Clones share state. While any clone is alive, files registered with
/// reload-on-change are watched and edits are merged in the background.
#[derive(Clone)]
pub struct Configuration {
    inner: Arc<Inner>,
    watcher: Option<Arc<Mutex<RecommendedWatcher>>>,
}

struct Inner {
    sources: Vec<ConfigSource>,
    default_provider: Arc<dyn FileProvider>,
    snapshot: RwLock<Arc<Settings>>,
    generation: AtomicU64,
    listeners: Mutex<Vec<ReloadCallback>>,
    // Held from reading the sources until listeners have run, so snapshots
    // are published in the order they were read.
    reloading: Mutex<()>,
}

impl Inner {
    fn reload(&self) -> Result<u64, ConfigurationError> {
        let _reloading = self.reloading.lock();
        let settings = Arc::new(materialize(&self.sources, &self.default_provider)?);
        *self.snapshot.write() = Arc::clone(&settings);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        for listener in self.listeners.lock().iter() {
            listener(&settings);
        }
        Ok(generation)
    }
}

/// Merge `sources` in order.
fn materialize(
    sources: &[ConfigSource],
    default_provider: &Arc<dyn FileProvider>,
) -> Result<Settings, ConfigurationError> {
    let mut builder = Config::builder();
    for source in sources {
        builder = source.add_to_builder(builder, default_provider)?;
    }
    Settings::build(builder)
}

impl Configuration {
    pub(crate) fn load(
        sources: Vec<ConfigSource>,
        default_provider: Arc<dyn FileProvider>,
    ) -> Result<Self, ConfigurationError> {
        let settings = materialize(&sources, &default_provider)?;
        let inner = Arc::new(Inner {
            sources,
            default_provider,
            snapshot: RwLock::new(Arc::new(settings)),
            generation: AtomicU64::new(0),
            listeners: Mutex::new(Vec::new()),
            reloading: Mutex::new(()),
        });

        let watcher = start_watching(&inner)?;
        Ok(Self {
            inner,
            watcher: watcher.map(|w| Arc::new(Mutex::new(w))),
        })
    }

    /// Typed value at `key`. Keys are case-insensitive and nest on `:`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, ConfigurationError> {
        self.snapshot().get(key)
    }

    /// Like [`get`](Self::get), but a missing key is `Ok(None)`.
    pub fn try_get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigurationError> {
        self.snapshot().try_get(key)
    }

    pub fn get_string(&self, key: &str) -> Result<String, ConfigurationError> {
        self.get(key)
    }

    /// Deserialize the whole configuration.
    pub fn try_deserialize<T: DeserializeOwned>(&self) -> Result<T, ConfigurationError> {
        self.snapshot().try_deserialize()
    }

    /// The current merged values. Later reloads do not change it.
    pub fn snapshot(&self) -> Arc<Settings> {
        Arc::clone(&self.inner.snapshot.read())
    }

    /// Sources this configuration was built from, in order.
    pub fn sources(&self) -> &[ConfigSource] {
        &self.inner.sources
    }

    /// Number of successful reloads so far.
    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }

    /// Whether any file is being watched for changes.
    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    /// Re-read every source now. On failure the previous values stay in place.
    ///
    /// Concurrent reloads run one at a time.
    pub fn reload(&self) -> Result<(), ConfigurationError> {
        let generation = self.inner.reload()?;
        info!(generation, "Configuration reloaded");
        Ok(())
    }

    /// Run `callback` with the new values after each successful reload.
    ///
    /// Callbacks must not register further callbacks or reload.
    pub fn on_reload<F>(&self, callback: F)
    where
        F: Fn(&Settings) + Send + Sync + 'static,
    {
        self.inner.listeners.lock().push(Box::new(callback));
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("sources", &self.inner.sources)
            .field("generation", &self.generation())
            .field("watching", &self.is_watching())
            .finish()
    }
}

/// Watched file names, keyed by canonical parent directory.
type WatchTargets = HashMap<PathBuf, HashSet<OsString>>;

fn watch_targets(inner: &Inner) -> WatchTargets {
    let mut targets = WatchTargets::new();
    for source in &inner.sources {
        let Some(path) = source.watch_target(&inner.default_provider) else {
            continue;
        };
        let (Some(dir), Some(name)) = (path.parent(), path.file_name()) else {
            continue;
        };
        let dir = if dir.as_os_str().is_empty() {
            Path::new(".")
        } else {
            dir
        };
        if !dir.is_dir() {
            warn!(
                dir = %dir.display(),
                "Configuration directory does not exist; changes will not be watched"
            );
            continue;
        }
        targets
            .entry(canonical(dir))
            .or_default()
            .insert(name.to_os_string());
    }
    targets
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn is_relevant(event: &Event, targets: &WatchTargets) -> bool {
    if !matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) {
        return false;
    }
    event.paths.iter().any(|path| {
        let (Some(dir), Some(name)) = (path.parent(), path.file_name()) else {
            return false;
        };
        targets
            .get(&canonical(dir))
            .map_or(false, |names| names.contains(name))
    })
}

/// Watch the directories of reload-enabled files and reload on change.
///
/// Directories are watched rather than files so that a file created after the
/// build is still picked up.
fn start_watching(inner: &Arc<Inner>) -> Result<Option<RecommendedWatcher>, ConfigurationError> {
    let targets = watch_targets(inner);
    if targets.is_empty() {
        return Ok(None);
    }

    let (tx, rx) = mpsc::channel();
    let filter = targets.clone();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) => {
            if is_relevant(&event, &filter) {
                // Receiver gone means the reload thread has exited.
                let _ = tx.send(());
            }
        }
        Err(e) => warn!(error = %e, "Configuration file watch error"),
    })?;

    for dir in targets.keys() {
        watcher.watch(dir, RecursiveMode::NonRecursive)?;
        debug!(dir = %dir.display(), "Watching configuration directory");
    }

    let weak = Arc::downgrade(inner);
    std::thread::Builder::new()
        .name("config-reload".to_string())
        .spawn(move || reload_loop(weak, rx))
        .map_err(|e| ConfigurationError::Watch(format!("Failed to spawn reload thread: {}", e)))?;

    Ok(Some(watcher))
}

/// Runs until the watcher (and with it the sender) is dropped.
fn reload_loop(inner: Weak<Inner>, rx: mpsc::Receiver<()>) {
    while rx.recv().is_ok() {
        loop {
            match rx.recv_timeout(RELOAD_DELAY) {
                Ok(()) => continue,
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => return,
            }
        }

        let Some(inner) = inner.upgrade() else {
            return;
        };
        match inner.reload() {
            Ok(generation) => info!(generation, "Configuration reloaded after file change"),
            Err(e) => warn!(error = %e, "Configuration reload failed; keeping previous values"),
        }
    }
}
