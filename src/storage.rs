use directories::ProjectDirs;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::{env, fs, thread};

pub const TASKS_KEY: &str = "tasks";
pub const TAGS_KEY: &str = "tags";

/// Directory the host may provide as a synchronized store location.
pub const SYNC_DIR_ENV: &str = "TASKLANE_SYNC_DIR";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("reading {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("writing {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Minimal key-value contract both backends satisfy: fetch a mapping for the
/// requested keys (absent keys are simply missing from the result) and write
/// a batch of entries.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, keys: &[&str]) -> Result<BTreeMap<String, String>, StorageError>;
    fn set(&self, entries: Vec<(String, String)>) -> Result<(), StorageError>;
}

/// One YAML document per key under a directory.
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirStore { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.yml", key))
    }
}

impl KeyValueStore for DirStore {
    fn get(&self, keys: &[&str]) -> Result<BTreeMap<String, String>, StorageError> {
        let mut found = BTreeMap::new();
        for key in keys {
            let path = self.path_for(key);
            if !path.exists() {
                continue;
            }
            let data = fs::read_to_string(&path).map_err(|source| StorageError::Read {
                path: path.clone(),
                source,
            })?;
            found.insert((*key).to_string(), data);
        }
        Ok(found)
    }

    fn set(&self, entries: Vec<(String, String)>) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::Write {
            path: self.dir.clone(),
            source,
        })?;
        for (key, value) in entries {
            let path = self.path_for(&key);
            fs::write(&path, value).map_err(|source| StorageError::Write { path, source })?;
        }
        Ok(())
    }
}

/// In-process fallback when no writable directory exists; also the test
/// double. Nothing survives the process.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, keys: &[&str]) -> Result<BTreeMap<String, String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(keys
            .iter()
            .filter_map(|key| {
                entries
                    .get(*key)
                    .map(|value| ((*key).to_string(), value.clone()))
            })
            .collect())
    }

    fn set(&self, batch: Vec<(String, String)>) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.extend(batch);
        Ok(())
    }
}

/// Prefer a host-provided synchronized directory, then the local per-user
/// data directory, then memory.
pub fn select_store() -> Arc<dyn KeyValueStore> {
    if let Ok(dir) = env::var(SYNC_DIR_ENV) {
        return Arc::new(DirStore::new(dir));
    }
    match ProjectDirs::from("", "", "tasklane") {
        Some(dirs) => Arc::new(DirStore::new(dirs.data_dir().to_path_buf())),
        None => {
            warn!("no data directory available; state will not outlive this session");
            Arc::new(MemoryStore::new())
        }
    }
}

enum WriteOp {
    Put { key: String, value: String },
    Flush(Sender<()>),
}

/// Adapter between committed state and the backend. Loads are a single
/// synchronous attempt with failures degraded to "absent"; saves are
/// fire-and-forget through a background writer, applied in send order so the
/// newest snapshot wins.
#[derive(Clone)]
pub struct PersistenceBridge {
    store: Arc<dyn KeyValueStore>,
    tx: Sender<WriteOp>,
}

impl PersistenceBridge {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let (tx, rx) = mpsc::channel::<WriteOp>();
        let writer = Arc::clone(&store);
        thread::spawn(move || {
            for op in rx {
                match op {
                    WriteOp::Put { key, value } => {
                        debug!("persisting {}", key);
                        if let Err(err) = writer.set(vec![(key.clone(), value)]) {
                            warn!("saving {}: {}", key, err);
                        }
                    }
                    WriteOp::Flush(ack) => {
                        let _ = ack.send(());
                    }
                }
            }
        });
        PersistenceBridge { store, tx }
    }

    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let blob = match self.store.get(&[key]) {
            Ok(mut found) => found.remove(key)?,
            Err(err) => {
                warn!("loading {}: {}", key, err);
                return None;
            }
        };
        match serde_yaml::from_str(&blob) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("decoding {}: {}", key, err);
                None
            }
        }
    }

    pub fn save<T: Serialize>(&self, key: &str, value: &T) {
        let blob = match serde_yaml::to_string(value) {
            Ok(blob) => blob,
            Err(err) => {
                warn!("encoding {}: {}", key, err);
                return;
            }
        };
        let _ = self.tx.send(WriteOp::Put {
            key: key.to_string(),
            value: blob,
        });
    }

    /// Blocks until every previously enqueued save has been attempted.
    /// Exit paths (CLI, tests) call this; event-driven sessions never need to.
    pub fn flush(&self) {
        let (ack_tx, ack_rx) = mpsc::channel();
        if self.tx.send(WriteOp::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }
}
