// Manages local file storage for tasks.
//
// ⚠️ VERSION BUMP REQUIRED:
// Changes to TaskRecord or its nested types require incrementing
// TASK_STORE_VERSION below to prevent data corruption.
use crate::context::AppContext;
use crate::model::{Task, TaskRecord};
use anyhow::{Context as _, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

// Increment this when making breaking changes to the TaskRecord serialization
// format. Version history:
// - v0: Unversioned bare array of records (pre-0.3)
// - v1: Versioned wrapper { version, tasks }
const TASK_STORE_VERSION: u32 = 1;

/// Wrapper struct for versioned task storage.
#[derive(Serialize, Deserialize)]
struct TaskStoreData {
    #[serde(default)]
    version: u32,
    tasks: Vec<TaskRecord>,
}

/// Tracks whether the last load operation succeeded for each store file.
/// This prevents data loss by blocking saves when we couldn't read the
/// existing data. Keyed by the store file path.
static LOAD_STATE_MAP: OnceLock<Mutex<HashMap<PathBuf, LoadState>>> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadState {
    /// Never attempted to load
    Uninitialized,
    /// Last load succeeded
    Success,
    /// Last load failed (deserialization error, corruption, etc.)
    Failed,
}

impl LoadState {
    fn get(path: &Path) -> LoadState {
        let map = LOAD_STATE_MAP.get_or_init(|| Mutex::new(HashMap::new()));
        *map.lock()
            .unwrap()
            .get(path)
            .unwrap_or(&LoadState::Uninitialized)
    }

    fn set(path: &Path, state: LoadState) {
        let map = LOAD_STATE_MAP.get_or_init(|| Mutex::new(HashMap::new()));
        map.lock().unwrap().insert(path.to_path_buf(), state);
    }
}

pub struct LocalStorage;

impl LocalStorage {
    /// Helper to get a sidecar lock file path.
    fn get_lock_path(file_path: &Path) -> PathBuf {
        let mut lock_path = file_path.to_path_buf();
        if let Some(ext) = lock_path.extension() {
            let mut new_ext = ext.to_os_string();
            new_ext.push(".lock");
            lock_path.set_extension(new_ext);
        } else {
            lock_path.set_extension("lock");
        }
        lock_path
    }

    pub fn with_lock<F, T>(file_path: &Path, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let lock_path = Self::get_lock_path(file_path);
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        file.lock_exclusive()?;
        let result = f();
        file.unlock()?;
        result
    }

    /// Atomic write: Write to .tmp file then rename
    pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
        let path = path.as_ref();
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, contents)?;
        fs::rename(tmp_path, path)?;
        Ok(())
    }

    /// Load all tasks from the store file, migrating old formats if needed.
    ///
    /// Never silently ignore errors from this function: a failed load marks
    /// the file unsaveable (see `can_save`) so incomplete data cannot
    /// overwrite it. A missing file is an empty store, not an error.
    pub fn load(ctx: &dyn AppContext) -> Result<Vec<Task>> {
        let path = ctx.get_task_store_path()?;
        if !path.exists() {
            LoadState::set(&path, LoadState::Success);
            return Ok(vec![]);
        }

        let result = Self::with_lock(&path, || {
            let json = fs::read_to_string(&path)?;

            let (records, needs_upgrade) =
                if let Ok(data) = serde_json::from_str::<TaskStoreData>(&json) {
                    if data.version == TASK_STORE_VERSION {
                        (data.tasks, false)
                    } else {
                        (Self::migrate_to_current(data.version, &json)?, true)
                    }
                } else {
                    // No version wrapper: assume the v0 bare-array format.
                    log::info!(
                        "Migrating task store from v0 to v{}",
                        TASK_STORE_VERSION
                    );
                    (Self::migrate_v0_to_v1(&json)?, true)
                };

            // If we migrated, save the upgraded version immediately.
            if needs_upgrade {
                let data = TaskStoreData {
                    version: TASK_STORE_VERSION,
                    tasks: records.clone(),
                };
                let upgraded_json = serde_json::to_string_pretty(&data)?;
                Self::atomic_write(&path, upgraded_json)?;
            }

            records
                .into_iter()
                .map(|record| {
                    let uid = record.uid.clone();
                    Task::try_from(record)
                        .with_context(|| format!("Unreadable stored task {}", uid))
                })
                .collect()
        });

        match &result {
            Ok(_) => LoadState::set(&path, LoadState::Success),
            Err(_) => LoadState::set(&path, LoadState::Failed),
        }
        result
    }

    /// Save all tasks to the store file.
    ///
    /// # Data Loss Prevention
    /// This function checks the load state before saving. If the last
    /// `load()` of this file failed, it returns an error instead of
    /// overwriting data that couldn't be read.
    pub fn save(ctx: &dyn AppContext, tasks: &[Task]) -> Result<()> {
        let path = ctx.get_task_store_path()?;
        if !Self::can_save(&path) {
            return Err(anyhow::anyhow!(
                "Cannot save {:?}: previous load failed. This prevents overwriting data that couldn't be read.",
                path
            ));
        }
        Self::with_lock(&path, || {
            let data = TaskStoreData {
                version: TASK_STORE_VERSION,
                tasks: tasks.iter().map(TaskRecord::from).collect(),
            };
            let json = serde_json::to_string_pretty(&data)?;
            Self::atomic_write(&path, json)?;
            Ok(())
        })
    }

    /// Check if the last load operation succeeded for a store file.
    ///
    /// Returns `true` when the load succeeded or no load has been attempted
    /// yet; `false` after a failed load.
    pub fn can_save(path: &Path) -> bool {
        match LoadState::get(path) {
            LoadState::Uninitialized => true,
            LoadState::Success => true,
            LoadState::Failed => false,
        }
    }

    /// Migrate records from version 0 (unversioned bare array) to version 1.
    fn migrate_v0_to_v1(json: &str) -> Result<Vec<TaskRecord>> {
        serde_json::from_str::<Vec<TaskRecord>>(json)
            .map_err(|e| anyhow::anyhow!("Failed to migrate v0 to v1: {}", e))
    }

    /// Run migrations to upgrade from an old version to the current one.
    ///
    /// Migrations chain in sequence (v0 -> v1 -> ...) so any supported old
    /// format reaches the current shape in one load.
    fn migrate_to_current(old_version: u32, json: &str) -> Result<Vec<TaskRecord>> {
        log::info!(
            "Migrating task store from v{} to v{}",
            old_version,
            TASK_STORE_VERSION
        );

        if old_version > TASK_STORE_VERSION {
            return Err(anyhow::anyhow!(
                "Task store version {} is newer than supported version {}. Please upgrade cadence.",
                old_version,
                TASK_STORE_VERSION
            ));
        }

        let records = match old_version {
            0 => Self::migrate_v0_to_v1(json)?,
            1 => {
                let data: TaskStoreData = serde_json::from_str(json)?;
                data.tasks
            }
            _ => {
                return Err(anyhow::anyhow!(
                    "Unknown task store version: {}",
                    old_version
                ));
            }
        };

        Ok(records)
    }
}
