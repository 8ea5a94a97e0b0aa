use crate::config::GiosConfig;
use crate::store::error::StoreError;
use crate::store::file_name::{dataset_file_name, sanitize_component};
use crate::types::dataset::{DatasetOrigin, SensorDataset};
use crate::types::measurement::RawMeasurementPayload;
use crate::types::name_index::NameIndex;
use crate::types::station::Station;
use crate::utils::{ensure_dir_exists, get_data_dir};
use log::{info, warn};
use serde::Serialize;
use serde_json::Value;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Name of the station-list cache file in the data directory.
pub const STATION_CACHE_FILE: &str = "citySearchData.json";
/// Subdirectory holding one folder of dataset files per station.
pub const DATASET_DIR: &str = "db";

/// Result of [`LocalStore::save_sensor_dataset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Written(PathBuf),
    /// Datasets are write-once; an existing file is left untouched.
    AlreadyExists(PathBuf),
    /// The payload has no records, or its first or last record has no date,
    /// so there is no date range to name the file by.
    NothingToSave,
    Failed,
}

impl SaveOutcome {
    pub fn path(&self) -> Option<&Path> {
        match self {
            SaveOutcome::Written(path) | SaveOutcome::AlreadyExists(path) => Some(path.as_path()),
            SaveOutcome::NothingToSave | SaveOutcome::Failed => None,
        }
    }
}

/// The on-disk cache: a station list plus previously fetched datasets.
///
/// ```text
/// <root>/citySearchData.json
/// <root>/db/<station display string>/<key>_<first>_<last>.json
/// ```
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Resolves the data directory from `config` and creates it, together with
    /// its `db` subdirectory, if absent.
    pub fn open(config: &GiosConfig) -> Result<Self, StoreError> {
        Self::with_root(get_data_dir(config)?)
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = LocalStore { root: root.into() };
        store.resolve_data_directory()?;
        Ok(store)
    }

    /// Returns the data directory, creating it and `db/` if they went missing.
    pub fn resolve_data_directory(&self) -> Result<PathBuf, StoreError> {
        ensure_dir_exists(&self.root)?;
        ensure_dir_exists(&self.dataset_dir())?;
        Ok(self.root.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dataset_dir(&self) -> PathBuf {
        self.root.join(DATASET_DIR)
    }

    pub fn station_cache_path(&self) -> PathBuf {
        self.root.join(STATION_CACHE_FILE)
    }

    fn location_dir(&self, location: &str) -> PathBuf {
        self.dataset_dir().join(sanitize_component(location))
    }

    /// Overwrites the station-list cache with `stations`.
    pub fn save_station_list(&self, stations: &[Station]) -> Result<PathBuf, StoreError> {
        let path = self.station_cache_path();
        write_json(&self.root, &path, &stations, true)?;
        info!("Saved {} stations to {}", stations.len(), path.display());
        Ok(path)
    }

    /// Builds the name index from a station-list cache file.
    ///
    /// A missing or malformed file yields an empty index; elements that are not
    /// objects are skipped.
    pub fn load_location_index(path: &Path) -> NameIndex {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("No station cache at {}", path.display());
                return NameIndex::default();
            }
            Err(e) => {
                warn!("Failed to read station cache {}: {}", path.display(), e);
                return NameIndex::default();
            }
        };

        let elements = match serde_json::from_str::<Value>(&content) {
            Ok(Value::Array(elements)) => elements,
            Ok(_) => {
                warn!("Station cache {} is not a JSON array", path.display());
                return NameIndex::default();
            }
            Err(e) => {
                warn!("Station cache {} is not valid JSON: {}", path.display(), e);
                return NameIndex::default();
            }
        };

        let stations: Vec<Station> = elements
            .iter()
            .filter(|v| v.is_object())
            .map(Station::from_cache_value)
            .collect();
        NameIndex::from_stations(&stations)
    }

    /// Writes a freshly fetched dataset to
    /// `db/<location>/<key>_<firstDate>_<lastDate>.json` unless that file exists.
    pub fn save_sensor_dataset(&self, dataset: &SensorDataset) -> SaveOutcome {
        let payload = &dataset.payload;
        let (first, last) = match (payload.first_date(), payload.last_date()) {
            (Some(first), Some(last)) => (first, last),
            _ if payload.values.is_empty() => {
                warn!("Dataset '{}' has no records, nothing to save", dataset.key);
                return SaveOutcome::NothingToSave;
            }
            (None, _) => {
                warn!(
                    "First record of dataset '{}' has no date, cannot name the file",
                    dataset.key
                );
                return SaveOutcome::NothingToSave;
            }
            (Some(_), None) => {
                warn!(
                    "Last record of dataset '{}' has no date, cannot name the file",
                    dataset.key
                );
                return SaveOutcome::NothingToSave;
            }
        };

        let dir = self.location_dir(&dataset.source_location);
        if let Err(e) = ensure_dir_exists(&dir) {
            warn!("Cannot save dataset '{}': {}", dataset.key, e);
            return SaveOutcome::Failed;
        }

        let path = dir.join(dataset_file_name(&dataset.key, first, last));
        match write_json(&dir, &path, payload, false) {
            Ok(()) => {
                info!("Saved dataset '{}' to {}", dataset.key, path.display());
                SaveOutcome::Written(path)
            }
            Err(StoreError::AlreadyExists(path)) => {
                warn!("Dataset file {} already exists, not overwriting", path.display());
                SaveOutcome::AlreadyExists(path)
            }
            Err(e) => {
                warn!("Cannot save dataset '{}': {}", dataset.key, e);
                SaveOutcome::Failed
            }
        }
    }

    /// Station folders under `db/`, sorted.
    pub fn list_cached_locations(&self) -> Result<Vec<String>, StoreError> {
        list_dir(&self.dataset_dir(), |entry| entry.is_dir())
    }

    /// Dataset files of one station folder, sorted. An unknown location has none.
    pub fn list_cached_files(&self, location: &str) -> Result<Vec<String>, StoreError> {
        list_dir(&self.location_dir(location), |entry| {
            entry.is_file() && entry.extension().is_some_and(|ext| ext == "json")
        })
    }

    pub fn load_cached_dataset(
        &self,
        location: &str,
        file_name: &str,
    ) -> Result<SensorDataset, StoreError> {
        let path = self
            .location_dir(location)
            .join(sanitize_component(file_name));
        let content =
            std::fs::read_to_string(&path).map_err(|e| StoreError::CacheRead(path.clone(), e))?;
        let payload: RawMeasurementPayload =
            serde_json::from_str(&content).map_err(|e| StoreError::CacheDecode(path.clone(), e))?;

        info!(
            "Loaded {} records of '{}' from {}",
            payload.values.len(),
            payload.key,
            path.display()
        );
        Ok(SensorDataset::new(payload, location, DatasetOrigin::Loaded))
    }
}

/// Serializes `value` to a temp file in `dir` and moves it to `path`.
/// Without `overwrite` an existing `path` is reported as `AlreadyExists`.
fn write_json<T: Serialize + ?Sized>(
    dir: &Path,
    path: &Path,
    value: &T,
    overwrite: bool,
) -> Result<(), StoreError> {
    let write_err = |e: io::Error| StoreError::CacheWrite(path.to_path_buf(), e);

    let mut file = NamedTempFile::new_in(dir).map_err(write_err)?;
    serde_json::to_writer_pretty(&mut file, value).map_err(StoreError::CacheEncode)?;
    file.flush().map_err(write_err)?;

    if overwrite {
        file.persist(path).map_err(|e| write_err(e.error))?;
    } else {
        file.persist_noclobber(path).map_err(|e| {
            if e.error.kind() == io::ErrorKind::AlreadyExists {
                StoreError::AlreadyExists(path.to_path_buf())
            } else {
                write_err(e.error)
            }
        })?;
    }
    Ok(())
}

fn list_dir(dir: &Path, keep: impl Fn(&Path) -> bool) -> Result<Vec<String>, StoreError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StoreError::DirectoryList(dir.to_path_buf(), e)),
    };

    let mut names = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| StoreError::DirectoryList(dir.to_path_buf(), e))?
            .path();
        if !keep(&path) {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}
