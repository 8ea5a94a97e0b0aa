use crate::config::GiosConfig;
use crate::store::error::StoreError;
use log::info;
use std::io;
use std::path::{Path, PathBuf};

/// The configured data directory, or `<platform data dir>/<app_name>`.
pub fn get_data_dir(config: &GiosConfig) -> Result<PathBuf, StoreError> {
    match &config.data_dir {
        Some(dir) => Ok(dir.clone()),
        None => dirs::data_dir()
            .map(|p| p.join(&config.app_name))
            .ok_or(StoreError::DataDirResolution),
    }
}

pub fn ensure_dir_exists(path: &Path) -> Result<(), StoreError> {
    match std::fs::metadata(path) {
        Ok(metadata) => {
            if !metadata.is_dir() {
                return Err(StoreError::NotADirectory(path.to_path_buf()));
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("Creating data directory: {}", path.display());
            std::fs::create_dir_all(path)
                .map_err(|e| StoreError::DataDirCreation(path.to_path_buf(), e))
        }
        Err(e) => Err(StoreError::DataDirCreation(path.to_path_buf(), e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_dir_exists() -> Result<(), StoreError> {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");
        ensure_dir_exists(&nested)?;
        assert!(nested.is_dir());
        ensure_dir_exists(&nested)?;

        let file = tmp.path().join("file");
        std::fs::write(&file, b"x").unwrap();
        assert!(matches!(
            ensure_dir_exists(&file),
            Err(StoreError::NotADirectory(_))
        ));
        Ok(())
    }

    #[test]
    fn test_configured_dir_wins() -> Result<(), StoreError> {
        let config = GiosConfig::builder().data_dir("/srv/gios").build();
        assert_eq!(get_data_dir(&config)?, PathBuf::from("/srv/gios"));
        Ok(())
    }
}
