use crate::error::AppError;
use crate::storage::Slots;
use std::path::{Path, PathBuf};
use tracing::debug;

const STORE_DIR_ENV_VAR: &str = "TASKBOARD_STORE_DIR";
const APP_DIR_NAME: &str = "taskboard";

/// Directory holding one `<key>.json` file per slot.
pub fn store_dir() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(STORE_DIR_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join(APP_DIR_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home).join(".config").join(APP_DIR_NAME))
    }
}

#[derive(Debug, Clone)]
pub struct FileSlots {
    dir: PathBuf,
}

impl FileSlots {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn open_default() -> Result<Self, AppError> {
        Ok(Self::new(store_dir()?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Slots for FileSlots {
    #[tracing::instrument(skip(self))]
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let path = self.path_for(key);
        if !path.exists() {
            debug!(path = %path.display(), "slot file absent");
            return Ok(None);
        }

        std::fs::read_to_string(&path)
            .map(Some)
            .map_err(|err| AppError::slot(key, format!("{}: {}", path.display(), err)))
    }

    #[tracing::instrument(skip(self, value), fields(bytes = value.len()))]
    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|err| AppError::slot(key, format!("{}: {}", self.dir.display(), err)))?;

        let path = self.path_for(key);
        std::fs::write(&path, value)
            .map_err(|err| AppError::slot(key, format!("{}: {}", path.display(), err)))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&path, permissions)
                .map_err(|err| AppError::slot(key, err.to_string()))?;
        }

        Ok(())
    }
}
