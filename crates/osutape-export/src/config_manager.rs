use std::path::PathBuf;

use tracing::info;

use crate::error::ConfigError;
use crate::export_config::ExportSettings;

/// Carga los ajustes desde disco; en el primer arranque escribe el fichero
/// con los valores por defecto para que el usuario tenga algo que editar.
pub struct ConfigManager {
    pub path: PathBuf,
    pub settings: ExportSettings,
}

impl ConfigManager {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();

        let settings = if path.exists() {
            ExportSettings::from_file(&path)?
        } else {
            info!("No settings file at {}, writing defaults", path.display());
            let defaults = ExportSettings::default();
            defaults.save(&path)?;
            defaults
        };

        Ok(Self { path, settings })
    }
}
