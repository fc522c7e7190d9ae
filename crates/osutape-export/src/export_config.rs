use std::fs;
use std::path::PathBuf;

use config::{Config, File, FileFormat};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use osutape_paths::{PATHS, detect_songs_dir};

use crate::error::ConfigError;

/// Ajustes del exportador, persistidos en `settings.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[builder(setter(into, strip_option), default)]
#[serde(default)]
pub struct ExportSettings {
    /// Carpeta Songs de osu!; si falta, se intenta detectar.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub songs_dir: Option<PathBuf>,
    pub output_dir: PathBuf,
    /// Nombre de álbum con el que se etiqueta todo lo exportado.
    pub album: String,
    /// Volcado de colecciones para filtrar qué se exporta.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_file: Option<PathBuf>,
    /// Porcentaje de CPU a usar (0.0–100.0)
    pub cpu_percent: f32,
}

impl Default for ExportSettings {
    fn default() -> Self {
        ExportSettings {
            songs_dir: detect_songs_dir(),
            output_dir: PATHS.output_dir.clone(),
            album: "Osu".to_string(),
            collection_file: None,
            cpu_percent: 50.0,
        }
    }
}

impl ExportSettings {
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_string_lossy().into_owned();
        let cfg = Config::builder()
            .add_source(File::new(&path, FileFormat::Toml))
            .build()
            .map_err(ConfigError::Parse)?;
        let settings = cfg
            .try_deserialize::<ExportSettings>()
            .map_err(ConfigError::Parse)?;
        Ok(settings)
    }

    /// Escribe los ajustes como TOML.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), ConfigError> {
        let toml_str = toml::to_string_pretty(self)?;
        fs::write(path, toml_str)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Once;
    use tempfile::tempdir;

    static INIT: Once = Once::new();

    /// PATHS se inicializa una sola vez por proceso; lo apuntamos a un
    /// tempdir antes de que cualquier test lo toque vía Default.
    fn isolate_base_dir() {
        INIT.call_once(|| {
            let dir = tempdir().unwrap();
            unsafe { std::env::set_var("OSUTAPE_BASE_DIR", dir.path()) };
            std::mem::forget(dir); // la ruta debe sobrevivir todo el proceso
        });
    }

    fn isolated() -> ExportSettings {
        isolate_base_dir();
        ExportSettingsBuilder::default()
            .songs_dir(PathBuf::from("/tmp/Songs"))
            .output_dir(PathBuf::from("/tmp/out"))
            .album("Mi Album")
            .collection_file(PathBuf::from("/tmp/collection.txt"))
            .cpu_percent(25.0)
            .build()
            .unwrap()
    }

    #[test]
    fn builder_fills_every_field() {
        let s = isolated();
        assert_eq!(s.songs_dir, Some(PathBuf::from("/tmp/Songs")));
        assert_eq!(s.album, "Mi Album");
        assert_eq!(s.cpu_percent, 25.0);
    }

    #[test]
    fn settings_round_trip_through_toml() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("settings.toml");

        let original = isolated();
        original.save(&path).unwrap();

        let loaded = ExportSettings::from_file(&path).unwrap();
        assert_eq!(loaded.songs_dir, original.songs_dir);
        assert_eq!(loaded.output_dir, original.output_dir);
        assert_eq!(loaded.album, original.album);
        assert_eq!(loaded.collection_file, original.collection_file);
        assert_eq!(loaded.cpu_percent, original.cpu_percent);
    }

    #[test]
    fn from_file_rejects_invalid_toml() {
        isolate_base_dir();
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("settings.toml");
        std::fs::write(&path, "esto no es [toml").unwrap();
        assert!(matches!(
            ExportSettings::from_file(&path),
            Err(ConfigError::Parse(_))
        ));
    }
}
