use std::{env, fs::File, path::PathBuf};

use directories::ProjectDirs;

use crate::{errors::Error, fs_utils};

/// Nombre de la ENV var para override de ruta base (modo “portable”)
const ENV_BASE_DIR: &str = "OSUTAPE_BASE_DIR";

/// Contenedor de todas las rutas y ficheros importantes de la app
#[derive(Debug)]
pub struct OsutapePaths {
    // config_dir
    pub config_dir: PathBuf,
    pub settings_file: PathBuf,

    // data_dir
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub log_file: PathBuf,

    // lock_file
    pub lock_file: PathBuf,
}

impl OsutapePaths {
    pub fn new() -> Result<Self, Error> {
        // 1) Calculamos config_dir y data_dir
        let (config_dir, data_dir) = if let Ok(base) = env::var(ENV_BASE_DIR) {
            let b = PathBuf::from(base);
            (b.join("config"), b.join("data"))
        } else {
            let proj = ProjectDirs::from("com", "MyOrg", "Osutape").ok_or(Error::NoHome)?;
            (proj.config_dir().to_path_buf(), proj.data_dir().to_path_buf())
        };

        // 2) Inicializamos todas las rutas en la estructura (sin crear nada aún)
        let paths = OsutapePaths {
            config_dir: config_dir.clone(),
            settings_file: config_dir.join("settings.toml"),

            data_dir: data_dir.clone(),
            output_dir: data_dir.join("output"),
            logs_dir: data_dir.join("logs"),
            log_file: data_dir.join("osutape.log"),

            lock_file: data_dir.join("osutape.lock"),
        };

        // 3) Creamos toda la estructura y verificamos que es escribible
        paths.ensure_structure()?;
        paths.validate_structure()?;

        Ok(paths)
    }

    /// Devuelve true si este es el primer arranque (osutape.lock no existía)
    pub fn is_first_run(&self) -> bool {
        !self.lock_file.exists()
    }

    /// Crea (si no existe) y adquiere un advisory-lock excluyente en osutape.lock.
    /// Mantén vivo el File retornado para conservar el lock.
    pub fn lock(&self) -> Result<File, Error> {
        fs_utils::lock_file(&self.lock_file)
    }
}

impl OsutapePaths {
    /// Se asegura de que TODOS los dirs y ficheros básicos existen.
    pub fn ensure_structure(&self) -> Result<(), Error> {
        // carpetas
        fs_utils::ensure_dir(&self.config_dir)?;
        fs_utils::ensure_dir(&self.data_dir)?;
        fs_utils::ensure_dir(&self.output_dir)?;
        fs_utils::ensure_dir(&self.logs_dir)?;

        // ficheros
        fs_utils::ensure_file(&self.settings_file)?;
        fs_utils::ensure_file(&self.log_file)?;

        Ok(())
    }

    /// Valida que cada carpeta existe Y es escribible. Si falta, la intenta crear.
    /// Si no tiene permisos de escritura, retorna Err.
    pub fn validate_structure(&self) -> Result<(), Error> {
        let all_paths = vec![
            &self.config_dir,
            &self.data_dir,
            &self.output_dir,
            &self.logs_dir,
        ];
        for dir in all_paths {
            if !dir.exists() {
                fs_utils::ensure_dir(dir)?;
            }
            // chequea permisos de escritura:
            fs_utils::check_writable(dir)?;
        }
        Ok(())
    }
}

/// Carpeta Songs de una instalación de osu!stable, si se puede detectar.
#[cfg(windows)]
pub fn detect_songs_dir() -> Option<PathBuf> {
    let local = env::var_os("LOCALAPPDATA")?;
    let dir = PathBuf::from(local).join("osu!").join("Songs");
    dir.is_dir().then_some(dir)
}

/// osu!stable solo corre nativo en Windows; en otros sistemas la carpeta
/// Songs se indica por configuración.
#[cfg(not(windows))]
pub fn detect_songs_dir() -> Option<PathBuf> {
    None
}
