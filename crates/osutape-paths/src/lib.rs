//! Crate `osutape_paths`: rutas, locks y detección de carpetas de osutape

mod errors;
mod fs_utils;
mod paths;

pub use errors::Error;
pub use paths::{OsutapePaths, detect_songs_dir};

use once_cell::sync::Lazy;

/// Singleton global, para usar en todo el crate sin repetir `new()`
pub static PATHS: Lazy<OsutapePaths> =
    Lazy::new(|| OsutapePaths::new().expect("Failed to initialize OsutapePaths"));
