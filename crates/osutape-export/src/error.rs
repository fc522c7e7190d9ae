use thiserror::Error;

/// Errores de carga/escritura de la configuración
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Configuration parse error: {0}")]
    Parse(#[from] config::ConfigError),
}

/// Errores al exportar un beatmap concreto
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Beatmap error: {0}")]
    Beatmap(#[from] osutape_core::Error),

    #[error("Tag write error: {0}")]
    Tag(#[from] lofty::error::LoftyError),
}
