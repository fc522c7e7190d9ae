use std::io;
use std::path::PathBuf;

/// Errores genéricos del crate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// No se pudo determinar el directorio base (HOME, XDG, etc)
    #[error(
        "Could not determine the application directories, the call to ProjectDirs failed, \
         the system probably does not provide a valid $HOME path."
    )]
    NoHome,

    /// Ruta sin permisos de escritura
    #[error("No write permission for {0}")]
    ReadOnly(PathBuf),

    /// Error de IO al crear dirs, ficheros, locks...
    #[error(transparent)]
    Io(#[from] io::Error),
}
