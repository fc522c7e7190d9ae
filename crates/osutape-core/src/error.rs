use std::io;

/// Errores del parser y de los accesores
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Falta una clave en una sección clave/valor (o la sección no existe).
    /// Se detecta al consultar, nunca al parsear.
    #[error("Missing field: {section}.{field}")]
    MissingField { section: String, field: String },

    /// Error de IO al leer el fichero fuente
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn missing(section: &str, field: &str) -> Error {
        Error::MissingField {
            section: section.to_string(),
            field: field.to_string(),
        }
    }
}
