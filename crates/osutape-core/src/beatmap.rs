use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::Error;
use crate::section::{FieldValue, SectionData, interpret_section};

/// Cabecera `[Nombre]` (solo caracteres de palabra) con su cuerpo hasta la
/// línea en blanco que lo termina, incluida.
static SECTION_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[(\w+)\]([\s\S]+?\n\n)").unwrap());

/// Nombre de fichero entre comillas dentro de una línea de evento.
static QUOTED_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([^"]+)""#).unwrap());

/// Prefijo literal del evento de fondo. Asume que el fondo es siempre el
/// primer evento con esta forma; capas de storyboard con otro prefijo
/// numérico no se reconocen.
const BACKGROUND_PREFIX: &str = "0,0,\"";

/// Recorre el texto crudo y produce, de forma perezosa, un par
/// `(nombre, cuerpo)` por cada sección, de izquierda a derecha y sin
/// solaparse. El texto fuera de todo bloque (la declaración, típicamente)
/// no se toca aquí.
fn scan_sections(raw: &str) -> impl Iterator<Item = (&str, &str)> {
    SECTION_REGEX
        .captures_iter(raw)
        .map(|c| c.extract())
        .map(|(_, [name, body])| (name, body))
}

/// Un descriptor `.osu` parseado: documento inmutable de secciones tipadas
/// más los accesores de los campos conocidos.
#[derive(Debug, Clone, PartialEq)]
pub struct BeatmapFile {
    path: PathBuf,
    dir: PathBuf,
    raw: String,
    declaration: String,
    sections: Vec<(String, SectionData)>,
}

impl BeatmapFile {
    /// Lee el fichero completo y construye el documento. El handle se
    /// libera al salir de la lectura, también en caso de error.
    pub fn open(path: impl AsRef<Path>) -> Result<BeatmapFile, Error> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let map = Self::from_raw(path, raw);
        debug!(path = %map.path.display(), sections = map.sections.len(), "descriptor parseado");
        Ok(map)
    }

    /// Construye el documento a partir de texto ya leído. Transformación
    /// pura: mismo texto, mismo documento.
    pub fn from_raw(path: impl Into<PathBuf>, raw: String) -> BeatmapFile {
        let path = path.into();
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

        // Finales de línea normalizados, y un doble salto final que
        // garantiza que la última sección siempre queda terminada.
        let mut raw = raw.replace("\r\n", "\n").replace('\r', "\n");
        raw.push_str("\n\n");

        let declaration = raw.split('\n').next().unwrap_or_default().to_string();

        let mut sections: Vec<(String, SectionData)> = Vec::new();
        for (name, body) in scan_sections(&raw) {
            let data = interpret_section(name, body);
            match sections.iter_mut().find(|(n, _)| n == name) {
                // Un nombre repetido pisa al anterior, conservando su
                // posición original en el documento.
                Some(slot) => slot.1 = data,
                None => sections.push((name.to_string(), data)),
            }
        }

        BeatmapFile {
            path,
            dir,
            raw,
            declaration,
            sections,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directorio del beatmap; las rutas de audio y fondo se resuelven
    /// relativas a él.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Texto crudo del descriptor (con el terminador añadido).
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Primera línea del fichero: el marcador de formato/versión.
    pub fn declaration(&self) -> &str {
        &self.declaration
    }

    /// Secciones en su orden de aparición.
    pub fn sections(&self) -> impl Iterator<Item = (&str, &SectionData)> {
        self.sections.iter().map(|(n, d)| (n.as_str(), d))
    }

    /// Una sección por su nombre original (sensible a mayúsculas).
    pub fn section(&self, name: &str) -> Option<&SectionData> {
        self.sections.iter().find(|(n, _)| n == name).map(|(_, d)| d)
    }

    /// Valor de `section.field`. Falla con [`Error::MissingField`] si la
    /// sección no existe, quedó clasificada como lista, o no tiene la clave.
    pub fn field(&self, section: &str, field: &str) -> Result<&FieldValue, Error> {
        match self.section(section) {
            Some(SectionData::Fields(map)) => {
                map.get(field).ok_or_else(|| Error::missing(section, field))
            }
            _ => Err(Error::missing(section, field)),
        }
    }

    /// `Metadata.Title`, en forma de texto.
    pub fn title(&self) -> Result<String, Error> {
        Ok(self.field("Metadata", "Title")?.to_string())
    }

    /// Ruta del audio: directorio del beatmap + `General.AudioFilename`.
    pub fn audio_path(&self) -> Result<PathBuf, Error> {
        let name = self.field("General", "AudioFilename")?;
        Ok(self.dir.join(name.to_string()))
    }

    /// Primera línea de `Events` con el prefijo de fondo, si la hay. La
    /// ausencia no es un error: quien llama decide qué hacer sin fondo.
    pub fn background_path(&self) -> Option<PathBuf> {
        let Some(SectionData::Lines(lines)) = self.section("Events") else {
            return None;
        };
        lines
            .iter()
            .find(|line| line.starts_with(BACKGROUND_PREFIX))
            .and_then(|line| QUOTED_REGEX.captures(line))
            .map(|c| self.dir.join(&c[1]))
    }

    /// Título para etiquetas: prefiere `TitleUnicode` y cae a `Title`.
    pub fn display_title(&self) -> Result<String, Error> {
        let value = self
            .field("Metadata", "TitleUnicode")
            .or_else(|_| self.field("Metadata", "Title"))?;
        Ok(value.to_string())
    }

    /// Artista para etiquetas: prefiere `ArtistUnicode` y cae a `Artist`.
    pub fn display_artist(&self) -> Result<String, Error> {
        let value = self
            .field("Metadata", "ArtistUnicode")
            .or_else(|_| self.field("Metadata", "Artist"))?;
        Ok(value.to_string())
    }
}
