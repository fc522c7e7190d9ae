use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

/// Una entrada de un volcado de colecciones tiene la forma
/// `Artista - Título [Dificultad]`; nos quedamos con lo anterior al `[`.
static ENTRY_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(.+?)\[").unwrap());

/// Filtro construido desde un volcado de colecciones de osu!: restringe la
/// exportación a los beatmaps cuyas entradas aparecen en el volcado.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionFilter {
    entries: Vec<String>,
}

impl CollectionFilter {
    pub fn from_file(path: impl AsRef<Path>) -> std::io::Result<CollectionFilter> {
        let text = fs::read_to_string(path)?;
        Ok(Self::from_text(&text))
    }

    pub fn from_text(text: &str) -> CollectionFilter {
        let entries = ENTRY_REGEX
            .captures_iter(text)
            .map(|c| c[1].to_string())
            .collect();
        CollectionFilter { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// ¿Alguna entrada corresponde a este título una vez quitado el
    /// prefijo `"<artista> - "`?
    pub fn matches(&self, title: &str, artist: &str) -> bool {
        let prefix = format!("{} - ", artist);
        self.entries.iter().any(|e| e.replace(&prefix, "").trim() == title)
    }
}
