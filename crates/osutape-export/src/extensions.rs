use std::path::Path;

use serde::{Deserialize, Serialize};

/// Contenedores de audio que el exportador sabe re-etiquetar. Cualquier otro
/// formato se rechaza sin intentar tocar sus metadatos.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SupportedAudio {
    Mp3,
}

impl SupportedAudio {
    pub const ALL: &'static [SupportedAudio] = &[SupportedAudio::Mp3];

    pub fn as_str(&self) -> &'static str {
        match self {
            SupportedAudio::Mp3 => "mp3",
        }
    }

    /// Detecta el contenedor por la extensión del fichero.
    pub fn from_path(path: &Path) -> Option<SupportedAudio> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        SupportedAudio::ALL.iter().find(|a| a.as_str() == ext).copied()
    }
}

impl std::fmt::Display for SupportedAudio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn detects_mp3_ignoring_case() {
        assert_eq!(
            SupportedAudio::from_path(&PathBuf::from("a/b/song.MP3")),
            Some(SupportedAudio::Mp3)
        );
    }

    #[test]
    fn rejects_other_containers() {
        assert_eq!(SupportedAudio::from_path(&PathBuf::from("song.ogg")), None);
        assert_eq!(SupportedAudio::from_path(&PathBuf::from("song")), None);
    }
}
