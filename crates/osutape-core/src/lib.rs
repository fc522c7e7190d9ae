//! Crate `osutape_core`: parser del formato de descriptores `.osu` de osu!
//!
//! Un descriptor es texto plano con una línea de declaración opcional y
//! bloques `[Nombre]` terminados por una línea en blanco. El parser produce
//! un documento tipado e inmutable; los accesores de campos conocidos
//! (título, audio, fondo) viven en [`BeatmapFile`].

mod beatmap;
mod error;
mod section;

pub use beatmap::BeatmapFile;
pub use error::Error;
pub use section::{FieldValue, SectionData};
