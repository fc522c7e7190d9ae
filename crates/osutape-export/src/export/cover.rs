use std::fs;
use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, ImageReader};
use lofty::picture::{MimeType, Picture, PictureType};

use crate::error::ExportError;

/// Bytes finales de la portada: si la imagen decodifica se re-encodea a PNG,
/// si no, se incrustan los bytes originales tal cual.
fn prepare_cover_data(data: Vec<u8>) -> Vec<u8> {
    let decoded = ImageReader::new(Cursor::new(&data))
        .with_guessed_format()
        .ok()
        .and_then(|reader| reader.decode().ok());

    match decoded {
        Some(img) => {
            let mut png = Vec::new();
            match img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png) {
                Ok(()) => png,
                Err(_) => data,
            }
        }
        None => data,
    }
}

/// Lee la imagen de fondo del beatmap y construye la portada frontal.
pub(crate) fn front_cover(path: &Path) -> Result<Picture, ExportError> {
    let raw = fs::read(path)?;
    let data = prepare_cover_data(raw);

    Ok(Picture::new_unchecked(
        PictureType::CoverFront,
        Some(MimeType::Png),
        Some(String::from("Front cover")),
        data,
    ))
}
