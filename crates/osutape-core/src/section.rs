use std::collections::HashMap;
use std::fmt;

/// Secciones que se interpretan siempre como clave/valor.
const KEY_VALUE_SECTIONS: &[&str] = &["general", "editor", "metadata", "difficulty", "colours"];

/// Secciones que se interpretan siempre como lista de líneas.
const LINE_LIST_SECTIONS: &[&str] = &["events", "hitobjects"];

/// Escalar coercionado de un campo clave/valor.
///
/// Discriminantes explícitos: quien consume un campo decide qué hacer con
/// cada caso, no hay valor "dinámico".
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    /// Coerción de un valor crudo: entero primero, luego flotante, y si no,
    /// el texto recortado tal cual. Nunca falla.
    pub fn coerce(raw: &str) -> FieldValue {
        if let Ok(n) = raw.parse::<i64>() {
            return FieldValue::Integer(n);
        }
        if let Ok(x) = raw.parse::<f64>() {
            return FieldValue::Float(x);
        }
        FieldValue::Text(raw.to_string())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::Float(x) => write!(f, "{}", x),
            FieldValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Contenido de una sección ya clasificado.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionData {
    Fields(HashMap<String, FieldValue>),
    Lines(Vec<String>),
}

impl SectionData {
    pub fn is_empty(&self) -> bool {
        match self {
            SectionData::Fields(map) => map.is_empty(),
            SectionData::Lines(lines) => lines.is_empty(),
        }
    }
}

/// Modo de clasificación derivado del nombre (en minúsculas) de la sección.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionMode {
    KeyValue,
    LineList,
    Heuristic,
}

impl SectionMode {
    fn for_name(name: &str) -> SectionMode {
        let lower = name.to_lowercase();
        if KEY_VALUE_SECTIONS.contains(&lower.as_str()) {
            SectionMode::KeyValue
        } else if LINE_LIST_SECTIONS.contains(&lower.as_str()) {
            SectionMode::LineList
        } else {
            SectionMode::Heuristic
        }
    }
}

/// Forma final de una sección.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionShape {
    Fields,
    Lines,
}

/// Regla de desempate entre los dos candidatos acumulados: el mapa gana solo
/// si tiene estrictamente más entradas que la lista. Con empate (incluido el
/// cuerpo vacío) gana la lista. Se aplica en todos los modos.
fn resolve_shape(field_count: usize, line_count: usize) -> SectionShape {
    if field_count > line_count {
        SectionShape::Fields
    } else {
        SectionShape::Lines
    }
}

/// Interpreta el cuerpo de una sección y decide su forma final.
pub(crate) fn interpret_section(name: &str, body: &str) -> SectionData {
    let mode = SectionMode::for_name(name);
    let mut fields: HashMap<String, FieldValue> = HashMap::new();
    let mut lines: Vec<String> = Vec::new();

    for line in body.lines() {
        if line.trim().is_empty() {
            continue;
        }

        match mode {
            SectionMode::LineList => lines.push(line.trim().to_string()),
            SectionMode::KeyValue | SectionMode::Heuristic => {
                if line.contains(':') {
                    // Split en TODOS los ':': clave = elemento 0, valor =
                    // elemento 1. Lo que venga después del segundo ':' se
                    // pierde; compatibilidad con el formato, no se "arregla".
                    let mut parts = line.split(':');
                    let key = parts.next().unwrap_or_default().trim();
                    let raw = parts.next().unwrap_or_default().trim();
                    fields.insert(key.to_string(), FieldValue::coerce(raw));
                } else {
                    // Línea sin ':' en una sección clave/valor: no es un
                    // error, cuenta para el candidato lista.
                    lines.push(line.trim().to_string());
                }
            }
        }
    }

    match resolve_shape(fields.len(), lines.len()) {
        SectionShape::Fields => SectionData::Fields(fields),
        SectionShape::Lines => SectionData::Lines(lines),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce_integer() {
        assert_eq!(FieldValue::coerce("5"), FieldValue::Integer(5));
        assert_eq!(FieldValue::coerce("-12"), FieldValue::Integer(-12));
        assert_eq!(FieldValue::coerce("+3"), FieldValue::Integer(3));
    }

    #[test]
    fn coerce_float() {
        assert_eq!(FieldValue::coerce("5.5"), FieldValue::Float(5.5));
        assert_eq!(FieldValue::coerce("1e3"), FieldValue::Float(1000.0));
    }

    #[test]
    fn coerce_text() {
        let value = FieldValue::coerce("five");
        assert_eq!(value, FieldValue::Text("five".to_string()));
        assert_eq!(value.as_text(), Some("five"));
        assert_eq!(FieldValue::coerce("5").as_text(), None);
    }

    #[test]
    fn integer_never_becomes_float() {
        // "5" debe quedarse en Integer aunque también parsee como f64
        assert_eq!(FieldValue::coerce("5"), FieldValue::Integer(5));
        assert_ne!(FieldValue::coerce("5"), FieldValue::Float(5.0));
    }

    #[test]
    fn shape_tie_goes_to_lines() {
        assert_eq!(resolve_shape(2, 2), SectionShape::Lines);
        assert_eq!(resolve_shape(0, 0), SectionShape::Lines);
    }

    #[test]
    fn shape_strictly_greater_goes_to_fields() {
        assert_eq!(resolve_shape(3, 2), SectionShape::Fields);
        assert_eq!(resolve_shape(1, 0), SectionShape::Fields);
    }

    #[test]
    fn key_value_section_basic() {
        let data = interpret_section("Metadata", "Title: Song A\nArtist:Band B\n");
        let SectionData::Fields(map) = data else {
            panic!("Esperaba Fields");
        };
        assert_eq!(map["Title"], FieldValue::Text("Song A".to_string()));
        assert_eq!(map["Artist"], FieldValue::Text("Band B".to_string()));
    }

    #[test]
    fn key_value_mode_is_case_insensitive() {
        let data = interpret_section("GENERAL", "AudioLeadIn: 0\n");
        assert!(matches!(data, SectionData::Fields(_)));
    }

    #[test]
    fn multi_colon_value_is_truncated() {
        let data = interpret_section("Metadata", "Source: a:b:c\nTitle:x\n");
        let SectionData::Fields(map) = data else {
            panic!("Esperaba Fields");
        };
        // solo sobrevive el segundo campo del split
        assert_eq!(map["Source"], FieldValue::Text("a".to_string()));
    }

    #[test]
    fn duplicate_keys_keep_last_value() {
        let data = interpret_section("Metadata", "Title:One\nTitle:Two\n");
        let SectionData::Fields(map) = data else {
            panic!("Esperaba Fields");
        };
        assert_eq!(map.len(), 1);
        assert_eq!(map["Title"], FieldValue::Text("Two".to_string()));
    }

    #[test]
    fn key_value_section_without_colons_becomes_lines() {
        // Quirk preservado: el modo clave/valor acumula igualmente el
        // candidato lista, y la regla de conteo se aplica también aquí.
        let data = interpret_section("General", "uno\ndos\n");
        assert_eq!(
            data,
            SectionData::Lines(vec!["uno".to_string(), "dos".to_string()])
        );
    }

    #[test]
    fn heuristic_tie_classifies_as_lines() {
        let data = interpret_section("Custom", "A:1\nB:2\nfoo\nbar\n");
        assert_eq!(
            data,
            SectionData::Lines(vec!["foo".to_string(), "bar".to_string()])
        );
    }

    #[test]
    fn heuristic_majority_of_pairs_classifies_as_fields() {
        let data = interpret_section("Custom", "A:1\nB:2\nfoo\n");
        let SectionData::Fields(map) = data else {
            panic!("Esperaba Fields");
        };
        assert_eq!(map["A"], FieldValue::Integer(1));
        assert_eq!(map["B"], FieldValue::Integer(2));
    }

    #[test]
    fn line_list_sections_keep_order_and_trim() {
        let data = interpret_section("HitObjects", "  256,192,1000,1,0  \n64,64,2000,1,0\n");
        assert_eq!(
            data,
            SectionData::Lines(vec![
                "256,192,1000,1,0".to_string(),
                "64,64,2000,1,0".to_string()
            ])
        );
    }

    #[test]
    fn line_list_mode_never_builds_fields() {
        // Events siempre es lista aunque sus líneas tengan ':'
        let data = interpret_section("Events", "Video:0,\"intro.avi\"\n");
        assert_eq!(data, SectionData::Lines(vec!["Video:0,\"intro.avi\"".to_string()]));
    }

    #[test]
    fn blank_lines_are_dropped_entirely() {
        let data = interpret_section("HitObjects", "a\n\n   \nb\n");
        assert_eq!(data, SectionData::Lines(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn empty_body_is_an_empty_line_list() {
        assert_eq!(interpret_section("Colours", ""), SectionData::Lines(vec![]));
        assert_eq!(interpret_section("Whatever", "\n\n"), SectionData::Lines(vec![]));
    }
}
