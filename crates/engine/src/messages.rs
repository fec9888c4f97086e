//! User-facing strings produced by validation and execution.

use rconsole_types::Locale;

/// Messages the engine shows to the user, rendered per locale.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Required,
    InvalidPath,
    UnknownError,
    UnreadableResponse,
    CommandSucceeded,
    TooShort(usize),
    TooLong(usize),
    BelowMinimum(f64),
    AboveMaximum(f64),
    NotInteger,
    ExpectedText,
    ExpectedNumber,
    ExpectedBoolean,
    PatternMismatch,
    NotAllowed(Vec<String>),
}

impl Message {
    pub fn render(&self, locale: Locale) -> String {
        match (self, locale) {
            (Self::Required, Locale::En) => "This field is required".into(),
            (Self::Required, Locale::Es) => "Este campo es obligatorio".into(),
            (Self::InvalidPath, Locale::En) => {
                "The path is not valid. Use a Windows path such as C:\\folder\\file".into()
            }
            (Self::InvalidPath, Locale::Es) => {
                "La ruta no es válida. Usa una ruta de Windows como C:\\carpeta\\archivo".into()
            }
            (Self::UnknownError, Locale::En) => "Unknown error".into(),
            (Self::UnknownError, Locale::Es) => "Error desconocido".into(),
            (Self::UnreadableResponse, Locale::En) => "The server returned an unreadable response".into(),
            (Self::UnreadableResponse, Locale::Es) => "El servidor devolvió una respuesta ilegible".into(),
            (Self::CommandSucceeded, Locale::En) => "Command executed successfully".into(),
            (Self::CommandSucceeded, Locale::Es) => "Comando ejecutado correctamente".into(),
            (Self::TooShort(min), Locale::En) => format!("Must be at least {min} characters"),
            (Self::TooShort(min), Locale::Es) => format!("Debe tener al menos {min} caracteres"),
            (Self::TooLong(max), Locale::En) => format!("Must be at most {max} characters"),
            (Self::TooLong(max), Locale::Es) => format!("Debe tener como máximo {max} caracteres"),
            (Self::BelowMinimum(min), Locale::En) => format!("Must be at least {}", number(*min)),
            (Self::BelowMinimum(min), Locale::Es) => format!("Debe ser al menos {}", number(*min)),
            (Self::AboveMaximum(max), Locale::En) => format!("Must be at most {}", number(*max)),
            (Self::AboveMaximum(max), Locale::Es) => format!("Debe ser como máximo {}", number(*max)),
            (Self::NotInteger, Locale::En) => "Must be a whole number".into(),
            (Self::NotInteger, Locale::Es) => "Debe ser un número entero".into(),
            (Self::ExpectedText, Locale::En) => "Must be text".into(),
            (Self::ExpectedText, Locale::Es) => "Debe ser texto".into(),
            (Self::ExpectedNumber, Locale::En) => "Must be a number".into(),
            (Self::ExpectedNumber, Locale::Es) => "Debe ser un número".into(),
            (Self::ExpectedBoolean, Locale::En) => "Choose yes or no".into(),
            (Self::ExpectedBoolean, Locale::Es) => "Elige sí o no".into(),
            (Self::PatternMismatch, Locale::En) => "Has an invalid format".into(),
            (Self::PatternMismatch, Locale::Es) => "Tiene un formato no válido".into(),
            (Self::NotAllowed(values), Locale::En) => format!("Must be one of: {}", values.join(", ")),
            (Self::NotAllowed(values), Locale::Es) => format!("Debe ser uno de: {}", values.join(", ")),
        }
    }
}

fn number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_bounds_without_trailing_zero() {
        assert_eq!(Message::AboveMaximum(100.0).render(Locale::En), "Must be at most 100");
        assert_eq!(Message::BelowMinimum(0.5).render(Locale::Es), "Debe ser al menos 0.5");
    }
}
