//! Opciones de traducción.

use bitflags::bitflags;

/// Estilo del texto generado.
///
/// El estilo solo afecta espacios en blanco, indentación y saltos
/// de línea. La semántica del programa generado es la misma.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Format {
    /// Una sentencia por línea, bloques indentados y espacios
    /// alrededor de operadores.
    Pretty,

    /// Espacios únicamente donde dos tokens se fundirían en uno.
    Compact,
}

impl Default for Format {
    /// El estilo por omisión se elige al compilar con la feature `compact`.
    fn default() -> Self {
        if cfg!(feature = "compact") {
            Format::Compact
        } else {
            Format::Pretty
        }
    }
}

bitflags! {
    /// Fases cuyo progreso se imprime a stderr.
    #[derive(Default)]
    pub struct Trace: u32 {
        /// Cada token producido por el lexer.
        const TOKENS = 0x01;

        /// Cada producción gramatical que reconoce el parser.
        const PRODUCTIONS = 0x02;
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct Options {
    pub format: Format,
    pub trace: Trace,
}
