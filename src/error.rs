//! Reporte de errores.
//!
//! Todo error de traducción está ligado a un fragmento del código
//! fuente. [`Diagnostics`] presenta cada uno al estilo de rustc: el
//! mensaje, la ubicación, la línea citada y una marca bajo el fragmento.

use crate::source::{Located, Location};
use std::{
    error::Error,
    fmt::{self, Debug, Display, Formatter},
};

/// Errores de una traducción fallida.
pub struct Diagnostics {
    kind: &'static str,
    reports: Vec<Report>,
}

struct Report {
    message: String,
    location: Location,
}

impl Diagnostics {
    /// Etiqueta que antecede a cada mensaje, como `"Syntax error"`.
    pub fn kind(self, kind: &'static str) -> Self {
        Diagnostics { kind, ..self }
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Mensajes de error, sin ubicación.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.reports.iter().map(|report| report.message.as_str())
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Diagnostics {
            kind: "error",
            reports: Vec::new(),
        }
    }
}

impl<E: Error> From<Located<E>> for Diagnostics {
    fn from(error: Located<E>) -> Self {
        let (location, error) = error.split();
        let report = Report {
            message: error.to_string(),
            location,
        };

        Diagnostics {
            reports: vec![report],
            ..Default::default()
        }
    }
}

impl Display for Diagnostics {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> fmt::Result {
        if self.reports.is_empty() {
            return writeln!(fmt, "No errors were reported");
        }

        for report in &self.reports {
            writeln!(fmt, "{}: {}", self.kind, report.message)?;
            excerpt(fmt, &report.location)?;
            writeln!(fmt)?;
        }

        let count = self.reports.len();
        let plural = if count == 1 { "" } else { "s" };
        writeln!(fmt, "Translation failed with {} error{}", count, plural)
    }
}

impl Debug for Diagnostics {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, fmt)
    }
}

/// Cita las líneas de `location` y marca las columnas que abarca.
fn excerpt(fmt: &mut Formatter<'_>, location: &Location) -> fmt::Result {
    let (first, last) = (location.first(), location.last());
    let width = last.line().to_string().len();

    writeln!(fmt, "{:width$}--> {}", "", location, width = width)?;
    writeln!(fmt, "{:width$} |", "", width = width)?;

    for number in first.line()..=last.line() {
        let line = location.source().line(number);
        writeln!(fmt, "{:>width$} | {}", number, line, width = width)?;
    }

    // En rangos de varias líneas las columnas pueden estar invertidas
    let left = first.column().min(last.column()) as usize;
    let right = first.column().max(last.column()) as usize;

    writeln!(
        fmt,
        "{:width$} | {}{}",
        "",
        " ".repeat(left - 1),
        "^".repeat(right - left + 1),
        width = width
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::source;
    use thiserror::Error;

    #[derive(Error, Debug)]
    #[error("Something went wrong")]
    struct Failure;

    #[test]
    fn renders_source_line_and_highlight() {
        let (_, stream) = source::consume("let x = @;\n", "demo.bb");
        let chars: Vec<_> = stream.map(|(_, location)| location).collect();

        let diagnostics =
            Diagnostics::from(Located::at(Failure, chars[8].clone())).kind("Syntax error");
        assert_eq!(
            diagnostics.to_string(),
            "Syntax error: Something went wrong\n \
             --> demo.bb:1:9\n  \
             |\n\
             1 | let x = @;\n  \
             |         ^\n\
             \n\
             Translation failed with 1 error\n"
        );
    }

    #[test]
    fn highlights_whole_span() {
        let (_, stream) = source::consume("x = 123456;", "demo.bb");
        let chars: Vec<_> = stream.map(|(_, location)| location).collect();
        let span = Location::span(chars[4].clone(), &chars[9]);

        let diagnostics = Diagnostics::from(Located::at(Failure, span));
        let rendered = diagnostics.to_string();

        assert!(rendered.starts_with("error: Something went wrong\n"));
        assert!(rendered.contains(" --> demo.bb:[1:5-1:10]\n"));
        assert!(rendered.contains("\n  |     ^^^^^^\n"));
        assert_eq!(diagnostics.messages().collect::<Vec<_>>(), ["Something went wrong"]);
    }

    #[test]
    fn empty() {
        let diagnostics = Diagnostics::default();

        assert!(diagnostics.is_empty());
        assert_eq!(diagnostics.to_string(), "No errors were reported\n");
    }
}
