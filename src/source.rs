//! Ubicaciones en el texto fuente.
//!
//! Cada token, nodo y error del traductor recuerda el fragmento del
//! programa del cual proviene. El texto completo ya está en memoria
//! cuando comienza el análisis léxico, así que las líneas se conservan
//! para citarlas en los diagnósticos.

use std::{
    fmt::{self, Debug, Display, Formatter},
    rc::Rc,
    vec,
};

/// Columnas entre paradas de tabulador.
const TAB_STOP: u32 = 4;

/// Flujo de caracteres, cada uno con su ubicación.
pub trait InputStream: Iterator<Item = (char, Location)> {}

impl<I: Iterator<Item = (char, Location)>> InputStream for I {}

/// Valor acompañado del fragmento de código que lo originó.
#[derive(Debug, Clone)]
pub struct Located<T> {
    inner: T,
    span: Location,
}

impl<T> Located<T> {
    pub fn at(inner: T, span: Location) -> Self {
        Located { inner, span }
    }

    pub fn val(&self) -> &T {
        &self.inner
    }

    pub fn location(&self) -> &Location {
        &self.span
    }

    pub fn into_inner(self) -> T {
        self.inner
    }

    pub fn split(self) -> (Location, T) {
        let Located { inner, span } = self;
        (span, inner)
    }

    /// Reemplaza el valor conservando la ubicación.
    pub fn map<U, F>(self, map: F) -> Located<U>
    where
        F: FnOnce(T) -> U,
    {
        let (span, inner) = self.split();
        Located::at(map(inner), span)
    }
}

impl<T> AsRef<T> for Located<T> {
    fn as_ref(&self) -> &T {
        &self.inner
    }
}

/// Rango de posiciones de un mismo origen, inclusivo en ambos extremos.
#[derive(Clone)]
pub struct Location {
    source: Rc<Source>,
    first: Position,
    last: Position,
}

impl Location {
    /// Rango desde el inicio de `from` hasta el final de `to`.
    pub fn span(from: Location, to: &Location) -> Self {
        Location {
            last: to.last,
            ..from
        }
    }

    pub fn first(&self) -> Position {
        self.first
    }

    pub fn last(&self) -> Position {
        self.last
    }

    pub fn source(&self) -> &Source {
        &self.source
    }
}

impl Display for Location {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        let name = self.source.name();
        if self.first == self.last {
            write!(formatter, "{}:{}", name, self.first)
        } else {
            write!(formatter, "{}:[{}-{}]", name, self.first, self.last)
        }
    }
}

impl Debug for Location {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, formatter)
    }
}

/// Línea y columna, ambas desde 1.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Position {
    line: u32,
    column: u32,
}

impl Position {
    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    /// Posición que sigue a un carácter `c` ubicado aquí.
    fn after(self, c: char) -> Position {
        let Position { line, column } = self;
        match c {
            '\n' => Position {
                line: line + 1,
                column: 1,
            },

            '\t' => Position {
                line,
                column: column + TAB_STOP - (column - 1) % TAB_STOP,
            },

            _ => Position {
                line,
                column: column + 1,
            },
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position { line: 1, column: 1 }
    }
}

impl Display for Position {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:{}", self.line, self.column)
    }
}

/// Prepara un texto fuente para el análisis léxico.
///
/// Retorna la ubicación de fin de entrada, justo después del último
/// carácter, y el flujo de caracteres del texto.
pub fn consume<S>(text: &str, name: S) -> (Location, impl InputStream)
where
    S: Into<String>,
{
    let source = Rc::new(Source {
        name: name.into(),
        lines: text.lines().map(String::from).collect(),
    });

    let end = text.chars().fold(Position::default(), Position::after);
    let eof = Location {
        source: Rc::clone(&source),
        first: end,
        last: end,
    };

    let stream = Chars {
        source,
        chars: text.chars().collect::<Vec<_>>().into_iter(),
        here: Position::default(),
    };

    (eof, stream)
}

struct Chars {
    source: Rc<Source>,
    chars: vec::IntoIter<char>,
    here: Position,
}

impl Iterator for Chars {
    type Item = (char, Location);

    fn next(&mut self) -> Option<Self::Item> {
        let c = self.chars.next()?;
        let location = Location {
            source: Rc::clone(&self.source),
            first: self.here,
            last: self.here,
        };

        self.here = self.here.after(c);
        Some((c, location))
    }
}

/// Origen del programa: su nombre y sus líneas.
pub struct Source {
    name: String,
    lines: Vec<String>,
}

impl Source {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Línea número `number`, o vacía si no existe.
    ///
    /// La ubicación de fin de entrada tras un salto de línea final
    /// apunta a una línea que no existe.
    pub fn line(&self, number: u32) -> &str {
        (number as usize)
            .checked_sub(1)
            .and_then(|index| self.lines.get(index))
            .map_or("", String::as_str)
    }
}
