//! Tokenizador.
//!
//! Convierte el flujo de caracteres de [`crate::source`] en tokens con
//! ubicación, uno a la vez y bajo demanda. Se descartan espacios y
//! comentarios; los saltos de línea sí llegan al parser como tokens.
//!
//! Solo identificadores, literales y entradas desconocidas cargan texto.
//! Los literales numéricos llegan sin convertir, pues su rango se valida
//! en el parser.
//!
//! # Léxico
//! - Los comentarios van desde `#` hasta el fin de la línea.
//! - Los identificadores comienzan con una letra y continúan con letras
//!   o dígitos. No pueden incluir `_`.
//! - `and` y `or` se escriben como palabras, pero son operadores.
//! - Los literales de texto no pueden extenderse más allá de una línea.
//!
//! # Entradas inválidas
//! El tokenizador nunca falla. Cualquier carácter que no pertenece a una clase
//! conocida produce [`Token::Unknown`], y es responsabilidad del parser
//! rechazarlo.

use crate::source::{InputStream, Located, Location};
use std::{
    borrow::Cow,
    fmt::{self, Display},
    iter::Peekable,
    rc::Rc,
    str::FromStr,
};

/// Nombre de variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(Rc<str>);

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Identifier {
    fn from(name: &str) -> Self {
        Identifier(Rc::from(name))
    }
}

impl Display for Identifier {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_ref().fmt(fmt)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Fin de entrada.
    Eof,

    /// Salto de línea.
    Newline,

    /// Identificador.
    Id(Identifier),

    /// Literal numérico, tal como aparece en el código fuente.
    Number(String),

    /// Literal de texto, sin comillas.
    Str(String),

    /// Palabra clave.
    Keyword(Keyword),

    /// Entrada que no pertenece a ninguna clase conocida.
    Unknown(String),

    /// `(`
    OpenParen,

    /// `)`
    CloseParen,

    /// `[`
    OpenSquare,

    /// `]`
    CloseSquare,

    /// `{`
    OpenCurly,

    /// `}`
    CloseCurly,

    /// `;`
    Semicolon,

    /// `,`
    Comma,

    /// `=`
    Assign,

    /// `+`
    Plus,

    /// `-`
    Minus,

    /// `*`
    Times,

    /// `/`
    Slash,

    /// `%`
    Percent,

    /// `==`
    Equal,

    /// `!=`
    NotEqual,

    /// `<`
    Less,

    /// `>`
    Greater,

    /// `<=`
    LessOrEqual,

    /// `>=`
    GreaterOrEqual,

    /// `!`
    Not,

    /// `and`
    And,

    /// `or`
    Or,
}

/// Grupos disjuntos en los que se clasifican los tokens.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TokenClass {
    /// Fin de entrada, saltos de línea, identificadores, literales
    /// y entradas desconocidas.
    Structural,
    Punctuation,
    Operator,
    Keyword,
}

impl Token {
    /// Clasifica un término como palabra clave, operador o identificador.
    pub fn word(word: String) -> Token {
        match word.as_str() {
            "and" => Token::And,
            "or" => Token::Or,
            _ => match Keyword::from_str(&word) {
                Ok(keyword) => Token::Keyword(keyword),
                Err(()) => Token::Id(Identifier(Rc::from(word))),
            },
        }
    }

    /// Obtiene el lexema exacto o normalizado de este token.
    pub fn lexeme(&self) -> Cow<'_, str> {
        use Token::*;

        let fixed = match self {
            Eof => "EOF",
            Newline => "newline",
            Id(id) => id.as_ref(),
            Number(text) | Str(text) | Unknown(text) => text.as_str(),
            Keyword(keyword) => return Cow::Owned(keyword.to_string()),
            OpenParen => "(",
            CloseParen => ")",
            OpenSquare => "[",
            CloseSquare => "]",
            OpenCurly => "{",
            CloseCurly => "}",
            Semicolon => ";",
            Comma => ",",
            Assign => "=",
            Plus => "+",
            Minus => "-",
            Times => "*",
            Slash => "/",
            Percent => "%",
            Equal => "==",
            NotEqual => "!=",
            Less => "<",
            Greater => ">",
            LessOrEqual => "<=",
            GreaterOrEqual => ">=",
            Not => "!",
            And => "and",
            Or => "or",
        };

        Cow::Borrowed(fixed)
    }

    /// Determina el grupo al que pertenece este token.
    pub fn class(&self) -> TokenClass {
        use Token::*;

        match self {
            Eof | Newline | Id(_) | Number(_) | Str(_) | Unknown(_) => TokenClass::Structural,

            OpenParen | CloseParen | OpenSquare | CloseSquare | OpenCurly | CloseCurly
            | Semicolon | Comma => TokenClass::Punctuation,

            Assign | Plus | Minus | Times | Slash | Percent | Equal | NotEqual | Less
            | Greater | LessOrEqual | GreaterOrEqual | Not | And | Or => TokenClass::Operator,

            Keyword(_) => TokenClass::Keyword,
        }
    }
}

impl Display for Token {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Token::*;

        match self {
            Eof => fmt.write_str("end of input"),
            Newline => fmt.write_str("newline"),
            Id(id) => write!(fmt, "identifier `{}`", id),
            Number(text) => write!(fmt, "literal `{}`", text),
            Str(text) => write!(fmt, "string \"{}\"", text),
            Keyword(keyword) => write!(fmt, "keyword `{}`", keyword),
            Unknown(text) => write!(fmt, "unrecognized input `{}`", text),
            other => write!(fmt, "`{}`", other.lexeme()),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Keyword {
    Let,
    If,
    Else,
    While,
    DoTimes,
    Print,
    Read,
}

impl Display for Keyword {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Keyword::*;
        let string = match self {
            Let     => "let",
            If      => "if",
            Else    => "else",
            While   => "while",
            DoTimes => "dotimes",
            Print   => "print",
            Read    => "read",
        };

        fmt.write_str(string)
    }
}

impl FromStr for Keyword {
    type Err = ();

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        use Keyword::*;

        const KEYWORDS: &[(&str, Keyword)] = &[
            ("let",     Let),
            ("if",      If),
            ("else",    Else),
            ("while",   While),
            ("dotimes", DoTimes),
            ("print",   Print),
            ("read",    Read),
        ];

        KEYWORDS
            .iter()
            .find(|&&(name, _)| name == string)
            .map(|&(_, keyword)| keyword)
            .ok_or(())
    }
}

/// Tokenizador con un carácter de lookahead.
///
/// Cada paso observa el estado actual junto al próximo carácter y
/// decide si lo consume, si cambia de estado o si emite un token.
pub struct Lexer<S: Iterator> {
    source: Peekable<S>,
    state: State,
    start: Location,
    last: Location,
    eof: Location,
    exhausted: bool,
    trace: bool,
}

enum State {
    /// Entre tokens.
    Start,

    /// El token ya está decidido; se consume el carácter actual
    /// y se emite.
    Complete(Token),

    /// Desde `#` hasta el fin de línea.
    ///
    /// Este estado vuelve a [`State::Start`] al encontrar `'\n'`,
    /// sin consumirlo, ya que el salto de línea es un token.
    Comment,

    /// Se encontró el primer carácter de un operador que puede
    /// extenderse con `=`.
    Pair(char),

    Integer(String),

    /// Identificador, palabra clave, `and` u `or`.
    Word(String),

    /// Literal de texto, tras la comilla de apertura.
    Text(String),

    /// Se encontró `\` dentro de un literal de texto.
    Escape(String),
}

impl<S: InputStream> Lexer<S> {
    /// Crea un lexer en estado inicial a partir de un flujo y la
    /// ubicación de fin de entrada que produjo [`crate::source::consume`].
    pub fn new(eof: Location, source: S) -> Self {
        Lexer {
            source: source.peekable(),
            state: State::Start,
            start: eof.clone(),
            last: eof.clone(),
            eof,
            exhausted: false,
            trace: false,
        }
    }

    /// Habilita o deshabilita la impresión de cada token a stderr.
    pub fn trace(self, trace: bool) -> Self {
        Lexer { trace, ..self }
    }

    /// Ubicación del fin de entrada.
    pub fn end(&self) -> &Location {
        &self.eof
    }

    /// Obtiene el siguiente token.
    ///
    /// Una vez que se alcanza el fin de entrada, toda llamada posterior
    /// vuelve a producir [`Token::Eof`].
    pub fn next_token(&mut self) -> Located<Token> {
        let token = self.lex();
        self.state = State::Start;

        let location = match token {
            Token::Eof => self.eof.clone(),
            _ => Location::span(self.start.clone(), &self.last),
        };

        if self.trace {
            eprintln!("[lex] {} at {}", token, location);
        }

        Located::at(token, location)
    }

    /// Construye el siguiente token.
    fn lex(&mut self) -> Token {
        use {State::*, Token::*};

        loop {
            let next_char = self.source.peek().map(|(c, _)| *c);

            // El token comienza en el primer carácter no descartado
            if let Start = self.state {
                if let Some((_, location)) = self.source.peek() {
                    self.start = location.clone();
                }
            }

            match (&mut self.state, next_char) {
                (Start, None) => break Eof,

                // Espacios en blanco, el salto de línea es significativo
                (Start, Some(' ' | '\t' | '\r')) => (),
                (Start, Some('\n')) => self.state = Complete(Newline),
                (Start, Some('#')) => self.state = Comment,

                // Un solo carácter
                (Start, Some('(')) => self.state = Complete(OpenParen),
                (Start, Some(')')) => self.state = Complete(CloseParen),
                (Start, Some('[')) => self.state = Complete(OpenSquare),
                (Start, Some(']')) => self.state = Complete(CloseSquare),
                (Start, Some('{')) => self.state = Complete(OpenCurly),
                (Start, Some('}')) => self.state = Complete(CloseCurly),
                (Start, Some(';')) => self.state = Complete(Semicolon),
                (Start, Some(',')) => self.state = Complete(Comma),
                (Start, Some('+')) => self.state = Complete(Plus),
                (Start, Some('-')) => self.state = Complete(Minus),
                (Start, Some('*')) => self.state = Complete(Times),
                (Start, Some('/')) => self.state = Complete(Slash),
                (Start, Some('%')) => self.state = Complete(Percent),

                // Operadores de uno o dos caracteres
                (Start, Some(c @ ('=' | '!' | '<' | '>'))) => self.state = Pair(c),

                (Start, Some('"')) => self.state = Text(String::new()),
                (Start, Some(c)) if c.is_ascii_digit() => self.state = Integer(c.to_string()),
                (Start, Some(c)) if c.is_ascii_alphabetic() => self.state = Word(c.to_string()),
                (Start, Some(c)) => self.state = Complete(Unknown(c.to_string())),

                (Complete(token), _) => break std::mem::replace(token, Eof),

                // Los comentarios descartan el resto de la línea
                (Comment, Some('\n')) | (Comment, None) => {
                    self.state = Start;
                    continue;
                }

                (Comment, Some(_)) => (),

                (Pair(first), Some('=')) => {
                    self.state = Complete(match *first {
                        '=' => Equal,
                        '!' => NotEqual,
                        '<' => LessOrEqual,
                        _ => GreaterOrEqual,
                    })
                }

                // Si no sigue `=`, el operador es de un solo carácter
                (Pair(first), _) => {
                    break match *first {
                        '=' => Assign,
                        '!' => Not,
                        '<' => Less,
                        _ => Greater,
                    }
                }

                (Integer(digits), Some(c)) if c.is_ascii_digit() => digits.push(c),
                (Integer(digits), _) => break Number(std::mem::take(digits)),

                (Word(word), Some(c)) if c.is_ascii_alphanumeric() => word.push(c),
                (Word(word), _) => break Token::word(std::mem::take(word)),

                (Text(text), Some('"')) => self.state = Complete(Str(std::mem::take(text))),
                (Text(text), Some('\\')) => {
                    text.push('\\');
                    self.state = Escape(std::mem::take(text));
                }

                // Un literal sin cerrar antes del fin de línea es desconocido
                (Text(text), Some('\n')) | (Text(text), None) => {
                    break Unknown(format!("\"{}", text));
                }

                (Text(text), Some(c)) => text.push(c),

                (Escape(text), Some(c)) if c != '\n' => {
                    text.push(c);
                    self.state = Text(std::mem::take(text));
                }

                (Escape(text), _) => break Unknown(format!("\"{}", text)),
            }

            // Se acepta el carácter observado
            if let Some((_, location)) = self.source.next() {
                self.last = location;
            }
        }
    }
}

impl<S: InputStream> Iterator for Lexer<S> {
    type Item = Located<Token>;

    /// Emite tokens hasta [`Token::Eof`] inclusive.
    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        let token = self.next_token();
        self.exhausted = *token.val() == Token::Eof;

        Some(token)
    }
}
