//! Emisión de código C.
//!
//! El [`Emitter`] acumula el texto generado línea por línea. Recibe una
//! secuencia de llamadas estructurales (tokens, inicio y fin de bloque,
//! fin de sentencia) en el mismo orden en el que aparecen las
//! construcciones del programa fuente, y decide dónde colocar espacios,
//! saltos de línea e indentación según el [`Format`] elegido.
//!
//! El texto final solo se materializa en [`Emitter::finish()`], una vez
//! que la traducción completa fue exitosa.

use crate::{
    lex::{Identifier, Keyword, Token},
    options::Format,
};

use std::borrow::Cow;

/// Directiva de inclusión al inicio de toda salida.
const PREAMBLE: &str = "#include <stdio.h>";

/// Apertura del punto de entrada.
const ENTRY: &str = "int main(void)";

/// Especificador de formato para el único tipo del lenguaje.
const INT_FORMAT: &str = "%d";

/// Un nivel de indentación en formato legible.
const INDENT: &str = "    ";

/// Clase de espaciado de un fragmento emitido.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Spacing {
    /// Identificadores, literales, palabras clave y llamadas.
    Word,

    /// `(`
    Open,

    /// `)`
    Close,

    /// `,` y `;`
    Separator,

    /// Operadores binarios.
    Binary,

    /// `!`
    Prefix,
}

pub struct Emitter {
    format: Format,
    lines: Vec<String>,
    line: String,
    indent: usize,
    last: Option<Spacing>,
}

impl Emitter {
    pub fn new(format: Format) -> Self {
        Emitter {
            format,
            lines: Vec::new(),
            line: String::new(),
            indent: 0,
            last: None,
        }
    }

    /// Escribe un token, traducido a su forma en C.
    pub fn write_token(&mut self, token: &Token) {
        let spacing = match token {
            Token::OpenParen | Token::OpenSquare => Spacing::Open,
            Token::CloseParen | Token::CloseSquare => Spacing::Close,
            Token::Comma | Token::Semicolon => Spacing::Separator,
            Token::Not => Spacing::Prefix,
            Token::Assign
            | Token::Plus
            | Token::Minus
            | Token::Times
            | Token::Slash
            | Token::Percent
            | Token::Equal
            | Token::NotEqual
            | Token::Less
            | Token::Greater
            | Token::LessOrEqual
            | Token::GreaterOrEqual
            | Token::And
            | Token::Or => Spacing::Binary,
            _ => Spacing::Word,
        };

        self.push(&translate(token), spacing);
    }

    /// Abre un bloque al final de la línea actual.
    pub fn begin_block(&mut self) {
        match self.format {
            Format::Pretty if !self.line.is_empty() => self.line.push_str(" {"),
            _ => self.line.push('{'),
        }

        self.flush();
        self.indent += 1;
    }

    /// Cierra el bloque más interno en una línea propia.
    pub fn end_block(&mut self) {
        debug_assert!(self.indent > 0, "end_block() without begin_block()");

        self.flush();
        self.indent -= 1;
        self.line.push('}');
        self.flush();
    }

    /// Termina la sentencia actual con `;`.
    pub fn end_statement(&mut self) {
        self.line.push(';');
        self.flush();
    }

    /// Escribe una llamada de salida formateada.
    ///
    /// `format` es la cadena de formato ya construida, sin comillas.
    pub fn write_print(&mut self, format: &str, args: &[Identifier]) {
        let mut call = format!("{}(\"{}\"", translate(&Token::Keyword(Keyword::Print)), format);
        for arg in args {
            call.push_str(self.separator(","));
            call.push_str(arg.as_ref());
        }

        call.push(')');
        self.push(&call, Spacing::Word);
    }

    /// Escribe una llamada de lectura de un entero hacia `target`.
    pub fn write_read(&mut self, target: &Identifier) {
        let call = format!(
            "{}(\"{}\"{}&{})",
            translate(&Token::Keyword(Keyword::Read)),
            INT_FORMAT,
            self.separator(","),
            target
        );

        self.push(&call, Spacing::Word);
    }

    /// Escribe el encabezado de un ciclo contado de `0` a `bound`.
    ///
    /// Con `limit`, el valor de `bound` se copia a esa variable al
    /// entrar y la condición compara contra la copia. Los nombres los
    /// reserva quien llama.
    pub fn write_loop_header(&mut self, counter: &str, bound: &str, limit: Option<&str>) {
        let (eq, lt) = match self.format {
            Format::Pretty => (" = ", " < "),
            Format::Compact => ("=", "<"),
        };

        let mut init = format!(
            "{} {}{}0",
            translate(&Token::Keyword(Keyword::Let)),
            counter,
            eq
        );

        let end = match limit {
            Some(limit) => {
                init.push_str(self.separator(","));
                init.push_str(limit);
                init.push_str(eq);
                init.push_str(bound);
                limit
            }

            None => bound,
        };

        let header = format!(
            "{}{}({}{}{}{}{}{}{}++)",
            translate(&Token::Keyword(Keyword::DoTimes)),
            self.separator(""),
            init,
            self.separator(";"),
            counter,
            lt,
            end,
            self.separator(";"),
            counter,
        );

        self.push(&header, Spacing::Word);
    }

    /// Materializa la salida completa.
    ///
    /// Todas las declaraciones se elevan al inicio del punto de entrada,
    /// en el orden dado, antes de cualquier sentencia.
    pub fn finish(mut self, declarations: &[Identifier]) -> String {
        debug_assert_eq!(self.indent, 0, "unbalanced blocks");
        if !self.line.is_empty() {
            self.flush();
        }

        let int = translate(&Token::Keyword(Keyword::Let)).into_owned();
        let declarations: Vec<_> = declarations
            .iter()
            .map(|name| format!("{} {};", int, name))
            .collect();

        let mut output = String::new();
        match self.format {
            Format::Pretty => {
                output.push_str(PREAMBLE);
                output.push_str("\n\n");
                output.push_str(ENTRY);
                output.push_str(" {\n");

                for declaration in &declarations {
                    output.push_str(INDENT);
                    output.push_str(declaration);
                    output.push('\n');
                }

                if !declarations.is_empty() && !self.lines.is_empty() {
                    output.push('\n');
                }

                for line in &self.lines {
                    output.push_str(INDENT);
                    output.push_str(line);
                    output.push('\n');
                }

                output.push_str("}\n");
            }

            Format::Compact => {
                output.push_str(PREAMBLE);
                output.push('\n');
                output.push_str(ENTRY);
                output.push('{');
                output.extend(declarations);
                output.extend(self.lines);
                output.push_str("}\n");
            }
        }

        output
    }

    /// Agrega un fragmento a la línea en curso, precedido de un
    /// espacio solo si el formato lo requiere.
    fn push(&mut self, text: &str, spacing: Spacing) {
        let space = match (self.format, self.last) {
            (_, None) => false,
            (Format::Pretty, Some(last)) => match (last, spacing) {
                (_, Spacing::Close | Spacing::Separator) => false,
                (Spacing::Open | Spacing::Prefix, _) => false,
                _ => true,
            },

            (Format::Compact, Some(_)) => match (self.line.chars().last(), text.chars().next()) {
                (Some(before), Some(after)) => glues(before, after),
                _ => false,
            },
        };

        if space {
            self.line.push(' ');
        }

        self.line.push_str(text);
        self.last = Some(spacing);
    }

    /// Pasa la línea en curso a la lista de líneas completas.
    fn flush(&mut self) {
        let line = std::mem::take(&mut self.line);
        if !line.is_empty() {
            let line = match self.format {
                Format::Pretty => INDENT.repeat(self.indent) + &line,
                Format::Compact => line,
            };

            self.lines.push(line);
        }

        self.last = None;
    }

    /// Separador entre argumentos o cláusulas de un encabezado.
    fn separator(&self, punctuation: &'static str) -> &'static str {
        match (self.format, punctuation) {
            (Format::Compact, _) => punctuation,
            (Format::Pretty, "") => " ",
            (Format::Pretty, ",") => ", ",
            (Format::Pretty, _) => "; ",
        }
    }
}

/// Traduce un token a su forma en C.
pub fn translate(token: &Token) -> Cow<'_, str> {
    match token {
        Token::Keyword(Keyword::Let) => Cow::Borrowed("int"),
        Token::Keyword(Keyword::Print) => Cow::Borrowed("printf"),
        Token::Keyword(Keyword::Read) => Cow::Borrowed("scanf"),
        Token::Keyword(Keyword::DoTimes) => Cow::Borrowed("for"),
        Token::And => Cow::Borrowed("&&"),
        Token::Or => Cow::Borrowed("||"),
        Token::Str(text) => Cow::Owned(format!("\"{}\"", text)),
        _ => token.lexeme(),
    }
}

/// Determina si dos caracteres adyacentes se leerían como un solo token.
fn glues(before: char, after: char) -> bool {
    let word = |c: char| c.is_ascii_alphanumeric() || c == '_';

    (word(before) && word(after))
        || matches!(
            (before, after),
            ('=' | '!' | '<' | '>' | '+' | '-' | '*' | '/' | '%' | '&' | '|' | '^', '=')
                | ('&', '&')
                | ('|', '|')
                | ('+', '+')
                | ('-', '-' | '>')
                | ('<', '<')
                | ('>', '>')
                | ('/', '/' | '*')
                | ('*', '/')
        )
}
