//! Traductor del lenguaje "bare bones" a C.
//!
//! # Front end
//! Cada programa deriva de un único archivo de código fuente, leído por
//! completo a memoria. Este texto se somete primero a análisis léxico en
//! [`lex`], de lo cual se obtiene un flujo de tokens. El flujo se consume
//! token por token mediante análisis sintáctico en [`parse`], el cual
//! valida también el uso de nombres contra la tabla plana de
//! declaraciones de [`semantic`]. Cualquier error detiene la traducción.
//!
//! # Back end
//! El AST resultante se recorre en [`codegen`] en el mismo orden en que
//! fue reconocido, dirigiendo al emisor de líneas de [`emit`]. El texto
//! final se materializa una única vez al concluir, de modo que una
//! traducción fallida nunca produce salida parcial.

pub mod codegen;
pub mod emit;
pub mod error;
pub mod lex;
pub mod options;
pub mod parse;
pub mod semantic;
pub mod source;

use crate::{
    error::Diagnostics,
    lex::Lexer,
    options::{Options, Trace},
    parse::ParserError,
};

/// Traduce un programa completo a texto en C.
///
/// `name` identifica al origen en los diagnósticos.
pub fn translate(name: &str, text: &str, options: &Options) -> Result<String, Diagnostics> {
    let (eof, stream) = source::consume(text, name);
    let lexer = Lexer::new(eof, stream).trace(options.trace.contains(Trace::TOKENS));

    let program = parse::parse(lexer, options.trace).map_err(|error| {
        let kind = match error.val() {
            ParserError::Semantic(_) => "Semantic error",
            _ => "Syntax error",
        };

        Diagnostics::from(error).kind(kind)
    })?;

    Ok(codegen::generate(&program, options.format))
}
