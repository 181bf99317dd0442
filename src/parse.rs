//! Análisis sintáctico.
//!
//! El parser es descendente recursivo con un único token de lookahead.
//! Los saltos de línea se descartan de manera transparente, ya que solo
//! `;` y los delimitadores de bloque aportan estructura. Durante el
//! reconocimiento se mantiene la tabla plana de nombres declarados, por
//! lo cual los errores semánticos se detectan en el mismo punto en el
//! que aparece el token ofensor. El primer error detiene el análisis.

use std::num::IntErrorKind;
use thiserror::Error;

use crate::{
    lex::{Identifier, Keyword, Lexer, Token},
    options::Trace,
    semantic::{SemanticError, SymbolTable},
    source::{InputStream, Located, Location},
};

/// Máximo literal entero representable.
const INT_MAX: i32 = i32::MAX;

#[derive(Debug)]
pub struct Program {
    /// Nombres declarados, en orden de primera declaración.
    pub declarations: Vec<Identifier>,
    pub statements: Vec<Statement>,
}

#[derive(Debug)]
pub enum Statement {
    Declaration {
        name: Located<Identifier>,
        initializer: Option<Located<Expr>>,
    },

    Assignment {
        target: Located<Identifier>,
        value: Located<Expr>,
    },

    IfElse {
        condition: Condition,
        body: Vec<Statement>,
        otherwise: Option<Vec<Statement>>,
    },

    While {
        condition: Condition,
        body: Vec<Statement>,
    },

    DoTimes {
        bound: Located<Bound>,
        body: Vec<Statement>,
    },

    Print(Vec<Located<PrintArg>>),

    Read(Located<Identifier>),
}

#[derive(Debug)]
pub enum Expr {
    Number(i32),
    Variable(Identifier),
    Group(Box<Located<Expr>>),

    /// `factor (op factor)*`, evaluado de izquierda a derecha.
    Chain(Box<Located<Expr>>, Vec<(BinOp, Located<Expr>)>),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

/// Expresión booleana.
///
/// Una secuencia plana de términos unidos por comparaciones. Solo los
/// paréntesis anidan condiciones.
#[derive(Debug)]
pub struct Condition {
    pub head: Term,
    pub tail: Vec<(CmpOp, Term)>,
}

/// Operando de una condición con negación opcional.
#[derive(Debug)]
pub struct Term {
    pub negated: bool,
    pub operand: Operand,
}

#[derive(Debug)]
pub enum Operand {
    Number(i32),
    Variable(Identifier),
    Group(Box<Condition>),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CmpOp {
    Equal,
    NotEqual,
    Less,
    Greater,
    LessOrEqual,
    GreaterOrEqual,
    And,
    Or,
}

#[derive(Debug)]
pub enum PrintArg {
    Text(String),
    Variable(Identifier),
}

/// Cantidad de iteraciones de un `dotimes`.
#[derive(Debug)]
pub enum Bound {
    Number(i32),
    Variable(Identifier),
}

impl BinOp {
    fn from_token(token: &Token) -> Option<Self> {
        let op = match token {
            Token::Plus => BinOp::Add,
            Token::Minus => BinOp::Sub,
            Token::Times => BinOp::Mul,
            Token::Slash => BinOp::Div,
            Token::Percent => BinOp::Mod,
            _ => return None,
        };

        Some(op)
    }

    /// Token que representa a este operador.
    pub fn token(self) -> Token {
        match self {
            BinOp::Add => Token::Plus,
            BinOp::Sub => Token::Minus,
            BinOp::Mul => Token::Times,
            BinOp::Div => Token::Slash,
            BinOp::Mod => Token::Percent,
        }
    }
}

impl CmpOp {
    fn from_token(token: &Token) -> Option<Self> {
        let op = match token {
            Token::Equal => CmpOp::Equal,
            Token::NotEqual => CmpOp::NotEqual,
            Token::Less => CmpOp::Less,
            Token::Greater => CmpOp::Greater,
            Token::LessOrEqual => CmpOp::LessOrEqual,
            Token::GreaterOrEqual => CmpOp::GreaterOrEqual,
            Token::And => CmpOp::And,
            Token::Or => CmpOp::Or,
            _ => return None,
        };

        Some(op)
    }

    /// Token que representa a este operador.
    pub fn token(self) -> Token {
        match self {
            CmpOp::Equal => Token::Equal,
            CmpOp::NotEqual => Token::NotEqual,
            CmpOp::Less => Token::Less,
            CmpOp::Greater => Token::Greater,
            CmpOp::LessOrEqual => Token::LessOrEqual,
            CmpOp::GreaterOrEqual => Token::GreaterOrEqual,
            CmpOp::And => Token::And,
            CmpOp::Or => Token::Or,
        }
    }
}

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ParserError {
    #[error("Expected {0}, found {1} instead")]
    UnexpectedToken(Token, Token),

    #[error("Expected a statement (`let`, `if`, `while`, `dotimes`, `print`, `read` or an assignment), found {0} instead")]
    ExpectedStatement(Token),

    #[error("Expected identifier, found {0} instead")]
    ExpectedId(Token),

    #[error("Expected a number, an identifier or `(`, found {0} instead")]
    ExpectedExpr(Token),

    #[error("Expected an identifier or a number in boolean expression, found {0} instead")]
    ExpectedOperand(Token),

    #[error("Expected a string literal or an identifier for `print`, found {0} instead")]
    ExpectedPrintArg(Token),

    #[error("Expected an identifier or a number as `dotimes` bound, found {0} instead")]
    ExpectedBound(Token),

    #[error("Unrecognized input `{0}`")]
    BadToken(String),

    #[error("Invalid numeric literal `{0}`")]
    BadLiteral(String),

    #[error("Integer literal `{0}` overflows, valid range is [0, {}]", INT_MAX)]
    LiteralOverflow(String),

    #[error(transparent)]
    Semantic(#[from] SemanticError),
}

impl From<Located<SemanticError>> for Located<ParserError> {
    fn from(error: Located<SemanticError>) -> Self {
        error.map(ParserError::from)
    }
}

type Parse<T> = Result<T, Located<ParserError>>;

/// Reconoce un programa completo.
pub fn parse<S: InputStream>(lexer: Lexer<S>, trace: Trace) -> Parse<Program> {
    let mut parser = Parser {
        current: Located::at(Token::Eof, lexer.end().clone()),
        lexer,
        symbols: SymbolTable::default(),
        trace: trace.contains(Trace::PRODUCTIONS),
    };

    parser.advance();
    parser.program()
}

struct Parser<S: InputStream> {
    lexer: Lexer<S>,
    current: Located<Token>,
    symbols: SymbolTable,
    trace: bool,
}

impl<S: InputStream> Parser<S> {
    fn program(&mut self) -> Parse<Program> {
        self.enter("<program>");

        let mut statements = Vec::new();
        while *self.current.val() != Token::Eof {
            statements.push(self.statement()?);
        }

        let declarations = std::mem::take(&mut self.symbols).into_names();
        Ok(Program {
            declarations,
            statements,
        })
    }

    fn statement(&mut self) -> Parse<Statement> {
        self.enter("<statement>");

        match self.current.val() {
            Token::Keyword(Keyword::Let) => self.declaration(),
            Token::Keyword(Keyword::If) => self.if_else(),
            Token::Keyword(Keyword::While) => self.while_loop(),
            Token::Keyword(Keyword::DoTimes) => self.dotimes_loop(),
            Token::Keyword(Keyword::Print) => self.print(),
            Token::Keyword(Keyword::Read) => self.read(),
            Token::Id(_) => self.assignment(),
            _ => self.unexpected(ParserError::ExpectedStatement),
        }
    }

    fn declaration(&mut self) -> Parse<Statement> {
        self.enter("<declaration>");
        self.keyword(Keyword::Let)?;

        // El nombre se registra antes del inicializador, por lo que
        // `let x = x + 1;` es válido
        let name = self.id()?;
        self.symbols.declare(&name)?;

        let initializer = if self.accept(&Token::Assign) {
            Some(self.expr()?)
        } else {
            None
        };

        self.expect(Token::Semicolon)?;
        Ok(Statement::Declaration { name, initializer })
    }

    fn assignment(&mut self) -> Parse<Statement> {
        self.enter("<assignment>");

        let target = self.id()?;
        self.symbols.lookup_target(&target)?;

        self.expect(Token::Assign)?;
        let value = self.expr()?;
        self.expect(Token::Semicolon)?;

        Ok(Statement::Assignment { target, value })
    }

    fn if_else(&mut self) -> Parse<Statement> {
        self.enter("<if_else>");
        self.keyword(Keyword::If)?;

        let condition = self.parenthesized_condition()?;
        let body = self.block()?;

        let otherwise = if self.accept(&Token::Keyword(Keyword::Else)) {
            Some(self.block()?)
        } else {
            None
        };

        Ok(Statement::IfElse {
            condition,
            body,
            otherwise,
        })
    }

    fn while_loop(&mut self) -> Parse<Statement> {
        self.enter("<while_loop>");
        self.keyword(Keyword::While)?;

        let condition = self.parenthesized_condition()?;
        let body = self.block()?;

        Ok(Statement::While { condition, body })
    }

    fn dotimes_loop(&mut self) -> Parse<Statement> {
        self.enter("<dotimes_loop>");
        self.keyword(Keyword::DoTimes)?;
        self.expect(Token::OpenParen)?;

        let bound = match self.current.val() {
            Token::Number(_) => self.literal()?.map(Bound::Number),
            Token::Id(_) => {
                let id = self.id()?;
                self.symbols.lookup(&id)?;
                id.map(Bound::Variable)
            }

            _ => return self.unexpected(ParserError::ExpectedBound),
        };

        self.expect(Token::CloseParen)?;
        let body = self.block()?;

        Ok(Statement::DoTimes { bound, body })
    }

    fn print(&mut self) -> Parse<Statement> {
        self.enter("<print_stmt>");
        self.keyword(Keyword::Print)?;
        self.expect(Token::OpenParen)?;

        let mut args = vec![self.print_arg()?];
        while self.accept(&Token::Comma) {
            args.push(self.print_arg()?);
        }

        self.expect(Token::CloseParen)?;
        self.expect(Token::Semicolon)?;

        Ok(Statement::Print(args))
    }

    fn print_arg(&mut self) -> Parse<Located<PrintArg>> {
        self.enter("<print_arg>");

        match self.current.val() {
            Token::Str(text) => {
                let arg = PrintArg::Text(text.clone());
                let location = self.advance().location().clone();
                Ok(Located::at(arg, location))
            }

            Token::Id(_) => {
                let id = self.id()?;
                self.symbols.lookup(&id)?;
                Ok(id.map(PrintArg::Variable))
            }

            _ => self.unexpected(ParserError::ExpectedPrintArg),
        }
    }

    fn read(&mut self) -> Parse<Statement> {
        self.enter("<read_stmt>");
        self.keyword(Keyword::Read)?;
        self.expect(Token::OpenParen)?;

        let target = self.id()?;
        self.symbols.lookup_target(&target)?;

        self.expect(Token::CloseParen)?;
        self.expect(Token::Semicolon)?;

        Ok(Statement::Read(target))
    }

    fn block(&mut self) -> Parse<Vec<Statement>> {
        self.enter("<block>");
        self.expect(Token::OpenCurly)?;

        let mut statements = Vec::new();
        loop {
            match self.current.val() {
                Token::CloseCurly => break,
                Token::Eof => return self.unexpected(|found| {
                    ParserError::UnexpectedToken(Token::CloseCurly, found)
                }),

                _ => statements.push(self.statement()?),
            }
        }

        self.advance();
        Ok(statements)
    }

    fn expr(&mut self) -> Parse<Located<Expr>> {
        self.enter("<expr>");

        let head = self.factor()?;

        let mut tail = Vec::new();
        while let Some(op) = BinOp::from_token(self.current.val()) {
            self.advance();
            tail.push((op, self.factor()?));
        }

        let location = match tail.last() {
            None => return Ok(head),
            Some((_, last)) => Location::span(head.location().clone(), last.location()),
        };

        Ok(Located::at(Expr::Chain(Box::new(head), tail), location))
    }

    fn factor(&mut self) -> Parse<Located<Expr>> {
        self.enter("<factor>");

        match self.current.val() {
            Token::Number(_) => Ok(self.literal()?.map(Expr::Number)),
            Token::Id(_) => {
                let id = self.id()?;
                self.symbols.lookup(&id)?;
                Ok(id.map(Expr::Variable))
            }

            Token::OpenParen => {
                let start = self.advance().location().clone();
                let inner = self.expr()?;
                let end = self.expect(Token::CloseParen)?;

                let location = Location::span(start, end.location());
                Ok(Located::at(Expr::Group(Box::new(inner)), location))
            }

            _ => self.unexpected(ParserError::ExpectedExpr),
        }
    }

    fn parenthesized_condition(&mut self) -> Parse<Condition> {
        self.expect(Token::OpenParen)?;
        let condition = self.condition()?;
        self.expect(Token::CloseParen)?;

        Ok(condition)
    }

    fn condition(&mut self) -> Parse<Condition> {
        self.enter("<bool_expr>");

        let (head, mut grouped) = self.bool_term()?;

        // Tras un grupo, el lado derecho es otra condición completa; tras
        // un operando simple, solo otro operando simple
        let mut tail = Vec::new();
        while let Some(op) = self.comparison_operator() {
            if !grouped {
                let operand = self.bool_operand()?;
                let negated = false;
                tail.push((op, Term { negated, operand }));
                break;
            }

            let (term, next_grouped) = self.bool_term()?;
            tail.push((op, term));
            grouped = next_grouped;
        }

        Ok(Condition { head, tail })
    }

    /// Término con negación opcional; indica si fue un grupo.
    fn bool_term(&mut self) -> Parse<(Term, bool)> {
        let negated = self.accept(&Token::Not);
        if self.accept(&Token::OpenParen) {
            let inner = self.condition()?;
            self.expect(Token::CloseParen)?;

            let operand = Operand::Group(Box::new(inner));
            Ok((Term { negated, operand }, true))
        } else {
            let operand = self.bool_operand()?;
            Ok((Term { negated, operand }, false))
        }
    }

    fn bool_operand(&mut self) -> Parse<Operand> {
        self.enter("<bool_operand>");

        match self.current.val() {
            Token::Number(_) => Ok(Operand::Number(self.literal()?.into_inner())),
            Token::Id(_) => {
                let id = self.id()?;
                self.symbols.lookup(&id)?;
                Ok(Operand::Variable(id.into_inner()))
            }

            _ => self.unexpected(ParserError::ExpectedOperand),
        }
    }

    fn comparison_operator(&mut self) -> Option<CmpOp> {
        let op = CmpOp::from_token(self.current.val())?;
        self.advance();

        Some(op)
    }

    /// Valida un literal numérico contra el rango de enteros del lenguaje.
    fn literal(&mut self) -> Parse<Located<i32>> {
        let text = match self.current.val() {
            Token::Number(text) => text.clone(),
            _ => return self.unexpected(ParserError::ExpectedExpr),
        };

        let value = match text.parse::<i32>() {
            Ok(value) => value,
            Err(error) => {
                let error = match error.kind() {
                    IntErrorKind::PosOverflow => ParserError::LiteralOverflow(text),
                    _ => ParserError::BadLiteral(text),
                };

                return Err(Located::at(error, self.current.location().clone()));
            }
        };

        let location = self.advance().location().clone();
        Ok(Located::at(value, location))
    }

    fn id(&mut self) -> Parse<Located<Identifier>> {
        let id = match self.current.val() {
            Token::Id(id) => id.clone(),
            _ => return self.unexpected(ParserError::ExpectedId),
        };

        let location = self.advance().location().clone();
        Ok(Located::at(id, location))
    }

    fn keyword(&mut self, keyword: Keyword) -> Parse<()> {
        self.expect(Token::Keyword(keyword)).map(drop)
    }

    /// Consume el token actual si es el esperado, o falla.
    fn expect(&mut self, token: Token) -> Parse<Located<Token>> {
        if *self.current.val() == token {
            Ok(self.advance())
        } else {
            self.unexpected(|found| ParserError::UnexpectedToken(token, found))
        }
    }

    /// Consume el token actual solo si es el esperado.
    fn accept(&mut self, token: &Token) -> bool {
        let matches = self.current.val() == token;
        if matches {
            self.advance();
        }

        matches
    }

    /// Avanza al siguiente token que no sea un salto de línea y
    /// retorna el token anterior.
    fn advance(&mut self) -> Located<Token> {
        let mut next = self.lexer.next_token();
        while let Token::Newline = next.val() {
            next = self.lexer.next_token();
        }

        std::mem::replace(&mut self.current, next)
    }

    /// Rechaza el token actual.
    ///
    /// Un token desconocido siempre se reporta como tal, sin importar
    /// lo que esperaba la producción.
    fn unexpected<T, F>(&self, error: F) -> Parse<T>
    where
        F: FnOnce(Token) -> ParserError,
    {
        let (location, found) = self.current.clone().split();
        let error = match found {
            Token::Unknown(text) => ParserError::BadToken(text),
            found => error(found),
        };

        Err(Located::at(error, location))
    }

    fn enter(&self, production: &str) {
        if self.trace {
            eprintln!("[parse] {} at {}", production, self.current.location());
        }
    }
}
