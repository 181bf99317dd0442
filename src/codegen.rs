//! Generación de código.
//!
//! Recorre el AST en el mismo orden en el que fue reconocido y dirige al
//! [`Emitter`] con una llamada por cada token o frontera estructural. El
//! resultado es el mismo texto que produciría una traducción dirigida
//! por sintaxis de una sola pasada.

use crate::{
    emit::Emitter,
    lex::{Identifier, Keyword, Token},
    options::Format,
    parse::{Bound, Condition, Expr, Operand, PrintArg, Program, Statement, Term},
};

/// Prefijo de los contadores de `dotimes`.
///
/// Los identificadores del lenguaje no admiten `_`, por lo cual ningún
/// nombre declarado por el usuario puede colisionar con un contador.
const COUNTER_PREFIX: &str = "_dotimes";

/// Sufijo de la copia del límite de un `dotimes` sobre una variable.
const LIMIT_SUFFIX: &str = "_end";

/// Genera el programa en C completo.
pub fn generate(program: &Program, format: Format) -> String {
    let mut generator = Generator {
        out: Emitter::new(format),
        counters: 0,
    };

    generator.statements(&program.statements);
    generator.out.finish(&program.declarations)
}

struct Generator {
    out: Emitter,
    counters: u32,
}

impl Generator {
    fn statements(&mut self, statements: &[Statement]) {
        for statement in statements {
            self.statement(statement);
        }
    }

    fn statement(&mut self, statement: &Statement) {
        match statement {
            // La declaración en sí se eleva; solo el valor inicial
            // permanece en su posición original
            Statement::Declaration { initializer: None, .. } => (),
            Statement::Declaration {
                name,
                initializer: Some(value),
            } => self.assignment(name.val(), value.val()),

            Statement::Assignment { target, value } => {
                self.assignment(target.val(), value.val())
            }

            Statement::IfElse {
                condition,
                body,
                otherwise,
            } => {
                self.out.write_token(&Token::Keyword(Keyword::If));
                self.parenthesized(condition);
                self.block(body);

                if let Some(otherwise) = otherwise {
                    self.out.write_token(&Token::Keyword(Keyword::Else));
                    self.block(otherwise);
                }
            }

            Statement::While { condition, body } => {
                self.out.write_token(&Token::Keyword(Keyword::While));
                self.parenthesized(condition);
                self.block(body);
            }

            Statement::DoTimes { bound, body } => {
                let counter = format!("{}{}", COUNTER_PREFIX, self.counters);
                self.counters += 1;

                match bound.val() {
                    Bound::Number(value) => {
                        self.out.write_loop_header(&counter, &value.to_string(), None)
                    }

                    // El cuerpo puede modificar la variable, así que el
                    // límite se fija al entrar al ciclo
                    Bound::Variable(id) => {
                        let limit = format!("{}{}", counter, LIMIT_SUFFIX);
                        self.out.write_loop_header(&counter, id.as_ref(), Some(&limit))
                    }
                }

                self.block(body);
            }

            Statement::Print(args) => {
                let mut format = String::new();
                let mut variables = Vec::new();

                for arg in args {
                    match arg.val() {
                        // `%` es especial para printf()
                        PrintArg::Text(text) => format.push_str(&text.replace('%', "%%")),
                        PrintArg::Variable(id) => {
                            format.push_str("%d");
                            variables.push(id.clone());
                        }
                    }
                }

                self.out.write_print(&format, &variables);
                self.out.end_statement();
            }

            Statement::Read(target) => {
                self.out.write_read(target.val());
                self.out.end_statement();
            }
        }
    }

    fn assignment(&mut self, target: &Identifier, value: &Expr) {
        self.out.write_token(&Token::Id(target.clone()));
        self.out.write_token(&Token::Assign);
        self.expr(value);
        self.out.end_statement();
    }

    fn block(&mut self, body: &[Statement]) {
        self.out.begin_block();
        self.statements(body);
        self.out.end_block();
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Number(value) => self.out.write_token(&Token::Number(value.to_string())),
            Expr::Variable(id) => self.out.write_token(&Token::Id(id.clone())),
            Expr::Group(inner) => {
                self.out.write_token(&Token::OpenParen);
                self.expr(inner.val());
                self.out.write_token(&Token::CloseParen);
            }

            Expr::Chain(head, tail) => {
                self.expr(head.val());
                for (op, operand) in tail {
                    self.out.write_token(&op.token());
                    self.expr(operand.val());
                }
            }
        }
    }

    fn parenthesized(&mut self, condition: &Condition) {
        self.out.write_token(&Token::OpenParen);
        self.condition(condition);
        self.out.write_token(&Token::CloseParen);
    }

    fn condition(&mut self, condition: &Condition) {
        self.term(&condition.head);
        for (op, term) in &condition.tail {
            self.out.write_token(&op.token());
            self.term(term);
        }
    }

    fn term(&mut self, term: &Term) {
        if term.negated {
            self.out.write_token(&Token::Not);
        }

        match &term.operand {
            Operand::Number(value) => self.out.write_token(&Token::Number(value.to_string())),
            Operand::Variable(id) => self.out.write_token(&Token::Id(id.clone())),
            Operand::Group(inner) => self.parenthesized(inner),
        }
    }
}
