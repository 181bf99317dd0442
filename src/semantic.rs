//! Tabla de nombres declarados.
//!
//! El lenguaje no tiene alcances léxicos: todo nombre declarado con
//! `let` es visible desde ese punto hasta el final del programa, sin
//! importar los bloques en los que aparezca. Por tanto, la tabla es
//! un único conjunto plano y no una pila de alcances.

use thiserror::Error;

use std::collections::HashSet;

use crate::{lex::Identifier, source::Located};

pub type Semantic<T> = Result<T, Located<SemanticError>>;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SemanticError {
    #[error("Symbol `{0}` is undefined, declare it first with `let`")]
    Undefined(Identifier),

    #[error("Cannot assign to `{0}` before it is declared")]
    UndefinedTarget(Identifier),

    #[error("Redefinition of `{0}`, names may only be declared once")]
    Redefinition(Identifier),
}

/// Conjunto de nombres declarados, en orden de primera declaración.
#[derive(Default)]
pub struct SymbolTable {
    order: Vec<Identifier>,
    symbols: HashSet<Identifier>,
}

impl SymbolTable {
    /// Registra una declaración nueva.
    pub fn declare(&mut self, id: &Located<Identifier>) -> Semantic<()> {
        let name = id.as_ref();
        if !self.symbols.insert(name.clone()) {
            return Err(Located::at(
                SemanticError::Redefinition(name.clone()),
                id.location().clone(),
            ));
        }

        self.order.push(name.clone());
        Ok(())
    }

    /// Verifica que un nombre usado como valor haya sido declarado.
    pub fn lookup(&self, id: &Located<Identifier>) -> Semantic<()> {
        self.check(id, SemanticError::Undefined)
    }

    /// Verifica que el destino de una escritura haya sido declarado.
    pub fn lookup_target(&self, id: &Located<Identifier>) -> Semantic<()> {
        self.check(id, SemanticError::UndefinedTarget)
    }

    pub fn contains(&self, name: &Identifier) -> bool {
        self.symbols.contains(name)
    }

    /// Nombres declarados en orden de primera declaración.
    pub fn into_names(self) -> Vec<Identifier> {
        self.order
    }

    fn check<F>(&self, id: &Located<Identifier>, error: F) -> Semantic<()>
    where
        F: FnOnce(Identifier) -> SemanticError,
    {
        if self.contains(id.as_ref()) {
            Ok(())
        } else {
            Err(Located::at(error(id.as_ref().clone()), id.location().clone()))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::source;

    fn located(name: &str) -> Located<Identifier> {
        let (location, _) = source::consume("", "<test>");
        Located::at(Identifier::from(name), location)
    }

    #[test]
    fn keeps_first_declared_order() {
        let mut table = SymbolTable::default();
        for name in ["zeta", "alpha", "mid"] {
            table.declare(&located(name)).unwrap();
        }

        let names: Vec<String> = table.into_names().iter().map(ToString::to_string).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn rejects_redefinition() {
        let mut table = SymbolTable::default();
        table.declare(&located("x")).unwrap();

        let error = table.declare(&located("x")).unwrap_err();
        assert!(matches!(error.val(), SemanticError::Redefinition(id) if id.as_ref() == "x"));
        assert_eq!(table.into_names().len(), 1);
    }

    #[test]
    fn lookups() {
        let mut table = SymbolTable::default();
        table.declare(&located("x")).unwrap();

        assert!(table.lookup(&located("x")).is_ok());
        assert!(matches!(
            table.lookup(&located("y")).unwrap_err().val(),
            SemanticError::Undefined(_)
        ));
        assert!(matches!(
            table.lookup_target(&located("y")).unwrap_err().val(),
            SemanticError::UndefinedTarget(_)
        ));
    }
}
