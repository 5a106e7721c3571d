use numex_expr::Symbol;
use std::collections::HashMap;

/// A symbol bound by a scoping construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Local {
    /// The slot of the frame holding the value of the local.
    pub slot: usize,

    /// Whether the local is a constant introduced by `With`, which cannot be assigned to.
    pub constant: bool,
}

/// The locals introduced by a single scoping construct.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    locals: HashMap<Symbol, Local>,
}

impl Scope {
    /// Inserts a local into this scope.
    pub fn insert(&mut self, symbol: Symbol, local: Local) {
        self.locals.insert(symbol, local);
    }

    /// Resolves the local with the given symbol if it exists in this scope.
    pub fn resolve(&self, symbol: &Symbol) -> Option<Local> {
        self.locals.get(symbol).copied()
    }
}

/// The stack of scopes that are currently active.
///
/// `Module`, `Block`, `With` and `Do` push a scope when their body is entered and pop it when the
/// body has been compiled. Symbols are resolved from the innermost scope outwards, so an inner
/// local shadows an outer one with the same name.
#[derive(Debug, Clone, Default)]
pub struct ScopeStack {
    active: Vec<Scope>,
}

impl ScopeStack {
    /// Returns true if no scope is active.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Makes a new, empty scope the innermost scope.
    pub fn enter(&mut self) {
        self.active.push(Scope::default());
    }

    /// Pops the innermost scope.
    pub fn exit(&mut self) -> Option<Scope> {
        self.active.pop()
    }

    /// Inserts a local into the innermost scope. Does nothing if no scope is active.
    pub fn insert(&mut self, symbol: Symbol, local: Local) {
        if let Some(scope) = self.active.last_mut() {
            scope.insert(symbol, local);
        }
    }

    /// Resolves a symbol, searching from the innermost scope outwards.
    pub fn resolve(&self, symbol: &Symbol) -> Option<Local> {
        self.active.iter().rev().find_map(|scope| scope.resolve(symbol))
    }
}
