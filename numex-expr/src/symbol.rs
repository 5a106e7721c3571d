use std::{fmt, sync::Arc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The context holding every built-in symbol.
pub const SYSTEM: &str = "System`";

/// The default context for user symbols.
pub const GLOBAL: &str = "Global`";

/// A context-qualified symbol, such as ``System`Sin`` or ``Global`x``.
///
/// Two symbols are equal when both their context and their short name are equal. Cloning is
/// cheap.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Symbol {
    context: Arc<str>,
    name: Arc<str>,
}

impl Symbol {
    /// Creates a symbol in the given context. The context should end with a backtick.
    pub fn new(context: &str, name: &str) -> Self {
        Self {
            context: context.into(),
            name: name.into(),
        }
    }

    /// Creates a symbol in the ``System` `` context.
    pub fn system(name: &str) -> Self {
        Self::new(SYSTEM, name)
    }

    /// Creates a symbol in the ``Global` `` context.
    pub fn global(name: &str) -> Self {
        Self::new(GLOBAL, name)
    }

    /// The context of the symbol, including the trailing backtick.
    pub fn context(&self) -> &str {
        &self.context
    }

    /// The short name of the symbol.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if the symbol lives in the ``System` `` context.
    pub fn is_system(&self) -> bool {
        &*self.context == SYSTEM
    }

    /// Returns true if this is the ``System` `` symbol with the given short name.
    pub fn is_system_named(&self, name: &str) -> bool {
        self.is_system() && &*self.name == name
    }
}

/// Symbols in ``System` `` and ``Global` `` print with their short name, the rest are printed
/// fully qualified.
impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_system() || &*self.context == GLOBAL {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}{}", self.context, self.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_structural() {
        assert_eq!(Symbol::system("Sin"), Symbol::new("System`", "Sin"));
        assert_ne!(Symbol::system("x"), Symbol::global("x"));
        assert!(Symbol::system("Plus").is_system_named("Plus"));
        assert!(!Symbol::global("Plus").is_system_named("Plus"));
    }

    #[test]
    fn display() {
        assert_eq!(Symbol::system("Sin").to_string(), "Sin");
        assert_eq!(Symbol::global("x").to_string(), "x");
        assert_eq!(Symbol::new("Private`", "y").to_string(), "Private`y");
    }
}
