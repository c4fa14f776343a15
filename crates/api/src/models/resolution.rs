//! The uniform result of every name-resolution query.

/// What kind of declaration an unsolved lookup expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Class,
    Interface,
    Enum,
    Method,
    Field,
    Parameter,
    TypeParameter,
}

/// Either a resolved declaration or a typed "not found"; never a null value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolReference<T> {
    Solved(T),
    Unsolved(DeclarationKind),
}

impl<T> SymbolReference<T> {
    pub fn solved(value: T) -> Self {
        SymbolReference::Solved(value)
    }

    pub fn unsolved(expected: DeclarationKind) -> Self {
        SymbolReference::Unsolved(expected)
    }

    pub fn is_solved(&self) -> bool {
        matches!(self, SymbolReference::Solved(_))
    }

    pub fn into_solved(self) -> Option<T> {
        match self {
            SymbolReference::Solved(value) => Some(value),
            SymbolReference::Unsolved(_) => None,
        }
    }

    pub fn as_solved(&self) -> Option<&T> {
        match self {
            SymbolReference::Solved(value) => Some(value),
            SymbolReference::Unsolved(_) => None,
        }
    }
}
