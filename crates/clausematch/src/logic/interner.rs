//! Symbol interning
//!
//! Symbol names live in one arena per namespace; terms carry `u32` ids only.
//! Ids are insertion positions, so resolution is a plain index lookup.

use indexmap::IndexSet;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

macro_rules! symbol_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) u32);

        impl $name {
            /// Raw id value
            pub fn as_u32(self) -> u32 {
                self.0
            }

            /// Build an id from a raw value (tests and deserialization)
            pub fn from_raw(id: u32) -> Self {
                $name(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                self.0.serialize(serializer)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                u32::deserialize(deserializer).map($name)
            }
        }
    };
}

symbol_id!(
    /// ID for an interned variable name
    VariableId,
    "V"
);
symbol_id!(
    /// ID for an interned constant name
    ConstantId,
    "C"
);
symbol_id!(
    /// ID for an interned function symbol name
    FunctionId,
    "F"
);
symbol_id!(
    /// ID for an interned predicate symbol name
    PredicateId,
    "P"
);

#[derive(Debug, Clone, Default)]
struct StringArena {
    strings: IndexSet<String>,
}

impl StringArena {
    fn intern(&mut self, name: &str) -> u32 {
        if let Some(id) = self.strings.get_index_of(name) {
            return id as u32;
        }
        let (id, _) = self.strings.insert_full(name.to_string());
        id as u32
    }

    fn resolve(&self, id: u32) -> &str {
        self.strings
            .get_index(id as usize)
            .map(String::as_str)
            .unwrap_or("?")
    }

    fn get(&self, name: &str) -> Option<u32> {
        self.strings.get_index_of(name).map(|id| id as u32)
    }

    fn len(&self) -> usize {
        self.strings.len()
    }
}

/// Symbol interner for first-order logic
///
/// Passed through problem context rather than held in global state.
#[derive(Debug, Clone, Default)]
pub struct Interner {
    variables: StringArena,
    constants: StringArena,
    functions: StringArena,
    predicates: StringArena,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern_variable(&mut self, name: &str) -> VariableId {
        VariableId(self.variables.intern(name))
    }

    pub fn resolve_variable(&self, id: VariableId) -> &str {
        self.variables.resolve(id.0)
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn intern_constant(&mut self, name: &str) -> ConstantId {
        ConstantId(self.constants.intern(name))
    }

    pub fn resolve_constant(&self, id: ConstantId) -> &str {
        self.constants.resolve(id.0)
    }

    pub fn intern_function(&mut self, name: &str) -> FunctionId {
        FunctionId(self.functions.intern(name))
    }

    pub fn resolve_function(&self, id: FunctionId) -> &str {
        self.functions.resolve(id.0)
    }

    pub fn intern_predicate(&mut self, name: &str) -> PredicateId {
        PredicateId(self.predicates.intern(name))
    }

    pub fn resolve_predicate(&self, id: PredicateId) -> &str {
        self.predicates.resolve(id.0)
    }

    /// Get the ID for an already-interned predicate (None if not found)
    pub fn get_predicate(&self, name: &str) -> Option<PredicateId> {
        self.predicates.get(name).map(PredicateId)
    }

    /// The equality predicate `=`, if it has been interned
    pub fn equality(&self) -> Option<PredicateId> {
        self.get_predicate("=")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interning_is_idempotent() {
        let mut interner = Interner::new();
        let x1 = interner.intern_variable("X");
        let x2 = interner.intern_variable("X");
        let y = interner.intern_variable("Y");

        assert_eq!(x1, x2);
        assert_ne!(x1, y);
        assert!(x1 < y);
        assert_eq!(interner.resolve_variable(y), "Y");
        assert_eq!(interner.variable_count(), 2);
    }

    #[test]
    fn test_separate_namespaces() {
        let mut interner = Interner::new();
        let c = interner.intern_constant("x");
        let f = interner.intern_function("x");
        let p = interner.intern_predicate("x");

        assert_eq!(c.as_u32(), 0);
        assert_eq!(f.as_u32(), 0);
        assert_eq!(interner.resolve_constant(c), "x");
        assert_eq!(interner.resolve_function(f), "x");
        assert_eq!(interner.resolve_predicate(p), "x");
    }

    #[test]
    fn test_ids_serialize_as_bare_integers() {
        let mut interner = Interner::new();
        interner.intern_predicate("p");
        let q = interner.intern_predicate("q");

        let json = serde_json::to_string(&q).unwrap();
        assert_eq!(json, "1");
        let back: PredicateId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, q);
    }

    #[test]
    fn test_equality_lookup() {
        let mut interner = Interner::new();
        assert!(interner.equality().is_none());
        let eq = interner.intern_predicate("=");
        assert_eq!(interner.equality(), Some(eq));
    }
}
