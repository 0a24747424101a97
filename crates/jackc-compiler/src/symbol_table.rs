//! Two-level symbol table for Jack identifiers
//!
//! One class scope (static and field variables, living for the whole
//! compilation unit) and one subroutine scope (arguments and locals, reset
//! at every subroutine). Indices are assigned densely per (scope, kind) in
//! declaration order, which is exactly the VM segment index of the
//! variable. Lookups try the subroutine scope first, so locals and
//! arguments shadow fields and statics of the same name.

use std::collections::HashMap;

/// Storage kind of a declared identifier. Determines the VM segment and
/// which scope the entry lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Static,
    Field,
    Arg,
    Var,
}

impl Kind {
    fn is_class_scope(&self) -> bool {
        matches!(self, Kind::Static | Kind::Field)
    }
}

/// One declared identifier: its type name, storage kind and segment index.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    ty: String,
    kind: Kind,
    index: u16,
}

/// Symbol table for one compilation unit.
///
/// Never fails: lookups report absence with `None` and callers decide what
/// that means (for call resolution it distinguishes an instance call from a
/// class call).
#[derive(Debug, Default)]
pub struct SymbolTable {
    class_scope: HashMap<String, Entry>,
    subroutine_scope: HashMap<String, Entry>,
    counts: HashMap<Kind, u16>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the subroutine scope for a new subroutine.
    ///
    /// Clears all argument and local entries and their counters; class
    /// scope entries persist. The engine re-defines the implicit receiver
    /// at argument slot 0 after this, when compiling a method.
    pub fn start_subroutine(&mut self) {
        self.subroutine_scope.clear();
        self.counts.insert(Kind::Arg, 0);
        self.counts.insert(Kind::Var, 0);
    }

    /// Define `name` with the next free index for `kind`.
    ///
    /// Redefining a name in the same scope overwrites the old entry but
    /// still consumes an index.
    pub fn define(&mut self, name: &str, ty: &str, kind: Kind) {
        let count = self.counts.entry(kind).or_insert(0);
        let entry = Entry {
            ty: ty.to_string(),
            kind,
            index: *count,
        };
        *count += 1;
        if kind.is_class_scope() {
            self.class_scope.insert(name.to_string(), entry);
        } else {
            self.subroutine_scope.insert(name.to_string(), entry);
        }
    }

    /// Number of identifiers defined so far for `kind`.
    ///
    /// Sizes the local frame (`Kind::Var`) and the constructor's heap
    /// allocation (`Kind::Field`).
    pub fn var_count(&self, kind: Kind) -> u16 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    fn resolve(&self, name: &str) -> Option<&Entry> {
        self.subroutine_scope
            .get(name)
            .or_else(|| self.class_scope.get(name))
    }

    /// Storage kind of `name`, subroutine scope shadowing class scope.
    pub fn kind_of(&self, name: &str) -> Option<Kind> {
        self.resolve(name).map(|e| e.kind)
    }

    /// Declared type of `name`, subroutine scope shadowing class scope.
    pub fn type_of(&self, name: &str) -> Option<&str> {
        self.resolve(name).map(|e| e.ty.as_str())
    }

    /// Segment index of `name`, subroutine scope shadowing class scope.
    pub fn index_of(&self, name: &str) -> Option<u16> {
        self.resolve(name).map(|e| e.index)
    }
}
