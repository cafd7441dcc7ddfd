//! Definition identifiers and storage for the solver.
//!
//! Nominal types (classes, structs, interfaces, enums, declared
//! delegates) are identified by a solver-owned `DefId`. The definition
//! records everything inference needs about the nominal: declared
//! variance, the base-class and interface templates, and the delegate
//! invoke signature. Templates are types over the definition's own type
//! parameters and are instantiated by substitution when a constructed
//! form is queried.
//!
//! `DefId` is solver-owned rather than binder-owned so that types can be
//! created and tested without a binder in the loop.

use crate::interner::Atom;
use crate::solver::types::{FunctionShapeId, TypeId, VarianceKind};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Solver-owned definition identifier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct DefId(pub u32);

impl DefId {
    /// Sentinel value for invalid DefId.
    pub const INVALID: DefId = DefId(0);

    /// First valid DefId.
    pub const FIRST_VALID: u32 = 1;

    pub fn is_valid(self) -> bool {
        self.0 >= Self::FIRST_VALID
    }
}

/// Identifier for a method scope, used only as a type-parameter owner.
///
/// Distinct methods get distinct ids, so the type parameters of a
/// recursive or same-named method never alias the enclosing method's.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct MethodId(pub u32);

/// Kind of nominal definition.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DefKind {
    Class,
    Struct,
    Interface,
    Enum,
    Delegate,
}

impl DefKind {
    /// Kinds whose constructed forms are reference types.
    pub fn is_reference(self) -> bool {
        matches!(self, DefKind::Class | DefKind::Interface | DefKind::Delegate)
    }
}

/// A nominal type definition.
#[derive(Clone, Debug)]
pub struct Definition {
    pub name: Atom,
    pub kind: DefKind,
    /// The definition's own type parameters as interned `TypeParameter`
    /// type ids; empty for non-generic nominals. These double as the
    /// substitution keys for the templates below.
    pub type_params: Vec<TypeId>,
    /// Declared variance, index-aligned with `type_params`.
    pub variances: Vec<VarianceKind>,
    /// Base class template over the definition's own type parameters.
    /// `None` for interfaces and for the root.
    pub base: Option<TypeId>,
    /// Directly declared interface templates over the definition's own
    /// type parameters.
    pub interfaces: Vec<TypeId>,
    /// Invoke signature template for `DefKind::Delegate`.
    pub delegate_shape: Option<FunctionShapeId>,
    /// Shape-compatible with the ambient tuple of its arity: the type
    /// arguments of a constructed form are its element types.
    pub is_tuple_compatible: bool,
    /// Expression-tree wrapper; the single type argument is the
    /// underlying delegate type.
    pub is_expression_tree: bool,
}

impl Definition {
    pub fn arity(&self) -> usize {
        self.type_params.len()
    }

    pub fn variance_at(&self, index: usize) -> VarianceKind {
        self.variances
            .get(index)
            .copied()
            .unwrap_or(VarianceKind::Invariant)
    }
}

/// Storage for definitions.
///
/// Registration is two-step because a definition's type parameters name
/// their owner: `reserve` an id, intern the parameters against it, then
/// `define`.
pub struct DefinitionStore {
    defs: DashMap<DefId, Arc<Definition>>,
    next_def: AtomicU32,
    next_method: AtomicU32,
}

impl DefinitionStore {
    pub fn new() -> Self {
        DefinitionStore {
            defs: DashMap::new(),
            next_def: AtomicU32::new(DefId::FIRST_VALID),
            next_method: AtomicU32::new(1),
        }
    }

    /// Allocate a fresh `DefId` without a definition body yet.
    pub fn reserve(&self) -> DefId {
        DefId(self.next_def.fetch_add(1, Ordering::Relaxed))
    }

    /// Attach the definition body to a reserved id.
    pub fn define(&self, id: DefId, definition: Definition) {
        self.defs.insert(id, Arc::new(definition));
    }

    pub fn get(&self, id: DefId) -> Option<Arc<Definition>> {
        self.defs.get(&id).map(|entry| entry.value().clone())
    }

    /// Allocate a fresh method scope id.
    pub fn fresh_method(&self) -> MethodId {
        MethodId(self.next_method.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for DefinitionStore {
    fn default() -> Self {
        Self::new()
    }
}
