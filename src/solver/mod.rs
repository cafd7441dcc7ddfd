//! The type solver: type representation, interning, predicates, and the
//! method type inference engine.
//!
//! The solver is consumed by the binder and overload resolution through a
//! narrow surface: build types against a [`TypeInterner`], then run
//! [`MethodTypeInferrer::infer`] over a call site. Collaborators the
//! engine itself cannot implement (the implicit-conversion classifier,
//! lambda return analysis, method-group resolution) are reached through
//! traits so upstream layers can plug their real implementations in.

pub mod conversions;
pub mod def;
pub mod diagnostics;
pub mod expr;
pub mod facts;
pub mod format;
pub mod infer;
pub mod instantiate;
pub mod intern;
pub mod merge;
pub mod types;

#[cfg(test)]
pub mod testing;

pub use conversions::{ConversionOracle, StandardConversions};
pub use def::{DefId, DefKind, Definition, DefinitionStore, MethodId};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use expr::{
    Argument, LambdaId, LambdaReturnInference, MethodGroupId, MethodGroupResolver, UnboundLambda,
};
pub use infer::{MethodTypeInferenceResult, MethodTypeInferrer};
pub use instantiate::TypeSubstitution;
pub use intern::{TypeInterner, WellKnownDefs};
pub use types::*;

use crate::interner::Atom;
use std::sync::Arc;

/// Storage interface for interned types.
///
/// The solver's algorithms are written against this trait rather than
/// the concrete [`TypeInterner`] so alternate backing stores (e.g. an
/// incremental database) can host the same type graph.
pub trait TypeDatabase: Send + Sync {
    fn lookup(&self, id: TypeId) -> Option<TypeKey>;
    fn intern(&self, key: TypeKey) -> TypeId;

    fn type_list(&self, id: TypeListId) -> Arc<[TypeId]>;
    fn intern_type_list(&self, items: Vec<TypeId>) -> TypeListId;

    fn tuple_list(&self, id: TupleListId) -> Arc<[TupleElement]>;
    fn intern_tuple_list(&self, items: Vec<TupleElement>) -> TupleListId;

    fn function_shape(&self, id: FunctionShapeId) -> Option<Arc<FunctionShape>>;
    fn intern_function_shape(&self, shape: FunctionShape) -> FunctionShapeId;

    fn application(&self, id: AppId) -> Option<Arc<TypeApplication>>;
    fn intern_application(&self, app: TypeApplication) -> AppId;

    fn definition(&self, id: DefId) -> Option<Arc<Definition>>;

    /// The registered rank-1 array-interface definitions, in canonical
    /// order. Empty when the host registered none.
    fn array_interface_defs(&self) -> Vec<DefId>;

    fn intern_name(&self, text: &str) -> Atom;
    fn resolve_name(&self, atom: Atom) -> Arc<str>;

    // Convenience constructors.

    fn array(&self, element: TypeId, rank: u32) -> TypeId {
        self.intern(TypeKey::Array { element, rank })
    }

    /// Rank-1 array.
    fn vector(&self, element: TypeId) -> TypeId {
        self.array(element, 1)
    }

    fn nullable(&self, underlying: TypeId) -> TypeId {
        self.intern(TypeKey::Nullable(underlying))
    }

    fn tuple(&self, elements: Vec<TupleElement>) -> TypeId {
        let list = self.intern_tuple_list(elements);
        self.intern(TypeKey::Tuple(list))
    }

    fn named(&self, def: DefId, args: Vec<TypeId>) -> TypeId {
        let app = self.intern_application(TypeApplication { def, args });
        self.intern(TypeKey::Named(app))
    }

    fn delegate(&self, params: Vec<ParamInfo>, return_type: TypeId) -> TypeId {
        let shape = self.intern_function_shape(FunctionShape {
            params,
            return_type,
        });
        self.intern(TypeKey::Delegate(shape))
    }

    fn error_placeholder(&self, name: Option<Atom>) -> TypeId {
        self.intern(TypeKey::Error(name))
    }
}
