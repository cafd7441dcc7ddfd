//! vela-solver: type representation, interning, and method type
//! inference for the Vela compiler.
//!
//! The crate owns the structural type graph (interned `TypeId` handles
//! over `TypeKey` shapes) and the call-site method type inference engine
//! that overload resolution drives. Upstream compiler layers supply
//! bound arguments and the collaborator oracles; the engine returns a
//! per-type-parameter assignment or a best-effort failure.

pub mod interner;
pub mod solver;

pub use interner::Atom;
pub use solver::{
    Argument, ConversionOracle, DefId, DefKind, Definition, Diagnostics, MethodTypeInferenceResult,
    MethodTypeInferrer, TypeDatabase, TypeId, TypeInterner, TypeKey,
};
