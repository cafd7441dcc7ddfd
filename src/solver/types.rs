//! Type representation for the solver.
//!
//! Types are represented as lightweight `TypeId` handles that point into
//! an interning table. The actual structure is stored in `TypeKey`.
//! Structurally identical types intern to the same `TypeId`, so type
//! equality throughout the solver is a u32 compare.

use crate::interner::Atom;
use crate::solver::def::{DefId, MethodId};
use serde::Serialize;

/// A lightweight handle to an interned type.
/// Equality check is O(1) - just compare the u32 values.
///
/// `TypeId::ERROR` is the anonymous error sentinel: it marks types that
/// failed resolution upstream and is contagious through inference (an
/// argument with an error type contributes no bounds). Named error
/// placeholders (`TypeKey::Error(Some(name))`) are produced by result
/// extraction for type parameters that could not be fixed; they keep the
/// parameter's display name so diagnostics stay readable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Default)]
pub struct TypeId(pub u32);

impl TypeId {
    /// Internal placeholder - no valid type.
    pub const NONE: TypeId = TypeId(0);

    /// Error sentinel - type resolution failed upstream.
    pub const ERROR: TypeId = TypeId(1);

    /// The `void` type - no value; never a usable argument type.
    pub const VOID: TypeId = TypeId(2);

    /// The root reference type `object`.
    pub const OBJECT: TypeId = TypeId(3);

    /// The `dynamic` type - `object` at runtime, late-bound at compile
    /// time. Distinct from `OBJECT` as a candidate key; equivalent to it
    /// under the merge comparator at nested positions.
    pub const DYNAMIC: TypeId = TypeId(4);

    pub const BOOL: TypeId = TypeId(5);
    pub const CHAR: TypeId = TypeId(6);
    pub const SBYTE: TypeId = TypeId(7);
    pub const BYTE: TypeId = TypeId(8);
    pub const SHORT: TypeId = TypeId(9);
    pub const USHORT: TypeId = TypeId(10);
    pub const INT: TypeId = TypeId(11);
    pub const UINT: TypeId = TypeId(12);
    pub const LONG: TypeId = TypeId(13);
    pub const ULONG: TypeId = TypeId(14);
    pub const FLOAT: TypeId = TypeId(15);
    pub const DOUBLE: TypeId = TypeId(16);
    pub const DECIMAL: TypeId = TypeId(17);

    /// The `string` type - a sealed reference type.
    pub const STRING: TypeId = TypeId(18);

    /// First user-defined type ID (after built-in intrinsics).
    pub const FIRST_USER: u32 = 100;

    pub fn is_intrinsic(self) -> bool {
        self.0 < Self::FIRST_USER
    }

    pub fn is_error(self) -> bool {
        self == Self::ERROR
    }

    pub fn is_dynamic(self) -> bool {
        self == Self::DYNAMIC
    }

    pub fn is_object(self) -> bool {
        self == Self::OBJECT
    }

    pub fn is_void(self) -> bool {
        self == Self::VOID
    }
}

/// Interned list of TypeId values (type arguments, interface lists).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeListId(pub u32);

/// Interned tuple element list.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TupleListId(pub u32);

/// Interned delegate shape (parameter list + return type).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionShapeId(pub u32);

/// Interned nominal instantiation (Def<Args>).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct AppId(pub u32);

/// How a parameter (or argument) is passed.
///
/// Anything other than `Value` forces exact inference on that argument.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize)]
pub enum RefKind {
    #[default]
    Value,
    Ref,
    Out,
    In,
}

impl RefKind {
    pub fn is_by_value(self) -> bool {
        self == RefKind::Value
    }
}

/// Declared variance of a type parameter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize)]
pub enum VarianceKind {
    #[default]
    Invariant,
    /// `out` - covariant.
    Out,
    /// `in` - contravariant.
    In,
}

bitflags::bitflags! {
    /// Primary constraints declared on a type parameter.
    #[derive(Default, Clone, Copy, PartialEq, Eq, Hash, Debug)]
    pub struct TypeParamConstraints: u32 {
        /// `where T : class`
        const REFERENCE_TYPE = 1 << 0;
        /// `where T : struct`
        const VALUE_TYPE = 1 << 1;
    }
}

/// Scope that declared a type parameter.
///
/// Identity of a type parameter is `(owner, ordinal, name)`. Two
/// parameters spelled the same but owned by different scopes intern to
/// different `TypeId`s, so a recursive call that reuses a letter never
/// contaminates the enclosing method's inference.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeParamOwner {
    Definition(DefId),
    Method(MethodId),
}

/// Type parameter information.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeParamInfo {
    pub name: Atom,
    pub owner: TypeParamOwner,
    /// Index within the owner's type parameter list.
    pub ordinal: u16,
    pub variance: VarianceKind,
    pub constraints: TypeParamConstraints,
    /// Secondary constraint types (a class bound and/or interface bounds).
    pub constraint_types: Vec<TypeId>,
}

impl TypeParamInfo {
    /// Whether the parameter is known to be a reference type from its
    /// primary constraints alone.
    pub fn is_known_reference_type(&self) -> bool {
        self.constraints
            .contains(TypeParamConstraints::REFERENCE_TYPE)
    }
}

/// Tuple element information. The name is display metadata: it never
/// affects conversions, and candidate merging intersects names
/// element-wise.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TupleElement {
    pub type_id: TypeId,
    pub name: Option<Atom>,
}

impl TupleElement {
    pub fn unnamed(type_id: TypeId) -> Self {
        TupleElement {
            type_id,
            name: None,
        }
    }
}

/// Parameter of a delegate shape.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParamInfo {
    pub name: Option<Atom>,
    pub type_id: TypeId,
    pub ref_kind: RefKind,
}

impl ParamInfo {
    pub fn by_value(type_id: TypeId) -> Self {
        ParamInfo {
            name: None,
            type_id,
            ref_kind: RefKind::Value,
        }
    }
}

/// Structural delegate shape: parameter list plus return type.
/// `TypeId::VOID` as the return type means no usable output position.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionShape {
    pub params: Vec<ParamInfo>,
    pub return_type: TypeId,
}

/// A nominal instantiation `Def<Args>`. Non-generic nominals have an
/// empty argument list.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeApplication {
    pub def: DefId,
    pub args: Vec<TypeId>,
}

/// The structural "shape" of a type - the key used for interning.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeKey {
    /// Intrinsic types (void, object, dynamic, string, numerics, ...).
    Intrinsic(IntrinsicKind),

    /// Array type with rank. Rank 1 is the vector shape eligible for the
    /// array-interface inference and conversion rules.
    Array { element: TypeId, rank: u32 },

    /// Nullable value type `T?`.
    Nullable(TypeId),

    /// Ambient tuple with optionally named elements.
    Tuple(TupleListId),

    /// Nominal instantiation (class, struct, interface, enum, declared
    /// delegate, tuple-underlying nominal, expression tree).
    Named(AppId),

    /// Structural delegate shape.
    Delegate(FunctionShapeId),

    /// Type parameter of a definition or a method.
    TypeParameter(TypeParamInfo),

    /// Error placeholder; carries a type parameter's display name when
    /// produced for an unfixed inference slot.
    Error(Option<Atom>),
}

/// Intrinsic type kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IntrinsicKind {
    Void,
    Object,
    Dynamic,
    Bool,
    Char,
    SByte,
    Byte,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    Float,
    Double,
    Decimal,
    String,
}

impl IntrinsicKind {
    pub fn to_type_id(self) -> TypeId {
        match self {
            IntrinsicKind::Void => TypeId::VOID,
            IntrinsicKind::Object => TypeId::OBJECT,
            IntrinsicKind::Dynamic => TypeId::DYNAMIC,
            IntrinsicKind::Bool => TypeId::BOOL,
            IntrinsicKind::Char => TypeId::CHAR,
            IntrinsicKind::SByte => TypeId::SBYTE,
            IntrinsicKind::Byte => TypeId::BYTE,
            IntrinsicKind::Short => TypeId::SHORT,
            IntrinsicKind::UShort => TypeId::USHORT,
            IntrinsicKind::Int => TypeId::INT,
            IntrinsicKind::UInt => TypeId::UINT,
            IntrinsicKind::Long => TypeId::LONG,
            IntrinsicKind::ULong => TypeId::ULONG,
            IntrinsicKind::Float => TypeId::FLOAT,
            IntrinsicKind::Double => TypeId::DOUBLE,
            IntrinsicKind::Decimal => TypeId::DECIMAL,
            IntrinsicKind::String => TypeId::STRING,
        }
    }

    /// Reference intrinsics: object, dynamic, string.
    pub fn is_reference(self) -> bool {
        matches!(
            self,
            IntrinsicKind::Object | IntrinsicKind::Dynamic | IntrinsicKind::String
        )
    }

    /// Numeric value intrinsics.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            IntrinsicKind::SByte
                | IntrinsicKind::Byte
                | IntrinsicKind::Short
                | IntrinsicKind::UShort
                | IntrinsicKind::Int
                | IntrinsicKind::UInt
                | IntrinsicKind::Long
                | IntrinsicKind::ULong
                | IntrinsicKind::Float
                | IntrinsicKind::Double
                | IntrinsicKind::Decimal
        )
    }
}

#[cfg(test)]
#[path = "tests/types_tests.rs"]
mod tests;
