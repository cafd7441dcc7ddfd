//! Bound argument model for call-site inference.
//!
//! The engine never sees syntax. The binder hands it arguments as a
//! tagged variant: a typed expression, an unbound lambda, a method
//! group, a tuple literal of further arguments, or something inference
//! cannot use. Lambdas and method groups are opaque handles; their
//! semantic analysis stays upstream and is reached through the
//! collaborator traits below.

use crate::solver::diagnostics::Diagnostics;
use crate::solver::types::{FunctionShape, ParamInfo, TypeId};
use crate::solver::TypeDatabase;
use serde::Serialize;

/// Opaque handle to an unbound anonymous function owned by the binder.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct LambdaId(pub u32);

/// Opaque handle to a method group owned by the binder.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct MethodGroupId(pub u32);

/// An anonymous-function argument before conversion to a delegate.
#[derive(Clone, Debug)]
pub struct UnboundLambda {
    pub id: LambdaId,
    /// Parameter types when the lambda is explicitly typed; `None` for
    /// an implicitly typed parameter list.
    pub explicit_param_types: Option<Vec<TypeId>>,
}

/// A bound argument at a call site.
#[derive(Clone, Debug)]
pub enum Argument {
    /// An ordinary expression; the type may be absent when the
    /// expression has none (e.g. a null literal).
    Expression(Option<TypeId>),
    /// An anonymous function.
    Lambda(UnboundLambda),
    /// A method group.
    MethodGroup(MethodGroupId),
    /// A tuple literal without a natural type; elements are themselves
    /// arguments and are paired with the target's element types.
    TupleLiteral(Vec<Argument>),
    /// Anything inference cannot draw from.
    Other,
}

impl Argument {
    pub fn typed(type_id: TypeId) -> Self {
        Argument::Expression(Some(type_id))
    }

    /// The expression's type, when it has a usable one.
    pub fn type_of(&self) -> Option<TypeId> {
        match self {
            Argument::Expression(ty) => *ty,
            _ => None,
        }
    }

    pub fn is_lambda_or_method_group(&self) -> bool {
        matches!(self, Argument::Lambda(_) | Argument::MethodGroup(_))
    }
}

/// Analysis of anonymous-function bodies, owned by the binder.
///
/// The engine calls this once an argument lambda's input types no longer
/// mention unfixed type parameters; the delegate handed over has the
/// current fixed results substituted into its parameter types.
pub trait LambdaReturnInference {
    fn inferred_return_type(
        &self,
        db: &dyn TypeDatabase,
        lambda: LambdaId,
        fixed_delegate: &FunctionShape,
        diagnostics: &mut Diagnostics,
    ) -> Option<TypeId>;
}

/// Method-group overload selection, owned by the binder.
///
/// Given the delegate's (fixed) parameter list, picks the single best
/// method in the group and returns its return type; `None` when there is
/// no unique best method.
pub trait MethodGroupResolver {
    fn resolve_return_type(
        &self,
        db: &dyn TypeDatabase,
        group: MethodGroupId,
        delegate_params: &[ParamInfo],
        diagnostics: &mut Diagnostics,
    ) -> Option<TypeId>;
}
