//! Type predicates and structural accessors.
//!
//! These are the queries the inference engine dispatches on: delegate
//! extraction, tuple compatibility, array and nullable accessors,
//! reference-type tests, base-class chains, interface closures, and
//! type-parameter containment. All of them are pure reads over the type
//! database.

use crate::solver::def::DefKind;
use crate::solver::instantiate::TypeSubstitution;
use crate::solver::types::*;
use crate::solver::TypeDatabase;
use rustc_hash::FxHashSet;
use std::sync::Arc;

/// Cap on base-chain walks; guards against pathological template cycles.
const MAX_BASE_CHAIN: usize = 100;

/// If `type_id` is a delegate type, or an expression-tree type of a
/// delegate, returns its invoke shape with the instantiation's type
/// arguments substituted in.
pub fn delegate_shape(db: &dyn TypeDatabase, type_id: TypeId) -> Option<Arc<FunctionShape>> {
    match db.lookup(type_id)? {
        TypeKey::Delegate(shape_id) => db.function_shape(shape_id),
        TypeKey::Named(app_id) => {
            let app = db.application(app_id)?;
            let def = db.definition(app.def)?;
            if def.is_expression_tree {
                let &underlying = app.args.first()?;
                return delegate_shape(db, underlying);
            }
            if def.kind != DefKind::Delegate {
                return None;
            }
            let shape = db.function_shape(def.delegate_shape?)?;
            let substitution = TypeSubstitution::from_pairs(&def.type_params, &app.args);
            match substitution.apply_to_shape(db, &shape, 0) {
                Some(instantiated) => Some(Arc::new(instantiated)),
                None => Some(shape),
            }
        }
        _ => None,
    }
}

/// Cardinality of the ambient tuple or a shape-compatible nominal;
/// `None` for anything else.
pub fn tuple_cardinality(db: &dyn TypeDatabase, type_id: TypeId) -> Option<usize> {
    match db.lookup(type_id)? {
        TypeKey::Tuple(list_id) => Some(db.tuple_list(list_id).len()),
        TypeKey::Named(app_id) => {
            let app = db.application(app_id)?;
            let def = db.definition(app.def)?;
            if def.is_tuple_compatible {
                Some(app.args.len())
            } else {
                None
            }
        }
        _ => None,
    }
}

/// If `type_id` is the ambient tuple of cardinality `cardinality` or a
/// shape-compatible nominal of the same cardinality, returns the element
/// types (with names when the ambient form carries them).
pub fn tuple_elements(
    db: &dyn TypeDatabase,
    type_id: TypeId,
    cardinality: usize,
) -> Option<Vec<TupleElement>> {
    match db.lookup(type_id)? {
        TypeKey::Tuple(list_id) => {
            let elements = db.tuple_list(list_id);
            if elements.len() == cardinality {
                Some(elements.to_vec())
            } else {
                None
            }
        }
        TypeKey::Named(app_id) => {
            let app = db.application(app_id)?;
            let def = db.definition(app.def)?;
            if def.is_tuple_compatible && app.args.len() == cardinality {
                Some(app.args.iter().map(|&ty| TupleElement::unnamed(ty)).collect())
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Element type and rank for array types.
pub fn array_element(db: &dyn TypeDatabase, type_id: TypeId) -> Option<(TypeId, u32)> {
    match db.lookup(type_id)? {
        TypeKey::Array { element, rank } => Some((element, rank)),
        _ => None,
    }
}

/// Underlying type for nullable value types.
pub fn nullable_underlying(db: &dyn TypeDatabase, type_id: TypeId) -> Option<TypeId> {
    match db.lookup(type_id)? {
        TypeKey::Nullable(underlying) => Some(underlying),
        _ => None,
    }
}

/// Whether the type is known to be a reference type.
///
/// Type parameters count only when a `class` constraint (or a class-type
/// bound) says so; an unconstrained parameter is not *known* to be a
/// reference type and therefore gets exact treatment in variance-directed
/// recursion.
pub fn is_reference_type(db: &dyn TypeDatabase, type_id: TypeId) -> bool {
    match db.lookup(type_id) {
        Some(TypeKey::Intrinsic(kind)) => kind.is_reference(),
        Some(TypeKey::Array { .. }) | Some(TypeKey::Delegate(_)) => true,
        Some(TypeKey::Named(app_id)) => db
            .application(app_id)
            .and_then(|app| db.definition(app.def))
            .map(|def| def.kind.is_reference())
            .unwrap_or(false),
        Some(TypeKey::TypeParameter(info)) => {
            // An interface bound says nothing about reference-ness; a
            // class-type bound does.
            info.is_known_reference_type()
                || info.constraint_types.iter().any(|&bound| {
                    named_def_kind(db, bound) == Some(DefKind::Class)
                        || matches!(
                            db.lookup(bound),
                            Some(TypeKey::Intrinsic(IntrinsicKind::String))
                                | Some(TypeKey::Array { .. })
                        )
                })
        }
        _ => false,
    }
}

/// Whether the type is a constructed interface.
pub fn is_interface(db: &dyn TypeDatabase, type_id: TypeId) -> bool {
    named_def_kind(db, type_id) == Some(DefKind::Interface)
}

pub(crate) fn named_def_kind(db: &dyn TypeDatabase, type_id: TypeId) -> Option<DefKind> {
    match db.lookup(type_id)? {
        TypeKey::Named(app_id) => {
            let app = db.application(app_id)?;
            Some(db.definition(app.def)?.kind)
        }
        _ => None,
    }
}

/// The instantiated application behind a `Named` type.
pub fn named_application(db: &dyn TypeDatabase, type_id: TypeId) -> Option<Arc<TypeApplication>> {
    match db.lookup(type_id)? {
        TypeKey::Named(app_id) => db.application(app_id),
        _ => None,
    }
}

/// Direct base class of a constructed type, with the instantiation's
/// type arguments substituted into the definition's base template.
pub fn base_class(db: &dyn TypeDatabase, type_id: TypeId) -> Option<TypeId> {
    match db.lookup(type_id)? {
        TypeKey::Intrinsic(IntrinsicKind::String) => Some(TypeId::OBJECT),
        TypeKey::Array { .. } | TypeKey::Delegate(_) => Some(TypeId::OBJECT),
        TypeKey::Named(app_id) => {
            let app = db.application(app_id)?;
            let def = db.definition(app.def)?;
            let base = def.base?;
            let substitution = TypeSubstitution::from_pairs(&def.type_params, &app.args);
            Some(substitution.apply(db, base))
        }
        _ => None,
    }
}

/// Effective base class of a type parameter: its class-type bound if it
/// has one, `object` otherwise.
pub fn effective_base_class(db: &dyn TypeDatabase, info: &TypeParamInfo) -> TypeId {
    for &bound in &info.constraint_types {
        match db.lookup(bound) {
            Some(TypeKey::Named(_)) if named_def_kind(db, bound) == Some(DefKind::Class) => {
                return bound;
            }
            Some(TypeKey::Intrinsic(IntrinsicKind::String)) | Some(TypeKey::Array { .. }) => {
                return bound;
            }
            _ => {}
        }
    }
    TypeId::OBJECT
}

/// All interfaces of a type: the transitive closure over declared
/// interfaces and the base-class chain, in discovery order. For a type
/// parameter, the effective interfaces are its interface bounds plus the
/// closure of its effective base class.
pub fn all_interfaces(db: &dyn TypeDatabase, type_id: TypeId) -> Vec<TypeId> {
    let mut result = Vec::new();
    let mut seen = FxHashSet::default();
    collect_interfaces(db, type_id, &mut result, &mut seen, 0);
    result
}

fn collect_interfaces(
    db: &dyn TypeDatabase,
    type_id: TypeId,
    result: &mut Vec<TypeId>,
    seen: &mut FxHashSet<TypeId>,
    depth: usize,
) {
    if depth > MAX_BASE_CHAIN {
        return;
    }
    match db.lookup(type_id) {
        Some(TypeKey::Named(app_id)) => {
            let Some(app) = db.application(app_id) else {
                return;
            };
            let Some(def) = db.definition(app.def) else {
                return;
            };
            let substitution = TypeSubstitution::from_pairs(&def.type_params, &app.args);
            for &template in &def.interfaces {
                let interface = substitution.apply(db, template);
                if seen.insert(interface) {
                    result.push(interface);
                }
                collect_interfaces(db, interface, result, seen, depth + 1);
            }
            if let Some(base) = base_class(db, type_id) {
                collect_interfaces(db, base, result, seen, depth + 1);
            }
        }
        Some(TypeKey::TypeParameter(info)) => {
            for &bound in &info.constraint_types {
                if is_interface(db, bound) {
                    if seen.insert(bound) {
                        result.push(bound);
                    }
                    collect_interfaces(db, bound, result, seen, depth + 1);
                } else {
                    collect_interfaces(db, bound, result, seen, depth + 1);
                }
            }
            let base = effective_base_class(db, &info);
            if base != type_id {
                collect_interfaces(db, base, result, seen, depth + 1);
            }
        }
        _ => {}
    }
}

/// Structural search for a specific type parameter (by interned
/// identity) inside a type.
pub fn contains_type_parameter(db: &dyn TypeDatabase, type_id: TypeId, param: TypeId) -> bool {
    if type_id == param {
        return true;
    }
    match db.lookup(type_id) {
        Some(TypeKey::Array { element, .. }) => contains_type_parameter(db, element, param),
        Some(TypeKey::Nullable(underlying)) => contains_type_parameter(db, underlying, param),
        Some(TypeKey::Tuple(list_id)) => db
            .tuple_list(list_id)
            .iter()
            .any(|element| contains_type_parameter(db, element.type_id, param)),
        Some(TypeKey::Named(app_id)) => db
            .application(app_id)
            .map(|app| {
                app.args
                    .iter()
                    .any(|&arg| contains_type_parameter(db, arg, param))
            })
            .unwrap_or(false),
        Some(TypeKey::Delegate(shape_id)) => db
            .function_shape(shape_id)
            .map(|shape| {
                shape
                    .params
                    .iter()
                    .any(|p| contains_type_parameter(db, p.type_id, param))
                    || contains_type_parameter(db, shape.return_type, param)
            })
            .unwrap_or(false),
        _ => false,
    }
}

/// Whether any of `params` occurs structurally inside `type_id`.
pub fn contains_any_type_parameter(
    db: &dyn TypeDatabase,
    type_id: TypeId,
    params: &[TypeId],
) -> bool {
    params
        .iter()
        .any(|&param| contains_type_parameter(db, type_id, param))
}

#[cfg(test)]
#[path = "tests/facts_tests.rs"]
mod tests;
