//! Equivalence and merging of candidate types during fixing.
//!
//! Two notions of "the same type" are in play when bounds are reconciled:
//!
//! - the *merge comparator* ignores `object` vs `dynamic` everywhere and
//!   ignores tuple element names;
//! - the *candidate key* uses the merge comparator but keeps bare
//!   `object` and bare `dynamic` distinct, so both can survive to the
//!   best-candidate selection where the tie-break resolves them.
//!
//! Merging rebuilds the combined type: dynamic-ness is OR-ed per
//! position, tuple names are kept only where both sides agree.

use crate::solver::types::*;
use crate::solver::TypeDatabase;

fn is_object_or_dynamic(type_id: TypeId) -> bool {
    type_id == TypeId::OBJECT || type_id == TypeId::DYNAMIC
}

/// Structural equality ignoring `object`/`dynamic` distinctions and
/// tuple element names at every position.
pub fn equivalent_modulo_dynamic_and_names(db: &dyn TypeDatabase, a: TypeId, b: TypeId) -> bool {
    if a == b {
        return true;
    }
    if is_object_or_dynamic(a) && is_object_or_dynamic(b) {
        return true;
    }
    match (db.lookup(a), db.lookup(b)) {
        (
            Some(TypeKey::Array {
                element: ea,
                rank: ra,
            }),
            Some(TypeKey::Array {
                element: eb,
                rank: rb,
            }),
        ) => ra == rb && equivalent_modulo_dynamic_and_names(db, ea, eb),
        (Some(TypeKey::Nullable(ua)), Some(TypeKey::Nullable(ub))) => {
            equivalent_modulo_dynamic_and_names(db, ua, ub)
        }
        (Some(TypeKey::Tuple(la)), Some(TypeKey::Tuple(lb))) => {
            let ea = db.tuple_list(la);
            let eb = db.tuple_list(lb);
            ea.len() == eb.len()
                && ea
                    .iter()
                    .zip(eb.iter())
                    .all(|(x, y)| equivalent_modulo_dynamic_and_names(db, x.type_id, y.type_id))
        }
        (Some(TypeKey::Named(aa)), Some(TypeKey::Named(ab))) => {
            match (db.application(aa), db.application(ab)) {
                (Some(x), Some(y)) => {
                    x.def == y.def
                        && x.args.len() == y.args.len()
                        && x.args
                            .iter()
                            .zip(y.args.iter())
                            .all(|(&u, &v)| equivalent_modulo_dynamic_and_names(db, u, v))
                }
                _ => false,
            }
        }
        (Some(TypeKey::Delegate(sa)), Some(TypeKey::Delegate(sb))) => {
            match (db.function_shape(sa), db.function_shape(sb)) {
                (Some(x), Some(y)) => {
                    x.params.len() == y.params.len()
                        && x.params.iter().zip(y.params.iter()).all(|(p, q)| {
                            p.ref_kind == q.ref_kind
                                && equivalent_modulo_dynamic_and_names(db, p.type_id, q.type_id)
                        })
                        && equivalent_modulo_dynamic_and_names(db, x.return_type, y.return_type)
                }
                _ => false,
            }
        }
        _ => false,
    }
}

/// Candidate-set key equality: the merge comparator, except that bare
/// `object` and bare `dynamic` are distinct keys.
pub fn candidate_key_equal(db: &dyn TypeDatabase, a: TypeId, b: TypeId) -> bool {
    if is_object_or_dynamic(a) && is_object_or_dynamic(b) {
        return a == b;
    }
    equivalent_modulo_dynamic_and_names(db, a, b)
}

/// Merge two types known to be equivalent under the merge comparator.
/// Dynamic-ness wins per position; tuple names survive only where both
/// sides agree. Falls back to the first operand on any shape surprise.
pub fn merge_equivalent(db: &dyn TypeDatabase, a: TypeId, b: TypeId) -> TypeId {
    if a == b {
        return a;
    }
    if is_object_or_dynamic(a) && is_object_or_dynamic(b) {
        return TypeId::DYNAMIC;
    }
    match (db.lookup(a), db.lookup(b)) {
        (
            Some(TypeKey::Array {
                element: ea,
                rank: ra,
            }),
            Some(TypeKey::Array { element: eb, .. }),
        ) => db.array(merge_equivalent(db, ea, eb), ra),
        (Some(TypeKey::Nullable(ua)), Some(TypeKey::Nullable(ub))) => {
            db.nullable(merge_equivalent(db, ua, ub))
        }
        (Some(TypeKey::Tuple(la)), Some(TypeKey::Tuple(lb))) => {
            let ea = db.tuple_list(la);
            let eb = db.tuple_list(lb);
            if ea.len() != eb.len() {
                return a;
            }
            let merged = ea
                .iter()
                .zip(eb.iter())
                .map(|(x, y)| TupleElement {
                    type_id: merge_equivalent(db, x.type_id, y.type_id),
                    name: if x.name == y.name { x.name } else { None },
                })
                .collect();
            db.tuple(merged)
        }
        (Some(TypeKey::Named(aa)), Some(TypeKey::Named(ab))) => {
            match (db.application(aa), db.application(ab)) {
                (Some(x), Some(y)) if x.def == y.def && x.args.len() == y.args.len() => {
                    let args = x
                        .args
                        .iter()
                        .zip(y.args.iter())
                        .map(|(&u, &v)| merge_equivalent(db, u, v))
                        .collect();
                    db.named(x.def, args)
                }
                _ => a,
            }
        }
        (Some(TypeKey::Delegate(sa)), Some(TypeKey::Delegate(sb))) => {
            match (db.function_shape(sa), db.function_shape(sb)) {
                (Some(x), Some(y)) if x.params.len() == y.params.len() => {
                    let params = x
                        .params
                        .iter()
                        .zip(y.params.iter())
                        .map(|(p, q)| ParamInfo {
                            name: p.name,
                            type_id: merge_equivalent(db, p.type_id, q.type_id),
                            ref_kind: p.ref_kind,
                        })
                        .collect();
                    let return_type = merge_equivalent(db, x.return_type, y.return_type);
                    db.delegate(params, return_type)
                }
                _ => a,
            }
        }
        _ => a,
    }
}

#[cfg(test)]
#[path = "tests/merge_tests.rs"]
mod tests;
