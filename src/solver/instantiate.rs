//! Generic type instantiation and substitution.
//!
//! Replaces type parameters with concrete types throughout a type
//! structure. The map is keyed by the interned `TypeId` of the type
//! parameter itself, not its name, so same-named parameters of different
//! scopes (an enclosing type's `T` versus a method's `T`, or a recursive
//! call reusing a letter) can never cross-contaminate.

use crate::solver::types::*;
use crate::solver::TypeDatabase;
use rustc_hash::FxHashMap;

/// Maximum depth for recursive type instantiation.
pub const MAX_INSTANTIATION_DEPTH: u32 = 50;

/// A substitution map from type parameters to concrete types.
#[derive(Clone, Debug, Default)]
pub struct TypeSubstitution {
    map: FxHashMap<TypeId, TypeId>,
}

impl TypeSubstitution {
    pub fn new() -> Self {
        TypeSubstitution {
            map: FxHashMap::default(),
        }
    }

    /// Build a substitution from parallel parameter/argument lists.
    /// Extra parameters (missing arguments) map to themselves, i.e. they
    /// are simply absent from the map.
    pub fn from_pairs(params: &[TypeId], args: &[TypeId]) -> Self {
        let mut map = FxHashMap::default();
        for (&param, &arg) in params.iter().zip(args.iter()) {
            map.insert(param, arg);
        }
        TypeSubstitution { map }
    }

    pub fn insert(&mut self, param: TypeId, replacement: TypeId) {
        self.map.insert(param, replacement);
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Apply the substitution to a type, rebuilding through the interner.
    pub fn apply(&self, db: &dyn TypeDatabase, type_id: TypeId) -> TypeId {
        self.apply_at_depth(db, type_id, 0)
    }

    fn apply_at_depth(&self, db: &dyn TypeDatabase, type_id: TypeId, depth: u32) -> TypeId {
        if self.map.is_empty() || depth > MAX_INSTANTIATION_DEPTH {
            return type_id;
        }
        if let Some(&replacement) = self.map.get(&type_id) {
            return replacement;
        }

        let Some(key) = db.lookup(type_id) else {
            return type_id;
        };

        match key {
            TypeKey::Intrinsic(_) | TypeKey::Error(_) => type_id,
            // A type parameter not in the map stands for itself.
            TypeKey::TypeParameter(_) => type_id,
            TypeKey::Array { element, rank } => {
                let mapped = self.apply_at_depth(db, element, depth + 1);
                if mapped == element {
                    type_id
                } else {
                    db.array(mapped, rank)
                }
            }
            TypeKey::Nullable(underlying) => {
                let mapped = self.apply_at_depth(db, underlying, depth + 1);
                if mapped == underlying {
                    type_id
                } else {
                    db.nullable(mapped)
                }
            }
            TypeKey::Tuple(list_id) => {
                let elements = db.tuple_list(list_id);
                let mut changed = false;
                let mut mapped = Vec::with_capacity(elements.len());
                for element in elements.iter() {
                    let ty = self.apply_at_depth(db, element.type_id, depth + 1);
                    changed |= ty != element.type_id;
                    mapped.push(TupleElement {
                        type_id: ty,
                        name: element.name,
                    });
                }
                if changed {
                    db.tuple(mapped)
                } else {
                    type_id
                }
            }
            TypeKey::Named(app_id) => {
                let Some(app) = db.application(app_id) else {
                    return type_id;
                };
                let mut changed = false;
                let mut args = Vec::with_capacity(app.args.len());
                for &arg in &app.args {
                    let mapped = self.apply_at_depth(db, arg, depth + 1);
                    changed |= mapped != arg;
                    args.push(mapped);
                }
                if changed {
                    db.named(app.def, args)
                } else {
                    type_id
                }
            }
            TypeKey::Delegate(shape_id) => {
                let Some(shape) = db.function_shape(shape_id) else {
                    return type_id;
                };
                let mapped = self.apply_to_shape(db, &shape, depth + 1);
                match mapped {
                    Some(shape) => db.delegate(shape.params, shape.return_type),
                    None => type_id,
                }
            }
        }
    }

    /// Apply the substitution to a delegate shape, returning `None` when
    /// nothing changed.
    pub fn apply_to_shape(
        &self,
        db: &dyn TypeDatabase,
        shape: &FunctionShape,
        depth: u32,
    ) -> Option<FunctionShape> {
        if self.map.is_empty() {
            return None;
        }
        let mut changed = false;
        let mut params = Vec::with_capacity(shape.params.len());
        for param in &shape.params {
            let mapped = self.apply_at_depth(db, param.type_id, depth);
            changed |= mapped != param.type_id;
            params.push(ParamInfo {
                name: param.name,
                type_id: mapped,
                ref_kind: param.ref_kind,
            });
        }
        let return_type = self.apply_at_depth(db, shape.return_type, depth);
        changed |= return_type != shape.return_type;
        if changed {
            Some(FunctionShape {
                params,
                return_type,
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
#[path = "tests/instantiate_tests.rs"]
mod tests;
