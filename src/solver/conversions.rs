//! Implicit-conversion oracle.
//!
//! Fixing reconciles bounds by asking whether implicit conversions exist
//! between candidate types. The classifier proper lives upstream with
//! overload resolution; the engine only needs the boolean answer, so it
//! talks to a [`ConversionOracle`]. [`StandardConversions`] implements
//! the standard type-to-type subset over the solver's type graph:
//! identity, numeric widening, boxing, reference conversions (base
//! chain, implemented interfaces, declaration-site variance, array
//! covariance and the rank-1 array interfaces), and nullable lifting.
//!
//! `object` and `dynamic` convert to each other, and every type converts
//! to `dynamic` exactly when it converts to `object`. Conversions *from*
//! `dynamic` to other types are expression-level and deliberately absent
//! here, which is what lets a `{object, dynamic}` candidate pair resolve
//! through the merge tie-break rather than through the oracle.

use crate::solver::def::DefKind;
use crate::solver::facts;
use crate::solver::merge;
use crate::solver::types::*;
use crate::solver::TypeDatabase;

/// Maximum nesting for variance-directed conversion recursion.
const MAX_CONVERSION_DEPTH: u32 = 100;

/// Answers "does an implicit conversion exist from `source` to
/// `target`?" for the fixing step. Must be side-effect-free with respect
/// to engine state.
pub trait ConversionOracle {
    fn implicit_conversion_exists(
        &self,
        db: &dyn TypeDatabase,
        source: TypeId,
        target: TypeId,
    ) -> bool;
}

/// The standard type-to-type implicit conversion rules.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardConversions;

impl ConversionOracle for StandardConversions {
    fn implicit_conversion_exists(
        &self,
        db: &dyn TypeDatabase,
        source: TypeId,
        target: TypeId,
    ) -> bool {
        conversion_exists(db, source, target, 0)
    }
}

fn conversion_exists(db: &dyn TypeDatabase, source: TypeId, target: TypeId, depth: u32) -> bool {
    if depth > MAX_CONVERSION_DEPTH {
        return false;
    }
    if source == target {
        return true;
    }
    if source.is_error() || target.is_error() || source.is_void() || target.is_void() {
        return false;
    }

    // Identity conversions ignore object/dynamic distinctions and tuple
    // element names at every position.
    if merge::equivalent_modulo_dynamic_and_names(db, source, target) {
        return true;
    }

    // T -> dynamic wherever T -> object; conversions *from* dynamic stay
    // expression-level.
    if target.is_dynamic() {
        return conversion_exists(db, source, TypeId::OBJECT, depth + 1);
    }
    if source.is_dynamic() {
        return false;
    }

    // Everything non-void converts to object (reference conversion or boxing).
    if target.is_object() {
        return true;
    }

    if numeric_widening(source, target) {
        return true;
    }

    if nullable_conversion(db, source, target) {
        return true;
    }

    if tuple_conversion(db, source, target, depth) {
        return true;
    }

    if reference_conversion(db, source, target, depth) {
        return true;
    }

    // Type parameters convert through their constraints.
    if let Some(TypeKey::TypeParameter(info)) = db.lookup(source) {
        if info
            .constraint_types
            .iter()
            .any(|&bound| conversion_exists(db, bound, target, depth + 1))
        {
            return true;
        }
        let base = facts::effective_base_class(db, &info);
        if base != source && conversion_exists(db, base, target, depth + 1) {
            return true;
        }
    }

    false
}

/// Implicit numeric widening between intrinsic value types.
fn numeric_widening(source: TypeId, target: TypeId) -> bool {
    use TypeId as T;
    let widens_to: &[TypeId] = match source {
        T::SBYTE => &[T::SHORT, T::INT, T::LONG, T::FLOAT, T::DOUBLE, T::DECIMAL],
        T::BYTE => &[
            T::SHORT,
            T::USHORT,
            T::INT,
            T::UINT,
            T::LONG,
            T::ULONG,
            T::FLOAT,
            T::DOUBLE,
            T::DECIMAL,
        ],
        T::SHORT => &[T::INT, T::LONG, T::FLOAT, T::DOUBLE, T::DECIMAL],
        T::USHORT => &[
            T::INT,
            T::UINT,
            T::LONG,
            T::ULONG,
            T::FLOAT,
            T::DOUBLE,
            T::DECIMAL,
        ],
        T::INT => &[T::LONG, T::FLOAT, T::DOUBLE, T::DECIMAL],
        T::UINT => &[T::LONG, T::ULONG, T::FLOAT, T::DOUBLE, T::DECIMAL],
        T::LONG | T::ULONG => &[T::FLOAT, T::DOUBLE, T::DECIMAL],
        T::CHAR => &[
            T::USHORT,
            T::INT,
            T::UINT,
            T::LONG,
            T::ULONG,
            T::FLOAT,
            T::DOUBLE,
            T::DECIMAL,
        ],
        T::FLOAT => &[T::DOUBLE],
        _ => return false,
    };
    widens_to.contains(&target)
}

/// Implicit nullable conversions: `S -> T?` and `S? -> T?` when `S -> T`
/// is an identity or implicit value conversion. The asymmetric
/// non-nullable source rule applies to conversions only; inference
/// deliberately has no counterpart.
fn nullable_conversion(db: &dyn TypeDatabase, source: TypeId, target: TypeId) -> bool {
    let Some(target_underlying) = facts::nullable_underlying(db, target) else {
        return false;
    };
    let effective_source = facts::nullable_underlying(db, source).unwrap_or(source);
    effective_source == target_underlying
        || numeric_widening(effective_source, target_underlying)
}

/// Implicit tuple conversions: element-wise between tuples (or
/// tuple-compatible nominals) of equal cardinality. Element names never
/// participate.
fn tuple_conversion(db: &dyn TypeDatabase, source: TypeId, target: TypeId, depth: u32) -> bool {
    let Some(cardinality) = facts::tuple_cardinality(db, source) else {
        return false;
    };
    let (Some(source_elements), Some(target_elements)) = (
        facts::tuple_elements(db, source, cardinality),
        facts::tuple_elements(db, target, cardinality),
    ) else {
        return false;
    };
    source_elements
        .iter()
        .zip(target_elements.iter())
        .all(|(s, t)| conversion_exists(db, s.type_id, t.type_id, depth + 1))
}

/// Implicit reference (and boxing-to-interface) conversions.
fn reference_conversion(db: &dyn TypeDatabase, source: TypeId, target: TypeId, depth: u32) -> bool {
    // Same definition, different arguments: declaration-site variance.
    if variance_convertible(db, source, target, depth) {
        return true;
    }

    // Base-class chain of the source.
    let mut walked = 0;
    let mut base = facts::base_class(db, source);
    while let Some(current) = base {
        if current == target || variance_convertible(db, current, target, depth) {
            return true;
        }
        walked += 1;
        if walked > 100 {
            break;
        }
        base = facts::base_class(db, current);
    }

    // Implemented interfaces (covers boxing a struct to its interfaces).
    if facts::is_interface(db, target) {
        for interface in facts::all_interfaces(db, source) {
            if interface == target || variance_convertible(db, interface, target, depth) {
                return true;
            }
        }
    }

    // Array covariance: same rank, reference elements.
    if let (Some((source_element, source_rank)), Some((target_element, target_rank))) = (
        facts::array_element(db, source),
        facts::array_element(db, target),
    ) {
        return source_rank == target_rank
            && facts::is_reference_type(db, source_element)
            && facts::is_reference_type(db, target_element)
            && conversion_exists(db, source_element, target_element, depth + 1);
    }

    // Rank-1 arrays convert to the canonical array interfaces.
    if let Some((element, 1)) = facts::array_element(db, source) {
        if let Some(app) = facts::named_application(db, target) {
            if app.args.len() == 1 && db.array_interface_defs().contains(&app.def) {
                let arg = app.args[0];
                return element == arg
                    || (facts::is_reference_type(db, element)
                        && facts::is_reference_type(db, arg)
                        && conversion_exists(db, element, arg, depth + 1));
            }
        }
    }

    false
}

/// Same-definition conversion directed by declared variance. Variant
/// positions require identity or an implicit reference conversion
/// between the arguments; invariant positions require identity.
fn variance_convertible(db: &dyn TypeDatabase, source: TypeId, target: TypeId, depth: u32) -> bool {
    let (Some(source_app), Some(target_app)) = (
        facts::named_application(db, source),
        facts::named_application(db, target),
    ) else {
        return false;
    };
    if source_app.def != target_app.def || source_app.args.len() != target_app.args.len() {
        return false;
    }
    let Some(def) = db.definition(source_app.def) else {
        return false;
    };
    if !matches!(def.kind, DefKind::Interface | DefKind::Delegate) {
        return false;
    }

    source_app
        .args
        .iter()
        .zip(target_app.args.iter())
        .enumerate()
        .all(|(index, (&s, &t))| {
            if s == t {
                return true;
            }
            let reference_pair = facts::is_reference_type(db, s) && facts::is_reference_type(db, t);
            match def.variance_at(index) {
                VarianceKind::Out => reference_pair && conversion_exists(db, s, t, depth + 1),
                VarianceKind::In => reference_pair && conversion_exists(db, t, s, depth + 1),
                VarianceKind::Invariant => false,
            }
        })
}

#[cfg(test)]
#[path = "tests/conversions_tests.rs"]
mod tests;
