use super::*;
use crate::solver::testing::TestEnv;
use crate::solver::TypeDatabase;

fn conv(env: &TestEnv, source: TypeId, target: TypeId) -> bool {
    env.conversions
        .implicit_conversion_exists(&env.db, source, target)
}

#[test]
fn identity_and_errors() {
    let env = TestEnv::new();
    assert!(conv(&env, TypeId::INT, TypeId::INT));
    assert!(!conv(&env, TypeId::ERROR, TypeId::INT));
    assert!(!conv(&env, TypeId::INT, TypeId::ERROR));
    assert!(!conv(&env, TypeId::VOID, TypeId::OBJECT));
}

#[test]
fn numeric_widening() {
    let env = TestEnv::new();
    assert!(conv(&env, TypeId::INT, TypeId::LONG));
    assert!(conv(&env, TypeId::INT, TypeId::DOUBLE));
    assert!(conv(&env, TypeId::BYTE, TypeId::ULONG));
    assert!(conv(&env, TypeId::FLOAT, TypeId::DOUBLE));
    assert!(!conv(&env, TypeId::LONG, TypeId::INT));
    assert!(!conv(&env, TypeId::INT, TypeId::STRING));
    assert!(!conv(&env, TypeId::STRING, TypeId::INT));
}

#[test]
fn everything_boxes_to_object() {
    let env = TestEnv::new();
    assert!(conv(&env, TypeId::INT, TypeId::OBJECT));
    assert!(conv(&env, TypeId::STRING, TypeId::OBJECT));
    assert!(conv(&env, env.db.nullable(TypeId::INT), TypeId::OBJECT));
    assert!(conv(&env, env.list_of(TypeId::INT), TypeId::OBJECT));
}

#[test]
fn object_dynamic_cross_conversions() {
    let env = TestEnv::new();
    assert!(conv(&env, TypeId::OBJECT, TypeId::DYNAMIC));
    assert!(conv(&env, TypeId::DYNAMIC, TypeId::OBJECT));
    // T -> dynamic follows T -> object; the reverse stays expression-level.
    assert!(conv(&env, TypeId::INT, TypeId::DYNAMIC));
    assert!(conv(&env, TypeId::STRING, TypeId::DYNAMIC));
    assert!(!conv(&env, TypeId::DYNAMIC, TypeId::INT));
    assert!(!conv(&env, TypeId::DYNAMIC, TypeId::STRING));
}

#[test]
fn class_chain_conversions() {
    let env = TestEnv::new();
    let c = env.db.named(env.class_c, Vec::new());
    let d = env.db.named(env.class_d, Vec::new());
    assert!(conv(&env, d, c));
    assert!(!conv(&env, c, d));
}

#[test]
fn interface_implementation_conversions() {
    let env = TestEnv::new();
    let list_int = env.list_of(TypeId::INT);
    assert!(conv(&env, list_int, env.db.named(env.ilist, vec![TypeId::INT])));
    assert!(conv(&env, list_int, env.enumerable_of(TypeId::INT)));
    assert!(!conv(&env, env.enumerable_of(TypeId::INT), list_int));
}

#[test]
fn variance_conversions() {
    let env = TestEnv::new();
    // Covariant interface.
    assert!(conv(
        &env,
        env.enumerable_of(TypeId::STRING),
        env.enumerable_of(TypeId::OBJECT)
    ));
    assert!(!conv(
        &env,
        env.enumerable_of(TypeId::OBJECT),
        env.enumerable_of(TypeId::STRING)
    ));
    // Value-type arguments do not ride variance.
    assert!(!conv(
        &env,
        env.enumerable_of(TypeId::INT),
        env.enumerable_of(TypeId::OBJECT)
    ));
    // Contravariant interface.
    let cmp_object = env.db.named(env.icomparer, vec![TypeId::OBJECT]);
    let cmp_string = env.db.named(env.icomparer, vec![TypeId::STRING]);
    assert!(conv(&env, cmp_object, cmp_string));
    assert!(!conv(&env, cmp_string, cmp_object));
    // Invariant interface.
    let ilist_string = env.db.named(env.ilist, vec![TypeId::STRING]);
    let ilist_object = env.db.named(env.ilist, vec![TypeId::OBJECT]);
    assert!(!conv(&env, ilist_string, ilist_object));
    // List implements IEnumerable covariantly through the closure.
    assert!(conv(
        &env,
        env.list_of(TypeId::STRING),
        env.enumerable_of(TypeId::OBJECT)
    ));
}

#[test]
fn array_conversions() {
    let env = TestEnv::new();
    let strings = env.db.vector(TypeId::STRING);
    let objects = env.db.vector(TypeId::OBJECT);
    let ints = env.db.vector(TypeId::INT);

    // Covariance over reference elements only.
    assert!(conv(&env, strings, objects));
    assert!(!conv(&env, objects, strings));
    assert!(!conv(&env, ints, objects));

    // Rank must match.
    assert!(!conv(&env, strings, env.db.array(TypeId::OBJECT, 2)));

    // Rank-1 arrays convert to the array interfaces.
    assert!(conv(&env, ints, env.enumerable_of(TypeId::INT)));
    assert!(conv(&env, ints, env.db.named(env.ilist, vec![TypeId::INT])));
    assert!(conv(&env, strings, env.enumerable_of(TypeId::OBJECT)));
    assert!(!conv(&env, ints, env.enumerable_of(TypeId::LONG)));
    assert!(!conv(
        &env,
        env.db.array(TypeId::INT, 2),
        env.enumerable_of(TypeId::INT)
    ));
}

#[test]
fn nullable_conversions() {
    let env = TestEnv::new();
    let nullable_int = env.db.nullable(TypeId::INT);
    let nullable_long = env.db.nullable(TypeId::LONG);
    assert!(conv(&env, TypeId::INT, nullable_int));
    assert!(conv(&env, TypeId::INT, nullable_long));
    assert!(conv(&env, nullable_int, nullable_long));
    assert!(!conv(&env, nullable_int, TypeId::INT));
    assert!(!conv(&env, nullable_long, nullable_int));
    assert!(!conv(&env, TypeId::STRING, nullable_int));
}

#[test]
fn tuple_conversions_elementwise_ignoring_names() {
    let env = TestEnv::new();
    let source = env.named_tuple(&[(TypeId::INT, Some("a")), (TypeId::STRING, Some("b"))]);
    let target = env.unnamed_tuple(&[TypeId::LONG, TypeId::OBJECT]);
    assert!(conv(&env, source, target));
    assert!(!conv(&env, target, source));
    assert!(!conv(
        &env,
        source,
        env.unnamed_tuple(&[TypeId::LONG, TypeId::INT])
    ));
    // Tuple-compatible nominal on either side.
    let pair = env.db.named(env.pair, vec![TypeId::INT, TypeId::STRING]);
    assert!(conv(&env, pair, target));
    assert!(conv(&env, source, env.db.named(env.pair, vec![TypeId::LONG, TypeId::OBJECT])));
}
