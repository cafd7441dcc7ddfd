use super::*;
use crate::solver::testing::{run_inference, Harness, TestEnv};

#[test]
fn dynamic_beats_object() {
    let env = TestEnv::new();
    let harness = Harness::new();
    let params = env.method_params(&["T"]);
    let formals = [params[0], params[0]];

    let result = run_inference(
        &env,
        &harness,
        &params,
        &formals,
        &[
            Argument::typed(TypeId::OBJECT),
            Argument::typed(TypeId::DYNAMIC),
        ],
    );
    assert!(result.success);
    assert_eq!(result.inferred, vec![TypeId::DYNAMIC]);

    // Order of the bounds must not matter.
    let result = run_inference(
        &env,
        &harness,
        &params,
        &formals,
        &[
            Argument::typed(TypeId::DYNAMIC),
            Argument::typed(TypeId::OBJECT),
        ],
    );
    assert!(result.success);
    assert_eq!(result.inferred, vec![TypeId::DYNAMIC]);
}

#[test]
fn nested_dynamic_merges_into_candidate() {
    let env = TestEnv::new();
    let harness = Harness::new();
    let params = env.method_params(&["T"]);
    let formals = [params[0], params[0]];
    let result = run_inference(
        &env,
        &harness,
        &params,
        &formals,
        &[
            Argument::typed(env.list_of(TypeId::OBJECT)),
            Argument::typed(env.list_of(TypeId::DYNAMIC)),
        ],
    );
    assert!(result.success);
    assert_eq!(result.inferred, vec![env.list_of(TypeId::DYNAMIC)]);
}

#[test]
fn tuple_names_intersect_across_bounds() {
    let env = TestEnv::new();
    let harness = Harness::new();
    let params = env.method_params(&["T"]);
    let formals = [params[0], params[0]];
    let left = env.named_tuple(&[(TypeId::INT, Some("a")), (TypeId::INT, Some("b"))]);
    let right = env.named_tuple(&[(TypeId::INT, Some("a")), (TypeId::INT, Some("c"))]);
    let result = run_inference(
        &env,
        &harness,
        &params,
        &formals,
        &[Argument::typed(left), Argument::typed(right)],
    );
    assert!(result.success);
    assert_eq!(
        result.inferred,
        vec![env.named_tuple(&[(TypeId::INT, Some("a")), (TypeId::INT, None)])]
    );
}

#[test]
fn conflicting_exact_bounds_fail() {
    let env = TestEnv::new();
    let harness = Harness::new();
    let params = env.method_params(&["T"]);
    let formals = [params[0], params[0]];
    let ref_kinds = [RefKind::Out, RefKind::Out];
    let mut diagnostics = Diagnostics::new();

    let result = MethodTypeInferrer::infer(
        &env.db,
        &env.conversions,
        &harness,
        &harness,
        &params,
        None,
        &formals,
        &ref_kinds,
        &[
            Argument::typed(TypeId::INT),
            Argument::typed(TypeId::STRING),
        ],
        &mut diagnostics,
    );
    assert!(!result.success);

    let result = MethodTypeInferrer::infer(
        &env.db,
        &env.conversions,
        &harness,
        &harness,
        &params,
        None,
        &formals,
        &ref_kinds,
        &[Argument::typed(TypeId::INT), Argument::typed(TypeId::INT)],
        &mut diagnostics,
    );
    assert!(result.success);
    assert_eq!(result.inferred, vec![TypeId::INT]);
}

#[test]
fn exact_bound_still_pruned_by_lower_bounds() {
    let env = TestEnv::new();
    let harness = Harness::new();
    let params = env.method_params(&["T"]);
    let formals = [params[0], params[0]];
    let mut diagnostics = Diagnostics::new();

    // T is exactly int (out parameter) but also lower-bounded by string;
    // string never converts to int, so fixing fails.
    let result = MethodTypeInferrer::infer(
        &env.db,
        &env.conversions,
        &harness,
        &harness,
        &params,
        None,
        &formals,
        &[RefKind::Out, RefKind::Value],
        &[
            Argument::typed(TypeId::INT),
            Argument::typed(TypeId::STRING),
        ],
        &mut diagnostics,
    );
    assert!(!result.success);
}

#[test]
fn upper_bound_alone_fixes() {
    let env = TestEnv::new();
    let harness = Harness::new();
    let params = env.method_params(&["T"]);
    let formal = env.db.named(env.icomparer, vec![params[0]]);
    let result = run_inference(
        &env,
        &harness,
        &params,
        &[formal],
        &[Argument::typed(env.db.named(env.icomparer, vec![TypeId::STRING]))],
    );
    assert!(result.success);
    assert_eq!(result.inferred, vec![TypeId::STRING]);
}

#[test]
fn upper_bound_caps_lower_bounds() {
    let env = TestEnv::new();
    let harness = Harness::new();
    let params = env.method_params(&["T"]);
    let c = env.db.named(env.class_c, Vec::new());
    let d = env.db.named(env.class_d, Vec::new());

    // D flows in as a lower bound, C as an upper bound through the
    // contravariant comparer; C is the unique candidate both accept.
    let formals = [params[0], env.db.named(env.icomparer, vec![params[0]])];
    let result = run_inference(
        &env,
        &harness,
        &params,
        &formals,
        &[
            Argument::typed(d),
            Argument::typed(env.db.named(env.icomparer, vec![c])),
        ],
    );
    assert!(result.success);
    assert_eq!(result.inferred, vec![c]);
}

#[test]
fn incomparable_bounds_fail() {
    let env = TestEnv::new();
    let harness = Harness::new();
    let params = env.method_params(&["T"]);
    let formals = [params[0], params[0]];
    let result = run_inference(
        &env,
        &harness,
        &params,
        &formals,
        &[
            Argument::typed(env.list_of(TypeId::INT)),
            Argument::typed(env.list_of(TypeId::STRING)),
        ],
    );
    assert!(!result.success);
}

#[test]
fn array_rank_mismatch_contributes_nothing() {
    let env = TestEnv::new();
    let harness = Harness::new();
    let params = env.method_params(&["T"]);
    let result = run_inference(
        &env,
        &harness,
        &params,
        &[env.db.array(params[0], 2)],
        &[Argument::typed(env.db.vector(TypeId::INT))],
    );
    assert!(!result.success);

    let result = run_inference(
        &env,
        &harness,
        &params,
        &[env.db.array(params[0], 2)],
        &[Argument::typed(env.db.array(TypeId::INT, 2))],
    );
    assert!(result.success);
    assert_eq!(result.inferred, vec![TypeId::INT]);
}

#[test]
fn derived_classes_meet_at_base() {
    let env = TestEnv::new();
    let harness = Harness::new();
    let params = env.method_params(&["T"]);
    let c = env.db.named(env.class_c, Vec::new());
    let d = env.db.named(env.class_d, Vec::new());
    let result = run_inference(
        &env,
        &harness,
        &params,
        &[params[0], params[0]],
        &[Argument::typed(d), Argument::typed(c)],
    );
    assert!(result.success);
    assert_eq!(result.inferred, vec![c]);
}

#[test]
fn class_walk_finds_generic_base() {
    let env = TestEnv::new();
    let harness = Harness::new();
    let params = env.method_params(&["T"]);

    // class Base<T>; class Derived : Base<string>
    let (base_def, base_params) = env.declare_generic_class("Base", &["T"]);
    let derived = env.db.definitions().reserve();
    env.db.definitions().define(
        derived,
        Definition {
            name: env.db.intern_name("Derived"),
            kind: DefKind::Class,
            type_params: Vec::new(),
            variances: Vec::new(),
            base: Some(env.db.named(base_def, vec![TypeId::STRING])),
            interfaces: Vec::new(),
            delegate_shape: None,
            is_tuple_compatible: false,
            is_expression_tree: false,
        },
    );
    let _ = base_params;

    let pattern = env.db.named(base_def, vec![params[0]]);
    let result = run_inference(
        &env,
        &harness,
        &params,
        &[pattern],
        &[Argument::typed(env.db.named(derived, Vec::new()))],
    );
    assert!(result.success);
    assert_eq!(result.inferred, vec![TypeId::STRING]);
}

#[test]
fn empty_bound_set_fails() {
    let env = TestEnv::new();
    let harness = Harness::new();
    let params = env.method_params(&["T"]);
    let result = run_inference(
        &env,
        &harness,
        &params,
        &[TypeId::INT],
        &[Argument::typed(TypeId::INT)],
    );
    assert!(!result.success);
    match env.db.lookup(result.inferred[0]) {
        Some(TypeKey::Error(Some(name))) => {
            assert_eq!(&*env.db.resolve_name(name), "T");
        }
        other => panic!("expected named error placeholder, got {other:?}"),
    }
}

#[test]
fn null_typed_arguments_contribute_nothing() {
    let env = TestEnv::new();
    let harness = Harness::new();
    let params = env.method_params(&["T"]);
    let result = run_inference(
        &env,
        &harness,
        &params,
        &[params[0], params[0]],
        &[Argument::Expression(None), Argument::typed(TypeId::STRING)],
    );
    assert!(result.success);
    assert_eq!(result.inferred, vec![TypeId::STRING]);
}
