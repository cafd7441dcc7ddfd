//! Shared test harness: a small ambient type environment plus fake
//! collaborator hosts.
//!
//! The environment registers the shapes the engine's rules dispatch on:
//! a covariant `IEnumerable<T>` family wired up as the well-known array
//! interfaces, `List<T>`, a `C`/`D` class chain, a contravariant
//! comparer, `Func<..>` delegates, an expression-tree wrapper, and a
//! tuple-compatible nominal. Lambda and method-group hosts are
//! table-driven.

use crate::solver::conversions::StandardConversions;
use crate::solver::def::{DefId, DefKind, Definition};
use crate::solver::diagnostics::Diagnostics;
use crate::solver::expr::{
    Argument, LambdaId, LambdaReturnInference, MethodGroupId, MethodGroupResolver, UnboundLambda,
};
use crate::solver::infer::{MethodTypeInferenceResult, MethodTypeInferrer};
use crate::solver::intern::{TypeInterner, WellKnownDefs};
use crate::solver::types::*;
use crate::solver::TypeDatabase;
use rustc_hash::FxHashMap;

pub struct TestEnv {
    pub db: TypeInterner,
    pub conversions: StandardConversions,

    pub ienumerable: DefId,
    pub icollection: DefId,
    pub ilist: DefId,
    pub ireadonly_collection: DefId,
    pub ireadonly_list: DefId,
    pub list: DefId,
    pub class_c: DefId,
    pub class_d: DefId,
    pub icomparer: DefId,
    pub func0: DefId,
    pub func1: DefId,
    pub func2: DefId,
    pub expression: DefId,
    pub pair: DefId,
}

fn reserve_params(
    db: &TypeInterner,
    owner: DefId,
    params: &[(&str, VarianceKind)],
) -> Vec<TypeId> {
    params
        .iter()
        .enumerate()
        .map(|(ordinal, (name, variance))| {
            db.intern(TypeKey::TypeParameter(TypeParamInfo {
                name: db.intern_name(name),
                owner: TypeParamOwner::Definition(owner),
                ordinal: ordinal as u16,
                variance: *variance,
                constraints: TypeParamConstraints::empty(),
                constraint_types: Vec::new(),
            }))
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn define(
    db: &TypeInterner,
    id: DefId,
    name: &str,
    kind: DefKind,
    type_params: Vec<TypeId>,
    variances: Vec<VarianceKind>,
    base: Option<TypeId>,
    interfaces: Vec<TypeId>,
    delegate_shape: Option<FunctionShapeId>,
) {
    db.definitions().define(
        id,
        Definition {
            name: db.intern_name(name),
            kind,
            type_params,
            variances,
            base,
            interfaces,
            delegate_shape,
            is_tuple_compatible: false,
            is_expression_tree: false,
        },
    );
}

impl TestEnv {
    pub fn new() -> Self {
        let db = TypeInterner::new();

        // interface IEnumerable<out T>
        let ienumerable = db.definitions().reserve();
        let enum_params = reserve_params(&db, ienumerable, &[("T", VarianceKind::Out)]);
        define(
            &db,
            ienumerable,
            "IEnumerable",
            DefKind::Interface,
            enum_params.clone(),
            vec![VarianceKind::Out],
            None,
            Vec::new(),
            None,
        );

        // interface ICollection<T> : IEnumerable<T>
        let icollection = db.definitions().reserve();
        let coll_params = reserve_params(&db, icollection, &[("T", VarianceKind::Invariant)]);
        define(
            &db,
            icollection,
            "ICollection",
            DefKind::Interface,
            coll_params.clone(),
            vec![VarianceKind::Invariant],
            None,
            vec![db.named(ienumerable, vec![coll_params[0]])],
            None,
        );

        // interface IList<T> : ICollection<T>
        let ilist = db.definitions().reserve();
        let ilist_params = reserve_params(&db, ilist, &[("T", VarianceKind::Invariant)]);
        define(
            &db,
            ilist,
            "IList",
            DefKind::Interface,
            ilist_params.clone(),
            vec![VarianceKind::Invariant],
            None,
            vec![db.named(icollection, vec![ilist_params[0]])],
            None,
        );

        // interface IReadOnlyCollection<out T> : IEnumerable<T>
        let ireadonly_collection = db.definitions().reserve();
        let roc_params =
            reserve_params(&db, ireadonly_collection, &[("T", VarianceKind::Out)]);
        define(
            &db,
            ireadonly_collection,
            "IReadOnlyCollection",
            DefKind::Interface,
            roc_params.clone(),
            vec![VarianceKind::Out],
            None,
            vec![db.named(ienumerable, vec![roc_params[0]])],
            None,
        );

        // interface IReadOnlyList<out T> : IReadOnlyCollection<T>
        let ireadonly_list = db.definitions().reserve();
        let rol_params = reserve_params(&db, ireadonly_list, &[("T", VarianceKind::Out)]);
        define(
            &db,
            ireadonly_list,
            "IReadOnlyList",
            DefKind::Interface,
            rol_params.clone(),
            vec![VarianceKind::Out],
            None,
            vec![db.named(ireadonly_collection, vec![rol_params[0]])],
            None,
        );

        db.set_well_known(WellKnownDefs {
            ienumerable: Some(ienumerable),
            icollection: Some(icollection),
            ilist: Some(ilist),
            ireadonly_collection: Some(ireadonly_collection),
            ireadonly_list: Some(ireadonly_list),
        });

        // class List<T> : IList<T>
        let list = db.definitions().reserve();
        let list_params = reserve_params(&db, list, &[("T", VarianceKind::Invariant)]);
        define(
            &db,
            list,
            "List",
            DefKind::Class,
            list_params.clone(),
            vec![VarianceKind::Invariant],
            Some(TypeId::OBJECT),
            vec![db.named(ilist, vec![list_params[0]])],
            None,
        );

        // class C; class D : C
        let class_c = db.definitions().reserve();
        define(
            &db,
            class_c,
            "C",
            DefKind::Class,
            Vec::new(),
            Vec::new(),
            Some(TypeId::OBJECT),
            Vec::new(),
            None,
        );
        let class_d = db.definitions().reserve();
        define(
            &db,
            class_d,
            "D",
            DefKind::Class,
            Vec::new(),
            Vec::new(),
            Some(db.named(class_c, Vec::new())),
            Vec::new(),
            None,
        );

        // interface IComparer<in T>
        let icomparer = db.definitions().reserve();
        let cmp_params = reserve_params(&db, icomparer, &[("T", VarianceKind::In)]);
        define(
            &db,
            icomparer,
            "IComparer",
            DefKind::Interface,
            cmp_params,
            vec![VarianceKind::In],
            None,
            Vec::new(),
            None,
        );

        // delegate TResult Func<TResult>()
        let func0 = db.definitions().reserve();
        let func0_params = reserve_params(&db, func0, &[("TResult", VarianceKind::Out)]);
        let func0_shape = db.intern_function_shape(FunctionShape {
            params: Vec::new(),
            return_type: func0_params[0],
        });
        define(
            &db,
            func0,
            "Func",
            DefKind::Delegate,
            func0_params,
            vec![VarianceKind::Out],
            Some(TypeId::OBJECT),
            Vec::new(),
            Some(func0_shape),
        );

        // delegate TResult Func<T, TResult>(T arg)
        let func1 = db.definitions().reserve();
        let func1_params = reserve_params(
            &db,
            func1,
            &[("T", VarianceKind::In), ("TResult", VarianceKind::Out)],
        );
        let func1_shape = db.intern_function_shape(FunctionShape {
            params: vec![ParamInfo::by_value(func1_params[0])],
            return_type: func1_params[1],
        });
        define(
            &db,
            func1,
            "Func",
            DefKind::Delegate,
            func1_params,
            vec![VarianceKind::In, VarianceKind::Out],
            Some(TypeId::OBJECT),
            Vec::new(),
            Some(func1_shape),
        );

        // delegate TResult Func<T1, T2, TResult>(T1 arg1, T2 arg2)
        let func2 = db.definitions().reserve();
        let func2_params = reserve_params(
            &db,
            func2,
            &[
                ("T1", VarianceKind::In),
                ("T2", VarianceKind::In),
                ("TResult", VarianceKind::Out),
            ],
        );
        let func2_shape = db.intern_function_shape(FunctionShape {
            params: vec![
                ParamInfo::by_value(func2_params[0]),
                ParamInfo::by_value(func2_params[1]),
            ],
            return_type: func2_params[2],
        });
        define(
            &db,
            func2,
            "Func",
            DefKind::Delegate,
            func2_params,
            vec![
                VarianceKind::In,
                VarianceKind::In,
                VarianceKind::Out,
            ],
            Some(TypeId::OBJECT),
            Vec::new(),
            Some(func2_shape),
        );

        // class Expression<TDelegate> - expression tree wrapper
        let expression = db.definitions().reserve();
        let expr_params = reserve_params(&db, expression, &[("TDelegate", VarianceKind::Invariant)]);
        db.definitions().define(
            expression,
            Definition {
                name: db.intern_name("Expression"),
                kind: DefKind::Class,
                type_params: expr_params,
                variances: vec![VarianceKind::Invariant],
                base: Some(TypeId::OBJECT),
                interfaces: Vec::new(),
                delegate_shape: None,
                is_tuple_compatible: false,
                is_expression_tree: true,
            },
        );

        // struct Pair<T1, T2> - shape-compatible with the 2-tuple
        let pair = db.definitions().reserve();
        let pair_params = reserve_params(
            &db,
            pair,
            &[("T1", VarianceKind::Invariant), ("T2", VarianceKind::Invariant)],
        );
        db.definitions().define(
            pair,
            Definition {
                name: db.intern_name("Pair"),
                kind: DefKind::Struct,
                type_params: pair_params,
                variances: vec![VarianceKind::Invariant, VarianceKind::Invariant],
                base: None,
                interfaces: Vec::new(),
                delegate_shape: None,
                is_tuple_compatible: true,
                is_expression_tree: false,
            },
        );

        TestEnv {
            db,
            conversions: StandardConversions,
            ienumerable,
            icollection,
            ilist,
            ireadonly_collection,
            ireadonly_list,
            list,
            class_c,
            class_d,
            icomparer,
            func0,
            func1,
            func2,
            expression,
            pair,
        }
    }

    /// Declare a generic class `name<params..> : object` with invariant
    /// parameters and no interfaces; returns the definition and its
    /// type parameters.
    pub fn declare_generic_class(&self, name: &str, params: &[&str]) -> (DefId, Vec<TypeId>) {
        let id = self.db.definitions().reserve();
        let pairs: Vec<(&str, VarianceKind)> = params
            .iter()
            .map(|&param| (param, VarianceKind::Invariant))
            .collect();
        let type_params = reserve_params(&self.db, id, &pairs);
        define(
            &self.db,
            id,
            name,
            DefKind::Class,
            type_params.clone(),
            vec![VarianceKind::Invariant; params.len()],
            Some(TypeId::OBJECT),
            Vec::new(),
            None,
        );
        (id, type_params)
    }

    /// Fresh method type parameters in declaration order.
    pub fn method_params(&self, names: &[&str]) -> Vec<TypeId> {
        let method = self.db.definitions().fresh_method();
        names
            .iter()
            .enumerate()
            .map(|(ordinal, name)| {
                self.db.intern(TypeKey::TypeParameter(TypeParamInfo {
                    name: self.db.intern_name(name),
                    owner: TypeParamOwner::Method(method),
                    ordinal: ordinal as u16,
                    variance: VarianceKind::Invariant,
                    constraints: TypeParamConstraints::empty(),
                    constraint_types: Vec::new(),
                }))
            })
            .collect()
    }

    pub fn list_of(&self, element: TypeId) -> TypeId {
        self.db.named(self.list, vec![element])
    }

    pub fn enumerable_of(&self, element: TypeId) -> TypeId {
        self.db.named(self.ienumerable, vec![element])
    }

    pub fn func1_of(&self, arg: TypeId, result: TypeId) -> TypeId {
        self.db.named(self.func1, vec![arg, result])
    }

    pub fn unnamed_tuple(&self, elements: &[TypeId]) -> TypeId {
        self.db.tuple(
            elements
                .iter()
                .map(|&type_id| TupleElement::unnamed(type_id))
                .collect(),
        )
    }

    pub fn named_tuple(&self, elements: &[(TypeId, Option<&str>)]) -> TypeId {
        self.db.tuple(
            elements
                .iter()
                .map(|&(type_id, name)| TupleElement {
                    type_id,
                    name: name.map(|text| self.db.intern_name(text)),
                })
                .collect(),
        )
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Table-driven lambda analyzer.
pub enum LambdaSpec {
    /// The body's inferred return type is a constant.
    Returns(TypeId),
    /// Identity-style lambda: returns the type of the n-th delegate
    /// parameter after fixing.
    ReturnsParam(usize),
}

#[derive(Default)]
pub struct Harness {
    lambdas: FxHashMap<LambdaId, LambdaSpec>,
    method_groups: FxHashMap<MethodGroupId, Vec<(Vec<TypeId>, TypeId)>>,
    next_lambda: u32,
    next_group: u32,
}

impl Harness {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a lambda and produce an argument for it.
    pub fn lambda(&mut self, spec: LambdaSpec, explicit_param_types: Option<Vec<TypeId>>) -> Argument {
        let id = LambdaId(self.next_lambda);
        self.next_lambda += 1;
        self.lambdas.insert(id, spec);
        Argument::Lambda(UnboundLambda {
            id,
            explicit_param_types,
        })
    }

    /// Register a method group from (parameter types, return type)
    /// candidate signatures.
    pub fn method_group(&mut self, candidates: Vec<(Vec<TypeId>, TypeId)>) -> Argument {
        let id = MethodGroupId(self.next_group);
        self.next_group += 1;
        self.method_groups.insert(id, candidates);
        Argument::MethodGroup(id)
    }
}

impl LambdaReturnInference for Harness {
    fn inferred_return_type(
        &self,
        _db: &dyn TypeDatabase,
        lambda: LambdaId,
        fixed_delegate: &FunctionShape,
        _diagnostics: &mut Diagnostics,
    ) -> Option<TypeId> {
        match self.lambdas.get(&lambda)? {
            LambdaSpec::Returns(type_id) => Some(*type_id),
            LambdaSpec::ReturnsParam(index) => {
                fixed_delegate.params.get(*index).map(|param| param.type_id)
            }
        }
    }
}

impl MethodGroupResolver for Harness {
    fn resolve_return_type(
        &self,
        _db: &dyn TypeDatabase,
        group: MethodGroupId,
        delegate_params: &[ParamInfo],
        _diagnostics: &mut Diagnostics,
    ) -> Option<TypeId> {
        let candidates = self.method_groups.get(&group)?;
        let mut matched = None;
        for (params, return_type) in candidates {
            let applicable = params.len() == delegate_params.len()
                && params
                    .iter()
                    .zip(delegate_params.iter())
                    .all(|(&candidate, delegate_param)| candidate == delegate_param.type_id);
            if applicable {
                if matched.is_some() {
                    return None;
                }
                matched = Some(*return_type);
            }
        }
        matched
    }
}

/// Run full inference with default (by-value) ref kinds and no
/// containing type.
pub fn run_inference(
    env: &TestEnv,
    harness: &Harness,
    method_params: &[TypeId],
    formals: &[TypeId],
    arguments: &[Argument],
) -> MethodTypeInferenceResult {
    let mut diagnostics = Diagnostics::new();
    MethodTypeInferrer::infer(
        &env.db,
        &env.conversions,
        harness,
        harness,
        method_params,
        None,
        formals,
        &[],
        arguments,
        &mut diagnostics,
    )
}
