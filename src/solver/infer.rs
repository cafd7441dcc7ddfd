//! Method type inference.
//!
//! Given a call `M(e1..em)` to a generic method `M<X1..Xn>(T1 p1 .. Tm pm)`
//! with no explicit type arguments, infer a unique assignment `Xi -> Si`
//! or fail. The result feeds overload resolution; failure merely
//! disqualifies the candidate and is not itself an error.
//!
//! The algorithm is a two-phase fixed point:
//!
//! - **Phase one** walks argument/parameter pairs and collects exact or
//!   lower bounds from argument types (exact when the parameter is
//!   by-ref), plus exact bounds from explicitly typed lambda parameter
//!   lists. Tuple literals recurse element-wise.
//! - **Phase two** repeats: make output inferences for lambda and
//!   method-group arguments whose delegate inputs no longer mention
//!   unfixed parameters, then fix every parameter that has bounds and
//!   depends on nothing, else fix those others depend on. Each round
//!   either finishes, fails, or fixes at least one parameter, so the
//!   loop runs at most `n` times.
//!
//! Dependencies between unfixed parameters come from delegate-typed
//! arguments: `Xi` depends on `Xj` when some argument has `Xj` in an
//! input position and `Xi` in an output position. The relation is closed
//! transitively and maintained lazily across fixes.
//!
//! Bounds are reconciled by [`fix_parameter`](MethodTypeInferrer): the
//! candidate set is pruned by implicit-convertibility against every
//! bound, and the unique candidate every survivor converts to wins.
//! Candidates that differ only by `object`/`dynamic` or by tuple element
//! names merge instead of tying, dynamic-ness winning per position.

use crate::solver::conversions::ConversionOracle;
use crate::solver::def::{DefId, DefKind, Definition};
use crate::solver::diagnostics::Diagnostics;
use crate::solver::expr::{
    Argument, LambdaReturnInference, MethodGroupId, MethodGroupResolver, UnboundLambda,
};
use crate::solver::facts;
use crate::solver::instantiate::TypeSubstitution;
use crate::solver::merge;
use crate::solver::types::*;
use crate::solver::TypeDatabase;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::{debug, trace};

/// Outcome of a full inference run.
#[derive(Clone, Debug)]
pub struct MethodTypeInferenceResult {
    pub success: bool,
    /// One entry per method type parameter. On failure, slots that could
    /// not be fixed hold a named error placeholder.
    pub inferred: Vec<TypeId>,
}

/// Insertion-ordered bound set; membership is strict type identity.
type BoundSet = SmallVec<[TypeId; 4]>;

/// Dependency state between two method type parameters.
///
/// `Direct` and `Indirect` share a bit so "depends at all" is a single
/// mask test; `Unknown` entries are re-deduced on demand after a fix
/// invalidates the transitive closure.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
enum Dependency {
    Unknown = 0x00,
    NotDependent = 0x01,
    Direct = 0x11,
    Indirect = 0x12,
}

impl Dependency {
    const DEPENDS_MASK: u8 = 0x10;

    fn depends(self) -> bool {
        (self as u8) & Self::DEPENDS_MASK != 0
    }
}

/// Which bound a recursive inference step records.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum BoundKind {
    Exact,
    Lower,
    Upper,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FixOutcome {
    MadeProgress,
    NoProgress,
    Failed,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum SecondPhaseOutcome {
    Success,
    MadeProgress,
    Failed,
}

/// A candidate entry during fixing. The key is the first-seen
/// representative used for comparator lookups; the value accumulates
/// merges.
#[derive(Copy, Clone, Debug)]
struct Candidate {
    key: TypeId,
    value: TypeId,
}

fn is_really_a_type(type_id: TypeId) -> bool {
    type_id != TypeId::NONE && !type_id.is_error() && !type_id.is_void()
}

/// Per-call inference engine. Constructed on entry, mutated only by the
/// engine, discarded after result extraction. Single-threaded.
pub struct MethodTypeInferrer<'a> {
    db: &'a dyn TypeDatabase,
    conversions: &'a dyn ConversionOracle,
    lambdas: &'a dyn LambdaReturnInference,
    method_groups: &'a dyn MethodGroupResolver,

    /// The method's type parameters, as interned `TypeParameter` ids, in
    /// declaration order.
    method_type_params: Vec<TypeId>,
    /// Fully constructed containing type of the method; used when
    /// substituting into delegate parameter types so enclosing-scope
    /// type parameters resolve to their bound arguments.
    containing_type: Option<TypeId>,
    /// The original, uninstantiated formal parameter types.
    formal_param_types: Vec<TypeId>,
    /// Pass kinds per formal; empty means all by value.
    formal_param_ref_kinds: Vec<RefKind>,
    arguments: Vec<Argument>,

    fixed_results: Vec<Option<TypeId>>,
    exact_bounds: Vec<Option<BoundSet>>,
    lower_bounds: Vec<Option<BoundSet>>,
    upper_bounds: Vec<Option<BoundSet>>,

    /// `n * n` row-major matrix; `None` until phase two initializes it.
    dependencies: Option<Vec<Dependency>>,
    dependencies_dirty: bool,
}

impl<'a> MethodTypeInferrer<'a> {
    /// Infer type arguments for a full call. `formal_parameter_types` is
    /// the original (unconstructed with respect to the inferred
    /// parameters) signature; excess arguments or parameters beyond the
    /// shorter of the two lists are ignored.
    #[allow(clippy::too_many_arguments)]
    pub fn infer(
        db: &'a dyn TypeDatabase,
        conversions: &'a dyn ConversionOracle,
        lambdas: &'a dyn LambdaReturnInference,
        method_groups: &'a dyn MethodGroupResolver,
        method_type_parameters: &[TypeId],
        containing_type: Option<TypeId>,
        formal_parameter_types: &[TypeId],
        formal_parameter_ref_kinds: &[RefKind],
        arguments: &[Argument],
        diagnostics: &mut Diagnostics,
    ) -> MethodTypeInferenceResult {
        let mut inferrer = Self::new(
            db,
            conversions,
            lambdas,
            method_groups,
            method_type_parameters,
            containing_type,
            formal_parameter_types,
            formal_parameter_ref_kinds,
            arguments,
        );

        // A generic method with no formals has nothing to infer from.
        if inferrer.formal_param_types.is_empty() && !inferrer.method_type_params.is_empty() {
            return MethodTypeInferenceResult {
                success: false,
                inferred: inferrer.get_results(),
            };
        }

        let success = inferrer.infer_type_args(diagnostics);
        MethodTypeInferenceResult {
            success,
            inferred: inferrer.get_results(),
        }
    }

    /// Partial inference from the first argument only, for
    /// extension-method probing. Every type parameter mentioned in the
    /// first formal must fix successfully; parameters it does not
    /// mention stay `None`.
    #[allow(clippy::too_many_arguments)]
    pub fn infer_from_first_argument(
        db: &'a dyn TypeDatabase,
        conversions: &'a dyn ConversionOracle,
        lambdas: &'a dyn LambdaReturnInference,
        method_groups: &'a dyn MethodGroupResolver,
        method_type_parameters: &[TypeId],
        containing_type: Option<TypeId>,
        formal_parameter_types: &[TypeId],
        arguments: &[Argument],
        diagnostics: &mut Diagnostics,
    ) -> Option<Vec<Option<TypeId>>> {
        if formal_parameter_types.is_empty() || arguments.is_empty() {
            return None;
        }

        let mut inferrer = Self::new(
            db,
            conversions,
            lambdas,
            method_groups,
            method_type_parameters,
            containing_type,
            formal_parameter_types,
            &[],
            arguments,
        );

        let source = inferrer.arguments[0].type_of()?;
        if !is_really_a_type(source) {
            return None;
        }
        let target = inferrer.formal_param_types[0];
        inferrer.lower_bound_inference(source, target);

        // Every type parameter the first formal mentions must come out
        // fixed; the rest may stay unassigned.
        for index in 0..inferrer.method_type_params.len() {
            let param = inferrer.method_type_params[index];
            if !facts::contains_type_parameter(db, target, param) {
                continue;
            }
            if !inferrer.has_bound(index) || !inferrer.fix_parameter(index, diagnostics) {
                return None;
            }
        }

        Some(inferrer.fixed_results)
    }

    #[allow(clippy::too_many_arguments)]
    fn new(
        db: &'a dyn TypeDatabase,
        conversions: &'a dyn ConversionOracle,
        lambdas: &'a dyn LambdaReturnInference,
        method_groups: &'a dyn MethodGroupResolver,
        method_type_parameters: &[TypeId],
        containing_type: Option<TypeId>,
        formal_parameter_types: &[TypeId],
        formal_parameter_ref_kinds: &[RefKind],
        arguments: &[Argument],
    ) -> Self {
        let count = method_type_parameters.len();
        MethodTypeInferrer {
            db,
            conversions,
            lambdas,
            method_groups,
            method_type_params: method_type_parameters.to_vec(),
            containing_type,
            formal_param_types: formal_parameter_types.to_vec(),
            formal_param_ref_kinds: formal_parameter_ref_kinds.to_vec(),
            arguments: arguments.to_vec(),
            fixed_results: vec![None; count],
            exact_bounds: vec![None; count],
            lower_bounds: vec![None; count],
            upper_bounds: vec![None; count],
            dependencies: None,
            dependencies_dirty: false,
        }
    }

    // =========================================================================
    // State helpers
    // =========================================================================

    fn param_count(&self) -> usize {
        self.method_type_params.len()
    }

    fn number_of_arguments_to_process(&self) -> usize {
        self.arguments.len().min(self.formal_param_types.len())
    }

    fn ref_kind(&self, index: usize) -> RefKind {
        self.formal_param_ref_kinds
            .get(index)
            .copied()
            .unwrap_or(RefKind::Value)
    }

    fn is_unfixed(&self, index: usize) -> bool {
        self.fixed_results[index].is_none()
    }

    fn all_fixed(&self) -> bool {
        self.fixed_results.iter().all(|slot| slot.is_some())
    }

    fn has_bound(&self, index: usize) -> bool {
        let non_empty =
            |slot: &Option<BoundSet>| slot.as_ref().map(|set| !set.is_empty()).unwrap_or(false);
        non_empty(&self.exact_bounds[index])
            || non_empty(&self.lower_bounds[index])
            || non_empty(&self.upper_bounds[index])
    }

    /// Index of `type_id` among this method's *unfixed* type parameters.
    fn unfixed_param_index(&self, type_id: TypeId) -> Option<usize> {
        self.method_type_params
            .iter()
            .position(|&param| param == type_id)
            .filter(|&index| self.is_unfixed(index))
    }

    fn add_bound(&mut self, kind: BoundKind, index: usize, bound: TypeId) {
        let slot = match kind {
            BoundKind::Exact => &mut self.exact_bounds[index],
            BoundKind::Lower => &mut self.lower_bounds[index],
            BoundKind::Upper => &mut self.upper_bounds[index],
        };
        let set = slot.get_or_insert_with(SmallVec::new);
        if !set.contains(&bound) {
            trace!(?kind, index, bound = bound.0, "add bound");
            set.push(bound);
        }
    }

    // =========================================================================
    // Driver
    // =========================================================================

    fn infer_type_args(&mut self, diagnostics: &mut Diagnostics) -> bool {
        self.infer_type_args_first_phase(diagnostics);
        self.infer_type_args_second_phase(diagnostics)
    }

    // =========================================================================
    // Phase one
    // =========================================================================

    fn infer_type_args_first_phase(&mut self, diagnostics: &mut Diagnostics) {
        for index in 0..self.number_of_arguments_to_process() {
            let argument = self.arguments[index].clone();
            let target = self.formal_param_types[index];
            // By-ref arguments must match exactly; by-value arguments
            // may convert up, so they only pin a lower bound.
            let kind = if self.ref_kind(index).is_by_value() {
                BoundKind::Lower
            } else {
                BoundKind::Exact
            };
            self.make_argument_inference(&argument, target, kind, diagnostics);
        }
    }

    fn make_argument_inference(
        &mut self,
        argument: &Argument,
        target: TypeId,
        kind: BoundKind,
        diagnostics: &mut Diagnostics,
    ) {
        match argument {
            Argument::Lambda(lambda) => {
                self.explicit_parameter_type_inference(lambda, target);
            }
            Argument::TupleLiteral(elements) => {
                self.make_tuple_literal_inferences(elements, target, kind, diagnostics);
            }
            _ => {
                if let Some(source) = argument.type_of() {
                    if is_really_a_type(source) {
                        self.exact_or_bounds_inference(kind, source, target);
                    }
                }
            }
        }
    }

    /// Element-wise inference for a tuple literal against a
    /// tuple-compatible target of the same cardinality, carrying the
    /// exactness of the enclosing argument position.
    fn make_tuple_literal_inferences(
        &mut self,
        elements: &[Argument],
        target: TypeId,
        kind: BoundKind,
        diagnostics: &mut Diagnostics,
    ) -> bool {
        let Some(target_elements) = facts::tuple_elements(self.db, target, elements.len()) else {
            return false;
        };
        for (element, target_element) in elements.iter().zip(target_elements.iter()) {
            self.make_argument_inference(element, target_element.type_id, kind, diagnostics);
        }
        true
    }

    /// Exact inference between an explicitly typed lambda's parameter
    /// types and the target delegate's. A ref-kind mismatch does not
    /// abort inference; the call fails applicability later instead.
    fn explicit_parameter_type_inference(&mut self, lambda: &UnboundLambda, target: TypeId) {
        let Some(param_types) = &lambda.explicit_param_types else {
            return;
        };
        let Some(delegate) = facts::delegate_shape(self.db, target) else {
            return;
        };
        let count = param_types.len().min(delegate.params.len());
        for index in 0..count {
            self.exact_inference(param_types[index], delegate.params[index].type_id);
        }
    }

    // =========================================================================
    // Phase two
    // =========================================================================

    fn infer_type_args_second_phase(&mut self, diagnostics: &mut Diagnostics) -> bool {
        self.initialize_dependencies();
        loop {
            match self.do_second_phase(diagnostics) {
                SecondPhaseOutcome::Success => return true,
                SecondPhaseOutcome::Failed => return false,
                SecondPhaseOutcome::MadeProgress => {}
            }
        }
    }

    fn do_second_phase(&mut self, diagnostics: &mut Diagnostics) -> SecondPhaseOutcome {
        if self.all_fixed() {
            return SecondPhaseOutcome::Success;
        }
        self.make_output_type_inferences(diagnostics);
        match self.fix_nondependent_parameters(diagnostics) {
            FixOutcome::Failed => SecondPhaseOutcome::Failed,
            FixOutcome::MadeProgress => SecondPhaseOutcome::MadeProgress,
            FixOutcome::NoProgress => match self.fix_dependent_parameters(diagnostics) {
                FixOutcome::Failed => SecondPhaseOutcome::Failed,
                FixOutcome::MadeProgress => SecondPhaseOutcome::MadeProgress,
                // Unfixed parameters remain but nothing can move.
                FixOutcome::NoProgress => SecondPhaseOutcome::Failed,
            },
        }
    }

    fn make_output_type_inferences(&mut self, diagnostics: &mut Diagnostics) {
        for index in 0..self.number_of_arguments_to_process() {
            let argument = self.arguments[index].clone();
            let formal = self.formal_param_types[index];
            self.make_output_type_inference(&argument, formal, diagnostics);
        }
    }

    fn make_output_type_inference(
        &mut self,
        argument: &Argument,
        formal: TypeId,
        diagnostics: &mut Diagnostics,
    ) {
        // Tuple literals have no natural type; recurse element-wise.
        if let Argument::TupleLiteral(elements) = argument {
            if let Some(target_elements) = facts::tuple_elements(self.db, formal, elements.len()) {
                for (element, target_element) in elements.iter().zip(target_elements.iter()) {
                    self.make_output_type_inference(element, target_element.type_id, diagnostics);
                }
            }
            return;
        }
        if self.has_unfixed_param_in_output_type(argument, formal)
            && !self.has_unfixed_param_in_input_type(argument, formal)
        {
            self.output_type_inference(argument, formal, diagnostics);
        }
    }

    fn output_type_inference(
        &mut self,
        argument: &Argument,
        formal: TypeId,
        diagnostics: &mut Diagnostics,
    ) {
        if let Argument::Lambda(lambda) = argument {
            if self.inferred_return_type_inference(lambda, formal, diagnostics) {
                return;
            }
        }
        if let Argument::MethodGroup(group) = argument {
            if self.method_group_return_type_inference(*group, formal, diagnostics) {
                return;
            }
        }
        if let Some(source) = argument.type_of() {
            if is_really_a_type(source) {
                self.lower_bound_inference(source, formal);
            }
        }
    }

    /// Lambda output inference: once the delegate's inputs are free of
    /// unfixed parameters, substitute the current fixed results into
    /// them and ask the lambda analyzer for the body's return type. The
    /// bound lands on the *original* delegate return type, which is
    /// where the unfixed parameters still live.
    fn inferred_return_type_inference(
        &mut self,
        lambda: &UnboundLambda,
        target: TypeId,
        diagnostics: &mut Diagnostics,
    ) -> bool {
        let Some(delegate) = facts::delegate_shape(self.db, target) else {
            return false;
        };
        if delegate.return_type == TypeId::NONE || delegate.return_type.is_void() {
            return false;
        }
        let fixed_delegate = self.get_fixed_delegate_shape(&delegate);
        let Some(inferred) =
            self.lambdas
                .inferred_return_type(self.db, lambda.id, &fixed_delegate, diagnostics)
        else {
            return false;
        };
        if !is_really_a_type(inferred) {
            return false;
        }
        trace!(lambda = lambda.id.0, inferred = inferred.0, "lambda return inference");
        self.lower_bound_inference(inferred, delegate.return_type);
        true
    }

    /// Method-group output inference: resolve the group against the
    /// fixed delegate parameters; a unique best method contributes its
    /// return type as a lower bound on the delegate return.
    fn method_group_return_type_inference(
        &mut self,
        group: MethodGroupId,
        target: TypeId,
        diagnostics: &mut Diagnostics,
    ) -> bool {
        let Some(delegate) = facts::delegate_shape(self.db, target) else {
            return false;
        };
        if delegate.return_type == TypeId::NONE || delegate.return_type.is_void() {
            return false;
        }
        let fixed_delegate = self.get_fixed_delegate_shape(&delegate);
        let Some(return_type) = self.method_groups.resolve_return_type(
            self.db,
            group,
            &fixed_delegate.params,
            diagnostics,
        ) else {
            return false;
        };
        if !is_really_a_type(return_type) {
            return false;
        }
        trace!(group = group.0, return_type = return_type.0, "method group return inference");
        self.lower_bound_inference(return_type, delegate.return_type);
        true
    }

    /// Substitute the containing type's arguments for its parameters and
    /// the current fixed results for the method's parameters. Unfixed
    /// method parameters stand for themselves; they are legal in output
    /// positions.
    fn get_fixed_delegate_shape(&self, shape: &FunctionShape) -> FunctionShape {
        let mut substitution = TypeSubstitution::new();
        if let Some(containing) = self.containing_type {
            if let Some(app) = facts::named_application(self.db, containing) {
                if let Some(def) = self.db.definition(app.def) {
                    for (&param, &arg) in def.type_params.iter().zip(app.args.iter()) {
                        substitution.insert(param, arg);
                    }
                }
            }
        }
        for (index, &param) in self.method_type_params.iter().enumerate() {
            if let Some(fixed) = self.fixed_results[index] {
                substitution.insert(param, fixed);
            }
        }
        substitution
            .apply_to_shape(self.db, shape, 0)
            .unwrap_or_else(|| shape.clone())
    }

    // =========================================================================
    // Input/output analysis
    // =========================================================================

    /// Input types exist only for lambda and method-group arguments
    /// against delegate targets: the delegate's parameter types.
    fn does_input_type_contain(&self, argument: &Argument, formal: TypeId, param: TypeId) -> bool {
        if !argument.is_lambda_or_method_group() {
            return false;
        }
        let Some(delegate) = facts::delegate_shape(self.db, formal) else {
            return false;
        };
        delegate
            .params
            .iter()
            .any(|p| facts::contains_type_parameter(self.db, p.type_id, param))
    }

    /// Output types are the matching delegate's return type.
    fn does_output_type_contain(&self, argument: &Argument, formal: TypeId, param: TypeId) -> bool {
        if !argument.is_lambda_or_method_group() {
            return false;
        }
        let Some(delegate) = facts::delegate_shape(self.db, formal) else {
            return false;
        };
        facts::contains_type_parameter(self.db, delegate.return_type, param)
    }

    fn has_unfixed_param_in_input_type(&self, argument: &Argument, formal: TypeId) -> bool {
        (0..self.param_count()).any(|index| {
            self.is_unfixed(index)
                && self.does_input_type_contain(argument, formal, self.method_type_params[index])
        })
    }

    fn has_unfixed_param_in_output_type(&self, argument: &Argument, formal: TypeId) -> bool {
        (0..self.param_count()).any(|index| {
            self.is_unfixed(index)
                && self.does_output_type_contain(argument, formal, self.method_type_params[index])
        })
    }

    // =========================================================================
    // Dependency graph
    // =========================================================================

    fn initialize_dependencies(&mut self) {
        debug_assert!(self.dependencies.is_none());
        let count = self.param_count();
        let mut matrix = vec![Dependency::Unknown; count * count];
        for i in 0..count {
            for j in 0..count {
                if self.depends_directly_on(i, j) {
                    matrix[i * count + j] = Dependency::Direct;
                }
            }
        }
        self.dependencies = Some(matrix);
        self.deduce_all_dependencies();
    }

    /// `Xi` depends directly on `Xj` when some argument/parameter pair
    /// has `Xj` in its input types and `Xi` in its output types.
    fn depends_directly_on(&self, i: usize, j: usize) -> bool {
        for index in 0..self.number_of_arguments_to_process() {
            let argument = &self.arguments[index];
            let formal = self.formal_param_types[index];
            if self.does_input_type_contain(argument, formal, self.method_type_params[j])
                && self.does_output_type_contain(argument, formal, self.method_type_params[i])
            {
                return true;
            }
        }
        false
    }

    fn dependency(&self, i: usize, j: usize) -> Dependency {
        let count = self.param_count();
        self.dependencies
            .as_ref()
            .map(|matrix| matrix[i * count + j])
            .unwrap_or(Dependency::Unknown)
    }

    fn set_dependency(&mut self, i: usize, j: usize, value: Dependency) {
        let count = self.param_count();
        if let Some(matrix) = self.dependencies.as_mut() {
            matrix[i * count + j] = value;
        }
    }

    fn depends_transitively_on(&self, i: usize, j: usize) -> bool {
        (0..self.param_count())
            .any(|k| self.dependency(i, k).depends() && self.dependency(k, j).depends())
    }

    fn deduce_all_dependencies(&mut self) {
        while self.deduce_dependencies() {}
        self.set_unknowns_to_not_dependent();
        self.dependencies_dirty = false;
    }

    fn deduce_dependencies(&mut self) -> bool {
        let count = self.param_count();
        let mut made_progress = false;
        for i in 0..count {
            for j in 0..count {
                if self.dependency(i, j) == Dependency::Unknown
                    && self.depends_transitively_on(i, j)
                {
                    self.set_dependency(i, j, Dependency::Indirect);
                    made_progress = true;
                }
            }
        }
        made_progress
    }

    fn set_unknowns_to_not_dependent(&mut self) {
        if let Some(matrix) = self.dependencies.as_mut() {
            for entry in matrix.iter_mut() {
                if *entry == Dependency::Unknown {
                    *entry = Dependency::NotDependent;
                }
            }
        }
    }

    fn set_indirects_to_unknown(&mut self) {
        if let Some(matrix) = self.dependencies.as_mut() {
            for entry in matrix.iter_mut() {
                if *entry == Dependency::Indirect {
                    *entry = Dependency::Unknown;
                }
            }
        }
    }

    fn depends_on(&mut self, i: usize, j: usize) -> bool {
        if self.dependencies.is_none() {
            return false;
        }
        if self.dependencies_dirty {
            self.set_indirects_to_unknown();
            self.deduce_all_dependencies();
        }
        self.dependency(i, j).depends()
    }

    fn depends_on_any(&mut self, i: usize) -> bool {
        (0..self.param_count()).any(|j| self.depends_on(i, j))
    }

    fn any_depends_on(&mut self, i: usize) -> bool {
        (0..self.param_count()).any(|j| self.depends_on(j, i))
    }

    /// After fixing, the parameter participates in no dependencies; the
    /// surviving indirect entries are invalidated and re-deduced on the
    /// next query.
    fn update_dependencies_after_fix(&mut self, index: usize) {
        if self.dependencies.is_none() {
            return;
        }
        for other in 0..self.param_count() {
            self.set_dependency(index, other, Dependency::NotDependent);
            self.set_dependency(other, index, Dependency::NotDependent);
        }
        self.dependencies_dirty = true;
    }

    // =========================================================================
    // Fixing passes
    // =========================================================================

    fn fix_nondependent_parameters(&mut self, diagnostics: &mut Diagnostics) -> FixOutcome {
        self.fix_parameters(|inferrer, index| !inferrer.depends_on_any(index), diagnostics)
    }

    fn fix_dependent_parameters(&mut self, diagnostics: &mut Diagnostics) -> FixOutcome {
        self.fix_parameters(|inferrer, index| inferrer.any_depends_on(index), diagnostics)
    }

    /// Fix every unfixed parameter with bounds that satisfies the
    /// predicate. A fix failure fails inference, but the remaining
    /// parameters are still attempted so callers see the best partial
    /// assignment.
    fn fix_parameters(
        &mut self,
        predicate: impl Fn(&mut Self, usize) -> bool,
        diagnostics: &mut Diagnostics,
    ) -> FixOutcome {
        let count = self.param_count();
        let mut needs_fixing = vec![false; count];
        let mut any = false;
        for index in 0..count {
            if self.is_unfixed(index) && self.has_bound(index) && predicate(self, index) {
                needs_fixing[index] = true;
                any = true;
            }
        }
        if !any {
            return FixOutcome::NoProgress;
        }

        let mut outcome = FixOutcome::MadeProgress;
        for index in 0..count {
            if needs_fixing[index] && !self.fix_parameter(index, diagnostics) {
                outcome = FixOutcome::Failed;
            }
        }
        outcome
    }

    // =========================================================================
    // Inference rules
    // =========================================================================

    fn exact_or_bounds_inference(&mut self, kind: BoundKind, source: TypeId, target: TypeId) {
        match kind {
            BoundKind::Exact => self.exact_inference(source, target),
            BoundKind::Lower => self.lower_bound_inference(source, target),
            BoundKind::Upper => self.upper_bound_inference(source, target),
        }
    }

    // ----- Exact -----

    fn exact_inference(&mut self, source: TypeId, target: TypeId) {
        if self.exact_type_parameter_inference(source, target) {
            return;
        }
        if self.exact_array_inference(source, target) {
            return;
        }
        if self.exact_nullable_inference(source, target) {
            return;
        }
        if self.exact_tuple_inference(source, target) {
            return;
        }
        if self.exact_delegate_inference(source, target) {
            return;
        }
        self.exact_constructed_inference(source, target);
    }

    fn exact_type_parameter_inference(&mut self, source: TypeId, target: TypeId) -> bool {
        if let Some(index) = self.unfixed_param_index(target) {
            self.add_bound(BoundKind::Exact, index, source);
            return true;
        }
        false
    }

    fn exact_array_inference(&mut self, source: TypeId, target: TypeId) -> bool {
        let (Some((source_element, source_rank)), Some((target_element, target_rank))) = (
            facts::array_element(self.db, source),
            facts::array_element(self.db, target),
        ) else {
            return false;
        };
        if source_rank != target_rank {
            return false;
        }
        self.exact_inference(source_element, target_element);
        true
    }

    fn exact_nullable_inference(&mut self, source: TypeId, target: TypeId) -> bool {
        let (Some(source_underlying), Some(target_underlying)) = (
            facts::nullable_underlying(self.db, source),
            facts::nullable_underlying(self.db, target),
        ) else {
            return false;
        };
        self.exact_inference(source_underlying, target_underlying);
        true
    }

    fn exact_tuple_inference(&mut self, source: TypeId, target: TypeId) -> bool {
        self.tuple_inference(BoundKind::Exact, source, target)
    }

    /// Element-wise recursion between tuples or tuple-compatible
    /// nominals of equal cardinality. Element names play no part.
    fn tuple_inference(&mut self, kind: BoundKind, source: TypeId, target: TypeId) -> bool {
        let Some(cardinality) = facts::tuple_cardinality(self.db, source) else {
            return false;
        };
        let (Some(source_elements), Some(target_elements)) = (
            facts::tuple_elements(self.db, source, cardinality),
            facts::tuple_elements(self.db, target, cardinality),
        ) else {
            return false;
        };
        for (source_element, target_element) in source_elements.iter().zip(target_elements.iter()) {
            self.exact_or_bounds_inference(kind, source_element.type_id, target_element.type_id);
        }
        true
    }

    /// Structural delegate shapes: parameter-for-parameter with matching
    /// ref kinds, everything exact.
    fn exact_delegate_inference(&mut self, source: TypeId, target: TypeId) -> bool {
        let Some((source_shape, target_shape)) = self.delegate_shape_pair(source, target) else {
            return false;
        };
        for (source_param, target_param) in
            source_shape.params.iter().zip(target_shape.params.iter())
        {
            self.exact_inference(source_param.type_id, target_param.type_id);
        }
        self.exact_inference(source_shape.return_type, target_shape.return_type);
        true
    }

    /// Both sides structural delegates with identical arity and ref
    /// kinds, else no inference.
    fn delegate_shape_pair(
        &self,
        source: TypeId,
        target: TypeId,
    ) -> Option<(Arc<FunctionShape>, Arc<FunctionShape>)> {
        let (Some(TypeKey::Delegate(source_id)), Some(TypeKey::Delegate(target_id))) =
            (self.db.lookup(source), self.db.lookup(target))
        else {
            return None;
        };
        let source_shape = self.db.function_shape(source_id)?;
        let target_shape = self.db.function_shape(target_id)?;
        if source_shape.params.len() != target_shape.params.len() {
            return None;
        }
        let ref_kinds_match = source_shape
            .params
            .iter()
            .zip(target_shape.params.iter())
            .all(|(p, q)| p.ref_kind == q.ref_kind);
        if !ref_kinds_match {
            return None;
        }
        Some((source_shape, target_shape))
    }

    fn exact_constructed_inference(&mut self, source: TypeId, target: TypeId) -> bool {
        let (Some(source_app), Some(target_app)) = (
            facts::named_application(self.db, source),
            facts::named_application(self.db, target),
        ) else {
            return false;
        };
        if source_app.def != target_app.def {
            return false;
        }
        self.exact_type_argument_inference(&source_app, &target_app);
        true
    }

    fn exact_type_argument_inference(
        &mut self,
        source_app: &TypeApplication,
        target_app: &TypeApplication,
    ) {
        for (&source_arg, &target_arg) in source_app.args.iter().zip(target_app.args.iter()) {
            self.exact_inference(source_arg, target_arg);
        }
    }

    // ----- Lower bound -----

    fn lower_bound_inference(&mut self, source: TypeId, target: TypeId) {
        if self.lower_bound_type_parameter_inference(source, target) {
            return;
        }
        if self.lower_bound_array_inference(source, target) {
            return;
        }
        if self.lower_bound_nullable_inference(source, target) {
            return;
        }
        if self.tuple_inference(BoundKind::Lower, source, target) {
            return;
        }
        if self.lower_bound_delegate_inference(source, target) {
            return;
        }
        self.lower_bound_constructed_inference(source, target);
    }

    fn lower_bound_type_parameter_inference(&mut self, source: TypeId, target: TypeId) -> bool {
        if let Some(index) = self.unfixed_param_index(target) {
            self.add_bound(BoundKind::Lower, index, source);
            return true;
        }
        false
    }

    /// Arrays match arrays of the same rank; a rank-1 array also matches
    /// the canonical array interfaces. Element inference is lower-bound
    /// for reference elements (array covariance) and exact otherwise.
    fn lower_bound_array_inference(&mut self, source: TypeId, target: TypeId) -> bool {
        let Some((source_element, source_rank)) = facts::array_element(self.db, source) else {
            return false;
        };

        if let Some((target_element, target_rank)) = facts::array_element(self.db, target) {
            if source_rank != target_rank {
                return false;
            }
            self.array_element_inference(BoundKind::Lower, source_element, target_element);
            return true;
        }

        if source_rank == 1 {
            if let Some(target_app) = facts::named_application(self.db, target) {
                if target_app.args.len() == 1
                    && self.db.array_interface_defs().contains(&target_app.def)
                {
                    self.array_element_inference(BoundKind::Lower, source_element, target_app.args[0]);
                    return true;
                }
            }
        }
        false
    }

    fn array_element_inference(&mut self, kind: BoundKind, source: TypeId, target: TypeId) {
        if facts::is_reference_type(self.db, source) {
            self.exact_or_bounds_inference(kind, source, target);
        } else {
            self.exact_inference(source, target);
        }
    }

    /// Both nullable: recurse lower-bound on the underlyings. The
    /// asymmetric non-nullable-to-nullable inference is deliberately
    /// absent; downstream compatibility checking assumes it never fires.
    fn lower_bound_nullable_inference(&mut self, source: TypeId, target: TypeId) -> bool {
        let (Some(source_underlying), Some(target_underlying)) = (
            facts::nullable_underlying(self.db, source),
            facts::nullable_underlying(self.db, target),
        ) else {
            return false;
        };
        self.lower_bound_inference(source_underlying, target_underlying);
        true
    }

    /// Structural delegate shapes in a lower-bound context: by-value
    /// reference parameters are contravariant, a by-value reference
    /// return is covariant, everything else exact.
    fn lower_bound_delegate_inference(&mut self, source: TypeId, target: TypeId) -> bool {
        let Some((source_shape, target_shape)) = self.delegate_shape_pair(source, target) else {
            return false;
        };
        for (source_param, target_param) in
            source_shape.params.iter().zip(target_shape.params.iter())
        {
            if source_param.ref_kind.is_by_value()
                && facts::is_reference_type(self.db, source_param.type_id)
            {
                self.upper_bound_inference(source_param.type_id, target_param.type_id);
            } else {
                self.exact_inference(source_param.type_id, target_param.type_id);
            }
        }
        if facts::is_reference_type(self.db, source_shape.return_type) {
            self.lower_bound_inference(source_shape.return_type, target_shape.return_type);
        } else {
            self.exact_inference(source_shape.return_type, target_shape.return_type);
        }
        true
    }

    fn lower_bound_constructed_inference(&mut self, source: TypeId, target: TypeId) -> bool {
        let Some(target_app) = facts::named_application(self.db, target) else {
            return false;
        };
        if target_app.args.is_empty() {
            return false;
        }

        // Same definition: interfaces and delegates recurse under their
        // declared variance, classes and structs exactly.
        if let Some(source_app) = facts::named_application(self.db, source) {
            if source_app.def == target_app.def {
                if let Some(def) = self.db.definition(source_app.def) {
                    if matches!(def.kind, DefKind::Interface | DefKind::Delegate) {
                        self.lower_bound_type_argument_inference(&source_app, &target_app, &def);
                    } else {
                        self.exact_type_argument_inference(&source_app, &target_app);
                    }
                    return true;
                }
            }
        }

        if self.lower_bound_class_inference(source, &target_app, target) {
            return true;
        }
        self.lower_bound_interface_inference(source, &target_app, target)
    }

    /// Search the source's base-class chain (effective base for a type
    /// parameter source) for a constructed match with the target class;
    /// a match recurses exactly per argument.
    fn lower_bound_class_inference(
        &mut self,
        source: TypeId,
        target_app: &TypeApplication,
        target: TypeId,
    ) -> bool {
        if facts::named_def_kind(self.db, target) != Some(DefKind::Class) {
            return false;
        }

        let mut current = match self.db.lookup(source) {
            Some(TypeKey::Named(_))
                if facts::named_def_kind(self.db, source) == Some(DefKind::Class) =>
            {
                facts::base_class(self.db, source)
            }
            Some(TypeKey::TypeParameter(info)) => {
                Some(facts::effective_base_class(self.db, &info))
            }
            _ => None,
        };

        let mut walked = 0;
        while let Some(base) = current {
            if let Some(base_app) = facts::named_application(self.db, base) {
                if base_app.def == target_app.def {
                    self.exact_type_argument_inference(&base_app, target_app);
                    return true;
                }
            }
            walked += 1;
            if walked > 100 {
                break;
            }
            current = facts::base_class(self.db, base);
        }
        false
    }

    /// Search the source's interface closure for a unique instantiation
    /// of the target's definition. Distinct instantiations defeat the
    /// inference; instantiations equal modulo dynamic and tuple names
    /// merge into one bound first.
    fn lower_bound_interface_inference(
        &mut self,
        source: TypeId,
        target_app: &TypeApplication,
        target: TypeId,
    ) -> bool {
        if facts::named_def_kind(self.db, target) != Some(DefKind::Interface) {
            return false;
        }
        match self.db.lookup(source) {
            Some(TypeKey::Named(_)) | Some(TypeKey::TypeParameter(_)) => {}
            _ => return false,
        }

        let Some(matched) = self.unique_interface_bound(source, target_app.def) else {
            return false;
        };
        let Some(matched_app) = facts::named_application(self.db, matched) else {
            return false;
        };
        let Some(def) = self.db.definition(target_app.def) else {
            return false;
        };
        self.lower_bound_type_argument_inference(&matched_app, target_app, &def);
        true
    }

    fn unique_interface_bound(&self, source: TypeId, target_def: DefId) -> Option<TypeId> {
        let mut matched: Option<TypeId> = None;
        for interface in facts::all_interfaces(self.db, source) {
            let Some(app) = facts::named_application(self.db, interface) else {
                continue;
            };
            if app.def != target_def {
                continue;
            }
            match matched {
                None => matched = Some(interface),
                Some(existing) if existing == interface => {}
                Some(existing) => {
                    if merge::equivalent_modulo_dynamic_and_names(self.db, existing, interface) {
                        matched = Some(merge::merge_equivalent(self.db, existing, interface));
                    } else {
                        trace!(source = source.0, "interface bound ambiguous");
                        return None;
                    }
                }
            }
        }
        matched
    }

    /// Per-argument choice under declared variance in a lower-bound
    /// context: covariant reference arguments recurse lower, contravariant
    /// reference arguments recurse upper, everything else exact.
    fn lower_bound_type_argument_inference(
        &mut self,
        source_app: &TypeApplication,
        target_app: &TypeApplication,
        def: &Definition,
    ) {
        for (index, (&source_arg, &target_arg)) in source_app
            .args
            .iter()
            .zip(target_app.args.iter())
            .enumerate()
        {
            let reference = facts::is_reference_type(self.db, source_arg);
            match def.variance_at(index) {
                VarianceKind::Out if reference => self.lower_bound_inference(source_arg, target_arg),
                VarianceKind::In if reference => self.upper_bound_inference(source_arg, target_arg),
                _ => self.exact_inference(source_arg, target_arg),
            }
        }
    }

    // ----- Upper bound -----

    fn upper_bound_inference(&mut self, source: TypeId, target: TypeId) {
        if self.upper_bound_type_parameter_inference(source, target) {
            return;
        }
        if self.upper_bound_array_inference(source, target) {
            return;
        }
        // Nullable pairs recurse exactly in an upper-bound context.
        if self.exact_nullable_inference(source, target) {
            return;
        }
        if self.tuple_inference(BoundKind::Upper, source, target) {
            return;
        }
        if self.upper_bound_delegate_inference(source, target) {
            return;
        }
        self.upper_bound_constructed_inference(source, target);
    }

    fn upper_bound_type_parameter_inference(&mut self, source: TypeId, target: TypeId) -> bool {
        if let Some(index) = self.unfixed_param_index(target) {
            self.add_bound(BoundKind::Upper, index, source);
            return true;
        }
        false
    }

    /// Mirror of the lower-bound array rule with the array on the target
    /// side: the source may be an array of the same rank or, for a
    /// rank-1 target, one of the canonical array interfaces.
    fn upper_bound_array_inference(&mut self, source: TypeId, target: TypeId) -> bool {
        let Some((target_element, target_rank)) = facts::array_element(self.db, target) else {
            return false;
        };

        if let Some((source_element, source_rank)) = facts::array_element(self.db, source) {
            if source_rank != target_rank {
                return false;
            }
            self.array_element_inference(BoundKind::Upper, source_element, target_element);
            return true;
        }

        if target_rank == 1 {
            if let Some(source_app) = facts::named_application(self.db, source) {
                if source_app.args.len() == 1
                    && self.db.array_interface_defs().contains(&source_app.def)
                {
                    self.array_element_inference(BoundKind::Upper, source_app.args[0], target_element);
                    return true;
                }
            }
        }
        false
    }

    /// Structural delegate shapes in an upper-bound context: directions
    /// flip relative to the lower-bound rule.
    fn upper_bound_delegate_inference(&mut self, source: TypeId, target: TypeId) -> bool {
        let Some((source_shape, target_shape)) = self.delegate_shape_pair(source, target) else {
            return false;
        };
        for (source_param, target_param) in
            source_shape.params.iter().zip(target_shape.params.iter())
        {
            if source_param.ref_kind.is_by_value()
                && facts::is_reference_type(self.db, source_param.type_id)
            {
                self.lower_bound_inference(source_param.type_id, target_param.type_id);
            } else {
                self.exact_inference(source_param.type_id, target_param.type_id);
            }
        }
        if facts::is_reference_type(self.db, source_shape.return_type) {
            self.upper_bound_inference(source_shape.return_type, target_shape.return_type);
        } else {
            self.exact_inference(source_shape.return_type, target_shape.return_type);
        }
        true
    }

    fn upper_bound_constructed_inference(&mut self, source: TypeId, target: TypeId) -> bool {
        let Some(source_app) = facts::named_application(self.db, source) else {
            return false;
        };
        if source_app.args.is_empty() {
            return false;
        }

        if let Some(target_app) = facts::named_application(self.db, target) {
            if source_app.def == target_app.def {
                if let Some(def) = self.db.definition(source_app.def) {
                    if matches!(def.kind, DefKind::Interface | DefKind::Delegate) {
                        self.upper_bound_type_argument_inference(&source_app, &target_app, &def);
                    } else {
                        self.exact_type_argument_inference(&source_app, &target_app);
                    }
                    return true;
                }
            }
        }

        if self.upper_bound_class_inference(&source_app, target) {
            return true;
        }
        self.upper_bound_interface_inference(&source_app, target)
    }

    /// Dual of the lower-bound class walk: search the *target's* base
    /// chain for the source's definition.
    fn upper_bound_class_inference(&mut self, source_app: &TypeApplication, target: TypeId) -> bool {
        let Some(source_def) = self.db.definition(source_app.def) else {
            return false;
        };
        if source_def.kind != DefKind::Class {
            return false;
        }

        let mut walked = 0;
        let mut current = facts::base_class(self.db, target);
        while let Some(base) = current {
            if let Some(base_app) = facts::named_application(self.db, base) {
                if base_app.def == source_app.def {
                    self.exact_type_argument_inference(source_app, &base_app);
                    return true;
                }
            }
            walked += 1;
            if walked > 100 {
                break;
            }
            current = facts::base_class(self.db, base);
        }
        false
    }

    /// Dual of the lower-bound interface rule: search the *target's*
    /// interface closure for a unique instantiation of the source's
    /// definition.
    fn upper_bound_interface_inference(
        &mut self,
        source_app: &TypeApplication,
        target: TypeId,
    ) -> bool {
        let Some(source_def) = self.db.definition(source_app.def) else {
            return false;
        };
        if source_def.kind != DefKind::Interface {
            return false;
        }
        match facts::named_def_kind(self.db, target) {
            Some(DefKind::Class) | Some(DefKind::Struct) | Some(DefKind::Interface) => {}
            _ => return false,
        }

        let Some(matched) = self.unique_interface_bound(target, source_app.def) else {
            return false;
        };
        let Some(matched_app) = facts::named_application(self.db, matched) else {
            return false;
        };
        self.upper_bound_type_argument_inference(source_app, &matched_app, &source_def);
        true
    }

    /// Per-argument choice under declared variance in an upper-bound
    /// context; directions flip relative to the lower-bound rule.
    fn upper_bound_type_argument_inference(
        &mut self,
        source_app: &TypeApplication,
        target_app: &TypeApplication,
        def: &Definition,
    ) {
        for (index, (&source_arg, &target_arg)) in source_app
            .args
            .iter()
            .zip(target_app.args.iter())
            .enumerate()
        {
            let reference = facts::is_reference_type(self.db, source_arg);
            match def.variance_at(index) {
                VarianceKind::Out if reference => self.upper_bound_inference(source_arg, target_arg),
                VarianceKind::In if reference => self.lower_bound_inference(source_arg, target_arg),
                _ => self.exact_inference(source_arg, target_arg),
            }
        }
    }

    // =========================================================================
    // Fixing
    // =========================================================================

    /// Reconcile the parameter's bounds into a unique best type.
    ///
    /// Exact bounds short-circuit: two exact bounds that differ by more
    /// than dynamic-ness or tuple names fail immediately. Otherwise the
    /// lower and upper bounds seed the candidate set, every candidate
    /// must accept a conversion from every lower bound and into every
    /// upper bound, and the unique survivor that every other survivor
    /// converts to wins.
    fn fix_parameter(&mut self, index: usize, _diagnostics: &mut Diagnostics) -> bool {
        debug_assert!(self.is_unfixed(index));

        let exact = self.exact_bounds[index].clone().unwrap_or_default();
        let lower = self.lower_bounds[index].clone().unwrap_or_default();
        let upper = self.upper_bounds[index].clone().unwrap_or_default();

        let Some(best) = self.find_best_candidate(&exact, &lower, &upper) else {
            debug!(index, "fix failed");
            return false;
        };
        debug!(index, best = best.0, "fixed type parameter");
        self.fixed_results[index] = Some(best);
        self.update_dependencies_after_fix(index);
        true
    }

    /// One exact bound (after merging) is the whole candidate set; two
    /// genuinely different exact bounds fail outright. Lower and upper
    /// bounds contribute inexact candidates instead.
    fn merge_exact_bounds(&self, exact: &BoundSet) -> Option<TypeId> {
        let mut merged: Option<TypeId> = None;
        for &bound in exact {
            match merged {
                None => merged = Some(bound),
                Some(existing) => {
                    if merge::equivalent_modulo_dynamic_and_names(self.db, existing, bound) {
                        merged = Some(merge::merge_equivalent(self.db, existing, bound));
                    } else {
                        return None;
                    }
                }
            }
        }
        merged
    }

    fn find_best_candidate(
        &self,
        exact: &BoundSet,
        lower: &BoundSet,
        upper: &BoundSet,
    ) -> Option<TypeId> {
        let mut candidates: Vec<Candidate> = Vec::new();
        if !exact.is_empty() {
            let merged = self.merge_exact_bounds(exact)?;
            candidates.push(Candidate {
                key: merged,
                value: merged,
            });
        } else {
            for &bound in lower {
                self.add_or_merge_candidate(&mut candidates, bound);
            }
            for &bound in upper {
                self.add_or_merge_candidate(&mut candidates, bound);
            }
        }
        if candidates.is_empty() {
            return None;
        }

        // Every candidate must accept a conversion from every lower
        // bound; a bound that equals a candidate modulo dynamic/tuple
        // names merges into it instead of testing conversions.
        let initial: Vec<TypeId> = candidates.iter().map(|c| c.value).collect();
        for &bound in lower {
            for &candidate in &initial {
                if bound == candidate {
                    continue;
                }
                if !self
                    .conversions
                    .implicit_conversion_exists(self.db, bound, candidate)
                {
                    self.remove_candidate(&mut candidates, candidate);
                } else if merge::equivalent_modulo_dynamic_and_names(self.db, bound, candidate) {
                    self.merge_into_candidate(&mut candidates, candidate, bound);
                }
            }
        }

        // Symmetric for upper bounds, with the conversion direction
        // reversed.
        let initial: Vec<TypeId> = candidates.iter().map(|c| c.value).collect();
        for &bound in upper {
            for &candidate in &initial {
                if bound == candidate {
                    continue;
                }
                if !self
                    .conversions
                    .implicit_conversion_exists(self.db, candidate, bound)
                {
                    self.remove_candidate(&mut candidates, candidate);
                } else if merge::equivalent_modulo_dynamic_and_names(self.db, bound, candidate) {
                    self.merge_into_candidate(&mut candidates, candidate, bound);
                }
            }
        }

        // Unique best: the candidate every other survivor converts to.
        // Survivors equal modulo dynamic/tuple names merge rather than
        // tie, dynamic winning over object.
        let survivors: Vec<TypeId> = candidates.iter().map(|c| c.value).collect();
        let mut best: Option<TypeId> = None;
        'next_candidate: for &candidate in &survivors {
            for &other in &survivors {
                if other != candidate
                    && !self
                        .conversions
                        .implicit_conversion_exists(self.db, other, candidate)
                {
                    continue 'next_candidate;
                }
            }
            match best {
                None => best = Some(candidate),
                Some(existing) => {
                    if merge::equivalent_modulo_dynamic_and_names(self.db, existing, candidate) {
                        best = Some(merge::merge_equivalent(self.db, existing, candidate));
                    } else {
                        // Two incomparable bests.
                        return None;
                    }
                }
            }
        }
        best
    }

    fn add_or_merge_candidate(&self, candidates: &mut Vec<Candidate>, incoming: TypeId) {
        if let Some(entry) = candidates
            .iter_mut()
            .find(|c| merge::candidate_key_equal(self.db, c.key, incoming))
        {
            // An incoming bare dynamic never overwrites an existing
            // entry; the selection tie-break handles the preference.
            if incoming.is_dynamic() {
                return;
            }
            entry.value = merge::merge_equivalent(self.db, entry.value, incoming);
        } else {
            candidates.push(Candidate {
                key: incoming,
                value: incoming,
            });
        }
    }

    fn remove_candidate(&self, candidates: &mut Vec<Candidate>, value: TypeId) {
        candidates.retain(|c| !merge::candidate_key_equal(self.db, c.key, value));
    }

    fn merge_into_candidate(&self, candidates: &mut Vec<Candidate>, candidate: TypeId, bound: TypeId) {
        if bound.is_dynamic() {
            return;
        }
        if let Some(entry) = candidates
            .iter_mut()
            .find(|c| merge::candidate_key_equal(self.db, c.key, candidate))
        {
            entry.value = merge::merge_equivalent(self.db, entry.value, bound);
        }
    }

    // =========================================================================
    // Result extraction
    // =========================================================================

    /// The fixed assignment in declaration order. Slots that never fixed
    /// (or fixed to an error) become named error placeholders.
    fn get_results(&mut self) -> Vec<TypeId> {
        (0..self.param_count())
            .map(|index| match self.fixed_results[index] {
                Some(fixed) if !fixed.is_error() => fixed,
                _ => {
                    let name = match self.db.lookup(self.method_type_params[index]) {
                        Some(TypeKey::TypeParameter(info)) => Some(info.name),
                        _ => None,
                    };
                    self.db.error_placeholder(name)
                }
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "tests/infer_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "tests/infer_phase_tests.rs"]
mod phase_tests;

#[cfg(test)]
#[path = "tests/fixing_tests.rs"]
mod fixing_tests;
