//! Declaration-based applicability and most-specific selection.
//!
//! The two-stage procedure: every candidate is tested for applicability
//! against the concrete argument types (normalizing variadics and recording
//! type-variable bindings), then applicable candidates are folded pairwise
//! into a single most-specific winner.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::trace;
use typescope_api::models::{
    DeclarationKind, MethodDeclaration, SymbolReference, TypeExpr, TypeParameter, WildcardBound,
};
use typescope_api::semantic::TypeSystem;
use typescope_api::{ResolveError, Result};

/// Collapse trailing arguments from `start` onward into a synthesized array
/// argument. The caller-supplied slice is never mutated.
fn group_variadic_arguments(
    args: &[TypeExpr],
    start: usize,
    variadic_type: &TypeExpr,
) -> Vec<TypeExpr> {
    let mut grouped: Vec<TypeExpr> = args[..start].to_vec();
    let tail = &args[start..];
    if tail.is_empty() {
        grouped.push(variadic_type.clone());
    } else {
        grouped.push(TypeExpr::array(common_type(tail)));
    }
    grouped
}

// First-argument approximation of the grouped component type; a true least
// upper bound would need hierarchy data this stage does not consult.
fn common_type(values: &[TypeExpr]) -> TypeExpr {
    values[0].clone()
}

/// Whether `method` can accept a call named `name` with the given concrete
/// argument types, without wildcard tolerance.
pub fn is_applicable<T: TypeSystem + ?Sized>(
    method: &MethodDeclaration,
    name: &str,
    argument_types: &[TypeExpr],
    ts: &T,
) -> Result<bool> {
    is_applicable_with(method, name, argument_types, ts, false)
}

pub(crate) fn is_applicable_with<T: TypeSystem + ?Sized>(
    method: &MethodDeclaration,
    name: &str,
    argument_types: &[TypeExpr],
    ts: &T,
    wildcard_tolerance: bool,
) -> Result<bool> {
    if method.name != name {
        return Ok(false);
    }

    let mut args: Vec<TypeExpr> = argument_types.to_vec();
    if method.has_variadic_parameter() {
        let pos = method.params.len() - 1;
        if method.params.len() == args.len() {
            // The trailing argument may already satisfy the declared array
            // type without grouping.
            let mut expected = method.params[pos].ty.clone();
            if !ts.is_assignable(&expected, &args[pos]) {
                for tp in &method.type_params {
                    expected = replace_type_param(&expected, tp, ts)?;
                }
                if !ts.is_assignable(&expected, &args[pos]) {
                    let unwrapped = match &args[pos] {
                        TypeExpr::Array { element } if ts.is_assignable(&expected, element) => {
                            Some((**element).clone())
                        }
                        _ => None,
                    };
                    match unwrapped {
                        Some(component) => args[pos] = component,
                        None => args = group_variadic_arguments(&args, pos, &method.params[pos].ty),
                    }
                }
            }
        } else {
            // Fewer arguments than the fixed prefix cannot be normalized;
            // the arity check below must see the mismatch, not a panic.
            if args.len() < pos {
                return Ok(false);
            }
            args = group_variadic_arguments(&args, pos, &method.params[pos].ty);
        }
    }

    if method.params.len() != args.len() {
        return Ok(false);
    }

    let declaring_params: Vec<TypeParameter> = ts
        .lookup(&method.declaring_type)
        .map(|decl| decl.type_params.clone())
        .unwrap_or_default();

    let mut matched: HashMap<String, TypeExpr> = HashMap::new();
    let mut needs_tolerance = false;
    for (i, param) in method.params.iter().enumerate() {
        let expected = &param.ty;
        let actual = &args[i];

        // A method-level type variable binds to whatever it is given;
        // checking is deferred to specialization.
        if let TypeExpr::Variable { name, on_method } = expected {
            if *on_method {
                matched.insert(name.clone(), actual.clone());
                continue;
            }
        }

        let mut assignable = ts.is_assignable(expected, actual)
            || (param.is_variadic
                && ts.is_assignable(&TypeExpr::array(expected.clone()), actual));
        if !assignable && expected.is_reference() && actual.is_reference() {
            assignable = assignable_matching_type_parameters(expected, actual, &mut matched, ts)?;
        }
        if !assignable {
            let mut substituted = expected.clone();
            for tp in method.type_params.iter().chain(declaring_params.iter()) {
                substituted = replace_type_param(&substituted, tp, ts)?;
            }
            if !ts.is_assignable(&substituted, actual) {
                if contains_wildcard(actual) && wildcard_tolerance && !substituted.is_primitive() {
                    needs_tolerance = true;
                    continue;
                }
                if method.has_variadic_parameter()
                    && i == method.params.len() - 1
                    && ts.is_assignable(&TypeExpr::array(substituted.clone()), actual)
                {
                    continue;
                }
                return Ok(false);
            }
        }
    }
    // A tolerant pass only accepts methods that actually needed deferral.
    Ok(!wildcard_tolerance || needs_tolerance)
}

/// Whether the type is a wildcard or carries one in any argument position.
fn contains_wildcard(ty: &TypeExpr) -> bool {
    match ty {
        TypeExpr::Wildcard { .. } => true,
        TypeExpr::Reference { args, .. } => args.iter().any(contains_wildcard),
        TypeExpr::Array { element } => contains_wildcard(element),
        _ => false,
    }
}

/// Variance-aware structural matching of `expected` against `actual`,
/// recording type-variable bindings in `matched`.
pub fn assignable_matching_type_parameters<T: TypeSystem + ?Sized>(
    expected: &TypeExpr,
    actual: &TypeExpr,
    matched: &mut HashMap<String, TypeExpr>,
    ts: &T,
) -> Result<bool> {
    match expected {
        TypeExpr::Reference { .. } if actual.is_reference() => {
            reference_matching_type_parameters(expected, actual, matched, ts)
        }
        TypeExpr::Variable { name, .. } => {
            matched.insert(name.clone(), actual.clone());
            Ok(true)
        }
        _ => Err(ResolveError::UnsupportedTypeShape(format!(
            "cannot match {} against {}",
            expected.describe(),
            actual.describe()
        ))),
    }
}

fn reference_matching_type_parameters<T: TypeSystem + ?Sized>(
    expected: &TypeExpr,
    actual: &TypeExpr,
    matched: &mut HashMap<String, TypeExpr>,
    ts: &T,
) -> Result<bool> {
    let (TypeExpr::Reference { name: exp_name, .. }, TypeExpr::Reference { name: act_name, .. }) =
        (expected, actual)
    else {
        return Ok(false);
    };
    if exp_name == act_name {
        return matching_qualified_name(expected, actual, matched, ts);
    }
    for ancestor in ts.ancestors(actual) {
        if matching_qualified_name(expected, &ancestor, matched, ts)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn matching_qualified_name<T: TypeSystem + ?Sized>(
    expected: &TypeExpr,
    actual: &TypeExpr,
    matched: &mut HashMap<String, TypeExpr>,
    ts: &T,
) -> Result<bool> {
    let (
        TypeExpr::Reference {
            name: exp_name,
            args: exp_args,
        },
        TypeExpr::Reference {
            name: act_name,
            args: act_args,
        },
    ) = (expected, actual)
    else {
        return Ok(false);
    };
    if exp_name != act_name {
        return Ok(false);
    }
    if exp_args.len() != act_args.len() {
        return Err(ResolveError::UnsupportedTypeShape(format!(
            "type argument arity mismatch on {exp_name}"
        )));
    }
    for (exp_arg, act_arg) in exp_args.iter().zip(act_args.iter()) {
        match exp_arg {
            TypeExpr::Variable { name, .. } => {
                let same_variable =
                    matches!(act_arg, TypeExpr::Variable { name: n, .. } if n == name);
                if !same_variable {
                    if let Some(previous) = matched.get(name).cloned() {
                        if ts.is_assignable(&previous, act_arg) {
                            return Ok(true);
                        }
                        if ts.is_assignable(act_arg, &previous) {
                            matched.insert(name.clone(), act_arg.clone());
                            return Ok(true);
                        }
                        return Ok(false);
                    }
                    matched.insert(name.clone(), act_arg.clone());
                }
            }
            TypeExpr::Reference { .. } => {
                if exp_arg != act_arg {
                    return Ok(false);
                }
            }
            TypeExpr::Wildcard { bound } => {
                if let WildcardBound::Extends(b) = bound {
                    return assignable_matching_type_parameters(b, actual, matched, ts);
                }
                // Super bounds are accepted without verification.
                return Ok(true);
            }
            other => {
                return Err(ResolveError::UnsupportedTypeShape(other.describe()));
            }
        }
    }
    Ok(true)
}

/// Substitute one type parameter with its resolved bound throughout `ty`.
///
/// Zero bounds default to the universal object type; more than one bound is
/// a gap in variance coverage and faults.
pub fn replace_type_param<T: TypeSystem + ?Sized>(
    ty: &TypeExpr,
    tp: &TypeParameter,
    ts: &T,
) -> Result<TypeExpr> {
    match ty {
        TypeExpr::Variable { name, .. } => {
            if name == &tp.name {
                single_bound(tp, ts)
            } else {
                Ok(ty.clone())
            }
        }
        TypeExpr::Primitive(_) => Ok(ty.clone()),
        TypeExpr::Array { element } => Ok(TypeExpr::array(replace_type_param(element, tp, ts)?)),
        TypeExpr::Reference { name, args } => {
            let args = args
                .iter()
                .map(|a| replace_type_param(a, tp, ts))
                .collect::<Result<Vec<_>>>()?;
            Ok(TypeExpr::Reference {
                name: name.clone(),
                args,
            })
        }
        TypeExpr::Wildcard { .. } => {
            if ty.describe() == tp.name {
                single_bound(tp, ts)
            } else {
                Ok(ty.clone())
            }
        }
    }
}

pub(crate) fn single_bound<T: TypeSystem + ?Sized>(tp: &TypeParameter, ts: &T) -> Result<TypeExpr> {
    match tp.bounds.as_slice() {
        [] => Ok(ts.object_type()),
        [bound] => Ok(bound.clone()),
        _ => Err(ResolveError::UnsupportedTypeShape(format!(
            "type parameter {} declares multiple bounds",
            tp.name
        ))),
    }
}

/// Identity plus qualified-signature de-duplication: inheritance paths that
/// reach the same declaration collapse to one candidate.
fn dedupe_candidates(methods: &[Arc<MethodDeclaration>]) -> Vec<Arc<MethodDeclaration>> {
    let mut seen = HashSet::new();
    let mut out: Vec<Arc<MethodDeclaration>> = Vec::new();
    for method in methods {
        if out.iter().any(|kept| Arc::ptr_eq(kept, method)) {
            continue;
        }
        if seen.insert(method.qualified_signature()) {
            out.push(method.clone());
        }
    }
    out
}

/// Pick the single most applicable candidate, or report unsolved.
///
/// Candidates are expected in inheritance order, most-derived first. Runs a
/// strict pass first and retries with wildcard tolerance only when nothing
/// solves.
pub fn find_most_applicable<T: TypeSystem + ?Sized>(
    methods: &[Arc<MethodDeclaration>],
    name: &str,
    argument_types: &[TypeExpr],
    ts: &T,
) -> Result<SymbolReference<Arc<MethodDeclaration>>> {
    let strict = find_most_applicable_with(methods, name, argument_types, ts, false)?;
    if strict.is_solved() {
        return Ok(strict);
    }
    find_most_applicable_with(methods, name, argument_types, ts, true)
}

pub fn find_most_applicable_with<T: TypeSystem + ?Sized>(
    methods: &[Arc<MethodDeclaration>],
    name: &str,
    argument_types: &[TypeExpr],
    ts: &T,
    wildcard_tolerance: bool,
) -> Result<SymbolReference<Arc<MethodDeclaration>>> {
    let mut applicable: Vec<Arc<MethodDeclaration>> = Vec::new();
    for method in dedupe_candidates(methods) {
        if is_applicable_with(&method, name, argument_types, ts, wildcard_tolerance)? {
            applicable.push(method);
        }
    }
    trace!(
        name,
        candidates = methods.len(),
        applicable = applicable.len(),
        wildcard_tolerance,
        "filtered applicable methods"
    );
    if applicable.is_empty() {
        return Ok(SymbolReference::unsolved(DeclarationKind::Method));
    }
    if applicable.len() == 1 {
        return Ok(SymbolReference::solved(applicable.swap_remove(0)));
    }

    let mut winner = applicable[0].clone();
    for other in &applicable[1..] {
        if is_more_specific(&winner, other, ts) {
            // keep the running winner
        } else if is_more_specific(other, &winner, ts) {
            winner = other.clone();
        } else if winner.declaring_type == other.declaring_type {
            return Err(ResolveError::AmbiguousMethodCall(
                winner.qualified_signature(),
                other.qualified_signature(),
            ));
        }
        // A cross-type tie keeps the earlier candidate: the list is ordered
        // most-derived first, so the sub-type already won or lost on merit.
    }
    Ok(SymbolReference::solved(winner))
}

fn is_more_specific<T: TypeSystem + ?Sized>(
    a: &MethodDeclaration,
    b: &MethodDeclaration,
    ts: &T,
) -> bool {
    // Fewer parameters always wins, before any type comparison; this also
    // settles variadic-vs-fixed arity mixes.
    if a.params.len() < b.params.len() {
        return true;
    }
    if a.params.len() > b.params.len() {
        return false;
    }
    let mut one_more_specific = false;
    for i in 0..a.params.len() {
        let ta = &a.params[i].ty;
        let tb = &b.params[i].ty;
        if ts.is_assignable(tb, ta) && !ts.is_assignable(ta, tb) {
            one_more_specific = true;
        }
        if ts.is_assignable(ta, tb) && !ts.is_assignable(tb, ta) {
            return false;
        }
        // On the final position a deeper array level wins: prefers an exact
        // array match over variadic expansion.
        if i == a.params.len() - 1 && ta.array_level() > tb.array_level() {
            return true;
        }
    }
    one_more_specific
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use typescope_api::models::ParameterDeclaration;

    struct NoHierarchy;

    impl TypeSystem for NoHierarchy {
        fn lookup(&self, _name: &str) -> Option<Arc<typescope_api::models::TypeDeclaration>> {
            None
        }
        fn is_assignable(&self, target: &TypeExpr, source: &TypeExpr) -> bool {
            target == source
        }
        fn ancestors(&self, _reference: &TypeExpr) -> Vec<TypeExpr> {
            Vec::new()
        }
    }

    fn method(name: &str, params: Vec<(TypeExpr, bool)>) -> Arc<MethodDeclaration> {
        Arc::new(MethodDeclaration {
            name: name.into(),
            params: params
                .into_iter()
                .enumerate()
                .map(|(i, (ty, is_variadic))| ParameterDeclaration {
                    name: format!("arg{i}"),
                    ty,
                    is_variadic,
                })
                .collect(),
            type_params: Vec::new(),
            return_type: None,
            declaring_type: "com.acme.Widget".into(),
        })
    }

    #[test]
    fn grouping_synthesizes_an_array_of_the_first_trailing_type() {
        let string = TypeExpr::reference("java.lang.String");
        let args = vec![
            TypeExpr::Primitive(typescope_api::models::PrimitiveKind::Int),
            string.clone(),
            string.clone(),
        ];
        let grouped = group_variadic_arguments(&args, 1, &TypeExpr::array(string.clone()));
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[1], TypeExpr::array(string));
    }

    #[test]
    fn grouping_an_empty_tail_falls_back_to_the_declared_array() {
        let declared = TypeExpr::array(TypeExpr::reference("java.lang.String"));
        let args = vec![TypeExpr::Primitive(typescope_api::models::PrimitiveKind::Int)];
        let grouped = group_variadic_arguments(&args, 1, &declared);
        assert_eq!(grouped[1], declared);
    }

    #[test]
    fn deeper_array_level_breaks_the_final_position_tie() {
        let string = TypeExpr::reference("java.lang.String");
        let exact = method("m", vec![(TypeExpr::array(TypeExpr::array(string.clone())), false)]);
        let flat = method("m", vec![(TypeExpr::array(string), true)]);
        let ts = NoHierarchy;
        assert!(is_more_specific(&exact, &flat, &ts));
        assert!(!is_more_specific(&flat, &exact, &ts));
    }

    #[test]
    fn fewer_parameters_short_circuits_type_comparison() {
        let string = TypeExpr::reference("java.lang.String");
        let one = method("m", vec![(string.clone(), false)]);
        let two = method(
            "m",
            vec![(string.clone(), false), (TypeExpr::array(string), true)],
        );
        let ts = NoHierarchy;
        assert!(is_more_specific(&one, &two, &ts));
        assert!(!is_more_specific(&two, &one, &ts));
    }

    #[test]
    fn duplicate_candidates_collapse_by_identity_and_signature() {
        let string = TypeExpr::reference("java.lang.String");
        let m = method("m", vec![(string, false)]);
        let deduped = dedupe_candidates(&[m.clone(), m.clone(), m]);
        assert_eq!(deduped.len(), 1);
    }
}
