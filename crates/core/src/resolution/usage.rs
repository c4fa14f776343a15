//! Overload resolution over substituted method usages.
//!
//! Usages carry already-substituted parameter types, so applicability here
//! is simpler than the declaration path: exact arity, no variadic grouping,
//! and type parameters are erased up front in two alternative forms rather
//! than bound during matching.

use tracing::trace;
use typescope_api::models::{MethodUsage, TypeExpr, WildcardBound};
use typescope_api::semantic::TypeSystem;
use typescope_api::{ResolveError, Result};

use super::methods::single_bound;

/// Whether `usage` accepts a call named `name` with the given argument
/// types. Arity must match exactly.
pub fn is_applicable_usage<T: TypeSystem + ?Sized>(
    usage: &MethodUsage,
    name: &str,
    argument_types: &[TypeExpr],
    ts: &T,
) -> Result<bool> {
    if usage.name != name || usage.param_types.len() != argument_types.len() {
        return Ok(false);
    }

    // Any remaining type parameters — the method's own and the declaring
    // type's — are erased two ways: to an upper-bounded wildcard and to the
    // bound itself. A parameter matches if the raw form or either erased
    // form accepts the argument.
    let method_params = usage
        .declaration()
        .map(|declaration| declaration.type_params.clone())
        .unwrap_or_default();
    let declaring_params = ts
        .lookup(&usage.declaring_type)
        .map(|declaring| declaring.type_params.clone())
        .unwrap_or_default();
    let mut inferred = usage.clone();
    let mut erased = usage.clone();
    for tp in method_params.iter().chain(declaring_params.iter()) {
        let bound = single_bound(tp, ts)?;
        inferred = inferred.substituting(
            &tp.name,
            &TypeExpr::Wildcard {
                bound: WildcardBound::Extends(Box::new(bound.clone())),
            },
        );
        erased = erased.substituting(&tp.name, &bound);
    }

    for (i, actual) in argument_types.iter().enumerate() {
        let accepted = ts.is_assignable(&erased.param_types[i], actual)
            || ts.is_assignable(&usage.param_types[i], actual)
            || ts.is_assignable(&inferred.param_types[i], actual);
        if !accepted {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Whether the two usages would override each other: same name, same arity,
/// identical parameter types after substitution.
fn are_override(a: &MethodUsage, b: &MethodUsage) -> bool {
    a.name == b.name
        && a.param_types.len() == b.param_types.len()
        && a.param_types
            .iter()
            .zip(b.param_types.iter())
            .all(|(ta, tb)| ta == tb)
}

/// Pick the most applicable usage, or `None` when nothing matches.
///
/// A specificity tie between two usages of the same declaring type is
/// ambiguous unless one overrides the other.
pub fn find_most_applicable_usage<T: TypeSystem + ?Sized>(
    usages: &[MethodUsage],
    name: &str,
    argument_types: &[TypeExpr],
    ts: &T,
) -> Result<Option<MethodUsage>> {
    let mut applicable: Vec<MethodUsage> = Vec::new();
    for usage in usages {
        if is_applicable_usage(usage, name, argument_types, ts)? {
            applicable.push(usage.clone());
        }
    }
    trace!(
        name,
        candidates = usages.len(),
        applicable = applicable.len(),
        "filtered applicable usages"
    );
    if applicable.is_empty() {
        return Ok(None);
    }
    if applicable.len() == 1 {
        return Ok(applicable.pop());
    }

    let mut winner = applicable[0].clone();
    for other in &applicable[1..] {
        if is_more_specific(&winner, other, ts) {
            // keep the running winner
        } else if is_more_specific(other, &winner, ts) {
            winner = other.clone();
        } else if winner.declaring_type == other.declaring_type && !are_override(&winner, other) {
            return Err(ResolveError::AmbiguousMethodCall(
                describe(&winner),
                describe(other),
            ));
        }
    }
    Ok(Some(winner))
}

fn is_more_specific<T: TypeSystem + ?Sized>(a: &MethodUsage, b: &MethodUsage, ts: &T) -> bool {
    let mut one_more_specific = false;
    for (ta, tb) in a.param_types.iter().zip(b.param_types.iter()) {
        if ts.is_assignable(tb, ta) && !ts.is_assignable(ta, tb) {
            one_more_specific = true;
        }
        if ts.is_assignable(ta, tb) && !ts.is_assignable(tb, ta) {
            return false;
        }
    }
    one_more_specific
}

fn describe(usage: &MethodUsage) -> String {
    let params: Vec<String> = usage.param_types.iter().map(|t| t.describe()).collect();
    format!("{}.{}({})", usage.declaring_type, usage.name, params.join(", "))
}
