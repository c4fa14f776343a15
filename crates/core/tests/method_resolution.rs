//! End-to-end overload resolution against a scripted type system.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use typescope_api::models::{
    MethodDeclaration, ParameterDeclaration, PrimitiveKind, TypeDeclaration, TypeExpr, TypeKind,
    TypeParameter, WildcardBound,
};
use typescope_api::semantic::TypeSystem;
use typescope_api::ResolveError;
use typescope_core::resolution::{find_most_applicable, find_most_applicable_with, is_applicable};

/// Type system scripted from explicit subtyping pairs plus the structural
/// rules every test needs: identity, primitive widening, array recursion and
/// raw-reference tolerance.
#[derive(Default)]
struct MockTypes {
    declarations: HashMap<String, Arc<TypeDeclaration>>,
    /// (target name, source name) pairs considered assignable.
    assignable: HashSet<(String, String)>,
    /// Pre-substituted ancestor lists keyed by reference name.
    ancestors: HashMap<String, Vec<TypeExpr>>,
}

impl MockTypes {
    fn with_pairs(pairs: &[(&str, &str)]) -> Self {
        let mut mock = MockTypes::default();
        for (target, source) in pairs {
            mock.assignable
                .insert((target.to_string(), source.to_string()));
        }
        mock
    }
}

impl TypeSystem for MockTypes {
    fn lookup(&self, qualified_name: &str) -> Option<Arc<TypeDeclaration>> {
        self.declarations.get(qualified_name).cloned()
    }

    fn is_assignable(&self, target: &TypeExpr, source: &TypeExpr) -> bool {
        if target == source {
            return true;
        }
        match (target, source) {
            (TypeExpr::Primitive(t), TypeExpr::Primitive(s)) => s.widens_to(*t),
            (TypeExpr::Array { element: t }, TypeExpr::Array { element: s }) => {
                self.is_assignable(t, s)
            }
            (
                TypeExpr::Reference {
                    name: tn,
                    args: ta,
                },
                TypeExpr::Reference { name: sn, args: sa },
            ) => {
                if tn == sn {
                    ta.is_empty() || ta == sa
                } else {
                    self.assignable.contains(&(tn.clone(), sn.clone()))
                        && (ta.is_empty() || ta == sa)
                }
            }
            _ => false,
        }
    }

    fn ancestors(&self, reference: &TypeExpr) -> Vec<TypeExpr> {
        match reference {
            TypeExpr::Reference { name, .. } => {
                self.ancestors.get(name).cloned().unwrap_or_default()
            }
            _ => Vec::new(),
        }
    }
}

fn init_tracing() {
    static ONCE: std::sync::Once = std::sync::Once::new();
    ONCE.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

fn string() -> TypeExpr {
    TypeExpr::reference("java.lang.String")
}

fn method_in(declaring: &str, name: &str, params: Vec<(TypeExpr, bool)>) -> Arc<MethodDeclaration> {
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
        declaring_type: declaring.into(),
    })
}

fn method(name: &str, params: Vec<(TypeExpr, bool)>) -> Arc<MethodDeclaration> {
    method_in("com.acme.Widget", name, params)
}

#[test]
fn name_mismatch_is_never_applicable() {
    let ts = MockTypes::default();
    let m = method("render", vec![(string(), false)]);
    assert!(!is_applicable(&m, "paint", &[string()], &ts).unwrap());
}

#[test]
fn fixed_arity_is_strict() {
    let ts = MockTypes::default();
    let m = method("render", vec![(string(), false)]);
    assert!(is_applicable(&m, "render", &[string()], &ts).unwrap());
    assert!(!is_applicable(&m, "render", &[], &ts).unwrap());
    assert!(!is_applicable(&m, "render", &[string(), string()], &ts).unwrap());
}

#[test]
fn variadic_grouping_accepts_spread_arguments() {
    let ts = MockTypes::default();
    let int = TypeExpr::Primitive(PrimitiveKind::Int);
    let m = method(
        "format",
        vec![(int.clone(), false), (TypeExpr::array(string()), true)],
    );
    // spread tail
    assert!(is_applicable(&m, "format", &[int.clone(), string(), string()], &ts).unwrap());
    // array passed directly
    assert!(is_applicable(&m, "format", &[int.clone(), TypeExpr::array(string())], &ts).unwrap());
    // empty tail
    assert!(is_applicable(&m, "format", &[int.clone()], &ts).unwrap());
    // wrong component type
    assert!(!is_applicable(&m, "format", &[int.clone(), int], &ts).unwrap());
}

#[test]
fn variadic_call_shorter_than_the_fixed_prefix_is_rejected() {
    let ts = MockTypes::default();
    let m = method(
        "log",
        vec![(string(), false), (TypeExpr::array(string()), true)],
    );
    assert!(!is_applicable(&m, "log", &[], &ts).unwrap());

    let zero = method("log", vec![]);
    let found = find_most_applicable(&[m, zero.clone()], "log", &[], &ts).unwrap();
    assert!(Arc::ptr_eq(found.as_solved().unwrap(), &zero));
}

#[test]
fn fixed_arity_overload_beats_variadic() {
    init_tracing();
    let ts = MockTypes::default();
    let one = method("log", vec![(string(), false)]);
    let two = method(
        "log",
        vec![(string(), false), (TypeExpr::array(string()), true)],
    );
    let found = find_most_applicable(&[two, one.clone()], "log", &[string()], &ts).unwrap();
    assert!(Arc::ptr_eq(found.as_solved().unwrap(), &one));
}

#[test]
fn more_specific_parameter_type_wins() {
    let ts = MockTypes::with_pairs(&[
        ("java.lang.Object", "java.lang.String"),
        ("java.lang.Object", "java.lang.CharSequence"),
        ("java.lang.CharSequence", "java.lang.String"),
    ]);
    let broad = method("accept", vec![(TypeExpr::reference("java.lang.Object"), false)]);
    let narrow = method("accept", vec![(string(), false)]);
    let found =
        find_most_applicable(&[broad, narrow.clone()], "accept", &[string()], &ts).unwrap();
    assert!(Arc::ptr_eq(found.as_solved().unwrap(), &narrow));
}

#[test]
fn incomparable_overloads_in_one_type_are_ambiguous() {
    let ts = MockTypes::with_pairs(&[
        ("java.io.Serializable", "java.lang.String"),
        ("java.lang.Comparable", "java.lang.String"),
    ]);
    let a = method("accept", vec![(TypeExpr::reference("java.io.Serializable"), false)]);
    let b = method("accept", vec![(TypeExpr::reference("java.lang.Comparable"), false)]);
    let err = find_most_applicable(&[a, b], "accept", &[string()], &ts).unwrap_err();
    assert!(matches!(err, ResolveError::AmbiguousMethodCall(..)));
}

#[test]
fn incomparable_overloads_across_types_keep_the_first() {
    let ts = MockTypes::with_pairs(&[
        ("java.io.Serializable", "java.lang.String"),
        ("java.lang.Comparable", "java.lang.String"),
    ]);
    let derived = method_in(
        "com.acme.Sub",
        "accept",
        vec![(TypeExpr::reference("java.io.Serializable"), false)],
    );
    let base = method_in(
        "com.acme.Base",
        "accept",
        vec![(TypeExpr::reference("java.lang.Comparable"), false)],
    );
    let found =
        find_most_applicable(&[derived.clone(), base], "accept", &[string()], &ts).unwrap();
    assert!(Arc::ptr_eq(found.as_solved().unwrap(), &derived));
}

#[test]
fn duplicate_inherited_candidates_do_not_conflict() {
    let ts = MockTypes::default();
    let m = method("close", vec![]);
    let found = find_most_applicable(&[m.clone(), m.clone()], "close", &[], &ts).unwrap();
    assert!(Arc::ptr_eq(found.as_solved().unwrap(), &m));
}

#[test]
fn no_candidate_reports_unsolved_not_error() {
    let ts = MockTypes::default();
    let m = method("render", vec![(string(), false)]);
    let found = find_most_applicable(&[m], "render", &[TypeExpr::Primitive(PrimitiveKind::Int)], &ts)
        .unwrap();
    assert!(!found.is_solved());
}

#[test]
fn wildcard_argument_needs_the_tolerant_pass() {
    init_tracing();
    let ts = MockTypes::default();
    let m = method("inspect", vec![(TypeExpr::reference("java.lang.Number"), false)]);
    let wildcard = TypeExpr::Wildcard {
        bound: WildcardBound::Extends(Box::new(TypeExpr::reference("java.lang.Integer"))),
    };
    let strict =
        find_most_applicable_with(&[m.clone()], "inspect", &[wildcard.clone()], &ts, false)
            .unwrap();
    assert!(!strict.is_solved());
    let found = find_most_applicable(&[m.clone()], "inspect", &[wildcard], &ts).unwrap();
    assert!(Arc::ptr_eq(found.as_solved().unwrap(), &m));
}

#[test]
fn bounded_wildcard_arguments_only_match_under_tolerance() {
    let ts = MockTypes::default();
    let list_of = |arg: TypeExpr| TypeExpr::Reference {
        name: "java.util.List".into(),
        args: vec![arg],
    };
    let m = method(
        "drain",
        vec![(
            list_of(TypeExpr::Wildcard {
                bound: WildcardBound::Extends(Box::new(TypeExpr::reference("java.lang.Number"))),
            }),
            false,
        )],
    );
    let actual = list_of(TypeExpr::Wildcard {
        bound: WildcardBound::Extends(Box::new(TypeExpr::reference("java.lang.Integer"))),
    });

    let strict =
        find_most_applicable_with(&[m.clone()], "drain", &[actual.clone()], &ts, false).unwrap();
    assert!(!strict.is_solved());
    let tolerant = find_most_applicable(&[m.clone()], "drain", &[actual], &ts).unwrap();
    assert!(Arc::ptr_eq(tolerant.as_solved().unwrap(), &m));
}

#[test]
fn method_level_type_variable_binds_to_anything() {
    let ts = MockTypes::default();
    let m = Arc::new(MethodDeclaration {
        name: "identity".into(),
        params: vec![ParameterDeclaration {
            name: "value".into(),
            ty: TypeExpr::Variable {
                name: "T".into(),
                on_method: true,
            },
            is_variadic: false,
        }],
        type_params: vec![TypeParameter {
            name: "T".into(),
            bounds: Vec::new(),
        }],
        return_type: Some(TypeExpr::Variable {
            name: "T".into(),
            on_method: true,
        }),
        declaring_type: "com.acme.Widget".into(),
    });
    assert!(is_applicable(&m, "identity", &[string()], &ts).unwrap());
    assert!(
        is_applicable(&m, "identity", &[TypeExpr::Primitive(PrimitiveKind::Int)], &ts).unwrap()
    );
}

#[test]
fn class_level_type_parameter_erases_to_its_bound() {
    let mut ts = MockTypes::with_pairs(&[("java.lang.Object", "java.lang.String")]);
    let element = TypeExpr::Variable {
        name: "E".into(),
        on_method: false,
    };
    let add = Arc::new(MethodDeclaration {
        name: "add".into(),
        params: vec![ParameterDeclaration {
            name: "element".into(),
            ty: element,
            is_variadic: false,
        }],
        type_params: Vec::new(),
        return_type: None,
        declaring_type: "java.util.List".into(),
    });
    ts.declarations.insert(
        "java.util.List".into(),
        Arc::new(TypeDeclaration {
            qualified_name: "java.util.List".into(),
            name: "List".into(),
            kind: TypeKind::Interface,
            type_params: vec![TypeParameter {
                name: "E".into(),
                bounds: Vec::new(),
            }],
            supertypes: Vec::new(),
            methods: vec![add.clone()],
            fields: Vec::new(),
            nested: Vec::new(),
        }),
    );
    assert!(is_applicable(&add, "add", &[string()], &ts).unwrap());
}

#[test]
fn multiple_bounds_are_rejected_as_unsupported() {
    let ts = MockTypes::default();
    let m = Arc::new(MethodDeclaration {
        name: "merge".into(),
        params: vec![ParameterDeclaration {
            name: "value".into(),
            ty: TypeExpr::Variable {
                name: "T".into(),
                on_method: false,
            },
            is_variadic: false,
        }],
        type_params: vec![TypeParameter {
            name: "T".into(),
            bounds: vec![
                TypeExpr::reference("java.io.Serializable"),
                TypeExpr::reference("java.lang.Comparable"),
            ],
        }],
        return_type: None,
        declaring_type: "com.acme.Widget".into(),
    });
    let err = is_applicable(&m, "merge", &[string()], &ts).unwrap_err();
    assert!(matches!(err, ResolveError::UnsupportedTypeShape(_)));
}

#[test]
fn generic_argument_matches_through_an_ancestor() {
    let list_of_string = TypeExpr::Reference {
        name: "java.util.List".into(),
        args: vec![string()],
    };
    let mut ts = MockTypes::default();
    ts.ancestors
        .insert("java.util.ArrayList".into(), vec![list_of_string.clone()]);
    let m = method("drain", vec![(list_of_string, false)]);
    let array_list_of_string = TypeExpr::Reference {
        name: "java.util.ArrayList".into(),
        args: vec![string()],
    };
    assert!(is_applicable(&m, "drain", &[array_list_of_string], &ts).unwrap());
}

#[test]
fn raw_target_accepts_any_parameterization() {
    let ts = MockTypes::default();
    let m = method("drain", vec![(TypeExpr::reference("java.util.List"), false)]);
    let list_of_string = TypeExpr::Reference {
        name: "java.util.List".into(),
        args: vec![string()],
    };
    assert!(is_applicable(&m, "drain", &[list_of_string], &ts).unwrap());
}
