//! Assignability and hierarchy queries answered through a solver chain.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use tracing::warn;
use typescope_api::models::{TypeDeclaration, TypeExpr, WildcardBound};
use typescope_api::semantic::TypeSystem;
use typescope_core::solver::{TypeSolver, solve_in_chain};

const OBJECT: &str = "java.lang.Object";

/// [`TypeSystem`] implementation backed by a solver chain. Hierarchy
/// knowledge is whatever the chain can resolve; unresolvable supertypes
/// silently end their branch.
pub struct SolverTypeSystem {
    solver: Arc<dyn TypeSolver>,
}

impl SolverTypeSystem {
    pub fn new(solver: Arc<dyn TypeSolver>) -> Self {
        Self { solver }
    }

    /// Same-name reference containment: raw targets accept any
    /// instantiation, otherwise arguments match pairwise.
    fn arguments_contained(&self, target_args: &[TypeExpr], source_args: &[TypeExpr]) -> bool {
        if target_args.is_empty() {
            return true;
        }
        if target_args.len() != source_args.len() {
            return false;
        }
        target_args
            .iter()
            .zip(source_args.iter())
            .all(|(t, s)| self.argument_contains(t, s))
    }

    fn argument_contains(&self, target: &TypeExpr, source: &TypeExpr) -> bool {
        if target == source {
            return true;
        }
        match target {
            TypeExpr::Wildcard { bound } => match bound {
                WildcardBound::Unbounded => true,
                WildcardBound::Extends(b) => match source {
                    // ? extends T contains ? extends S when T accepts S
                    TypeExpr::Wildcard {
                        bound: WildcardBound::Extends(sb),
                    } => self.is_assignable(b, sb),
                    TypeExpr::Wildcard { .. } => false,
                    _ => self.is_assignable(b, source),
                },
                WildcardBound::Super(b) => match source {
                    TypeExpr::Wildcard {
                        bound: WildcardBound::Super(sb),
                    } => self.is_assignable(sb, b),
                    TypeExpr::Wildcard { .. } => false,
                    _ => self.is_assignable(source, b),
                },
            },
            _ => false,
        }
    }
}

impl TypeSystem for SolverTypeSystem {
    fn lookup(&self, qualified_name: &str) -> Option<Arc<TypeDeclaration>> {
        match solve_in_chain(self.solver.as_ref(), qualified_name) {
            Ok(reference) => reference.into_solved(),
            Err(e) => {
                warn!(name = qualified_name, error = %e, "type lookup faulted");
                None
            }
        }
    }

    fn is_assignable(&self, target: &TypeExpr, source: &TypeExpr) -> bool {
        if target == source {
            return true;
        }
        match (target, source) {
            (TypeExpr::Primitive(t), TypeExpr::Primitive(s)) => s.widens_to(*t),
            (TypeExpr::Reference { name, .. }, _) if name == OBJECT => !source.is_primitive(),
            (TypeExpr::Array { element: t }, TypeExpr::Array { element: s }) => {
                // reference arrays are covariant; primitive arrays only
                // match exactly
                if t.is_primitive() || s.is_primitive() {
                    t == s
                } else {
                    self.is_assignable(t, s)
                }
            }
            (
                TypeExpr::Reference {
                    name: target_name,
                    args: target_args,
                },
                TypeExpr::Reference {
                    name: source_name,
                    args: source_args,
                },
            ) => {
                if target_name == source_name {
                    return self.arguments_contained(target_args, source_args);
                }
                self.ancestors(source).iter().any(|ancestor| {
                    matches!(
                        ancestor,
                        TypeExpr::Reference { name, args }
                            if name == target_name && self.arguments_contained(target_args, args)
                    )
                })
            }
            (TypeExpr::Wildcard { bound }, _) => match bound {
                WildcardBound::Unbounded => !source.is_primitive(),
                WildcardBound::Extends(b) => self.is_assignable(b, source),
                WildcardBound::Super(b) => self.is_assignable(source, b),
            },
            // type variables accept only identity; substitution happens
            // before assignability is asked
            _ => false,
        }
    }

    fn ancestors(&self, reference: &TypeExpr) -> Vec<TypeExpr> {
        let TypeExpr::Reference { name: start, .. } = reference else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(reference.describe());
        let mut queue: VecDeque<TypeExpr> = VecDeque::new();
        queue.push_back(reference.clone());

        while let Some(current) = queue.pop_front() {
            let TypeExpr::Reference { name, args } = &current else {
                continue;
            };
            let Some(declaration) = self.lookup(name) else {
                continue;
            };
            for supertype in &declaration.supertypes {
                let mut substituted = supertype.clone();
                for (tp, arg) in declaration.type_params.iter().zip(args.iter()) {
                    substituted = substituted.replace_type_variables(&tp.name, arg);
                }
                if !substituted.is_reference() {
                    continue;
                }
                if visited.insert(substituted.describe()) {
                    out.push(substituted.clone());
                    queue.push_back(substituted);
                }
            }
        }

        if start != OBJECT
            && !out
                .iter()
                .any(|a| matches!(a, TypeExpr::Reference { name, .. } if name == OBJECT))
        {
            out.push(self.object_type());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use typescope_api::models::{PrimitiveKind, TypeKind, TypeParameter};
    use typescope_core::solver::MemoryTypeSolver;

    fn declaration(
        qualified_name: &str,
        type_params: Vec<TypeParameter>,
        supertypes: Vec<TypeExpr>,
    ) -> Arc<TypeDeclaration> {
        Arc::new(TypeDeclaration {
            qualified_name: qualified_name.into(),
            name: qualified_name.rsplit('.').next().unwrap().into(),
            kind: TypeKind::Class,
            type_params,
            supertypes,
            methods: Vec::new(),
            fields: Vec::new(),
            nested: Vec::new(),
        })
    }

    fn hierarchy() -> SolverTypeSystem {
        let mut solver = MemoryTypeSolver::new();
        solver.insert(
            "com.acme.Animal",
            declaration("com.acme.Animal", Vec::new(), Vec::new()),
        );
        solver.insert(
            "com.acme.Dog",
            declaration(
                "com.acme.Dog",
                Vec::new(),
                vec![TypeExpr::reference("com.acme.Animal")],
            ),
        );
        solver.insert(
            "java.util.List",
            declaration(
                "java.util.List",
                vec![TypeParameter {
                    name: "E".into(),
                    bounds: Vec::new(),
                }],
                vec![TypeExpr::Reference {
                    name: "java.util.Collection".into(),
                    args: vec![TypeExpr::Variable {
                        name: "E".into(),
                        on_method: false,
                    }],
                }],
            ),
        );
        SolverTypeSystem::new(Arc::new(solver))
    }

    #[test]
    fn widening_and_identity_for_primitives() {
        let ts = hierarchy();
        let int = TypeExpr::Primitive(PrimitiveKind::Int);
        let long = TypeExpr::Primitive(PrimitiveKind::Long);
        assert!(ts.is_assignable(&long, &int));
        assert!(!ts.is_assignable(&int, &long));
    }

    #[test]
    fn subtype_assignability_goes_through_the_solver() {
        let ts = hierarchy();
        let animal = TypeExpr::reference("com.acme.Animal");
        let dog = TypeExpr::reference("com.acme.Dog");
        assert!(ts.is_assignable(&animal, &dog));
        assert!(!ts.is_assignable(&dog, &animal));
    }

    #[test]
    fn object_accepts_everything_but_primitives() {
        let ts = hierarchy();
        let object = ts.object_type();
        assert!(ts.is_assignable(&object, &TypeExpr::reference("com.acme.Unknown")));
        assert!(!ts.is_assignable(&object, &TypeExpr::Primitive(PrimitiveKind::Int)));
    }

    #[test]
    fn reference_arrays_are_covariant_primitive_arrays_are_not() {
        let ts = hierarchy();
        let animals = TypeExpr::array(TypeExpr::reference("com.acme.Animal"));
        let dogs = TypeExpr::array(TypeExpr::reference("com.acme.Dog"));
        assert!(ts.is_assignable(&animals, &dogs));
        let ints = TypeExpr::array(TypeExpr::Primitive(PrimitiveKind::Int));
        let bytes = TypeExpr::array(TypeExpr::Primitive(PrimitiveKind::Byte));
        assert!(!ts.is_assignable(&ints, &bytes));
    }

    #[test]
    fn ancestors_substitute_type_arguments() {
        let ts = hierarchy();
        let list_of_dogs = TypeExpr::Reference {
            name: "java.util.List".into(),
            args: vec![TypeExpr::reference("com.acme.Dog")],
        };
        let ancestors = ts.ancestors(&list_of_dogs);
        assert_eq!(
            ancestors[0],
            TypeExpr::Reference {
                name: "java.util.Collection".into(),
                args: vec![TypeExpr::reference("com.acme.Dog")],
            }
        );
        assert_eq!(ancestors.last().unwrap(), &ts.object_type());
    }

    #[test]
    fn wildcard_containment_respects_bounds() {
        let ts = hierarchy();
        let target = TypeExpr::Reference {
            name: "java.util.List".into(),
            args: vec![TypeExpr::Wildcard {
                bound: WildcardBound::Extends(Box::new(TypeExpr::reference("com.acme.Animal"))),
            }],
        };
        let source = TypeExpr::Reference {
            name: "java.util.List".into(),
            args: vec![TypeExpr::reference("com.acme.Dog")],
        };
        assert!(ts.is_assignable(&target, &source));

        let raw = TypeExpr::reference("java.util.List");
        assert!(ts.is_assignable(&raw, &source));
        assert!(!ts.is_assignable(&source, &raw));
    }
}
