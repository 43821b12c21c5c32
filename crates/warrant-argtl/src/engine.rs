//! ArgTL engine: composition, linking, validation and case assembly
//!
//! Every direct method fails fast with an [`ArgTlError`]. Composition
//! deep-copies source nodes into the new fragment, so the sources are left
//! exactly as they were.

use crate::{ArgTlError, CompositionStrategy, Transformation, TransformationKind};
use serde_json::json;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info};
use warrant_domain::{AssuranceCase, AssuranceCaseFragment, GsnNode, NodeType};
use warrant_fragments::FragmentLibrary;

/// A named validation rule
///
/// Rules see the fragment under test and the library it lives in, so they can
/// inspect dependencies.
pub type ValidationRule = Box<dyn Fn(&AssuranceCaseFragment, &FragmentLibrary) -> bool>;

/// Minimum assessed strength a dependency needs for the `dependencies` rule
pub const MIN_DEPENDENCY_STRENGTH: f64 = 0.5;

/// Transformation engine over a fragment library
pub struct ArgTlEngine {
    library: FragmentLibrary,
    history: Vec<Transformation>,
    validators: Vec<(String, ValidationRule)>,
}

impl fmt::Debug for ArgTlEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgTlEngine")
            .field("fragments", &self.library.len())
            .field("history", &self.history.len())
            .field("validators", &self.validator_names())
            .finish()
    }
}

impl ArgTlEngine {
    /// Create an engine over a library, with the default validators
    pub fn new(library: FragmentLibrary) -> Self {
        let mut engine = Self {
            library,
            history: Vec::new(),
            validators: Vec::new(),
        };
        engine.register_default_validators();
        engine
    }

    fn register_default_validators(&mut self) {
        self.register_validator("completeness", |fragment, _| {
            fragment.required_evidence_types.is_empty()
        });
        self.register_validator("structure", |fragment, _| {
            fragment.root_goal_id().is_some() && fragment.node_count() > 0
        });
        self.register_validator("dependencies", |fragment, library| {
            fragment.depends_on.iter().all(|dep| {
                library
                    .get_fragment(dep)
                    .is_some_and(|d| d.assessment().strength_score >= MIN_DEPENDENCY_STRENGTH)
            })
        });
    }

    /// Register (or replace) a validation rule
    pub fn register_validator<F>(&mut self, name: &str, rule: F)
    where
        F: Fn(&AssuranceCaseFragment, &FragmentLibrary) -> bool + 'static,
    {
        let rule: ValidationRule = Box::new(rule);
        match self.validators.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = rule,
            None => self.validators.push((name.to_string(), rule)),
        }
    }

    /// Names of registered rules, in registration order
    pub fn validator_names(&self) -> Vec<&str> {
        self.validators.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// The underlying fragment library
    pub fn library(&self) -> &FragmentLibrary {
        &self.library
    }

    /// Mutable access to the fragment library
    pub fn library_mut(&mut self) -> &mut FragmentLibrary {
        &mut self.library
    }

    /// Give the library back
    pub fn into_library(self) -> FragmentLibrary {
        self.library
    }

    /// Every transformation applied so far, oldest first
    pub fn history(&self) -> &[Transformation] {
        &self.history
    }

    /// Compose fragments into a new fragment stored under `target_id`
    pub fn compose(
        &mut self,
        fragment_ids: &[&str],
        target_id: &str,
        strategy: CompositionStrategy,
    ) -> Result<&AssuranceCaseFragment, ArgTlError> {
        if fragment_ids.is_empty() {
            return Err(ArgTlError::InvalidState(
                "no fragments given to compose".to_string(),
            ));
        }

        let missing: Vec<&str> = fragment_ids
            .iter()
            .copied()
            .filter(|id| !self.library.contains(id))
            .collect();
        if !missing.is_empty() {
            return Err(ArgTlError::InvalidState(format!(
                "cannot compose unknown fragments: {}",
                missing.join(", ")
            )));
        }

        let sources: Vec<&AssuranceCaseFragment> = fragment_ids
            .iter()
            .filter_map(|id| self.library.get_fragment(id))
            .collect();

        let names: Vec<&str> = sources.iter().map(|f| f.name.as_str()).collect();
        let mut composed = AssuranceCaseFragment::new(
            target_id,
            format!("Composed: {}", names.join(", ")),
            sources[0].fragment_type,
            "Composition of multiple fragments",
        );

        match strategy {
            CompositionStrategy::Parallel => compose_parallel(&mut composed, &sources)?,
            CompositionStrategy::Sequential => compose_sequential(&mut composed, &sources)?,
            CompositionStrategy::Hierarchical => compose_hierarchical(&mut composed, &sources)?,
        }

        info!(
            target = target_id,
            strategy = %strategy,
            sources = sources.len(),
            nodes = composed.node_count(),
            "Composed fragments"
        );

        self.history.push(Transformation::new(
            TransformationKind::Compose,
            fragment_ids.iter().map(|s| s.to_string()).collect(),
            Some(target_id.to_string()),
            json!({ "strategy": strategy.as_str() }),
        ));
        Ok(self.library.insert_fragment(composed))
    }

    /// Record that `source_id` depends on `target_id` through an interface point
    pub fn link_fragments(
        &mut self,
        source_id: &str,
        target_id: &str,
        interface_point: &str,
    ) -> Result<(), ArgTlError> {
        for id in [source_id, target_id] {
            if !self.library.contains(id) {
                return Err(ArgTlError::NotFound(format!("fragment '{}'", id)));
            }
        }

        if let Some(source) = self.library.get_fragment_mut(source_id) {
            source.add_dependency(target_id, interface_point);
        }
        if let Some(target) = self.library.get_fragment_mut(target_id) {
            target.add_consumer(source_id);
        }

        self.history.push(Transformation::new(
            TransformationKind::Link,
            vec![source_id.to_string(), target_id.to_string()],
            None,
            json!({ "interface": interface_point }),
        ));
        Ok(())
    }

    /// Evaluate validation rules against a fragment
    ///
    /// With `rules = None` every registered rule runs. Unknown rule names map
    /// to `None`.
    pub fn validate_fragment(
        &mut self,
        fragment_id: &str,
        rules: Option<&[&str]>,
    ) -> Result<BTreeMap<String, Option<bool>>, ArgTlError> {
        let fragment = self
            .library
            .get_fragment(fragment_id)
            .ok_or_else(|| ArgTlError::NotFound(format!("fragment '{}'", fragment_id)))?;

        let selected: Vec<String> = match rules {
            Some(names) => names.iter().map(|s| s.to_string()).collect(),
            None => self.validators.iter().map(|(n, _)| n.clone()).collect(),
        };

        let mut results = BTreeMap::new();
        for name in &selected {
            let outcome = self
                .validators
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, rule)| rule(fragment, &self.library));
            results.insert(name.clone(), outcome);
        }
        debug!(fragment = fragment_id, ?results, "Validated fragment");

        self.history.push(Transformation::new(
            TransformationKind::Validate,
            vec![fragment_id.to_string()],
            None,
            json!({ "rules": selected, "results": results }),
        ));
        Ok(results)
    }

    /// Compose fragments hierarchically and wrap the result in a case
    ///
    /// Every evidence id of the composition is linked to every leaf node.
    pub fn assemble_case(
        &mut self,
        fragment_ids: &[&str],
        case_id: &str,
        title: &str,
    ) -> Result<AssuranceCase, ArgTlError> {
        let composed_id = format!("{}_composed", case_id);
        let composed = self.compose(fragment_ids, &composed_id, CompositionStrategy::Hierarchical)?;

        let mut case = AssuranceCase::new(
            case_id,
            title,
            format!("Assembled from {} fragments", fragment_ids.len()),
        );
        for node in composed.graph().iter() {
            case.add_node(node.clone());
        }
        if let Some(root) = composed.root_goal_id() {
            case.set_root_goal(root)?;
        }

        let leaves = composed.graph().leaf_ids();
        for evidence_id in &composed.evidence_ids {
            for leaf in &leaves {
                case.link_evidence(leaf, evidence_id)?;
            }
        }

        info!(
            case = case_id,
            nodes = case.node_count(),
            evidence = composed.evidence_ids.len(),
            "Assembled assurance case"
        );
        Ok(case)
    }
}

fn compose_parallel(
    target: &mut AssuranceCaseFragment,
    sources: &[&AssuranceCaseFragment],
) -> Result<(), ArgTlError> {
    let root_id = format!("{}_root", target.id);
    let strategy_id = format!("{}_strategy", target.id);

    target.add_node(GsnNode::new(
        root_id.clone(),
        NodeType::Goal,
        "All components meet requirements",
    ));
    target.set_root_goal(&root_id)?;
    target.add_node(GsnNode::new(
        strategy_id.clone(),
        NodeType::Strategy,
        "Argue over each component independently",
    ));
    target.link_nodes(&root_id, &strategy_id)?;

    for source in sources {
        let Some(source_root) = source.root_goal_id() else {
            debug!(fragment = %source.id, "Skipping fragment without root goal");
            continue;
        };
        target.absorb_nodes(source.graph());
        target.link_nodes(&strategy_id, source_root)?;
        target.merge_evidence_from(source);
    }
    Ok(())
}

fn compose_sequential(
    target: &mut AssuranceCaseFragment,
    sources: &[&AssuranceCaseFragment],
) -> Result<(), ArgTlError> {
    let first = sources[0];
    if let Some(root) = first.root_goal_id() {
        target.absorb_nodes(first.graph());
        target.set_root_goal(root)?;
    }
    target.merge_evidence_from(first);

    for pair in sources.windows(2) {
        let (previous, source) = (pair[0], pair[1]);
        if let Some(source_root) = source.root_goal_id() {
            target.absorb_nodes(source.graph());
            for leaf in previous.graph().leaf_ids() {
                if target.get_node(&leaf).is_some() {
                    target.link_nodes(&leaf, source_root)?;
                }
            }
        }
        target.merge_evidence_from(source);
    }
    Ok(())
}

fn compose_hierarchical(
    target: &mut AssuranceCaseFragment,
    sources: &[&AssuranceCaseFragment],
) -> Result<(), ArgTlError> {
    let parent = sources[0];
    target.absorb_nodes(parent.graph());
    if let Some(root) = parent.root_goal_id() {
        target.set_root_goal(root)?;
    }
    target.merge_evidence_from(parent);

    let parent_leaves = parent.graph().leaf_ids();
    for (i, child) in sources[1..].iter().enumerate() {
        if let Some(child_root) = child.root_goal_id() {
            target.absorb_nodes(child.graph());
            if !parent_leaves.is_empty() {
                let leaf = &parent_leaves[i % parent_leaves.len()];
                target.link_nodes(leaf, child_root)?;
            }
        }
        target.merge_evidence_from(child);
    }
    Ok(())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: parallel composition adds exactly two nodes over the
        /// disjoint sources and unions their evidence
        #[test]
        fn test_parallel_node_count(
            patterns in prop::collection::vec(0..3usize, 1..5),
            evidence in prop::collection::vec("[a-z]{3,6}", 0..6),
        ) {
            let names = ["component_quality", "component_security", "integration"];
            let mut library = FragmentLibrary::new();
            let mut ids = Vec::new();
            for (i, p) in patterns.iter().enumerate() {
                let id = format!("f{}", i);
                library.create_from_pattern_with_id(names[*p], "c", &id).unwrap();
                ids.push(id);
            }
            for (i, ev) in evidence.iter().enumerate() {
                let id = &ids[i % ids.len()];
                library.get_fragment_mut(id).unwrap().link_evidence(ev, "none");
            }
            let expected_nodes: usize = ids.iter().map(|id| library.get_fragment(id).unwrap().node_count()).sum();
            let expected_evidence: std::collections::BTreeSet<String> = evidence.iter().cloned().collect();

            let mut engine = ArgTlEngine::new(library);
            let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
            let composed = engine.compose(&refs, "target", CompositionStrategy::Parallel).unwrap();

            prop_assert_eq!(composed.node_count(), expected_nodes + 2);
            prop_assert_eq!(&composed.evidence_ids, &expected_evidence);
        }
    }
}
