//! Fragment library implementation

use crate::{default_patterns, FragmentError, FragmentPattern};
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tracing::debug;
use warrant_domain::{AssuranceCaseFragment, FragmentStatus, FragmentType, GsnNode, NodeType};

/// Store of fragments and the patterns used to create them
///
/// Fragments and patterns are both kept in insertion order.
#[derive(Debug, Clone)]
pub struct FragmentLibrary {
    fragments: HashMap<String, AssuranceCaseFragment>,
    order: Vec<String>,
    patterns: Vec<(String, FragmentPattern)>,
}

impl Default for FragmentLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl FragmentLibrary {
    /// Create a library seeded with the default patterns
    pub fn new() -> Self {
        let mut library = Self::empty();
        library.patterns = default_patterns();
        library
    }

    /// Create a library with no patterns at all
    pub fn empty() -> Self {
        Self {
            fragments: HashMap::new(),
            order: Vec::new(),
            patterns: Vec::new(),
        }
    }

    /// Register (or replace) a pattern
    ///
    /// The structure must be non-empty and begin with a Goal, which becomes
    /// the root of every instantiated fragment.
    pub fn register_pattern(&mut self, name: &str, pattern: FragmentPattern) -> Result<(), FragmentError> {
        match pattern.structure.first() {
            None => {
                return Err(FragmentError::InvalidPattern(format!(
                    "pattern '{}' has no structure",
                    name
                )))
            }
            Some(step) if step.node_type != NodeType::Goal => {
                return Err(FragmentError::InvalidPattern(format!(
                    "pattern '{}' must start with a goal, found {}",
                    name, step.node_type
                )))
            }
            Some(_) => {}
        }

        match self.patterns.iter_mut().find(|(existing, _)| existing == name) {
            Some(slot) => slot.1 = pattern,
            None => self.patterns.push((name.to_string(), pattern)),
        }
        debug!(pattern = name, "Registered fragment pattern");
        Ok(())
    }

    /// Look up a pattern
    pub fn get_pattern(&self, name: &str) -> Option<&FragmentPattern> {
        self.patterns.iter().find(|(n, _)| n == name).map(|(_, p)| p)
    }

    /// Names of registered patterns
    pub fn pattern_names(&self) -> Vec<&str> {
        self.patterns.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Registered patterns with their names
    pub fn patterns(&self) -> impl Iterator<Item = (&str, &FragmentPattern)> {
        self.patterns.iter().map(|(n, p)| (n.as_str(), p))
    }

    /// Instantiate a pattern with a generated fragment id
    pub fn create_from_pattern(
        &mut self,
        pattern_name: &str,
        component_name: &str,
    ) -> Result<&AssuranceCaseFragment, FragmentError> {
        let id = self.generate_fragment_id(pattern_name, component_name);
        self.create_from_pattern_with_id(pattern_name, component_name, &id)
    }

    /// Instantiate a pattern under an explicit fragment id
    ///
    /// An existing fragment with the same id is replaced.
    pub fn create_from_pattern_with_id(
        &mut self,
        pattern_name: &str,
        component_name: &str,
        fragment_id: &str,
    ) -> Result<&AssuranceCaseFragment, FragmentError> {
        let pattern = self
            .get_pattern(pattern_name)
            .ok_or_else(|| FragmentError::NotFound(format!("pattern '{}'", pattern_name)))?;

        let mut fragment = AssuranceCaseFragment::new(
            fragment_id,
            pattern.name.clone(),
            pattern.fragment_type,
            format!("{} for {}", pattern.name, component_name),
        )
        .with_component(component_name);

        for evidence_type in &pattern.required_evidence {
            fragment.require_evidence(evidence_type);
        }

        let mut parents: Vec<String> = Vec::new();
        for (n, step) in pattern.structure.iter().enumerate() {
            let node_id = format!("{}_node_{}", fragment_id, n + 1);
            fragment.add_node(GsnNode::new(node_id.clone(), step.node_type, step.statement.clone()));

            if n == 0 {
                fragment.set_root_goal(&node_id)?;
                parents.push(node_id);
                continue;
            }

            if let Some(parent) = parents.last() {
                fragment.link_nodes(parent, &node_id)?;
            }
            if step.node_type == NodeType::Strategy {
                parents.push(node_id);
            }
        }

        debug!(
            fragment = fragment_id,
            pattern = pattern_name,
            nodes = fragment.node_count(),
            "Created fragment from pattern"
        );
        Ok(self.insert_fragment(fragment))
    }

    /// Store a fragment, replacing any fragment with the same id
    pub fn insert_fragment(&mut self, fragment: AssuranceCaseFragment) -> &AssuranceCaseFragment {
        let id = fragment.id.clone();
        if !self.fragments.contains_key(&id) {
            self.order.push(id.clone());
        }
        self.fragments.insert(id.clone(), fragment);
        &self.fragments[&id]
    }

    /// Look up a fragment
    pub fn get_fragment(&self, id: &str) -> Option<&AssuranceCaseFragment> {
        self.fragments.get(id)
    }

    /// Look up a fragment for mutation
    pub fn get_fragment_mut(&mut self, id: &str) -> Option<&mut AssuranceCaseFragment> {
        self.fragments.get_mut(id)
    }

    /// True if a fragment with this id exists
    pub fn contains(&self, id: &str) -> bool {
        self.fragments.contains_key(id)
    }

    /// Number of stored fragments
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True if no fragments are stored
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Fragments in insertion order, optionally filtered by type and status
    pub fn list_fragments(
        &self,
        fragment_type: Option<FragmentType>,
        status: Option<FragmentStatus>,
    ) -> Vec<&AssuranceCaseFragment> {
        self.order
            .iter()
            .filter_map(|id| self.fragments.get(id))
            .filter(|f| fragment_type.is_none_or(|t| f.fragment_type == t))
            .filter(|f| status.is_none_or(|s| f.status() == s))
            .collect()
    }

    fn generate_fragment_id(&self, pattern_name: &str, component_name: &str) -> String {
        let seed = format!("{}:{}:{}", pattern_name, component_name, Utc::now().to_rfc3339());
        let mut salt = 0u32;
        loop {
            let mut hasher = Sha256::new();
            hasher.update(seed.as_bytes());
            if salt > 0 {
                hasher.update(salt.to_string().as_bytes());
            }
            let id = hex::encode(hasher.finalize())[..16].to_string();
            if !self.contains(&id) {
                return id;
            }
            salt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PatternStep;

    #[test]
    fn test_default_patterns_loaded() {
        let library = FragmentLibrary::new();
        assert_eq!(
            library.pattern_names(),
            vec!["component_quality", "component_security", "integration"]
        );
        assert!(FragmentLibrary::empty().pattern_names().is_empty());
    }

    #[test]
    fn test_create_from_pattern_structure() {
        let mut library = FragmentLibrary::new();
        let f = library
            .create_from_pattern_with_id("component_security", "payments", "pay_sec")
            .unwrap();

        assert_eq!(f.name, "Component Security Assurance");
        assert_eq!(f.description, "Component Security Assurance for payments");
        assert_eq!(f.fragment_type, FragmentType::Security);
        assert_eq!(f.component_name.as_deref(), Some("payments"));
        assert_eq!(f.root_goal_id(), Some("pay_sec_node_1"));
        assert!(f.required_evidence_types.contains("threat_model"));

        let strategy = f.get_node("pay_sec_node_2").unwrap();
        assert_eq!(strategy.parent_ids, vec!["pay_sec_node_1".to_string()]);
        assert_eq!(
            strategy.child_ids,
            vec!["pay_sec_node_3", "pay_sec_node_4", "pay_sec_node_5"]
        );
    }

    #[test]
    fn test_generated_ids_are_hex16() {
        let mut library = FragmentLibrary::new();
        let id = library
            .create_from_pattern("integration", "gateway")
            .unwrap()
            .id
            .clone();
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        let fragment = library.get_fragment(&id).unwrap();
        assert!(fragment.get_node(&format!("{}_node_1", id)).is_some());
    }

    #[test]
    fn test_unknown_pattern() {
        let mut library = FragmentLibrary::new();
        let err = library.create_from_pattern("nope", "x").unwrap_err();
        assert!(matches!(err, FragmentError::NotFound(_)));
        assert!(library.is_empty());
    }

    #[test]
    fn test_register_pattern_validation() {
        let mut library = FragmentLibrary::new();
        let empty = FragmentPattern {
            name: "Empty".into(),
            fragment_type: FragmentType::Component,
            required_evidence: vec![],
            structure: vec![],
        };
        assert!(matches!(
            library.register_pattern("empty", empty),
            Err(FragmentError::InvalidPattern(_))
        ));

        let bad_root = FragmentPattern {
            name: "Bad".into(),
            fragment_type: FragmentType::Component,
            required_evidence: vec![],
            structure: vec![PatternStep::new(NodeType::Strategy, "s")],
        };
        assert!(library.register_pattern("bad", bad_root).is_err());

        let perf = FragmentPattern {
            name: "Performance".into(),
            fragment_type: FragmentType::Performance,
            required_evidence: vec!["load_test".into()],
            structure: vec![
                PatternStep::new(NodeType::Goal, "Fast enough"),
                PatternStep::new(NodeType::Solution, "Load test"),
            ],
        };
        library.register_pattern("performance", perf).unwrap();
        let f = library
            .create_from_pattern_with_id("performance", "api", "perf")
            .unwrap();
        assert_eq!(f.get_node("perf_node_2").unwrap().parent_ids, vec!["perf_node_1"]);
    }

    #[test]
    fn test_list_fragments_filters() {
        let mut library = FragmentLibrary::new();
        library.create_from_pattern_with_id("component_quality", "a", "qa").unwrap();
        library.create_from_pattern_with_id("component_security", "a", "sa").unwrap();
        library.create_from_pattern_with_id("component_quality", "b", "qb").unwrap();

        let ids: Vec<&str> = library
            .list_fragments(Some(FragmentType::Quality), None)
            .iter()
            .map(|f| f.id.as_str())
            .collect();
        assert_eq!(ids, vec!["qa", "qb"]);
        assert_eq!(library.list_fragments(None, Some(FragmentStatus::Draft)).len(), 3);
        assert!(library
            .list_fragments(None, Some(FragmentStatus::Validated))
            .is_empty());
    }
}
