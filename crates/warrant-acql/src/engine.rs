//! ACQL query evaluation

use crate::{
    AcqlConfig, AcqlError, AcqlQuery, CompletenessReport, ConsistencyReport, Contradiction,
    CoverageReport, DefeaterReport, DependencyEdge, DependencyReport, PotentialDefeater,
    QueryResult, QueryTarget, QueryType, SoundnessReport, TraceabilityReport, Weakness,
    WeaknessKind, WeaknessReport,
};
use std::collections::HashSet;
use tracing::warn;
use warrant_domain::text::{is_absolute_claim, is_security_claim};
use warrant_domain::{ArgumentGraph, ContradictionStrategy, GsnNode, NodeType};

/// Query engine over cases and fragments
#[derive(Debug, Clone, Default)]
pub struct AcqlEngine {
    config: AcqlConfig,
}

impl AcqlEngine {
    /// Create an engine with the given limits
    pub fn new(config: AcqlConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    pub fn config(&self) -> &AcqlConfig {
        &self.config
    }

    /// Run one query
    ///
    /// Recognised parameters: `strategy` (consistency: `negation` or
    /// `antonym`) and `threshold` (coverage: a number in [0, 1]).
    pub fn execute_query(&self, query: &AcqlQuery, target: QueryTarget<'_>) -> Result<QueryResult, AcqlError> {
        let result = match query.query_type {
            QueryType::Consistency => {
                let strategy = match query.param("strategy") {
                    Some(name) => name
                        .parse::<ContradictionStrategy>()
                        .map_err(|reason| AcqlError::InvalidParameter {
                            name: "strategy".to_string(),
                            reason,
                        })?,
                    None => ContradictionStrategy::NegationOverlap,
                };
                QueryResult::Consistency(self.check_consistency(target, strategy))
            }
            QueryType::Completeness => QueryResult::Completeness(self.check_completeness(target)),
            QueryType::Soundness => QueryResult::Soundness(self.check_soundness(target)),
            QueryType::Coverage => {
                let threshold = match query.param("threshold") {
                    Some(raw) => parse_threshold(raw)?,
                    None => self.config.coverage_threshold,
                };
                QueryResult::Coverage(self.check_coverage(target, threshold))
            }
            QueryType::Traceability => QueryResult::Traceability(self.check_traceability(target)),
            QueryType::Weaknesses => QueryResult::Weaknesses(self.find_weaknesses(target)),
            QueryType::Dependencies => QueryResult::Dependencies(self.check_dependencies(target)),
            QueryType::Defeaters => QueryResult::Defeaters(self.find_defeaters(target)),
        };
        Ok(result)
    }

    /// Pairwise contradiction check over the target's goals
    pub fn check_consistency(&self, target: QueryTarget<'_>, strategy: ContradictionStrategy) -> ConsistencyReport {
        let graph = target.graph();
        let mut goals: Vec<&GsnNode> = graph.of_type(NodeType::Goal).collect();

        let mut goals_skipped = 0;
        if goals.len() > self.config.max_pairwise_goals {
            goals_skipped = goals.len() - self.config.max_pairwise_goals;
            warn!(
                target = target.id(),
                goals = goals.len(),
                limit = self.config.max_pairwise_goals,
                "Consistency check truncated"
            );
            goals.truncate(self.config.max_pairwise_goals);
        }

        let mut contradictions = Vec::new();
        for (i, a) in goals.iter().enumerate() {
            for b in &goals[i + 1..] {
                if strategy.contradicts(&a.statement, &b.statement) {
                    contradictions.push(Contradiction {
                        goal1_id: a.id.clone(),
                        goal1: a.statement.clone(),
                        goal2_id: b.id.clone(),
                        goal2: b.statement.clone(),
                    });
                }
            }
        }

        ConsistencyReport {
            consistent: contradictions.is_empty(),
            contradictions,
            nodes_checked: graph.len(),
            strategy,
            goals_skipped,
        }
    }

    /// Required element kinds, orphans and unsupported leaves
    pub fn check_completeness(&self, target: QueryTarget<'_>) -> CompletenessReport {
        let graph = target.graph();
        let root = target.root_goal_id();

        let has = |t: NodeType| graph.of_type(t).next().is_some();
        let has_goal = has(NodeType::Goal);
        let has_strategy = has(NodeType::Strategy);
        let has_solution = has(NodeType::Solution);
        let has_evidence = !target.evidence_ids().is_empty();

        let mut missing = Vec::new();
        if !has_goal {
            missing.push("No goals defined".to_string());
        }
        if !has_strategy {
            missing.push("No strategies defined".to_string());
        }
        if !has_solution {
            missing.push("No solutions provided".to_string());
        }
        if !has_evidence {
            missing.push("No evidence linked".to_string());
        }

        let orphan_count = graph
            .iter()
            .filter(|n| n.parent_ids.is_empty() && Some(n.id.as_str()) != root)
            .count();
        if orphan_count > 0 {
            missing.push(format!("{} orphan nodes", orphan_count));
        }

        let unsupported_leaves = graph
            .leaves()
            .filter(|n| !n.has_evidence() && !n.is(NodeType::Context))
            .count();
        if unsupported_leaves > 0 {
            missing.push(format!("{} leaf nodes without evidence", unsupported_leaves));
        }

        CompletenessReport {
            complete: missing.is_empty(),
            missing_elements: missing,
            has_goal,
            has_strategy,
            has_solution,
            has_evidence,
            orphan_count,
            unsupported_leaves,
        }
    }

    /// Strategies without sub-goals and leaf goals without evidence
    pub fn check_soundness(&self, target: QueryTarget<'_>) -> SoundnessReport {
        let graph = target.graph();
        let mut issues = Vec::new();

        for node in graph.iter() {
            if node.is(NodeType::Strategy) && node.is_leaf() {
                issues.push(format!("Strategy '{}' has no sub-goals", node.id));
            }
            if node.is(NodeType::Goal) && node.is_leaf() && !node.has_evidence() {
                issues.push(format!("Goal '{}' lacks support", node.id));
            }
        }

        SoundnessReport {
            sound: issues.is_empty(),
            issues,
            nodes_checked: graph.len(),
        }
    }

    /// Share of leaves with evidence, compared against `threshold`
    pub fn check_coverage(&self, target: QueryTarget<'_>, threshold: f64) -> CoverageReport {
        let graph = target.graph();
        let total_leaves = graph.leaves().count();
        let supported_leaves = graph.leaves().filter(|n| n.has_evidence()).count();

        let coverage_ratio = if total_leaves > 0 {
            supported_leaves as f64 / total_leaves as f64
        } else {
            0.0
        };

        CoverageReport {
            coverage_ratio,
            total_leaves,
            supported_leaves,
            evidence_count: target.evidence_ids().len(),
            adequate_coverage: coverage_ratio >= threshold,
            threshold,
        }
    }

    /// Enumerate root-to-evidence paths
    pub fn check_traceability(&self, target: QueryTarget<'_>) -> TraceabilityReport {
        let Some(root) = target.root_goal_id() else {
            return TraceabilityReport {
                traceable: false,
                reason: Some("No root goal defined".to_string()),
                paths_count: 0,
                average_path_length: 0.0,
                truncated: false,
            };
        };

        let mut tracer = PathTracer {
            graph: target.graph(),
            limit: self.config.max_trace_paths,
            budget: self.config.max_trace_expansions,
            expansions: 0,
            on_path: HashSet::new(),
            depth: 0,
            paths: 0,
            total_length: 0,
            truncated: false,
        };
        tracer.visit(root);

        if tracer.truncated {
            warn!(
                target = target.id(),
                paths = tracer.paths,
                expansions = tracer.expansions,
                "Traceability path enumeration truncated"
            );
        }

        TraceabilityReport {
            traceable: tracer.paths > 0,
            reason: None,
            paths_count: tracer.paths,
            average_path_length: if tracer.paths > 0 {
                tracer.total_length as f64 / tracer.paths as f64
            } else {
                0.0
            },
            truncated: tracer.truncated,
        }
    }

    /// Collect every failing structural check
    pub fn find_weaknesses(&self, target: QueryTarget<'_>) -> WeaknessReport {
        let mut weaknesses = Vec::new();

        let consistency = self.check_consistency(target, ContradictionStrategy::NegationOverlap);
        if !consistency.consistent {
            weaknesses.push(Weakness {
                kind: WeaknessKind::Consistency,
                details: consistency
                    .contradictions
                    .iter()
                    .map(|c| format!("'{}' contradicts '{}'", c.goal1, c.goal2))
                    .collect(),
            });
        }

        let completeness = self.check_completeness(target);
        if !completeness.complete {
            weaknesses.push(Weakness {
                kind: WeaknessKind::Completeness,
                details: completeness.missing_elements,
            });
        }

        let soundness = self.check_soundness(target);
        if !soundness.sound {
            weaknesses.push(Weakness {
                kind: WeaknessKind::Soundness,
                details: soundness.issues,
            });
        }

        let coverage = self.check_coverage(target, self.config.coverage_threshold);
        if !coverage.adequate_coverage {
            weaknesses.push(Weakness {
                kind: WeaknessKind::Coverage,
                details: vec![format!(
                    "Only {:.1}% coverage",
                    coverage.coverage_ratio * 100.0
                )],
            });
        }

        WeaknessReport {
            weakness_count: weaknesses.len(),
            weaknesses,
        }
    }

    /// Fragment dependencies, or every parent → child edge of a case
    pub fn check_dependencies(&self, target: QueryTarget<'_>) -> DependencyReport {
        match target {
            QueryTarget::Fragment(fragment) => DependencyReport::Fragment {
                has_dependencies: !fragment.depends_on.is_empty(),
                dependency_count: fragment.depends_on.len(),
                dependencies: fragment.depends_on.iter().cloned().collect(),
                provides_to: fragment.provides_to.iter().cloned().collect(),
            },
            QueryTarget::Case(case) => {
                let chains: Vec<DependencyEdge> = case
                    .graph()
                    .iter()
                    .flat_map(|node| {
                        node.parent_ids.iter().map(move |parent| DependencyEdge {
                            from: parent.clone(),
                            to: node.id.clone(),
                        })
                    })
                    .collect();
                DependencyReport::Case {
                    chain_count: chains.len(),
                    chains,
                }
            }
        }
    }

    /// Goals making absolute claims, and security claims without evidence
    pub fn find_defeaters(&self, target: QueryTarget<'_>) -> DefeaterReport {
        let mut found = Vec::new();

        for goal in target.graph().of_type(NodeType::Goal) {
            if is_absolute_claim(&goal.statement) {
                found.push(PotentialDefeater {
                    node_id: goal.id.clone(),
                    claim: goal.statement.clone(),
                    reason: "Absolute claim vulnerable to counterexample".to_string(),
                });
            }
            if is_security_claim(&goal.statement) && !goal.has_evidence() {
                found.push(PotentialDefeater {
                    node_id: goal.id.clone(),
                    claim: goal.statement.clone(),
                    reason: "Security claim without evidence".to_string(),
                });
            }
        }

        DefeaterReport {
            defeater_count: found.len(),
            potential_defeaters: found,
        }
    }
}

fn parse_threshold(raw: &str) -> Result<f64, AcqlError> {
    let invalid = |reason: &str| AcqlError::InvalidParameter {
        name: "threshold".to_string(),
        reason: reason.to_string(),
    };
    let value: f64 = raw.parse().map_err(|_| invalid("not a number"))?;
    if !(0.0..=1.0).contains(&value) {
        return Err(invalid("must be between 0 and 1"));
    }
    Ok(value)
}

// Depth-first path enumeration that never revisits a node on the current path.
// Stops at `limit` evidenced paths or `budget` node expansions, whichever
// comes first; shared sub-graphs make the number of paths exponential.
struct PathTracer<'g> {
    graph: &'g ArgumentGraph,
    limit: usize,
    budget: usize,
    expansions: usize,
    on_path: HashSet<&'g str>,
    depth: usize,
    paths: usize,
    total_length: usize,
    truncated: bool,
}

impl<'g> PathTracer<'g> {
    fn visit(&mut self, id: &'g str) {
        if self.truncated {
            return;
        }
        let graph = self.graph;
        let Some(node) = graph.get(id) else {
            return;
        };
        if self.expansions >= self.budget {
            self.truncated = true;
            return;
        }
        self.expansions += 1;

        self.on_path.insert(id);
        self.depth += 1;

        if node.has_evidence() {
            if self.paths >= self.limit {
                self.truncated = true;
            } else {
                self.paths += 1;
                self.total_length += self.depth;
            }
        }

        for child in &node.child_ids {
            if !self.on_path.contains(child.as_str()) {
                self.visit(child);
            }
        }

        self.depth -= 1;
        self.on_path.remove(id);
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use warrant_domain::AssuranceCase;

    proptest! {
        /// Property: coverage ratio is evidenced leaves over leaves, within [0, 1]
        #[test]
        fn test_coverage_ratio_bounds(evidenced in prop::collection::vec(any::<bool>(), 0..20)) {
            let mut case = AssuranceCase::new("p", "p", "");
            case.add_node(GsnNode::new("root", NodeType::Goal, "root"));
            for (i, has_ev) in evidenced.iter().enumerate() {
                let id = format!("leaf{}", i);
                case.add_node(GsnNode::new(id.clone(), NodeType::Solution, "leaf"));
                case.link_nodes("root", &id).unwrap();
                if *has_ev {
                    case.link_evidence(&id, "ev").unwrap();
                }
            }

            let report = AcqlEngine::default().check_coverage(QueryTarget::Case(&case), 0.8);
            prop_assert!((0.0..=1.0).contains(&report.coverage_ratio));
            if evidenced.is_empty() {
                // the root itself is the only leaf
                prop_assert_eq!(report.total_leaves, 1);
            } else {
                prop_assert_eq!(report.total_leaves, evidenced.len());
                prop_assert_eq!(report.supported_leaves, evidenced.iter().filter(|e| **e).count());
            }
        }
    }
}
