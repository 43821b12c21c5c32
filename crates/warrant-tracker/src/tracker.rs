//! Resource registry, links and change propagation

use crate::{Dependency, DependencyType, NewResource, Resource, ResourceType, TrackerError};
use chrono::Utc;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use tracing::debug;

/// What happened to a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    /// Registered
    Created,
    /// Gained a link
    Linked,
    /// Metadata or version changed
    Updated,
    /// A resource it depends on was updated
    DependencyUpdated,
}

/// Callback invoked with the affected resource
pub type Listener = Box<dyn Fn(&Resource, UpdateKind)>;

/// Which links of a resource to return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Links where the resource is the target
    Incoming,
    /// Links where the resource is the source
    Outgoing,
    /// Both
    #[default]
    Both,
}

/// One step of a dependency chain
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainLink {
    /// Dependent resource
    pub resource: Resource,
    /// Link meaning
    pub dependency_type: DependencyType,
    /// Further dependents, until the depth limit
    pub children: Vec<ChainLink>,
}

/// Outgoing links of a resource, expanded recursively
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencyChain {
    /// Starting resource
    pub resource_id: String,
    /// First-level dependents
    pub dependencies: Vec<ChainLink>,
}

/// A resource reached by impact analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactedResource {
    /// The impacted resource
    pub resource: Resource,
    /// Type of the link it was first reached through
    pub dependency_type: DependencyType,
    /// Hops from the changed resource
    pub depth: usize,
}

/// Everything a change to one resource can reach
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactReport {
    /// The changed resource
    pub resource: Resource,
    /// Number of impacted resources
    pub impacted_count: usize,
    /// Impacted resources in breadth-first order
    pub impacted_resources: Vec<ImpactedResource>,
}

/// Tracker totals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackerStatistics {
    /// Registered resources
    pub total_resources: usize,
    /// Links
    pub total_dependencies: usize,
    /// Resource count per type, including zero counts
    pub resources_by_type: BTreeMap<ResourceType, usize>,
    /// Distinct owning tools
    pub tools: BTreeSet<String>,
}

/// Cross-tool registry of resources and the links between them
///
/// A link runs from the resource depended upon (source) to the dependent
/// (target); updates and impact flow along that direction.
#[derive(Default)]
pub struct DependencyTracker {
    resources: Vec<Resource>,
    index: HashMap<String, usize>,
    dependencies: Vec<Dependency>,
    listeners: HashMap<String, Vec<Listener>>,
}

impl fmt::Debug for DependencyTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyTracker")
            .field("resources", &self.resources.len())
            .field("dependencies", &self.dependencies.len())
            .field("listeners", &self.listeners.values().map(Vec::len).sum::<usize>())
            .finish()
    }
}

impl DependencyTracker {
    /// Empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource and return its id
    ///
    /// Without an explicit id the id is the first 16 hex characters of the
    /// SHA-256 of `type:name:location:tool`. Registering an existing id
    /// replaces the resource.
    pub fn register_resource(&mut self, request: NewResource) -> String {
        let id = request.id.clone().unwrap_or_else(|| {
            resource_id(request.resource_type, &request.name, &request.location, &request.tool)
        });
        let now = Utc::now();
        let resource = Resource {
            id: id.clone(),
            resource_type: request.resource_type,
            name: request.name,
            location: request.location,
            tool: request.tool,
            metadata: request.metadata,
            created_at: now,
            updated_at: now,
            version: 1,
        };

        match self.index.get(&id) {
            Some(&i) => self.resources[i] = resource,
            None => {
                self.index.insert(id.clone(), self.resources.len());
                self.resources.push(resource);
            }
        }

        debug!(resource = %id, "Registered resource");
        self.notify(&id, UpdateKind::Created);
        id
    }

    /// Look up a resource
    pub fn get_resource(&self, id: &str) -> Option<&Resource> {
        self.index.get(id).map(|&i| &self.resources[i])
    }

    /// Link `source_id` to its dependent `target_id`
    pub fn link_resources(
        &mut self,
        source_id: &str,
        target_id: &str,
        dependency_type: DependencyType,
        description: &str,
    ) -> Result<(), TrackerError> {
        self.require(source_id)?;
        self.require(target_id)?;

        self.dependencies.push(Dependency {
            source_id: source_id.to_string(),
            target_id: target_id.to_string(),
            dependency_type,
            description: description.to_string(),
            created_at: Utc::now(),
        });

        debug!(source = source_id, target = target_id, kind = %dependency_type, "Linked resources");
        self.notify(source_id, UpdateKind::Linked);
        self.notify(target_id, UpdateKind::Linked);
        Ok(())
    }

    /// Merge metadata, bump the version and notify dependents
    pub fn update_resource(
        &mut self,
        id: &str,
        metadata: BTreeMap<String, serde_json::Value>,
    ) -> Result<u32, TrackerError> {
        let index = self.require(id)?;
        self.resources[index].touch(metadata);
        let version = self.resources[index].version;

        self.notify(id, UpdateKind::Updated);
        let dependents: Vec<String> = self
            .dependencies
            .iter()
            .filter(|d| d.source_id == id)
            .map(|d| d.target_id.clone())
            .collect();
        for target in dependents {
            self.notify(&target, UpdateKind::DependencyUpdated);
        }

        Ok(version)
    }

    /// Links touching a resource
    pub fn dependencies(&self, id: &str, direction: Direction) -> Vec<&Dependency> {
        self.dependencies
            .iter()
            .filter(|d| match direction {
                Direction::Outgoing => d.source_id == id,
                Direction::Incoming => d.target_id == id,
                Direction::Both => d.source_id == id || d.target_id == id,
            })
            .collect()
    }

    /// Outgoing links expanded up to `max_depth` levels
    ///
    /// Each resource is expanded at most once, so cycles terminate.
    pub fn dependency_chain(&self, id: &str, max_depth: usize) -> DependencyChain {
        let mut visited = HashSet::new();
        DependencyChain {
            resource_id: id.to_string(),
            dependencies: self.expand(id, 0, max_depth, &mut visited),
        }
    }

    fn expand(&self, id: &str, depth: usize, max_depth: usize, visited: &mut HashSet<String>) -> Vec<ChainLink> {
        if depth >= max_depth || !visited.insert(id.to_string()) {
            return Vec::new();
        }

        self.dependencies(id, Direction::Outgoing)
            .into_iter()
            .filter_map(|dep| {
                let target = self.get_resource(&dep.target_id)?;
                Some(ChainLink {
                    resource: target.clone(),
                    dependency_type: dep.dependency_type,
                    children: self.expand(&dep.target_id, depth + 1, max_depth, visited),
                })
            })
            .collect()
    }

    /// Resources matching every given filter; `name` is a case-insensitive
    /// substring
    pub fn query_resources(
        &self,
        resource_type: Option<ResourceType>,
        tool: Option<&str>,
        name: Option<&str>,
    ) -> Vec<&Resource> {
        let pattern = name.map(str::to_lowercase);
        self.resources
            .iter()
            .filter(|r| resource_type.is_none_or(|t| r.resource_type == t))
            .filter(|r| tool.is_none_or(|t| r.tool == t))
            .filter(|r| {
                pattern
                    .as_deref()
                    .is_none_or(|p| r.name.to_lowercase().contains(p))
            })
            .collect()
    }

    /// Every resource reachable from `id` along outgoing links
    pub fn impact_analysis(&self, id: &str) -> Result<ImpactReport, TrackerError> {
        let index = self.require(id)?;

        let mut impacted = Vec::new();
        let mut seen: HashSet<&str> = HashSet::from([id]);
        let mut queue = VecDeque::from([(id, 0usize)]);

        while let Some((current, depth)) = queue.pop_front() {
            for dep in self.dependencies.iter().filter(|d| d.source_id == current) {
                if !seen.insert(dep.target_id.as_str()) {
                    continue;
                }
                queue.push_back((dep.target_id.as_str(), depth + 1));
                if let Some(target) = self.get_resource(&dep.target_id) {
                    impacted.push(ImpactedResource {
                        resource: target.clone(),
                        dependency_type: dep.dependency_type,
                        depth: depth + 1,
                    });
                }
            }
        }

        Ok(ImpactReport {
            resource: self.resources[index].clone(),
            impacted_count: impacted.len(),
            impacted_resources: impacted,
        })
    }

    /// Call `listener` whenever `id` changes
    pub fn register_listener(&mut self, id: &str, listener: Listener) {
        self.listeners.entry(id.to_string()).or_default().push(listener);
    }

    /// Totals by type and tool
    pub fn statistics(&self) -> TrackerStatistics {
        let mut resources_by_type: BTreeMap<ResourceType, usize> =
            ResourceType::ALL.into_iter().map(|t| (t, 0)).collect();
        for resource in &self.resources {
            *resources_by_type.entry(resource.resource_type).or_default() += 1;
        }

        TrackerStatistics {
            total_resources: self.resources.len(),
            total_dependencies: self.dependencies.len(),
            resources_by_type,
            tools: self.resources.iter().map(|r| r.tool.clone()).collect(),
        }
    }

    fn require(&self, id: &str) -> Result<usize, TrackerError> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| TrackerError::NotFound(id.to_string()))
    }

    fn notify(&self, id: &str, kind: UpdateKind) {
        let (Some(listeners), Some(resource)) = (self.listeners.get(id), self.get_resource(id)) else {
            return;
        };
        for listener in listeners {
            listener(resource, kind);
        }
    }
}

fn resource_id(resource_type: ResourceType, name: &str, location: &str, tool: &str) -> String {
    let input = format!("{}:{}:{}:{}", resource_type.as_str(), name, location, tool);
    let digest = hex::encode(Sha256::digest(input.as_bytes()));
    digest[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn register(tracker: &mut DependencyTracker, id: &str, resource_type: ResourceType) -> String {
        tracker.register_resource(
            NewResource::new(resource_type, id, format!("repo/{}", id), "git").with_id(id),
        )
    }

    #[test]
    fn test_derived_id_is_stable() {
        let mut tracker = DependencyTracker::new();
        let a = tracker.register_resource(NewResource::new(ResourceType::File, "main.rs", "src/main.rs", "git"));
        let b = resource_id(ResourceType::File, "main.rs", "src/main.rs", "git");
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_link_unknown_resource() {
        let mut tracker = DependencyTracker::new();
        register(&mut tracker, "req", ResourceType::Requirement);
        let err = tracker
            .link_resources("req", "ghost", DependencyType::Requires, "")
            .unwrap_err();
        assert!(matches!(err, TrackerError::NotFound(ref id) if id == "ghost"));
        assert!(tracker.dependencies("req", Direction::Both).is_empty());
    }

    #[test]
    fn test_update_notifies_resource_and_dependents() {
        let mut tracker = DependencyTracker::new();
        register(&mut tracker, "lib", ResourceType::File);
        register(&mut tracker, "test", ResourceType::Test);
        tracker.link_resources("lib", "test", DependencyType::Tests, "unit tests").unwrap();

        let seen: Rc<RefCell<Vec<(String, UpdateKind)>>> = Rc::default();
        for id in ["lib", "test"] {
            let seen = Rc::clone(&seen);
            tracker.register_listener(
                id,
                Box::new(move |r: &Resource, kind| seen.borrow_mut().push((r.id.clone(), kind))),
            );
        }

        let version = tracker
            .update_resource("lib", BTreeMap::from([("sha".to_string(), json!("abc123"))]))
            .unwrap();
        assert_eq!(version, 2);
        assert_eq!(tracker.get_resource("lib").unwrap().metadata["sha"], json!("abc123"));
        assert_eq!(
            *seen.borrow(),
            vec![
                ("lib".to_string(), UpdateKind::Updated),
                ("test".to_string(), UpdateKind::DependencyUpdated),
            ]
        );
        assert!(tracker.update_resource("ghost", BTreeMap::new()).is_err());
    }

    #[test]
    fn test_directions_and_chain() {
        let mut tracker = DependencyTracker::new();
        for id in ["a", "b", "c"] {
            register(&mut tracker, id, ResourceType::Model);
        }
        tracker.link_resources("a", "b", DependencyType::DerivesFrom, "").unwrap();
        tracker.link_resources("b", "c", DependencyType::DerivesFrom, "").unwrap();
        tracker.link_resources("c", "a", DependencyType::RelatedTo, "").unwrap();

        assert_eq!(tracker.dependencies("b", Direction::Incoming).len(), 1);
        assert_eq!(tracker.dependencies("b", Direction::Outgoing).len(), 1);
        assert_eq!(tracker.dependencies("b", Direction::Both).len(), 2);

        let chain = tracker.dependency_chain("a", 5);
        assert_eq!(chain.dependencies.len(), 1);
        let b = &chain.dependencies[0];
        assert_eq!(b.resource.id, "b");
        let c = &b.children[0];
        assert_eq!(c.resource.id, "c");
        // back-edge to the already expanded start
        assert_eq!(c.children[0].resource.id, "a");
        assert!(c.children[0].children.is_empty());

        let shallow = tracker.dependency_chain("a", 1);
        assert!(shallow.dependencies[0].children.is_empty());
    }

    #[test]
    fn test_impact_analysis_breadth_first() {
        let mut tracker = DependencyTracker::new();
        for id in ["req", "design", "code", "test"] {
            register(&mut tracker, id, ResourceType::File);
        }
        tracker.link_resources("req", "design", DependencyType::Requires, "").unwrap();
        tracker.link_resources("req", "code", DependencyType::Requires, "").unwrap();
        tracker.link_resources("design", "code", DependencyType::Implements, "").unwrap();
        tracker.link_resources("code", "test", DependencyType::Tests, "").unwrap();

        let report = tracker.impact_analysis("req").unwrap();
        let ids: Vec<&str> = report.impacted_resources.iter().map(|r| r.resource.id.as_str()).collect();
        assert_eq!(ids, vec!["design", "code", "test"]);
        assert_eq!(report.impacted_count, 3);
        assert_eq!(report.impacted_resources[2].depth, 2);

        assert!(tracker.impact_analysis("ghost").is_err());
    }

    #[test]
    fn test_query_and_statistics() {
        let mut tracker = DependencyTracker::new();
        tracker.register_resource(NewResource::new(ResourceType::Evidence, "Pentest Report", "s3://r", "scanner"));
        tracker.register_resource(NewResource::new(ResourceType::Evidence, "Coverage", "ci://cov", "ci"));
        tracker.register_resource(NewResource::new(ResourceType::Fragment, "web-security", "lib", "warrant"));

        assert_eq!(tracker.query_resources(Some(ResourceType::Evidence), None, None).len(), 2);
        assert_eq!(tracker.query_resources(None, Some("ci"), None).len(), 1);
        assert_eq!(tracker.query_resources(None, None, Some("pentest")).len(), 1);

        let stats = tracker.statistics();
        assert_eq!(stats.total_resources, 3);
        assert_eq!(stats.resources_by_type[&ResourceType::Evidence], 2);
        assert_eq!(stats.resources_by_type[&ResourceType::Model], 0);
        assert_eq!(stats.tools.len(), 3);
    }
}
