//! Tracked resources and the links between them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Kind of tracked resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// A single file
    File,
    /// A directory tree
    Directory,
    /// A design or analysis model
    Model,
    /// A requirement
    Requirement,
    /// A test or test suite
    Test,
    /// An evidence artifact
    Evidence,
    /// A complete assurance case
    AssuranceCase,
    /// An assurance case fragment
    Fragment,
}

impl ResourceType {
    /// Every resource type
    pub const ALL: [ResourceType; 8] = [
        ResourceType::File,
        ResourceType::Directory,
        ResourceType::Model,
        ResourceType::Requirement,
        ResourceType::Test,
        ResourceType::Evidence,
        ResourceType::AssuranceCase,
        ResourceType::Fragment,
    ];

    /// Snake-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::File => "file",
            ResourceType::Directory => "directory",
            ResourceType::Model => "model",
            ResourceType::Requirement => "requirement",
            ResourceType::Test => "test",
            ResourceType::Evidence => "evidence",
            ResourceType::AssuranceCase => "assurance_case",
            ResourceType::Fragment => "fragment",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        ResourceType::ALL
            .into_iter()
            .find(|t| t.as_str() == lower)
            .ok_or_else(|| format!("Unknown resource type: {}", s))
    }
}

/// Meaning of a link from source to target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyType {
    /// Target needs the source
    Requires,
    /// Source implements the target
    Implements,
    /// Source tests the target
    Tests,
    /// Source validates the target
    Validates,
    /// Target is derived from the source
    DerivesFrom,
    /// Loose association
    RelatedTo,
}

impl DependencyType {
    /// Snake-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyType::Requires => "requires",
            DependencyType::Implements => "implements",
            DependencyType::Tests => "tests",
            DependencyType::Validates => "validates",
            DependencyType::DerivesFrom => "derives_from",
            DependencyType::RelatedTo => "related_to",
        }
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resource managed by some tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Tracker-wide id
    pub id: String,
    /// Kind of resource
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    /// Display name
    pub name: String,
    /// Path or URL
    pub location: String,
    /// Tool that owns the resource
    pub tool: String,
    /// Free-form metadata, merged on update
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
    /// Registration time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
    /// Starts at 1, bumped on every update
    pub version: u32,
}

impl Resource {
    pub(crate) fn touch(&mut self, metadata: BTreeMap<String, serde_json::Value>) {
        self.metadata.extend(metadata);
        self.version += 1;
        self.updated_at = Utc::now();
    }
}

/// Registration request for [`DependencyTracker::register_resource`](crate::DependencyTracker::register_resource)
#[derive(Debug, Clone, PartialEq)]
pub struct NewResource {
    /// Kind of resource
    pub resource_type: ResourceType,
    /// Display name
    pub name: String,
    /// Path or URL
    pub location: String,
    /// Owning tool
    pub tool: String,
    /// Explicit id; derived from the other fields when absent
    pub id: Option<String>,
    /// Initial metadata
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl NewResource {
    /// Request with a derived id and no metadata
    pub fn new(
        resource_type: ResourceType,
        name: impl Into<String>,
        location: impl Into<String>,
        tool: impl Into<String>,
    ) -> Self {
        Self {
            resource_type,
            name: name.into(),
            location: location.into(),
            tool: tool.into(),
            id: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Use an explicit id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// A typed link between two resources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    /// Resource depended upon
    pub source_id: String,
    /// Dependent resource
    pub target_id: String,
    /// Link meaning
    #[serde(rename = "type")]
    pub dependency_type: DependencyType,
    /// Optional note
    #[serde(default)]
    pub description: String,
    /// Link time
    pub created_at: DateTime<Utc>,
}
