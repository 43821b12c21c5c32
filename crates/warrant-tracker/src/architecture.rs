//! Design requirements mapped onto implementation components
//!
//! Components are supplied by whatever tool inspected the implementation;
//! the mapper only compares them with the intended design. A requirement
//! names a component by (case-insensitive) substring of the component name.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use tracing::{debug, info};

/// Components with coverage below this percentage are reported as low
pub const LOW_COVERAGE_PERCENT: f64 = 60.0;

/// Granularity of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    /// Source module or file
    #[default]
    Module,
    /// Class or type
    Class,
    /// Free function
    Function,
    /// Deployed service
    Service,
}

/// Something a component exposes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    /// Interface kind, e.g. `class` or `function`
    pub kind: String,
    /// Exposed name
    pub name: String,
}

/// An implementation component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchitectureComponent {
    /// 16 hex chars of SHA-256 of the file path, unless given
    #[serde(default)]
    pub id: String,
    /// Qualified name, matched against requirement component names
    pub name: String,
    /// Granularity
    #[serde(default, rename = "type")]
    pub kind: ComponentKind,
    /// Defining file
    pub file_path: String,
    /// Names of components or packages it uses
    #[serde(default)]
    pub dependencies: BTreeSet<String>,
    /// Exposed interfaces
    #[serde(default)]
    pub interfaces: Vec<Interface>,
    /// Size-based complexity estimate
    #[serde(default)]
    pub complexity: f64,
    /// Test coverage percentage, once known
    #[serde(default)]
    pub coverage: Option<f64>,
}

impl ArchitectureComponent {
    /// Component with an id derived from its file path
    pub fn new(name: impl Into<String>, kind: ComponentKind, file_path: impl Into<String>) -> Self {
        let file_path = file_path.into();
        Self {
            id: component_id(&file_path),
            name: name.into(),
            kind,
            file_path,
            dependencies: BTreeSet::new(),
            interfaces: Vec::new(),
            complexity: 0.0,
            coverage: None,
        }
    }

    /// Use an explicit id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Add a dependency
    pub fn with_dependency(mut self, dependency: impl Into<String>) -> Self {
        self.dependencies.insert(dependency.into());
        self
    }

    /// Add an exposed interface
    pub fn with_interface(mut self, kind: impl Into<String>, name: impl Into<String>) -> Self {
        self.interfaces.push(Interface {
            kind: kind.into(),
            name: name.into(),
        });
        self
    }

    /// Set the complexity estimate
    pub fn with_complexity(mut self, complexity: f64) -> Self {
        self.complexity = complexity;
        self
    }

    fn implements(&self, component_name: &str) -> bool {
        self.name
            .to_lowercase()
            .contains(&component_name.to_lowercase())
    }
}

/// Kind of design requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequirementType {
    /// Behaviour; needs a component exposing at least one interface
    Functional,
    /// Security property; needs the component to exist
    Security,
    /// Performance property; needs the component to exist
    Performance,
}

impl RequirementType {
    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            RequirementType::Functional => "functional",
            RequirementType::Security => "security",
            RequirementType::Performance => "performance",
        }
    }

    fn missing_severity(&self) -> Severity {
        match self {
            RequirementType::Security => Severity::Critical,
            RequirementType::Functional => Severity::High,
            RequirementType::Performance => Severity::Medium,
        }
    }
}

impl fmt::Display for RequirementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A requirement of the intended design
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignRequirement {
    /// Requirement id
    pub id: String,
    /// What is required
    pub description: String,
    /// Name (or name fragment) of the implementing component
    #[serde(rename = "component")]
    pub component_name: String,
    /// Kind of requirement
    #[serde(rename = "type")]
    pub requirement_type: RequirementType,
    /// Outcome of the last mapping
    #[serde(default)]
    pub satisfied: bool,
    /// Findings of the last mapping
    #[serde(default)]
    pub evidence: Vec<String>,
}

impl DesignRequirement {
    /// Unmapped requirement
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        component_name: impl Into<String>,
        requirement_type: RequirementType,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            component_name: component_name.into(),
            requirement_type,
            satisfied: false,
            evidence: Vec::new(),
        }
    }
}

/// How design and implementation disagree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscrepancyKind {
    /// A requirement has no satisfying component
    Missing,
    /// A component with interfaces serves no requirement
    Extra,
}

impl DiscrepancyKind {
    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscrepancyKind::Missing => "missing",
            DiscrepancyKind::Extra => "extra",
        }
    }
}

impl fmt::Display for DiscrepancyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discrepancy severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Low
    Low,
    /// Medium
    Medium,
    /// High
    High,
    /// Critical
    Critical,
}

impl Severity {
    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One disagreement between design and implementation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discrepancy {
    /// 16 hex chars of SHA-256 of kind and subject
    pub id: String,
    /// Missing or extra
    #[serde(rename = "type")]
    pub kind: DiscrepancyKind,
    /// Severity
    pub severity: Severity,
    /// Component name concerned
    pub component: String,
    /// Description
    pub description: String,
    /// Consequence if left unresolved
    pub impact: String,
}

/// Result of [`ArchitectureMapper::map_to_design`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DesignMapping {
    /// Satisfied requirements
    pub requirements_satisfied: usize,
    /// All requirements
    pub requirements_total: usize,
    /// satisfied / total, 0 without requirements
    pub satisfaction_rate: f64,
    /// Number of discrepancies
    pub discrepancy_count: usize,
    /// Missing requirements first, then extra components
    pub discrepancies: Vec<Discrepancy>,
    /// Critical discrepancies
    pub critical_issues: usize,
    /// High-severity discrepancies
    pub high_issues: usize,
}

/// Result of [`ArchitectureMapper::track_coverage`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageMapping {
    /// Mean over components with coverage, 0 if none
    pub average_coverage: f64,
    /// Components with coverage
    pub components_with_coverage: usize,
    /// All components
    pub components_total: usize,
    /// Components below [`LOW_COVERAGE_PERCENT`]
    pub low_coverage_components: Vec<ArchitectureComponent>,
}

/// A component implementing a requirement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImplementingComponent {
    /// Component id
    pub component_id: String,
    /// Component name
    pub component_name: String,
    /// Coverage percentage, if known
    pub coverage: Option<f64>,
}

/// One requirement row of the matrix
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceabilityRow {
    /// Requirement id
    pub requirement_id: String,
    /// Requirement description
    pub description: String,
    /// Outcome of the last mapping
    pub satisfied: bool,
    /// Every component whose name matches
    pub implementing_components: Vec<ImplementingComponent>,
    /// Findings of the last mapping
    pub evidence: Vec<String>,
}

/// Requirement to component traceability
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceabilityMatrix {
    /// One row per requirement
    #[serde(rename = "traceability_matrix")]
    pub rows: Vec<TraceabilityRow>,
    /// Satisfied requirements
    pub traceable_requirements: usize,
    /// All requirements
    pub total_requirements: usize,
}

/// Architecture totals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchitectureSummary {
    /// Components
    pub total_components: usize,
    /// Dependencies over all components
    pub total_dependencies: usize,
    /// Mean complexity, 0 without components
    pub average_complexity: f64,
    /// Every component
    pub components: Vec<ArchitectureComponent>,
}

/// Compares implementation components with design requirements
#[derive(Debug, Clone, Default)]
pub struct ArchitectureMapper {
    components: Vec<ArchitectureComponent>,
    component_index: HashMap<String, usize>,
    requirements: Vec<DesignRequirement>,
    requirement_index: HashMap<String, usize>,
    discrepancies: Vec<Discrepancy>,
}

impl ArchitectureMapper {
    /// Empty mapper
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a component, replacing one with the same id. Returns the id.
    pub fn register_component(&mut self, mut component: ArchitectureComponent) -> String {
        if component.id.is_empty() {
            component.id = component_id(&component.file_path);
        }
        let id = component.id.clone();
        match self.component_index.get(&id) {
            Some(&slot) => self.components[slot] = component,
            None => {
                self.component_index.insert(id.clone(), self.components.len());
                self.components.push(component);
            }
        }
        debug!(component = %id, "Registered component");
        id
    }

    /// Components in registration order
    pub fn components(&self) -> &[ArchitectureComponent] {
        &self.components
    }

    /// Look up a component
    pub fn component(&self, id: &str) -> Option<&ArchitectureComponent> {
        self.component_index.get(id).map(|&slot| &self.components[slot])
    }

    /// Load requirements, replacing any with the same id
    pub fn load_design_requirements(&mut self, requirements: impl IntoIterator<Item = DesignRequirement>) {
        for requirement in requirements {
            match self.requirement_index.get(&requirement.id) {
                Some(&slot) => self.requirements[slot] = requirement,
                None => {
                    self.requirement_index
                        .insert(requirement.id.clone(), self.requirements.len());
                    self.requirements.push(requirement);
                }
            }
        }
    }

    /// Requirements in load order
    pub fn requirements(&self) -> &[DesignRequirement] {
        &self.requirements
    }

    /// Discrepancies found by the last mapping
    pub fn discrepancies(&self) -> &[Discrepancy] {
        &self.discrepancies
    }

    /// Check every requirement against the components
    ///
    /// Recomputes `satisfied` and `evidence` on every requirement and
    /// replaces the discrepancy list.
    pub fn map_to_design(&mut self) -> DesignMapping {
        let mut discrepancies = Vec::new();

        for requirement in &mut self.requirements {
            requirement.evidence.clear();
            requirement.satisfied = check_requirement(&self.components, requirement);
            if !requirement.satisfied {
                discrepancies.push(Discrepancy {
                    id: discrepancy_id(DiscrepancyKind::Missing, &requirement.id),
                    kind: DiscrepancyKind::Missing,
                    severity: requirement.requirement_type.missing_severity(),
                    component: requirement.component_name.clone(),
                    description: format!("Requirement not met: {}", requirement.description),
                    impact: "Functionality may be missing or incomplete".to_string(),
                });
            }
        }

        for component in &self.components {
            let required = self
                .requirements
                .iter()
                .any(|r| component.implements(&r.component_name));
            if !required && !component.interfaces.is_empty() {
                discrepancies.push(Discrepancy {
                    id: discrepancy_id(DiscrepancyKind::Extra, &component.id),
                    kind: DiscrepancyKind::Extra,
                    severity: Severity::Medium,
                    component: component.name.clone(),
                    description: format!("Unexpected component: {}", component.name),
                    impact: "May extend attack surface or add maintenance burden".to_string(),
                });
            }
        }

        let satisfied = self.requirements.iter().filter(|r| r.satisfied).count();
        let total = self.requirements.len();
        let count_severity = |severity: Severity| {
            discrepancies
                .iter()
                .filter(|d: &&Discrepancy| d.severity == severity)
                .count()
        };

        let mapping = DesignMapping {
            requirements_satisfied: satisfied,
            requirements_total: total,
            satisfaction_rate: if total > 0 {
                satisfied as f64 / total as f64
            } else {
                0.0
            },
            discrepancy_count: discrepancies.len(),
            critical_issues: count_severity(Severity::Critical),
            high_issues: count_severity(Severity::High),
            discrepancies: discrepancies.clone(),
        };
        info!(
            satisfied,
            total,
            discrepancies = mapping.discrepancy_count,
            "Mapped implementation to design"
        );

        self.discrepancies = discrepancies;
        mapping
    }

    /// Attach coverage percentages keyed by file path
    ///
    /// A component takes the first entry whose path is a suffix of its file
    /// path, or of which its file path is a suffix. Components without a
    /// matching entry keep their previous coverage.
    pub fn track_coverage(&mut self, coverage: &BTreeMap<String, f64>) -> CoverageMapping {
        for component in &mut self.components {
            let found = coverage.iter().find(|(path, _)| {
                component.file_path.ends_with(path.as_str()) || path.ends_with(&component.file_path)
            });
            if let Some((_, &percent)) = found {
                component.coverage = Some(percent);
            }
        }

        let covered: Vec<&ArchitectureComponent> = self
            .components
            .iter()
            .filter(|c| c.coverage.is_some())
            .collect();
        let total: f64 = covered.iter().filter_map(|c| c.coverage).sum();

        CoverageMapping {
            average_coverage: if covered.is_empty() {
                0.0
            } else {
                total / covered.len() as f64
            },
            components_with_coverage: covered.len(),
            components_total: self.components.len(),
            low_coverage_components: covered
                .iter()
                .filter(|c| c.coverage.is_some_and(|p| p < LOW_COVERAGE_PERCENT))
                .map(|c| (*c).clone())
                .collect(),
        }
    }

    /// One row per requirement listing every matching component
    pub fn traceability_matrix(&self) -> TraceabilityMatrix {
        let rows: Vec<TraceabilityRow> = self
            .requirements
            .iter()
            .map(|requirement| TraceabilityRow {
                requirement_id: requirement.id.clone(),
                description: requirement.description.clone(),
                satisfied: requirement.satisfied,
                implementing_components: self
                    .components
                    .iter()
                    .filter(|c| c.implements(&requirement.component_name))
                    .map(|c| ImplementingComponent {
                        component_id: c.id.clone(),
                        component_name: c.name.clone(),
                        coverage: c.coverage,
                    })
                    .collect(),
                evidence: requirement.evidence.clone(),
            })
            .collect();

        TraceabilityMatrix {
            traceable_requirements: self.requirements.iter().filter(|r| r.satisfied).count(),
            total_requirements: self.requirements.len(),
            rows,
        }
    }

    /// Component totals
    pub fn summary(&self) -> ArchitectureSummary {
        let count = self.components.len();
        ArchitectureSummary {
            total_components: count,
            total_dependencies: self.components.iter().map(|c| c.dependencies.len()).sum(),
            average_complexity: if count > 0 {
                self.components.iter().map(|c| c.complexity).sum::<f64>() / count as f64
            } else {
                0.0
            },
            components: self.components.clone(),
        }
    }
}

// The first component whose name matches decides the outcome.
fn check_requirement(components: &[ArchitectureComponent], requirement: &mut DesignRequirement) -> bool {
    let Some(component) = components
        .iter()
        .find(|c| c.implements(&requirement.component_name))
    else {
        return false;
    };

    requirement
        .evidence
        .push(format!("Component found: {}", component.name));
    match requirement.requirement_type {
        RequirementType::Functional => !component.interfaces.is_empty(),
        RequirementType::Security | RequirementType::Performance => true,
    }
}

fn component_id(file_path: &str) -> String {
    hash16(file_path)
}

fn discrepancy_id(kind: DiscrepancyKind, subject: &str) -> String {
    hash16(&format!("{}:{}", kind.as_str(), subject))
}

fn hash16(input: &str) -> String {
    let digest = hex::encode(Sha256::digest(input.as_bytes()));
    digest[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> ArchitectureMapper {
        let mut mapper = ArchitectureMapper::new();
        mapper.register_component(
            ArchitectureComponent::new("app.auth.login", ComponentKind::Module, "src/app/auth/login.py")
                .with_interface("function", "login")
                .with_dependency("hashlib")
                .with_complexity(1.2),
        );
        mapper.register_component(
            ArchitectureComponent::new("app.billing", ComponentKind::Module, "src/app/billing.py")
                .with_complexity(0.8),
        );
        mapper.register_component(
            ArchitectureComponent::new("app.debug_console", ComponentKind::Module, "src/app/debug_console.py")
                .with_interface("class", "Console")
                .with_dependency("code")
                .with_dependency("sys")
                .with_complexity(0.4),
        );
        mapper.load_design_requirements([
            DesignRequirement::new("REQ-1", "Users can log in", "Auth", RequirementType::Functional),
            DesignRequirement::new("REQ-2", "Invoices are generated", "billing", RequirementType::Functional),
            DesignRequirement::new("REQ-3", "Payments are encrypted", "payments", RequirementType::Security),
            DesignRequirement::new("REQ-4", "Billing answers in 100ms", "billing", RequirementType::Performance),
        ]);
        mapper
    }

    #[test]
    fn test_component_id_from_path() {
        let component = ArchitectureComponent::new("a", ComponentKind::Class, "src/a.py");
        assert_eq!(component.id, hash16("src/a.py"));
        assert_eq!(component.id.len(), 16);

        let mut mapper = ArchitectureMapper::new();
        let mut unnamed = component.clone();
        unnamed.id.clear();
        assert_eq!(mapper.register_component(unnamed), component.id);
    }

    #[test]
    fn test_map_to_design() {
        let mut mapper = mapper();
        let mapping = mapper.map_to_design();

        assert_eq!(mapping.requirements_total, 4);
        assert_eq!(mapping.requirements_satisfied, 2);
        assert_eq!(mapping.satisfaction_rate, 0.5);

        let kinds: Vec<(DiscrepancyKind, Severity, &str)> = mapping
            .discrepancies
            .iter()
            .map(|d| (d.kind, d.severity, d.component.as_str()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (DiscrepancyKind::Missing, Severity::High, "billing"),
                (DiscrepancyKind::Missing, Severity::Critical, "payments"),
                (DiscrepancyKind::Extra, Severity::Medium, "app.debug_console"),
            ]
        );
        assert_eq!(mapping.critical_issues, 1);
        assert_eq!(mapping.high_issues, 1);
        assert_eq!(
            mapping.discrepancies[1].description,
            "Requirement not met: Payments are encrypted"
        );
        assert_eq!(mapper.discrepancies().len(), 3);
    }

    #[test]
    fn test_remapping_does_not_accumulate() {
        let mut mapper = mapper();
        let first = mapper.map_to_design();
        let second = mapper.map_to_design();

        assert_eq!(first, second);
        assert_eq!(
            mapper.requirements()[0].evidence,
            vec!["Component found: app.auth.login".to_string()]
        );
    }

    #[test]
    fn test_track_coverage() {
        let mut mapper = mapper();
        let coverage = BTreeMap::from([
            ("app/auth/login.py".to_string(), 85.0),
            ("/ci/checkout/src/app/billing.py".to_string(), 40.0),
        ]);
        let report = mapper.track_coverage(&coverage);

        assert_eq!(report.components_total, 3);
        assert_eq!(report.components_with_coverage, 2);
        assert_eq!(report.average_coverage, 62.5);
        assert_eq!(report.low_coverage_components.len(), 1);
        assert_eq!(report.low_coverage_components[0].name, "app.billing");

        let empty = ArchitectureMapper::new().track_coverage(&coverage);
        assert_eq!(empty.average_coverage, 0.0);
    }

    #[test]
    fn test_traceability_matrix() {
        let mut mapper = mapper();
        mapper.map_to_design();
        mapper.track_coverage(&BTreeMap::from([("login.py".to_string(), 90.0)]));
        let matrix = mapper.traceability_matrix();

        assert_eq!(matrix.total_requirements, 4);
        assert_eq!(matrix.traceable_requirements, 2);
        let auth = &matrix.rows[0];
        assert!(auth.satisfied);
        assert_eq!(auth.implementing_components[0].component_name, "app.auth.login");
        assert_eq!(auth.implementing_components[0].coverage, Some(90.0));
        assert!(matrix.rows[2].implementing_components.is_empty());

        let json = serde_json::to_value(&matrix).unwrap();
        assert!(json["traceability_matrix"].is_array());
    }

    #[test]
    fn test_summary_and_replacement() {
        let mut mapper = mapper();
        let summary = mapper.summary();
        assert_eq!(summary.total_components, 3);
        assert_eq!(summary.total_dependencies, 3);
        assert!((summary.average_complexity - 0.8).abs() < 1e-9);

        mapper.load_design_requirements([DesignRequirement::new(
            "REQ-3",
            "Payments are encrypted",
            "billing",
            RequirementType::Security,
        )]);
        assert_eq!(mapper.requirements().len(), 4);
        assert_eq!(mapper.map_to_design().requirements_satisfied, 3);

        assert_eq!(ArchitectureMapper::new().summary().average_complexity, 0.0);
    }

    #[test]
    fn test_requirement_from_toml() {
        let requirement: DesignRequirement = toml::from_str(
            "id = \"REQ-9\"\ndescription = \"Audit log\"\ncomponent = \"audit\"\ntype = \"security\"\n",
        )
        .unwrap();
        assert_eq!(requirement.requirement_type, RequirementType::Security);
        assert!(!requirement.satisfied);
        assert!(requirement.evidence.is_empty());
    }
}
