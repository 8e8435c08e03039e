// Flow catalog - validated, immutable registry of tracked flows

//! # Flow Catalog
//!
//! The catalog is the static configuration every analysis run is evaluated
//! against. It is validated once, at construction, and never changes afterwards:
//! - Every flow has at least one step
//! - Flow names are unique
//! - Every prerequisite names a flow in the catalog
//! - The prerequisite graph is acyclic
//!
//! A catalog that violates any of these is rejected before a single record is
//! analyzed. After construction it can be shared freely (`&FlowCatalog` or
//! `Arc<FlowCatalog>`) between concurrent runs.
//!
//! ## Catalog Documents
//!
//! Besides the built-in 5G attach catalog ([`FlowCatalog::standard`]), catalogs
//! can be loaded from JSON:
//!
//! ```text
//! {
//!   "version": "5g-attach-v1",
//!   "flows": [
//!     { "name": "Registration Request",
//!       "steps": [ { "msg": "Registration request", "protocol": "nas", "dir": "u" } ] },
//!     ...
//!   ]
//! }
//! ```
//!
//! ## Rust Learning Notes:
//!
//! ### Graph Traversal
//! Cycle detection is a depth-first search that colours each flow as unvisited,
//! on the current path, or finished. Reaching a flow that is still on the current
//! path means we walked in a circle.
//!
//! ### Validate-Then-Freeze
//! All fields are private and only set by [`FlowCatalog::build`]. There is no
//! way to obtain a `FlowCatalog` that skipped validation.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::models::{FlowDefinition, StepSpec};
use crate::{AnalyzerError, Result};

/// Version string of the built-in catalog
pub const STANDARD_CATALOG_VERSION: &str = "5g-attach-v1";

/// Serialized form of a catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDocument {
    pub version: String,
    pub flows: Vec<FlowDefinition>,
}

/// Validated registry of flow definitions
///
/// Flows keep their definition order, which doubles as the canonical
/// end-to-end procedure order used by the blocking-flow locator.
#[derive(Debug, Clone)]
pub struct FlowCatalog {
    version: String,
    flows: Vec<FlowDefinition>,
    index: HashMap<String, usize>,
    fingerprint: String,
}

impl FlowCatalog {
    /// Validate `flows` and build a catalog
    ///
    /// ## Errors
    /// - [`AnalyzerError::EmptyFlow`] if a flow has no steps
    /// - [`AnalyzerError::DuplicateFlow`] if two flows share a name
    /// - [`AnalyzerError::UnknownPrerequisite`] for a dangling prerequisite
    /// - [`AnalyzerError::DependencyCycle`] if prerequisites form a cycle
    pub fn build<V: Into<String>>(version: V, flows: Vec<FlowDefinition>) -> Result<Self> {
        let version = version.into();

        let mut index = HashMap::with_capacity(flows.len());
        for (position, flow) in flows.iter().enumerate() {
            if flow.steps.is_empty() {
                return Err(AnalyzerError::EmptyFlow { name: flow.name.clone() });
            }
            if index.insert(flow.name.clone(), position).is_some() {
                return Err(AnalyzerError::DuplicateFlow { name: flow.name.clone() });
            }
        }

        for flow in &flows {
            if let Some(missing) = flow.prerequisites.iter().find(|p| !index.contains_key(p.as_str())) {
                return Err(AnalyzerError::UnknownPrerequisite {
                    flow: flow.name.clone(),
                    prerequisite: missing.clone(),
                });
            }
        }

        if let Some(cycle) = find_cycle(&flows, &index) {
            return Err(AnalyzerError::DependencyCycle { cycle });
        }

        let fingerprint = fingerprint_of(&version, &flows)?;
        debug!(
            version = %version,
            flows = flows.len(),
            fingerprint = %fingerprint,
            "flow catalog validated"
        );

        Ok(FlowCatalog {
            version,
            flows,
            index,
            fingerprint,
        })
    }

    /// Build a catalog from its serialized document form
    pub fn from_document(document: CatalogDocument) -> Result<Self> {
        Self::build(document.version, document.flows)
    }

    /// Parse and validate a JSON catalog document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let document: CatalogDocument = serde_json::from_str(json)?;
        Self::from_document(document)
    }

    /// Read, parse and validate a JSON catalog document from disk
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| AnalyzerError::CatalogRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// The built-in 5G registration / attach catalog
    ///
    /// Eleven flows, from the initial NAS registration request through RRC setup,
    /// authentication, security mode control, capability exchange and
    /// reconfiguration, up to PDU session establishment and IMS (SIP)
    /// registration.
    pub fn standard() -> Result<Self> {
        Self::build(STANDARD_CATALOG_VERSION, standard_flows())
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Hex-encoded SHA-256 over the catalog's canonical JSON form
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// All flows in definition order
    pub fn flows(&self) -> &[FlowDefinition] {
        &self.flows
    }

    pub fn get(&self, name: &str) -> Option<&FlowDefinition> {
        self.index.get(name).map(|&position| &self.flows[position])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    /// Flow names in definition order, the intended end-to-end sequence
    pub fn canonical_order(&self) -> Vec<&str> {
        self.flows.iter().map(|f| f.name.as_str()).collect()
    }

    /// Serializable copy of this catalog
    pub fn to_document(&self) -> CatalogDocument {
        CatalogDocument {
            version: self.version.clone(),
            flows: self.flows.clone(),
        }
    }
}

fn fingerprint_of(version: &str, flows: &[FlowDefinition]) -> Result<String> {
    #[derive(Serialize)]
    struct Canonical<'a> {
        version: &'a str,
        flows: &'a [FlowDefinition],
    }

    let bytes = serde_json::to_vec(&Canonical { version, flows })?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnPath,
    Done,
}

/// Return the first prerequisite cycle found, as a closed path of flow names
fn find_cycle(flows: &[FlowDefinition], index: &HashMap<String, usize>) -> Option<Vec<String>> {
    let mut marks = vec![Mark::Unvisited; flows.len()];
    let mut path = Vec::new();

    for start in 0..flows.len() {
        if marks[start] == Mark::Unvisited {
            if let Some(cycle) = visit(start, flows, index, &mut marks, &mut path) {
                return Some(cycle);
            }
        }
    }
    None
}

fn visit(
    node: usize,
    flows: &[FlowDefinition],
    index: &HashMap<String, usize>,
    marks: &mut [Mark],
    path: &mut Vec<usize>,
) -> Option<Vec<String>> {
    marks[node] = Mark::OnPath;
    path.push(node);

    for prerequisite in &flows[node].prerequisites {
        let Some(&next) = index.get(prerequisite) else {
            continue;
        };
        match marks[next] {
            Mark::OnPath => {
                let start = path.iter().position(|&n| n == next)?;
                let mut cycle: Vec<String> = path[start..].iter().map(|&n| flows[n].name.clone()).collect();
                cycle.push(flows[next].name.clone());
                return Some(cycle);
            }
            Mark::Unvisited => {
                if let Some(cycle) = visit(next, flows, index, marks, path) {
                    return Some(cycle);
                }
            }
            Mark::Done => {}
        }
    }

    path.pop();
    marks[node] = Mark::Done;
    None
}

/// Flow data for [`FlowCatalog::standard`]
fn standard_flows() -> Vec<FlowDefinition> {
    vec![
        FlowDefinition::root(
            "Registration Request",
            vec![StepSpec::new("Registration request", "nas", "u")],
        ),
        FlowDefinition::new(
            "RRC Connection Setup",
            vec![
                StepSpec::new("rrcSetupRequest", "nrrrc", "u"),
                StepSpec::new("rrcSetup", "nrrrc", "d"),
                StepSpec::new("rrcSetupComplete", "nrrrc", "u"),
            ],
            vec!["Registration Request"],
        ),
        FlowDefinition::new(
            "NAS Authentication",
            vec![
                StepSpec::new("Authentication request", "nas", "d"),
                StepSpec::new("Authentication response", "nas", "u"),
            ],
            vec!["Registration Request"],
        ),
        FlowDefinition::new(
            "RRC Authentication",
            vec![
                StepSpec::new("Authentication request", "nrrrc", "d"),
                StepSpec::new("Authentication response", "nrrrc", "u"),
            ],
            vec!["Registration Request"],
        ),
        FlowDefinition::new(
            "NAS SMC",
            vec![
                StepSpec::new("Security mode command", "nas", "d"),
                StepSpec::new("Security mode complete", "nas", "u"),
            ],
            vec!["NAS Authentication"],
        ),
        FlowDefinition::new(
            "UE Capability",
            vec![
                StepSpec::new("ueCapabilityEnquiry", "nrrrc", "d"),
                StepSpec::new("ueCapabilityInformation", "nrrrc", "u"),
            ],
            vec!["NAS SMC"],
        ),
        FlowDefinition::new(
            "RRC SMC",
            vec![
                StepSpec::new("securityModeCommand", "nrrrc", "d"),
                StepSpec::new("securityModeComplete", "nrrrc", "u"),
            ],
            vec!["RRC Authentication"],
        ),
        FlowDefinition::new(
            "RRC Reconfig",
            vec![
                StepSpec::new("rrcReconfiguration", "nrrrc", "d"),
                StepSpec::new("rrcReconfigurationComplete", "nrrrc", "u"),
            ],
            vec!["RRC SMC"],
        ),
        FlowDefinition::new(
            "Registration response",
            vec![
                StepSpec::new("Registration accept", "nas", "d"),
                StepSpec::new("Registration complete", "nas", "u"),
            ],
            vec!["UE Capability"],
        ),
        FlowDefinition::new(
            "PDU session",
            vec![
                StepSpec::new("PDU session establishment request", "nas", "u"),
                StepSpec::new("UL NAS transport", "nas", "u"),
                StepSpec::new("rrcReconfiguration", "nrrrc", "d"),
                StepSpec::new("rrcReconfigurationComplete", "nrrrc", "u"),
                StepSpec::new("DL NAS transport", "nas", "d"),
                StepSpec::new("PDU session establishment accept", "nas", "d"),
            ],
            vec!["Registration response"],
        ),
        // The 200 OK answers are not tracked; only the UE-side requests and NOTIFY
        FlowDefinition::new(
            "SIP Registration",
            vec![
                StepSpec::new("REGISTER", "sip", "u"),
                StepSpec::new("SUBSCRIBE", "sip", "u"),
                StepSpec::new("NOTIFY", "sip", "D"),
            ],
            vec!["PDU session"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_step(name: &str, prerequisites: Vec<&str>) -> FlowDefinition {
        FlowDefinition::new(name, vec![StepSpec::uplink(name.to_lowercase(), "nas")], prerequisites)
    }

    #[test]
    fn test_standard_catalog_is_valid() {
        let catalog = FlowCatalog::standard().unwrap();
        assert_eq!(catalog.len(), 11);
        assert_eq!(catalog.version(), STANDARD_CATALOG_VERSION);
        assert_eq!(catalog.canonical_order()[0], "Registration Request");
        assert_eq!(catalog.canonical_order()[10], "SIP Registration");

        let pdu = catalog.get("PDU session").unwrap();
        assert_eq!(pdu.total_steps(), 6);
        assert_eq!(pdu.prerequisites, vec!["Registration response"]);

        // SIP NOTIFY keeps its upper-case direction tag
        let sip = catalog.get("SIP Registration").unwrap();
        assert_eq!(sip.steps[2].direction.as_str(), "D");
    }

    #[test]
    fn test_unknown_prerequisite_rejected() {
        let err = FlowCatalog::build("t", vec![one_step("A", vec!["Ghost"])]).unwrap_err();
        match err {
            AnalyzerError::UnknownPrerequisite { flow, prerequisite } => {
                assert_eq!(flow, "A");
                assert_eq!(prerequisite, "Ghost");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_cycle_rejected() {
        let flows = vec![
            one_step("A", vec![]),
            one_step("B", vec!["A", "D"]),
            one_step("C", vec!["B"]),
            one_step("D", vec!["C"]),
        ];
        let err = FlowCatalog::build("t", flows).unwrap_err();
        assert!(err.is_catalog_error());
        match err {
            AnalyzerError::DependencyCycle { cycle } => {
                assert_eq!(cycle.first(), cycle.last());
                assert!(cycle.contains(&"B".to_string()));
                assert!(cycle.contains(&"C".to_string()));
                assert!(cycle.contains(&"D".to_string()));
                assert!(!cycle.contains(&"A".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_self_prerequisite_is_a_cycle() {
        let err = FlowCatalog::build("t", vec![one_step("A", vec!["A"])]).unwrap_err();
        assert_eq!(err.to_string(), "Prerequisite cycle detected: A -> A");
    }

    #[test]
    fn test_duplicate_and_empty_flows_rejected() {
        let dup = FlowCatalog::build("t", vec![one_step("A", vec![]), one_step("A", vec![])]);
        assert!(matches!(dup, Err(AnalyzerError::DuplicateFlow { .. })));

        let empty = FlowCatalog::build("t", vec![FlowDefinition::root("A", Vec::new())]);
        assert!(matches!(empty, Err(AnalyzerError::EmptyFlow { .. })));
    }

    #[test]
    fn test_diamond_dependencies_are_fine() {
        let flows = vec![
            one_step("A", vec![]),
            one_step("B", vec!["A"]),
            one_step("C", vec!["A"]),
            one_step("D", vec!["B", "C"]),
        ];
        let catalog = FlowCatalog::build("t", flows).unwrap();
        assert_eq!(catalog.canonical_order(), vec!["A", "B", "C", "D"]);
        assert!(catalog.contains("D"));
        assert!(catalog.get("E").is_none());
    }

    #[test]
    fn test_document_round_trip_keeps_fingerprint() {
        let catalog = FlowCatalog::standard().unwrap();
        let json = serde_json::to_string(&catalog.to_document()).unwrap();
        let reloaded = FlowCatalog::from_json_str(&json).unwrap();

        assert_eq!(reloaded.fingerprint(), catalog.fingerprint());
        assert_eq!(reloaded.fingerprint().len(), 64);
        assert_eq!(reloaded.canonical_order(), catalog.canonical_order());
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let a = FlowCatalog::build("t", vec![one_step("A", vec![])]).unwrap();
        let b = FlowCatalog::build("t", vec![one_step("B", vec![])]).unwrap();
        let a_next = FlowCatalog::build("t2", vec![one_step("A", vec![])]).unwrap();
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), a_next.fingerprint());
    }

    #[test]
    fn test_missing_catalog_file() {
        let err = FlowCatalog::from_path("/nonexistent/catalog.json").unwrap_err();
        assert!(matches!(err, AnalyzerError::CatalogRead { .. }));
    }
}
