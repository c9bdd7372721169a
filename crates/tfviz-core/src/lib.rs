pub mod detail;
pub mod graph;
pub mod group;
pub mod index;
pub mod label;
pub mod snapshot;
pub mod tree;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::rc::Rc;

pub use graph::{Graph, Node};
pub use group::{apply, Group, Groups, Rule, RuleSet};
pub use index::DependencyIndex;
pub use snapshot::{load_file, load_slice, LoadError};
pub use tree::{NodeId, NodeKind, Tree, TreeNode};

/// Arbitrary nested key/value data carried by instances and resources.
pub type Attributes = Map<String, Value>;

/// A normalized, point-in-time infrastructure snapshot.
#[derive(Debug, Clone, Default)]
pub struct State {
    pub version: u64,
    pub terraform_version: String,
    pub serial: u64,
    pub lineage: String,
    pub resources: Vec<Rc<Resource>>,
}

impl State {
    pub fn instance_count(&self) -> usize {
        self.resources.iter().map(|res| res.instances.len()).sum()
    }

    pub fn resource(&self, address: &str) -> Option<&Rc<Resource>> {
        self.resources.iter().find(|res| res.address == address)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResourceMode {
    #[default]
    Managed,
    Data,
}

impl ResourceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceMode::Managed => "managed",
            ResourceMode::Data => "data",
        }
    }
}

impl fmt::Display for ResourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Resource {
    pub address: String,
    pub resource_type: String,
    pub name: String,
    pub provider: String,
    pub mode: ResourceMode,
    pub instances: Vec<Rc<Instance>>,
    pub attributes: Attributes,
}

impl Resource {
    pub fn is_type(&self, resource_type: &str) -> bool {
        self.resource_type == resource_type
    }
}

#[derive(Debug, Clone, Default)]
pub struct Instance {
    pub id: String,
    pub index_key: Option<String>,
    pub attributes: Attributes,
    pub depends_on: Vec<String>,
}

/// Builds `type.name`, prefixed with `data.` for data sources and with the
/// module path when the resource lives inside a module.
pub fn resource_address(
    module: Option<&str>,
    mode: ResourceMode,
    resource_type: &str,
    name: &str,
) -> String {
    let mut address = String::new();
    if let Some(module) = module.filter(|m| !m.is_empty()) {
        address.push_str(module);
        address.push('.');
    }
    if mode == ResourceMode::Data {
        address.push_str("data.");
    }
    address.push_str(resource_type);
    address.push('.');
    address.push_str(name);
    address
}

/// `address[index]` for indexed instances, the bare address otherwise.
pub fn instance_id(address: &str, index_key: Option<&str>) -> String {
    match index_key {
        Some(index) => format!("{address}[{index}]"),
        None => address.to_string(),
    }
}
