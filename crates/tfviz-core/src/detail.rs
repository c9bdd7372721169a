//! Detail view content for a selected resource.

use crate::label::instance_label;
use crate::tree::describe_resource;
use crate::{Attributes, DependencyIndex, Graph, Resource};

pub const NO_SELECTION: &str = "No resources in this group.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeBlock {
    /// Instance label for multi-instance resources, `None` for the
    /// resource-level block.
    pub heading: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDetail {
    pub address: String,
    pub summary: Vec<String>,
    pub provider: String,
    pub mode: String,
    /// Addresses of resources this one depends on, first-seen order.
    pub depends_on: Vec<String>,
    /// Addresses of resources depending on this one, first-seen order.
    pub required_by: Vec<String>,
    pub attributes: Vec<AttributeBlock>,
}

impl ResourceDetail {
    pub fn build(label: &str, res: &Resource, graph: &Graph, index: &DependencyIndex) -> Self {
        let mut depends_on = Vec::new();
        let mut required_by = Vec::new();
        for inst in &res.instances {
            for node in graph.dependencies(&inst.id) {
                push_owner(&mut depends_on, index, &node.id, res);
            }
            for node in graph.dependents(&inst.id) {
                push_owner(&mut required_by, index, &node.id, res);
            }
        }

        let attributes = if res.instances.len() == 1 {
            vec![AttributeBlock {
                heading: None,
                body: pretty(&res.attributes),
            }]
        } else {
            res.instances
                .iter()
                .map(|inst| AttributeBlock {
                    heading: Some(instance_label(inst)),
                    body: pretty(&inst.attributes),
                })
                .collect()
        };

        Self {
            address: res.address.clone(),
            summary: describe_resource(label, res),
            provider: res.provider.clone(),
            mode: res.mode.to_string(),
            depends_on,
            required_by,
            attributes,
        }
    }
}

fn push_owner(out: &mut Vec<String>, index: &DependencyIndex, instance_id: &str, res: &Resource) {
    let Some(owner) = index.owner(instance_id) else {
        return;
    };
    if owner.address == res.address || out.contains(&owner.address) {
        return;
    }
    out.push(owner.address.clone());
}

fn pretty(attributes: &Attributes) -> String {
    serde_json::to_string_pretty(attributes).unwrap_or_else(|err| format!("<unrenderable: {err}>"))
}
