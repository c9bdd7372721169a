//! Instance-level dependency graph with forward and reverse edges.
//!
//! Edges are stored as instance IDs keyed into the node map, so nodes never
//! own each other. References to IDs outside the snapshot produce no edge.

use crate::{Instance, State};
use std::collections::HashMap;
use std::rc::Rc;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub instance: Rc<Instance>,
    pub depends_on: Vec<String>,
    pub reverse_deps: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: HashMap<String, Node>,
}

impl Graph {
    pub fn build(state: &State) -> Self {
        let mut nodes: HashMap<String, Node> = HashMap::new();
        for res in &state.resources {
            for inst in &res.instances {
                nodes.insert(
                    inst.id.clone(),
                    Node {
                        id: inst.id.clone(),
                        instance: Rc::clone(inst),
                        depends_on: Vec::new(),
                        reverse_deps: Vec::new(),
                    },
                );
            }
        }

        let mut edges: Vec<(String, String)> = Vec::new();
        let mut dangling = 0usize;
        for res in &state.resources {
            for inst in &res.instances {
                for dep in &inst.depends_on {
                    if nodes.contains_key(dep) {
                        edges.push((inst.id.clone(), dep.clone()));
                    } else {
                        dangling += 1;
                    }
                }
            }
        }

        for (source, target) in edges {
            if let Some(node) = nodes.get_mut(&target) {
                node.reverse_deps.push(source.clone());
            }
            if let Some(node) = nodes.get_mut(&source) {
                node.depends_on.push(target);
            }
        }

        if dangling > 0 {
            debug!(dangling, "dropped dependency references with no matching instance");
        }

        Self { nodes }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Nodes the given instance depends on.
    pub fn dependencies<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a Node> + 'a {
        let targets = self
            .nodes
            .get(id)
            .map(|node| node.depends_on.as_slice())
            .unwrap_or_default();
        targets.iter().filter_map(move |target| self.nodes.get(target))
    }

    /// Nodes that depend on the given instance.
    pub fn dependents<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a Node> + 'a {
        let sources = self
            .nodes
            .get(id)
            .map(|node| node.reverse_deps.as_slice())
            .unwrap_or_default();
        sources.iter().filter_map(move |source| self.nodes.get(source))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
