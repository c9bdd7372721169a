//! Display hierarchy built from the group partition: root, groups, resources,
//! and on demand the instances of a resource.
//!
//! Nodes live in one arena owned by [`Tree`]. Children are owned through the
//! arena; parents are plain indices used only for navigation.

use crate::group::Groups;
use crate::label::{display_name, instance_label, name_tag, string_attr};
use crate::{Instance, Resource};
use std::rc::Rc;

pub const ROOT_LABEL: &str = "Terraform Resources";
const SELECTED_MARKER: &str = "▶ ";
const UNSELECTED_MARKER: &str = "  ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Group,
    Resource,
    Instance,
}

#[derive(Debug, Clone)]
pub struct TreeNode {
    pub label: String,
    pub kind: NodeKind,
    pub expanded: bool,
    pub resource: Option<Rc<Resource>>,
    pub instance: Option<Rc<Instance>>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl TreeNode {
    fn new(label: impl Into<String>, kind: NodeKind, parent: Option<NodeId>) -> Self {
        Self {
            label: label.into(),
            kind,
            expanded: false,
            resource: None,
            instance: None,
            parent,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<TreeNode>,
}

impl Tree {
    /// Root -> one expanded node per group in sorted key order -> one
    /// collapsed leaf per resource in group order.
    pub fn project(groups: &Groups) -> Self {
        let mut root = TreeNode::new(ROOT_LABEL, NodeKind::Group, None);
        root.expanded = true;
        let mut tree = Self { nodes: vec![root] };
        let root = tree.root();

        // BTreeMap iteration is already in lexicographic key order.
        for group in groups.values() {
            let mut group_node = TreeNode::new(group.name.clone(), NodeKind::Group, Some(root));
            group_node.expanded = true;
            let group_id = tree.push(group_node);

            for res in &group.resources {
                let mut leaf = TreeNode::new(display_name(res), NodeKind::Resource, Some(group_id));
                leaf.resource = Some(Rc::clone(res));
                tree.push(leaf);
            }
        }

        tree
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(TreeNode::children).unwrap_or_default()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(TreeNode::parent)
    }

    /// Group-level nodes, in display order.
    pub fn groups(&self) -> &[NodeId] {
        self.children(self.root())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn set_expanded(&mut self, id: NodeId, expanded: bool) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.expanded = expanded;
        }
    }

    /// Adds one leaf per instance under a resource node. Returns the number
    /// of leaves added; repeated calls and non-resource nodes add nothing.
    pub fn attach_instances(&mut self, id: NodeId) -> usize {
        let Some(node) = self.node(id) else {
            return 0;
        };
        if node.kind != NodeKind::Resource || !node.children.is_empty() {
            return 0;
        }
        let Some(res) = node.resource.clone() else {
            return 0;
        };

        for inst in &res.instances {
            let mut leaf = TreeNode::new(instance_label(inst), NodeKind::Instance, Some(id));
            leaf.instance = Some(Rc::clone(inst));
            leaf.resource = Some(Rc::clone(&res));
            self.push(leaf);
        }
        res.instances.len()
    }

    /// Indented outline of every visible node below the root.
    pub fn render_lines(&self, selected: Option<NodeId>, width: usize) -> Vec<String> {
        let mut lines = Vec::new();
        self.render_node(self.root(), selected, 0, width, &mut lines);
        lines
    }

    fn render_node(
        &self,
        id: NodeId,
        selected: Option<NodeId>,
        depth: usize,
        width: usize,
        lines: &mut Vec<String>,
    ) {
        let Some(node) = self.node(id) else {
            return;
        };

        if node.parent.is_some() {
            let marker = if selected == Some(id) {
                SELECTED_MARKER
            } else {
                UNSELECTED_MARKER
            };
            let line = format!(
                "{}{}{}",
                "  ".repeat(depth.saturating_sub(1)),
                marker,
                node.label
            );
            lines.push(line.chars().take(width).collect());
        }

        if !node.expanded {
            return;
        }
        for child in &node.children {
            self.render_node(*child, selected, depth + 1, width, lines);
        }
    }

    fn push(&mut self, node: TreeNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        if let Some(parent) = node.parent {
            self.nodes[parent.0].children.push(id);
        }
        self.nodes.push(node);
        id
    }
}

/// Plain-text summary of a node for the detail view.
pub fn describe(node: &TreeNode) -> String {
    match node.kind {
        NodeKind::Group => format!("Group: {}\nResources: {}", node.label, node.children.len()),
        NodeKind::Resource => match &node.resource {
            Some(res) => describe_resource(&node.label, res).join("\n"),
            None => format!("Resource: {} (no details)", node.label),
        },
        NodeKind::Instance => match &node.instance {
            Some(inst) => format!(
                "Instance: {}\nIndex: {}",
                inst.id,
                inst.index_key.as_deref().unwrap_or("")
            ),
            None => format!("Instance: {} (no details)", node.label),
        },
    }
}

pub fn describe_resource(label: &str, res: &Resource) -> Vec<String> {
    let mut lines = vec![
        format!("Resource: {label}"),
        format!("Type: {}", res.resource_type),
    ];
    if let Some(arn) = string_attr(&res.attributes, "arn") {
        lines.push(format!("ARN: {arn}"));
    }
    if let Some(name) = name_tag(&res.attributes) {
        lines.push(format!("Name Tag: {name}"));
    }
    lines.push(format!("Instances: {}", res.instances.len()));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::Group;
    use crate::{load_slice, DependencyIndex, RuleSet};

    fn group(key: &str, name: &str, resources: Vec<Rc<Resource>>) -> (String, Group) {
        (
            key.to_string(),
            Group {
                key: key.to_string(),
                name: name.to_string(),
                resources,
            },
        )
    }

    fn resource(address: &str, name: &str) -> Rc<Resource> {
        Rc::new(Resource {
            address: address.to_string(),
            name: name.to_string(),
            ..Resource::default()
        })
    }

    fn labels(tree: &Tree, ids: &[NodeId]) -> Vec<String> {
        ids.iter()
            .filter_map(|id| tree.node(*id))
            .map(|node| node.label.clone())
            .collect()
    }

    #[test]
    fn groups_are_ordered_by_key_not_insertion() {
        let mut groups = Groups::new();
        for (key, g) in [
            group("s3", "S3 Buckets", Vec::new()),
            group("rds", "RDS Instances", Vec::new()),
            group("eks", "EKS Cluster(s)", Vec::new()),
        ] {
            groups.insert(key, g);
        }

        let tree = Tree::project(&groups);
        assert_eq!(
            labels(&tree, tree.groups()),
            vec!["EKS Cluster(s)", "RDS Instances", "S3 Buckets"]
        );
    }

    #[test]
    fn three_levels_with_parent_links() {
        let groups: Groups = [group(
            "s3",
            "S3 Buckets",
            vec![
                resource("aws_s3_bucket.logs", "logs"),
                resource("aws_s3_bucket.unnamed", ""),
            ],
        )]
        .into_iter()
        .collect();

        let tree = Tree::project(&groups);
        let root = tree.root();
        let root_node = tree.node(root).expect("root");
        assert_eq!(root_node.label, ROOT_LABEL);
        assert!(root_node.expanded);
        assert_eq!(root_node.parent(), None);

        let group_id = tree.groups()[0];
        let group_node = tree.node(group_id).expect("group");
        assert_eq!(group_node.kind, NodeKind::Group);
        assert!(group_node.expanded);
        assert_eq!(tree.parent(group_id), Some(root));

        let leaves = tree.children(group_id);
        assert_eq!(labels(&tree, leaves), vec!["logs", "aws_s3_bucket.unnamed"]);
        for leaf in leaves {
            let node = tree.node(*leaf).expect("leaf");
            assert_eq!(node.kind, NodeKind::Resource);
            assert!(!node.expanded);
            assert!(node.children().is_empty());
            assert!(node.resource.is_some());
            assert_eq!(tree.parent(*leaf), Some(group_id));
        }
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn empty_partition_yields_only_root() {
        let tree = Tree::project(&Groups::new());
        assert_eq!(tree.len(), 1);
        assert!(tree.groups().is_empty());
        assert!(tree.render_lines(None, 80).is_empty());
    }

    #[test]
    fn attach_instances_adds_leaves_once() {
        let state = load_slice(
            br#"{"resources": [{"type": "aws_instance", "name": "web", "instances": [
                {"index_key": 0, "attributes": {"arn": "arn:web:0"}},
                {"index_key": 1}
            ]}]}"#,
        )
        .expect("load");
        let groups = RuleSet::aws(Rc::new(DependencyIndex::build(&state))).apply(&state);
        let mut tree = Tree::project(&groups);
        let leaf = tree.children(tree.groups()[0])[0];

        assert_eq!(tree.attach_instances(leaf), 2);
        assert_eq!(tree.attach_instances(leaf), 0);
        assert_eq!(tree.attach_instances(tree.root()), 0);

        let instances = tree.children(leaf).to_vec();
        assert_eq!(labels(&tree, &instances), vec!["arn:web:0", "aws_instance.web[1]"]);
        let node = tree.node(instances[1]).expect("instance");
        assert_eq!(node.kind, NodeKind::Instance);
        assert_eq!(describe(node), "Instance: aws_instance.web[1]\nIndex: 1");
    }

    #[test]
    fn render_lines_indents_and_marks_selection() {
        let groups: Groups = [
            group("b", "Beta", vec![resource("x.one", "one")]),
            group("a", "Alpha", vec![resource("x.two", "two"), resource("x.three", "three")]),
        ]
        .into_iter()
        .collect();
        let mut tree = Tree::project(&groups);
        let beta = tree.groups()[1];
        let selected = tree.children(tree.groups()[0])[1];

        assert_eq!(
            tree.render_lines(Some(selected), 80),
            vec!["  Alpha", "    two", "  ▶ three", "  Beta", "    one"]
        );

        tree.set_expanded(beta, false);
        assert_eq!(
            tree.render_lines(None, 5),
            vec!["  Alp", "    t", "    t", "  Bet"]
        );
    }

    #[test]
    fn describe_summarizes_groups_and_resources() {
        let state = load_slice(
            br#"{"resources": [{"type": "aws_lb", "name": "main", "instances": [
                {"attributes": {"arn": "arn:lb", "tags": {"Name": "public"}}}
            ]}]}"#,
        )
        .expect("load");
        let groups = RuleSet::aws(Rc::new(DependencyIndex::build(&state))).apply(&state);
        let tree = Tree::project(&groups);
        let group_id = tree.groups()[0];

        assert_eq!(
            describe(tree.node(group_id).expect("group")),
            "Group: Application Load Balancer\nResources: 1"
        );
        let leaf = tree.children(group_id)[0];
        assert_eq!(
            describe(tree.node(leaf).expect("leaf")),
            "Resource: main\nType: aws_lb\nARN: arn:lb\nName Tag: public\nInstances: 1"
        );
    }
}
