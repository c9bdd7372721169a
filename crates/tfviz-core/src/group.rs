//! Ordered, first-match-wins classification of resources into groups.

use crate::{DependencyIndex, Resource, State};
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::debug;

pub const LOAD_BALANCER_TYPE: &str = "aws_lb";
pub const LOAD_BALANCER_FAMILY: &[&str] = &[
    "aws_lb",
    "aws_lb_listener",
    "aws_lb_listener_rule",
    "aws_lb_target_group",
];
pub const CLUSTER_TYPES: &[&str] = &[
    "aws_eks_cluster",
    "aws_autoscaling_group",
    "aws_launch_template",
    "aws_launch_configuration",
    "aws_security_group",
];
pub const OBJECT_STORAGE_TYPES: &[&str] = &["aws_s3_bucket"];
pub const DATABASE_TYPES: &[&str] = &["aws_db_instance"];
pub const NETWORK_TYPES: &[&str] = &["aws_vpc", "aws_subnet"];

pub const LOAD_BALANCER_GROUP_NAME: &str = "Application Load Balancer";
pub const FALLBACK_GROUP_NAME: &str = "Other Resources";

#[derive(Debug, Clone)]
pub struct Group {
    pub key: String,
    pub name: String,
    pub resources: Vec<Rc<Resource>>,
}

/// Groups keyed by group key. Iteration is in sorted key order.
pub type Groups = BTreeMap<String, Group>;

#[derive(Debug, Clone)]
pub enum Rule {
    /// Load balancers and their listeners, listener rules and target groups,
    /// keyed by the address of the owning load balancer.
    LoadBalancer { index: Rc<DependencyIndex> },
    /// A fixed set of resource types collapsed into one named group.
    Category {
        key: &'static str,
        name: &'static str,
        types: &'static [&'static str],
    },
    /// Matches everything, keyed by resource type.
    Fallback,
}

impl Rule {
    pub fn load_balancer(index: Rc<DependencyIndex>) -> Self {
        Rule::LoadBalancer { index }
    }

    pub fn cluster() -> Self {
        Rule::Category {
            key: "eks",
            name: "EKS Cluster(s)",
            types: CLUSTER_TYPES,
        }
    }

    pub fn object_storage() -> Self {
        Rule::Category {
            key: "s3",
            name: "S3 Buckets",
            types: OBJECT_STORAGE_TYPES,
        }
    }

    pub fn database() -> Self {
        Rule::Category {
            key: "rds",
            name: "RDS Instances",
            types: DATABASE_TYPES,
        }
    }

    pub fn network() -> Self {
        Rule::Category {
            key: "vpc",
            name: "VPC / Subnets",
            types: NETWORK_TYPES,
        }
    }

    pub fn matches(&self, res: &Resource) -> bool {
        match self {
            Rule::LoadBalancer { .. } => is_load_balancer_family(res),
            Rule::Category { types, .. } => types.contains(&res.resource_type.as_str()),
            Rule::Fallback => true,
        }
    }

    pub fn group_key(&self, res: &Resource) -> String {
        match self {
            Rule::LoadBalancer { index } => load_balancer_key(index, res),
            Rule::Category { key, .. } => (*key).to_string(),
            Rule::Fallback => res.resource_type.clone(),
        }
    }

    pub fn group_name(&self, _res: &Resource) -> String {
        match self {
            Rule::LoadBalancer { .. } => LOAD_BALANCER_GROUP_NAME.to_string(),
            Rule::Category { name, .. } => (*name).to_string(),
            Rule::Fallback => FALLBACK_GROUP_NAME.to_string(),
        }
    }
}

fn is_load_balancer(res: &Resource) -> bool {
    res.is_type(LOAD_BALANCER_TYPE)
}

fn is_load_balancer_family(res: &Resource) -> bool {
    LOAD_BALANCER_FAMILY.contains(&res.resource_type.as_str())
}

fn load_balancer_key(index: &DependencyIndex, res: &Resource) -> String {
    if is_load_balancer(res) {
        return res.address.clone();
    }

    for inst in &res.instances {
        for dep in &inst.depends_on {
            if let Some(owner) = index.owner(dep) {
                if is_load_balancer(owner) {
                    return owner.address.clone();
                }
            }
        }
    }

    debug!(
        address = %res.address,
        "no owning load balancer found; resource keeps its own group"
    );
    res.address.clone()
}

/// Partitions `state` by evaluating `rules` in order for every resource.
///
/// The first matching rule decides the group. Resources no rule matches are
/// left out, so the last rule should be [`Rule::Fallback`]; [`RuleSet`]
/// guarantees that.
pub fn apply(rules: &[Rule], state: &State) -> Groups {
    let mut groups = Groups::new();

    for res in &state.resources {
        let Some(rule) = rules.iter().find(|rule| rule.matches(res)) else {
            continue;
        };
        let key = rule.group_key(res);
        groups
            .entry(key.clone())
            .or_insert_with(|| Group {
                key,
                name: rule.group_name(res),
                resources: Vec::new(),
            })
            .resources
            .push(Rc::clone(res));
    }

    debug!(
        resources = state.resources.len(),
        groups = groups.len(),
        "classified resources"
    );
    groups
}

/// An ordered rule list that always ends with [`Rule::Fallback`].
///
/// A `Fallback` passed among the specific rules is dropped so it cannot
/// shadow the rules after it.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(specific: impl IntoIterator<Item = Rule>) -> Self {
        let mut rules: Vec<Rule> = specific
            .into_iter()
            .filter(|rule| !matches!(rule, Rule::Fallback))
            .collect();
        rules.push(Rule::Fallback);
        Self { rules }
    }

    /// The built-in AWS rules: load balancers, clusters, databases, object
    /// storage, networking.
    pub fn aws(index: Rc<DependencyIndex>) -> Self {
        Self::new([
            Rule::load_balancer(index),
            Rule::cluster(),
            Rule::database(),
            Rule::object_storage(),
            Rule::network(),
        ])
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn apply(&self, state: &State) -> Groups {
        apply(&self.rules, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_slice;

    fn classify(json: &[u8]) -> Groups {
        let state = load_slice(json).expect("load");
        let index = Rc::new(DependencyIndex::build(&state));
        RuleSet::aws(index).apply(&state)
    }

    fn addresses(group: &Group) -> Vec<&str> {
        group.resources.iter().map(|r| r.address.as_str()).collect()
    }

    #[test]
    fn listener_joins_its_load_balancer_group() {
        let groups = classify(
            br#"{"resources": [
                {"type": "aws_lb", "name": "lb", "instances": [{}]},
                {"type": "aws_lb_listener", "name": "http", "instances": [{"depends_on": ["aws_lb.lb"]}]}
            ]}"#,
        );

        assert_eq!(groups.len(), 1);
        let group = &groups["aws_lb.lb"];
        assert_eq!(group.name, LOAD_BALANCER_GROUP_NAME);
        assert_eq!(addresses(group), vec!["aws_lb.lb", "aws_lb_listener.http"]);
    }

    #[test]
    fn first_load_balancer_dependency_wins() {
        let groups = classify(
            br#"{"resources": [
                {"type": "aws_lb", "name": "a", "instances": [{}]},
                {"type": "aws_lb", "name": "b", "instances": [{}]},
                {"type": "aws_lb_target_group", "name": "tg", "instances": [
                    {"depends_on": ["aws_vpc.main", "aws_lb.b", "aws_lb.a"]}
                ]},
                {"type": "aws_vpc", "name": "main", "instances": [{}]}
            ]}"#,
        );

        assert_eq!(
            addresses(&groups["aws_lb.b"]),
            vec!["aws_lb.b", "aws_lb_target_group.tg"]
        );
        assert_eq!(addresses(&groups["aws_lb.a"]), vec!["aws_lb.a"]);
    }

    #[test]
    fn dangling_listener_falls_back_to_own_address() {
        let groups = classify(
            br#"{"resources": [
                {"type": "aws_lb_listener", "name": "orphan", "instances": [{"depends_on": ["aws_lb.missing"]}]}
            ]}"#,
        );

        let group = &groups["aws_lb_listener.orphan"];
        assert_eq!(group.name, LOAD_BALANCER_GROUP_NAME);
        assert_eq!(addresses(group), vec!["aws_lb_listener.orphan"]);
    }

    #[test]
    fn fixed_categories_collapse_into_one_group() {
        let groups = classify(
            br#"{"resources": [
                {"type": "aws_eks_cluster", "name": "main", "instances": [{}]},
                {"type": "aws_security_group", "name": "nodes", "instances": [{}]},
                {"type": "aws_s3_bucket", "name": "logs", "instances": [{}]},
                {"type": "aws_s3_bucket", "name": "assets", "instances": [{}]},
                {"type": "aws_db_instance", "name": "pg", "instances": [{}]},
                {"type": "aws_subnet", "name": "a", "instances": [{}]},
                {"type": "aws_vpc", "name": "main", "instances": [{}]}
            ]}"#,
        );

        let keys: Vec<&str> = groups.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["eks", "rds", "s3", "vpc"]);
        assert_eq!(groups["eks"].name, "EKS Cluster(s)");
        assert_eq!(
            addresses(&groups["s3"]),
            vec!["aws_s3_bucket.logs", "aws_s3_bucket.assets"]
        );
        assert_eq!(groups["vpc"].resources.len(), 2);
    }

    #[test]
    fn fallback_groups_by_type() {
        let groups = classify(
            br#"{"resources": [
                {"type": "aws_iam_role", "name": "a", "instances": [{}]},
                {"type": "aws_iam_role", "name": "b", "instances": [{}]},
                {"type": "aws_route53_zone", "name": "z", "instances": [{}]}
            ]}"#,
        );

        assert_eq!(groups["aws_iam_role"].name, FALLBACK_GROUP_NAME);
        assert_eq!(groups["aws_iam_role"].resources.len(), 2);
        assert_eq!(groups["aws_route53_zone"].resources.len(), 1);
    }

    #[test]
    fn earlier_rule_wins_over_catch_all() {
        let state = load_slice(
            br#"{"resources": [{"type": "aws_s3_bucket", "name": "logs", "instances": [{}]}]}"#,
        )
        .expect("load");

        let groups = apply(&[Rule::object_storage(), Rule::Fallback], &state);
        assert!(groups.contains_key("s3"));
        assert!(!groups.contains_key("aws_s3_bucket"));

        let groups = apply(&[Rule::Fallback, Rule::object_storage()], &state);
        assert!(groups.contains_key("aws_s3_bucket"));
        assert!(!groups.contains_key("s3"));
    }

    #[test]
    fn every_resource_lands_in_exactly_one_group() {
        let state = load_slice(
            br#"{"resources": [
                {"type": "aws_lb", "name": "lb", "instances": [{}]},
                {"type": "aws_lb_listener", "name": "l", "instances": [{"depends_on": ["aws_lb.lb"]}]},
                {"type": "aws_lb_listener_rule", "name": "r", "instances": [{"depends_on": ["nope"]}]},
                {"type": "aws_eks_cluster", "name": "c", "instances": [{}]},
                {"type": "aws_db_instance", "name": "d", "instances": [{}]},
                {"type": "aws_vpc", "name": "v", "instances": [{}]},
                {"type": "aws_kms_key", "name": "k", "instances": []},
                {"mode": "data", "type": "aws_ami", "name": "ami", "instances": [{}]}
            ]}"#,
        )
        .expect("load");
        let groups = RuleSet::aws(Rc::new(DependencyIndex::build(&state))).apply(&state);

        let mut seen: Vec<&str> = groups
            .values()
            .flat_map(|group| group.resources.iter().map(|r| r.address.as_str()))
            .collect();
        seen.sort();
        let mut expected: Vec<&str> = state.resources.iter().map(|r| r.address.as_str()).collect();
        expected.sort();
        assert_eq!(seen, expected);
    }

    #[test]
    fn resources_without_matching_rule_are_dropped() {
        let state = load_slice(
            br#"{"resources": [{"type": "aws_iam_role", "name": "a", "instances": [{}]}]}"#,
        )
        .expect("load");
        assert!(apply(&[Rule::database()], &state).is_empty());
    }

    #[test]
    fn rule_set_always_ends_with_fallback() {
        let set = RuleSet::new([Rule::Fallback, Rule::database()]);
        assert_eq!(set.rules().len(), 2);
        assert!(matches!(set.rules()[0], Rule::Category { key: "rds", .. }));
        assert!(matches!(set.rules().last(), Some(Rule::Fallback)));

        assert!(matches!(RuleSet::new(Vec::new()).rules(), [Rule::Fallback]));
    }
}
