//! Human-readable labels for resources and instances.

use crate::{Attributes, Instance, Resource};

/// `type : <tags.Name>`, falling back to the `name` attribute, then the ARN,
/// then the address. Instances are checked in order.
pub fn resource_label(res: &Resource) -> String {
    for inst in &res.instances {
        if let Some(name) = name_tag(&inst.attributes) {
            return format!("{} : {}", res.resource_type, name);
        }
        if let Some(name) = string_attr(&inst.attributes, "name") {
            return format!("{} : {}", res.resource_type, name);
        }
        if let Some(arn) = string_attr(&inst.attributes, "arn") {
            return format!("{} : {}", res.resource_type, arn);
        }
    }
    res.address.clone()
}

pub fn instance_label(inst: &Instance) -> String {
    string_attr(&inst.attributes, "arn")
        .or_else(|| string_attr(&inst.attributes, "name"))
        .unwrap_or(inst.id.as_str())
        .to_string()
}

/// Leaf label in the tree: the resource name, or the address when unnamed.
pub fn display_name(res: &Resource) -> &str {
    if res.name.is_empty() {
        &res.address
    } else {
        &res.name
    }
}

pub fn name_tag(attributes: &Attributes) -> Option<&str> {
    attributes
        .get("tags")
        .and_then(|tags| tags.as_object())
        .and_then(|tags| tags.get("Name"))
        .and_then(|name| name.as_str())
}

pub fn string_attr<'a>(attributes: &'a Attributes, key: &str) -> Option<&'a str> {
    attributes.get(key).and_then(|value| value.as_str())
}
