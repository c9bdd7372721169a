use crate::{Resource, State};
use std::collections::HashMap;
use std::rc::Rc;

/// Maps every instance ID in a snapshot to the resource that owns it.
#[derive(Debug, Clone, Default)]
pub struct DependencyIndex {
    instance_to_resource: HashMap<String, Rc<Resource>>,
}

impl DependencyIndex {
    pub fn build(state: &State) -> Self {
        let mut instance_to_resource = HashMap::new();
        for res in &state.resources {
            for inst in &res.instances {
                instance_to_resource.insert(inst.id.clone(), Rc::clone(res));
            }
        }
        Self {
            instance_to_resource,
        }
    }

    pub fn owner(&self, instance_id: &str) -> Option<&Rc<Resource>> {
        self.instance_to_resource.get(instance_id)
    }

    pub fn len(&self) -> usize {
        self.instance_to_resource.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instance_to_resource.is_empty()
    }
}
