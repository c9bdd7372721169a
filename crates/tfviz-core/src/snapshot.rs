//! Reads a state document and normalizes it into a [`State`].

use crate::{instance_id, resource_address, Attributes, Instance, Resource, ResourceMode, State};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to normalize state: {0}")]
    Normalize(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawState {
    #[serde(default)]
    version: Option<u64>,
    #[serde(default)]
    terraform_version: Option<String>,
    #[serde(default)]
    serial: Option<u64>,
    #[serde(default)]
    lineage: Option<String>,
    #[serde(default)]
    resources: Option<Vec<RawResource>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawResource {
    #[serde(default)]
    module: Option<String>,
    #[serde(default)]
    mode: Option<ResourceMode>,
    #[serde(default, rename = "type")]
    resource_type: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    provider: String,
    #[serde(default)]
    instances: Option<Vec<RawInstance>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawInstance {
    #[serde(default)]
    attributes: Option<Attributes>,
    #[serde(default)]
    depends_on: Option<Vec<String>>,
    #[serde(default)]
    index_key: Option<Value>,
}

pub fn load_file(path: impl AsRef<Path>) -> Result<State, LoadError> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let state = parse(&data, &path.display().to_string())?;
    info!(
        path = %path.display(),
        resources = state.resources.len(),
        instances = state.instance_count(),
        "loaded state snapshot"
    );
    Ok(state)
}

pub fn load_slice(data: &[u8]) -> Result<State, LoadError> {
    parse(data, "<input>")
}

fn parse(data: &[u8], origin: &str) -> Result<State, LoadError> {
    let raw: RawState = serde_json::from_slice(data).map_err(|source| LoadError::Parse {
        origin: origin.to_string(),
        source,
    })?;
    normalize(raw)
}

fn normalize(raw: RawState) -> Result<State, LoadError> {
    let mut resources = Vec::new();

    for rr in raw.resources.unwrap_or_default() {
        let mode = rr.mode.unwrap_or_default();
        let address = resource_address(rr.module.as_deref(), mode, &rr.resource_type, &rr.name);

        let instances: Vec<Rc<Instance>> = rr
            .instances
            .unwrap_or_default()
            .into_iter()
            .map(|inst| {
                let index_key = inst.index_key.as_ref().and_then(normalize_index);
                Rc::new(Instance {
                    id: instance_id(&address, index_key.as_deref()),
                    index_key,
                    attributes: inst.attributes.unwrap_or_default(),
                    depends_on: inst.depends_on.unwrap_or_default(),
                })
            })
            .collect();

        let attributes = match instances.as_slice() {
            [only] => only.attributes.clone(),
            _ => Attributes::new(),
        };

        resources.push(Rc::new(Resource {
            address,
            resource_type: rr.resource_type,
            name: rr.name,
            provider: rr.provider,
            mode,
            instances,
            attributes,
        }));
    }

    Ok(State {
        version: raw.version.unwrap_or_default(),
        terraform_version: raw.terraform_version.unwrap_or_default(),
        serial: raw.serial.unwrap_or_default(),
        lineage: raw.lineage.unwrap_or_default(),
        resources,
    })
}

fn normalize_index(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}
