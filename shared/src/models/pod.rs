use serde::{Deserialize, Serialize};

use crate::models::metadata::Metadata;
use crate::models::resources::Resources;

// --- Core ---

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Pod {
    pub metadata: Metadata,
    #[serde(default)]
    pub spec: PodSpec,
}

/// Desired state
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PodSpec {
    /// Empty while unassigned
    #[serde(default)]
    pub node_name: String,
    #[serde(default)]
    pub containers: Vec<ContainerSpec>,
}

// --- Containers ---

/// Definition of a container within a Pod.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    #[serde(default)]
    pub requests: Resources,
}

// --- Impl ---

impl Pod {
    pub fn new(metadata: Metadata, requests: Resources) -> Self {
        Pod {
            metadata,
            spec: PodSpec {
                node_name: String::new(),
                containers: vec![ContainerSpec {
                    requests,
                    ..Default::default()
                }],
            },
        }
    }

    /// Sum of the requests of every container
    pub fn requests(&self) -> Resources {
        self.spec
            .containers
            .iter()
            .fold(Resources::default(), |mut acc, c| {
                acc.add(&c.requests);
                acc
            })
    }

    pub fn is_assigned(&self) -> bool {
        !self.spec.node_name.is_empty()
    }
}

impl Default for ContainerSpec {
    fn default() -> Self {
        ContainerSpec {
            name: "test-container".to_string(),
            image: "busybox:latest".to_string(),
            requests: Resources::default(),
        }
    }
}

impl Default for PodSpec {
    fn default() -> Self {
        PodSpec {
            node_name: "".to_string(),
            containers: vec![ContainerSpec::default()],
        }
    }
}
