use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::resources::Resources;

/// Represents a node in the cluster.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Node {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub status: NodeStatus,
    #[serde(default)]
    pub addr: String,
    /// Capacity available to pods
    pub allocatable: Resources,
    #[serde(default = "Utc::now")]
    pub started_at: DateTime<Utc>,
}

/// Status of a node in the cluster.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub enum NodeStatus {
    #[default]
    Ready,
    Stopped,
}

impl Node {
    pub fn new(name: &str, allocatable: Resources) -> Self {
        Node {
            name: name.to_string(),
            allocatable,
            ..Default::default()
        }
    }
}

impl Default for Node {
    fn default() -> Self {
        let id = Uuid::new_v4();
        Node {
            id,
            name: format!("node-{}", id),
            status: NodeStatus::Ready,
            addr: String::new(),
            allocatable: Resources::default(),
            started_at: Utc::now(),
        }
    }
}
