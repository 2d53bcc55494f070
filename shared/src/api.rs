use serde::{Deserialize, Serialize};

use crate::models::{Node, Pod};

// ============================= SNAPSHOT

/// Point in time dump of cluster objects
#[derive(Deserialize, Serialize, Debug, Default)]
pub struct ClusterSnapshot {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub pods: Vec<Pod>,
}

// ============================= EVENTS

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PodEvent {
    pub event_type: EventType,
    pub pod: Pod,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeEvent {
    pub event_type: EventType,
    pub node: Node,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub enum EventType {
    Added,
    Deleted,
    Modified,
}
