use std::collections::{HashMap, HashSet};

use dashmap::{DashMap, DashSet};
use shared::api::{ClusterSnapshot, EventType, NodeEvent, PodEvent};
use shared::models::{Node, Pod, Resources};
use uuid::Uuid;

use crate::errors::PluginError;
use crate::framework::{Handle, LabelSelector, NodeInfo};

/// Tracks a node and the running total of requests assigned to it.
#[derive(Debug, Clone)]
struct NodeEntry {
    node: Node,
    requested: Resources,
}

/// An in-memory concurrent cache of pods and nodes, read by plugins
/// through [`Handle`] and written by whoever feeds it cluster events.
#[derive(Debug, Default)]
pub struct ClusterCache {
    nodes: DashMap<String, NodeEntry>,
    pods: DashMap<Uuid, Pod>,
    /// Labels lookups: key -> value -> pod ids
    pod_label_idx: DashMap<String, DashMap<String, DashSet<Uuid>>>,
}

impl ClusterCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes first so that assigned pods find their node.
    pub fn from_snapshot(snapshot: ClusterSnapshot) -> Self {
        let cache = Self::new();
        for node in &snapshot.nodes {
            cache.add_node(node);
        }
        for pod in &snapshot.pods {
            cache.add_pod(pod);
        }
        cache
    }

    // --- Node ops ---

    /// Adds or replaces a node, keeping the requests already accounted to it.
    pub fn add_node(&self, node: &Node) {
        self.nodes
            .entry(node.name.clone())
            .and_modify(|entry| entry.node = node.clone())
            .or_insert_with(|| NodeEntry {
                node: node.clone(),
                requested: Resources::default(),
            });
    }

    pub fn remove_node(&self, name: &str) {
        if self.nodes.remove(name).is_none() {
            tracing::warn!(node=%name, "Failed to remove unknown node");
        }
    }

    pub fn nodes(&self) -> Vec<Node> {
        self.nodes.iter().map(|e| e.node.clone()).collect()
    }

    pub fn node_names(&self) -> Vec<String> {
        self.nodes.iter().map(|e| e.key().clone()).collect()
    }

    // --- Pod ops ---

    pub fn unassigned_pods(&self) -> Vec<Pod> {
        self.pods
            .iter()
            .filter(|e| !e.is_assigned())
            .map(|e| e.value().clone())
            .collect()
    }

    /// Inserts a pod, indexes its labels and charges its requests to its node.
    pub fn add_pod(&self, pod: &Pod) {
        if self.pods.contains_key(&pod.metadata.id) {
            self.delete_pod(&pod.metadata.id);
        }
        for (k, v) in &pod.metadata.labels {
            self.pod_label_idx
                .entry(k.clone())
                .or_default()
                .entry(v.clone())
                .or_default()
                .insert(pod.metadata.id);
        }
        if pod.is_assigned() {
            self.charge(&pod.spec.node_name, &pod.requests());
        }
        self.pods.insert(pod.metadata.id, pod.clone());
    }

    pub fn delete_pod(&self, id: &Uuid) {
        let Some((_, pod)) = self.pods.remove(id) else {
            tracing::warn!(%id, "Failed to delete pod");
            return;
        };
        self.remove_pod_labels(id, &pod.metadata.labels);
        if pod.is_assigned() {
            self.release(&pod.spec.node_name, &pod.requests());
        }
    }

    /// Moves a pod to `node`, transferring its requests between nodes.
    pub fn assign_pod(&self, id: &Uuid, node: &str) {
        let Some(mut pod) = self.pods.get_mut(id) else {
            tracing::warn!(%id, "Failed to assign unknown pod");
            return;
        };
        let requests = pod.requests();
        if pod.is_assigned() {
            self.release(&pod.spec.node_name, &requests);
        }
        self.charge(node, &requests);
        pod.spec.node_name = node.to_string();
    }

    pub fn apply_pod_event(&self, event: PodEvent) {
        match event.event_type {
            EventType::Added | EventType::Modified => self.add_pod(&event.pod),
            EventType::Deleted => self.delete_pod(&event.pod.metadata.id),
        }
    }

    pub fn apply_node_event(&self, event: NodeEvent) {
        match event.event_type {
            EventType::Added | EventType::Modified => self.add_node(&event.node),
            EventType::Deleted => self.remove_node(&event.node.name),
        }
    }

    /// Drops `id` from the label index, pruning values and keys left empty.
    fn remove_pod_labels(&self, id: &Uuid, labels: &HashMap<String, String>) {
        for (k, v) in labels {
            let key_empty = match self.pod_label_idx.get(k) {
                Some(inner) => {
                    if let Some(set) = inner.get(v) {
                        set.remove(id);
                    }
                    inner.remove_if(v, |_, set| set.is_empty());
                    inner.is_empty()
                }
                None => false,
            };
            // the outer shard lock is released before pruning the key
            if key_empty {
                self.pod_label_idx.remove_if(k, |_, inner| inner.is_empty());
            }
        }
    }

    fn charge(&self, node: &str, requests: &Resources) {
        match self.nodes.get_mut(node) {
            Some(mut entry) => entry.requested.add(requests),
            None => tracing::warn!(node=%node, "Pod assigned to unknown node"),
        }
    }

    fn release(&self, node: &str, requests: &Resources) {
        if let Some(mut entry) = self.nodes.get_mut(node) {
            entry.requested.sub(requests);
        }
    }

    /// Ids of pods matching every requirement, by intersecting the label index.
    fn query_pods_by_labels(&self, selector: &LabelSelector) -> HashSet<Uuid> {
        let mut intersection: Option<HashSet<Uuid>> = None;

        for (k, v) in selector.requirements() {
            let Some(set) = self
                .pod_label_idx
                .get(k)
                .and_then(|inner| {
                    inner
                        .get(v)
                        .map(|set| set.iter().map(|id| *id).collect::<HashSet<Uuid>>())
                })
            else {
                return HashSet::new();
            };
            intersection = Some(match intersection {
                None => set,
                Some(acc) => acc.intersection(&set).copied().collect(),
            });
        }

        // empty selector matches everything
        intersection.unwrap_or_else(|| self.pods.iter().map(|e| *e.key()).collect())
    }
}

impl Handle for ClusterCache {
    fn list_pods(&self, selector: &LabelSelector) -> Vec<Pod> {
        self.query_pods_by_labels(selector)
            .iter()
            .filter_map(|id| self.pods.get(id).map(|p| p.clone()))
            .collect()
    }

    fn node_info(&self, node_name: &str) -> Result<NodeInfo, PluginError> {
        let entry = self
            .nodes
            .get(node_name)
            .ok_or_else(|| PluginError::NodeNotFound(node_name.to_string()))?;
        Ok(NodeInfo {
            name: node_name.to_string(),
            allocatable_memory: entry.node.allocatable.memory,
            requested_memory: entry.requested.memory,
        })
    }
}

#[cfg(test)]
mod tests {

    //! - test_label_query_intersects
    //!     only pods carrying every selector label are listed.
    //! - test_requested_memory_follows_assignment
    //!     assigning, reassigning and deleting pods moves the requested totals.
    //! - test_replacing_pod_does_not_double_count
    //!     a modified event for an assigned pod charges its node once.
    //! - test_label_index_is_pruned
    //!     deleting the last pod of a label value leaves no empty index entries.
    //! - test_unknown_node_is_distinct_error
    //!     node lookups on a missing node report `NodeNotFound`.

    use super::*;
    use shared::models::Metadata;

    const MI: i64 = 1 << 20;

    fn pod(name: &str, group: &str, memory: i64) -> Pod {
        Pod::new(
            Metadata::named(name)
                .with_label("podGroup", group)
                .with_label("minAvailable", "2"),
            Resources::new(100, memory),
        )
    }

    #[test]
    fn test_label_query_intersects() {
        let cache = ClusterCache::new();
        cache.add_pod(&pod("a", "g1", MI));
        cache.add_pod(&pod("b", "g1", MI));
        cache.add_pod(&pod("c", "g2", MI));
        cache.add_pod(&Pod::new(Metadata::named("plain"), Resources::default()));

        let g1 = cache.list_pods(&LabelSelector::from_pairs([("podGroup", "g1")]));
        let mut names: Vec<_> = g1.iter().map(|p| p.metadata.name.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["a", "b"]);

        let none = cache.list_pods(&LabelSelector::from_pairs([
            ("podGroup", "g2"),
            ("minAvailable", "3"),
        ]));
        assert!(none.is_empty());

        // pods without the label are not part of the empty-valued group
        let empty = cache.list_pods(&LabelSelector::from_pairs([("podGroup", "")]));
        assert!(empty.is_empty());

        assert_eq!(cache.list_pods(&LabelSelector::default()).len(), 4);
    }

    #[test]
    fn test_requested_memory_follows_assignment() {
        let cache = ClusterCache::new();
        cache.add_node(&Node::new("n1", Resources::new(4000, 1024 * MI)));
        cache.add_node(&Node::new("n2", Resources::new(4000, 1024 * MI)));

        let p = pod("a", "g1", 256 * MI);
        let id = p.metadata.id;
        cache.add_pod(&p);
        assert_eq!(cache.node_info("n1").unwrap().requested_memory, 0);

        cache.assign_pod(&id, "n1");
        assert_eq!(cache.node_info("n1").unwrap().memory_headroom(), 768 * MI);

        cache.assign_pod(&id, "n2");
        assert_eq!(cache.node_info("n1").unwrap().requested_memory, 0);
        assert_eq!(cache.node_info("n2").unwrap().requested_memory, 256 * MI);
        assert!(cache.unassigned_pods().is_empty());

        cache.delete_pod(&id);
        assert_eq!(cache.node_info("n2").unwrap().requested_memory, 0);
        assert!(cache
            .list_pods(&LabelSelector::from_pairs([("podGroup", "g1")]))
            .is_empty());
    }

    #[test]
    fn test_replacing_pod_does_not_double_count() {
        let cache = ClusterCache::new();
        cache.add_node(&Node::new("n1", Resources::new(4000, 1024 * MI)));

        let mut p = pod("a", "g1", 128 * MI);
        p.spec.node_name = "n1".to_string();
        cache.apply_pod_event(PodEvent {
            event_type: EventType::Added,
            pod: p.clone(),
        });
        cache.apply_pod_event(PodEvent {
            event_type: EventType::Modified,
            pod: p,
        });

        assert_eq!(cache.node_info("n1").unwrap().requested_memory, 128 * MI);
    }

    #[test]
    fn test_label_index_is_pruned() {
        let cache = ClusterCache::new();
        let a = pod("a", "g1", MI);
        let b = pod("b", "g2", MI);
        cache.add_pod(&a);
        cache.add_pod(&b);

        cache.delete_pod(&a.metadata.id);
        assert!(cache.pod_label_idx.get("podGroup").unwrap().get("g1").is_none());
        assert!(cache.pod_label_idx.get("podGroup").unwrap().get("g2").is_some());

        cache.delete_pod(&b.metadata.id);
        assert!(cache.pod_label_idx.is_empty());

        // re-adding after a prune indexes from scratch
        cache.add_pod(&a);
        assert_eq!(
            cache
                .list_pods(&LabelSelector::from_pairs([("podGroup", "g1")]))
                .len(),
            1
        );
    }

    #[test]
    fn test_unknown_node_is_distinct_error() {
        let cache = ClusterCache::new();
        assert_eq!(
            cache.node_info("ghost"),
            Err(PluginError::NodeNotFound("ghost".to_string()))
        );

        cache.apply_node_event(NodeEvent {
            event_type: EventType::Added,
            node: Node::new("ghost", Resources::default()),
        });
        assert!(cache.node_info("ghost").is_ok());

        cache.apply_node_event(NodeEvent {
            event_type: EventType::Deleted,
            node: Node::new("ghost", Resources::default()),
        });
        assert!(cache.node_info("ghost").is_err());
    }
}
