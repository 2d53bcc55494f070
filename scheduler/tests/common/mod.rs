use std::sync::Arc;

use scheduler::{
    cache::ClusterCache,
    plugin::{CustomScheduler, GROUP_NAME_LABEL, MIN_AVAILABLE_LABEL},
};
use shared::models::{Metadata, Node, Pod, Resources};

pub const MI: i64 = 1 << 20;

/// Builds a pod that belongs to `group` and needs `min_available` members.
pub fn gang_member(name: &str, group: &str, min_available: u32) -> Pod {
    Pod::new(
        Metadata::named(name)
            .with_label(GROUP_NAME_LABEL, group)
            .with_label(MIN_AVAILABLE_LABEL, &min_available.to_string()),
        Resources::new(100, 64 * MI),
    )
}

pub fn node(name: &str, memory: i64) -> Node {
    Node::new(name, Resources::new(4000, memory))
}

/// Plugin with the given raw args over a fresh cache.
pub fn plugin_with(args: Option<&str>) -> (Arc<ClusterCache>, CustomScheduler) {
    let cache = Arc::new(ClusterCache::new());
    let plugin = CustomScheduler::new(args.map(str::as_bytes), cache.clone())
        .expect("plugin should initialize");
    (cache, plugin)
}
