pub mod metadata;
pub mod node;
pub mod pod;
pub mod resources;

pub use metadata::Metadata;
pub use node::{Node, NodeStatus};
pub use pod::{ContainerSpec, Pod, PodSpec};
pub use resources::Resources;
