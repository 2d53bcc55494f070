use std::borrow::Cow;

use chrono::Utc;
use tabled::Tabled;

use crate::models::{Node, NodeStatus, Pod};
use crate::utils::{human_bytes, human_duration};

impl std::fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeStatus::Ready => write!(f, "Ready"),
            NodeStatus::Stopped => write!(f, "Stopped"),
        }
    }
}

impl Tabled for Node {
    const LENGTH: usize = 5;

    fn fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Owned(self.name.clone()),
            Cow::Owned(self.status.to_string()),
            Cow::Owned(format!("{}m", self.allocatable.cpu)),
            Cow::Owned(human_bytes(self.allocatable.memory)),
            Cow::Owned(human_duration(
                Utc::now()
                    .signed_duration_since(self.started_at)
                    .to_std()
                    .unwrap_or_default(),
            )),
        ]
    }

    fn headers() -> Vec<Cow<'static, str>> {
        vec![
            Cow::Borrowed("NAME"),
            Cow::Borrowed("STATUS"),
            Cow::Borrowed("CPU"),
            Cow::Borrowed("MEMORY"),
            Cow::Borrowed("AGE"),
        ]
    }
}

impl Tabled for Pod {
    const LENGTH: usize = 5;

    fn fields(&self) -> Vec<Cow<'_, str>> {
        let node = if self.is_assigned() {
            self.spec.node_name.as_str()
        } else {
            "<none>"
        };
        let group = self.metadata.label("podGroup").unwrap_or("<none>");
        vec![
            Cow::Owned(self.metadata.name.clone()),
            Cow::Borrowed(group),
            Cow::Borrowed(node),
            Cow::Owned(human_bytes(self.requests().memory)),
            Cow::Owned(human_duration(
                Utc::now()
                    .signed_duration_since(self.metadata.created_at)
                    .to_std()
                    .unwrap_or_default(),
            )),
        ]
    }

    fn headers() -> Vec<Cow<'static, str>> {
        vec![
            Cow::Borrowed("NAME"),
            Cow::Borrowed("GROUP"),
            Cow::Borrowed("NODE"),
            Cow::Borrowed("MEMORY"),
            Cow::Borrowed("AGE"),
        ]
    }
}
