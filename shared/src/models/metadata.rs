use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// --- Metadata ---

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Metadata {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Metadata {
    pub fn named(name: &str) -> Self {
        Metadata {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_label(mut self, key: &str, value: &str) -> Self {
        self.labels.insert(key.to_string(), value.to_string());
        self
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }
}

impl Default for Metadata {
    fn default() -> Self {
        let id = Uuid::new_v4();
        Metadata {
            id,
            name: id.to_string(),
            labels: HashMap::new(),
            created_at: Utc::now(),
        }
    }
}
