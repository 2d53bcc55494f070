use serde::{Deserialize, Serialize};

use crate::utils::{de_cpu, de_memory};

/// Cpu in millicores, memory in bytes.
///
/// Signed so that over-committed nodes can report negative headroom.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Resources {
    #[serde(default, deserialize_with = "de_cpu")]
    pub cpu: i64,
    #[serde(default, deserialize_with = "de_memory")]
    pub memory: i64,
}

impl Resources {
    pub fn new(cpu: i64, memory: i64) -> Self {
        Self { cpu, memory }
    }

    pub fn add(&mut self, other: &Self) {
        self.cpu = self.cpu.saturating_add(other.cpu);
        self.memory = self.memory.saturating_add(other.memory);
    }

    /// Subtract resources (used when a pod leaves a node)
    pub fn sub(&mut self, other: &Self) {
        self.cpu = self.cpu.saturating_sub(other.cpu);
        self.memory = self.memory.saturating_sub(other.memory);
    }
}
