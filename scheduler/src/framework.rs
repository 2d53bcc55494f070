//! Scheduling framework contract
//!
//! Types and extension point traits shared between the pipeline that
//! sequences a placement attempt and the plugins it drives:
//! - PreFilter: admission before any node is considered
//! - Score: one raw score per candidate node
//! - NormalizeScore: rescale the collected scores into the canonical range

use std::collections::{HashMap, HashSet};
use std::fmt;

use shared::models::Pod;
use uuid::Uuid;

use crate::errors::PluginError;

/// Lowest score a plugin may hand back after normalization.
pub const MIN_NODE_SCORE: i64 = 0;
/// Highest score a plugin may hand back after normalization.
pub const MAX_NODE_SCORE: i64 = 100;

// --- Status ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Code {
    Success,
    /// Internal failure, the attempt for this pod is aborted
    Error,
    /// Not a fault, retry on a later cycle
    Unschedulable,
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Code::Success => write!(f, "Success"),
            Code::Error => write!(f, "Error"),
            Code::Unschedulable => write!(f, "Unschedulable"),
        }
    }
}

/// Outcome of a plugin call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    code: Code,
    reason: String,
}

impl Status {
    pub fn new(code: Code, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    pub fn success() -> Self {
        Self::new(Code::Success, "")
    }

    pub fn unschedulable(reason: impl Into<String>) -> Self {
        Self::new(Code::Unschedulable, reason)
    }

    pub fn error(reason: impl Into<String>) -> Self {
        Self::new(Code::Error, reason)
    }

    pub fn code(&self) -> Code {
        self.code
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn is_success(&self) -> bool {
        self.code == Code::Success
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reason.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{}: {}", self.code, self.reason)
        }
    }
}

// --- Extension point payloads ---

/// Restriction on the nodes a pod may be placed on.
///
/// `node_names == None` means every node is still eligible,
/// `Some(empty)` means none are.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreFilterResult {
    pub node_names: Option<HashSet<String>>,
}

impl PreFilterResult {
    pub fn no_nodes() -> Self {
        Self {
            node_names: Some(HashSet::new()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeScore {
    pub name: String,
    pub score: i64,
}

impl NodeScore {
    pub fn new(name: &str, score: i64) -> Self {
        Self {
            name: name.to_string(),
            score,
        }
    }
}

pub type NodeScoreList = Vec<NodeScore>;

/// Inclusive bounds every normalized score must fall in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreRange {
    pub min: i64,
    pub max: i64,
}

impl Default for ScoreRange {
    fn default() -> Self {
        Self {
            min: MIN_NODE_SCORE,
            max: MAX_NODE_SCORE,
        }
    }
}

/// Memory view of a node as seen by the scheduler cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    pub name: String,
    pub allocatable_memory: i64,
    /// Sum of the memory requests of pods assigned to the node
    pub requested_memory: i64,
}

impl NodeInfo {
    /// May be negative on an over-committed node. Saturates at the `i64` bounds.
    pub fn memory_headroom(&self) -> i64 {
        self.allocatable_memory.saturating_sub(self.requested_memory)
    }
}

/// Per-attempt context handed to every extension point.
/// Plugins accept it but never block on it.
#[derive(Debug, Clone)]
pub struct CycleState {
    pub cycle_id: Uuid,
}

impl CycleState {
    pub fn new() -> Self {
        Self {
            cycle_id: Uuid::new_v4(),
        }
    }
}

impl Default for CycleState {
    fn default() -> Self {
        Self::new()
    }
}

// --- Selectors ---

/// Exact match on every listed label. A pod lacking one of the keys never matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSelector {
    requirements: HashMap<String, String>,
}

impl LabelSelector {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            requirements: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub fn requirements(&self) -> &HashMap<String, String> {
        &self.requirements
    }

    pub fn matches(&self, labels: &HashMap<String, String>) -> bool {
        self.requirements
            .iter()
            .all(|(k, v)| labels.get(k).is_some_and(|have| have == v))
    }
}

// --- Traits ---

/// Read access to cluster state, supplied by the host.
///
/// Reads are point-in-time snapshots of a concurrently updated cache.
pub trait Handle: Send + Sync {
    fn list_pods(&self, selector: &LabelSelector) -> Vec<Pod>;

    fn node_info(&self, node_name: &str) -> Result<NodeInfo, PluginError>;
}

pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;
}

pub trait PreFilterPlugin: Plugin {
    fn pre_filter(&self, state: &CycleState, pod: &Pod) -> (Option<PreFilterResult>, Status);
}

pub trait ScorePlugin: Plugin {
    fn score(&self, state: &CycleState, pod: &Pod, node_name: &str) -> (i64, Status);

    /// Optional normalization step run once the scores of every node are collected.
    fn score_extensions(&self) -> Option<&dyn ScoreExtensions> {
        None
    }
}

pub trait ScoreExtensions: Send + Sync {
    /// Rewrites `scores` in place. The list is only borrowed for the call.
    fn normalize_score(&self, state: &CycleState, pod: &Pod, scores: &mut NodeScoreList) -> Status;
}
