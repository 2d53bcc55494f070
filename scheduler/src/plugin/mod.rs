//! Gang admission and memory headroom scoring plugin
//!
//! - PreFilter: hold a pod back until `minAvailable` members of its `podGroup` are visible
//! - Score: rank nodes by free memory, `Least` or `Most` first
//! - NormalizeScore: min-max rescale into the canonical range
//!
//! The plugin keeps no mutable state. Mode and score range are fixed at
//! construction, so one instance can serve concurrent cycles behind an `Arc`.

mod prefilter;
mod score;

use std::sync::Arc;

use crate::config::ScoreMode;
use crate::errors::PluginError;
use crate::framework::{Handle, Plugin, ScoreRange};

pub use score::{normalize_scores, raw_score};

/// Name the plugin is registered under.
pub const NAME: &str = "CustomScheduler";
/// Label carrying the gang a pod belongs to.
pub const GROUP_NAME_LABEL: &str = "podGroup";
/// Label carrying the gang size required before admission.
pub const MIN_AVAILABLE_LABEL: &str = "minAvailable";

pub struct CustomScheduler {
    handle: Arc<dyn Handle>,
    mode: ScoreMode,
    range: ScoreRange,
}

impl CustomScheduler {
    /// Builds the plugin from the host's optional args blob.
    ///
    /// Fails when the blob cannot be decoded or names an unknown mode,
    /// the host must not start the plugin in that case.
    pub fn new(args: Option<&[u8]>, handle: Arc<dyn Handle>) -> Result<Self, PluginError> {
        let mode = ScoreMode::from_args(args)?;
        tracing::info!(%mode, "Custom scheduler initialized");
        Ok(Self {
            handle,
            mode,
            range: ScoreRange::default(),
        })
    }

    /// Overrides the canonical range used by normalization.
    pub fn with_score_range(mut self, range: ScoreRange) -> Self {
        self.range = range;
        self
    }

    pub fn mode(&self) -> ScoreMode {
        self.mode
    }
}

impl Plugin for CustomScheduler {
    fn name(&self) -> &str {
        NAME
    }
}
