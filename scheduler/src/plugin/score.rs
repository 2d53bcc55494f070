use shared::models::Pod;

use super::CustomScheduler;
use crate::config::ScoreMode;
use crate::errors::PluginError;
use crate::framework::{
    CycleState, NodeInfo, NodeScoreList, ScoreExtensions, ScorePlugin, ScoreRange, Status,
};

/// Signed memory headroom, negated in `Least` mode.
pub fn raw_score(mode: ScoreMode, info: &NodeInfo) -> i64 {
    let headroom = info.memory_headroom();
    match mode {
        ScoreMode::Least => headroom.saturating_neg(),
        ScoreMode::Most => headroom,
    }
}

/// Min-max rescales `scores` into `range`, in place and in order.
///
/// When every score is equal they all become 0, whatever the range.
/// Division truncates, so close raw scores may land on the same value.
pub fn normalize_scores(scores: &mut NodeScoreList, range: ScoreRange) -> Result<(), PluginError> {
    let Some(first) = scores.first() else {
        return Err(PluginError::EmptyScoreList);
    };
    if range.min > range.max {
        return Err(PluginError::InvalidScoreRange(range.min, range.max));
    }

    let (min, max) = scores
        .iter()
        .fold((first.score, first.score), |(min, max), s| {
            (min.min(s.score), max.max(s.score))
        });

    if min == max {
        scores.iter_mut().for_each(|s| s.score = 0);
        return Ok(());
    }

    // both factors fit in u64, so their product fits in u128
    let spread = u128::from(max.abs_diff(min));
    let width = range.max.abs_diff(range.min);
    for s in scores.iter_mut() {
        let offset = u128::from(s.score.abs_diff(min)) * u128::from(width) / spread;
        // offset <= width, so the sum never leaves the range
        s.score = range
            .min
            .saturating_add_unsigned(u64::try_from(offset).unwrap_or(width));
    }
    Ok(())
}

impl ScorePlugin for CustomScheduler {
    fn score(&self, _state: &CycleState, pod: &Pod, node_name: &str) -> (i64, Status) {
        let info = match self.handle.node_info(node_name) {
            Ok(info) => info,
            Err(err) => {
                tracing::error!(pod=%pod.metadata.name, node=%node_name, error=%err, "Score failed");
                return (0, err.to_status());
            }
        };

        tracing::debug!(
            pod=%pod.metadata.name,
            node=%node_name,
            allocatable=info.allocatable_memory,
            requested=info.requested_memory,
            headroom=info.memory_headroom(),
            "Scoring node memory"
        );
        (raw_score(self.mode, &info), Status::success())
    }

    fn score_extensions(&self) -> Option<&dyn ScoreExtensions> {
        Some(self)
    }
}

impl ScoreExtensions for CustomScheduler {
    fn normalize_score(&self, _state: &CycleState, pod: &Pod, scores: &mut NodeScoreList) -> Status {
        for s in scores.iter() {
            tracing::debug!(pod=%pod.metadata.name, node=%s.name, score=s.score, "Raw score");
        }
        match normalize_scores(scores, self.range) {
            Ok(()) => Status::success(),
            Err(err) => {
                tracing::error!(pod=%pod.metadata.name, error=%err, "NormalizeScore failed");
                err.to_status()
            }
        }
    }
}
