use shared::models::Pod;

use crate::framework::{
    Code, CycleState, NodeScore, NodeScoreList, PreFilterPlugin, PreFilterResult, ScorePlugin,
    Status,
};

/// Where a cycle ended up.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Not run yet
    Pending,
    /// Normalized scores, in candidate order
    Scored(NodeScoreList),
    /// Held back by PreFilter, retry on a later cycle
    Unschedulable(Status),
    Failed(Status),
}

impl CycleOutcome {
    /// Highest normalized score, the first candidate wins ties.
    pub fn best_node(&self) -> Option<&NodeScore> {
        let CycleOutcome::Scored(scores) = self else {
            return None;
        };
        scores
            .iter()
            .reduce(|best, s| if s.score > best.score { s } else { best })
    }
}

/// One placement attempt for a single pod: PreFilter, Score on every
/// candidate, then NormalizeScore. Binding is left to the caller.
pub struct SchedulingCycle<'a, P> {
    plugin: &'a P,
    pod: &'a Pod,
    state: CycleState,
    candidates: Vec<String>,
    scores: NodeScoreList,
    pub outcome: CycleOutcome,
}

impl<'a, P> SchedulingCycle<'a, P>
where
    P: PreFilterPlugin + ScorePlugin,
{
    pub fn new(plugin: &'a P, pod: &'a Pod, candidates: Vec<String>) -> Self {
        Self {
            plugin,
            pod,
            state: CycleState::new(),
            candidates,
            scores: NodeScoreList::new(),
            outcome: CycleOutcome::Pending,
        }
    }

    pub fn execute(self) -> Self {
        self.pre_filter().score().normalize()
    }

    pub fn best_node(&self) -> Option<&NodeScore> {
        self.outcome.best_node()
    }

    /// Run admission and narrow the candidates to what it allows.
    fn pre_filter(mut self) -> Self {
        let (result, status) = self.plugin.pre_filter(&self.state, self.pod);
        if !status.is_success() {
            tracing::info!(
                pod=%self.pod.metadata.name,
                cycle=%self.state.cycle_id,
                %status,
                "Rejected at PreFilter"
            );
            self.outcome = match status.code() {
                Code::Unschedulable => CycleOutcome::Unschedulable(status),
                _ => CycleOutcome::Failed(status),
            };
            return self;
        }

        if let Some(PreFilterResult {
            node_names: Some(allowed),
        }) = result
        {
            self.candidates.retain(|name| allowed.contains(name));
        }
        self
    }

    /// Score every candidate. Nodes that fail are dropped, the rest still count.
    fn score(mut self) -> Self {
        if self.outcome != CycleOutcome::Pending {
            return self;
        }
        for node in &self.candidates {
            let (score, status) = self.plugin.score(&self.state, self.pod, node);
            if status.is_success() {
                self.scores.push(NodeScore::new(node, score));
            } else {
                tracing::warn!(pod=%self.pod.metadata.name, %node, %status, "Dropping node");
            }
        }
        self
    }

    fn normalize(mut self) -> Self {
        if self.outcome != CycleOutcome::Pending {
            return self;
        }
        if self.scores.is_empty() {
            self.outcome =
                CycleOutcome::Unschedulable(Status::unschedulable("no node could be scored"));
            return self;
        }

        let mut scores = std::mem::take(&mut self.scores);
        if let Some(ext) = self.plugin.score_extensions() {
            let status = ext.normalize_score(&self.state, self.pod, &mut scores);
            if !status.is_success() {
                self.outcome = CycleOutcome::Failed(status);
                return self;
            }
        }
        self.outcome = CycleOutcome::Scored(scores);
        self
    }
}

#[cfg(test)]
mod tests {

    //! - test_cycle_picks_most_headroom
    //!     `Most` mode prefers the emptier node, `Least` the fuller one.
    //! - test_cycle_stops_at_prefilter
    //!     an incomplete gang is never scored.
    //! - test_cycle_drops_vanished_node
    //!     a candidate missing from the cache is skipped, the others still rank.

    use std::sync::Arc;

    use shared::models::{Metadata, Node, Resources};

    use super::*;
    use crate::cache::ClusterCache;
    use crate::plugin::{CustomScheduler, GROUP_NAME_LABEL, MIN_AVAILABLE_LABEL};

    fn setup(mode: &str) -> (Arc<ClusterCache>, CustomScheduler, Pod) {
        let cache = Arc::new(ClusterCache::new());
        cache.add_node(&Node::new("small", Resources::new(1000, 1000)));
        cache.add_node(&Node::new("large", Resources::new(1000, 4000)));

        let pod = Pod::new(
            Metadata::named("solo")
                .with_label(GROUP_NAME_LABEL, "solo")
                .with_label(MIN_AVAILABLE_LABEL, "1"),
            Resources::new(100, 100),
        );
        cache.add_pod(&pod);

        let args = format!(r#"{{"mode": "{}"}}"#, mode);
        let plugin = CustomScheduler::new(Some(args.as_bytes()), cache.clone()).unwrap();
        (cache, plugin, pod)
    }

    fn candidates() -> Vec<String> {
        vec!["small".to_string(), "large".to_string()]
    }

    #[test]
    fn test_cycle_picks_most_headroom() {
        let (_cache, plugin, pod) = setup("Most");
        let cycle = SchedulingCycle::new(&plugin, &pod, candidates()).execute();
        assert_eq!(
            cycle.outcome,
            CycleOutcome::Scored(vec![NodeScore::new("small", 0), NodeScore::new("large", 100)])
        );
        assert_eq!(cycle.best_node().unwrap().name, "large");

        let (_cache, plugin, pod) = setup("Least");
        let cycle = SchedulingCycle::new(&plugin, &pod, candidates()).execute();
        assert_eq!(cycle.best_node().unwrap().name, "small");
    }

    #[test]
    fn test_cycle_stops_at_prefilter() {
        let (_cache, plugin, _) = setup("Most");
        let pod = Pod::new(
            Metadata::named("lonely")
                .with_label(GROUP_NAME_LABEL, "pair")
                .with_label(MIN_AVAILABLE_LABEL, "2"),
            Resources::default(),
        );
        let cycle = SchedulingCycle::new(&plugin, &pod, candidates()).execute();
        assert!(matches!(cycle.outcome, CycleOutcome::Unschedulable(_)));
        assert!(cycle.best_node().is_none());
    }

    #[test]
    fn test_cycle_drops_vanished_node() {
        let (cache, plugin, pod) = setup("Most");
        cache.remove_node("small");
        let cycle = SchedulingCycle::new(&plugin, &pod, candidates()).execute();
        // a lone score is a degenerate range
        assert_eq!(
            cycle.outcome,
            CycleOutcome::Scored(vec![NodeScore::new("large", 0)])
        );
    }
}
