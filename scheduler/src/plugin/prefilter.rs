use shared::models::Pod;

use super::{CustomScheduler, GROUP_NAME_LABEL, MIN_AVAILABLE_LABEL};
use crate::errors::PluginError;
use crate::framework::{CycleState, LabelSelector, PreFilterPlugin, PreFilterResult, Status};

impl PreFilterPlugin for CustomScheduler {
    /// Admits the pod once its group has at least `minAvailable` visible members.
    ///
    /// The count is whatever the cache lists for the group, the pod itself
    /// included only if it was indexed before this call. Concurrent attempts
    /// for pods of the same group are not coordinated and may each see a
    /// count that misses the other.
    fn pre_filter(&self, _state: &CycleState, pod: &Pod) -> (Option<PreFilterResult>, Status) {
        let pod_name = &pod.metadata.name;
        tracing::debug!(pod=%pod_name, "PreFilter");

        // absent label selects the empty-valued group
        let group = pod.metadata.label(GROUP_NAME_LABEL).unwrap_or_default();
        let selector = LabelSelector::from_pairs([(GROUP_NAME_LABEL, group)]);
        let members = self.handle.list_pods(&selector).len();
        tracing::debug!(pod=%pod_name, %group, members, "Listed pod group");

        let min_available = match min_available(pod) {
            Ok(n) => n,
            Err(err) => {
                tracing::error!(pod=%pod_name, error=%err, "Cannot read gang threshold");
                return (None, err.to_status());
            }
        };

        if members >= min_available {
            (None, Status::success())
        } else {
            tracing::info!(
                pod=%pod_name,
                %group,
                members,
                min_available,
                "Pod group below minAvailable"
            );
            (
                Some(PreFilterResult::no_nodes()),
                Status::unschedulable(format!(
                    "pod group '{}' has {} of {} required members",
                    group, members, min_available
                )),
            )
        }
    }
}

/// Gang threshold from the `minAvailable` label.
fn min_available(pod: &Pod) -> Result<usize, PluginError> {
    let raw = pod
        .metadata
        .label(MIN_AVAILABLE_LABEL)
        .ok_or_else(|| PluginError::MissingLabel(MIN_AVAILABLE_LABEL.to_string()))?;
    raw.parse::<usize>()
        .map_err(|_| PluginError::InvalidMinAvailable(raw.to_string()))
}
