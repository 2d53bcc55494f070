//! Dry run of the gang scheduling plugin against a cluster snapshot.
//!
//! Loads the snapshot into the in-memory cache, builds the plugin from its
//! args and runs one cycle per unassigned pod, each on its own task.
//! Nothing is bound, the outcome of every cycle is printed as a table.

use std::sync::Arc;

use futures::future::join_all;
use scheduler::{
    cache::ClusterCache,
    config::Config,
    errors::ConfigError,
    flow::SchedulingCycle,
    plugin::CustomScheduler,
    view::CycleReport,
};
use shared::api::ClusterSnapshot;
use tabled::{Table, settings::Style};
use tracing_subscriber::{self, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), ConfigError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = Config::from_env()?;
    tracing::debug!(?config, "Loaded config");

    let content = tokio::fs::read_to_string(&config.snapshot_path)
        .await
        .map_err(|e| ConfigError::Io(config.snapshot_path.clone(), e))?;
    let snapshot: ClusterSnapshot = serde_json::from_str(&content)?;
    let cache = Arc::new(ClusterCache::from_snapshot(snapshot));

    // invalid args abort here, before any cycle runs
    let args = config.load_args()?;
    let plugin = Arc::new(
        CustomScheduler::new(args.as_deref(), cache.clone())?
            .with_score_range(config.score_range),
    );

    let mut nodes = cache.nodes();
    nodes.sort_by(|a, b| a.name.cmp(&b.name));
    let mut table = Table::new(nodes);
    table.with(Style::blank());
    println!("{}", table);

    let mut candidates = cache.node_names();
    candidates.sort();

    let mut pending = cache.unassigned_pods();
    pending.sort_by(|a, b| a.metadata.name.cmp(&b.metadata.name));
    let mut table = Table::new(&pending);
    table.with(Style::blank());
    println!("{}", table);
    tracing::info!(pods = pending.len(), nodes = candidates.len(), "Running cycles");

    let handles = pending.into_iter().map(|pod| {
        let plugin = plugin.clone();
        let candidates = candidates.clone();
        tokio::spawn(async move {
            let cycle = SchedulingCycle::new(plugin.as_ref(), &pod, candidates).execute();
            CycleReport {
                pod: pod.metadata.name.clone(),
                outcome: cycle.outcome,
            }
        })
    });

    let mut reports = Vec::new();
    for res in join_all(handles).await {
        match res {
            Ok(report) => reports.push(report),
            Err(err) => tracing::error!(error=%err, "Cycle task failed"),
        }
    }

    let mut table = Table::new(reports);
    table.with(Style::blank());
    println!("{}", table);

    Ok(())
}
