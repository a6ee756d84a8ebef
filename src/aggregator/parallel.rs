//! Parallel aggregation
//!
//! Entity groups are independent, so large batches are sharded across
//! blocking worker tasks. Each worker returns its own list of per-entity
//! outcomes; lists are concatenated after join and sorted by entity id, so
//! the result matches the sequential [`Aggregator::aggregate`] output.
//!
//! [`Aggregator::aggregate`]: super::Aggregator::aggregate

use std::sync::Arc;

use futures::future::join_all;

use super::{
    aggregate_entity, collect_outcomes, group_rows, AggregateOptions, AggregationError,
    AggregationMetadata, AggregationResult, Aggregator,
};
use crate::ingest::dedupe_rows;
use crate::models::insight::{GroupBy, InsightRow};
use crate::models::performance::{AdPerformanceRecord, DataQuality};

type EntityOutcome = Result<AdPerformanceRecord, AggregationError>;

/// Aggregate on up to `max_workers` blocking tasks, using the validated
/// configuration of `aggregator`.
///
/// Must be called from within a Tokio runtime.
pub async fn aggregate_parallel(
    aggregator: &Aggregator,
    rows: Vec<InsightRow>,
    group_by: GroupBy,
    opts: AggregateOptions,
    max_workers: usize,
) -> AggregationResult {
    let total_rows = rows.len();
    let (rows, duplicates_removed) = if opts.dedupe {
        let outcome = dedupe_rows(rows, group_by);
        (outcome.rows, outcome.removed)
    } else {
        (rows, 0)
    };

    // Own each group so it can move into a worker
    let grouped = group_rows(&rows, group_by);
    let rows_missing_id = grouped.rows_missing_id;
    let groups: Vec<(String, Vec<InsightRow>)> = grouped
        .groups
        .into_iter()
        .map(|(id, rows)| (id, rows.into_iter().cloned().collect()))
        .collect();
    let entity_count = groups.len();

    let workers = max_workers.max(1);
    let shard_size = entity_count.div_ceil(workers).max(1);
    let semaphore = Arc::new(tokio::sync::Semaphore::new(workers));
    let opts = Arc::new(opts);
    let config = Arc::new(aggregator.config().clone());

    let mut shards: Vec<Vec<(String, Vec<InsightRow>)>> = Vec::new();
    let mut iter = groups.into_iter().peekable();
    while iter.peek().is_some() {
        shards.push(iter.by_ref().take(shard_size).collect());
    }

    let handles = shards.into_iter().map(|shard| {
        let sem = semaphore.clone();
        let opts = opts.clone();
        let config = config.clone();
        let entity_ids: Vec<String> = shard.iter().map(|(id, _)| id.clone()).collect();

        async move {
            let _permit = sem.acquire_owned().await.ok();
            let joined = tokio::task::spawn_blocking(move || {
                shard
                    .iter()
                    .map(|(entity_id, entity_rows)| {
                        let refs: Vec<&InsightRow> = entity_rows.iter().collect();
                        aggregate_entity(entity_id, &refs, group_by, &opts, &config)
                    })
                    .collect::<Vec<EntityOutcome>>()
            })
            .await;

            match joined {
                Ok(outcomes) => outcomes,
                Err(e) => {
                    tracing::error!("Aggregation worker failed for {} entities: {}", entity_ids.len(), e);
                    entity_ids
                        .into_iter()
                        .map(|entity_id| {
                            Err(AggregationError::WorkerFailed {
                                entity_id,
                                reason: e.to_string(),
                            })
                        })
                        .collect()
                }
            }
        }
    });

    let outcomes: Vec<EntityOutcome> = join_all(handles).await.into_iter().flatten().collect();

    collect_outcomes(
        outcomes,
        AggregationMetadata {
            group_by,
            total_rows,
            rows_missing_id,
            duplicates_removed,
            entity_count,
            record_count: 0,
            error_count: 0,
            data_quality: DataQuality::Complete,
        },
    )
}
