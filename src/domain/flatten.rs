use std::collections::HashMap;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use crate::domain::entity::QueueIntervalStats;
use crate::purecloud::models::{AggregateQueryResponse, MetricData};

/// Data-shape drift in the aggregates response. Both variants abort the run;
/// silently dropping metrics would corrupt the table.
#[derive(Debug, Error)]
pub enum FlattenError {
    #[error("unrecognized metric {0:?} in aggregates response")]
    UnknownMetric(String),
    #[error("malformed interval timestamp {0:?}")]
    BadInterval(String),
}

/// Flattens the grouped aggregates response into one row per
/// (queue, media type, interval). Queue names come from `queue_names`,
/// falling back to the queue ID when unmapped.
///
/// Results whose group is missing the queue ID or media type are
/// conversations that never entered a queue; they are skipped.
pub fn flatten(
    response: &AggregateQueryResponse,
    queue_names: &HashMap<String, String>,
) -> Result<Vec<QueueIntervalStats>, FlattenError> {
    let mut rows = Vec::new();

    for result in &response.results {
        let queue_id = result.group.queue_id.as_str();
        let media_type = result.group.media_type.as_str();

        if queue_id.is_empty() || media_type.is_empty() {
            debug!(queue_id, media_type, "skipping ungrouped result");
            continue;
        }

        let queue_name = match queue_names.get(queue_id) {
            Some(name) if !name.is_empty() => name.as_str(),
            _ => queue_id,
        };

        for data in &result.data {
            let mut row = QueueIntervalStats {
                queue_id: queue_id.to_string(),
                queue_name: queue_name.to_string(),
                media_type: media_type.to_string(),
                interval_start: parse_interval_start(&data.interval)?,
                ..Default::default()
            };

            for metric in &data.metrics {
                apply_metric(&mut row, metric)?;
            }

            rows.push(row);
        }
    }

    Ok(rows)
}

// The interval field is a start/end pair; only the start keys the row.
fn parse_interval_start(interval: &str) -> Result<DateTime<Utc>, FlattenError> {
    let start = interval.split('/').next().unwrap_or(interval);

    DateTime::parse_from_rfc3339(start)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| FlattenError::BadInterval(start.to_string()))
}

fn apply_metric(row: &mut QueueIntervalStats, metric: &MetricData) -> Result<(), FlattenError> {
    let stats = &metric.stats;

    match metric.metric.as_str() {
        "nError" => row.n_error = stats.count,
        "nOffered" => row.n_offered = stats.count,
        "nOutboundAbandoned" => row.n_outbound_abandoned = stats.count,
        "nOutboundAttempted" => row.n_outbound_attempted = stats.count,
        "nOutboundConnected" => row.n_outbound_connected = stats.count,
        "nTransferred" => row.n_transferred = stats.count,
        "nOverSla" => row.n_over_sla = stats.count,
        "tAbandon" => {
            row.t_abandon = stats.sum;
            row.mt_abandon = stats.max;
            row.n_abandon = stats.count;
        }
        "tAcd" => {
            row.t_acd = stats.sum;
            row.mt_acd = stats.max;
            row.n_acd = stats.count;
        }
        "tAcw" => {
            row.t_acw = stats.sum;
            row.mt_acw = stats.max;
            row.n_acw = stats.count;
        }
        "tAgentResponseTime" => {
            row.t_agent_response_time = stats.sum;
            row.mt_agent_response_time = stats.max;
            row.n_agent_response_time = stats.count;
        }
        "tAnswered" => {
            row.t_answered = stats.sum;
            row.mt_answered = stats.max;
            row.n_answered = stats.count;
        }
        "tHandle" => {
            row.t_handle = stats.sum;
            row.mt_handle = stats.max;
            row.n_handle = stats.count;
        }
        "tHeld" => {
            row.t_held = stats.sum;
            row.mt_held = stats.max;
            row.n_held = stats.count;
        }
        "tHeldComplete" => {
            row.t_held_complete = stats.sum;
            row.mt_held_complete = stats.max;
            row.n_held_complete = stats.count;
        }
        "tIvr" => {
            row.t_ivr = stats.sum;
            row.mt_ivr = stats.max;
            row.n_ivr = stats.count;
        }
        "tTalk" => {
            row.t_talk = stats.sum;
            row.mt_talk = stats.max;
            row.n_talk = stats.count;
        }
        "tTalkComplete" => {
            row.t_talk_complete = stats.sum;
            row.mt_talk_complete = stats.max;
            row.n_talk_complete = stats.count;
        }
        "tUserResponseTime" => {
            row.t_user_response_time = stats.sum;
            row.mt_user_response_time = stats.max;
            row.n_user_response_time = stats.count;
        }
        other => return Err(FlattenError::UnknownMetric(other.to_string())),
    }

    Ok(())
}
