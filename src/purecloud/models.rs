use serde::{Deserialize, Serialize};

use crate::domain::entity::{Granularity, MEDIA_TYPES};

/// Body for POST /api/v2/analytics/conversations/aggregates/query.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationQuery {
    pub interval: String,
    pub granularity: String,
    pub group_by: Vec<String>,
    pub filter: AnalyticsQueryFilter,
    pub flatten_multivalued_dimensions: bool,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsQueryFilter {
    #[serde(rename = "type")]
    pub kind: String,
    pub clauses: Vec<AnalyticsQueryClause>,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsQueryClause {
    #[serde(rename = "type")]
    pub kind: String,
    pub predicates: Vec<AnalyticsQueryPredicate>,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsQueryPredicate {
    pub dimension: String,
    pub value: String,
}

impl AggregationQuery {
    /// Per-queue, per-media-type interval query over `interval`. The queue
    /// clause is left out when no queue IDs are configured, which pulls
    /// every queue the credentials can see. Blank IDs (an empty QUEUES env
    /// var parses to one empty entry) are ignored.
    pub fn queue_intervals(interval: String, granularity: Granularity, queue_ids: &[String]) -> Self {
        let media_clause = AnalyticsQueryClause {
            kind: "or".to_string(),
            predicates: MEDIA_TYPES
                .iter()
                .map(|media_type| AnalyticsQueryPredicate {
                    dimension: "mediaType".to_string(),
                    value: media_type.to_string(),
                })
                .collect(),
        };

        let mut clauses = vec![media_clause];

        let queue_predicates: Vec<AnalyticsQueryPredicate> = queue_ids
            .iter()
            .filter(|queue_id| !queue_id.is_empty())
            .map(|queue_id| AnalyticsQueryPredicate {
                dimension: "queueId".to_string(),
                value: queue_id.clone(),
            })
            .collect();

        if !queue_predicates.is_empty() {
            clauses.push(AnalyticsQueryClause {
                kind: "or".to_string(),
                predicates: queue_predicates,
            });
        }

        Self {
            interval,
            granularity: granularity.to_string(),
            group_by: vec!["mediaType".to_string(), "queueId".to_string()],
            filter: AnalyticsQueryFilter {
                kind: "and".to_string(),
                clauses,
            },
            flatten_multivalued_dimensions: true,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AggregateQueryResponse {
    #[serde(default)]
    pub results: Vec<AggregateResult>,
}

#[derive(Debug, Deserialize)]
pub struct AggregateResult {
    #[serde(default)]
    pub group: AggregateGroup,
    #[serde(default)]
    pub data: Vec<IntervalData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateGroup {
    #[serde(default)]
    pub queue_id: String,
    #[serde(default)]
    pub media_type: String,
}

#[derive(Debug, Deserialize)]
pub struct IntervalData {
    /// `start/end` pair of RFC 3339 timestamps.
    pub interval: String,
    #[serde(default)]
    pub metrics: Vec<MetricData>,
}

#[derive(Debug, Deserialize)]
pub struct MetricData {
    pub metric: String,
    #[serde(default)]
    pub stats: MetricStats,
}

#[derive(Debug, Default, Deserialize)]
pub struct MetricStats {
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub sum: f64,
    #[serde(default)]
    pub max: f64,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntityListing {
    #[serde(default)]
    pub entities: Vec<QueueEntity>,
    #[serde(default = "default_page_count")]
    pub page_count: u32,
}

fn default_page_count() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct QueueEntity {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_serializes_to_api_shape() {
        let query = AggregationQuery::queue_intervals(
            "2016-06-08T00:00:00+0800/2016-06-09T00:00:00+0800".to_string(),
            Granularity::P1d,
            &["q-1".to_string(), "q-2".to_string()],
        );

        let body = serde_json::to_value(&query).unwrap();
        assert_eq!(
            body,
            json!({
                "interval": "2016-06-08T00:00:00+0800/2016-06-09T00:00:00+0800",
                "granularity": "P1D",
                "groupBy": ["mediaType", "queueId"],
                "filter": {
                    "type": "and",
                    "clauses": [
                        {
                            "type": "or",
                            "predicates": [
                                { "dimension": "mediaType", "value": "voice" },
                                { "dimension": "mediaType", "value": "chat" },
                                { "dimension": "mediaType", "value": "email" }
                            ]
                        },
                        {
                            "type": "or",
                            "predicates": [
                                { "dimension": "queueId", "value": "q-1" },
                                { "dimension": "queueId", "value": "q-2" }
                            ]
                        }
                    ]
                },
                "flattenMultivaluedDimensions": true
            })
        );
    }

    #[test]
    fn empty_queue_list_drops_the_queue_clause() {
        let query = AggregationQuery::queue_intervals(
            "a/b".to_string(),
            Granularity::Pt30m,
            &[],
        );

        assert_eq!(query.filter.clauses.len(), 1);
        assert_eq!(query.filter.clauses[0].predicates.len(), 3);
    }

    #[test]
    fn blank_queue_ids_are_ignored() {
        let query = AggregationQuery::queue_intervals(
            "a/b".to_string(),
            Granularity::Pt30m,
            &["".to_string()],
        );
        assert_eq!(query.filter.clauses.len(), 1);

        let query = AggregationQuery::queue_intervals(
            "a/b".to_string(),
            Granularity::Pt30m,
            &["".to_string(), "q-1".to_string()],
        );
        assert_eq!(query.filter.clauses.len(), 2);
        assert_eq!(query.filter.clauses[1].predicates.len(), 1);
        assert_eq!(query.filter.clauses[1].predicates[0].value, "q-1");
    }

    #[test]
    fn response_deserializes_with_missing_optionals() {
        let resp: AggregateQueryResponse = serde_json::from_value(json!({
            "results": [
                {
                    "group": { "queueId": "q-1" },
                    "data": [
                        {
                            "interval": "2024-03-05T13:30:00.000Z/2024-03-05T14:00:00.000Z",
                            "metrics": [
                                { "metric": "nOffered", "stats": { "count": 4 } }
                            ]
                        }
                    ]
                }
            ]
        }))
        .unwrap();

        assert_eq!(resp.results.len(), 1);
        assert_eq!(resp.results[0].group.queue_id, "q-1");
        assert_eq!(resp.results[0].group.media_type, "");
        assert_eq!(resp.results[0].data[0].metrics[0].stats.count, 4);
        assert_eq!(resp.results[0].data[0].metrics[0].stats.sum, 0.0);
    }
}
