use std::collections::HashMap;

use anyhow::{bail, Context, Result};
use reqwest::{Client, Response};
use tracing::{debug, info};

use super::models::{AggregateQueryResponse, AggregationQuery, QueueEntityListing, TokenResponse};

const QUEUE_PAGE_SIZE: u32 = 500;

/// Authenticated PureCloud API client. `login` performs the
/// client-credentials handshake; every other call reuses the bearer token.
#[derive(Debug, Clone)]
pub struct PureCloudClient {
    http: Client,
    api_base: String,
    access_token: String,
}

impl PureCloudClient {
    pub async fn login(
        login_base: &str,
        api_base: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<Self> {
        let http = Client::builder().build().context("build http client")?;

        info!("logging into PureCloud");
        let resp = http
            .post(format!("{}/oauth/token", login_base.trim_end_matches('/')))
            .basic_auth(client_id, Some(client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .context("client credentials login")?;
        let resp = error_for_status(resp, "login").await?;

        let token: TokenResponse = resp.json().await.context("decode token response")?;
        info!("logged in");

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            access_token: token.access_token,
        })
    }

    /// Queue ID to name map over every page of the queue listing. Both
    /// active and inactive queues are included.
    pub async fn queue_names(&self) -> Result<HashMap<String, String>> {
        let mut queues = HashMap::new();
        let mut page_number: u32 = 1;

        loop {
            let resp = self
                .http
                .get(format!("{}/api/v2/routing/queues", self.api_base))
                .query(&[("pageSize", QUEUE_PAGE_SIZE), ("pageNumber", page_number)])
                .bearer_auth(&self.access_token)
                .send()
                .await
                .with_context(|| format!("list queues page {page_number}"))?;
            let resp = error_for_status(resp, "queue listing").await?;

            let listing: QueueEntityListing =
                resp.json().await.context("decode queue listing")?;
            let page_count = listing.page_count.max(1);

            for queue in listing.entities {
                queues.insert(queue.id, queue.name);
            }

            if page_number >= page_count {
                break;
            }
            page_number += 1;
        }

        debug!(pages = page_number, "queue listing complete");
        Ok(queues)
    }

    pub async fn query_conversation_aggregates(
        &self,
        query: &AggregationQuery,
    ) -> Result<AggregateQueryResponse> {
        let resp = self
            .http
            .post(format!(
                "{}/api/v2/analytics/conversations/aggregates/query",
                self.api_base
            ))
            .bearer_auth(&self.access_token)
            .json(query)
            .send()
            .await
            .context("query conversation aggregates")?;
        let resp = error_for_status(resp, "aggregates query").await?;

        resp.json().await.context("decode aggregates response")
    }
}

async fn error_for_status(resp: Response, what: &str) -> Result<Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }

    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    bail!("{what} failed: {status} {body}");
}
