use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use domain::entity::{interval_param, Granularity};
use infrastructure::postgres::PgQueueStatsRepository;
use purecloud::{client::PureCloudClient, models::AggregationQuery};
use sync::StatsWriter;

mod config;
mod domain;
mod infrastructure;
mod purecloud;
mod sync;

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::Config::parse();

    config::configure_tracing();

    let granularity: Granularity = config.granularity.parse()?;

    let pool = PgPoolOptions::new()
        .connect(&config.database_url)
        .await
        .context("connect to database")?;

    let repo = PgQueueStatsRepository::new(pool);
    repo.ensure_schema().await?;

    let client = PureCloudClient::login(
        &format!("https://login.{}", config.purecloud_region),
        &format!("https://api.{}", config.purecloud_region),
        &config.purecloud_client_id,
        &config.purecloud_client_secret,
    )
    .await?;

    let queues = client.queue_names().await?;
    info!(queues = queues.len(), "mapped queues");

    let (start, end) = granularity.window(Local::now())?;
    let query =
        AggregationQuery::queue_intervals(interval_param(&start, &end), granularity, &config.queues);
    info!(interval = query.interval.as_str(), granularity = %granularity, "querying aggregates");

    let response = client.query_conversation_aggregates(&query).await?;

    let rows = domain::flatten::flatten(&response, &queues)?;
    info!(rows = rows.len(), "flattened response");

    let summary = StatsWriter::new(repo).write_all(&rows).await?;
    info!(
        inserted = summary.inserted,
        updated = summary.updated,
        "sync complete"
    );

    Ok(())
}
