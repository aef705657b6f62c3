use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, DurationRound, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Media types the aggregation query filters on.
pub const MEDIA_TYPES: [&str; 3] = ["voice", "chat", "email"];

/// Aggregation bucket size accepted by the analytics API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Pt15m,
    Pt30m,
    Pt60m,
    Pt1h,
    P1d,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Pt15m => "PT15M",
            Granularity::Pt30m => "PT30M",
            Granularity::Pt60m => "PT60M",
            Granularity::Pt1h => "PT1H",
            Granularity::P1d => "P1D",
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            Granularity::Pt15m => Duration::minutes(15),
            Granularity::Pt30m => Duration::minutes(30),
            Granularity::Pt60m | Granularity::Pt1h => Duration::hours(1),
            Granularity::P1d => Duration::hours(24),
        }
    }

    /// Query window containing `now`. P1D runs from local midnight for 24
    /// hours; everything else truncates `now` to the bucket boundary.
    pub fn window<Tz: TimeZone>(&self, now: DateTime<Tz>) -> Result<(DateTime<Tz>, DateTime<Tz>)> {
        let start = match self {
            Granularity::P1d => now
                .timezone()
                .from_local_datetime(&now.date_naive().and_time(NaiveTime::MIN))
                .earliest()
                .ok_or_else(|| anyhow!("no local midnight on {}", now.date_naive()))?,
            _ => now.duration_trunc(self.duration())?,
        };
        let end = start.clone() + self.duration();

        Ok((start, end))
    }
}

impl FromStr for Granularity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "PT15M" => Ok(Granularity::Pt15m),
            "PT30M" => Ok(Granularity::Pt30m),
            "PT60M" => Ok(Granularity::Pt60m),
            "PT1H" => Ok(Granularity::Pt1h),
            "P1D" => Ok(Granularity::P1d),
            other => Err(anyhow!(
                "invalid granularity {other:?}, use PT15M, PT30M, PT60M, PT1H or P1D"
            )),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interval parameter for the aggregation query, e.g.
/// `2016-06-08T00:00:00+0800/2016-06-09T00:00:00+0800`.
pub fn interval_param<Tz: TimeZone>(start: &DateTime<Tz>, end: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

    format!("{}/{}", start.format(FORMAT), end.format(FORMAT))
}

/// One row of the stats table: one queue, one media type, one interval.
///
/// Counts are plain totals; the t/mt/n triples are the sum, max and count
/// statistics of a timed metric, in milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueueIntervalStats {
    // Composite key
    pub queue_id: String,
    pub media_type: String,
    pub interval_start: DateTime<Utc>,

    pub queue_name: String,

    // Counts
    pub n_error: i64,
    pub n_offered: i64,
    pub n_outbound_abandoned: i64,
    pub n_outbound_attempted: i64,
    pub n_outbound_connected: i64,
    pub n_transferred: i64,
    pub n_over_sla: i64,

    // Timed metrics
    pub t_abandon: f64,
    pub mt_abandon: f64,
    pub n_abandon: i64,
    pub t_acd: f64,
    pub mt_acd: f64,
    pub n_acd: i64,
    pub t_acw: f64,
    pub mt_acw: f64,
    pub n_acw: i64,
    pub t_agent_response_time: f64,
    pub mt_agent_response_time: f64,
    pub n_agent_response_time: i64,
    pub t_answered: f64,
    pub mt_answered: f64,
    pub n_answered: i64,
    pub t_handle: f64,
    pub mt_handle: f64,
    pub n_handle: i64,
    pub t_held: f64,
    pub mt_held: f64,
    pub n_held: i64,
    pub t_held_complete: f64,
    pub mt_held_complete: f64,
    pub n_held_complete: i64,
    pub t_ivr: f64,
    pub mt_ivr: f64,
    pub n_ivr: i64,
    pub t_talk: f64,
    pub mt_talk: f64,
    pub n_talk: i64,
    pub t_talk_complete: f64,
    pub mt_talk_complete: f64,
    pub n_talk_complete: i64,
    pub t_user_response_time: f64,
    pub mt_user_response_time: f64,
    pub n_user_response_time: i64,
}
