use clap::Parser;
use tracing_subscriber::{fmt::format, prelude::__tracing_subscriber_field_MakeExt, EnvFilter};

#[derive(Debug, Parser)]
pub struct Config {
    #[clap(long, env)]
    pub database_url: String,
    /// PureCloud region, e.g. mypurecloud.com or mypurecloud.com.au
    #[clap(long, env)]
    pub purecloud_region: String,
    #[clap(long, env)]
    pub purecloud_client_id: String,
    #[clap(long, env)]
    pub purecloud_client_secret: String,
    /// PT15M, PT30M, PT60M, PT1H or P1D
    #[clap(long, env, default_value = "PT30M")]
    pub granularity: String,
    /// Comma-delimited queue IDs to pull stats for
    #[clap(long, env, value_delimiter = ',')]
    pub queues: Vec<String>,
}

pub fn configure_tracing() {
    let formatter =
        format::debug_fn(|writer, field, value| write!(writer, "{}={:?}", field, value))
            .delimited(" ");

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .fmt_fields(formatter)
        .init();
}
