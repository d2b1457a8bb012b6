use crate::library::helpers::parse_seconds;
use crate::module::options::AmqpOptions;
use crate::module::payment::services::ExecutionSettings;
use std::time::Duration;
use structopt::StructOpt;

/// Options for the payment module
#[derive(Debug, StructOpt)]
pub struct Options {
    #[structopt(flatten)]
    pub(super) amqp: AmqpOptions,

    /// Connection URL of the claim store
    #[structopt(long, env = "REDIS_URL", default_value = "redis://paygrid-redis/")]
    pub(super) redis: String,

    /// Charge endpoint of the payment provider
    #[structopt(
        long,
        env = "PROVIDER_URL",
        default_value = "http://paygrid-provider:8090/charge"
    )]
    pub(super) provider: String,

    /// Seconds the provider may take to answer a charge request
    #[structopt(
        long,
        env = "PROVIDER_TIMEOUT",
        default_value = "2",
        parse(try_from_str = parse_seconds)
    )]
    pub(super) provider_timeout: Duration,

    /// Seconds a processed payment stays claimed
    #[structopt(
        long,
        env = "CLAIM_TTL",
        default_value = "3600",
        parse(try_from_str = parse_seconds)
    )]
    pub(super) claim_ttl: Duration,

    /// Consecutive provider failures after which the breaker opens
    #[structopt(long, env = "BREAKER_THRESHOLD", default_value = "3")]
    pub(super) breaker_threshold: u32,

    /// Seconds the breaker stays open before probing the provider again
    #[structopt(
        long,
        env = "BREAKER_RESET",
        default_value = "20",
        parse(try_from_str = parse_seconds)
    )]
    pub(super) breaker_reset: Duration,

    /// Port on which the status API is served
    #[structopt(short, long, env = "PORT", default_value = "8082")]
    pub(super) port: u16,
}

impl Options {
    /// Builds the executor tunables described by these options
    pub(super) fn settings(&self) -> ExecutionSettings {
        ExecutionSettings {
            claim_ttl: self.claim_ttl,
            ..Default::default()
        }
    }
}
