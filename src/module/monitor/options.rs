use crate::module::options::AmqpOptions;
use structopt::StructOpt;

/// Options for the monitor module
#[derive(Debug, StructOpt)]
pub struct Options {
    #[structopt(flatten)]
    pub(super) amqp: AmqpOptions,

    /// Services whose liveness is tracked
    #[structopt(
        long,
        env = "TRACKED_SERVICES",
        default_value = "booking,validator,payment",
        use_delimiter = true
    )]
    pub(super) tracked: Vec<String>,

    /// Port on which the status API is served
    #[structopt(short, long, env = "PORT", default_value = "8083")]
    pub(super) port: u16,
}
