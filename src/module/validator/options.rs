use crate::domain::voting::VotingEngine;
use crate::domain::Amount;
use crate::module::options::AmqpOptions;
use structopt::StructOpt;

/// Options for the validator module
#[derive(Debug, StructOpt)]
pub struct Options {
    #[structopt(flatten)]
    pub(super) amqp: AmqpOptions,

    /// Roster member replaced by a deliberately skewed calculator, "none" for an honest roster
    #[structopt(long, env = "SKEWED_CALCULATOR", default_value = "calc_c")]
    pub(super) skewed_calculator: String,

    /// Offset the skewed calculator adds to every amount
    #[structopt(long, env = "SKEW_OFFSET", default_value = "5.00")]
    pub(super) skew_offset: Amount,

    /// Port on which the status API is served
    #[structopt(short, long, env = "PORT", default_value = "8081")]
    pub(super) port: u16,
}

impl Options {
    /// Builds the voting engine described by these options
    pub(super) fn engine(&self) -> VotingEngine {
        let skew = match self.skewed_calculator.as_str() {
            "none" => None,
            name => Some((name, self.skew_offset)),
        };

        VotingEngine::with_roster(skew)
    }
}
