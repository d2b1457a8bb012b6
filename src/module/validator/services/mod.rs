//! Services hosted by the validator module

mod voting;

pub use voting::VotingService;
