use anyhow::Result;
use structopt::StructOpt;

use paygrid::harness::ModuleRunner;
use paygrid::module::options::SharedOptions;
use paygrid::module::{booking, monitor, payment, validator};

#[derive(Debug, StructOpt)]
#[structopt(about = "Durable multi-party payment saga over AMQP.")]
struct MainOptions {
    #[structopt(flatten)]
    shared_options: SharedOptions,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Reservation API and saga state projection
    Booking(booking::Options),

    /// Quorum validation of payment amounts
    Validator(validator::Options),

    /// Payment execution against the provider
    Payment(payment::Options),

    /// Liveness probing of the deployed services
    Monitor(monitor::Options),
}

#[tokio::main]
async fn main() -> Result<()> {
    let main_options = MainOptions::from_args();
    let shared_options = main_options.shared_options;

    pretty_env_logger::formatted_timed_builder()
        .parse_filters(&shared_options.log)
        .init();

    let runner = ModuleRunner::default();

    match main_options.cmd {
        Command::Booking(options) => runner.run(booking::Booking::new(options)).await,
        Command::Validator(options) => runner.run(validator::Validator::new(options)).await,
        Command::Payment(options) => runner.run(payment::Payment::new(options)).await,
        Command::Monitor(options) => runner.run(monitor::Monitor::new(options)).await,
    }

    Ok(())
}
