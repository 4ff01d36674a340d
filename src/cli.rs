use clap::Parser;

/// Retire submissions that have reached MAX_NUMBER_OF_FAILURES failures and
/// notify the LMS that the queue will no longer attempt to grade them.
#[derive(Parser, Debug)]
#[command(name = "xqueue-sweeper", version, about, long_about = None)]
pub(crate) struct Cli {
    /// Queues to sweep. All queues are swept when none are given.
    #[arg(value_name = "QUEUE_NAME")]
    pub(crate) queue_names: Vec<String>,

    /// Retire without contacting the LMS.
    #[arg(short, long)]
    pub(crate) force: bool,
}
