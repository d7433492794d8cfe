use crate::demo::{run_demo, run_effective_day, DemoArgs, EffectiveDayArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use classtime::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Classtime Scheduler",
    about = "Run and demonstrate the school scheduling and assignment engine from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Timetable utilities for operators
    Timetable {
        #[command(subcommand)]
        command: TimetableCommand,
    },
    /// Run an end-to-end CLI demo covering assignment, finalization, and
    /// substitute coverage
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum TimetableCommand {
    /// Load a timetable CSV export and render the effective day for a date
    Effective(EffectiveDayArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Timetable {
            command: TimetableCommand::Effective(args),
        } => run_effective_day(args),
        Command::Demo(args) => run_demo(args),
    }
}
