use crate::demo::{run_demo, run_quote, run_tasks, DemoArgs, QuoteArgs, TasksArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use karma_passport::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Karma Passport",
    about = "Serve and explore Karma Passport loan quotes and worker dashboards",
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
    /// Compute a loan quote against the demo borrower's terms
    Quote(QuoteArgs),
    /// List tasks with workload and summary figures
    Tasks(TasksArgs),
    /// Walk through sign-in, dashboard, quote, and application in one run
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Task CSV export used instead of the built-in demo tasks
    #[arg(long)]
    pub(crate) tasks_csv: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Quote(args) => run_quote(args),
        Command::Tasks(args) => run_tasks(args),
        Command::Demo(args) => run_demo(args),
    }
}
