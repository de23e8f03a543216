use crate::commands::{run_assess, run_transform, AssessArgs, TransformArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use risk_eval::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "risk-eval",
    about = "Collect applicant credit attributes, score them and explain the risk band",
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
    /// Print the model feature vector for a form file without scoring it
    Transform(TransformArgs),
    /// Score a form file against the configured scoring service
    Assess(AssessArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the scoring service base URL (MODEL_URL)
    #[arg(long)]
    pub(crate) model_url: Option<String>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Transform(args) => run_transform(args),
        Command::Assess(args) => run_assess(args).await,
    }
}
