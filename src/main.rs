use clap::Parser;
use otelib::cli::{Cli, Commands, kinds_command, run_command};
use otelib::logging;
use tracing::error;

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    let log_file = match &args.cmd {
        Commands::Run { log_file, .. } => log_file.clone(),
        Commands::Kinds { .. } => None,
    };
    if let Err(e) = logging::init(log_file.as_deref()) {
        eprintln!("Failed to create log file: {e}");
        std::process::exit(1);
    }

    if let Err(e) = run(args).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match args.cmd {
        Commands::Run {
            pipeline,
            source,
            session_id,
            debug,
            show_session,
            log_file: _,
        } => {
            run_command(pipeline, source, session_id, debug, show_session).await?;
        }
        Commands::Kinds { source } => {
            kinds_command(source).await?;
        }
    }
    Ok(())
}
