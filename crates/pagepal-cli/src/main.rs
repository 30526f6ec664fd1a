//! CLI entry point - the composition root.

use clap::{CommandFactory, Parser};
use pagepal_cli::{Cli, CliError, Commands, bootstrap, handlers, resolve_settings};
use pagepal_core::Settings;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command.as_ref() else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Speak { text, file } => {
            let text = handlers::speak::load_text(text.clone(), file.as_deref()).await?;
            let settings = resolve_settings(&cli, Settings::from_env().map_err(CliError::from)?)?;
            let ctx = bootstrap(&settings)?;
            handlers::speak::execute(ctx, text).await?;
        }
        Commands::Clean { text } => handlers::clean::execute(text),
        Commands::Intent {
            text,
            reply,
            last_user,
        } => handlers::intent::execute(text, reply.as_deref(), last_user.as_deref()),
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        let code = err.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
        std::process::exit(code);
    }
}
