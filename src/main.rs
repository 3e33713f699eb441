use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use secure_workspace::cli::{Cli, Commands};
use secure_workspace::{WorkspaceContext, commands, output};
use std::io::{self, IsTerminal};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(e) = run() {
        tracing::debug!("{e:?}");
        output::error(&format!("Error: {e}"));
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("SWS_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.quiet {
        output::set_verbosity(output::Verbosity::Quiet);
    } else if cli.verbose {
        output::set_verbosity(output::Verbosity::Verbose);
    }

    if let Commands::Completion { shell } = cli.command {
        print_completions(shell, &mut Cli::command());
        return Ok(());
    }

    let mut ctx = WorkspaceContext::new(cli.root, cli.state)?;
    ctx.non_interactive = !io::stdin().is_terminal();

    match cli.command {
        Commands::Start => commands::start::execute(&ctx)?,
        Commands::Stop {
            preserve,
            discard_all,
        } => {
            let mode = if discard_all {
                commands::stop::StopMode::DiscardAll
            } else if !preserve.is_empty() {
                commands::stop::StopMode::Preserve(preserve)
            } else {
                commands::stop::StopMode::Interactive
            };
            commands::stop::execute(&ctx, mode)?;
        }
        Commands::Status { short } => commands::status::execute(&ctx, short)?,
        Commands::Completion { .. } => {}
    }

    Ok(())
}

fn print_completions<G: Generator>(g: G, cmd: &mut clap::Command) {
    generate(g, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
