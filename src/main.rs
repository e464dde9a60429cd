//! dispatchdesk - a terminal client for delivery operations
//!
//! Starts the TUI by default; subcommands cover scripting use.

use std::process::ExitCode;

use clap::Parser;

use dispatchdesk::cli::{self, Cli, Commands, ConfigCommand};
use dispatchdesk::config::Config;
use dispatchdesk::error::{AppError, Result};
use dispatchdesk::logging;
use dispatchdesk::routing::NavigationContext;
use dispatchdesk::screen::{CollectionType, Screen};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init() {
        eprintln!("Warning: logging disabled: {}", e);
    }

    let result = run(cli).await;
    logging::shutdown();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {}", e.user_message());
            if let Some(action) = e.suggested_action() {
                eprintln!("{}", action);
            }
            if e.is_critical() {
                if let Some(dir) = logging::log_directory() {
                    eprintln!("Logs: {}", dir.display());
                }
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Some(Commands::Config(ConfigCommand::Path)) = &cli.command {
        println!("{}", cli::cmd_config_path()?.display());
        return Ok(());
    }

    let mut config = Config::load()?;
    let profile = cli.profile.as_deref();

    match cli.command {
        None => run_tui(&mut config, profile, Screen::Orders, NavigationContext::new()).await,
        Some(Commands::Tui {
            screen,
            collection_type,
            order_ids,
            collection_ids,
        }) => {
            let start = screen.screen(collection_type)?;
            let route = initial_route(order_ids, collection_ids)?;
            run_tui(&mut config, profile, start, route).await
        }
        Some(Commands::List(args)) => cli::cmd_list(&config, profile, &args).await,
        Some(Commands::CloseComplaint { id }) => {
            cli::cmd_close_complaint(&config, profile, &id).await
        }
        Some(Commands::Token(command)) => cli::cmd_token(&config, profile, &command),
        Some(Commands::Config(ConfigCommand::Path)) => Ok(()),
    }
}

async fn run_tui(
    config: &mut Config,
    profile: Option<&str>,
    start: Screen,
    route: NavigationContext,
) -> Result<()> {
    let selected = cli::resolve_profile(config, profile)?.clone();
    // The app reads the default profile for complaint scoping.
    config.settings.default_profile = Some(selected.name.clone());
    dispatchdesk::tui::run(config, &selected, start, route).await
}

fn initial_route(
    order_ids: Option<String>,
    collection_ids: Option<String>,
) -> Result<NavigationContext> {
    match (order_ids, collection_ids) {
        (Some(_), Some(_)) => Err(AppError::invalid_argument(
            "--order-ids and --collection-ids cannot be combined",
        )),
        (Some(ids), None) => Ok(route_for(Screen::Orders, ids)),
        (None, Some(ids)) => Ok(route_for(
            Screen::Collections(CollectionType::default()),
            ids,
        )),
        (None, None) => Ok(NavigationContext::new()),
    }
}

fn route_for(screen: Screen, ids: String) -> NavigationContext {
    match screen.id_list_binding() {
        Some(binding) => NavigationContext::with_param(binding.route_param, ids),
        None => NavigationContext::new(),
    }
}
