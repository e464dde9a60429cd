//! Terminal setup and the main loop.

use std::io::{self, Stdout};

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::error::TryRecvError;
use tracing::{debug, error, info};

use crate::api::DeliveryClient;
use crate::app::{App, Command};
use crate::config::{Config, Profile};
use crate::error::{AppError, Result};
use crate::events::EventHandler;
use crate::routing::NavigationContext;
use crate::screen::Screen;
use crate::tasks::{create_task_channel, ApiReceiver, TaskSpawner};

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Run the TUI against `profile` until the user quits.
pub async fn run(
    config: &Config,
    profile: &Profile,
    start: Screen,
    route: NavigationContext,
) -> Result<()> {
    let client = DeliveryClient::new(profile, &config.settings)?;
    let (spawner, mut rx) = create_task_channel();
    let events = EventHandler::new();
    let mut app = App::starting_at(config, route, start);

    install_panic_hook();
    let mut terminal = setup_terminal()?;
    info!(profile = %profile.name, %start, "TUI started");

    let result = event_loop(&mut terminal, &mut app, &events, &client, &spawner, &mut rx);

    restore_terminal(&mut terminal)?;
    result
}

fn event_loop(
    terminal: &mut Tui,
    app: &mut App,
    events: &EventHandler,
    client: &DeliveryClient,
    spawner: &TaskSpawner,
    rx: &mut ApiReceiver,
) -> Result<()> {
    loop {
        execute_commands(app, client, spawner);

        terminal
            .draw(|frame| app.view(frame))
            .map_err(|e| AppError::terminal(e.to_string()))?;

        // Polling blocks for up to one tick; keep the runtime's other workers free.
        let event = tokio::task::block_in_place(|| events.next())?;
        app.update(event);

        loop {
            match rx.try_recv() {
                Ok(message) => app.handle_api_message(message),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    error!("Task channel closed");
                    return Err(AppError::other("background task channel closed"));
                }
            }
        }

        if app.should_quit() {
            debug!("Quit requested");
            return Ok(());
        }
    }
}

fn execute_commands(app: &mut App, client: &DeliveryClient, spawner: &TaskSpawner) {
    for command in app.take_commands() {
        match command {
            Command::FetchPage { screen, request } => {
                spawner.spawn_fetch_page(client, screen, request);
            }
            Command::CloseComplaint(id) => {
                spawner.spawn_close_complaint(client, id);
            }
        }
    }
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode().map_err(|e| AppError::terminal(e.to_string()))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).map_err(|e| AppError::terminal(e.to_string()))?;
    Terminal::new(CrosstermBackend::new(stdout)).map_err(|e| AppError::terminal(e.to_string()))
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode().map_err(|e| AppError::terminal(e.to_string()))?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .map_err(|e| AppError::terminal(e.to_string()))?;
    terminal
        .show_cursor()
        .map_err(|e| AppError::terminal(e.to_string()))
}

/// Leave the alternate screen before printing a panic message.
fn install_panic_hook() {
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        hook(info);
    }));
}
