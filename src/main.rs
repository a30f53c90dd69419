mod audio;
mod bus;
mod catalog;
mod controller;
mod error;
mod logging;
mod model;
mod session;
mod view;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use audio::AudioOutput;
use bus::AuthEventBus;
use controller::AppController;
use model::AppModel;
use session::SessionStore;
use view::AppView;

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = logging::init_logging() {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== Serenity Player Starting ===");

    let model = Arc::new(AppModel::new());

    // Track library from the catalog export
    let library_path = catalog::library_path();
    match catalog::load_library(&library_path) {
        Ok(tracks) => model.set_library(tracks).await,
        Err(e) => {
            tracing::warn!(error = %e, "Could not load track library");
            model
                .set_error(format!("Could not load library: {}", e))
                .await;
        }
    }

    // Session slot + change bus; the top bar re-reads the session on
    // every notification
    let auth_bus = AuthEventBus::new();
    let session_store = SessionStore::new(session::DEFAULT_SESSION_FILE, auth_bus.clone());
    if let Err(e) = session_store.login_from_env() {
        tracing::warn!(error = %e, "Could not establish session from environment");
    }
    model
        .set_signed_in(session_store.read().map(|s| s.display_name))
        .await;
    {
        let model = model.clone();
        let store = session_store.clone();
        let mut notifications = auth_bus.subscribe();
        tokio::spawn(async move {
            while notifications.recv().await.is_ok() {
                model
                    .set_signed_in(store.read().map(|s| s.display_name))
                    .await;
            }
        });
    }

    // The one audio output, plus its event stream
    let (output, output_events) = AudioOutput::spawn()?;
    let controller = AppController::new(model.clone(), Arc::new(output), session_store.clone());
    controller.start_output_event_listener(output_events);

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, model, controller).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("Serenity Player shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: Arc<AppModel>,
    controller: AppController,
) -> io::Result<()> {
    loop {
        // Errors dismiss themselves after a few seconds
        model.auto_clear_old_errors().await;

        let playback = model.playback_snapshot().await;
        let ui_state = model.get_ui_state().await;
        let library = model.library_tracks().await;
        let should_quit = model.should_quit().await;

        terminal.draw(|f| {
            AppView::render(f, &playback, &ui_state, &library);
        })?;

        // Short poll keeps the progress bar smooth between output ticks
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                let _ = controller.handle_key_event(key).await;
            }
        }

        if should_quit {
            break;
        }
    }

    Ok(())
}
