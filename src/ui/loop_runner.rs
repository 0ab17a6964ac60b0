//! The event loop: terminal input, open-sequence results and a housekeeping tick.

use crate::app::{App, AppEvent};
use anyhow::Result;
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use super::events::handle_app_event;
use super::input::handle_input;
use super::render::render;

type Term = Terminal<CrosstermBackend<Stdout>>;

const TICK: Duration = Duration::from_millis(250);

/// What the loop should do after an input event.
pub enum Action {
    Continue,
    Quit,
}

/// Run the dashboard until the user quits or a termination signal arrives.
///
/// `event_tx` is handed to spawned open sequences; their results come back on
/// `event_rx`. Redraws happen only when `app.needs_redraw` is set.
///
/// A panic hook restores the terminal before the default hook prints, so a
/// panic never leaves the shell in raw mode.
pub async fn run(
    app: &mut App,
    event_tx: mpsc::Sender<AppEvent>,
    mut event_rx: mpsc::Receiver<AppEvent>,
) -> Result<()> {
    install_panic_hook();

    let mut terminal = setup_terminal()?;
    let mut input = EventStream::new();
    let mut tick = tokio::time::interval(TICK);

    #[cfg(unix)]
    let mut sigterm = signal(SignalKind::terminate())?;
    #[cfg(unix)]
    let mut sigint = signal(SignalKind::interrupt())?;

    loop {
        if app.needs_redraw {
            terminal.draw(|f| render(f, app))?;
            app.needs_redraw = false;
        }
        if app.clear_expired_status() {
            app.needs_redraw = true;
        }

        // Results that arrived while drawing
        while let Ok(event) = event_rx.try_recv() {
            handle_app_event(app, event);
            app.needs_redraw = true;
        }

        #[cfg(unix)]
        let (term_sig, int_sig) = (sigterm.recv(), sigint.recv());
        #[cfg(not(unix))]
        let (term_sig, int_sig) = (
            std::future::pending::<Option<()>>(),
            std::future::pending::<Option<()>>(),
        );

        tokio::select! {
            biased;

            _ = term_sig => {
                tracing::info!("Received SIGTERM, shutting down");
                break;
            }
            _ = int_sig => {
                tracing::info!("Received SIGINT, shutting down");
                break;
            }

            next = input.next() => {
                if let Some(Ok(event)) = next {
                    if let Action::Quit = on_terminal_event(app, event, &event_tx).await {
                        break;
                    }
                }
            }

            Some(event) = event_rx.recv() => {
                handle_app_event(app, event);
                app.needs_redraw = true;
            }

            _ = tick.tick() => app.reap_open_tasks(),
        }
    }

    restore_terminal(terminal)
}

async fn on_terminal_event(
    app: &mut App,
    event: Event,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    match event {
        // Press only; some terminals also report Release
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            app.needs_redraw = true;
            match handle_input(app, key.code, key.modifiers, event_tx).await {
                Ok(action) => action,
                Err(e) => {
                    app.set_error(format!("Error: {:#}", e));
                    Action::Continue
                }
            }
        }
        Event::Resize(..) => {
            app.needs_redraw = true;
            Action::Continue
        }
        _ => Action::Continue,
    }
}

fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        previous(info);
    }));
}

fn setup_terminal() -> Result<Term> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(mut terminal: Term) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
