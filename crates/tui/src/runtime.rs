//! Runtime: terminal lifecycle and the event loop.
//!
//! - A dedicated OS thread blocks on `crossterm::event::read()` and forwards
//!   events over a channel.
//! - The loop selects over input, a ticker (fast only while a command is
//!   executing), finished executions and session events.
//! - `App::update` turns each message into effects; `Effect::Execute` spawns
//!   the network call, `Effect::Quit` ends the loop.

use std::io::Stdout;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use futures_util::StreamExt;
use futures_util::future::BoxFuture;
use futures_util::stream::FuturesUnordered;
use ratatui::{Terminal, prelude::CrosstermBackend};
use rconsole_api::AuthEvent;
use rconsole_engine::CommandInvoker;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

use crate::app::{App, Effect, Msg};
use crate::{cmd, ui};

type Backend = CrosstermBackend<Stdout>;

fn spawn_input_thread() -> mpsc::Receiver<Event> {
    let (sender, receiver) = mpsc::channel(256);
    std::thread::spawn(move || {
        loop {
            match event::read() {
                Ok(event) => {
                    if sender.blocking_send(event).is_err() {
                        break;
                    }
                }
                Err(error) => {
                    warn!(%error, "failed to read terminal event");
                    break;
                }
            }
        }
    });
    receiver
}

fn setup_terminal() -> Result<Terminal<Backend>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn cleanup_terminal(terminal: &mut Terminal<Backend>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

pub async fn run_app(
    mut app: App,
    invoker: Arc<dyn CommandInvoker>,
    auth_events: broadcast::Receiver<AuthEvent>,
) -> Result<()> {
    let input = spawn_input_thread();
    let mut terminal = setup_terminal()?;
    let outcome = event_loop(&mut terminal, &mut app, invoker, input, auth_events).await;
    cleanup_terminal(&mut terminal)?;
    outcome?;

    match app.session_error.take() {
        Some(reason) => Err(anyhow!("session expired, sign in again: {reason}")),
        None => Ok(()),
    }
}

async fn event_loop(
    terminal: &mut Terminal<Backend>,
    app: &mut App,
    invoker: Arc<dyn CommandInvoker>,
    mut input: mpsc::Receiver<Event>,
    mut auth_events: broadcast::Receiver<AuthEvent>,
) -> Result<()> {
    let mut pending: FuturesUnordered<BoxFuture<'static, Msg>> = FuturesUnordered::new();
    let mut auth_open = true;

    let fast_interval = Duration::from_millis(100);
    let idle_interval = Duration::from_millis(1000);
    let mut current_interval = idle_interval;
    let mut ticker = time::interval(current_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        terminal.draw(|frame| ui::draw(frame, app))?;

        let target_interval = if app.controller.is_executing() { fast_interval } else { idle_interval };
        if target_interval != current_interval {
            current_interval = target_interval;
            ticker = time::interval(current_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        }

        let msg = tokio::select! {
            maybe_event = input.recv() => match maybe_event {
                Some(Event::Key(key)) if key.kind == KeyEventKind::Press => Msg::Key(key),
                Some(_) => continue,
                None => break,
            },
            _ = ticker.tick() => Msg::Tick,
            Some(completed) = pending.next(), if !pending.is_empty() => completed,
            event = auth_events.recv(), if auth_open => match event {
                Ok(AuthEvent::AuthenticationFailed { reason }) => Msg::SessionExpired(reason),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "auth events lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => {
                    auth_open = false;
                    continue;
                }
            },
        };

        for effect in app.update(msg) {
            match effect {
                Effect::Execute(ticket) => pending.push(cmd::spawn_execution(Arc::clone(&invoker), ticket)),
                Effect::Quit => return Ok(()),
            }
        }
    }
    Ok(())
}
