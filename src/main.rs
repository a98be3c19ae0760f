use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use msgscope_core::{
    Console, ConsoleConfig, ConsoleLayer, ConsoleView, SeqId, Severity, ViewRequests,
};
use msgscope_tui::{
    Action, AppState, ConsoleScreen, DetailOverlay, Event, EventHandler, HelpOverlay, KeyBindings,
    KeyContext, MessageClipboard, PAGE_SIZE, RowSink, Tui, restore_terminal,
};

mod demo;

/// Exit status after a fatal message, as for SIGABRT
const FATAL_EXIT_CODE: i32 = 134;

/// msgscope - an in-process diagnostic console for an application's log stream
#[derive(Parser, Debug)]
#[command(name = "msgscope")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum number of displayed messages
    #[arg(long)]
    max_displayed: Option<usize>,

    /// Maximum number of retained messages per severity
    #[arg(long)]
    max_retained: Option<usize>,

    /// Session transcript path (truncated on start)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Severities to start hidden, comma separated
    #[arg(long, value_delimiter = ',', value_parser = parse_severity)]
    hidden: Vec<Severity>,

    /// Delay between demo messages of one producer
    #[arg(long, default_value = "500")]
    interval_ms: u64,

    /// Number of demo producer tasks
    #[arg(long, default_value = "1")]
    producers: usize,

    /// Log a fatal message after this many demo messages
    #[arg(long)]
    fatal_after: Option<u64>,
}

fn parse_severity(s: &str) -> Result<Severity, String> {
    match Severity::parse(s) {
        Some(Severity::Fatal) => Err("fatal messages are never displayed".to_string()),
        Some(severity) => Ok(severity),
        None => Err(format!("unknown severity '{s}'")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    // Startup diagnostics go to stderr until the console takes over
    let startup = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .finish();
    let (console, requests) = tracing::subscriber::with_default(startup, || Console::new(config))
        .context("failed to start the console")?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with(ConsoleLayer::new(Arc::clone(&console)))
        .init();

    console.set_fatal_hook(|record| {
        let _ = restore_terminal();
        eprintln!(
            "fatal message {} at {}:{}: {}",
            record.id(),
            record.source_file(),
            record.source_line(),
            record.body()
        );
        std::process::exit(FATAL_EXIT_CODE);
    });

    // Run the application
    let result = run_app(&args, Arc::clone(&console), requests).await;
    console.close();

    // Handle any errors
    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

/// File config overridden by command line flags
fn load_config(args: &Args) -> Result<ConsoleConfig> {
    let mut config = match &args.config {
        Some(path) => ConsoleConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ConsoleConfig::default(),
    };

    if let Some(max_displayed) = args.max_displayed {
        config.max_displayed = max_displayed;
    }
    if let Some(max_retained) = args.max_retained {
        config.max_retained = max_retained;
    }
    if let Some(log_file) = &args.log_file {
        config.log_file = log_file.clone();
    }
    for severity in &args.hidden {
        config.visible.set(*severity, false);
    }

    Ok(config)
}

async fn run_app(args: &Args, console: Arc<Console>, mut requests: ViewRequests) -> Result<()> {
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    let mut state = AppState::new();
    let mut view = ConsoleView::new(console, RowSink::default());
    let mut clipboard = MessageClipboard::new();

    let producers = demo::spawn_producers(
        args.producers,
        Duration::from_millis(args.interval_ms.max(1)),
        args.fatal_after,
    );

    // Initialize TUI
    let mut tui = Tui::new()?;
    let mut events = EventHandler::new(Duration::from_millis(100));
    let keybindings = KeyBindings::new();

    info!(producers = args.producers, "console ready");

    // Initial render
    render(&mut tui, &mut state, &view)?;

    // Main event loop
    loop {
        tokio::select! {
            // Handle terminal events
            Some(event) = events.next() => {
                match event {
                    Event::Key(key) => {
                        let context = if state.overlay_open() {
                            KeyContext::Overlay
                        } else {
                            KeyContext::Console
                        };
                        if let Some(action) = keybindings.get_action(context, &key) {
                            let _ = action_tx.send(action);
                        }
                        state.render_dirty = true;
                    }
                    Event::Pointer(pointer) => {
                        if let Some(action) = state.pointer_action(view.sink().rows(), pointer) {
                            let _ = action_tx.send(action);
                        }
                    }
                    Event::Tick => {
                        if state.tick() {
                            state.render_dirty = true;
                        }
                    }
                    Event::Resize(_, _) => {
                        let _ = action_tx.send(Action::Render);
                    }
                    Event::Error(e) => {
                        state.show_status(e);
                        state.render_dirty = true;
                    }
                }
            }

            // Materialize new messages, in dispatch order
            Some(request) = requests.recv() => {
                view.apply(request);
                view.drain(&mut requests);
                state.render_dirty = true;
            }

            // Handle user actions
            Some(action) = action_rx.recv() => {
                handle_action(&mut state, &mut view, &mut clipboard, action);
                state.render_dirty = true;
            }
        }

        if state.should_quit {
            break;
        }

        if state.render_dirty {
            render(&mut tui, &mut state, &view)?;
            state.render_dirty = false;
        }
    }

    // Cleanup
    for producer in producers {
        producer.abort();
    }
    events.shutdown().await;
    tui.restore()?;

    Ok(())
}

fn handle_action(
    state: &mut AppState,
    view: &mut ConsoleView<RowSink>,
    clipboard: &mut MessageClipboard,
    action: Action,
) {
    match action {
        Action::Quit => {
            state.should_quit = true;
        }

        Action::ToggleSeverity(severity) => {
            let shown = view.toggle(severity);
            let verb = if shown { "shown" } else { "hidden" };
            state.show_status(format!("{} messages {}", severity.label(), verb));
        }

        // Selection
        Action::SelectUp(n) => {
            state.move_selection(view.sink().rows(), -(n as isize));
            refresh_inspected(state, view);
        }
        Action::SelectDown(n) => {
            state.move_selection(view.sink().rows(), n as isize);
            refresh_inspected(state, view);
        }
        Action::PageUp => {
            state.move_selection(view.sink().rows(), -(PAGE_SIZE as isize));
        }
        Action::PageDown => {
            state.move_selection(view.sink().rows(), PAGE_SIZE as isize);
        }
        Action::SelectFirst => {
            state.select_first(view.sink().rows());
        }
        Action::SelectLast => {
            state.select_last(view.sink().rows());
        }

        // Entry actions
        Action::Inspect => {
            if let Some(id) = state.selected_id(view.sink().rows()) {
                state.ui_state.inspected = view.console().record_snapshot(id);
            }
        }
        Action::RemoveSelected => {
            if let Some(id) = state.selected_id(view.sink().rows()) {
                remove_message(state, view, id);
            }
        }
        Action::Open(id) => {
            state.ui_state.follow = false;
            state.ui_state.selected = Some(id);
            state.ui_state.inspected = view.console().record_snapshot(id);
        }
        Action::Remove(id) => {
            remove_message(state, view, id);
        }

        Action::CopySelected => {
            let record = state
                .selected_id(view.sink().rows())
                .and_then(|id| view.console().record_snapshot(id));
            if let Some(record) = record {
                match clipboard.copy(record.body()) {
                    Ok(()) => state.show_status(format!("Copied message {}", record.id())),
                    Err(e) => state.show_status(e),
                }
            }
        }

        // UI toggles
        Action::ToggleFollow => {
            state.ui_state.follow = !state.ui_state.follow;
        }
        Action::ToggleStats => {
            state.ui_state.stats_visible = !state.ui_state.stats_visible;
        }
        Action::TogglePanel => {
            state.ui_state.panel_hidden = !state.ui_state.panel_hidden;
        }
        Action::ToggleHelp => {
            state.ui_state.help_visible = !state.ui_state.help_visible;
        }
        Action::CloseOverlay => {
            state.close_overlay();
        }

        Action::Render => {
            // Handled by the dirty flag
        }
    }
}

fn remove_message(state: &mut AppState, view: &mut ConsoleView<RowSink>, id: SeqId) {
    if view.remove(id) {
        state.show_status(format!("Removed message {}", id));
    }
}

/// Keep the detail overlay on the selected message while it is open
fn refresh_inspected(state: &mut AppState, view: &ConsoleView<RowSink>) {
    if state.ui_state.inspected.is_none() {
        return;
    }
    if let Some(id) = state.selected_id(view.sink().rows()) {
        state.ui_state.inspected = view.console().record_snapshot(id);
    }
}

fn render(tui: &mut Tui, state: &mut AppState, view: &ConsoleView<RowSink>) -> Result<()> {
    tui.terminal().draw(|frame| {
        ConsoleScreen::render(frame, state, view);

        // Render detail overlay if a message is inspected
        if let Some(record) = &state.ui_state.inspected {
            DetailOverlay::render(frame, record);
        }

        // Render help overlay if visible
        if state.ui_state.help_visible {
            HelpOverlay::render(frame);
        }
    })?;

    Ok(())
}
