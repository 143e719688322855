use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::io::config_io::Settings;
use crate::io::database::SqliteGateway;
use crate::io::state::{read_ui_state, write_ui_state};
use crate::ops::store_service::StoreService;
use crate::ops::ticket_store::TicketStore;

use super::board::{Board, Effect, Failure, Msg};
use super::render;
use super::theme::Theme;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Completions arriving from background threads
enum Background {
    Opened(StoreService, JoinHandle<()>),
    Msg(Msg),
}

/// Carries out the board's effects. Owns the store service once the
/// database is open.
struct EffectRunner {
    database_path: PathBuf,
    remigrate: usize,
    tx: Sender<Background>,
    store: Option<(StoreService, JoinHandle<()>)>,
}

impl EffectRunner {
    fn new(settings: &Settings, tx: Sender<Background>) -> Self {
        EffectRunner {
            database_path: settings.database_path.clone(),
            remigrate: settings.remigrate,
            tx,
            store: None,
        }
    }

    fn run(&mut self, effect: Effect) {
        match effect {
            Effect::OpenDatabase => self.open_database(),
            Effect::Store(command) => {
                let Some((service, _)) = &self.store else {
                    tracing::warn!(?command, "store command before the database was opened");
                    return;
                };
                if service.dispatch(command).is_err() {
                    let failure = Failure::new("Ticket store stopped", "the store worker exited");
                    let _ = self.tx.send(Background::Msg(Msg::OpenFailed(failure)));
                }
            }
        }
    }

    fn open_database(&self) {
        let path = self.database_path.clone();
        let remigrate = self.remigrate;
        let tx = self.tx.clone();
        let spawned = thread::Builder::new()
            .name("open-database".into())
            .spawn(move || {
                let message = match open_store(&path, remigrate, tx.clone()) {
                    Ok((service, handle)) => Background::Opened(service, handle),
                    Err(failure) => Background::Msg(Msg::OpenFailed(failure)),
                };
                let _ = tx.send(message);
            });
        if let Err(e) = spawned {
            let failure = Failure::new("Failed to open database", e);
            let _ = self.tx.send(Background::Msg(Msg::OpenFailed(failure)));
        }
    }

    /// Stop the store worker after it has drained its mailbox
    fn shutdown(self) {
        if let Some((service, handle)) = self.store {
            drop(service);
            if handle.join().is_err() {
                tracing::error!("ticket store worker panicked");
            }
        }
    }
}

/// Migrate and open the database, then start the store service on it
fn open_store(
    path: &std::path::Path,
    remigrate: usize,
    tx: Sender<Background>,
) -> Result<(StoreService, JoinHandle<()>), Failure> {
    tracing::info!(path = %path.display(), "opening database");
    let mut gateway =
        SqliteGateway::open(path).map_err(|e| Failure::new("Failed to open database", e))?;
    gateway
        .migrate(remigrate)
        .map_err(|e| Failure::new("Failed to migrate database", e))?;
    let store = TicketStore::new(gateway);
    StoreService::spawn(store, move |event| {
        let _ = tx.send(Background::Msg(Msg::Store(event)));
    })
    .map_err(|e| Failure::new("Failed to start ticket store", e))
}

/// Run the board until the user quits. Returns the failure that ended the
/// session, if any.
pub fn run(settings: &Settings) -> Result<Option<Failure>, Box<dyn std::error::Error>> {
    let theme = Theme::from_config(&settings.ui);
    let restore = read_ui_state(&settings.state_path);
    let mut board = Board::new(Duration::from_millis(settings.ui.double_click_ms), restore);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut board, &theme, settings);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    if board.failure().is_none()
        && let Some(state) = board.ui_state()
        && let Err(e) = write_ui_state(&settings.state_path, &state)
    {
        tracing::warn!(error = %e, "could not save ui state");
    }

    result?;
    Ok(board.take_failure())
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    board: &mut Board,
    theme: &Theme,
    settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    let (tx, rx) = mpsc::channel();
    let mut runner = EffectRunner::new(settings, tx);

    let size = terminal.size()?;
    board.update(Msg::Resize(size.width, size.height));
    for effect in board.init() {
        runner.run(effect);
    }

    let result = loop {
        if let Err(e) = terminal.draw(|frame| render::render(frame, board, theme)) {
            break Err(e.into());
        }
        match next_message() {
            Ok(Some(msg)) => dispatch(board, &mut runner, msg),
            Ok(None) => {}
            Err(e) => break Err(e.into()),
        }
        drain_background(&rx, board, &mut runner);
        if board.should_quit() {
            break Ok(());
        }
    };

    runner.shutdown();
    result
}

/// Wait up to one poll interval for terminal input; a quiet interval is a tick
fn next_message() -> io::Result<Option<Msg>> {
    if !event::poll(POLL_INTERVAL)? {
        return Ok(Some(Msg::Tick));
    }
    let msg = match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(Msg::Key(key)),
        Event::Mouse(mouse) => Some(Msg::Mouse {
            event: mouse,
            at: Instant::now(),
        }),
        Event::Resize(width, height) => Some(Msg::Resize(width, height)),
        _ => None,
    };
    Ok(msg)
}

fn drain_background(rx: &Receiver<Background>, board: &mut Board, runner: &mut EffectRunner) {
    while let Ok(background) = rx.try_recv() {
        match background {
            Background::Opened(service, handle) => {
                runner.store = Some((service, handle));
                dispatch(board, runner, Msg::DatabaseOpened);
            }
            Background::Msg(msg) => dispatch(board, runner, msg),
        }
    }
}

fn dispatch(board: &mut Board, runner: &mut EffectRunner, msg: Msg) {
    for effect in board.update(msg) {
        runner.run(effect);
    }
}
