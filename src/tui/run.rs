//! TUI entry point and setup.

use std::{io, path::PathBuf};

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::CrosstermBackend, Terminal};
use tracing::info;

use crate::db::TaskRepository;
use crate::error::Result;
use crate::tray::{self, close_outcome, CloseOutcome, TrayAction};
use crate::tui::{app::App, enums::AppExit};

/// Show the main view once, restoring the terminal however the event loop ends.
fn show_main_view(app: &mut App) -> io::Result<AppExit> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

/// Initialise and run the terminal user interface.
///
/// Closing the main view hides it to the tray when `close_to_tray` is set and a tray is
/// available; the tray can show the view again or quit.
pub fn run_tui(repo: TaskRepository, settings_path: PathBuf) -> Result<()> {
    let mut app = App::new(repo, settings_path)?;
    info!("main view opened");
    loop {
        let exit = show_main_view(&mut app)?;
        if exit == AppExit::Quit {
            break;
        }
        match close_outcome(app.settings().close_to_tray, tray::tray_available()) {
            CloseOutcome::Quit => break,
            CloseOutcome::Hide => match tray::park(app.open_count())? {
                TrayAction::ShowMainWindow => app.restore(),
                TrayAction::Quit => break,
            },
        }
    }
    info!("exiting");
    Ok(())
}
