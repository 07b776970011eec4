//! Minimize-on-close behaviour.
//!
//! Closing the main view either quits or "hides to the tray": the full-screen view is
//! torn down and a small parked banner keeps the process alive, offering the two tray
//! actions (show the main window again, or quit).

use std::io::{self, IsTerminal, Write};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tracing::info;

/// What closing the main view does.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloseOutcome {
    Hide,
    Quit,
}

/// Actions offered while parked in the tray.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrayAction {
    ShowMainWindow,
    Quit,
}

/// Hide only when the user asked for it and a tray is available.
pub fn close_outcome(close_to_tray: bool, tray_available: bool) -> CloseOutcome {
    if close_to_tray && tray_available {
        CloseOutcome::Hide
    } else {
        CloseOutcome::Quit
    }
}

/// The parked banner needs an interactive terminal on both ends.
pub fn tray_available() -> bool {
    io::stdin().is_terminal() && io::stdout().is_terminal()
}

/// Map a key press in the parked state to a tray action.
pub fn tray_action_for_key(code: KeyCode, modifiers: KeyModifiers) -> Option<TrayAction> {
    match code {
        KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Enter => Some(TrayAction::ShowMainWindow),
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(TrayAction::Quit),
        KeyCode::Char('q') | KeyCode::Char('Q') => Some(TrayAction::Quit),
        _ => None,
    }
}

/// Show the parked banner and block until a tray action is chosen.
///
/// Must be called with the terminal in its normal (cooked, main-screen) state.
pub fn park(pending: usize) -> io::Result<TrayAction> {
    info!(pending, "main view hidden to tray");
    let mut stdout = io::stdout();
    writeln!(stdout, "todo is still running in the tray ({pending} open task(s)).")?;
    writeln!(stdout, "  [s]/Enter  show main window")?;
    writeln!(stdout, "  [q]        quit")?;
    stdout.flush()?;

    enable_raw_mode()?;
    let action = loop {
        match event::read() {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                if let Some(action) = tray_action_for_key(key.code, key.modifiers) {
                    break Ok(action);
                }
            }
            Ok(_) => {}
            Err(e) => break Err(e),
        }
    };
    disable_raw_mode()?;
    let action = action?;
    info!(?action, "tray action");
    Ok(action)
}
