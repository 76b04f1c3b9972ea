use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use hitsync::{Judge, StopSignal};
use tracing::debug;

/// What a key press means during play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Lane(usize),
    Stop,
}

/// Spawn a thread that turns key presses into lane presses.
///
/// Lane keys go straight to the judge on this thread. Esc, q, Q and Ctrl+C
/// trigger `stop` (Ctrl+C arrives as a key in raw mode, not as a signal).
pub fn spawn_keyboard_monitor(judge: Judge, stop: Arc<StopSignal>) -> JoinHandle<()> {
    thread::spawn(move || {
        debug!("Keyboard monitor started");

        while !stop.is_stopped() {
            // Poll with a timeout to allow checking the stop state
            if !event::poll(Duration::from_millis(20)).unwrap_or(false) {
                continue;
            }
            let Ok(Event::Key(key_event)) = event::read() else {
                continue;
            };

            match key_action(&key_event) {
                Some(KeyAction::Lane(lane)) => {
                    judge.press(lane);
                }
                Some(KeyAction::Stop) => {
                    debug!("Stop key pressed: {:?}", key_event.code);
                    stop.stop();
                    break;
                }
                None => {}
            }
        }

        debug!("Keyboard monitor stopped");
    })
}

/// Map a key event to its action. Releases and auto-repeats map to nothing.
pub fn key_action(event: &KeyEvent) -> Option<KeyAction> {
    if event.kind != KeyEventKind::Press {
        return None;
    }

    match event.code {
        KeyCode::Esc => Some(KeyAction::Stop),
        KeyCode::Char('q') | KeyCode::Char('Q') => Some(KeyAction::Stop),
        KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(KeyAction::Stop)
        }
        KeyCode::Left => Some(KeyAction::Lane(0)),
        KeyCode::Right => Some(KeyAction::Lane(1)),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'd' | 'f' => Some(KeyAction::Lane(0)),
            'j' | 'k' => Some(KeyAction::Lane(1)),
            _ => None,
        },
        _ => None,
    }
}

/// Raw terminal mode for the lifetime of the guard.
pub struct RawModeGuard;

impl RawModeGuard {
    pub fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}
