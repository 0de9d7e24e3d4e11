//! Keyboard input source
//!
//! Drains whatever key-down events are pending and translates them into
//! engine commands. Only four keys mean anything to the engine; quit keys
//! are a shell concern and never reach it.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::game::Action;

/// A source of discrete input commands, polled once per frame
pub trait InputSource {
    /// All commands that arrived since the last poll; never blocks
    fn poll(&mut self) -> io::Result<Vec<Action>>;
}

/// Crossterm-backed keyboard source
pub struct Keyboard {
    quit: bool,
}

impl Keyboard {
    pub fn new() -> Self {
        Self { quit: false }
    }

    /// Whether the user asked to leave (q, Esc or Ctrl+C)
    pub fn quit_requested(&self) -> bool {
        self.quit
    }
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for Keyboard {
    fn poll(&mut self) -> io::Result<Vec<Action>> {
        let mut actions = Vec::new();
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if is_quit(&key) {
                    self.quit = true;
                } else if let Some(action) = map_key(key.code) {
                    actions.push(action);
                }
            }
        }
        Ok(actions)
    }
}

/// Map a key to its engine command; anything unrecognized is ignored
fn map_key(code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Left => Some(Action::MoveLeft),
        KeyCode::Right => Some(Action::MoveRight),
        KeyCode::Down => Some(Action::SoftDrop),
        KeyCode::Up | KeyCode::Char(' ') => Some(Action::RotateCW),
        _ => None,
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Esc)
        || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
}
