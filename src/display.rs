//! Display sink
//!
//! The engine hands over a full board snapshot after every mutation; the
//! sink decides how to show it. The terminal implementation here stands in
//! for the LED matrix chain: one glyph pair per LED, top row first.

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::Print;

use crate::board::{Board, BOARD_WIDTH};

/// Anything that can render a board snapshot
pub trait DisplaySink {
    fn refresh(&mut self, board: &Board) -> io::Result<()>;
}

/// Renders the grid at the top-left of the terminal
pub struct TerminalDisplay<W: Write> {
    out: W,
}

impl<W: Write> TerminalDisplay<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> DisplaySink for TerminalDisplay<W> {
    fn refresh(&mut self, board: &Board) -> io::Result<()> {
        queue!(self.out, MoveTo(0, 0))?;
        // Board row height-1 is the top of the matrix, so draw it first
        for (line, row) in (0..board.height()).rev().enumerate() {
            queue!(self.out, MoveTo(0, line as u16))?;
            let Some(cells) = board.row_cells(row) else {
                continue;
            };
            for &occupied in cells {
                queue!(self.out, Print(if occupied { "██" } else { " ·" }))?;
            }
        }
        self.out.flush()
    }
}
