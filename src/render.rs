//! Text rendering of a grid snapshot plus the win/lose overlay.
//!
//! All drawing state lives in a [`RenderContext`] owned by the caller:
//! [`RenderContext::begin`] prepares the terminal, [`RenderContext::draw`]
//! writes one frame, and [`RenderContext::finish`] restores the terminal.
//! With color disabled the output is plain text, suitable for pipes and tests.

use std::io::{self, Write};

use crate::engine::{GameStatus, Grid, WIN_TILE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub const BACKGROUND: Rgb = Rgb(190, 169, 159);
pub const FONT: Rgb = Rgb(70, 60, 60);

const PALETTE: [(u32, Rgb); 12] = [
    (0, Rgb(205, 193, 180)),
    (2, Rgb(238, 228, 218)),
    (4, Rgb(237, 224, 200)),
    (8, Rgb(242, 177, 121)),
    (16, Rgb(245, 149, 99)),
    (32, Rgb(246, 124, 95)),
    (64, Rgb(246, 94, 59)),
    (128, Rgb(237, 207, 114)),
    (256, Rgb(237, 204, 97)),
    (512, Rgb(237, 200, 80)),
    (1024, Rgb(237, 197, 63)),
    (2048, Rgb(237, 194, 46)),
];

const WIN_MESSAGE: &str = "You Win!";
const LOSE_MESSAGE: &str = "You Lose!";
const PROMPT: &str = "Press Y to restart. Press N to quit.";

/// Cell color for a tile value. Tiles past 2048 keep the 2048 color.
pub fn tile_color(value: u32) -> Rgb {
    let key = value.min(WIN_TILE);
    PALETTE
        .iter()
        .find(|(v, _)| *v == key)
        .map(|&(_, rgb)| rgb)
        .unwrap_or(PALETTE[PALETTE.len() - 1].1)
}

/// Cell label: blank for an empty cell, else the value right-aligned to 4.
pub fn tile_label(value: u32) -> String {
    match value {
        0 => String::new(),
        v => format!("{:>4}", v),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    /// Emit ANSI 24-bit color and cursor control sequences.
    pub color: bool,
}

impl Default for Style {
    fn default() -> Self { Style { color: true } }
}

#[derive(Debug)]
pub struct RenderContext<W: Write> {
    out: W,
    style: Style,
}

impl<W: Write> RenderContext<W> {
    pub fn new(out: W, style: Style) -> Self {
        RenderContext { out, style }
    }

    /// Clear the screen and hide the cursor.
    pub fn begin(&mut self) -> io::Result<()> {
        if self.style.color {
            write!(self.out, "\x1b[?25l\x1b[2J\x1b[H")?;
        }
        self.out.flush()
    }

    /// Draw `grid`, then the overlay when `status` ends the game.
    pub fn draw(&mut self, grid: Grid, status: GameStatus) -> io::Result<()> {
        if self.style.color {
            write!(self.out, "\x1b[H\x1b[J")?;
        }
        for cells in grid.to_rows() {
            for value in cells {
                self.cell(value)?;
            }
            writeln!(self.out)?;
        }
        match status {
            GameStatus::Active => {}
            GameStatus::Won => self.overlay(WIN_MESSAGE)?,
            GameStatus::Lost => self.overlay(LOSE_MESSAGE)?,
        }
        self.out.flush()
    }

    /// Reset attributes and show the cursor again.
    pub fn finish(&mut self) -> io::Result<()> {
        if self.style.color {
            write!(self.out, "\x1b[0m\x1b[?25h")?;
        }
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn cell(&mut self, value: u32) -> io::Result<()> {
        let label = format!(" {:<6} ", tile_label(value));
        if self.style.color {
            let Rgb(r, g, b) = tile_color(value);
            let Rgb(fr, fg, fb) = FONT;
            write!(self.out, "\x1b[48;2;{r};{g};{b}m\x1b[38;2;{fr};{fg};{fb}m{label}\x1b[0m")
        } else {
            write!(self.out, "[{label}]")
        }
    }

    fn overlay(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{message}")?;
        writeln!(self.out, "{PROMPT}")
    }
}
